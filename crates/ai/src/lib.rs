//! `medthing-ai`
//!
//! **Responsibility:** turning patient data into a structured report through
//! an external content-generation provider.
//!
//! This crate does not touch storage:
//! - inputs are gathered by callers (infra runner),
//! - the output is a validated summary plus a canonical JSON body,
//! - persisting the outcome is the caller's job.

pub mod error;
pub mod gemini;
pub mod payload;
pub mod prompt;
pub mod provider;
pub mod report;
pub mod sanitize;

pub use error::{GenerationError, ProviderError};
pub use gemini::{GeminiClient, GeminiConfig};
pub use payload::{Field, ReportPayload, ReportSection};
pub use prompt::{ReportInput, build_prompt};
pub use provider::{Candidate, ContentGenerator, ContentPart, GenerationResponse, ScriptedGenerator};
pub use report::{GeneratedReport, generate_report};
pub use sanitize::sanitize;
