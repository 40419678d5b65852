//! Content-generation provider seam.

use std::sync::atomic::{AtomicUsize, Ordering};
use std::time::Duration;

use async_trait::async_trait;

use crate::error::ProviderError;

/// One fragment of a candidate's content.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum ContentPart {
    Text(String),
    /// Non-text content (inline data, function calls). Carries no report text.
    Other,
}

impl ContentPart {
    pub fn text(s: impl Into<String>) -> Self {
        Self::Text(s.into())
    }
}

/// A single generated alternative.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct Candidate {
    pub parts: Vec<ContentPart>,
}

/// Provider-agnostic generation response.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct GenerationResponse {
    pub candidates: Vec<Candidate>,
}

impl GenerationResponse {
    /// Response with a single candidate made of the given text fragments.
    pub fn from_text<I, S>(fragments: I) -> Self
    where
        I: IntoIterator<Item = S>,
        S: Into<String>,
    {
        Self {
            candidates: vec![Candidate {
                parts: fragments.into_iter().map(ContentPart::text).collect(),
            }],
        }
    }

    /// False when there is no first candidate or it has no parts at all.
    pub fn has_content(&self) -> bool {
        self.candidates
            .first()
            .is_some_and(|c| !c.parts.is_empty())
    }

    /// All text fragments of all candidates, concatenated in order.
    pub fn concatenated_text(&self) -> String {
        let mut out = String::new();
        for candidate in &self.candidates {
            for part in &candidate.parts {
                if let ContentPart::Text(t) = part {
                    out.push_str(t);
                }
            }
        }
        out
    }
}

/// External text generator.
///
/// Treated as opaque, fallible, and possibly slow. Implementations must not
/// retry on their own.
#[async_trait]
pub trait ContentGenerator: Send + Sync {
    async fn generate(&self, prompt: &str) -> Result<GenerationResponse, ProviderError>;
}

/// Canned generator for tests/dev.
///
/// Returns the same scripted outcome on every call, optionally after a delay.
#[derive(Debug)]
pub struct ScriptedGenerator {
    outcome: Result<GenerationResponse, ProviderError>,
    delay: Option<Duration>,
    calls: AtomicUsize,
}

impl ScriptedGenerator {
    pub fn replying(response: GenerationResponse) -> Self {
        Self {
            outcome: Ok(response),
            delay: None,
            calls: AtomicUsize::new(0),
        }
    }

    /// Reply with a single text fragment.
    pub fn replying_text(text: impl Into<String>) -> Self {
        let text: String = text.into();
        Self::replying(GenerationResponse::from_text([text]))
    }

    pub fn failing(error: ProviderError) -> Self {
        Self {
            outcome: Err(error),
            delay: None,
            calls: AtomicUsize::new(0),
        }
    }

    pub fn with_delay(mut self, delay: Duration) -> Self {
        self.delay = Some(delay);
        self
    }

    /// Number of `generate` calls so far.
    pub fn calls(&self) -> usize {
        self.calls.load(Ordering::SeqCst)
    }
}

#[async_trait]
impl ContentGenerator for ScriptedGenerator {
    async fn generate(&self, _prompt: &str) -> Result<GenerationResponse, ProviderError> {
        self.calls.fetch_add(1, Ordering::SeqCst);
        if let Some(delay) = self.delay {
            tokio::time::sleep(delay).await;
        }
        self.outcome.clone()
    }
}
