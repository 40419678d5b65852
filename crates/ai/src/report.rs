//! Report generation pipeline: prompt, provider call, sanitize, parse.

use tracing::{debug, info, warn};

use crate::error::GenerationError;
use crate::payload::{Field, ReportPayload};
use crate::prompt::{ReportInput, build_prompt};
use crate::provider::ContentGenerator;
use crate::sanitize::sanitize;

/// A successfully generated report, ready to persist.
#[derive(Debug, Clone, PartialEq)]
pub struct GeneratedReport {
    /// Extracted `summary`, or empty when the key was missing or not a string.
    pub summary: String,
    /// Canonical JSON encoding of the whole decoded object.
    pub body: String,
}

/// Run one generation against `generator`.
///
/// Every error is terminal; nothing is retried. A missing or mistyped
/// `summary` is tolerated and yields an empty summary.
pub async fn generate_report<G>(
    generator: &G,
    input: &ReportInput,
) -> Result<GeneratedReport, GenerationError>
where
    G: ContentGenerator + ?Sized,
{
    let prompt = build_prompt(input).map_err(GenerationError::PromptEncoding)?;

    info!(patient_id = %input.patient.id, prompt_len = prompt.len(), "sending prompt to provider");
    let response = generator.generate(&prompt).await?;

    if !response.has_content() {
        return Err(GenerationError::EmptyResponse);
    }

    let raw = response.concatenated_text();
    if raw.is_empty() {
        return Err(GenerationError::NoTextContent);
    }
    info!(raw_len = raw.len(), "received raw content from provider");

    let cleaned = sanitize(&raw);
    if cleaned.is_empty() {
        return Err(GenerationError::EmptyAfterSanitize);
    }

    let payload = match ReportPayload::parse(cleaned) {
        Ok(p) => p,
        Err(e) => {
            debug!(error = %e, content = cleaned, "content that failed parsing");
            return Err(GenerationError::MalformedPayload(e));
        }
    };

    let summary = match payload.summary() {
        Field::Present(s) => s.to_owned(),
        Field::Absent => {
            warn!("'summary' key missing in provider response; using empty summary");
            String::new()
        }
        Field::WrongType(v) => {
            warn!(found = %json_type(&v), "'summary' is not a string; using empty summary");
            String::new()
        }
    };

    let body = payload
        .to_canonical_json()
        .map_err(GenerationError::Reencode)?;

    Ok(GeneratedReport { summary, body })
}

fn json_type(v: &serde_json::Value) -> &'static str {
    match v {
        serde_json::Value::Null => "null",
        serde_json::Value::Bool(_) => "bool",
        serde_json::Value::Number(_) => "number",
        serde_json::Value::String(_) => "string",
        serde_json::Value::Array(_) => "array",
        serde_json::Value::Object(_) => "object",
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::error::ProviderError;
    use crate::provider::{Candidate, ContentPart, GenerationResponse, ScriptedGenerator};
    use medthing_core::Patient;

    fn input() -> ReportInput {
        ReportInput {
            patient: Patient::new("Test Patient", "1980-05-05"),
            medications: vec![],
            appointments: vec![],
            metrics: vec![],
        }
    }

    #[tokio::test]
    async fn fenced_json_completes_with_summary_and_canonical_body() {
        let g = ScriptedGenerator::replying_text(
            "```json\n{\"summary\":\"s\",\"sections\":[],\"recommendations\":[]}\n```",
        );
        let report = generate_report(&g, &input()).await.unwrap();
        assert_eq!(report.summary, "s");
        assert_eq!(
            report.body,
            "{\"recommendations\":[],\"sections\":[],\"summary\":\"s\"}"
        );
    }

    #[tokio::test]
    async fn fragments_are_concatenated_before_parsing() {
        let g = ScriptedGenerator::replying(GenerationResponse::from_text([
            "{\"summary\":",
            "\"joined\"}",
        ]));
        let report = generate_report(&g, &input()).await.unwrap();
        assert_eq!(report.summary, "joined");
    }

    #[tokio::test]
    async fn missing_summary_is_tolerated() {
        let g = ScriptedGenerator::replying_text("{\"sections\":[{\"title\":\"A\",\"content\":\"B\"}]}");
        let report = generate_report(&g, &input()).await.unwrap();
        assert_eq!(report.summary, "");
        assert!(report.body.contains("\"title\":\"A\""));
    }

    #[tokio::test]
    async fn mistyped_summary_is_tolerated() {
        let g = ScriptedGenerator::replying_text("{\"summary\":[1,2]}");
        let report = generate_report(&g, &input()).await.unwrap();
        assert_eq!(report.summary, "");
    }

    #[tokio::test]
    async fn malformed_json_is_a_format_error() {
        let g = ScriptedGenerator::replying_text("{\"summary\": }");
        let err = generate_report(&g, &input()).await.unwrap_err();
        assert!(err.is_format_error());
        assert_eq!(err.to_string(), "failed to parse AI response format");
    }

    #[tokio::test]
    async fn no_candidates_is_empty_response() {
        let g = ScriptedGenerator::replying(GenerationResponse::default());
        let err = generate_report(&g, &input()).await.unwrap_err();
        assert!(matches!(err, GenerationError::EmptyResponse));
    }

    #[tokio::test]
    async fn only_non_text_parts_is_no_text_content() {
        let g = ScriptedGenerator::replying(GenerationResponse {
            candidates: vec![Candidate {
                parts: vec![ContentPart::Other],
            }],
        });
        let err = generate_report(&g, &input()).await.unwrap_err();
        assert!(matches!(err, GenerationError::NoTextContent));
    }

    #[tokio::test]
    async fn fence_only_is_empty_after_cleanup() {
        let g = ScriptedGenerator::replying_text("```json\n\n```");
        let err = generate_report(&g, &input()).await.unwrap_err();
        assert!(matches!(err, GenerationError::EmptyAfterSanitize));
    }

    #[tokio::test]
    async fn provider_errors_are_wrapped() {
        let g = ScriptedGenerator::failing(ProviderError::Api {
            status: 503,
            message: "overloaded".into(),
        });
        let err = generate_report(&g, &input()).await.unwrap_err();
        assert_eq!(
            err.to_string(),
            "ai generation failed: provider returned 503: overloaded"
        );
    }

    #[tokio::test]
    async fn unconfigured_provider_has_its_own_diagnostic() {
        let g = ScriptedGenerator::failing(ProviderError::NotConfigured);
        let err = generate_report(&g, &input()).await.unwrap_err();
        assert_eq!(err.to_string(), "api key not configured");
    }
}
