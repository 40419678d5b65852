use thiserror::Error;

/// Failure reported by a content-generation provider.
#[derive(Debug, Clone, Error, PartialEq, Eq)]
pub enum ProviderError {
    #[error("api key not configured")]
    NotConfigured,

    #[error("transport error: {0}")]
    Transport(String),

    #[error("provider returned {status}: {message}")]
    Api { status: u16, message: String },

    #[error("undecodable provider response: {0}")]
    Decode(String),
}

/// Terminal failure of one report generation.
///
/// The `Display` text is the diagnostic recorded on the failed report, so it
/// stays short and free of provider payloads.
#[derive(Debug, Error)]
pub enum GenerationError {
    #[error("internal error processing patient data")]
    PromptEncoding(#[source] serde_json::Error),

    #[error("api key not configured")]
    NotConfigured,

    #[error("ai generation failed: {0}")]
    Provider(#[source] ProviderError),

    #[error("ai returned empty response")]
    EmptyResponse,

    #[error("ai returned no text content")]
    NoTextContent,

    #[error("ai response was empty after cleanup")]
    EmptyAfterSanitize,

    #[error("failed to parse AI response format")]
    MalformedPayload(#[source] serde_json::Error),

    #[error("internal error processing parsed report")]
    Reencode(#[source] serde_json::Error),
}

impl From<ProviderError> for GenerationError {
    fn from(err: ProviderError) -> Self {
        match err {
            ProviderError::NotConfigured => GenerationError::NotConfigured,
            other => GenerationError::Provider(other),
        }
    }
}

impl GenerationError {
    /// True for failures where the provider answered but the answer was unusable.
    pub fn is_format_error(&self) -> bool {
        matches!(
            self,
            GenerationError::EmptyAfterSanitize | GenerationError::MalformedPayload(_)
        )
    }
}
