use thiserror::Error;

/// Failure reported by the generation service
#[derive(Debug, Error)]
pub enum GenerationError {
    #[error("ANTHROPIC_API_KEY environment variable not set")]
    MissingApiKey,

    #[error("failed to reach generation service: {0}")]
    Transport(#[from] reqwest::Error),

    #[error("generation service error: {status} - {body}")]
    Api { status: u16, body: String },

    #[error("no text content in response")]
    EmptyResponse,

    #[error("failed to decode response: {0}")]
    Decode(String),
}
