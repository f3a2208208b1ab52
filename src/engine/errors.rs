use thiserror::Error;

/// Failures talking to the text-generation provider.
#[derive(Debug, Error)]
pub enum ProviderError {
    #[error("no API key configured for the text provider")]
    MissingApiKey,

    #[error("provider request failed: {0}")]
    Network(#[from] reqwest::Error),

    #[error("provider returned HTTP {status}: {body}")]
    Status { status: u16, body: String },

    #[error("invalid provider response: {0}")]
    Malformed(String),

    #[error("provider returned no text ({reason})")]
    Empty { reason: String },
}

#[derive(Debug, Error)]
pub enum GameError {
    #[error("invalid request: {0}")]
    Validation(String),

    #[error(transparent)]
    Provider(#[from] ProviderError),

    #[error("unusable scene from model: {0}")]
    Parse(String),

    #[error("game is already over")]
    GameOver,
}
