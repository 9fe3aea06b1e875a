use thiserror::Error;

pub type Result<T> = std::result::Result<T, SourceError>;

/// Failures that abort a search before any records are produced.
#[derive(Debug, Error)]
pub enum SourceError {
    #[error("YouTube API key is not set. Run `tubestat key set <KEY>` first.")]
    MissingCredential,

    #[error("Network error: {0}")]
    Network(String),

    #[error("YouTube API error (status {status}): {message}")]
    Api { status: u16, message: String },

    #[error("Parse error: {0}")]
    Parse(String),
}

impl SourceError {
    /// True for failures caused by the caller's input rather than upstream.
    pub fn is_input_error(&self) -> bool {
        matches!(self, Self::MissingCredential)
    }
}

impl From<ureq::Transport> for SourceError {
    fn from(err: ureq::Transport) -> Self {
        SourceError::Network(err.to_string())
    }
}

impl From<serde_json::Error> for SourceError {
    fn from(err: serde_json::Error) -> Self {
        SourceError::Parse(err.to_string())
    }
}
