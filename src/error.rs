// Error types shared by the prompt, dispatch and server layers
use thiserror::Error;

#[derive(Debug, Error)]
pub enum RelayError {
    // A template placeholder had no value at fill/format time
    #[error("missing value for placeholder `{key}`")]
    MissingPlaceholder { key: String },

    #[error("invalid template: {0}")]
    InvalidTemplate(String),

    #[error("invalid endpoint: {0}")]
    InvalidEndpoint(String),

    // Network-level failure (refused, DNS, timeout, aborted body); never retried
    #[error("transport failure: {0}")]
    Transport(#[from] reqwest::Error),

    #[error("model backend error: {0}")]
    Backend(String),

    #[error("configuration error: {0}")]
    Config(#[from] config::ConfigError),

    #[error("io error: {0}")]
    Io(#[from] std::io::Error),
}

impl RelayError {
    pub fn missing(key: impl Into<String>) -> Self {
        RelayError::MissingPlaceholder { key: key.into() }
    }

    pub fn is_transport(&self) -> bool {
        matches!(self, RelayError::Transport(_))
    }
}

pub type Result<T, E = RelayError> = std::result::Result<T, E>;
