use common::error::ConfigurationError;
use thiserror::Error;

#[derive(Debug, Error)]
pub enum ClientError {
    #[error("request failed: {0}")]
    Transport(#[from] reqwest::Error),
    #[error("server answered {status}: {message}")]
    Status { status: u16, message: String },
    #[error("{0}")]
    Validation(String),
    #[error(transparent)]
    Configuration(#[from] ConfigurationError),
    #[error("invalid URL: {0}")]
    Url(#[from] url::ParseError),
    #[error("i/o error: {0}")]
    Io(#[from] std::io::Error),
}

impl ClientError {
    /// Text shown to the user; server errors carry their own message.
    pub fn user_message(&self) -> String {
        match self {
            ClientError::Status { message, .. } if !message.is_empty() => message.clone(),
            ClientError::Transport(_) => "The server is not reachable".to_string(),
            other => other.to_string(),
        }
    }
}
