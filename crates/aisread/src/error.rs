//! Error types for aisread.

use thiserror::Error;

#[derive(Debug, Error)]
pub enum Error {
    #[error("object not found: {0}")]
    NotFound(String),

    #[error("transport error: {0}")]
    Transport(String),

    #[error("HTTP error {status}: {message}")]
    Http { status: u16, message: String },

    #[error("resume limit reached after {attempts} attempts: {last_error}")]
    ResumeExhausted { attempts: u32, last_error: String },

    #[error("I/O operation on closed object file")]
    Closed,

    #[error("invalid argument: {0}")]
    InvalidArgument(String),

    #[error(transparent)]
    Verification(#[from] aisread_verify::VerificationError),

    #[error("configuration error: {0}")]
    Config(#[source] Box<figment::Error>),
}

impl Error {
    /// Whether reopening the stream can recover from this error.
    ///
    /// Only connection-level failures qualify. A missing object or an
    /// unexpected status fails the same way on every attempt.
    pub fn is_retryable(&self) -> bool { matches!(self, Error::Transport(_)) }
}

impl From<figment::Error> for Error {
    fn from(e: figment::Error) -> Self { Error::Config(Box::new(e)) }
}

#[cfg(feature = "reqwest")]
impl From<reqwest::Error> for Error {
    fn from(e: reqwest::Error) -> Self {
        match e.status() {
            Some(reqwest::StatusCode::NOT_FOUND) => Error::NotFound(e.to_string()),
            Some(status) => Error::Http {
                status:  status.as_u16(),
                message: e.to_string(),
            },
            None if e.is_builder() => Error::InvalidArgument(e.to_string()),
            None => Error::Transport(e.to_string()),
        }
    }
}

pub type Result<T> = std::result::Result<T, Error>;
