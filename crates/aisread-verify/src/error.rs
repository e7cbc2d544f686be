#[derive(Debug, thiserror::Error)]
pub enum VerificationError {
    #[error("checksum mismatch: expected {expected}, got {actual}")]
    Mismatch { expected: String, actual: String },

    #[error("unsupported checksum type: {0}")]
    Unsupported(String),

    #[error("invalid checksum value {value:?}: {reason}")]
    InvalidValue { value: String, reason: String },
}

pub type Result<T> = std::result::Result<T, VerificationError>;
