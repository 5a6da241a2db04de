/// Core protocol errors.
#[derive(Debug, thiserror::Error)]
pub enum CoreError {
    #[error("validation failed: {0}")]
    Validation(String),

    #[error("invalid DID: {0}")]
    InvalidDid(String),

    #[error("unsupported DID method: {0}")]
    MethodNotSupported(String),

    #[error("missing required field: {0}")]
    MissingField(String),

    #[error("configuration error: {0}")]
    Config(String),

    #[error("invalid key material: {0}")]
    InvalidKey(String),
}
