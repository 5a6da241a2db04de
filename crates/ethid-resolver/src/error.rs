use thiserror::Error;

use ethid_core::CoreError;
use ethid_registry::RegistryError;

use crate::metadata::ErrorCode;

/// Resolution failures.
///
/// At the consumer boundary these are carried as resolution metadata, not
/// raised — see [`crate::metadata::ResolutionResult`].
#[derive(Debug, Error)]
pub enum ResolutionError {
    #[error("invalid DID: {0}")]
    InvalidDid(String),

    #[error("unsupported DID method: {0}")]
    MethodNotSupported(String),

    /// The chain node could not be reached or answered badly.
    #[error("resolution transport error: {0}")]
    Transport(String),
}

impl ResolutionError {
    /// The Universal-Resolver error code this failure maps to.
    pub fn code(&self) -> ErrorCode {
        match self {
            Self::InvalidDid(_) => ErrorCode::InvalidDid,
            Self::MethodNotSupported(_) => ErrorCode::MethodNotSupported,
            Self::Transport(_) => ErrorCode::InternalError,
        }
    }
}

impl From<CoreError> for ResolutionError {
    fn from(e: CoreError) -> Self {
        match e {
            CoreError::MethodNotSupported(m) => Self::MethodNotSupported(m),
            other => Self::InvalidDid(other.to_string()),
        }
    }
}

impl From<RegistryError> for ResolutionError {
    fn from(e: RegistryError) -> Self {
        Self::Transport(e.to_string())
    }
}
