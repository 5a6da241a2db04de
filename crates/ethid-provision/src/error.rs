use thiserror::Error;

use ethid_core::CoreError;

/// Provisioning-layer errors.
#[derive(Debug, Error)]
pub enum ProvisionError {
    #[error("wallet not found: {0}")]
    WalletNotFound(String),

    #[error("invalid saga transition from {from} on {event}")]
    InvalidTransition { from: String, event: String },

    #[error(transparent)]
    Core(#[from] CoreError),
}
