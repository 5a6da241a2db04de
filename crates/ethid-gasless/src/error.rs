use thiserror::Error;

use crate::user_op::UserOpHash;

/// Failures from the gasless submission pipeline, classified for retry.
///
/// `TransientIO` means the whole mutation is safe to resubmit.
/// `PendingTimeout` is different: the operation may still land, so the right
/// recovery is re-polling the preserved handle, never resubmitting.
#[derive(Debug, Error)]
pub enum TxError {
    /// The paymaster refused to sponsor the operation. Terminal unless the
    /// request itself changes.
    #[error("sponsorship denied: {0}")]
    SponsorshipDenied(String),

    /// The bundler rejected the operation as malformed. Terminal.
    #[error("invalid user operation: {0}")]
    InvalidOperation(String),

    /// Inclusion was not observed within the deadline.
    #[error("inclusion not observed for {user_op_hash} within {waited_secs}s")]
    PendingTimeout {
        user_op_hash: UserOpHash,
        waited_secs: u64,
    },

    /// Transport-level failure talking to the chain node, paymaster, or
    /// bundler.
    #[error("transport error: {0}")]
    TransientIO(String),

    #[error("validation failed: {0}")]
    Validation(String),

    #[error("invalid lifecycle transition from {from} to {to}")]
    InvalidPhaseTransition {
        from: &'static str,
        to: &'static str,
    },

    #[error("signing failed: {0}")]
    Signing(String),
}

impl TxError {
    /// Whether the failure leaves the mutation in a recoverable state.
    pub fn is_retryable(&self) -> bool {
        matches!(self, Self::TransientIO(_) | Self::PendingTimeout { .. })
    }

    /// Whether the whole mutation may safely be submitted again. A pending
    /// timeout is excluded: the original operation may still be included.
    pub fn is_resubmit_safe(&self) -> bool {
        matches!(self, Self::TransientIO(_))
    }

    pub fn is_terminal(&self) -> bool {
        !self.is_retryable()
    }
}
