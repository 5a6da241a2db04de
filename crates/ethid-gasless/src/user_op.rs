//! User operations and their lifecycle.

use std::fmt;

use alloy::primitives::{keccak256, Address, Bytes, B256, U256};
use serde::{Deserialize, Serialize};

use crate::error::TxError;
use crate::paymaster::EntryPointVersion;

/// A gas-sponsored operation in flight. Ephemeral: created per mutation,
/// never persisted; only the terminal handle or receipt is surfaced.
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct UserOperation {
    pub sender: Address,
    pub nonce: U256,
    pub call_data: Bytes,
    #[serde(default)]
    pub signature: Bytes,
    #[serde(default)]
    pub paymaster_and_data: Bytes,
}

impl UserOperation {
    /// Build an unsponsored, unsigned operation for a registry call.
    pub fn build(sender: Address, call_data: Bytes) -> Self {
        Self {
            sender,
            nonce: U256::ZERO,
            call_data,
            signature: Bytes::new(),
            paymaster_and_data: Bytes::new(),
        }
    }

    /// Deterministic operation handle, mirroring the entry point's hashing
    /// rule: keccak over the packed operation, the entry point address, and
    /// the chain id. The signature is not part of the hash.
    pub fn hash(&self, entry_point: EntryPointVersion, chain_id: u64) -> UserOpHash {
        let mut packed = Vec::with_capacity(20 + 32 + 32 + 32);
        packed.extend_from_slice(self.sender.as_slice());
        packed.extend_from_slice(&self.nonce.to_be_bytes::<32>());
        packed.extend_from_slice(keccak256(&self.call_data).as_slice());
        packed.extend_from_slice(keccak256(&self.paymaster_and_data).as_slice());
        let inner = keccak256(&packed);

        let mut outer = Vec::with_capacity(32 + 20 + 32);
        outer.extend_from_slice(inner.as_slice());
        outer.extend_from_slice(entry_point.address().as_slice());
        outer.extend_from_slice(&U256::from(chain_id).to_be_bytes::<32>());
        UserOpHash(keccak256(&outer))
    }
}

/// Handle for a submitted operation.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub struct UserOpHash(pub B256);

impl fmt::Display for UserOpHash {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}", self.0)
    }
}

/// Receipt for an included operation.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct TxReceipt {
    pub transaction_hash: B256,
    pub block_number: u64,
    pub gas_used: u64,
}

/// Lifecycle of a user operation.
///
/// built → sponsored → submitted → included | failed. `Included` and
/// `Failed` are final.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum UserOpPhase {
    Built,
    Sponsored,
    Submitted(UserOpHash),
    Included(TxReceipt),
    Failed(String),
}

impl UserOpPhase {
    pub fn is_final(&self) -> bool {
        matches!(self, Self::Included(_) | Self::Failed(_))
    }

    /// Variant name, for logs and errors.
    pub fn name(&self) -> &'static str {
        match self {
            Self::Built => "Built",
            Self::Sponsored => "Sponsored",
            Self::Submitted(_) => "Submitted",
            Self::Included(_) => "Included",
            Self::Failed(_) => "Failed",
        }
    }

    /// Advance the lifecycle. Invalid transitions are errors.
    pub fn transition(self, next: UserOpPhase) -> Result<UserOpPhase, TxError> {
        let valid = matches!(
            (&self, &next),
            (Self::Built, Self::Sponsored)
                | (Self::Sponsored, Self::Submitted(_))
                | (Self::Submitted(_), Self::Included(_))
                | (Self::Built, Self::Failed(_))
                | (Self::Sponsored, Self::Failed(_))
                | (Self::Submitted(_), Self::Failed(_))
        );
        if !valid {
            return Err(TxError::InvalidPhaseTransition {
                from: self.name(),
                to: next.name(),
            });
        }
        tracing::debug!(from = self.name(), to = next.name(), "user operation phase");
        Ok(next)
    }
}

impl fmt::Display for UserOpPhase {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}", self.name())
    }
}
