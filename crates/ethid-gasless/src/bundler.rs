//! Submission and inclusion tracking: the bundler collaborator boundary.

use async_trait::async_trait;

use alloy::primitives::{B256, U256};
use serde::Deserialize;
use url::Url;

use crate::error::TxError;
use crate::paymaster::EntryPointVersion;
use crate::rpc::{self, RpcCallError};
use crate::user_op::{TxReceipt, UserOpHash, UserOperation};

/// Outcome of a submission. A bundler that already knows the operation is
/// not a failure — the handle stays pollable.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum SubmitOutcome {
    /// Newly accepted into the mempool.
    Accepted(UserOpHash),
    /// The bundler reported a duplicate; keep polling the same handle.
    AlreadyKnown(UserOpHash),
}

impl SubmitOutcome {
    pub fn hash(&self) -> UserOpHash {
        match self {
            Self::Accepted(h) | Self::AlreadyKnown(h) => *h,
        }
    }
}

/// Accepts sponsored operations and reports inclusion.
///
/// Together with [`crate::paymaster::Paymaster`] this is the 3-stage remote
/// protocol: sponsor → submit → poll-inclusion. Submission returns the
/// handle without waiting; inclusion is observed by polling.
#[async_trait]
pub trait Bundler: Send + Sync {
    /// Submit an operation; returns the operation handle immediately.
    async fn submit(
        &self,
        op: &UserOperation,
        entry_point: EntryPointVersion,
    ) -> Result<SubmitOutcome, TxError>;

    /// Inclusion status for a submitted operation. `None` until included.
    async fn inclusion_status(&self, hash: UserOpHash) -> Result<Option<TxReceipt>, TxError>;
}

/// JSON-RPC bundler client (`eth_sendUserOperation` /
/// `eth_getUserOperationReceipt`).
pub struct RpcBundler {
    endpoint: Url,
    chain_id: u64,
    http: reqwest::Client,
}

impl RpcBundler {
    pub fn new(endpoint: &str, chain_id: u64) -> Result<Self, TxError> {
        let endpoint = endpoint
            .parse::<Url>()
            .map_err(|e| TxError::Validation(format!("bundler endpoint '{}': {}", endpoint, e)))?;
        Ok(Self {
            endpoint,
            chain_id,
            http: reqwest::Client::new(),
        })
    }

    /// Classify a bundler-reported rejection.
    ///
    /// Duplicates are pending, not failed. Nonce races between concurrent
    /// mutations for one identity are surfaced as retryable rather than
    /// terminal — the registry serializes the writes, the bundler just saw
    /// them out of order.
    fn classify_rejection(message: &str, code: i64) -> Rejection {
        let lower = message.to_ascii_lowercase();
        if lower.contains("already known") || lower.contains("duplicate") {
            Rejection::Duplicate
        } else if lower.contains("nonce") || lower.contains("aa25") {
            Rejection::NonceConflict
        } else {
            Rejection::Invalid(format!("{} (code {})", message, code))
        }
    }
}

enum Rejection {
    Duplicate,
    NonceConflict,
    Invalid(String),
}

#[derive(Deserialize)]
#[serde(rename_all = "camelCase")]
struct UserOpReceiptWire {
    receipt: TxReceiptWire,
}

#[derive(Deserialize)]
#[serde(rename_all = "camelCase")]
struct TxReceiptWire {
    transaction_hash: B256,
    block_number: U256,
    gas_used: U256,
}

impl From<UserOpReceiptWire> for TxReceipt {
    fn from(wire: UserOpReceiptWire) -> Self {
        Self {
            transaction_hash: wire.receipt.transaction_hash,
            block_number: u64::try_from(wire.receipt.block_number).unwrap_or(u64::MAX),
            gas_used: u64::try_from(wire.receipt.gas_used).unwrap_or(u64::MAX),
        }
    }
}

#[async_trait]
impl Bundler for RpcBundler {
    async fn submit(
        &self,
        op: &UserOperation,
        entry_point: EntryPointVersion,
    ) -> Result<SubmitOutcome, TxError> {
        let params = serde_json::json!([op, entry_point.address()]);
        match rpc::call::<_, B256>(&self.http, &self.endpoint, "eth_sendUserOperation", params)
            .await
        {
            Ok(hash) => Ok(SubmitOutcome::Accepted(UserOpHash(hash))),
            Err(RpcCallError::Transport(e)) => Err(TxError::TransientIO(e)),
            Err(RpcCallError::Endpoint(e)) => {
                match Self::classify_rejection(&e.message, e.code) {
                    Rejection::Duplicate => {
                        // The bundler has the operation; recompute the handle
                        // it was filed under and keep going.
                        Ok(SubmitOutcome::AlreadyKnown(
                            op.hash(entry_point, self.chain_id),
                        ))
                    }
                    Rejection::NonceConflict => Err(TxError::TransientIO(e.message)),
                    Rejection::Invalid(msg) => Err(TxError::InvalidOperation(msg)),
                }
            }
        }
    }

    async fn inclusion_status(&self, hash: UserOpHash) -> Result<Option<TxReceipt>, TxError> {
        match rpc::call::<_, Option<UserOpReceiptWire>>(
            &self.http,
            &self.endpoint,
            "eth_getUserOperationReceipt",
            [hash.0],
        )
        .await
        {
            Ok(receipt) => Ok(receipt.map(Into::into)),
            Err(RpcCallError::Transport(e)) => Err(TxError::TransientIO(e)),
            Err(RpcCallError::Endpoint(e)) => Err(TxError::TransientIO(e.message)),
        }
    }
}
