//! Gas sponsorship: the paymaster collaborator boundary.

use async_trait::async_trait;

use alloy::primitives::{address, Address, Bytes, U256};
use serde::{Deserialize, Serialize};
use url::Url;

use crate::error::TxError;
use crate::rpc::{self, RpcCallError};
use crate::user_op::UserOperation;

/// Entry-point contract versions the pipeline can target. Sponsorship and
/// submission are keyed by chain + entry-point version.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub enum EntryPointVersion {
    V0_6,
    #[default]
    V0_7,
}

impl EntryPointVersion {
    /// Canonical entry-point deployment for this version.
    pub fn address(&self) -> Address {
        match self {
            Self::V0_6 => address!("0x5FF137D4b0FDCD49DcA30c7CF57E578a026d2789"),
            Self::V0_7 => address!("0x0000000071727De22E5E9d8BAf0edAc6f37da032"),
        }
    }

    pub fn as_str(&self) -> &'static str {
        match self {
            Self::V0_6 => "0.6",
            Self::V0_7 => "0.7",
        }
    }
}

/// Sponsorship data the paymaster attaches to an operation.
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct SponsorshipData {
    pub paymaster_and_data: Bytes,
    #[serde(default)]
    pub call_gas_limit: U256,
    #[serde(default)]
    pub verification_gas_limit: U256,
    #[serde(default)]
    pub pre_verification_gas: U256,
}

/// Requests gas sponsorship for pending user operations.
#[async_trait]
pub trait Paymaster: Send + Sync {
    async fn sponsor(
        &self,
        op: &UserOperation,
        entry_point: EntryPointVersion,
    ) -> Result<SponsorshipData, TxError>;
}

/// JSON-RPC paymaster client (`pm_sponsorUserOperation`).
pub struct RpcPaymaster {
    endpoint: Url,
    chain_id: u64,
    http: reqwest::Client,
}

impl RpcPaymaster {
    pub fn new(endpoint: &str, chain_id: u64) -> Result<Self, TxError> {
        let endpoint = endpoint
            .parse::<Url>()
            .map_err(|e| TxError::Validation(format!("paymaster endpoint '{}': {}", endpoint, e)))?;
        Ok(Self {
            endpoint,
            chain_id,
            http: reqwest::Client::new(),
        })
    }
}

#[derive(Serialize)]
#[serde(rename_all = "camelCase")]
struct SponsorParams<'a> {
    user_operation: &'a UserOperation,
    entry_point: Address,
    chain_id: u64,
}

#[async_trait]
impl Paymaster for RpcPaymaster {
    async fn sponsor(
        &self,
        op: &UserOperation,
        entry_point: EntryPointVersion,
    ) -> Result<SponsorshipData, TxError> {
        let params = SponsorParams {
            user_operation: op,
            entry_point: entry_point.address(),
            chain_id: self.chain_id,
        };

        match rpc::call(&self.http, &self.endpoint, "pm_sponsorUserOperation", [params]).await {
            Ok(data) => Ok(data),
            Err(RpcCallError::Transport(e)) => Err(TxError::TransientIO(e)),
            // The paymaster answered and said no. Terminal until the request changes.
            Err(RpcCallError::Endpoint(e)) => Err(TxError::SponsorshipDenied(format!(
                "{} (code {})",
                e.message, e.code
            ))),
        }
    }
}
