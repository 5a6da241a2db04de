//! Decoded registry change events.

use alloy::primitives::Address;
use alloy::rpc::types::Log;
use alloy::sol_types::SolEvent;

use crate::abi::EthereumDIDRegistry::{DIDAttributeChanged, DIDDelegateChanged};
use crate::error::RegistryError;

/// A change event the registry emitted for an identity.
///
/// `previous_change` is the block number of the identity's previous change;
/// zero terminates the history walk. `valid_to` is the absolute expiry in
/// UNIX seconds — revocations record zero.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct RegistryEvent {
    pub identity: Address,
    pub payload: RegistryEventPayload,
    pub valid_to: u64,
    pub previous_change: u64,
    pub block_number: u64,
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub enum RegistryEventPayload {
    AttributeChanged { name: [u8; 32], value: Vec<u8> },
    DelegateChanged { delegate_type: [u8; 32], delegate: Address },
}

impl RegistryEvent {
    /// Decode a raw log. Logs that are neither attribute nor delegate changes
    /// yield `None` — foreign events in the same block are not an error.
    pub fn decode(log: &Log) -> Result<Option<Self>, RegistryError> {
        let Some(topic0) = log.inner.data.topics().first().copied() else {
            return Ok(None);
        };
        let block_number = log.block_number.unwrap_or(0);

        if topic0 == DIDAttributeChanged::SIGNATURE_HASH {
            let ev = DIDAttributeChanged::decode_log_data(&log.inner.data)
                .map_err(|e| RegistryError::Decode(format!("DIDAttributeChanged: {}", e)))?;
            return Ok(Some(Self {
                identity: ev.identity,
                payload: RegistryEventPayload::AttributeChanged {
                    name: ev.name.0,
                    value: ev.value.to_vec(),
                },
                valid_to: u64::try_from(ev.validTo).unwrap_or(u64::MAX),
                previous_change: u64::try_from(ev.previousChange).unwrap_or(u64::MAX),
                block_number,
            }));
        }

        if topic0 == DIDDelegateChanged::SIGNATURE_HASH {
            let ev = DIDDelegateChanged::decode_log_data(&log.inner.data)
                .map_err(|e| RegistryError::Decode(format!("DIDDelegateChanged: {}", e)))?;
            return Ok(Some(Self {
                identity: ev.identity,
                payload: RegistryEventPayload::DelegateChanged {
                    delegate_type: ev.delegateType.0,
                    delegate: ev.delegate,
                },
                valid_to: u64::try_from(ev.validTo).unwrap_or(u64::MAX),
                previous_change: u64::try_from(ev.previousChange).unwrap_or(u64::MAX),
                block_number,
            }));
        }

        Ok(None)
    }
}
