//! Shared test doubles for the integration tests.
//!
//! [`MockPipeline`] plays all three remote roles at once — registry event
//! source, paymaster, and bundler. Submitted operations are decoded and
//! applied to in-memory registry state immediately, so mutations made
//! through the orchestrator are visible to the resolver in the same test.

use std::collections::HashMap;
use std::sync::{Arc, Mutex};
use std::time::{SystemTime, UNIX_EPOCH};

use async_trait::async_trait;

use alloy::primitives::{keccak256, Address, Bytes, U256};
use alloy::sol_types::SolCall;

use ethid_gasless::{
    Bundler, EntryPointVersion, Paymaster, SponsorshipData, SubmitOutcome, TxError, TxReceipt,
    UserOpHash, UserOperation,
};
use ethid_registry::abi::EthereumDIDRegistry::{
    addDelegateCall, revokeDelegateCall, setAttributeCall,
};
use ethid_registry::{
    bytes32_to_string, RegistryError, RegistryEvent, RegistryEventPayload, RegistryEventSource,
};

/// Chain id the mock pipeline reports.
pub const CHAIN_ID: u64 = 31_337;

/// Anvil's first well-known development key.
pub const DEV_KEY: &str = "0xac0974bec39a17e36ba4a6b4d238ff944bacb478cbed5efcae784d7bf4f2ff80";

/// Configuration pointing at the mock pipeline's chain.
pub fn test_config() -> ethid_core::EthidConfig {
    ethid_core::EthidConfig {
        chain: ethid_core::ChainConfig {
            name: "local".into(),
            id: CHAIN_ID,
        },
        registry_address: "0x03d5003bf0e79c5f5223588f347eba39afbc3818".into(),
        rpc_url: "http://127.0.0.1:8545".into(),
        ..ethid_core::EthidConfig::default()
    }
}

/// Orchestrator wired to the mock pipeline, with a short inclusion deadline.
pub fn orchestrator(
    pipeline: &MockPipeline,
) -> ethid_gasless::GaslessOrchestrator<MockPipeline, MockPipeline> {
    ethid_gasless::GaslessOrchestrator::new(pipeline.clone(), pipeline.clone(), CHAIN_ID)
        .with_inclusion_timeout(std::time::Duration::from_secs(2))
}

/// Resolver wired to the mock pipeline.
pub fn resolver(pipeline: &MockPipeline) -> ethid_resolver::RegistryResolver<MockPipeline> {
    ethid_resolver::RegistryResolver::new(pipeline.clone(), &test_config())
}

/// Signing key for the development identity.
pub fn dev_key() -> ethid_core::SigningKeySecret {
    ethid_core::SigningKeySecret::from_hex(DEV_KEY).expect("well-known dev key")
}

/// Current UNIX time in seconds.
pub fn unix_now() -> u64 {
    SystemTime::now()
        .duration_since(UNIX_EPOCH)
        .map(|d| d.as_secs())
        .unwrap_or(0)
}

#[derive(Default)]
struct ChainState {
    head: HashMap<Address, u64>,
    blocks: HashMap<(Address, u64), Vec<RegistryEvent>>,
    next_block: u64,
    receipts: HashMap<UserOpHash, TxReceipt>,
    deny_sponsorship: bool,
    fail_submit_matching: Option<String>,
    report_duplicates: bool,
    pending_polls: u32,
}

impl ChainState {
    fn apply(&mut self, op: &UserOperation, hash: UserOpHash) -> Result<TxReceipt, TxError> {
        let data = op.call_data.as_ref();
        let now = unix_now();

        let (identity, payload, valid_to) = if let Ok(call) = setAttributeCall::abi_decode(data) {
            (
                call.identity,
                RegistryEventPayload::AttributeChanged {
                    name: call.name.0,
                    value: call.value.to_vec(),
                },
                now.saturating_add(u64::try_from(call.validity).unwrap_or(u64::MAX)),
            )
        } else if let Ok(call) = addDelegateCall::abi_decode(data) {
            (
                call.identity,
                RegistryEventPayload::DelegateChanged {
                    delegate_type: call.delegateType.0,
                    delegate: call.delegate,
                },
                now.saturating_add(u64::try_from(call.validity).unwrap_or(u64::MAX)),
            )
        } else if let Ok(call) = revokeDelegateCall::abi_decode(data) {
            (
                call.identity,
                RegistryEventPayload::DelegateChanged {
                    delegate_type: call.delegateType.0,
                    delegate: call.delegate,
                },
                // Revocation closes the window on the spot.
                0,
            )
        } else {
            return Err(TxError::InvalidOperation(
                "unrecognized registry call".into(),
            ));
        };

        self.next_block += 1;
        let block = self.next_block;
        let previous_change = self.head.get(&identity).copied().unwrap_or(0);

        self.blocks.entry((identity, block)).or_default().push(RegistryEvent {
            identity,
            payload,
            valid_to,
            previous_change,
            block_number: block,
        });
        self.head.insert(identity, block);

        let mut seed = Vec::with_capacity(40);
        seed.extend_from_slice(hash.0.as_slice());
        seed.extend_from_slice(&block.to_be_bytes());
        Ok(TxReceipt {
            transaction_hash: keccak256(&seed),
            block_number: block,
            gas_used: 60_000,
        })
    }
}

/// In-memory registry + paymaster + bundler.
#[derive(Clone, Default)]
pub struct MockPipeline {
    state: Arc<Mutex<ChainState>>,
}

impl MockPipeline {
    pub fn new() -> Self {
        Self::default()
    }

    /// Make the paymaster refuse sponsorship.
    pub fn deny_sponsorship(&self, deny: bool) {
        self.state.lock().unwrap().deny_sponsorship = deny;
    }

    /// Reject submissions whose attribute key contains `pattern`.
    pub fn fail_submissions_matching(&self, pattern: &str) {
        self.state.lock().unwrap().fail_submit_matching = Some(pattern.to_string());
    }

    pub fn clear_submission_failures(&self) {
        self.state.lock().unwrap().fail_submit_matching = None;
    }

    /// Report resubmissions of a known operation as duplicates.
    pub fn report_duplicates(&self, enable: bool) {
        self.state.lock().unwrap().report_duplicates = enable;
    }

    /// Answer the next `n` inclusion polls with "not yet".
    pub fn set_pending_polls(&self, n: u32) {
        self.state.lock().unwrap().pending_polls = n;
    }

    /// Inject a raw event, bypassing the pipeline. Lets tests place entries
    /// with windows already elapsed.
    pub fn push_event(&self, identity: Address, payload: RegistryEventPayload, valid_to: u64) {
        let mut state = self.state.lock().unwrap();
        state.next_block += 1;
        let block = state.next_block;
        let previous_change = state.head.get(&identity).copied().unwrap_or(0);
        state.blocks.entry((identity, block)).or_default().push(RegistryEvent {
            identity,
            payload,
            valid_to,
            previous_change,
            block_number: block,
        });
        state.head.insert(identity, block);
    }

    /// Total change events recorded for an identity.
    pub fn event_count(&self, identity: Address) -> usize {
        let state = self.state.lock().unwrap();
        state
            .blocks
            .iter()
            .filter(|((who, _), _)| *who == identity)
            .map(|(_, events)| events.len())
            .sum()
    }
}

#[async_trait]
impl RegistryEventSource for MockPipeline {
    async fn change_head(&self, identity: Address) -> Result<u64, RegistryError> {
        Ok(self
            .state
            .lock()
            .unwrap()
            .head
            .get(&identity)
            .copied()
            .unwrap_or(0))
    }

    async fn events_at(
        &self,
        identity: Address,
        block: u64,
    ) -> Result<Vec<RegistryEvent>, RegistryError> {
        Ok(self
            .state
            .lock()
            .unwrap()
            .blocks
            .get(&(identity, block))
            .cloned()
            .unwrap_or_default())
    }
}

#[async_trait]
impl Paymaster for MockPipeline {
    async fn sponsor(
        &self,
        _op: &UserOperation,
        _entry_point: EntryPointVersion,
    ) -> Result<SponsorshipData, TxError> {
        if self.state.lock().unwrap().deny_sponsorship {
            return Err(TxError::SponsorshipDenied("test policy".into()));
        }
        Ok(SponsorshipData {
            paymaster_and_data: Bytes::from_static(b"\x01"),
            call_gas_limit: U256::from(200_000u64),
            verification_gas_limit: U256::from(150_000u64),
            pre_verification_gas: U256::from(21_000u64),
        })
    }
}

#[async_trait]
impl Bundler for MockPipeline {
    async fn submit(
        &self,
        op: &UserOperation,
        entry_point: EntryPointVersion,
    ) -> Result<SubmitOutcome, TxError> {
        let mut state = self.state.lock().unwrap();
        let hash = op.hash(entry_point, CHAIN_ID);

        if let Some(pattern) = state.fail_submit_matching.clone() {
            if let Ok(call) = setAttributeCall::abi_decode(op.call_data.as_ref()) {
                let key = bytes32_to_string(&call.name.0);
                if key.contains(&pattern) {
                    return Err(TxError::InvalidOperation(format!(
                        "rejected by test double: {}",
                        key
                    )));
                }
            }
        }

        if state.report_duplicates && state.receipts.contains_key(&hash) {
            return Ok(SubmitOutcome::AlreadyKnown(hash));
        }

        let receipt = state.apply(op, hash)?;
        state.receipts.insert(hash, receipt);
        Ok(SubmitOutcome::Accepted(hash))
    }

    async fn inclusion_status(&self, hash: UserOpHash) -> Result<Option<TxReceipt>, TxError> {
        let mut state = self.state.lock().unwrap();
        if state.pending_polls > 0 {
            state.pending_polls -= 1;
            return Ok(None);
        }
        Ok(state.receipts.get(&hash).cloned())
    }
}
