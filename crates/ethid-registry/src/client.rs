//! Read access to an identity's registry change history.

use async_trait::async_trait;

use alloy::primitives::Address;
use alloy::providers::{Provider, ProviderBuilder};
use alloy::rpc::types::Filter;
use url::Url;

use ethid_core::EthidConfig;

use crate::abi::EthereumDIDRegistry;
use crate::error::RegistryError;
use crate::events::RegistryEvent;

/// Source of registry change events for a single identity.
///
/// The resolver walks history through this boundary; tests substitute an
/// in-memory implementation.
#[async_trait]
pub trait RegistryEventSource: Send + Sync {
    /// Block number of the identity's most recent change; zero means the
    /// identity has no chain history.
    async fn change_head(&self, identity: Address) -> Result<u64, RegistryError>;

    /// Change events the registry emitted for the identity at the given block.
    async fn events_at(&self, identity: Address, block: u64)
        -> Result<Vec<RegistryEvent>, RegistryError>;
}

/// Walk the identity's change chain backward from the head, following each
/// event's `previous_change` pointer until it reaches zero. Events are
/// returned oldest-first.
pub async fn collect_history<S: RegistryEventSource + ?Sized>(
    source: &S,
    identity: Address,
) -> Result<Vec<RegistryEvent>, RegistryError> {
    let mut events = Vec::new();
    let mut block = source.change_head(identity).await?;

    while block != 0 {
        let batch = source.events_at(identity, block).await?;
        let prev = batch.iter().map(|e| e.previous_change).min().unwrap_or(0);
        events.extend(batch);
        // The pointer must strictly decrease; a chain that does not would
        // never terminate.
        if prev >= block {
            break;
        }
        block = prev;
    }

    events.sort_by_key(|e| e.block_number);
    tracing::debug!(
        identity = %identity,
        events = events.len(),
        "collected registry history"
    );
    Ok(events)
}

/// Event source backed by a chain node over HTTP.
///
/// Providers are created per call and not cached (stateless, one RPC
/// connection per operation).
pub struct RpcEventSource {
    registry: Address,
    rpc_url: Url,
}

impl RpcEventSource {
    /// Build from configuration. Fails fast on a missing or malformed
    /// registry address or RPC endpoint.
    pub fn new(config: &EthidConfig) -> Result<Self, RegistryError> {
        let registry = config
            .registry_address()
            .map_err(|e| RegistryError::InvalidAddress(e.to_string()))?;
        let rpc_url = config
            .rpc_url
            .parse::<Url>()
            .map_err(|e| RegistryError::InvalidEndpoint(format!("{}: {}", config.rpc_url, e)))?;
        Ok(Self { registry, rpc_url })
    }

    fn provider(&self) -> impl Provider {
        ProviderBuilder::new().connect_http(self.rpc_url.clone())
    }
}

#[async_trait]
impl RegistryEventSource for RpcEventSource {
    async fn change_head(&self, identity: Address) -> Result<u64, RegistryError> {
        let provider = self.provider();
        let registry = EthereumDIDRegistry::new(self.registry, &provider);
        let head = registry
            .changed(identity)
            .call()
            .await
            .map_err(|e| RegistryError::Rpc(e.to_string()))?;
        Ok(u64::try_from(head).unwrap_or(u64::MAX))
    }

    async fn events_at(
        &self,
        identity: Address,
        block: u64,
    ) -> Result<Vec<RegistryEvent>, RegistryError> {
        let filter = Filter::new()
            .address(self.registry)
            .from_block(block)
            .to_block(block)
            .topic1(identity.into_word());

        let logs = self
            .provider()
            .get_logs(&filter)
            .await
            .map_err(|e| RegistryError::Rpc(e.to_string()))?;

        let mut events = Vec::with_capacity(logs.len());
        for log in &logs {
            if let Some(event) = RegistryEvent::decode(log)? {
                events.push(event);
            }
        }
        Ok(events)
    }
}
