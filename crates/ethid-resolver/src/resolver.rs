//! DID resolution against the registry.

use std::time::{Instant, SystemTime, UNIX_EPOCH};

use async_trait::async_trait;

use ethid_core::{EthidConfig, EthrDid};
use ethid_registry::{collect_history, RegistryEventSource};

use crate::aggregate::{active_entries, DocumentBuilder};
use crate::document::DidDocument;
use crate::error::ResolutionError;
use crate::metadata::ResolutionResult;

/// Resolves DIDs to documents plus resolution metadata.
#[async_trait]
pub trait DidResolver: Send + Sync {
    /// Resolve a DID. Failures are reported in the result's metadata, not
    /// raised.
    async fn resolve(&self, did: &str) -> ResolutionResult;
}

/// Resolver that replays an identity's registry change history.
pub struct RegistryResolver<S> {
    source: S,
    chain_id: u64,
    service_prefix: String,
    public_key_prefix: String,
}

impl<S: RegistryEventSource> RegistryResolver<S> {
    pub fn new(source: S, config: &EthidConfig) -> Self {
        Self {
            source,
            chain_id: config.chain.id,
            service_prefix: config.service_key_prefix.clone(),
            public_key_prefix: config.public_key_prefix.clone(),
        }
    }

    /// Resolve to a document, propagating errors. The trait entry point
    /// wraps this into the metadata envelope.
    pub async fn try_resolve(&self, did: &str) -> Result<Resolved, ResolutionError> {
        let parsed = EthrDid::parse(did)?;
        let events = collect_history(&self.source, parsed.address()).await?;
        let now = unix_now();

        let head = events.iter().map(|e| e.block_number).max().unwrap_or(0);
        let mut builder = DocumentBuilder::new(
            &parsed,
            self.chain_id,
            &self.service_prefix,
            &self.public_key_prefix,
        );
        for event in active_entries(&events, now) {
            builder.apply(event);
        }

        tracing::debug!(did = %parsed, head, "resolved DID document");
        Ok(Resolved {
            document: builder.build(),
            version_block: head,
        })
    }
}

/// A resolved document plus the block of the identity's latest change.
pub struct Resolved {
    pub document: DidDocument,
    pub version_block: u64,
}

#[async_trait]
impl<S: RegistryEventSource> DidResolver for RegistryResolver<S> {
    async fn resolve(&self, did: &str) -> ResolutionResult {
        let started = Instant::now();
        match self.try_resolve(did).await {
            Ok(resolved) => {
                let document_metadata = if resolved.version_block > 0 {
                    serde_json::json!({ "versionId": resolved.version_block.to_string() })
                } else {
                    serde_json::Value::Object(Default::default())
                };
                ResolutionResult::success(
                    resolved.document,
                    document_metadata,
                    started.elapsed().as_millis() as u64,
                )
            }
            Err(e) => {
                tracing::warn!(did = did, error = %e, "resolution failed");
                ResolutionResult::error(
                    e.code(),
                    e.to_string(),
                    started.elapsed().as_millis() as u64,
                )
            }
        }
    }
}

fn unix_now() -> u64 {
    SystemTime::now()
        .duration_since(UNIX_EPOCH)
        .map(|d| d.as_secs())
        .unwrap_or(0)
}
