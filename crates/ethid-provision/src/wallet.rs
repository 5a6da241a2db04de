//! Wallet-store collaborator boundary.

use std::collections::HashMap;

use async_trait::async_trait;

use alloy::primitives::Address;
use ethid_core::SigningKeySecret;

use crate::error::ProvisionError;

/// Signing material for one identity, handed out for the duration of a
/// single call.
pub struct SigningIdentity {
    pub address: Address,
    pub key: SigningKeySecret,
}

/// Read-only access to custodial wallet records.
///
/// Implementations must scope the secret to the call — never persist it
/// past the return, never log it, never echo it back.
#[async_trait]
pub trait WalletStore: Send + Sync {
    async fn get_signing_identity(&self, reference: &str)
        -> Result<SigningIdentity, ProvisionError>;
}

/// In-memory wallet store keyed by reference. Used by tests and the CLI;
/// production deployments sit behind a real store.
#[derive(Default)]
pub struct InMemoryWalletStore {
    keys: HashMap<String, String>,
}

impl InMemoryWalletStore {
    pub fn new() -> Self {
        Self::default()
    }

    /// Register a hex-encoded signing key under a reference.
    pub fn insert(&mut self, reference: impl Into<String>, key_hex: impl Into<String>) {
        self.keys.insert(reference.into(), key_hex.into());
    }
}

#[async_trait]
impl WalletStore for InMemoryWalletStore {
    async fn get_signing_identity(
        &self,
        reference: &str,
    ) -> Result<SigningIdentity, ProvisionError> {
        let key_hex = self
            .keys
            .get(reference)
            .ok_or_else(|| ProvisionError::WalletNotFound(reference.to_string()))?;
        let key = SigningKeySecret::from_hex(key_hex)?;
        Ok(SigningIdentity {
            address: key.address(),
            key,
        })
    }
}
