//! Stack configuration: chain, registry, endpoints, validity defaults.

use std::path::Path;
use std::str::FromStr;

use alloy::primitives::Address;
use serde::{Deserialize, Serialize};
use url::Url;

use crate::error::CoreError;
use crate::mutation::{PUBLIC_KEY_PREFIX, SERVICE_KEY_PREFIX};
use crate::validity;

/// The chain the registry contract lives on.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct ChainConfig {
    /// Network name used in DID strings (e.g. "sepolia").
    #[serde(default = "default_chain_name")]
    pub name: String,
    /// Chain id.
    #[serde(default = "default_chain_id")]
    pub id: u64,
}

/// Endpoints the VC-provisioning workflow attaches to a DID.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct VcServiceConfig {
    #[serde(default = "default_credential_repository")]
    pub credential_repository: String,
    #[serde(default = "default_revocation_service")]
    pub revocation_service: String,
    #[serde(default = "default_universal_resolver")]
    pub universal_resolver: String,
}

/// Full configuration for the ethid stack.
///
/// The registry address and RPC endpoint have no sensible defaults; anything
/// built from this config fails at construction time when they are missing.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct EthidConfig {
    #[serde(default)]
    pub chain: ChainConfig,

    /// Address of the ERC-1056 registry contract. Required.
    #[serde(default)]
    pub registry_address: String,

    /// Chain node RPC endpoint. Required.
    #[serde(default)]
    pub rpc_url: String,

    /// Paymaster/bundler endpoint. Falls back to `rpc_url` when unset — a
    /// single sponsor-aware RPC can serve all three roles.
    #[serde(default)]
    pub bundler_url: Option<String>,

    /// Default validity for mutations that do not specify one (seconds).
    #[serde(default = "default_validity_secs")]
    pub default_validity_secs: u64,

    /// Attribute-key prefix for service descriptors.
    #[serde(default = "default_service_prefix")]
    pub service_key_prefix: String,

    /// Attribute-key prefix for published public keys.
    #[serde(default = "default_public_key_prefix")]
    pub public_key_prefix: String,

    /// Deadline for the inclusion wait (seconds).
    #[serde(default = "default_inclusion_timeout")]
    pub inclusion_timeout_secs: u64,

    #[serde(default)]
    pub vc_services: VcServiceConfig,
}

fn default_chain_name() -> String {
    "sepolia".into()
}
fn default_chain_id() -> u64 {
    11_155_111
}
fn default_credential_repository() -> String {
    "https://credentials.example.com/api/v1".into()
}
fn default_revocation_service() -> String {
    "https://revocation.example.com/status-list/v1".into()
}
fn default_universal_resolver() -> String {
    "https://resolver.example.com/1.0/identifiers/".into()
}
fn default_validity_secs() -> u64 {
    validity::ONE_YEAR
}
fn default_service_prefix() -> String {
    SERVICE_KEY_PREFIX.into()
}
fn default_public_key_prefix() -> String {
    PUBLIC_KEY_PREFIX.into()
}
fn default_inclusion_timeout() -> u64 {
    30
}

impl Default for ChainConfig {
    fn default() -> Self {
        Self {
            name: default_chain_name(),
            id: default_chain_id(),
        }
    }
}

impl Default for VcServiceConfig {
    fn default() -> Self {
        Self {
            credential_repository: default_credential_repository(),
            revocation_service: default_revocation_service(),
            universal_resolver: default_universal_resolver(),
        }
    }
}

impl Default for EthidConfig {
    fn default() -> Self {
        Self {
            chain: ChainConfig::default(),
            registry_address: String::new(),
            rpc_url: String::new(),
            bundler_url: None,
            default_validity_secs: default_validity_secs(),
            service_key_prefix: default_service_prefix(),
            public_key_prefix: default_public_key_prefix(),
            inclusion_timeout_secs: default_inclusion_timeout(),
            vc_services: VcServiceConfig::default(),
        }
    }
}

impl EthidConfig {
    /// Load config from a TOML file, falling back to defaults for missing
    /// fields, then apply environment overrides.
    pub fn load(path: &Path) -> Result<Self, CoreError> {
        let mut config = if path.exists() {
            let contents = std::fs::read_to_string(path)
                .map_err(|e| CoreError::Config(format!("read {}: {}", path.display(), e)))?;
            toml::from_str(&contents)
                .map_err(|e| CoreError::Config(format!("parse {}: {}", path.display(), e)))?
        } else {
            Self::default()
        };
        config.apply_env();
        Ok(config)
    }

    /// Build from defaults plus environment overrides only.
    pub fn from_env() -> Self {
        let mut config = Self::default();
        config.apply_env();
        config
    }

    /// Apply `ETHID_*` environment overrides.
    pub fn apply_env(&mut self) {
        if let Ok(v) = std::env::var("ETHID_CHAIN_NAME") {
            self.chain.name = v;
        }
        if let Ok(v) = std::env::var("ETHID_CHAIN_ID") {
            if let Ok(id) = v.parse() {
                self.chain.id = id;
            }
        }
        if let Ok(v) = std::env::var("ETHID_REGISTRY_ADDRESS") {
            self.registry_address = v;
        }
        if let Ok(v) = std::env::var("ETHID_RPC_URL") {
            self.rpc_url = v;
        }
        if let Ok(v) = std::env::var("ETHID_BUNDLER_URL") {
            self.bundler_url = Some(v);
        }
        if let Ok(v) = std::env::var("ETHID_DEFAULT_VALIDITY_SECS") {
            if let Ok(secs) = v.parse() {
                self.default_validity_secs = secs;
            }
        }
        if let Ok(v) = std::env::var("ETHID_CREDENTIAL_REPOSITORY_ENDPOINT") {
            self.vc_services.credential_repository = v;
        }
        if let Ok(v) = std::env::var("ETHID_REVOCATION_SERVICE_ENDPOINT") {
            self.vc_services.revocation_service = v;
        }
        if let Ok(v) = std::env::var("ETHID_UNIVERSAL_RESOLVER_ENDPOINT") {
            self.vc_services.universal_resolver = v;
        }
    }

    /// Fail fast on a config nothing downstream can work with.
    pub fn validate(&self) -> Result<(), CoreError> {
        if self.registry_address.is_empty() {
            return Err(CoreError::Config("registry_address is required".into()));
        }
        Address::from_str(&self.registry_address).map_err(|e| {
            CoreError::Config(format!(
                "registry_address '{}' is not an address: {}",
                self.registry_address, e
            ))
        })?;
        if self.rpc_url.is_empty() {
            return Err(CoreError::Config("rpc_url is required".into()));
        }
        Url::parse(&self.rpc_url)
            .map_err(|e| CoreError::Config(format!("rpc_url '{}': {}", self.rpc_url, e)))?;
        if let Some(bundler) = &self.bundler_url {
            Url::parse(bundler)
                .map_err(|e| CoreError::Config(format!("bundler_url '{}': {}", bundler, e)))?;
        }
        Ok(())
    }

    /// Parsed registry contract address. Call `validate` first.
    pub fn registry_address(&self) -> Result<Address, CoreError> {
        Address::from_str(&self.registry_address)
            .map_err(|e| CoreError::Config(format!("registry_address: {}", e)))
    }

    /// Effective bundler endpoint.
    pub fn bundler_url(&self) -> &str {
        self.bundler_url.as_deref().unwrap_or(&self.rpc_url)
    }
}
