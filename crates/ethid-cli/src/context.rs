//! Shared command context: configuration loading and pipeline construction.

use std::path::Path;
use std::time::Duration;

use anyhow::Context as _;

use ethid_core::{EthidConfig, SigningKeySecret};
use ethid_gasless::{GaslessOrchestrator, RpcBundler, RpcPaymaster};
use ethid_registry::RpcEventSource;
use ethid_resolver::RegistryResolver;

pub struct CliContext {
    pub config: EthidConfig,
}

impl CliContext {
    /// Load and validate configuration (TOML file, then `ETHID_*` env
    /// overrides). Missing registry address or RPC endpoint fails here.
    pub fn load(path: &Path) -> anyhow::Result<Self> {
        let config = EthidConfig::load(path)?;
        config.validate().context("configuration invalid")?;
        Ok(Self { config })
    }

    pub fn resolver(&self) -> anyhow::Result<RegistryResolver<RpcEventSource>> {
        let source = RpcEventSource::new(&self.config)?;
        Ok(RegistryResolver::new(source, &self.config))
    }

    pub fn orchestrator(&self) -> anyhow::Result<GaslessOrchestrator<RpcPaymaster, RpcBundler>> {
        let paymaster = RpcPaymaster::new(self.config.bundler_url(), self.config.chain.id)?;
        let bundler = RpcBundler::new(self.config.bundler_url(), self.config.chain.id)?;
        Ok(
            GaslessOrchestrator::new(paymaster, bundler, self.config.chain.id)
                .with_inclusion_timeout(Duration::from_secs(self.config.inclusion_timeout_secs)),
        )
    }

    /// Signing key from the `ETHID_SIGNING_KEY` environment variable.
    pub fn signing_key(&self) -> anyhow::Result<SigningKeySecret> {
        let hex = std::env::var("ETHID_SIGNING_KEY").context("ETHID_SIGNING_KEY is not set")?;
        Ok(SigningKeySecret::from_hex(&hex)?)
    }
}
