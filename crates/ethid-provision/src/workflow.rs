//! The VC-provisioning workflow.
//!
//! Attaches the credential-repository, revocation-service, and
//! universal-resolver service descriptors to an identity, each as an
//! independently committed gasless mutation, then re-resolves the document.
//! On-chain mutations are not transactional: a failure partway leaves the
//! earlier steps committed, and the returned state lets the caller resume.

use chrono::{DateTime, Utc};
use serde::Serialize;
use uuid::Uuid;

use ethid_core::validity::PRACTICALLY_INFINITE;
use ethid_core::{EthidConfig, EthrDid, IdentityMutation};
use ethid_gasless::{Bundler, GaslessOrchestrator, Paymaster, TxReceipt};
use ethid_registry::{encode, RegistryEventSource};
use ethid_resolver::{DidDocument, DidResolver, RegistryResolver};

use crate::error::ProvisionError;
use crate::saga::{ProvisionEvent, ProvisionState, ProvisionStateMachine, ProvisionStep};
use crate::wallet::WalletStore;

/// Outcome of one saga step.
#[derive(Debug, Clone, Serialize)]
pub struct StepOutcome {
    pub step: ProvisionStep,
    pub tx: Option<TxReceipt>,
    pub error: Option<String>,
}

/// Result of a provisioning run. Partial completion is a valid, resumable
/// state — `state` records how far the saga got.
#[derive(Debug, Serialize)]
pub struct VcProvisioningResult {
    pub run_id: Uuid,
    pub did: String,
    pub did_document: Option<DidDocument>,
    pub steps: Vec<StepOutcome>,
    pub state: ProvisionState,
    pub wallet_address: String,
    pub chain_name: String,
    pub finished_at: DateTime<Utc>,
}

impl VcProvisioningResult {
    /// Receipt for a completed step, if it ran in this invocation.
    pub fn receipt_for(&self, step: ProvisionStep) -> Option<&TxReceipt> {
        self.steps
            .iter()
            .find(|s| s.step == step)
            .and_then(|s| s.tx.as_ref())
    }
}

/// Runs the provisioning saga over the gasless pipeline.
pub struct VcProvisioner<P, B, S> {
    orchestrator: GaslessOrchestrator<P, B>,
    resolver: RegistryResolver<S>,
    config: EthidConfig,
}

impl<P, B, S> VcProvisioner<P, B, S>
where
    P: Paymaster,
    B: Bundler,
    S: RegistryEventSource,
{
    pub fn new(
        orchestrator: GaslessOrchestrator<P, B>,
        resolver: RegistryResolver<S>,
        config: EthidConfig,
    ) -> Self {
        Self {
            orchestrator,
            resolver,
            config,
        }
    }

    /// The DID for a custodial wallet, without touching the chain.
    pub async fn create_did<W: WalletStore>(
        &self,
        wallets: &W,
        reference: &str,
    ) -> Result<String, ProvisionError> {
        let identity = wallets.get_signing_identity(reference).await?;
        let did = EthrDid::new(self.config.chain.name.clone(), identity.address);
        tracing::info!(did = %did, "created DID");
        Ok(did.to_string())
    }

    /// Run the full saga from the start.
    ///
    /// Idempotent: re-running re-asserts the same keys, superseding the
    /// prior validity windows, and resolution still yields one entry per
    /// service type.
    pub async fn provision_for_credentials<W: WalletStore>(
        &self,
        wallets: &W,
        reference: &str,
    ) -> Result<VcProvisioningResult, ProvisionError> {
        self.resume(wallets, reference, ProvisionState::NotStarted)
            .await
    }

    /// Continue a partially completed saga from its recorded state.
    pub async fn resume<W: WalletStore>(
        &self,
        wallets: &W,
        reference: &str,
        mut state: ProvisionState,
    ) -> Result<VcProvisioningResult, ProvisionError> {
        let run_id = Uuid::now_v7();
        let identity = wallets.get_signing_identity(reference).await?;
        let did = EthrDid::new(self.config.chain.name.clone(), identity.address).to_string();
        tracing::info!(run_id = %run_id, did = %did, state = %state, "provisioning for credentials");

        let mut steps = Vec::new();
        while let Some(step) = ProvisionStateMachine::next_step(state) {
            let mutation = IdentityMutation::SetAttribute {
                key: format!("{}{}", self.config.service_key_prefix, step.service_name()),
                value: self.service_descriptor(step),
                validity_secs: PRACTICALLY_INFINITE,
            };
            mutation.validate()?;
            let call_data = encode(identity.address, &mutation);

            match self
                .orchestrator
                .submit(identity.address, &identity.key, call_data)
                .await
            {
                Ok(receipt) => {
                    tracing::info!(
                        run_id = %run_id,
                        step = %step,
                        tx_hash = %receipt.transaction_hash,
                        "provisioning step committed"
                    );
                    state = ProvisionStateMachine::transition(
                        state,
                        ProvisionEvent::StepSucceeded(step),
                    )?;
                    steps.push(StepOutcome {
                        step,
                        tx: Some(receipt),
                        error: None,
                    });
                }
                Err(e) => {
                    tracing::warn!(run_id = %run_id, step = %step, error = %e, "provisioning step failed");
                    state =
                        ProvisionStateMachine::transition(state, ProvisionEvent::StepFailed(step))?;
                    steps.push(StepOutcome {
                        step,
                        tx: None,
                        error: Some(e.to_string()),
                    });
                    // Committed steps stay committed; the caller resumes
                    // from `state`.
                    return Ok(VcProvisioningResult {
                        run_id,
                        did,
                        did_document: None,
                        steps,
                        state,
                        wallet_address: identity.address.to_string(),
                        chain_name: self.config.chain.name.clone(),
                        finished_at: Utc::now(),
                    });
                }
            }
        }

        let resolution = self.resolver.resolve(&did).await;
        Ok(VcProvisioningResult {
            run_id,
            did,
            did_document: resolution.did_document,
            steps,
            state,
            wallet_address: identity.address.to_string(),
            chain_name: self.config.chain.name.clone(),
            finished_at: Utc::now(),
        })
    }

    /// The attribute value for a step: the UTF-8 JSON service descriptor.
    fn service_descriptor(&self, step: ProvisionStep) -> String {
        let endpoint = match step {
            ProvisionStep::CredentialRepository => {
                self.config.vc_services.credential_repository.clone()
            }
            ProvisionStep::RevocationService => self.config.vc_services.revocation_service.clone(),
            // The resolver descriptor embeds enough for third parties to
            // resolve independently: endpoint, methods, chain, registry, RPC.
            ProvisionStep::UniversalResolver => serde_json::json!({
                "endpoint": self.config.vc_services.universal_resolver,
                "supportedMethods": ["ethr"],
                "ethrConfig": {
                    "network": self.config.chain.name,
                    "chainId": self.config.chain.id,
                    "registry": self.config.registry_address,
                    "rpcUrl": self.config.rpc_url,
                }
            })
            .to_string(),
        };

        serde_json::json!({
            "type": step.service_name(),
            "serviceEndpoint": endpoint,
        })
        .to_string()
    }
}
