//! Drives registry calls through the sponsored user-operation pipeline.

use std::time::{Duration, Instant};

use alloy::primitives::{Address, Bytes};
use alloy::signers::SignerSync;

use ethid_core::SigningKeySecret;

use crate::account::{SmartAccount, DEFAULT_ACCOUNT_FACTORY};
use crate::bundler::{Bundler, SubmitOutcome};
use crate::error::TxError;
use crate::paymaster::{EntryPointVersion, Paymaster};
use crate::user_op::{TxReceipt, UserOpHash, UserOpPhase, UserOperation};

const INITIAL_POLL_DELAY: Duration = Duration::from_secs(1);
const MAX_POLL_DELAY: Duration = Duration::from_secs(8);

/// Turns one registry call into a confirmed on-chain transaction without the
/// identity holding funds.
///
/// The pipeline: derive the smart account for the signing key, request
/// sponsorship from the paymaster, submit to the bundler, then poll for
/// inclusion under a deadline. Once submitted, an operation cannot be locally
/// cancelled; the only cancellable stage is before submission.
pub struct GaslessOrchestrator<P, B> {
    paymaster: P,
    bundler: B,
    chain_id: u64,
    factory: Address,
    entry_point: EntryPointVersion,
    inclusion_timeout: Duration,
}

impl<P: Paymaster, B: Bundler> GaslessOrchestrator<P, B> {
    pub fn new(paymaster: P, bundler: B, chain_id: u64) -> Self {
        Self {
            paymaster,
            bundler,
            chain_id,
            factory: DEFAULT_ACCOUNT_FACTORY,
            entry_point: EntryPointVersion::default(),
            inclusion_timeout: Duration::from_secs(30),
        }
    }

    /// Override the inclusion-wait deadline.
    pub fn with_inclusion_timeout(mut self, timeout: Duration) -> Self {
        self.inclusion_timeout = timeout;
        self
    }

    /// Override the account factory.
    pub fn with_factory(mut self, factory: Address) -> Self {
        self.factory = factory;
        self
    }

    /// Submit a registry call as a sponsored operation and wait for
    /// inclusion.
    ///
    /// The signing key is used for the duration of this call only — it is
    /// neither retained nor logged. On a pending timeout the operation
    /// handle rides in the error so the caller can [`Self::poll_inclusion`]
    /// later instead of resubmitting.
    pub async fn submit(
        &self,
        identity: Address,
        key: &SigningKeySecret,
        call_data: Bytes,
    ) -> Result<TxReceipt, TxError> {
        if call_data.is_empty() {
            return Err(TxError::Validation("empty call data".into()));
        }

        let account = SmartAccount::derive(key.address(), self.factory);
        tracing::debug!(
            identity = %identity,
            sender = %account.address,
            "building sponsored operation"
        );

        let mut op = UserOperation::build(account.address, call_data);
        let phase = UserOpPhase::Built;

        let sponsorship = self.paymaster.sponsor(&op, self.entry_point).await?;
        op.paymaster_and_data = sponsorship.paymaster_and_data;
        let phase = phase.transition(UserOpPhase::Sponsored)?;

        let op_hash = op.hash(self.entry_point, self.chain_id);
        let signature = key
            .signer()
            .sign_hash_sync(&op_hash.0)
            .map_err(|e| TxError::Signing(e.to_string()))?;
        op.signature = Bytes::from(signature.as_bytes().to_vec());

        let outcome = self.bundler.submit(&op, self.entry_point).await?;
        if let SubmitOutcome::AlreadyKnown(hash) = outcome {
            tracing::warn!(
                user_op_hash = %hash,
                "bundler already knows the operation; treating as pending"
            );
        }
        let handle = outcome.hash();
        let phase = phase.transition(UserOpPhase::Submitted(handle))?;

        let receipt = self.poll_inclusion(handle).await?;
        phase.transition(UserOpPhase::Included(receipt.clone()))?;

        tracing::info!(
            identity = %identity,
            user_op_hash = %handle,
            tx_hash = %receipt.transaction_hash,
            block = receipt.block_number,
            gas_used = receipt.gas_used,
            "operation included"
        );
        Ok(receipt)
    }

    /// Poll the bundler until the operation is included or the deadline
    /// passes. Exponential backoff between polls; transient bundler errors
    /// consume the deadline rather than aborting the wait.
    pub async fn poll_inclusion(&self, hash: UserOpHash) -> Result<TxReceipt, TxError> {
        let started = Instant::now();
        let mut delay = INITIAL_POLL_DELAY;

        loop {
            match self.bundler.inclusion_status(hash).await {
                Ok(Some(receipt)) => return Ok(receipt),
                Ok(None) => {}
                Err(e) if e.is_retryable() => {
                    tracing::warn!(user_op_hash = %hash, error = %e, "inclusion poll failed");
                }
                Err(e) => return Err(e),
            }

            if started.elapsed() + delay > self.inclusion_timeout {
                return Err(TxError::PendingTimeout {
                    user_op_hash: hash,
                    waited_secs: started.elapsed().as_secs(),
                });
            }
            tokio::time::sleep(delay).await;
            delay = (delay * 2).min(MAX_POLL_DELAY);
        }
    }
}
