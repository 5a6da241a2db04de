//! Integration tests: the orchestrator against the mock paymaster/bundler.

use std::time::Duration;

use ethid_core::IdentityMutation;
use ethid_gasless::{GaslessOrchestrator, TxError};
use ethid_integration_tests::{dev_key, orchestrator, MockPipeline, CHAIN_ID};
use ethid_registry::{encode, RegistryEventSource};

fn attribute_call(key: &ethid_core::SigningKeySecret) -> alloy::primitives::Bytes {
    encode(
        key.address(),
        &IdentityMutation::SetAttribute {
            key: "did/svc/MessagingService".into(),
            value: "{\"type\":\"MessagingService\",\"serviceEndpoint\":\"https://messaging.example.com\"}"
                .into(),
            validity_secs: 3600,
        },
    )
}

#[tokio::test]
async fn test_submission_yields_receipt_and_chain_state() {
    let pipeline = MockPipeline::new();
    let key = dev_key();

    let receipt = orchestrator(&pipeline)
        .submit(key.address(), &key, attribute_call(&key))
        .await
        .unwrap();

    assert!(receipt.block_number > 0);
    assert!(receipt.gas_used > 0);
    // The registry's change pointer now references the inclusion block.
    let head = pipeline.change_head(key.address()).await.unwrap();
    assert_eq!(head, receipt.block_number);
}

#[tokio::test]
async fn test_sponsorship_denied_surfaces_terminal_error() {
    let pipeline = MockPipeline::new();
    pipeline.deny_sponsorship(true);
    let key = dev_key();

    let err = orchestrator(&pipeline)
        .submit(key.address(), &key, attribute_call(&key))
        .await
        .unwrap_err();

    assert!(matches!(err, TxError::SponsorshipDenied(_)));
    assert!(err.is_terminal());
    // Nothing landed on chain.
    assert_eq!(pipeline.event_count(key.address()), 0);
}

#[tokio::test]
async fn test_duplicate_submission_is_pending_not_failed() {
    let pipeline = MockPipeline::new();
    pipeline.report_duplicates(true);
    let key = dev_key();
    let orch = orchestrator(&pipeline);

    let first = orch
        .submit(key.address(), &key, attribute_call(&key))
        .await
        .unwrap();
    // Identical operation: the bundler reports it as already known and the
    // orchestrator still completes by polling the original handle.
    let second = orch
        .submit(key.address(), &key, attribute_call(&key))
        .await
        .unwrap();

    assert_eq!(first.transaction_hash, second.transaction_hash);
    assert_eq!(pipeline.event_count(key.address()), 1);
}

#[tokio::test]
async fn test_pending_timeout_then_repoll_same_handle() {
    let pipeline = MockPipeline::new();
    let key = dev_key();
    let orch = GaslessOrchestrator::new(pipeline.clone(), pipeline.clone(), CHAIN_ID)
        .with_inclusion_timeout(Duration::from_millis(50));

    pipeline.set_pending_polls(u32::MAX);
    let err = orch
        .submit(key.address(), &key, attribute_call(&key))
        .await
        .unwrap_err();

    let handle = match err {
        TxError::PendingTimeout { user_op_hash, .. } => user_op_hash,
        other => panic!("expected PendingTimeout, got {:?}", other),
    };

    // The operation eventually lands; the same handle resolves it.
    pipeline.set_pending_polls(0);
    let receipt = orch.poll_inclusion(handle).await.unwrap();
    assert!(receipt.block_number > 0);
}

#[tokio::test]
async fn test_unrecognized_call_rejected_by_bundler() {
    let pipeline = MockPipeline::new();
    let key = dev_key();

    let err = orchestrator(&pipeline)
        .submit(
            key.address(),
            &key,
            alloy::primitives::Bytes::from_static(b"\xde\xad\xbe\xef"),
        )
        .await
        .unwrap_err();

    assert!(matches!(err, TxError::InvalidOperation(_)));
}
