//! Integration tests: mutations submitted through the gasless pipeline are
//! reflected by resolution, subject to supersession and expiry.

use ethid_core::{DelegateType, EthrDid, IdentityMutation};
use ethid_integration_tests::{
    dev_key, orchestrator, resolver, unix_now, MockPipeline,
};
use ethid_registry::{encode, to_bytes32, RegistryEventPayload};
use ethid_resolver::{DidResolver, ErrorCode};

fn did_of(key: &ethid_core::SigningKeySecret) -> String {
    EthrDid::new("local", key.address()).to_string()
}

async fn submit(pipeline: &MockPipeline, mutation: &IdentityMutation) {
    let key = dev_key();
    let call = encode(key.address(), mutation);
    orchestrator(pipeline)
        .submit(key.address(), &key, call)
        .await
        .expect("submission should succeed");
}

// =========================================================================
// End-to-end: mutate, then resolve
// =========================================================================

#[tokio::test]
async fn test_messaging_service_end_to_end() {
    let pipeline = MockPipeline::new();
    let key = dev_key();

    submit(
        &pipeline,
        &IdentityMutation::SetAttribute {
            key: "did/svc/MessagingService".into(),
            value: "{\"type\":\"MessagingService\",\"serviceEndpoint\":\"https://messaging.example.com\"}"
                .into(),
            validity_secs: 31_536_000,
        },
    )
    .await;

    let result = resolver(&pipeline).resolve(&did_of(&key)).await;
    let doc = result.did_document.expect("document");

    assert_eq!(doc.service.len(), 1);
    let svc = &doc.service[0];
    assert_eq!(svc.id, format!("{}#MessagingService", did_of(&key)));
    assert_eq!(svc.service_type, "MessagingService");
    assert_eq!(svc.service_endpoint, "https://messaging.example.com");
}

#[tokio::test]
async fn test_supersession_latest_value_wins() {
    let pipeline = MockPipeline::new();
    let key = dev_key();

    for endpoint in ["https://old.example.com", "https://new.example.com"] {
        submit(
            &pipeline,
            &IdentityMutation::SetAttribute {
                key: "did/svc/MessagingService".into(),
                value: format!(
                    "{{\"type\":\"MessagingService\",\"serviceEndpoint\":\"{}\"}}",
                    endpoint
                ),
                validity_secs: 3600,
            },
        )
        .await;
    }

    let result = resolver(&pipeline).resolve(&did_of(&key)).await;
    let doc = result.did_document.unwrap();

    // Never both: the later assertion supersedes.
    assert_eq!(doc.service.len(), 1);
    assert_eq!(doc.service[0].service_endpoint, "https://new.example.com");
}

#[tokio::test]
async fn test_expired_entry_no_longer_resolves() {
    let pipeline = MockPipeline::new();
    let key = dev_key();

    // A window that has already elapsed, injected directly.
    pipeline.push_event(
        key.address(),
        RegistryEventPayload::AttributeChanged {
            name: to_bytes32("did/svc/StaleService").0,
            value: b"{\"type\":\"StaleService\",\"serviceEndpoint\":\"https://stale.example.com\"}"
                .to_vec(),
        },
        unix_now().saturating_sub(10),
    );
    // A window still open.
    submit(
        &pipeline,
        &IdentityMutation::SetAttribute {
            key: "did/svc/FreshService".into(),
            value: "{\"type\":\"FreshService\",\"serviceEndpoint\":\"https://fresh.example.com\"}"
                .into(),
            validity_secs: 3600,
        },
    )
    .await;

    let result = resolver(&pipeline).resolve(&did_of(&key)).await;
    let doc = result.did_document.unwrap();

    assert!(doc.service_of_type("StaleService").is_none());
    assert!(doc.service_of_type("FreshService").is_some());
}

#[tokio::test]
async fn test_revoke_then_resolve_excludes_delegate() {
    let pipeline = MockPipeline::new();
    let key = dev_key();
    let delegate: alloy::primitives::Address =
        "0xAAAAAAAAAAAAAAAAAAAAAAAAAAAAAAAAAAAAAAAA".parse().unwrap();

    submit(
        &pipeline,
        &IdentityMutation::AddDelegate {
            delegate_type: DelegateType::SigAuth,
            delegate,
            validity_secs: 3600,
        },
    )
    .await;
    // Revoke well before the original window elapses.
    submit(
        &pipeline,
        &IdentityMutation::RevokeDelegate {
            delegate_type: DelegateType::SigAuth,
            delegate,
        },
    )
    .await;

    let result = resolver(&pipeline).resolve(&did_of(&key)).await;
    let doc = result.did_document.unwrap();

    // Only the controller reference remains.
    assert_eq!(doc.authentication.len(), 1);
    assert!(doc.authentication[0].ends_with("#controller"));
    assert_eq!(doc.verification_method.len(), 1);
}

#[tokio::test]
async fn test_delegate_before_revocation_is_visible() {
    let pipeline = MockPipeline::new();
    let key = dev_key();
    let delegate: alloy::primitives::Address =
        "0xAAAAAAAAAAAAAAAAAAAAAAAAAAAAAAAAAAAAAAAA".parse().unwrap();

    submit(
        &pipeline,
        &IdentityMutation::AddDelegate {
            delegate_type: DelegateType::SigAuth,
            delegate,
            validity_secs: 3600,
        },
    )
    .await;

    let result = resolver(&pipeline).resolve(&did_of(&key)).await;
    let doc = result.did_document.unwrap();

    assert_eq!(doc.authentication.len(), 2);
    assert_eq!(doc.verification_method.len(), 2);
}

// =========================================================================
// Resolution error shapes
// =========================================================================

#[tokio::test]
async fn test_unknown_identity_resolves_minimal_document() {
    let pipeline = MockPipeline::new();
    let result = resolver(&pipeline)
        .resolve("did:ethr:local:0xBBbBBBBbbBBBbbbBbbBbbbbBBbBbbbbBbBbbBBbB")
        .await;

    // Valid but historyless: a minimal document, not notFound.
    assert!(!result.is_error());
    let doc = result.did_document.unwrap();
    assert_eq!(doc.verification_method.len(), 1);
    assert!(doc.verification_method[0].id.ends_with("#controller"));
    assert!(doc.service.is_empty());
}

#[tokio::test]
async fn test_malformed_and_unsupported_dids() {
    let pipeline = MockPipeline::new();
    let r = resolver(&pipeline);

    let invalid = r.resolve("not-a-did").await;
    assert_eq!(invalid.did_resolution_metadata.error, Some(ErrorCode::InvalidDid));

    let unsupported = r.resolve("did:foo:bar").await;
    assert_eq!(
        unsupported.did_resolution_metadata.error,
        Some(ErrorCode::MethodNotSupported)
    );
}
