//! Integration tests: the VC-provisioning saga over the mock pipeline.

use ethid_integration_tests::{
    dev_key, orchestrator, resolver, test_config, MockPipeline, DEV_KEY,
};
use ethid_provision::{
    InMemoryWalletStore, ProvisionError, ProvisionState, ProvisionStep, VcProvisioner,
};

fn provisioner(pipeline: &MockPipeline) -> VcProvisioner<MockPipeline, MockPipeline, MockPipeline> {
    VcProvisioner::new(orchestrator(pipeline), resolver(pipeline), test_config())
}

fn wallets() -> InMemoryWalletStore {
    let mut store = InMemoryWalletStore::new();
    store.insert("wallet-1", DEV_KEY);
    store
}

#[tokio::test]
async fn test_full_saga_attaches_three_services() {
    let pipeline = MockPipeline::new();
    let result = provisioner(&pipeline)
        .provision_for_credentials(&wallets(), "wallet-1")
        .await
        .unwrap();

    assert_eq!(result.state, ProvisionState::Completed);
    assert_eq!(result.steps.len(), 3);
    for step in ProvisionStep::ALL {
        assert!(result.receipt_for(step).is_some(), "missing receipt for {}", step);
    }

    let doc = result.did_document.expect("document after completion");
    assert!(doc.service_of_type("CredentialRepository").is_some());
    assert!(doc.service_of_type("RevocationService").is_some());

    // The resolver descriptor embeds enough for independent resolution.
    let resolver_svc = doc.service_of_type("UniversalResolver").unwrap();
    let embedded: serde_json::Value =
        serde_json::from_str(&resolver_svc.service_endpoint).unwrap();
    assert_eq!(embedded["ethrConfig"]["chainId"], test_config().chain.id);
    assert_eq!(
        embedded["ethrConfig"]["registry"],
        test_config().registry_address
    );
    assert_eq!(embedded["supportedMethods"][0], "ethr");
}

#[tokio::test]
async fn test_saga_is_idempotent() {
    let pipeline = MockPipeline::new();
    let p = provisioner(&pipeline);
    let store = wallets();

    let first = p.provision_for_credentials(&store, "wallet-1").await.unwrap();
    let second = p.provision_for_credentials(&store, "wallet-1").await.unwrap();

    assert_eq!(second.state, ProvisionState::Completed);
    // Re-running re-asserts the keys: six events on chain...
    assert_eq!(pipeline.event_count(dev_key().address()), 6);
    // ...but still exactly one entry per service type.
    let doc = second.did_document.as_ref().unwrap();
    assert_eq!(doc.service.len(), 3);

    // New transactions, not replays.
    for step in ProvisionStep::ALL {
        assert_ne!(
            first.receipt_for(step).unwrap().transaction_hash,
            second.receipt_for(step).unwrap().transaction_hash
        );
    }
}

#[tokio::test]
async fn test_failure_mid_saga_returns_partial_result() {
    let pipeline = MockPipeline::new();
    pipeline.fail_submissions_matching("RevocationService");

    let result = provisioner(&pipeline)
        .provision_for_credentials(&wallets(), "wallet-1")
        .await
        .unwrap();

    assert_eq!(
        result.state,
        ProvisionState::Failed(ProvisionStep::RevocationService)
    );
    assert_eq!(result.steps.len(), 2);
    assert!(result.receipt_for(ProvisionStep::CredentialRepository).is_some());
    assert!(result.receipt_for(ProvisionStep::RevocationService).is_none());
    assert!(result.steps[1].error.is_some());
    // Step 3 was never attempted.
    assert!(result.receipt_for(ProvisionStep::UniversalResolver).is_none());
    // No rollback: step 1 stays committed.
    assert_eq!(pipeline.event_count(dev_key().address()), 1);
    assert!(result.did_document.is_none());
}

#[tokio::test]
async fn test_resume_continues_from_failed_step() {
    let pipeline = MockPipeline::new();
    let p = provisioner(&pipeline);
    let store = wallets();

    pipeline.fail_submissions_matching("RevocationService");
    let partial = p.provision_for_credentials(&store, "wallet-1").await.unwrap();
    assert_eq!(
        partial.state,
        ProvisionState::Failed(ProvisionStep::RevocationService)
    );

    pipeline.clear_submission_failures();
    let resumed = p.resume(&store, "wallet-1", partial.state).await.unwrap();

    assert_eq!(resumed.state, ProvisionState::Completed);
    // Only the two remaining steps ran in the resumed invocation.
    assert_eq!(resumed.steps.len(), 2);
    assert_eq!(resumed.steps[0].step, ProvisionStep::RevocationService);
    assert_eq!(resumed.steps[1].step, ProvisionStep::UniversalResolver);
    // Step 1 was not re-submitted: three events in total.
    assert_eq!(pipeline.event_count(dev_key().address()), 3);

    let doc = resumed.did_document.unwrap();
    assert_eq!(doc.service.len(), 3);
}

#[tokio::test]
async fn test_unknown_wallet_reference() {
    let pipeline = MockPipeline::new();
    let result = provisioner(&pipeline)
        .provision_for_credentials(&wallets(), "missing")
        .await;
    assert!(matches!(result, Err(ProvisionError::WalletNotFound(_))));
}

#[tokio::test]
async fn test_create_did_format() {
    let pipeline = MockPipeline::new();
    let did = provisioner(&pipeline)
        .create_did(&wallets(), "wallet-1")
        .await
        .unwrap();
    assert_eq!(
        did,
        format!("did:ethr:local:{}", dev_key().address())
    );
}
