//! Architectural Contract Test: Fail-Fast Error Propagation
//!
//! This test verifies that only the two absence signals are absorbed by the
//! binder; everything else reaches the caller unchanged and unretried.
//!
//! Constraints verified:
//! - Transport failures surface verbatim (same variant, same message)
//! - A failing benign read does not trigger a registry deployment
//! - Failures are not retried: each failing operation is attempted once
//! - Absence at a step that cannot provision is an error, not a silent pass
//! - A known registry address that turns out empty is never replaced
//! - Invalid requests are rejected before any network access

mod common;

use common::*;
use namebind_core::chain::ChainOp;
use namebind_core::{
    Address, BindRequest, BinderConfig, BinderEvent, ContractArtifact, Error, MemoryChain,
    NameBinder, NameHasher, Namehash,
};

#[tokio::test]
async fn failing_benign_read_is_not_mistaken_for_a_missing_registry() {
    let chain = MemoryChain::new();
    chain.fail_next(ChainOp::Owner, "connection refused").await;

    let (binder, _event_rx) = binder_on(&chain, BinderConfig::default());
    let err = binder
        .set_address(&BindRequest::new("alice", target(), deployer()))
        .await
        .unwrap_err();

    assert!(matches!(err, Error::Transport(ref m) if m == "connection refused"));
    assert_eq!(chain.deploy_count().await, 0);
    assert_eq!(binder.registry_address().await, None);
}

#[tokio::test]
async fn registry_override_without_contract_fails() {
    let chain = MemoryChain::new();
    let missing = Address::from_low_u64(0x404);

    let (binder, _event_rx) = binder_on(&chain, BinderConfig::new().with_registry_address(missing));
    let err = binder
        .set_address(&BindRequest::new("alice", target(), deployer()))
        .await
        .unwrap_err();

    assert!(matches!(err, Error::Transport(_)));
    assert!(err.to_string().contains(&missing.to_string()));
    assert_eq!(chain.deploy_count().await, 0);
}

#[tokio::test]
async fn missing_override_registry_is_a_config_error_every_time() {
    let chain = MemoryChain::new();
    let missing = Address::from_low_u64(0x404);

    let (binder, _event_rx) = NameBinder::new(
        Box::new(MissingRegistryConnector::new(chain.clone(), missing)),
        Box::new(chain.clone()),
        Box::new(Namehash),
        BinderConfig::new().with_registry_address(missing),
    )
    .unwrap();
    let request = BindRequest::new("alice", target(), deployer());

    for _ in 0..3 {
        let err = binder.set_address(&request).await.unwrap_err();
        assert!(matches!(err, Error::Config(_)), "{:?}", err);
        assert!(err.to_string().contains(&missing.to_string()));
    }

    assert_eq!(chain.deploy_count().await, 0);
    assert_eq!(binder.registry_address().await, Some(missing));
}

#[tokio::test]
async fn vanished_deployed_registry_is_not_redeployed() {
    let chain = MemoryChain::new();
    // First address the chain hands out
    let first_contract = Address::from_low_u64(0xC0DE_0001);

    let (binder, _event_rx) = NameBinder::new(
        Box::new(MissingRegistryConnector::new(chain.clone(), first_contract)),
        Box::new(chain.clone()),
        Box::new(Namehash),
        BinderConfig::default(),
    )
    .unwrap();
    let request = BindRequest::new("alice", target(), deployer());

    // The deploy lands, then the claim cannot reach the registry
    binder.set_address(&request).await.unwrap_err();
    assert_eq!(binder.registry_address().await, Some(first_contract));

    let err = binder.set_address(&request).await.unwrap_err();
    assert!(matches!(
        err,
        Error::UnexpectedAbsence { query: "registry", ref name } if name == "alice"
    ));
    assert_eq!(chain.deploy_count_of(ContractArtifact::Registry).await, 1);
}

#[tokio::test]
async fn failed_registry_deploy_is_not_remembered() {
    let chain = MemoryChain::new();
    chain.fail_next(ChainOp::Deploy, "out of gas").await;

    let (binder, mut event_rx) = binder_on(&chain, BinderConfig::default());
    let request = BindRequest::new("alice", target(), deployer());

    let err = binder.set_address(&request).await.unwrap_err();
    assert!(matches!(err, Error::Transport(ref m) if m == "out of gas"));
    assert_eq!(binder.registry_address().await, None);

    let events = drain_events(&mut event_rx);
    assert_eq!(
        events,
        vec![BinderEvent::BindFailed {
            name: "alice".to_string(),
            error: "Transport error: out of gas".to_string(),
        }]
    );

    // The caller decides to retry; the retry provisions from scratch
    let report = binder.set_address(&request).await.expect("retry succeeds");
    assert!(report.registry_deployed);
    assert_eq!(chain.deploy_count_of(ContractArtifact::Registry).await, 1);
}

#[tokio::test]
async fn resolver_read_failure_stops_before_provisioning() {
    let (chain, registry) = chain_with_registry().await;
    chain
        .seed_owner(registry, Namehash.node("alice"), deployer())
        .await;
    chain.fail_next(ChainOp::Resolver, "malformed response").await;

    let (binder, _event_rx) = binder_on(&chain, BinderConfig::default());
    let err = binder
        .set_address(&BindRequest::new("alice", target(), deployer()))
        .await
        .unwrap_err();

    assert!(matches!(err, Error::Transport(ref m) if m == "malformed response"));
    assert_eq!(chain.deploy_count().await, 0);
}

#[tokio::test]
async fn failed_resolver_attach_is_reported_once() {
    let (chain, registry) = chain_with_registry().await;
    chain
        .seed_owner(registry, Namehash.node("alice"), deployer())
        .await;
    chain.fail_next(ChainOp::SetResolver, "execution reverted").await;

    let (binder, _event_rx) = binder_on(&chain, BinderConfig::default());
    let err = binder
        .set_address(&BindRequest::new("alice", target(), deployer()))
        .await
        .unwrap_err();

    assert!(matches!(err, Error::Transport(ref m) if m == "execution reverted"));
    // The resolver deployed before the failure stays on-chain
    assert_eq!(chain.deploy_count_of(ContractArtifact::PublicResolver).await, 1);
    assert_eq!(chain.write_count().await, 0);
}

#[tokio::test]
async fn absence_after_provisioning_is_an_error() {
    let connector = VanishingRegistryConnector::new();
    let deployer_double = CountingDeployer::new();

    let (binder, _event_rx) = NameBinder::new(
        Box::new(VanishingRegistryConnector::sharing_counters_with(&connector)),
        Box::new(CountingDeployer::sharing_counters_with(&deployer_double)),
        Box::new(Namehash),
        BinderConfig::default(),
    )
    .unwrap();

    let err = binder
        .set_address(&BindRequest::new("alice", target(), deployer()))
        .await
        .unwrap_err();

    assert!(matches!(
        err,
        Error::UnexpectedAbsence { query: "owner", ref name } if name == "alice"
    ));
    // One registry deploy, one claim, then the owner read came back empty
    assert_eq!(deployer_double.deploy_call_count(), 1);
    assert_eq!(connector.write_call_count(), 1);
}

#[tokio::test]
async fn invalid_requests_touch_nothing() {
    let chain = MemoryChain::new();
    let (binder, _event_rx) = binder_on(&chain, BinderConfig::default());

    for request in [
        BindRequest::new("", target(), deployer()),
        BindRequest::new("alice..eth", target(), deployer()),
        BindRequest::new("alice", target(), Address::ZERO),
    ] {
        let err = binder.set_address(&request).await.unwrap_err();
        assert!(matches!(err, Error::InvalidInput(_)), "{:?}", err);
    }

    assert!(chain.transactions().await.is_empty());
}
