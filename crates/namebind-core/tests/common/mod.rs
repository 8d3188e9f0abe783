//! Test doubles and common utilities for binder contract tests
//!
//! Most tests drive the binder against a `MemoryChain`; the doubles here
//! wrap or replace its collaborators to observe what the binder asks for.

#![allow(dead_code)]

use async_trait::async_trait;
use namebind_core::error::Result;
use namebind_core::traits::{ContractDeployer, RegistryClient, RegistryConnector};
use namebind_core::types::{Address, ContractArtifact, ContractHandle, LabelHash, Lookup, Node};
use namebind_core::{BinderConfig, BinderEvent, MemoryChain, NameBinder, Namehash};
use std::sync::atomic::{AtomicUsize, Ordering};
use std::sync::{Arc, Mutex};
use tokio::sync::mpsc;

/// Account that deploys contracts and owns names in most scenarios
pub fn deployer() -> Address {
    Address::from_low_u64(0xd00d)
}

/// Target address used across scenarios
pub fn target() -> Address {
    Address::from_low_u64(0xaaa)
}

/// Build a binder whose collaborators are all `chain`
pub fn binder_on(chain: &MemoryChain, config: BinderConfig) -> (NameBinder, mpsc::Receiver<BinderEvent>) {
    NameBinder::new(
        Box::new(chain.clone()),
        Box::new(chain.clone()),
        Box::new(Namehash),
        config,
    )
    .expect("binder construction succeeds")
}

/// A chain with a default registry whose root is owned by `deployer()`
pub async fn chain_with_registry() -> (MemoryChain, Address) {
    let chain = MemoryChain::new();
    let registry = chain.install_registry(deployer()).await;
    chain.set_default_registry(Some(registry)).await;
    (chain, registry)
}

/// Drain every event currently queued
pub fn drain_events(rx: &mut mpsc::Receiver<BinderEvent>) -> Vec<BinderEvent> {
    let mut events = Vec::new();
    while let Ok(event) = rx.try_recv() {
        events.push(event);
    }
    events
}

/// A connector that records every registry address it is asked to bind
pub struct RecordingConnector {
    inner: MemoryChain,
    bindings: Arc<Mutex<Vec<Option<Address>>>>,
}

impl RecordingConnector {
    pub fn new(inner: MemoryChain) -> Self {
        Self {
            inner,
            bindings: Arc::new(Mutex::new(Vec::new())),
        }
    }

    /// Create a connector that shares its record with an existing one
    pub fn sharing_record_with(other: &Self) -> Self {
        Self {
            inner: other.inner.clone(),
            bindings: Arc::clone(&other.bindings),
        }
    }

    /// Registry addresses passed to `connect`, in call order
    pub fn bindings(&self) -> Vec<Option<Address>> {
        self.bindings.lock().unwrap().clone()
    }
}

impl RegistryConnector for RecordingConnector {
    fn connect(&self, registry: Option<Address>) -> Arc<dyn RegistryClient> {
        self.bindings.lock().unwrap().push(registry);
        self.inner.connect(registry)
    }

    fn connector_name(&self) -> &'static str {
        "recording"
    }
}

/// A deployer that counts calls and hands out fixed addresses
pub struct CountingDeployer {
    deploy_call_count: Arc<AtomicUsize>,
    artifacts: Arc<Mutex<Vec<(ContractArtifact, Vec<Address>)>>>,
}

impl CountingDeployer {
    pub fn new() -> Self {
        Self {
            deploy_call_count: Arc::new(AtomicUsize::new(0)),
            artifacts: Arc::new(Mutex::new(Vec::new())),
        }
    }

    /// Create a deployer that shares counters with an existing one
    pub fn sharing_counters_with(other: &Self) -> Self {
        Self {
            deploy_call_count: Arc::clone(&other.deploy_call_count),
            artifacts: Arc::clone(&other.artifacts),
        }
    }

    /// Number of times deploy() was called
    pub fn deploy_call_count(&self) -> usize {
        self.deploy_call_count.load(Ordering::SeqCst)
    }

    /// Artifacts and constructor arguments, in call order
    pub fn deployed(&self) -> Vec<(ContractArtifact, Vec<Address>)> {
        self.artifacts.lock().unwrap().clone()
    }
}

#[async_trait]
impl ContractDeployer for CountingDeployer {
    async fn deploy(
        &self,
        artifact: ContractArtifact,
        constructor_args: &[Address],
        _from: Address,
    ) -> Result<ContractHandle> {
        let n = self.deploy_call_count.fetch_add(1, Ordering::SeqCst) as u64;
        self.artifacts
            .lock()
            .unwrap()
            .push((artifact, constructor_args.to_vec()));

        Ok(ContractHandle {
            artifact,
            address: Address::from_low_u64(0xfeed_0000 + n + 1),
        })
    }

    fn deployer_name(&self) -> &'static str {
        "counting"
    }
}

/// A connector whose clients never find a registry, even after one is deployed
///
/// Writes succeed and are counted.
pub struct VanishingRegistryConnector {
    write_call_count: Arc<AtomicUsize>,
}

impl VanishingRegistryConnector {
    pub fn new() -> Self {
        Self {
            write_call_count: Arc::new(AtomicUsize::new(0)),
        }
    }

    pub fn sharing_counters_with(other: &Self) -> Self {
        Self {
            write_call_count: Arc::clone(&other.write_call_count),
        }
    }

    pub fn write_call_count(&self) -> usize {
        self.write_call_count.load(Ordering::SeqCst)
    }
}

impl RegistryConnector for VanishingRegistryConnector {
    fn connect(&self, _registry: Option<Address>) -> Arc<dyn RegistryClient> {
        Arc::new(VanishingRegistryClient {
            write_call_count: Arc::clone(&self.write_call_count),
        })
    }

    fn connector_name(&self) -> &'static str {
        "vanishing"
    }
}

struct VanishingRegistryClient {
    write_call_count: Arc<AtomicUsize>,
}

#[async_trait]
impl RegistryClient for VanishingRegistryClient {
    async fn registry(&self) -> Result<Lookup<Address>> {
        Ok(Lookup::NotConfigured)
    }

    async fn owner(&self, _node: Node) -> Result<Lookup<Address>> {
        Ok(Lookup::NotConfigured)
    }

    async fn resolver(&self, _node: Node) -> Result<Lookup<Address>> {
        Ok(Lookup::NotConfigured)
    }

    async fn addr(&self, _resolver: Address, _node: Node) -> Result<Lookup<Address>> {
        Ok(Lookup::NotFound)
    }

    async fn set_subnode_owner(
        &self,
        _parent: Node,
        _label: LabelHash,
        _owner: Address,
        _from: Address,
    ) -> Result<()> {
        self.write_call_count.fetch_add(1, Ordering::SeqCst);
        Ok(())
    }

    async fn set_resolver(&self, _node: Node, _resolver: Address, _from: Address) -> Result<()> {
        self.write_call_count.fetch_add(1, Ordering::SeqCst);
        Ok(())
    }

    async fn set_addr(
        &self,
        _resolver: Address,
        _node: Node,
        _addr: Address,
        _from: Address,
    ) -> Result<()> {
        self.write_call_count.fetch_add(1, Ordering::SeqCst);
        Ok(())
    }
}

/// A connector that finds no registry at `missing`
///
/// Clients bound to `missing` report `Lookup::NotConfigured`, as a provider
/// does when there is no registry code at the bound address. Every other
/// binding goes to the chain.
pub struct MissingRegistryConnector {
    inner: MemoryChain,
    missing: Address,
}

impl MissingRegistryConnector {
    pub fn new(inner: MemoryChain, missing: Address) -> Self {
        Self { inner, missing }
    }
}

impl RegistryConnector for MissingRegistryConnector {
    fn connect(&self, registry: Option<Address>) -> Arc<dyn RegistryClient> {
        if registry == Some(self.missing) {
            // An empty chain has no default registry either
            MemoryChain::new().connect(None)
        } else {
            self.inner.connect(registry)
        }
    }

    fn connector_name(&self) -> &'static str {
        "missing-registry"
    }
}
