// # Memory Chain
//
// In-memory implementation of RegistryConnector and ContractDeployer.
//
// ## Purpose
//
// Provides a deterministic, in-process stand-in for a development network:
// registries, resolvers, ownership rules and a transaction log, with no
// RPC provider behind it. Useful for testing, demos and local tooling.
//
// ## Semantics
//
// - A registry deployed by `from` starts with `from` owning the root node
// - `set_subnode_owner` requires the sender to own the parent node
// - `set_resolver` and `set_addr` require the sender to own the node
// - Violations revert, surfacing as `Error::Transport`
// - A client bound to no registry (and no network default) reports
//   `Lookup::NotConfigured`; a client bound to an address with no registry
//   deployed fails with a transport error, as a real provider would
//
// ## When to Use
//
// - Testing environments
// - Demos and local experiments
// - Never as a record of a real network (all state is lost on drop)

use async_trait::async_trait;
use std::collections::HashMap;
use std::sync::Arc;
use tokio::sync::RwLock;

use crate::traits::name_hasher::subnode;
use crate::traits::{ContractDeployer, RegistryClient, RegistryConnector};
use crate::types::{Address, ContractArtifact, ContractHandle, LabelHash, Lookup, Node};
use crate::Error;

/// First address handed out to contracts deployed on the chain
const CONTRACT_ADDRESS_BASE: u64 = 0xC0DE_0000;

/// Chain operations that can be made to fail (see [`MemoryChain::fail_next`])
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum ChainOp {
    /// `owner` reads
    Owner,
    /// `resolver` reads
    Resolver,
    /// `addr` reads
    Addr,
    /// `set_subnode_owner` transactions
    SetSubnodeOwner,
    /// `set_resolver` transactions
    SetResolver,
    /// `set_addr` transactions
    SetAddr,
    /// Contract deployments
    Deploy,
}

/// A transaction accepted by the chain
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum TxKind {
    /// Contract deployment
    Deploy {
        artifact: ContractArtifact,
        address: Address,
    },
    /// Subnode ownership assignment
    SetSubnodeOwner {
        registry: Address,
        parent: Node,
        label: LabelHash,
        owner: Address,
    },
    /// Resolver assignment
    SetResolver {
        registry: Address,
        node: Node,
        resolver: Address,
    },
    /// Address record write
    SetAddr {
        resolver: Address,
        node: Node,
        addr: Address,
    },
}

impl TxKind {
    /// Whether this transaction deployed a contract
    pub fn is_deploy(&self) -> bool {
        matches!(self, TxKind::Deploy { .. })
    }
}

/// Log entry for an accepted transaction
#[derive(Debug, Clone)]
pub struct TxRecord {
    /// What happened
    pub kind: TxKind,
    /// Who sent it
    pub from: Address,
    /// When the chain accepted it
    pub at: chrono::DateTime<chrono::Utc>,
}

#[derive(Debug, Clone, Copy, Default)]
struct NodeRecord {
    owner: Address,
    resolver: Address,
}

#[derive(Debug, Default)]
struct RegistryState {
    records: HashMap<Node, NodeRecord>,
}

impl RegistryState {
    fn owner(&self, node: &Node) -> Address {
        self.records.get(node).map(|r| r.owner).unwrap_or(Address::ZERO)
    }
}

#[derive(Debug)]
struct ResolverState {
    registry: Address,
    addrs: HashMap<Node, Address>,
}

#[derive(Debug, Default)]
struct ChainState {
    default_registry: Option<Address>,
    registries: HashMap<Address, RegistryState>,
    resolvers: HashMap<Address, ResolverState>,
    deployed: u64,
    log: Vec<TxRecord>,
    faults: HashMap<ChainOp, String>,
}

impl ChainState {
    fn next_address(&mut self) -> Address {
        self.deployed += 1;
        Address::from_low_u64(CONTRACT_ADDRESS_BASE + self.deployed)
    }

    fn take_fault(&mut self, op: ChainOp) -> Result<(), Error> {
        match self.faults.remove(&op) {
            Some(message) => Err(Error::transport(message)),
            None => Ok(()),
        }
    }

    /// Resolve a client binding to a deployed registry
    fn registry(&self, bound: Option<Address>) -> Result<Option<(Address, &RegistryState)>, Error> {
        let Some(address) = bound.or(self.default_registry) else {
            return Ok(None);
        };

        self.registries
            .get(&address)
            .map(|state| Some((address, state)))
            .ok_or_else(|| Error::transport(format!("no contract code at {}", address)))
    }

    fn registry_mut(&mut self, bound: Option<Address>) -> Result<(Address, &mut RegistryState), Error> {
        let address = bound
            .or(self.default_registry)
            .ok_or_else(|| Error::transport("registry address is not set"))?;

        self.registries
            .get_mut(&address)
            .map(|state| (address, state))
            .ok_or_else(|| Error::transport(format!("no contract code at {}", address)))
    }

    fn record(&mut self, kind: TxKind, from: Address) {
        self.log.push(TxRecord {
            kind,
            from,
            at: chrono::Utc::now(),
        });
    }
}

/// In-memory development chain
///
/// Cloning yields another handle to the same chain.
///
/// # Example
///
/// ```rust,no_run
/// use namebind_core::chain::MemoryChain;
/// use namebind_core::traits::{RegistryClient, RegistryConnector};
/// use namebind_core::types::{Address, Lookup, Node};
///
/// #[tokio::main]
/// async fn main() -> Result<(), Box<dyn std::error::Error>> {
///     let chain = MemoryChain::new();
///     let deployer = Address::from_low_u64(1);
///
///     // A registry that already exists on the network
///     let registry = chain.install_registry(deployer).await;
///     chain.set_default_registry(Some(registry)).await;
///
///     let client = chain.connect(None);
///     assert_eq!(client.owner(Node::ROOT).await?, Lookup::Found(deployer));
///
///     Ok(())
/// }
/// ```
#[derive(Debug, Clone, Default)]
pub struct MemoryChain {
    inner: Arc<RwLock<ChainState>>,
}

impl MemoryChain {
    /// Create an empty chain with no default registry
    pub fn new() -> Self {
        Self::default()
    }

    /// Create a registry owned by `root_owner` without logging a transaction
    ///
    /// Models infrastructure that predates the binder.
    pub async fn install_registry(&self, root_owner: Address) -> Address {
        let mut state = self.inner.write().await;
        let address = state.next_address();
        let mut registry = RegistryState::default();
        registry.records.insert(
            Node::ROOT,
            NodeRecord {
                owner: root_owner,
                resolver: Address::ZERO,
            },
        );
        state.registries.insert(address, registry);
        address
    }

    /// Create a resolver for `registry` without logging a transaction
    pub async fn install_resolver(&self, registry: Address) -> Address {
        let mut state = self.inner.write().await;
        let address = state.next_address();
        state.resolvers.insert(
            address,
            ResolverState {
                registry,
                addrs: HashMap::new(),
            },
        );
        address
    }

    /// Set (or clear) the network default registry
    pub async fn set_default_registry(&self, registry: Option<Address>) {
        self.inner.write().await.default_registry = registry;
    }

    /// Overwrite a node's owner without logging a transaction
    pub async fn seed_owner(&self, registry: Address, node: Node, owner: Address) {
        let mut state = self.inner.write().await;
        if let Some(reg) = state.registries.get_mut(&registry) {
            reg.records.entry(node).or_default().owner = owner;
        }
    }

    /// Overwrite a node's resolver without logging a transaction
    pub async fn seed_resolver(&self, registry: Address, node: Node, resolver: Address) {
        let mut state = self.inner.write().await;
        if let Some(reg) = state.registries.get_mut(&registry) {
            reg.records.entry(node).or_default().resolver = resolver;
        }
    }

    /// Overwrite a resolver's address record without logging a transaction
    pub async fn seed_addr(&self, resolver: Address, node: Node, addr: Address) {
        let mut state = self.inner.write().await;
        if let Some(res) = state.resolvers.get_mut(&resolver) {
            res.addrs.insert(node, addr);
        }
    }

    /// Make the next `op` fail with a transport error carrying `message`
    pub async fn fail_next(&self, op: ChainOp, message: impl Into<String>) {
        self.inner.write().await.faults.insert(op, message.into());
    }

    /// Current network default registry
    pub async fn default_registry(&self) -> Option<Address> {
        self.inner.read().await.default_registry
    }

    /// Owner of `node` in `registry` (zero if unset or unknown registry)
    pub async fn owner_of(&self, registry: Address, node: Node) -> Address {
        let state = self.inner.read().await;
        state
            .registries
            .get(&registry)
            .map(|reg| reg.owner(&node))
            .unwrap_or(Address::ZERO)
    }

    /// Resolver of `node` in `registry`, if set
    pub async fn resolver_of(&self, registry: Address, node: Node) -> Option<Address> {
        let state = self.inner.read().await;
        state
            .registries
            .get(&registry)
            .and_then(|reg| reg.records.get(&node))
            .map(|r| r.resolver)
            .filter(|r| !r.is_zero())
    }

    /// Address record of `node` on `resolver`, if set
    pub async fn addr_of(&self, resolver: Address, node: Node) -> Option<Address> {
        let state = self.inner.read().await;
        state
            .resolvers
            .get(&resolver)
            .and_then(|res| res.addrs.get(&node))
            .copied()
    }

    /// All accepted transactions, oldest first
    pub async fn transactions(&self) -> Vec<TxRecord> {
        self.inner.read().await.log.clone()
    }

    /// Number of logged contract deployments
    pub async fn deploy_count(&self) -> usize {
        let state = self.inner.read().await;
        state.log.iter().filter(|tx| tx.kind.is_deploy()).count()
    }

    /// Number of logged deployments of `artifact`
    pub async fn deploy_count_of(&self, artifact: ContractArtifact) -> usize {
        let state = self.inner.read().await;
        state
            .log
            .iter()
            .filter(|tx| matches!(tx.kind, TxKind::Deploy { artifact: a, .. } if a == artifact))
            .count()
    }

    /// Number of logged non-deployment transactions
    pub async fn write_count(&self) -> usize {
        let state = self.inner.read().await;
        state.log.iter().filter(|tx| !tx.kind.is_deploy()).count()
    }
}

impl RegistryConnector for MemoryChain {
    fn connect(&self, registry: Option<Address>) -> Arc<dyn RegistryClient> {
        Arc::new(MemoryRegistryClient {
            chain: Arc::clone(&self.inner),
            registry,
        })
    }

    fn connector_name(&self) -> &'static str {
        "memory"
    }
}

#[async_trait]
impl ContractDeployer for MemoryChain {
    async fn deploy(
        &self,
        artifact: ContractArtifact,
        constructor_args: &[Address],
        from: Address,
    ) -> Result<ContractHandle, Error> {
        let mut state = self.inner.write().await;
        state.take_fault(ChainOp::Deploy)?;

        let address = match artifact {
            ContractArtifact::Registry => {
                if !constructor_args.is_empty() {
                    return Err(Error::transport("ENSRegistry takes no constructor arguments"));
                }
                let address = state.next_address();
                let mut registry = RegistryState::default();
                registry.records.insert(
                    Node::ROOT,
                    NodeRecord {
                        owner: from,
                        resolver: Address::ZERO,
                    },
                );
                state.registries.insert(address, registry);
                address
            }
            ContractArtifact::PublicResolver => {
                let [registry] = constructor_args else {
                    return Err(Error::transport(
                        "PublicResolver expects exactly one constructor argument (registry address)",
                    ));
                };
                let registry = *registry;
                let address = state.next_address();
                state.resolvers.insert(
                    address,
                    ResolverState {
                        registry,
                        addrs: HashMap::new(),
                    },
                );
                address
            }
        };

        state.record(TxKind::Deploy { artifact, address }, from);
        Ok(ContractHandle { artifact, address })
    }

    fn deployer_name(&self) -> &'static str {
        "memory"
    }
}

/// Registry client bound to one registry on a [`MemoryChain`]
#[derive(Debug)]
pub struct MemoryRegistryClient {
    chain: Arc<RwLock<ChainState>>,
    registry: Option<Address>,
}

#[async_trait]
impl RegistryClient for MemoryRegistryClient {
    async fn registry(&self) -> Result<Lookup<Address>, Error> {
        let state = self.chain.read().await;
        Ok(match state.registry(self.registry)? {
            Some((address, _)) => Lookup::Found(address),
            None => Lookup::NotConfigured,
        })
    }

    async fn owner(&self, node: Node) -> Result<Lookup<Address>, Error> {
        let mut state = self.chain.write().await;
        state.take_fault(ChainOp::Owner)?;

        Ok(match state.registry(self.registry)? {
            Some((_, reg)) => Lookup::Found(reg.owner(&node)),
            None => Lookup::NotConfigured,
        })
    }

    async fn resolver(&self, node: Node) -> Result<Lookup<Address>, Error> {
        let mut state = self.chain.write().await;
        state.take_fault(ChainOp::Resolver)?;

        Ok(match state.registry(self.registry)? {
            Some((_, reg)) => match reg.records.get(&node).map(|r| r.resolver) {
                Some(resolver) if !resolver.is_zero() => Lookup::Found(resolver),
                _ => Lookup::NotFound,
            },
            None => Lookup::NotConfigured,
        })
    }

    async fn addr(&self, resolver: Address, node: Node) -> Result<Lookup<Address>, Error> {
        let mut state = self.chain.write().await;
        state.take_fault(ChainOp::Addr)?;

        let res = state
            .resolvers
            .get(&resolver)
            .ok_or_else(|| Error::transport(format!("no contract code at {}", resolver)))?;

        Ok(match res.addrs.get(&node) {
            Some(addr) => Lookup::Found(*addr),
            None => Lookup::NotFound,
        })
    }

    async fn set_subnode_owner(
        &self,
        parent: Node,
        label: LabelHash,
        owner: Address,
        from: Address,
    ) -> Result<(), Error> {
        let mut state = self.chain.write().await;
        state.take_fault(ChainOp::SetSubnodeOwner)?;

        let (registry, reg) = state.registry_mut(self.registry)?;
        let parent_owner = reg.owner(&parent);
        if parent_owner != from {
            return Err(Error::transport(format!(
                "transaction reverted: {} does not own parent node {}",
                from, parent
            )));
        }
        reg.records.entry(subnode(parent, label)).or_default().owner = owner;

        state.record(
            TxKind::SetSubnodeOwner {
                registry,
                parent,
                label,
                owner,
            },
            from,
        );
        Ok(())
    }

    async fn set_resolver(&self, node: Node, resolver: Address, from: Address) -> Result<(), Error> {
        let mut state = self.chain.write().await;
        state.take_fault(ChainOp::SetResolver)?;

        let (registry, reg) = state.registry_mut(self.registry)?;
        if reg.owner(&node) != from {
            return Err(Error::transport(format!(
                "transaction reverted: {} does not own node {}",
                from, node
            )));
        }
        reg.records.entry(node).or_default().resolver = resolver;

        state.record(
            TxKind::SetResolver {
                registry,
                node,
                resolver,
            },
            from,
        );
        Ok(())
    }

    async fn set_addr(
        &self,
        resolver: Address,
        node: Node,
        addr: Address,
        from: Address,
    ) -> Result<(), Error> {
        let mut state = self.chain.write().await;
        state.take_fault(ChainOp::SetAddr)?;

        let registry = state
            .resolvers
            .get(&resolver)
            .map(|res| res.registry)
            .ok_or_else(|| Error::transport(format!("no contract code at {}", resolver)))?;
        let node_owner = state
            .registries
            .get(&registry)
            .map(|reg| reg.owner(&node))
            .unwrap_or(Address::ZERO);
        if node_owner != from {
            return Err(Error::transport(format!(
                "transaction reverted: {} is not authorised to set records for {}",
                from, node
            )));
        }

        if let Some(res) = state.resolvers.get_mut(&resolver) {
            res.addrs.insert(node, addr);
        }

        state.record(TxKind::SetAddr { resolver, node, addr }, from);
        Ok(())
    }
}
