// # Registry Client Trait
//
// Defines the interface for reading and writing name records in a registry
// and its resolvers.
//
// ## Implementations
//
// - In-memory dev chain: `namebind_core::chain::MemoryChain`
// - Future: JSON-RPC backed clients for live networks
//
// ## Usage
//
// ```rust,ignore
// use namebind_core::traits::{RegistryConnector, RegistryClient};
// use namebind_core::types::{Lookup, Node};
//
// #[tokio::main]
// async fn main() -> anyhow::Result<()> {
//     let connector = /* RegistryConnector implementation */;
//
//     // Bind a client to the network default registry
//     let client = connector.connect(None);
//
//     match client.owner(Node::ROOT).await? {
//         Lookup::Found(owner) => println!("root owned by {}", owner),
//         Lookup::NotConfigured => println!("no registry on this network"),
//         Lookup::NotFound => println!("root has no owner"),
//     }
//
//     Ok(())
// }
// ```

use async_trait::async_trait;
use std::sync::Arc;

use crate::types::{Address, LabelHash, Lookup, Node};

/// Trait for registry/resolver clients bound to one registry address
///
/// Every read returns a [`Lookup`] so that "no registry configured" and
/// "name not found" are distinguishable from real failures without
/// inspecting error messages. Real failures are `Err`.
///
/// # Thread Safety
///
/// Implementations must be thread-safe and usable across async tasks.
///
/// # Trust Level: Untrusted
///
/// Registry clients are **untrusted** components with strict limitations:
///
/// ## Allowed Capabilities
/// - ✅ Issue contract calls and transactions through their provider
/// - ✅ Decode contract responses
/// - ✅ Return success, absence, or failure (binder decides what to do)
///
/// ## Forbidden Capabilities
/// - ❌ Implement retry logic or backoff (callers retry whole reconciliations)
/// - ❌ Deploy contracts (owned by `ContractDeployer`)
/// - ❌ Cache reads beyond a single request (bindings are re-read every call)
/// - ❌ Decide whether a write is needed (owned by `NameBinder`)
/// - ❌ Translate absence into an error, or an error into absence
#[async_trait]
pub trait RegistryClient: Send + Sync {
    /// Address of the registry this client talks to
    ///
    /// For a client bound to `None` this resolves the network default.
    ///
    /// # Returns
    ///
    /// - `Ok(Lookup::Found(address))`: The effective registry address
    /// - `Ok(Lookup::NotConfigured)`: No registry is configured
    /// - `Err(Error)`: Transport failure
    async fn registry(&self) -> Result<Lookup<Address>, crate::Error>;

    /// Read the owner of a node
    ///
    /// # Returns
    ///
    /// - `Ok(Lookup::Found(owner))`: The node has an owner (may be zero)
    /// - `Ok(Lookup::NotConfigured)`: No registry at the bound address
    /// - `Err(Error)`: Transport failure
    async fn owner(&self, node: Node) -> Result<Lookup<Address>, crate::Error>;

    /// Read the resolver of a node
    ///
    /// # Returns
    ///
    /// - `Ok(Lookup::Found(resolver))`: A resolver is set
    /// - `Ok(Lookup::NotFound)`: No resolver is set for the name
    /// - `Ok(Lookup::NotConfigured)`: No registry at the bound address
    /// - `Err(Error)`: Transport failure
    async fn resolver(&self, node: Node) -> Result<Lookup<Address>, crate::Error>;

    /// Read the address record of a node from a resolver
    ///
    /// # Parameters
    ///
    /// - `resolver`: Resolver contract to query
    /// - `node`: Name hash
    ///
    /// # Returns
    ///
    /// - `Ok(Lookup::Found(addr))`: The resolver holds an address (may be zero)
    /// - `Ok(Lookup::NotFound)`: The resolver has no address record
    /// - `Err(Error)`: Transport failure
    async fn addr(&self, resolver: Address, node: Node) -> Result<Lookup<Address>, crate::Error>;

    /// Assign ownership of `label` under `parent` to `owner`
    ///
    /// Must be sent by the owner of `parent`.
    async fn set_subnode_owner(
        &self,
        parent: Node,
        label: LabelHash,
        owner: Address,
        from: Address,
    ) -> Result<(), crate::Error>;

    /// Point a node at a resolver contract
    ///
    /// Must be sent by the owner of `node`.
    async fn set_resolver(
        &self,
        node: Node,
        resolver: Address,
        from: Address,
    ) -> Result<(), crate::Error>;

    /// Store an address record for a node on a resolver
    ///
    /// Must be sent by the owner of `node`.
    async fn set_addr(
        &self,
        resolver: Address,
        node: Node,
        addr: Address,
        from: Address,
    ) -> Result<(), crate::Error>;
}

/// Builds registry clients from a registry address
///
/// `connect` must be a pure function of its argument: the binder calls it
/// again whenever it needs a client, so a client can never outlive a change
/// of registry address.
pub trait RegistryConnector: Send + Sync {
    /// Bind a client to `registry` (`None` = the network's default registry)
    fn connect(&self, registry: Option<Address>) -> Arc<dyn RegistryClient>;

    /// Connector name (for logging/debugging)
    fn connector_name(&self) -> &'static str;
}
