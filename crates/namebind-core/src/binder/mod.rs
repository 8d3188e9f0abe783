//! Name binder
//!
//! The NameBinder is responsible for:
//! - Making sure a registry is reachable, deploying one if none is configured
//! - Refusing to touch a name the caller does not own
//! - Making sure the name has a resolver, deploying and attaching one if not
//! - Writing the target address only when it differs from the current one
//!
//! ## Architecture
//!
//! ```text
//!                         ┌──────────────┐
//!      BindRequest ──────▶│  NameBinder  │──────▶ BinderEvent
//!                         └──────────────┘
//!                                 │
//!         ┌───────────────────────┼───────────────────────┐
//!         │                       │                       │
//!         ▼                       ▼                       ▼
//! ┌────────────────┐    ┌──────────────────┐    ┌──────────────┐
//! │ RegistryClient │    │ ContractDeployer │    │  NameHasher  │
//! │ (read/write)   │    │ (provision)      │    │  (nodes)     │
//! └────────────────┘    └──────────────────┘    └──────────────┘
//! ```
//!
//! ## Reconciliation Flow
//!
//! 1. Start a call-scoped registry handle from the known registry address
//! 2. Ensure the registry exists (deploy only if no registry address is known)
//! 3. If this binder deployed the registry and the name is not claimed yet,
//!    claim it for `from`
//! 4. Verify `owner(name) == from`, fail fast otherwise
//! 5. Ensure the name has a resolver (deploy and attach if not)
//! 6. Write the address record only if it differs from the target
//!
//! Steps never loop back. Every failure other than the two absence signals
//! handled in steps 2 and 5 is returned to the caller unchanged.

mod ownership;
mod registry;
mod resolver;

use crate::config::BinderConfig;
use crate::error::{Error, Result};
use crate::traits::name_hasher::normalize_name;
use crate::traits::{ContractDeployer, NameHasher, RegistryClient, RegistryConnector};
use crate::types::{Address, ContractArtifact, Node, RegistryHandle};
use std::sync::Arc;
use tokio::sync::{RwLock, mpsc};
use tracing::{debug, info, warn};

use self::registry::RegistryStatus;

/// Events emitted by the NameBinder
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum BinderEvent {
    /// A new registry was deployed because none was configured
    RegistryDeployed {
        address: Address,
    },

    /// The name was claimed for `owner` on a freshly deployed registry
    NameClaimed {
        name: String,
        owner: Address,
    },

    /// The caller was confirmed as owner of the name
    OwnershipVerified {
        name: String,
        owner: Address,
    },

    /// A new resolver was deployed for the name
    ResolverDeployed {
        name: String,
        address: Address,
    },

    /// The registry now points the name at `resolver`
    ResolverAttached {
        name: String,
        resolver: Address,
    },

    /// The address record was written
    AddressUpdated {
        name: String,
        previous: Option<Address>,
        new: Address,
    },

    /// The address record already matched (no write)
    AddressUnchanged {
        name: String,
        current: Address,
    },

    /// A write or deployment was skipped because of dry-run mode
    WritePlanned {
        name: String,
        action: String,
    },

    /// The reconciliation failed
    BindFailed {
        name: String,
        error: String,
    },
}

/// A request to bind `name` to `address`, authorized by `from`
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct BindRequest {
    /// Human-readable name (e.g. "alice" or "alice.eth")
    pub name: String,
    /// Target address the name should resolve to
    pub address: Address,
    /// Account that owns the name and sends every transaction
    pub from: Address,
}

impl BindRequest {
    /// Create a new bind request
    pub fn new(name: impl Into<String>, address: Address, from: Address) -> Self {
        Self {
            name: name.into(),
            address,
            from,
        }
    }

    /// Validate the request
    ///
    /// The zero target address is allowed: binding to it clears the record.
    pub fn validate(&self) -> Result<()> {
        let name = normalize_name(&self.name);
        if name.is_empty() {
            return Err(Error::invalid_input("Name cannot be empty"));
        }

        if name.split('.').any(str::is_empty) {
            return Err(Error::invalid_input(format!(
                "Name has an empty label: '{}'",
                self.name
            )));
        }

        if self.from.is_zero() {
            return Err(Error::invalid_input(
                "The \"from\" address cannot be the zero address",
            ));
        }

        Ok(())
    }
}

/// What happened to the address record
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum BindOutcome {
    /// The address record was written
    Updated {
        /// The previous address (`None` if unset or the resolver is new)
        previous: Option<Address>,
        /// The address now stored
        new: Address,
    },
    /// The address record already matched (no-op)
    Unchanged {
        /// The current address
        current: Address,
    },
    /// Dry-run: the address record would have been written
    Planned {
        /// The address that would be stored
        target: Address,
    },
}

/// Result of a successful reconciliation
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct BindReport {
    /// Normalized name
    pub name: String,
    /// Name hash
    pub node: Node,
    /// Registry used (`None` = network default)
    pub registry: Option<Address>,
    /// Whether this call deployed the registry (or would have, in dry-run)
    pub registry_deployed: bool,
    /// Resolver serving the name (`None` only if a dry-run skipped deploying it)
    pub resolver: Option<Address>,
    /// Whether this call deployed the resolver (or would have, in dry-run)
    pub resolver_deployed: bool,
    /// What happened to the address record
    pub outcome: BindOutcome,
    /// Whether this was a dry run
    pub dry_run: bool,
    /// When the reconciliation finished
    pub completed_at: chrono::DateTime<chrono::Utc>,
}

impl BindReport {
    /// Whether the address record was written by this call
    pub fn address_written(&self) -> bool {
        matches!(self.outcome, BindOutcome::Updated { .. })
    }
}

/// Resolver state for the name, as found or provisioned
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub(crate) struct ResolverBinding {
    /// Resolver contract (`None` only in dry-run when one would be deployed)
    pub resolver: Option<Address>,
    /// Address currently stored on the resolver
    pub resolved: Option<Address>,
    /// Whether this call deployed (or would deploy) the resolver
    pub deployed: bool,
}

/// Registry deployed by this binder, with the claim still owed on it
#[derive(Debug, Clone, PartialEq, Eq)]
struct DeployedRegistry {
    address: Address,
    /// `(name, owner)` whose claim has not completed yet
    pending_claim: Option<(String, Address)>,
}

/// Name binder
///
/// The binder reconciles one name-to-address binding per
/// [`set_address`](NameBinder::set_address) call, provisioning a registry and
/// a resolver when they are missing.
///
/// ## State
///
/// Everything a call decides lives in that call: the registry handle and its
/// freshness flag are built at the start of each call, and registry clients
/// are reconnected from the current registry address at every use. The one
/// thing retained across calls is the address of a registry this binder
/// deployed, so that a later call reuses it instead of deploying again,
/// together with a name claim on it that has not completed yet. Retrying the
/// same request finishes that claim.
///
/// ## Concurrency
///
/// Calls do not share mutable state, so concurrent calls on one binder are
/// memory-safe. They are not coordinated, though: two concurrent calls that
/// both find no registry will each deploy one. Serialize calls that may
/// provision, or use one binder per name.
pub struct NameBinder {
    /// Builds registry clients from a registry address
    connector: Box<dyn RegistryConnector>,

    /// Deploys registries and resolvers
    deployer: Box<dyn ContractDeployer>,

    /// Turns names into registry nodes
    hasher: Box<dyn NameHasher>,

    /// Immutable settings
    config: BinderConfig,

    /// Registry deployed by an earlier call, if any
    deployed_registry: RwLock<Option<DeployedRegistry>>,

    /// Event sender for external monitoring
    event_tx: mpsc::Sender<BinderEvent>,
}

impl NameBinder {
    /// Create a new name binder
    ///
    /// # Parameters
    ///
    /// - `connector`: Registry client factory
    /// - `deployer`: Contract deployment primitive
    /// - `hasher`: Name hashing function
    /// - `config`: Binder configuration
    ///
    /// # Returns
    ///
    /// A tuple of (binder, event_receiver) where event_receiver yields binder events
    pub fn new(
        connector: Box<dyn RegistryConnector>,
        deployer: Box<dyn ContractDeployer>,
        hasher: Box<dyn NameHasher>,
        config: BinderConfig,
    ) -> Result<(Self, mpsc::Receiver<BinderEvent>)> {
        config.validate()?;

        let (tx, rx) = mpsc::channel(config.event_channel_capacity);

        info!(
            "Name binder created (connector: {}, deployer: {}, hasher: {}, dry run: {})",
            connector.connector_name(),
            deployer.deployer_name(),
            hasher.hasher_name(),
            config.dry_run
        );

        let binder = Self {
            connector,
            deployer,
            hasher,
            config,
            deployed_registry: RwLock::new(None),
            event_tx: tx,
        };

        Ok((binder, rx))
    }

    /// Binder configuration
    pub fn config(&self) -> &BinderConfig {
        &self.config
    }

    /// Registry the next call will start from
    ///
    /// The configured override wins; otherwise a registry deployed by an
    /// earlier call; otherwise `None` (network default).
    pub async fn registry_address(&self) -> Option<Address> {
        match self.config.registry_address {
            Some(address) => Some(address),
            None => self
                .deployed_registry
                .read()
                .await
                .as_ref()
                .map(|deployed| deployed.address),
        }
    }

    /// Bind `request.name` to `request.address`
    ///
    /// # Returns
    ///
    /// - `Ok(BindReport)`: The binding now reflects `name -> address`
    ///   (or, in dry-run, the report lists what would change)
    /// - `Err(Error::Unauthorized)`: `request.from` does not own the name
    /// - `Err(Error)`: Any collaborator failure, unchanged
    ///
    /// # Idempotency
    ///
    /// Repeating a successful call with the same arguments issues no
    /// deployment and no write.
    pub async fn set_address(&self, request: &BindRequest) -> Result<BindReport> {
        let result = self.reconcile(request).await;

        if let Err(e) = &result {
            let name = normalize_name(&request.name);
            warn!("Failed to bind {}: {}", name, e);
            self.emit_event(BinderEvent::BindFailed {
                name,
                error: e.to_string(),
            });
        }

        result
    }

    async fn reconcile(&self, request: &BindRequest) -> Result<BindReport> {
        request.validate()?;

        let name = normalize_name(&request.name);
        let node = self.hasher.node(&name);
        let from = request.from;
        debug!("Binding {} ({}) -> {} from {}", name, node, request.address, from);

        // 1. Fresh call-scoped registry state
        let mut registry = RegistryHandle::existing(self.registry_address().await);

        // 2. Registry, and 3. the claim owed on a registry this binder deployed
        match self.ensure_registry_exists(&mut registry, &name, from).await? {
            RegistryStatus::Deployed => self.claim_name(&registry, &name, from).await?,
            RegistryStatus::Reachable => {
                if self.claim_pending(&registry, &name, from).await {
                    self.claim_name(&registry, &name, from).await?;
                }
            }
            RegistryStatus::Planned => {
                // Nothing can be read from a registry that was not deployed
                return Ok(self.planned_report(name, node, from, request.address));
            }
        }

        // 4. Ownership guard
        self.verify_owner(&registry, &name, node, from).await?;

        // 5. Resolver
        let binding = self.ensure_resolver_exists(&registry, &name, node, from).await?;

        // 6. Address record
        let outcome = self
            .reconcile_address(&registry, &name, node, &binding, request.address, from)
            .await?;

        Ok(BindReport {
            name,
            node,
            registry: registry.address,
            registry_deployed: registry.freshly_deployed,
            resolver: binding.resolver,
            resolver_deployed: binding.deployed,
            outcome,
            dry_run: self.config.dry_run,
            completed_at: chrono::Utc::now(),
        })
    }

    /// Report for a dry run that stopped at a missing registry
    fn planned_report(&self, name: String, node: Node, from: Address, target: Address) -> BindReport {
        self.emit_event(BinderEvent::WritePlanned {
            name: name.clone(),
            action: format!(
                "deploy {}, claim the name for {}, deploy {}, set address to {}",
                ContractArtifact::Registry,
                from,
                ContractArtifact::PublicResolver,
                target
            ),
        });

        BindReport {
            name,
            node,
            registry: None,
            registry_deployed: true,
            resolver: None,
            resolver_deployed: true,
            outcome: BindOutcome::Planned { target },
            dry_run: true,
            completed_at: chrono::Utc::now(),
        }
    }

    /// Write the address record if it differs from `target`
    async fn reconcile_address(
        &self,
        registry: &RegistryHandle,
        name: &str,
        node: Node,
        binding: &ResolverBinding,
        target: Address,
        from: Address,
    ) -> Result<BindOutcome> {
        if binding.resolved == Some(target) {
            debug!("{} already resolves to {}, skipping write", name, target);
            self.emit_event(BinderEvent::AddressUnchanged {
                name: name.to_string(),
                current: target,
            });
            return Ok(BindOutcome::Unchanged { current: target });
        }

        let resolver = match binding.resolver {
            Some(resolver) if !self.config.dry_run => resolver,
            _ => {
                info!("[dry-run] Would set address of {} to {}", name, target);
                self.emit_event(BinderEvent::WritePlanned {
                    name: name.to_string(),
                    action: format!("set address to {}", target),
                });
                return Ok(BindOutcome::Planned { target });
            }
        };

        self.client(registry)
            .set_addr(resolver, node, target, from)
            .await?;

        info!(
            "Set address of {} -> {} (previous: {:?})",
            name, target, binding.resolved
        );
        self.emit_event(BinderEvent::AddressUpdated {
            name: name.to_string(),
            previous: binding.resolved,
            new: target,
        });

        Ok(BindOutcome::Updated {
            previous: binding.resolved,
            new: target,
        })
    }

    /// Client for the handle's current registry address
    ///
    /// Always reconnects, so a client never outlives a registry change.
    fn client(&self, registry: &RegistryHandle) -> Arc<dyn RegistryClient> {
        self.connector.connect(registry.address)
    }

    /// Emit a binder event
    ///
    /// # Parameters
    ///
    /// - `event`: The event to emit
    fn emit_event(&self, event: BinderEvent) {
        // Never block a reconciliation on a slow event consumer
        if self.event_tx.try_send(event).is_err() {
            warn!("Event channel full or closed, dropping event. Consider increasing event_channel_capacity.");
        }
    }
}
