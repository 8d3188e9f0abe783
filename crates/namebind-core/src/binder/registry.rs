//! Registry ensurer

use tracing::{debug, info};

use super::{BinderEvent, DeployedRegistry, NameBinder};
use crate::error::{Error, Result};
use crate::types::{Address, ContractArtifact, Lookup, Node, RegistryHandle};

/// How the registry check ended
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub(crate) enum RegistryStatus {
    /// A registry answered the benign read
    Reachable,
    /// No registry was configured; this call deployed one
    Deployed,
    /// No registry was configured; dry-run skipped deploying one
    Planned,
}

impl NameBinder {
    /// Make sure `registry` points at a reachable registry
    ///
    /// Reads the owner of the root node. `NotConfigured` on an unbound handle
    /// triggers deployment of a new registry, which replaces the handle
    /// (marked fresh) and is remembered for later calls together with the
    /// claim owed to `from` on it. A bound handle
    /// reporting `NotConfigured` is an error: the configured override (or the
    /// registry this binder deployed) is missing and is never replaced.
    /// Any transport error is returned as-is.
    pub(crate) async fn ensure_registry_exists(
        &self,
        registry: &mut RegistryHandle,
        name: &str,
        from: Address,
    ) -> Result<RegistryStatus> {
        match self.client(registry).owner(Node::ROOT).await? {
            Lookup::Found(_) | Lookup::NotFound => {
                debug!("Registry reachable at {:?}", registry.address);
                Ok(RegistryStatus::Reachable)
            }
            Lookup::NotConfigured => match (self.config.registry_address, registry.address) {
                (Some(configured), _) => Err(Error::config(format!(
                    "No registry found at the configured address {}",
                    configured
                ))),
                (None, Some(_)) => Err(Error::unexpected_absence("registry", name)),
                (None, None) if self.config.dry_run => {
                    info!("[dry-run] No registry configured, would deploy {}", ContractArtifact::Registry);
                    Ok(RegistryStatus::Planned)
                }
                (None, None) => {
                    info!(
                        "No registry configured, deploying {} via {}",
                        ContractArtifact::Registry,
                        self.deployer.deployer_name()
                    );
                    let handle = self
                        .deployer
                        .deploy(ContractArtifact::Registry, &[], from)
                        .await?;

                    *registry = RegistryHandle::fresh(handle.address);
                    *self.deployed_registry.write().await = Some(DeployedRegistry {
                        address: handle.address,
                        pending_claim: Some((name.to_string(), from)),
                    });

                    info!("Deployed {} at {}", handle.artifact, handle.address);
                    self.emit_event(BinderEvent::RegistryDeployed {
                        address: handle.address,
                    });
                    Ok(RegistryStatus::Deployed)
                }
            },
        }
    }
}
