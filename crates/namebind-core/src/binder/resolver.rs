//! Resolver ensurer

use tracing::{debug, info};

use super::{BinderEvent, NameBinder, ResolverBinding};
use crate::error::{Error, Result};
use crate::types::{Address, ContractArtifact, Lookup, Node, RegistryHandle};

impl NameBinder {
    /// Make sure `node` has a resolver and report what it resolves to
    ///
    /// A resolver that is `NotFound` (or set to the zero address) is
    /// provisioned: a new resolver is deployed against the current registry
    /// and attached to the name. A freshly attached resolver resolves to
    /// nothing, so `resolved` is `None` on that path.
    pub(crate) async fn ensure_resolver_exists(
        &self,
        registry: &RegistryHandle,
        name: &str,
        node: Node,
        from: Address,
    ) -> Result<ResolverBinding> {
        let client = self.client(registry);

        match client.resolver(node).await? {
            Lookup::Found(resolver) if !resolver.is_zero() => {
                let resolved = match client.addr(resolver, node).await? {
                    Lookup::Found(addr) => Some(addr),
                    Lookup::NotFound => None,
                    Lookup::NotConfigured => {
                        return Err(Error::unexpected_absence("addr", name));
                    }
                };

                debug!("{} uses resolver {} (resolves to {:?})", name, resolver, resolved);
                return Ok(ResolverBinding {
                    resolver: Some(resolver),
                    resolved,
                    deployed: false,
                });
            }
            Lookup::Found(_) | Lookup::NotFound => {}
            Lookup::NotConfigured => return Err(Error::unexpected_absence("resolver", name)),
        }

        if self.config.dry_run {
            info!("[dry-run] {} has no resolver, would deploy {}", name, ContractArtifact::PublicResolver);
            self.emit_event(BinderEvent::WritePlanned {
                name: name.to_string(),
                action: format!("deploy {} and attach it", ContractArtifact::PublicResolver),
            });
            return Ok(ResolverBinding {
                resolver: None,
                resolved: None,
                deployed: true,
            });
        }

        // The resolver is constructed against the registry actually in use
        let registry_address = match registry.address {
            Some(address) => address,
            None => client
                .registry()
                .await?
                .found()
                .ok_or_else(|| Error::unexpected_absence("registry", name))?,
        };

        info!("{} has no resolver, deploying {}", name, ContractArtifact::PublicResolver);
        let handle = self
            .deployer
            .deploy(ContractArtifact::PublicResolver, &[registry_address], from)
            .await?;
        self.emit_event(BinderEvent::ResolverDeployed {
            name: name.to_string(),
            address: handle.address,
        });

        client.set_resolver(node, handle.address, from).await?;

        info!("Attached resolver {} to {}", handle.address, name);
        self.emit_event(BinderEvent::ResolverAttached {
            name: name.to_string(),
            resolver: handle.address,
        });

        Ok(ResolverBinding {
            resolver: Some(handle.address),
            resolved: None,
            deployed: true,
        })
    }
}
