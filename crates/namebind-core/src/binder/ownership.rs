//! Ownership guard
//!
//! No resolver write or address write happens unless
//! [`verify_owner`](NameBinder::verify_owner) has confirmed
//! `owner(name) == from` in the same call.

use tracing::{debug, info};

use super::{BinderEvent, NameBinder};
use crate::error::{Error, Result};
use crate::types::{Address, Lookup, Node, RegistryHandle};

impl NameBinder {
    /// Give `from` ownership of `name` on a registry this binder deployed
    ///
    /// The deployer owns the root node of a new registry, so each level of
    /// the name is claimed from the root down: `alice.eth` takes one
    /// `set_subnode_owner` for `eth` under the root, then one for `alice`
    /// under `eth`. A single-label name takes exactly one write.
    ///
    /// The claim stays pending on the binder until every level is written,
    /// so a retry after a failure here claims again from the root.
    pub(crate) async fn claim_name(
        &self,
        registry: &RegistryHandle,
        name: &str,
        from: Address,
    ) -> Result<()> {
        let labels: Vec<&str> = name.split('.').collect();
        let client = self.client(registry);

        for depth in (0..labels.len()).rev() {
            let parent = self.hasher.node(&labels[depth + 1..].join("."));
            let label = self.hasher.label(labels[depth]);
            client.set_subnode_owner(parent, label, from, from).await?;
        }

        if let Some(deployed) = self.deployed_registry.write().await.as_mut()
            && Some(deployed.address) == registry.address
        {
            deployed.pending_claim = None;
        }

        info!("Claimed {} for {} on fresh registry", name, from);
        self.emit_event(BinderEvent::NameClaimed {
            name: name.to_string(),
            owner: from,
        });
        Ok(())
    }

    /// Whether `name` is still owed to `from` on the handle's registry
    pub(crate) async fn claim_pending(
        &self,
        registry: &RegistryHandle,
        name: &str,
        from: Address,
    ) -> bool {
        match self.deployed_registry.read().await.as_ref() {
            Some(deployed) if Some(deployed.address) == registry.address => deployed
                .pending_claim
                .as_ref()
                .is_some_and(|(owed, owner)| owed == name && *owner == from),
            _ => false,
        }
    }

    /// Fail with [`Error::Unauthorized`] unless `from` owns `node`
    ///
    /// A name with no owner record counts as owned by the zero address.
    pub(crate) async fn verify_owner(
        &self,
        registry: &RegistryHandle,
        name: &str,
        node: Node,
        from: Address,
    ) -> Result<()> {
        let owner = match self.client(registry).owner(node).await? {
            Lookup::Found(owner) => owner,
            Lookup::NotFound => Address::ZERO,
            Lookup::NotConfigured => return Err(Error::unexpected_absence("owner", name)),
        };

        // Registration-on-demand for unowned names is out of scope
        if owner != from {
            return Err(Error::unauthorized(name, from, owner));
        }

        debug!("{} is owned by {}", name, owner);
        self.emit_event(BinderEvent::OwnershipVerified {
            name: name.to_string(),
            owner,
        });
        Ok(())
    }
}
