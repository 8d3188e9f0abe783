//! Collaborator traits for the name binder
//!
//! This module defines the abstract interfaces the binder drives.
//!
//! - [`RegistryClient`] / [`RegistryConnector`]: Read and write name records
//! - [`ContractDeployer`]: Deploy registry and resolver contracts
//! - [`NameHasher`]: Turn names into registry nodes

pub mod registry_client;
pub mod deployer;
pub mod name_hasher;

pub use registry_client::{RegistryClient, RegistryConnector};
pub use deployer::ContractDeployer;
pub use name_hasher::{NameHasher, Namehash};
