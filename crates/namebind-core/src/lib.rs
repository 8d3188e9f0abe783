// # namebind-core
//
// Name-binding reconciliation against a decentralized naming registry.
//
// ## Architecture Overview
//
// Given a name, a target address and the account that should own the name,
// the binder makes sure that:
// - a registry contract exists and is reachable (deploying one if not),
// - the caller owns the name (refusing to mutate anything otherwise),
// - the name has a resolver (deploying and attaching one if not),
// - the resolver's address record equals the target (writing it if not).
//
// Building blocks:
// - **RegistryConnector / RegistryClient**: Read and write registry/resolver records
// - **ContractDeployer**: Deploy registry and resolver contracts
// - **NameHasher**: Turn names into registry nodes (EIP-137 namehash by default)
// - **NameBinder**: Orchestrates the reconciliation
// - **MemoryChain**: In-memory development chain implementing the collaborators
//
// ## Design Principles
//
// 1. **Absence is data**: "no registry" and "no resolver" are `Lookup` variants, not errors
// 2. **Fail fast**: Every other failure reaches the caller unchanged, with no retries
// 3. **Ownership first**: No resolver or address write before the owner check passes
// 4. **Idempotency**: Re-running a successful bind issues no transaction at all
// 5. **Library-First**: The binder is embedded; it ships no CLI of its own

pub mod binder;
pub mod chain;
pub mod config;
pub mod error;
pub mod traits;
pub mod types;

// Re-export core types for convenience
pub use binder::{BindOutcome, BindReport, BindRequest, BinderEvent, NameBinder};
pub use chain::MemoryChain;
pub use config::BinderConfig;
pub use error::{Error, Result};
pub use traits::{ContractDeployer, NameHasher, Namehash, RegistryClient, RegistryConnector};
pub use types::{Address, ContractArtifact, ContractHandle, LabelHash, Lookup, Node, RegistryHandle};
