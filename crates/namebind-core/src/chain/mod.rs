//! Chain implementations of the collaborator traits
//!
//! This module contains built-in implementations that need no external
//! provider.

pub mod memory;

pub use memory::{ChainOp, MemoryChain, MemoryRegistryClient, TxKind, TxRecord};
