// # Name Hasher Trait
//
// Defines how human-readable names become registry nodes.
//
// ## Implementations
//
// - `Namehash`: EIP-137 namehash over Keccak-256 (the registry standard)
//
// ## Usage
//
// ```rust
// use namebind_core::traits::{NameHasher, Namehash};
// use namebind_core::types::Node;
//
// let hasher = Namehash;
// assert_eq!(hasher.node(""), Node::ROOT);
// assert_ne!(hasher.node("eth"), Node::ROOT);
// ```

use sha3::{Digest, Keccak256};

use crate::types::{LabelHash, Node};

/// Trait for deterministic name hashing
///
/// Implementations must be pure: the same input always yields the same
/// hash, and distinct names must not collide in practice.
pub trait NameHasher: Send + Sync {
    /// Hash a full dotted name into a registry node
    fn node(&self, name: &str) -> Node;

    /// Hash a single label
    fn label(&self, label: &str) -> LabelHash;

    /// Hasher name (for logging/debugging)
    fn hasher_name(&self) -> &'static str;
}

/// EIP-137 namehash
///
/// `node("") = 0x00..00` and `node(label.rest) = keccak(node(rest) ++ keccak(label))`.
/// Names are trimmed and lowercased first; full UTS-46 normalization is left
/// to the caller.
#[derive(Debug, Clone, Copy, Default)]
pub struct Namehash;

impl NameHasher for Namehash {
    fn node(&self, name: &str) -> Node {
        let normalized = normalize_name(name);
        if normalized.is_empty() {
            return Node::ROOT;
        }

        normalized
            .rsplit('.')
            .fold(Node::ROOT, |parent, label| subnode(parent, self.label(label)))
    }

    fn label(&self, label: &str) -> LabelHash {
        LabelHash::new(keccak256(label.as_bytes()))
    }

    fn hasher_name(&self) -> &'static str {
        "namehash"
    }
}

/// Hash of `label` directly under `parent`
///
/// This is what a registry computes for `setSubnodeOwner(parent, label, ..)`.
pub fn subnode(parent: Node, label: LabelHash) -> Node {
    let mut buf = [0u8; 64];
    buf[..32].copy_from_slice(parent.as_bytes());
    buf[32..].copy_from_slice(label.as_bytes());
    Node::new(keccak256(&buf))
}

/// Trim and lowercase a name
pub fn normalize_name(name: &str) -> String {
    name.trim().to_lowercase()
}

fn keccak256(data: &[u8]) -> [u8; 32] {
    let digest = Keccak256::digest(data);
    let mut out = [0u8; 32];
    out.copy_from_slice(&digest);
    out
}
