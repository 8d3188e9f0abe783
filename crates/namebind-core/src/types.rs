// # Core Types
//
// Value types shared by the binder and its collaborators.
//
// - `Address`: 20-byte account or contract address
// - `Node` / `LabelHash`: 32-byte name and label hashes
// - `Lookup<T>`: discriminated outcome of a registry or resolver read
// - `ContractArtifact` / `ContractHandle`: what the binder deploys
// - `RegistryHandle`: the registry state of one reconciliation call

use serde::{Deserialize, Deserializer, Serialize, Serializer};
use std::fmt;
use std::str::FromStr;

use crate::Error;

/// A 20-byte account or contract address
///
/// Parsing accepts `0x`-prefixed or bare hex in any letter case. Equality is
/// byte equality, so two spellings of the same address always compare equal.
#[derive(Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord, Default)]
pub struct Address([u8; 20]);

impl Address {
    /// The unset address
    pub const ZERO: Address = Address([0u8; 20]);

    /// Wrap raw address bytes
    pub const fn new(bytes: [u8; 20]) -> Self {
        Self(bytes)
    }

    /// Raw address bytes
    pub fn as_bytes(&self) -> &[u8; 20] {
        &self.0
    }

    /// Whether this is the zero address
    pub fn is_zero(&self) -> bool {
        self.0 == [0u8; 20]
    }

    /// Build an address whose last eight bytes hold `n` (handy for fixtures)
    pub fn from_low_u64(n: u64) -> Self {
        let mut bytes = [0u8; 20];
        bytes[12..].copy_from_slice(&n.to_be_bytes());
        Self(bytes)
    }
}

impl FromStr for Address {
    type Err = Error;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        let digits = strip_hex_prefix(s.trim());
        if digits.len() != 40 {
            return Err(Error::invalid_input(format!(
                "address must be 40 hex digits, got {} in '{}'",
                digits.len(),
                s
            )));
        }

        let mut bytes = [0u8; 20];
        hex::decode_to_slice(digits, &mut bytes)
            .map_err(|e| Error::invalid_input(format!("invalid address '{}': {}", s, e)))?;
        Ok(Self(bytes))
    }
}

impl fmt::Display for Address {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "0x{}", hex::encode(self.0))
    }
}

impl fmt::Debug for Address {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "Address({})", self)
    }
}

impl Serialize for Address {
    fn serialize<S: Serializer>(&self, serializer: S) -> Result<S::Ok, S::Error> {
        serializer.serialize_str(&self.to_string())
    }
}

impl<'de> Deserialize<'de> for Address {
    fn deserialize<D: Deserializer<'de>>(deserializer: D) -> Result<Self, D::Error> {
        let s = String::deserialize(deserializer)?;
        s.parse().map_err(serde::de::Error::custom)
    }
}

/// 32-byte hash identifying a name in the registry
#[derive(Clone, Copy, PartialEq, Eq, Hash, Default)]
pub struct Node([u8; 32]);

impl Node {
    /// The root node (hash of the empty name)
    pub const ROOT: Node = Node([0u8; 32]);

    /// Wrap raw hash bytes
    pub const fn new(bytes: [u8; 32]) -> Self {
        Self(bytes)
    }

    /// Raw hash bytes
    pub fn as_bytes(&self) -> &[u8; 32] {
        &self.0
    }
}

impl fmt::Display for Node {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "0x{}", hex::encode(self.0))
    }
}

impl fmt::Debug for Node {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "Node({})", self)
    }
}

/// 32-byte hash of a single name label
#[derive(Clone, Copy, PartialEq, Eq, Hash, Default)]
pub struct LabelHash([u8; 32]);

impl LabelHash {
    /// Wrap raw hash bytes
    pub const fn new(bytes: [u8; 32]) -> Self {
        Self(bytes)
    }

    /// Raw hash bytes
    pub fn as_bytes(&self) -> &[u8; 32] {
        &self.0
    }
}

impl fmt::Display for LabelHash {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "0x{}", hex::encode(self.0))
    }
}

impl fmt::Debug for LabelHash {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "LabelHash({})", self)
    }
}

/// Outcome of a registry or resolver read
///
/// Transport failures are not represented here: they are the `Err` side of
/// the `Result` wrapping a `Lookup`.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Lookup<T> {
    /// The value exists
    Found(T),
    /// No registry contract is configured at the queried address
    NotConfigured,
    /// The registry exists but the name has no record for this query
    NotFound,
}

impl<T> Lookup<T> {
    /// The found value, if any
    pub fn found(self) -> Option<T> {
        match self {
            Lookup::Found(value) => Some(value),
            Lookup::NotConfigured | Lookup::NotFound => None,
        }
    }

    /// Whether the registry itself is missing
    pub fn is_not_configured(&self) -> bool {
        matches!(self, Lookup::NotConfigured)
    }
}

/// Contracts the binder knows how to deploy
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum ContractArtifact {
    /// Name registry (owner/resolver per node); no constructor arguments
    Registry,
    /// Public resolver; constructor argument is the registry address
    PublicResolver,
}

impl ContractArtifact {
    /// Artifact name (for logging/debugging)
    pub fn name(&self) -> &'static str {
        match self {
            ContractArtifact::Registry => "ENSRegistry",
            ContractArtifact::PublicResolver => "PublicResolver",
        }
    }
}

impl fmt::Display for ContractArtifact {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.name())
    }
}

/// A contract deployed through a [`ContractDeployer`](crate::traits::ContractDeployer)
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct ContractHandle {
    /// What was deployed
    pub artifact: ContractArtifact,
    /// Where it lives
    pub address: Address,
}

/// Registry state for a single reconciliation call
///
/// `freshly_deployed` is true only when the current call deployed the
/// registry; it never survives the call that set it.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub struct RegistryHandle {
    /// Registry address, `None` meaning "use the network default"
    pub address: Option<Address>,
    /// Whether this call deployed the registry
    pub freshly_deployed: bool,
}

impl RegistryHandle {
    /// Handle for an existing (or defaulted) registry
    pub fn existing(address: Option<Address>) -> Self {
        Self {
            address,
            freshly_deployed: false,
        }
    }

    /// Handle for a registry deployed during this call
    pub fn fresh(address: Address) -> Self {
        Self {
            address: Some(address),
            freshly_deployed: true,
        }
    }
}

fn strip_hex_prefix(s: &str) -> &str {
    s.strip_prefix("0x")
        .or_else(|| s.strip_prefix("0X"))
        .unwrap_or(s)
}
