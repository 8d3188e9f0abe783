//! Error types for the name binder
//!
//! This module defines all error types used throughout the crate.
//!
//! Absence of a registry or of a resolver is NOT an error here: those are
//! [`Lookup::NotConfigured`](crate::types::Lookup::NotConfigured) and
//! [`Lookup::NotFound`](crate::types::Lookup::NotFound), and the binder
//! consumes them while provisioning.

use crate::types::Address;
use thiserror::Error;

/// Result type alias for name binder operations
pub type Result<T> = std::result::Result<T, Error>;

/// Core error type for the name binder
#[derive(Error, Debug)]
pub enum Error {
    /// The `from` address does not own the name being bound
    #[error(
        "The address in the \"from\" field does not own the specified name. \
         The \"from\" address must match the owner of the name.\n\
         > Failed to bind name {name}\n\
         > Address in \"from\" field - {from}\n\
         > Current owner of '{name}' - {owner}"
    )]
    Unauthorized {
        /// The name that was being bound
        name: String,
        /// The address supplied as `from`
        from: Address,
        /// The actual owner recorded in the registry
        owner: Address,
    },

    /// Failure reported by the RPC/transaction layer (network, revert, gas, bad response)
    #[error("Transport error: {0}")]
    Transport(String),

    /// A read came back absent at a step where absence cannot be provisioned
    #[error("Unexpected absence: {query} for '{name}' returned no value")]
    UnexpectedAbsence {
        /// The query that came back empty (e.g. "owner")
        query: &'static str,
        /// The name being bound
        name: String,
    },

    /// Configuration errors
    #[error("Configuration error: {0}")]
    Config(String),

    /// Invalid input
    #[error("Invalid input: {0}")]
    InvalidInput(String),

    /// I/O errors (config files)
    #[error("I/O error: {0}")]
    Io(#[from] std::io::Error),

    /// JSON serialization/deserialization errors
    #[error("JSON error: {0}")]
    Json(#[from] serde_json::Error),

    /// Generic error with context
    #[error("{0}")]
    Other(String),
}

impl Error {
    /// Create an authorization error
    pub fn unauthorized(name: impl Into<String>, from: Address, owner: Address) -> Self {
        Self::Unauthorized {
            name: name.into(),
            from,
            owner,
        }
    }

    /// Create a transport error
    pub fn transport(msg: impl Into<String>) -> Self {
        Self::Transport(msg.into())
    }

    /// Create an unexpected-absence error
    pub fn unexpected_absence(query: &'static str, name: impl Into<String>) -> Self {
        Self::UnexpectedAbsence {
            query,
            name: name.into(),
        }
    }

    /// Create a configuration error
    pub fn config(msg: impl Into<String>) -> Self {
        Self::Config(msg.into())
    }

    /// Create an invalid input error
    pub fn invalid_input(msg: impl Into<String>) -> Self {
        Self::InvalidInput(msg.into())
    }

    /// Whether this is the caller-facing ownership failure
    pub fn is_unauthorized(&self) -> bool {
        matches!(self, Self::Unauthorized { .. })
    }
}

/// Helper for converting anyhow::Error to our Error type
impl From<anyhow::Error> for Error {
    fn from(err: anyhow::Error) -> Self {
        Self::Other(err.to_string())
    }
}
