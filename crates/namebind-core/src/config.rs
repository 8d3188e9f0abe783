//! Configuration types for the name binder
//!
//! This module defines the settings a [`NameBinder`](crate::NameBinder) is
//! constructed with. They are immutable for the binder's lifetime.

use serde::{Deserialize, Serialize};
use std::env;
use std::path::Path;

use crate::types::Address;

/// Name binder configuration
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct BinderConfig {
    /// Registry address override
    ///
    /// `None` means "use the network default". If the network has no
    /// default registry either, the binder deploys one.
    #[serde(default)]
    pub registry_address: Option<Address>,

    /// Capacity of the binder event channel
    ///
    /// When full, new events are dropped (with a warning log).
    #[serde(default = "default_event_channel_capacity")]
    pub event_channel_capacity: usize,

    /// Perform every read and decision but no deployment or write
    #[serde(default)]
    pub dry_run: bool,
}

impl BinderConfig {
    /// Create a new configuration with defaults
    pub fn new() -> Self {
        Self {
            registry_address: None,
            event_channel_capacity: default_event_channel_capacity(),
            dry_run: false,
        }
    }

    /// Use a specific registry instead of the network default
    pub fn with_registry_address(mut self, registry_address: Address) -> Self {
        self.registry_address = Some(registry_address);
        self
    }

    /// Enable or disable dry-run mode
    pub fn with_dry_run(mut self, dry_run: bool) -> Self {
        self.dry_run = dry_run;
        self
    }

    /// Validate the configuration
    pub fn validate(&self) -> Result<(), crate::Error> {
        if self.registry_address.is_some_and(|addr| addr.is_zero()) {
            return Err(crate::Error::config(
                "Registry address override cannot be the zero address; omit it to use the network default",
            ));
        }

        if self.event_channel_capacity == 0 {
            return Err(crate::Error::config("Event channel capacity must be > 0"));
        }

        Ok(())
    }

    /// Parse a JSON configuration document
    pub fn from_json_str(json: &str) -> Result<Self, crate::Error> {
        let config: Self = serde_json::from_str(json)?;
        config.validate()?;
        Ok(config)
    }

    /// Load a JSON configuration file
    pub fn from_file(path: impl AsRef<Path>) -> Result<Self, crate::Error> {
        let contents = std::fs::read_to_string(path)?;
        Self::from_json_str(&contents)
    }

    /// Load configuration from environment variables
    ///
    /// - `NAMEBIND_REGISTRY_ADDRESS`: Registry address override (optional)
    /// - `NAMEBIND_EVENT_CHANNEL_CAPACITY`: Event channel capacity (optional)
    /// - `NAMEBIND_DRY_RUN`: `true`/`1` to enable dry-run mode (optional)
    pub fn from_env() -> Result<Self, crate::Error> {
        let mut config = Self::new();

        if let Ok(raw) = env::var("NAMEBIND_REGISTRY_ADDRESS")
            && !raw.trim().is_empty()
        {
            config.registry_address = Some(raw.parse().map_err(|e| {
                crate::Error::config(format!("NAMEBIND_REGISTRY_ADDRESS: {}", e))
            })?);
        }

        if let Ok(raw) = env::var("NAMEBIND_EVENT_CHANNEL_CAPACITY") {
            config.event_channel_capacity = raw.trim().parse().map_err(|_| {
                crate::Error::config(format!(
                    "NAMEBIND_EVENT_CHANNEL_CAPACITY must be a positive integer. Got: {}",
                    raw
                ))
            })?;
        }

        if let Ok(raw) = env::var("NAMEBIND_DRY_RUN") {
            config.dry_run = matches!(raw.trim().to_lowercase().as_str(), "1" | "true" | "yes");
        }

        config.validate()?;
        Ok(config)
    }
}

impl Default for BinderConfig {
    fn default() -> Self {
        Self::new()
    }
}

fn default_event_channel_capacity() -> usize {
    64
}
