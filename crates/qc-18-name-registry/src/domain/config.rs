//! Registry configuration and validation
//!
//! # Example
//!
//! ```ignore
//! use qc_18_name_registry::domain::{DomainId, RegistryConfigBuilder};
//!
//! let config = RegistryConfigBuilder::new(DomainId(40161))
//!     .max_name_length(24)
//!     .build()
//!     .expect("Valid config");
//! ```

use super::invariants::MAX_NAME_LENGTH;
use super::value_objects::DomainId;
use serde::{Deserialize, Serialize};
use std::env;
use thiserror::Error;

/// Upper bound for `max_name_length`.
pub const NAME_LENGTH_CEILING: usize = 255;

/// Default broadcast capacity for registry events.
pub const DEFAULT_EVENT_CAPACITY: usize = 1024;

/// Configuration errors.
#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum ConfigError {
    /// Domain id zero is reserved.
    #[error("Local domain id must be non-zero")]
    InvalidDomain,

    /// Name length outside the accepted range.
    #[error("Invalid max name length: {0} (must be 1..=255)")]
    InvalidMaxNameLength(usize),

    /// Zero-capacity event channel.
    #[error("Event channel capacity must be non-zero")]
    InvalidCapacity,

    /// Environment variable failed to parse.
    #[error("Invalid value for {var}: {value}")]
    Env {
        /// Variable name
        var: String,
        /// Raw value
        value: String,
    },
}

/// Registry configuration.
#[derive(Clone, Debug, PartialEq, Eq, Serialize, Deserialize)]
pub struct RegistryConfig {
    /// Domain this registry instance runs on.
    pub local_domain: DomainId,
    /// Maximum name length in bytes.
    pub max_name_length: usize,
    /// Buffered events per subscriber.
    pub event_channel_capacity: usize,
}

impl RegistryConfig {
    /// Configuration with defaults for `local_domain`.
    pub fn new(local_domain: DomainId) -> Self {
        Self {
            local_domain,
            max_name_length: MAX_NAME_LENGTH,
            event_channel_capacity: DEFAULT_EVENT_CAPACITY,
        }
    }

    /// Load from environment variables.
    ///
    /// | Variable | Default |
    /// |----------|---------|
    /// | `QC_NAME_DOMAIN` | required |
    /// | `QC_NAME_MAX_LENGTH` | `32` |
    /// | `QC_NAME_EVENT_CAPACITY` | `1024` |
    pub fn from_env() -> Result<Self, ConfigError> {
        let domain = parse_env::<u32>("QC_NAME_DOMAIN")?.ok_or(ConfigError::InvalidDomain)?;
        let mut builder = RegistryConfigBuilder::new(DomainId(domain));
        if let Some(len) = parse_env("QC_NAME_MAX_LENGTH")? {
            builder = builder.max_name_length(len);
        }
        if let Some(capacity) = parse_env("QC_NAME_EVENT_CAPACITY")? {
            builder = builder.event_channel_capacity(capacity);
        }
        builder.build()
    }

    /// Validate configuration bounds.
    pub fn validate(&self) -> Result<(), ConfigError> {
        if self.local_domain.0 == 0 {
            return Err(ConfigError::InvalidDomain);
        }
        if self.max_name_length == 0 || self.max_name_length > NAME_LENGTH_CEILING {
            return Err(ConfigError::InvalidMaxNameLength(self.max_name_length));
        }
        if self.event_channel_capacity == 0 {
            return Err(ConfigError::InvalidCapacity);
        }
        Ok(())
    }
}

fn parse_env<T: std::str::FromStr>(var: &str) -> Result<Option<T>, ConfigError> {
    match env::var(var) {
        Ok(value) => value.trim().parse().map(Some).map_err(|_| ConfigError::Env {
            var: var.to_string(),
            value,
        }),
        Err(_) => Ok(None),
    }
}

/// Builder for RegistryConfig with validation
#[derive(Clone, Debug)]
pub struct RegistryConfigBuilder {
    local_domain: DomainId,
    max_name_length: Option<usize>,
    event_channel_capacity: Option<usize>,
}

impl RegistryConfigBuilder {
    /// Start a builder for `local_domain`.
    pub fn new(local_domain: DomainId) -> Self {
        Self {
            local_domain,
            max_name_length: None,
            event_channel_capacity: None,
        }
    }

    /// Set maximum name length in bytes.
    pub fn max_name_length(mut self, len: usize) -> Self {
        self.max_name_length = Some(len);
        self
    }

    /// Set event channel capacity.
    pub fn event_channel_capacity(mut self, capacity: usize) -> Self {
        self.event_channel_capacity = Some(capacity);
        self
    }

    /// Build and validate.
    pub fn build(self) -> Result<RegistryConfig, ConfigError> {
        let defaults = RegistryConfig::new(self.local_domain);
        let config = RegistryConfig {
            local_domain: self.local_domain,
            max_name_length: self.max_name_length.unwrap_or(defaults.max_name_length),
            event_channel_capacity: self
                .event_channel_capacity
                .unwrap_or(defaults.event_channel_capacity),
        };
        config.validate()?;
        Ok(config)
    }
}
