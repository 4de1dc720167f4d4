//! Server configuration.
//!
//! Values come from command-line flags or `HIROBA_*` environment variables (see
//! the server binary); this module only holds and validates them.

use thiserror::Error;

/// Default outbound queue size per connection.
pub const DEFAULT_OUTBOUND_CAPACITY: usize = 256;
/// Default size of the hub's command channel.
pub const DEFAULT_COMMAND_CAPACITY: usize = 1024;

#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum ConfigError {
    #[error("{0} must be greater than zero")]
    ZeroCapacity(&'static str),
}

/// Hub sizing.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct HubConfig {
    /// Frames a single connection may have waiting before it is evicted.
    pub outbound_capacity: usize,
    /// Requests that may queue up in front of the dispatcher.
    pub command_capacity: usize,
}

impl Default for HubConfig {
    fn default() -> Self {
        Self {
            outbound_capacity: DEFAULT_OUTBOUND_CAPACITY,
            command_capacity: DEFAULT_COMMAND_CAPACITY,
        }
    }
}

impl HubConfig {
    pub fn validate(self) -> Result<Self, ConfigError> {
        if self.outbound_capacity == 0 {
            return Err(ConfigError::ZeroCapacity("outbound_capacity"));
        }
        if self.command_capacity == 0 {
            return Err(ConfigError::ZeroCapacity("command_capacity"));
        }
        Ok(self)
    }
}

/// Everything the server binary needs to start.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ServerConfig {
    pub host: String,
    pub port: u16,
    pub hub: HubConfig,
    /// Maximum number of messages kept by the in-memory store (`None` = unbounded).
    pub history_capacity: Option<usize>,
}

impl ServerConfig {
    pub fn bind_addr(&self) -> String {
        format!("{}:{}", self.host, self.port)
    }

    pub fn validate(self) -> Result<Self, ConfigError> {
        let hub = self.hub.validate()?;
        if self.history_capacity == Some(0) {
            return Err(ConfigError::ZeroCapacity("history_capacity"));
        }
        Ok(Self { hub, ..self })
    }
}
