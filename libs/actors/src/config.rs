//! System Configuration
//!
//! Environment-driven defaults for every system: mailbox sizing, overflow
//! behavior and the ask deadline.

use crate::error::{ActorError, Result};
use crate::options::{OverflowPolicy, SpawnOptions};
use serde::{Deserialize, Serialize};
use std::env;
use std::time::Duration;

/// Mailbox capacity used when spawn options do not override it
pub const DEFAULT_MAILBOX_CAPACITY: usize = 1000;

/// How long an ask waits for its reply by default
pub const DEFAULT_ASK_TIMEOUT_MS: u64 = 3000;

/// Configuration shared by all actors of one system
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default)]
pub struct SystemConfig {
    /// Name recorded on the system's tracing span
    pub name: String,

    /// Mailbox capacity for actors spawned without explicit options
    pub default_mailbox_capacity: usize,

    /// Overflow policy for actors spawned without explicit options
    pub default_overflow: OverflowPolicy,

    /// Ask deadline in milliseconds
    pub ask_timeout_ms: u64,
}

impl Default for SystemConfig {
    fn default() -> Self {
        Self {
            name: "actors".to_string(),
            default_mailbox_capacity: DEFAULT_MAILBOX_CAPACITY,
            default_overflow: OverflowPolicy::Block,
            ask_timeout_ms: DEFAULT_ASK_TIMEOUT_MS,
        }
    }
}

impl SystemConfig {
    /// Load configuration from environment variables with defaults
    pub fn from_env() -> Self {
        let defaults = Self::default();

        Self {
            name: env::var("ACTORS_SYSTEM_NAME").unwrap_or(defaults.name),

            default_mailbox_capacity: env::var("ACTORS_MAILBOX_CAPACITY")
                .ok()
                .and_then(|s| s.parse().ok())
                .unwrap_or(defaults.default_mailbox_capacity),

            default_overflow: env::var("ACTORS_OVERFLOW_POLICY")
                .ok()
                .and_then(|s| s.parse().ok())
                .unwrap_or(defaults.default_overflow),

            ask_timeout_ms: env::var("ACTORS_ASK_TIMEOUT_MS")
                .ok()
                .and_then(|s| s.parse().ok())
                .unwrap_or(defaults.ask_timeout_ms),
        }
    }

    /// Validate configuration
    pub fn validate(&self) -> Result<()> {
        if self.name.trim().is_empty() {
            return Err(ActorError::configuration(
                "System name cannot be empty",
                Some("name"),
            ));
        }

        if self.default_mailbox_capacity == 0 {
            return Err(ActorError::configuration(
                "Default mailbox capacity must be greater than 0",
                Some("default_mailbox_capacity"),
            ));
        }

        if self.ask_timeout_ms == 0 {
            return Err(ActorError::configuration(
                "Ask timeout must be greater than 0",
                Some("ask_timeout_ms"),
            ));
        }

        Ok(())
    }

    pub fn ask_timeout(&self) -> Duration {
        Duration::from_millis(self.ask_timeout_ms)
    }

    /// Spawn options used when the caller passes none
    pub fn spawn_options(&self) -> SpawnOptions {
        SpawnOptions::new().with_mailbox(self.default_mailbox_capacity, self.default_overflow)
    }
}
