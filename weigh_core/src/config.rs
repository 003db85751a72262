//! Runtime timing for sessions.
//!
//! Separate from the TOML-deserialized config in `weigh_config`; see
//! `conversions` for the bridge.

use std::time::Duration;

use crate::error::BuildError;

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct SessionCfg {
    /// Delay between one poll cycle finishing and the next poll (poll dialects).
    pub poll_interval: Duration,
    /// Longest single wait for bytes. Bounds shutdown latency and command
    /// latency on push sessions.
    pub read_timeout: Duration,
    /// Give up on a poll response after this long (poll dialects).
    pub response_timeout: Duration,
}

impl Default for SessionCfg {
    fn default() -> Self {
        Self {
            poll_interval: Duration::from_millis(250),
            read_timeout: Duration::from_millis(50),
            response_timeout: Duration::from_millis(1000),
        }
    }
}

impl SessionCfg {
    pub fn validate(&self) -> Result<(), BuildError> {
        if self.poll_interval.is_zero() {
            return Err(BuildError::InvalidConfig("poll_interval must be > 0"));
        }
        if self.read_timeout.is_zero() {
            return Err(BuildError::InvalidConfig("read_timeout must be > 0"));
        }
        if self.response_timeout < self.read_timeout {
            return Err(BuildError::InvalidConfig(
                "response_timeout must be >= read_timeout",
            ));
        }
        Ok(())
    }
}
