#![cfg_attr(all(not(debug_assertions), not(test)), deny(warnings))]
#![cfg_attr(
    all(not(debug_assertions), not(test)),
    deny(clippy::all, clippy::pedantic, clippy::nursery)
)]
#![allow(clippy::module_name_repetitions, clippy::missing_errors_doc)]
//! Config schema for the scale reader.
//!
//! - `Config` and sub-structs are deserialized from TOML and validated.
//! - Only `[scale]` is required; every other table has defaults.

use serde::Deserialize;

#[derive(Debug, Deserialize, Clone, Copy, PartialEq, Eq, Default)]
#[serde(rename_all = "lowercase")]
pub enum ParityCfg {
    #[default]
    None,
    Odd,
    Even,
}

#[derive(Debug, Deserialize, Clone, PartialEq, Eq)]
#[serde(default)]
pub struct PortCfg {
    /// Device path, e.g. "/dev/ttyUSB0" or "COM3"
    pub path: String,
    pub baud_rate: u32,
    pub data_bits: u8,
    pub parity: ParityCfg,
    pub stop_bits: u8,
}

impl Default for PortCfg {
    fn default() -> Self {
        Self {
            path: "/dev/ttyUSB0".to_string(),
            baud_rate: 9600,
            data_bits: 8,
            parity: ParityCfg::None,
            stop_bits: 1,
        }
    }
}

#[derive(Debug, Deserialize, Clone, Copy, PartialEq, Eq)]
#[serde(rename_all = "lowercase")]
pub enum DialectCfg {
    /// Continuous-print balances (push)
    Ohaus,
    /// Immediate-print balances (poll)
    Si,
}

#[derive(Debug, Deserialize, Clone, Copy)]
pub struct ScaleCfg {
    pub dialect: DialectCfg,
}

#[derive(Debug, Deserialize, Clone, PartialEq, Eq)]
#[serde(default)]
pub struct Timing {
    /// Gap between a poll cycle ending and the next poll (SI only)
    pub poll_interval_ms: u64,
    /// Longest single wait on the port. Also accepts alias "read_ms".
    #[serde(alias = "read_ms")]
    pub read_timeout_ms: u64,
    /// Give up on a poll reply after this long (SI only)
    pub response_timeout_ms: u64,
}

impl Default for Timing {
    fn default() -> Self {
        Self {
            poll_interval_ms: 250,
            read_timeout_ms: 50,
            response_timeout_ms: 1000,
        }
    }
}

#[derive(Debug, Deserialize, Default)]
#[serde(default)]
pub struct Logging {
    pub file: Option<String>,  // path to .log (JSON lines)
    pub level: Option<String>, // "info","debug"
    /// Log rotation policy: "never" | "daily" | "hourly" (default: never)
    pub rotation: Option<String>,
}

#[derive(Debug, Deserialize)]
pub struct Config {
    #[serde(default)]
    pub port: PortCfg,
    pub scale: ScaleCfg,
    #[serde(default)]
    pub timing: Timing,
    #[serde(default)]
    pub logging: Logging,
}

pub fn load_toml(s: &str) -> Result<Config, toml::de::Error> {
    toml::from_str::<Config>(s)
}

/// Read and parse a config file; does not validate.
pub fn load_file(path: &std::path::Path) -> eyre::Result<Config> {
    let text = std::fs::read_to_string(path)
        .map_err(|e| eyre::eyre!("read config {}: {}", path.display(), e))?;
    load_toml(&text).map_err(|e| eyre::eyre!("parse config {}: {}", path.display(), e))
}

impl Config {
    pub fn validate(&self) -> eyre::Result<()> {
        // Port
        if self.port.path.trim().is_empty() {
            eyre::bail!("port.path must not be empty");
        }
        if self.port.baud_rate == 0 {
            eyre::bail!("port.baud_rate must be > 0");
        }
        if !(5..=8).contains(&self.port.data_bits) {
            eyre::bail!("port.data_bits must be in 5..=8");
        }
        if !matches!(self.port.stop_bits, 1 | 2) {
            eyre::bail!("port.stop_bits must be 1 or 2");
        }

        // Timing
        if self.timing.poll_interval_ms == 0 {
            eyre::bail!("timing.poll_interval_ms must be >= 1");
        }
        if self.timing.read_timeout_ms == 0 {
            eyre::bail!("timing.read_timeout_ms must be >= 1");
        }
        if self.timing.response_timeout_ms < self.timing.read_timeout_ms {
            eyre::bail!("timing.response_timeout_ms must be >= timing.read_timeout_ms");
        }
        if self.timing.poll_interval_ms > 60 * 60 * 1000 {
            eyre::bail!("timing.poll_interval_ms is unreasonably large (>1h)");
        }

        // Logging
        if let Some(rotation) = self.logging.rotation.as_deref()
            && !matches!(rotation, "never" | "daily" | "hourly")
        {
            eyre::bail!("logging.rotation must be one of never|daily|hourly");
        }

        Ok(())
    }
}
