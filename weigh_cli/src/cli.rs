//! CLI argument definitions and shared statics.

use clap::{ArgAction, Parser, Subcommand, ValueEnum};
use std::path::PathBuf;
use std::sync::OnceLock;

pub static FILE_GUARD: OnceLock<tracing_appender::non_blocking::WorkerGuard> = OnceLock::new();
/// Whether the user asked for JSON output (controls structured error output).
pub static JSON_MODE: OnceLock<bool> = OnceLock::new();

#[derive(Parser, Debug)]
#[command(name = "weigh", version, about = "Serial scale reader")]
pub struct Cli {
    /// Path to config TOML (typed)
    #[arg(long, value_name = "FILE", default_value = "etc/weigh.toml")]
    pub config: PathBuf,

    /// Print readings and errors as JSON lines
    #[arg(long, action = ArgAction::SetTrue)]
    pub json: bool,

    /// Console log level (error|warn|info|debug|trace); overrides [logging].level
    #[arg(long = "log-level", value_name = "LEVEL")]
    pub log_level: Option<String>,

    /// Command to execute
    #[command(subcommand)]
    pub cmd: Commands,
}

#[derive(Copy, Clone, Debug, Eq, PartialEq, ValueEnum)]
pub enum DialectArg {
    /// Continuous-print balances
    Ohaus,
    /// Immediate-print balances
    Si,
}

impl From<DialectArg> for weigh_core::Dialect {
    fn from(d: DialectArg) -> Self {
        match d {
            DialectArg::Ohaus => weigh_core::Dialect::Ohaus,
            DialectArg::Si => weigh_core::Dialect::Si,
        }
    }
}

#[derive(Subcommand, Debug)]
pub enum Commands {
    /// Stream readings until Ctrl-C, a count, or a duration is reached
    Read {
        /// Stop after this many readings
        #[arg(long, value_name = "N")]
        count: Option<u64>,
        /// Stop after this many milliseconds
        #[arg(long, value_name = "MS")]
        duration_ms: Option<u64>,
        /// Override [scale].dialect from the config
        #[arg(long, value_enum)]
        dialect: Option<DialectArg>,
    },
    /// Zero the scale (push dialects only)
    Tare,
    /// Open the scale and wait for one good reading
    SelfCheck,
}
