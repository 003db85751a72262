#![cfg_attr(not(test), deny(clippy::unwrap_used, clippy::expect_used))]
//! `weigh`: read a serial scale from the command line.

mod cli;
mod error_fmt;
mod read;

use std::path::Path;
use std::sync::Arc;
use std::sync::atomic::{AtomicBool, Ordering};
use std::time::Duration;

use clap::Parser;
use tracing_subscriber::{EnvFilter, Layer, fmt, layer::SubscriberExt, util::SubscriberInitExt};

use crate::cli::{Cli, Commands, FILE_GUARD, JSON_MODE};
use crate::error_fmt::{exit_code_for_error, format_error_json, humanize};
use crate::read::ReadLimits;

fn main() {
    // Only affects panics and `{:?}` reports; user-facing errors go through humanize
    let _ = color_eyre::install();
    let cli = Cli::parse();
    let _ = JSON_MODE.set(cli.json);

    if let Err(err) = run(cli) {
        if JSON_MODE.get().copied().unwrap_or(false) {
            eprintln!("{}", format_error_json(&err));
        } else {
            eprintln!("{}", humanize(&err));
        }
        std::process::exit(exit_code_for_error(&err));
    }
}

fn run(cli: Cli) -> eyre::Result<()> {
    let cfg = weigh_config::load_file(&cli.config)?;
    cfg.validate()?;
    init_tracing(cli.json, cli.log_level.as_deref(), &cfg.logging)?;
    tracing::debug!(config = %cli.config.display(), "config loaded");

    match cli.cmd {
        Commands::Read {
            count,
            duration_ms,
            dialect,
        } => {
            let shutdown = Arc::new(AtomicBool::new(false));
            let flag = shutdown.clone();
            ctrlc::set_handler(move || flag.store(true, Ordering::Relaxed))
                .map_err(|e| eyre::eyre!("install Ctrl-C handler: {e}"))?;

            let dialect: weigh_core::Dialect = dialect.map_or_else(|| cfg.scale.dialect.into(), Into::into);
            let limits = ReadLimits {
                count,
                duration: duration_ms.map(Duration::from_millis),
            };
            let n = read::run_read(&cfg, dialect, limits, cli.json, shutdown)?;
            tracing::info!(readings = n, "read finished");
            Ok(())
        }
        Commands::Tare => read::run_tare(&cfg, cli.json),
        Commands::SelfCheck => read::run_self_check(&cfg, cli.json),
    }
}

/// Console logs go to stderr so stdout carries only readings.
/// Level precedence: RUST_LOG, then --log-level, then [logging].level, then "info".
fn init_tracing(
    json: bool,
    cli_level: Option<&str>,
    logging: &weigh_config::Logging,
) -> eyre::Result<()> {
    let level = cli_level
        .or(logging.level.as_deref())
        .unwrap_or("info")
        .to_string();
    let filter = EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new(&level));

    let console = if json {
        fmt::layer()
            .json()
            .with_writer(std::io::stderr)
            .boxed()
    } else {
        fmt::layer()
            .with_target(false)
            .with_writer(std::io::stderr)
            .boxed()
    };

    let file_layer = match logging.file.as_deref() {
        Some(file) => {
            let path = Path::new(file);
            let dir = path
                .parent()
                .filter(|p| !p.as_os_str().is_empty())
                .unwrap_or_else(|| Path::new("."));
            let name = path
                .file_name()
                .ok_or_else(|| eyre::eyre!("logging.file has no file name: {file}"))?;
            let appender = match logging.rotation.as_deref() {
                Some("daily") => tracing_appender::rolling::daily(dir, name),
                Some("hourly") => tracing_appender::rolling::hourly(dir, name),
                _ => tracing_appender::rolling::never(dir, name),
            };
            let (writer, guard) = tracing_appender::non_blocking(appender);
            let _ = FILE_GUARD.set(guard);
            Some(fmt::layer().json().with_ansi(false).with_writer(writer).boxed())
        }
        None => None,
    };

    tracing_subscriber::registry()
        .with(filter)
        .with(console)
        .with(file_layer)
        .try_init()
        .map_err(|e| eyre::eyre!("init tracing: {e}"))?;
    Ok(())
}
