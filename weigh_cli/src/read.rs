//! Scale commands: transport assembly, session setup and reading output.

use std::sync::Arc;
use std::sync::atomic::{AtomicBool, Ordering};
use std::time::{Duration, Instant};

use crossbeam_channel::RecvTimeoutError;
use weigh_core::{Dialect, Reading, ScaleEvent, Session, SessionCfg, SessionError};
use weigh_traits::Transport;

/// How long `self-check` and `tare` wait for a reading.
const SETTLE_WAIT: Duration = Duration::from_secs(3);
/// Event wait granularity; bounds Ctrl-C latency.
const TICK: Duration = Duration::from_millis(100);

/// Load carried by the simulated pan, in centigrams.
#[cfg(not(feature = "hardware"))]
const SIM_LOAD_CG: i64 = 10_000;

#[derive(Debug, Clone, Copy, Default)]
pub struct ReadLimits {
    pub count: Option<u64>,
    pub duration: Option<Duration>,
}

#[cfg(feature = "hardware")]
pub fn make_transport(cfg: &weigh_config::Config, _dialect: Dialect) -> Box<dyn Transport> {
    use weigh_hardware::{Parity, SerialSettings, SerialTransport, StopBits};
    let settings = SerialSettings {
        path: cfg.port.path.clone(),
        baud_rate: cfg.port.baud_rate,
        data_bits: cfg.port.data_bits,
        parity: match cfg.port.parity {
            weigh_config::ParityCfg::None => Parity::None,
            weigh_config::ParityCfg::Odd => Parity::Odd,
            weigh_config::ParityCfg::Even => Parity::Even,
        },
        stop_bits: if cfg.port.stop_bits == 2 {
            StopBits::Two
        } else {
            StopBits::One
        },
    };
    Box::new(SerialTransport::new(settings))
}

#[cfg(not(feature = "hardware"))]
pub fn make_transport(_cfg: &weigh_config::Config, dialect: Dialect) -> Box<dyn Transport> {
    use weigh_hardware::{SimFaults, SimLoad, SimulatedOhaus, SimulatedSi};

    // Test-only knobs for exercising error paths through the binary
    let env_u32 = |key: &str| std::env::var(key).ok().and_then(|v| v.parse::<u32>().ok());
    let faults = SimFaults {
        garbage_every: env_u32("WEIGH_TEST_SIM_GARBAGE"),
        eof_after: env_u32("WEIGH_TEST_SIM_EOF_AFTER"),
    };
    let load = SimLoad::new(SIM_LOAD_CG);
    tracing::info!(%dialect, ?faults, "using simulated scale");
    match dialect {
        Dialect::Ohaus => Box::new(SimulatedOhaus::new(load).with_faults(faults)),
        Dialect::Si => Box::new(SimulatedSi::new(load).with_faults(faults)),
    }
}

fn open_session(
    cfg: &weigh_config::Config,
    dialect: Dialect,
) -> eyre::Result<(Session, crossbeam_channel::Receiver<ScaleEvent>)> {
    let timing: SessionCfg = (&cfg.timing).into();
    let (sink, rx) = weigh_core::event::channel();
    let session = Session::builder(dialect)
        .with_transport(make_transport(cfg, dialect))
        .with_sink(sink)
        .with_config(timing)
        .build()?;
    tracing::info!(%dialect, path = %cfg.port.path, "session started");
    Ok((session, rx))
}

fn print_reading(r: &Reading, json: bool) {
    if json {
        let line = serde_json::json!({
            "weight": r.weight.to_string(),
            "grams": r.weight.to_f64(),
            "stable": r.stable,
        });
        println!("{line}");
    } else {
        println!("{}", weigh_ui::render_reading(r));
    }
}

/// Outcome of waiting on the event channel.
enum Next {
    Reading(Reading),
    Tick,
    Finished,
}

fn next_event(
    rx: &crossbeam_channel::Receiver<ScaleEvent>,
    wait: Duration,
) -> eyre::Result<Next> {
    match rx.recv_timeout(wait) {
        Ok(ScaleEvent::Measurement(r)) => Ok(Next::Reading(r)),
        Ok(ScaleEvent::Error { error, fatal: true }) => Err(eyre::Report::new(error)),
        // Logged by the session; keep going
        Ok(ScaleEvent::Error { .. }) => Ok(Next::Tick),
        Err(RecvTimeoutError::Timeout) => Ok(Next::Tick),
        Err(RecvTimeoutError::Disconnected) => Ok(Next::Finished),
    }
}

pub fn run_read(
    cfg: &weigh_config::Config,
    dialect: Dialect,
    limits: ReadLimits,
    json: bool,
    shutdown: Arc<AtomicBool>,
) -> eyre::Result<u64> {
    let (mut session, rx) = open_session(cfg, dialect)?;
    let started = Instant::now();
    let mut seen = 0u64;

    let result = loop {
        if shutdown.load(Ordering::Relaxed) {
            tracing::info!(readings = seen, "interrupted");
            break Ok(seen);
        }
        if limits.count.is_some_and(|n| seen >= n) {
            break Ok(seen);
        }
        if limits.duration.is_some_and(|d| started.elapsed() >= d) {
            break Ok(seen);
        }
        match next_event(&rx, TICK) {
            Ok(Next::Reading(r)) => {
                seen += 1;
                print_reading(&r, json);
            }
            Ok(Next::Tick) => {}
            Ok(Next::Finished) => break Ok(seen),
            Err(e) => break Err(e),
        }
    };
    session.shutdown();
    result
}

/// Wait for the first reading that arrives after `after`.
fn first_reading(
    rx: &crossbeam_channel::Receiver<ScaleEvent>,
    after: Instant,
    wait: Duration,
) -> eyre::Result<Reading> {
    let deadline = Instant::now() + wait;
    loop {
        let remaining = deadline.saturating_duration_since(Instant::now());
        if remaining.is_zero() {
            let ms = u64::try_from(wait.as_millis()).unwrap_or(u64::MAX);
            return Err(eyre::Report::new(SessionError::ResponseTimeout(ms)));
        }
        match next_event(rx, remaining.min(TICK))? {
            Next::Reading(r) if Instant::now() >= after => return Ok(r),
            Next::Reading(_) | Next::Tick => {}
            Next::Finished => return Err(eyre::Report::new(SessionError::Closed)),
        }
    }
}

pub fn run_tare(cfg: &weigh_config::Config, json: bool) -> eyre::Result<()> {
    let dialect: Dialect = cfg.scale.dialect.into();
    let (mut session, rx) = open_session(cfg, dialect)?;
    let result = session.tare().map_err(eyre::Report::new).and_then(|()| {
        // Readings already in flight still carry the old zero
        let after = Instant::now() + Duration::from_millis(300);
        first_reading(&rx, after, SETTLE_WAIT)
    });
    session.shutdown();
    let reading = result?;
    if json {
        println!(
            "{}",
            serde_json::json!({ "tared": true, "weight": reading.weight.to_string() })
        );
    } else {
        println!("Tare complete; now reading {}", weigh_ui::render_reading(&reading).trim());
    }
    Ok(())
}

pub fn run_self_check(cfg: &weigh_config::Config, json: bool) -> eyre::Result<()> {
    let dialect: Dialect = cfg.scale.dialect.into();
    let (mut session, rx) = open_session(cfg, dialect)?;
    let result = first_reading(&rx, Instant::now(), SETTLE_WAIT);
    session.shutdown();
    let reading = result?;
    if json {
        println!(
            "{}",
            serde_json::json!({ "ok": true, "dialect": dialect.name(), "weight": reading.weight.to_string() })
        );
    } else {
        println!("OK: {dialect} scale answered with {}", reading.weight);
    }
    Ok(())
}
