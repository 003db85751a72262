//! Poll session: the balance only speaks when asked.
//!
//! The timer is a wait on the shutdown signal. Each cycle writes one poll and
//! reads until a line arrives (or the response timeout passes) before the
//! next wait begins, so polls never overlap. After a timeout the overdue reply
//! is given one more response timeout to show up and is thrown away, so it is
//! never taken as the answer to the next poll.

use std::sync::Arc;
use std::time::Instant;

use tracing::trace;
use weigh_traits::{Available, Transport};

use super::worker::{StopSignal, Worker};
use super::{Processor, Shared, read, write};
use crate::config::SessionCfg;
use crate::dialect::si;
use crate::error::{Result, SessionError};
use crate::types::{Lifecycle, Reading};

pub struct SiSession {
    worker: Worker,
}

impl SiSession {
    pub(super) fn start(
        transport: Box<dyn Transport>,
        mut processor: Processor,
        shared: Arc<Shared>,
        cfg: SessionCfg,
    ) -> Result<Self> {
        let worker = Worker::spawn("weigh-si", transport, shared, move |transport, stop| {
            if let Err(e) = drive(transport, &mut processor, &stop, &cfg) {
                processor.fail(e);
            }
        })?;
        Ok(Self { worker })
    }

    pub fn lifecycle(&self) -> Lifecycle {
        self.worker.shared().lifecycle()
    }

    pub fn latest(&self) -> Option<Reading> {
        self.worker.shared().latest()
    }

    pub fn stalled_for_ms(&self) -> u64 {
        self.worker.shared().stalled_for_ms()
    }

    /// Stops the timer first; no poll is written once this begins.
    pub fn shutdown(&mut self) {
        self.worker.shutdown();
    }
}

fn drive(
    transport: &mut dyn Transport,
    processor: &mut Processor,
    stop: &StopSignal,
    cfg: &SessionCfg,
) -> std::result::Result<(), SessionError> {
    loop {
        if stop.wait(cfg.poll_interval) {
            return Ok(());
        }
        trace!("si poll");
        write(transport, si::PRINT_IMMEDIATE)?;
        match await_response(transport, processor, stop, cfg)? {
            Cycle::Done => {}
            Cycle::TimedOut => {
                if drain_overdue(transport, processor, stop, cfg)? == Cycle::Stopped {
                    return Ok(());
                }
            }
            Cycle::Stopped => return Ok(()),
        }
    }
}

#[derive(Debug, PartialEq, Eq)]
enum Cycle {
    /// A line was handled; rearm the timer.
    Done,
    /// No line arrived within the response timeout.
    TimedOut,
    /// Shutdown was requested mid-cycle.
    Stopped,
}

/// Read until at least one line has been handled.
fn await_response(
    transport: &mut dyn Transport,
    processor: &mut Processor,
    stop: &StopSignal,
    cfg: &SessionCfg,
) -> std::result::Result<Cycle, SessionError> {
    let deadline = Instant::now() + cfg.response_timeout;
    loop {
        if stop.requested() {
            return Ok(Cycle::Stopped);
        }
        let remaining = deadline.saturating_duration_since(Instant::now());
        if remaining.is_zero() {
            let ms = u64::try_from(cfg.response_timeout.as_millis()).unwrap_or(u64::MAX);
            processor.report(SessionError::ResponseTimeout(ms));
            return Ok(Cycle::TimedOut);
        }
        match read(transport, remaining.min(cfg.read_timeout))? {
            Available::Bytes(bytes) => {
                if stop.requested() {
                    return Ok(Cycle::Stopped);
                }
                if processor.ingest(&bytes) > 0 {
                    return Ok(Cycle::Done);
                }
            }
            Available::Idle => {}
            Available::Closed => return Err(SessionError::EndOfInput),
        }
    }
}

/// Swallow the reply to a poll that already timed out.
///
/// Waits up to one more response timeout for a complete line, discards it,
/// then drops whatever partial line is left in the framer.
fn drain_overdue(
    transport: &mut dyn Transport,
    processor: &mut Processor,
    stop: &StopSignal,
    cfg: &SessionCfg,
) -> std::result::Result<Cycle, SessionError> {
    let deadline = Instant::now() + cfg.response_timeout;
    loop {
        if stop.requested() {
            return Ok(Cycle::Stopped);
        }
        let remaining = deadline.saturating_duration_since(Instant::now());
        if remaining.is_zero() {
            break;
        }
        match read(transport, remaining.min(cfg.read_timeout))? {
            Available::Bytes(bytes) => {
                if processor.discard(&bytes) > 0 {
                    break;
                }
            }
            Available::Idle => {}
            Available::Closed => return Err(SessionError::EndOfInput),
        }
    }
    processor.reset_framer();
    Ok(Cycle::Done)
}
