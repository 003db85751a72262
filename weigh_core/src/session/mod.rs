//! Scale sessions: one processing thread per connected scale.
//!
//! The thread owns the transport, the line framer and the last reading. The
//! caller keeps a handle that can read a snapshot, queue commands and shut the
//! session down. Two shapes exist:
//!
//! - [`OhausSession`] (push): configures continuous print, then reacts to
//!   every batch of available bytes.
//! - [`SiSession`] (poll): a self-rearming timer writes one poll, waits for
//!   the reply, and only then schedules the next poll.
//!
//! Either way the transport is closed by the thread, once, when it exits.

mod ohaus;
mod si;
mod worker;

pub use ohaus::OhausSession;
pub use si::SiSession;

use std::sync::atomic::{AtomicU8, AtomicU64, Ordering};
use std::sync::{Arc, Mutex, PoisonError};
use std::time::{Duration, Instant};

use tracing::{debug, error, trace, warn};
use weigh_traits::clock::{Clock, MonotonicClock};
use weigh_traits::{Available, Transport};

use crate::config::SessionCfg;
use crate::dialect::Dialect;
use crate::error::{BuildError, Result, SessionError};
use crate::event::{EventSink, ScaleEvent};
use crate::framer::LineFramer;
use crate::transport_error::map_transport_error;
use crate::types::{Lifecycle, Reading};

type SharedClock = Arc<dyn Clock + Send + Sync>;

/// State visible from both the handle and the processing thread.
struct Shared {
    lifecycle: AtomicU8,
    latest: Mutex<Option<Reading>>,
    /// Milliseconds since `epoch` of the last decoded reading.
    last_ok_ms: AtomicU64,
    epoch: Instant,
    clock: SharedClock,
}

impl Shared {
    fn new(clock: SharedClock) -> Self {
        let epoch = clock.now();
        Self {
            lifecycle: AtomicU8::new(Lifecycle::Created as u8),
            latest: Mutex::new(None),
            last_ok_ms: AtomicU64::new(0),
            epoch,
            clock,
        }
    }

    fn lifecycle(&self) -> Lifecycle {
        Lifecycle::from_u8(self.lifecycle.load(Ordering::Acquire))
    }

    fn set_lifecycle(&self, next: Lifecycle) {
        self.lifecycle.store(next as u8, Ordering::Release);
    }

    fn latest(&self) -> Option<Reading> {
        *self.latest.lock().unwrap_or_else(PoisonError::into_inner)
    }

    fn publish(&self, reading: Reading) {
        *self.latest.lock().unwrap_or_else(PoisonError::into_inner) = Some(reading);
        self.last_ok_ms
            .store(self.clock.ms_since(self.epoch), Ordering::Relaxed);
    }

    fn stalled_for_ms(&self) -> u64 {
        self.clock
            .ms_since(self.epoch)
            .saturating_sub(self.last_ok_ms.load(Ordering::Relaxed))
    }
}

/// Framing, decoding and publishing for one session's byte stream.
///
/// Lives on the processing thread only.
struct Processor {
    dialect: Dialect,
    framer: LineFramer,
    sink: Box<dyn EventSink>,
    shared: Arc<Shared>,
}

impl Processor {
    /// Frame `bytes` and handle every completed line. Returns the line count.
    fn ingest(&mut self, bytes: &[u8]) -> usize {
        let mut lines = 0;
        for line in self.framer.feed(bytes) {
            lines += 1;
            trace!(dialect = %self.dialect, line = %line, "line");
            match self.dialect.decode(&line) {
                Ok(reading) => {
                    self.shared.publish(reading);
                    self.sink.emit(ScaleEvent::Measurement(reading));
                }
                Err(e) => {
                    warn!(dialect = %self.dialect, reason = e.reason(), text = e.text(), "malformed line");
                    self.sink.emit(ScaleEvent::Error {
                        error: e.into(),
                        fatal: false,
                    });
                }
            }
        }
        lines
    }

    /// Frame `bytes` and drop every completed line unseen. Returns the line count.
    fn discard(&mut self, bytes: &[u8]) -> usize {
        let mut lines = 0;
        for line in self.framer.feed(bytes) {
            lines += 1;
            debug!(dialect = %self.dialect, line = %line, "discarded overdue line");
        }
        lines
    }

    /// Drop any partial line left in the framer.
    fn reset_framer(&mut self) {
        if self.framer.pending_len() > 0 {
            debug!(dialect = %self.dialect, bytes = self.framer.pending_len(), "dropped partial line");
        }
        self.framer.clear();
    }

    /// Report a recoverable problem; processing continues.
    fn report(&mut self, error: SessionError) {
        warn!(dialect = %self.dialect, error = %error, "session error");
        self.sink.emit(ScaleEvent::Error {
            error,
            fatal: false,
        });
    }

    /// Report the failure that ends this session.
    fn fail(&mut self, error: SessionError) {
        error!(dialect = %self.dialect, error = %error, "session ended by transport failure");
        self.sink.emit(ScaleEvent::Error { error, fatal: true });
    }
}

fn write(transport: &mut dyn Transport, bytes: &[u8]) -> std::result::Result<(), SessionError> {
    transport
        .write(bytes)
        .map_err(|e| map_transport_error(&*e))
}

fn read(
    transport: &mut dyn Transport,
    timeout: Duration,
) -> std::result::Result<Available, SessionError> {
    transport
        .read_available(timeout)
        .map_err(|e| map_transport_error(&*e))
}

/// Builds a [`Session`] for one dialect.
pub struct SessionBuilder {
    dialect: Dialect,
    transport: Option<Box<dyn Transport>>,
    sink: Option<Box<dyn EventSink>>,
    cfg: SessionCfg,
    clock: Option<SharedClock>,
}

impl SessionBuilder {
    pub fn new(dialect: Dialect) -> Self {
        Self {
            dialect,
            transport: None,
            sink: None,
            cfg: SessionCfg::default(),
            clock: None,
        }
    }

    pub fn with_transport<T: Transport + 'static>(mut self, transport: T) -> Self {
        self.transport = Some(Box::new(transport));
        self
    }

    pub fn with_sink<S: EventSink + 'static>(mut self, sink: S) -> Self {
        self.sink = Some(Box::new(sink));
        self
    }

    pub fn with_config(mut self, cfg: SessionCfg) -> Self {
        self.cfg = cfg;
        self
    }

    /// Clock used to age readings; defaults to [`MonotonicClock`].
    pub fn with_clock<C: Clock + Send + Sync + 'static>(mut self, clock: C) -> Self {
        self.clock = Some(Arc::new(clock));
        self
    }

    /// Open the transport and start the processing thread.
    pub fn build(self) -> Result<Session> {
        let mut transport = self
            .transport
            .ok_or_else(|| eyre::Report::new(BuildError::MissingTransport))?;
        let sink = self
            .sink
            .ok_or_else(|| eyre::Report::new(BuildError::MissingSink))?;
        self.cfg.validate().map_err(eyre::Report::new)?;

        let clock = self.clock.unwrap_or_else(|| Arc::new(MonotonicClock::new()));
        let shared = Arc::new(Shared::new(clock));

        transport
            .open()
            .map_err(|e| eyre::Report::new(BuildError::Open(e.to_string())))?;
        shared.set_lifecycle(Lifecycle::Open);
        debug!(dialect = %self.dialect, "session open");

        let processor = Processor {
            dialect: self.dialect,
            framer: LineFramer::new(),
            sink,
            shared: shared.clone(),
        };
        let session = match self.dialect {
            Dialect::Ohaus => {
                Session::Ohaus(OhausSession::start(transport, processor, shared, self.cfg)?)
            }
            Dialect::Si => Session::Si(SiSession::start(transport, processor, shared, self.cfg)?),
        };
        Ok(session)
    }
}

/// A running session of either dialect.
pub enum Session {
    Ohaus(OhausSession),
    Si(SiSession),
}

impl Session {
    pub fn builder(dialect: Dialect) -> SessionBuilder {
        SessionBuilder::new(dialect)
    }

    pub fn dialect(&self) -> Dialect {
        match self {
            Session::Ohaus(_) => Dialect::Ohaus,
            Session::Si(_) => Dialect::Si,
        }
    }

    pub fn lifecycle(&self) -> Lifecycle {
        match self {
            Session::Ohaus(s) => s.lifecycle(),
            Session::Si(s) => s.lifecycle(),
        }
    }

    pub fn is_open(&self) -> bool {
        self.lifecycle() == Lifecycle::Open
    }

    /// Last successfully decoded reading.
    pub fn latest(&self) -> Option<Reading> {
        match self {
            Session::Ohaus(s) => s.latest(),
            Session::Si(s) => s.latest(),
        }
    }

    /// Milliseconds since the last good reading (or since start).
    pub fn stalled_for_ms(&self) -> u64 {
        match self {
            Session::Ohaus(s) => s.stalled_for_ms(),
            Session::Si(s) => s.stalled_for_ms(),
        }
    }

    /// Ask for an immediate print.
    pub fn poll(&self) -> std::result::Result<(), SessionError> {
        match self {
            Session::Ohaus(s) => s.poll(),
            Session::Si(_) => Err(SessionError::Unsupported("poll")),
        }
    }

    /// Zero the scale.
    pub fn tare(&self) -> std::result::Result<(), SessionError> {
        match self {
            Session::Ohaus(s) => s.tare(),
            Session::Si(_) => Err(SessionError::Unsupported("tare")),
        }
    }

    /// Stop processing and release the transport. Safe to call repeatedly.
    pub fn shutdown(&mut self) {
        match self {
            Session::Ohaus(s) => s.shutdown(),
            Session::Si(s) => s.shutdown(),
        }
    }
}
