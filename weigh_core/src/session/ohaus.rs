//! Push session: the balance streams lines once continuous print is on.

use crossbeam_channel as xch;
use std::sync::Arc;

use tracing::debug;
use weigh_traits::{Available, Transport};

use super::worker::{StopSignal, Worker};
use super::{Processor, Shared, read, write};
use crate::config::SessionCfg;
use crate::dialect::ohaus;
use crate::error::{Result, SessionError};
use crate::types::{Lifecycle, Reading};

/// On-demand requests queued to the processing thread.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
enum Command {
    Print,
    Tare,
}

impl Command {
    fn bytes(self) -> &'static [u8] {
        match self {
            Command::Print => ohaus::PRINT,
            Command::Tare => ohaus::TARE,
        }
    }
}

pub struct OhausSession {
    worker: Worker,
    commands: xch::Sender<Command>,
}

impl OhausSession {
    pub(super) fn start(
        transport: Box<dyn Transport>,
        mut processor: Processor,
        shared: Arc<Shared>,
        cfg: SessionCfg,
    ) -> Result<Self> {
        let (tx, rx) = xch::unbounded();
        let worker = Worker::spawn("weigh-ohaus", transport, shared, move |transport, stop| {
            if let Err(e) = drive(transport, &mut processor, &rx, &stop, &cfg) {
                processor.fail(e);
            }
        })?;
        Ok(Self {
            worker,
            commands: tx,
        })
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

    /// Request an immediate print. The reply arrives through the event sink.
    pub fn poll(&self) -> std::result::Result<(), SessionError> {
        self.send(Command::Print)
    }

    pub fn tare(&self) -> std::result::Result<(), SessionError> {
        self.send(Command::Tare)
    }

    pub fn shutdown(&mut self) {
        self.worker.shutdown();
    }

    fn send(&self, cmd: Command) -> std::result::Result<(), SessionError> {
        if self.lifecycle() != Lifecycle::Open {
            return Err(SessionError::Closed);
        }
        self.commands.send(cmd).map_err(|_| SessionError::Closed)
    }
}

/// Configure the balance, then handle each batch of bytes as it arrives.
/// Returns `Ok` on shutdown and `Err` on the transport failure that ended it.
fn drive(
    transport: &mut dyn Transport,
    processor: &mut Processor,
    commands: &xch::Receiver<Command>,
    stop: &StopSignal,
    cfg: &SessionCfg,
) -> std::result::Result<(), SessionError> {
    for cmd in ohaus::CONFIGURE {
        write(transport, cmd)?;
    }
    debug!("ohaus continuous print requested");

    loop {
        if stop.requested() {
            return Ok(());
        }
        while let Ok(cmd) = commands.try_recv() {
            debug!(?cmd, "ohaus command");
            write(transport, cmd.bytes())?;
        }
        match read(transport, cfg.read_timeout)? {
            Available::Bytes(bytes) => {
                // Data that lands after shutdown started is discarded.
                if stop.requested() {
                    return Ok(());
                }
                processor.ingest(&bytes);
            }
            Available::Idle => {}
            Available::Closed => return Err(SessionError::EndOfInput),
        }
    }
}
