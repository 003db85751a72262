//! The processing thread shared by both session shapes.
//!
//! Each `Worker` owns exactly one thread. Shutdown is signalled by dropping
//! the `Sender` half of a zero-traffic channel: the thread sees the
//! disconnect from `try_recv` between reads, or immediately from
//! `recv_timeout` while it waits out a poll interval. The thread closes the
//! transport on its way out, so release happens once no matter which path
//! ended the loop.

use crossbeam_channel as xch;
use std::sync::Arc;
use std::thread::JoinHandle;

use tracing::{debug, trace, warn};
use weigh_traits::Transport;

use super::Shared;
use crate::error::{BuildError, Result};
use crate::types::Lifecycle;

/// Receiving side of the shutdown signal, held by the processing thread.
pub(super) struct StopSignal(xch::Receiver<()>);

impl StopSignal {
    pub(super) fn requested(&self) -> bool {
        !matches!(self.0.try_recv(), Err(xch::TryRecvError::Empty))
    }

    /// Sleep for `d` unless shutdown is requested first. Returns true on shutdown.
    pub(super) fn wait(&self, d: std::time::Duration) -> bool {
        !matches!(self.0.recv_timeout(d), Err(xch::RecvTimeoutError::Timeout))
    }
}

pub(super) struct Worker {
    stop: Option<xch::Sender<()>>,
    join_handle: Option<JoinHandle<()>>,
    shared: Arc<Shared>,
}

impl Worker {
    /// Spawn the processing thread. `body` runs the session loop; the
    /// transport is closed after it returns.
    pub(super) fn spawn<F>(
        name: &str,
        mut transport: Box<dyn Transport>,
        shared: Arc<Shared>,
        body: F,
    ) -> Result<Self>
    where
        F: FnOnce(&mut dyn Transport, StopSignal) + Send + 'static,
    {
        let (stop_tx, stop_rx) = xch::bounded::<()>(0);
        let thread_shared = shared.clone();
        let join_handle = std::thread::Builder::new()
            .name(name.to_string())
            .spawn(move || {
                body(transport.as_mut(), StopSignal(stop_rx));
                if let Err(e) = transport.close() {
                    warn!(error = %e, "transport close failed");
                }
                thread_shared.set_lifecycle(Lifecycle::Closed);
                debug!("session closed");
            })
            .map_err(|e| eyre::Report::new(BuildError::Open(format!("spawn session thread: {e}"))))?;

        Ok(Self {
            stop: Some(stop_tx),
            join_handle: Some(join_handle),
            shared,
        })
    }

    pub(super) fn shared(&self) -> &Shared {
        &self.shared
    }

    /// Signal the thread and wait for it. Idempotent.
    pub(super) fn shutdown(&mut self) {
        drop(self.stop.take());
        if let Some(handle) = self.join_handle.take() {
            match handle.join() {
                Ok(()) => trace!("session thread joined"),
                // Thread panicked; log but don't propagate (may be in Drop)
                Err(e) => {
                    warn!(?e, "session thread panicked during shutdown");
                    self.shared.set_lifecycle(Lifecycle::Closed);
                }
            }
        }
    }
}

impl Drop for Worker {
    fn drop(&mut self) {
        self.shutdown();
    }
}
