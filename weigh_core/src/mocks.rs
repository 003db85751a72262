//! Test and helper mocks for weigh_core

use std::collections::VecDeque;
use std::sync::{Arc, Mutex, PoisonError};
use std::time::{Duration, Instant};

use weigh_traits::{Available, BoxError, Transport};

/// One scripted answer to `read_available`.
#[derive(Debug, Clone)]
pub enum Step {
    Bytes(Vec<u8>),
    Idle,
    Closed,
    Fail(String),
}

impl Step {
    pub fn text(s: &str) -> Self {
        Step::Bytes(s.as_bytes().to_vec())
    }
}

#[derive(Debug, Default)]
struct Record {
    opens: usize,
    closes: usize,
    writes: Vec<Vec<u8>>,
    /// Writes issued while an earlier reply was still unread.
    overlapping_writes: usize,
}

/// Shared view of everything a [`ScriptedTransport`] saw.
#[derive(Debug, Clone, Default)]
pub struct TransportLog(Arc<Mutex<Record>>);

impl TransportLog {
    fn with<R>(&self, f: impl FnOnce(&mut Record) -> R) -> R {
        f(&mut self.0.lock().unwrap_or_else(PoisonError::into_inner))
    }

    pub fn opens(&self) -> usize {
        self.with(|r| r.opens)
    }

    pub fn closes(&self) -> usize {
        self.with(|r| r.closes)
    }

    pub fn writes(&self) -> Vec<Vec<u8>> {
        self.with(|r| r.writes.clone())
    }

    /// Writes rendered as text, for readable assertions.
    pub fn written_text(&self) -> Vec<String> {
        self.with(|r| {
            r.writes
                .iter()
                .map(|w| String::from_utf8_lossy(w).into_owned())
                .collect()
        })
    }

    pub fn overlapping_writes(&self) -> usize {
        self.with(|r| r.overlapping_writes)
    }
}

/// A transport driven by a script instead of a device.
///
/// `read_available` first returns any reply queued by a write (once its delay
/// has passed), then the next scripted step; once both are exhausted it idles
/// for the timeout.
#[derive(Debug, Default)]
pub struct ScriptedTransport {
    script: VecDeque<Step>,
    replies: VecDeque<Vec<u8>>,
    reply_delay: Duration,
    /// Queued replies and when each becomes readable.
    pending: VecDeque<(Instant, Vec<u8>)>,
    fail_open: bool,
    fail_write_at: Option<usize>,
    log: TransportLog,
}

impl ScriptedTransport {
    pub fn new(script: impl IntoIterator<Item = Step>) -> Self {
        Self {
            script: script.into_iter().collect(),
            ..Self::default()
        }
    }

    /// Each write queues the next of these replies, like a polled device.
    pub fn with_replies<I, S>(mut self, replies: I) -> Self
    where
        I: IntoIterator<Item = S>,
        S: AsRef<[u8]>,
    {
        self.replies = replies.into_iter().map(|r| r.as_ref().to_vec()).collect();
        self
    }

    /// Hold each reply back for `delay` after the write that queued it.
    pub fn with_reply_delay(mut self, delay: Duration) -> Self {
        self.reply_delay = delay;
        self
    }

    pub fn failing_open(mut self) -> Self {
        self.fail_open = true;
        self
    }

    /// Fail the write with this zero-based index.
    pub fn failing_write_at(mut self, index: usize) -> Self {
        self.fail_write_at = Some(index);
        self
    }

    pub fn log(&self) -> TransportLog {
        self.log.clone()
    }
}

impl Transport for ScriptedTransport {
    fn open(&mut self) -> Result<(), BoxError> {
        if self.fail_open {
            return Err(Box::new(std::io::Error::other("port busy")));
        }
        self.log.with(|r| r.opens += 1);
        Ok(())
    }

    fn write(&mut self, bytes: &[u8]) -> Result<(), BoxError> {
        let index = self.log.with(|r| r.writes.len());
        if self.fail_write_at == Some(index) {
            return Err(Box::new(std::io::Error::other("write failed")));
        }
        let overlapping = !self.pending.is_empty();
        self.log.with(|r| {
            r.writes.push(bytes.to_vec());
            if overlapping {
                r.overlapping_writes += 1;
            }
        });
        if let Some(reply) = self.replies.pop_front() {
            self.pending
                .push_back((Instant::now() + self.reply_delay, reply));
        }
        Ok(())
    }

    fn read_available(&mut self, timeout: Duration) -> Result<Available, BoxError> {
        if let Some(&(ready_at, _)) = self.pending.front() {
            let wait = ready_at.saturating_duration_since(Instant::now());
            if wait > timeout {
                std::thread::sleep(timeout);
                return Ok(Available::Idle);
            }
            std::thread::sleep(wait);
            if let Some((_, reply)) = self.pending.pop_front() {
                return Ok(Available::Bytes(reply));
            }
        }
        match self.script.pop_front() {
            Some(Step::Bytes(b)) => Ok(Available::Bytes(b)),
            Some(Step::Closed) => Ok(Available::Closed),
            Some(Step::Fail(msg)) => Err(Box::new(std::io::Error::other(msg))),
            Some(Step::Idle) | None => {
                std::thread::sleep(timeout);
                Ok(Available::Idle)
            }
        }
    }

    fn close(&mut self) -> Result<(), BoxError> {
        self.log.with(|r| r.closes += 1);
        Ok(())
    }
}
