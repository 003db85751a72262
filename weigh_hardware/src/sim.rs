//! Simulated scales speaking the Ohaus and SI wire dialects.
//!
//! Both devices keep the load in centigrams and format it the way the real
//! firmware does. Output is produced lazily from `read_available`, so no
//! background thread is involved.

use std::collections::VecDeque;
use std::sync::Arc;
use std::sync::atomic::{AtomicI64, Ordering};
use std::time::{Duration, Instant};

use tracing::trace;
use weigh_traits::{Available, BoxError, Transport};

use crate::error::HwError;

/// Fault injection knobs shared by both simulators.
#[derive(Debug, Clone, Copy, Default)]
pub struct SimFaults {
    /// Replace every Nth printed line with an overload marker the decoders reject.
    pub garbage_every: Option<u32>,
    /// Report end of input once this many lines have been printed.
    pub eof_after: Option<u32>,
}

/// Shared handle to the load on a simulated pan, in centigrams.
#[derive(Debug, Clone, Default)]
pub struct SimLoad(Arc<AtomicI64>);

impl SimLoad {
    pub fn new(cg: i64) -> Self {
        Self(Arc::new(AtomicI64::new(cg)))
    }

    pub fn set_cg(&self, cg: i64) {
        self.0.store(cg, Ordering::Relaxed);
    }

    pub fn cg(&self) -> i64 {
        self.0.load(Ordering::Relaxed)
    }
}

/// Format centigrams with two decimals, e.g. `-2` → `-0.02`.
fn format_cg(cg: i64) -> String {
    let sign = if cg < 0 { "-" } else { "" };
    let abs = cg.unsigned_abs();
    format!("{sign}{}.{:02}", abs / 100, abs % 100)
}

/// State common to both devices: command parsing, output queue, faults.
#[derive(Debug)]
struct Device {
    open: bool,
    load: SimLoad,
    tare_cg: i64,
    /// Number of upcoming prints reported as not yet settled.
    settle_prints: u32,
    faults: SimFaults,
    printed: u32,
    inbox: Vec<u8>,
    outbox: VecDeque<u8>,
}

impl Device {
    fn new(load: SimLoad) -> Self {
        Self {
            open: false,
            load,
            tare_cg: 0,
            settle_prints: 0,
            faults: SimFaults::default(),
            printed: 0,
            inbox: Vec::new(),
            outbox: VecDeque::new(),
        }
    }

    fn ensure_open(&self) -> Result<(), HwError> {
        if self.open {
            Ok(())
        } else {
            Err(HwError::NotOpen)
        }
    }

    fn net_cg(&self) -> i64 {
        self.load.cg() - self.tare_cg
    }

    fn exhausted(&self) -> bool {
        self.outbox.is_empty() && self.faults.eof_after.is_some_and(|n| self.printed >= n)
    }

    /// Queue one printed line. `render` receives the net weight and stability.
    fn print(&mut self, render: impl Fn(&str, bool) -> String) {
        if self.faults.eof_after.is_some_and(|n| self.printed >= n) {
            return;
        }
        self.printed += 1;
        let garbage = self
            .faults
            .garbage_every
            .is_some_and(|n| n > 0 && self.printed % n == 0);
        let line = if garbage {
            "  --OL--\r\n".to_string()
        } else {
            let stable = self.settle_prints == 0;
            self.settle_prints = self.settle_prints.saturating_sub(1);
            render(&format_cg(self.net_cg()), stable)
        };
        trace!(line = line.trim_end(), "sim print");
        self.outbox.extend(line.bytes());
    }

    fn take_output(&mut self) -> Available {
        if self.outbox.is_empty() {
            Available::Idle
        } else {
            Available::Bytes(self.outbox.drain(..).collect())
        }
    }

    /// Split accumulated input into complete commands.
    fn take_commands(&mut self) -> Vec<String> {
        let mut out = Vec::new();
        while let Some(pos) = self.inbox.iter().position(|b| *b == b'\n') {
            let raw: Vec<u8> = self.inbox.drain(..=pos).collect();
            let cmd = String::from_utf8_lossy(&raw).trim().to_string();
            if !cmd.is_empty() {
                out.push(cmd);
            }
        }
        out
    }
}

/// Ohaus balance: prints on `P`, tares on `T`, streams after `CP`.
#[derive(Debug)]
pub struct SimulatedOhaus {
    dev: Device,
    continuous: bool,
    print_every: Duration,
    next_print: Option<Instant>,
}

impl Default for SimulatedOhaus {
    fn default() -> Self {
        Self::new(SimLoad::default())
    }
}

impl SimulatedOhaus {
    pub fn new(load: SimLoad) -> Self {
        Self {
            dev: Device::new(load),
            continuous: false,
            print_every: Duration::from_millis(100),
            next_print: None,
        }
    }

    pub fn with_print_interval(mut self, every: Duration) -> Self {
        self.print_every = every;
        self
    }

    pub fn with_settle_prints(mut self, n: u32) -> Self {
        self.dev.settle_prints = n;
        self
    }

    pub fn with_faults(mut self, faults: SimFaults) -> Self {
        self.dev.faults = faults;
        self
    }

    fn render(weight: &str, stable: bool) -> String {
        format!("{weight:>9} g{}\r\n", if stable { "" } else { "?" })
    }

    fn handle(&mut self, cmd: &str) {
        match cmd {
            "P" => self.dev.print(Self::render),
            "T" => self.dev.tare_cg = self.dev.load.cg(),
            "CP" => {
                self.continuous = true;
                self.next_print = Some(Instant::now());
            }
            // Standby exit, weigh mode and unit selection need no simulation.
            "ON" | "1M" | "1U" => {}
            other => trace!(cmd = other, "sim ohaus ignored command"),
        }
    }
}

impl Transport for SimulatedOhaus {
    fn open(&mut self) -> Result<(), BoxError> {
        self.dev.open = true;
        Ok(())
    }

    fn write(&mut self, bytes: &[u8]) -> Result<(), BoxError> {
        self.dev.ensure_open()?;
        self.dev.inbox.extend_from_slice(bytes);
        for cmd in self.dev.take_commands() {
            self.handle(&cmd);
        }
        Ok(())
    }

    fn read_available(&mut self, timeout: Duration) -> Result<Available, BoxError> {
        self.dev.ensure_open()?;
        if self.dev.exhausted() {
            return Ok(Available::Closed);
        }
        if !self.dev.outbox.is_empty() {
            return Ok(self.dev.take_output());
        }
        match self.next_print.filter(|_| self.continuous) {
            Some(due) => {
                let wait = due.saturating_duration_since(Instant::now());
                if wait > timeout {
                    std::thread::sleep(timeout);
                    return Ok(Available::Idle);
                }
                std::thread::sleep(wait);
                self.next_print = Some(due + self.print_every);
                self.dev.print(Self::render);
                if self.dev.exhausted() {
                    return Ok(Available::Closed);
                }
                Ok(self.dev.take_output())
            }
            None => {
                std::thread::sleep(timeout);
                Ok(Available::Idle)
            }
        }
    }

    fn close(&mut self) -> Result<(), BoxError> {
        self.dev.open = false;
        Ok(())
    }
}

/// SI balance: answers every `#` with one line.
#[derive(Debug)]
pub struct SimulatedSi {
    dev: Device,
}

impl Default for SimulatedSi {
    fn default() -> Self {
        Self::new(SimLoad::default())
    }
}

impl SimulatedSi {
    pub fn new(load: SimLoad) -> Self {
        Self {
            dev: Device::new(load),
        }
    }

    pub fn with_settle_prints(mut self, n: u32) -> Self {
        self.dev.settle_prints = n;
        self
    }

    pub fn with_faults(mut self, faults: SimFaults) -> Self {
        self.dev.faults = faults;
        self
    }

    fn render(weight: &str, stable: bool) -> String {
        format!("{weight:>9}  G{}\r\n", if stable { "S" } else { "" })
    }
}

impl Transport for SimulatedSi {
    fn open(&mut self) -> Result<(), BoxError> {
        self.dev.open = true;
        Ok(())
    }

    fn write(&mut self, bytes: &[u8]) -> Result<(), BoxError> {
        self.dev.ensure_open()?;
        // The immediate-print request is a single character; no framing needed.
        for _ in bytes.iter().filter(|b| **b == b'#') {
            self.dev.print(Self::render);
        }
        Ok(())
    }

    fn read_available(&mut self, timeout: Duration) -> Result<Available, BoxError> {
        self.dev.ensure_open()?;
        if self.dev.exhausted() {
            return Ok(Available::Closed);
        }
        if self.dev.outbox.is_empty() {
            std::thread::sleep(timeout);
            return Ok(Available::Idle);
        }
        Ok(self.dev.take_output())
    }

    fn close(&mut self) -> Result<(), BoxError> {
        self.dev.open = false;
        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn format_cg_handles_sign_and_padding() {
        assert_eq!(format_cg(5398), "53.98");
        assert_eq!(format_cg(-2), "-0.02");
        assert_eq!(format_cg(0), "0.00");
        assert_eq!(format_cg(100_005), "1000.05");
    }

    #[test]
    fn ohaus_render_marks_unstable_with_question_mark() {
        assert_eq!(SimulatedOhaus::render("53.98", true), "    53.98 g\r\n");
        assert_eq!(SimulatedOhaus::render("53.98", false), "    53.98 g?\r\n");
    }

    #[test]
    fn si_render_marks_stable_with_s() {
        assert_eq!(SimulatedSi::render("-0.02", true), "    -0.02  GS\r\n");
        assert_eq!(SimulatedSi::render("-0.02", false), "    -0.02  G\r\n");
    }
}
