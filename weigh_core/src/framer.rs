//! Newline framing for serial byte streams.
//!
//! Bytes accumulate in a single buffer with a cursor marking the start of the
//! first unconsumed line. Carriage returns are dropped on the way in, so CRLF
//! and LF devices frame identically. Lines are produced lazily by the iterator
//! returned from [`LineFramer::feed`]; any the caller does not pull stay
//! buffered and come out of the next `feed`.

use std::fmt;
use std::ops::Deref;

/// One physical line, terminator stripped, content untouched.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct RawLine(String);

impl RawLine {
    pub fn as_str(&self) -> &str {
        &self.0
    }

    pub fn into_string(self) -> String {
        self.0
    }
}

impl Deref for RawLine {
    type Target = str;

    fn deref(&self) -> &str {
        &self.0
    }
}

impl fmt::Display for RawLine {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(&self.0)
    }
}

#[derive(Debug, Default)]
pub struct LineFramer {
    buf: Vec<u8>,
    /// Index of the first byte not yet emitted as part of a line.
    start: usize,
}

impl LineFramer {
    pub fn new() -> Self {
        Self::default()
    }

    /// Append `bytes` and iterate the lines completed so far.
    pub fn feed(&mut self, bytes: &[u8]) -> Lines<'_> {
        self.buf.extend(bytes.iter().copied().filter(|b| *b != b'\r'));
        Lines { framer: self }
    }

    /// Bytes buffered that do not yet form a complete line.
    pub fn pending_len(&self) -> usize {
        self.buf.len() - self.start
    }

    /// Drop any partial line.
    pub fn clear(&mut self) {
        self.buf.clear();
        self.start = 0;
    }

    fn next_line(&mut self) -> Option<RawLine> {
        match self.buf[self.start..].iter().position(|b| *b == b'\n') {
            Some(offset) => {
                let end = self.start + offset;
                // Serial noise can produce invalid UTF-8; keep it visible to the decoder.
                let line = String::from_utf8_lossy(&self.buf[self.start..end]).into_owned();
                self.start = end + 1;
                Some(RawLine(line))
            }
            None => {
                self.compact();
                None
            }
        }
    }

    fn compact(&mut self) {
        if self.start > 0 {
            self.buf.drain(..self.start);
            self.start = 0;
        }
    }
}

/// Lines completed by the most recent [`LineFramer::feed`].
pub struct Lines<'a> {
    framer: &'a mut LineFramer,
}

impl Iterator for Lines<'_> {
    type Item = RawLine;

    fn next(&mut self) -> Option<RawLine> {
        self.framer.next_line()
    }
}
