//! Scale dialects: line grammars and command sets.
//!
//! A dialect is chosen once, at session construction, from [`Dialect`].

pub mod ohaus;
pub mod si;

use std::fmt;
use std::str::FromStr;

use crate::error::DecodeError;
use crate::types::Reading;

pub use ohaus::OhausDecoder;
pub use si::SiDecoder;

/// Result of decoding one line.
pub type DecodeOutcome = Result<Reading, DecodeError>;

/// Line grammar of one scale dialect.
pub trait Decoder {
    fn decode(&self, line: &str) -> DecodeOutcome;

    /// Render `reading` the way the device prints it, CRLF included.
    fn encode(&self, reading: &Reading) -> String;
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Dialect {
    /// Streams readings after being put in continuous-print mode.
    Ohaus,
    /// Silent until polled with an immediate-print request.
    Si,
}

impl Dialect {
    pub fn name(self) -> &'static str {
        match self {
            Dialect::Ohaus => "ohaus",
            Dialect::Si => "si",
        }
    }

    pub fn decode(self, line: &str) -> DecodeOutcome {
        match self {
            Dialect::Ohaus => OhausDecoder.decode(line),
            Dialect::Si => SiDecoder.decode(line),
        }
    }

    pub fn encode(self, reading: &Reading) -> String {
        match self {
            Dialect::Ohaus => OhausDecoder.encode(reading),
            Dialect::Si => SiDecoder.encode(reading),
        }
    }
}

impl fmt::Display for Dialect {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.name())
    }
}

impl FromStr for Dialect {
    type Err = String;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s.trim().to_ascii_lowercase().as_str() {
            "ohaus" => Ok(Dialect::Ohaus),
            "si" => Ok(Dialect::Si),
            other => Err(format!("unknown scale dialect: {other}")),
        }
    }
}
