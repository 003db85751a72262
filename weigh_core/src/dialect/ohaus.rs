//! Ohaus print format: `"   53.98 g"` when settled, `"   53.98 g?"` while settling.

use super::{DecodeOutcome, Decoder};
use crate::error::DecodeError;
use crate::types::Reading;
use crate::weight::Weight;

pub const EXIT_STANDBY: &[u8] = b"ON\n";
pub const WEIGH_MODE: &[u8] = b"1M\n";
pub const UNIT_GRAMS: &[u8] = b"1U\n";
pub const CONTINUOUS_PRINT: &[u8] = b"CP\n";
/// Sent in order when a session starts; none is acknowledged.
pub const CONFIGURE: [&[u8]; 4] = [EXIT_STANDBY, WEIGH_MODE, UNIT_GRAMS, CONTINUOUS_PRINT];

pub const PRINT: &[u8] = b"P\r\n";
pub const TARE: &[u8] = b"T\r\n";

const UNIT_SUFFIX: &str = " g";
const UNSTABLE_MARK: char = '?';

#[derive(Debug, Clone, Copy, Default)]
pub struct OhausDecoder;

impl Decoder for OhausDecoder {
    fn decode(&self, line: &str) -> DecodeOutcome {
        let trimmed = line.trim();
        let mut text = trimmed;
        let unstable = text.ends_with(UNSTABLE_MARK);
        if unstable {
            text = text[..text.len() - UNSTABLE_MARK.len_utf8()].trim_end();
        }
        let Some(number) = text.strip_suffix(UNIT_SUFFIX) else {
            return Err(DecodeError::UnexpectedResponse(trimmed.to_string()));
        };
        let weight: Weight = number
            .parse()
            .map_err(|_| DecodeError::InvalidNumber(trimmed.to_string()))?;
        Ok(Reading::new(weight, !unstable))
    }

    fn encode(&self, reading: &Reading) -> String {
        let mark = if reading.stable { "" } else { "?" };
        format!("{:>9}{UNIT_SUFFIX}{mark}\r\n", reading.weight)
    }
}
