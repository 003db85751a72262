//! SI print format: `"  -0.02  GS"` when settled, `"  -0.02  G"` otherwise.
//!
//! The balance's "fast mode" prints a different layout that is not documented
//! well enough to parse; those lines decode as `UnexpectedResponse`.

use super::{DecodeOutcome, Decoder};
use crate::error::DecodeError;
use crate::types::Reading;
use crate::weight::Weight;

/// Immediate print; the balance answers with one line.
pub const PRINT_IMMEDIATE: &[u8] = b"#\n";

const UNIT_SUFFIX: &str = "  G";
const STABLE_MARK: char = 'S';

#[derive(Debug, Clone, Copy, Default)]
pub struct SiDecoder;

impl Decoder for SiDecoder {
    fn decode(&self, line: &str) -> DecodeOutcome {
        let trimmed = line.trim();
        let mut text = trimmed;
        let stable = text.ends_with(STABLE_MARK);
        if stable {
            text = &text[..text.len() - STABLE_MARK.len_utf8()];
        }
        let Some(number) = text.strip_suffix(UNIT_SUFFIX) else {
            return Err(DecodeError::UnexpectedResponse(trimmed.to_string()));
        };
        let weight: Weight = number
            .parse()
            .map_err(|_| DecodeError::InvalidNumber(trimmed.to_string()))?;
        Ok(Reading::new(weight, stable))
    }

    fn encode(&self, reading: &Reading) -> String {
        let mark = if reading.stable { "S" } else { "" };
        format!("{:>9}{UNIT_SUFFIX}{mark}\r\n", reading.weight)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn suffix_needs_two_spaces() {
        assert!(matches!(
            SiDecoder.decode("-0.02 GS"),
            Err(DecodeError::UnexpectedResponse(_))
        ));
    }

    #[test]
    fn crlf_remnants_are_trimmed() {
        let r = SiDecoder.decode("   12.50  GS\r").unwrap();
        assert_eq!(r, Reading::new(Weight::new(1250, 2), true));
    }
}
