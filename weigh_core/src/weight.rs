//! Exact decimal weights.
//!
//! Scales print a fixed number of decimals; `Weight` keeps the integer
//! mantissa and that decimal count so no reading ever passes through binary
//! floating point. Equality and ordering compare numeric value, so `53.98`
//! and `53.980` are equal while each still prints the way it was received.

use std::cmp::Ordering;
use std::fmt;
use std::hash::{Hash, Hasher};
use std::str::FromStr;

use thiserror::Error;

/// Largest supported number of decimals (10^18 still fits in `u64`).
pub const MAX_SCALE: u32 = 18;

#[derive(Debug, Error, Clone, PartialEq, Eq)]
pub enum ParseWeightError {
    #[error("empty number")]
    Empty,
    #[error("unexpected character {0:?}")]
    InvalidChar(char),
    #[error("number out of range")]
    Overflow,
}

#[derive(Debug, Clone, Copy, Default)]
pub struct Weight {
    mantissa: i64,
    scale: u32,
}

impl Weight {
    pub const ZERO: Weight = Weight {
        mantissa: 0,
        scale: 0,
    };

    /// `mantissa * 10^-scale`. Scales above [`MAX_SCALE`] are clamped.
    pub fn new(mantissa: i64, scale: u32) -> Self {
        Self {
            mantissa,
            scale: scale.min(MAX_SCALE),
        }
    }

    pub fn mantissa(self) -> i64 {
        self.mantissa
    }

    /// Number of decimals as received.
    pub fn scale(self) -> u32 {
        self.scale
    }

    pub fn is_negative(self) -> bool {
        self.mantissa < 0
    }

    /// Lossy conversion for display and plotting.
    pub fn to_f64(self) -> f64 {
        self.mantissa as f64 / 10f64.powi(self.scale as i32)
    }

    /// Same value with trailing zero decimals removed.
    fn normalized(self) -> (i64, u32) {
        let (mut m, mut s) = (self.mantissa, self.scale);
        while s > 0 && m % 10 == 0 {
            m /= 10;
            s -= 1;
        }
        (m, s)
    }

    /// Mantissa rescaled to `scale` decimals, widened so it cannot overflow.
    fn widened(self, scale: u32) -> i128 {
        i128::from(self.mantissa) * 10i128.pow(scale - self.scale)
    }
}

impl PartialEq for Weight {
    fn eq(&self, other: &Self) -> bool {
        self.normalized() == other.normalized()
    }
}

impl Eq for Weight {}

impl Hash for Weight {
    fn hash<H: Hasher>(&self, state: &mut H) {
        self.normalized().hash(state);
    }
}

impl Ord for Weight {
    fn cmp(&self, other: &Self) -> Ordering {
        let scale = self.scale.max(other.scale);
        self.widened(scale).cmp(&other.widened(scale))
    }
}

impl PartialOrd for Weight {
    fn partial_cmp(&self, other: &Self) -> Option<Ordering> {
        Some(self.cmp(other))
    }
}

impl fmt::Display for Weight {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let sign = if self.mantissa < 0 { "-" } else { "" };
        let abs = self.mantissa.unsigned_abs();
        let text = if self.scale == 0 {
            format!("{sign}{abs}")
        } else {
            let pow = 10u64.pow(self.scale);
            let width = self.scale as usize;
            format!("{sign}{}.{:0width$}", abs / pow, abs % pow)
        };
        f.pad(&text)
    }
}

/// Accepts surrounding whitespace, one sign either leading or trailing, and
/// digits with at most one decimal point (`53.98`, `-0.02`, `0.02-`, `+5`,
/// `.5`, `12.`). Commas may group integer digits (`1,234.5`) but must follow a
/// digit. Exponents and currency symbols are rejected.
impl FromStr for Weight {
    type Err = ParseWeightError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        let s = s.trim();
        let (negative, body) = match s.as_bytes().first() {
            Some(b'-') => (true, &s[1..]),
            Some(b'+') => (false, &s[1..]),
            _ => match s.as_bytes().last() {
                Some(b'-') => (true, &s[..s.len() - 1]),
                Some(b'+') => (false, &s[..s.len() - 1]),
                _ => (false, s),
            },
        };

        let mut mantissa: i64 = 0;
        let mut scale: u32 = 0;
        let mut digits = 0usize;
        let mut seen_point = false;
        let mut after_digit = false;
        for c in body.chars() {
            match c {
                '0'..='9' => {
                    let d = i64::from(c as u8 - b'0');
                    mantissa = mantissa
                        .checked_mul(10)
                        .and_then(|m| m.checked_add(d))
                        .ok_or(ParseWeightError::Overflow)?;
                    digits += 1;
                    after_digit = true;
                    if seen_point {
                        scale += 1;
                        if scale > MAX_SCALE {
                            return Err(ParseWeightError::Overflow);
                        }
                    }
                }
                '.' if !seen_point => {
                    seen_point = true;
                    after_digit = false;
                }
                ',' if !seen_point && after_digit => after_digit = false,
                other => return Err(ParseWeightError::InvalidChar(other)),
            }
        }
        if digits == 0 {
            return Err(ParseWeightError::Empty);
        }
        Ok(Weight {
            mantissa: if negative { -mantissa } else { mantissa },
            scale,
        })
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use rstest::rstest;

    #[rstest]
    #[case("53.98", 5398, 2)]
    #[case("  -0.02 ", -2, 2)]
    #[case("+5", 5, 0)]
    #[case(".5", 5, 1)]
    #[case("12.", 12, 0)]
    #[case("0.000", 0, 3)]
    #[case("0.02-", -2, 2)]
    #[case("5+", 5, 0)]
    #[case("1,234.5", 12345, 1)]
    #[case(" -1,000,000 ", -1_000_000, 0)]
    fn parses_exactly(#[case] s: &str, #[case] mantissa: i64, #[case] scale: u32) {
        let w: Weight = s.parse().unwrap();
        assert_eq!((w.mantissa(), w.scale()), (mantissa, scale));
    }

    #[rstest]
    #[case("", ParseWeightError::Empty)]
    #[case("-", ParseWeightError::Empty)]
    #[case(".", ParseWeightError::Empty)]
    #[case("1.2.3", ParseWeightError::InvalidChar('.'))]
    #[case("5 g", ParseWeightError::InvalidChar(' '))]
    #[case("--1", ParseWeightError::InvalidChar('-'))]
    #[case("-1-", ParseWeightError::InvalidChar('-'))]
    #[case(",5", ParseWeightError::InvalidChar(','))]
    #[case("1,,2", ParseWeightError::InvalidChar(','))]
    #[case("1.2,3", ParseWeightError::InvalidChar(','))]
    #[case("1e3", ParseWeightError::InvalidChar('e'))]
    #[case("99999999999999999999", ParseWeightError::Overflow)]
    fn rejects_malformed(#[case] s: &str, #[case] err: ParseWeightError) {
        assert_eq!(s.parse::<Weight>().unwrap_err(), err);
    }

    #[test]
    fn display_keeps_received_decimals() {
        assert_eq!(Weight::new(5398, 2).to_string(), "53.98");
        assert_eq!(Weight::new(-2, 2).to_string(), "-0.02");
        assert_eq!(Weight::new(5, 3).to_string(), "0.005");
        assert_eq!(Weight::new(42, 0).to_string(), "42");
        assert_eq!(format!("{:>8}", Weight::new(5398, 2)), "   53.98");
    }

    #[test]
    fn equality_is_by_value() {
        assert_eq!(Weight::new(5398, 2), Weight::new(53980, 3));
        assert_ne!(Weight::new(5398, 2), Weight::new(5399, 2));
        assert_eq!(Weight::new(0, 2), Weight::ZERO);
    }

    #[test]
    fn ordering_aligns_scales() {
        assert!(Weight::new(-2, 2) < Weight::ZERO);
        assert!(Weight::new(1, 1) > Weight::new(99, 3));
        assert_eq!(Weight::new(10, 1).cmp(&Weight::new(1, 0)), Ordering::Equal);
    }

    #[test]
    fn to_f64_is_close() {
        assert!((Weight::new(5398, 2).to_f64() - 53.98).abs() < 1e-9);
    }
}
