#![cfg_attr(all(not(debug_assertions), not(test)), deny(warnings))]
#![cfg_attr(
    all(not(debug_assertions), not(test)),
    deny(clippy::all, clippy::pedantic, clippy::nursery)
)]
#![allow(clippy::module_name_repetitions, clippy::missing_errors_doc)]
//! Console rendering of scale readings.

use weigh_core::{Reading, Weight};

const STABLE: &str = "Stable";
const UNSETTLED: &str = "      ";

/// One console line per reading: `"     53.98 g Stable"`.
///
/// The weight is shown with at most two decimals, trailing zeros dropped.
pub fn render_reading(reading: &Reading) -> String {
    let flag = if reading.stable { STABLE } else { UNSETTLED };
    format!("{:>10} g {flag}", display_weight(reading.weight))
}

/// Round half away from zero to two decimals, then drop trailing zeros.
pub fn display_weight(w: Weight) -> Weight {
    let (mut m, mut s) = (i128::from(w.mantissa()), w.scale());
    if s > 2 {
        let div = 10i128.pow(s - 2);
        let half = div / 2;
        m = if m < 0 { (m - half) / div } else { (m + half) / div };
        s = 2;
    }
    while s > 0 && m % 10 == 0 {
        m /= 10;
        s -= 1;
    }
    // Two decimals of an i64 mantissa always fit back into i64.
    Weight::new(i64::try_from(m).unwrap_or(i64::MAX), s)
}

#[cfg(test)]
mod tests {
    use super::*;
    use rstest::rstest;

    #[rstest]
    #[case(Weight::new(5398, 2), "53.98")]
    #[case(Weight::new(53980, 3), "53.98")]
    #[case(Weight::new(5300, 2), "53")]
    #[case(Weight::new(5350, 2), "53.5")]
    #[case(Weight::new(12345, 3), "12.35")]
    #[case(Weight::new(-12345, 3), "-12.35")]
    #[case(Weight::new(-2, 2), "-0.02")]
    #[case(Weight::new(-4, 3), "0")]
    #[case(Weight::ZERO, "0")]
    fn two_decimals_at_most(#[case] w: Weight, #[case] shown: &str) {
        assert_eq!(display_weight(w).to_string(), shown);
    }

    #[test]
    fn stable_flag_is_spelled_out() {
        let line = render_reading(&Reading::new(Weight::new(5398, 2), true));
        assert_eq!(line, "     53.98 g Stable");
    }

    #[test]
    fn unsettled_keeps_column_width() {
        let line = render_reading(&Reading::new(Weight::new(-2, 2), false));
        assert_eq!(line, "     -0.02 g       ");
        assert_eq!(line.len(), "     53.98 g Stable".len());
    }
}
