use proptest::prelude::*;
use rstest::rstest;
use weigh_core::{DecodeError, Decoder, Dialect, OhausDecoder, Reading, SiDecoder, Weight};

fn reading(mantissa: i64, scale: u32, stable: bool) -> Reading {
    Reading::new(Weight::new(mantissa, scale), stable)
}

#[rstest]
#[case("   53.98 g", reading(5398, 2, true))]
#[case("   53.98 g?", reading(5398, 2, false))]
#[case("   53.98 g ?", reading(5398, 2, false))]
#[case("    -0.02 g", reading(-2, 2, true))]
#[case("  1000.0 g", reading(10000, 1, true))]
#[case("   53.98 g\r", reading(5398, 2, true))]
fn ohaus_accepts(#[case] line: &str, #[case] expected: Reading) {
    assert_eq!(OhausDecoder.decode(line).unwrap(), expected);
}

#[rstest]
#[case("garbage", DecodeError::UnexpectedResponse("garbage".into()))]
#[case("12.3 kg", DecodeError::UnexpectedResponse("12.3 kg".into()))]
#[case("", DecodeError::UnexpectedResponse("".into()))]
#[case("  --OL--", DecodeError::UnexpectedResponse("--OL--".into()))]
#[case("   5x.98 g", DecodeError::InvalidNumber("5x.98 g".into()))]
#[case("  g", DecodeError::UnexpectedResponse("g".into()))]
fn ohaus_rejects(#[case] line: &str, #[case] expected: DecodeError) {
    assert_eq!(OhausDecoder.decode(line).unwrap_err(), expected);
}

#[rstest]
#[case("  -0.02  GS", reading(-2, 2, true))]
#[case("  -0.02  G", reading(-2, 2, false))]
#[case("   150.5  GS\r", reading(1505, 1, true))]
fn si_accepts(#[case] line: &str, #[case] expected: Reading) {
    assert_eq!(SiDecoder.decode(line).unwrap(), expected);
}

#[rstest]
#[case("  -0.02  KG", DecodeError::UnexpectedResponse("-0.02  KG".into()))]
#[case("  -0.02 G", DecodeError::UnexpectedResponse("-0.02 G".into()))]
#[case("  1.2.3  G", DecodeError::InvalidNumber("1.2.3  G".into()))]
#[case("S", DecodeError::UnexpectedResponse("S".into()))]
fn si_rejects(#[case] line: &str, #[case] expected: DecodeError) {
    assert_eq!(SiDecoder.decode(line).unwrap_err(), expected);
}

#[test]
fn dialect_dispatches_to_its_grammar() {
    assert!(Dialect::Ohaus.decode("  -0.02  GS").is_err());
    assert!(Dialect::Si.decode("   53.98 g").is_err());
    assert_eq!("SI".parse::<Dialect>().unwrap(), Dialect::Si);
    assert!("mettler".parse::<Dialect>().is_err());
}

fn any_reading() -> impl Strategy<Value = Reading> {
    (-9_999_999i64..9_999_999, 0u32..4, any::<bool>())
        .prop_map(|(m, s, stable)| Reading::new(Weight::new(m, s), stable))
}

proptest! {
    #[test]
    fn printed_lines_decode_to_what_was_printed(
        r in any_reading(),
        dialect in prop_oneof![Just(Dialect::Ohaus), Just(Dialect::Si)],
    ) {
        let line = dialect.encode(&r);
        prop_assert!(line.ends_with("\r\n"));
        let back = dialect.decode(&line).unwrap();
        prop_assert_eq!(back, r);
        prop_assert_eq!(back.weight.scale(), r.weight.scale());
    }
}
