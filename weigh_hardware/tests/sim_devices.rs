use std::time::Duration;

use rstest::rstest;
use weigh_hardware::{HwError, SimFaults, SimLoad, SimulatedOhaus, SimulatedSi};
use weigh_traits::{Available, Transport};

const SHORT: Duration = Duration::from_millis(5);

fn text(a: Available) -> String {
    match a {
        Available::Bytes(b) => String::from_utf8(b).unwrap(),
        other => panic!("expected bytes, got {other:?}"),
    }
}

#[test]
fn io_before_open_is_rejected() {
    let mut si = SimulatedSi::default();
    let err = si.write(b"#\n").expect_err("not open");
    assert!(matches!(err.downcast_ref::<HwError>(), Some(HwError::NotOpen)));
}

#[test]
fn ohaus_prints_on_request() {
    let mut dev = SimulatedOhaus::new(SimLoad::new(5398));
    dev.open().unwrap();
    assert_eq!(dev.read_available(SHORT).unwrap(), Available::Idle);
    dev.write(b"P\r\n").unwrap();
    assert_eq!(text(dev.read_available(SHORT).unwrap()), "    53.98 g\r\n");
}

#[test]
fn ohaus_tare_zeroes_net_weight() {
    let load = SimLoad::new(1250);
    let mut dev = SimulatedOhaus::new(load.clone());
    dev.open().unwrap();
    dev.write(b"T\r\nP\r\n").unwrap();
    assert_eq!(text(dev.read_available(SHORT).unwrap()), "     0.00 g\r\n");
    load.set_cg(1300);
    dev.write(b"P\r\n").unwrap();
    assert_eq!(text(dev.read_available(SHORT).unwrap()), "     0.50 g\r\n");
}

#[test]
fn ohaus_streams_after_continuous_print() {
    let mut dev = SimulatedOhaus::new(SimLoad::new(100))
        .with_print_interval(Duration::from_millis(1))
        .with_settle_prints(1);
    dev.open().unwrap();
    for cmd in ["ON\n", "1M\n", "1U\n", "CP\n"] {
        dev.write(cmd.as_bytes()).unwrap();
    }
    let first = text(dev.read_available(Duration::from_millis(50)).unwrap());
    assert_eq!(first, "     1.00 g?\r\n");
    let second = text(dev.read_available(Duration::from_millis(50)).unwrap());
    assert_eq!(second, "     1.00 g\r\n");
}

#[rstest]
#[case(0, "     0.00  GS\r\n")]
#[case(-2, "    -0.02  GS\r\n")]
#[case(123_456, "  1234.56  GS\r\n")]
fn si_answers_each_poll(#[case] cg: i64, #[case] expected: &str) {
    let mut dev = SimulatedSi::new(SimLoad::new(cg));
    dev.open().unwrap();
    dev.write(b"#\n").unwrap();
    assert_eq!(text(dev.read_available(SHORT).unwrap()), expected);
    assert_eq!(dev.read_available(SHORT).unwrap(), Available::Idle);
}

#[test]
fn si_faults_inject_garbage_then_eof() {
    let mut dev = SimulatedSi::default().with_faults(SimFaults {
        garbage_every: Some(2),
        eof_after: Some(2),
    });
    dev.open().unwrap();
    dev.write(b"#").unwrap();
    assert_eq!(text(dev.read_available(SHORT).unwrap()), "     0.00  GS\r\n");
    dev.write(b"#").unwrap();
    assert_eq!(text(dev.read_available(SHORT).unwrap()), "  --OL--\r\n");
    dev.write(b"#").unwrap();
    assert_eq!(dev.read_available(SHORT).unwrap(), Available::Closed);
}
