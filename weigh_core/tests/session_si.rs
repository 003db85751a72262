//! Poll-session behaviour against a scripted transport.

use std::time::{Duration, Instant};

use weigh_core::dialect::si;
use weigh_core::event;
use weigh_core::mocks::{ScriptedTransport, Step};
use weigh_core::{
    DecodeError, Dialect, Lifecycle, Reading, ScaleEvent, Session, SessionCfg, SessionError, Weight,
};

const WAIT: Duration = Duration::from_secs(2);

fn cfg(poll_ms: u64, response_ms: u64) -> SessionCfg {
    SessionCfg {
        poll_interval: Duration::from_millis(poll_ms),
        read_timeout: Duration::from_millis(5),
        response_timeout: Duration::from_millis(response_ms),
    }
}

fn wait_until(mut cond: impl FnMut() -> bool) -> bool {
    let deadline = Instant::now() + WAIT;
    while Instant::now() < deadline {
        if cond() {
            return true;
        }
        std::thread::sleep(Duration::from_millis(2));
    }
    cond()
}

#[test]
fn each_poll_yields_one_measurement() {
    let transport =
        ScriptedTransport::new([]).with_replies(["  -0.02  GS\r\n", "    1.00  G\r\n"]);
    let log = transport.log();
    let (sink, rx) = event::channel();
    let mut session = Session::builder(Dialect::Si)
        .with_transport(transport)
        .with_sink(sink)
        .with_config(cfg(10, 500))
        .build()
        .unwrap();

    assert_eq!(
        rx.recv_timeout(WAIT).unwrap(),
        ScaleEvent::Measurement(Reading::new(Weight::new(-2, 2), true))
    );
    assert_eq!(
        rx.recv_timeout(WAIT).unwrap(),
        ScaleEvent::Measurement(Reading::new(Weight::new(100, 2), false))
    );
    session.shutdown();

    assert!(log.writes().iter().all(|w| w == si::PRINT_IMMEDIATE));
    assert_eq!(log.overlapping_writes(), 0);
}

#[test]
fn reply_split_across_reads_is_reassembled() {
    let transport = ScriptedTransport::new([Step::text("  GS\r\n")]).with_replies(["   5.00"]);
    let (sink, rx) = event::channel();
    let _session = Session::builder(Dialect::Si)
        .with_transport(transport)
        .with_sink(sink)
        .with_config(cfg(10, 500))
        .build()
        .unwrap();

    assert_eq!(
        rx.recv_timeout(WAIT).unwrap(),
        ScaleEvent::Measurement(Reading::new(Weight::new(500, 2), true))
    );
}

#[test]
fn silent_scale_times_out_and_polling_continues() {
    let transport = ScriptedTransport::new([]);
    let log = transport.log();
    let (sink, rx) = event::channel();
    let session = Session::builder(Dialect::Si)
        .with_transport(transport)
        .with_sink(sink)
        .with_config(cfg(10, 40))
        .build()
        .unwrap();

    assert_eq!(
        rx.recv_timeout(WAIT).unwrap(),
        ScaleEvent::Error {
            error: SessionError::ResponseTimeout(40),
            fatal: false
        }
    );
    assert!(wait_until(|| log.writes().len() >= 2));
    assert!(session.is_open());
    assert_eq!(log.overlapping_writes(), 0);
}

#[test]
fn malformed_reply_is_not_fatal_and_polling_continues() {
    let transport = ScriptedTransport::new([]).with_replies([
        "  1.00  GS\r\n",
        "  -0.02  KG\r\n",
        "  2.00  G\r\n",
    ]);
    let (sink, rx) = event::channel();
    let session = Session::builder(Dialect::Si)
        .with_transport(transport)
        .with_sink(sink)
        .with_config(cfg(50, 500))
        .build()
        .unwrap();

    let first = Reading::new(Weight::new(100, 2), true);
    assert_eq!(rx.recv_timeout(WAIT).unwrap(), ScaleEvent::Measurement(first));
    assert_eq!(
        rx.recv_timeout(WAIT).unwrap(),
        ScaleEvent::Error {
            error: SessionError::Decode(DecodeError::UnexpectedResponse("-0.02  KG".into())),
            fatal: false
        }
    );
    assert_eq!(session.latest(), Some(first));
    assert_eq!(
        rx.recv_timeout(WAIT).unwrap(),
        ScaleEvent::Measurement(Reading::new(Weight::new(200, 2), false))
    );
    assert!(session.is_open());
}

#[test]
fn late_reply_is_discarded_before_the_next_poll() {
    // Every answer lands 10 ms after the response timeout.
    let transport = ScriptedTransport::new([])
        .with_replies(std::iter::repeat_n("  1.00  GS\r\n", 100))
        .with_reply_delay(Duration::from_millis(30));
    let log = transport.log();
    let (sink, rx) = event::channel();
    let mut session = Session::builder(Dialect::Si)
        .with_transport(transport)
        .with_sink(sink)
        .with_config(cfg(5, 20))
        .build()
        .unwrap();

    std::thread::sleep(Duration::from_millis(400));
    session.shutdown();

    let events: Vec<ScaleEvent> = rx.try_iter().collect();
    let timeouts = events
        .iter()
        .filter(|e| {
            **e == ScaleEvent::Error {
                error: SessionError::ResponseTimeout(20),
                fatal: false,
            }
        })
        .count();
    assert!(timeouts >= 2, "{events:?}");
    assert!(
        !events
            .iter()
            .any(|e| matches!(e, ScaleEvent::Measurement(_))),
        "a late reply answered a later poll: {events:?}"
    );
    assert!(log.writes().len() >= 2);
    assert_eq!(log.overlapping_writes(), 0);
    assert_eq!(session.latest(), None);
}

#[test]
fn end_of_input_closes_the_session() {
    let transport = ScriptedTransport::new([Step::Closed]);
    let log = transport.log();
    let (sink, rx) = event::channel();
    let session = Session::builder(Dialect::Si)
        .with_transport(transport)
        .with_sink(sink)
        .with_config(cfg(10, 500))
        .build()
        .unwrap();

    assert_eq!(
        rx.recv_timeout(WAIT).unwrap(),
        ScaleEvent::Error {
            error: SessionError::EndOfInput,
            fatal: true
        }
    );
    assert!(wait_until(|| session.lifecycle() == Lifecycle::Closed));
    assert_eq!(log.writes().len(), 1);
    assert_eq!(log.closes(), 1);
}

#[test]
fn no_poll_is_written_after_shutdown() {
    let transport = ScriptedTransport::new([]);
    let log = transport.log();
    let (sink, _rx) = event::channel();
    let mut session = Session::builder(Dialect::Si)
        .with_transport(transport)
        .with_sink(sink)
        .with_config(cfg(10_000, 10_000))
        .build()
        .unwrap();

    let started = Instant::now();
    session.shutdown();
    assert!(started.elapsed() < Duration::from_secs(1));
    assert!(log.writes().is_empty());
    assert_eq!(log.closes(), 1);
}

#[test]
fn tare_and_print_are_unsupported() {
    let (sink, _rx) = event::channel();
    let session = Session::builder(Dialect::Si)
        .with_transport(ScriptedTransport::new([]))
        .with_sink(sink)
        .with_config(cfg(10_000, 10_000))
        .build()
        .unwrap();

    assert_eq!(session.tare(), Err(SessionError::Unsupported("tare")));
    assert_eq!(session.poll(), Err(SessionError::Unsupported("poll")));
}
