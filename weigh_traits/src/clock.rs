//! Time source for reading-age bookkeeping.
//!
//! Sessions stamp each good reading with `now()` and report how long ago the
//! last one arrived. Cadence and timeouts run on real time and do not go
//! through this trait.

use std::time::Instant;

pub trait Clock {
    fn now(&self) -> Instant;

    /// Milliseconds elapsed since `epoch`, saturating at 0 if `epoch` is later.
    fn ms_since(&self, epoch: Instant) -> u64 {
        let elapsed = self.now().saturating_duration_since(epoch);
        u64::try_from(elapsed.as_millis()).unwrap_or(u64::MAX)
    }
}

/// Wall-clock monotonic time.
#[derive(Debug, Default, Clone, Copy)]
pub struct MonotonicClock;

impl MonotonicClock {
    pub fn new() -> Self {
        Self
    }
}

impl Clock for MonotonicClock {
    #[inline]
    fn now(&self) -> Instant {
        Instant::now()
    }
}

#[cfg(any(test, feature = "test-clock"))]
pub mod test_clock {
    use super::*;
    use std::sync::{Arc, Mutex, PoisonError};
    use std::time::Duration;

    /// Clock that only moves when told to. Clones share the same time.
    #[derive(Debug, Clone)]
    pub struct TestClock {
        origin: Instant,
        offset: Arc<Mutex<Duration>>,
    }

    impl Default for TestClock {
        fn default() -> Self {
            Self::new()
        }
    }

    impl TestClock {
        pub fn new() -> Self {
            Self {
                origin: Instant::now(),
                offset: Arc::new(Mutex::new(Duration::ZERO)),
            }
        }

        pub fn advance(&self, d: Duration) {
            let mut off = self.offset.lock().unwrap_or_else(PoisonError::into_inner);
            *off = off.saturating_add(d);
        }
    }

    impl Clock for TestClock {
        fn now(&self) -> Instant {
            self.origin + *self.offset.lock().unwrap_or_else(PoisonError::into_inner)
        }
    }

    #[cfg(test)]
    mod tests {
        use super::*;

        #[test]
        fn stands_still_until_advanced() {
            let clock = TestClock::new();
            let epoch = clock.now();
            std::thread::sleep(Duration::from_millis(5));
            assert_eq!(clock.ms_since(epoch), 0);
            clock.advance(Duration::from_secs(30));
            assert_eq!(clock.ms_since(epoch), 30_000);
        }

        #[test]
        fn clones_share_time() {
            let a = TestClock::new();
            let b = a.clone();
            let epoch = a.now();
            b.advance(Duration::from_millis(250));
            assert_eq!(a.ms_since(epoch), 250);
        }

        #[test]
        fn later_epoch_saturates_to_zero() {
            let clock = TestClock::new();
            let epoch = clock.now() + Duration::from_secs(1);
            assert_eq!(clock.ms_since(epoch), 0);
        }
    }
}
