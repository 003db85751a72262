//! `From` implementations bridging `weigh_config` types to `weigh_core` types.

use std::time::Duration;

use crate::config::SessionCfg;
use crate::dialect::Dialect;

impl From<&weigh_config::Timing> for SessionCfg {
    fn from(c: &weigh_config::Timing) -> Self {
        Self {
            poll_interval: Duration::from_millis(c.poll_interval_ms),
            read_timeout: Duration::from_millis(c.read_timeout_ms),
            response_timeout: Duration::from_millis(c.response_timeout_ms),
        }
    }
}

impl From<weigh_config::DialectCfg> for Dialect {
    fn from(d: weigh_config::DialectCfg) -> Self {
        match d {
            weigh_config::DialectCfg::Ohaus => Dialect::Ohaus,
            weigh_config::DialectCfg::Si => Dialect::Si,
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn default_timing_matches_core_defaults() {
        let t = weigh_config::Timing::default();
        assert_eq!(SessionCfg::from(&t), SessionCfg::default());
    }
}
