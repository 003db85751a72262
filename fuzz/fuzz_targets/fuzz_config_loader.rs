#![no_main]
use libfuzzer_sys::fuzz_target;

fuzz_target!(|data: &str| {
    // Parse errors and validation errors are both fine; panics are not.
    if let Ok(cfg) = toml::from_str::<weigh_config::Config>(data) {
        if cfg.validate().is_ok() {
            let timing: weigh_core::SessionCfg = (&cfg.timing).into();
            assert!(timing.validate().is_ok());
        }
    }
});
