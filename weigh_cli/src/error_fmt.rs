//! Human-readable error descriptions and structured JSON error formatting.

use weigh_core::{BuildError, SessionError};

/// Map an eyre::Report to a human-readable explanation with likely causes and fix hints.
pub fn humanize(err: &eyre::Report) -> String {
    // Typed matches first
    if let Some(be) = err.downcast_ref::<BuildError>() {
        return match be {
            BuildError::MissingTransport | BuildError::MissingSink => format!(
                "What happened: The session was not fully assembled ({be}).\nLikely causes: A bug in how the CLI wires the session.\nHow to fix: Re-run with --log-level=debug and report the output."
            ),
            BuildError::InvalidConfig(msg) => format!(
                "What happened: Invalid configuration ({msg}).\nLikely causes: Missing or out-of-range values in [timing].\nHow to fix: Edit the config file, then rerun."
            ),
            BuildError::Open(msg) => format!(
                "What happened: Could not open the scale port ({msg}).\nLikely causes: Wrong port.path, the port is in use, or missing permissions (e.g. the dialout group).\nHow to fix: Check [port] in the config and that no other program holds the port."
            ),
        };
    }

    if let Some(se) = err.downcast_ref::<SessionError>() {
        return match se {
            SessionError::EndOfInput => "What happened: The scale stopped sending data and the connection ended.\nLikely causes: Cable unplugged, USB adapter reset, or the scale was switched off.\nHow to fix: Reconnect the scale and run the command again.".to_string(),
            SessionError::Transport(msg) => format!(
                "What happened: Serial transport failure ({msg}).\nLikely causes: Adapter unplugged or a driver error.\nHow to fix: Reconnect the adapter; check `dmesg` for driver messages."
            ),
            SessionError::ResponseTimeout(ms) => format!(
                "What happened: The scale did not answer within {ms} ms.\nLikely causes: Wrong baud rate, parity or stop bits, wrong dialect, or the scale is off.\nHow to fix: Compare [port] with the scale's RS-232 menu and check [scale].dialect."
            ),
            SessionError::Unsupported(op) => format!(
                "What happened: {op} is not available for this scale.\nLikely causes: The configured dialect only answers print requests.\nHow to fix: Use the scale's front panel instead."
            ),
            other => format!(
                "What happened: {other}.\nLikely causes: See logs.\nHow to fix: Re-run with --log-level=debug or set RUST_LOG for more detail."
            ),
        };
    }

    // String-based heuristics for errors coming from init or config
    let msg = err.to_string();
    let lower = msg.to_ascii_lowercase();

    if lower.contains("read config") {
        return format!(
            "What happened: The config file could not be read.\nLikely causes: Wrong --config path.\nHow to fix: Pass --config pointing at a TOML file. Original: {msg}"
        );
    }

    if lower.contains("parse config") || lower.contains(" must ") {
        return format!(
            "What happened: Configuration is invalid or incomplete.\nLikely causes: A missing [scale] table or an out-of-range value.\nHow to fix: Edit the TOML config and try again. Original: {msg}"
        );
    }

    // Generic fallback
    let mut cause = String::new();
    if let Some(src) = err.source() {
        cause = format!(" Cause: {src}");
    }
    format!(
        "Something went wrong.{cause}\nHow to fix: Re-run with --log-level=debug for details. Original: {msg}"
    )
}

/// Stable exit codes per failure class; anything unclassified returns 1.
pub fn exit_code_for_error(err: &eyre::Report) -> i32 {
    if let Some(BuildError::Open(_)) = err.downcast_ref::<BuildError>() {
        return 3;
    }
    if let Some(se) = err.downcast_ref::<SessionError>() {
        return match se {
            SessionError::Transport(_) => 4,
            SessionError::EndOfInput => 5,
            SessionError::ResponseTimeout(_) => 6,
            SessionError::Unsupported(_) => 7,
            _ => 1,
        };
    }
    1
}

/// Short stable name for JSON consumers.
pub fn reason_name(err: &eyre::Report) -> &'static str {
    if let Some(be) = err.downcast_ref::<BuildError>() {
        return match be {
            BuildError::Open(_) => "OpenFailed",
            BuildError::InvalidConfig(_) => "InvalidConfig",
            BuildError::MissingTransport | BuildError::MissingSink => "Build",
        };
    }
    if let Some(se) = err.downcast_ref::<SessionError>() {
        return match se {
            SessionError::Transport(_) => "Transport",
            SessionError::EndOfInput => "EndOfInput",
            SessionError::ResponseTimeout(_) => "ResponseTimeout",
            SessionError::Unsupported(_) => "Unsupported",
            SessionError::Closed => "Closed",
            SessionError::Decode(_) => "Decode",
        };
    }
    "Error"
}

/// Structured JSON for errors when --json is enabled.
pub fn format_error_json(err: &eyre::Report) -> String {
    use serde_json::json;

    let msg = humanize(err);
    match err.downcast_ref::<SessionError>() {
        Some(SessionError::ResponseTimeout(ms)) => json!({
            "reason": reason_name(err),
            "details": { "timeout_ms": ms },
            "message": msg,
        })
        .to_string(),
        _ => json!({ "reason": reason_name(err), "message": msg }).to_string(),
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use rstest::rstest;

    #[rstest]
    #[case(eyre::Report::new(BuildError::Open("busy".into())), 3, "OpenFailed")]
    #[case(eyre::Report::new(SessionError::Transport("x".into())), 4, "Transport")]
    #[case(eyre::Report::new(SessionError::EndOfInput), 5, "EndOfInput")]
    #[case(eyre::Report::new(SessionError::ResponseTimeout(1000)), 6, "ResponseTimeout")]
    #[case(eyre::Report::new(SessionError::Unsupported("tare")), 7, "Unsupported")]
    #[case(eyre::eyre!("anything else"), 1, "Error")]
    fn codes_and_names_are_stable(
        #[case] err: eyre::Report,
        #[case] code: i32,
        #[case] name: &str,
    ) {
        assert_eq!(exit_code_for_error(&err), code);
        assert_eq!(reason_name(&err), name);
    }

    #[test]
    fn timeout_json_carries_details() {
        let err = eyre::Report::new(SessionError::ResponseTimeout(250));
        let v: serde_json::Value = serde_json::from_str(&format_error_json(&err)).unwrap();
        assert_eq!(v["reason"], "ResponseTimeout");
        assert_eq!(v["details"]["timeout_ms"], 250);
        assert!(v["message"].as_str().unwrap().contains("250 ms"));
    }

    #[test]
    fn humanize_explains_open_failures() {
        let err = eyre::Report::new(BuildError::Open("open /dev/ttyUSB9: no such file".into()));
        let text = humanize(&err);
        assert!(text.starts_with("What happened: Could not open the scale port"));
        assert!(text.contains("port.path"));
    }
}
