//! Maps `Box<dyn Error>` from the transport boundary to typed `SessionError`.
//!
//! `weigh_traits::Transport` uses `Box<dyn Error + Send + Sync>` so any backend
//! can plug in; this module converts those to our typed error enum, with an
//! optional feature-gated path for `weigh_hardware::HwError` downcasting.

use std::io::ErrorKind;

use crate::error::SessionError;

/// Map a transport-boundary error to a typed `SessionError`.
///
/// Attempts to downcast known hardware error types first, then plain
/// `std::io::Error`, then falls back to the error text.
pub fn map_transport_error(e: &(dyn std::error::Error + 'static)) -> SessionError {
    #[cfg(feature = "hardware-errors")]
    {
        use weigh_hardware::HwError;
        if let Some(hw) = e.downcast_ref::<HwError>() {
            return match hw {
                HwError::Closed => SessionError::EndOfInput,
                HwError::Io(io) if is_eof(io.kind()) => SessionError::EndOfInput,
                other => SessionError::Transport(other.to_string()),
            };
        }
    }

    if let Some(io) = e.downcast_ref::<std::io::Error>()
        && is_eof(io.kind())
    {
        return SessionError::EndOfInput;
    }
    SessionError::Transport(e.to_string())
}

fn is_eof(kind: ErrorKind) -> bool {
    matches!(kind, ErrorKind::UnexpectedEof | ErrorKind::BrokenPipe)
}
