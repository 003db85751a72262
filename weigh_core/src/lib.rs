#![cfg_attr(all(not(debug_assertions), not(test)), deny(warnings))]
#![cfg_attr(
    all(not(debug_assertions), not(test)),
    deny(clippy::all, clippy::pedantic, clippy::nursery)
)]
#![allow(clippy::module_name_repetitions, clippy::missing_errors_doc)]
#![cfg_attr(not(test), deny(clippy::unwrap_used, clippy::expect_used))]
//! Line framing and measurement parsing for serial scales (hardware-agnostic).
//!
//! All I/O goes through `weigh_traits::Transport`; this crate turns the byte
//! stream into typed readings and events.
//!
//! ## Architecture
//!
//! - **Framing**: bytes → newline-delimited lines (`framer` module)
//! - **Decoding**: one grammar per scale dialect (`dialect` module)
//! - **Sessions**: push (Ohaus) and poll (SI) processing threads (`session` module)
//! - **Events**: measurements and errors delivered to a registered sink (`event` module)
//!
//! ## Exact weights
//!
//! Weights are fixed-point decimals (`Weight`) holding exactly the digits the
//! scale printed; no reading passes through floating point.

pub mod config;
mod conversions;
pub mod dialect;
pub mod error;
pub mod event;
pub mod framer;
pub mod mocks;
pub mod session;
pub mod transport_error;
pub mod types;
pub mod weight;

pub use config::SessionCfg;
pub use dialect::{DecodeOutcome, Decoder, Dialect, OhausDecoder, SiDecoder};
pub use error::{BuildError, DecodeError, SessionError};
pub use event::{ChannelSink, EventSink, ScaleEvent};
pub use framer::{LineFramer, RawLine};
pub use session::{OhausSession, Session, SessionBuilder, SiSession};
pub use types::{Lifecycle, Reading};
pub use weight::Weight;
