//! Transports for serial scales: the physical port and simulated devices.

pub mod error;
#[cfg(feature = "hardware")]
pub mod serial;
pub mod settings;
pub mod sim;

pub use error::HwError;
#[cfg(feature = "hardware")]
pub use serial::SerialTransport;
pub use settings::{Parity, SerialSettings, StopBits};
pub use sim::{SimFaults, SimLoad, SimulatedOhaus, SimulatedSi};
