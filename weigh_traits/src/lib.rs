//! Capability traits shared by the scale engine and its hardware backends.

pub mod clock;

pub use clock::{Clock, MonotonicClock};

use std::time::Duration;

/// Error type crossing the transport boundary.
pub type BoxError = Box<dyn std::error::Error + Send + Sync>;

/// Outcome of waiting for input on a [`Transport`].
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum Available {
    /// One or more bytes arrived.
    Bytes(Vec<u8>),
    /// Nothing arrived before the timeout elapsed.
    Idle,
    /// The peer will not send any more data.
    Closed,
}

/// Byte-oriented duplex stream backing a scale connection.
///
/// Line settings (baud rate, parity, stop bits) are fixed when the concrete
/// transport is constructed; implementations never expose them here.
pub trait Transport: Send {
    fn open(&mut self) -> Result<(), BoxError>;

    fn write(&mut self, bytes: &[u8]) -> Result<(), BoxError>;

    /// Block until bytes are available or `timeout` elapses, then return
    /// everything currently buffered. This is the "bytes are available"
    /// notification: a return of [`Available::Bytes`] is one notification.
    fn read_available(&mut self, timeout: Duration) -> Result<Available, BoxError>;

    fn close(&mut self) -> Result<(), BoxError>;
}

impl<T: Transport + ?Sized> Transport for Box<T> {
    fn open(&mut self) -> Result<(), BoxError> {
        (**self).open()
    }

    fn write(&mut self, bytes: &[u8]) -> Result<(), BoxError> {
        (**self).write(bytes)
    }

    fn read_available(&mut self, timeout: Duration) -> Result<Available, BoxError> {
        (**self).read_available(timeout)
    }

    fn close(&mut self) -> Result<(), BoxError> {
        (**self).close()
    }
}
