//! Events published by a session to its subscriber.
//!
//! Delivery is synchronous on the session's processing thread. Sinks must
//! return quickly; anything slow belongs on the other side of a channel
//! (see [`ChannelSink`]).

use crossbeam_channel as xch;

use crate::error::SessionError;
use crate::types::Reading;

#[derive(Debug, Clone, PartialEq, Eq)]
pub enum ScaleEvent {
    Measurement(Reading),
    Error { error: SessionError, fatal: bool },
}

pub trait EventSink: Send {
    fn emit(&mut self, event: ScaleEvent);
}

impl<F: FnMut(ScaleEvent) + Send> EventSink for F {
    fn emit(&mut self, event: ScaleEvent) {
        self(event)
    }
}

/// Forwards events into an unbounded channel; never blocks the sender.
#[derive(Debug, Clone)]
pub struct ChannelSink(xch::Sender<ScaleEvent>);

impl EventSink for ChannelSink {
    fn emit(&mut self, event: ScaleEvent) {
        // A gone receiver only means nobody is listening any more.
        let _ = self.0.send(event);
    }
}

/// A sink plus the receiver that observes it.
pub fn channel() -> (ChannelSink, xch::Receiver<ScaleEvent>) {
    let (tx, rx) = xch::unbounded();
    (ChannelSink(tx), rx)
}
