//! Signal capture and transmit over the three radio transports.
//!
//! The controller treats every radio the same way: poll once for a pending
//! signal, or transmit one. Polling is a synchronous check that returns
//! immediately; a missed signal is simply `None` on that poll, and the
//! outer loop tries again next tick. No transport runs a thread or a
//! callback of its own.

mod demo;

pub use demo::DemoTransceiver;

use thiserror::Error;

use crate::signal::{Signal, Transport};

#[derive(Debug, Error)]
pub enum TransportError {
    /// The radio reported a failed send. Reported, never retried.
    #[error("{0} transmit failed")]
    TransmitFailed(Transport),
}

/// One radio, capture and transmit.
pub trait Transceiver {
    /// Which transport this is.
    fn transport(&self) -> Transport;

    /// Check once for a pending signal. Never blocks.
    fn poll_once(&mut self) -> Option<Signal>;

    /// Send a signal. Values this transport cannot express are coerced the
    /// way the handheld firmware coerced them (see each implementation).
    fn transmit(&mut self, signal: &Signal) -> Result<(), TransportError>;
}

/// The label a capture is auto-saved under when the user has not named the
/// button yet. Same labels the handheld firmware used.
pub fn default_label(transport: Transport) -> &'static str {
    match transport {
        Transport::Infrared => "IRButton",
        Transport::ShortRange => "RF24Button",
        Transport::SubGhz => "RF433Button",
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_default_labels() {
        assert_eq!(default_label(Transport::Infrared), "IRButton");
        assert_eq!(default_label(Transport::ShortRange), "RF24Button");
        assert_eq!(default_label(Transport::SubGhz), "RF433Button");
    }
}
