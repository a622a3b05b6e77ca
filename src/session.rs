//! Active-session state: which remote is selected and the most recent
//! capture. Owned by the controller and passed explicitly; the handheld
//! firmware kept these as globals (`currentRemoteName`, `remoteData`).

use chrono::{DateTime, Local};

use crate::signal::{Signal, Transport};
use crate::store::{RemoteName, StoreError};

/// One captured signal plus where and when it came from.
#[derive(Debug, Clone)]
pub struct CaptureEvent {
    pub signal: Signal,
    pub transport: Transport,
    pub at: DateTime<Local>,
}

impl CaptureEvent {
    pub fn new(signal: Signal, transport: Transport) -> Self {
        Self {
            signal,
            transport,
            at: Local::now(),
        }
    }

    pub fn time_short(&self) -> String {
        self.at.format("%H:%M:%S").to_string()
    }
}

#[derive(Default)]
pub struct Session {
    remote: Option<RemoteName>,
    last_capture: Option<CaptureEvent>,
}

impl Session {
    pub fn new() -> Self {
        Self::default()
    }

    /// The active remote, or `NoActiveRemote` for callers about to touch
    /// the store.
    pub fn remote(&self) -> Result<&RemoteName, StoreError> {
        self.remote.as_ref().ok_or(StoreError::NoActiveRemote)
    }

    pub fn remote_name(&self) -> Option<&str> {
        self.remote.as_ref().map(|r| r.as_str())
    }

    pub fn set_remote(&mut self, remote: RemoteName) {
        tracing::info!("Active remote: {}", remote);
        self.remote = Some(remote);
    }

    pub fn clear_remote(&mut self) {
        self.remote = None;
    }

    pub fn record_capture(&mut self, event: CaptureEvent) {
        self.last_capture = Some(event);
    }

    pub fn last_capture(&self) -> Option<&CaptureEvent> {
        self.last_capture.as_ref()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_remote_required() {
        let mut session = Session::new();
        assert!(matches!(session.remote(), Err(StoreError::NoActiveRemote)));

        session.set_remote(RemoteName::new("tv").unwrap());
        assert_eq!(session.remote().unwrap().as_str(), "tv");

        session.clear_remote();
        assert!(matches!(session.remote(), Err(StoreError::NoActiveRemote)));
    }

    #[test]
    fn test_last_capture_replaced() {
        let mut session = Session::new();
        session.record_capture(CaptureEvent::new(
            Signal::SubGhz(0x111111),
            Transport::SubGhz,
        ));
        session.record_capture(CaptureEvent::new(
            Signal::Infrared { code: 1, bits: 32 },
            Transport::Infrared,
        ));
        assert_eq!(
            session.last_capture().unwrap().transport,
            Transport::Infrared
        );
    }
}
