//! Host-side doubles for the timing and radio seams.

use embedded_hal_async::delay::DelayNs;

use crate::error::{AdvertiseError, TransmitError};
use crate::link::Advertiser;
use crate::broadcast::Transmitter;

/// Delay that elapses immediately and records what was asked for.
#[derive(Default)]
pub struct Elapsed {
    pub calls: u32,
    pub total_ns: u64,
}

impl DelayNs for Elapsed {
    async fn delay_ns(&mut self, ns: u32) {
        self.calls += 1;
        self.total_ns += u64::from(ns);
    }
}

/// Delay that never elapses.
pub struct Never;

impl DelayNs for Never {
    async fn delay_ns(&mut self, _ns: u32) {
        core::future::pending::<()>().await
    }
}

/// Advertiser that replays a fixed list of results, then succeeds.
pub struct ScriptedAdvertiser {
    pub script: heapless::Deque<Result<(), AdvertiseError>, 8>,
    pub attempts: u32,
}

impl ScriptedAdvertiser {
    pub fn new(results: &[Result<(), AdvertiseError>]) -> Self {
        let mut script = heapless::Deque::new();
        for r in results {
            script.push_back(*r).unwrap();
        }
        Self { script, attempts: 0 }
    }
}

impl Advertiser for ScriptedAdvertiser {
    async fn begin_advertising(&mut self) -> Result<(), AdvertiseError> {
        self.attempts += 1;
        self.script.pop_front().unwrap_or(Ok(()))
    }
}

/// Transmitter that records payloads and can be told to fail.
pub struct RecordingTransmitter {
    pub ready: bool,
    pub fail_with: Option<TransmitError>,
    pub sent: heapless::Vec<heapless::Vec<u8, 31>, 8>,
}

impl RecordingTransmitter {
    pub fn new() -> Self {
        Self {
            ready: true,
            fail_with: None,
            sent: heapless::Vec::new(),
        }
    }
}

impl Transmitter for RecordingTransmitter {
    fn is_ready(&self) -> bool {
        self.ready
    }

    async fn transmit(&mut self, payload: &[u8]) -> Result<(), TransmitError> {
        if let Some(e) = self.fail_with {
            return Err(e);
        }
        self.sent
            .push(heapless::Vec::from_slice(payload).unwrap())
            .unwrap();
        Ok(())
    }
}
