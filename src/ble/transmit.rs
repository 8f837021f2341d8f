//! Broadcast transmitter for the live radio session.

use core::sync::atomic::Ordering;

use nrf_softdevice::ble::gatt_server::{self, NotifyValueError};
use pulse_beacon::broadcast::{BroadcastMode, Transmitter};
use pulse_beacon::error::TransmitError;
use pulse_beacon::link::Phase;

use super::gatt::ReadingServer;
use super::{BEACON_DATA, ON_AIR, SUBSCRIBED};
use crate::LINK;

/// Notifies the subscribed peer, or swaps the beacon payload, by mode.
pub struct RadioTransmitter {
    server: &'static ReadingServer,
    mode: BroadcastMode,
}

impl RadioTransmitter {
    pub fn new(server: &'static ReadingServer, mode: BroadcastMode) -> Self {
        Self { server, mode }
    }
}

impl Transmitter for RadioTransmitter {
    fn is_ready(&self) -> bool {
        if self.mode.connectable() {
            LINK.is_connected() && SUBSCRIBED.load(Ordering::Acquire)
        } else {
            LINK.phase() == Phase::Advertising
        }
    }

    async fn transmit(&mut self, payload: &[u8]) -> Result<(), TransmitError> {
        if !self.mode.connectable() {
            // Unchanged payloads leave the running session alone.
            if let Some(changed) = ON_AIR.lock(|f| f.borrow_mut().update(payload))? {
                BEACON_DATA.signal(changed);
            }
            return Ok(());
        }

        let peer = LINK.peer().ok_or(TransmitError::Disconnected)?;
        gatt_server::notify_value(&peer.0, self.server.value_handle, payload).map_err(|e| match e {
            NotifyValueError::Disconnected => TransmitError::Disconnected,
            NotifyValueError::Raw(raw) => TransmitError::Raw(raw as u32),
        })
    }
}
