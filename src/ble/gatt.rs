//! Reading service: one characteristic holding the aggregate byte.

use defmt::{debug, error, Format};
use nrf_softdevice::ble::gatt_server::builder::ServiceBuilder;
use nrf_softdevice::ble::gatt_server::characteristic::{Attribute, Metadata, Properties};
use nrf_softdevice::ble::gatt_server::{RegisterError, Server, WriteOp};
use nrf_softdevice::ble::{Connection, SecurityMode, Uuid};
use nrf_softdevice::Softdevice;
use pulse_beacon::config::{CHARACTERISTIC_UUID, SERVICE_UUID};
use pulse_beacon::Error;

/// Attribute handles of the registered reading service.
pub struct ReadingServer {
    pub value_handle: u16,
    pub cccd_handle: u16,
}

#[derive(Clone, Copy, Format)]
pub enum ReadingEvent {
    /// CCCD written; `true` when notifications are on.
    Notifications(bool),
}

impl ReadingServer {
    /// Register the service.  Must run before the SoftDevice task starts.
    pub fn register(sd: &mut Softdevice) -> Result<Self, Error> {
        Self::build(sd).map_err(|e| {
            error!("GATT registration failed: {}", e);
            Error::ServiceRegistration
        })
    }

    fn build(sd: &mut Softdevice) -> Result<Self, RegisterError> {
        let mut service = ServiceBuilder::new(sd, Uuid::new_16(SERVICE_UUID))?;

        let attribute = Attribute::new([0u8]).read_security(SecurityMode::Open);
        let metadata = Metadata::new(Properties::default().read().notify());
        let handles = service
            .add_characteristic(Uuid::new_16(CHARACTERISTIC_UUID), attribute, metadata)?
            .build();
        let _ = service.build();

        Ok(Self {
            value_handle: handles.value_handle,
            cccd_handle: handles.cccd_handle,
        })
    }
}

impl Server for ReadingServer {
    type Event = ReadingEvent;

    fn on_write(
        &self,
        _conn: &Connection,
        handle: u16,
        _op: WriteOp,
        _offset: usize,
        data: &[u8],
    ) -> Option<Self::Event> {
        if handle != self.cccd_handle {
            debug!("write to handle {} ignored", handle);
            return None;
        }
        // CCCD bit 0: notifications enabled.
        let enabled = data.first().is_some_and(|b| b & 0x01 != 0);
        Some(ReadingEvent::Notifications(enabled))
    }
}
