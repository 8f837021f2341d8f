//! Bluetooth Low Energy subsystem.
//!
//! This module drives the Nordic SoftDevice S140 in **Peripheral** role:
//!
//! 1. **GATT server** - the reading service (0x183B) with one notify
//!    characteristic (0x183C) carrying the aggregate.
//! 2. **Radio task** - owns every advertising session.  Sessions are
//!    requested by the link coordinator through [`SoftdeviceAdvertiser`].
//! 3. **Transmitter** - hands broadcast payloads to the live session
//!    (notification or advertising data).
//!
//! Hand-offs between tasks go through the signals below.

pub mod gatt;
pub mod radio;
pub mod transmit;

use core::cell::RefCell;
use core::sync::atomic::AtomicBool;

use embassy_sync::blocking_mutex::raw::CriticalSectionRawMutex;
use embassy_sync::blocking_mutex::Mutex;
use embassy_sync::signal::Signal;
use nrf_softdevice::ble::{peripheral, Connection};
use nrf_softdevice::Softdevice;
use pulse_beacon::broadcast::payload::{Payload, PayloadFilter};
use pulse_beacon::error::AdvertiseError;
use pulse_beacon::link::{same_link, Advertiser};

pub use radio::radio_task;
pub use transmit::RadioTransmitter;

/// Peer held by the link coordinator.  Two peers are the same link when
/// both are live and their SoftDevice connection handles match.
#[derive(Clone)]
pub struct Peer(pub Connection);

impl PartialEq for Peer {
    fn eq(&self, other: &Self) -> bool {
        same_link(self.0.handle(), other.0.handle())
    }
}

/// Advertise request from the coordinator to the radio task.
pub static ADVERTISE_REQUEST: Signal<CriticalSectionRawMutex, ()> = Signal::new();

/// Whether the SoftDevice accepted the requested session.
pub static ADVERTISE_RESULT: Signal<CriticalSectionRawMutex, Result<(), AdvertiseError>> =
    Signal::new();

/// Latest advertising payload for a running beacon session.
pub static BEACON_DATA: Signal<CriticalSectionRawMutex, Payload> = Signal::new();

/// Beacon payload the running session advertises.
pub static ON_AIR: Mutex<CriticalSectionRawMutex, RefCell<PayloadFilter>> =
    Mutex::new(RefCell::new(PayloadFilter::new()));

/// Peer has enabled notifications on the aggregate characteristic.
pub static SUBSCRIBED: AtomicBool = AtomicBool::new(false);

/// Starts advertising by handing the request to [`radio_task`].
pub struct SoftdeviceAdvertiser;

impl Advertiser for SoftdeviceAdvertiser {
    async fn begin_advertising(&mut self) -> Result<(), AdvertiseError> {
        ADVERTISE_RESULT.reset();
        ADVERTISE_REQUEST.signal(());
        ADVERTISE_RESULT.wait().await
    }
}

pub(crate) fn advertise_error(e: peripheral::AdvertiseError) -> AdvertiseError {
    match e {
        peripheral::AdvertiseError::Timeout => AdvertiseError::Timeout,
        peripheral::AdvertiseError::NoFreeConn => AdvertiseError::NoFreeConnection,
        peripheral::AdvertiseError::Raw(raw) => AdvertiseError::Raw(raw as u32),
    }
}

#[embassy_executor::task]
pub async fn softdevice_task(sd: &'static Softdevice) -> ! {
    sd.run().await
}
