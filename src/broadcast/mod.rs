//! Broadcast loop: periodically read the store's aggregate and put it on air.
//!
//! The loop body is [`Broadcaster::step`]; the firmware calls it from a
//! ticker task at [`BroadcastMode::interval_ms`].

pub mod payload;

use embassy_sync::blocking_mutex::raw::RawMutex;

use crate::config::{
    EXTENDED_SERVICE_DATA_INTERVAL_MS, NOTIFICATION_INTERVAL_MS, SERVICE_DATA_INTERVAL_MS,
};
use crate::error::{Error, TransmitError};
use crate::readings::ReadingStore;

/// How the aggregate leaves the device.
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
#[cfg_attr(feature = "defmt", derive(defmt::Format))]
pub enum BroadcastMode {
    /// Non-connectable legacy advertising, value in 16-bit service data.
    ServiceData,
    /// Non-connectable extended advertising, marker byte before the value.
    ExtendedServiceData,
    /// Connectable; value notified to a subscribed peer.
    Notification,
}

impl BroadcastMode {
    /// Broadcast interval (ms).
    pub const fn interval_ms(self) -> u64 {
        match self {
            BroadcastMode::ServiceData => SERVICE_DATA_INTERVAL_MS,
            BroadcastMode::ExtendedServiceData => EXTENDED_SERVICE_DATA_INTERVAL_MS,
            BroadcastMode::Notification => NOTIFICATION_INTERVAL_MS,
        }
    }

    /// Whether peers may connect while this mode advertises.
    pub const fn connectable(self) -> bool {
        matches!(self, BroadcastMode::Notification)
    }
}

/// What to do when a transmission fails.
#[derive(Clone, Copy, Debug, Default, PartialEq, Eq)]
#[cfg_attr(feature = "defmt", derive(defmt::Format))]
pub enum FailurePolicy {
    /// Stop the loop and surface the error.
    Fatal,
    /// Log, drop this value and keep going.
    #[default]
    Skip,
}

/// Result of one broadcast step.
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
#[cfg_attr(feature = "defmt", derive(defmt::Format))]
pub enum BroadcastOutcome {
    /// The value was handed to the radio.
    Sent(u8),
    /// Nobody to send to this tick.
    Idle,
    /// Transmission failed and was skipped.
    Dropped(TransmitError),
}

/// Hands encoded payloads to the radio.
#[allow(async_fn_in_trait)]
pub trait Transmitter {
    /// Whether a transmission would reach anyone right now.
    fn is_ready(&self) -> bool {
        true
    }

    async fn transmit(&mut self, payload: &[u8]) -> Result<(), TransmitError>;
}

/// One broadcast loop bound to a store and a transmitter.
pub struct Broadcaster<'s, M: RawMutex, T, const N: usize> {
    store: &'s ReadingStore<M, N>,
    transmitter: T,
    mode: BroadcastMode,
    policy: FailurePolicy,
    sent: u32,
}

impl<'s, M: RawMutex, T: Transmitter, const N: usize> Broadcaster<'s, M, T, N> {
    pub fn new(
        store: &'s ReadingStore<M, N>,
        transmitter: T,
        mode: BroadcastMode,
        policy: FailurePolicy,
    ) -> Self {
        Self {
            store,
            transmitter,
            mode,
            policy,
            sent: 0,
        }
    }

    pub fn mode(&self) -> BroadcastMode {
        self.mode
    }

    /// Number of values handed to the radio so far.
    pub fn sent(&self) -> u32 {
        self.sent
    }

    pub fn transmitter(&self) -> &T {
        &self.transmitter
    }

    pub fn transmitter_mut(&mut self) -> &mut T {
        &mut self.transmitter
    }

    /// Read the aggregate and transmit it once.
    ///
    /// Returns `Err` only under [`FailurePolicy::Fatal`].
    pub async fn step(&mut self) -> Result<BroadcastOutcome, Error> {
        if !self.transmitter.is_ready() {
            return Ok(BroadcastOutcome::Idle);
        }

        let value = self.store.aggregate().await;
        let payload = payload::encode(self.mode, value)?;

        match self.transmitter.transmit(&payload).await {
            Ok(()) => {
                self.sent = self.sent.wrapping_add(1);
                debug!("aggregate {} sent", value);
                Ok(BroadcastOutcome::Sent(value))
            }
            Err(e) => match self.policy {
                FailurePolicy::Fatal => {
                    error!("transmit failed: {}", e);
                    Err(Error::Transmit(e))
                }
                FailurePolicy::Skip => {
                    warn!("transmit failed, value skipped: {}", e);
                    Ok(BroadcastOutcome::Dropped(e))
                }
            },
        }
    }
}
