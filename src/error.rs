//! Unified error type for pulse-beacon.
//!
//! We avoid `alloc` - all error variants carry only fixed-size data.
//! Implements `defmt::Format` (with the `defmt` feature) for efficient
//! on-target logging.

/// Top-level error type used across the application.
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
#[cfg_attr(feature = "defmt", derive(defmt::Format))]
pub enum Error {
    // Radio
    /// GATT service registration failed.
    ServiceRegistration,

    /// An advertising session could not be started.
    Advertise(AdvertiseError),

    /// A broadcast payload could not be handed to the radio.
    Transmit(TransmitError),

    // Store
    /// A reading could not be stored.
    Store(StoreError),

    // Generic
    /// Buffer too small for the requested operation.
    BufferOverflow,
}

/// Why a reading was not stored.
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
#[cfg_attr(feature = "defmt", derive(defmt::Format))]
pub enum StoreError {
    /// `initialize` has not been called yet.
    Uninitialized,
    /// The lock stayed contended past the acquisition bound; the reading was dropped.
    LockTimeout,
}

/// Why an advertising session did not start.
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
#[cfg_attr(feature = "defmt", derive(defmt::Format))]
pub enum AdvertiseError {
    /// Raw error code from the radio stack.
    Raw(u32),
    /// Advertising timed out before anything happened.
    Timeout,
    /// All connection slots are taken.
    NoFreeConnection,
    /// The advertising data could not be built.
    InvalidData,
}

/// Why a payload update or notification failed.
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
#[cfg_attr(feature = "defmt", derive(defmt::Format))]
pub enum TransmitError {
    /// Raw error code from the radio stack.
    Raw(u32),
    /// The peer went away while sending.
    Disconnected,
    /// Payload does not fit the advertising PDU.
    PayloadTooLarge,
}

// Convenience conversions

impl From<StoreError> for Error {
    fn from(e: StoreError) -> Self {
        Error::Store(e)
    }
}

impl From<AdvertiseError> for Error {
    fn from(e: AdvertiseError) -> Self {
        Error::Advertise(e)
    }
}

impl From<TransmitError> for Error {
    fn from(e: TransmitError) -> Self {
        Error::Transmit(e)
    }
}
