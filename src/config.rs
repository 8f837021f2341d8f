//! Application-wide constants and compile-time configuration.
//!
//! All timing parameters, window sizes, and protocol constants live
//! here so they can be tuned in one place.

use crate::broadcast::{BroadcastMode, FailurePolicy};

// Reading store

/// Number of readings kept in the sliding window.
pub const READING_WINDOW_LEN: usize = 25;

/// Longest a producer waits for the store lock before dropping its reading (ms).
pub const STORE_LOCK_TIMEOUT_MS: u32 = 100;

// Producers

/// Value pushed by the edge producer on every active transition.
pub const EDGE_TAG: u8 = 1;

/// Value pushed by the periodic producer on every tick.
pub const SAMPLE_TAG: u8 = 0;

/// Periodic producer interval (ms).
pub const SAMPLE_INTERVAL_MS: u64 = 250;

// Broadcast

/// How the aggregate leaves the device.
pub const BROADCAST_MODE: BroadcastMode = BroadcastMode::Notification;

/// What the broadcast loop does when a transmission fails.
pub const TRANSMIT_FAILURE_POLICY: FailurePolicy = FailurePolicy::Skip;

/// Broadcast interval for the legacy service-data advertisement (ms).
pub const SERVICE_DATA_INTERVAL_MS: u64 = 125;

/// Broadcast interval for the extended service-data advertisement (ms).
pub const EXTENDED_SERVICE_DATA_INTERVAL_MS: u64 = 1000;

/// Broadcast interval for GATT notifications (ms).
pub const NOTIFICATION_INTERVAL_MS: u64 = 250;

/// Broadcast ticks between two store reports in the diagnostic log.
pub const DIAGNOSTIC_PERIOD_TICKS: u32 = 40;

// Connection lifecycle

/// Back-off before retrying a failed re-advertise (ms).
pub const READVERTISE_BACKOFF_MS: u32 = 1000;

// BLE identity

/// GAP device name, also used as the Complete Local Name AD field.
pub const DEVICE_NAME: &str = "Pulse1";

/// 16-bit UUID of the reading service (and of the service data field).
pub const SERVICE_UUID: u16 = 0x183B;

/// 16-bit UUID of the notify characteristic carrying the aggregate.
pub const CHARACTERISTIC_UUID: u16 = 0x183C;

/// Marker byte preceding the aggregate in extended service data.
pub const EXTENDED_SERVICE_DATA_MARKER: u8 = 0x40;

// GPIO pin assignments (nRF52840-DK defaults)
//
// These are logical names; the actual `embassy_nrf::peripherals::*` pin
// is picked in `main.rs`.  Adjust for your custom PCB.
//
//   Input (sw0, active-low) → P0.11
