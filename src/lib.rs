//! Core library for the pulse-beacon firmware.
//!
//! Everything here is hardware-free and builds on the host, so the
//! reading store, link coordinator and broadcast step are unit tested
//! without a board.
//!
//! Usage: `cargo test --lib` (host), `cargo build --release --features embedded` (firmware)
//!
//! Note: The embedded binary uses main.rs with #![no_std] and #![no_main]
//! and wires these types to embassy tasks and the SoftDevice.

#![cfg_attr(not(test), no_std)]

// Must come first so the logging macros are visible to every module below.
mod fmt;

// ═══════════════════════════════════════════════════════════════════════════
// Core Modules
// ═══════════════════════════════════════════════════════════════════════════

pub mod broadcast;
pub mod config;
pub mod error;
pub mod link;
pub mod producers;
pub mod readings;

#[cfg(test)]
mod testing;

pub use broadcast::{BroadcastMode, BroadcastOutcome, Broadcaster, FailurePolicy, Transmitter};
pub use error::Error;
pub use link::{Advertiser, ConnectOutcome, Coordinator, Phase};
pub use producers::Producer;
pub use readings::{Reading, ReadingSource, ReadingStore};

// ═══════════════════════════════════════════════════════════════════════════
// Unit Tests - whole device on the host
// ═══════════════════════════════════════════════════════════════════════════
