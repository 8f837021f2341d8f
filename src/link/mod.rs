//! Connection / advertising lifecycle.
//!
//! The radio stack reports link events through the [`Coordinator`]; a
//! control task waits on it and restarts advertising after every
//! disconnect:
//!
//! ```text
//!  Idle ──start_advertising──▶ Advertising ──on_connect──▶ Connected
//!                                   ▲                         │
//!                                   │                   on_disconnect
//!                          recovery loop ◀── Disconnected ◀───┘
//! ```
//!
//! Events are level-triggered: several connect/disconnect pairs between
//! two observations collapse into the latest phase.

pub mod coordinator;
pub mod reason;

pub use coordinator::{ConnectOutcome, Coordinator};
pub use reason::DisconnectReason;

use crate::error::AdvertiseError;

/// Lifecycle phase of the radio link.
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
#[cfg_attr(feature = "defmt", derive(defmt::Format))]
pub enum Phase {
    /// Nothing started yet.
    Idle,
    /// Discoverable, no peer linked.
    Advertising,
    /// One peer linked.
    Connected,
    /// Peer gone (or advertising stopped); waiting for re-advertising.
    Disconnected,
}

impl Phase {
    /// Latched-flag view of this phase.
    pub const fn flags(self) -> LinkFlags {
        match self {
            Phase::Idle => LinkFlags::EMPTY,
            Phase::Advertising => LinkFlags::ADVERTISING,
            Phase::Connected => LinkFlags::CONNECTED,
            Phase::Disconnected => LinkFlags::DISCONNECTED,
        }
    }
}

/// Latched lifecycle flags, as a bit set.
#[derive(Clone, Copy, Debug, Default, PartialEq, Eq)]
#[cfg_attr(feature = "defmt", derive(defmt::Format))]
pub struct LinkFlags(u8);

impl LinkFlags {
    pub const EMPTY: LinkFlags = LinkFlags(0);
    pub const DISCONNECTED: LinkFlags = LinkFlags(1 << 0);
    pub const CONNECTED: LinkFlags = LinkFlags(1 << 1);
    pub const ADVERTISING: LinkFlags = LinkFlags(1 << 2);

    pub const fn bits(self) -> u8 {
        self.0
    }

    pub const fn contains(self, other: LinkFlags) -> bool {
        self.0 & other.0 == other.0
    }

    pub const fn is_empty(self) -> bool {
        self.0 == 0
    }
}

/// Result code delivered with a connect event.
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
#[cfg_attr(feature = "defmt", derive(defmt::Format))]
pub enum ConnectStatus {
    Success,
    Failed(u8),
}

impl ConnectStatus {
    /// `0` is success, anything else is a stack error code.
    pub const fn from_code(code: u8) -> Self {
        match code {
            0 => ConnectStatus::Success,
            e => ConnectStatus::Failed(e),
        }
    }
}

/// Whether two radio connection handles name the same live link.
///
/// A connection that is already gone has no handle and matches nothing,
/// not even another gone connection.
pub fn same_link(a: Option<u16>, b: Option<u16>) -> bool {
    matches!((a, b), (Some(a), Some(b)) if a == b)
}

/// Starts a radio advertising session.
///
/// Returns once the radio has accepted (or refused) the request; the
/// session itself keeps running afterwards.
#[allow(async_fn_in_trait)]
pub trait Advertiser {
    async fn begin_advertising(&mut self) -> Result<(), AdvertiseError>;
}
