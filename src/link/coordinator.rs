//! Connection coordinator - owns the single peer slot and the lifecycle
//! phase, and drives re-advertising after disconnects.
//!
//! The radio stack calls [`Coordinator::on_connect`] and
//! [`Coordinator::on_disconnect`] from one delivery context; the control
//! task sits in [`Coordinator::run_recovery`].  Phase changes are applied
//! under a blocking mutex and announced through a `Signal`, so the single
//! waiter sees the latest phase rather than a queue of events.

use core::cell::RefCell;

use embassy_sync::blocking_mutex::raw::RawMutex;
use embassy_sync::blocking_mutex::Mutex;
use embassy_sync::signal::Signal;
use embedded_hal_async::delay::DelayNs;

use super::{Advertiser, ConnectStatus, DisconnectReason, LinkFlags, Phase};
use crate::config::READVERTISE_BACKOFF_MS;
use crate::error::AdvertiseError;

/// What `on_connect` did with the event.
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
#[cfg_attr(feature = "defmt", derive(defmt::Format))]
pub enum ConnectOutcome {
    /// Peer now holds (or already held) the slot.
    Accepted,
    /// Another peer holds the slot; event ignored.
    Rejected,
    /// The connect event carried an error status; ignored.
    Failed,
}

struct LinkState<P> {
    peer: Option<P>,
    phase: Phase,
    /// Bumped on every link event, so a late advertising acknowledgement
    /// can tell that the link moved on without it.
    epoch: u32,
}

/// Single-peer link coordinator.
pub struct Coordinator<M: RawMutex, P> {
    state: Mutex<M, RefCell<LinkState<P>>>,
    changed: Signal<M, ()>,
}

impl<M: RawMutex, P: Clone + PartialEq> Coordinator<M, P> {
    pub const fn new() -> Self {
        Self {
            state: Mutex::new(RefCell::new(LinkState {
                peer: None,
                phase: Phase::Idle,
                epoch: 0,
            })),
            changed: Signal::new(),
        }
    }

    /// Current lifecycle phase.
    pub fn phase(&self) -> Phase {
        self.state.lock(|s| s.borrow().phase)
    }

    /// Latched-flag view of the current phase.
    pub fn flags(&self) -> LinkFlags {
        self.phase().flags()
    }

    /// Clone of the held peer reference, if any.
    pub fn peer(&self) -> Option<P> {
        self.state.lock(|s| s.borrow().peer.clone())
    }

    pub fn is_connected(&self) -> bool {
        self.phase() == Phase::Connected
    }

    /// Ask the radio to advertise; on success enter `Advertising`.
    ///
    /// If a link event arrives while the request is in flight, that event
    /// wins and the phase is left alone.  Retry policy belongs to the caller.
    pub async fn start_advertising<A: Advertiser>(
        &self,
        advertiser: &mut A,
    ) -> Result<(), AdvertiseError> {
        let epoch = self.state.lock(|s| s.borrow().epoch);
        advertiser.begin_advertising().await?;

        let entered = self.state.lock(|s| {
            let mut s = s.borrow_mut();
            if s.epoch != epoch {
                return false;
            }
            s.phase = Phase::Advertising;
            true
        });

        if entered {
            info!("advertising started");
            self.changed.signal(());
        } else {
            debug!("link changed while advertising was starting");
        }
        Ok(())
    }

    /// Radio callback: a link completed (or failed to).
    pub fn on_connect(&self, peer: P, status: ConnectStatus) -> ConnectOutcome {
        if let ConnectStatus::Failed(code) = status {
            warn!("connection failed (err {:#x})", code);
            return ConnectOutcome::Failed;
        }

        let outcome = self.state.lock(|s| {
            let mut s = s.borrow_mut();
            let accepted = match &s.peer {
                None => {
                    s.peer = Some(peer);
                    true
                }
                Some(held) => *held == peer,
            };
            if !accepted {
                return ConnectOutcome::Rejected;
            }
            s.phase = Phase::Connected;
            s.epoch = s.epoch.wrapping_add(1);
            ConnectOutcome::Accepted
        });

        match outcome {
            ConnectOutcome::Accepted => {
                info!("client connected");
                self.changed.signal(());
            }
            _ => warn!("second peer ignored, link already held"),
        }
        outcome
    }

    /// Radio callback: a link went down.
    ///
    /// Always empties the slot and latches `Disconnected`, whichever peer
    /// reported it.  Returns the released reference.
    pub fn on_disconnect(&self, peer: &P, reason: DisconnectReason) -> Option<P> {
        let released = self.state.lock(|s| {
            let mut s = s.borrow_mut();
            s.phase = Phase::Disconnected;
            s.epoch = s.epoch.wrapping_add(1);
            s.peer.take()
        });

        if released.as_ref() != Some(peer) {
            debug!("disconnect reported for a peer that was not held");
        }
        info!("disconnected: {} ({:#x})", reason.describe(), reason.code());
        self.changed.signal(());
        released
    }

    /// Radio callback: an advertising session stopped without a link.
    ///
    /// Latches `Disconnected` so the recovery loop advertises again.  This
    /// also covers a session that ends before its start was acknowledged.
    /// Returns `false` only if a peer is connected.
    pub fn advertising_ended(&self) -> bool {
        let latched = self.state.lock(|s| {
            let mut s = s.borrow_mut();
            if s.phase == Phase::Connected {
                return false;
            }
            s.phase = Phase::Disconnected;
            s.epoch = s.epoch.wrapping_add(1);
            true
        });

        if latched {
            warn!("advertising ended without a connection");
            self.changed.signal(());
        }
        latched
    }

    /// Wait until the phase is `Disconnected`.
    ///
    /// Returns at once if it already is.  Only one task may wait.
    pub async fn wait_disconnected(&self) {
        loop {
            if self.phase() == Phase::Disconnected {
                return;
            }
            self.changed.wait().await;
        }
    }

    /// One pass of the control loop: wait for a disconnect, re-advertise,
    /// and back off on failure.
    pub async fn recover_once<A: Advertiser, D: DelayNs>(
        &self,
        advertiser: &mut A,
        delay: &mut D,
    ) -> Result<(), AdvertiseError> {
        self.wait_disconnected().await;

        match self.start_advertising(advertiser).await {
            Ok(()) => Ok(()),
            Err(e) => {
                error!("could not restart advertising: {}", e);
                self.state.lock(|s| s.borrow_mut().phase = Phase::Disconnected);
                delay.delay_ms(READVERTISE_BACKOFF_MS).await;
                Err(e)
            }
        }
    }

    /// Control loop: re-advertise after every disconnect, forever.
    pub async fn run_recovery<A: Advertiser, D: DelayNs>(
        &self,
        advertiser: &mut A,
        delay: &mut D,
    ) -> ! {
        loop {
            info!("waiting for Bluetooth events");
            let _ = self.recover_once(advertiser, delay).await;
        }
    }
}

impl<M: RawMutex, P: Clone + PartialEq> Default for Coordinator<M, P> {
    fn default() -> Self {
        Self::new()
    }
}

// ═══════════════════════════════════════════════════════════════════════════
// Unit Tests (run on host, not embedded)
// ═══════════════════════════════════════════════════════════════════════════
