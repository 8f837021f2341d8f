//! Process-wide reading store shared by producers and the broadcast loop.
//!
//! Writers race the lock against a short deadline and drop their reading
//! if they lose: the input is resampled continuously, so a bounded push
//! latency matters more than never losing a sample.  The aggregate read
//! takes the same lock, so it never sees a half-applied insertion.

use core::sync::atomic::{AtomicBool, AtomicU32, Ordering};

use embassy_futures::select::{select, Either};
use embassy_sync::blocking_mutex::raw::RawMutex;
use embassy_sync::mutex::Mutex;
use embedded_hal_async::delay::DelayNs;
use heapless::Vec;

use super::{Reading, ReadingWindow};
use crate::config::STORE_LOCK_TIMEOUT_MS;
use crate::error::StoreError;

/// Diagnostic view of a store: the window, its aggregate and the loss count.
#[derive(Clone, Debug, PartialEq, Eq)]
#[cfg_attr(feature = "defmt", derive(defmt::Format))]
pub struct StoreReport<const N: usize> {
    /// Oldest first.
    pub window: Vec<Reading, N>,
    pub aggregate: u8,
    pub dropped: u32,
}

/// Bounded window of the last `N` readings behind an async mutex.
pub struct ReadingStore<M: RawMutex, const N: usize> {
    window: Mutex<M, ReadingWindow<N>>,
    ready: AtomicBool,
    dropped: AtomicU32,
}

impl<M: RawMutex, const N: usize> ReadingStore<M, N> {
    /// Create a store; usable as a `static` initializer.
    pub const fn new() -> Self {
        Self {
            window: Mutex::new(ReadingWindow::new()),
            ready: AtomicBool::new(false),
            dropped: AtomicU32::new(0),
        }
    }

    /// Open the store for producers.
    ///
    /// The window starts out holding `N` zero readings.  Returns `true` on
    /// the first call; later calls change nothing and return `false`.
    pub fn initialize(&self) -> bool {
        if self.ready.swap(true, Ordering::AcqRel) {
            debug!("reading store already initialized");
            return false;
        }
        info!("reading store ready ({} readings)", N);
        true
    }

    pub fn is_initialized(&self) -> bool {
        self.ready.load(Ordering::Acquire)
    }

    /// Insert `reading` as the newest entry, evicting the oldest.
    ///
    /// Waits at most `STORE_LOCK_TIMEOUT_MS` (measured with `delay`) for the
    /// lock.  On timeout the reading is lost and `LockTimeout` is returned.
    pub async fn push<D: DelayNs>(&self, reading: Reading, delay: &mut D) -> Result<(), StoreError> {
        if !self.is_initialized() {
            return Err(StoreError::Uninitialized);
        }

        match select(self.window.lock(), delay.delay_ms(STORE_LOCK_TIMEOUT_MS)).await {
            Either::First(mut window) => {
                window.push(reading);
                Ok(())
            }
            Either::Second(()) => {
                let dropped = self.dropped.fetch_add(1, Ordering::Relaxed) + 1;
                warn!("store lock timed out, reading dropped ({} total)", dropped);
                Err(StoreError::LockTimeout)
            }
        }
    }

    /// Wrapping byte sum of every reading in the window.
    pub async fn aggregate(&self) -> u8 {
        self.window.lock().await.sum()
    }

    /// Copy of the window, oldest first.
    pub async fn snapshot(&self) -> Vec<Reading, N> {
        self.window.lock().await.iter().copied().collect()
    }

    /// Readings lost to lock timeouts since boot.
    pub fn dropped(&self) -> u32 {
        self.dropped.load(Ordering::Relaxed)
    }

    /// One consistent snapshot for the diagnostic log.
    pub async fn report(&self) -> StoreReport<N> {
        let window = self.snapshot().await;
        let aggregate = window.iter().fold(0u8, |acc, r| acc.wrapping_add(r.value));
        StoreReport {
            window,
            aggregate,
            dropped: self.dropped(),
        }
    }
}

impl<M: RawMutex, const N: usize> Default for ReadingStore<M, N> {
    fn default() -> Self {
        Self::new()
    }
}
