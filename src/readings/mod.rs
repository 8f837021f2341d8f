//! Sampled readings and the bounded window that holds them.
//!
//! Two producers feed the window: an edge-triggered input (one reading per
//! active transition) and a periodic sampler.  The broadcast loop reads a
//! single summary byte back out.
//!
//! ```text
//!   edge task ─┐
//!              ├─▶ ReadingStore (N readings, oldest evicted) ─▶ aggregate()
//! sample task ─┘
//! ```

pub mod store;
pub mod window;

#[cfg(test)]
mod tests;

use crate::config::{EDGE_TAG, SAMPLE_TAG};

pub use store::{ReadingStore, StoreReport};
pub use window::ReadingWindow;

/// Where a reading came from.
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
#[cfg_attr(feature = "defmt", derive(defmt::Format))]
pub enum ReadingSource {
    /// Zero placed by store initialization.
    Seed,
    /// Active transition of the monitored input.
    Edge,
    /// Fixed-interval sample.
    Periodic,
}

impl ReadingSource {
    /// Fixed value this source pushes.
    pub const fn tag(self) -> u8 {
        match self {
            ReadingSource::Seed => 0,
            ReadingSource::Edge => EDGE_TAG,
            ReadingSource::Periodic => SAMPLE_TAG,
        }
    }
}

/// One sampled byte, tagged by source.
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
#[cfg_attr(feature = "defmt", derive(defmt::Format))]
pub struct Reading {
    pub value: u8,
    pub source: ReadingSource,
}

impl Reading {
    /// The zero reading a fresh window is filled with.
    pub const SEED: Reading = Reading {
        value: 0,
        source: ReadingSource::Seed,
    };

    pub const fn new(value: u8, source: ReadingSource) -> Self {
        Self { value, source }
    }

    /// Reading carrying the source's fixed tag value.
    pub const fn tagged(source: ReadingSource) -> Self {
        Self::new(source.tag(), source)
    }
}
