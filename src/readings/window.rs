//! Fixed-capacity sliding window of readings.
//!
//! Array-backed ring buffer: `head` indexes the oldest slot, and a push
//! overwrites it before advancing.  The window is always full, so there is
//! no separate length and no allocation after construction.

use super::Reading;

/// The most recent `N` readings, oldest first.
#[derive(Clone, Debug)]
pub struct ReadingWindow<const N: usize> {
    slots: [Reading; N],
    /// Index of the oldest reading (the next slot to be overwritten).
    head: usize,
}

impl<const N: usize> ReadingWindow<N> {
    /// Create a window holding `N` seed (zero) readings.
    pub const fn new() -> Self {
        assert!(N > 0, "reading window needs at least one slot");
        Self {
            slots: [Reading::SEED; N],
            head: 0,
        }
    }

    /// Number of readings held. Always `N`.
    pub const fn len(&self) -> usize {
        N
    }

    /// Never true: the window is full from construction on.
    pub const fn is_empty(&self) -> bool {
        false
    }

    /// Append `reading` as the newest entry, returning the evicted oldest one.
    pub fn push(&mut self, reading: Reading) -> Reading {
        let evicted = core::mem::replace(&mut self.slots[self.head], reading);
        self.head = (self.head + 1) % N;
        evicted
    }

    /// Oldest reading in the window.
    pub fn oldest(&self) -> Reading {
        self.slots[self.head]
    }

    /// Most recently pushed reading.
    pub fn newest(&self) -> Reading {
        self.slots[(self.head + N - 1) % N]
    }

    /// Iterate oldest → newest.
    pub fn iter(&self) -> impl Iterator<Item = &Reading> + '_ {
        let (newer, older) = self.slots.split_at(self.head);
        older.iter().chain(newer.iter())
    }

    /// Byte sum of every value in the window, wrapping at 256.
    pub fn sum(&self) -> u8 {
        self.slots
            .iter()
            .fold(0u8, |acc, r| acc.wrapping_add(r.value))
    }
}

impl<const N: usize> Default for ReadingWindow<N> {
    fn default() -> Self {
        Self::new()
    }
}
