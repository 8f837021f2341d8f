//! Producer roles feeding the reading store.
//!
//! A producer is a store plus a fixed source; each activation pushes the
//! source's tag.  What triggers the activation (GPIO edge, ticker) lives in
//! the firmware, so the roles stay testable on the host.

use embassy_sync::blocking_mutex::raw::RawMutex;
use embedded_hal_async::delay::DelayNs;

use crate::error::StoreError;
use crate::readings::{Reading, ReadingSource, ReadingStore};

/// One producer role bound to a store.
pub struct Producer<'s, M: RawMutex, const N: usize> {
    store: &'s ReadingStore<M, N>,
    source: ReadingSource,
}

impl<'s, M: RawMutex, const N: usize> Producer<'s, M, N> {
    /// Pushes `EDGE_TAG` on every active input transition.
    pub const fn edge(store: &'s ReadingStore<M, N>) -> Self {
        Self {
            store,
            source: ReadingSource::Edge,
        }
    }

    /// Pushes `SAMPLE_TAG` on every tick.
    pub const fn periodic(store: &'s ReadingStore<M, N>) -> Self {
        Self {
            store,
            source: ReadingSource::Periodic,
        }
    }

    pub const fn source(&self) -> ReadingSource {
        self.source
    }

    /// Push one reading.  A lost reading is logged and reported, never retried.
    pub async fn fire<D: DelayNs>(&self, delay: &mut D) -> Result<(), StoreError> {
        let result = self.store.push(Reading::tagged(self.source), delay).await;
        if let Err(e) = result {
            warn!("{} reading not stored: {}", self.source, e);
        }
        result
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::testing::Never;
    use embassy_futures::block_on;
    use embassy_sync::blocking_mutex::raw::NoopRawMutex;

    #[test]
    fn roles_push_their_tags() {
        let store: ReadingStore<NoopRawMutex, 4> = ReadingStore::new();
        store.initialize();

        let edge = Producer::edge(&store);
        let periodic = Producer::periodic(&store);
        assert_eq!(edge.source(), ReadingSource::Edge);

        block_on(edge.fire(&mut Never)).unwrap();
        block_on(periodic.fire(&mut Never)).unwrap();
        block_on(edge.fire(&mut Never)).unwrap();

        let got: heapless::Vec<u8, 4> = block_on(store.snapshot()).iter().map(|r| r.value).collect();
        assert_eq!(got.as_slice(), &[0, 1, 0, 1]);
        assert_eq!(block_on(store.aggregate()), 2);
    }

    #[test]
    fn firing_before_initialize_reports_error() {
        let store: ReadingStore<NoopRawMutex, 4> = ReadingStore::new();
        let result = block_on(Producer::edge(&store).fire(&mut Never));
        assert_eq!(result, Err(StoreError::Uninitialized));
    }
}
