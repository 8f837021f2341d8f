//! Unit tests for the reading window and store.
//!
//! These tests run on the host (not embedded) and cover the sliding
//! window invariants, aggregation, and store initialization rules.

use embassy_futures::block_on;
use embassy_sync::blocking_mutex::raw::CriticalSectionRawMutex;

use super::{Reading, ReadingSource, ReadingStore, ReadingWindow};
use crate::error::StoreError;
use crate::testing::{Elapsed, Never};

fn edge() -> Reading {
    Reading::tagged(ReadingSource::Edge)
}

fn sample() -> Reading {
    Reading::tagged(ReadingSource::Periodic)
}

fn values<const N: usize>(window: &ReadingWindow<N>) -> heapless::Vec<u8, N> {
    window.iter().map(|r| r.value).collect()
}

// ═══════════════════════════════════════════════════════════════════════════
// Window Tests
// ═══════════════════════════════════════════════════════════════════════════

#[test]
fn fresh_window_holds_n_seed_readings() {
    let window: ReadingWindow<25> = ReadingWindow::new();
    assert_eq!(window.len(), 25);
    assert!(!window.is_empty());
    assert!(window.iter().all(|r| *r == Reading::SEED));
    assert_eq!(window.iter().count(), 25);
    assert_eq!(window.sum(), 0);
}

#[test]
fn tags_match_configured_values() {
    assert_eq!(edge().value, 1);
    assert_eq!(sample().value, 0);
    assert_eq!(ReadingSource::Seed.tag(), 0);
}

#[test]
fn window_keeps_last_n_in_push_order() {
    const N: usize = 5;
    for extra in [0usize, 1, 3, 5, 12] {
        let mut window: ReadingWindow<N> = ReadingWindow::new();
        let total = N + extra;
        for i in 0..total {
            window.push(Reading::new(i as u8, ReadingSource::Periodic));
        }

        assert_eq!(window.iter().count(), N);
        let expected: heapless::Vec<u8, N> = (extra..total).map(|i| i as u8).collect();
        assert_eq!(values(&window), expected, "after {} pushes", total);
    }
}

#[test]
fn fewer_than_n_pushes_keep_leading_seeds() {
    let mut window: ReadingWindow<4> = ReadingWindow::new();
    window.push(Reading::new(7, ReadingSource::Edge));
    window.push(Reading::new(9, ReadingSource::Edge));
    assert_eq!(values(&window).as_slice(), &[0, 0, 7, 9]);
    assert_eq!(window.oldest(), Reading::SEED);
}

#[test]
fn push_evicts_exactly_the_oldest() {
    let mut window: ReadingWindow<3> = ReadingWindow::new();
    for v in [10, 20, 30] {
        window.push(Reading::new(v, ReadingSource::Periodic));
    }

    let evicted = window.push(Reading::new(40, ReadingSource::Edge));
    assert_eq!(evicted.value, 10);
    assert_eq!(values(&window).as_slice(), &[20, 30, 40]);
    assert_eq!(window.oldest().value, 20);
    assert_eq!(window.newest(), Reading::new(40, ReadingSource::Edge));
}

#[test]
fn sum_wraps_at_one_byte() {
    let mut window: ReadingWindow<4> = ReadingWindow::new();
    for v in [200, 100, 255, 3] {
        window.push(Reading::new(v, ReadingSource::Periodic));
    }
    // 558 mod 256
    assert_eq!(window.sum(), 46);
}

#[test]
fn single_slot_window_tracks_latest() {
    let mut window: ReadingWindow<1> = ReadingWindow::new();
    window.push(edge());
    window.push(sample());
    window.push(edge());
    assert_eq!(window.oldest(), window.newest());
    assert_eq!(window.sum(), 1);
}

// ═══════════════════════════════════════════════════════════════════════════
// Store Tests
// ═══════════════════════════════════════════════════════════════════════════

type TestStore = ReadingStore<CriticalSectionRawMutex, 25>;

#[test]
fn push_before_initialize_is_rejected() {
    let store = TestStore::new();
    let result = block_on(store.push(edge(), &mut Elapsed::default()));
    assert_eq!(result, Err(StoreError::Uninitialized));
    assert_eq!(block_on(store.aggregate()), 0);
}

#[test]
fn initialize_is_idempotent() {
    let once = TestStore::new();
    assert!(once.initialize());

    let twice = TestStore::new();
    assert!(twice.initialize());
    assert!(!twice.initialize());

    assert!(twice.is_initialized());
    assert_eq!(block_on(once.snapshot()), block_on(twice.snapshot()));
}

#[test]
fn second_initialize_keeps_stored_readings() {
    let store = TestStore::new();
    store.initialize();
    block_on(store.push(edge(), &mut Never)).unwrap();
    assert!(!store.initialize());
    assert_eq!(block_on(store.aggregate()), 1);
}

#[test]
fn aggregate_sums_recent_pushes_then_forgets_them() {
    let store = TestStore::new();
    store.initialize();

    for v in [1, 0, 1, 0, 1] {
        let source = if v == 1 {
            ReadingSource::Edge
        } else {
            ReadingSource::Periodic
        };
        block_on(store.push(Reading::new(v, source), &mut Never)).unwrap();
    }
    assert_eq!(block_on(store.aggregate()), 3);

    for _ in 0..25 {
        block_on(store.push(sample(), &mut Never)).unwrap();
    }
    assert_eq!(block_on(store.aggregate()), 0);
}

#[test]
fn snapshot_is_oldest_first() {
    let store: ReadingStore<CriticalSectionRawMutex, 3> = ReadingStore::new();
    store.initialize();
    for v in [4, 5, 6, 7] {
        block_on(store.push(Reading::new(v, ReadingSource::Periodic), &mut Never)).unwrap();
    }
    let snapshot = block_on(store.snapshot());
    let got: heapless::Vec<u8, 3> = snapshot.iter().map(|r| r.value).collect();
    assert_eq!(got.as_slice(), &[5, 6, 7]);
}

#[test]
fn uncontended_push_never_consults_the_deadline() {
    let store = TestStore::new();
    store.initialize();
    let mut delay = Elapsed::default();
    block_on(store.push(edge(), &mut delay)).unwrap();
    assert_eq!(store.dropped(), 0);
    assert_eq!(block_on(store.aggregate()), 1);
}

#[test]
fn concurrent_producers_keep_window_full() {
    static STORE: TestStore = TestStore::new();
    STORE.initialize();

    std::thread::scope(|s| {
        for producer in 0..4 {
            s.spawn(move || {
                let reading = if producer % 2 == 0 { edge() } else { sample() };
                for _ in 0..200 {
                    block_on(STORE.push(reading, &mut Never)).unwrap();
                }
            });
        }
        s.spawn(|| {
            for _ in 0..200 {
                let sum = block_on(STORE.aggregate());
                assert!(usize::from(sum) <= 25);
            }
        });
    });

    let snapshot = block_on(STORE.snapshot());
    assert_eq!(snapshot.len(), 25);
    assert!(snapshot.iter().all(|r| r.source != ReadingSource::Seed));
    assert_eq!(STORE.dropped(), 0);
}
