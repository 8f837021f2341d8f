//! pulse-beacon firmware entry point (nRF52840 + SoftDevice S140).
//!
//! Startup order:
//!
//! 1. Enable the SoftDevice and register the reading service.
//! 2. Start advertising.
//! 3. Open the reading store and start the producers.
//! 4. Start the broadcast loop.
//! 5. Sit in the link recovery loop forever.
//!
//! Any failure before step 5 is fatal: `unwrap!` logs the error code
//! and panics into `panic-probe`.

#![no_std]
#![no_main]

mod ble;
mod input;

use defmt::{info, unwrap};
use defmt_rtt as _;
use embassy_executor::Spawner;
use embassy_nrf::gpio::{Input, Pull};
use embassy_nrf::interrupt::Priority;
use embassy_sync::blocking_mutex::raw::CriticalSectionRawMutex;
use embassy_time::{Delay, Duration, Ticker};
use nrf_softdevice::Softdevice;
use panic_probe as _;
use static_cell::StaticCell;

use pulse_beacon::config::{
    BROADCAST_MODE, DIAGNOSTIC_PERIOD_TICKS, READING_WINDOW_LEN, TRANSMIT_FAILURE_POLICY,
};
use pulse_beacon::{Broadcaster, Coordinator, ReadingStore};

use crate::ble::gatt::ReadingServer;
use crate::ble::{RadioTransmitter, SoftdeviceAdvertiser};

// ═══════════════════════════════════════════════════════════════════════════
// Shared State
// ═══════════════════════════════════════════════════════════════════════════

/// Last `READING_WINDOW_LEN` readings from both producers.
pub static STORE: ReadingStore<CriticalSectionRawMutex, READING_WINDOW_LEN> = ReadingStore::new();

/// Single-peer link state, driven by the radio task.
pub static LINK: Coordinator<CriticalSectionRawMutex, ble::Peer> = Coordinator::new();

static SERVER: StaticCell<ReadingServer> = StaticCell::new();

// ═══════════════════════════════════════════════════════════════════════════
// Tasks
// ═══════════════════════════════════════════════════════════════════════════

#[embassy_executor::task]
async fn broadcast_task(transmitter: RadioTransmitter) -> ! {
    let mut broadcaster =
        Broadcaster::new(&STORE, transmitter, BROADCAST_MODE, TRANSMIT_FAILURE_POLICY);
    let mut ticker = Ticker::every(Duration::from_millis(broadcaster.mode().interval_ms()));
    let mut ticks: u32 = 0;

    loop {
        ticker.next().await;
        if let Err(e) = broadcaster.step().await {
            defmt::panic!("broadcast loop stopped: {}", e);
        }

        ticks = ticks.wrapping_add(1);
        if ticks % DIAGNOSTIC_PERIOD_TICKS == 0 {
            let report = STORE.report().await;
            info!("{} values sent, store {}", broadcaster.sent(), report);
        }
    }
}

// ═══════════════════════════════════════════════════════════════════════════
// Entry
// ═══════════════════════════════════════════════════════════════════════════

#[embassy_executor::main]
async fn main(spawner: Spawner) -> ! {
    info!("pulse-beacon starting ({})", BROADCAST_MODE);

    // SoftDevice reserves priorities 0, 1 and 4.
    let mut config = embassy_nrf::config::Config::default();
    config.gpiote_interrupt_priority = Priority::P2;
    config.time_interrupt_priority = Priority::P2;
    let p = embassy_nrf::init(config);

    let sd = Softdevice::enable(&nrf_softdevice::Config::default());
    let server: &'static ReadingServer = SERVER.init(unwrap!(ReadingServer::register(sd)));
    let sd: &'static Softdevice = sd;

    unwrap!(spawner.spawn(ble::softdevice_task(sd)));
    unwrap!(spawner.spawn(ble::radio_task(sd, server, BROADCAST_MODE)));

    unwrap!(LINK.start_advertising(&mut SoftdeviceAdvertiser).await);

    STORE.initialize();
    unwrap!(spawner.spawn(input::edge_task(Input::new(p.P0_11, Pull::Up))));
    unwrap!(spawner.spawn(input::sample_task()));
    unwrap!(spawner.spawn(broadcast_task(RadioTransmitter::new(server, BROADCAST_MODE))));

    LINK.run_recovery(&mut SoftdeviceAdvertiser, &mut Delay).await
}
