//! Producer tasks: GPIO edge input and the periodic sampler.
//!
//! The monitored input is active-low with the internal pull-up, so an
//! active transition is a falling edge.  Each transition pushes one
//! reading; there is no debounce, every edge counts.

use defmt::info;
use embassy_nrf::gpio::Input;
use embassy_time::{Delay, Duration, Ticker};
use pulse_beacon::config::SAMPLE_INTERVAL_MS;
use pulse_beacon::Producer;

use crate::STORE;

/// Push `EDGE_TAG` on every falling edge of `pin`.
#[embassy_executor::task]
pub async fn edge_task(mut pin: Input<'static>) -> ! {
    let producer = Producer::edge(&STORE);
    let mut delay = Delay;
    info!("edge producer armed");

    loop {
        pin.wait_for_falling_edge().await;
        // Failures are logged by the producer; the next edge carries on.
        let _ = producer.fire(&mut delay).await;
    }
}

/// Push `SAMPLE_TAG` every `SAMPLE_INTERVAL_MS`.
#[embassy_executor::task]
pub async fn sample_task() -> ! {
    let producer = Producer::periodic(&STORE);
    let mut delay = Delay;
    let mut ticker = Ticker::every(Duration::from_millis(SAMPLE_INTERVAL_MS));

    loop {
        ticker.next().await;
        let _ = producer.fire(&mut delay).await;
    }
}
