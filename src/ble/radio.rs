//! Radio task - runs one advertising session per request.
//!
//! Connectable session (notification mode):
//!
//! ```text
//! advertise ─▶ on_connect ─▶ serve GATT until the link drops ─▶ on_disconnect
//! ```
//!
//! Beacon session (service-data modes): non-connectable advertising,
//! restarted with every new payload until the SoftDevice stops it.

use core::future::Future;
use core::pin::{pin, Pin};
use core::sync::atomic::Ordering;
use core::task::Poll;

use defmt::{error, info, warn};
use embassy_futures::poll_once;
use embassy_futures::select::{select, Either};
use nrf_softdevice::ble::{gatt_server, peripheral};
use nrf_softdevice::Softdevice;
use pulse_beacon::broadcast::payload::{self, Payload};
use pulse_beacon::broadcast::BroadcastMode;
use pulse_beacon::error::AdvertiseError;
use pulse_beacon::link::{ConnectOutcome, ConnectStatus, DisconnectReason};

use super::gatt::{ReadingEvent, ReadingServer};
use super::{
    advertise_error, Peer, ADVERTISE_REQUEST, ADVERTISE_RESULT, BEACON_DATA, ON_AIR, SUBSCRIBED,
};
use crate::LINK;

#[embassy_executor::task]
pub async fn radio_task(
    sd: &'static Softdevice,
    server: &'static ReadingServer,
    mode: BroadcastMode,
) -> ! {
    let config = peripheral::Config {
        interval: adv_interval(mode),
        ..Default::default()
    };

    loop {
        ADVERTISE_REQUEST.wait().await;
        if mode.connectable() {
            connectable_session(sd, server, &config).await;
        } else {
            beacon_session(sd, mode, &config).await;
        }
    }
}

/// Advertising interval in 0.625 ms units.
fn adv_interval(mode: BroadcastMode) -> u32 {
    (mode.interval_ms() * 1000 / 625) as u32
}

/// Poll an advertising future once, so the SoftDevice has accepted or
/// refused the session, and report that back to the requester.
///
/// The poll uses a no-op waker; a pending session is awaited afterwards,
/// which registers the real one.
fn acknowledge<T, F>(session: Pin<&mut F>) -> Poll<Result<T, AdvertiseError>>
where
    F: Future<Output = Result<T, peripheral::AdvertiseError>>,
{
    let first = poll_once(session).map(|r| r.map_err(advertise_error));
    ADVERTISE_RESULT.signal(match &first {
        Poll::Ready(Err(e)) => Err(*e),
        _ => Ok(()),
    });
    first
}

async fn connectable_session(
    sd: &'static Softdevice,
    server: &'static ReadingServer,
    config: &peripheral::Config,
) {
    let adv_data = match payload::connectable_advertisement() {
        Ok(data) => data,
        Err(_) => {
            ADVERTISE_RESULT.signal(Err(AdvertiseError::InvalidData));
            return;
        }
    };
    let advertisement = peripheral::ConnectableAdvertisement::ScannableUndirected {
        adv_data: &adv_data,
        scan_data: &[],
    };

    let mut session = pin!(peripheral::advertise_connectable(sd, advertisement, config));
    let conn = match acknowledge(session.as_mut()) {
        Poll::Ready(Ok(conn)) => conn,
        Poll::Ready(Err(_)) => return,
        Poll::Pending => match session.await {
            Ok(conn) => conn,
            Err(e) => {
                error!("advertising stopped: {}", advertise_error(e));
                LINK.advertising_ended();
                return;
            }
        },
    };

    if LINK.on_connect(Peer(conn.clone()), ConnectStatus::Success) != ConnectOutcome::Accepted {
        let _ = conn.disconnect();
        return;
    }

    SUBSCRIBED.store(false, Ordering::Release);
    let _ = gatt_server::run(&conn, server, |event| match event {
        ReadingEvent::Notifications(enabled) => {
            info!("notifications {}", if enabled { "enabled" } else { "disabled" });
            SUBSCRIBED.store(enabled, Ordering::Release);
        }
    })
    .await;
    SUBSCRIBED.store(false, Ordering::Release);

    // gatt_server::run does not surface the HCI reason.
    LINK.on_disconnect(&Peer(conn), DisconnectReason::Unspecified);
}

fn beacon_advertisement(mode: BroadcastMode, adv_data: &[u8]) -> peripheral::NonconnectableAdvertisement<'_> {
    match mode {
        BroadcastMode::ExtendedServiceData => {
            peripheral::NonconnectableAdvertisement::ExtendedNonscannableUndirected {
                set_id: 0,
                anonymous: false,
                adv_data,
            }
        }
        _ => peripheral::NonconnectableAdvertisement::NonscannableUndirected { adv_data },
    }
}

async fn beacon_session(sd: &'static Softdevice, mode: BroadcastMode, config: &peripheral::Config) {
    let mut adv_data: Payload = match payload::encode(mode, 0) {
        Ok(data) => data,
        Err(_) => {
            ADVERTISE_RESULT.signal(Err(AdvertiseError::InvalidData));
            return;
        }
    };
    BEACON_DATA.reset();
    ON_AIR.lock(|f| f.borrow_mut().set(adv_data.clone()));
    let mut first = true;

    loop {
        // The session borrows the payload, so it ends before the swap.
        let next = {
            let mut session =
                pin!(peripheral::advertise(sd, beacon_advertisement(mode, &adv_data), config));

            if first {
                first = false;
                match acknowledge(session.as_mut()) {
                    Poll::Pending => {}
                    Poll::Ready(Err(_)) => return,
                    Poll::Ready(Ok(())) => {
                        LINK.advertising_ended();
                        return;
                    }
                }
            }

            match select(session, BEACON_DATA.wait()).await {
                Either::First(result) => {
                    if let Err(e) = result {
                        warn!("beacon advertising stopped: {}", advertise_error(e));
                    }
                    LINK.advertising_ended();
                    return;
                }
                Either::Second(next) => next,
            }
        };
        adv_data = next;
    }
}
