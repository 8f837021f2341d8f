//! Advertising-data encoding.
//!
//! Legacy advertising PDUs carry at most 31 bytes of AD structures, each
//! laid out as `[len, type, data..]` with `len` counting the type byte.

use heapless::Vec;

use super::BroadcastMode;
use crate::config::{DEVICE_NAME, EXTENDED_SERVICE_DATA_MARKER, SERVICE_UUID};
use crate::error::{Error, TransmitError};

/// Largest legacy advertising payload.
pub const MAX_AD_LEN: usize = 31;

/// Encoded payload handed to a [`Transmitter`](super::Transmitter).
pub type Payload = Vec<u8, MAX_AD_LEN>;

// AD type codes (Bluetooth Assigned Numbers, "Common Data Types")
pub const AD_FLAGS: u8 = 0x01;
pub const AD_INCOMPLETE_UUID16_LIST: u8 = 0x02;
pub const AD_COMPLETE_UUID16_LIST: u8 = 0x03;
pub const AD_SHORT_LOCAL_NAME: u8 = 0x08;
pub const AD_COMPLETE_LOCAL_NAME: u8 = 0x09;
pub const AD_SERVICE_DATA_UUID16: u8 = 0x16;

/// LE General Discoverable Mode.
pub const FLAG_LE_GENERAL_DISCOVERABLE: u8 = 0x02;
/// BR/EDR Not Supported.
pub const FLAG_BREDR_NOT_SUPPORTED: u8 = 0x04;

/// Builder for a sequence of AD structures.
#[derive(Clone, Debug, Default, PartialEq, Eq)]
pub struct AdvertisementData {
    buf: Payload,
}

impl AdvertisementData {
    pub const fn new() -> Self {
        Self { buf: Vec::new() }
    }

    /// Append one AD structure.
    ///
    /// Fails with `BufferOverflow` (leaving the data unchanged) if the
    /// structure would not fit.
    pub fn push(&mut self, ad_type: u8, data: &[u8]) -> Result<&mut Self, Error> {
        if self.buf.len() + 2 + data.len() > MAX_AD_LEN {
            return Err(Error::BufferOverflow);
        }
        // Capacity was checked above, these cannot fail.
        let _ = self.buf.push(data.len() as u8 + 1);
        let _ = self.buf.push(ad_type);
        let _ = self.buf.extend_from_slice(data);
        Ok(self)
    }

    pub fn as_slice(&self) -> &[u8] {
        &self.buf
    }

    pub fn len(&self) -> usize {
        self.buf.len()
    }

    pub fn is_empty(&self) -> bool {
        self.buf.is_empty()
    }

    pub fn into_payload(self) -> Payload {
        self.buf
    }
}

/// Encode `value` the way `mode` puts it on air.
pub fn encode(mode: BroadcastMode, value: u8) -> Result<Payload, Error> {
    let [lo, hi] = SERVICE_UUID.to_le_bytes();
    match mode {
        BroadcastMode::Notification => {
            let mut payload = Payload::new();
            let _ = payload.push(value);
            Ok(payload)
        }
        BroadcastMode::ServiceData => {
            let mut ad = AdvertisementData::new();
            ad.push(AD_COMPLETE_LOCAL_NAME, DEVICE_NAME.as_bytes())?
                .push(AD_SERVICE_DATA_UUID16, &[lo, hi, value])?;
            Ok(ad.into_payload())
        }
        BroadcastMode::ExtendedServiceData => {
            let mut ad = AdvertisementData::new();
            ad.push(AD_COMPLETE_LOCAL_NAME, DEVICE_NAME.as_bytes())?
                .push(
                    AD_SERVICE_DATA_UUID16,
                    &[lo, hi, EXTENDED_SERVICE_DATA_MARKER, value],
                )?;
            Ok(ad.into_payload())
        }
    }
}

/// Advertising data for the connectable session of the notification mode.
pub fn connectable_advertisement() -> Result<Payload, Error> {
    let mut ad = AdvertisementData::new();
    ad.push(
        AD_FLAGS,
        &[FLAG_LE_GENERAL_DISCOVERABLE | FLAG_BREDR_NOT_SUPPORTED],
    )?
    .push(AD_COMPLETE_UUID16_LIST, &SERVICE_UUID.to_le_bytes())?
    .push(AD_COMPLETE_LOCAL_NAME, DEVICE_NAME.as_bytes())?;
    Ok(ad.into_payload())
}

/// Tracks the payload currently on air so repeats can be skipped.
///
/// Restarting non-connectable advertising for an identical payload only
/// costs air time, so beacon transmitters hand over changes alone.
#[derive(Clone, Debug, Default)]
pub struct PayloadFilter {
    on_air: Option<Payload>,
}

impl PayloadFilter {
    pub const fn new() -> Self {
        Self { on_air: None }
    }

    /// Record what a freshly started session is advertising.
    pub fn set(&mut self, payload: Payload) {
        self.on_air = Some(payload);
    }

    /// Offer `payload`; returns it when it differs from what is on air.
    pub fn update(&mut self, payload: &[u8]) -> Result<Option<Payload>, TransmitError> {
        if self.on_air.as_deref() == Some(payload) {
            return Ok(None);
        }
        let next = Payload::from_slice(payload).map_err(|_| TransmitError::PayloadTooLarge)?;
        self.on_air = Some(next.clone());
        Ok(Some(next))
    }
}

// Decoders, used to check encoded payloads in tests.

/// Data of the first AD structure of type `ad_type`.
///
/// Stops at a zero length or a structure running past the end.
#[cfg(test)]
pub(crate) fn find_ad(data: &[u8], ad_type: u8) -> Option<&[u8]> {
    let mut i = 0;
    while i < data.len() {
        let len = data[i] as usize;
        if len == 0 || i + len >= data.len() {
            break;
        }
        if data[i + 1] == ad_type {
            return Some(&data[i + 2..i + 1 + len]);
        }
        i += len + 1;
    }
    None
}

/// Whether a 16-bit UUID list (complete or incomplete) names `uuid`.
#[cfg(test)]
pub(crate) fn advertises_service(data: &[u8], uuid: u16) -> bool {
    let wanted = uuid.to_le_bytes();
    [AD_COMPLETE_UUID16_LIST, AD_INCOMPLETE_UUID16_LIST]
        .iter()
        .filter_map(|&t| find_ad(data, t))
        .any(|list| list.chunks_exact(2).any(|c| c == wanted))
}

/// Local name (complete, else shortened), if present and valid UTF-8.
#[cfg(test)]
pub(crate) fn local_name(data: &[u8]) -> Option<&str> {
    find_ad(data, AD_COMPLETE_LOCAL_NAME)
        .or_else(|| find_ad(data, AD_SHORT_LOCAL_NAME))
        .and_then(|name| core::str::from_utf8(name).ok())
}

/// Aggregate carried in our service data, for either advertising mode.
#[cfg(test)]
pub(crate) fn service_value(data: &[u8]) -> Option<u8> {
    let [lo, hi] = SERVICE_UUID.to_le_bytes();
    match find_ad(data, AD_SERVICE_DATA_UUID16)? {
        [l, h, v] if *l == lo && *h == hi => Some(*v),
        [l, h, m, v] if *l == lo && *h == hi && *m == EXTENDED_SERVICE_DATA_MARKER => Some(*v),
        _ => None,
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn service_data_layout() {
        let payload = encode(BroadcastMode::ServiceData, 0x2A).unwrap();
        let mut expected: Vec<u8, MAX_AD_LEN> = Vec::new();
        expected
            .extend_from_slice(&[7, AD_COMPLETE_LOCAL_NAME])
            .unwrap();
        expected.extend_from_slice(b"Pulse1").unwrap();
        expected
            .extend_from_slice(&[4, AD_SERVICE_DATA_UUID16, 0x3B, 0x18, 0x2A])
            .unwrap();
        assert_eq!(payload, expected);
    }

    #[test]
    fn extended_service_data_carries_marker() {
        let payload = encode(BroadcastMode::ExtendedServiceData, 9).unwrap();
        assert_eq!(
            find_ad(&payload, AD_SERVICE_DATA_UUID16),
            Some(&[0x3B, 0x18, 0x40, 9][..])
        );
        assert_eq!(service_value(&payload), Some(9));
    }

    #[test]
    fn notification_is_the_bare_value() {
        assert_eq!(encode(BroadcastMode::Notification, 200).unwrap().as_slice(), &[200]);
    }

    #[test]
    fn connectable_advertisement_is_discoverable() {
        let adv = connectable_advertisement().unwrap();
        assert_eq!(find_ad(&adv, AD_FLAGS), Some(&[0x06][..]));
        assert!(advertises_service(&adv, 0x183B));
        assert!(!advertises_service(&adv, 0x1812));
        assert_eq!(local_name(&adv), Some("Pulse1"));
        assert_eq!(service_value(&adv), None);
    }

    #[test]
    fn overflow_is_rejected_without_partial_write() {
        let mut ad = AdvertisementData::new();
        ad.push(AD_COMPLETE_LOCAL_NAME, &[b'x'; 27]).unwrap();
        assert_eq!(ad.len(), 29);

        assert_eq!(ad.push(AD_FLAGS, &[0x06]), Err(Error::BufferOverflow));
        assert_eq!(ad.len(), 29);
        ad.push(AD_FLAGS, &[]).unwrap();
        assert_eq!(ad.len(), MAX_AD_LEN);
    }

    #[test]
    fn parser_stops_on_truncated_structure() {
        // Second structure claims 5 bytes but only 2 follow.
        let data = [2, AD_FLAGS, 0x06, 5, AD_COMPLETE_LOCAL_NAME, b'a'];
        assert_eq!(find_ad(&data, AD_FLAGS), Some(&[0x06][..]));
        assert_eq!(local_name(&data), None);
        assert_eq!(find_ad(&[0, AD_FLAGS, 1], AD_FLAGS), None);
        assert_eq!(find_ad(&[], AD_FLAGS), None);
    }

    #[test]
    fn shortened_name_is_a_fallback() {
        let data = [4, AD_SHORT_LOCAL_NAME, b'P', b'u', b'l'];
        assert_eq!(local_name(&data), Some("Pul"));
    }

    #[test]
    fn foreign_service_data_is_ignored() {
        let data = [4, AD_SERVICE_DATA_UUID16, 0x0F, 0x18, 0x55];
        assert_eq!(service_value(&data), None);
    }

    #[test]
    fn filter_passes_changes_only() {
        let mut filter = PayloadFilter::new();
        let one = encode(BroadcastMode::ServiceData, 1).unwrap();
        let two = encode(BroadcastMode::ServiceData, 2).unwrap();

        assert_eq!(filter.update(&one), Ok(Some(one.clone())));
        assert_eq!(filter.update(&one), Ok(None));
        assert_eq!(filter.update(&two), Ok(Some(two.clone())));
        assert_eq!(filter.update(&one), Ok(Some(one)));
    }

    #[test]
    fn filter_follows_restarted_session() {
        let mut filter = PayloadFilter::new();
        let seed = encode(BroadcastMode::ExtendedServiceData, 0).unwrap();
        let three = encode(BroadcastMode::ExtendedServiceData, 3).unwrap();
        filter.update(&three).unwrap();

        // New session comes up advertising the seed value.
        filter.set(seed.clone());
        assert_eq!(filter.update(&seed), Ok(None));
        assert_eq!(filter.update(&three), Ok(Some(three)));
    }

    #[test]
    fn filter_rejects_oversized_payload() {
        let mut filter = PayloadFilter::new();
        assert_eq!(
            filter.update(&[0u8; MAX_AD_LEN + 1]),
            Err(TransmitError::PayloadTooLarge)
        );
    }
}
