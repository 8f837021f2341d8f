//! Disconnect reason classification (HCI error codes).
//!
//! Diagnostics only: the coordinator releases the link the same way
//! whatever the reason.

/// Named HCI disconnect reasons, plus a catch-all.
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
#[cfg_attr(feature = "defmt", derive(defmt::Format))]
pub enum DisconnectReason {
    AuthenticationFailure,
    ConnectionTimeout,
    ConnectionLimitExceeded,
    RemoteUserTerminated,
    RemoteLowResources,
    RemotePowerOff,
    UnsupportedRemoteFeature,
    Unspecified,
    PairingNotSupported,
    UnacceptableConnectionParameters,
    Other(u8),
}

impl DisconnectReason {
    pub const fn from_code(code: u8) -> Self {
        match code {
            0x05 => DisconnectReason::AuthenticationFailure,
            0x08 => DisconnectReason::ConnectionTimeout,
            0x09 => DisconnectReason::ConnectionLimitExceeded,
            0x13 => DisconnectReason::RemoteUserTerminated,
            0x14 => DisconnectReason::RemoteLowResources,
            0x15 => DisconnectReason::RemotePowerOff,
            0x1A => DisconnectReason::UnsupportedRemoteFeature,
            0x1F => DisconnectReason::Unspecified,
            0x29 => DisconnectReason::PairingNotSupported,
            0x3B => DisconnectReason::UnacceptableConnectionParameters,
            other => DisconnectReason::Other(other),
        }
    }

    /// Raw HCI code.
    pub const fn code(self) -> u8 {
        match self {
            DisconnectReason::AuthenticationFailure => 0x05,
            DisconnectReason::ConnectionTimeout => 0x08,
            DisconnectReason::ConnectionLimitExceeded => 0x09,
            DisconnectReason::RemoteUserTerminated => 0x13,
            DisconnectReason::RemoteLowResources => 0x14,
            DisconnectReason::RemotePowerOff => 0x15,
            DisconnectReason::UnsupportedRemoteFeature => 0x1A,
            DisconnectReason::Unspecified => 0x1F,
            DisconnectReason::PairingNotSupported => 0x29,
            DisconnectReason::UnacceptableConnectionParameters => 0x3B,
            DisconnectReason::Other(code) => code,
        }
    }

    /// Human-readable description for the diagnostic log.
    pub const fn describe(self) -> &'static str {
        match self {
            DisconnectReason::AuthenticationFailure => "authentication failed",
            DisconnectReason::ConnectionTimeout => "connection timeout",
            DisconnectReason::ConnectionLimitExceeded => "connection limit exceeded",
            DisconnectReason::RemoteUserTerminated => "remote user terminated connection",
            DisconnectReason::RemoteLowResources => "remote low resources",
            DisconnectReason::RemotePowerOff => "remote powered off",
            DisconnectReason::UnsupportedRemoteFeature => "unsupported remote feature",
            DisconnectReason::Unspecified => "unspecified HCI error",
            DisconnectReason::PairingNotSupported => "pairing not supported",
            DisconnectReason::UnacceptableConnectionParameters => {
                "unacceptable connection parameters"
            }
            DisconnectReason::Other(_) => "reason",
        }
    }
}
