//
// Copyright (c) The Holo Core Contributors
//
// SPDX-License-Identifier: MIT
//

use std::net::Ipv6Addr;

use babel_utils::crypto::HmacError;
use tracing::{error, warn};

use crate::packet::{DecodeError, TsPcTlv};

// Packet authentication errors.
#[derive(Debug)]
pub enum Error {
    PacketDecodeError(Ipv6Addr, DecodeError),
    TsPcMissing(Ipv6Addr),
    TsPcStale(Ipv6Addr, TsPcTlv, TsPcTlv),
    HmacMismatch(Ipv6Addr),
    RxNoValidKeys(Ipv6Addr),
    TxNoValidKeys(String),
    KeychainNotFound(String),
    LinkLocalMissing(String),
    HmacBackendError(HmacError),
}

// ===== impl Error =====

impl Error {
    pub(crate) fn log(&self) {
        match self {
            Error::PacketDecodeError(source, error) => {
                warn!(%source, %error, "{}", self);
            }
            Error::TsPcMissing(source) => {
                warn!(%source, "{}", self);
            }
            Error::TsPcStale(source, received, stored) => {
                warn!(%source, received_ts = %received.ts,
                    received_pc = %received.pc, stored_ts = %stored.ts,
                    stored_pc = %stored.pc, "{}", self);
            }
            Error::HmacMismatch(source) => {
                warn!(%source, "{}", self);
            }
            Error::RxNoValidKeys(source) => {
                warn!(%source, "{}", self);
            }
            Error::TxNoValidKeys(interface) => {
                warn!(%interface, "{}", self);
            }
            Error::KeychainNotFound(keychain) => {
                warn!(%keychain, "{}", self);
            }
            Error::LinkLocalMissing(interface) => {
                error!(%interface, "{}", self);
            }
            Error::HmacBackendError(error) => {
                error!(%error, "{}", self);
            }
        }
    }
}

impl std::fmt::Display for Error {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            Error::PacketDecodeError(..) => {
                write!(f, "failed to decode packet")
            }
            Error::TsPcMissing(..) => {
                write!(f, "authentication failed: no TS/PC TLV")
            }
            Error::TsPcStale(..) => {
                write!(f, "authentication failed: stale TS/PC pair")
            }
            Error::HmacMismatch(..) => {
                write!(f, "authentication failed: no matching digest")
            }
            Error::RxNoValidKeys(..) => {
                write!(f, "no keys valid for accepting")
            }
            Error::TxNoValidKeys(..) => {
                write!(f, "no keys valid for sending")
            }
            Error::KeychainNotFound(..) => {
                write!(f, "key chain not found")
            }
            Error::LinkLocalMissing(..) => {
                write!(f, "no link-local address")
            }
            Error::HmacBackendError(..) => {
                write!(f, "HMAC computation failed")
            }
        }
    }
}

impl std::error::Error for Error {
    fn source(&self) -> Option<&(dyn std::error::Error + 'static)> {
        match self {
            Error::PacketDecodeError(_, error) => Some(error),
            Error::HmacBackendError(error) => Some(error),
            _ => None,
        }
    }
}
