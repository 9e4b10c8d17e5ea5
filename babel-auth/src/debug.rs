//
// Copyright (c) The Holo Core Contributors
//
// SPDX-License-Identifier: MIT
//

use std::net::Ipv6Addr;

use tracing::debug;

use crate::packet::TsPcTlv;

// Authentication debug messages.
#[derive(Debug)]
pub enum Debug<'a> {
    PacketAccept(&'a Ipv6Addr, TsPcTlv),
    PacketSign(&'a str, TsPcTlv, usize),
    AnmCreate(&'a Ipv6Addr, TsPcTlv),
    AnmUpdate(&'a Ipv6Addr, TsPcTlv),
    AnmExpire(&'a Ipv6Addr),
}

// ===== impl Debug =====

impl Debug<'_> {
    // Log debug message using the tracing API.
    pub(crate) fn log(&self) {
        match self {
            Debug::PacketAccept(address, tspc) => {
                debug!(%address, ts = %tspc.ts, pc = %tspc.pc, "{}", self);
            }
            Debug::PacketSign(interface, tspc, digests) => {
                debug!(%interface, ts = %tspc.ts, pc = %tspc.pc, %digests, "{}", self);
            }
            Debug::AnmCreate(address, tspc)
            | Debug::AnmUpdate(address, tspc) => {
                debug!(%address, ts = %tspc.ts, pc = %tspc.pc, "{}", self);
            }
            Debug::AnmExpire(address) => {
                debug!(%address, "{}", self);
            }
        }
    }
}

impl std::fmt::Display for Debug<'_> {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            Debug::PacketAccept(..) => {
                write!(f, "packet authenticated")
            }
            Debug::PacketSign(..) => {
                write!(f, "packet signed")
            }
            Debug::AnmCreate(..) => {
                write!(f, "neighbor record created")
            }
            Debug::AnmUpdate(..) => {
                write!(f, "neighbor record updated")
            }
            Debug::AnmExpire(..) => {
                write!(f, "neighbor record expired")
            }
        }
    }
}
