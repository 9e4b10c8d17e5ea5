//
// Copyright (c) The Holo Core Contributors
//
// SPDX-License-Identifier: MIT
//

use std::collections::BTreeSet;
use std::net::Ipv6Addr;

use babel_utils::crypto::CryptoAlgo;
use chrono::{DateTime, Utc};
use derive_new::new;
use serde::{Deserialize, Serialize};

// Configured security association: one HMAC algorithm paired with the
// key-chain whose keys sign and verify with it. An interface may carry
// several, and the operator-defined order affects which keys sign when
// more qualify than fit in a packet.
#[derive(Clone, Debug, Eq, new, PartialEq)]
#[derive(Deserialize, Serialize)]
pub struct Csa {
    pub algo: CryptoAlgo,
    pub keychain: String,
}

// Interface authentication configuration.
#[derive(Clone, Debug)]
#[derive(Deserialize, Serialize)]
pub struct InterfaceCfg {
    // Ordered list of configured security associations. An empty list
    // means the interface exchanges plaintext packets.
    pub csas: Vec<Csa>,
    // Whether packets failing authentication are discarded.
    pub rx_auth_required: bool,
}

// Interface data discovered from the system.
#[derive(Debug, Default)]
pub struct InterfaceSys {
    pub ifindex: u32,
    // IPv6 addresses assigned to the interface.
    pub addr_list: BTreeSet<Ipv6Addr>,
}

// Per-interface TS/PC send state.
#[derive(Debug, Default)]
#[derive(Deserialize, Serialize)]
pub struct SendState {
    // Timestamp half of the last emitted pair.
    pub ts: u32,
    // Packet-counter half of the last emitted pair.
    pub pc: u16,
}

#[derive(Debug)]
pub struct Interface {
    pub name: String,
    pub system: InterfaceSys,
    pub config: InterfaceCfg,
    pub state: SendState,
    pub statistics: AuthStatistics,
}

// Authentication statistic counters, maintained process-wide and per
// interface.
#[derive(Debug, Default)]
#[derive(Deserialize, Serialize)]
pub struct AuthStatistics {
    pub discontinuity_time: Option<DateTime<Utc>>,
    pub plain_recv: u64,
    pub plain_sent: u64,
    pub auth_sent: u64,
    pub auth_sent_ng_nokeys: u64,
    pub auth_recv_ok: u64,
    pub auth_recv_ng_nokeys: u64,
    pub auth_recv_ng_no_tspc: u64,
    pub auth_recv_ng_tspc: u64,
    pub auth_recv_ng_hmac: u64,
    pub internal_err: u64,
}

// Statistic counter selector.
#[derive(Clone, Copy, Debug, Eq, PartialEq)]
pub enum AuthCounter {
    PlainRecv,
    PlainSent,
    AuthSent,
    AuthSentNgNoKeys,
    AuthRecvOk,
    AuthRecvNgNoKeys,
    AuthRecvNgNoTsPc,
    AuthRecvNgTsPc,
    AuthRecvNgHmac,
    InternalErr,
}

// ===== impl InterfaceCfg =====

impl Default for InterfaceCfg {
    fn default() -> InterfaceCfg {
        InterfaceCfg {
            csas: Vec::new(),
            rx_auth_required: true,
        }
    }
}

// ===== impl Interface =====

impl Interface {
    pub fn new(name: String, ifindex: u32) -> Interface {
        Interface {
            name,
            system: InterfaceSys {
                ifindex,
                addr_list: Default::default(),
            },
            config: InterfaceCfg::default(),
            state: SendState::default(),
            statistics: AuthStatistics::default(),
        }
    }

    // First link-local address of the interface. When more than one is
    // assigned, the chosen address may differ from the source the
    // kernel selects for the outgoing datagram, and such packets never
    // verify on the receiver.
    pub(crate) fn link_local_addr(&self) -> Option<Ipv6Addr> {
        self.system
            .addr_list
            .iter()
            .find(|addr| (addr.segments()[0] & 0xffc0) == 0xfe80)
            .copied()
    }
}

// ===== impl AuthStatistics =====

impl AuthStatistics {
    pub(crate) fn increment(&mut self, counter: AuthCounter) {
        match counter {
            AuthCounter::PlainRecv => self.plain_recv += 1,
            AuthCounter::PlainSent => self.plain_sent += 1,
            AuthCounter::AuthSent => self.auth_sent += 1,
            AuthCounter::AuthSentNgNoKeys => self.auth_sent_ng_nokeys += 1,
            AuthCounter::AuthRecvOk => self.auth_recv_ok += 1,
            AuthCounter::AuthRecvNgNoKeys => self.auth_recv_ng_nokeys += 1,
            AuthCounter::AuthRecvNgNoTsPc => self.auth_recv_ng_no_tspc += 1,
            AuthCounter::AuthRecvNgTsPc => self.auth_recv_ng_tspc += 1,
            AuthCounter::AuthRecvNgHmac => self.auth_recv_ng_hmac += 1,
            AuthCounter::InternalErr => self.internal_err += 1,
        }
    }

    // Clears the counters and stamps the discontinuity.
    pub fn reset(&mut self, now: DateTime<Utc>) {
        *self = AuthStatistics {
            discontinuity_time: Some(now),
            ..Default::default()
        };
    }
}
