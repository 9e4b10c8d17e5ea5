//
// Copyright (c) The Holo Core Contributors
//
// SPDX-License-Identifier: MIT
//

use std::collections::{BTreeMap, btree_map};
use std::net::Ipv6Addr;

use chrono::{DateTime, Duration, Utc};
use serde::{Deserialize, Serialize};

use crate::debug::Debug;
use crate::packet::TsPcTlv;

// One authentic-neighbor record: the last TS/PC pair accepted from a
// peer and when it was accepted.
#[derive(Clone, Copy, Debug, Eq, PartialEq)]
#[derive(Deserialize, Serialize)]
pub struct AnmEntry {
    pub last_tspc: TsPcTlv,
    pub last_recv: DateTime<Utc>,
}

// Authentic neighbors memory: replay-protection state for every peer
// that passed authentication, keyed by interface and source address.
// Volatile by design; records live until expiry or operator reset.
#[derive(Debug, Default)]
pub struct NeighborMemory {
    entries: BTreeMap<(u32, Ipv6Addr), AnmEntry>,
}

// ===== impl NeighborMemory =====

impl NeighborMemory {
    pub fn lookup(&self, ifindex: u32, addr: Ipv6Addr) -> Option<&AnmEntry> {
        self.entries.get(&(ifindex, addr))
    }

    // Records an accepted TS/PC pair, updating the existing record in
    // place when the neighbor is already known.
    pub(crate) fn upsert(
        &mut self,
        ifindex: u32,
        addr: Ipv6Addr,
        tspc: TsPcTlv,
        now: DateTime<Utc>,
    ) {
        match self.entries.entry((ifindex, addr)) {
            btree_map::Entry::Occupied(o) => {
                Debug::AnmUpdate(&addr, tspc).log();

                let entry = o.into_mut();
                entry.last_tspc = tspc;
                entry.last_recv = now;
            }
            btree_map::Entry::Vacant(v) => {
                Debug::AnmCreate(&addr, tspc).log();

                v.insert(AnmEntry {
                    last_tspc: tspc,
                    last_recv: now,
                });
            }
        }
    }

    // Removes every record not refreshed within the timeout. The caller
    // reschedules the next run.
    pub fn housekeep(&mut self, now: DateTime<Utc>, timeout: u32) {
        self.entries.retain(|(_, addr), entry| {
            let expired =
                entry.last_recv + Duration::seconds(timeout.into()) < now;
            if expired {
                Debug::AnmExpire(addr).log();
            }
            !expired
        });
    }

    pub fn clear_all(&mut self) {
        self.entries.clear();
    }

    pub fn clear_interface(&mut self, ifindex: u32) {
        self.entries.retain(|(entry_ifindex, _), _| *entry_ifindex != ifindex);
    }

    pub fn iter(
        &self,
    ) -> impl Iterator<Item = (&(u32, Ipv6Addr), &AnmEntry)> {
        self.entries.iter()
    }

    pub fn len(&self) -> usize {
        self.entries.len()
    }

    pub fn is_empty(&self) -> bool {
        self.entries.is_empty()
    }
}
