//
// Copyright (c) The Holo Core Contributors
//
// SPDX-License-Identifier: MIT
//

use std::net::Ipv6Addr;

use babel_utils::bytes::{BytesMutExt, TLS_BUF};
use babel_utils::crypto::{CryptoAlgo, message_digest};
use babel_utils::keychain::{Key, Keychains};
use bytes::{BufMut, BytesMut};
use chrono::{DateTime, Utc};
use num_traits::FromPrimitive;
use serde::{Deserialize, Serialize};
use subtle::ConstantTimeEq;
use zeroize::{Zeroize, ZeroizeOnDrop};

use crate::anm::NeighborMemory;
use crate::debug::Debug;
use crate::error::Error;
use crate::interface::{AuthCounter, AuthStatistics, Csa, Interface};
use crate::packet::{
    self, HDR_LENGTH, HMAC_KEY_ID_SIZE, TLV_HDR_SIZE, TlvIter, TlvType,
    TsPcTlv,
};

// Upper bound on HMAC computations per received packet.
pub const MAX_DIGESTS_IN: usize = 4;
// Upper bound on HMAC TLVs appended to a sent packet.
pub const MAX_DIGESTS_OUT: usize = 4;
// Worst-case space taken by the authentication TLVs of a sent packet:
// one TS/PC TLV plus MAX_DIGESTS_OUT HMAC TLVs with the largest digest.
pub const MAX_AUTH_SPACE: usize = TsPcTlv::SIZE
    + MAX_DIGESTS_OUT
        * (TLV_HDR_SIZE
            + HMAC_KEY_ID_SIZE
            + CryptoAlgo::MAX_DIGEST_SIZE as usize);

// Bounds for the neighbors-memory timeout, in seconds.
pub const ANM_TIMEOUT_MIN: u32 = 5;
pub const ANM_TIMEOUT_DEFAULT: u32 = 300;

// Base for the timestamp half of the TS/PC pair.
#[derive(Clone, Copy, Debug, Default, Eq, PartialEq)]
#[derive(Deserialize, Serialize)]
pub enum TsBase {
    Zero,
    #[default]
    Unix,
}

// Key validity direction used when deriving effective SAs.
#[derive(Clone, Copy, Debug, Eq, PartialEq)]
enum KeyDirection {
    Send,
    Accept,
}

// Effective security association, derived per operation from one CSA
// key. The sort pair interleaves CSAs: every CSA contributes its first
// valid key before any CSA contributes a second one. The secret is
// wiped when the ESA is dropped.
#[derive(Zeroize, ZeroizeOnDrop)]
struct Esa {
    #[zeroize(skip)]
    algo: CryptoAlgo,
    key_id: u16,
    key_secret: Vec<u8>,
    // Position of the key within its CSA's valid-key list.
    sort_major: usize,
    // Position of the CSA within the interface list.
    sort_minor: usize,
}

// Process-wide authentication state, threaded through every entry
// point. The core is single-threaded run-to-completion, so no interior
// mutability is needed.
#[derive(Debug)]
pub struct AuthContext {
    pub ts_base: TsBase,
    pub anm_timeout: u32,
    pub anm: NeighborMemory,
    pub statistics: AuthStatistics,
}

// ===== impl AuthContext =====

impl AuthContext {
    // Increments one counter on both statistics tiers.
    fn stat_inc(&mut self, iface: &mut Interface, counter: AuthCounter) {
        self.statistics.increment(counter);
        iface.statistics.increment(counter);
    }

    // Validates a received packet. Returns whether the caller may
    // process it; `false` means the packet must be discarded.
    pub fn check_packet(
        &mut self,
        iface: &mut Interface,
        keychains: &Keychains,
        from: Ipv6Addr,
        data: &[u8],
        now: DateTime<Utc>,
    ) -> bool {
        // Interfaces with no configured SAs exchange plaintext packets.
        if iface.config.csas.is_empty() {
            self.stat_inc(iface, AuthCounter::PlainRecv);
            return true;
        }
        let rx_required = iface.config.rx_auth_required;

        // Compare the first TS/PC TLV against the stored pair, (0, 0)
        // for an unknown neighbor.
        let stored = self
            .anm
            .lookup(iface.system.ifindex, from)
            .map(|entry| entry.last_tspc)
            .unwrap_or(TsPcTlv::new(0, 0));
        let tspc = match packet::first_tspc(data) {
            Ok(Some(tspc)) if tspc > stored => tspc,
            Ok(Some(tspc)) => {
                self.stat_inc(iface, AuthCounter::AuthRecvNgTsPc);
                Error::TsPcStale(from, tspc, stored).log();
                return !rx_required;
            }
            Ok(None) => {
                self.stat_inc(iface, AuthCounter::AuthRecvNgNoTsPc);
                Error::TsPcMissing(from).log();
                return !rx_required;
            }
            Err(error) => {
                // An unparseable packet cannot carry a usable TS/PC.
                self.stat_inc(iface, AuthCounter::AuthRecvNgNoTsPc);
                Error::PacketDecodeError(from, error).log();
                return !rx_required;
            }
        };

        // The HMAC input is the packet with every digest field replaced
        // by the source address and zero padding.
        let padded = match packet::padded_copy(data, &from) {
            Ok(padded) => Some(padded),
            Err(error) => {
                Error::PacketDecodeError(from, error).log();
                None
            }
        };

        let esas =
            build_esas(&iface.config.csas, keychains, now, KeyDirection::Accept);
        if esas.is_empty() {
            self.stat_inc(iface, AuthCounter::AuthRecvNgNoKeys);
            Error::RxNoValidKeys(from).log();
        }

        // Try each ESA in order, sharing the computation budget, and
        // stop at the first match.
        let mut ok = false;
        if let Some(padded) = &padded {
            let mut digests_done = 0;
            for esa in &esas {
                match esa_check_hmac(data, padded, esa, &mut digests_done) {
                    Ok(true) => {
                        ok = true;
                        break;
                    }
                    Ok(false) => (),
                    Err(error) => {
                        self.stat_inc(iface, AuthCounter::InternalErr);
                        error.log();
                    }
                }
            }
        }

        if ok {
            self.anm.upsert(iface.system.ifindex, from, tspc, now);
            self.stat_inc(iface, AuthCounter::AuthRecvOk);
            Debug::PacketAccept(&from, tspc).log();
        } else {
            self.stat_inc(iface, AuthCounter::AuthRecvNgHmac);
            Error::HmacMismatch(from).log();
        }

        ok || !rx_required
    }

    // Authenticates an outgoing packet body in place, appending one
    // TS/PC TLV and up to MAX_DIGESTS_OUT HMAC TLVs (at most
    // MAX_AUTH_SPACE bytes). On failure the body is left untouched so
    // the caller may still send it unauthenticated or drop it by
    // policy.
    pub fn make_packet(
        &mut self,
        iface: &mut Interface,
        keychains: &Keychains,
        body: &mut BytesMut,
        now: DateTime<Utc>,
    ) {
        if iface.config.csas.is_empty() {
            self.stat_inc(iface, AuthCounter::PlainSent);
            return;
        }

        // The digest padding is seeded with a link-local address of the
        // outgoing interface.
        let Some(addr) = iface.link_local_addr() else {
            self.stat_inc(iface, AuthCounter::InternalErr);
            Error::LinkLocalMissing(iface.name.clone()).log();
            return;
        };

        let esas =
            build_esas(&iface.config.csas, keychains, now, KeyDirection::Send);
        if esas.is_empty() {
            // The TS/PC TLV is still appended; no HMAC TLVs will be.
            self.stat_inc(iface, AuthCounter::AuthSentNgNoKeys);
            Error::TxNoValidKeys(iface.name.clone()).log();
        }

        TLS_BUF.with(|buf| {
            let mut buf = buf.borrow_mut();
            buf.clear();

            // Assemble the signing buffer: header, body, then a freshly
            // bumped TS/PC TLV.
            buf.put_u8(packet::MAGIC);
            buf.put_u8(packet::VERSION);
            buf.put_u16(0);
            buf.put_slice(&body[..]);
            bump_tspc(self.ts_base, iface, now);
            let tspc = TsPcTlv::new(iface.state.pc, iface.state.ts);
            tspc.encode(&mut buf);

            // Append one placeholder HMAC TLV per ESA, with the digest
            // field prefilled in padded form.
            let mut digests = Vec::new();
            for esa in esas.iter().take(MAX_DIGESTS_OUT) {
                let digest_size = esa.algo.digest_size() as usize;
                buf.put_u8(TlvType::Hmac as u8);
                buf.put_u8((HMAC_KEY_ID_SIZE + digest_size) as u8);
                buf.put_u16(esa.key_id);
                let offset = buf.len();
                buf.put_ipv6(&addr);
                buf.put_bytes(0, digest_size - 16);
                digests.push((offset, esa));
            }

            // Rewrite the body length field.
            let body_len = (buf.len() - HDR_LENGTH) as u16;
            buf[2..4].copy_from_slice(&body_len.to_be_bytes());

            // The buffer is its own padded form by construction, so
            // compute every digest before patching any of them in.
            let mut computed = Vec::new();
            for (offset, esa) in digests {
                match message_digest(&buf[..], esa.algo, &esa.key_secret) {
                    Ok(digest) => computed.push((offset, digest)),
                    Err(error) => {
                        self.stat_inc(iface, AuthCounter::InternalErr);
                        Error::HmacBackendError(error).log();
                        return;
                    }
                }
            }
            let digests = computed.len();
            for (offset, digest) in computed {
                buf[offset..offset + digest.len()].copy_from_slice(&digest);
            }

            // Transfer the authentication TLVs onto the caller's body.
            let appended = HDR_LENGTH + body.len();
            body.put_slice(&buf[appended..]);
            self.stat_inc(iface, AuthCounter::AuthSent);
            Debug::PacketSign(&iface.name, tspc, digests).log();
        });
    }

    // Expires stale neighbor records; the caller reschedules the timer.
    pub fn housekeep(&mut self, now: DateTime<Utc>) {
        self.anm.housekeep(now, self.anm_timeout);
    }
}

impl Default for AuthContext {
    fn default() -> AuthContext {
        AuthContext {
            ts_base: TsBase::default(),
            anm_timeout: ANM_TIMEOUT_DEFAULT,
            anm: NeighborMemory::default(),
            statistics: AuthStatistics::default(),
        }
    }
}

// ===== helper functions =====

// Advances the per-interface TS/PC pair so every emitted pair is
// strictly greater than all previous ones. In UNIX mode an advanced
// clock resets the pair; the packet counter then increments
// unconditionally, which is the whole of ZERO-mode behavior and the
// fallback when the clock stalls.
fn bump_tspc(ts_base: TsBase, iface: &mut Interface, now: DateTime<Utc>) {
    let state = &mut iface.state;

    if ts_base == TsBase::Unix {
        let now = now.timestamp() as u32;
        if now > state.ts {
            state.ts = now;
            state.pc = 0;
        }
    }
    let (pc, wrapped) = state.pc.overflowing_add(1);
    state.pc = pc;
    if wrapped {
        state.ts = state.ts.wrapping_add(1);
    }
}

// Derives the ordered effective-SA list for the given direction. Full
// duplicates are suppressed; the rest sort so that the first valid key
// of every CSA comes before any CSA's second key.
fn build_esas(
    csas: &[Csa],
    keychains: &Keychains,
    now: DateTime<Utc>,
    dir: KeyDirection,
) -> Vec<Esa> {
    let mut esas: Vec<Esa> = Vec::new();

    for (csa_index, csa) in csas.iter().enumerate() {
        // The key chain may appear later; skip for now.
        let Some(keychain) = keychains.get(&csa.keychain) else {
            Error::KeychainNotFound(csa.keychain.clone()).log();
            continue;
        };

        let keys: Vec<&Key> = match dir {
            KeyDirection::Send => keychain.keys_valid_send(now).collect(),
            KeyDirection::Accept => keychain.keys_valid_accept(now).collect(),
        };
        for (key_pos, key) in keys.into_iter().enumerate() {
            let key_id = (key.id % 65536) as u16;
            if esas.iter().any(|esa| {
                esa.algo == csa.algo
                    && esa.key_id == key_id
                    && esa.key_secret == key.string
            }) {
                continue;
            }
            esas.push(Esa {
                algo: csa.algo,
                key_id,
                key_secret: key.string.clone(),
                sort_major: key_pos,
                sort_minor: csa_index,
            });
        }
    }
    esas.sort_by_key(|esa| (esa.sort_major, esa.sort_minor));

    esas
}

// Checks whether any HMAC TLV of the packet matches the given ESA. The
// local digest is computed lazily, at most once per ESA, and never once
// the per-packet computation budget is spent.
fn esa_check_hmac(
    data: &[u8],
    padded: &[u8],
    esa: &Esa,
    digests_done: &mut usize,
) -> Result<bool, Error> {
    let digest_size = esa.algo.digest_size() as usize;
    let mut local = None;

    let Ok(iter) = TlvIter::new(data) else {
        return Ok(false);
    };
    for tlv in iter {
        let Ok(tlv) = tlv else {
            break;
        };
        if !matches!(TlvType::from_u8(tlv.tlv_type), Some(TlvType::Hmac))
            || tlv.length != HMAC_KEY_ID_SIZE + digest_size
        {
            continue;
        }
        let value = &data[tlv.offset..tlv.offset + tlv.length];
        let key_id = u16::from_be_bytes([value[0], value[1]]);
        if key_id != esa.key_id {
            continue;
        }

        if local.is_none() {
            if *digests_done == MAX_DIGESTS_IN {
                return Ok(false);
            }
            *digests_done += 1;
            local = Some(
                message_digest(padded, esa.algo, &esa.key_secret)
                    .map_err(Error::HmacBackendError)?,
            );
        }
        if let Some(digest) = &local
            && bool::from(
                digest.as_slice().ct_eq(&value[HMAC_KEY_ID_SIZE..]),
            )
        {
            return Ok(true);
        }
    }

    Ok(false)
}
