//
// Copyright (c) The Holo Core Contributors
//
// SPDX-License-Identifier: MIT
//

use std::net::Ipv6Addr;

use bytes::{BufMut, BytesMut};
use derive_new::new;
use num_derive::FromPrimitive;
use num_traits::FromPrimitive;
use serde::{Deserialize, Serialize};

//
// The Babel packet format is:
//
//  0                   1                   2                   3
//  0 1 2 3 4 5 6 7 8 9 0 1 2 3 4 5 6 7 8 9 0 1 2 3 4 5 6 7 8 9 0 1
// +-+-+-+-+-+-+-+-+-+-+-+-+-+-+-+-+-+-+-+-+-+-+-+-+-+-+-+-+-+-+-+-+
// |     Magic     |    Version    |          Body length          |
// +-+-+-+-+-+-+-+-+-+-+-+-+-+-+-+-+-+-+-+-+-+-+-+-+-+-+-+-+-+-+-+-+
// |                        Packet Body ...
// +-+-+-+-+-+-+-+-+-+-+-+-+-+-+-+-
//
pub const MAGIC: u8 = 42;
pub const VERSION: u8 = 2;
pub const HDR_LENGTH: usize = 4;
pub const TLV_HDR_SIZE: usize = 2;

// TLV types relevant to packet authentication. Any other TLV flows
// through the authentication layer untouched.
#[derive(Clone, Copy, Debug, Eq, FromPrimitive, PartialEq)]
#[derive(Deserialize, Serialize)]
pub enum TlvType {
    Pad1 = 0,
    TsPc = 4,
    Hmac = 11,
}

//
// The TS/PC TLV format is:
//
//  0                   1                   2                   3
//  0 1 2 3 4 5 6 7 8 9 0 1 2 3 4 5 6 7 8 9 0 1 2 3 4 5 6 7 8 9 0 1
// +-+-+-+-+-+-+-+-+-+-+-+-+-+-+-+-+-+-+-+-+-+-+-+-+-+-+-+-+-+-+-+-+
// |   Type = 4    |   Length = 6  |         PacketCounter         |
// +-+-+-+-+-+-+-+-+-+-+-+-+-+-+-+-+-+-+-+-+-+-+-+-+-+-+-+-+-+-+-+-+
// |                           Timestamp                           |
// +-+-+-+-+-+-+-+-+-+-+-+-+-+-+-+-+-+-+-+-+-+-+-+-+-+-+-+-+-+-+-+-+
//
#[derive(Clone, Copy, Debug, Eq, new, PartialEq)]
#[derive(Deserialize, Serialize)]
pub struct TsPcTlv {
    pub pc: u16,
    pub ts: u32,
}

//
// The HMAC TLV format is:
//
//  0                   1                   2                   3
//  0 1 2 3 4 5 6 7 8 9 0 1 2 3 4 5 6 7 8 9 0 1 2 3 4 5 6 7 8 9 0 1
// +-+-+-+-+-+-+-+-+-+-+-+-+-+-+-+-+-+-+-+-+-+-+-+-+-+-+-+-+-+-+-+-+
// |   Type = 11   |    Length     |             KeyID             |
// +-+-+-+-+-+-+-+-+-+-+-+-+-+-+-+-+-+-+-+-+-+-+-+-+-+-+-+-+-+-+-+-+
// |                           Digest...
// +-+-+-+-+-+-+-+-+-+-+-+-+-+-+-+-
//
// Minimum HMAC TLV value length: the KeyID plus the 16 address bytes
// that seed the digest padding.
pub const HMAC_TLV_MIN_LEN: usize = HMAC_KEY_ID_SIZE + 16;
pub const HMAC_KEY_ID_SIZE: usize = 2;

// Babel packet decode errors.
#[derive(Debug, Deserialize, Eq, PartialEq, Serialize)]
pub enum DecodeError {
    InvalidLength(usize),
    InvalidMagic(u8),
    InvalidVersion(u8),
    InvalidBodyLength(u16),
    InvalidTlvLength(u8),
}

// Type aliases.
pub type DecodeResult<T> = Result<T, DecodeError>;

// Reference to one TLV inside a packet.
#[derive(Clone, Copy, Debug, Eq, PartialEq)]
pub(crate) struct TlvRef {
    // Raw TLV type byte.
    pub tlv_type: u8,
    // Offset of the TLV value relative to the start of the packet.
    pub offset: usize,
    // Value length in bytes (zero for PAD1).
    pub length: usize,
}

// Iterator over the TLVs of a packet, bounds-checked against the body
// length declared in the header.
#[derive(Debug)]
pub(crate) struct TlvIter<'a> {
    data: &'a [u8],
    offset: usize,
    end: usize,
    failed: bool,
}

// ===== impl TsPcTlv =====

impl TsPcTlv {
    pub const LENGTH: usize = 6;
    pub const SIZE: usize = TLV_HDR_SIZE + Self::LENGTH;

    pub(crate) fn encode(&self, buf: &mut BytesMut) {
        buf.put_u8(TlvType::TsPc as u8);
        buf.put_u8(Self::LENGTH as u8);
        buf.put_u16(self.pc);
        buf.put_u32(self.ts);
    }

    fn decode(value: &[u8]) -> TsPcTlv {
        let pc = u16::from_be_bytes([value[0], value[1]]);
        let ts = u32::from_be_bytes([value[2], value[3], value[4], value[5]]);
        TsPcTlv { pc, ts }
    }
}

// TS/PC pairs order by timestamp first, packet counter second.
impl Ord for TsPcTlv {
    fn cmp(&self, other: &TsPcTlv) -> std::cmp::Ordering {
        (self.ts, self.pc).cmp(&(other.ts, other.pc))
    }
}

impl PartialOrd for TsPcTlv {
    fn partial_cmp(&self, other: &TsPcTlv) -> Option<std::cmp::Ordering> {
        Some(self.cmp(other))
    }
}

// ===== impl TlvIter =====

impl<'a> TlvIter<'a> {
    pub(crate) fn new(data: &'a [u8]) -> DecodeResult<TlvIter<'a>> {
        let end = packet_end(data)?;
        Ok(TlvIter {
            data,
            offset: HDR_LENGTH,
            end,
            failed: false,
        })
    }
}

impl Iterator for TlvIter<'_> {
    type Item = DecodeResult<TlvRef>;

    fn next(&mut self) -> Option<Self::Item> {
        if self.failed || self.offset >= self.end {
            return None;
        }

        // PAD1 has no length or value field.
        let tlv_type = self.data[self.offset];
        if tlv_type == TlvType::Pad1 as u8 {
            let tlv = TlvRef {
                tlv_type,
                offset: self.offset + 1,
                length: 0,
            };
            self.offset += 1;
            return Some(Ok(tlv));
        }

        if self.offset + TLV_HDR_SIZE > self.end {
            self.failed = true;
            return Some(Err(DecodeError::InvalidLength(
                self.end - self.offset,
            )));
        }
        let length = self.data[self.offset + 1] as usize;
        if self.offset + TLV_HDR_SIZE + length > self.end {
            self.failed = true;
            return Some(Err(DecodeError::InvalidTlvLength(length as u8)));
        }

        let tlv = TlvRef {
            tlv_type,
            offset: self.offset + TLV_HDR_SIZE,
            length,
        };
        self.offset += TLV_HDR_SIZE + length;
        Some(Ok(tlv))
    }
}

// ===== impl DecodeError =====

impl std::fmt::Display for DecodeError {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            DecodeError::InvalidLength(length) => {
                write!(f, "Invalid length: {}", length)
            }
            DecodeError::InvalidMagic(magic) => {
                write!(f, "Invalid magic byte: {}", magic)
            }
            DecodeError::InvalidVersion(version) => {
                write!(f, "Invalid version: {}", version)
            }
            DecodeError::InvalidBodyLength(body_len) => {
                write!(f, "Invalid body length: {}", body_len)
            }
            DecodeError::InvalidTlvLength(tlv_len) => {
                write!(f, "Invalid TLV length: {}", tlv_len)
            }
        }
    }
}

impl std::error::Error for DecodeError {}

// ===== global functions =====

// Validates the fixed header and returns the end offset of the packet
// body. Bytes past the declared body length are ignored.
pub(crate) fn packet_end(data: &[u8]) -> DecodeResult<usize> {
    if data.len() < HDR_LENGTH {
        return Err(DecodeError::InvalidLength(data.len()));
    }
    if data[0] != MAGIC {
        return Err(DecodeError::InvalidMagic(data[0]));
    }
    if data[1] != VERSION {
        return Err(DecodeError::InvalidVersion(data[1]));
    }
    let body_len = u16::from_be_bytes([data[2], data[3]]);
    let end = HDR_LENGTH + body_len as usize;
    if end > data.len() {
        return Err(DecodeError::InvalidBodyLength(body_len));
    }

    Ok(end)
}

// Returns the first well-formed TS/PC TLV of the packet, if any. A
// type-4 TLV with an unexpected length is not considered a TS/PC TLV.
pub fn first_tspc(data: &[u8]) -> DecodeResult<Option<TsPcTlv>> {
    for tlv in TlvIter::new(data)? {
        let tlv = tlv?;
        if let Some(TlvType::TsPc) = TlvType::from_u8(tlv.tlv_type)
            && tlv.length == TsPcTlv::LENGTH
        {
            let value = &data[tlv.offset..tlv.offset + tlv.length];
            return Ok(Some(TsPcTlv::decode(value)));
        }
    }

    Ok(None)
}

// Returns a copy of the packet in which every HMAC TLV's digest field
// is replaced by the given address followed by zero padding. All other
// bytes, the KeyID field included, are preserved.
pub fn padded_copy(data: &[u8], addr: &Ipv6Addr) -> DecodeResult<Vec<u8>> {
    let end = packet_end(data)?;
    let mut padded = data[..end].to_vec();

    for tlv in TlvIter::new(data)? {
        let tlv = tlv?;
        if let Some(TlvType::Hmac) = TlvType::from_u8(tlv.tlv_type) {
            if tlv.length < HMAC_TLV_MIN_LEN {
                return Err(DecodeError::InvalidTlvLength(tlv.length as u8));
            }
            let digest = &mut padded
                [tlv.offset + HMAC_KEY_ID_SIZE..tlv.offset + tlv.length];
            digest[..16].copy_from_slice(&addr.octets());
            digest[16..].fill(0);
        }
    }

    Ok(padded)
}
