//
// Copyright (c) The Holo Core Contributors
//
// SPDX-License-Identifier: MIT
//

use hmac::Hmac;
use hmac::digest::block_buffer::Eager;
use hmac::digest::core_api::{
    BlockSizeUser, BufferKindUser, CoreProxy, FixedOutputCore, UpdateCore,
};
use hmac::digest::typenum::{IsLess, Le, NonZero, U256};
use hmac::digest::{HashMarker, Mac};
use ripemd::Ripemd160;
use serde::{Deserialize, Serialize};
use sha1::Sha1;
use sha2::{Sha256, Sha384, Sha512};
use whirlpool::Whirlpool;

// Hash algorithms usable for packet authentication (RFC 7298 set).
#[derive(Copy, Clone, Debug, Eq, Ord, PartialEq, PartialOrd)]
#[derive(Deserialize, Serialize)]
pub enum CryptoAlgo {
    Ripemd160,
    Sha1,
    Sha256,
    Sha384,
    Sha512,
    Whirlpool,
}

// Error returned when the HMAC backend rejects the provided key.
#[derive(Clone, Copy, Debug, Eq, PartialEq)]
pub struct HmacError;

// ===== impl CryptoAlgo =====

impl CryptoAlgo {
    // Largest digest size among all supported algorithms.
    pub const MAX_DIGEST_SIZE: u8 = 64;

    pub fn digest_size(&self) -> u8 {
        match self {
            CryptoAlgo::Ripemd160 => 20,
            CryptoAlgo::Sha1 => 20,
            CryptoAlgo::Sha256 => 32,
            CryptoAlgo::Sha384 => 48,
            CryptoAlgo::Sha512 => 64,
            CryptoAlgo::Whirlpool => 64,
        }
    }

    // Parses a configuration keyword.
    pub fn from_keyword(keyword: &str) -> Option<CryptoAlgo> {
        match keyword {
            "ripemd160" => Some(CryptoAlgo::Ripemd160),
            "sha1" => Some(CryptoAlgo::Sha1),
            "sha256" => Some(CryptoAlgo::Sha256),
            "sha384" => Some(CryptoAlgo::Sha384),
            "sha512" => Some(CryptoAlgo::Sha512),
            "whirlpool" => Some(CryptoAlgo::Whirlpool),
            _ => None,
        }
    }
}

impl std::fmt::Display for CryptoAlgo {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            CryptoAlgo::Ripemd160 => write!(f, "ripemd160"),
            CryptoAlgo::Sha1 => write!(f, "sha1"),
            CryptoAlgo::Sha256 => write!(f, "sha256"),
            CryptoAlgo::Sha384 => write!(f, "sha384"),
            CryptoAlgo::Sha512 => write!(f, "sha512"),
            CryptoAlgo::Whirlpool => write!(f, "whirlpool"),
        }
    }
}

// ===== impl HmacError =====

impl std::fmt::Display for HmacError {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(f, "HMAC backend rejected the key")
    }
}

impl std::error::Error for HmacError {}

// ===== helper functions =====

fn hmac_digest<H>(data: &[u8], key: &[u8]) -> Result<Vec<u8>, HmacError>
where
    H: CoreProxy,
    H::Core: HashMarker
        + UpdateCore
        + FixedOutputCore
        + BufferKindUser<BufferKind = Eager>
        + Default
        + Clone,
    <H::Core as BlockSizeUser>::BlockSize: IsLess<U256>,
    Le<<H::Core as BlockSizeUser>::BlockSize, U256>: NonZero,
{
    // Compute the message digest.
    let mut mac = Hmac::<H>::new_from_slice(key).map_err(|_| HmacError)?;
    mac.update(data);
    let digest = mac.finalize();
    Ok(digest.into_bytes().to_vec())
}

// ===== global functions =====

pub fn message_digest(
    data: &[u8],
    algo: CryptoAlgo,
    key: &[u8],
) -> Result<Vec<u8>, HmacError> {
    match algo {
        CryptoAlgo::Ripemd160 => hmac_digest::<Ripemd160>(data, key),
        CryptoAlgo::Sha1 => hmac_digest::<Sha1>(data, key),
        CryptoAlgo::Sha256 => hmac_digest::<Sha256>(data, key),
        CryptoAlgo::Sha384 => hmac_digest::<Sha384>(data, key),
        CryptoAlgo::Sha512 => hmac_digest::<Sha512>(data, key),
        CryptoAlgo::Whirlpool => hmac_digest::<Whirlpool>(data, key),
    }
}
