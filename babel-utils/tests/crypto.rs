//
// Copyright (c) The Holo Core Contributors
//
// SPDX-License-Identifier: MIT
//

use babel_utils::crypto::{CryptoAlgo, message_digest};

//
// Helper functions.
//

fn test_message_digest(
    algo: CryptoAlgo,
    key: &[u8],
    data: &[u8],
    digest_expected: &[u8],
) {
    let digest_actual = message_digest(data, algo, key).unwrap();
    assert_eq!(digest_expected, digest_actual);
}

//
// Tests.
//

#[test]
fn test_digest_sizes() {
    assert_eq!(CryptoAlgo::Ripemd160.digest_size(), 20);
    assert_eq!(CryptoAlgo::Sha1.digest_size(), 20);
    assert_eq!(CryptoAlgo::Sha256.digest_size(), 32);
    assert_eq!(CryptoAlgo::Sha384.digest_size(), 48);
    assert_eq!(CryptoAlgo::Sha512.digest_size(), 64);
    assert_eq!(CryptoAlgo::Whirlpool.digest_size(), 64);
}

#[test]
fn test_digest_lengths_match_algo() {
    let key = b"secret";
    let data = b"payload";
    for algo in [
        CryptoAlgo::Ripemd160,
        CryptoAlgo::Sha1,
        CryptoAlgo::Sha256,
        CryptoAlgo::Sha384,
        CryptoAlgo::Sha512,
        CryptoAlgo::Whirlpool,
    ] {
        let digest = message_digest(data, algo, key).unwrap();
        assert_eq!(digest.len(), algo.digest_size() as usize);
    }
}

// RFC 2202, test case 1.
#[test]
fn test_hmac_sha1_rfc2202_1() {
    test_message_digest(
        CryptoAlgo::Sha1,
        &[0x0b; 20],
        b"Hi There",
        &[
            0xb6, 0x17, 0x31, 0x86, 0x55, 0x05, 0x72, 0x64, 0xe2, 0x8b,
            0xc0, 0xb6, 0xfb, 0x37, 0x8c, 0x8e, 0xf1, 0x46, 0xbe, 0x00,
        ],
    );
}

// RFC 4231, test case 1.
#[test]
fn test_hmac_sha256_rfc4231_1() {
    test_message_digest(
        CryptoAlgo::Sha256,
        &[0x0b; 20],
        b"Hi There",
        &[
            0xb0, 0x34, 0x4c, 0x61, 0xd8, 0xdb, 0x38, 0x53, 0x5c, 0xa8,
            0xaf, 0xce, 0xaf, 0x0b, 0xf1, 0x2b, 0x88, 0x1d, 0xc2, 0x00,
            0xc9, 0x83, 0x3d, 0xa7, 0x26, 0xe9, 0x37, 0x6c, 0x2e, 0x32,
            0xcf, 0xf7,
        ],
    );
}

// RFC 4231, test case 2.
#[test]
fn test_hmac_sha256_rfc4231_2() {
    test_message_digest(
        CryptoAlgo::Sha256,
        b"Jefe",
        b"what do ya want for nothing?",
        &[
            0x5b, 0xdc, 0xc1, 0x46, 0xbf, 0x60, 0x75, 0x4e, 0x6a, 0x04,
            0x24, 0x26, 0x08, 0x95, 0x75, 0xc7, 0x5a, 0x00, 0x3f, 0x08,
            0x9d, 0x27, 0x39, 0x83, 0x9d, 0xec, 0x58, 0xb9, 0x64, 0xec,
            0x38, 0x43,
        ],
    );
}

// RFC 4231, test case 1.
#[test]
fn test_hmac_sha512_rfc4231_1() {
    test_message_digest(
        CryptoAlgo::Sha512,
        &[0x0b; 20],
        b"Hi There",
        &[
            0x87, 0xaa, 0x7c, 0xde, 0xa5, 0xef, 0x61, 0x9d, 0x4f, 0xf0,
            0xb4, 0x24, 0x1a, 0x1d, 0x6c, 0xb0, 0x23, 0x79, 0xf4, 0xe2,
            0xce, 0x4e, 0xc2, 0x78, 0x7a, 0xd0, 0xb3, 0x05, 0x45, 0xe1,
            0x7c, 0xde, 0xda, 0xa8, 0x33, 0xb7, 0xd6, 0xb8, 0xa7, 0x02,
            0x03, 0x8b, 0x27, 0x4e, 0xae, 0xa3, 0xf4, 0xe4, 0xbe, 0x9d,
            0x91, 0x4e, 0xeb, 0x61, 0xf1, 0x70, 0x2e, 0x69, 0x6c, 0x20,
            0x3a, 0x12, 0x68, 0x54,
        ],
    );
}

#[test]
fn test_algo_keywords_roundtrip() {
    for algo in [
        CryptoAlgo::Ripemd160,
        CryptoAlgo::Sha1,
        CryptoAlgo::Sha256,
        CryptoAlgo::Sha384,
        CryptoAlgo::Sha512,
        CryptoAlgo::Whirlpool,
    ] {
        assert_eq!(CryptoAlgo::from_keyword(&algo.to_string()), Some(algo));
    }
    assert_eq!(CryptoAlgo::from_keyword("md5"), None);
}
