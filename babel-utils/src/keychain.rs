//
// Copyright (c) The Holo Core Contributors
//
// SPDX-License-Identifier: MIT
//

use std::collections::BTreeMap;
use std::sync::Arc;

use chrono::{DateTime, FixedOffset, Utc};
use derive_new::new;
use serde::{Deserialize, Serialize};

// Type aliases.
pub type Keychains = BTreeMap<String, Arc<Keychain>>;

// Authentication key-chain.
#[derive(Clone, Debug, new)]
#[derive(Deserialize, Serialize)]
pub struct Keychain {
    // Name of the key-chain.
    pub name: String,
    // Timestamp of the most recent update to the key-chain.
    #[new(default)]
    pub last_modified: Option<DateTime<Utc>>,
    // List of configured keys, keyed by the unique key index.
    #[new(default)]
    pub keys: BTreeMap<u64, KeychainKey>,
}

// Single key in key-chain.
#[derive(Clone, Debug, new)]
#[derive(Deserialize, Serialize)]
pub struct KeychainKey {
    // Key's data.
    pub data: Key,
    // The key's send lifetime.
    #[new(default)]
    pub send_lifetime: KeyLifetime,
    // The key's accept lifetime.
    #[new(default)]
    pub accept_lifetime: KeyLifetime,
}

// Authentication key.
//
// The hash algorithm is not a property of the key: it comes from the
// security association naming this key-chain.
#[derive(Clone, Debug, new)]
#[derive(Deserialize, Serialize)]
pub struct Key {
    // Numeric value uniquely identifying the key.
    pub id: u64,
    // The key string.
    pub string: Vec<u8>,
}

// Key lifetime.
#[derive(Clone, Debug, Default)]
#[derive(Deserialize, Serialize)]
pub struct KeyLifetime {
    // Optional start time.
    pub start: Option<DateTime<FixedOffset>>,
    // Optional end time (`None` means infinite).
    pub end: Option<DateTime<FixedOffset>>,
}

// ===== impl Keychain =====

impl Keychain {
    // Returns the keys usable for sending at the given instant, in key
    // index order.
    pub fn keys_valid_send(
        &self,
        now: DateTime<Utc>,
    ) -> impl Iterator<Item = &Key> {
        self.keys
            .values()
            .filter(move |key| key.send_lifetime.is_active(now))
            .map(|key| &key.data)
    }

    // Returns the keys usable for accepting at the given instant, in key
    // index order.
    pub fn keys_valid_accept(
        &self,
        now: DateTime<Utc>,
    ) -> impl Iterator<Item = &Key> {
        self.keys
            .values()
            .filter(move |key| key.accept_lifetime.is_active(now))
            .map(|key| &key.data)
    }
}

// ===== impl KeyLifetime =====

impl KeyLifetime {
    // Checks if the key lifetime is active at the given instant.
    pub fn is_active(&self, now: DateTime<Utc>) -> bool {
        if let Some(start) = self.start
            && now < start
        {
            return false;
        }
        if let Some(end) = self.end
            && now > end
        {
            return false;
        }

        true
    }
}
