// Copyright 2026 The olmcore developers
//
// Licensed under the Apache License, Version 2.0 (the "License");
// you may not use this file except in compliance with the License.
// You may obtain a copy of the License at
//
//     http://www.apache.org/licenses/LICENSE-2.0
//
// Unless required by applicable law or agreed to in writing, software
// distributed under the License is distributed on an "AS IS" BASIS,
// WITHOUT WARRANTIES OR CONDITIONS OF ANY KIND, either express or implied.
// See the License for the specific language governing permissions and
// limitations under the License.

//! The symmetric half of the ratchets, a one-way chain of HMAC-SHA256 steps.

use std::fmt;

use zeroize::{Zeroize, ZeroizeOnDrop};

use crate::primitives::{cipher::Cipher, hmac_sha256};

const MESSAGE_KEY_SEED: &[u8; 1] = b"\x01";
const ADVANCEMENT_SEED: &[u8; 1] = b"\x02";

/// A single, one-way, derivation step: `HMAC-SHA256(key, seed)`.
pub fn hmac_derive(key: &[u8], seed: &[u8]) -> Box<[u8; 32]> {
    let mut output = hmac_sha256(key, seed);
    let derived = Box::new(output);

    output.zeroize();

    derived
}

/// Advance a chain key by one step.
///
/// Returns the next chain key, whose index is one higher, and the message key
/// belonging to the index of the given chain key.
pub fn advance(chain_key: &ChainKey) -> (ChainKey, MessageKey) {
    let message_key = MessageKey {
        key: hmac_derive(chain_key.key.as_slice(), MESSAGE_KEY_SEED),
        index: chain_key.index,
    };
    let next = ChainKey {
        key: hmac_derive(chain_key.key.as_slice(), ADVANCEMENT_SEED),
        index: chain_key.index.wrapping_add(1),
    };

    (next, message_key)
}

/// A chain key, the secret state of one direction of a ratchet.
#[derive(Clone, Zeroize, ZeroizeOnDrop)]
pub struct ChainKey {
    key: Box<[u8; 32]>,
    index: u32,
}

impl ChainKey {
    /// Create a chain key at index zero.
    pub fn new(key: Box<[u8; 32]>) -> Self {
        Self { key, index: 0 }
    }

    /// Create a chain key at the given index.
    pub fn from_parts(key: Box<[u8; 32]>, index: u32) -> Self {
        Self { key, index }
    }

    /// The index of the next message key this chain key will produce.
    pub fn index(&self) -> u32 {
        self.index
    }

    /// The raw bytes of the chain key.
    pub fn as_bytes(&self) -> &[u8; 32] {
        &self.key
    }

    /// Produce the message key for the current index and move the chain key
    /// one step forward.
    pub fn next_message_key(&mut self) -> MessageKey {
        let (next, message_key) = advance(self);
        *self = next;

        message_key
    }

    /// Move the chain key forward until its index is `index`.
    ///
    /// The message keys of the skipped indices are never derived. Does
    /// nothing if the chain key is already at or past `index`.
    pub fn advance_to(&mut self, index: u32) {
        while self.index < index {
            let next = hmac_derive(self.key.as_slice(), ADVANCEMENT_SEED);
            self.key.copy_from_slice(next.as_slice());
            self.index += 1;
        }
    }
}

impl fmt::Debug for ChainKey {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("ChainKey").field("index", &self.index).finish_non_exhaustive()
    }
}

/// A key used to encrypt or decrypt exactly one message.
#[derive(Zeroize, ZeroizeOnDrop)]
pub struct MessageKey {
    key: Box<[u8; 32]>,
    index: u32,
}

impl MessageKey {
    /// The index of the chain key this message key was derived from.
    pub fn index(&self) -> u32 {
        self.index
    }

    /// The raw bytes of the message key.
    #[cfg(any(test, feature = "low-level-api"))]
    pub fn as_bytes(&self) -> &[u8; 32] {
        &self.key
    }

    /// The cipher, using the Olm key derivation, belonging to this message
    /// key.
    pub fn cipher(&self) -> Cipher {
        Cipher::new(&self.key)
    }
}

impl fmt::Debug for MessageKey {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("MessageKey").field("index", &self.index).finish_non_exhaustive()
    }
}

#[cfg(test)]
mod test {
    use proptest::prelude::*;

    use super::{ChainKey, advance, hmac_derive};
    use crate::primitives::hmac_sha256;

    fn chain_key() -> ChainKey {
        ChainKey::new(Box::new(*b"aaaaaaaaaaaaaaaaaaaaaaaaaaaaaaaa"))
    }

    #[test]
    fn advancing_chain_key_increments_index() {
        let mut key = chain_key();
        assert_eq!(key.index(), 0);

        let message_key = key.next_message_key();

        assert_eq!(message_key.index(), 0);
        assert_eq!(key.index(), 1);
    }

    #[test]
    fn advance_is_pure() {
        let key = chain_key();

        let (first_next, first_message_key) = advance(&key);
        let (second_next, second_message_key) = advance(&key);

        assert_eq!(key.index(), 0);
        assert_eq!(first_next.as_bytes(), second_next.as_bytes());
        assert_eq!(first_message_key.as_bytes(), second_message_key.as_bytes());
    }

    #[test]
    fn derivation_uses_distinct_seeds() {
        let key = chain_key();
        let (next, message_key) = advance(&key);

        assert_eq!(message_key.as_bytes(), &hmac_sha256(key.as_bytes(), &[0x01]));
        assert_eq!(next.as_bytes(), &hmac_sha256(key.as_bytes(), &[0x02]));
        assert_ne!(next.as_bytes(), message_key.as_bytes());
        assert_eq!(*hmac_derive(key.as_bytes(), &[0x02]), *next.as_bytes());
    }

    #[test]
    fn advance_to_never_rewinds() {
        let mut key = chain_key();
        key.advance_to(10);
        let bytes = *key.as_bytes();

        key.advance_to(5);

        assert_eq!(key.index(), 10);
        assert_eq!(key.as_bytes(), &bytes);
    }

    proptest! {
        #[test]
        fn advance_to_matches_stepping(steps in 0u32..300) {
            let mut stepped = chain_key();
            for _ in 0..steps {
                stepped.next_message_key();
            }

            let mut jumped = chain_key();
            jumped.advance_to(steps);

            prop_assert_eq!(stepped.index(), jumped.index());
            prop_assert_eq!(stepped.as_bytes(), jumped.as_bytes());
        }
    }
}
