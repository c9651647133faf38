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

use std::fmt::Debug;

use arrayvec::ArrayVec;
use tracing::debug;

use super::DecryptionError;
use crate::{Curve25519PublicKey, chain::ChainKey, olm::messages::Message};

/// The maximum number of receiving chains a session keeps around.
pub(super) const MAX_RECEIVING_CHAINS: usize = 5;

/// The receiver side data on a single chain in the double ratchet.
///
/// Contains the data needed to decrypt a message sent to a given chain.
#[derive(Clone)]
pub(super) struct ReceiverChain {
    /// The sender's ratchet key `T`<sub>`i`</sub> for this chain.
    ///
    /// We store this so that we can identify which chain to use to decrypt a
    /// given message.
    ratchet_key: Curve25519PublicKey,

    /// The chain key `C`<sub>`i`,`j`</sub>.
    ///
    /// Its index is the index of the next message we expect on this chain.
    /// Message keys of messages that arrive out of order are not kept, so
    /// the chain key only ever moves forward.
    chain_key: ChainKey,
}

impl Debug for ReceiverChain {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("ReceiverChain")
            .field("ratchet_key", &self.ratchet_key)
            .field("chain_index", &self.chain_key.index())
            .finish()
    }
}

impl ReceiverChain {
    pub fn new(ratchet_key: Curve25519PublicKey, chain_key: ChainKey) -> Self {
        Self { ratchet_key, chain_key }
    }

    pub fn ratchet_key(&self) -> Curve25519PublicKey {
        self.ratchet_key
    }

    pub fn chain_key(&self) -> &ChainKey {
        &self.chain_key
    }

    pub fn belongs_to(&self, ratchet_key: &Curve25519PublicKey) -> bool {
        &self.ratchet_key == ratchet_key
    }

    /// Decrypt a message sent on this chain.
    ///
    /// The chain key is advanced on a copy and only replaces the current one
    /// once the MAC and the padding of the message have been checked.
    pub fn decrypt(
        &mut self,
        message: &Message,
        max_message_gap: u32,
    ) -> Result<Vec<u8>, DecryptionError> {
        let message_index = message.chain_index();
        let chain_index = self.chain_key.index();

        if message_index < chain_index {
            return Err(DecryptionError::MessageIndexTooLow { chain_index, message_index });
        }

        let gap = message_index - chain_index;

        if gap > max_message_gap {
            return Err(DecryptionError::TooBigMessageGap(gap, max_message_gap));
        }

        let mut chain_key = self.chain_key.clone();
        chain_key.advance_to(message_index);

        let message_key = chain_key.next_message_key();
        let cipher = message_key.cipher();

        cipher.verify_truncated_mac(&message.to_mac_bytes(), message.mac())?;
        let plaintext = cipher.decrypt(message.ciphertext())?;

        self.chain_key = chain_key;

        Ok(plaintext)
    }
}

/// The receiving chains of a session, ordered from the oldest to the newest.
#[derive(Clone, Debug, Default)]
pub(super) struct ChainStore {
    inner: ArrayVec<ReceiverChain, MAX_RECEIVING_CHAINS>,
}

impl ChainStore {
    pub fn new() -> Self {
        Self { inner: ArrayVec::new() }
    }

    /// Add a new chain, evicting the oldest one if the store is full.
    pub fn push(&mut self, chain: ReceiverChain) {
        if self.inner.is_full() {
            let evicted = self.inner.pop_at(0);

            debug!(
                evicted_ratchet_key = ?evicted.as_ref().map(ReceiverChain::ratchet_key),
                "Dropped the oldest receiving chain"
            );
        }

        self.inner.push(chain)
    }

    pub fn is_empty(&self) -> bool {
        self.inner.is_empty()
    }

    #[cfg(test)]
    pub fn len(&self) -> usize {
        self.inner.len()
    }

    pub fn newest(&self) -> Option<&ReceiverChain> {
        self.inner.last()
    }

    pub fn find_mut(&mut self, ratchet_key: &Curve25519PublicKey) -> Option<&mut ReceiverChain> {
        self.inner.iter_mut().rev().find(|c| c.belongs_to(ratchet_key))
    }

    pub fn iter(&self) -> impl Iterator<Item = &ReceiverChain> {
        self.inner.iter()
    }
}
