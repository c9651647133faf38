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

use std::fmt;

use tracing::trace;

use super::{receiver_chain::ReceiverChain, root_key::RootKey};
use crate::{
    Curve25519Keypair, Curve25519PublicKey, EntropyError, RandomSource,
    chain::{ChainKey, MessageKey},
};

/// The sender side of a double-ratchet implementation.
///
/// While we are encrypting messages, we are in the "active" state. Here we need
/// to keep track of the latest chain key `C`<sub>`i`,`j`</sub> (so that we can
/// advance to the next one), and also the current root key `R`<sub>`i`</sub>
/// and our most recent ratchet key `T`<sub>`i`</sub> (so that we can calculate
/// the *next* root key).
///
/// Once we receive a message with a new ratchet key, we transition to the
/// "inactive" state. All we need then is the root key `R`<sub>`i`</sub> and
/// the public part of the other side's ratchet key `T`<sub>`i`</sub>. Our own
/// next ratchet key is only generated once we encrypt again.
#[derive(Clone)]
pub(super) enum DoubleRatchet {
    Active(ActiveDoubleRatchet),
    Inactive(InactiveDoubleRatchet),
}

impl DoubleRatchet {
    pub fn active(root_key: RootKey, chain_key: ChainKey, ratchet_key: Curve25519Keypair) -> Self {
        Self::Active(ActiveDoubleRatchet { root_key, ratchet_key, chain_key })
    }

    pub fn inactive(root_key: RootKey, their_ratchet_key: Curve25519PublicKey) -> Self {
        Self::Inactive(InactiveDoubleRatchet { root_key, their_ratchet_key })
    }

    /// The message key for the next message we send, together with the
    /// public ratchet key the message needs to carry.
    ///
    /// Performs the pending Diffie-Hellman step, consuming randomness, if the
    /// ratchet is inactive.
    pub fn next_message_key(
        &mut self,
        rng: &mut impl RandomSource,
    ) -> Result<(Curve25519PublicKey, MessageKey), EntropyError> {
        match self {
            DoubleRatchet::Active(ratchet) => Ok(ratchet.next_message_key()),
            DoubleRatchet::Inactive(ratchet) => {
                let mut ratchet = ratchet.activate(rng)?;
                let message_key = ratchet.next_message_key();

                *self = DoubleRatchet::Active(ratchet);

                Ok(message_key)
            }
        }
    }

    /// Create the receiving chain for a new ratchet key of the other side,
    /// and the inactive sending ratchet that replaces this one once a message
    /// on that chain has been decrypted.
    ///
    /// Returns `None` if the ratchet is already inactive. The other side can
    /// only move to a new ratchet key after it has seen ours, so a second new
    /// key before we sent anything can't be legitimate.
    pub fn advance(
        &self,
        their_ratchet_key: Curve25519PublicKey,
    ) -> Option<(DoubleRatchet, ReceiverChain)> {
        match self {
            DoubleRatchet::Active(ratchet) => {
                let (root_key, chain_key) =
                    ratchet.root_key.advance(ratchet.ratchet_key.secret_key(), &their_ratchet_key);

                Some((
                    DoubleRatchet::inactive(root_key, their_ratchet_key),
                    ReceiverChain::new(their_ratchet_key, chain_key),
                ))
            }
            DoubleRatchet::Inactive(_) => None,
        }
    }

    pub fn root_key(&self) -> &RootKey {
        match self {
            DoubleRatchet::Active(ratchet) => &ratchet.root_key,
            DoubleRatchet::Inactive(ratchet) => &ratchet.root_key,
        }
    }
}

impl fmt::Debug for DoubleRatchet {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            DoubleRatchet::Active(ratchet) => f
                .debug_struct("Active")
                .field("ratchet_key", &ratchet.ratchet_key.public_key())
                .field("chain_index", &ratchet.chain_key.index())
                .finish_non_exhaustive(),
            DoubleRatchet::Inactive(ratchet) => f
                .debug_struct("Inactive")
                .field("their_ratchet_key", &ratchet.their_ratchet_key)
                .finish_non_exhaustive(),
        }
    }
}

/// State of the sender-side ratchet while we are encrypting our own messages
/// and haven't yet received a message created after we started this chain.
#[derive(Clone)]
pub(super) struct ActiveDoubleRatchet {
    pub(super) root_key: RootKey,
    pub(super) ratchet_key: Curve25519Keypair,
    pub(super) chain_key: ChainKey,
}

impl ActiveDoubleRatchet {
    fn next_message_key(&mut self) -> (Curve25519PublicKey, MessageKey) {
        (self.ratchet_key.public_key(), self.chain_key.next_message_key())
    }
}

/// State of the sender-side ratchet after we received a new ratchet key from
/// the other side, and have not yet created a new chain of our own.
#[derive(Clone)]
pub(super) struct InactiveDoubleRatchet {
    pub(super) root_key: RootKey,
    pub(super) their_ratchet_key: Curve25519PublicKey,
}

impl InactiveDoubleRatchet {
    fn activate(&self, rng: &mut impl RandomSource) -> Result<ActiveDoubleRatchet, EntropyError> {
        let ratchet_key = Curve25519Keypair::new(rng)?;
        let (root_key, chain_key) =
            self.root_key.advance(ratchet_key.secret_key(), &self.their_ratchet_key);

        trace!(
            ratchet_key = ?ratchet_key.public_key(),
            their_ratchet_key = ?self.their_ratchet_key,
            "Created a new sending chain"
        );

        Ok(ActiveDoubleRatchet { root_key, ratchet_key, chain_key })
    }
}
