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

use std::io::Read;

use matrix_pickle::{Decode, Encode, EncodeError};
use tracing::trace;
use zeroize::{Zeroize, ZeroizeOnDrop};

use super::{
    message::MegolmMessage,
    ratchet::{Ratchet, RatchetPickle},
    session_keys::SessionKey,
};
use crate::{
    Ed25519Keypair, Ed25519PublicKey, EntropyError, PickleError, RandomSource,
    pickle::{Picklable, pickle, unpickle},
};

/// A Megolm group session represents a single sending participant in an
/// encrypted group communication context containing multiple receiving parties.
///
/// A group session consists of a ratchet, used for encryption, and an Ed25519
/// signing key pair, used for authenticity.
///
/// A group session containing the signing key pair is also known as an
/// "outbound" group session. We differentiate this from an *inbound* group
/// session where this key pair has been removed and which can be used solely
/// for receipt and decryption of messages.
///
/// The [`SessionKey`] needed to create an inbound group session is typically
/// sent by the outbound group session owner to each of the receiving parties
/// via a secure peer-to-peer channel (e.g. an Olm channel).
pub struct GroupSession {
    ratchet: Ratchet,
    signing_key: Ed25519Keypair,
}

impl std::fmt::Debug for GroupSession {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("GroupSession")
            .field("session_id", &self.session_id())
            .field("message_index", &self.message_index())
            .finish_non_exhaustive()
    }
}

impl GroupSession {
    /// Construct a new group session, with a random ratchet state and signing
    /// key pair.
    pub fn new(rng: &mut impl RandomSource) -> Result<Self, EntropyError> {
        let ratchet = Ratchet::new(rng)?;
        let signing_key = Ed25519Keypair::new(rng)?;

        Ok(Self { ratchet, signing_key })
    }

    /// Returns the globally unique session ID, in base64-encoded form.
    ///
    /// A session ID is the public part of the Ed25519 key pair associated with
    /// the group session. Due to the construction, every session ID is
    /// (probabilistically) globally unique.
    pub fn session_id(&self) -> String {
        self.signing_key.public_key().to_base64()
    }

    /// The public key every message of this session is signed with.
    pub fn signing_key(&self) -> Ed25519PublicKey {
        self.signing_key.public_key()
    }

    /// Return the current message index.
    ///
    /// The message index is incremented each time a message is encrypted with
    /// the group session.
    pub fn message_index(&self) -> u32 {
        self.ratchet.index()
    }

    /// Encrypt the `plaintext` with the group session.
    ///
    /// The resulting ciphertext is MAC-ed, then signed with the group session's
    /// Ed25519 key pair. The ratchet moves forward afterwards, so every
    /// message uses a different key.
    pub fn encrypt(&mut self, plaintext: impl AsRef<[u8]>) -> MegolmMessage {
        let cipher = self.ratchet.cipher();
        let message = MegolmMessage::encrypt(
            self.message_index(),
            &cipher,
            &self.signing_key,
            plaintext.as_ref(),
        );

        self.ratchet.advance();

        trace!(
            session_id = %self.session_id(),
            message_index = message.message_index(),
            "Encrypted a group message"
        );

        message
    }

    /// Export the group session into a session key.
    ///
    /// The session key contains the key version constant, the current message
    /// index, the ratchet state and the *public* part of the signing key pair.
    /// It is signed by the signing key pair for authenticity.
    ///
    /// The session key is in a portable format, suitable for sending over the
    /// network. It is typically sent to other group participants so that they
    /// can reconstruct an inbound group session in order to decrypt messages
    /// sent by this group session.
    pub fn session_key(&self) -> SessionKey {
        SessionKey::new(&self.ratchet, &self.signing_key)
    }

    pub(super) fn ratchet(&self) -> &Ratchet {
        &self.ratchet
    }

    /// Store the group session as an encrypted pickle, see the
    /// [`crate::pickle`] module for the format.
    pub fn pickle(&self, pickle_key: &[u8]) -> Result<String, PickleError> {
        pickle(self, pickle_key)
    }

    /// Restore a [`GroupSession`] from a pickle created by
    /// [`GroupSession::pickle`].
    pub fn from_pickle(pickle: &str, pickle_key: &[u8]) -> Result<Self, PickleError> {
        unpickle(pickle, pickle_key)
    }
}

#[derive(Zeroize, ZeroizeOnDrop, Encode, Decode)]
struct GroupSessionPickle {
    ratchet: RatchetPickle,
    secret_signing_key: Box<[u8; 32]>,
    public_signing_key: [u8; 32],
}

impl Picklable for GroupSession {
    const PICKLE_VERSION: u32 = 1;

    fn serialize_fields(&self, writer: &mut Vec<u8>) -> Result<(), EncodeError> {
        let pickle = GroupSessionPickle {
            ratchet: RatchetPickle::from(&self.ratchet),
            secret_signing_key: self.signing_key.secret_bytes(),
            public_signing_key: *self.signing_key.public_key().as_bytes(),
        };

        pickle.encode(writer)?;

        Ok(())
    }

    fn deserialize_fields(_version: u32, reader: &mut impl Read) -> Result<Self, PickleError> {
        let pickle = GroupSessionPickle::decode(reader)?;
        let signing_key = Ed25519Keypair::from_secret_bytes(&pickle.secret_signing_key);

        if signing_key.public_key().as_bytes() != &pickle.public_signing_key {
            Err(PickleError::InvalidSession("the signing key doesn't match its public part"))
        } else {
            Ok(Self { ratchet: Ratchet::from(&pickle.ratchet), signing_key })
        }
    }
}

#[cfg(test)]
mod test {
    use anyhow::Result;
    use rand::thread_rng;

    use super::GroupSession;
    use crate::FixedBytes;

    #[test]
    fn message_index_advances() -> Result<()> {
        let mut session = GroupSession::new(&mut thread_rng())?;

        assert_eq!(session.message_index(), 0);
        assert_eq!(session.encrypt("first").message_index(), 0);
        assert_eq!(session.encrypt("second").message_index(), 1);
        assert_eq!(session.message_index(), 2);
        assert_eq!(session.session_key().message_index(), 2);

        Ok(())
    }

    #[test]
    fn session_id_is_the_signing_key() -> Result<()> {
        let session = GroupSession::new(&mut thread_rng())?;

        assert_eq!(session.session_id(), session.signing_key().to_base64());
        assert_eq!(session.session_key().signing_key(), session.signing_key());

        Ok(())
    }

    #[test]
    fn entropy_is_required() {
        let mut rng = FixedBytes::new(&[0u8; 128]);

        GroupSession::new(&mut rng).expect_err("The signing key needs 32 more bytes");
    }

    #[test]
    fn pickle_cycle() -> Result<()> {
        let pickle_key = [3u8; 32];
        let mut session = GroupSession::new(&mut thread_rng())?;
        session.encrypt("advance");

        let mut restored = GroupSession::from_pickle(&session.pickle(&pickle_key)?, &pickle_key)?;

        assert_eq!(restored.session_id(), session.session_id());
        assert_eq!(restored.message_index(), 1);
        assert_eq!(restored.encrypt("same"), session.encrypt("same"));

        Ok(())
    }
}
