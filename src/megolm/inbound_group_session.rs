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

use aes::cipher::block_padding::UnpadError;
use hmac::digest::MacError;
use matrix_pickle::{Decode, Encode, EncodeError};
use thiserror::Error;
use tracing::{debug, trace};
use zeroize::{Zeroize, ZeroizeOnDrop};

use super::{
    GroupSession,
    message::MegolmMessage,
    ratchet::{Ratchet, RatchetPickle},
    session_keys::{ExportedSessionKey, SessionKey},
};
use crate::{
    Ed25519PublicKey, ErrorKind, PickleError, SignatureError,
    pickle::{Picklable, pickle, unpickle},
};

/// Error type describing the ways a Megolm message can fail to be decrypted.
#[derive(Debug, Error)]
pub enum DecryptionError {
    /// The signature of the message didn't verify against the signing key of
    /// the session.
    #[error("The signature of the decrypted message is invalid: {0}")]
    Signature(#[from] SignatureError),
    /// The MAC of the message didn't match.
    #[error("Failed decrypting Megolm message, invalid MAC: {0}")]
    InvalidMac(#[from] MacError),
    /// The decrypted message had invalid padding.
    #[error("Failed decrypting Megolm message, invalid padding: {0}")]
    InvalidPadding(#[from] UnpadError),
    /// The message was encrypted before the point the session was shared
    /// with us.
    #[error(
        "The message was encrypted using an unknown message index, \
         first known index {0}, index of the message {1}"
    )]
    UnknownMessageIndex(u32, u32),
}

impl DecryptionError {
    /// The category of this error.
    pub fn kind(&self) -> ErrorKind {
        match self {
            DecryptionError::Signature(_) => ErrorKind::BadSignature,
            DecryptionError::InvalidMac(_) => ErrorKind::BadMac,
            DecryptionError::InvalidPadding(_) => ErrorKind::BadMessageFormat,
            DecryptionError::UnknownMessageIndex(..) => ErrorKind::UnknownMessageIndex,
        }
    }
}

/// The result of a successful [`InboundGroupSession::decrypt`] call.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct DecryptedMessage {
    /// The decrypted plaintext.
    pub plaintext: Vec<u8>,
    /// The index of the message in the group session.
    pub message_index: u32,
}

/// The ratchet state needed for a given message index.
enum FoundRatchet<'a> {
    /// One of the two ratchets the session keeps is already at the index.
    Cached(&'a Ratchet),
    /// A copy of a stored ratchet, moved forward to the index.
    Advanced(Ratchet),
}

impl FoundRatchet<'_> {
    fn ratchet(&self) -> &Ratchet {
        match self {
            FoundRatchet::Cached(r) => r,
            FoundRatchet::Advanced(r) => r,
        }
    }
}

/// The receiving side of a Megolm [`GroupSession`].
///
/// An inbound group session can decrypt, and verify the signature of, every
/// message the sender encrypts from the index at which the session was shared
/// with us onwards. It never learns the private part of the signing key, so it
/// can't create messages itself.
///
/// Two ratchets are kept: the initial ratchet at the first known index, from
/// which any later ratchet state can be derived, and the latest ratchet, which
/// caches the state of the newest message we decrypted so that the common case
/// of in-order messages stays cheap.
pub struct InboundGroupSession {
    initial_ratchet: Ratchet,
    latest_ratchet: Ratchet,
    signing_key: Ed25519PublicKey,
    signing_key_verified: bool,
}

impl std::fmt::Debug for InboundGroupSession {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("InboundGroupSession")
            .field("session_id", &self.session_id())
            .field("first_known_index", &self.first_known_index())
            .field("signing_key_verified", &self.signing_key_verified)
            .finish_non_exhaustive()
    }
}

impl InboundGroupSession {
    /// Create a new inbound group session from a [`SessionKey`] the sender
    /// shared with us.
    ///
    /// The signature of the session key was checked when it was decoded, so
    /// the signing key of the session is considered verified.
    pub fn new(session_key: &SessionKey) -> Self {
        let ratchet = Ratchet::from_bytes(
            session_key.session_key.ratchet.clone(),
            session_key.session_key.ratchet_index,
        );

        Self {
            initial_ratchet: ratchet.clone(),
            latest_ratchet: ratchet,
            signing_key: session_key.session_key.signing_key,
            signing_key_verified: true,
        }
    }

    /// Create a new inbound group session from an [`ExportedSessionKey`].
    ///
    /// Exported keys aren't signed, the signing key is only as trustworthy as
    /// whoever handed us the export.
    pub fn import(exported_session_key: &ExportedSessionKey) -> Self {
        let ratchet = Ratchet::from_bytes(
            exported_session_key.ratchet.clone(),
            exported_session_key.ratchet_index,
        );

        Self {
            initial_ratchet: ratchet.clone(),
            latest_ratchet: ratchet,
            signing_key: exported_session_key.signing_key,
            signing_key_verified: false,
        }
    }

    /// Returns the globally unique session ID, in base64-encoded form.
    ///
    /// This is the same ID the matching [`GroupSession`] reports.
    pub fn session_id(&self) -> String {
        self.signing_key.to_base64()
    }

    /// The public key the messages of this session are signed with.
    pub fn signing_key(&self) -> Ed25519PublicKey {
        self.signing_key
    }

    /// Was the signing key of this session vouched for by a signature of the
    /// sender?
    ///
    /// This is the case for sessions created from a [`SessionKey`], but not
    /// for sessions imported from an [`ExportedSessionKey`].
    pub fn signing_key_verified(&self) -> bool {
        self.signing_key_verified
    }

    /// The lowest message index this session can decrypt.
    pub fn first_known_index(&self) -> u32 {
        self.initial_ratchet.index()
    }

    /// Permanently advance the session to the given index.
    ///
    /// This will remove the ability to decrypt messages that were encrypted
    /// with a lower message index than what is given as the argument.
    ///
    /// Returns true if the ratchet has been advanced, false if the ratchet was
    /// already advanced past the given index.
    pub fn advance_to(&mut self, index: u32) -> bool {
        if self.first_known_index() < index {
            self.initial_ratchet.advance_to(index);

            if self.latest_ratchet.index() < index {
                self.latest_ratchet = self.initial_ratchet.clone();
            }

            true
        } else {
            false
        }
    }

    fn find_ratchet(&self, message_index: u32) -> Option<FoundRatchet<'_>> {
        if self.initial_ratchet.index() == message_index {
            Some(FoundRatchet::Cached(&self.initial_ratchet))
        } else if self.latest_ratchet.index() == message_index {
            Some(FoundRatchet::Cached(&self.latest_ratchet))
        } else if self.latest_ratchet.index() < message_index {
            let mut ratchet = self.latest_ratchet.clone();
            ratchet.advance_to(message_index);

            Some(FoundRatchet::Advanced(ratchet))
        } else if self.initial_ratchet.index() < message_index {
            let mut ratchet = self.initial_ratchet.clone();
            ratchet.advance_to(message_index);

            Some(FoundRatchet::Advanced(ratchet))
        } else {
            None
        }
    }

    /// Decrypt the given [`MegolmMessage`].
    ///
    /// The signature is checked first, then the MAC, and only then is the
    /// ciphertext decrypted. A failed decryption leaves the session as it was.
    pub fn decrypt(
        &mut self,
        message: &MegolmMessage,
    ) -> Result<DecryptedMessage, DecryptionError> {
        self.signing_key.verify(&message.to_signature_bytes(), message.signature())?;

        let Some(found) = self.find_ratchet(message.message_index()) else {
            debug!(
                session_id = %self.session_id(),
                first_known_index = self.first_known_index(),
                message_index = message.message_index(),
                "Received a Megolm message with an unknown message index"
            );

            return Err(DecryptionError::UnknownMessageIndex(
                self.first_known_index(),
                message.message_index(),
            ));
        };

        let cipher = found.ratchet().cipher();

        cipher.verify_truncated_mac(&message.to_mac_bytes(), message.mac())?;
        let plaintext = cipher.decrypt(message.ciphertext())?;

        if let FoundRatchet::Advanced(ratchet) = found {
            self.latest_ratchet = ratchet;
        }

        trace!(
            session_id = %self.session_id(),
            message_index = message.message_index(),
            "Decrypted a group message"
        );

        Ok(DecryptedMessage { plaintext, message_index: message.message_index() })
    }

    /// Export the session at the given message index.
    ///
    /// Returns `None` if the index is below the first known index of the
    /// session. An inbound session created from the export can decrypt
    /// messages from the given index onwards.
    pub fn export_at(&self, index: u32) -> Option<ExportedSessionKey> {
        let found = self.find_ratchet(index)?;

        Some(ExportedSessionKey::new(found.ratchet(), self.signing_key))
    }

    /// Export the session at its first known index.
    pub fn export_at_first_known_index(&self) -> ExportedSessionKey {
        ExportedSessionKey::new(&self.initial_ratchet, self.signing_key)
    }

    /// Store the inbound group session as an encrypted pickle, see the
    /// [`crate::pickle`] module for the format.
    pub fn pickle(&self, pickle_key: &[u8]) -> Result<String, PickleError> {
        pickle(self, pickle_key)
    }

    /// Restore an [`InboundGroupSession`] from a pickle created by
    /// [`InboundGroupSession::pickle`].
    pub fn from_pickle(pickle: &str, pickle_key: &[u8]) -> Result<Self, PickleError> {
        unpickle(pickle, pickle_key)
    }
}

impl From<&GroupSession> for InboundGroupSession {
    fn from(session: &GroupSession) -> Self {
        let ratchet = session.ratchet().clone();

        Self {
            initial_ratchet: ratchet.clone(),
            latest_ratchet: ratchet,
            signing_key: session.signing_key(),
            signing_key_verified: true,
        }
    }
}

#[derive(Zeroize, ZeroizeOnDrop, Encode, Decode)]
struct InboundGroupSessionPickle {
    initial_ratchet: RatchetPickle,
    latest_ratchet: RatchetPickle,
    signing_key: [u8; 32],
    signing_key_verified: bool,
}

impl Picklable for InboundGroupSession {
    const PICKLE_VERSION: u32 = 1;

    fn serialize_fields(&self, writer: &mut Vec<u8>) -> Result<(), EncodeError> {
        let pickle = InboundGroupSessionPickle {
            initial_ratchet: RatchetPickle::from(&self.initial_ratchet),
            latest_ratchet: RatchetPickle::from(&self.latest_ratchet),
            signing_key: *self.signing_key.as_bytes(),
            signing_key_verified: self.signing_key_verified,
        };

        pickle.encode(writer)?;

        Ok(())
    }

    fn deserialize_fields(_version: u32, reader: &mut impl Read) -> Result<Self, PickleError> {
        let pickle = InboundGroupSessionPickle::decode(reader)?;

        let initial_ratchet = Ratchet::from(&pickle.initial_ratchet);
        let latest_ratchet = Ratchet::from(&pickle.latest_ratchet);
        let signing_key = Ed25519PublicKey::from_slice(&pickle.signing_key)?;

        if latest_ratchet.index() < initial_ratchet.index() {
            Err(PickleError::InvalidSession("the latest ratchet is behind the initial ratchet"))
        } else {
            Ok(Self {
                initial_ratchet,
                latest_ratchet,
                signing_key,
                signing_key_verified: pickle.signing_key_verified,
            })
        }
    }
}
