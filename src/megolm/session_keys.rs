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

use serde::{Deserialize, Serialize};
use thiserror::Error;
use zeroize::{Zeroize, ZeroizeOnDrop, Zeroizing};

use super::ratchet::Ratchet;
use crate::{
    Ed25519Keypair, Ed25519PublicKey, Ed25519Signature, ErrorKind, KeyError, SignatureError,
    utilities::{base64_decode, base64_encode},
};

/// Error type describing failure modes for the [`SessionKey`] and
/// [`ExportedSessionKey`] decoding.
#[derive(Debug, Error)]
pub enum SessionKeyDecodeError {
    /// The encoded session key had a unsupported version.
    #[error("The session key had a invalid version, expected {0}, got {1}")]
    Version(u8, u8),
    /// The encoded session key didn't have the exact expected length.
    #[error("The session key had an invalid length, expected {expected} bytes, got {got}")]
    InvalidLength {
        /// The length of a valid session key.
        expected: usize,
        /// The length of the decoded session key.
        got: usize,
    },
    /// The encoded session key wasn't valid base64.
    #[error("The session key wasn't valid base64: {0}")]
    Base64(#[from] base64::DecodeError),
    /// The signature on the session key was invalid.
    #[error("The signature on the session key was invalid: {0}")]
    Signature(#[from] SignatureError),
    /// The encoded session key contains an invalid public key.
    #[error("The public key of session was invalid: {0}")]
    PublicKey(#[from] KeyError),
}

impl SessionKeyDecodeError {
    /// The category of this error.
    pub fn kind(&self) -> ErrorKind {
        ErrorKind::BadSessionKey
    }
}

/// The exported session key.
///
/// This uses the same format as the [`SessionKey`], with the version byte
/// `"\x01"` and without the signature at the end. Whoever hands out an
/// exported key vouches for the signing key it contains.
#[derive(Zeroize, ZeroizeOnDrop)]
pub struct ExportedSessionKey {
    pub(super) ratchet_index: u32,
    pub(super) ratchet: Box<[u8; Ratchet::LENGTH]>,
    #[zeroize(skip)]
    pub(super) signing_key: Ed25519PublicKey,
}

impl ExportedSessionKey {
    const VERSION: u8 = 1;
    const LENGTH: usize = 1 + 4 + Ratchet::LENGTH + Ed25519PublicKey::LENGTH;

    pub(super) fn new(ratchet: &Ratchet, signing_key: Ed25519PublicKey) -> Self {
        Self {
            ratchet_index: ratchet.index(),
            ratchet: Box::new(*ratchet.as_bytes()),
            signing_key,
        }
    }

    /// The message index of the first message this key can decrypt.
    pub fn message_index(&self) -> u32 {
        self.ratchet_index
    }

    /// The public key messages of the session are signed with.
    pub fn signing_key(&self) -> Ed25519PublicKey {
        self.signing_key
    }

    fn to_bytes_with_version(&self, version: u8) -> Vec<u8> {
        let index = self.ratchet_index.to_be_bytes();

        [[version].as_ref(), index.as_ref(), self.ratchet.as_ref(), self.signing_key.as_bytes()]
            .concat()
    }

    /// Serialize the [`ExportedSessionKey`] to a byte vector.
    ///
    /// ```text
    /// +---+----+--------+--------+--------+--------+------+
    /// | V | i  | R(i,0) | R(i,1) | R(i,2) | R(i,3) | Kpub |
    /// +---+----+--------+--------+--------+--------+------+
    /// 0   1    5        37       69      101      133    165   bytes
    /// ```
    pub fn to_bytes(&self) -> Vec<u8> {
        self.to_bytes_with_version(Self::VERSION)
    }

    /// Deserialize the [`ExportedSessionKey`] from a byte slice.
    pub fn from_bytes(bytes: &[u8]) -> Result<Self, SessionKeyDecodeError> {
        Self::decode_key(Self::VERSION, bytes)
    }

    /// Serialize the [`ExportedSessionKey`] to an unpadded base64 string.
    pub fn to_base64(&self) -> String {
        let bytes = Zeroizing::new(self.to_bytes());

        base64_encode(bytes.as_slice())
    }

    /// Deserialize the [`ExportedSessionKey`] from an unpadded base64 string.
    pub fn from_base64(key: &str) -> Result<Self, SessionKeyDecodeError> {
        let bytes = Zeroizing::new(base64_decode(key)?);

        Self::from_bytes(&bytes)
    }

    /// Decode the unsigned part of a session key, the input must be exactly
    /// as long as the unsigned part.
    fn decode_key(
        expected_version: u8,
        bytes: &[u8],
    ) -> Result<ExportedSessionKey, SessionKeyDecodeError> {
        let version = *bytes
            .first()
            .ok_or(SessionKeyDecodeError::InvalidLength { expected: Self::LENGTH, got: 0 })?;

        if version != expected_version {
            Err(SessionKeyDecodeError::Version(expected_version, version))
        } else if bytes.len() != Self::LENGTH {
            Err(SessionKeyDecodeError::InvalidLength { expected: Self::LENGTH, got: bytes.len() })
        } else {
            let mut index = [0u8; 4];
            let mut ratchet = Box::new([0u8; Ratchet::LENGTH]);

            index.copy_from_slice(&bytes[1..5]);
            ratchet.copy_from_slice(&bytes[5..5 + Ratchet::LENGTH]);

            let signing_key = Ed25519PublicKey::from_slice(&bytes[5 + Ratchet::LENGTH..])?;

            Ok(ExportedSessionKey {
                ratchet_index: u32::from_be_bytes(index),
                ratchet,
                signing_key,
            })
        }
    }
}

impl std::fmt::Debug for ExportedSessionKey {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("ExportedSessionKey")
            .field("message_index", &self.ratchet_index)
            .field("signing_key", &self.signing_key)
            .finish_non_exhaustive()
    }
}

impl TryFrom<&[u8]> for ExportedSessionKey {
    type Error = SessionKeyDecodeError;

    fn try_from(value: &[u8]) -> Result<Self, Self::Error> {
        Self::from_bytes(value)
    }
}

impl TryFrom<&str> for ExportedSessionKey {
    type Error = SessionKeyDecodeError;

    fn try_from(value: &str) -> Result<Self, Self::Error> {
        Self::from_base64(value)
    }
}

impl Serialize for ExportedSessionKey {
    fn serialize<S>(&self, serializer: S) -> Result<S::Ok, S::Error>
    where
        S: serde::Serializer,
    {
        let encoded = Zeroizing::new(self.to_base64());

        encoded.serialize(serializer)
    }
}

impl<'de> Deserialize<'de> for ExportedSessionKey {
    fn deserialize<D>(deserializer: D) -> Result<Self, D::Error>
    where
        D: serde::Deserializer<'de>,
    {
        let session_key = Zeroizing::new(String::deserialize(deserializer)?);

        Self::from_base64(&session_key).map_err(serde::de::Error::custom)
    }
}

/// The session key, can be used to create a [`InboundGroupSession`].
///
/// Uses the session-sharing format of Megolm:
///
/// ```text
/// +---+----+--------+--------+--------+--------+------+-----------+
/// | V | i  | R(i,0) | R(i,1) | R(i,2) | R(i,3) | Kpub | Signature |
/// +---+----+--------+--------+--------+--------+------+-----------+
/// 0   1    5        37       69      101      133    165         229   bytes
/// ```
///
/// The version byte, V, is `"\x02"`. This is followed by the ratchet index,
/// i, which is encoded as a big-endian 32-bit integer; the 128 bytes of the
/// ratchet; and the public part of the Ed25519 key pair.
///
/// The data is then signed using the Ed25519 key, and the 64-byte signature is
/// appended.
///
/// [`InboundGroupSession`]: crate::megolm::InboundGroupSession
pub struct SessionKey {
    pub(super) session_key: ExportedSessionKey,
    pub(super) signature: Ed25519Signature,
}

impl SessionKey {
    const VERSION: u8 = 2;
    const LENGTH: usize = ExportedSessionKey::LENGTH + Ed25519Signature::LENGTH;

    pub(super) fn new(ratchet: &Ratchet, signing_key: &Ed25519Keypair) -> Self {
        let session_key = ExportedSessionKey::new(ratchet, signing_key.public_key());
        let signed = Zeroizing::new(session_key.to_bytes_with_version(Self::VERSION));
        let signature = signing_key.sign(&signed);

        Self { session_key, signature }
    }

    /// The message index of the first message this key can decrypt.
    pub fn message_index(&self) -> u32 {
        self.session_key.message_index()
    }

    /// The public key messages of the session are signed with.
    pub fn signing_key(&self) -> Ed25519PublicKey {
        self.session_key.signing_key()
    }

    /// Serialize the [`SessionKey`] to a byte vector.
    pub fn to_bytes(&self) -> Vec<u8> {
        let mut bytes = self.session_key.to_bytes_with_version(Self::VERSION);
        bytes.extend(self.signature.to_bytes());

        bytes
    }

    /// Deserialize the [`SessionKey`] from a byte slice, verifying its
    /// signature.
    pub fn from_bytes(bytes: &[u8]) -> Result<Self, SessionKeyDecodeError> {
        if bytes.len() != Self::LENGTH {
            return Err(SessionKeyDecodeError::InvalidLength {
                expected: Self::LENGTH,
                got: bytes.len(),
            });
        }

        let (signed, signature) = bytes.split_at(ExportedSessionKey::LENGTH);

        let session_key = ExportedSessionKey::decode_key(Self::VERSION, signed)?;
        let signature = Ed25519Signature::from_slice(signature)?;

        session_key.signing_key.verify(signed, &signature)?;

        Ok(Self { session_key, signature })
    }

    /// Serialize the [`SessionKey`] to an unpadded base64 string.
    pub fn to_base64(&self) -> String {
        let bytes = Zeroizing::new(self.to_bytes());

        base64_encode(bytes.as_slice())
    }

    /// Deserialize the [`SessionKey`] from an unpadded base64 string.
    pub fn from_base64(key: &str) -> Result<Self, SessionKeyDecodeError> {
        let bytes = Zeroizing::new(base64_decode(key)?);

        Self::from_bytes(&bytes)
    }
}

impl std::fmt::Debug for SessionKey {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("SessionKey")
            .field("message_index", &self.message_index())
            .field("signing_key", &self.signing_key())
            .finish_non_exhaustive()
    }
}

impl TryFrom<&[u8]> for SessionKey {
    type Error = SessionKeyDecodeError;

    fn try_from(value: &[u8]) -> Result<Self, Self::Error> {
        Self::from_bytes(value)
    }
}

impl TryFrom<&str> for SessionKey {
    type Error = SessionKeyDecodeError;

    fn try_from(value: &str) -> Result<Self, Self::Error> {
        Self::from_base64(value)
    }
}

impl Serialize for SessionKey {
    fn serialize<S>(&self, serializer: S) -> Result<S::Ok, S::Error>
    where
        S: serde::Serializer,
    {
        let encoded = Zeroizing::new(self.to_base64());

        encoded.serialize(serializer)
    }
}

impl<'de> Deserialize<'de> for SessionKey {
    fn deserialize<D>(deserializer: D) -> Result<Self, D::Error>
    where
        D: serde::Deserializer<'de>,
    {
        let session_key = Zeroizing::new(String::deserialize(deserializer)?);

        Self::from_base64(&session_key).map_err(serde::de::Error::custom)
    }
}
