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

//! Encrypted serialization of session state.
//!
//! A pickle is the unpadded base64 encoding of
//!
//! ```text
//!     AES-256-CBC(version || fields) || HMAC-SHA256(ciphertext)[..8]
//! ```
//!
//! where the version is a big-endian `u32` and the fields use the binary
//! encoding of [`matrix_pickle`]: big-endian integers, raw fixed size arrays,
//! vectors prefixed with a `u32` length, and booleans as a single byte.
//!
//! The AES key, the MAC key, and the IV are derived from the pickle key with
//! HKDF-SHA256 using the info string `"Pickle"`. The MAC is checked before
//! anything gets decrypted, and decoding is all or nothing: a pickle with
//! trailing bytes, unknown versions, or inconsistent state is rejected.

use std::io::{Cursor, Read};

use matrix_pickle::{Decode, DecodeError, Encode, EncodeError};
use thiserror::Error;
use tracing::warn;
use zeroize::Zeroizing;

use crate::{
    Base64DecodeError, ErrorKind, KeyError,
    primitives::cipher::{Cipher, DecryptionError},
    utilities::{base64_decode, base64_encode},
};

/// Error type describing the various ways a pickle can fail to be restored.
#[derive(Debug, Error)]
pub enum PickleError {
    /// The pickle wasn't valid base64.
    #[error("The pickle wasn't valid base64: {0}")]
    Base64(#[from] Base64DecodeError),
    /// The pickle couldn't be decrypted, either the pickle key is wrong or the
    /// pickle was modified.
    #[error("The pickle couldn't be decrypted: {0}")]
    Decryption(#[from] DecryptionError),
    /// The decrypted pickle is too short to contain a version.
    #[error("The pickle doesn't contain a version")]
    MissingVersion,
    /// The pickle uses a version this library doesn't know about.
    #[error("The pickle uses an unsupported version, expected at most {expected}, got {got}")]
    UnsupportedVersion {
        /// The newest version this library can restore.
        expected: u32,
        /// The version found in the pickle.
        got: u32,
    },
    /// The payload of the pickle could not be decoded.
    #[error(transparent)]
    Decode(#[from] DecodeError),
    /// The object could not be encoded as a pickle.
    #[error(transparent)]
    Encode(#[from] EncodeError),
    /// The pickle contained more data than the pickled object needs.
    #[error("The pickle contained {0} unexpected trailing bytes")]
    TrailingBytes(usize),
    /// The pickle contained a key that can't be used.
    #[error("The pickle contained an invalid key: {0}")]
    InvalidKey(#[from] KeyError),
    /// The fields of the pickle decoded fine but don't describe a valid
    /// object.
    #[error("The pickle didn't contain a valid object: {0}")]
    InvalidSession(&'static str),
}

impl PickleError {
    /// The category of this error.
    pub fn kind(&self) -> ErrorKind {
        match self {
            PickleError::Decryption(e) => e.kind(),
            PickleError::UnsupportedVersion { .. } => ErrorKind::UnsupportedVersion,
            _ => ErrorKind::CorruptPickle,
        }
    }
}

/// An object that can be stored as an encrypted pickle.
pub trait Picklable: Sized {
    /// The version written into new pickles.
    ///
    /// Restoring accepts every version from `1` up to this one.
    const PICKLE_VERSION: u32;

    /// Append the binary encoding of every field to `writer`.
    fn serialize_fields(&self, writer: &mut Vec<u8>) -> Result<(), EncodeError>;

    /// Restore the object from the fields of a pickle with the given version.
    fn deserialize_fields(version: u32, reader: &mut impl Read) -> Result<Self, PickleError>;
}

/// Encrypt the object with the given pickle key.
pub fn pickle<T: Picklable>(value: &T, pickle_key: &[u8]) -> Result<String, PickleError> {
    let mut plaintext = Zeroizing::new(Vec::new());

    T::PICKLE_VERSION.encode(&mut *plaintext)?;
    value.serialize_fields(&mut plaintext)?;

    let cipher = Cipher::new_pickle(pickle_key);

    Ok(base64_encode(cipher.encrypt_pickle(&plaintext)))
}

/// Restore an object from a pickle created with [`pickle()`] and the same
/// pickle key.
pub fn unpickle<T: Picklable>(pickle: &str, pickle_key: &[u8]) -> Result<T, PickleError> {
    decode_pickle(pickle, pickle_key)
        .inspect_err(|e| warn!(error = %e, kind = %e.kind(), "Failed to restore a pickle"))
}

fn decode_pickle<T: Picklable>(pickle: &str, pickle_key: &[u8]) -> Result<T, PickleError> {
    let cipher = Cipher::new_pickle(pickle_key);
    let decoded = base64_decode(pickle)?;
    let plaintext = Zeroizing::new(cipher.decrypt_pickle(&decoded)?);

    if plaintext.len() < 4 {
        return Err(PickleError::MissingVersion);
    }

    let mut cursor = Cursor::new(plaintext.as_slice());
    let version = u32::decode(&mut cursor)?;

    if version == 0 || version > T::PICKLE_VERSION {
        return Err(PickleError::UnsupportedVersion { expected: T::PICKLE_VERSION, got: version });
    }

    let value = T::deserialize_fields(version, &mut cursor)?;

    let consumed = usize::try_from(cursor.position()).unwrap_or(usize::MAX);
    let trailing = plaintext.len().saturating_sub(consumed);

    if trailing > 0 { Err(PickleError::TrailingBytes(trailing)) } else { Ok(value) }
}
