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

use aes::cipher::block_padding::UnpadError;
use hmac::{Mac as MacT, digest::MacError};
use subtle::ConstantTimeEq;
use thiserror::Error;
use zeroize::{Zeroize, ZeroizeOnDrop};

use super::{HmacSha256, aes_256_cbc_decrypt, aes_256_cbc_encrypt, expand_key};
use crate::{
    DecodeError, ErrorKind,
    utilities::{base64_decode, base64_encode},
};

/// The message authentication code of a ciphertext.
#[derive(Debug, Clone, Eq)]
pub struct Mac(pub(crate) [u8; Self::LENGTH]);

impl Mac {
    /// The expected length of the message authentication code (MAC).
    pub const LENGTH: usize = 32;
    /// The expected length of the message authentication code (MAC) if
    /// truncation is applied.
    pub const TRUNCATED_LEN: usize = 8;

    /// Truncates and converts the [`Mac`] into a byte array.
    pub fn truncate(&self) -> [u8; Self::TRUNCATED_LEN] {
        let mut truncated = [0u8; Self::TRUNCATED_LEN];
        truncated.copy_from_slice(&self.0[0..Self::TRUNCATED_LEN]);

        truncated
    }

    /// Return the [`Mac`] as a byte slice.
    pub fn as_bytes(&self) -> &[u8] {
        self.0.as_ref()
    }

    /// Try to create a [`Mac`] from a slice of bytes.
    pub fn from_slice(bytes: &[u8]) -> Result<Self, DecodeError> {
        let mac = bytes.try_into().map_err(|_| DecodeError::InvalidMacLength(bytes.len()))?;

        Ok(Self(mac))
    }

    /// Serialize the [`Mac`] to an unpadded base64 representation.
    pub fn to_base64(&self) -> String {
        base64_encode(self.0)
    }

    /// Instantiate a [`Mac`] from an unpadded base64 representation.
    pub fn from_base64(input: &str) -> Result<Self, DecodeError> {
        Self::from_slice(&base64_decode(input)?)
    }
}

impl PartialEq for Mac {
    fn eq(&self, other: &Self) -> bool {
        self.0.ct_eq(&other.0).into()
    }
}

/// Error type describing failures of the authenticated decryption used for
/// pickles.
#[derive(Debug, Error)]
pub enum DecryptionError {
    /// The plaintext had invalid padding.
    #[error("Failed decrypting, invalid padding")]
    InvalidPadding(#[from] UnpadError),
    /// The MAC of the ciphertext didn't pass validation.
    #[error("The MAC of the ciphertext didn't pass validation {0}")]
    Mac(#[from] MacError),
    /// The ciphertext was too short to contain a MAC.
    #[error("The ciphertext didn't contain a valid MAC")]
    MacMissing,
}

impl DecryptionError {
    /// The category of this error.
    pub fn kind(&self) -> ErrorKind {
        match self {
            DecryptionError::Mac(_) => ErrorKind::BadMac,
            DecryptionError::InvalidPadding(_) | DecryptionError::MacMissing => {
                ErrorKind::CorruptPickle
            }
        }
    }
}

#[derive(Zeroize, ZeroizeOnDrop)]
struct CipherKeys {
    aes_key: Box<[u8; 32]>,
    mac_key: Box<[u8; 32]>,
    iv: Box<[u8; 16]>,
}

impl CipherKeys {
    const OLM_INFO: &'static [u8] = b"OLM_KEYS";
    const MEGOLM_INFO: &'static [u8] = b"MEGOLM_KEYS";
    const PICKLE_INFO: &'static [u8] = b"Pickle";

    fn derive(key: &[u8], info: &[u8]) -> Self {
        let mut expanded_keys = expand_key::<80>(Some(&[0]), key, info);

        let mut aes_key = Box::new([0u8; 32]);
        let mut mac_key = Box::new([0u8; 32]);
        let mut iv = Box::new([0u8; 16]);

        aes_key.copy_from_slice(&expanded_keys[0..32]);
        mac_key.copy_from_slice(&expanded_keys[32..64]);
        iv.copy_from_slice(&expanded_keys[64..80]);

        expanded_keys.zeroize();

        Self { aes_key, mac_key, iv }
    }
}

/// A cipher used for encrypting and decrypting messages.
///
/// The cipher expands a single key, using HKDF-SHA256 with a zero salt, into
/// a 32 byte AES-256 key, a 32 byte HMAC-SHA256 key, and a 16 byte
/// initialization vector. The info string of the expansion differs between
/// Olm messages, Megolm messages, and pickles.
pub struct Cipher {
    keys: CipherKeys,
}

impl Cipher {
    /// Creates a new [`Cipher`] from an Olm message key, using the info string
    /// `"OLM_KEYS"`.
    pub fn new(message_key: &[u8; 32]) -> Self {
        Self { keys: CipherKeys::derive(message_key, CipherKeys::OLM_INFO) }
    }

    /// Creates a new [`Cipher`] from the full 128 byte Megolm ratchet, using
    /// the info string `"MEGOLM_KEYS"`.
    pub fn new_megolm(ratchet: &[u8; 128]) -> Self {
        Self { keys: CipherKeys::derive(ratchet, CipherKeys::MEGOLM_INFO) }
    }

    /// Creates a new [`Cipher`] from a pickle key of any length, using the
    /// info string `"Pickle"`.
    ///
    /// The initialization vector only depends on the pickle key, pickling
    /// the same plaintext twice with the same key produces the same output.
    pub fn new_pickle(pickle_key: &[u8]) -> Self {
        Self { keys: CipherKeys::derive(pickle_key, CipherKeys::PICKLE_INFO) }
    }

    fn hmac(&self) -> HmacSha256 {
        #[allow(clippy::expect_used)]
        HmacSha256::new_from_slice(self.keys.mac_key.as_slice())
            .expect("We should be able to create a HmacSha256 from a 32 byte key")
    }

    /// Encrypts the given plaintext and returns the ciphertext.
    ///
    /// **Warning**: This does not authenticate the ciphertext, call
    /// [`Cipher::mac()`] on the encoded message afterwards.
    pub fn encrypt(&self, plaintext: &[u8]) -> Vec<u8> {
        aes_256_cbc_encrypt(&self.keys.aes_key, &self.keys.iv, plaintext)
    }

    /// Decrypts the given ciphertext.
    ///
    /// **Warning**: The MAC needs to be checked using
    /// [`Cipher::verify_truncated_mac()`] before this is called.
    pub fn decrypt(&self, ciphertext: &[u8]) -> Result<Vec<u8>, UnpadError> {
        aes_256_cbc_decrypt(&self.keys.aes_key, &self.keys.iv, ciphertext)
    }

    /// Generates a message authentication code (MAC) for the given message.
    pub fn mac(&self, message: &[u8]) -> Mac {
        let mut hmac = self.hmac();
        hmac.update(message);

        Mac(hmac.finalize().into_bytes().into())
    }

    /// Verifies, in constant time, that the MAC truncated to its leftmost
    /// bytes authenticates the given message.
    pub fn verify_truncated_mac(&self, message: &[u8], tag: &[u8]) -> Result<(), MacError> {
        let mut hmac = self.hmac();

        hmac.update(message);
        hmac.verify_truncated_left(tag)
    }

    /// Encrypts the plaintext and appends the truncated MAC of the
    /// ciphertext.
    pub fn encrypt_pickle(&self, plaintext: &[u8]) -> Vec<u8> {
        let mut ciphertext = self.encrypt(plaintext);
        let mac = self.mac(&ciphertext);

        ciphertext.extend(mac.truncate());

        ciphertext
    }

    /// Verifies the truncated MAC at the end of the input and then decrypts
    /// the ciphertext in front of it.
    pub fn decrypt_pickle(&self, ciphertext: &[u8]) -> Result<Vec<u8>, DecryptionError> {
        if ciphertext.len() < Mac::TRUNCATED_LEN + 1 {
            Err(DecryptionError::MacMissing)
        } else {
            let (ciphertext, mac) = ciphertext.split_at(ciphertext.len() - Mac::TRUNCATED_LEN);
            self.verify_truncated_mac(ciphertext, mac)?;

            Ok(self.decrypt(ciphertext)?)
        }
    }
}
