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

//! Thin, fixed-size wrappers around the cryptographic primitives the ratchets
//! are built from.
//!
//! Every function here has a fixed output size and none of them can fail on
//! valid input, apart from the Diffie-Hellman agreement which rejects low
//! order public keys.

pub(crate) mod cipher;
mod curve25519;
mod ed25519;
mod random;

use aes::{
    Aes256,
    cipher::{
        BlockDecryptMut, BlockEncryptMut, KeyIvInit,
        block_padding::{Pkcs7, UnpadError},
        generic_array::GenericArray,
    },
};
pub use curve25519::{Curve25519Keypair, Curve25519PublicKey, Curve25519SecretKey};
pub use ed25519::{Ed25519Keypair, Ed25519PublicKey, Ed25519Signature, SignatureError};
use hkdf::{Hkdf, InvalidLength};
use hmac::{Hmac, Mac as MacT};
pub use random::{EntropyError, FixedBytes, RandomSource};
use sha2::{Digest, Sha256};
use thiserror::Error;

use crate::ErrorKind;

pub(crate) type HmacSha256 = Hmac<Sha256>;
type Aes256CbcEnc = cbc::Encryptor<Aes256>;
type Aes256CbcDec = cbc::Decryptor<Aes256>;

/// Error type for failures that may occur when decoding or using a
/// cryptographic key.
#[derive(Error, Debug)]
pub enum KeyError {
    /// Failed to correctly decode a key that was encoded in base64.
    #[error("Failed to decode a key from base64: {0}")]
    Base64Error(#[from] base64::DecodeError),

    /// The key does not contain the expected number of bytes.
    #[error(
        "Failed to decode {key_type} key: \
        Invalid number of bytes for {key_type}, expected {expected_length}, got {length}."
    )]
    InvalidKeyLength {
        /// The type of key being decoded.
        key_type: &'static str,
        /// The expected length of the key.
        expected_length: usize,
        /// The actual length of the key.
        length: usize,
    },

    /// The bytes don't describe a valid Ed25519 key or signature.
    #[error(transparent)]
    Signature(#[from] SignatureError),

    /// One or more keys lacked contributory behavior in the Diffie-Hellman
    /// operation, resulting in an insecure shared secret.
    ///
    /// For more details on contributory behavior please refer to the
    /// [`x25519_dalek::SharedSecret::was_contributory()`] method.
    #[error(
        "One or more keys lacked contributory behavior in the Diffie-Hellman operation, \
         resulting in an insecure shared secret"
    )]
    NonContributoryKey,
}

impl KeyError {
    /// The category of this error.
    pub fn kind(&self) -> ErrorKind {
        ErrorKind::InvalidKey
    }
}

/// Perform an X25519 Diffie-Hellman key agreement.
///
/// Fails with [`KeyError::NonContributoryKey`] if the public key is a low
/// order point, in which case the shared secret would not depend on our
/// secret key.
pub fn ecdh(
    secret_key: &Curve25519SecretKey,
    public_key: &Curve25519PublicKey,
) -> Result<Box<[u8; 32]>, KeyError> {
    let shared_secret = secret_key.diffie_hellman(public_key);

    if shared_secret.was_contributory() {
        Ok(Box::new(shared_secret.to_bytes()))
    } else {
        Err(KeyError::NonContributoryKey)
    }
}

/// Compute the HMAC-SHA256 of the given data.
pub fn hmac_sha256(key: &[u8], data: &[u8]) -> [u8; 32] {
    // HMAC accepts keys of any length, the error case can't happen.
    #[allow(clippy::expect_used)]
    let mut hmac = HmacSha256::new_from_slice(key)
        .expect("We should be able to create a HmacSha256 from a key of any size");
    hmac.update(data);

    hmac.finalize().into_bytes().into()
}

/// Expand the input key material into `output` using HKDF-SHA256.
///
/// Fails if more than 8160 bytes of output are requested.
pub fn hkdf_sha256(
    salt: Option<&[u8]>,
    input_key_material: &[u8],
    info: &[u8],
    output: &mut [u8],
) -> Result<(), InvalidLength> {
    Hkdf::<Sha256>::new(salt, input_key_material).expand(info, output)
}

/// [`hkdf_sha256()`] for the fixed, small, output sizes the ratchets use.
pub(crate) fn expand_key<const N: usize>(
    salt: Option<&[u8]>,
    input_key_material: &[u8],
    info: &[u8],
) -> Box<[u8; N]> {
    let mut output = Box::new([0u8; N]);

    #[allow(clippy::expect_used)]
    hkdf_sha256(salt, input_key_material, info, output.as_mut_slice())
        .expect("We should be able to expand a key into a small, fixed size, output");

    output
}

/// Compute the SHA-256 digest of the given data.
pub fn sha256(data: &[u8]) -> [u8; 32] {
    Sha256::digest(data).into()
}

/// Encrypt the plaintext with AES-256 in CBC mode, using PKCS#7 padding.
pub fn aes_256_cbc_encrypt(key: &[u8; 32], iv: &[u8; 16], plaintext: &[u8]) -> Vec<u8> {
    let cipher = Aes256CbcEnc::new(GenericArray::from_slice(key), GenericArray::from_slice(iv));
    cipher.encrypt_padded_vec_mut::<Pkcs7>(plaintext)
}

/// Decrypt a ciphertext produced by [`aes_256_cbc_encrypt()`].
///
/// Fails if the ciphertext isn't a multiple of the block size or if the
/// padding is malformed.
pub fn aes_256_cbc_decrypt(
    key: &[u8; 32],
    iv: &[u8; 16],
    ciphertext: &[u8],
) -> Result<Vec<u8>, UnpadError> {
    let cipher = Aes256CbcDec::new(GenericArray::from_slice(key), GenericArray::from_slice(iv));
    cipher.decrypt_padded_vec_mut::<Pkcs7>(ciphertext)
}
