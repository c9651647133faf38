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

use std::{
    fmt,
    io::{Read, Write},
};

use matrix_pickle::{Decode, Encode, EncodeError};
use serde::{Deserialize, Deserializer, Serialize, Serializer};
use x25519_dalek::{PublicKey, SharedSecret, StaticSecret};
use zeroize::Zeroize;

use super::{EntropyError, KeyError, RandomSource};
use crate::utilities::{base64_decode, base64_encode};

/// The private half of a Curve25519 key pair.
///
/// The key lives on the heap and is zeroized when dropped.
#[derive(Clone)]
pub struct Curve25519SecretKey(Box<StaticSecret>);

impl Curve25519SecretKey {
    /// The number of bytes a Curve25519 secret key has.
    pub const LENGTH: usize = 32;

    /// Generate a new secret key using bytes from the given source of
    /// randomness.
    pub fn new(rng: &mut impl RandomSource) -> Result<Self, EntropyError> {
        let mut bytes = Box::new([0u8; Self::LENGTH]);
        rng.fill(bytes.as_mut_slice())?;

        let key = Self::from_bytes(&bytes);
        bytes.zeroize();

        Ok(key)
    }

    /// Create a secret key from the given bytes.
    pub fn from_bytes(bytes: &[u8; Self::LENGTH]) -> Self {
        Self(Box::new(StaticSecret::from(*bytes)))
    }

    /// Export the raw bytes of the secret key.
    pub fn to_bytes(&self) -> Box<[u8; Self::LENGTH]> {
        Box::new(self.0.to_bytes())
    }

    /// Perform a Diffie-Hellman key agreement with the given public key.
    ///
    /// The output is not checked for contributory behaviour, use
    /// [`crate::primitives::ecdh()`] where a low order public key needs to be
    /// rejected.
    pub fn diffie_hellman(&self, their_public_key: &Curve25519PublicKey) -> SharedSecret {
        self.0.diffie_hellman(&their_public_key.inner)
    }
}

/// A Curve25519 key pair.
#[derive(Clone)]
pub struct Curve25519Keypair {
    secret_key: Curve25519SecretKey,
    public_key: Curve25519PublicKey,
}

impl Curve25519Keypair {
    /// Generate a new, random, key pair.
    pub fn new(rng: &mut impl RandomSource) -> Result<Self, EntropyError> {
        Ok(Self::from_secret_key(Curve25519SecretKey::new(rng)?))
    }

    /// Create a key pair from an existing secret key, the public half is
    /// derived from it.
    pub fn from_secret_key(secret_key: Curve25519SecretKey) -> Self {
        let public_key = Curve25519PublicKey::from(&secret_key);

        Self { secret_key, public_key }
    }

    /// The secret half of the key pair.
    pub fn secret_key(&self) -> &Curve25519SecretKey {
        &self.secret_key
    }

    /// The public half of the key pair.
    pub fn public_key(&self) -> Curve25519PublicKey {
        self.public_key
    }
}

impl fmt::Debug for Curve25519Keypair {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("Curve25519Keypair")
            .field("public_key", &self.public_key)
            .finish_non_exhaustive()
    }
}

/// The public half of a Curve25519 key pair.
#[derive(PartialEq, Eq, Hash, Copy, Clone)]
pub struct Curve25519PublicKey {
    pub(crate) inner: PublicKey,
}

impl Curve25519PublicKey {
    /// The number of bytes a Curve25519 public key has.
    pub const LENGTH: usize = 32;

    /// Create a public key from the given bytes.
    pub fn from_bytes(bytes: [u8; Self::LENGTH]) -> Self {
        Self { inner: PublicKey::from(bytes) }
    }

    /// View this public key as a byte array.
    #[inline]
    pub fn as_bytes(&self) -> &[u8; Self::LENGTH] {
        self.inner.as_bytes()
    }

    /// Convert this public key to a byte array.
    #[inline]
    pub fn to_bytes(&self) -> [u8; Self::LENGTH] {
        self.inner.to_bytes()
    }

    /// Try to create a public key from a slice of bytes.
    pub fn from_slice(slice: &[u8]) -> Result<Self, KeyError> {
        let bytes: [u8; Self::LENGTH] = slice.try_into().map_err(|_| KeyError::InvalidKeyLength {
            key_type: "Curve25519",
            expected_length: Self::LENGTH,
            length: slice.len(),
        })?;

        Ok(Self::from_bytes(bytes))
    }

    /// Instantiate a public key from an unpadded base64 representation.
    pub fn from_base64(input: &str) -> Result<Self, KeyError> {
        Self::from_slice(&base64_decode(input)?)
    }

    /// Serialize the public key to an unpadded base64 representation.
    pub fn to_base64(&self) -> String {
        base64_encode(self.as_bytes())
    }
}

impl From<&Curve25519SecretKey> for Curve25519PublicKey {
    fn from(secret: &Curve25519SecretKey) -> Self {
        Self { inner: PublicKey::from(&*secret.0) }
    }
}

impl fmt::Debug for Curve25519PublicKey {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "curve25519:{}", self.to_base64())
    }
}

impl fmt::Display for Curve25519PublicKey {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(&self.to_base64())
    }
}

impl Serialize for Curve25519PublicKey {
    fn serialize<S: Serializer>(&self, serializer: S) -> Result<S::Ok, S::Error> {
        serializer.serialize_str(&self.to_base64())
    }
}

impl<'de> Deserialize<'de> for Curve25519PublicKey {
    fn deserialize<D: Deserializer<'de>>(deserializer: D) -> Result<Self, D::Error> {
        let key = String::deserialize(deserializer)?;
        Self::from_base64(&key).map_err(serde::de::Error::custom)
    }
}

impl Encode for Curve25519PublicKey {
    fn encode(&self, writer: &mut impl Write) -> Result<usize, EncodeError> {
        self.as_bytes().encode(writer)
    }
}

impl Decode for Curve25519PublicKey {
    fn decode(reader: &mut impl Read) -> Result<Self, matrix_pickle::DecodeError> {
        let bytes = <[u8; Self::LENGTH]>::decode(reader)?;

        Ok(Self::from_bytes(bytes))
    }
}

#[cfg(test)]
mod test {
    use assert_matches2::assert_matches;

    use super::{Curve25519Keypair, Curve25519PublicKey, Curve25519SecretKey};
    use crate::{KeyError, primitives::FixedBytes, utilities::DecodeError};

    #[test]
    fn decoding_invalid_base64_fails() {
        assert_matches!(
            Curve25519PublicKey::from_base64("a"),
            Err(KeyError::Base64Error(DecodeError::InvalidLength(..)))
        );
        assert_matches!(
            Curve25519PublicKey::from_base64("a "),
            Err(KeyError::Base64Error(DecodeError::InvalidByte(..)))
        );
    }

    #[test]
    fn decoding_incorrect_num_of_bytes_fails() {
        assert_matches!(
            Curve25519PublicKey::from_base64("aaaa"),
            Err(KeyError::InvalidKeyLength { expected_length: 32, length: 3, .. })
        );
    }

    #[test]
    fn decoding_of_correct_num_of_bytes_succeeds() {
        let key = Curve25519PublicKey::from_base64("MDAwMDAwMDAwMDAwMDAwMDAwMDAwMDAwMDAwMDAwMDA")
            .expect("A 32 byte key should decode");

        assert_eq!(key.to_base64(), "MDAwMDAwMDAwMDAwMDAwMDAwMDAwMDAwMDAwMDAwMDA");
    }

    #[test]
    fn key_pair_from_fixed_bytes_is_deterministic() {
        let bytes = [7u8; 64];

        let first = Curve25519Keypair::new(&mut FixedBytes::new(&bytes[..32]))
            .expect("32 bytes are enough for a key pair");
        let second = Curve25519Keypair::new(&mut FixedBytes::new(&bytes[32..]))
            .expect("32 bytes are enough for a key pair");

        assert_eq!(first.public_key(), second.public_key());
        assert_eq!(
            first.secret_key().to_bytes(),
            Curve25519SecretKey::from_bytes(&[7u8; 32]).to_bytes()
        );
    }

    #[test]
    fn serde_uses_base64() {
        let key = Curve25519PublicKey::from_bytes([1u8; 32]);
        let json = serde_json::to_string(&key).expect("A public key should serialize");

        assert_eq!(json, format!("\"{}\"", key.to_base64()));

        let decoded: Curve25519PublicKey =
            serde_json::from_str(&json).expect("A public key should deserialize");
        assert_eq!(decoded, key);
    }
}
