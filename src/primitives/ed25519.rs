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

pub use ed25519_dalek::SignatureError;
use ed25519_dalek::{
    PUBLIC_KEY_LENGTH, SIGNATURE_LENGTH, Signature, Signer, SigningKey, Verifier, VerifyingKey,
};
use serde::{Deserialize, Deserializer, Serialize, Serializer};
use zeroize::Zeroize;

use super::{EntropyError, KeyError, RandomSource};
use crate::utilities::{base64_decode, base64_encode};

/// An Ed25519 key pair, used to sign Megolm messages and session keys.
#[derive(Clone)]
pub struct Ed25519Keypair {
    secret_key: Box<SigningKey>,
    public_key: Ed25519PublicKey,
}

impl Ed25519Keypair {
    /// The number of bytes the secret seed of a key pair has.
    pub const SECRET_LENGTH: usize = 32;

    /// Generate a new, random, key pair.
    pub fn new(rng: &mut impl RandomSource) -> Result<Self, EntropyError> {
        let mut seed = Box::new([0u8; Self::SECRET_LENGTH]);
        rng.fill(seed.as_mut_slice())?;

        let key_pair = Self::from_secret_bytes(&seed);
        seed.zeroize();

        Ok(key_pair)
    }

    /// Restore a key pair from the 32 byte secret seed.
    pub fn from_secret_bytes(seed: &[u8; Self::SECRET_LENGTH]) -> Self {
        let secret_key = Box::new(SigningKey::from_bytes(seed));
        let public_key = Ed25519PublicKey(secret_key.verifying_key());

        Self { secret_key, public_key }
    }

    /// Export the 32 byte secret seed of the key pair.
    pub fn secret_bytes(&self) -> Box<[u8; Self::SECRET_LENGTH]> {
        Box::new(self.secret_key.to_bytes())
    }

    /// The public half of this key pair.
    pub fn public_key(&self) -> Ed25519PublicKey {
        self.public_key
    }

    /// Sign the given message with the secret half of this key pair.
    pub fn sign(&self, message: &[u8]) -> Ed25519Signature {
        Ed25519Signature(self.secret_key.sign(message))
    }
}

impl fmt::Debug for Ed25519Keypair {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("Ed25519Keypair")
            .field("public_key", &self.public_key)
            .finish_non_exhaustive()
    }
}

/// An Ed25519 public key, used to verify signatures.
#[derive(Clone, Copy, PartialEq, Eq)]
pub struct Ed25519PublicKey(VerifyingKey);

impl Ed25519PublicKey {
    /// The number of bytes an Ed25519 public key has.
    pub const LENGTH: usize = PUBLIC_KEY_LENGTH;

    /// Try to create a public key from a slice of bytes.
    pub fn from_slice(bytes: &[u8]) -> Result<Self, KeyError> {
        let bytes: &[u8; Self::LENGTH] =
            bytes.try_into().map_err(|_| KeyError::InvalidKeyLength {
                key_type: "Ed25519",
                expected_length: Self::LENGTH,
                length: bytes.len(),
            })?;

        Ok(Self(VerifyingKey::from_bytes(bytes)?))
    }

    /// Instantiate a public key from an unpadded base64 representation.
    pub fn from_base64(input: &str) -> Result<Self, KeyError> {
        Self::from_slice(&base64_decode(input)?)
    }

    /// View this public key as a byte array.
    pub fn as_bytes(&self) -> &[u8; Self::LENGTH] {
        self.0.as_bytes()
    }

    /// Serialize the public key to an unpadded base64 representation.
    pub fn to_base64(&self) -> String {
        base64_encode(self.as_bytes())
    }

    /// Verify that the provided signature for a given message has been signed
    /// by the private key matching this public one.
    ///
    /// By default this performs an [RFC8032] compatible signature check. A
    /// stricter version of the signature check can be enabled with the
    /// `strict-signatures` feature flag, it uses the
    /// [`ed25519_dalek::VerifyingKey::verify_strict()`] method under the hood.
    ///
    /// [RFC8032]: https://datatracker.ietf.org/doc/html/rfc8032#section-5.1.7
    pub fn verify(
        &self,
        message: &[u8],
        signature: &Ed25519Signature,
    ) -> Result<(), SignatureError> {
        if cfg!(feature = "strict-signatures") {
            self.0.verify_strict(message, &signature.0)
        } else {
            self.0.verify(message, &signature.0)
        }
    }
}

impl fmt::Debug for Ed25519PublicKey {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "ed25519:{}", self.to_base64())
    }
}

impl Serialize for Ed25519PublicKey {
    fn serialize<S: Serializer>(&self, serializer: S) -> Result<S::Ok, S::Error> {
        serializer.serialize_str(&self.to_base64())
    }
}

impl<'de> Deserialize<'de> for Ed25519PublicKey {
    fn deserialize<D: Deserializer<'de>>(deserializer: D) -> Result<Self, D::Error> {
        let key = String::deserialize(deserializer)?;
        Self::from_base64(&key).map_err(serde::de::Error::custom)
    }
}

/// An Ed25519 digital signature.
#[derive(Clone, Copy, PartialEq, Eq)]
pub struct Ed25519Signature(pub(crate) Signature);

impl Ed25519Signature {
    /// The number of bytes an Ed25519 signature has.
    pub const LENGTH: usize = SIGNATURE_LENGTH;

    /// Try to create a signature from a slice of bytes.
    pub fn from_slice(bytes: &[u8]) -> Result<Self, SignatureError> {
        Ok(Self(Signature::from_slice(bytes)?))
    }

    /// Instantiate a signature from an unpadded base64 representation.
    pub fn from_base64(input: &str) -> Result<Self, KeyError> {
        Ok(Self::from_slice(&base64_decode(input)?)?)
    }

    /// Convert the signature to a byte array.
    pub fn to_bytes(&self) -> [u8; Self::LENGTH] {
        self.0.to_bytes()
    }

    /// Serialize the signature to an unpadded base64 representation.
    pub fn to_base64(&self) -> String {
        base64_encode(self.to_bytes())
    }
}

impl fmt::Debug for Ed25519Signature {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "ed25519:{}", self.to_base64())
    }
}

#[cfg(test)]
mod test {
    use assert_matches2::assert_matches;
    use rand::thread_rng;

    use super::{Ed25519Keypair, Ed25519PublicKey, Ed25519Signature};
    use crate::KeyError;

    #[test]
    fn signatures_verify() {
        let key_pair =
            Ed25519Keypair::new(&mut thread_rng()).expect("A key pair should be created");
        let message = b"It's a secret to everybody";

        let signature = key_pair.sign(message);

        key_pair.public_key().verify(message, &signature).expect("The signature should be valid");
        key_pair
            .public_key()
            .verify(b"It's a secret to nobody", &signature)
            .expect_err("The signature should not be valid for a different message");
    }

    #[test]
    fn key_pair_restores_from_seed() {
        let key_pair =
            Ed25519Keypair::new(&mut thread_rng()).expect("A key pair should be created");
        let restored = Ed25519Keypair::from_secret_bytes(&key_pair.secret_bytes());

        assert_eq!(key_pair.public_key(), restored.public_key());
    }

    #[test]
    fn invalid_lengths_are_rejected() {
        assert_matches!(
            Ed25519PublicKey::from_slice(&[0u8; 31]),
            Err(KeyError::InvalidKeyLength { expected_length: 32, length: 31, .. })
        );
        Ed25519Signature::from_slice(&[0u8; 63]).expect_err("A short signature should be rejected");
    }
}
