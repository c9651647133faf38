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

//! The short authentication string (SAS) key verification engine.
//!
//! Both participants create a [`Sas`] object and exchange their public keys.
//! Once the other side's key is set, both objects hold the same shared secret
//! and derive the same bytes from it. Those bytes are rendered as emojis or
//! decimals and compared by the users out of band; if they match, no one
//! tampered with the key exchange. The shared secret also keys the MACs which
//! authenticate the long term keys the participants send each other.
//!
//! ```rust
//! use anyhow::Result;
//! use olmcore::sas::Sas;
//!
//! fn main() -> Result<()> {
//!     let mut rng = rand::thread_rng();
//!
//!     let mut alice = Sas::new(&mut rng)?;
//!     let mut bob = Sas::new(&mut rng)?;
//!
//!     alice.set_their_key(bob.public_key())?;
//!     bob.set_their_key(alice.public_key())?;
//!
//!     let alice_bytes = alice.bytes("MATRIX_KEY_VERIFICATION_SAS")?;
//!     let bob_bytes = bob.bytes("MATRIX_KEY_VERIFICATION_SAS")?;
//!
//!     assert_eq!(alice_bytes.emoji_indices(), bob_bytes.emoji_indices());
//!     assert_eq!(alice_bytes.decimals(), bob_bytes.decimals());
//!
//!     Ok(())
//! }
//! ```

use hmac::{Mac as MacT, digest::MacError};
use thiserror::Error;
use tracing::debug;
use zeroize::{Zeroize, Zeroizing};

use crate::{
    Curve25519Keypair, Curve25519PublicKey, EntropyError, ErrorKind, KeyError, RandomSource,
    primitives::{HmacSha256, cipher::Mac, ecdh, hkdf_sha256},
};

/// The largest output HKDF-SHA256 can produce, `255` times the hash length.
const MAX_OUTPUT_LENGTH: usize = 255 * 32;

/// Error type describing the ways a SAS operation can fail.
#[derive(Debug, Error)]
pub enum SasError {
    /// The other side's public key wasn't set yet.
    #[error("The public key of the other side wasn't set yet")]
    NotReady,
    /// The other side's public key can't be used for the key agreement.
    #[error("The public key of the other side is invalid: {0}")]
    InvalidKey(#[from] KeyError),
    /// The MAC didn't authenticate the input.
    #[error("The SAS MAC didn't match: {0}")]
    InvalidMac(#[from] MacError),
    /// More bytes were requested than the key derivation can produce.
    #[error("Can't derive {0} bytes, at most {MAX_OUTPUT_LENGTH} bytes can be derived")]
    InvalidLength(usize),
}

impl SasError {
    /// The category of this error.
    pub fn kind(&self) -> ErrorKind {
        match self {
            SasError::NotReady => ErrorKind::NotReady,
            SasError::InvalidKey(e) => e.kind(),
            SasError::InvalidMac(_) => ErrorKind::BadMac,
            SasError::InvalidLength(_) => ErrorKind::InvalidLength,
        }
    }
}

/// One side of a short authentication string verification.
///
/// The object starts out with a fresh ephemeral Curve25519 key pair. After
/// [`Sas::set_their_key`] succeeded it's established and can derive bytes
/// and MACs from the shared secret.
pub struct Sas {
    key_pair: Curve25519Keypair,
    their_public_key: Option<Curve25519PublicKey>,
    shared_secret: Option<Box<Zeroizing<[u8; 32]>>>,
}

impl std::fmt::Debug for Sas {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("Sas")
            .field("public_key", &self.public_key())
            .field("their_public_key", &self.their_public_key)
            .finish_non_exhaustive()
    }
}

impl Sas {
    /// Create a new SAS object with a fresh ephemeral key pair.
    pub fn new(rng: &mut impl RandomSource) -> Result<Self, EntropyError> {
        let key_pair = Curve25519Keypair::new(rng)?;

        Ok(Self { key_pair, their_public_key: None, shared_secret: None })
    }

    /// Our ephemeral public key, it needs to be sent to the other side.
    pub fn public_key(&self) -> Curve25519PublicKey {
        self.key_pair.public_key()
    }

    /// The public key of the other side, if it was set.
    pub fn their_public_key(&self) -> Option<Curve25519PublicKey> {
        self.their_public_key
    }

    /// Has the shared secret been established?
    pub fn is_established(&self) -> bool {
        self.shared_secret.is_some()
    }

    /// Set the public key of the other side and compute the shared secret.
    ///
    /// A key that doesn't contribute to the shared secret is rejected and the
    /// object stays as it was. Setting a key again replaces the shared
    /// secret.
    pub fn set_their_key(&mut self, their_public_key: Curve25519PublicKey) -> Result<(), SasError> {
        let mut shared_secret = ecdh(self.key_pair.secret_key(), &their_public_key)?;

        debug!(
            public_key = %self.public_key(),
            their_public_key = %their_public_key,
            "Established a SAS shared secret"
        );

        self.their_public_key = Some(their_public_key);
        self.shared_secret = Some(Box::new(Zeroizing::new(*shared_secret)));
        shared_secret.zeroize();

        Ok(())
    }

    fn shared_secret(&self) -> Result<&[u8], SasError> {
        self.shared_secret.as_deref().map(|s| s.as_slice()).ok_or(SasError::NotReady)
    }

    /// Derive `length` bytes from the shared secret, using HKDF-SHA256 with
    /// the given info string and no salt.
    ///
    /// Different info strings produce unrelated outputs.
    pub fn generate_bytes(&self, info: &str, length: usize) -> Result<Vec<u8>, SasError> {
        let shared_secret = self.shared_secret()?;
        let mut output = vec![0u8; length];

        hkdf_sha256(None, shared_secret, info.as_bytes(), &mut output)
            .map_err(|_| SasError::InvalidLength(length))?;

        Ok(output)
    }

    /// Derive the six bytes the short authentication strings are rendered
    /// from.
    pub fn bytes(&self, info: &str) -> Result<SasBytes, SasError> {
        let mut bytes = [0u8; SasBytes::LENGTH];
        bytes.copy_from_slice(&self.generate_bytes(info, SasBytes::LENGTH)?);

        Ok(SasBytes { bytes })
    }

    fn mac_key(&self, info: &str) -> Result<Zeroizing<[u8; 32]>, SasError> {
        let shared_secret = self.shared_secret()?;
        let mut mac_key = Zeroizing::new([0u8; 32]);

        hkdf_sha256(None, shared_secret, info.as_bytes(), mac_key.as_mut_slice())
            .map_err(|_| SasError::InvalidLength(32))?;

        Ok(mac_key)
    }

    #[allow(clippy::expect_used)]
    fn hmac(&self, input: &[u8], info: &str) -> Result<HmacSha256, SasError> {
        let mac_key = self.mac_key(info)?;
        let mut hmac = HmacSha256::new_from_slice(mac_key.as_slice())
            .expect("We should be able to create a HMAC object from a 32 byte key");
        hmac.update(input);

        Ok(hmac)
    }

    /// Calculate the MAC of the input bytes.
    ///
    /// The MAC key is derived from the shared secret with HKDF-SHA256 and the
    /// given info string, the MAC itself is a full HMAC-SHA256.
    pub fn calculate_mac(&self, input: impl AsRef<[u8]>, info: &str) -> Result<Mac, SasError> {
        let hmac = self.hmac(input.as_ref(), info)?;

        Ok(Mac(hmac.finalize().into_bytes().into()))
    }

    /// Verify, in constant time, a MAC the other side calculated with
    /// [`Sas::calculate_mac`].
    pub fn verify_mac(
        &self,
        input: impl AsRef<[u8]>,
        info: &str,
        tag: &Mac,
    ) -> Result<(), SasError> {
        let hmac = self.hmac(input.as_ref(), info)?;

        Ok(hmac.verify_slice(tag.as_bytes())?)
    }
}

/// Bytes derived from the SAS shared secret, ready to be shown to the user.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct SasBytes {
    bytes: [u8; Self::LENGTH],
}

impl SasBytes {
    const LENGTH: usize = 6;

    /// The raw bytes.
    pub fn as_bytes(&self) -> &[u8; Self::LENGTH] {
        &self.bytes
    }

    /// Split the first 42 bits into seven 6 bit numbers, each one an index
    /// into the Matrix SAS emoji table.
    pub fn emoji_indices(&self) -> [u8; 7] {
        let mut num = [0u8; 8];
        num[2..].copy_from_slice(&self.bytes);
        let num = u64::from_be_bytes(num);

        let mut indices = [0u8; 7];

        for (i, index) in indices.iter_mut().enumerate() {
            *index = ((num >> (42 - 6 * i)) & 0x3f) as u8;
        }

        indices
    }

    /// Split the first 39 bits into three 13 bit numbers, each one offset by
    /// 1000, so every number has four digits.
    pub fn decimals(&self) -> (u16, u16, u16) {
        let b = self.bytes.map(u16::from);

        let first = (b[0] << 5) | (b[1] >> 3);
        let second = ((b[1] & 0x7) << 10) | (b[2] << 2) | (b[3] >> 6);
        let third = ((b[3] & 0x3f) << 7) | (b[4] >> 1);

        (first + 1000, second + 1000, third + 1000)
    }
}
