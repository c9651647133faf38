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

//! The triple Diffie-Hellman handshake that establishes an Olm session.
//!
//! The handshake takes four Curve25519 inputs: the identity keys of Alice and
//! Bob (Ia, Ib), the base key of Alice (Ea), and the one-time key of Bob (Eb).
//!
//! The initial root key R0 and the initial chain key C0 are derived from the
//! shared secret S with HKDF-SHA-256, a single zero byte as the salt, and
//! "OLM_ROOT" as the info.
//!
//! ```text
//!     S = ECDH(Ia, Eb) || ECDH(Ea, Ib) || ECDH(Ea, Eb)
//!
//!     R0, C0 = HKDF(0, S, "OLM_ROOT", 64)
//! ```

use zeroize::{Zeroize, ZeroizeOnDrop};

use crate::{
    Curve25519PublicKey, Curve25519SecretKey, KeyError,
    chain::ChainKey,
    primitives::{ecdh, expand_key},
};

use super::session::root_key::RootKey;

const ROOT_INFO: &[u8] = b"OLM_ROOT";

/// The 96 byte shared secret of the triple Diffie-Hellman handshake.
#[derive(Zeroize, ZeroizeOnDrop)]
pub(super) struct Shared3DHSecret(Box<[u8; 96]>);

impl Shared3DHSecret {
    fn merge(first: Box<[u8; 32]>, second: Box<[u8; 32]>, third: Box<[u8; 32]>) -> Self {
        let mut secret = Box::new([0u8; 96]);

        secret[0..32].copy_from_slice(first.as_slice());
        secret[32..64].copy_from_slice(second.as_slice());
        secret[64..96].copy_from_slice(third.as_slice());

        for mut part in [first, second, third] {
            part.zeroize();
        }

        Self(secret)
    }

    /// The secret as computed by the party creating the outbound session,
    /// Alice.
    pub fn outbound(
        identity_key: &Curve25519SecretKey,
        base_key: &Curve25519SecretKey,
        their_identity_key: &Curve25519PublicKey,
        their_one_time_key: &Curve25519PublicKey,
    ) -> Result<Self, KeyError> {
        Ok(Self::merge(
            ecdh(identity_key, their_one_time_key)?,
            ecdh(base_key, their_identity_key)?,
            ecdh(base_key, their_one_time_key)?,
        ))
    }

    /// The secret as computed by the party receiving the pre-key message,
    /// Bob.
    pub fn inbound(
        identity_key: &Curve25519SecretKey,
        one_time_key: &Curve25519SecretKey,
        their_identity_key: &Curve25519PublicKey,
        their_base_key: &Curve25519PublicKey,
    ) -> Result<Self, KeyError> {
        Ok(Self::merge(
            ecdh(one_time_key, their_identity_key)?,
            ecdh(identity_key, their_base_key)?,
            ecdh(one_time_key, their_base_key)?,
        ))
    }

    /// Derive the initial root key and chain key.
    pub fn expand(self) -> (RootKey, ChainKey) {
        let mut expanded = expand_key::<64>(Some(&[0]), self.0.as_slice(), ROOT_INFO);

        let mut root_key = Box::new([0u8; 32]);
        let mut chain_key = Box::new([0u8; 32]);

        root_key.copy_from_slice(&expanded[0..32]);
        chain_key.copy_from_slice(&expanded[32..64]);

        expanded.zeroize();

        (RootKey::new(root_key), ChainKey::new(chain_key))
    }
}

#[cfg(test)]
mod test {
    use assert_matches2::assert_matches;
    use rand::thread_rng;

    use super::Shared3DHSecret;
    use crate::{Curve25519Keypair, Curve25519PublicKey, KeyError};

    #[test]
    fn triple_diffie_hellman() {
        let mut rng = thread_rng();

        let alice_identity = Curve25519Keypair::new(&mut rng).expect("Should create a key pair");
        let alice_base = Curve25519Keypair::new(&mut rng).expect("Should create a key pair");
        let bob_identity = Curve25519Keypair::new(&mut rng).expect("Should create a key pair");
        let bob_one_time = Curve25519Keypair::new(&mut rng).expect("Should create a key pair");

        let alice_secret = Shared3DHSecret::outbound(
            alice_identity.secret_key(),
            alice_base.secret_key(),
            &bob_identity.public_key(),
            &bob_one_time.public_key(),
        )
        .expect("The handshake should succeed");

        let bob_secret = Shared3DHSecret::inbound(
            bob_identity.secret_key(),
            bob_one_time.secret_key(),
            &alice_identity.public_key(),
            &alice_base.public_key(),
        )
        .expect("The handshake should succeed");

        assert_eq!(alice_secret.0, bob_secret.0);

        let (alice_root, alice_chain) = alice_secret.expand();
        let (bob_root, bob_chain) = bob_secret.expand();

        assert_eq!(alice_root.as_bytes(), bob_root.as_bytes());
        assert_eq!(alice_chain.as_bytes(), bob_chain.as_bytes());
        assert_eq!(alice_chain.index(), 0);
    }

    #[test]
    fn low_order_one_time_key_is_rejected() {
        let mut rng = thread_rng();

        let alice_identity = Curve25519Keypair::new(&mut rng).expect("Should create a key pair");
        let alice_base = Curve25519Keypair::new(&mut rng).expect("Should create a key pair");
        let bob_identity = Curve25519Keypair::new(&mut rng).expect("Should create a key pair");

        let result = Shared3DHSecret::outbound(
            alice_identity.secret_key(),
            alice_base.secret_key(),
            &bob_identity.public_key(),
            &Curve25519PublicKey::from_bytes([0u8; 32]),
        );

        assert_matches!(result.err(), Some(KeyError::NonContributoryKey));
    }
}
