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

use zeroize::{Zeroize, ZeroizeOnDrop};

use crate::{Curve25519PublicKey, Curve25519SecretKey, chain::ChainKey, primitives::expand_key};

const ADVANCEMENT_SEED: &[u8; 11] = b"OLM_RATCHET";

/// The root key of the asymmetric ratchet.
#[derive(Clone, Zeroize, ZeroizeOnDrop)]
pub(crate) struct RootKey(Box<[u8; 32]>);

impl RootKey {
    pub fn new(bytes: Box<[u8; 32]>) -> Self {
        Self(bytes)
    }

    pub fn as_bytes(&self) -> &[u8; 32] {
        &self.0
    }

    /// Perform a Diffie-Hellman ratchet step.
    ///
    /// ```text
    ///     R(i), C(i) = HKDF(R(i-1), ECDH(T(i-1), T(i)), "OLM_RATCHET", 64)
    /// ```
    ///
    /// The sender uses its new ratchet key and the last ratchet key of the
    /// other side, the receiver uses its current ratchet key and the new
    /// ratchet key of the sender. Both arrive at the same root and chain key.
    pub fn advance(
        &self,
        our_ratchet_key: &Curve25519SecretKey,
        their_ratchet_key: &Curve25519PublicKey,
    ) -> (RootKey, ChainKey) {
        let shared_secret = our_ratchet_key.diffie_hellman(their_ratchet_key);
        let mut output =
            expand_key::<64>(Some(self.0.as_slice()), shared_secret.as_bytes(), ADVANCEMENT_SEED);

        let mut root_key = Box::new([0u8; 32]);
        let mut chain_key = Box::new([0u8; 32]);

        root_key.copy_from_slice(&output[..32]);
        chain_key.copy_from_slice(&output[32..]);

        output.zeroize();

        (RootKey(root_key), ChainKey::new(chain_key))
    }
}

#[cfg(test)]
mod test {
    use rand::thread_rng;

    use super::RootKey;
    use crate::Curve25519Keypair;

    #[test]
    fn both_sides_derive_the_same_keys() {
        let mut rng = thread_rng();

        let root_key = RootKey::new(Box::new([1u8; 32]));
        let alice = Curve25519Keypair::new(&mut rng).expect("Should create a key pair");
        let bob = Curve25519Keypair::new(&mut rng).expect("Should create a key pair");

        let (alice_root, alice_chain) = root_key.advance(alice.secret_key(), &bob.public_key());
        let (bob_root, bob_chain) = root_key.advance(bob.secret_key(), &alice.public_key());

        assert_eq!(alice_root.as_bytes(), bob_root.as_bytes());
        assert_eq!(alice_chain.as_bytes(), bob_chain.as_bytes());
        assert_ne!(alice_root.as_bytes(), root_key.as_bytes());
    }
}
