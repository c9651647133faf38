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

//! ⚠️ Low-level "hazmat" functions.
//!
//! This module contains low level APIs that should *not* be used or needed by
//! most users.
//!
//! The ratchet chain and the message cipher are exported to aid very advanced
//! use cases, like implementing a variant of the ratchets on top of the same
//! key derivation.

#![cfg(feature = "low-level-api")]

pub use crate::{
    chain::{ChainKey, MessageKey, advance, hmac_derive},
    primitives::{
        aes_256_cbc_decrypt, aes_256_cbc_encrypt,
        cipher::{Cipher, DecryptionError, Mac},
        ecdh, hkdf_sha256, hmac_sha256, sha256,
    },
};

#[cfg(test)]
mod test {
    use super::{ChainKey, Cipher, advance};

    #[test]
    fn chain_and_cipher() {
        let chain_key = ChainKey::new(Box::new([5u8; 32]));
        let (next, message_key) = advance(&chain_key);

        assert_eq!(next.index(), 1);

        let cipher = Cipher::new(message_key.as_bytes());
        let ciphertext = cipher.encrypt(b"hazardous");

        assert_eq!(cipher.decrypt(&ciphertext).expect("The padding is valid"), b"hazardous");
    }
}
