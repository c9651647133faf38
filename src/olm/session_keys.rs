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

use matrix_pickle::{Decode, Encode};
use serde::{Deserialize, Serialize};

use crate::{Curve25519PublicKey, primitives::sha256, utilities::base64_encode};

/// The set of keys that were used to establish an Olm session.
///
/// The identity key and the base key belong to the party that created the
/// outbound session, the one-time key belongs to the receiving party.
#[derive(Clone, Copy, Debug, PartialEq, Eq, Serialize, Deserialize, Encode, Decode)]
pub struct SessionKeys {
    /// The long term identity key of the party that created the session.
    pub identity_key: Curve25519PublicKey,
    /// The ephemeral base key of the party that created the session.
    pub base_key: Curve25519PublicKey,
    /// The one-time key of the party that received the session.
    pub one_time_key: Curve25519PublicKey,
}

impl SessionKeys {
    /// The globally unique id of the session these keys belong to.
    ///
    /// The id is the unpadded base64 encoded SHA-256 digest of the identity
    /// key, the base key, and the one-time key, in that order. Both parties
    /// compute the same id.
    pub fn session_id(&self) -> String {
        let mut keys = [0u8; Curve25519PublicKey::LENGTH * 3];

        keys[0..32].copy_from_slice(self.identity_key.as_bytes());
        keys[32..64].copy_from_slice(self.base_key.as_bytes());
        keys[64..96].copy_from_slice(self.one_time_key.as_bytes());

        base64_encode(sha256(&keys))
    }
}
