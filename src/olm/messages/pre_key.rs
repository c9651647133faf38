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

use prost::Message as ProstMessage;
use serde::{Deserialize, Deserializer, Serialize, Serializer};

use super::Message;
use crate::{
    Curve25519PublicKey, DecodeError,
    olm::SessionKeys,
    utilities::{base64_decode, base64_encode, encode_bytes_field},
};

/// An encrypted Olm pre-key message.
///
/// Sent until the sender has received a message from the other side. Besides
/// a normal [`Message`] it carries the keys the receiver needs to establish
/// the session: the one-time key of the receiver, the base key, and the
/// identity key of the sender.
#[derive(Clone, Debug, PartialEq, Eq)]
pub struct PreKeyMessage {
    pub(crate) session_keys: SessionKeys,
    pub(crate) message: Message,
}

impl PreKeyMessage {
    const VERSION: u8 = 3;

    const ONE_TIME_KEY: u8 = 0x0A;
    const BASE_KEY: u8 = 0x12;
    const IDENTITY_KEY: u8 = 0x1A;
    const MESSAGE: u8 = 0x22;

    pub(crate) fn new(session_keys: SessionKeys, message: Message) -> Self {
        Self { session_keys, message }
    }

    /// The one-time key of the receiver that was used to establish the
    /// session.
    pub fn one_time_key(&self) -> Curve25519PublicKey {
        self.session_keys.one_time_key
    }

    /// The ephemeral base key the sender generated for the session.
    pub fn base_key(&self) -> Curve25519PublicKey {
        self.session_keys.base_key
    }

    /// The long term identity key of the sender.
    pub fn identity_key(&self) -> Curve25519PublicKey {
        self.session_keys.identity_key
    }

    /// All the keys that were used to establish the session.
    pub fn session_keys(&self) -> SessionKeys {
        self.session_keys
    }

    /// The id of the session this message belongs to.
    pub fn session_id(&self) -> String {
        self.session_keys.session_id()
    }

    /// The embedded, normal, Olm message.
    pub fn message(&self) -> &Message {
        &self.message
    }

    /// Try to decode a pre-key message from its binary wire format.
    pub fn from_bytes(message: &[u8]) -> Result<Self, DecodeError> {
        Self::try_from(message)
    }

    /// Encode the pre-key message into its binary wire format.
    pub fn to_bytes(&self) -> Vec<u8> {
        let mut output = vec![Self::VERSION];

        encode_bytes_field(
            &mut output,
            Self::ONE_TIME_KEY,
            self.session_keys.one_time_key.as_bytes(),
        );
        encode_bytes_field(&mut output, Self::BASE_KEY, self.session_keys.base_key.as_bytes());
        encode_bytes_field(
            &mut output,
            Self::IDENTITY_KEY,
            self.session_keys.identity_key.as_bytes(),
        );
        encode_bytes_field(&mut output, Self::MESSAGE, &self.message.to_bytes());

        output
    }

    /// Try to decode a pre-key message from unpadded base64.
    pub fn from_base64(message: &str) -> Result<Self, DecodeError> {
        Self::from_bytes(&base64_decode(message)?)
    }

    /// Encode the pre-key message as unpadded base64.
    pub fn to_base64(&self) -> String {
        base64_encode(self.to_bytes())
    }
}

impl Serialize for PreKeyMessage {
    fn serialize<S: Serializer>(&self, serializer: S) -> Result<S::Ok, S::Error> {
        serializer.serialize_str(&self.to_base64())
    }
}

impl<'de> Deserialize<'de> for PreKeyMessage {
    fn deserialize<D: Deserializer<'de>>(d: D) -> Result<Self, D::Error> {
        let ciphertext = String::deserialize(d)?;
        PreKeyMessage::from_base64(&ciphertext).map_err(serde::de::Error::custom)
    }
}

impl TryFrom<&[u8]> for PreKeyMessage {
    type Error = DecodeError;

    fn try_from(value: &[u8]) -> Result<Self, Self::Error> {
        let version = *value.first().ok_or(DecodeError::MissingVersion)?;

        if version != Self::VERSION {
            Err(DecodeError::InvalidVersion(Self::VERSION, version))
        } else {
            let decoded = ProtoBufPreKeyMessage::decode(&value[1..])?;

            let one_time_key = Curve25519PublicKey::from_slice(&decoded.one_time_key)?;
            let base_key = Curve25519PublicKey::from_slice(&decoded.base_key)?;
            let identity_key = Curve25519PublicKey::from_slice(&decoded.identity_key)?;
            let message = Message::from_bytes(&decoded.message)?;

            let session_keys = SessionKeys { identity_key, base_key, one_time_key };

            Ok(Self { session_keys, message })
        }
    }
}

#[derive(Clone, ProstMessage)]
struct ProtoBufPreKeyMessage {
    #[prost(bytes, tag = "1")]
    one_time_key: Vec<u8>,
    #[prost(bytes, tag = "2")]
    base_key: Vec<u8>,
    #[prost(bytes, tag = "3")]
    identity_key: Vec<u8>,
    #[prost(bytes, tag = "4")]
    message: Vec<u8>,
}

#[cfg(test)]
mod test {
    use assert_matches2::assert_matches;

    use super::{Message, PreKeyMessage};
    use crate::{Curve25519PublicKey, DecodeError, olm::SessionKeys};

    #[test]
    fn missing_keys_are_rejected() {
        // A pre-key message containing only the version and an empty one-time key.
        assert_matches!(
            PreKeyMessage::from_bytes(b"\x03\x0A\x00"),
            Err(DecodeError::InvalidKey(_))
        );
        assert_matches!(PreKeyMessage::from_bytes(b""), Err(DecodeError::MissingVersion));
    }

    #[test]
    fn session_id_matches_session_keys() {
        let session_keys = SessionKeys {
            identity_key: Curve25519PublicKey::from_bytes([1u8; 32]),
            base_key: Curve25519PublicKey::from_bytes([2u8; 32]),
            one_time_key: Curve25519PublicKey::from_bytes([3u8; 32]),
        };

        let message = Message {
            ratchet_key: Curve25519PublicKey::from_bytes([4u8; 32]),
            chain_index: 0,
            ciphertext: b"ciphertext".to_vec(),
            mac: *b"MACHEREE",
        };

        let pre_key = PreKeyMessage::new(session_keys, message);
        let decoded =
            PreKeyMessage::from_bytes(&pre_key.to_bytes()).expect("The message should decode");

        assert_eq!(decoded, pre_key);
        assert_eq!(decoded.session_id(), session_keys.session_id());
    }
}
