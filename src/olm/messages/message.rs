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

use prost::Message as ProstMessage;

use crate::{
    Curve25519PublicKey, DecodeError,
    chain::MessageKey,
    primitives::cipher::Mac,
    utilities::{base64_decode, base64_encode, encode_bytes_field, encode_varint_field},
};

const VERSION: u8 = 3;

/// An encrypted Olm message.
///
/// Contains the ratchet key the message was encrypted under, the index of the
/// message in the sending chain, the ciphertext, and a MAC truncated to 8
/// bytes.
#[derive(Clone, PartialEq, Eq)]
pub struct Message {
    pub(crate) ratchet_key: Curve25519PublicKey,
    pub(crate) chain_index: u32,
    pub(crate) ciphertext: Vec<u8>,
    pub(crate) mac: [u8; Mac::TRUNCATED_LEN],
}

impl Message {
    /// Encrypt the plaintext with the given message key and authenticate the
    /// encoded message.
    pub(crate) fn encrypt(
        ratchet_key: Curve25519PublicKey,
        message_key: &MessageKey,
        plaintext: &[u8],
    ) -> Self {
        let cipher = message_key.cipher();
        let ciphertext = cipher.encrypt(plaintext);

        let mut message = Self {
            ratchet_key,
            chain_index: message_key.index(),
            ciphertext,
            mac: [0u8; Mac::TRUNCATED_LEN],
        };

        message.mac = cipher.mac(&message.to_mac_bytes()).truncate();

        message
    }

    /// The public part of the ratchet key that was used to encrypt the
    /// message.
    pub fn ratchet_key(&self) -> Curve25519PublicKey {
        self.ratchet_key
    }

    /// The index of the message in the sending chain.
    pub fn chain_index(&self) -> u32 {
        self.chain_index
    }

    /// The encrypted payload of the message.
    pub fn ciphertext(&self) -> &[u8] {
        &self.ciphertext
    }

    /// The truncated message authentication code.
    pub fn mac(&self) -> &[u8; Mac::TRUNCATED_LEN] {
        &self.mac
    }

    /// The bytes the MAC is calculated over, the version byte and the encoded
    /// fields.
    pub(crate) fn to_mac_bytes(&self) -> Vec<u8> {
        let mut output = vec![VERSION];

        encode_bytes_field(&mut output, ProtoBufMessage::RATCHET_KEY, self.ratchet_key.as_bytes());
        encode_varint_field(&mut output, ProtoBufMessage::CHAIN_INDEX, self.chain_index);
        encode_bytes_field(&mut output, ProtoBufMessage::CIPHERTEXT, &self.ciphertext);

        output
    }

    /// Try to decode a message from its binary wire format.
    pub fn from_bytes(bytes: &[u8]) -> Result<Self, DecodeError> {
        Self::try_from(bytes)
    }

    /// Encode the message into its binary wire format.
    pub fn to_bytes(&self) -> Vec<u8> {
        let mut message = self.to_mac_bytes();
        message.extend(self.mac);

        message
    }

    /// Try to decode a message from unpadded base64.
    pub fn from_base64(message: &str) -> Result<Self, DecodeError> {
        Self::from_bytes(&base64_decode(message)?)
    }

    /// Encode the message as unpadded base64.
    pub fn to_base64(&self) -> String {
        base64_encode(self.to_bytes())
    }
}

impl TryFrom<&[u8]> for Message {
    type Error = DecodeError;

    fn try_from(value: &[u8]) -> Result<Self, Self::Error> {
        let version = *value.first().ok_or(DecodeError::MissingVersion)?;

        if version != VERSION {
            Err(DecodeError::InvalidVersion(VERSION, version))
        } else if value.len() < Mac::TRUNCATED_LEN + 2 {
            Err(DecodeError::MessageTooShort(value.len()))
        } else {
            let (payload, mac) = value.split_at(value.len() - Mac::TRUNCATED_LEN);
            let inner = ProtoBufMessage::decode(&payload[1..])?;

            let mac = mac.try_into().map_err(|_| DecodeError::InvalidMacLength(mac.len()))?;
            let chain_index = u32::try_from(inner.chain_index)
                .map_err(|_| DecodeError::IndexOutOfRange(inner.chain_index))?;
            let ratchet_key = Curve25519PublicKey::from_slice(&inner.ratchet_key)?;

            Ok(Message { ratchet_key, chain_index, ciphertext: inner.ciphertext, mac })
        }
    }
}

impl fmt::Debug for Message {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("Message")
            .field("ratchet_key", &self.ratchet_key)
            .field("chain_index", &self.chain_index)
            .finish_non_exhaustive()
    }
}

#[derive(ProstMessage, PartialEq)]
struct ProtoBufMessage {
    #[prost(bytes, tag = "1")]
    ratchet_key: Vec<u8>,
    #[prost(uint64, tag = "2")]
    chain_index: u64,
    #[prost(bytes, tag = "4")]
    ciphertext: Vec<u8>,
}

impl ProtoBufMessage {
    const RATCHET_KEY: u8 = 0x0A;
    const CHAIN_INDEX: u8 = 0x10;
    const CIPHERTEXT: u8 = 0x22;
}

#[cfg(test)]
mod test {
    use assert_matches2::assert_matches;

    use super::Message;
    use crate::{Curve25519PublicKey, DecodeError, ErrorKind};

    #[test]
    fn encode() {
        let message = b"\x03\n\x20ratchetkeyhereprettyplease123456\x10\x01\"\nciphertext";
        let message_mac =
            b"\x03\n\x20ratchetkeyhereprettyplease123456\x10\x01\"\nciphertextMACHEREE";

        let encoded = Message {
            ratchet_key: Curve25519PublicKey::from_bytes(*b"ratchetkeyhereprettyplease123456"),
            chain_index: 1,
            ciphertext: b"ciphertext".to_vec(),
            mac: *b"MACHEREE",
        };

        assert_eq!(encoded.to_mac_bytes(), message.as_ref());
        assert_eq!(encoded.to_bytes(), message_mac.as_ref());

        let decoded = Message::from_bytes(message_mac).expect("The message should decode");
        assert_eq!(decoded, encoded);
    }

    #[test]
    fn decoding_rejects_malformed_input() {
        assert_matches!(Message::from_bytes(b""), Err(DecodeError::MissingVersion));
        assert_matches!(Message::from_bytes(b"\x03abc"), Err(DecodeError::MessageTooShort(4)));

        let error = Message::from_bytes(b"\x02\n\x20ratchetkeyhereprettyplease123456MACHEREE")
            .expect_err("An unknown version should be rejected");
        assert_eq!(error.kind(), ErrorKind::UnsupportedVersion);
        assert_matches!(error, DecodeError::InvalidVersion(3, 2));

        let error = Message::from_bytes(b"\x03\n\x03abc\x10\x01MACHEREE")
            .expect_err("A short ratchet key should be rejected");
        assert_eq!(error.kind(), ErrorKind::BadMessageFormat);
        assert_matches!(error, DecodeError::InvalidKey(_));
    }
}
