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

use std::fmt::Debug;

use prost::Message;
use serde::{Deserialize, Serialize};

use crate::{
    DecodeError, Ed25519Keypair, Ed25519Signature,
    primitives::cipher::{Cipher, Mac},
    utilities::{base64_decode, base64_encode, encode_bytes_field, encode_varint_field},
};

const VERSION: u8 = 3;

/// An encrypted Megolm message.
///
/// Contains metadata that is required to find the correct ratchet state of a
/// [`InboundGroupSession`] necessary to decrypt the message.
///
/// [`InboundGroupSession`]: crate::megolm::InboundGroupSession
#[derive(Clone, PartialEq, Eq)]
pub struct MegolmMessage {
    pub(super) ciphertext: Vec<u8>,
    pub(super) message_index: u32,
    pub(super) mac: [u8; Mac::TRUNCATED_LEN],
    pub(super) signature: Ed25519Signature,
}

impl MegolmMessage {
    const SUFFIX_LENGTH: usize = Mac::TRUNCATED_LEN + Ed25519Signature::LENGTH;

    /// The actual ciphertext of the message.
    pub fn ciphertext(&self) -> &[u8] {
        &self.ciphertext
    }

    /// The index of the message that was used when the message was encrypted.
    pub fn message_index(&self) -> u32 {
        self.message_index
    }

    /// The truncated message authentication code of the message.
    pub fn mac(&self) -> &[u8; Mac::TRUNCATED_LEN] {
        &self.mac
    }

    /// The signature of the message.
    pub fn signature(&self) -> &Ed25519Signature {
        &self.signature
    }

    /// Try to decode the given byte slice as a [`MegolmMessage`].
    ///
    /// The expected format of the byte array is described in the
    /// [`MegolmMessage::to_bytes()`] method.
    pub fn from_bytes(message: &[u8]) -> Result<Self, DecodeError> {
        Self::try_from(message)
    }

    /// Encode the [`MegolmMessage`] as an array of bytes.
    ///
    /// Megolm messages consist of a one byte version, followed by a variable
    /// length payload, a fixed length message authentication code, and a fixed
    /// length signature.
    ///
    /// ```text
    /// +---+------------------------------------+-----------+------------------+
    /// | V | Payload Bytes                      | MAC Bytes | Signature Bytes  |
    /// +---+------------------------------------+-----------+------------------+
    /// 0   1                                    N          N+8                N+72   bytes
    /// ```
    ///
    /// The payload uses a format based on the Protocol Buffers encoding. It
    /// consists of the following key-value pairs:
    ///
    ///    **Name**  |**Tag**|**Type**|            **Meaning**
    /// :-----------:|:-----:|:------:|:---------------------------------------:
    /// Message-Index|  0x08 | Integer|The index of the ratchet, i
    /// Cipher-Text  |  0x12 | String |The cipher-text, Xi, of the message
    pub fn to_bytes(&self) -> Vec<u8> {
        let mut message = self.to_signature_bytes();
        message.extend(self.signature.to_bytes());

        message
    }

    /// Try to decode the given string as a [`MegolmMessage`].
    ///
    /// The string needs to be a base64 encoded byte array that follows the
    /// format described in the [`MegolmMessage::to_bytes()`] method.
    pub fn from_base64(message: &str) -> Result<Self, DecodeError> {
        Self::try_from(message)
    }

    /// Encode the [`MegolmMessage`] as an unpadded base64 string.
    pub fn to_base64(&self) -> String {
        base64_encode(self.to_bytes())
    }

    /// Encrypt the plaintext with the given cipher, authenticate the payload,
    /// and sign the payload together with the MAC.
    pub(super) fn encrypt(
        message_index: u32,
        cipher: &Cipher,
        signing_key: &Ed25519Keypair,
        plaintext: &[u8],
    ) -> Self {
        let ciphertext = cipher.encrypt(plaintext);

        let mut signed = encode_payload(message_index, &ciphertext);
        let mac = cipher.mac(&signed).truncate();
        signed.extend(mac);

        let signature = signing_key.sign(&signed);

        Self { ciphertext, message_index, mac, signature }
    }

    /// The version byte and the payload, the bytes the MAC covers.
    pub(super) fn to_mac_bytes(&self) -> Vec<u8> {
        encode_payload(self.message_index, &self.ciphertext)
    }

    /// The version byte, the payload, and the MAC, the bytes the signature
    /// covers.
    pub(super) fn to_signature_bytes(&self) -> Vec<u8> {
        let mut message = self.to_mac_bytes();
        message.extend(self.mac);

        message
    }
}

fn encode_payload(message_index: u32, ciphertext: &[u8]) -> Vec<u8> {
    // Prost skips a zero message index, deployed clients can't decode that,
    // so the payload is written by hand.
    let mut payload = vec![VERSION];

    encode_varint_field(&mut payload, ProtobufMegolmMessage::INDEX_TAG, message_index);
    encode_bytes_field(&mut payload, ProtobufMegolmMessage::CIPHER_TAG, ciphertext);

    payload
}

impl Serialize for MegolmMessage {
    fn serialize<S>(&self, serializer: S) -> Result<S::Ok, S::Error>
    where
        S: serde::Serializer,
    {
        let message = self.to_base64();
        serializer.serialize_str(&message)
    }
}

impl<'de> Deserialize<'de> for MegolmMessage {
    fn deserialize<D: serde::Deserializer<'de>>(d: D) -> Result<Self, D::Error> {
        let ciphertext = String::deserialize(d)?;
        Self::from_base64(&ciphertext).map_err(serde::de::Error::custom)
    }
}

impl TryFrom<&str> for MegolmMessage {
    type Error = DecodeError;

    fn try_from(message: &str) -> Result<Self, Self::Error> {
        let decoded = base64_decode(message)?;

        Self::try_from(decoded.as_slice())
    }
}

impl TryFrom<&[u8]> for MegolmMessage {
    type Error = DecodeError;

    fn try_from(message: &[u8]) -> Result<Self, Self::Error> {
        let version = *message.first().ok_or(DecodeError::MissingVersion)?;

        if version != VERSION {
            Err(DecodeError::InvalidVersion(VERSION, version))
        } else if message.len() < Self::SUFFIX_LENGTH + 2 {
            Err(DecodeError::MessageTooShort(message.len()))
        } else {
            let (payload, suffix) = message.split_at(message.len() - Self::SUFFIX_LENGTH);
            let (mac, signature) = suffix.split_at(Mac::TRUNCATED_LEN);

            let inner = ProtobufMegolmMessage::decode(&payload[1..])?;

            let message_index = u32::try_from(inner.message_index)
                .map_err(|_| DecodeError::IndexOutOfRange(inner.message_index))?;
            let mac = mac.try_into().map_err(|_| DecodeError::InvalidMacLength(mac.len()))?;
            let signature = Ed25519Signature::from_slice(signature)?;

            Ok(MegolmMessage { ciphertext: inner.ciphertext, message_index, mac, signature })
        }
    }
}

impl Debug for MegolmMessage {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("MegolmMessage")
            .field("message_index", &self.message_index)
            .finish_non_exhaustive()
    }
}

#[derive(Clone, Message, PartialEq, Eq)]
struct ProtobufMegolmMessage {
    #[prost(uint64, tag = "1")]
    pub message_index: u64,
    #[prost(bytes, tag = "2")]
    pub ciphertext: Vec<u8>,
}

impl ProtobufMegolmMessage {
    const INDEX_TAG: u8 = 0x08;
    const CIPHER_TAG: u8 = 0x12;
}
