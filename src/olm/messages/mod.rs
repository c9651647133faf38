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

mod message;
mod pre_key;

pub use message::Message;
pub use pre_key::PreKeyMessage;
use serde::{Deserialize, Serialize};

use crate::DecodeError;

/// An enum over the two supported message types.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum OlmMessage {
    /// A normal message, contains only the ciphertext and metadata to decrypt
    /// it.
    Normal(Message),
    /// A pre-key message, contains metadata to establish a [`Session`] as well
    /// as a [`Message`].
    ///
    /// [`Session`]: crate::olm::Session
    PreKey(PreKeyMessage),
}

impl From<Message> for OlmMessage {
    fn from(m: Message) -> Self {
        Self::Normal(m)
    }
}

impl From<PreKeyMessage> for OlmMessage {
    fn from(m: PreKeyMessage) -> Self {
        Self::PreKey(m)
    }
}

#[derive(Serialize, Deserialize)]
struct MessageSerdeHelper {
    #[serde(rename = "type")]
    message_type: usize,
    #[serde(rename = "body")]
    ciphertext: String,
}

impl Serialize for OlmMessage {
    fn serialize<S: serde::Serializer>(&self, serializer: S) -> Result<S::Ok, S::Error> {
        let (message_type, ciphertext) = self.to_parts();

        MessageSerdeHelper { message_type, ciphertext }.serialize(serializer)
    }
}

impl<'de> Deserialize<'de> for OlmMessage {
    fn deserialize<D: serde::Deserializer<'de>>(d: D) -> Result<Self, D::Error> {
        let value = MessageSerdeHelper::deserialize(d)?;

        OlmMessage::from_parts(value.message_type, &value.ciphertext)
            .map_err(serde::de::Error::custom)
    }
}

impl OlmMessage {
    /// Create an [`OlmMessage`] from a message type and the base64 encoded
    /// message body.
    pub fn from_parts(message_type: usize, ciphertext: &str) -> Result<Self, DecodeError> {
        match MessageType::try_from(message_type) {
            Ok(MessageType::PreKey) => Ok(Self::PreKey(PreKeyMessage::from_base64(ciphertext)?)),
            Ok(MessageType::Normal) => Ok(Self::Normal(Message::from_base64(ciphertext)?)),
            Err(()) => Err(DecodeError::MessageType(message_type)),
        }
    }

    /// The message type tag and the base64 encoded message body.
    pub fn to_parts(&self) -> (usize, String) {
        let message_type = self.message_type().into();

        match self {
            OlmMessage::Normal(m) => (message_type, m.to_base64()),
            OlmMessage::PreKey(m) => (message_type, m.to_base64()),
        }
    }

    /// The encrypted payload of the message.
    pub fn ciphertext(&self) -> &[u8] {
        &self.message().ciphertext
    }

    /// The type of the message.
    pub fn message_type(&self) -> MessageType {
        match self {
            OlmMessage::Normal(_) => MessageType::Normal,
            OlmMessage::PreKey(_) => MessageType::PreKey,
        }
    }

    /// The normal message, embedded in the pre-key message for the pre-key
    /// variant.
    pub fn message(&self) -> &Message {
        match self {
            OlmMessage::Normal(m) => m,
            OlmMessage::PreKey(m) => &m.message,
        }
    }
}

/// The type tag of an Olm message.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum MessageType {
    /// A pre-key message, tagged with `0`.
    PreKey = 0,
    /// A normal message, tagged with `1`.
    Normal = 1,
}

impl TryFrom<usize> for MessageType {
    type Error = ();

    fn try_from(value: usize) -> Result<Self, Self::Error> {
        match value {
            0 => Ok(MessageType::PreKey),
            1 => Ok(MessageType::Normal),
            _ => Err(()),
        }
    }
}

impl From<MessageType> for usize {
    fn from(value: MessageType) -> usize {
        value as usize
    }
}
