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

//! An implementation of the Megolm group ratchet.
//!
//! A [`GroupSession`] is owned by a single sender. Every message it encrypts
//! uses the next state of a hash ratchet, is authenticated with a truncated
//! HMAC, and is signed with the Ed25519 key of the session.
//!
//! The sender hands out a [`SessionKey`] to every recipient, typically over an
//! Olm channel. The recipients create an [`InboundGroupSession`] from it, which
//! can decrypt every message from the index of the session key onwards, in any
//! order. Inbound sessions can be re-exported at any later index as an
//! [`ExportedSessionKey`], which is how message keys are shared with new
//! devices without revealing the earlier history.
//!
//! ```rust
//! use anyhow::Result;
//! use olmcore::megolm::{GroupSession, InboundGroupSession};
//!
//! fn main() -> Result<()> {
//!     let mut outbound = GroupSession::new(&mut rand::thread_rng())?;
//!     let mut inbound = InboundGroupSession::new(&outbound.session_key());
//!
//!     let message = outbound.encrypt("It's a secret to everybody");
//!     let decrypted = inbound.decrypt(&message)?;
//!
//!     assert_eq!(decrypted.plaintext, b"It's a secret to everybody");
//!     assert_eq!(decrypted.message_index, 0);
//!
//!     Ok(())
//! }
//! ```

mod group_session;
mod inbound_group_session;
mod message;
mod ratchet;
mod session_keys;

pub use group_session::GroupSession;
pub use inbound_group_session::{DecryptedMessage, DecryptionError, InboundGroupSession};
pub use message::MegolmMessage;
pub use session_keys::{ExportedSessionKey, SessionKey, SessionKeyDecodeError};

#[cfg(test)]
mod test {
    use anyhow::Result;
    use rand::thread_rng;

    use super::{GroupSession, InboundGroupSession, MegolmMessage, SessionKey};

    #[test]
    fn decrypting_after_a_long_gap() -> Result<()> {
        let mut outbound = GroupSession::new(&mut thread_rng())?;
        let session_key = SessionKey::from_base64(&outbound.session_key().to_base64())?;
        let mut inbound = InboundGroupSession::new(&session_key);

        let third = (0..3).map(|i| outbound.encrypt(format!("{i}"))).last();
        let third = third.expect("Three messages were encrypted");

        for _ in 3..2002 {
            outbound.encrypt("Skipped");
        }

        let message = MegolmMessage::from_base64(&outbound.encrypt("Last secret").to_base64())?;
        let decrypted = inbound.decrypt(&message)?;

        assert_eq!(decrypted.plaintext, b"Last secret");
        assert_eq!(decrypted.message_index, 2002);

        let decrypted = inbound.decrypt(&third)?;

        assert_eq!(decrypted.plaintext, b"2");
        assert_eq!(decrypted.message_index, 2);

        Ok(())
    }

    #[test]
    fn exporting() -> Result<()> {
        let mut outbound = GroupSession::new(&mut thread_rng())?;
        let mut inbound = InboundGroupSession::new(&outbound.session_key());

        let message = outbound.encrypt("It's a secret to everybody");
        assert_eq!(inbound.decrypt(&message)?.message_index, 0);

        let export = inbound.export_at(1).expect("Can export after the initial index");
        let mut imported = InboundGroupSession::import(&export);

        assert_eq!(outbound.session_id(), imported.session_id());
        imported.decrypt(&message).expect_err("Can't decrypt below the exported index");
        assert!(imported.export_at(0).is_none(), "Can't export below the exported index");

        Ok(())
    }
}
