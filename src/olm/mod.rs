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

//! An implementation of the Olm double ratchet.
//!
//! ## Overview
//!
//! Every Olm participant owns a long term Curve25519 *identity key pair* and
//! publishes a number of Curve25519 *one-time keys*. Key management, signing
//! and publishing of those keys is left to the caller.
//!
//! A triple Diffie-Hellman key exchange (3DH) between the identity key and a
//! fresh base key of one side, and the identity key and a one-time key of the
//! other side, establishes an Olm session on each side of the communication
//! channel. Ultimately, this session is used for deriving the concrete
//! encryption keys for a particular message.
//!
//! The side that starts the conversation calls [`Session::create_outbound`]
//! with the identity key and one of the one-time keys of the other side. The
//! protocol is asynchronous, so the participant can start sending messages to
//! the other side even before the other side has created a session, producing
//! so-called pre-key messages (see [`PreKeyMessage`]).
//!
//! Once the other participant receives such a pre-key message, they create
//! their own matching session by calling [`Session::create_inbound`] with
//! their identity key, the one-time key the message was encrypted for, and the
//! message. This completes the establishment of the Olm communication channel.
//!
//! ```rust
//! use anyhow::Result;
//! use olmcore::{
//!     Curve25519Keypair,
//!     olm::{OlmMessage, Session, SessionConfig},
//! };
//!
//! fn main() -> Result<()> {
//!     let mut rng = rand::thread_rng();
//!
//!     let alice_identity = Curve25519Keypair::new(&mut rng)?;
//!     let bob_identity = Curve25519Keypair::new(&mut rng)?;
//!     let bob_one_time_key = Curve25519Keypair::new(&mut rng)?;
//!
//!     let mut alice_session = Session::create_outbound(
//!         SessionConfig::default(),
//!         &alice_identity,
//!         bob_identity.public_key(),
//!         bob_one_time_key.public_key(),
//!         &mut rng,
//!     )?;
//!
//!     let message = "Keep it between us, OK?";
//!     let alice_msg = alice_session.encrypt(message, &mut rng)?;
//!
//!     if let OlmMessage::PreKey(m) = &alice_msg {
//!         let mut bob_session = Session::create_inbound(
//!             SessionConfig::default(),
//!             &bob_identity,
//!             &bob_one_time_key,
//!             m,
//!         )?;
//!
//!         let what_bob_received = bob_session.decrypt(&alice_msg)?;
//!
//!         assert_eq!(alice_session.session_id(), bob_session.session_id());
//!         assert_eq!(message.as_bytes(), what_bob_received);
//!
//!         let bob_reply = "Yes. Take this, it's dangerous out there!";
//!         let bob_encrypted_reply = bob_session.encrypt(bob_reply, &mut rng)?;
//!
//!         let what_alice_received = alice_session.decrypt(&bob_encrypted_reply)?;
//!         assert_eq!(what_alice_received, bob_reply.as_bytes());
//!     }
//!
//!     Ok(())
//! }
//! ```
//!
//! ## Sending messages
//!
//! To encrypt a message, just call `Session::encrypt(msg_content, rng)`. This
//! will either produce an `OlmMessage::PreKey(..)` or `OlmMessage::Normal(..)`
//! depending on whether the session is fully established. A session is fully
//! established once you receive (and decrypt) at least one message from the
//! other side.

mod messages;
mod session;
mod session_config;
mod session_keys;
mod shared_secret;

pub use messages::{Message, MessageType, OlmMessage, PreKeyMessage};
pub use session::{DecryptionError, Session, SessionCreationError};
pub use session_config::SessionConfig;
pub use session_keys::SessionKeys;
