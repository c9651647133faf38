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

//! The Olm and Megolm cryptographic ratchets.
//!
//! olmcore implements the session layer of the end-to-end encryption used by
//! [Matrix](https://matrix.org): the Olm double ratchet for pairwise
//! channels, the Megolm ratchet for group conversations, the short
//! authentication string (SAS) engine used to verify keys out of band, and an
//! encrypted pickle format which lets all of the session state survive a
//! restart.
//!
//! The crate does no I/O. Every operation that needs randomness takes a
//! [`RandomSource`] argument, which is implemented for every cryptographically
//! secure [`rand`] generator.
//!
//! # Olm
//!
//! Olm is an implementation of the [Double Ratchet
//! algorithm](https://signal.org/docs/specifications/doubleratchet/). A
//! session is established with a triple Diffie-Hellman handshake between the
//! long-term identity keys and one-time keys of both parties, after which
//! every message is encrypted with a fresh message key.
//!
//! ```rust
//! use anyhow::Result;
//! use olmcore::{Curve25519Keypair, olm::{OlmMessage, Session, SessionConfig}};
//! use rand::thread_rng;
//!
//! fn main() -> Result<()> {
//!     let mut rng = thread_rng();
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
//!     let message = alice_session.encrypt(b"It's a secret to everybody", &mut rng)?;
//!
//!     if let OlmMessage::PreKey(pre_key) = &message {
//!         let mut bob_session = Session::create_inbound(
//!             SessionConfig::default(),
//!             &bob_identity,
//!             &bob_one_time_key,
//!             pre_key,
//!         )?;
//!
//!         assert_eq!(bob_session.decrypt(&message)?, b"It's a secret to everybody");
//!         assert_eq!(alice_session.session_id(), bob_session.session_id());
//!     }
//!
//!     Ok(())
//! }
//! ```
//!
//! # Megolm
//!
//! Megolm is a single, hash based, ratchet for group conversations. The
//! sender shares a [`megolm::SessionKey`] once with every participant and
//! then encrypts each message with the next state of the ratchet. Messages
//! are signed, so a participant can't forge messages in the name of the
//! sender.
//!
//! # Pickling
//!
//! [`olm::Session`], [`megolm::GroupSession`] and
//! [`megolm::InboundGroupSession`] implement [`pickle::Picklable`]. A pickle
//! is the binary encoding of the session state, encrypted and authenticated
//! with a key derived from a caller supplied pickle key, and encoded as
//! unpadded base64.
//!
//! # Feature flags
//!
//! ## Low-level API
//!
//! Feature: `low-level-api` (default: off)
//!
//! Exposes the ratchet chain and the message cipher in the [`hazmat`] module.
//! Extreme care must be taken when using such APIs, as incorrect usage can
//! lead to broken sessions.
//!
//! ## Strict signatures
//!
//! Feature: `strict-signatures` (default: off)
//!
//! Verifies Ed25519 signatures with
//! [`verify_strict()`](ed25519_dalek::VerifyingKey::verify_strict).

#![deny(clippy::mem_forget, clippy::unwrap_used, unsafe_code)]
#![cfg_attr(docsrs, feature(doc_auto_cfg))]

mod chain;
mod error;
mod primitives;
mod utilities;

#[cfg(feature = "low-level-api")]
pub mod hazmat;
pub mod megolm;
pub mod olm;
pub mod pickle;
pub mod sas;

pub use base64::DecodeError as Base64DecodeError;
pub use error::ErrorKind;
pub use pickle::PickleError;
pub use primitives::{
    Curve25519Keypair, Curve25519PublicKey, Curve25519SecretKey, Ed25519Keypair,
    Ed25519PublicKey, Ed25519Signature, EntropyError, FixedBytes, KeyError, RandomSource,
    SignatureError, cipher::Mac,
};
pub use prost::DecodeError as ProtoBufDecodeError;
pub use utilities::{base64_decode, base64_encode};

/// Error type describing the different ways message decoding can fail.
#[derive(Debug, thiserror::Error)]
pub enum DecodeError {
    /// The Olm message has an invalid type.
    #[error("The message has an invalid type, expected 0 or 1, got {0}")]
    MessageType(usize),
    /// The message is missing a valid version.
    #[error("The message didn't contain a version")]
    MissingVersion,
    /// The message doesn't have enough data to be correctly decoded.
    #[error("The message was too short, it didn't contain a valid payload")]
    MessageTooShort(usize),
    /// The message has a unsupported version.
    #[error("The message didn't have a valid version, expected {0}, got {1}")]
    InvalidVersion(u8, u8),
    /// An embedded public key couldn't be decoded.
    #[error("The message contained an invalid public key: {0}")]
    InvalidKey(#[from] KeyError),
    /// The embedded message authentication code couldn't be decoded.
    #[error("The message contained a MAC with an invalid size, got {0} bytes")]
    InvalidMacLength(usize),
    /// An embedded signature couldn't be decoded.
    #[error("The message contained an invalid Signature: {0}")]
    Signature(#[from] SignatureError),
    /// The message index doesn't fit into 32 bits.
    #[error("The message index {0} is out of range")]
    IndexOutOfRange(u64),
    /// The message couldn't be decoded as a valid protocol buffer message.
    #[error(transparent)]
    ProtoBufError(#[from] ProtoBufDecodeError),
    /// The message wasn't valid base64.
    #[error("The message wasn't valid base64: {0}")]
    Base64(#[from] Base64DecodeError),
}

impl DecodeError {
    /// The category of this error.
    pub fn kind(&self) -> ErrorKind {
        match self {
            DecodeError::InvalidVersion(..) => ErrorKind::UnsupportedVersion,
            _ => ErrorKind::BadMessageFormat,
        }
    }
}

/// The version of olmcore that is being used.
pub static VERSION: &str = env!("CARGO_PKG_VERSION");
