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

//! Integration tests for the `olm` functionality.

use anyhow::Result;
use assert_matches2::{assert_let, assert_matches};
use olmcore::{
    Curve25519Keypair, ErrorKind, base64_decode, base64_encode,
    olm::{DecryptionError, MessageType, OlmMessage, Session, SessionConfig},
};
use rand::thread_rng;

struct Device {
    identity_key: Curve25519Keypair,
    one_time_key: Curve25519Keypair,
}

impl Device {
    fn new() -> Result<Self> {
        Ok(Self {
            identity_key: Curve25519Keypair::new(&mut thread_rng())?,
            one_time_key: Curve25519Keypair::new(&mut thread_rng())?,
        })
    }
}

/// Alice creates an outbound session with Bob, sends him a pre-key message and
/// Bob creates the matching inbound session from it.
fn establish() -> Result<(Session, Session)> {
    let alice = Device::new()?;
    let bob = Device::new()?;

    let mut alice_session = Session::create_outbound(
        SessionConfig::default(),
        &alice.identity_key,
        bob.identity_key.public_key(),
        bob.one_time_key.public_key(),
        &mut thread_rng(),
    )?;

    let message = alice_session.encrypt("Hello Bob", &mut thread_rng())?;
    assert_let!(OlmMessage::PreKey(pre_key) = &message);

    let mut bob_session = Session::create_inbound(
        SessionConfig::default(),
        &bob.identity_key,
        &bob.one_time_key,
        pre_key,
    )?;

    assert_eq!(bob_session.decrypt(&message)?, b"Hello Bob");

    Ok((alice_session, bob_session))
}

/// Flip a bit in the last byte of the message, the last byte of both message
/// types belongs to the MAC.
fn flip_mac_bit(message: &OlmMessage) -> Result<OlmMessage> {
    let (message_type, body) = message.to_parts();
    let mut bytes = base64_decode(body)?;

    if let Some(last) = bytes.last_mut() {
        *last ^= 0x01;
    }

    Ok(OlmMessage::from_parts(message_type, &base64_encode(bytes))?)
}

#[test]
fn ping_pong() -> Result<()> {
    let (mut alice, mut bob) = establish()?;

    assert_eq!(alice.session_id(), bob.session_id());
    assert!(!alice.has_received_message());

    // Alice keeps sending pre-key messages until she hears back from Bob.
    let message = alice.encrypt("Are you there?", &mut thread_rng())?;
    assert_eq!(message.message_type(), MessageType::PreKey);
    assert_eq!(bob.decrypt(&message)?, b"Are you there?");

    for round in 0..10 {
        let text = format!("Bob's reply {round}");
        let reply = bob.encrypt(&text, &mut thread_rng())?;
        assert_eq!(reply.message_type(), MessageType::Normal);
        assert_eq!(alice.decrypt(&reply)?, text.as_bytes());

        let text = format!("Alice's answer {round}");
        let answer = alice.encrypt(&text, &mut thread_rng())?;
        assert_eq!(answer.message_type(), MessageType::Normal);
        assert_eq!(bob.decrypt(&answer)?, text.as_bytes());
    }

    assert!(alice.has_received_message());
    assert!(bob.has_received_message());

    Ok(())
}

#[test]
fn messages_survive_the_wire_format() -> Result<()> {
    let (mut alice, mut bob) = establish()?;

    let message = bob.encrypt("Over the wire", &mut thread_rng())?;
    let (message_type, body) = message.to_parts();

    let json = serde_json::to_string(&message)?;
    let from_json: OlmMessage = serde_json::from_str(&json)?;
    assert_eq!(from_json, message);

    let received = OlmMessage::from_parts(message_type, &body)?;
    assert_eq!(alice.decrypt(&received)?, b"Over the wire");

    Ok(())
}

#[test]
fn replayed_messages_are_rejected() -> Result<()> {
    let (mut alice, mut bob) = establish()?;

    let message = bob.encrypt("Only once", &mut thread_rng())?;
    assert_eq!(alice.decrypt(&message)?, b"Only once");

    let error = alice.decrypt(&message).expect_err("The message key was already used");
    assert_eq!(error.kind(), ErrorKind::MessageIndexTooLow);
    assert_matches!(
        error,
        DecryptionError::MessageIndexTooLow { chain_index: 1, message_index: 0 }
    );

    Ok(())
}

#[test]
fn out_of_order_messages() -> Result<()> {
    let (mut alice, mut bob) = establish()?;

    let messages = (0..5)
        .map(|i| bob.encrypt(format!("{i}"), &mut thread_rng()))
        .collect::<Result<Vec<_>, _>>()?;

    assert_eq!(alice.decrypt(&messages[3])?, b"3");
    assert_eq!(alice.decrypt(&messages[4])?, b"4");

    // The keys of skipped messages are gone.
    let error = alice.decrypt(&messages[1]).expect_err("The key of message 1 was skipped");
    assert_eq!(error.kind(), ErrorKind::MessageIndexTooLow);

    Ok(())
}

#[test]
fn tampered_macs_are_rejected() -> Result<()> {
    let (mut alice, mut bob) = establish()?;

    let pre_key = alice.encrypt("Pre-key", &mut thread_rng())?;
    let error = bob.decrypt(&flip_mac_bit(&pre_key)?).expect_err("The MAC was modified");
    assert_eq!(error.kind(), ErrorKind::BadMac);
    assert_eq!(bob.decrypt(&pre_key)?, b"Pre-key");

    let normal = bob.encrypt("Normal", &mut thread_rng())?;
    let error = alice.decrypt(&flip_mac_bit(&normal)?).expect_err("The MAC was modified");
    assert_eq!(error.kind(), ErrorKind::BadMac);

    // The failed attempt didn't advance the chain.
    assert_eq!(alice.decrypt(&normal)?, b"Normal");

    Ok(())
}

#[test]
fn unknown_one_time_key() -> Result<()> {
    let alice = Device::new()?;
    let bob = Device::new()?;
    let other_one_time_key = Curve25519Keypair::new(&mut thread_rng())?;

    let mut session = Session::create_outbound(
        SessionConfig::default(),
        &alice.identity_key,
        bob.identity_key.public_key(),
        bob.one_time_key.public_key(),
        &mut thread_rng(),
    )?;

    let message = session.encrypt("Hello", &mut thread_rng())?;
    assert_let!(OlmMessage::PreKey(pre_key) = message);

    let error = Session::create_inbound(
        SessionConfig::default(),
        &bob.identity_key,
        &other_one_time_key,
        &pre_key,
    )
    .expect_err("The pre-key message uses a different one-time key");

    assert_eq!(error.kind(), ErrorKind::UnknownOneTimeKey);

    Ok(())
}
