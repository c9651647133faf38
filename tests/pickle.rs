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

//! Integration tests for the `pickle` functionality.

use anyhow::Result;
use assert_matches2::{assert_let, assert_matches};
use olmcore::{
    Curve25519Keypair, ErrorKind, PickleError, base64_decode, base64_encode,
    megolm::{GroupSession, InboundGroupSession},
    olm::{OlmMessage, Session, SessionConfig},
};
use rand::{SeedableRng, rngs::StdRng, thread_rng};

const PICKLE_KEY: &[u8; 32] = b"It's a secret to everybody!!!!!!";

fn olm_pair() -> Result<(Session, Session)> {
    let mut rng = thread_rng();

    let alice_identity = Curve25519Keypair::new(&mut rng)?;
    let bob_identity = Curve25519Keypair::new(&mut rng)?;
    let bob_one_time_key = Curve25519Keypair::new(&mut rng)?;

    let mut alice = Session::create_outbound(
        SessionConfig::with_max_message_gap(100),
        &alice_identity,
        bob_identity.public_key(),
        bob_one_time_key.public_key(),
        &mut rng,
    )?;

    let message = alice.encrypt("Hi", &mut rng)?;
    assert_let!(OlmMessage::PreKey(pre_key) = &message);

    let mut bob = Session::create_inbound(
        SessionConfig::default(),
        &bob_identity,
        &bob_one_time_key,
        pre_key,
    )?;
    bob.decrypt(&message)?;

    Ok((alice, bob))
}

#[test]
fn olm_session_pickle_cycle() -> Result<()> {
    let (mut alice, mut bob) = olm_pair()?;

    let reply = bob.encrypt("Hello", &mut thread_rng())?;
    let unread = bob.encrypt("Still unread", &mut thread_rng())?;
    alice.decrypt(&reply)?;

    let pickle = alice.pickle(PICKLE_KEY)?;
    let mut restored = Session::from_pickle(&pickle, PICKLE_KEY)?;

    assert_eq!(restored.session_id(), alice.session_id());
    assert_eq!(restored.config(), alice.config());
    assert_eq!(restored.has_received_message(), alice.has_received_message());

    // Both copies produce the same ciphertext from the same randomness.
    let original = alice.encrypt("Same", &mut StdRng::seed_from_u64(7))?;
    let copy = restored.encrypt("Same", &mut StdRng::seed_from_u64(7))?;
    assert_eq!(original, copy);

    assert_eq!(restored.decrypt(&unread)?, b"Still unread");

    Ok(())
}

#[test]
fn pickles_are_deterministic() -> Result<()> {
    let (alice, _) = olm_pair()?;

    assert_eq!(alice.pickle(PICKLE_KEY)?, alice.pickle(PICKLE_KEY)?);

    Ok(())
}

#[test]
fn group_session_pickle_cycle() -> Result<()> {
    let mut outbound = GroupSession::new(&mut thread_rng())?;
    let mut inbound = InboundGroupSession::new(&outbound.session_key());

    outbound.encrypt("Advance the ratchet");

    let mut restored_outbound =
        GroupSession::from_pickle(&outbound.pickle(PICKLE_KEY)?, PICKLE_KEY)?;
    let message = restored_outbound.encrypt("From the restored session");
    assert_eq!(message, outbound.encrypt("From the restored session"));

    let mut restored_inbound =
        InboundGroupSession::from_pickle(&inbound.pickle(PICKLE_KEY)?, PICKLE_KEY)?;

    assert_eq!(restored_inbound.decrypt(&message)?.plaintext, b"From the restored session");
    assert_eq!(inbound.decrypt(&message)?.plaintext, b"From the restored session");

    Ok(())
}

#[test]
fn wrong_pickle_key() -> Result<()> {
    let (alice, _) = olm_pair()?;
    let pickle = alice.pickle(PICKLE_KEY)?;

    let error = Session::from_pickle(&pickle, b"Not the right key")
        .expect_err("The MAC is keyed with the pickle key");
    assert_eq!(error.kind(), ErrorKind::BadMac);

    Ok(())
}

#[test]
fn corrupt_pickles() -> Result<()> {
    let session = GroupSession::new(&mut thread_rng())?;
    let pickle = session.pickle(PICKLE_KEY)?;

    let error = GroupSession::from_pickle("not base64!", PICKLE_KEY).expect_err("Invalid base64");
    assert_eq!(error.kind(), ErrorKind::CorruptPickle);
    assert_matches!(error, PickleError::Base64(_));

    let mut bytes = base64_decode(&pickle)?;
    bytes[0] ^= 0x01;

    let error = GroupSession::from_pickle(&base64_encode(&bytes), PICKLE_KEY)
        .expect_err("The ciphertext was modified");
    assert_eq!(error.kind(), ErrorKind::BadMac);

    // A pickle of one type doesn't restore as another type.
    let error = Session::from_pickle(&pickle, PICKLE_KEY).expect_err("Not an Olm session");
    assert_eq!(error.kind(), ErrorKind::CorruptPickle);

    Ok(())
}
