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

//! Integration tests for the `sas` functionality.

use anyhow::Result;
use insta::assert_snapshot;
use olmcore::{
    Curve25519PublicKey, ErrorKind, Mac,
    sas::{Sas, SasError},
};
use rand::thread_rng;

fn established() -> Result<(Sas, Sas)> {
    let mut alice = Sas::new(&mut thread_rng())?;
    let mut bob = Sas::new(&mut thread_rng())?;

    alice.set_their_key(bob.public_key())?;
    bob.set_their_key(alice.public_key())?;

    Ok((alice, bob))
}

#[test]
fn both_sides_agree() -> Result<()> {
    let (alice, bob) = established()?;

    assert_eq!(alice.generate_bytes("SAS", 5)?, bob.generate_bytes("SAS", 5)?);
    assert_ne!(alice.generate_bytes("SAS", 5)?, alice.generate_bytes("Other SAS", 5)?);

    let alice_bytes = alice.bytes("MATRIX_KEY_VERIFICATION_SAS")?;
    let bob_bytes = bob.bytes("MATRIX_KEY_VERIFICATION_SAS")?;

    assert_eq!(alice_bytes, bob_bytes);
    assert!(alice_bytes.emoji_indices().iter().all(|i| *i < 64));

    let (first, second, third) = alice_bytes.decimals();
    assert!([first, second, third].iter().all(|d| (1000..=9191).contains(d)));

    Ok(())
}

#[test]
fn a_man_in_the_middle_is_noticed() -> Result<()> {
    let mut alice = Sas::new(&mut thread_rng())?;
    let mut bob = Sas::new(&mut thread_rng())?;
    let mut mallory = Sas::new(&mut thread_rng())?;

    alice.set_their_key(mallory.public_key())?;
    bob.set_their_key(mallory.public_key())?;
    mallory.set_their_key(alice.public_key())?;

    assert_ne!(alice.generate_bytes("SAS", 6)?, bob.generate_bytes("SAS", 6)?);

    Ok(())
}

#[test]
fn macs_travel_as_base64() -> Result<()> {
    let (alice, bob) = established()?;

    let mac = alice.calculate_mac("ed25519:ABCDEFG", "MAC_INFO")?;
    let received = Mac::from_base64(&mac.to_base64())?;

    bob.verify_mac("ed25519:ABCDEFG", "MAC_INFO", &received)?;

    let error = bob
        .verify_mac("ed25519:ABCDEFG", "OTHER_INFO", &received)
        .expect_err("The info string is part of the MAC key");
    assert_eq!(error.kind(), ErrorKind::BadMac);

    Ok(())
}

#[test]
fn errors() -> Result<()> {
    let mut sas = Sas::new(&mut thread_rng())?;

    let error = sas.bytes("SAS").expect_err("The other key wasn't set");
    assert_snapshot!(error.to_string(), @"The public key of the other side wasn't set yet");

    let error = sas
        .set_their_key(Curve25519PublicKey::from_bytes([0; 32]))
        .expect_err("A low order point is rejected");
    assert_eq!(error.kind(), ErrorKind::InvalidKey);

    let (alice, _) = established()?;
    let error = alice.generate_bytes("SAS", 10_000).expect_err("Too many bytes requested");

    assert!(matches!(error, SasError::InvalidLength(10_000)));
    assert_snapshot!(
        error.to_string(),
        @"Can't derive 10000 bytes, at most 8160 bytes can be derived"
    );

    Ok(())
}
