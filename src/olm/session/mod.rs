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

mod double_ratchet;
mod receiver_chain;
pub(super) mod root_key;

use std::io::Read;

use aes::cipher::block_padding::UnpadError;
use double_ratchet::DoubleRatchet;
use hmac::digest::MacError;
use matrix_pickle::{Decode, Encode, EncodeError};
use receiver_chain::{ChainStore, MAX_RECEIVING_CHAINS, ReceiverChain};
use root_key::RootKey;
use thiserror::Error;
use tracing::debug;
use zeroize::{Zeroize, ZeroizeOnDrop};

use super::{
    SessionConfig,
    messages::{Message, OlmMessage, PreKeyMessage},
    session_keys::SessionKeys,
    shared_secret::Shared3DHSecret,
};
use crate::{
    Curve25519Keypair, Curve25519PublicKey, Curve25519SecretKey, EntropyError, ErrorKind,
    KeyError, PickleError, RandomSource,
    chain::ChainKey,
    pickle::{Picklable, pickle, unpickle},
};

/// Error type describing the ways an Olm session can fail to be created.
#[derive(Debug, Error)]
pub enum SessionCreationError {
    /// The pre-key message was encrypted for a different one-time key than
    /// the one we were given.
    #[error("The pre-key message references an unknown one-time key: {0}")]
    UnknownOneTimeKey(Curve25519PublicKey),
    /// One of the Diffie-Hellman operations of the handshake produced a
    /// non-contributory result.
    #[error("The session couldn't be created: {0}")]
    InvalidKey(#[from] KeyError),
    /// The random source couldn't provide the keys of the session.
    #[error(transparent)]
    Entropy(#[from] EntropyError),
}

impl SessionCreationError {
    /// The category of this error.
    pub fn kind(&self) -> ErrorKind {
        match self {
            SessionCreationError::UnknownOneTimeKey(_) => ErrorKind::UnknownOneTimeKey,
            SessionCreationError::InvalidKey(e) => e.kind(),
            SessionCreationError::Entropy(e) => e.kind(),
        }
    }
}

/// Error type describing the ways an Olm message can fail to be decrypted.
///
/// The session state is never modified when decryption fails.
#[derive(Debug, Error)]
pub enum DecryptionError {
    /// The MAC of the message didn't match.
    #[error("Failed decrypting Olm message, invalid MAC: {0}")]
    InvalidMac(#[from] MacError),
    /// The decrypted message had invalid padding.
    #[error("Failed decrypting Olm message, invalid padding: {0}")]
    InvalidPadding(#[from] UnpadError),
    /// The message index is below the index of the receiving chain, the
    /// message was already decrypted or its key was skipped.
    #[error(
        "The message index is too low, the chain is at index {chain_index}, \
         the message has index {message_index}"
    )]
    MessageIndexTooLow {
        /// The index of the next message the receiving chain expects.
        chain_index: u32,
        /// The index of the message.
        message_index: u32,
    },
    /// The message skips too many messages of its chain.
    #[error("The message gap was too big, got {0}, max allowed {1}")]
    TooBigMessageGap(u32, u32),
    /// The message uses a new ratchet key while we still wait for our own
    /// new ratchet key to reach the other side.
    #[error("The message uses an unexpected ratchet key")]
    UnexpectedRatchetKey,
}

impl DecryptionError {
    /// The category of this error.
    pub fn kind(&self) -> ErrorKind {
        match self {
            DecryptionError::InvalidMac(_) => ErrorKind::BadMac,
            DecryptionError::InvalidPadding(_) | DecryptionError::UnexpectedRatchetKey => {
                ErrorKind::BadMessageFormat
            }
            DecryptionError::MessageIndexTooLow { .. } => ErrorKind::MessageIndexTooLow,
            DecryptionError::TooBigMessageGap(..) => ErrorKind::TooBigMessageGap,
        }
    }
}

/// An Olm session represents one end of an encrypted communication channel
/// between two participants.
///
/// A session enables the session owner to encrypt messages intended for, and
/// decrypt messages sent by, the other participant of the channel.
///
/// Olm sessions have two important properties:
///
/// 1. They are based on a double ratchet algorithm which continuously
///    introduces new entropy into the channel as messages are sent and
///    received. This imbues the channel with *self-healing* properties,
///    allowing it to recover from a momentary loss of confidentiality in the
///    event of a key compromise.
/// 2. They are *asynchronous*, allowing the participant to start sending
///    messages to the other side even if the other participant is not online
///    at the moment.
///
/// A session is created either with [`Session::create_outbound`], if you are
/// the first participant to send a message in this channel, or with
/// [`Session::create_inbound`], if the other participant initiated the channel
/// by sending you a [`PreKeyMessage`].
pub struct Session {
    session_keys: SessionKeys,
    sending_ratchet: DoubleRatchet,
    receiving_chains: ChainStore,
    config: SessionConfig,
}

impl std::fmt::Debug for Session {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("Session")
            .field("session_id", &self.session_id())
            .field("receiving_chains", &self.receiving_chains)
            .field("config", &self.config)
            .finish_non_exhaustive()
    }
}

impl Session {
    /// Create a new session with the owner of the given identity key and
    /// one-time key.
    ///
    /// A fresh base key and the first ratchet key are generated from `rng`.
    /// Every message of the session will be a [`PreKeyMessage`] until a
    /// message of the other side has been decrypted.
    pub fn create_outbound(
        config: SessionConfig,
        identity_key: &Curve25519Keypair,
        their_identity_key: Curve25519PublicKey,
        their_one_time_key: Curve25519PublicKey,
        rng: &mut impl RandomSource,
    ) -> Result<Self, SessionCreationError> {
        let base_key = Curve25519Keypair::new(rng)?;
        let ratchet_key = Curve25519Keypair::new(rng)?;

        let shared_secret = Shared3DHSecret::outbound(
            identity_key.secret_key(),
            base_key.secret_key(),
            &their_identity_key,
            &their_one_time_key,
        )?;

        let session_keys = SessionKeys {
            identity_key: identity_key.public_key(),
            base_key: base_key.public_key(),
            one_time_key: their_one_time_key,
        };

        let (root_key, chain_key) = shared_secret.expand();
        let sending_ratchet = DoubleRatchet::active(root_key, chain_key, ratchet_key);

        let session =
            Self { session_keys, sending_ratchet, receiving_chains: ChainStore::new(), config };

        debug!(
            session_id = %session.session_id(),
            their_identity_key = ?their_identity_key,
            "Created a new outbound Olm session"
        );

        Ok(session)
    }

    /// Create a session from the first message the other side sent us.
    ///
    /// The message itself isn't decrypted, pass it to [`Session::decrypt`]
    /// afterwards.
    pub fn create_inbound(
        config: SessionConfig,
        identity_key: &Curve25519Keypair,
        one_time_key: &Curve25519Keypair,
        pre_key_message: &PreKeyMessage,
    ) -> Result<Self, SessionCreationError> {
        if pre_key_message.one_time_key() != one_time_key.public_key() {
            return Err(SessionCreationError::UnknownOneTimeKey(pre_key_message.one_time_key()));
        }

        let shared_secret = Shared3DHSecret::inbound(
            identity_key.secret_key(),
            one_time_key.secret_key(),
            &pre_key_message.identity_key(),
            &pre_key_message.base_key(),
        )?;

        let their_ratchet_key = pre_key_message.message().ratchet_key();
        let (root_key, chain_key) = shared_secret.expand();

        let mut receiving_chains = ChainStore::new();
        receiving_chains.push(ReceiverChain::new(their_ratchet_key, chain_key));

        debug!(
            session_id = %pre_key_message.session_id(),
            their_identity_key = ?pre_key_message.identity_key(),
            "Created a new inbound Olm session"
        );

        Ok(Self {
            session_keys: pre_key_message.session_keys(),
            sending_ratchet: DoubleRatchet::inactive(root_key, their_ratchet_key),
            receiving_chains,
            config,
        })
    }

    /// Returns the globally unique session ID, in base64-encoded form.
    ///
    /// A session ID is the SHA256 of the concatenation of the identity key and
    /// the base key of the party that created the session, and the one-time
    /// key of the other party. Both sides of a session compute the same ID.
    pub fn session_id(&self) -> String {
        self.session_keys.session_id()
    }

    /// The keys that were used to establish this session.
    pub fn session_keys(&self) -> SessionKeys {
        self.session_keys
    }

    /// The configuration this session was created with.
    pub fn config(&self) -> &SessionConfig {
        &self.config
    }

    /// Have we ever received and decrypted a message from the other side?
    pub fn has_received_message(&self) -> bool {
        !self.receiving_chains.is_empty()
    }

    /// Check if the given pre-key message was created for this session.
    pub fn matches_inbound(&self, pre_key_message: &PreKeyMessage) -> bool {
        self.session_keys == pre_key_message.session_keys()
    }

    /// Encrypt the `plaintext` and construct an [`OlmMessage`].
    ///
    /// The message will either be a pre-key message or a normal message,
    /// depending on whether the session is fully established. A session is
    /// fully established once you receive (and decrypt) at least one message
    /// from the other side.
    ///
    /// Randomness is only consumed for the first message after we received a
    /// new ratchet key from the other side.
    pub fn encrypt(
        &mut self,
        plaintext: impl AsRef<[u8]>,
        rng: &mut impl RandomSource,
    ) -> Result<OlmMessage, EntropyError> {
        let (ratchet_key, message_key) = self.sending_ratchet.next_message_key(rng)?;
        let message = Message::encrypt(ratchet_key, &message_key, plaintext.as_ref());

        Ok(if self.has_received_message() {
            OlmMessage::Normal(message)
        } else {
            OlmMessage::PreKey(PreKeyMessage::new(self.session_keys, message))
        })
    }

    /// Try to decrypt an Olm message, which will either return the plaintext
    /// or result in a [`DecryptionError`].
    ///
    /// The state of the session is only updated if the message was
    /// successfully decrypted.
    pub fn decrypt(&mut self, message: &OlmMessage) -> Result<Vec<u8>, DecryptionError> {
        self.decrypt_decoded(message.message()).inspect_err(|e| {
            debug!(
                session_id = %self.session_id(),
                message_index = message.message().chain_index(),
                error = %e,
                "Failed to decrypt an Olm message"
            )
        })
    }

    fn decrypt_decoded(&mut self, message: &Message) -> Result<Vec<u8>, DecryptionError> {
        let ratchet_key = message.ratchet_key();
        let max_message_gap = self.config.max_message_gap();

        if let Some(chain) = self.receiving_chains.find_mut(&ratchet_key) {
            chain.decrypt(message, max_message_gap)
        } else {
            let (sending_ratchet, mut chain) = self
                .sending_ratchet
                .advance(ratchet_key)
                .ok_or(DecryptionError::UnexpectedRatchetKey)?;

            let plaintext = chain.decrypt(message, max_message_gap)?;

            debug!(
                session_id = %self.session_id(),
                ratchet_key = ?ratchet_key,
                "Received a message with a new ratchet key"
            );

            self.sending_ratchet = sending_ratchet;
            self.receiving_chains.push(chain);

            Ok(plaintext)
        }
    }

    /// Store the session as an encrypted pickle, see the [`crate::pickle`]
    /// module for the format.
    pub fn pickle(&self, pickle_key: &[u8]) -> Result<String, PickleError> {
        pickle(self, pickle_key)
    }

    /// Restore a [`Session`] from a pickle created by [`Session::pickle`].
    pub fn from_pickle(pickle: &str, pickle_key: &[u8]) -> Result<Self, PickleError> {
        unpickle(pickle, pickle_key)
    }
}

#[derive(Zeroize, ZeroizeOnDrop, Encode, Decode)]
struct SenderChainPickle {
    public_ratchet_key: [u8; 32],
    secret_ratchet_key: Box<[u8; 32]>,
    chain_key: Box<[u8; 32]>,
    chain_key_index: u32,
}

#[derive(Zeroize, ZeroizeOnDrop, Encode, Decode)]
struct ReceiverChainPickle {
    public_ratchet_key: [u8; 32],
    chain_key: Box<[u8; 32]>,
    chain_key_index: u32,
}

impl From<&ReceiverChain> for ReceiverChainPickle {
    fn from(chain: &ReceiverChain) -> Self {
        Self {
            public_ratchet_key: chain.ratchet_key().to_bytes(),
            chain_key: Box::new(*chain.chain_key().as_bytes()),
            chain_key_index: chain.chain_key().index(),
        }
    }
}

impl From<&ReceiverChainPickle> for ReceiverChain {
    fn from(pickle: &ReceiverChainPickle) -> Self {
        ReceiverChain::new(
            Curve25519PublicKey::from_bytes(pickle.public_ratchet_key),
            ChainKey::from_parts(pickle.chain_key.clone(), pickle.chain_key_index),
        )
    }
}

#[derive(Zeroize, ZeroizeOnDrop, Encode, Decode)]
struct SessionPickle {
    received_message: bool,
    #[zeroize(skip)]
    session_keys: SessionKeys,
    root_key: Box<[u8; 32]>,
    sender_chains: Vec<SenderChainPickle>,
    receiver_chains: Vec<ReceiverChainPickle>,
    max_message_gap: u32,
}

impl From<&Session> for SessionPickle {
    fn from(session: &Session) -> Self {
        let sender_chains = match &session.sending_ratchet {
            DoubleRatchet::Active(ratchet) => vec![SenderChainPickle {
                public_ratchet_key: ratchet.ratchet_key.public_key().to_bytes(),
                secret_ratchet_key: ratchet.ratchet_key.secret_key().to_bytes(),
                chain_key: Box::new(*ratchet.chain_key.as_bytes()),
                chain_key_index: ratchet.chain_key.index(),
            }],
            DoubleRatchet::Inactive(_) => Vec::new(),
        };

        Self {
            received_message: session.has_received_message(),
            session_keys: session.session_keys,
            root_key: Box::new(*session.sending_ratchet.root_key().as_bytes()),
            sender_chains,
            receiver_chains: session.receiving_chains.iter().map(Into::into).collect(),
            max_message_gap: session.config.max_message_gap(),
        }
    }
}

impl TryFrom<&SessionPickle> for Session {
    type Error = PickleError;

    fn try_from(pickle: &SessionPickle) -> Result<Self, Self::Error> {
        if pickle.receiver_chains.len() > MAX_RECEIVING_CHAINS {
            return Err(PickleError::InvalidSession("too many receiving chains"));
        }

        let mut receiving_chains = ChainStore::new();

        for chain in &pickle.receiver_chains {
            receiving_chains.push(chain.into());
        }

        if pickle.received_message == receiving_chains.is_empty() {
            return Err(PickleError::InvalidSession(
                "the received message flag doesn't match the receiving chains",
            ));
        }

        let root_key = RootKey::new(pickle.root_key.clone());

        let sending_ratchet = match pickle.sender_chains.as_slice() {
            [] => {
                let newest = receiving_chains.newest().ok_or(PickleError::InvalidSession(
                    "the session has neither a sending nor a receiving chain",
                ))?;

                DoubleRatchet::inactive(root_key, newest.ratchet_key())
            }
            [chain] => {
                let ratchet_key = Curve25519Keypair::from_secret_key(
                    Curve25519SecretKey::from_bytes(&chain.secret_ratchet_key),
                );

                if ratchet_key.public_key().as_bytes() != &chain.public_ratchet_key {
                    return Err(PickleError::InvalidSession(
                        "the sending ratchet key doesn't match its public part",
                    ));
                }

                let chain_key =
                    ChainKey::from_parts(chain.chain_key.clone(), chain.chain_key_index);

                DoubleRatchet::active(root_key, chain_key, ratchet_key)
            }
            _ => return Err(PickleError::InvalidSession("too many sending chains")),
        };

        Ok(Self {
            session_keys: pickle.session_keys,
            sending_ratchet,
            receiving_chains,
            config: SessionConfig::with_max_message_gap(pickle.max_message_gap),
        })
    }
}

impl Picklable for Session {
    const PICKLE_VERSION: u32 = 1;

    fn serialize_fields(&self, writer: &mut Vec<u8>) -> Result<(), EncodeError> {
        SessionPickle::from(self).encode(writer)?;

        Ok(())
    }

    fn deserialize_fields(_version: u32, reader: &mut impl Read) -> Result<Self, PickleError> {
        let pickle = SessionPickle::decode(reader)?;

        Session::try_from(&pickle)
    }
}

#[cfg(test)]
mod test {
    use anyhow::Result;
    use assert_matches2::assert_matches;
    use rand::{SeedableRng, rngs::StdRng, thread_rng};

    use super::{DecryptionError, Session, SessionCreationError};
    use crate::{
        Curve25519Keypair, ErrorKind, PickleError,
        olm::{OlmMessage, SessionConfig},
    };

    const PICKLE_KEY: &[u8; 32] = &[7u8; 32];

    struct Party {
        identity_key: Curve25519Keypair,
        one_time_key: Curve25519Keypair,
    }

    impl Party {
        fn new() -> Self {
            let mut rng = thread_rng();

            Self {
                identity_key: Curve25519Keypair::new(&mut rng).expect("Should create a key"),
                one_time_key: Curve25519Keypair::new(&mut rng).expect("Should create a key"),
            }
        }
    }

    /// Create an outbound session for Alice and the matching inbound session
    /// for Bob, Bob decrypts Alice's first message.
    fn session_pair() -> Result<(Session, Session)> {
        let mut rng = thread_rng();
        let alice = Party::new();
        let bob = Party::new();

        let mut alice_session = Session::create_outbound(
            SessionConfig::default(),
            &alice.identity_key,
            bob.identity_key.public_key(),
            bob.one_time_key.public_key(),
            &mut rng,
        )?;

        let message = alice_session.encrypt("It's a secret to everybody", &mut rng)?;
        assert_matches!(&message, OlmMessage::PreKey(pre_key));

        let mut bob_session = Session::create_inbound(
            SessionConfig::default(),
            &bob.identity_key,
            &bob.one_time_key,
            pre_key,
        )?;

        assert_eq!(bob_session.decrypt(&message)?, b"It's a secret to everybody");
        assert_eq!(alice_session.session_id(), bob_session.session_id());
        assert!(bob_session.matches_inbound(pre_key));

        Ok((alice_session, bob_session))
    }

    #[test]
    fn pre_key_messages_until_a_reply() -> Result<()> {
        let mut rng = thread_rng();
        let (mut alice, mut bob) = session_pair()?;

        assert!(!alice.has_received_message());
        assert_matches!(alice.encrypt("Again", &mut rng)?, OlmMessage::PreKey(_));

        let reply = bob.encrypt("Hello Alice", &mut rng)?;
        assert_matches!(&reply, OlmMessage::Normal(_));

        assert_eq!(alice.decrypt(&reply)?, b"Hello Alice");
        assert!(alice.has_received_message());
        assert_matches!(alice.encrypt("Hi Bob", &mut rng)?, OlmMessage::Normal(_));

        Ok(())
    }

    #[test]
    fn unknown_one_time_key() -> Result<()> {
        let mut rng = thread_rng();
        let alice = Party::new();
        let bob = Party::new();

        let mut session = Session::create_outbound(
            SessionConfig::default(),
            &alice.identity_key,
            bob.identity_key.public_key(),
            bob.one_time_key.public_key(),
            &mut rng,
        )?;

        let message = session.encrypt("Hi", &mut rng)?;
        assert_matches!(message, OlmMessage::PreKey(pre_key));

        let other_one_time_key = Curve25519Keypair::new(&mut rng)?;
        let error = Session::create_inbound(
            SessionConfig::default(),
            &bob.identity_key,
            &other_one_time_key,
            &pre_key,
        )
        .expect_err("The one-time key doesn't match");

        assert_eq!(error.kind(), ErrorKind::UnknownOneTimeKey);
        assert_matches!(error, SessionCreationError::UnknownOneTimeKey(key));
        assert_eq!(key, bob.one_time_key.public_key());

        Ok(())
    }

    #[test]
    fn out_of_order_decryption() -> Result<()> {
        let mut rng = thread_rng();
        let (mut alice, mut bob) = session_pair()?;

        let first = bob.encrypt("First", &mut rng)?;
        let second = bob.encrypt("Second", &mut rng)?;
        let third = bob.encrypt("Third", &mut rng)?;

        assert_eq!(alice.decrypt(&second)?, b"Second");
        assert_eq!(alice.decrypt(&third)?, b"Third");

        let error = alice.decrypt(&first).expect_err("The skipped message key is gone");
        assert_matches!(error, DecryptionError::MessageIndexTooLow { .. });

        Ok(())
    }

    #[test]
    fn replay_is_rejected() -> Result<()> {
        let mut rng = thread_rng();
        let (mut alice, mut bob) = session_pair()?;

        let message = bob.encrypt("Once", &mut rng)?;
        alice.decrypt(&message)?;

        let error = alice.decrypt(&message).expect_err("A message can't be decrypted twice");
        assert_eq!(error.kind(), ErrorKind::MessageIndexTooLow);

        Ok(())
    }

    #[test]
    fn message_gap_is_configurable() -> Result<()> {
        let mut rng = thread_rng();
        let (mut alice, mut bob) = session_pair()?;
        alice.config = SessionConfig::with_max_message_gap(2);

        for _ in 0..3 {
            bob.encrypt("Skipped", &mut rng)?;
        }

        let message = bob.encrypt("Too far", &mut rng)?;
        let error = alice.decrypt(&message).expect_err("The gap is too big");

        assert_matches!(error, DecryptionError::TooBigMessageGap(3, 2));
        assert!(!alice.has_received_message());

        Ok(())
    }

    #[test]
    fn unexpected_ratchet_key() -> Result<()> {
        let mut rng = thread_rng();
        let (mut alice, _) = session_pair()?;
        let (_, mut carol) = session_pair()?;

        // Carol hasn't sent a message yet, so nobody could have received her
        // ratchet key and started a new chain on top of it.
        let message = alice.encrypt("Not for Carol", &mut rng)?;
        let error = carol.decrypt(&message).expect_err("The ratchet key is unexpected");

        assert_matches!(error, DecryptionError::UnexpectedRatchetKey);
        assert_eq!(carol.receiving_chains.len(), 1);

        Ok(())
    }

    #[test]
    fn at_most_five_receiving_chains() -> Result<()> {
        let mut rng = thread_rng();
        let (mut alice, mut bob) = session_pair()?;

        for _ in 0..7 {
            let message = bob.encrypt("Ping", &mut rng)?;
            alice.decrypt(&message)?;

            let message = alice.encrypt("Pong", &mut rng)?;
            bob.decrypt(&message)?;
        }

        assert_eq!(alice.receiving_chains.len(), 5);
        assert_eq!(bob.receiving_chains.len(), 5);

        Ok(())
    }

    #[test]
    fn pickle_cycle() -> Result<()> {
        let mut rng = StdRng::seed_from_u64(42);
        let (mut alice, mut bob) = session_pair()?;

        let reply = bob.encrypt("Reply", &mut rng)?;

        let mut restored = Session::from_pickle(&alice.pickle(PICKLE_KEY)?, PICKLE_KEY)?;

        assert_eq!(restored.session_id(), alice.session_id());
        assert_eq!(restored.decrypt(&reply)?, alice.decrypt(&reply)?);

        let mut first_rng = StdRng::seed_from_u64(1);
        let mut second_rng = StdRng::seed_from_u64(1);

        let from_original = alice.encrypt("Same", &mut first_rng)?;
        let from_restored = restored.encrypt("Same", &mut second_rng)?;

        assert_eq!(from_original.to_parts(), from_restored.to_parts());
        assert_eq!(bob.decrypt(&from_restored)?, b"Same");

        Ok(())
    }

    #[test]
    fn pickle_keeps_the_configuration() -> Result<()> {
        let (mut alice, _) = session_pair()?;
        alice.config = SessionConfig::with_max_message_gap(10);

        let restored = Session::from_pickle(&alice.pickle(PICKLE_KEY)?, PICKLE_KEY)?;
        assert_eq!(restored.config().max_message_gap(), 10);

        Ok(())
    }

    #[test]
    fn pickle_with_the_wrong_key() -> Result<()> {
        let (alice, _) = session_pair()?;
        let pickle = alice.pickle(PICKLE_KEY)?;

        let error = Session::from_pickle(&pickle, &[0u8; 32]).expect_err("The key is wrong");
        assert_eq!(error.kind(), ErrorKind::BadMac);
        assert_matches!(error, PickleError::Decryption(_));

        Ok(())
    }
}
