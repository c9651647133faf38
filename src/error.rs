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

/// The category of a failure.
///
/// Every error type in this crate is a detailed enum, but they all map onto
/// one of these categories through their `kind()` method. This allows callers
/// to react to a class of failures without matching on every variant.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum ErrorKind {
    /// A key supplied by the caller has the wrong length, couldn't be
    /// decoded, or is a low order point.
    InvalidKey,
    /// A message couldn't be parsed.
    BadMessageFormat,
    /// A pickle couldn't be decoded after it was decrypted.
    CorruptPickle,
    /// A message authentication code didn't match.
    BadMac,
    /// An Ed25519 signature didn't verify.
    BadSignature,
    /// An Olm message uses a message index that was already used, the message
    /// is most likely a replay.
    MessageIndexTooLow,
    /// A Megolm message uses a message index below the first index the
    /// session knows about.
    UnknownMessageIndex,
    /// A pickle or message uses a version this library doesn't support.
    UnsupportedVersion,
    /// The operation requires a step that hasn't been performed yet.
    NotReady,
    /// The source of randomness failed to deliver enough bytes.
    EntropyUnavailable,
    /// A pre-key message references a one-time key we don't hold.
    UnknownOneTimeKey,
    /// A Megolm session key couldn't be decoded or its signature didn't
    /// verify.
    BadSessionKey,
    /// An Olm message skips ahead further than the session allows.
    TooBigMessageGap,
    /// The requested output is longer than the key derivation can produce.
    InvalidLength,
}

impl fmt::Display for ErrorKind {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let description = match self {
            ErrorKind::InvalidKey => "invalid key",
            ErrorKind::BadMessageFormat => "bad message format",
            ErrorKind::CorruptPickle => "corrupt pickle",
            ErrorKind::BadMac => "bad MAC",
            ErrorKind::BadSignature => "bad signature",
            ErrorKind::MessageIndexTooLow => "message index too low",
            ErrorKind::UnknownMessageIndex => "unknown message index",
            ErrorKind::UnsupportedVersion => "unsupported version",
            ErrorKind::NotReady => "not ready",
            ErrorKind::EntropyUnavailable => "entropy unavailable",
            ErrorKind::UnknownOneTimeKey => "unknown one-time key",
            ErrorKind::BadSessionKey => "bad session key",
            ErrorKind::TooBigMessageGap => "message gap too big",
            ErrorKind::InvalidLength => "invalid output length",
        };

        f.write_str(description)
    }
}
