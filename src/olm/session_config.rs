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

use serde::{Deserialize, Serialize};

/// A struct to configure how Olm sessions should work under the hood.
///
/// Currently only the number of messages a receiving chain may skip ahead can
/// be configured.
#[derive(Clone, Copy, Debug, Serialize, Deserialize, PartialEq, Eq)]
pub struct SessionConfig {
    max_message_gap: u32,
}

impl SessionConfig {
    /// The default number of messages a message may skip ahead in a
    /// receiving chain.
    pub const DEFAULT_MAX_MESSAGE_GAP: u32 = 2000;

    /// Create a configuration that allows messages to skip ahead at most
    /// `max_message_gap` messages in a receiving chain.
    ///
    /// Every skipped message costs one HMAC operation on decryption, the gap
    /// bounds the work a single malicious message can cause.
    pub fn with_max_message_gap(max_message_gap: u32) -> Self {
        Self { max_message_gap }
    }

    /// The number of messages a message may skip ahead in a receiving chain.
    pub fn max_message_gap(&self) -> u32 {
        self.max_message_gap
    }
}

impl Default for SessionConfig {
    fn default() -> Self {
        Self { max_message_gap: Self::DEFAULT_MAX_MESSAGE_GAP }
    }
}
