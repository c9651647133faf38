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

use rand::{CryptoRng, RngCore};
use thiserror::Error;

use crate::ErrorKind;

/// Error type describing a source of randomness that failed to deliver the
/// requested number of bytes.
#[derive(Debug, Error)]
pub enum EntropyError {
    /// The random number generator returned an error.
    #[error("The random number generator failed to produce random bytes: {0}")]
    Rng(#[from] rand::Error),
    /// A fixed buffer of random bytes didn't contain enough bytes.
    #[error(
        "The supplied random bytes were exhausted, {needed} bytes were needed \
         but only {available} were left"
    )]
    Exhausted {
        /// The number of bytes that were requested.
        needed: usize,
        /// The number of bytes that were still available.
        available: usize,
    },
}

impl EntropyError {
    /// The category of this error.
    pub fn kind(&self) -> ErrorKind {
        ErrorKind::EntropyUnavailable
    }
}

/// A source of cryptographically secure random bytes.
///
/// Every operation in this crate that needs randomness takes it as an
/// explicit argument. The trait is implemented for every cryptographically
/// secure [`rand`] generator, and for [`FixedBytes`] which hands out a
/// caller supplied buffer.
pub trait RandomSource {
    /// Fill the destination with random bytes.
    fn fill(&mut self, destination: &mut [u8]) -> Result<(), EntropyError>;
}

impl<R: RngCore + CryptoRng> RandomSource for R {
    fn fill(&mut self, destination: &mut [u8]) -> Result<(), EntropyError> {
        Ok(self.try_fill_bytes(destination)?)
    }
}

/// A [`RandomSource`] that hands out bytes from a caller supplied buffer.
///
/// Useful when the random bytes come from somewhere else, for example from a
/// platform API, or when deterministic output is needed in tests. Every byte
/// is handed out at most once.
#[derive(Debug)]
pub struct FixedBytes<'a> {
    bytes: &'a [u8],
}

impl<'a> FixedBytes<'a> {
    /// Create a new source over the given bytes.
    pub fn new(bytes: &'a [u8]) -> Self {
        Self { bytes }
    }

    /// The number of bytes that haven't been handed out yet.
    pub fn remaining(&self) -> usize {
        self.bytes.len()
    }
}

impl RandomSource for FixedBytes<'_> {
    fn fill(&mut self, destination: &mut [u8]) -> Result<(), EntropyError> {
        if destination.len() > self.bytes.len() {
            Err(EntropyError::Exhausted { needed: destination.len(), available: self.bytes.len() })
        } else {
            let (head, tail) = self.bytes.split_at(destination.len());
            destination.copy_from_slice(head);
            self.bytes = tail;

            Ok(())
        }
    }
}

#[cfg(test)]
mod test {
    use assert_matches2::assert_matches;
    use rand::{SeedableRng, rngs::StdRng};

    use super::{EntropyError, FixedBytes, RandomSource};
    use crate::ErrorKind;

    #[test]
    fn fixed_bytes_are_handed_out_once() {
        let bytes = [1u8, 2, 3, 4, 5];
        let mut source = FixedBytes::new(&bytes);

        let mut first = [0u8; 3];
        source.fill(&mut first).expect("Enough bytes should be available");
        assert_eq!(first, [1, 2, 3]);
        assert_eq!(source.remaining(), 2);

        let mut second = [0u8; 3];
        let error = source.fill(&mut second).expect_err("The buffer should be exhausted");
        assert_eq!(error.kind(), ErrorKind::EntropyUnavailable);
        assert_matches!(error, EntropyError::Exhausted { needed: 3, available: 2 });
        assert_eq!(source.remaining(), 2);
    }

    #[test]
    fn seeded_rng_is_deterministic() {
        let mut first = [0u8; 32];
        let mut second = [0u8; 32];

        StdRng::seed_from_u64(42).fill(&mut first).expect("The rng should produce bytes");
        StdRng::seed_from_u64(42).fill(&mut second).expect("The rng should produce bytes");

        assert_eq!(first, second);
    }
}
