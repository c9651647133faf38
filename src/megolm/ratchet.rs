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

use matrix_pickle::{Decode, Encode};
use zeroize::{Zeroize, ZeroizeOnDrop};

use crate::{EntropyError, RandomSource, chain::hmac_derive, primitives::cipher::Cipher};

const ADVANCEMENT_SEEDS: [&[u8; 1]; Ratchet::PART_COUNT] = [b"\x00", b"\x01", b"\x02", b"\x03"];

/// The Megolm ratchet, four 32 byte parts `R(0)..R(3)` and a counter.
///
/// `R(i)` is rehashed every `2^(8 * (3 - i))` steps, and whenever `R(i)`
/// changes the parts after it are derived from it anew. Moving the ratchet
/// forward by `n` steps thus takes at most `4 * 256` hash operations instead
/// of `n`.
#[derive(Clone, Zeroize, ZeroizeOnDrop)]
pub(super) struct Ratchet {
    inner: Box<[u8; Ratchet::LENGTH]>,
    counter: u32,
}

impl Ratchet {
    pub const LENGTH: usize = 128;
    const PART_COUNT: usize = 4;
    const PART_LENGTH: usize = 32;

    pub fn new(rng: &mut impl RandomSource) -> Result<Self, EntropyError> {
        let mut inner = Box::new([0u8; Self::LENGTH]);
        rng.fill(inner.as_mut_slice())?;

        Ok(Self { inner, counter: 0 })
    }

    pub fn from_bytes(bytes: Box<[u8; Self::LENGTH]>, counter: u32) -> Self {
        Self { inner: bytes, counter }
    }

    pub fn index(&self) -> u32 {
        self.counter
    }

    pub fn as_bytes(&self) -> &[u8; Self::LENGTH] {
        &self.inner
    }

    /// The cipher for the message with the current index.
    pub fn cipher(&self) -> Cipher {
        Cipher::new_megolm(&self.inner)
    }

    fn part(&self, index: usize) -> &[u8] {
        &self.inner[index * Self::PART_LENGTH..(index + 1) * Self::PART_LENGTH]
    }

    /// Replace `R(to)` with `HMAC(R(from), to)`.
    fn rehash(&mut self, from: usize, to: usize) {
        let mut derived = hmac_derive(self.part(from), ADVANCEMENT_SEEDS[to]);

        self.inner[to * Self::PART_LENGTH..(to + 1) * Self::PART_LENGTH]
            .copy_from_slice(derived.as_slice());

        derived.zeroize();
    }

    /// Move the ratchet forward by a single step.
    pub fn advance(&mut self) {
        let mut mask: u32 = 0x00FF_FFFF;
        let mut h = 0;

        self.counter = self.counter.wrapping_add(1);

        // Find the first part that needs to be rehashed, every part after it
        // is derived from it.
        while h < Self::PART_COUNT {
            if self.counter & mask == 0 {
                break;
            }

            h += 1;
            mask >>= 8;
        }

        for i in (h..Self::PART_COUNT).rev() {
            self.rehash(h, i);
        }
    }

    /// Move the ratchet forward until its counter is `advance_to`.
    ///
    /// If `advance_to` is below the current counter the ratchet wraps around.
    pub fn advance_to(&mut self, advance_to: u32) {
        for j in 0..Self::PART_COUNT {
            let shift = (Self::PART_COUNT - j - 1) * 8;
            let mask: u32 = u32::MAX << shift;

            // The masking handles the wraparound of the lower parts.
            let mut steps = ((advance_to >> shift).wrapping_sub(self.counter >> shift)) & 0xff;

            if steps == 0 {
                // Only possible for R(0): the target wrapped around, R(0)
                // needs a full cycle of 256 steps.
                if advance_to < self.counter {
                    steps = 0x100;
                } else {
                    continue;
                }
            }

            // All but the last step only touch R(j).
            while steps > 1 {
                self.rehash(j, j);
                steps -= 1;
            }

            // The last step also reseeds R(j+1)..R(3).
            for k in (j..Self::PART_COUNT).rev() {
                self.rehash(j, k);
            }

            self.counter = advance_to & mask;
        }
    }
}

/// The pickled form of a [`Ratchet`].
#[derive(Zeroize, ZeroizeOnDrop, Encode, Decode)]
pub(super) struct RatchetPickle {
    ratchet: Box<[u8; Ratchet::LENGTH]>,
    counter: u32,
}

impl From<&Ratchet> for RatchetPickle {
    fn from(ratchet: &Ratchet) -> Self {
        Self { ratchet: ratchet.inner.clone(), counter: ratchet.counter }
    }
}

impl From<&RatchetPickle> for Ratchet {
    fn from(pickle: &RatchetPickle) -> Self {
        Ratchet::from_bytes(pickle.ratchet.clone(), pickle.counter)
    }
}
