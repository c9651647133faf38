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

use base64::{Engine, engine::general_purpose::STANDARD_NO_PAD};
pub use base64::DecodeError;

/// Decode the input as base64 with no padding.
pub fn base64_decode(input: impl AsRef<[u8]>) -> Result<Vec<u8>, DecodeError> {
    STANDARD_NO_PAD.decode(input)
}

/// Encode the input as base64 with no padding.
pub fn base64_encode(input: impl AsRef<[u8]>) -> String {
    STANDARD_NO_PAD.encode(input)
}

/// Protobuf style variable length integer encoding.
pub(crate) trait VarInt {
    fn to_var_int(self) -> Vec<u8>;
}

impl VarInt for u64 {
    fn to_var_int(self) -> Vec<u8> {
        let mut value = self;
        let mut output = Vec::with_capacity(10);

        while value >= 0x80 {
            output.push((value as u8) | 0x80);
            value >>= 7;
        }

        output.push(value as u8);

        output
    }
}

impl VarInt for u32 {
    fn to_var_int(self) -> Vec<u8> {
        u64::from(self).to_var_int()
    }
}

impl VarInt for usize {
    fn to_var_int(self) -> Vec<u8> {
        (self as u64).to_var_int()
    }
}

/// Append a length delimited protobuf field with the given key byte.
pub(crate) fn encode_bytes_field(output: &mut Vec<u8>, key: u8, bytes: &[u8]) {
    output.push(key);
    output.extend(bytes.len().to_var_int());
    output.extend_from_slice(bytes);
}

/// Append a varint protobuf field with the given key byte.
pub(crate) fn encode_varint_field(output: &mut Vec<u8>, key: u8, value: u32) {
    output.push(key);
    output.extend(value.to_var_int());
}
