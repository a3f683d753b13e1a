//
// Copyright 2017-2026 Hans W. Uhlig. All Rights Reserved.
//
// Licensed under the Apache License, Version 2.0 (the "License");
// you may not use this file except in compliance with the License.
// You may obtain a copy of the License at
//
//      http://www.apache.org/licenses/LICENSE-2.0
//
// Unless required by applicable law or agreed to in writing, software
// distributed under the License is distributed on an "AS IS" BASIS,
// WITHOUT WARRANTIES OR CONDITIONS OF ANY KIND, either express or implied.
// See the License for the specific language governing permissions and
// limitations under the License.
//

//! MUD Server Data Protocol payloads.
//!
//! MSDP nests: a VAR name is followed by a VAL value, and a value can
//! itself be a string, an ARRAY of values, or a TABLE of VAR/VAL pairs.
//! [`MsdpValue::decode`] is a small recursive-descent parser over that
//! grammar; it never fails on malformed nesting — an unexpected close
//! marker or end of buffer just ends the current value early, since the
//! wider subnegotiation framing (IAC SE) is the real unit of recovery.

use crate::consts::marker;
use bytes::{Buf, BufMut};

/// A decoded MSDP value: a leaf string, or a nested array/table.
#[derive(Clone, Debug, PartialEq)]
pub enum MsdpValue {
    String(String),
    Array(Vec<MsdpValue>),
    Table(Vec<(String, MsdpValue)>),
}

impl MsdpValue {
    pub fn string(s: impl Into<String>) -> Self {
        Self::String(s.into())
    }

    /// Reads one value: peeks the next byte to decide whether it opens a
    /// table, an array, or is the start of a bare string.
    pub fn decode<B: Buf>(src: &mut B) -> Self {
        if !src.has_remaining() {
            return Self::String(String::new());
        }
        match src.chunk()[0] {
            marker::MSDP_ARRAY_OPEN => Self::decode_array(src),
            marker::MSDP_TABLE_OPEN => Self::decode_table(src),
            _ => Self::String(Self::decode_string(src)),
        }
    }

    fn decode_string<B: Buf>(src: &mut B) -> String {
        let mut bytes = Vec::new();
        while src.has_remaining() {
            let b = src.chunk()[0];
            if matches!(
                b,
                marker::MSDP_VAR | marker::MSDP_VAL | marker::MSDP_ARRAY_CLOSE | marker::MSDP_TABLE_CLOSE
            ) {
                break;
            }
            bytes.push(src.get_u8());
        }
        String::from_utf8_lossy(&bytes).into_owned()
    }

    fn decode_array<B: Buf>(src: &mut B) -> Self {
        src.advance(1); // ARRAY_OPEN
        let mut values = Vec::new();
        while src.has_remaining() {
            match src.chunk()[0] {
                marker::MSDP_ARRAY_CLOSE => {
                    src.advance(1);
                    break;
                }
                marker::MSDP_VAL => {
                    src.advance(1);
                    values.push(Self::decode(src));
                }
                _ => {
                    src.advance(1);
                }
            }
        }
        Self::Array(values)
    }

    fn decode_table<B: Buf>(src: &mut B) -> Self {
        src.advance(1); // TABLE_OPEN
        let mut entries = Vec::new();
        while src.has_remaining() {
            match src.chunk()[0] {
                marker::MSDP_TABLE_CLOSE => {
                    src.advance(1);
                    break;
                }
                marker::MSDP_VAR => {
                    src.advance(1);
                    let key = Self::decode_string(src);
                    if src.has_remaining() && src.chunk()[0] == marker::MSDP_VAL {
                        src.advance(1);
                        entries.push((key, Self::decode(src)));
                    }
                }
                _ => {
                    src.advance(1);
                }
            }
        }
        Self::Table(entries)
    }

    pub fn write<T: BufMut>(&self, dst: &mut T) {
        match self {
            Self::String(s) => dst.put_slice(s.as_bytes()),
            Self::Array(values) => {
                dst.put_u8(marker::MSDP_ARRAY_OPEN);
                for v in values {
                    dst.put_u8(marker::MSDP_VAL);
                    v.write(dst);
                }
                dst.put_u8(marker::MSDP_ARRAY_CLOSE);
            }
            Self::Table(entries) => {
                dst.put_u8(marker::MSDP_TABLE_OPEN);
                for (key, value) in entries {
                    dst.put_u8(marker::MSDP_VAR);
                    dst.put_slice(key.as_bytes());
                    dst.put_u8(marker::MSDP_VAL);
                    value.write(dst);
                }
                dst.put_u8(marker::MSDP_TABLE_CLOSE);
            }
        }
    }
}

/// A single `VAR name VAL value` pair. A message is zero or more of these
/// back to back (`spec.md` §4.5 grammar: `message := (VAR <name> VAL
/// <value>)*`); see [`MsdpVariable::decode_all`] for decoding a whole
/// subnegotiation payload.
#[derive(Clone, Debug, PartialEq)]
pub struct MsdpVariable {
    pub name: String,
    pub value: MsdpValue,
}

impl MsdpVariable {
    /// Decodes one `VAR <name> VAL <value>` pair. Returns `None` if the
    /// remaining buffer doesn't start with a VAR marker.
    pub fn decode<B: Buf>(src: &mut B) -> Option<Self> {
        if !src.has_remaining() || src.chunk()[0] != marker::MSDP_VAR {
            return None;
        }
        src.advance(1);
        let name = MsdpValue::decode_string(src);
        if !src.has_remaining() || src.chunk()[0] != marker::MSDP_VAL {
            return None;
        }
        src.advance(1);
        let value = MsdpValue::decode(src);
        Some(Self { name, value })
    }

    /// Decodes every `VAR <name> VAL <value>` pair in a subnegotiation
    /// payload, in order. Stops (without error) at the first byte that
    /// isn't a VAR marker, which is ordinarily just the end of the buffer.
    pub fn decode_all<B: Buf>(src: &mut B) -> Vec<Self> {
        let mut variables = Vec::new();
        while let Some(var) = Self::decode(src) {
            variables.push(var);
        }
        variables
    }

    pub fn write<T: BufMut>(&self, dst: &mut T) {
        dst.put_u8(marker::MSDP_VAR);
        dst.put_slice(self.name.as_bytes());
        dst.put_u8(marker::MSDP_VAL);
        self.value.write(dst);
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use bytes::BytesMut;

    #[test]
    fn round_trips_string_value() {
        let var = MsdpVariable { name: "NAME".into(), value: MsdpValue::string("Phoenix") };
        let mut buf = BytesMut::new();
        var.write(&mut buf);
        let decoded = MsdpVariable::decode(&mut &buf[..]).unwrap();
        assert_eq!(decoded, var);
    }

    #[test]
    fn round_trips_array_value() {
        let var = MsdpVariable {
            name: "REPORTABLE_VARIABLES".into(),
            value: MsdpValue::Array(vec![MsdpValue::string("HP"), MsdpValue::string("MP")]),
        };
        let mut buf = BytesMut::new();
        var.write(&mut buf);
        assert_eq!(MsdpVariable::decode(&mut &buf[..]).unwrap(), var);
    }

    #[test]
    fn round_trips_nested_table() {
        let var = MsdpVariable {
            name: "ROOM".into(),
            value: MsdpValue::Table(vec![
                ("NAME".into(), MsdpValue::string("Town Square")),
                ("EXITS".into(), MsdpValue::Array(vec![MsdpValue::string("north")])),
            ]),
        };
        let mut buf = BytesMut::new();
        var.write(&mut buf);
        assert_eq!(MsdpVariable::decode(&mut &buf[..]).unwrap(), var);
    }

    #[test]
    fn missing_var_marker_is_rejected() {
        let buf = BytesMut::from(&b"not-a-var"[..]);
        assert!(MsdpVariable::decode(&mut &buf[..]).is_none());
    }

    #[test]
    fn decode_all_reads_every_pair_in_one_message() {
        let vars = vec![
            MsdpVariable { name: "HP".into(), value: MsdpValue::string("100") },
            MsdpVariable { name: "MP".into(), value: MsdpValue::string("50") },
            MsdpVariable { name: "NAME".into(), value: MsdpValue::string("Phoenix") },
        ];
        let mut buf = BytesMut::new();
        for var in &vars {
            var.write(&mut buf);
        }
        assert_eq!(MsdpVariable::decode_all(&mut &buf[..]), vars);
    }

    #[test]
    fn decode_all_on_empty_buffer_is_empty() {
        assert!(MsdpVariable::decode_all(&mut &b""[..]).is_empty());
    }
}
