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

//! MUD Server Status Protocol: a static table of server metadata, sent once
//! as a single subnegotiation in reply to `IAC DO MSSP`. Unlike MSDP, MSSP
//! is not negotiated interactively and carries no ARRAY/TABLE nesting —
//! just VAR/VAL pairs, where a VAR may repeat with several VAL entries.

use crate::consts;
use byteorder::WriteBytesExt;
use bytes::BufMut;
use std::collections::BTreeMap;

/// The kind of value an MSSP variable carries, which determines its wire
/// encoding (`spec.md` §4.5: booleans encode as `"1"`/`"0"`, integers as
/// decimal, lists as repeated `VAL` entries under the same `VAR`).
#[derive(Clone, Debug, PartialEq)]
pub enum MsspValue {
    Scalar(String),
    Boolean(bool),
    Integer(i64),
    List(Vec<String>),
}

impl MsspValue {
    pub fn scalar(s: impl Into<String>) -> Self {
        Self::Scalar(s.into())
    }

    fn encode_values(&self) -> Vec<String> {
        match self {
            Self::Scalar(s) => vec![s.clone()],
            Self::Boolean(b) => vec![if *b { "1" } else { "0" }.to_string()],
            Self::Integer(n) => vec![n.to_string()],
            Self::List(items) => items.clone(),
        }
    }
}

/// The value kind a canonical MSSP variable is documented to carry.
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub enum MsspValueKind {
    Scalar,
    Boolean,
    Integer,
    List,
}

/// One entry in the canonical MSSP variable table: name plus expected kind.
#[derive(Clone, Copy, Debug)]
pub struct MsspVariableSpec {
    pub name: &'static str,
    pub kind: MsspValueKind,
}

/// The MSSP protocol's documented variable names (`spec.md` §4.5/§9),
/// replacing the reflection-based discovery the original implementation
/// used with a static, inspectable table. A server is free to report any
/// subset of these plus arbitrary extension names this table doesn't list.
pub const CANONICAL_VARIABLES: &[MsspVariableSpec] = &[
    spec(MsspValueKind::Scalar, "NAME"),
    spec(MsspValueKind::Integer, "PLAYERS"),
    spec(MsspValueKind::Integer, "UPTIME"),
    spec(MsspValueKind::Scalar, "CODEBASE"),
    spec(MsspValueKind::Scalar, "CONTACT"),
    spec(MsspValueKind::Integer, "CRAWL DELAY"),
    spec(MsspValueKind::Scalar, "CREATED"),
    spec(MsspValueKind::Scalar, "HOSTNAME"),
    spec(MsspValueKind::Scalar, "ICON"),
    spec(MsspValueKind::Scalar, "IP"),
    spec(MsspValueKind::Scalar, "IPV6"),
    spec(MsspValueKind::Scalar, "LANGUAGE"),
    spec(MsspValueKind::Scalar, "LOCATION"),
    spec(MsspValueKind::Integer, "MINIMUM_AGE"),
    spec(MsspValueKind::Integer, "PORT"),
    spec(MsspValueKind::Scalar, "REFERRAL"),
    spec(MsspValueKind::Scalar, "WEBSITE"),
    spec(MsspValueKind::Scalar, "FAMILY"),
    spec(MsspValueKind::Scalar, "GENRE"),
    spec(MsspValueKind::Scalar, "GAMEPLAY"),
    spec(MsspValueKind::Scalar, "STATUS"),
    spec(MsspValueKind::Scalar, "GAMESYSTEM"),
    spec(MsspValueKind::Scalar, "INTERMUD"),
    spec(MsspValueKind::Scalar, "SUBGENRE"),
    spec(MsspValueKind::Integer, "AREAS"),
    spec(MsspValueKind::Integer, "HELPFILES"),
    spec(MsspValueKind::Integer, "MOBILES"),
    spec(MsspValueKind::Integer, "OBJECTS"),
    spec(MsspValueKind::Integer, "ROOMS"),
    spec(MsspValueKind::Integer, "CLASSES"),
    spec(MsspValueKind::Integer, "LEVELS"),
    spec(MsspValueKind::Integer, "RACES"),
    spec(MsspValueKind::Integer, "SKILLS"),
    spec(MsspValueKind::Boolean, "ANSI"),
    spec(MsspValueKind::Boolean, "PUEBLO"),
    spec(MsspValueKind::Boolean, "MSP"),
    spec(MsspValueKind::Boolean, "UTF-8"),
    spec(MsspValueKind::Boolean, "VT100"),
    spec(MsspValueKind::Boolean, "XTERM: 256 COLORS"),
    spec(MsspValueKind::Boolean, "XTERM: TRUE COLORS"),
    spec(MsspValueKind::Boolean, "PAY: TO PLAY"),
    spec(MsspValueKind::Boolean, "PAY: FOR PERKS"),
    spec(MsspValueKind::Boolean, "HIRING: BUILDERS"),
    spec(MsspValueKind::Boolean, "HIRING: CODERS"),
];

const fn spec(kind: MsspValueKind, name: &'static str) -> MsspVariableSpec {
    MsspVariableSpec { name, kind }
}

/// Looks up a canonical variable's documented value kind, if `name` is one
/// of the names `spec.md` enumerates.
pub fn canonical_kind(name: &str) -> Option<MsspValueKind> {
    CANONICAL_VARIABLES.iter().find(|v| v.name.eq_ignore_ascii_case(name)).map(|v| v.kind)
}

/// A server's MSSP variable table, keyed by variable name with one or more
/// values each (e.g. `CRAWL DELAY` may list several acceptable values).
#[derive(Clone, Debug, Default)]
pub struct MsspTable(BTreeMap<String, Vec<String>>);

impl MsspTable {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn set(&mut self, key: impl Into<String>, values: Vec<String>) {
        self.0.insert(key.into(), values);
    }

    /// Sets a variable from a typed [`MsspValue`], encoding it per its kind
    /// (`spec.md` §4.5).
    pub fn set_typed(&mut self, key: impl Into<String>, value: MsspValue) {
        self.0.insert(key.into(), value.encode_values());
    }

    pub fn get(&self, key: &str) -> Option<&[String]> {
        self.0.get(key).map(Vec::as_slice)
    }

    pub fn encode<T: BufMut>(&self, dst: &mut T) -> std::io::Result<usize> {
        self.write(&mut dst.writer())
    }

    /// Strips NUL, IAC, VAR, and VAL from keys/values before writing — those
    /// bytes would otherwise be indistinguishable from protocol structure.
    pub fn write<W: std::io::Write>(&self, writer: &mut W) -> std::io::Result<usize> {
        let mut len = 0;
        for (key, values) in &self.0 {
            writer.write_u8(consts::marker::MSSP_VAR)?;
            len += 1 + writer.write(&sanitize(key))?;
            for value in values {
                writer.write_u8(consts::marker::MSSP_VAL)?;
                len += 1 + writer.write(&sanitize(value))?;
            }
        }
        Ok(len)
    }
}

fn sanitize(s: &str) -> Vec<u8> {
    s.bytes()
        .filter(|&b| {
            b != 0 && b != consts::IAC && b != consts::marker::MSSP_VAR && b != consts::marker::MSSP_VAL
        })
        .collect()
}

#[cfg(test)]
mod tests {
    use super::*;
    use bytes::BytesMut;

    #[test]
    fn single_value_round_trips_on_the_wire() {
        let mut table = MsspTable::new();
        table.set("NAME", vec!["Phoenix MUD".into()]);
        let mut buf = BytesMut::new();
        table.encode(&mut buf).unwrap();
        assert_eq!(
            &buf[..],
            &[consts::marker::MSSP_VAR, b'N', b'A', b'M', b'E', consts::marker::MSSP_VAL, b'P', b'h', b'o', b'e', b'n', b'i', b'x', b' ', b'M', b'U', b'D'][..]
        );
    }

    #[test]
    fn sanitize_strips_structural_bytes() {
        let dirty = format!("bad{}name", consts::marker::MSSP_VAR as char);
        let cleaned = sanitize(&dirty);
        assert!(!cleaned.contains(&consts::marker::MSSP_VAR));
    }

    #[test]
    fn typed_values_encode_per_kind() {
        assert_eq!(MsspValue::Boolean(true).encode_values(), vec!["1".to_string()]);
        assert_eq!(MsspValue::Boolean(false).encode_values(), vec!["0".to_string()]);
        assert_eq!(MsspValue::Integer(42).encode_values(), vec!["42".to_string()]);
        assert_eq!(
            MsspValue::List(vec!["north".into(), "south".into()]).encode_values(),
            vec!["north".to_string(), "south".to_string()]
        );
    }

    #[test]
    fn set_typed_writes_a_boolean_as_one_or_zero() {
        let mut table = MsspTable::new();
        table.set_typed("ANSI", MsspValue::Boolean(true));
        assert_eq!(table.get("ANSI"), Some(&["1".to_string()][..]));
    }

    #[test]
    fn canonical_kind_looks_up_documented_variables() {
        assert_eq!(canonical_kind("ANSI"), Some(MsspValueKind::Boolean));
        assert_eq!(canonical_kind("players"), Some(MsspValueKind::Integer));
        assert_eq!(canonical_kind("NOT-A-REAL-VARIABLE"), None);
    }
}
