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

//! New Environment Option, RFC 1572.
//!
//! A SEND request lists zero or more VAR/USERVAR names to ask for (an empty
//! list means "send everything"); an IS reply lists VAR/USERVAR name-value
//! entries. ESC escapes a literal VAR/VALUE/ESC/USERVAR byte inside a name
//! or value.

use crate::consts::marker;
use bytes::BytesMut;

/// One environment entry: a well-known `VAR` or a client-defined `USERVAR`.
#[derive(Clone, Debug, Eq, PartialEq)]
pub struct EnvEntry {
    pub is_uservar: bool,
    pub name: String,
    /// `None` for a bare name with no value (valid in a SEND list).
    pub value: Option<String>,
}

#[derive(Clone, Debug, Eq, PartialEq)]
pub enum NewEnvironMessage {
    Send(Vec<EnvEntry>),
    Is(Vec<EnvEntry>),
}

impl NewEnvironMessage {
    pub fn decode(payload: &[u8]) -> Option<Self> {
        let (kind, rest) = payload.split_first()?;
        let entries = decode_entries(rest);
        // The leading byte is SEND(1)/IS(0), reusing the TTYPE/CHARSET
        // marker space; ENV_VAR/ENV_VALUE/ENV_USERVAR only ever appear after it.
        match *kind {
            marker::SEND => Some(Self::Send(entries)),
            marker::IS => Some(Self::Is(entries)),
            _ => None,
        }
    }

    pub fn encode(&self) -> BytesMut {
        let (marker, entries) = match self {
            Self::Send(e) => (marker::SEND, e),
            Self::Is(e) => (marker::IS, e),
        };
        let mut out = BytesMut::new();
        out.extend_from_slice(&[marker]);
        for entry in entries {
            out.extend_from_slice(&[if entry.is_uservar { marker::ENV_USERVAR } else { marker::ENV_VAR }]);
            escape_into(&entry.name, &mut out);
            if let Some(value) = &entry.value {
                out.extend_from_slice(&[marker::ENV_VALUE]);
                escape_into(value, &mut out);
            }
        }
        out
    }
}

fn escape_into(s: &str, out: &mut BytesMut) {
    for &b in s.as_bytes() {
        if matches!(b, marker::ENV_VAR | marker::ENV_VALUE | marker::ENV_ESC | marker::ENV_USERVAR) {
            out.extend_from_slice(&[marker::ENV_ESC]);
        }
        out.extend_from_slice(&[b]);
    }
}

fn decode_entries(mut rest: &[u8]) -> Vec<EnvEntry> {
    let mut entries = Vec::new();
    while let Some(&marker_byte) = rest.first() {
        let is_uservar = match marker_byte {
            b if b == marker::ENV_VAR => false,
            b if b == marker::ENV_USERVAR => true,
            _ => break,
        };
        rest = &rest[1..];
        let (name, after_name) = decode_token(rest);
        rest = after_name;
        let mut value = None;
        if rest.first() == Some(&marker::ENV_VALUE) {
            rest = &rest[1..];
            let (v, after_value) = decode_token(rest);
            rest = after_value;
            value = Some(v);
        }
        entries.push(EnvEntry { is_uservar, name, value });
    }
    entries
}

/// Reads one ESC-escaped token up to (but not consuming) the next
/// unescaped VAR/VALUE/USERVAR marker byte.
fn decode_token(mut rest: &[u8]) -> (String, &[u8]) {
    let mut bytes = Vec::new();
    while let Some(&b) = rest.first() {
        if b == marker::ENV_ESC {
            if let Some(&escaped) = rest.get(1) {
                bytes.push(escaped);
                rest = &rest[2..];
                continue;
            }
            rest = &rest[1..];
            continue;
        }
        if matches!(b, marker::ENV_VAR | marker::ENV_VALUE | marker::ENV_USERVAR) {
            break;
        }
        bytes.push(b);
        rest = &rest[1..];
    }
    (String::from_utf8_lossy(&bytes).into_owned(), rest)
}
