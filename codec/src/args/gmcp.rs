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

//! Generic MUD Communication Protocol messages.
//!
//! A GMCP message is `<package> <json>`. Package names are dotted
//! (`Char.Vitals`) and the JSON payload is opaque to this layer — callers
//! parse it with `serde_json` against whatever schema the package implies.
//! An empty payload or one with no space separator has no valid parse and
//! is discarded by the caller.

use bytes::BytesMut;
use std::fmt;

#[derive(Clone, Debug, Eq, PartialEq)]
pub struct GmcpMessage {
    package: String,
    data: Option<String>,
}

impl GmcpMessage {
    pub fn new<S: Into<String>, D: Into<String>>(package: S, data: Option<D>) -> Self {
        Self {
            package: package.into(),
            data: data.map(Into::into),
        }
    }

    pub fn command<S: Into<String>>(package: S) -> Self {
        Self {
            package: package.into(),
            data: None,
        }
    }

    /// Parses `<package> <json>` from a raw payload. GMCP payloads are
    /// always UTF-8; a non-UTF-8 payload, an empty payload, and a payload
    /// with no space separator all have no valid parse.
    pub fn parse(bytes: &[u8]) -> Option<Self> {
        let text = std::str::from_utf8(bytes).ok()?;
        let space = text.find(' ')?;
        Some(Self {
            package: text[..space].to_string(),
            data: Some(text[space + 1..].to_string()),
        })
    }

    pub fn package(&self) -> &str {
        &self.package
    }

    pub fn data(&self) -> Option<&str> {
        self.data.as_deref()
    }

    pub fn encode(&self) -> BytesMut {
        let mut bytes = BytesMut::new();
        bytes.extend_from_slice(self.package.as_bytes());
        if let Some(ref data) = self.data {
            bytes.extend_from_slice(b" ");
            bytes.extend_from_slice(data.as_bytes());
        }
        bytes
    }
}

impl fmt::Display for GmcpMessage {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}", self.package)?;
        if let Some(ref data) = self.data {
            write!(f, " {data}")?;
        }
        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn parses_package_and_data() {
        let msg = GmcpMessage::parse(br#"Char.Vitals {"hp":100,"mp":50}"#).unwrap();
        assert_eq!(msg.package(), "Char.Vitals");
        assert_eq!(msg.data(), Some(r#"{"hp":100,"mp":50}"#));
    }

    #[test]
    fn no_space_payload_fails_to_parse() {
        assert_eq!(GmcpMessage::parse(b"Core.Ping"), None);
    }

    #[test]
    fn empty_payload_fails_to_parse() {
        assert_eq!(GmcpMessage::parse(b""), None);
    }

    #[test]
    fn msdp_over_gmcp_package_name_is_preserved() {
        let msg = GmcpMessage::parse(br#"MSDP {"LIST":"COMMANDS"}"#).unwrap();
        assert_eq!(msg.package(), "MSDP");
    }

    #[test]
    fn round_trips_through_encode() {
        let original = GmcpMessage::new("Room.Info", Some(r#"{"num":1234}"#));
        let encoded = original.encode();
        assert_eq!(GmcpMessage::parse(&encoded).unwrap(), original);
    }
}
