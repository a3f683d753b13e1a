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

//! CHARSET negotiation, RFC 2066.
//!
//! A REQUEST lists candidate charset names separated by a single
//! caller-chosen separator byte (conventionally `;`); the peer answers
//! ACCEPTED with the one name it picked, or REJECTED with no payload.

use crate::consts::marker;
use bytes::BytesMut;

#[derive(Clone, Debug, Eq, PartialEq)]
pub enum CharsetMessage {
    /// `REQUEST <sep><name><sep><name>...`
    Request { separator: u8, names: Vec<String> },
    /// `ACCEPTED <name>`
    Accepted(String),
    /// `REJECTED`
    Rejected,
}

impl CharsetMessage {
    pub fn decode(payload: &[u8]) -> Option<Self> {
        match *payload.first()? {
            marker::REQUEST => {
                let separator = *payload.get(1)?;
                let names = payload[2..]
                    .split(|&b| b == separator)
                    .filter(|s| !s.is_empty())
                    .map(|s| String::from_utf8_lossy(s).into_owned())
                    .collect();
                Some(Self::Request { separator, names })
            }
            marker::ACCEPTED => Some(Self::Accepted(String::from_utf8_lossy(&payload[1..]).into_owned())),
            marker::REJECTED => Some(Self::Rejected),
            _ => None,
        }
    }

    pub fn encode(&self) -> BytesMut {
        let mut out = BytesMut::new();
        match self {
            Self::Request { separator, names } => {
                out.extend_from_slice(&[marker::REQUEST, *separator]);
                for (i, name) in names.iter().enumerate() {
                    if i > 0 {
                        out.extend_from_slice(&[*separator]);
                    }
                    out.extend_from_slice(name.as_bytes());
                }
            }
            Self::Accepted(name) => {
                out.extend_from_slice(&[marker::ACCEPTED]);
                out.extend_from_slice(name.as_bytes());
            }
            Self::Rejected => out.extend_from_slice(&[marker::REJECTED]),
        }
        out
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn request_round_trips_multiple_names() {
        let msg = CharsetMessage::Request {
            separator: b';',
            names: vec!["UTF-8".into(), "ISO-8859-1".into()],
        };
        assert_eq!(CharsetMessage::decode(&msg.encode()), Some(msg));
    }

    #[test]
    fn accepted_round_trips() {
        let msg = CharsetMessage::Accepted("UTF-8".into());
        assert_eq!(CharsetMessage::decode(&msg.encode()), Some(msg));
    }

    #[test]
    fn rejected_has_no_payload() {
        assert_eq!(CharsetMessage::Rejected.encode().len(), 1);
        assert_eq!(CharsetMessage::decode(&[marker::REJECTED]), Some(CharsetMessage::Rejected));
    }
}
