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

//! Terminal Type (RFC 1091) and the MTTS extension used to advertise client
//! capability bits through the same TTYPE cycle.
//!
//! A client that supports MTTS replies to the final `SEND` in its cycle with
//! `MTTS <bitfield>` instead of repeating its last terminal name; this module
//! treats that reply as just another [`TTypeValue`] and leaves cycle-position
//! tracking to the caller (`spec.md` §4.5 puts that bookkeeping — and the
//! decision of when a repeated name means "cycle exhausted" — in the plugin,
//! not the wire codec).

use crate::consts::marker;
use bytes::BytesMut;
use std::fmt;

/// One TTYPE subnegotiation: either a request for the next name, or a reply
/// carrying one.
#[derive(Clone, Debug, Eq, PartialEq)]
pub enum TTypeMessage {
    /// `IAC SB TTYPE SEND IAC SE` — ask the peer for its next terminal type.
    Send,
    /// `IAC SB TTYPE IS <name> IAC SE` — the peer's terminal type name.
    Is(String),
}

impl TTypeMessage {
    pub fn decode(payload: &[u8]) -> Option<Self> {
        match *payload.first()? {
            marker::SEND => Some(Self::Send),
            marker::IS => Some(Self::Is(String::from_utf8_lossy(&payload[1..]).into_owned())),
            _ => None,
        }
    }

    pub fn encode(&self) -> BytesMut {
        let mut out = BytesMut::new();
        match self {
            Self::Send => out.extend_from_slice(&[marker::SEND]),
            Self::Is(name) => {
                out.extend_from_slice(&[marker::IS]);
                out.extend_from_slice(name.as_bytes());
            }
        }
        out
    }
}

/// MTTS capability bits, carried as an ASCII decimal number in an `IS` reply
/// whose name is literally `MTTS <n>`. Hand-rolled rather than pulled from a
/// flags crate since there are only ten bits and no set-algebra beyond
/// `contains`/`union` is needed.
#[derive(Clone, Copy, Debug, Eq, PartialEq)]
pub struct MttsCapabilities(u32);

impl MttsCapabilities {
    pub const ANSI: Self = Self(1);
    pub const VT100: Self = Self(2);
    pub const UTF8: Self = Self(4);
    pub const COLOR_256: Self = Self(8);
    pub const MOUSE_TRACKING: Self = Self(16);
    pub const OSC_COLOR_PALETTE: Self = Self(32);
    pub const SCREEN_READER: Self = Self(64);
    pub const PROXY: Self = Self(128);
    pub const TRUECOLOR: Self = Self(256);
    pub const MNES: Self = Self(512);

    pub fn bits(self) -> u32 {
        self.0
    }

    pub fn contains(self, flag: Self) -> bool {
        self.0 & flag.0 == flag.0
    }

    /// Parses `MTTS <decimal>`, returning `None` for any other terminal name.
    pub fn parse(terminal_name: &str) -> Option<Self> {
        let bits = terminal_name.strip_prefix("MTTS ")?.trim().parse::<u32>().ok()?;
        Some(Self(bits))
    }
}

impl fmt::Display for MttsCapabilities {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "MTTS {}", self.bits())
    }
}
