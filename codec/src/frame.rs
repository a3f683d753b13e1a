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

//! Wire-level Telnet commands and the IAC-doubling helpers used by every
//! subnegotiation payload encoder.

use crate::consts;
use crate::options::TelnetOption;
use bytes::{BufMut, BytesMut};

/// A single Telnet command, ready to be written to the wire.
#[derive(Clone, Copy, Debug, Eq, PartialEq)]
pub enum TelnetFrame {
    /// `IAC WILL <option>`.
    Will(TelnetOption),
    /// `IAC WONT <option>`.
    Wont(TelnetOption),
    /// `IAC DO <option>`.
    Do(TelnetOption),
    /// `IAC DONT <option>`.
    Dont(TelnetOption),
    /// `IAC GA`.
    GoAhead,
    /// `IAC EOR`.
    EndOfRecord,
}

impl TelnetFrame {
    /// Appends the wire bytes for this command to `out`.
    pub fn encode(self, out: &mut BytesMut) {
        out.reserve(3);
        match self {
            Self::Will(opt) => out.put_slice(&[consts::IAC, consts::WILL, opt.to_u8()]),
            Self::Wont(opt) => out.put_slice(&[consts::IAC, consts::WONT, opt.to_u8()]),
            Self::Do(opt) => out.put_slice(&[consts::IAC, consts::DO, opt.to_u8()]),
            Self::Dont(opt) => out.put_slice(&[consts::IAC, consts::DONT, opt.to_u8()]),
            Self::GoAhead => out.put_slice(&[consts::IAC, consts::GA]),
            Self::EndOfRecord => out.put_slice(&[consts::IAC, consts::EOR]),
        }
    }

    /// Encodes straight into a freshly allocated buffer.
    pub fn to_bytes(self) -> BytesMut {
        let mut out = BytesMut::with_capacity(3);
        self.encode(&mut out);
        out
    }
}

/// Wraps `payload` in `IAC SB <option> ... IAC SE`, doubling any literal
/// `0xFF` byte in the payload per `spec.md` §6 ("all 0xFF bytes inside any
/// envelope or payload are IAC-doubled").
pub fn encode_subnegotiation(option: TelnetOption, payload: &[u8], out: &mut BytesMut) {
    out.reserve(payload.len() + 6);
    out.put_slice(&[consts::IAC, consts::SB, option.to_u8()]);
    escape_iac(payload, out);
    out.put_slice(&[consts::IAC, consts::SE]);
}

/// Appends `data` to `out`, doubling every literal `0xFF` byte.
pub fn escape_iac(data: &[u8], out: &mut BytesMut) {
    out.reserve(data.len());
    for &b in data {
        out.put_u8(b);
        if b == consts::IAC {
            out.put_u8(consts::IAC);
        }
    }
}

/// Removes IAC-doubling from a payload that was accumulated byte-by-byte by
/// the FSM's Escaping substate (`spec.md` §4.2): every `IAC IAC` pair
/// collapses to one `0xFF`. The FSM only ever pushes an already-undoubled
/// byte into an option buffer, so in practice this is a no-op pass used by
/// tests and by plugins that receive a raw pre-FSM payload directly.
pub fn unescape_iac(data: &[u8]) -> Vec<u8> {
    let mut out = Vec::with_capacity(data.len());
    let mut iter = data.iter().copied();
    while let Some(b) = iter.next() {
        out.push(b);
        if b == consts::IAC {
            // consume the doubled IAC, if present
            let _ = iter.next();
        }
    }
    out
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn will_echo_encodes_three_bytes() {
        let bytes = TelnetFrame::Will(TelnetOption::Echo).to_bytes();
        assert_eq!(&bytes[..], &[consts::IAC, consts::WILL, 1]);
    }

    #[test]
    fn escape_doubles_iac_bytes() {
        let mut out = BytesMut::new();
        escape_iac(&[0x01, 0xFF, 0x02], &mut out);
        assert_eq!(&out[..], &[0x01, 0xFF, 0xFF, 0x02]);
    }

    #[test]
    fn unescape_collapses_doubled_iac() {
        let out = unescape_iac(&[0x01, 0xFF, 0xFF, 0x02]);
        assert_eq!(out, vec![0x01, 0xFF, 0x02]);
    }

    #[test]
    fn subnegotiation_envelope_is_well_formed() {
        let mut out = BytesMut::new();
        encode_subnegotiation(TelnetOption::Naws, &[0, 80, 0, 24], &mut out);
        assert_eq!(
            &out[..],
            &[consts::IAC, consts::SB, 31, 0, 80, 0, 24, consts::IAC, consts::SE]
        );
    }
}
