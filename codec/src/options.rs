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

use crate::consts::option;
use std::fmt;

/// A negotiable Telnet option.
///
/// [IANA Telnet Options registry](https://www.iana.org/assignments/telnet-options/telnet-options.xhtml).
/// This engine only ships plugins for the MUD-relevant subset named in
/// `spec.md` §4.5; the remaining well-known codes are still representable
/// so that `BadSubNegotiation`/safe-negotiation refusal (`spec.md` §4.2) has
/// a real option identity to log rather than a bare byte.
#[repr(u8)]
#[derive(Clone, Copy, Debug, Eq, Hash, PartialEq)]
pub enum TelnetOption {
    /// RFC 856.
    TransmitBinary,
    /// RFC 857.
    Echo,
    /// RFC 858.
    SuppressGoAhead,
    /// RFC 859.
    Status,
    /// RFC 1091.
    TType,
    /// RFC 885.
    Eor,
    /// RFC 1073.
    Naws,
    /// RFC 1079.
    TSpeed,
    /// RFC 1572.
    NewEnvironment,
    /// RFC 2066.
    Charset,
    /// [MSDP](https://tintin.sourceforge.io/protocols/msdp/).
    Msdp,
    /// [MSSP](https://tintin.sourceforge.io/protocols/mssp/).
    Mssp,
    /// [MCCPv1](http://www.gammon.com.au/mccp/protocol.html) — advertised as
    /// a known code only so the safe-negotiation path can refuse it by name;
    /// this engine never negotiates compression active (`spec.md` §1).
    Compress1,
    /// [MCCPv2](https://tintin.sourceforge.io/protocols/mccp/) — refused, as [`Self::Compress1`].
    Compress2,
    /// [GMCP](https://www.gammon.com.au/gmcp).
    Gmcp,
    /// Any option code this engine does not recognize.
    Unknown(u8),
}

impl TelnetOption {
    /// Converts to the wire byte.
    pub fn to_u8(self) -> u8 {
        match self {
            Self::TransmitBinary => option::BINARY,
            Self::Echo => option::ECHO,
            Self::SuppressGoAhead => option::SGA,
            Self::Status => option::STATUS,
            Self::TType => option::TTYPE,
            Self::Eor => option::EOR,
            Self::Naws => option::NAWS,
            Self::TSpeed => option::TSPEED,
            Self::NewEnvironment => option::NEW_ENVIRON,
            Self::Charset => option::CHARSET,
            Self::Msdp => option::MSDP,
            Self::Mssp => option::MSSP,
            Self::Compress1 => option::COMPRESS1,
            Self::Compress2 => option::COMPRESS2,
            Self::Gmcp => option::GMCP,
            Self::Unknown(b) => b,
        }
    }

    /// A stable, human-readable name for this option, for use where a
    /// `&'static str` is required (e.g. dependency-cycle diagnostics).
    pub fn name(&self) -> &'static str {
        match self {
            Self::TransmitBinary => "TRANSMIT-BINARY",
            Self::Echo => "ECHO",
            Self::SuppressGoAhead => "SUPPRESS-GA",
            Self::Status => "STATUS",
            Self::TType => "TTYPE",
            Self::Eor => "EOR",
            Self::Naws => "NAWS",
            Self::TSpeed => "TSPEED",
            Self::NewEnvironment => "NEW-ENVIRON",
            Self::Charset => "CHARSET",
            Self::Msdp => "MSDP",
            Self::Mssp => "MSSP",
            Self::Compress1 => "MCCP1",
            Self::Compress2 => "MCCP2",
            Self::Gmcp => "GMCP",
            Self::Unknown(_) => "UNKNOWN",
        }
    }

    /// Maps a wire byte to its known variant, or `Unknown` if unrecognized.
    pub fn from_u8(byte: u8) -> Self {
        match byte {
            option::BINARY => Self::TransmitBinary,
            option::ECHO => Self::Echo,
            option::SGA => Self::SuppressGoAhead,
            option::STATUS => Self::Status,
            option::TTYPE => Self::TType,
            option::EOR => Self::Eor,
            option::NAWS => Self::Naws,
            option::TSPEED => Self::TSpeed,
            option::NEW_ENVIRON => Self::NewEnvironment,
            option::CHARSET => Self::Charset,
            option::MSDP => Self::Msdp,
            option::MSSP => Self::Mssp,
            option::COMPRESS1 => Self::Compress1,
            option::COMPRESS2 => Self::Compress2,
            option::GMCP => Self::Gmcp,
            other => Self::Unknown(other),
        }
    }
}

impl fmt::Display for TelnetOption {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Self::Unknown(b) => write!(f, "UNKNOWN({b})"),
            other => write!(f, "{:?}", other),
        }
    }
}

/// Which side of the connection a negotiation outcome applies to.
#[derive(Clone, Copy, Debug, Eq, PartialEq)]
pub enum TelnetSide {
    /// This engine's own side (it sent WILL/WONT).
    Local,
    /// The peer's side (they sent WILL/WONT, or we sent DO/DONT about them).
    Remote,
}

/// Whether this interpreter is acting as the server or the client of the
/// connection. Per `spec.md` §3: determines whether the engine initiates
/// offers or only responds to them.
#[derive(Clone, Copy, Debug, Eq, PartialEq)]
pub enum Mode {
    /// Initiates offers (sends WILL for options it supports at startup).
    Server,
    /// Waits for the peer to offer.
    Client,
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn round_trips_known_options() {
        for opt in [
            TelnetOption::TransmitBinary,
            TelnetOption::Echo,
            TelnetOption::SuppressGoAhead,
            TelnetOption::Status,
            TelnetOption::TType,
            TelnetOption::Eor,
            TelnetOption::Naws,
            TelnetOption::TSpeed,
            TelnetOption::NewEnvironment,
            TelnetOption::Charset,
            TelnetOption::Msdp,
            TelnetOption::Mssp,
            TelnetOption::Compress1,
            TelnetOption::Compress2,
            TelnetOption::Gmcp,
        ] {
            assert_eq!(TelnetOption::from_u8(opt.to_u8()), opt);
        }
    }

    #[test]
    fn unknown_option_round_trips_by_byte() {
        let opt = TelnetOption::from_u8(199);
        assert_eq!(opt, TelnetOption::Unknown(199));
        assert_eq!(opt.to_u8(), 199);
    }
}
