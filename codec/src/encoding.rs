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

//! The text encoding currently negotiated for non-framing bytes (`spec.md` §3).

use std::fmt;

/// A text encoding, named by its canonical web-name (RFC 2978/IANA charset
/// registry form), used both as the live session encoding and as a CHARSET
/// offer/preference entry.
#[derive(Clone, Debug, Eq, PartialEq)]
pub enum SessionEncoding {
    /// The Telnet protocol default.
    Latin1,
    /// 7-bit US-ASCII.
    Ascii,
    /// UTF-8.
    Utf8,
}

impl SessionEncoding {
    /// Returns the canonical web-name for this encoding (ASCII lowercase,
    /// matching what CHARSET negotiation compares names against).
    pub fn canonical_name(&self) -> &'static str {
        match self {
            Self::Latin1 => "iso-8859-1",
            Self::Ascii => "us-ascii",
            Self::Utf8 => "utf-8",
        }
    }

    /// Parses a CHARSET wire name (ASCII case-insensitive) into a known
    /// encoding, or `None` if unrecognized. Unrecognized names never
    /// participate in CHARSET preference ranking (`spec.md` §9).
    pub fn from_name(name: &str) -> Option<Self> {
        match name.to_ascii_lowercase().as_str() {
            "iso-8859-1" | "latin1" | "latin-1" => Some(Self::Latin1),
            "us-ascii" | "ascii" => Some(Self::Ascii),
            "utf-8" | "utf8" => Some(Self::Utf8),
            _ => None,
        }
    }
}

impl Default for SessionEncoding {
    /// Initial encoding per `spec.md` §3: ISO-8859-1.
    fn default() -> Self {
        Self::Latin1
    }
}

impl fmt::Display for SessionEncoding {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.canonical_name())
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn default_is_latin1() {
        assert_eq!(SessionEncoding::default(), SessionEncoding::Latin1);
    }

    #[test]
    fn name_matching_is_case_insensitive() {
        assert_eq!(SessionEncoding::from_name("UTF-8"), Some(SessionEncoding::Utf8));
        assert_eq!(SessionEncoding::from_name("Utf8"), Some(SessionEncoding::Utf8));
    }

    #[test]
    fn unknown_name_maps_to_none() {
        assert_eq!(SessionEncoding::from_name("shift-jis"), None);
    }
}
