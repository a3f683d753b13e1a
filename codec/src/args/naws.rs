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

//! Negotiate About Window Size, RFC 1073.

use crate::consts;
use crate::result::{CodecError, CodecResult, SubnegotiationErrorKind};
use byteorder::{BigEndian, WriteBytesExt};
use bytes::{Buf, BufMut};

/// A terminal's column/row dimensions as carried by a NAWS subnegotiation.
#[derive(Clone, Copy, Debug, Eq, PartialEq)]
pub struct WindowSize {
    pub cols: u16,
    pub rows: u16,
}

impl WindowSize {
    pub fn new(cols: u16, rows: u16) -> Self {
        Self { cols, rows }
    }

    /// Always 4: two big-endian u16 fields.
    pub fn len(&self) -> usize {
        4
    }

    pub fn encode<T: BufMut>(&self, dst: &mut T) -> CodecResult<usize> {
        Ok(self.write(&mut dst.writer())?)
    }

    pub fn write<W: std::io::Write>(&self, writer: &mut W) -> std::io::Result<usize> {
        writer.write_u16::<BigEndian>(self.cols)?;
        writer.write_u16::<BigEndian>(self.rows)?;
        Ok(4)
    }

    /// Decodes `WIDTH-HIGH WIDTH-LOW HEIGHT-HIGH HEIGHT-LOW`.
    pub fn decode<T: Buf>(src: &mut T) -> CodecResult<WindowSize> {
        if src.remaining() < 4 {
            return Err(CodecError::ProtocolViolation {
                kind: SubnegotiationErrorKind::MalformedPayload,
                option: consts::option::NAWS,
            });
        }
        Ok(WindowSize {
            cols: src.get_u16(),
            rows: src.get_u16(),
        })
    }
}

impl Default for WindowSize {
    fn default() -> Self {
        WindowSize { cols: 80, rows: 24 }
    }
}

impl std::fmt::Display for WindowSize {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(f, "({},{})", self.cols, self.rows)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use bytes::BytesMut;

    #[test]
    fn round_trips_dimensions() {
        let size = WindowSize::new(132, 43);
        let mut buf = BytesMut::new();
        size.encode(&mut buf).unwrap();
        let mut cursor = &buf[..];
        assert_eq!(WindowSize::decode(&mut cursor).unwrap(), size);
    }

    #[test]
    fn short_payload_is_malformed() {
        let mut buf = &[0x00, 0x50][..];
        let err = WindowSize::decode(&mut buf).unwrap_err();
        assert!(matches!(
            err,
            CodecError::ProtocolViolation { kind: SubnegotiationErrorKind::MalformedPayload, .. }
        ));
    }

    #[test]
    fn default_is_80x24() {
        assert_eq!(WindowSize::default(), WindowSize::new(80, 24));
    }
}
