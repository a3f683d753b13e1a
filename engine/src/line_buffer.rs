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

//! Assembles plain data bytes (as opposed to negotiation/subnegotiation
//! traffic, which the codec FSM already separates out) into lines, bounded
//! so a peer that never sends `\n` cannot grow the buffer without limit.

use tracing::warn;

/// Accumulates data bytes until a line feed completes a line, or the buffer
/// grows past its cap and is force-flushed without one.
pub struct LineBuffer {
    current: Vec<u8>,
    max_size: usize,
}

impl LineBuffer {
    pub fn new(max_size: usize) -> Self {
        Self { current: Vec::new(), max_size: max_size.max(1) }
    }

    /// Pushes one data byte. Returns a completed line if this byte finished
    /// one — either a trailing `\n` (with any preceding `\r` stripped) or
    /// the buffer reaching `max_size`.
    pub fn push(&mut self, byte: u8) -> Option<Vec<u8>> {
        if byte == b'\n' {
            if self.current.last() == Some(&b'\r') {
                self.current.pop();
            }
            return Some(std::mem::take(&mut self.current));
        }

        self.current.push(byte);
        if self.current.len() >= self.max_size {
            warn!(max_size = self.max_size, "line buffer reached cap without a newline, force-flushing");
            return Some(std::mem::take(&mut self.current));
        }
        None
    }

    /// The bytes accumulated so far for the line in progress.
    pub fn pending(&self) -> &[u8] {
        &self.current
    }

    pub fn is_empty(&self) -> bool {
        self.current.is_empty()
    }

    /// Flushes whatever is buffered, even if incomplete (used at shutdown).
    pub fn take(&mut self) -> Vec<u8> {
        std::mem::take(&mut self.current)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn completes_line_on_newline() {
        let mut buf = LineBuffer::new(1024);
        assert_eq!(buf.push(b'h'), None);
        assert_eq!(buf.push(b'i'), None);
        assert_eq!(buf.push(b'\n'), Some(b"hi".to_vec()));
        assert!(buf.is_empty());
    }

    #[test]
    fn strips_trailing_cr() {
        let mut buf = LineBuffer::new(1024);
        buf.push(b'h');
        buf.push(b'i');
        buf.push(b'\r');
        assert_eq!(buf.push(b'\n'), Some(b"hi".to_vec()));
    }

    #[test]
    fn flushes_at_exact_cap_without_newline() {
        let mut buf = LineBuffer::new(4);
        assert_eq!(buf.push(b'a'), None);
        assert_eq!(buf.push(b'b'), None);
        assert_eq!(buf.push(b'c'), None);
        assert_eq!(buf.push(b'd'), Some(b"abcd".to_vec()));
        assert!(buf.is_empty());
    }

    #[test]
    fn take_flushes_incomplete_line() {
        let mut buf = LineBuffer::new(1024);
        buf.push(b'x');
        assert_eq!(buf.take(), b"x".to_vec());
        assert!(buf.is_empty());
    }
}
