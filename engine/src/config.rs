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

//! Engine-wide configuration.

use mudtel_codec::Mode;

/// Tunable limits and startup behavior for a [`crate::interpreter::TelnetInterpreter`].
#[derive(Debug, Clone)]
pub struct EngineConfig {
    /// Whether this interpreter initiates offers (server) or only responds (client).
    pub mode: Mode,

    /// Capacity of the bounded byte-submission channel.
    pub channel_capacity: usize,

    /// Maximum size, in bytes, of the line-assembly buffer before it is
    /// force-flushed without a trailing newline.
    pub max_line_buffer: usize,

    /// Maximum size, in bytes, of a single option's subnegotiation
    /// accumulation buffer before the payload is dropped and an
    /// `OverflowDropped` error is logged.
    pub max_subnegotiation_buffer: usize,

    /// Maximum size, in bytes, of a single TTYPE name before it is dropped.
    /// TTYPE names are short by convention; this is bounded far tighter
    /// than `max_subnegotiation_buffer` so one oversized name can't eat the
    /// shared cap meant for GMCP/MSDP bodies.
    pub max_ttype_name_buffer: usize,
}

impl Default for EngineConfig {
    fn default() -> Self {
        Self {
            mode: Mode::Server,
            channel_capacity: 10_000,
            max_line_buffer: 5 * 1024 * 1024,
            max_subnegotiation_buffer: 8 * 1024,
            max_ttype_name_buffer: 256,
        }
    }
}

impl EngineConfig {
    pub fn new(mode: Mode) -> Self {
        Self { mode, ..Default::default() }
    }

    pub fn with_channel_capacity(mut self, capacity: usize) -> Self {
        self.channel_capacity = capacity;
        self
    }

    pub fn with_max_line_buffer(mut self, bytes: usize) -> Self {
        self.max_line_buffer = bytes;
        self
    }

    pub fn with_max_subnegotiation_buffer(mut self, bytes: usize) -> Self {
        self.max_subnegotiation_buffer = bytes;
        self
    }

    pub fn with_max_ttype_name_buffer(mut self, bytes: usize) -> Self {
        self.max_ttype_name_buffer = bytes;
        self
    }
}
