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

//! Error types produced by the codec and FSM layer.
//!
//! Per `spec.md` §7, every variant here is recovered locally by the FSM
//! (the session never terminates because of peer misbehavior); these are
//! surfaced to callers only for observability (logging, tests), not as a
//! signal to tear the session down.

use thiserror::Error;

/// Convenience alias for codec-layer results.
pub type CodecResult<T> = Result<T, CodecError>;

/// The kind of subnegotiation parse failure, attached to
/// [`CodecError::ProtocolViolation`] for structured logging.
#[derive(Debug, Clone, Copy, Eq, PartialEq)]
pub enum SubnegotiationErrorKind {
    /// A raw IAC byte appeared inside a subnegotiation payload without being
    /// doubled or followed by `SE`.
    UnescapedIac,
    /// The payload did not match the option's expected grammar (e.g. GMCP
    /// with no separating space, MSDP with a marker in the wrong position).
    MalformedPayload,
    /// `SE` arrived with no matching `SB` open.
    UnmatchedEnd,
}

/// Errors produced while driving the Telnet FSM or encoding/decoding
/// subnegotiation payloads.
#[derive(Debug, Error)]
pub enum CodecError {
    /// A byte sequence violated the framing or subnegotiation grammar.
    /// Recovery: the FSM transitions to a `Bad*` state, emits a refusal if
    /// mid-negotiation, and resumes at the next framing boundary.
    #[error("protocol violation ({kind:?}) in option {option}")]
    ProtocolViolation {
        /// The specific violation observed.
        kind: SubnegotiationErrorKind,
        /// The option code whose subnegotiation was being parsed, or 0 for
        /// violations outside any subnegotiation.
        option: u8,
    },

    /// A per-option accumulation buffer (or the line buffer) exceeded its
    /// cap; the current unit was discarded and accumulation resumed clean.
    #[error("buffer overflow in {context}: dropped {dropped} bytes at cap {cap}")]
    OverflowDropped {
        /// Human-readable description of which buffer overflowed.
        context: &'static str,
        /// Bytes discarded.
        dropped: usize,
        /// The configured cap that was exceeded.
        cap: usize,
    },

    /// The peer offered or subnegotiated an option this engine has no
    /// registered plugin for. Never propagated past the FSM: the engine
    /// answers `DONT`/`WONT` and continues.
    #[error("unknown telnet option {0}")]
    UnknownOption(u8),
}
