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

use crate::options::TelnetOption;

//! FSM states (`spec.md` §3).
//!
//! The original design this engine is modeled on enumerates roughly 100
//! flat states: one `Do<Option>`/`Willing<Option>` pair per negotiable
//! option, and a further `Evaluating<Option>`/`Escaping<Option>`/
//! `Completing<Option>` triple per option for subnegotiation. Rust's
//! data-carrying enums express the same transition table without
//! duplicating four states per option: [`State::SubNegotiation`] and its
//! phase carry the `TelnetOption` as data instead of being one of a hundred
//! near-identical variants. See `DESIGN.md` for the reasoning; the
//! transition table driven in `fsm.rs` implements exactly the states named
//! in `spec.md` §4.2, just with option identity as a field rather than a
//! suffix on the variant name.

/// The phase of subnegotiation-payload parsing for one option.
#[derive(Clone, Copy, Debug, Eq, PartialEq)]
pub enum SubPhase {
    /// Accumulating payload bytes (`EvaluatingXValue` in the flat design).
    Evaluating,
    /// Saw `IAC` while evaluating; next byte is either a doubled `IAC`
    /// (payload byte `0xFF`) or `SE` (end of subnegotiation).
    Escaping,
}

/// A state of the Telnet framing/negotiation FSM.
#[derive(Clone, Copy, Debug, Eq, PartialEq)]
pub enum State {
    /// The absorbing super-state: non-special bytes are payload. Initial state.
    Accepting,
    /// Just wrote a payload byte; always transitions straight back to `Accepting`.
    ReadingCharacters,
    /// Saw `IAC`; next byte selects a command.
    StartNegotiation,
    /// Saw `IAC WILL`; next byte is the option code.
    Willing,
    /// Saw `IAC WONT`; next byte is the option code.
    Refusing,
    /// Saw `IAC DO`; next byte is the option code.
    Do,
    /// Saw `IAC DONT`; next byte is the option code.
    Dont,
    /// Saw `IAC SB`; next byte is the option code for the subnegotiation.
    SubNegotiation,
    /// Inside a subnegotiation payload for `option`, in `phase`. A `phase`
    /// of `Evaluating` with `option` unrecognized is the flat design's
    /// `BadSubNegotiation`: bytes are consumed and discarded rather than
    /// accumulated, until the matching `IAC SE`.
    SubOption { option: TelnetOption, phase: SubPhase },
    /// Saw the `\n` that flushes the line buffer; always transitions
    /// straight back to `Accepting`.
    Act,
}

impl State {
    /// A state is *accepting* iff it is, or immediately resolves to,
    /// `Accepting` — per `spec.md` §3, the states from which a fresh framing
    /// sequence may begin.
    pub fn is_accepting(self) -> bool {
        matches!(self, State::Accepting)
    }
}

impl Default for State {
    fn default() -> Self {
        State::Accepting
    }
}
