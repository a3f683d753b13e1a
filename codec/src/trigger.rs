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

//! The semantic byte alphabet the FSM fires on (`spec.md` §3).
//!
//! A raw byte is not a trigger by itself — the same value (say, `1`) means
//! `IAC`-less data in `Accepting`, the ECHO option code in `Willing`, or a
//! marker byte inside a subnegotiation payload. [`Trigger`] is what the byte
//! means *given the state it arrived in*; [`TelnetFsm::classify`](crate::fsm::TelnetFsm::classify)
//! does that contextual mapping.

/// A semantic event fed to the FSM for one input byte.
#[derive(Clone, Copy, Debug, Eq, PartialEq)]
pub enum Trigger {
    /// An ordinary payload byte; written to the line buffer and/or an
    /// option's accumulation buffer depending on state.
    ReadNextCharacter,
    /// `IAC` (255).
    Iac,
    /// `WILL` (251).
    Will,
    /// `WONT` (252).
    Wont,
    /// `DO` (253).
    Do,
    /// `DONT` (254).
    Dont,
    /// `SB` (250), begins a subnegotiation.
    Sb,
    /// `SE` (240), ends a subnegotiation.
    Se,
    /// `GA` (249).
    Ga,
    /// `EOR` (239).
    Eor,
    /// `\n` (10); flushes the line buffer.
    Newline,
    /// `\r` (13); passed through as data (most MUD clients send CR LF pairs).
    CarriageReturn,
    /// The byte itself is significant as data, not as a command — used when
    /// the current state's semantics are "this byte is an option code" or
    /// "this byte is a subnegotiation marker"; the caller reads the raw byte
    /// alongside the trigger.
    OptionCode,
    /// A trigger with no transition defined for the current state, or an
    /// internal failure. Universally permitted; its only effect is to
    /// return the FSM to `Accepting` (`spec.md` §4.2).
    Error,
}
