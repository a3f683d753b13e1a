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

//! Byte-oriented Telnet option negotiation.
//!
//! This crate is the pure protocol layer: a [`fsm::TelnetFsm`] that consumes
//! one byte at a time and emits [`fsm::FsmEvent`]s, RFC 1143 arbitration so
//! an option is never re-offered or re-answered while already settled, and
//! wire codecs for the MUD-specific subnegotiation payloads (GMCP, MSDP,
//! MSSP, NAWS, TTYPE/MTTS, CHARSET, NEW-ENVIRON). There is no socket code
//! here and no rendering — `mudtel-engine` drives the FSM and dispatches its
//! events to pluggable option handlers.

pub mod args;
pub mod consts;
pub mod encoding;
pub mod frame;
pub mod fsm;
pub mod negotiation;
pub mod options;
pub mod result;
pub mod state;
pub mod trigger;

pub use encoding::SessionEncoding;
pub use frame::{encode_subnegotiation, TelnetFrame};
pub use fsm::{FsmEvent, NegotiationPolicy, TelnetFsm};
pub use options::{Mode, TelnetOption, TelnetSide};
pub use result::{CodecError, CodecResult, SubnegotiationErrorKind};
pub use state::{State, SubPhase};
pub use trigger::Trigger;
