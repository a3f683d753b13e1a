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

//! The byte-oriented Telnet framing/negotiation state machine (`spec.md` §4).
//!
//! [`TelnetFsm`] owns no socket and performs no I/O: it consumes one byte at
//! a time via [`TelnetFsm::step`] and emits a sequence of [`FsmEvent`]s for
//! the caller (the engine crate) to act on — write negotiated frames to the
//! wire, append to a line buffer, route subnegotiation bytes to a plugin's
//! accumulation buffer. This crate only decides *when* a subnegotiation
//! payload is complete and well-formed; it has no opinion on what the bytes
//! inside mean.

use crate::consts;
use crate::frame::TelnetFrame;
use crate::negotiation::NegotiationTable;
use crate::options::{TelnetOption, TelnetSide};
use crate::result::{CodecError, CodecResult, SubnegotiationErrorKind};
use crate::state::{State, SubPhase};
use crate::trigger::Trigger;
use tracing::trace;

/// The caller's support policy, consulted whenever the peer offers or
/// requests an option. Kept as a trait so this crate never depends on the
/// plugin registry that implements it in `mudtel-engine`.
pub trait NegotiationPolicy {
    /// True if this side has a registered, enabled handler for `option`.
    fn supports(&self, option: TelnetOption) -> bool;
}

/// One unit of output from driving the FSM over a byte.
#[derive(Clone, Copy, Debug, PartialEq)]
pub enum FsmEvent {
    /// A plain payload byte, outside any subnegotiation — append to the line buffer.
    Data(u8),
    /// The line buffer should be flushed (a `\n` was just appended as `Data`).
    EndOfLine,
    /// `IAC GA` was received.
    GoAhead,
    /// `IAC EOR` was received.
    EndOfRecord,
    /// A response frame the caller must write to the wire.
    NegotiationSent(TelnetFrame),
    /// `option` transitioned from inactive to active on `side`.
    OptionActive { option: TelnetOption, side: TelnetSide },
    /// `option` transitioned from active to inactive on `side`.
    OptionInactive { option: TelnetOption, side: TelnetSide },
    /// One undoubled payload byte inside an active subnegotiation for `option`.
    SubnegotiationByte { option: TelnetOption, byte: u8 },
    /// The subnegotiation for `option` reached its terminating `IAC SE`.
    SubnegotiationEnd { option: TelnetOption },
    /// A subnegotiation began for an option with no known identity
    /// (`spec.md`'s `BadSubNegotiation`); its payload bytes are discarded
    /// rather than surfaced as `SubnegotiationByte`.
    SubnegotiationUnknown { option: TelnetOption },
    /// A protocol violation was recovered from locally; never fatal.
    ProtocolError(CodecError),
}

/// The Telnet framing/negotiation state machine.
#[derive(Debug)]
pub struct TelnetFsm {
    state: State,
    negotiation: NegotiationTable,
}

impl Default for TelnetFsm {
    fn default() -> Self {
        Self {
            state: State::Accepting,
            negotiation: NegotiationTable::new(),
        }
    }
}

impl TelnetFsm {
    /// Creates a fresh FSM at rest in [`State::Accepting`].
    pub fn new() -> Self {
        Self::default()
    }

    /// The current state, for tests and diagnostics.
    pub fn state(&self) -> State {
        self.state
    }

    /// Forces the FSM back to the `Accepting` absorbing super-state, the
    /// same recovery target `Trigger::Error` drives to (`spec.md` §4.2).
    /// For a caller that caught a panic out-of-band (a plugin hook
    /// unwinding mid-dispatch) and needs to resynchronize without a byte
    /// to classify.
    pub fn force_accepting(&mut self) {
        self.state = State::Accepting;
    }

    /// Begins offering `option` locally (`IAC WILL`), if not already
    /// active or pending. Returns the frame to send, if any.
    pub fn request_will(&mut self, option: TelnetOption) -> Option<TelnetFrame> {
        self.negotiation.request_will(option)
    }

    /// Begins requesting the peer enable `option` (`IAC DO`), if not
    /// already active or pending. Returns the frame to send, if any.
    pub fn request_do(&mut self, option: TelnetOption) -> Option<TelnetFrame> {
        self.negotiation.request_do(option)
    }

    /// True if `option` is currently active on `side`.
    pub fn is_active(&self, option: TelnetOption, side: TelnetSide) -> bool {
        match side {
            TelnetSide::Local => self.negotiation.local_active(option),
            TelnetSide::Remote => self.negotiation.remote_active(option),
        }
    }

    /// Maps the next input byte to a [`Trigger`] given the current state.
    /// The same byte value means different things in different states —
    /// this is the contextual lookup described in `trigger.rs`.
    pub fn classify(&self, byte: u8) -> Trigger {
        match self.state {
            State::Accepting | State::ReadingCharacters | State::Act => match byte {
                consts::LF => Trigger::Newline,
                consts::CR => Trigger::CarriageReturn,
                consts::IAC => Trigger::Iac,
                _ => Trigger::ReadNextCharacter,
            },
            State::StartNegotiation => match byte {
                consts::WILL => Trigger::Will,
                consts::WONT => Trigger::Wont,
                consts::DO => Trigger::Do,
                consts::DONT => Trigger::Dont,
                consts::SB => Trigger::Sb,
                consts::SE => Trigger::Se,
                consts::GA => Trigger::Ga,
                consts::EOR => Trigger::Eor,
                consts::IAC => Trigger::Iac,
                _ => Trigger::Error,
            },
            State::Willing | State::Refusing | State::Do | State::Dont | State::SubNegotiation => {
                Trigger::OptionCode
            }
            State::SubOption { phase: SubPhase::Evaluating, .. } => match byte {
                consts::IAC => Trigger::Iac,
                _ => Trigger::ReadNextCharacter,
            },
            State::SubOption { phase: SubPhase::Escaping, .. } => match byte {
                consts::SE => Trigger::Se,
                consts::IAC => Trigger::Iac,
                _ => Trigger::Error,
            },
        }
    }

    /// Classifies and fires on `byte` in one call. The convenience entry
    /// point for callers that don't need the intermediate [`Trigger`].
    pub fn step(
        &mut self,
        byte: u8,
        policy: &dyn NegotiationPolicy,
        events: &mut Vec<FsmEvent>,
    ) -> CodecResult<()> {
        let trigger = self.classify(byte);
        self.fire(trigger, byte, policy, events)
    }

    /// Drives one transition of the FSM. `byte` is the raw input byte that
    /// produced `trigger`; it is re-read here because several states need
    /// the byte's value (an option code, an escaped payload byte) in
    /// addition to its classification.
    pub fn fire(
        &mut self,
        trigger: Trigger,
        byte: u8,
        policy: &dyn NegotiationPolicy,
        events: &mut Vec<FsmEvent>,
    ) -> CodecResult<()> {
        trace!(state = ?self.state, ?trigger, byte, "fsm step");
        match (self.state, trigger) {
            // -- Accepting: ordinary data, or the start of a command -----
            (State::Accepting | State::ReadingCharacters | State::Act, Trigger::Iac) => {
                self.state = State::StartNegotiation;
            }
            (State::Accepting | State::ReadingCharacters | State::Act, Trigger::Newline) => {
                events.push(FsmEvent::Data(consts::LF));
                events.push(FsmEvent::EndOfLine);
                self.state = State::Accepting;
            }
            (State::Accepting | State::ReadingCharacters | State::Act, Trigger::CarriageReturn) => {
                events.push(FsmEvent::Data(consts::CR));
                self.state = State::Accepting;
            }
            (State::Accepting | State::ReadingCharacters | State::Act, Trigger::ReadNextCharacter) => {
                events.push(FsmEvent::Data(byte));
                self.state = State::Accepting;
            }

            // -- StartNegotiation: select the command -------------------
            (State::StartNegotiation, Trigger::Will) => self.state = State::Willing,
            (State::StartNegotiation, Trigger::Wont) => self.state = State::Refusing,
            (State::StartNegotiation, Trigger::Do) => self.state = State::Do,
            (State::StartNegotiation, Trigger::Dont) => self.state = State::Dont,
            (State::StartNegotiation, Trigger::Sb) => self.state = State::SubNegotiation,
            (State::StartNegotiation, Trigger::Ga) => {
                events.push(FsmEvent::GoAhead);
                self.state = State::Accepting;
            }
            (State::StartNegotiation, Trigger::Eor) => {
                events.push(FsmEvent::EndOfRecord);
                self.state = State::Accepting;
            }
            (State::StartNegotiation, Trigger::Iac) => {
                // A doubled IAC outside any subnegotiation: literal 0xFF data byte.
                events.push(FsmEvent::Data(consts::IAC));
                self.state = State::Accepting;
            }
            (State::StartNegotiation, Trigger::Se) => {
                events.push(FsmEvent::ProtocolError(CodecError::ProtocolViolation {
                    kind: SubnegotiationErrorKind::UnmatchedEnd,
                    option: 0,
                }));
                self.state = State::Accepting;
            }
            (State::StartNegotiation, _) => {
                events.push(FsmEvent::ProtocolError(CodecError::ProtocolViolation {
                    kind: SubnegotiationErrorKind::MalformedPayload,
                    option: 0,
                }));
                self.state = State::Accepting;
            }

            // -- Willing / Refusing / Do / Dont: byte is the option code --
            (State::Willing, Trigger::OptionCode) => {
                let option = TelnetOption::from_u8(byte);
                self.handle_will(option, policy, events);
                self.state = State::Accepting;
            }
            (State::Refusing, Trigger::OptionCode) => {
                let option = TelnetOption::from_u8(byte);
                self.handle_wont(option, events);
                self.state = State::Accepting;
            }
            (State::Do, Trigger::OptionCode) => {
                let option = TelnetOption::from_u8(byte);
                self.handle_do(option, policy, events);
                self.state = State::Accepting;
            }
            (State::Dont, Trigger::OptionCode) => {
                let option = TelnetOption::from_u8(byte);
                self.handle_dont(option, events);
                self.state = State::Accepting;
            }

            // -- SubNegotiation: byte is the option code, begin accumulation --
            (State::SubNegotiation, Trigger::OptionCode) => {
                let option = TelnetOption::from_u8(byte);
                if matches!(option, TelnetOption::Unknown(_)) {
                    events.push(FsmEvent::SubnegotiationUnknown { option });
                }
                self.state = State::SubOption {
                    option,
                    phase: SubPhase::Evaluating,
                };
            }

            // -- SubOption, Evaluating: accumulate payload bytes ----------
            (State::SubOption { option, phase: SubPhase::Evaluating }, Trigger::ReadNextCharacter) => {
                if !matches!(option, TelnetOption::Unknown(_)) {
                    events.push(FsmEvent::SubnegotiationByte { option, byte });
                }
            }
            (State::SubOption { option, phase: SubPhase::Evaluating }, Trigger::Iac) => {
                self.state = State::SubOption {
                    option,
                    phase: SubPhase::Escaping,
                };
            }

            // -- SubOption, Escaping: IAC IAC (escaped byte) or IAC SE (end) --
            (State::SubOption { option, phase: SubPhase::Escaping }, Trigger::Iac) => {
                if !matches!(option, TelnetOption::Unknown(_)) {
                    events.push(FsmEvent::SubnegotiationByte { option, byte: consts::IAC });
                }
                self.state = State::SubOption {
                    option,
                    phase: SubPhase::Evaluating,
                };
            }
            (State::SubOption { option, phase: SubPhase::Escaping }, Trigger::Se) => {
                events.push(FsmEvent::SubnegotiationEnd { option });
                self.state = State::Accepting;
            }
            (State::SubOption { option, phase: SubPhase::Escaping }, _) => {
                events.push(FsmEvent::ProtocolError(CodecError::ProtocolViolation {
                    kind: SubnegotiationErrorKind::UnescapedIac,
                    option: option.to_u8(),
                }));
                events.push(FsmEvent::SubnegotiationEnd { option });
                self.state = State::Accepting;
            }

            // -- Any other (state, trigger) pair is unreachable given
            // `classify`, but `Error` and any future addition both recover
            // to `Accepting` per `spec.md` §4.2.
            (_, _) => {
                self.state = State::Accepting;
            }
        }
        Ok(())
    }

    fn handle_will(&mut self, option: TelnetOption, policy: &dyn NegotiationPolicy, events: &mut Vec<FsmEvent>) {
        let was_active = self.negotiation.remote_active(option);
        let accept = policy.supports(option);
        if let Some(frame) = self.negotiation.recv_will(option, accept) {
            events.push(FsmEvent::NegotiationSent(frame));
        }
        if !was_active && self.negotiation.remote_active(option) {
            events.push(FsmEvent::OptionActive { option, side: TelnetSide::Remote });
        }
    }

    fn handle_wont(&mut self, option: TelnetOption, events: &mut Vec<FsmEvent>) {
        let was_active = self.negotiation.remote_active(option);
        self.negotiation.recv_wont(option);
        if was_active {
            events.push(FsmEvent::OptionInactive { option, side: TelnetSide::Remote });
        }
    }

    fn handle_do(&mut self, option: TelnetOption, policy: &dyn NegotiationPolicy, events: &mut Vec<FsmEvent>) {
        let was_active = self.negotiation.local_active(option);
        let accept = policy.supports(option);
        if let Some(frame) = self.negotiation.recv_do(option, accept) {
            events.push(FsmEvent::NegotiationSent(frame));
        }
        if !was_active && self.negotiation.local_active(option) {
            events.push(FsmEvent::OptionActive { option, side: TelnetSide::Local });
        }
    }

    fn handle_dont(&mut self, option: TelnetOption, events: &mut Vec<FsmEvent>) {
        let was_active = self.negotiation.local_active(option);
        self.negotiation.recv_dont(option);
        if was_active {
            events.push(FsmEvent::OptionInactive { option, side: TelnetSide::Local });
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    struct AcceptAll;
    impl NegotiationPolicy for AcceptAll {
        fn supports(&self, _option: TelnetOption) -> bool {
            true
        }
    }

    struct AcceptNone;
    impl NegotiationPolicy for AcceptNone {
        fn supports(&self, _option: TelnetOption) -> bool {
            false
        }
    }

    fn drive(fsm: &mut TelnetFsm, bytes: &[u8], policy: &dyn NegotiationPolicy) -> Vec<FsmEvent> {
        let mut events = Vec::new();
        for &b in bytes {
            fsm.step(b, policy, &mut events).unwrap();
        }
        events
    }

    #[test]
    fn plain_text_is_forwarded_as_data() {
        let mut fsm = TelnetFsm::new();
        let events = drive(&mut fsm, b"hi", &AcceptAll);
        assert_eq!(events, vec![FsmEvent::Data(b'h'), FsmEvent::Data(b'i')]);
    }

    #[test]
    fn newline_flushes_and_returns_to_accepting() {
        let mut fsm = TelnetFsm::new();
        let events = drive(&mut fsm, b"\n", &AcceptAll);
        assert_eq!(events, vec![FsmEvent::Data(consts::LF), FsmEvent::EndOfLine]);
        assert_eq!(fsm.state(), State::Accepting);
    }

    #[test]
    fn will_naws_accepted_emits_do_and_active() {
        let mut fsm = TelnetFsm::new();
        let events = drive(
            &mut fsm,
            &[consts::IAC, consts::WILL, TelnetOption::Naws.to_u8()],
            &AcceptAll,
        );
        assert_eq!(
            events,
            vec![
                FsmEvent::NegotiationSent(TelnetFrame::Do(TelnetOption::Naws)),
                FsmEvent::OptionActive { option: TelnetOption::Naws, side: TelnetSide::Remote },
            ]
        );
    }

    #[test]
    fn will_unsupported_emits_dont_and_no_active() {
        let mut fsm = TelnetFsm::new();
        let events = drive(
            &mut fsm,
            &[consts::IAC, consts::WILL, TelnetOption::Compress2.to_u8()],
            &AcceptNone,
        );
        assert_eq!(
            events,
            vec![FsmEvent::NegotiationSent(TelnetFrame::Dont(TelnetOption::Compress2))]
        );
    }

    #[test]
    fn repeated_will_does_not_reemit_active() {
        let mut fsm = TelnetFsm::new();
        let _ = drive(
            &mut fsm,
            &[consts::IAC, consts::WILL, TelnetOption::Naws.to_u8()],
            &AcceptAll,
        );
        let events = drive(
            &mut fsm,
            &[consts::IAC, consts::WILL, TelnetOption::Naws.to_u8()],
            &AcceptAll,
        );
        assert!(events.is_empty());
    }

    #[test]
    fn subnegotiation_round_trips_payload_and_unescapes_iac() {
        let mut fsm = TelnetFsm::new();
        let mut bytes = vec![consts::IAC, consts::SB, TelnetOption::Naws.to_u8()];
        bytes.extend_from_slice(&[0x00, 0x50, consts::IAC, consts::IAC, 0x00, 0x18]);
        bytes.extend_from_slice(&[consts::IAC, consts::SE]);
        let events = drive(&mut fsm, &bytes, &AcceptAll);
        assert_eq!(
            events,
            vec![
                FsmEvent::SubnegotiationByte { option: TelnetOption::Naws, byte: 0x00 },
                FsmEvent::SubnegotiationByte { option: TelnetOption::Naws, byte: 0x50 },
                FsmEvent::SubnegotiationByte { option: TelnetOption::Naws, byte: consts::IAC },
                FsmEvent::SubnegotiationByte { option: TelnetOption::Naws, byte: 0x00 },
                FsmEvent::SubnegotiationByte { option: TelnetOption::Naws, byte: 0x18 },
                FsmEvent::SubnegotiationEnd { option: TelnetOption::Naws },
            ]
        );
        assert_eq!(fsm.state(), State::Accepting);
    }

    #[test]
    fn unknown_subnegotiation_discards_payload() {
        let mut fsm = TelnetFsm::new();
        let bytes = [
            consts::IAC, consts::SB, 199, 0x01, 0x02, consts::IAC, consts::SE,
        ];
        let events = drive(&mut fsm, &bytes, &AcceptAll);
        assert_eq!(
            events,
            vec![
                FsmEvent::SubnegotiationUnknown { option: TelnetOption::Unknown(199) },
                FsmEvent::SubnegotiationEnd { option: TelnetOption::Unknown(199) },
            ]
        );
    }

    #[test]
    fn zero_length_subnegotiation_still_ends_cleanly() {
        let mut fsm = TelnetFsm::new();
        let bytes = [consts::IAC, consts::SB, TelnetOption::Gmcp.to_u8(), consts::IAC, consts::SE];
        let events = drive(&mut fsm, &bytes, &AcceptAll);
        assert_eq!(events, vec![FsmEvent::SubnegotiationEnd { option: TelnetOption::Gmcp }]);
    }
}
