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

//! Per-option WILL/WONT/DO/DONT arbitration.
//!
//! This is the RFC 1143 "Q Method" bookkeeping that makes the safe
//! negotiation rule in `spec.md` §4.2 hold: an offer pending a response is
//! never re-sent, and a repeated WILL/DO for an already-active option never
//! gets a second answer. One [`OptionNegotiation`] is kept per option code;
//! [`NegotiationTable`] owns the full 256-entry set.
//!
//! Unlike a hardwired accept-all Q Method, `recv_will`/`recv_do` take the
//! caller's support decision as a parameter — the FSM consults the plugin
//! registry (is this option registered and enabled?) before arbitrating,
//! so this module stays free of any dependency on the plugin system.

use crate::frame::TelnetFrame;
use crate::options::TelnetOption;

/// Negotiation state for one direction (local or remote) of one option.
#[derive(Copy, Clone, Debug, Default, Eq, PartialEq)]
enum QState {
    #[default]
    No,
    WantNo,
    WantNoOpposite,
    Yes,
    WantYes,
    WantYesOpposite,
}

#[derive(Copy, Clone, Debug, Default)]
struct OptionNegotiation {
    /// Do *we* have this option enabled (WILL/WONT side).
    local: QState,
    /// Does the *peer* have this option enabled (DO/DONT side).
    remote: QState,
}

/// Tracks negotiation state for every option code (0-255).
#[derive(Debug)]
pub struct NegotiationTable {
    entries: [OptionNegotiation; 256],
}

impl Default for NegotiationTable {
    fn default() -> Self {
        Self {
            entries: [OptionNegotiation::default(); 256],
        }
    }
}

impl NegotiationTable {
    /// Creates a table with every option at rest (`No`/`No`).
    pub fn new() -> Self {
        Self::default()
    }

    fn entry(&mut self, option: TelnetOption) -> &mut OptionNegotiation {
        &mut self.entries[option.to_u8() as usize]
    }

    /// True once we have sent WILL and the peer answered DO (or vice versa
    /// in a way that settled on `Yes`).
    pub fn local_active(&self, option: TelnetOption) -> bool {
        matches!(
            self.entries[option.to_u8() as usize].local,
            QState::Yes | QState::WantNo | QState::WantNoOpposite
        )
    }

    /// True once the peer has WILL-active for this option from our point of view.
    pub fn remote_active(&self, option: TelnetOption) -> bool {
        matches!(
            self.entries[option.to_u8() as usize].remote,
            QState::Yes | QState::WantNo | QState::WantNoOpposite
        )
    }

    /// We want to start offering WILL for `option`. Returns the frame to
    /// send, or `None` if already active/in-flight (never re-offered).
    pub fn request_will(&mut self, option: TelnetOption) -> Option<TelnetFrame> {
        let e = self.entry(option);
        match e.local {
            QState::Yes | QState::WantYes | QState::WantYesOpposite => None,
            QState::No => {
                e.local = QState::WantYes;
                Some(TelnetFrame::Will(option))
            }
            QState::WantNo => {
                e.local = QState::WantYesOpposite;
                Some(TelnetFrame::Will(option))
            }
            QState::WantNoOpposite => {
                e.local = QState::WantYes;
                Some(TelnetFrame::Will(option))
            }
        }
    }

    /// We want to start requesting DO for `option` (ask the peer to enable).
    pub fn request_do(&mut self, option: TelnetOption) -> Option<TelnetFrame> {
        let e = self.entry(option);
        match e.remote {
            QState::Yes | QState::WantYes | QState::WantYesOpposite => None,
            QState::No => {
                e.remote = QState::WantYes;
                Some(TelnetFrame::Do(option))
            }
            QState::WantNo => {
                e.remote = QState::WantYesOpposite;
                Some(TelnetFrame::Do(option))
            }
            QState::WantNoOpposite => {
                e.remote = QState::WantYes;
                Some(TelnetFrame::Do(option))
            }
        }
    }

    /// The peer sent WILL `option`. `accept` is the caller's policy decision
    /// (is this option registered and enabled?). Returns the frame, if any,
    /// to send in response.
    pub fn recv_will(&mut self, option: TelnetOption, accept: bool) -> Option<TelnetFrame> {
        if !accept {
            return Some(TelnetFrame::Dont(option));
        }
        let e = self.entry(option);
        match e.remote {
            QState::No => {
                e.remote = QState::Yes;
                Some(TelnetFrame::Do(option))
            }
            QState::Yes => None,
            QState::WantNo => {
                e.remote = QState::WantNoOpposite;
                Some(TelnetFrame::Dont(option))
            }
            QState::WantNoOpposite | QState::WantYes | QState::WantYesOpposite => {
                e.remote = QState::Yes;
                None
            }
        }
    }

    /// The peer sent WONT `option`.
    pub fn recv_wont(&mut self, option: TelnetOption) -> Option<TelnetFrame> {
        self.entry(option).remote = QState::No;
        None
    }

    /// The peer sent DO `option`, asking us to enable it locally. `accept`
    /// is the caller's policy decision.
    pub fn recv_do(&mut self, option: TelnetOption, accept: bool) -> Option<TelnetFrame> {
        if !accept {
            return Some(TelnetFrame::Wont(option));
        }
        let e = self.entry(option);
        match e.local {
            QState::No => {
                e.local = QState::Yes;
                Some(TelnetFrame::Will(option))
            }
            QState::Yes => None,
            QState::WantNo => {
                e.local = QState::WantNoOpposite;
                Some(TelnetFrame::Will(option))
            }
            QState::WantNoOpposite | QState::WantYes | QState::WantYesOpposite => {
                e.local = QState::Yes;
                None
            }
        }
    }

    /// The peer sent DONT `option`.
    pub fn recv_dont(&mut self, option: TelnetOption) -> Option<TelnetFrame> {
        self.entry(option).local = QState::No;
        None
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn duplicate_will_gets_no_second_answer() {
        let mut t = NegotiationTable::new();
        assert_eq!(
            t.recv_will(TelnetOption::Naws, true),
            Some(TelnetFrame::Do(TelnetOption::Naws))
        );
        // peer repeats WILL NAWS — already Yes, must not re-answer
        assert_eq!(t.recv_will(TelnetOption::Naws, true), None);
    }

    #[test]
    fn unsupported_option_is_refused() {
        let mut t = NegotiationTable::new();
        assert_eq!(
            t.recv_do(TelnetOption::Compress2, false),
            Some(TelnetFrame::Wont(TelnetOption::Compress2))
        );
    }

    #[test]
    fn request_will_is_not_reoffered_while_pending() {
        let mut t = NegotiationTable::new();
        assert!(t.request_will(TelnetOption::Echo).is_some());
        assert_eq!(t.request_will(TelnetOption::Echo), None);
    }
}
