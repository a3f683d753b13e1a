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

//! Terminal Type (RFC 1091) plus the MTTS cycle: the server repeats `SEND`
//! until a name repeats, treating the repeat as the cycle boundary rather
//! than an error. Name comparison for cycle detection is ASCII
//! case-insensitive (`spec.md`'s Open Questions).

use crate::context::PluginContext;
use crate::plugin::OptionPlugin;
use mudtel_codec::args::ttype::{MttsCapabilities, TTypeMessage};
use mudtel_codec::{Mode, TelnetOption, TelnetSide};
use std::any::Any;
use std::sync::Mutex;
use tracing::{debug, warn};

pub const LAST_NAME_KEY: &str = "ttype.name";
pub const MTTS_BITS_KEY: &str = "ttype.mtts";

#[derive(Default)]
struct CycleState {
    names: Vec<String>,
    done: bool,
}

#[derive(Default)]
pub struct TTypePlugin {
    state: Mutex<CycleState>,
}

impl TTypePlugin {
    pub fn new() -> Self {
        Self::default()
    }

    /// The most recent MTTS bitfield reported, if the client ever sent one.
    pub fn mtts(&self) -> Option<MttsCapabilities> {
        let state = self.state.lock().expect("ttype cycle state poisoned");
        state.names.iter().rev().find_map(|n| MttsCapabilities::parse(n))
    }

    fn record(&self, ctx: &PluginContext, name: String) -> bool {
        let mut state = self.state.lock().expect("ttype cycle state poisoned");
        if state.done {
            return false;
        }
        let repeated = state
            .names
            .iter()
            .any(|seen| seen.eq_ignore_ascii_case(&name));
        state.names.push(name.clone());
        if repeated {
            state.done = true;
        }
        ctx.shared_state_set(LAST_NAME_KEY, name.clone());
        if let Some(caps) = MttsCapabilities::parse(&name) {
            ctx.shared_state_set(MTTS_BITS_KEY, caps.bits());
            if ctx.is_plugin_enabled(TelnetOption::NewEnvironment) && !caps.contains(MttsCapabilities::MNES) {
                debug!("client advertises NEW-ENVIRON but did not set the MTTS MNES bit");
            }
        }
        !state.done
    }
}

impl OptionPlugin for TTypePlugin {
    fn option(&self) -> TelnetOption {
        TelnetOption::TType
    }

    fn name(&self) -> &'static str {
        "ttype"
    }

    fn on_init(&self, ctx: &PluginContext) {
        if ctx.mode() == Mode::Server {
            ctx.send_negotiation(mudtel_codec::TelnetFrame::Do(TelnetOption::TType));
        }
    }

    fn on_enable(&self, ctx: &PluginContext, side: TelnetSide) {
        if ctx.mode() == Mode::Server && side == TelnetSide::Remote {
            let mut state = self.state.lock().expect("ttype cycle state poisoned");
            state.names.clear();
            state.done = false;
            drop(state);
            ctx.send_subnegotiation(TelnetOption::TType, TTypeMessage::Send.encode());
        }
    }

    fn on_subnegotiation(&self, ctx: &PluginContext, payload: &[u8]) {
        match TTypeMessage::decode(payload) {
            Some(TTypeMessage::Is(name)) => {
                if self.record(ctx, name) && ctx.mode() == Mode::Server {
                    ctx.send_subnegotiation(TelnetOption::TType, TTypeMessage::Send.encode());
                }
            }
            Some(TTypeMessage::Send) => {
                debug!("ignoring TTYPE SEND received on the side that asks, not answers");
            }
            None => warn!("malformed TTYPE subnegotiation payload"),
        }
    }

    fn as_any(&self) -> &dyn Any {
        self
    }
}
