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

//! New Environment Option (RFC 1572). The server sends `SEND` (an empty
//! list means "send everything"); the client answers `IS` with whatever
//! VAR/USERVAR entries it has, commonly sourced from its own process
//! environment (`USER`, `LANG`).

use crate::context::PluginContext;
use crate::plugin::OptionPlugin;
use mudtel_codec::args::new_environ::{EnvEntry, NewEnvironMessage};
use mudtel_codec::{Mode, TelnetFrame, TelnetOption, TelnetSide};
use std::any::Any;
use std::sync::Mutex;
use tracing::warn;

pub const VARS_KEY: &str = "new_environ.vars";

/// Client-side environment variable names this engine will answer a bare
/// `SEND` (no requested names) with, read from the host process environment.
const DEFAULT_CLIENT_VARS: &[&str] = &["USER", "LANG"];

#[derive(Default)]
pub struct NewEnvironPlugin {
    received: Mutex<Vec<EnvEntry>>,
}

impl NewEnvironPlugin {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn received(&self) -> Vec<EnvEntry> {
        self.received.lock().expect("new_environ entries poisoned").clone()
    }

    fn client_entries(names: &[EnvEntry]) -> Vec<EnvEntry> {
        let wanted: Vec<&str> = if names.is_empty() {
            DEFAULT_CLIENT_VARS.to_vec()
        } else {
            names.iter().map(|e| e.name.as_str()).collect()
        };
        wanted
            .into_iter()
            .filter_map(|name| std::env::var(name).ok().map(|value| EnvEntry { is_uservar: false, name: name.to_string(), value: Some(value) }))
            .collect()
    }
}

impl OptionPlugin for NewEnvironPlugin {
    fn option(&self) -> TelnetOption {
        TelnetOption::NewEnvironment
    }

    fn name(&self) -> &'static str {
        "new_environ"
    }

    fn on_init(&self, ctx: &PluginContext) {
        if ctx.mode() == Mode::Server {
            ctx.send_negotiation(TelnetFrame::Do(TelnetOption::NewEnvironment));
        }
    }

    fn on_enable(&self, ctx: &PluginContext, side: TelnetSide) {
        if ctx.mode() == Mode::Server && side == TelnetSide::Remote {
            ctx.send_subnegotiation(TelnetOption::NewEnvironment, NewEnvironMessage::Send(Vec::new()).encode());
        }
    }

    fn on_subnegotiation(&self, ctx: &PluginContext, payload: &[u8]) {
        match NewEnvironMessage::decode(payload) {
            Some(NewEnvironMessage::Send(names)) => {
                let entries = Self::client_entries(&names);
                ctx.send_subnegotiation(TelnetOption::NewEnvironment, NewEnvironMessage::Is(entries).encode());
            }
            Some(NewEnvironMessage::Is(entries)) => {
                *self.received.lock().expect("new_environ entries poisoned") = entries.clone();
                ctx.shared_state_set(VARS_KEY, entries);
                if ctx.is_plugin_enabled(TelnetOption::TType) {
                    if let Some(bits) = ctx.try_get::<u32>(super::ttype::MTTS_BITS_KEY) {
                        if bits & 512 == 0 {
                            tracing::debug!("NEW-ENVIRON is active but client's MTTS bitfield lacks the MNES flag");
                        }
                    }
                }
            }
            None => warn!("malformed NEW-ENVIRON subnegotiation payload"),
        }
    }

    fn as_any(&self) -> &dyn Any {
        self
    }
}
