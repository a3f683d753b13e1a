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

//! MUD Server Data Protocol: LIST/REPORT/UNREPORT/SEND/RESET commands over
//! the recursive-descent VAR/VAL grammar in [`mudtel_codec::args::msdp`].

use crate::context::PluginContext;
use crate::plugin::OptionPlugin;
use bytes::BytesMut;
use dashmap::DashMap;
use mudtel_codec::args::msdp::{MsdpValue, MsdpVariable};
use mudtel_codec::{Mode, TelnetFrame, TelnetOption};
use std::any::Any;
use std::collections::HashSet;
use std::sync::Mutex;
use tracing::warn;

const COMMANDS: &[&str] = &["LIST", "REPORT", "UNREPORT", "SEND", "RESET"];

/// Live, mutable MSDP variable table plus the LIST/REPORT bookkeeping
/// `spec.md` §4.5 describes for the server-side handler.
pub struct MsdpPlugin {
    values: DashMap<String, MsdpValue>,
    reportable: Vec<String>,
    configurable: Vec<String>,
    sendable: Vec<String>,
    reported: Mutex<HashSet<String>>,
}

impl MsdpPlugin {
    pub fn new(reportable: Vec<String>, configurable: Vec<String>, sendable: Vec<String>) -> Self {
        Self {
            values: DashMap::new(),
            reportable,
            configurable,
            sendable,
            reported: Mutex::new(HashSet::new()),
        }
    }

    /// Sets the live value of a variable. If it is currently reported, a
    /// caller typically follows this with a push through the host's own
    /// REPORT loop — this plugin only answers requests, it does not poll.
    pub fn set(&self, name: impl Into<String>, value: MsdpValue) {
        self.values.insert(name.into(), value);
    }

    fn send_variable(&self, ctx: &PluginContext, name: &str) {
        let value = self.values.get(name).map(|v| v.value().clone()).unwrap_or_else(|| MsdpValue::string(""));
        let mut buf = BytesMut::new();
        MsdpVariable { name: name.to_string(), value }.write(&mut buf);
        ctx.send_subnegotiation(TelnetOption::Msdp, buf.to_vec());
    }

    fn send_list(&self, ctx: &PluginContext, target: &str, names: Vec<String>) {
        let mut buf = BytesMut::new();
        MsdpVariable {
            name: target.to_string(),
            value: MsdpValue::Array(names.into_iter().map(MsdpValue::string).collect()),
        }
        .write(&mut buf);
        ctx.send_subnegotiation(TelnetOption::Msdp, buf.to_vec());
    }

    fn names_in(value: &MsdpValue) -> Vec<String> {
        match value {
            MsdpValue::String(s) => vec![s.clone()],
            MsdpValue::Array(values) => values.iter().flat_map(Self::names_in).collect(),
            MsdpValue::Table(_) => Vec::new(),
        }
    }
}

impl OptionPlugin for MsdpPlugin {
    fn option(&self) -> TelnetOption {
        TelnetOption::Msdp
    }

    fn name(&self) -> &'static str {
        "msdp"
    }

    fn on_init(&self, ctx: &PluginContext) {
        if ctx.mode() == Mode::Server {
            ctx.send_negotiation(TelnetFrame::Do(TelnetOption::Msdp));
        }
    }

    fn on_subnegotiation(&self, ctx: &PluginContext, payload: &[u8]) {
        let variables = MsdpVariable::decode_all(&mut &payload[..]);
        if variables.is_empty() {
            warn!("malformed MSDP subnegotiation payload");
            return;
        }
        for var in &variables {
            self.handle_variable(ctx, var);
        }
    }

    fn as_any(&self) -> &dyn Any {
        self
    }
}

impl MsdpPlugin {
    fn handle_variable(&self, ctx: &PluginContext, var: &MsdpVariable) {
        match var.name.as_str() {
            "LIST" => {
                let target = match &var.value {
                    MsdpValue::String(s) => s.as_str(),
                    _ => "",
                };
                match target {
                    "COMMANDS" => self.send_list(ctx, "COMMANDS", COMMANDS.iter().map(|s| s.to_string()).collect()),
                    "REPORTABLE_VARIABLES" => self.send_list(ctx, "REPORTABLE_VARIABLES", self.reportable.clone()),
                    "CONFIGURABLE_VARIABLES" => self.send_list(ctx, "CONFIGURABLE_VARIABLES", self.configurable.clone()),
                    "SENDABLE_VARIABLES" => self.send_list(ctx, "SENDABLE_VARIABLES", self.sendable.clone()),
                    "REPORTED_VARIABLES" => {
                        let mut names: Vec<String> =
                            self.reported.lock().expect("msdp reported-set poisoned").iter().cloned().collect();
                        names.sort();
                        self.send_list(ctx, "REPORTED_VARIABLES", names);
                    }
                    other => warn!(%other, "unknown MSDP LIST target"),
                }
            }
            "REPORT" => {
                let names = Self::names_in(&var.value);
                let mut reported = self.reported.lock().expect("msdp reported-set poisoned");
                for name in &names {
                    reported.insert(name.clone());
                }
                drop(reported);
                for name in &names {
                    self.send_variable(ctx, name);
                }
            }
            "UNREPORT" => {
                let mut reported = self.reported.lock().expect("msdp reported-set poisoned");
                for name in Self::names_in(&var.value) {
                    reported.remove(&name);
                }
            }
            "SEND" => {
                for name in Self::names_in(&var.value) {
                    self.send_variable(ctx, &name);
                }
            }
            "RESET" => {
                self.reported.lock().expect("msdp reported-set poisoned").clear();
            }
            other => warn!(%other, "unknown MSDP command variable"),
        }
    }
}
