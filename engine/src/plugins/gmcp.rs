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

//! Generic MUD Communication Protocol. Declares a dependency on `msdp`
//! (`spec.md` §8 S7) since most GMCP deployments bridge `MSDP`-shaped
//! package bodies (e.g. the `MSDP` GMCP package) through the same
//! reporting machinery.

use crate::context::PluginContext;
use crate::plugin::OptionPlugin;
use mudtel_codec::args::gmcp::GmcpMessage;
use mudtel_codec::{Mode, TelnetFrame, TelnetOption};
use std::any::Any;
use std::sync::Mutex;
use tracing::warn;

pub const LAST_PACKAGE_KEY: &str = "gmcp.package";
pub const LAST_DATA_KEY: &str = "gmcp.data";

#[derive(Default)]
pub struct GmcpPlugin {
    last: Mutex<Option<GmcpMessage>>,
}

impl GmcpPlugin {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn last_message(&self) -> Option<GmcpMessage> {
        self.last.lock().expect("gmcp last-message lock poisoned").clone()
    }
}

impl OptionPlugin for GmcpPlugin {
    fn option(&self) -> TelnetOption {
        TelnetOption::Gmcp
    }

    fn name(&self) -> &'static str {
        "gmcp"
    }

    fn dependencies(&self) -> &'static [TelnetOption] {
        &[TelnetOption::Msdp]
    }

    fn on_init(&self, ctx: &PluginContext) {
        if ctx.mode() == Mode::Server {
            ctx.send_negotiation(TelnetFrame::Do(TelnetOption::Gmcp));
        }
    }

    fn on_subnegotiation(&self, ctx: &PluginContext, payload: &[u8]) {
        match GmcpMessage::parse(payload) {
            Some(msg) => {
                if let Some(data) = msg.data() {
                    if let Err(err) = serde_json::from_str::<serde_json::Value>(data) {
                        warn!(package = msg.package(), %err, "GMCP payload body is not valid JSON");
                    }
                }
                ctx.shared_state_set(LAST_PACKAGE_KEY, msg.package().to_string());
                ctx.shared_state_set(LAST_DATA_KEY, msg.data().map(str::to_string));
                *self.last.lock().expect("gmcp last-message lock poisoned") = Some(msg);
            }
            None => warn!("empty or no-space GMCP payload, discarding"),
        }
    }

    fn as_any(&self) -> &dyn Any {
        self
    }
}
