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

//! SUPPRESS-GO-AHEAD (RFC 858). Pure negotiation, no payload. Its only
//! effect is observed elsewhere: [`crate::interpreter::TelnetInterpreter::send_prompt`]
//! checks whether this option's plugin is enabled before emitting `IAC GA`.

use crate::context::PluginContext;
use crate::plugin::OptionPlugin;
use mudtel_codec::{Mode, TelnetFrame, TelnetOption};
use std::any::Any;

#[derive(Default)]
pub struct SuppressGaPlugin;

impl SuppressGaPlugin {
    pub fn new() -> Self {
        Self
    }
}

impl OptionPlugin for SuppressGaPlugin {
    fn option(&self) -> TelnetOption {
        TelnetOption::SuppressGoAhead
    }

    fn name(&self) -> &'static str {
        "suppress_ga"
    }

    fn offer_on_server_start(&self) -> bool {
        true
    }

    fn on_init(&self, ctx: &PluginContext) {
        if ctx.mode() == Mode::Server {
            ctx.send_negotiation(TelnetFrame::Will(TelnetOption::SuppressGoAhead));
        }
    }

    fn as_any(&self) -> &dyn Any {
        self
    }
}
