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

//! ECHO (RFC 857). No subnegotiation — just WILL/WONT/DO/DONT and an
//! observable `IsEchoing` flag published to shared state.

use crate::context::PluginContext;
use crate::plugin::OptionPlugin;
use mudtel_codec::{Mode, TelnetFrame, TelnetOption, TelnetSide};
use std::any::Any;
use std::sync::atomic::{AtomicBool, Ordering};

/// Key in [`crate::shared_state::SharedState`] holding the current
/// `IsEchoing` flag.
pub const ECHOING_KEY: &str = "echo.active";

#[derive(Default)]
pub struct EchoPlugin {
    active: AtomicBool,
}

impl EchoPlugin {
    pub fn new() -> Self {
        Self::default()
    }

    /// Whether the server side currently owns echoing.
    pub fn is_echoing(&self) -> bool {
        self.active.load(Ordering::Relaxed)
    }
}

impl OptionPlugin for EchoPlugin {
    fn option(&self) -> TelnetOption {
        TelnetOption::Echo
    }

    fn name(&self) -> &'static str {
        "echo"
    }

    fn offer_on_server_start(&self) -> bool {
        true
    }

    fn on_init(&self, ctx: &PluginContext) {
        if ctx.mode() == Mode::Server {
            ctx.send_negotiation(TelnetFrame::Will(TelnetOption::Echo));
        }
    }

    fn on_enable(&self, ctx: &PluginContext, side: TelnetSide) {
        if side == TelnetSide::Local {
            self.active.store(true, Ordering::Relaxed);
            ctx.shared_state_set(ECHOING_KEY, true);
        }
    }

    fn on_disable(&self, ctx: &PluginContext, side: TelnetSide) {
        if side == TelnetSide::Local {
            self.active.store(false, Ordering::Relaxed);
            ctx.shared_state_set(ECHOING_KEY, false);
        }
    }

    fn as_any(&self) -> &dyn Any {
        self
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn starts_not_echoing() {
        let plugin = EchoPlugin::new();
        assert!(!plugin.is_echoing());
    }

    #[test]
    fn offers_on_server_start() {
        assert!(EchoPlugin::new().offer_on_server_start());
    }
}
