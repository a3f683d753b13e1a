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

//! Negotiate About Window Size (RFC 1073). The client sends width/height
//! whenever its terminal is resized; this plugin just decodes and publishes
//! the latest value, there is no request/reply cycle to drive.

use crate::context::PluginContext;
use crate::plugin::OptionPlugin;
use mudtel_codec::args::naws::WindowSize;
use mudtel_codec::{Mode, TelnetFrame, TelnetOption};
use std::any::Any;
use std::sync::Mutex;
use tracing::warn;

pub const WIDTH_KEY: &str = "naws.width";
pub const HEIGHT_KEY: &str = "naws.height";

/// `spec.md` §4.5's NAWS default, distinct from [`WindowSize::default`]'s
/// wire-codec default of 80x24.
const DEFAULT_SIZE: WindowSize = WindowSize { cols: 78, rows: 24 };

pub struct NawsPlugin {
    size: Mutex<WindowSize>,
}

impl Default for NawsPlugin {
    fn default() -> Self {
        Self { size: Mutex::new(DEFAULT_SIZE) }
    }
}

impl NawsPlugin {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn window_size(&self) -> WindowSize {
        *self.size.lock().expect("naws size poisoned")
    }
}

impl OptionPlugin for NawsPlugin {
    fn option(&self) -> TelnetOption {
        TelnetOption::Naws
    }

    fn name(&self) -> &'static str {
        "naws"
    }

    fn on_init(&self, ctx: &PluginContext) {
        if ctx.mode() == Mode::Server {
            ctx.send_negotiation(TelnetFrame::Do(TelnetOption::Naws));
        }
    }

    fn on_subnegotiation(&self, ctx: &PluginContext, payload: &[u8]) {
        match WindowSize::decode(&mut &payload[..]) {
            Ok(size) => {
                *self.size.lock().expect("naws size poisoned") = size;
                ctx.shared_state_set(WIDTH_KEY, size.cols);
                ctx.shared_state_set(HEIGHT_KEY, size.rows);
            }
            Err(err) => warn!(?err, "malformed NAWS subnegotiation payload"),
        }
    }

    fn as_any(&self) -> &dyn Any {
        self
    }
}
