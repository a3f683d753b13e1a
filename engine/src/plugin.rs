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

//! The option-plugin trait and the lifecycle hooks the manager drives it
//! through (`spec.md` §5).

use crate::context::PluginContext;
use mudtel_codec::{TelnetOption, TelnetSide};
use std::any::Any;

/// A handler for one negotiable Telnet option.
///
/// Implementors are registered with a [`crate::manager::PluginManager`],
/// which resolves dependency order, drives `on_init`/`on_dispose` once per
/// session, and `on_enable`/`on_disable` as the option's negotiated state
/// changes. Subnegotiation payloads for `option()` are routed to
/// `on_subnegotiation` after the codec FSM reassembles them.
pub trait OptionPlugin: Any + Send + Sync {
    /// The option this plugin handles.
    fn option(&self) -> TelnetOption;

    /// A short, stable name used in logs and dependency-cycle diagnostics.
    fn name(&self) -> &'static str;

    /// Other options this plugin requires to already be registered (and,
    /// at runtime, active) before it can function — e.g. `gmcp` depending
    /// on `msdp` (`spec.md` §8 S7).
    fn dependencies(&self) -> &'static [TelnetOption] {
        &[]
    }

    /// Whether this plugin should have its option offered automatically at
    /// session start when running in [`mudtel_codec::Mode::Server`].
    fn offer_on_server_start(&self) -> bool {
        false
    }

    /// Called once, in dependency order, when the plugin manager builds.
    fn on_init(&self, _ctx: &PluginContext) {}

    /// Called once, in reverse dependency order, when the session tears down.
    fn on_dispose(&self, _ctx: &PluginContext) {}

    /// The option transitioned from inactive to active on `side`.
    fn on_enable(&self, _ctx: &PluginContext, _side: TelnetSide) {}

    /// The option transitioned from active to inactive on `side`.
    fn on_disable(&self, _ctx: &PluginContext, _side: TelnetSide) {}

    /// A complete, well-formed subnegotiation payload arrived for this
    /// plugin's option (IAC-doubling already undone).
    fn on_subnegotiation(&self, _ctx: &PluginContext, _payload: &[u8]) {}

    /// Upcast for [`crate::manager::PluginManager::get_plugin`].
    fn as_any(&self) -> &dyn Any;
}
