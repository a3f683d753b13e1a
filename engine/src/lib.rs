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

//! Drives `mudtel-codec`'s FSM over a bounded async byte pipeline and
//! dispatches its events to pluggable MUD option handlers — GMCP, MSDP,
//! MSSP, NAWS, TTYPE/MTTS, CHARSET, EOR, SUPPRESS-GA, ECHO, NEW-ENVIRON.
//!
//! This crate never opens a socket and never renders a terminal: a host
//! feeds it bytes through [`interpreter::TelnetInterpreter::submit_byte`]
//! and gets outbound wire bytes and completed lines back through the two
//! callbacks supplied to [`interpreter::TelnetInterpreterBuilder`].

pub mod config;
pub mod context;
pub mod error;
pub mod interpreter;
pub mod line_buffer;
pub mod manager;
pub mod pipeline;
pub mod plugin;
pub mod plugins;
pub mod shared_state;

pub use config::EngineConfig;
pub use context::{OutboundQueue, OutboundRequest, PluginContext};
pub use error::{EngineError, Result};
pub use interpreter::{TelnetInterpreter, TelnetInterpreterBuilder};
pub use line_buffer::LineBuffer;
pub use manager::PluginManager;
pub use pipeline::BytePipeline;
pub use plugin::OptionPlugin;
pub use shared_state::SharedState;
