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

//! MUD Server Status Protocol. A static table of server metadata, sent
//! once when the client DOes MSSP — never negotiated interactively, so
//! this plugin's only active behavior is sending the table on enable.
//!
//! Variables are supplied as a config object mapping each name to a
//! producer function (`spec.md` §4.5/§9) rather than a plain value table,
//! so a variable like `PLAYERS` or `UPTIME` is read fresh at send time
//! instead of going stale between construction and negotiation.

use crate::context::PluginContext;
use crate::plugin::OptionPlugin;
use bytes::BytesMut;
use mudtel_codec::args::mssp::{MsspTable, MsspValue};
use mudtel_codec::{Mode, TelnetOption, TelnetSide};
use std::any::Any;

/// A producer function yielding one MSSP variable's current value.
pub type MsspProducer = Box<dyn Fn() -> MsspValue + Send + Sync>;

/// Config object mapping MSSP variable names to producer functions. Names
/// need not be restricted to [`mudtel_codec::args::mssp::CANONICAL_VARIABLES`] —
/// a server may report arbitrary extension variables alongside them.
#[derive(Default)]
pub struct MsspConfig {
    producers: Vec<(String, MsspProducer)>,
}

impl MsspConfig {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn with(mut self, name: impl Into<String>, producer: impl Fn() -> MsspValue + Send + Sync + 'static) -> Self {
        self.producers.push((name.into(), Box::new(producer)));
        self
    }

    /// Convenience for a fixed, unchanging scalar value.
    pub fn with_scalar(self, name: impl Into<String>, value: impl Into<String>) -> Self {
        let value = value.into();
        self.with(name, move || MsspValue::Scalar(value.clone()))
    }

    fn build_table(&self) -> MsspTable {
        let mut table = MsspTable::new();
        for (name, producer) in &self.producers {
            table.set_typed(name.clone(), producer());
        }
        table
    }
}

pub struct MsspPlugin {
    config: MsspConfig,
}

impl MsspPlugin {
    pub fn new(config: MsspConfig) -> Self {
        Self { config }
    }
}

impl OptionPlugin for MsspPlugin {
    fn option(&self) -> TelnetOption {
        TelnetOption::Mssp
    }

    fn name(&self) -> &'static str {
        "mssp"
    }

    fn on_enable(&self, ctx: &PluginContext, side: TelnetSide) {
        if ctx.mode() == Mode::Server && side == TelnetSide::Local {
            let table = self.config.build_table();
            let mut buf = BytesMut::new();
            table.encode(&mut buf).expect("encoding into a BytesMut cannot fail");
            ctx.send_subnegotiation(TelnetOption::Mssp, buf.to_vec());
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
    fn config_builds_a_table_from_producers() {
        let config = MsspConfig::new()
            .with_scalar("NAME", "Example MUD")
            .with("PLAYERS", || MsspValue::Integer(12))
            .with("ANSI", || MsspValue::Boolean(true));
        let table = config.build_table();
        assert_eq!(table.get("NAME"), Some(&["Example MUD".to_string()][..]));
        assert_eq!(table.get("PLAYERS"), Some(&["12".to_string()][..]));
        assert_eq!(table.get("ANSI"), Some(&["1".to_string()][..]));
    }
}
