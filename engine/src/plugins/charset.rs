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

//! CHARSET negotiation (RFC 2066). Whichever side offers lists the names it
//! is willing to use; the responder picks by its own preference order among
//! offered names that map to a known `SessionEncoding` — a name the
//! encoding layer doesn't recognize is never a candidate, regardless of
//! where (or whether) it appears in the preference list.

use crate::context::PluginContext;
use crate::plugin::OptionPlugin;
use mudtel_codec::args::charset::CharsetMessage;
use mudtel_codec::{Mode, SessionEncoding, TelnetFrame, TelnetOption};
use std::any::Any;
use tracing::{debug, warn};

const SEPARATOR: u8 = b' ';

pub struct CharsetPlugin {
    preferences: Vec<String>,
}

impl CharsetPlugin {
    /// `preferences` is ranked best-first; names absent from it never win
    /// when a better-ranked alternative is also offered.
    pub fn new(preferences: Vec<String>) -> Self {
        Self { preferences }
    }

    /// Lower is better; names absent from `preferences` rank last among the
    /// names that are still eligible (mappable to a known encoding).
    fn rank(&self, name: &str) -> usize {
        self.preferences
            .iter()
            .position(|p| p.eq_ignore_ascii_case(name))
            .unwrap_or(usize::MAX)
    }

    /// Picks the best-ranked offered name among those that map to a known
    /// encoding, ties broken by offered order. Names `SessionEncoding`
    /// doesn't recognize never win, regardless of `preferences` content.
    fn select<'a>(&self, names: &'a [String]) -> Option<&'a str> {
        names
            .iter()
            .filter(|n| SessionEncoding::from_name(n).is_some())
            .map(|n| (self.rank(n), n.as_str()))
            .min_by_key(|(r, _)| *r)
            .map(|(_, n)| n)
    }
}

impl OptionPlugin for CharsetPlugin {
    fn option(&self) -> TelnetOption {
        TelnetOption::Charset
    }

    fn name(&self) -> &'static str {
        "charset"
    }

    fn offer_on_server_start(&self) -> bool {
        true
    }

    fn on_init(&self, ctx: &PluginContext) {
        if ctx.mode() == Mode::Server {
            ctx.send_negotiation(TelnetFrame::Will(TelnetOption::Charset));
        }
    }

    fn on_enable(&self, ctx: &PluginContext, _side: mudtel_codec::TelnetSide) {
        if ctx.mode() == Mode::Server && !self.preferences.is_empty() {
            let msg = CharsetMessage::Request { separator: SEPARATOR, names: self.preferences.clone() };
            ctx.send_subnegotiation(TelnetOption::Charset, msg.encode());
        }
    }

    fn on_subnegotiation(&self, ctx: &PluginContext, payload: &[u8]) {
        match CharsetMessage::decode(payload) {
            Some(CharsetMessage::Request { separator: _, names }) => match self.select(&names).and_then(|name| SessionEncoding::from_name(name).map(|enc| (name, enc))) {
                Some((name, encoding)) => {
                    ctx.set_encoding(encoding);
                    ctx.send_subnegotiation(TelnetOption::Charset, CharsetMessage::Accepted(name.to_string()).encode());
                }
                None => {
                    debug!(?names, "no offered charset matches our preferences, rejecting");
                    ctx.send_subnegotiation(TelnetOption::Charset, CharsetMessage::Rejected.encode());
                }
            },
            Some(CharsetMessage::Accepted(name)) => match SessionEncoding::from_name(&name) {
                Some(encoding) => ctx.set_encoding(encoding),
                None => warn!(%name, "peer accepted a charset name we don't recognize"),
            },
            Some(CharsetMessage::Rejected) => debug!("peer rejected every offered charset"),
            None => warn!("malformed CHARSET subnegotiation payload"),
        }
    }

    fn as_any(&self) -> &dyn Any {
        self
    }
}
