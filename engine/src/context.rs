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

//! The handle plugins use to talk back to the interpreter: request outbound
//! negotiation, inspect or change the session's text encoding, and read or
//! write shared state.

use crate::manager::PluginManager;
use crate::plugin::OptionPlugin;
use crate::shared_state::SharedState;
use mudtel_codec::{Mode, SessionEncoding, TelnetFrame, TelnetOption};
use std::collections::VecDeque;
use std::sync::{Mutex, RwLock};

/// Something a plugin asked the interpreter to send on its behalf.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum OutboundRequest {
    /// A bare negotiation frame (`WILL`/`WONT`/`DO`/`DONT`).
    Negotiate(TelnetFrame),
    /// A subnegotiation payload to wrap in `IAC SB <option> ... IAC SE`,
    /// escaping embedded `0xFF` bytes.
    Subnegotiate { option: TelnetOption, payload: Vec<u8> },
}

/// Per-session queue of frames plugins have asked to send, drained by the
/// interpreter after each dispatch.
#[derive(Default)]
pub struct OutboundQueue {
    pending: Mutex<VecDeque<OutboundRequest>>,
}

impl OutboundQueue {
    pub fn new() -> Self {
        Self::default()
    }

    pub(crate) fn push(&self, request: OutboundRequest) {
        self.pending.lock().expect("outbound queue poisoned").push_back(request);
    }

    /// Drains every request queued since the last drain, in order.
    pub fn drain(&self) -> Vec<OutboundRequest> {
        self.pending.lock().expect("outbound queue poisoned").drain(..).collect()
    }
}

/// Passed to every [`OptionPlugin`] hook. Borrows the session's shared
/// pieces for the duration of one dispatch — plugins are not meant to hold
/// onto a `PluginContext` past the call that handed it to them.
pub struct PluginContext<'a> {
    mode: Mode,
    shared: &'a SharedState,
    encoding: &'a RwLock<SessionEncoding>,
    outbound: &'a OutboundQueue,
    manager: &'a PluginManager,
}

impl<'a> PluginContext<'a> {
    pub(crate) fn new(
        mode: Mode,
        shared: &'a SharedState,
        encoding: &'a RwLock<SessionEncoding>,
        outbound: &'a OutboundQueue,
        manager: &'a PluginManager,
    ) -> Self {
        Self { mode, shared, encoding, outbound, manager }
    }

    /// Whether this session is negotiating as the server or the client.
    pub fn mode(&self) -> Mode {
        self.mode
    }

    /// Queues a bare negotiation frame for the interpreter to send.
    ///
    /// Intended for configure-time use (a plugin's `on_init`, offering its
    /// option) or in response to a peer's subnegotiation (e.g. CHARSET
    /// replying `ACCEPTED`) — plugins do not otherwise get to prod the FSM.
    pub fn send_negotiation(&self, frame: TelnetFrame) {
        self.outbound.push(OutboundRequest::Negotiate(frame));
    }

    /// Queues a subnegotiation payload for `option`.
    pub fn send_subnegotiation(&self, option: TelnetOption, payload: impl Into<Vec<u8>>) {
        self.outbound.push(OutboundRequest::Subnegotiate { option, payload: payload.into() });
    }

    /// The session's current text encoding (CHARSET's negotiated result, or
    /// the configured default before any negotiation completes).
    pub fn current_encoding(&self) -> SessionEncoding {
        self.encoding.read().expect("encoding lock poisoned").clone()
    }

    /// Updates the session's text encoding. Only the CHARSET plugin should
    /// normally call this.
    pub fn set_encoding(&self, encoding: SessionEncoding) {
        *self.encoding.write().expect("encoding lock poisoned") = encoding;
    }

    /// Looks up another registered plugin by its concrete type, e.g. the
    /// `gmcp` plugin reading the `msdp` plugin's accumulated state.
    pub fn get_plugin<T: OptionPlugin + 'static>(&self) -> Option<&T> {
        self.manager.get_plugin::<T>()
    }

    /// Whether `option`'s plugin is currently enabled (negotiated active on
    /// at least one side).
    pub fn is_plugin_enabled(&self, option: TelnetOption) -> bool {
        self.manager.is_enabled(option)
    }

    /// Stores a value in the session's shared state.
    pub fn shared_state_set<T: Send + Sync + 'static>(&self, key: impl Into<String>, value: T) {
        self.shared.set(key, value);
    }

    /// Reads a value from the session's shared state.
    pub fn shared_state_get<T: Clone + Send + Sync + 'static>(&self, key: &str) -> Option<T> {
        self.shared.get(key)
    }

    /// Alias of [`Self::shared_state_get`], matching the host-facing naming.
    pub fn try_get<T: Clone + Send + Sync + 'static>(&self, key: &str) -> Option<T> {
        self.shared.try_get(key)
    }
}
