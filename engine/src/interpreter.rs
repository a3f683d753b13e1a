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

//! The public facade: a builder that assembles plugins and callbacks, and
//! the resulting interpreter that a host feeds inbound bytes and drains
//! outbound ones from.
//!
//! This engine never opens a socket and never renders a terminal
//! (`spec.md` §1) — the write side a host would normally get from a
//! `TcpStream` is instead the `on_negotiation` callback supplied at build
//! time, grounded on `service/src/server.rs`'s builder-then-handle shape
//! with the transport half removed.

use crate::config::EngineConfig;
use crate::context::{OutboundQueue, OutboundRequest};
use crate::error::Result;
use crate::line_buffer::LineBuffer;
use crate::manager::PluginManager;
use crate::pipeline::BytePipeline;
use crate::plugin::OptionPlugin;
use crate::shared_state::SharedState;
use bytes::BytesMut;
use mudtel_codec::{
    encode_subnegotiation, FsmEvent, Mode, NegotiationPolicy, SessionEncoding, TelnetFrame, TelnetFsm, TelnetOption,
};
use std::collections::HashMap;
use std::panic::{self, AssertUnwindSafe};
use std::sync::{Arc, Mutex, RwLock};
use tracing::{debug, error, trace, warn};

type LineCallback = dyn Fn(Vec<u8>) + Send + Sync;
type NegotiationCallback = dyn Fn(&[u8]) + Send + Sync;

/// Assembles a [`TelnetInterpreter`]: its mode, tunables, registered option
/// plugins, and the two callbacks a host supplies in place of a socket.
pub struct TelnetInterpreterBuilder {
    mode: Mode,
    config: EngineConfig,
    manager: PluginManager,
    on_submit: Option<Arc<LineCallback>>,
    on_negotiation: Option<Arc<NegotiationCallback>>,
}

impl TelnetInterpreterBuilder {
    pub fn new(mode: Mode) -> Self {
        Self {
            mode,
            config: EngineConfig::new(mode),
            manager: PluginManager::new(),
            on_submit: None,
            on_negotiation: None,
        }
    }

    pub fn with_config(mut self, config: EngineConfig) -> Self {
        self.config = config;
        self
    }

    /// Registers one option's plugin. Order does not matter — [`PluginManager::build`]
    /// resolves dependency order when [`Self::build`] runs.
    pub fn register(mut self, plugin: Box<dyn OptionPlugin>) -> Result<Self> {
        self.manager.register(plugin)?;
        Ok(self)
    }

    /// Called with each complete line of plain application data.
    pub fn on_submit(mut self, f: impl Fn(Vec<u8>) + Send + Sync + 'static) -> Self {
        self.on_submit = Some(Arc::new(f));
        self
    }

    /// Called with each chunk of wire bytes the interpreter needs written
    /// to the connection — negotiation frames and subnegotiation replies.
    pub fn on_negotiation(mut self, f: impl Fn(&[u8]) + Send + Sync + 'static) -> Self {
        self.on_negotiation = Some(Arc::new(f));
        self
    }

    pub fn build(mut self) -> Result<TelnetInterpreter> {
        let shared = SharedState::new();
        let encoding = RwLock::new(SessionEncoding::Latin1);
        let outbound = OutboundQueue::new();
        self.manager.build(self.mode, &shared, &encoding, &outbound)?;

        // Anything a plugin queued from `on_init` (e.g. ECHO offering
        // `WILL` at server startup) needs to reach the FSM and the host
        // immediately, before the first byte is ever submitted.
        let mut fsm = TelnetFsm::new();
        let mut startup_bytes = BytesMut::new();
        for request in outbound.drain() {
            if let Some(bytes) = encode_outbound_request(&mut fsm, request) {
                startup_bytes.extend_from_slice(&bytes);
            }
        }

        let inner = Arc::new(Inner {
            mode: self.mode,
            config: self.config.clone(),
            fsm: Mutex::new(fsm),
            manager: self.manager,
            shared,
            encoding,
            outbound,
            line_buffer: Mutex::new(LineBuffer::new(self.config.max_line_buffer)),
            subnegotiation_buffers: Mutex::new(HashMap::new()),
            on_submit: self.on_submit.unwrap_or_else(|| Arc::new(|_| {})),
            on_negotiation: self.on_negotiation.unwrap_or_else(|| Arc::new(|_| {})),
        });

        if !startup_bytes.is_empty() {
            (inner.on_negotiation)(&startup_bytes);
        }

        let inner_for_pipeline = inner.clone();
        let pipeline = BytePipeline::spawn(self.config.channel_capacity, move |byte| {
            inner_for_pipeline.process_byte(byte);
        });

        Ok(TelnetInterpreter { inner, pipeline })
    }
}

/// Turns a queued [`OutboundRequest`] into wire bytes, routing `WILL`/`DO`
/// through the FSM's RFC 1143 arbitration (`fsm.request_will`/`request_do`)
/// so a plugin re-offering an option it already owns never produces a
/// duplicate frame.
fn encode_outbound_request(fsm: &mut TelnetFsm, request: OutboundRequest) -> Option<BytesMut> {
    let frame = match request {
        OutboundRequest::Negotiate(TelnetFrame::Will(opt)) => fsm.request_will(opt)?,
        OutboundRequest::Negotiate(TelnetFrame::Do(opt)) => fsm.request_do(opt)?,
        OutboundRequest::Negotiate(frame) => frame,
        OutboundRequest::Subnegotiate { option, payload } => {
            let mut out = BytesMut::new();
            encode_subnegotiation(option, &payload, &mut out);
            return Some(out);
        }
    };
    let mut out = BytesMut::new();
    frame.encode(&mut out);
    Some(out)
}

/// Extracts a human-readable message from a caught panic payload, which is
/// almost always a `&'static str` or `String` but isn't guaranteed to be.
fn panic_message(payload: &(dyn std::any::Any + Send)) -> String {
    if let Some(s) = payload.downcast_ref::<&str>() {
        s.to_string()
    } else if let Some(s) = payload.downcast_ref::<String>() {
        s.clone()
    } else {
        "non-string panic payload".to_string()
    }
}

struct ManagerPolicy<'a>(&'a PluginManager);

impl<'a> NegotiationPolicy for ManagerPolicy<'a> {
    fn supports(&self, option: TelnetOption) -> bool {
        self.0.get(option).is_some()
    }
}

struct Inner {
    mode: Mode,
    config: EngineConfig,
    fsm: Mutex<TelnetFsm>,
    manager: PluginManager,
    shared: SharedState,
    encoding: RwLock<SessionEncoding>,
    outbound: OutboundQueue,
    line_buffer: Mutex<LineBuffer>,
    subnegotiation_buffers: Mutex<HashMap<TelnetOption, SubnegotiationAccumulator>>,
    on_submit: Arc<LineCallback>,
    on_negotiation: Arc<NegotiationCallback>,
}

#[derive(Default)]
struct SubnegotiationAccumulator {
    bytes: Vec<u8>,
    overflowed: bool,
}

impl Inner {
    fn process_byte(&self, byte: u8) {
        let mut events = Vec::new();
        {
            let mut fsm = self.fsm.lock().expect("fsm lock poisoned");
            let policy = ManagerPolicy(&self.manager);
            if let Err(err) = fsm.step(byte, &policy, &mut events) {
                warn!(?err, "codec error processing byte");
            }
        }
        for event in events {
            self.handle_event(event);
        }
        self.flush_outbound();
    }

    fn handle_event(&self, event: FsmEvent) {
        match event {
            FsmEvent::Data(byte) => {
                if let Some(line) = self.line_buffer.lock().expect("line buffer poisoned").push(byte) {
                    (self.on_submit)(line);
                }
            }
            FsmEvent::EndOfLine => {}
            FsmEvent::GoAhead | FsmEvent::EndOfRecord => {
                trace!(?event, "prompt marker received from peer");
            }
            FsmEvent::NegotiationSent(frame) => self.flush_frame(frame),
            FsmEvent::OptionActive { option, side } => {
                debug!(%option, ?side, "option active");
                let result = self.run_plugin_hook("on_enable", || {
                    self.manager.enable(option, side, self.mode, &self.shared, &self.encoding, &self.outbound)
                });
                if let Some(Err(err)) = result {
                    warn!(%option, ?err, "plugin enable failed");
                }
            }
            FsmEvent::OptionInactive { option, side } => {
                debug!(%option, ?side, "option inactive");
                let result = self.run_plugin_hook("on_disable", || {
                    self.manager.disable(option, side, self.mode, &self.shared, &self.encoding, &self.outbound)
                });
                if let Some(Err(err)) = result {
                    warn!(%option, ?err, "plugin disable failed");
                }
            }
            FsmEvent::SubnegotiationByte { option, byte } => {
                let cap = self.subnegotiation_cap(option);
                let mut buffers = self.subnegotiation_buffers.lock().expect("subnegotiation buffers poisoned");
                let entry = buffers.entry(option).or_default();
                if entry.bytes.len() < cap {
                    entry.bytes.push(byte);
                } else if !entry.overflowed {
                    entry.overflowed = true;
                    warn!(%option, cap, "subnegotiation payload exceeded cap, dropping");
                }
            }
            FsmEvent::SubnegotiationEnd { option } => {
                let accumulator = self
                    .subnegotiation_buffers
                    .lock()
                    .expect("subnegotiation buffers poisoned")
                    .remove(&option)
                    .unwrap_or_default();
                if !accumulator.overflowed {
                    let _ = self.run_plugin_hook("on_subnegotiation", || {
                        self.manager.dispatch_subnegotiation(
                            option,
                            &accumulator.bytes,
                            self.mode,
                            &self.shared,
                            &self.encoding,
                            &self.outbound,
                        );
                    });
                }
            }
            FsmEvent::SubnegotiationUnknown { option } => {
                debug!(%option, "subnegotiation for an unrecognized option");
            }
            FsmEvent::ProtocolError(err) => {
                warn!(?err, "protocol violation recovered locally");
            }
        }
    }

    /// TTYPE names are bounded far tighter than the general subnegotiation
    /// cap (`spec.md` §3) since a malicious or buggy peer has no legitimate
    /// reason to send a multi-kilobyte terminal type name.
    fn subnegotiation_cap(&self, option: TelnetOption) -> usize {
        match option {
            TelnetOption::TType => self.config.max_ttype_name_buffer,
            _ => self.config.max_subnegotiation_buffer,
        }
    }

    /// Runs a plugin-hook-invoking closure, catching any panic so it can
    /// never unwind into the pipeline's consumer task. A caught panic is
    /// logged and the FSM is forced back to `Accepting`, mirroring the
    /// `Trigger::Error` recovery path (`spec.md` §4.1, §7 `PluginFailure`).
    fn run_plugin_hook<R>(&self, hook: &'static str, f: impl FnOnce() -> R) -> Option<R> {
        match panic::catch_unwind(AssertUnwindSafe(f)) {
            Ok(value) => Some(value),
            Err(payload) => {
                let message = panic_message(&payload);
                error!(hook, message, "plugin hook panicked, recovering session to Accepting");
                self.fsm.lock().expect("fsm lock poisoned").force_accepting();
                None
            }
        }
    }

    fn flush_outbound(&self) {
        for request in self.outbound.drain() {
            let bytes = {
                let mut fsm = self.fsm.lock().expect("fsm lock poisoned");
                encode_outbound_request(&mut fsm, request)
            };
            if let Some(bytes) = bytes {
                (self.on_negotiation)(&bytes);
            }
        }
    }

    fn flush_frame(&self, frame: TelnetFrame) {
        let mut out = BytesMut::new();
        frame.encode(&mut out);
        (self.on_negotiation)(&out);
    }
}

/// A running Telnet negotiation session: feed it inbound bytes, it calls
/// back with outbound wire bytes and completed lines.
pub struct TelnetInterpreter {
    inner: Arc<Inner>,
    pipeline: BytePipeline,
}

impl TelnetInterpreter {
    pub fn submit_byte(&self, byte: u8) -> Result<()> {
        self.pipeline.submit_byte(byte)
    }

    pub fn submit_bytes(&self, bytes: &[u8]) -> Result<()> {
        self.pipeline.submit_bytes(bytes)
    }

    /// Test-only helper: yields until every byte submitted so far has been
    /// fully processed, including any plugin hooks and outbound bytes it
    /// triggered.
    pub async fn wait_for_processing(&self) {
        self.pipeline.wait_for_processing().await;
    }

    /// Sends a prompt marker using whichever of EOR/GA the session has
    /// negotiated: `IAC EOR` if the EOR plugin's option is active locally,
    /// else `IAC GA` unless SUPPRESS-GA is active locally, else nothing.
    pub fn send_prompt(&self) {
        let eor_active = self.inner.manager.is_enabled(TelnetOption::Eor);
        let sga_active = self.inner.manager.is_enabled(TelnetOption::SuppressGoAhead);
        let frame = if eor_active {
            Some(TelnetFrame::EndOfRecord)
        } else if !sga_active {
            Some(TelnetFrame::GoAhead)
        } else {
            None
        };
        if let Some(frame) = frame {
            self.inner.flush_frame(frame);
        }
    }

    /// Sends raw application data bytes (not subject to any further
    /// framing) through the same outbound path as negotiation traffic.
    pub fn send(&self, bytes: &[u8]) {
        (self.inner.on_negotiation)(bytes);
    }

    pub fn current_encoding(&self) -> SessionEncoding {
        self.inner.encoding.read().expect("encoding lock poisoned").clone()
    }

    pub fn plugin_manager(&self) -> &PluginManager {
        &self.inner.manager
    }

    /// Runs every plugin's `on_dispose` hook and shuts down the byte
    /// pipeline. Idempotent on the pipeline half; plugin dispose hooks are
    /// only ever run once since this consumes `self`.
    pub async fn dispose(mut self) {
        self.inner
            .manager
            .dispose(self.inner.mode, &self.inner.shared, &self.inner.encoding, &self.inner.outbound);
        self.pipeline.shutdown().await;
    }
}
