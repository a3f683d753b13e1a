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

//! End-to-end scenarios driving [`mudtel_engine::TelnetInterpreter`] with
//! the registered option plugins, mirroring the worked examples the
//! negotiation engine is specified against.

use mudtel_codec::args::mssp::MsspValue;
use mudtel_codec::{Mode, SessionEncoding};
use mudtel_engine::config::EngineConfig;
use mudtel_engine::error::EngineError;
use mudtel_engine::manager::PluginManager;
use mudtel_engine::plugins::{
    CharsetPlugin, EchoPlugin, GmcpPlugin, MsdpPlugin, MsspConfig, MsspPlugin, NawsPlugin, NewEnvironPlugin, TTypePlugin,
};
use mudtel_engine::shared_state::SharedState;
use mudtel_engine::{OptionPlugin, OutboundQueue, PluginContext, TelnetInterpreterBuilder};
use std::any::Any;
use std::sync::{Arc, Mutex, RwLock};

fn captured() -> (Arc<Mutex<Vec<u8>>>, Arc<Mutex<Vec<Vec<u8>>>>) {
    (Arc::new(Mutex::new(Vec::new())), Arc::new(Mutex::new(Vec::new())))
}

/// *S7. Dependency safety* (`spec.md` §8): GMCP depends on MSDP.
#[test]
fn gmcp_without_msdp_fails_to_build() {
    let mut manager = PluginManager::new();
    manager.register(Box::new(GmcpPlugin::new())).unwrap();

    let shared = SharedState::new();
    let encoding = RwLock::new(SessionEncoding::default());
    let outbound = OutboundQueue::new();
    let err = manager.build(Mode::Server, &shared, &encoding, &outbound).unwrap_err();
    assert!(matches!(err, EngineError::MissingDependency { missing: "MSDP", .. }));
}

#[test]
fn gmcp_with_msdp_builds_and_resists_premature_msdp_disable() {
    let mut manager = PluginManager::new();
    manager.register(Box::new(GmcpPlugin::new())).unwrap();
    manager.register(Box::new(MsdpPlugin::new(vec![], vec![], vec![]))).unwrap();

    let shared = SharedState::new();
    let encoding = RwLock::new(SessionEncoding::default());
    let outbound = OutboundQueue::new();
    manager.build(Mode::Server, &shared, &encoding, &outbound).unwrap();

    manager.enable(mudtel_codec::TelnetOption::Gmcp, mudtel_codec::TelnetSide::Remote, Mode::Server, &shared, &encoding, &outbound).unwrap();

    let err = manager
        .disable(mudtel_codec::TelnetOption::Msdp, mudtel_codec::TelnetSide::Remote, Mode::Server, &shared, &encoding, &outbound)
        .unwrap_err();
    assert!(matches!(err, EngineError::HasDependents { dependents, .. } if dependents == vec!["gmcp"]));
}

/// *S3. NAWS size update* (`spec.md` §8).
#[tokio::test]
async fn naws_publishes_window_size_to_shared_state() {
    let (negotiation, lines) = captured();
    let interpreter = TelnetInterpreterBuilder::new(Mode::Server)
        .register(Box::new(NawsPlugin::new()))
        .unwrap()
        .on_negotiation({
            let negotiation = negotiation.clone();
            move |bytes: &[u8]| negotiation.lock().unwrap().extend_from_slice(bytes)
        })
        .on_submit({
            let lines = lines.clone();
            move |line| lines.lock().unwrap().push(line)
        })
        .build()
        .unwrap();

    // Peer agrees to provide NAWS, then reports 80x24.
    interpreter.submit_bytes(&[0xFF, 0xFB, 31]).unwrap();
    interpreter
        .submit_bytes(&[0xFF, 0xFA, 31, 0x00, 0x50, 0x00, 0x18, 0xFF, 0xF0])
        .unwrap();
    interpreter.wait_for_processing().await;

    let naws = interpreter.plugin_manager().get_plugin::<NawsPlugin>().unwrap();
    assert_eq!(naws.window_size().cols, 80);
    assert_eq!(naws.window_size().rows, 24);
}

/// *S6. CHARSET negotiation* (`spec.md` §8): we act as the responder "B".
#[tokio::test]
async fn charset_negotiation_picks_highest_preference() {
    let (negotiation, _lines) = captured();
    let interpreter = TelnetInterpreterBuilder::new(Mode::Client)
        .register(Box::new(CharsetPlugin::new(vec!["UTF-8".into(), "ISO-8859-1".into()])))
        .unwrap()
        .on_negotiation({
            let negotiation = negotiation.clone();
            move |bytes: &[u8]| negotiation.lock().unwrap().extend_from_slice(bytes)
        })
        .build()
        .unwrap();

    let request: &[u8] = &[
        0xFF, 0xFA, 42, 0x01, b' ', b'U', b'T', b'F', b'-', b'8', b' ', b'I', b'S', b'O', b'-', b'8', b'8', b'5', b'9',
        b'-', b'1', 0xFF, 0xF0,
    ];
    interpreter.submit_bytes(request).unwrap();
    interpreter.wait_for_processing().await;

    assert_eq!(interpreter.current_encoding(), SessionEncoding::Utf8);
    let sent = negotiation.lock().unwrap().clone();
    let expected_accept: &[u8] = &[0xFF, 0xFA, 42, 0x02, b'U', b'T', b'F', b'-', b'8', 0xFF, 0xF0];
    assert_eq!(&sent[..], expected_accept);
}

/// *S4/S5. GMCP round-trip and oversize drop* (`spec.md` §8).
#[tokio::test]
async fn gmcp_parses_package_and_drops_oversized_payload() {
    let interpreter = TelnetInterpreterBuilder::new(Mode::Server)
        .with_config(EngineConfig::new(Mode::Server).with_max_subnegotiation_buffer(32))
        .register(Box::new(GmcpPlugin::new()))
        .unwrap()
        .register(Box::new(MsdpPlugin::new(vec![], vec![], vec![])))
        .unwrap()
        .build()
        .unwrap();

    let mut good = vec![0xFF, 0xFA, 201];
    good.extend_from_slice(br#"Core.Hello {"client":"T"}"#);
    good.extend_from_slice(&[0xFF, 0xF0]);
    interpreter.submit_bytes(&good).unwrap();
    interpreter.wait_for_processing().await;

    let gmcp = interpreter.plugin_manager().get_plugin::<GmcpPlugin>().unwrap();
    let msg = gmcp.last_message().unwrap();
    assert_eq!(msg.package(), "Core.Hello");
    assert_eq!(msg.data(), Some(r#"{"client":"T"}"#));

    let mut oversized = vec![0xFF, 0xFA, 201];
    oversized.extend(std::iter::repeat(b'A').take(64));
    oversized.extend_from_slice(&[0xFF, 0xF0]);
    interpreter.submit_bytes(&oversized).unwrap();
    interpreter.wait_for_processing().await;

    // The prior message is untouched — the oversized payload never dispatched.
    let msg_after = interpreter.plugin_manager().get_plugin::<GmcpPlugin>().unwrap().last_message().unwrap();
    assert_eq!(msg_after.package(), "Core.Hello");
}

/// MTTS cycle detection: the server keeps asking until a name repeats.
#[tokio::test]
async fn ttype_cycle_ends_on_repeated_name() {
    let (negotiation, _lines) = captured();
    let interpreter = TelnetInterpreterBuilder::new(Mode::Server)
        .register(Box::new(TTypePlugin::new()))
        .unwrap()
        .on_negotiation({
            let negotiation = negotiation.clone();
            move |bytes: &[u8]| negotiation.lock().unwrap().extend_from_slice(bytes)
        })
        .build()
        .unwrap();

    // Peer offers TTYPE; server's on_enable kicks off the first SEND.
    interpreter.submit_bytes(&[0xFF, 0xFB, 24]).unwrap();
    interpreter.wait_for_processing().await;

    let mut reply_is = |name: &str| {
        let mut bytes = vec![0xFF, 0xFA, 24, 0x00];
        bytes.extend_from_slice(name.as_bytes());
        bytes.extend_from_slice(&[0xFF, 0xF0]);
        bytes
    };

    interpreter.submit_bytes(&reply_is("xterm")).unwrap();
    interpreter.wait_for_processing().await;
    interpreter.submit_bytes(&reply_is("MTTS 261")).unwrap();
    interpreter.wait_for_processing().await;
    // Cycle repeats: client has nothing else to offer and repeats its last name.
    interpreter.submit_bytes(&reply_is("MTTS 261")).unwrap();
    interpreter.wait_for_processing().await;

    let ttype = interpreter.plugin_manager().get_plugin::<TTypePlugin>().unwrap();
    let caps = ttype.mtts().unwrap();
    assert!(caps.contains(mudtel_codec::args::ttype::MttsCapabilities::UTF8));
}

/// TTYPE names are capped far tighter than GMCP/MSDP bodies (`spec.md`
/// §3/§4.5): a name at the 8 KiB general cap would still be silently
/// accepted if TTYPE didn't get its own, far smaller, bound.
#[tokio::test]
async fn ttype_name_oversizing_general_cap_is_still_dropped() {
    let (negotiation, _lines) = captured();
    let interpreter = TelnetInterpreterBuilder::new(Mode::Server)
        .register(Box::new(TTypePlugin::new()))
        .unwrap()
        .on_negotiation({
            let negotiation = negotiation.clone();
            move |bytes: &[u8]| negotiation.lock().unwrap().extend_from_slice(bytes)
        })
        .build()
        .unwrap();

    interpreter.submit_bytes(&[0xFF, 0xFB, 24]).unwrap();
    interpreter.wait_for_processing().await;

    let mut oversized = vec![0xFF, 0xFA, 24, 0x00];
    oversized.extend(std::iter::repeat(b'A').take(1024));
    oversized.extend_from_slice(&[0xFF, 0xF0]);
    interpreter.submit_bytes(&oversized).unwrap();
    interpreter.wait_for_processing().await;

    let ttype = interpreter.plugin_manager().get_plugin::<TTypePlugin>().unwrap();
    assert!(ttype.mtts().is_none());
}

/// MSSP's static table is pushed once the option becomes active.
#[tokio::test]
async fn mssp_sends_table_once_active() {
    let (negotiation, _lines) = captured();
    let config = MsspConfig::new().with("NAME", || MsspValue::scalar("Example MUD"));
    let interpreter = TelnetInterpreterBuilder::new(Mode::Server)
        .register(Box::new(MsspPlugin::new(config)))
        .unwrap()
        .on_negotiation({
            let negotiation = negotiation.clone();
            move |bytes: &[u8]| negotiation.lock().unwrap().extend_from_slice(bytes)
        })
        .build()
        .unwrap();

    // Client asks the server to enable MSSP.
    interpreter.submit_bytes(&[0xFF, 0xFD, 70]).unwrap();
    interpreter.wait_for_processing().await;

    let sent = negotiation.lock().unwrap().clone();
    assert!(sent.windows(4).any(|w| w == [0xFF, 0xFB, 70, 1]));
    assert!(sent.windows(4).any(|w| w == *b"NAME"));
}

/// MSSP booleans and integers encode per `spec.md` §4.5 ("1"/"0", decimal)
/// rather than whatever string a caller happened to pass in.
#[tokio::test]
async fn mssp_typed_producers_encode_booleans_and_integers() {
    let (negotiation, _lines) = captured();
    let config = MsspConfig::new()
        .with("ANSI", || MsspValue::Boolean(true))
        .with("PLAYERS", || MsspValue::Integer(7));
    let interpreter = TelnetInterpreterBuilder::new(Mode::Server)
        .register(Box::new(MsspPlugin::new(config)))
        .unwrap()
        .on_negotiation({
            let negotiation = negotiation.clone();
            move |bytes: &[u8]| negotiation.lock().unwrap().extend_from_slice(bytes)
        })
        .build()
        .unwrap();

    interpreter.submit_bytes(&[0xFF, 0xFD, 70]).unwrap();
    interpreter.wait_for_processing().await;

    let sent = negotiation.lock().unwrap().clone();
    let mssp_val = mudtel_codec::consts::marker::MSSP_VAL;
    assert!(sent.windows(6).any(|w| w == [b'A', b'N', b'S', b'I', mssp_val, b'1']));
    assert!(sent.windows(9).any(|w| w == [b'P', b'L', b'A', b'Y', b'E', b'R', b'S', mssp_val, b'7']));
}

/// NEW-ENVIRON answers a bare `SEND` with entries sourced from the process
/// environment.
#[tokio::test]
async fn new_environ_answers_send_from_process_env() {
    std::env::set_var("LANG", "en_US.UTF-8");
    let (negotiation, _lines) = captured();
    let interpreter = TelnetInterpreterBuilder::new(Mode::Client)
        .register(Box::new(NewEnvironPlugin::new()))
        .unwrap()
        .on_negotiation({
            let negotiation = negotiation.clone();
            move |bytes: &[u8]| negotiation.lock().unwrap().extend_from_slice(bytes)
        })
        .build()
        .unwrap();

    // Server sends a bare SEND (empty name list).
    interpreter.submit_bytes(&[0xFF, 0xFA, 39, 0x01, 0xFF, 0xF0]).unwrap();
    interpreter.wait_for_processing().await;

    let sent = negotiation.lock().unwrap().clone();
    assert!(sent.windows(4).any(|w| w == *b"LANG"));
}

/// ECHO and SUPPRESS-GA offer `WILL` as soon as a server-mode interpreter
/// is built.
#[tokio::test]
async fn echo_offers_will_at_server_startup() {
    let (negotiation, _lines) = captured();
    let _interpreter = TelnetInterpreterBuilder::new(Mode::Server)
        .register(Box::new(EchoPlugin::new()))
        .unwrap()
        .on_negotiation({
            let negotiation = negotiation.clone();
            move |bytes: &[u8]| negotiation.lock().unwrap().extend_from_slice(bytes)
        })
        .build()
        .unwrap();

    assert_eq!(&negotiation.lock().unwrap()[..], &[0xFF, 0xFB, 1]);
}

/// A plugin whose `on_subnegotiation` always panics, to exercise the
/// pipeline's panic recovery.
struct PanicsOnSubnegotiation;

impl OptionPlugin for PanicsOnSubnegotiation {
    fn option(&self) -> mudtel_codec::TelnetOption {
        mudtel_codec::TelnetOption::Gmcp
    }

    fn name(&self) -> &'static str {
        "panics-on-subneg"
    }

    fn on_subnegotiation(&self, _ctx: &PluginContext, _payload: &[u8]) {
        panic!("boom");
    }

    fn as_any(&self) -> &dyn Any {
        self
    }
}

/// A plugin hook panic is caught, logged, and recovers the session rather
/// than killing the pipeline's consumer task (`spec.md` §4.1, §7).
#[tokio::test]
async fn plugin_panic_is_caught_and_session_keeps_processing() {
    let (negotiation, _lines) = captured();
    let interpreter = TelnetInterpreterBuilder::new(Mode::Server)
        .register(Box::new(PanicsOnSubnegotiation))
        .unwrap()
        .register(Box::new(MsdpPlugin::new(vec![], vec![], vec![])))
        .unwrap()
        .register(Box::new(NawsPlugin::new()))
        .unwrap()
        .on_negotiation({
            let negotiation = negotiation.clone();
            move |bytes: &[u8]| negotiation.lock().unwrap().extend_from_slice(bytes)
        })
        .build()
        .unwrap();

    let mut boom = vec![0xFF, 0xFA, 201];
    boom.extend_from_slice(br#"Core.Hello {"client":"T"}"#);
    boom.extend_from_slice(&[0xFF, 0xF0]);
    interpreter.submit_bytes(&boom).unwrap();
    interpreter.wait_for_processing().await;

    // The pipeline survived the panic — a later, unrelated option still
    // negotiates and dispatches normally.
    interpreter.submit_bytes(&[0xFF, 0xFB, 31]).unwrap();
    interpreter
        .submit_bytes(&[0xFF, 0xFA, 31, 0x00, 0x50, 0x00, 0x18, 0xFF, 0xF0])
        .unwrap();
    interpreter.wait_for_processing().await;

    let naws = interpreter.plugin_manager().get_plugin::<NawsPlugin>().unwrap();
    assert_eq!(naws.window_size().cols, 80);
    assert_eq!(naws.window_size().rows, 24);
}
