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

//! End-to-end byte scenarios driven straight through [`TelnetFsm`], mirroring
//! the worked examples used to validate the negotiation/subnegotiation
//! framing contract.

use mudtel_codec::args::charset::CharsetMessage;
use mudtel_codec::args::gmcp::GmcpMessage;
use mudtel_codec::args::naws::WindowSize;
use mudtel_codec::{FsmEvent, NegotiationPolicy, TelnetFrame, TelnetFsm, TelnetOption, TelnetSide};

struct SupportsEchoAndMud;
impl NegotiationPolicy for SupportsEchoAndMud {
    fn supports(&self, option: TelnetOption) -> bool {
        matches!(
            option,
            TelnetOption::Echo | TelnetOption::Naws | TelnetOption::Gmcp | TelnetOption::Charset
        )
    }
}

fn run(bytes: &[u8]) -> Vec<FsmEvent> {
    let mut fsm = TelnetFsm::new();
    let mut events = Vec::new();
    for &b in bytes {
        fsm.step(b, &SupportsEchoAndMud, &mut events).unwrap();
    }
    events
}

/// Server accepts `DO ECHO`, having already offered `WILL ECHO` at startup
/// (ECHO is server-initiated per the plugin's startup behavior) — the `DO`
/// confirms a pending offer, so no further frame is sent.
#[test]
fn s1_server_accepts_do_echo() {
    let mut fsm = TelnetFsm::new();
    assert_eq!(fsm.request_will(TelnetOption::Echo), Some(TelnetFrame::Will(TelnetOption::Echo)));

    let mut events = Vec::new();
    for &b in &[0xFFu8, 0xFD, 0x01] {
        fsm.step(b, &SupportsEchoAndMud, &mut events).unwrap();
    }
    assert_eq!(events, vec![FsmEvent::OptionActive { option: TelnetOption::Echo, side: TelnetSide::Local }]);
    assert!(fsm.is_active(TelnetOption::Echo, TelnetSide::Local));
}

/// Client responds to `WILL ECHO` with `DO ECHO`.
#[test]
fn s2_client_responds_to_will_echo() {
    let events = run(&[0xFF, 0xFB, 0x01]);
    assert_eq!(
        events,
        vec![
            FsmEvent::NegotiationSent(TelnetFrame::Do(TelnetOption::Echo)),
            FsmEvent::OptionActive { option: TelnetOption::Echo, side: TelnetSide::Remote },
        ]
    );
}

/// NAWS size update: width=80, height=24.
#[test]
fn s3_naws_size_update() {
    let events = run(&[0xFF, 0xFA, 0x1F, 0x00, 0x50, 0x00, 0x18, 0xFF, 0xF0]);
    let mut payload = Vec::new();
    for event in &events {
        if let FsmEvent::SubnegotiationByte { option: TelnetOption::Naws, byte } = event {
            payload.push(*byte);
        }
    }
    assert!(matches!(events.last(), Some(FsmEvent::SubnegotiationEnd { option: TelnetOption::Naws })));
    let size = WindowSize::decode(&mut &payload[..]).unwrap();
    assert_eq!(size, WindowSize::new(80, 24));
}

/// GMCP round-trip: `Core.Hello {"client":"T"}`.
#[test]
fn s4_gmcp_round_trip() {
    let mut bytes = vec![0xFF, 0xFA, 0xC9];
    bytes.extend_from_slice(br#"Core.Hello {"client":"T"}"#);
    bytes.extend_from_slice(&[0xFF, 0xF0]);
    let events = run(&bytes);

    let mut payload = Vec::new();
    for event in &events {
        if let FsmEvent::SubnegotiationByte { option: TelnetOption::Gmcp, byte } = event {
            payload.push(*byte);
        }
    }
    let msg = GmcpMessage::parse(&payload).unwrap();
    assert_eq!(msg.package(), "Core.Hello");
    assert_eq!(msg.data(), Some(r#"{"client":"T"}"#));
}

/// GMCP oversize payload: the codec layer itself has no cap (that is the
/// engine's accumulation-buffer job per `spec.md` §4.3) — this test only
/// confirms the FSM stays well-formed and returns to `Accepting` after an
/// unusually large subnegotiation, which the engine then truncates.
#[test]
fn s5_oversized_subnegotiation_still_ends_cleanly() {
    let mut bytes = vec![0xFF, 0xFA, 0xC9];
    bytes.extend(std::iter::repeat(b'A').take(9000));
    bytes.extend_from_slice(&[0xFF, 0xF0]);
    let mut fsm = TelnetFsm::new();
    let mut events = Vec::new();
    for &b in &bytes {
        fsm.step(b, &SupportsEchoAndMud, &mut events).unwrap();
    }
    assert_eq!(fsm.state(), mudtel_codec::State::Accepting);
    assert_eq!(
        events.iter().filter(|e| matches!(e, FsmEvent::SubnegotiationByte { .. })).count(),
        9000
    );
}

/// CHARSET negotiation: A offers "UTF-8"/"ISO-8859-1", B accepts "UTF-8".
#[test]
fn s6_charset_negotiation_offer_and_accept() {
    let mut offer_bytes = vec![0xFF, 0xFA, 0x2A, 0x01, b' '];
    offer_bytes.extend_from_slice(b"UTF-8 ISO-8859-1");
    offer_bytes.extend_from_slice(&[0xFF, 0xF0]);

    let events = run(&offer_bytes);
    let mut payload = Vec::new();
    for event in &events {
        if let FsmEvent::SubnegotiationByte { option: TelnetOption::Charset, byte } = event {
            payload.push(*byte);
        }
    }
    let offer = CharsetMessage::decode(&payload).unwrap();
    match offer {
        CharsetMessage::Request { names, .. } => {
            assert!(names.iter().any(|n| n == "UTF-8"));
            assert!(names.iter().any(|n| n == "ISO-8859-1"));
        }
        _ => panic!("expected a Request"),
    }

    let accept = CharsetMessage::Accepted("UTF-8".into());
    assert_eq!(&accept.encode()[..], &b"\x02UTF-8"[..]);
}
