//! Integration tests: desired document → GatewayService → link → RtCore →
//! telemetry.

use diogate::app::commands::AppCommand;
use diogate::app::events::AppEvent;
use diogate::app::ports::PortBank;
use diogate::app::service::GatewayService;
use diogate::config::GatewayConfig;
use diogate::pins::BankLayout;
use diogate::reconcile::{AckValue, PropertyStatus};

use crate::mock_hw::{RecordingSink, SimBank};

/// Debounce width used by the documents below, in real-time ticks.
const WIDTH: u32 = 2;
/// Long enough for a level to settle at `WIDTH`.
const HOLD: u32 = WIDTH + 3;

fn gateway(layout: BankLayout) -> (GatewayService, SimBank, RecordingSink) {
    let config = GatewayConfig {
        watch_min_pulse_width: WIDTH,
        ..GatewayConfig::for_bank(layout)
    };
    (GatewayService::new(config), SimBank::new(layout), RecordingSink::new())
}

fn apply(svc: &mut GatewayService, bank: &mut SimBank, sink: &mut RecordingSink, json: &str) -> (PropertyStatus, usize) {
    svc.handle_command(AppCommand::ApplyDesired(json.as_bytes().to_vec()), &mut bank.client, sink);
    match sink.events.last() {
        Some(AppEvent::PropertiesReported { status, acks }) => (*status, acks.len()),
        other => panic!("expected a property report, got {:?}", other),
    }
}

// ── Pulse counting ────────────────────────────────────────────

#[test]
fn counted_pulses_are_reported_on_the_interval() {
    let (mut svc, mut bank, mut sink) = gateway(BankLayout::Dido);
    let (status, acks) = apply(
        &mut svc,
        &mut bank,
        &mut sink,
        r#"{"Counter_DIDO1":true,"cntInterval_DIDO1":2,"cntMinPulseWidth_DIDO1":2}"#,
    );
    assert_eq!(status, PropertyStatus::Ok);
    assert_eq!(acks, 3);

    bank.hold(0, false, HOLD);
    for _ in 0..3 {
        bank.pulse(0, HOLD);
    }

    svc.tick(&mut bank.client, &mut sink);
    assert_eq!(sink.last_value("DIDO1_count"), None, "interval not yet elapsed");
    svc.tick(&mut bank.client, &mut sink);
    assert_eq!(sink.last_value("DIDO1_count").as_deref(), Some("3"));
}

#[test]
fn glitches_shorter_than_the_width_are_ignored() {
    let (mut svc, mut bank, mut sink) = gateway(BankLayout::Dido);
    apply(&mut svc, &mut bank, &mut sink, r#"{"Counter_DIDO2":true,"cntMinPulseWidth_DIDO2":2}"#);

    bank.hold(1, false, HOLD);
    bank.pulse(1, 1);
    bank.pulse(1, 2);
    bank.pulse(1, HOLD);

    svc.tick(&mut bank.client, &mut sink);
    assert_eq!(sink.last_value("DIDO2_count").as_deref(), Some("1"));
}

#[test]
fn interval_change_keeps_the_count_but_polarity_change_resets_it() {
    let (mut svc, mut bank, mut sink) = gateway(BankLayout::Dido);
    apply(&mut svc, &mut bank, &mut sink, r#"{"Counter_DIDO1":true,"cntMinPulseWidth_DIDO1":2}"#);
    bank.hold(0, false, HOLD);
    bank.pulse(0, HOLD);
    bank.pulse(0, HOLD);

    apply(&mut svc, &mut bank, &mut sink, r#"{"cntInterval_DIDO1":1}"#);
    svc.tick(&mut bank.client, &mut sink);
    assert_eq!(sink.last_value("DIDO1_count").as_deref(), Some("2"));

    apply(&mut svc, &mut bank, &mut sink, r#"{"cntIsPulseHigh_DIDO1":false}"#);
    svc.tick(&mut bank.client, &mut sink);
    assert_eq!(sink.last_value("DIDO1_count").as_deref(), Some("0"));
}

#[test]
fn unrelated_update_keeps_a_pulse_inside_its_debounce_window() {
    let (mut svc, mut bank, mut sink) = gateway(BankLayout::Dido);
    apply(&mut svc, &mut bank, &mut sink, r#"{"Counter_DIDO1":true,"cntMinPulseWidth_DIDO1":3}"#);
    bank.hold(0, false, 6);
    bank.hold(0, true, 2);

    let (status, _) = apply(&mut svc, &mut bank, &mut sink, r#"{"Polling_DIDO4":true}"#);
    assert_eq!(status, PropertyStatus::Ok);

    bank.hold(0, true, 6);
    bank.hold(0, false, 6);
    svc.tick(&mut bank.client, &mut sink);
    assert_eq!(sink.last_value("DIDO1_count").as_deref(), Some("1"));
}

#[test]
fn interval_change_keeps_on_time_accumulating() {
    let (mut svc, mut bank, mut sink) = gateway(BankLayout::Dido);
    apply(&mut svc, &mut bank, &mut sink, r#"{"Counter_DIDO1":true,"cntMinPulseWidth_DIDO1":1}"#);
    bank.hold(0, false, 5);
    bank.hold(0, true, 5);

    apply(&mut svc, &mut bank, &mut sink, r#"{"cntInterval_DIDO1":5}"#);
    bank.hold(0, true, 50);

    // 2 settled samples before the update, 50 after, at RT_TICKS per second.
    assert_eq!(bank.client.read_on_time(0).unwrap(), 5);
    assert_eq!(bank.client.read_count(0).unwrap(), 1);
}

// ── Polling and edges ─────────────────────────────────────────

#[test]
fn polling_applies_active_polarity() {
    let (mut svc, mut bank, mut sink) = gateway(BankLayout::Dido);
    apply(
        &mut svc,
        &mut bank,
        &mut sink,
        r#"{"Polling_DIDO3":true,"PollingActiveHigh_DIDO3":false}"#,
    );

    svc.tick(&mut bank.client, &mut sink);
    assert_eq!(sink.last_value("DIDO3_PollingStatus").as_deref(), Some("1"));

    bank.inputs[2].set(true);
    svc.tick(&mut bank.client, &mut sink);
    assert_eq!(sink.last_value("DIDO3_PollingStatus").as_deref(), Some("0"));
}

#[test]
fn each_edge_is_reported_once() {
    let (mut svc, mut bank, mut sink) = gateway(BankLayout::Dido);
    apply(&mut svc, &mut bank, &mut sink, r#"{"Edge_DIDO2":true}"#);
    bank.hold(1, false, HOLD);

    svc.tick(&mut bank.client, &mut sink);
    assert!(sink.telemetry().next().is_none());

    bank.pulse(1, HOLD);
    svc.tick(&mut bank.client, &mut sink);
    assert_eq!(sink.last_value("DIDO2_EdgeEvent").as_deref(), Some("1"));

    sink.clear();
    svc.tick(&mut bank.client, &mut sink);
    assert!(sink.telemetry().next().is_none());
}

#[test]
fn unrelated_update_keeps_a_pending_edge() {
    let (mut svc, mut bank, mut sink) = gateway(BankLayout::Dido);
    apply(&mut svc, &mut bank, &mut sink, r#"{"Edge_DIDO2":true}"#);
    bank.hold(1, false, HOLD);
    bank.hold(1, true, WIDTH);

    apply(&mut svc, &mut bank, &mut sink, r#"{"Polling_DIDO4":true}"#);
    bank.hold(1, true, HOLD);
    bank.hold(1, false, HOLD);

    svc.tick(&mut bank.client, &mut sink);
    assert_eq!(sink.last_value("DIDO2_EdgeEvent").as_deref(), Some("1"));
}

// ── Rejections ────────────────────────────────────────────────

#[test]
fn conflicting_update_keeps_the_running_configuration() {
    let (mut svc, mut bank, mut sink) = gateway(BankLayout::Dido);
    apply(&mut svc, &mut bank, &mut sink, r#"{"Counter_DIDO1":true,"cntMinPulseWidth_DIDO1":2}"#);
    bank.hold(0, false, HOLD);
    bank.pulse(0, HOLD);

    let (status, acks) = apply(&mut svc, &mut bank, &mut sink, r#"{"Polling_DIDO1":true}"#);
    assert_eq!(status, PropertyStatus::IllegalProperty);
    assert_eq!(acks, 0);

    bank.pulse(0, HOLD);
    svc.tick(&mut bank.client, &mut sink);
    assert_eq!(sink.last_value("DIDO1_count").as_deref(), Some("2"));
    assert!(svc.dictionary().contains("DIDO1_count"));
    assert!(!svc.dictionary().contains("DIDO1_PollingStatus"));
}

#[test]
fn unknown_keys_still_apply_the_known_ones() {
    let (mut svc, mut bank, mut sink) = gateway(BankLayout::Dido);
    svc.handle_command(
        AppCommand::ApplyDesired(br#"{"desired":{"Polling_DIDO4":true,"Brightness_DIDO4":3}}"#.to_vec()),
        &mut bank.client,
        &mut sink,
    );
    match &sink.events[0] {
        AppEvent::PropertiesReported { status, acks } => {
            assert_eq!(*status, PropertyStatus::UnsupportedProperty);
            assert_eq!(acks.len(), 1);
            assert_eq!(acks[0].name, "Polling_DIDO4");
            assert_eq!(acks[0].value, AckValue::Bool(true));
        }
        other => panic!("unexpected {:?}", other),
    }
    assert!(svc.dictionary().contains("DIDO4_PollingStatus"));
}

#[test]
fn version_comes_from_the_real_time_core() {
    let (mut svc, mut bank, mut sink) = gateway(BankLayout::Dido);
    svc.handle_command(AppCommand::QueryVersion, &mut bank.client, &mut sink);
    assert_eq!(sink.events, [AppEvent::Version("1.4.0".into())]);
}
