//! Integration tests: output functions on the DIO bank, end to end.

use diogate::app::commands::AppCommand;
use diogate::app::events::AppEvent;
use diogate::app::service::GatewayService;
use diogate::config::GatewayConfig;
use diogate::pins::BankLayout;
use diogate::reconcile::PropertyStatus;

use crate::mock_hw::{RT_TICKS, RecordingSink, SimBank};

const HOLD: u32 = 5;

fn gateway() -> (GatewayService, SimBank, RecordingSink) {
    (
        GatewayService::new(GatewayConfig::for_bank(BankLayout::Dio)),
        SimBank::new(BankLayout::Dio),
        RecordingSink::new(),
    )
}

fn apply(svc: &mut GatewayService, bank: &mut SimBank, sink: &mut RecordingSink, json: &str) -> PropertyStatus {
    svc.handle_command(AppCommand::ApplyDesired(json.as_bytes().to_vec()), &mut bank.client, sink);
    match sink.events.last() {
        Some(AppEvent::PropertiesReported { status, .. }) => *status,
        other => panic!("expected a property report, got {:?}", other),
    }
}

#[test]
fn interlock_follows_the_input_and_reports_status() {
    let (mut svc, mut bank, mut sink) = gateway();
    let status = apply(
        &mut svc,
        &mut bank,
        &mut sink,
        r#"{
            "FunctionType_DI1": "PulseCounter",
            "MinPulseWidth_DI1": 1,
            "FunctionType_DO1": "Relation",
            "RelationFunctionType_DO1": "Interlock",
            "RelationPort_DO1": 1,
            "IsNotify_DO1": true
        }"#,
    );
    assert_eq!(status, PropertyStatus::Ok);
    assert!(svc.dictionary().contains("DO1_Status"));

    bank.hold(0, true, HOLD);
    assert!(bank.outputs[0].get());
    svc.tick(&mut bank.client, &mut sink);
    assert_eq!(sink.last_value("DO1_Status").as_deref(), Some("1"));

    bank.hold(0, false, HOLD);
    assert!(!bank.outputs[0].get());
    svc.tick(&mut bank.client, &mut sink);
    assert_eq!(sink.last_value("DO1_Status").as_deref(), Some("0"));
}

#[test]
fn single_drive_runs_delay_then_duration() {
    let (mut svc, mut bank, mut sink) = gateway();
    let status = apply(
        &mut svc,
        &mut bank,
        &mut sink,
        r#"{"FunctionType_DO2":"Single","SingleFunctionType_DO2":"Drive","DriveDelay_DO2":1,"DriveSeconds_DO2":2}"#,
    );
    assert_eq!(status, PropertyStatus::Ok);

    // Configuring a single drive starts it.
    bank.run(RT_TICKS);
    assert!(!bank.outputs[1].get(), "still inside the delay");
    bank.run(1);
    assert!(bank.outputs[1].get());
    bank.run(RT_TICKS);
    assert!(!bank.outputs[1].get(), "duration elapsed");

    svc.handle_command(AppCommand::WriteOutput { port: 2, level: true }, &mut bank.client, &mut sink);
    assert_eq!(sink.events.last(), Some(&AppEvent::OutputWritten { port: 2, level: true }));
    bank.run(RT_TICKS + 1);
    assert!(bank.outputs[1].get());
}

#[test]
fn unselected_output_takes_manual_writes() {
    let (mut svc, mut bank, mut sink) = gateway();
    svc.handle_command(AppCommand::WriteOutput { port: 1, level: true }, &mut bank.client, &mut sink);
    bank.run(1);
    assert!(bank.outputs[0].get());

    svc.handle_command(AppCommand::WriteOutput { port: 1, level: false }, &mut bank.client, &mut sink);
    bank.run(1);
    assert!(!bank.outputs[0].get());
}

#[test]
fn relation_drive_fires_on_every_nth_edge() {
    let (mut svc, mut bank, mut sink) = gateway();
    let status = apply(
        &mut svc,
        &mut bank,
        &mut sink,
        r#"{
            "FunctionType_DI1": "PulseCounter",
            "MinPulseWidth_DI1": 1,
            "FunctionType_DO1": "Relation",
            "RelationFunctionType_DO1": "Drive",
            "RelationPort_DO1": 1,
            "DIPulseCountTrigger_DO1": 2,
            "DriveSeconds_DO1": 1
        }"#,
    );
    assert_eq!(status, PropertyStatus::Ok);

    bank.hold(0, false, HOLD);
    bank.pulse(0, HOLD);
    assert!(!bank.outputs[0].get(), "first edge only counts towards the trigger");
    bank.pulse(0, HOLD);
    assert!(bank.outputs[0].get());
    bank.run(HOLD);
    assert!(!bank.outputs[0].get(), "drive duration elapsed");
}

#[test]
fn deselecting_an_output_returns_it_to_idle() {
    let (mut svc, mut bank, mut sink) = gateway();
    apply(
        &mut svc,
        &mut bank,
        &mut sink,
        r#"{"FunctionType_DO1":"Single","SingleFunctionType_DO1":"PWM","PulseCycle_DO1":1,"PWMDutyCycle_DO1":100}"#,
    );
    bank.run(2);
    assert!(bank.outputs[0].get());

    let status = apply(&mut svc, &mut bank, &mut sink, r#"{"FunctionType_DO1":"NotSelected"}"#);
    assert_eq!(status, PropertyStatus::Ok);
    bank.run(1);
    assert!(!bank.outputs[0].get());
}

#[test]
fn out_of_range_duty_still_applies_its_siblings() {
    let (mut svc, mut bank, mut sink) = gateway();
    let status = apply(
        &mut svc,
        &mut bank,
        &mut sink,
        r#"{"FunctionType_DO1":"Single","SingleFunctionType_DO1":"PWM","PWMDutyCycle_DO1":150,"PulseCycle_DO1":2,"IsNotify_DO1":true}"#,
    );
    assert_eq!(status, PropertyStatus::IllegalProperty);
    match sink.events.last() {
        Some(AppEvent::PropertiesReported { acks, .. }) => {
            assert!(acks.iter().all(|a| a.name != "PWMDutyCycle_DO1"));
            assert!(acks.iter().any(|a| a.name == "PulseCycle_DO1"));
            assert!(acks.iter().any(|a| a.name == "IsNotify_DO1"));
        }
        other => panic!("expected a property report, got {:?}", other),
    }

    let config = &svc.manager().output_items()[0].config;
    assert_eq!(config.cycle_secs, 2);
    assert_eq!(config.duty_percent, 50, "rejected duty keeps the default");
    assert!(svc.dictionary().contains("DO1_Status"));

    // The wave runs with the default duty: high for the first half cycle.
    bank.run(2);
    assert!(bank.outputs[0].get());
    bank.run(RT_TICKS);
    assert!(!bank.outputs[0].get());
}
