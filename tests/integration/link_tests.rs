//! Integration tests: LinkClient → LoopbackTransport → engine → RtCore.

use diogate::app::ports::PortBank;
use diogate::error::{Error, LinkError, ReturnCode};
use diogate::pins::BankLayout;
use diogate::port::CounterConfig;
use diogate::rpc::codec;
use diogate::rpc::transport::Transport;

use crate::mock_hw::SimBank;

fn fast_counter() -> CounterConfig {
    CounterConfig {
        count_on_high: true,
        min_pulse_width: 1,
        max_pulse_count: 3,
    }
}

#[test]
fn counts_travel_over_the_link() {
    let mut bank = SimBank::new(BankLayout::Dido);
    bank.client.configure_counter(2, &fast_counter()).unwrap();
    bank.hold(2, false, 4);
    for _ in 0..4 {
        bank.pulse(2, 4);
    }
    // Maximum of 3 wraps the fourth pulse back to 1.
    assert_eq!(bank.client.read_count(2).unwrap(), 1);

    bank.client.reset_count(2, 7).unwrap();
    assert_eq!(bank.client.read_count(2).unwrap(), 7);
}

#[test]
fn on_time_rolls_into_whole_seconds() {
    let mut bank = SimBank::new(BankLayout::Dido);
    bank.client.configure_counter(0, &fast_counter()).unwrap();
    bank.hold(0, false, 5);
    // Settles on the third sample, then accumulates 2 x RT_TICKS samples.
    bank.hold(0, true, 23);
    assert_eq!(bank.client.read_on_time(0).unwrap(), 2);
}

#[test]
fn levels_are_reported_per_input() {
    let mut bank = SimBank::new(BankLayout::Dido);
    for pin in 0..4 {
        bank.client.configure_counter(pin, &fast_counter()).unwrap();
    }
    bank.inputs[1].set(true);
    bank.inputs[3].set(true);
    bank.run(4);
    assert_eq!(bank.client.read_levels().unwrap().as_slice(), &[false, true, false, true]);
    assert!(bank.client.read_level(3).unwrap());
}

#[test]
fn unknown_pin_is_rejected() {
    let mut bank = SimBank::new(BankLayout::Dio);
    let err = bank.client.read_count(9).unwrap_err();
    assert_eq!(err, Error::Link(LinkError::Rejected(ReturnCode::InvalidPin)));

    // Output pins have no counter.
    let err = bank.client.read_count(2).unwrap_err();
    assert_eq!(err, Error::Link(LinkError::Rejected(ReturnCode::InvalidPin)));
}

#[test]
fn version_round_trips() {
    let mut bank = SimBank::new(BankLayout::Dio);
    assert_eq!(bank.client.read_version().unwrap(), "1.4.0");
}

#[test]
fn unknown_request_code_is_answered() {
    let mut bank = SimBank::new(BankLayout::Dido);
    let transport = bank.client.transport_mut();

    let mut request = Vec::new();
    request.extend_from_slice(&42u32.to_ne_bytes());
    request.extend_from_slice(&0u32.to_ne_bytes());
    transport.write(&request).unwrap();
    assert!(transport.available());

    let mut buf = [0u8; codec::MAX_MESSAGE_SIZE];
    let n = transport.read(&mut buf).unwrap();
    assert_eq!(
        codec::decode_response(&buf[..n]),
        Err(LinkError::Rejected(ReturnCode::UnknownRequest))
    );
}

#[test]
fn truncated_request_is_a_bad_request() {
    let mut bank = SimBank::new(BankLayout::Dido);
    let transport = bank.client.transport_mut();

    // Read-count header claiming a 4-byte body that never arrives.
    let mut request = Vec::new();
    request.extend_from_slice(&3u32.to_ne_bytes());
    request.extend_from_slice(&4u32.to_ne_bytes());
    transport.write(&request).unwrap();

    let mut buf = [0u8; codec::MAX_MESSAGE_SIZE];
    let n = transport.read(&mut buf).unwrap();
    assert_eq!(
        codec::decode_response(&buf[..n]),
        Err(LinkError::Rejected(ReturnCode::BadRequest))
    );
}
