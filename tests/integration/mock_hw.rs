//! Simulated hardware for integration tests.
//!
//! `SimPin` is a shared wire: the test holds one clone and drives or
//! observes it, the real-time core owns the other. `RecordingSink` keeps
//! every emitted event so tests can assert on the full history.

use std::cell::Cell;
use std::convert::Infallible;
use std::rc::Rc;

use diogate::adapters::loopback::LoopbackTransport;
use diogate::app::events::AppEvent;
use diogate::app::ports::EventSink;
use diogate::config::GatewayConfig;
use diogate::drivers::rt_core::RtCore;
use diogate::pins::BankLayout;
use diogate::rpc::client::LinkClient;
use diogate::telemetry::TelemetryBatch;
use embedded_hal::digital::{ErrorType, InputPin, OutputPin};

/// Real-time ticks per second used by the simulated core.
pub const RT_TICKS: u32 = 10;

// ── SimPin ────────────────────────────────────────────────────

#[derive(Clone, Default)]
pub struct SimPin(Rc<Cell<bool>>);

#[allow(dead_code)]
impl SimPin {
    pub fn set(&self, level: bool) {
        self.0.set(level);
    }

    pub fn get(&self) -> bool {
        self.0.get()
    }
}

impl ErrorType for SimPin {
    type Error = Infallible;
}

impl InputPin for SimPin {
    fn is_high(&mut self) -> Result<bool, Infallible> {
        Ok(self.0.get())
    }

    fn is_low(&mut self) -> Result<bool, Infallible> {
        Ok(!self.0.get())
    }
}

impl OutputPin for SimPin {
    fn set_low(&mut self) -> Result<(), Infallible> {
        self.0.set(false);
        Ok(())
    }

    fn set_high(&mut self) -> Result<(), Infallible> {
        self.0.set(true);
        Ok(())
    }
}

// ── Simulated bank ────────────────────────────────────────────

pub type SimClient = LinkClient<LoopbackTransport<SimPin, SimPin>>;

/// Link client wired to an in-process real-time core, plus the test's end
/// of every input and output wire.
pub struct SimBank {
    pub client: SimClient,
    pub inputs: Vec<SimPin>,
    pub outputs: Vec<SimPin>,
}

#[allow(dead_code)]
impl SimBank {
    pub fn new(layout: BankLayout) -> Self {
        let inputs: Vec<SimPin> = (0..layout.inputs()).map(|_| SimPin::default()).collect();
        let outputs: Vec<SimPin> = (0..layout.outputs()).map(|_| SimPin::default()).collect();
        let config = GatewayConfig {
            rt_ticks_per_second: RT_TICKS,
            ..GatewayConfig::for_bank(layout)
        };
        let core = RtCore::from_config(&config, "1.4.0", inputs.clone(), outputs.clone()).expect("pins fit the bank");
        Self {
            client: LinkClient::new(LoopbackTransport::new(core)),
            inputs,
            outputs,
        }
    }

    /// Advance the real-time core by `ticks` samples.
    pub fn run(&mut self, ticks: u32) {
        for _ in 0..ticks {
            self.client.transport_mut().core_mut().tick();
        }
    }

    /// Hold input `index` at `level` for `ticks` samples.
    pub fn hold(&mut self, index: usize, level: bool, ticks: u32) {
        self.inputs[index].set(level);
        self.run(ticks);
    }

    /// One full pulse on input `index`, each phase `width` samples long.
    pub fn pulse(&mut self, index: usize, width: u32) {
        self.hold(index, true, width);
        self.hold(index, false, width);
    }
}

// ── RecordingSink ─────────────────────────────────────────────

#[derive(Default)]
pub struct RecordingSink {
    pub events: Vec<AppEvent>,
}

#[allow(dead_code)]
impl RecordingSink {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn telemetry(&self) -> impl Iterator<Item = &TelemetryBatch> {
        self.events.iter().filter_map(|e| match e {
            AppEvent::Telemetry(batch) => Some(batch),
            _ => None,
        })
    }

    /// Most recent value reported under `name`.
    pub fn last_value(&self, name: &str) -> Option<String> {
        self.telemetry()
            .filter_map(|b| b.get(name))
            .last()
            .map(String::from)
    }

    pub fn clear(&mut self) {
        self.events.clear();
    }
}

impl EventSink for RecordingSink {
    fn emit(&mut self, event: &AppEvent) {
        self.events.push(event.clone());
    }
}
