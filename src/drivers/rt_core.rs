//! Real-time core: owns the I/O pins and runs the per-tick sampling loop.
//!
//! ```text
//!   tick() ──▶ sample every input ──▶ PulseCounter::step
//!          └─▶ advance every output ──▶ DriveSequencer::step ──▶ pin
//!   handle(request) ──▶ counter / sequencer / pin ──▶ response body
//! ```
//!
//! Generic over `embedded_hal::digital` pins so the same loop runs on the
//! target and against simulated pins in host tests.

use embedded_hal::digital::{InputPin, OutputPin, PinState};
use heapless::Vec;
use log::{debug, warn};

use crate::config::GatewayConfig;
use crate::drivers::output_drive::{DriveSequencer, RelationInput};
use crate::drivers::pulse_counter::{PulseCounter, SettledEdge};
use crate::error::{PinError, ReturnCode};
use crate::pins::{BankLayout, MAX_PINS, PortIndex, PortKind};
use crate::port::{CounterConfig, DriveConfig};
use crate::rpc::codec::{Request, ResponseBody};

struct InputChannel<I> {
    pin_id: u32,
    pin: I,
    counter: PulseCounter,
    last_edge: Option<SettledEdge>,
}

struct OutputChannel<O> {
    pin_id: u32,
    pin: O,
    sequencer: DriveSequencer,
    written: Option<bool>,
}

pub struct RtCore<I, O> {
    inputs: Vec<InputChannel<I>, MAX_PINS>,
    outputs: Vec<OutputChannel<O>, MAX_PINS>,
    ticks_per_second: u32,
    version: &'static str,
}

impl<I: InputPin, O: OutputPin> RtCore<I, O> {
    pub fn new(ticks_per_second: u32, version: &'static str) -> Self {
        Self {
            inputs: Vec::new(),
            outputs: Vec::new(),
            ticks_per_second,
            version,
        }
    }

    /// Build a core with pins wired per `layout`: inputs first, then outputs.
    pub fn for_bank(
        layout: BankLayout,
        ticks_per_second: u32,
        version: &'static str,
        inputs: impl IntoIterator<Item = I>,
        outputs: impl IntoIterator<Item = O>,
    ) -> Result<Self, PinError> {
        let mut core = Self::new(ticks_per_second, version);
        for (index, pin) in inputs.into_iter().enumerate() {
            let port = PortIndex::new(layout, PortKind::Input, index).ok_or(PinError::InvalidPin(index as u32))?;
            core.add_input(layout.input_pin(port), pin)?;
        }
        for (index, pin) in outputs.into_iter().enumerate() {
            let port = PortIndex::new(layout, PortKind::Output, index).ok_or(PinError::InvalidPin(index as u32))?;
            core.add_output(layout.output_pin(port), pin)?;
        }
        Ok(core)
    }

    /// Build a core for the bank and sampling rate named in `config`.
    pub fn from_config(
        config: &GatewayConfig,
        version: &'static str,
        inputs: impl IntoIterator<Item = I>,
        outputs: impl IntoIterator<Item = O>,
    ) -> Result<Self, PinError> {
        Self::for_bank(config.bank, config.rt_ticks_per_second, version, inputs, outputs)
    }

    pub fn add_input(&mut self, pin_id: u32, pin: I) -> Result<(), PinError> {
        if self.has_pin(pin_id) {
            return Err(PinError::InvalidPin(pin_id));
        }
        self.inputs
            .push(InputChannel {
                pin_id,
                pin,
                counter: PulseCounter::new(self.ticks_per_second),
                last_edge: None,
            })
            .map_err(|_| PinError::InvalidPin(pin_id))
    }

    pub fn add_output(&mut self, pin_id: u32, pin: O) -> Result<(), PinError> {
        if self.has_pin(pin_id) {
            return Err(PinError::InvalidPin(pin_id));
        }
        self.outputs
            .push(OutputChannel {
                pin_id,
                pin,
                sequencer: DriveSequencer::new(self.ticks_per_second),
                written: None,
            })
            .map_err(|_| PinError::InvalidPin(pin_id))
    }

    fn has_pin(&self, pin_id: u32) -> bool {
        self.inputs.iter().any(|c| c.pin_id == pin_id) || self.outputs.iter().any(|c| c.pin_id == pin_id)
    }

    // ── sampling loop ─────────────────────────────────────────

    /// One real-time tick: sample inputs, then advance outputs.
    pub fn tick(&mut self) {
        for ch in &mut self.inputs {
            ch.last_edge = match ch.pin.is_high() {
                Ok(raw) => ch.counter.step(raw),
                Err(e) => {
                    debug!("input pin {} read failed: {:?}", ch.pin_id, e);
                    None
                }
            };
        }

        let inputs = &self.inputs;
        for ch in &mut self.outputs {
            let relation = ch
                .sequencer
                .config()
                .relation_pin
                .and_then(|p| inputs.iter().find(|i| i.pin_id == p))
                .map(|i| RelationInput {
                    level: i.counter.level(),
                    edge: i.last_edge,
                })
                .unwrap_or_default();

            let level = ch.sequencer.step(&relation);
            if ch.written != Some(level) {
                match ch.pin.set_state(PinState::from(level)) {
                    Ok(()) => ch.written = Some(level),
                    Err(e) => warn!("output pin {} write failed: {:?}", ch.pin_id, e),
                }
            }
        }
    }

    // ── operations ────────────────────────────────────────────

    fn input(&mut self, pin: u32) -> Result<&mut InputChannel<I>, PinError> {
        self.inputs
            .iter_mut()
            .find(|c| c.pin_id == pin)
            .ok_or(PinError::InvalidPin(pin))
    }

    fn output(&mut self, pin: u32) -> Result<&mut OutputChannel<O>, PinError> {
        self.outputs
            .iter_mut()
            .find(|c| c.pin_id == pin)
            .ok_or(PinError::InvalidPin(pin))
    }

    pub fn configure_counter(&mut self, pin: u32, config: CounterConfig) -> Result<(), PinError> {
        self.input(pin)?.counter.configure(config);
        Ok(())
    }

    pub fn reset_count(&mut self, pin: u32, init: u32) -> Result<(), PinError> {
        self.input(pin)?.counter.clear(init);
        Ok(())
    }

    pub fn count(&mut self, pin: u32) -> Result<u32, PinError> {
        Ok(self.input(pin)?.counter.count())
    }

    pub fn on_time(&mut self, pin: u32) -> Result<u32, PinError> {
        Ok(self.input(pin)?.counter.on_time_secs())
    }

    /// Settled level of every input, in pin order of registration.
    pub fn levels(&self) -> Vec<bool, MAX_PINS> {
        self.inputs.iter().map(|c| c.counter.level()).collect()
    }

    /// Current level of one pin: a fresh sample for inputs, the driven
    /// level for outputs.
    pub fn pin_level(&mut self, pin: u32) -> Result<bool, PinError> {
        if let Some(ch) = self.inputs.iter_mut().find(|c| c.pin_id == pin) {
            return ch.pin.is_high().map_err(|e| {
                debug!("input pin {} read failed: {:?}", pin, e);
                PinError::Hardware
            });
        }
        Ok(self.output(pin)?.sequencer.level())
    }

    pub fn write_level(&mut self, pin: u32, level: bool) -> Result<(), PinError> {
        self.output(pin)?.sequencer.trigger(level);
        Ok(())
    }

    pub fn configure_output(&mut self, pin: u32, config: DriveConfig) -> Result<(), PinError> {
        if let Some(source) = config.relation_pin {
            if !self.inputs.iter().any(|c| c.pin_id == source) {
                return Err(PinError::InvalidPin(source));
            }
        }
        self.output(pin)?.sequencer.configure(config);
        Ok(())
    }

    pub fn version(&self) -> &'static str {
        self.version
    }

    /// Serve one decoded request.
    pub fn handle(&mut self, request: &Request) -> Result<ResponseBody, ReturnCode> {
        let result = match *request {
            Request::SetConfig { pin, config } => self.configure_counter(pin, config).map(|()| ResponseBody::Empty),
            Request::ResetCount { pin, init } => self.reset_count(pin, init).map(|()| ResponseBody::Empty),
            Request::ReadCount { pin } => self.count(pin).map(ResponseBody::Value),
            Request::ReadOnTime { pin } => self.on_time(pin).map(ResponseBody::Value),
            Request::ReadAllLevels => Ok(ResponseBody::Levels(self.levels())),
            Request::ReadPinLevel { pin } => self
                .pin_level(pin)
                .map(|level| ResponseBody::Levels(core::iter::once(level).collect())),
            Request::WritePinLevel { pin, level } => self.write_level(pin, level).map(|()| ResponseBody::Empty),
            Request::SetOutputConfig { pin, config } => {
                self.configure_output(pin, config).map(|()| ResponseBody::Empty)
            }
            Request::ReadVersion => Ok(ResponseBody::Version(self.version)),
        };
        result.map_err(|e| match e {
            PinError::InvalidPin(_) => ReturnCode::InvalidPin,
            PinError::NotConfigured(_) | PinError::Hardware => ReturnCode::BadRequest,
        })
    }
}
