//! Port function model shared by the control core and the real-time core.
//!
//! ```text
//!   input port   ──▶ InputFunction  { Unselected | PulseCounter | Edge | Polling }
//!   output port  ──▶ OutputFunction { Unselected | Single(kind) | Relation(kind) }
//! ```
//!
//! `CounterConfig` and `DriveConfig` are the per-pin settings pushed across
//! the link; both sides agree on them through [`rpc::codec`](crate::rpc::codec).

use serde::{Deserialize, Serialize};

// ───────────────────────────────────────────────────────────────
// Defaults
// ───────────────────────────────────────────────────────────────

/// Factory values restored on function change or `null` properties.
pub mod defaults {
    pub const INTERVAL_SECS: u32 = 1;
    pub const MIN_PULSE_WIDTH: u32 = 200;
    pub const MAX_PULSE_COUNT: u32 = 0x7FFF_FFFF;
    pub const COUNT_ON_HIGH: bool = true;
    pub const POLLING_ACTIVE_HIGH: bool = true;
    pub const EDGE_NOTIFY_HIGH: bool = true;

    pub const DRIVE_HIGH: bool = true;
    pub const TRIGGER_ON_HIGH: bool = true;
    pub const TRIGGER_COUNT: u32 = 1;
    pub const DRIVE_DELAY_SECS: u32 = 0;
    pub const DRIVE_SECS: u32 = 0;
    pub const PULSE_CYCLE_SECS: u32 = 1;
    pub const PWM_DUTY_PERCENT: u32 = 50;
}

// ───────────────────────────────────────────────────────────────
// Input side
// ───────────────────────────────────────────────────────────────

/// What an input port does. At most one function per port.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize, Deserialize)]
pub enum InputFunction {
    #[default]
    Unselected,
    PulseCounter,
    Edge,
    Polling,
}

impl InputFunction {
    /// Functions that can be individually switched on, in key order.
    pub const SELECTABLE: [Self; 3] = [Self::PulseCounter, Self::Edge, Self::Polling];

    /// Parse the `FunctionType` property: a variant name or its code.
    pub fn from_name(name: &str) -> Option<Self> {
        match name {
            "NotSelected" => Some(Self::Unselected),
            "PulseCounter" => Some(Self::PulseCounter),
            "Edge" => Some(Self::Edge),
            "Polling" => Some(Self::Polling),
            _ => None,
        }
    }

    pub const fn from_code(code: u64) -> Option<Self> {
        match code {
            0 => Some(Self::Unselected),
            1 => Some(Self::PulseCounter),
            2 => Some(Self::Edge),
            3 => Some(Self::Polling),
            _ => None,
        }
    }

    pub const fn is_selected(self) -> bool {
        !matches!(self, Self::Unselected)
    }
}

/// Debounced counter settings for one input pin.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub struct CounterConfig {
    /// Count rising (`true`) or falling (`false`) settled transitions.
    pub count_on_high: bool,
    /// Samples a level must hold before it is accepted.
    pub min_pulse_width: u32,
    /// Count wraps to 1 once this value is exceeded.
    pub max_pulse_count: u32,
}

impl Default for CounterConfig {
    fn default() -> Self {
        Self {
            count_on_high: defaults::COUNT_ON_HIGH,
            min_pulse_width: defaults::MIN_PULSE_WIDTH,
            max_pulse_count: defaults::MAX_PULSE_COUNT,
        }
    }
}

// ───────────────────────────────────────────────────────────────
// Output side
// ───────────────────────────────────────────────────────────────

/// Top-level output function as selected by `FunctionType_DO<n>`.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize, Deserialize)]
pub enum OutputFunctionType {
    #[default]
    NotSelected,
    Single,
    Relation,
}

impl OutputFunctionType {
    pub fn from_name(name: &str) -> Option<Self> {
        match name {
            "NotSelected" => Some(Self::NotSelected),
            "Single" => Some(Self::Single),
            "Relation" => Some(Self::Relation),
            _ => None,
        }
    }

    pub const fn from_code(code: u64) -> Option<Self> {
        match code {
            0 => Some(Self::NotSelected),
            1 => Some(Self::Single),
            2 => Some(Self::Relation),
            _ => None,
        }
    }
}

/// Stand-alone output behaviour.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub enum SingleKind {
    /// Drive once per trigger, with optional delay and duration.
    Drive,
    /// Square wave, 50 % duty.
    Pulse,
    /// Square wave with configurable duty.
    Pwm,
}

impl SingleKind {
    pub fn from_name(name: &str) -> Option<Self> {
        match name {
            "Drive" => Some(Self::Drive),
            "Pulse" => Some(Self::Pulse),
            "PWM" => Some(Self::Pwm),
            _ => None,
        }
    }

    pub const fn from_code(code: u64) -> Option<Self> {
        match code {
            1 => Some(Self::Drive),
            2 => Some(Self::Pulse),
            3 => Some(Self::Pwm),
            _ => None,
        }
    }

    pub const fn code(self) -> u32 {
        match self {
            Self::Drive => 1,
            Self::Pulse => 2,
            Self::Pwm => 3,
        }
    }
}

/// Output behaviour slaved to a digital input.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub enum RelationKind {
    /// Delay/duration drive on each qualifying input edge (or Nth count).
    Drive,
    /// Follow the input's settled level.
    Interlock,
    /// Follow the inverse of the input's settled level.
    Invert,
    /// Drive for the configured duration on each qualifying edge.
    Shape,
    /// Square wave while the input is active.
    Pulse,
    /// Duty-cycled wave while the input is active.
    Pwm,
}

impl RelationKind {
    pub fn from_name(name: &str) -> Option<Self> {
        match name {
            "Drive" => Some(Self::Drive),
            "Interlock" => Some(Self::Interlock),
            "Invert" => Some(Self::Invert),
            "Shape" => Some(Self::Shape),
            "Pulse" => Some(Self::Pulse),
            "PWM" => Some(Self::Pwm),
            _ => None,
        }
    }

    pub const fn from_code(code: u64) -> Option<Self> {
        match code {
            1 => Some(Self::Drive),
            2 => Some(Self::Interlock),
            3 => Some(Self::Invert),
            4 => Some(Self::Shape),
            5 => Some(Self::Pulse),
            6 => Some(Self::Pwm),
            _ => None,
        }
    }

    pub const fn code(self) -> u32 {
        match self {
            Self::Drive => 1,
            Self::Interlock => 2,
            Self::Invert => 3,
            Self::Shape => 4,
            Self::Pulse => 5,
            Self::Pwm => 6,
        }
    }
}

/// Fully resolved output function.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize, Deserialize)]
pub enum OutputFunction {
    #[default]
    Unselected,
    Single(SingleKind),
    Relation(RelationKind),
}

/// Everything the real-time core needs to run one output pin.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub struct DriveConfig {
    pub function: OutputFunction,
    /// Input pin a relation output follows.
    pub relation_pin: Option<u32>,
    /// Relation outputs react to this input direction.
    pub trigger_on_high: bool,
    /// Relation drive fires on every Nth qualifying input edge.
    pub trigger_count: u32,
    /// Level written while driving; the idle level is its inverse.
    pub drive_high: bool,
    pub delay_secs: u32,
    pub duration_secs: u32,
    pub cycle_secs: u32,
    pub duty_percent: u32,
}

impl DriveConfig {
    /// Level the pin rests at when not driven.
    pub const fn idle_level(&self) -> bool {
        !self.drive_high
    }
}

impl Default for DriveConfig {
    fn default() -> Self {
        Self {
            function: OutputFunction::Unselected,
            relation_pin: None,
            trigger_on_high: defaults::TRIGGER_ON_HIGH,
            trigger_count: defaults::TRIGGER_COUNT,
            drive_high: defaults::DRIVE_HIGH,
            delay_secs: defaults::DRIVE_DELAY_SECS,
            duration_secs: defaults::DRIVE_SECS,
            cycle_secs: defaults::PULSE_CYCLE_SECS,
            duty_percent: defaults::PWM_DUTY_PERCENT,
        }
    }
}
