//! Merged per-port settings and how single properties update them.

use serde_json::Value;

use crate::error::PropertyError;
use crate::pins::{BankLayout, PortIndex, PortKind};
use crate::port::{
    CounterConfig, DriveConfig, InputFunction, OutputFunction, OutputFunctionType, RelationKind, SingleKind, defaults,
};

use super::ack::AckValue;
use super::keys::{InputParam, OutputParam};
use super::value;

/// Outcome of one applied property.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct Applied {
    pub ack: AckValue,
    /// A setting that affects sampling (inputs) or driving (outputs) changed.
    pub changed: bool,
}

fn replace<T: PartialEq>(slot: &mut T, new: T) -> bool {
    let changed = *slot != new;
    *slot = new;
    changed
}

// ───────────────────────────────────────────────────────────────
// Inputs
// ───────────────────────────────────────────────────────────────

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct InputSettings {
    pub function: InputFunction,
    pub interval_secs: u32,
    pub counter: CounterConfig,
    pub edge_notify_high: bool,
    pub polling_active_high: bool,
}

impl InputSettings {
    /// Factory settings for a port running `function`.
    pub fn with_function(function: InputFunction) -> Self {
        Self {
            function,
            interval_secs: defaults::INTERVAL_SECS,
            counter: CounterConfig::default(),
            edge_notify_high: defaults::EDGE_NOTIFY_HIGH,
            polling_active_high: defaults::POLLING_ACTIVE_HIGH,
        }
    }

    /// Apply one input parameter.
    ///
    /// Parameters that belong to a function the port is not running are
    /// validated and acknowledged but leave the settings alone. Interval
    /// and polling polarity changes never require a counter reset.
    pub fn apply(&mut self, param: InputParam, raw: &Value) -> Result<Applied, PropertyError> {
        use InputFunction::{Edge, Polling, PulseCounter};

        let function = self.function;
        let applied = match param {
            InputParam::CntInterval | InputParam::PollInterval | InputParam::Interval => {
                let v = value::number(raw, value::INTERVAL_SECS)?;
                let applies = match param {
                    InputParam::CntInterval => function == PulseCounter,
                    InputParam::PollInterval => function == Polling,
                    _ => matches!(function, PulseCounter | Polling),
                };
                if applies {
                    self.interval_secs = v.unwrap_or(defaults::INTERVAL_SECS);
                }
                Applied {
                    ack: AckValue::from_num(v),
                    changed: false,
                }
            }
            InputParam::CntIsPulseHigh | InputParam::EdgeTrigger | InputParam::EdgeNotifyIsHigh => {
                let v = value::boolean(raw)?;
                let changed = match (function, param) {
                    (PulseCounter, InputParam::CntIsPulseHigh | InputParam::EdgeTrigger) => replace(
                        &mut self.counter.count_on_high,
                        v.unwrap_or(defaults::COUNT_ON_HIGH),
                    ),
                    (Edge, InputParam::EdgeTrigger | InputParam::EdgeNotifyIsHigh) => {
                        replace(&mut self.edge_notify_high, v.unwrap_or(defaults::EDGE_NOTIFY_HIGH))
                    }
                    _ => false,
                };
                Applied {
                    ack: AckValue::from_bool(v),
                    changed,
                }
            }
            InputParam::CntMinPulseWidth | InputParam::MinPulseWidth => {
                let v = value::number(raw, value::PULSE_WIDTH)?;
                let changed = function == PulseCounter
                    && replace(
                        &mut self.counter.min_pulse_width,
                        v.unwrap_or(defaults::MIN_PULSE_WIDTH),
                    );
                Applied {
                    ack: AckValue::from_num(v),
                    changed,
                }
            }
            InputParam::CntMaxPulseCount | InputParam::MaxPulseCount => {
                let v = value::number(raw, value::PULSE_COUNT)?;
                let changed = function == PulseCounter
                    && replace(
                        &mut self.counter.max_pulse_count,
                        v.unwrap_or(defaults::MAX_PULSE_COUNT),
                    );
                Applied {
                    ack: AckValue::from_num(v),
                    changed,
                }
            }
            InputParam::PollingActiveHigh => {
                let v = value::boolean(raw)?;
                if function == Polling {
                    self.polling_active_high = v.unwrap_or(defaults::POLLING_ACTIVE_HIGH);
                }
                Applied {
                    ack: AckValue::from_bool(v),
                    changed: false,
                }
            }
        };
        Ok(applied)
    }
}

impl Default for InputSettings {
    fn default() -> Self {
        Self::with_function(InputFunction::Unselected)
    }
}

// ───────────────────────────────────────────────────────────────
// Outputs
// ───────────────────────────────────────────────────────────────

/// A selected output function is missing the field it depends on.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum MissingCompanion {
    SingleKind,
    RelationKind,
    RelationPort,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct OutputSettings {
    pub function_type: OutputFunctionType,
    pub single: Option<SingleKind>,
    pub relation: Option<RelationKind>,
    pub relation_port: Option<PortIndex>,
    pub notify: bool,
    pub trigger_on_high: bool,
    pub trigger_count: u32,
    pub drive_high: bool,
    pub delay_secs: u32,
    pub duration_secs: u32,
    pub cycle_secs: u32,
    pub duty_percent: u32,
}

impl Default for OutputSettings {
    fn default() -> Self {
        Self {
            function_type: OutputFunctionType::NotSelected,
            single: None,
            relation: None,
            relation_port: None,
            notify: false,
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

impl OutputSettings {
    /// Apply one output property. Output settings are stored whatever the
    /// selected function, so companion keys may arrive in any order.
    pub fn apply(&mut self, layout: BankLayout, param: OutputParam, raw: &Value) -> Result<Applied, PropertyError> {
        let before = *self;
        let ack = match param {
            OutputParam::FunctionType => {
                let v = value::variant(raw, OutputFunctionType::from_name, OutputFunctionType::from_code)?;
                self.function_type = v.unwrap_or_default();
                AckValue::from_num(v.map(|f| f as u32))
            }
            OutputParam::IsNotify => {
                let v = value::boolean(raw)?;
                self.notify = v.unwrap_or(false);
                AckValue::from_bool(v)
            }
            OutputParam::SingleFunctionType => {
                let v = value::variant(raw, SingleKind::from_name, SingleKind::from_code)?;
                self.single = v;
                AckValue::from_num(v.map(SingleKind::code))
            }
            OutputParam::RelationFunctionType => {
                let v = value::variant(raw, RelationKind::from_name, RelationKind::from_code)?;
                self.relation = v;
                AckValue::from_num(v.map(RelationKind::code))
            }
            OutputParam::RelationPort => {
                let v = value::number(raw, 1..=layout.inputs() as u32)?;
                self.relation_port = match v {
                    Some(n) => {
                        Some(PortIndex::from_key_number(layout, PortKind::Input, n).ok_or(PropertyError::OutOfRange)?)
                    }
                    None => None,
                };
                AckValue::from_num(v)
            }
            OutputParam::DiEdgeTrigger => {
                let v = value::boolean(raw)?;
                self.trigger_on_high = v.unwrap_or(defaults::TRIGGER_ON_HIGH);
                AckValue::from_bool(v)
            }
            OutputParam::DiPulseCountTrigger => {
                let v = value::number(raw, value::PULSE_COUNT)?;
                self.trigger_count = v.unwrap_or(defaults::TRIGGER_COUNT);
                AckValue::from_num(v)
            }
            OutputParam::DriveStatus => {
                let v = value::boolean(raw)?;
                self.drive_high = v.unwrap_or(defaults::DRIVE_HIGH);
                AckValue::from_bool(v)
            }
            OutputParam::DriveDelay => {
                let v = value::number(raw, value::DRIVE_SECS)?;
                self.delay_secs = v.unwrap_or(defaults::DRIVE_DELAY_SECS);
                AckValue::from_num(v)
            }
            OutputParam::DriveSeconds => {
                let v = value::number(raw, value::DRIVE_SECS)?;
                self.duration_secs = v.unwrap_or(defaults::DRIVE_SECS);
                AckValue::from_num(v)
            }
            OutputParam::PulseCycle => {
                let v = value::number(raw, value::CYCLE_SECS)?;
                self.cycle_secs = v.unwrap_or(defaults::PULSE_CYCLE_SECS);
                AckValue::from_num(v)
            }
            OutputParam::PwmDutyCycle => {
                let v = value::number(raw, value::DUTY_PERCENT)?;
                self.duty_percent = v.unwrap_or(defaults::PWM_DUTY_PERCENT);
                AckValue::from_num(v)
            }
        };
        Ok(Applied {
            ack,
            changed: *self != before,
        })
    }

    /// Resolve the selected function, checking its companion fields.
    pub fn function(&self) -> Result<OutputFunction, MissingCompanion> {
        match self.function_type {
            OutputFunctionType::NotSelected => Ok(OutputFunction::Unselected),
            OutputFunctionType::Single => self
                .single
                .map(OutputFunction::Single)
                .ok_or(MissingCompanion::SingleKind),
            OutputFunctionType::Relation => {
                let kind = self.relation.ok_or(MissingCompanion::RelationKind)?;
                self.relation_port.ok_or(MissingCompanion::RelationPort)?;
                Ok(OutputFunction::Relation(kind))
            }
        }
    }

    /// Settings pushed to the real-time core for this port.
    pub fn drive_config(&self, layout: BankLayout) -> Result<DriveConfig, MissingCompanion> {
        let function = self.function()?;
        let relation_pin = match function {
            OutputFunction::Relation(_) => self.relation_port.map(|p| layout.input_pin(p)),
            _ => None,
        };
        Ok(DriveConfig {
            function,
            relation_pin,
            trigger_on_high: self.trigger_on_high,
            trigger_count: self.trigger_count,
            drive_high: self.drive_high,
            delay_secs: self.delay_secs,
            duration_secs: self.duration_secs,
            cycle_secs: self.cycle_secs,
            duty_percent: self.duty_percent,
        })
    }
}

#[cfg(test)]
mod tests {
    use serde_json::json;

    use super::*;

    #[test]
    fn counter_parameters_mark_reset_only_on_change() {
        let mut s = InputSettings::with_function(InputFunction::PulseCounter);
        let applied = s.apply(InputParam::CntMinPulseWidth, &json!(200)).unwrap();
        assert!(!applied.changed, "200 is already the default");
        let applied = s.apply(InputParam::CntMinPulseWidth, &json!(50)).unwrap();
        assert!(applied.changed);
        assert_eq!(s.counter.min_pulse_width, 50);
        let applied = s.apply(InputParam::CntInterval, &json!(30)).unwrap();
        assert!(!applied.changed, "interval never forces a reset");
        assert_eq!(s.interval_secs, 30);
    }

    #[test]
    fn foreign_parameters_are_acked_not_applied() {
        let mut s = InputSettings::with_function(InputFunction::Polling);
        let applied = s.apply(InputParam::CntMaxPulseCount, &json!(10)).unwrap();
        assert_eq!(applied.ack, AckValue::Num(10));
        assert_eq!(s.counter.max_pulse_count, defaults::MAX_PULSE_COUNT);
    }

    #[test]
    fn null_restores_default() {
        let mut s = InputSettings::with_function(InputFunction::PulseCounter);
        s.apply(InputParam::CntMinPulseWidth, &json!(5)).unwrap();
        let applied = s.apply(InputParam::CntMinPulseWidth, &json!(null)).unwrap();
        assert_eq!(applied.ack, AckValue::Null);
        assert_eq!(s.counter.min_pulse_width, defaults::MIN_PULSE_WIDTH);
    }

    #[test]
    fn out_of_range_values_are_rejected() {
        let mut s = InputSettings::with_function(InputFunction::PulseCounter);
        assert_eq!(
            s.apply(InputParam::CntMinPulseWidth, &json!(1001)),
            Err(PropertyError::OutOfRange)
        );
        let mut o = OutputSettings::default();
        assert_eq!(
            o.apply(BankLayout::Dio, OutputParam::PwmDutyCycle, &json!(150)),
            Err(PropertyError::OutOfRange)
        );
        assert_eq!(
            o.apply(BankLayout::Dio, OutputParam::RelationPort, &json!(3)),
            Err(PropertyError::OutOfRange)
        );
    }

    #[test]
    fn relation_needs_port_and_kind() {
        let l = BankLayout::Dio;
        let mut o = OutputSettings::default();
        o.apply(l, OutputParam::FunctionType, &json!("Relation")).unwrap();
        assert_eq!(o.function(), Err(MissingCompanion::RelationKind));
        o.apply(l, OutputParam::RelationFunctionType, &json!("Invert")).unwrap();
        assert_eq!(o.function(), Err(MissingCompanion::RelationPort));
        o.apply(l, OutputParam::RelationPort, &json!(2)).unwrap();
        let cfg = o.drive_config(l).unwrap();
        assert_eq!(cfg.function, OutputFunction::Relation(RelationKind::Invert));
        assert_eq!(cfg.relation_pin, Some(1));
    }
}
