//! Desired-property key grammar: `<Feature>_<Token><N>`.
//!
//! `Token` is the bank's input token (`DIDO` or `DI`) or the output token
//! `DO`; `N` is a one-based port number validated against the layout.
//! Anything else is not a key this module understands.

use crate::pins::{BankLayout, PortIndex, PortKind};

/// Keys that switch an input function on or off.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum SelectionKey {
    Counter,
    Edge,
    Polling,
    FunctionType,
}

/// Input parameters.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum InputParam {
    CntInterval,
    PollInterval,
    Interval,
    CntIsPulseHigh,
    EdgeTrigger,
    CntMinPulseWidth,
    MinPulseWidth,
    CntMaxPulseCount,
    MaxPulseCount,
    EdgeNotifyIsHigh,
    PollingActiveHigh,
}

/// Output settings.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum OutputParam {
    FunctionType,
    IsNotify,
    SingleFunctionType,
    RelationPort,
    RelationFunctionType,
    DiEdgeTrigger,
    DiPulseCountTrigger,
    DriveStatus,
    DriveDelay,
    DriveSeconds,
    PulseCycle,
    PwmDutyCycle,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum PropertyKey {
    Selection(SelectionKey, PortIndex),
    Input(InputParam, PortIndex),
    Output(OutputParam, PortIndex),
}

const SELECTION_KEYS: [(&str, SelectionKey); 4] = [
    ("Counter", SelectionKey::Counter),
    ("Edge", SelectionKey::Edge),
    ("Polling", SelectionKey::Polling),
    ("FunctionType", SelectionKey::FunctionType),
];

const INPUT_KEYS: [(&str, InputParam); 11] = [
    ("cntInterval", InputParam::CntInterval),
    ("pollInterval", InputParam::PollInterval),
    ("Interval", InputParam::Interval),
    ("cntIsPulseHigh", InputParam::CntIsPulseHigh),
    ("EdgeTrigger", InputParam::EdgeTrigger),
    ("cntMinPulseWidth", InputParam::CntMinPulseWidth),
    ("MinPulseWidth", InputParam::MinPulseWidth),
    ("cntMaxPulseCount", InputParam::CntMaxPulseCount),
    ("MaxPulseCount", InputParam::MaxPulseCount),
    ("edgeNotifyIsHigh", InputParam::EdgeNotifyIsHigh),
    ("PollingActiveHigh", InputParam::PollingActiveHigh),
];

const OUTPUT_KEYS: [(&str, OutputParam); 12] = [
    ("FunctionType", OutputParam::FunctionType),
    ("IsNotify", OutputParam::IsNotify),
    ("SingleFunctionType", OutputParam::SingleFunctionType),
    ("RelationPort", OutputParam::RelationPort),
    ("RelationFunctionType", OutputParam::RelationFunctionType),
    ("DIEdgeTrigger", OutputParam::DiEdgeTrigger),
    ("DIPulseCountTrigger", OutputParam::DiPulseCountTrigger),
    ("DriveStatus", OutputParam::DriveStatus),
    ("DriveDelay", OutputParam::DriveDelay),
    ("DriveSeconds", OutputParam::DriveSeconds),
    ("PulseCycle", OutputParam::PulseCycle),
    ("PWMDutyCycle", OutputParam::PwmDutyCycle),
];

fn lookup<T: Copy>(table: &[(&str, T)], feature: &str) -> Option<T> {
    table.iter().find(|(name, _)| *name == feature).map(|(_, key)| *key)
}

/// Port number after `token`, digits only.
fn port_number(suffix: &str, token: &str) -> Option<u32> {
    let digits = suffix.strip_prefix(token)?;
    if digits.is_empty() || !digits.bytes().all(|b| b.is_ascii_digit()) {
        return None;
    }
    digits.parse().ok()
}

/// Classify a property name. `None` for anything unrecognized, including
/// ports beyond the bank.
pub fn parse(layout: BankLayout, name: &str) -> Option<PropertyKey> {
    let (feature, suffix) = name.rsplit_once('_')?;

    if let Some(n) = port_number(suffix, layout.input_token()) {
        let port = PortIndex::from_key_number(layout, PortKind::Input, n)?;
        if let Some(key) = lookup(&SELECTION_KEYS, feature) {
            return Some(PropertyKey::Selection(key, port));
        }
        return lookup(&INPUT_KEYS, feature).map(|key| PropertyKey::Input(key, port));
    }

    if layout.outputs() > 0 {
        let n = port_number(suffix, layout.output_token())?;
        let port = PortIndex::from_key_number(layout, PortKind::Output, n)?;
        return lookup(&OUTPUT_KEYS, feature).map(|key| PropertyKey::Output(key, port));
    }
    None
}
