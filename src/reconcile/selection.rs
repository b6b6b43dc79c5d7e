//! Per-port input function selection and its exclusivity rules.
//!
//! Each selectable function gets a tri-state from the document:
//!
//! | State  | Meaning                              |
//! |--------|--------------------------------------|
//! | `None` | not mentioned, keep what was running |
//! | `false`| explicitly switched off              |
//! | `true` | explicitly switched on               |
//!
//! Resolution against the previous function fails when two functions are
//! on, or when a new function is switched on while the previous one is
//! left unmentioned.

use serde_json::Value;

use crate::error::PropertyError;
use crate::port::InputFunction;

use super::ack::AckValue;
use super::keys::SelectionKey;
use super::value;

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Conflict {
    /// More than one function switched on for the port.
    MultipleSelected,
    /// A new function was selected while `previous` was left running.
    Orphaned { previous: InputFunction },
}

#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub struct Selection {
    wants: [Option<bool>; 3],
}

fn slot(function: InputFunction) -> Option<usize> {
    InputFunction::SELECTABLE.iter().position(|f| *f == function)
}

impl Selection {
    /// Record one on/off request. An explicit `true` is never downgraded.
    pub fn request(&mut self, function: InputFunction, on: bool) {
        if let Some(i) = slot(function) {
            let want = &mut self.wants[i];
            if on {
                *want = Some(true);
            } else if want.is_none() {
                *want = Some(false);
            }
        }
    }

    /// Select exactly `function` (or nothing for `Unselected`).
    pub fn select_only(&mut self, function: InputFunction) {
        for f in InputFunction::SELECTABLE {
            self.request(f, f == function);
        }
    }

    /// Apply one selection key. Returns the value to acknowledge.
    pub fn apply(&mut self, key: SelectionKey, raw: &Value) -> Result<AckValue, PropertyError> {
        let function = match key {
            SelectionKey::Counter => InputFunction::PulseCounter,
            SelectionKey::Edge => InputFunction::Edge,
            SelectionKey::Polling => InputFunction::Polling,
            SelectionKey::FunctionType => {
                let parsed = value::variant(raw, InputFunction::from_name, InputFunction::from_code)?;
                let function = parsed.unwrap_or_default();
                self.select_only(function);
                return Ok(match parsed {
                    Some(f) => AckValue::Num(f as u32),
                    None => AckValue::Null,
                });
            }
        };
        let on = value::boolean(raw)?;
        self.request(function, on.unwrap_or(false));
        Ok(AckValue::from_bool(on))
    }

    /// Function the port runs after this document.
    pub fn resolve(&self, previous: InputFunction) -> Result<InputFunction, Conflict> {
        let mut on = InputFunction::SELECTABLE
            .iter()
            .zip(self.wants)
            .filter(|(_, want)| *want == Some(true))
            .map(|(f, _)| *f);

        match (on.next(), on.next()) {
            (Some(_), Some(_)) => Err(Conflict::MultipleSelected),
            (Some(selected), None) => {
                let orphaned = previous.is_selected()
                    && previous != selected
                    && slot(previous).is_some_and(|i| self.wants[i].is_none());
                if orphaned {
                    Err(Conflict::Orphaned { previous })
                } else {
                    Ok(selected)
                }
            }
            (None, _) => {
                let switched_off = slot(previous).is_some_and(|i| self.wants[i] == Some(false));
                Ok(if switched_off { InputFunction::Unselected } else { previous })
            }
        }
    }
}
