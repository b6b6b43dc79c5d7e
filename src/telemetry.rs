//! Telemetry names, per-tick batches and the reference-counted dictionary.
//!
//! ```text
//!   ConfigManager ──add/remove──▶ TelemetryDictionary   (names the cloud may see)
//!   Scheduler     ──push───────▶ TelemetryBatch        (values for one tick)
//! ```

use core::fmt::{self, Write};

use heapless::{FnvIndexMap, String, Vec};

use crate::pins::{BankLayout, MAX_PORTS, PortIndex};

/// Longest telemetry name, e.g. `DIDO4_PollingStatus`.
pub const NAME_LEN: usize = 24;
/// Longest rendered value (`-2147483648` / `4294967295`).
pub const VALUE_LEN: usize = 12;
/// Every port can contribute at most one fetch value or edge event,
/// plus one output status.
pub const MAX_BATCH: usize = MAX_PORTS * 2;

pub type TelemetryName = String<NAME_LEN>;

// ───────────────────────────────────────────────────────────────
// Name construction
// ───────────────────────────────────────────────────────────────

pub const COUNT_SUFFIX: &str = "count";
pub const POLLING_SUFFIX: &str = "PollingStatus";
pub const EDGE_SUFFIX: &str = "EdgeEvent";
pub const STATUS_SUFFIX: &str = "Status";

fn port_name(token: &str, port: PortIndex, suffix: &str) -> TelemetryName {
    let mut name = TelemetryName::new();
    // Tokens and suffixes are fixed strings well under NAME_LEN.
    let _ = write!(name, "{}{}_{}", token, port.number(), suffix);
    name
}

/// `<T><n>_count`
pub fn counter_name(layout: BankLayout, port: PortIndex) -> TelemetryName {
    port_name(layout.input_token(), port, COUNT_SUFFIX)
}

/// `<T><n>_PollingStatus`
pub fn polling_name(layout: BankLayout, port: PortIndex) -> TelemetryName {
    port_name(layout.input_token(), port, POLLING_SUFFIX)
}

/// `<T><n>_EdgeEvent`
pub fn edge_name(layout: BankLayout, port: PortIndex) -> TelemetryName {
    port_name(layout.input_token(), port, EDGE_SUFFIX)
}

/// `DO<n>_Status`
pub fn output_status_name(layout: BankLayout, port: PortIndex) -> TelemetryName {
    port_name(layout.output_token(), port, STATUS_SUFFIX)
}

// ───────────────────────────────────────────────────────────────
// Batch
// ───────────────────────────────────────────────────────────────

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct TelemetryEntry {
    pub name: TelemetryName,
    pub value: String<VALUE_LEN>,
}

/// Name → value pairs produced by one scheduler tick.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct TelemetryBatch {
    entries: Vec<TelemetryEntry, MAX_BATCH>,
}

impl TelemetryBatch {
    pub fn new() -> Self {
        Self::default()
    }

    /// Append a value rendered with `Display`. Returns `false` when full.
    pub fn push(&mut self, name: &TelemetryName, value: impl fmt::Display) -> bool {
        let mut rendered = String::new();
        if write!(rendered, "{}", value).is_err() {
            return false;
        }
        self.entries
            .push(TelemetryEntry {
                name: name.clone(),
                value: rendered,
            })
            .is_ok()
    }

    pub fn get(&self, name: &str) -> Option<&str> {
        self.entries
            .iter()
            .find(|e| e.name.as_str() == name)
            .map(|e| e.value.as_str())
    }

    pub fn iter(&self) -> impl Iterator<Item = &TelemetryEntry> {
        self.entries.iter()
    }

    pub fn len(&self) -> usize {
        self.entries.len()
    }

    pub fn is_empty(&self) -> bool {
        self.entries.is_empty()
    }
}

// ───────────────────────────────────────────────────────────────
// Dictionary
// ───────────────────────────────────────────────────────────────

/// Capacity of the dictionary map (power of two for `FnvIndexMap`).
const DICT_CAPACITY: usize = 16;

/// Set of telemetry names currently published, reference counted so a
/// remove-old / add-new swap of the same name leaves it registered.
#[derive(Debug, Default)]
pub struct TelemetryDictionary {
    names: FnvIndexMap<TelemetryName, u8, DICT_CAPACITY>,
}

impl TelemetryDictionary {
    pub fn new() -> Self {
        Self::default()
    }

    /// Register one more reference to `name`. Returns `false` when full.
    pub fn add(&mut self, name: &TelemetryName) -> bool {
        if let Some(refs) = self.names.get_mut(name) {
            *refs = refs.saturating_add(1);
            return true;
        }
        self.names.insert(name.clone(), 1).is_ok()
    }

    /// Drop one reference; the name disappears with its last reference.
    pub fn remove(&mut self, name: &TelemetryName) -> bool {
        let Some(refs) = self.names.get_mut(name) else {
            return false;
        };
        *refs -= 1;
        if *refs == 0 {
            self.names.remove(name);
        }
        true
    }

    pub fn contains(&self, name: &str) -> bool {
        self.names.keys().any(|n| n.as_str() == name)
    }

    pub fn names(&self) -> impl Iterator<Item = &str> {
        self.names.keys().map(String::as_str)
    }

    pub fn len(&self) -> usize {
        self.names.len()
    }

    pub fn is_empty(&self) -> bool {
        self.names.is_empty()
    }
}
