//! Configuration reconciler: desired document → merged settings → tables.
//!
//! ```text
//!   payload ──▶ document::parse ──▶ keys::parse (per property)
//!                                        │
//!        ┌───────────────────────────────┴──────────────────────┐
//!        ▼                                                      ▼
//!   Selection (per input port)                     InputSettings / OutputSettings
//!        │ conflict → whole document rejected                   │ bad value → property rejected
//!        └──────────────────────────┬───────────────────────────┘
//!                                   ▼
//!        FetchTable + WatchTable + OutputTable, telemetry dictionary swap
//! ```
//!
//! A reconciliation either rebuilds every table from a consistent set of
//! per-port settings or leaves the previous configuration untouched. Reset
//! flags are computed against the previous settings on every call, so
//! applying the same document twice yields no resets the second time.

pub mod ack;
pub mod document;
pub mod items;
pub mod keys;
pub mod selection;
pub mod settings;
pub mod value;

use log::{debug, info, warn};
use serde_json::{Map, Value};

use crate::pins::{BankLayout, MAX_PORTS};
use crate::port::InputFunction;
use crate::telemetry::TelemetryDictionary;

pub use ack::{AckValue, PropertyAck};
pub use items::{FetchItem, FetchKind, FetchTable, OutputItem, OutputTable, WatchItem, WatchTable};
pub use settings::{InputSettings, OutputSettings};

use keys::PropertyKey;
use selection::Selection;

/// Outcome reported back to the configuration source.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum PropertyStatus {
    Ok,
    /// Conflicting selection while no port was configured yet.
    IllegalInitialProperty,
    /// Conflicting selection, invalid value or missing companion field.
    IllegalProperty,
    /// The document carried properties this module does not know.
    UnsupportedProperty,
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Reconciliation {
    pub status: PropertyStatus,
    pub acks: Vec<PropertyAck>,
    /// Tables were rebuilt and must be pushed to the scheduler.
    pub accepted: bool,
}

impl Reconciliation {
    fn untouched(status: PropertyStatus) -> Self {
        Self {
            status,
            acks: Vec::new(),
            accepted: false,
        }
    }
}

pub struct ConfigManager {
    layout: BankLayout,
    inputs: [InputSettings; MAX_PORTS],
    outputs: [OutputSettings; MAX_PORTS],
    fetch: FetchTable,
    watch: WatchTable,
    output_items: OutputTable,
}

impl ConfigManager {
    pub fn new(layout: BankLayout) -> Self {
        Self {
            layout,
            inputs: [InputSettings::default(); MAX_PORTS],
            outputs: [OutputSettings::default(); MAX_PORTS],
            fetch: FetchTable::new(),
            watch: WatchTable::new(),
            output_items: OutputTable::new(),
        }
    }

    pub fn fetch_items(&self) -> &[FetchItem] {
        &self.fetch
    }

    pub fn watch_items(&self) -> &[WatchItem] {
        &self.watch
    }

    pub fn output_items(&self) -> &[OutputItem] {
        &self.output_items
    }

    /// Function each input port runs according to the current tables.
    pub fn active_functions(&self) -> [InputFunction; MAX_PORTS] {
        let mut functions = [InputFunction::Unselected; MAX_PORTS];
        for item in &self.fetch {
            functions[item.port.get()] = item.function();
        }
        for item in &self.watch {
            functions[item.port.get()] = InputFunction::Edge;
        }
        functions
    }

    /// Drop reset/apply flags once the scheduler has acted on them.
    pub fn clear_pending_flags(&mut self) {
        for item in &mut self.fetch {
            item.needs_reset = false;
        }
        for item in &mut self.watch {
            item.needs_reset = false;
        }
        for item in &mut self.output_items {
            item.needs_apply = false;
        }
    }

    /// Parse and apply a raw desired document.
    ///
    /// A document that does not parse applies nothing and reports `Ok`.
    pub fn load_and_apply(&mut self, payload: &[u8], dictionary: &mut TelemetryDictionary) -> Reconciliation {
        match document::parse(payload) {
            Ok(doc) => self.apply_document(&doc, dictionary),
            Err(e) => {
                warn!("desired document ignored: {:#}", e);
                Reconciliation::untouched(PropertyStatus::Ok)
            }
        }
    }

    pub fn apply_document(&mut self, doc: &Map<String, Value>, dictionary: &mut TelemetryDictionary) -> Reconciliation {
        let layout = self.layout;

        // ── classify ──────────────────────────────────────────
        let mut total = 0usize;
        let mut recognized: Vec<(&str, PropertyKey, &Value)> = Vec::new();
        for (name, value) in doc {
            if document::is_metadata(name) {
                continue;
            }
            total += 1;
            match keys::parse(layout, name) {
                Some(key) => recognized.push((name.as_str(), key, value)),
                None => debug!("unrecognized property {}", name),
            }
        }

        // ── exclusivity ───────────────────────────────────────
        let previous = self.active_functions();
        let enabled_before = previous.iter().filter(|f| f.is_selected()).count();

        let mut rejected = false;
        let mut acks = Vec::new();
        let mut selections = [Selection::default(); MAX_PORTS];
        for &(name, key, value) in &recognized {
            if let PropertyKey::Selection(key, port) = key {
                match selections[port.get()].apply(key, value) {
                    Ok(ack) => acks.push(PropertyAck::new(name, ack)),
                    Err(e) => {
                        warn!("property {} rejected: {}", name, e);
                        rejected = true;
                    }
                }
            }
        }

        let mut next = previous;
        for index in 0..layout.inputs() {
            match selections[index].resolve(previous[index]) {
                Ok(function) => next[index] = function,
                Err(conflict) => {
                    let status = if enabled_before == 0 {
                        PropertyStatus::IllegalInitialProperty
                    } else {
                        PropertyStatus::IllegalProperty
                    };
                    warn!(
                        "{}{}: conflicting function selection ({:?}), document rejected",
                        layout.input_token(),
                        index + 1,
                        conflict
                    );
                    return Reconciliation::untouched(status);
                }
            }
        }

        // ── inputs ────────────────────────────────────────────
        let mut inputs = self.inputs;
        let mut reset = [false; MAX_PORTS];
        for index in 0..layout.inputs() {
            if next[index] != previous[index] {
                inputs[index] = InputSettings::with_function(next[index]);
                reset[index] = true;
            }
        }
        for &(name, key, value) in &recognized {
            if let PropertyKey::Input(param, port) = key {
                match inputs[port.get()].apply(param, value) {
                    Ok(applied) => {
                        acks.push(PropertyAck::new(name, applied.ack));
                        reset[port.get()] |= applied.changed;
                    }
                    Err(e) => {
                        warn!("property {} rejected: {}", name, e);
                        rejected = true;
                    }
                }
            }
        }

        // ── outputs ───────────────────────────────────────────
        let mut outputs = self.outputs;
        let mut changed = [false; MAX_PORTS];
        let mut output_acks: [Vec<PropertyAck>; MAX_PORTS] = Default::default();
        for &(name, key, value) in &recognized {
            if let PropertyKey::Output(param, port) = key {
                match outputs[port.get()].apply(layout, param, value) {
                    Ok(applied) => {
                        output_acks[port.get()].push(PropertyAck::new(name, applied.ack));
                        changed[port.get()] |= applied.changed;
                    }
                    Err(e) => {
                        warn!("property {} rejected: {}", name, e);
                        rejected = true;
                    }
                }
            }
        }
        for index in 0..layout.outputs() {
            if let Err(missing) = outputs[index].function() {
                warn!(
                    "{}{}: selected function lacks {:?}, port keeps its previous settings",
                    layout.output_token(),
                    index + 1,
                    missing
                );
                outputs[index] = self.outputs[index];
                changed[index] = false;
                output_acks[index].clear();
                rejected = true;
            }
        }
        acks.extend(output_acks.into_iter().flatten());

        // ── rebuild ───────────────────────────────────────────
        let (fetch, watch) = items::build_input_tables(layout, &inputs[..layout.inputs()], &reset);
        let output_items = items::build_output_table(layout, &outputs[..layout.outputs()], &changed);

        for name in self.telemetry_names() {
            dictionary.remove(&name);
        }
        self.inputs = inputs;
        self.outputs = outputs;
        self.fetch = fetch;
        self.watch = watch;
        self.output_items = output_items;
        for name in self.telemetry_names() {
            if !dictionary.add(&name) {
                warn!("telemetry dictionary full, {} not registered", name);
            }
        }

        let status = if rejected {
            PropertyStatus::IllegalProperty
        } else if recognized.len() < total {
            PropertyStatus::UnsupportedProperty
        } else {
            PropertyStatus::Ok
        };
        info!(
            "reconciled: {:?}, {} accepted, {} fetch / {} watch / {} output items",
            status,
            acks.len(),
            self.fetch.len(),
            self.watch.len(),
            self.output_items.len()
        );

        Reconciliation {
            status,
            acks,
            accepted: true,
        }
    }

    /// Every telemetry name the current tables publish.
    fn telemetry_names(&self) -> impl Iterator<Item = crate::telemetry::TelemetryName> + '_ {
        self.fetch
            .iter()
            .map(|i| i.telemetry_name.clone())
            .chain(self.watch.iter().map(|i| i.telemetry_name.clone()))
            .chain(self.output_items.iter().filter_map(|i| i.status_name.clone()))
    }
}
