//! Fetch, watch and output tables produced by reconciliation.
//!
//! Tables are rebuilt as a whole from the merged settings and never edited
//! in place; the scheduler swaps them in on reinit.

use heapless::Vec;

use crate::pins::{BankLayout, MAX_PORTS, PortIndex, PortKind};
use crate::port::{CounterConfig, DriveConfig, InputFunction};
use crate::telemetry::{self, TelemetryName};

use super::settings::{InputSettings, OutputSettings};

/// What a fetch item samples.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum FetchKind {
    /// Report the running count.
    PulseCounter(CounterConfig),
    /// Report the pin level, `1` when it equals `active_high`.
    Polling { active_high: bool },
}

/// A port sampled on a fixed interval.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct FetchItem {
    pub port: PortIndex,
    pub pin: u32,
    pub telemetry_name: TelemetryName,
    pub interval_secs: u32,
    pub kind: FetchKind,
    /// Clear the count once before sampling resumes.
    pub needs_reset: bool,
}

impl FetchItem {
    pub fn function(&self) -> InputFunction {
        match self.kind {
            FetchKind::PulseCounter(_) => InputFunction::PulseCounter,
            FetchKind::Polling { .. } => InputFunction::Polling,
        }
    }

    pub fn is_pulse_counter(&self) -> bool {
        matches!(self.kind, FetchKind::PulseCounter(_))
    }

    /// Counter settings for the pin. Polling pins still run a counter with
    /// factory settings so their level is debounced.
    pub fn counter_config(&self) -> CounterConfig {
        match self.kind {
            FetchKind::PulseCounter(config) => config,
            FetchKind::Polling { .. } => CounterConfig::default(),
        }
    }
}

/// A port reported on every settled transition.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct WatchItem {
    pub port: PortIndex,
    pub pin: u32,
    pub telemetry_name: TelemetryName,
    pub notify_on_high: bool,
    pub needs_reset: bool,
}

/// An output port and the drive settings it runs.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct OutputItem {
    pub port: PortIndex,
    pub pin: u32,
    pub config: DriveConfig,
    /// Status telemetry name when the port reports its level.
    pub status_name: Option<TelemetryName>,
    /// Push `config` to the real-time core on the next reinit.
    pub needs_apply: bool,
}

pub type FetchTable = Vec<FetchItem, MAX_PORTS>;
pub type WatchTable = Vec<WatchItem, MAX_PORTS>;
pub type OutputTable = Vec<OutputItem, MAX_PORTS>;

/// Build the fetch and watch tables for every selected input port.
pub fn build_input_tables(
    layout: BankLayout,
    inputs: &[InputSettings],
    reset: &[bool],
) -> (FetchTable, WatchTable) {
    let mut fetch = FetchTable::new();
    let mut watch = WatchTable::new();

    for (index, settings) in inputs.iter().enumerate() {
        let Some(port) = PortIndex::new(layout, PortKind::Input, index) else {
            continue;
        };
        let pin = layout.input_pin(port);
        let needs_reset = reset.get(index).copied().unwrap_or(false);

        // Tables hold MAX_PORTS entries and there is at most one per port.
        let _ = match settings.function {
            InputFunction::Unselected => Ok(()),
            InputFunction::PulseCounter => fetch
                .push(FetchItem {
                    port,
                    pin,
                    telemetry_name: telemetry::counter_name(layout, port),
                    interval_secs: settings.interval_secs,
                    kind: FetchKind::PulseCounter(settings.counter),
                    needs_reset,
                })
                .map_err(drop),
            InputFunction::Polling => fetch
                .push(FetchItem {
                    port,
                    pin,
                    telemetry_name: telemetry::polling_name(layout, port),
                    interval_secs: settings.interval_secs,
                    kind: FetchKind::Polling {
                        active_high: settings.polling_active_high,
                    },
                    needs_reset,
                })
                .map_err(drop),
            InputFunction::Edge => watch
                .push(WatchItem {
                    port,
                    pin,
                    telemetry_name: telemetry::edge_name(layout, port),
                    notify_on_high: settings.edge_notify_high,
                    needs_reset,
                })
                .map_err(drop),
        };
    }
    (fetch, watch)
}

/// Build the output table, one item per output port so a deselected port
/// is pushed back to idle. Ports whose function does not resolve are left
/// out; the reconciler has already rejected them.
pub fn build_output_table(layout: BankLayout, outputs: &[OutputSettings], changed: &[bool]) -> OutputTable {
    let mut table = OutputTable::new();
    for (index, settings) in outputs.iter().enumerate() {
        let Some(port) = PortIndex::new(layout, PortKind::Output, index) else {
            continue;
        };
        let Ok(config) = settings.drive_config(layout) else {
            continue;
        };
        let _ = table.push(OutputItem {
            port,
            pin: layout.output_pin(port),
            config,
            status_name: settings
                .notify
                .then(|| telemetry::output_status_name(layout, port)),
            needs_apply: changed.get(index).copied().unwrap_or(false),
        });
    }
    table
}
