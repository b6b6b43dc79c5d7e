//! Data fetch scheduler.
//!
//! Runs on the host tick and turns the reconciled tables into telemetry.
//!
//! ```text
//! ┌──────────────────────────────────────────────────────────────┐
//! │                       Host tick                              │
//! │                                                              │
//! │  ┌──────────────┐   ┌──────────────┐   ┌──────────────────┐  │
//! │  │ Fetch timers │   │ Contact      │   │ Output notifiers │  │
//! │  │ (countdown)  │   │ watcher      │   │ (level changes)  │  │
//! │  └──────┬───────┘   └──────┬───────┘   └────────┬─────────┘  │
//! │         │ ready set        │ changed set        │            │
//! │         ▼                  ▼                    ▼            │
//! │   read count/level     edge event "1"      DO<n>_Status      │
//! │         └──────────────────┴────────────────────┘            │
//! │                            ▼                                 │
//! │                      TelemetryBatch                          │
//! └──────────────────────────────────────────────────────────────┘
//! ```
//!
//! A failed read skips that pin for the tick; the timer is not re-armed
//! early, the next natural expiry is the retry.
//!
//! Counters are only reconfigured for items carrying a reset flag. Every
//! change to a counter's settings sets that flag, and a SetConfig on an
//! untouched pin would restart its debounce window.

use heapless::Vec;
use log::{info, warn};

use crate::app::ports::PortBank;
use crate::config::GatewayConfig;
use crate::pins::MAX_PORTS;
use crate::reconcile::{FetchItem, FetchKind, OutputItem, WatchItem};
use crate::telemetry::{TelemetryBatch, TelemetryName};
use crate::watcher::ContactWatcher;

// ═══════════════════════════════════════════════════════════════
//  Timer types
// ═══════════════════════════════════════════════════════════════

#[derive(Debug, Clone)]
struct FetchTimer {
    item: FetchItem,
    /// Full interval in host ticks.
    period: u32,
    /// Ticks until the next expiry.
    remaining: u32,
}

#[derive(Debug, Clone)]
struct OutputNotifier {
    pin: u32,
    name: TelemetryName,
    last: Option<bool>,
}

pub struct DataFetchScheduler {
    timers: Vec<FetchTimer, MAX_PORTS>,
    ready: Vec<usize, MAX_PORTS>,
    watcher: ContactWatcher,
    notifiers: Vec<OutputNotifier, MAX_PORTS>,
    config: GatewayConfig,
}

impl DataFetchScheduler {
    pub fn new(config: &GatewayConfig) -> Self {
        Self {
            timers: Vec::new(),
            ready: Vec::new(),
            watcher: ContactWatcher::new(),
            notifiers: Vec::new(),
            config: config.clone(),
        }
    }

    /// Discard every timer and tracked item and rebuild from new tables.
    ///
    /// Pending reset flags are applied here: the pin's count is cleared,
    /// then its counter is configured. Unflagged pins keep running as they
    /// are. Outputs flagged for apply get their new drive settings.
    pub fn reinit<B: PortBank>(
        &mut self,
        fetch: &[FetchItem],
        watch: &[WatchItem],
        outputs: &[OutputItem],
        bank: &mut B,
    ) {
        self.timers.clear();
        self.ready.clear();
        self.notifiers.clear();

        for item in fetch {
            if item.needs_reset {
                if let Err(e) = bank.reset_count(item.pin, 0) {
                    warn!("{}: count reset failed: {}", item.telemetry_name, e);
                }
                if let Err(e) = bank.configure_counter(item.pin, &item.counter_config()) {
                    warn!("{}: counter configuration failed: {}", item.telemetry_name, e);
                }
            }
            let period = self.config.interval_ticks(item.interval_secs);
            let _ = self.timers.push(FetchTimer {
                item: item.clone(),
                period,
                remaining: period,
            });
        }

        self.watcher.init(watch, bank, self.config.watch_min_pulse_width);

        for item in outputs {
            if item.needs_apply {
                if let Err(e) = bank.configure_output(item.pin, &item.config) {
                    warn!("DO{}: output configuration failed: {}", item.port.number(), e);
                }
            }
            if let Some(name) = &item.status_name {
                let _ = self.notifiers.push(OutputNotifier {
                    pin: item.pin,
                    name: name.clone(),
                    last: bank.read_level(item.pin).ok(),
                });
            }
        }

        info!(
            "scheduler rebuilt: {} fetch timers, {} watched, {} notifying outputs",
            self.timers.len(),
            self.watcher.tracked().len(),
            self.notifiers.len()
        );
    }

    /// One host tick: expire timers, read ready items, run the watcher.
    pub fn tick<B: PortBank>(&mut self, bank: &mut B) -> TelemetryBatch {
        let mut batch = TelemetryBatch::new();

        for (i, timer) in self.timers.iter_mut().enumerate() {
            timer.remaining = timer.remaining.saturating_sub(1);
            if timer.remaining == 0 {
                timer.remaining = timer.period;
                let _ = self.ready.push(i);
            }
        }

        for &i in &self.ready {
            let item = &self.timers[i].item;
            match item.kind {
                FetchKind::PulseCounter(_) => match bank.read_count(item.pin) {
                    Ok(count) => push(&mut batch, &item.telemetry_name, count),
                    Err(e) => warn!("{}: read failed, skipped: {}", item.telemetry_name, e),
                },
                FetchKind::Polling { active_high } => match bank.read_level(item.pin) {
                    Ok(level) => push(&mut batch, &item.telemetry_name, i32::from(level == active_high)),
                    Err(e) => warn!("{}: read failed, skipped: {}", item.telemetry_name, e),
                },
            }
        }
        self.ready.clear();

        if self.watcher.detect_changes(bank) {
            for item in self.watcher.last_changes() {
                push(&mut batch, &item.telemetry_name, 1);
            }
        }

        for notifier in &mut self.notifiers {
            match bank.read_level(notifier.pin) {
                Ok(level) => {
                    if notifier.last.is_some_and(|last| last != level) {
                        push(&mut batch, &notifier.name, u8::from(level));
                    }
                    notifier.last = Some(level);
                }
                Err(e) => warn!("{}: read failed, skipped: {}", notifier.name, e),
            }
        }

        batch
    }
}

fn push(batch: &mut TelemetryBatch, name: &TelemetryName, value: impl core::fmt::Display) {
    if !batch.push(name, value) {
        warn!("{}: telemetry batch full, value dropped", name);
    }
}

// ═══════════════════════════════════════════════════════════════
//  Tests
// ═══════════════════════════════════════════════════════════════
