//! Contact-input watcher.
//!
//! Edge-watched pins run a counter on the real-time core that counts every
//! settled transition in the notify direction. The watcher compares that
//! count against the last reported snapshot each tick:
//!
//! ```text
//!   tick N    read 5, previous 4  → changed, current = 5
//!   tick N+1  previous ← 5        → read 5, unchanged
//! ```
//!
//! Snapshots only advance on the tick after a change is reported, so each
//! transition is reported exactly once. A pin whose snapshot read failed
//! takes its snapshot from the first successful read instead.

use heapless::Vec;
use log::warn;

use crate::app::ports::PortBank;
use crate::pins::MAX_PORTS;
use crate::port::CounterConfig;
use crate::reconcile::WatchItem;

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct WatchItemStat {
    pub item: WatchItem,
    /// Last acknowledged count; `None` until a read succeeds.
    pub previous: Option<u32>,
    pub current: u32,
}

#[derive(Debug, Default)]
pub struct ContactWatcher {
    tracked: Vec<WatchItemStat, MAX_PORTS>,
    changed: Vec<usize, MAX_PORTS>,
}

impl ContactWatcher {
    pub fn new() -> Self {
        Self::default()
    }

    /// Replace the tracked set.
    ///
    /// Pins flagged for reset restart from zero and get their counter
    /// (re)configured. The others keep their running counter and are
    /// snapshotted so no stale change is reported.
    pub fn init<B: PortBank>(&mut self, items: &[WatchItem], bank: &mut B, min_pulse_width: u32) {
        self.tracked.clear();
        self.changed.clear();

        for item in items {
            let snapshot = if item.needs_reset {
                if let Err(e) = bank.reset_count(item.pin, 0) {
                    warn!("{}: count reset failed: {}", item.telemetry_name, e);
                }
                let config = CounterConfig {
                    count_on_high: item.notify_on_high,
                    min_pulse_width,
                    max_pulse_count: u32::MAX,
                };
                if let Err(e) = bank.configure_counter(item.pin, &config) {
                    warn!("{}: counter configuration failed: {}", item.telemetry_name, e);
                }
                Some(0)
            } else {
                match bank.read_count(item.pin) {
                    Ok(count) => Some(count),
                    Err(e) => {
                        warn!("{}: snapshot read failed, deferred: {}", item.telemetry_name, e);
                        None
                    }
                }
            };
            let _ = self.tracked.push(WatchItemStat {
                item: item.clone(),
                previous: snapshot,
                current: snapshot.unwrap_or(0),
            });
        }
    }

    /// One detection pass. Returns whether any watched pin changed.
    pub fn detect_changes<B: PortBank>(&mut self, bank: &mut B) -> bool {
        for &i in &self.changed {
            let stat = &mut self.tracked[i];
            stat.previous = Some(stat.current);
        }
        self.changed.clear();

        for (i, stat) in self.tracked.iter_mut().enumerate() {
            match (bank.read_count(stat.item.pin), stat.previous) {
                (Ok(count), None) => {
                    stat.previous = Some(count);
                    stat.current = count;
                }
                (Ok(count), Some(previous)) if count != previous => {
                    stat.current = count;
                    let _ = self.changed.push(i);
                }
                (Ok(_), Some(_)) => {}
                (Err(e), _) => warn!("{}: read failed, skipped: {}", stat.item.telemetry_name, e),
            }
        }
        !self.changed.is_empty()
    }

    /// Items reported changed by the last pass.
    pub fn last_changes(&self) -> impl Iterator<Item = &WatchItem> {
        self.changed.iter().map(|&i| &self.tracked[i].item)
    }

    pub fn tracked(&self) -> &[WatchItemStat] {
        &self.tracked
    }
}
