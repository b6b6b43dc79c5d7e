//! Debounced pulse counter, one per input pin.
//!
//! ## Sampling
//!
//! `step()` is called once per real-time tick with the raw pin level.
//!
//! ```text
//!   raw ─┐  ┌────────────────┐  ┌──
//!        └──┘                └──┘
//!           |<- min width ->|
//!           change          settle: level = raw, count if direction matches
//! ```
//!
//! A raw change restarts the debounce window. Once the level has held for
//! more than `min_pulse_width` samples it is *settled*: the settled level is
//! updated and, when the transition direction matches the counting
//! direction, the count is incremented (wrapping to 1 past the maximum).
//! While settled in the counting direction, on-time accumulates and is
//! rolled into whole seconds every `ticks_per_second` samples.

use crate::port::CounterConfig;

/// A transition accepted by the debouncer during one `step()`.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct SettledEdge {
    /// `true` for a low→high transition.
    pub rising: bool,
    /// The transition matched the counting direction.
    pub counted: bool,
}

#[derive(Debug, Clone)]
pub struct PulseCounter {
    config: CounterConfig,
    ticks_per_second: u32,
    running: bool,

    raw_level: bool,
    level: bool,
    rising: bool,
    settled: bool,
    elapsed: u32,

    count: u32,
    on_time_ticks: u32,
    on_time_secs: u32,
}

impl PulseCounter {
    pub fn new(ticks_per_second: u32) -> Self {
        let config = CounterConfig::default();
        Self {
            config,
            ticks_per_second: ticks_per_second.max(1),
            running: false,
            raw_level: config.count_on_high,
            level: false,
            rising: !config.count_on_high,
            settled: false,
            elapsed: 0,
            count: 0,
            on_time_ticks: 0,
            on_time_secs: 0,
        }
    }

    /// Apply new settings and start sampling.
    ///
    /// On first start the edge history is primed so the pin's current level
    /// is not mistaken for a counted transition. A running counter whose
    /// counting direction is unchanged keeps its history, so a transition
    /// inside its debounce window still settles and on-time keeps running.
    pub fn configure(&mut self, config: CounterConfig) {
        let keep_history = self.running && config.count_on_high == self.config.count_on_high;
        self.config = config;
        if !keep_history {
            self.raw_level = config.count_on_high;
            self.rising = !config.count_on_high;
        }
        self.running = true;
    }

    /// Restart counting from `init`.
    pub fn clear(&mut self, init: u32) {
        self.count = init;
        self.raw_level = self.config.count_on_high;
        self.rising = !self.config.count_on_high;
        self.on_time_ticks = 0;
        self.on_time_secs = 0;
        self.elapsed = 0;
        self.settled = false;
    }

    /// Feed one raw sample. Returns the transition settled by this sample.
    pub fn step(&mut self, raw: bool) -> Option<SettledEdge> {
        if !self.running {
            return None;
        }

        if raw != self.raw_level {
            self.elapsed = 0;
            self.settled = false;
            self.rising = !self.raw_level;
            self.raw_level = raw;
            return None;
        }

        if !self.settled {
            self.elapsed = self.elapsed.saturating_add(1);
            if self.elapsed <= self.config.min_pulse_width {
                return None;
            }
            self.level = self.raw_level;
            let counted = self.rising == self.config.count_on_high;
            if counted {
                if self.count >= self.config.max_pulse_count {
                    self.count = 0;
                }
                self.count += 1;
            }
            self.elapsed = 0;
            self.settled = true;
            return Some(SettledEdge {
                rising: self.rising,
                counted,
            });
        }

        if self.rising == self.config.count_on_high {
            self.on_time_ticks += 1;
            if self.on_time_ticks >= self.ticks_per_second {
                self.on_time_secs = self.on_time_secs.saturating_add(self.on_time_ticks / self.ticks_per_second);
                self.on_time_ticks %= self.ticks_per_second;
            }
        }
        None
    }

    pub fn config(&self) -> &CounterConfig {
        &self.config
    }

    pub fn is_running(&self) -> bool {
        self.running
    }

    pub fn count(&self) -> u32 {
        self.count
    }

    /// Whole seconds spent settled in the counting direction.
    pub fn on_time_secs(&self) -> u32 {
        self.on_time_secs
    }

    /// Last settled (debounced) level.
    pub fn level(&self) -> bool {
        self.level
    }
}
