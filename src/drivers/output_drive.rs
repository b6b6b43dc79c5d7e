//! Output drive sequencer, one per output pin.
//!
//! ## Drive / delay / duration
//!
//! ```text
//!   trigger ──▶ delay armed? ──no──▶ drive now
//!                   │yes
//!                   ▼
//!            delay elapsed ──▶ drive
//!   trigger ──▶ duration armed ──▶ duration elapsed ──▶ idle
//! ```
//!
//! Delay and duration are independent counters started by the same
//! trigger, so both may run at once. A trigger that arrives while they run
//! re-arms both.
//!
//! ## Periodic and relation modes
//!
//! | Function            | Output                                             |
//! |---------------------|----------------------------------------------------|
//! | `Single(Pulse/Pwm)` | square wave while started                          |
//! | `Relation(Drive)`   | drive/delay/duration on every Nth qualifying edge  |
//! | `Relation(Interlock)` | drive while the input is active                  |
//! | `Relation(Invert)`  | drive while the input is inactive                  |
//! | `Relation(Shape)`   | drive from a qualifying edge for `duration`        |
//! | `Relation(Pulse/Pwm)` | square wave while the input is active            |

use crate::drivers::pulse_counter::SettledEdge;
use crate::port::{DriveConfig, OutputFunction, RelationKind, SingleKind};

/// Snapshot of the related input for one tick.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub struct RelationInput {
    /// Settled input level.
    pub level: bool,
    /// Transition settled during this tick, if any.
    pub edge: Option<SettledEdge>,
}

#[derive(Debug, Clone)]
pub struct DriveSequencer {
    config: DriveConfig,
    ticks_per_second: u32,
    level: bool,

    // Drive sequencing
    target: bool,
    triggered: bool,
    delay_elapsed: Option<u32>,
    duration_elapsed: Option<u32>,

    // Periodic output
    running: bool,
    phase: u32,

    // Relation drive
    edge_count: u32,
}

impl DriveSequencer {
    pub fn new(ticks_per_second: u32) -> Self {
        let config = DriveConfig::default();
        Self {
            config,
            ticks_per_second: ticks_per_second.max(1),
            level: config.idle_level(),
            target: config.drive_high,
            triggered: false,
            delay_elapsed: None,
            duration_elapsed: None,
            running: false,
            phase: 0,
            edge_count: 0,
        }
    }

    /// Replace the configuration. Single-mode outputs start immediately.
    pub fn configure(&mut self, config: DriveConfig) {
        self.config = config;
        self.level = config.idle_level();
        self.target = config.drive_high;
        self.triggered = false;
        self.delay_elapsed = None;
        self.duration_elapsed = None;
        self.running = false;
        self.phase = 0;
        self.edge_count = 0;

        match config.function {
            OutputFunction::Single(SingleKind::Drive) => self.triggered = true,
            OutputFunction::Single(_) => self.running = true,
            _ => {}
        }
    }

    /// Manual write from the control core.
    ///
    /// Unselected outputs take the level directly, a single drive runs its
    /// delay/duration sequence towards `level`, periodic single outputs
    /// start (`true`) or stop (`false`). Relation outputs follow their
    /// input and ignore manual writes.
    pub fn trigger(&mut self, level: bool) {
        match self.config.function {
            OutputFunction::Unselected => self.level = level,
            OutputFunction::Single(SingleKind::Drive) => {
                self.target = level;
                self.triggered = true;
            }
            OutputFunction::Single(_) => {
                self.running = level;
                self.phase = 0;
            }
            OutputFunction::Relation(_) => {}
        }
    }

    /// Advance one tick and return the level the pin should have.
    pub fn step(&mut self, input: &RelationInput) -> bool {
        let active = input.level == self.config.trigger_on_high;
        let qualifying_edge = input
            .edge
            .is_some_and(|e| e.rising == self.config.trigger_on_high);

        match self.config.function {
            OutputFunction::Unselected => {}
            OutputFunction::Single(SingleKind::Drive) => self.run_timers(),
            OutputFunction::Single(_) => {
                if self.running {
                    self.level = self.wave();
                } else {
                    self.level = self.config.idle_level();
                }
            }
            OutputFunction::Relation(RelationKind::Drive) => {
                if qualifying_edge {
                    self.edge_count += 1;
                    if self.edge_count >= self.config.trigger_count.max(1) {
                        self.edge_count = 0;
                        self.target = self.config.drive_high;
                        self.triggered = true;
                    }
                }
                self.run_timers();
            }
            OutputFunction::Relation(RelationKind::Interlock) => {
                self.level = if active { self.config.drive_high } else { self.config.idle_level() };
            }
            OutputFunction::Relation(RelationKind::Invert) => {
                self.level = if active { self.config.idle_level() } else { self.config.drive_high };
            }
            OutputFunction::Relation(RelationKind::Shape) => self.shape(qualifying_edge, input.edge.is_some()),
            OutputFunction::Relation(RelationKind::Pulse | RelationKind::Pwm) => {
                if active {
                    self.level = self.wave();
                } else {
                    self.phase = 0;
                    self.level = self.config.idle_level();
                }
            }
        }
        self.level
    }

    pub fn level(&self) -> bool {
        self.level
    }

    pub fn config(&self) -> &DriveConfig {
        &self.config
    }

    // ── internals ─────────────────────────────────────────────

    fn secs_to_ticks(&self, secs: u32) -> u32 {
        secs.saturating_mul(self.ticks_per_second)
    }

    fn run_timers(&mut self) {
        if self.triggered {
            if self.config.delay_secs > 0 {
                self.delay_elapsed = Some(0);
            } else {
                self.level = self.target;
            }
            if self.config.duration_secs > 0 {
                self.duration_elapsed = Some(0);
            }
            self.triggered = false;
        }

        if let Some(elapsed) = self.delay_elapsed {
            if elapsed >= self.secs_to_ticks(self.config.delay_secs) {
                self.level = self.target;
                self.delay_elapsed = None;
            } else {
                self.delay_elapsed = Some(elapsed + 1);
            }
        }

        if let Some(elapsed) = self.duration_elapsed {
            if elapsed >= self.secs_to_ticks(self.config.duration_secs) {
                self.level = self.config.idle_level();
                self.duration_elapsed = None;
            } else {
                self.duration_elapsed = Some(elapsed + 1);
            }
        }
    }

    fn shape(&mut self, qualifying_edge: bool, any_edge: bool) {
        if qualifying_edge {
            self.level = self.config.drive_high;
            if self.config.duration_secs > 0 {
                self.duration_elapsed = Some(0);
            }
        } else if any_edge && self.config.duration_secs == 0 {
            // Without a duration the shaped pulse ends on the opposite edge.
            self.level = self.config.idle_level();
        }

        if let Some(elapsed) = self.duration_elapsed {
            if elapsed >= self.secs_to_ticks(self.config.duration_secs) {
                self.level = self.config.idle_level();
                self.duration_elapsed = None;
            } else {
                self.duration_elapsed = Some(elapsed + 1);
            }
        }
    }

    fn wave(&mut self) -> bool {
        let period = self.secs_to_ticks(self.config.cycle_secs).max(1);
        let duty = match self.config.function {
            OutputFunction::Single(SingleKind::Pulse) | OutputFunction::Relation(RelationKind::Pulse) => 50,
            _ => self.config.duty_percent.min(100),
        };
        let on_ticks = (u64::from(period) * u64::from(duty) / 100) as u32;
        let level = if self.phase < on_ticks {
            self.config.drive_high
        } else {
            self.config.idle_level()
        };
        self.phase = (self.phase + 1) % period;
        level
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    const TPS: u32 = 10;

    fn sequencer(config: DriveConfig) -> DriveSequencer {
        let mut s = DriveSequencer::new(TPS);
        s.configure(config);
        s
    }

    fn run(s: &mut DriveSequencer, input: RelationInput, ticks: u32) -> bool {
        let mut level = s.level();
        for _ in 0..ticks {
            level = s.step(&input);
        }
        level
    }

    fn edge(rising: bool) -> RelationInput {
        RelationInput {
            level: rising,
            edge: Some(SettledEdge { rising, counted: true }),
        }
    }

    #[test]
    fn single_drive_without_timers_drives_at_once() {
        let mut s = sequencer(DriveConfig {
            function: OutputFunction::Single(SingleKind::Drive),
            ..DriveConfig::default()
        });
        assert!(s.step(&RelationInput::default()));
        assert!(run(&mut s, RelationInput::default(), 100));
    }

    #[test]
    fn single_drive_honours_delay_then_duration() {
        let mut s = sequencer(DriveConfig {
            function: OutputFunction::Single(SingleKind::Drive),
            delay_secs: 1,
            duration_secs: 3,
            ..DriveConfig::default()
        });
        let idle = RelationInput::default();
        assert!(!run(&mut s, idle, TPS), "still inside the delay");
        assert!(run(&mut s, idle, 1), "delay elapsed");
        assert!(run(&mut s, idle, TPS), "duration still running");
        assert!(!run(&mut s, idle, 2 * TPS), "duration elapsed");
    }

    #[test]
    fn retrigger_rearms_the_delay() {
        let mut s = sequencer(DriveConfig {
            function: OutputFunction::Single(SingleKind::Drive),
            delay_secs: 1,
            ..DriveConfig::default()
        });
        let idle = RelationInput::default();
        run(&mut s, idle, TPS - 2);
        s.trigger(true);
        assert!(!run(&mut s, idle, TPS), "delay restarted by the second trigger");
        assert!(run(&mut s, idle, 1));
    }

    #[test]
    fn manual_write_on_unselected_output() {
        let mut s = DriveSequencer::new(TPS);
        s.trigger(true);
        assert!(s.step(&RelationInput::default()));
        s.trigger(false);
        assert!(!s.step(&RelationInput::default()));
    }

    #[test]
    fn pwm_duty_sets_high_fraction() {
        let mut s = sequencer(DriveConfig {
            function: OutputFunction::Single(SingleKind::Pwm),
            cycle_secs: 1,
            duty_percent: 30,
            ..DriveConfig::default()
        });
        let highs = (0..TPS * 4).filter(|_| s.step(&RelationInput::default())).count();
        assert_eq!(highs, 12);
    }

    #[test]
    fn interlock_and_invert_follow_input() {
        let mut lock = sequencer(DriveConfig {
            function: OutputFunction::Relation(RelationKind::Interlock),
            relation_pin: Some(0),
            ..DriveConfig::default()
        });
        let mut inv = sequencer(DriveConfig {
            function: OutputFunction::Relation(RelationKind::Invert),
            relation_pin: Some(0),
            ..DriveConfig::default()
        });
        let high = RelationInput { level: true, edge: None };
        assert!(lock.step(&high));
        assert!(!inv.step(&high));
        assert!(!lock.step(&RelationInput::default()));
        assert!(inv.step(&RelationInput::default()));
    }

    #[test]
    fn relation_drive_waits_for_nth_edge() {
        let mut s = sequencer(DriveConfig {
            function: OutputFunction::Relation(RelationKind::Drive),
            relation_pin: Some(0),
            trigger_count: 2,
            ..DriveConfig::default()
        });
        assert!(!s.step(&edge(true)));
        assert!(!s.step(&edge(false)), "falling edge does not qualify");
        assert!(s.step(&edge(true)));
    }

    #[test]
    fn shape_without_duration_ends_on_opposite_edge() {
        let mut s = sequencer(DriveConfig {
            function: OutputFunction::Relation(RelationKind::Shape),
            relation_pin: Some(0),
            ..DriveConfig::default()
        });
        assert!(s.step(&edge(true)));
        assert!(run(&mut s, RelationInput { level: true, edge: None }, 50));
        assert!(!s.step(&edge(false)));
    }
}
