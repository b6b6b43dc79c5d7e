//! Real-time side: debounced pulse counters, output drive sequencers and
//! the core that owns the pins and serves link requests.

pub mod output_drive;
pub mod pulse_counter;
pub mod rt_core;
