//! Gateway configuration parameters
//!
//! Deployment-time tunables for the control core. The per-port configuration
//! is not stored here; it is rebuilt from each desired document by the
//! [`ConfigManager`](crate::reconcile::ConfigManager).

use serde::{Deserialize, Serialize};

use crate::pins::BankLayout;

/// Core gateway configuration
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct GatewayConfig {
    /// Hardware variant this module drives
    pub bank: BankLayout,

    // --- Timing ---
    /// Host tick period (milliseconds); fetch intervals count these ticks
    pub host_tick_ms: u32,
    /// Real-time sampling ticks per second (pulse widths are in these units)
    pub rt_ticks_per_second: u32,

    // --- Edge watching ---
    /// Debounce width used for edge-watched pins
    pub watch_min_pulse_width: u32,
}

impl GatewayConfig {
    /// Default configuration for a given bank.
    pub fn for_bank(bank: BankLayout) -> Self {
        Self {
            bank,
            ..Self::default()
        }
    }

    /// Host ticks covering `interval_secs`, rounded up and never zero.
    pub fn interval_ticks(&self, interval_secs: u32) -> u32 {
        let ms = u64::from(interval_secs) * 1000;
        let ticks = ms.div_ceil(u64::from(self.host_tick_ms.max(1))).max(1);
        u32::try_from(ticks).unwrap_or(u32::MAX)
    }
}

impl Default for GatewayConfig {
    fn default() -> Self {
        Self {
            bank: BankLayout::Dido,

            // Timing
            host_tick_ms: 1000,        // 1 Hz
            rt_ticks_per_second: 1000, // 1 ms sampling

            // Edge watching
            watch_min_pulse_width: 200,
        }
    }
}
