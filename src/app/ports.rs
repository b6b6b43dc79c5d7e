//! Port traits: the hexagonal boundary between domain logic and the outside world.
//!
//! ```text
//!   Adapter ──▶ Port trait ──▶ GatewayService (domain)
//! ```
//!
//! The real-time core is reached through [`PortBank`]; events leave through
//! [`EventSink`]. The [`GatewayService`](super::service::GatewayService),
//! scheduler and watcher consume them via generics, so the domain core never
//! touches the link or the pins directly.

use heapless::Vec;

use crate::error::Result;
use crate::pins::MAX_PINS;
use crate::port::{CounterConfig, DriveConfig};

// ───────────────────────────────────────────────────────────────
// Port bank (driven adapter: domain ↔ real-time core)
// ───────────────────────────────────────────────────────────────

/// Capability interface over one bank of digital I/O pins.
///
/// Every call is one request/response round trip to the real-time core;
/// implementations must not retry internally.
pub trait PortBank {
    /// Configure and start the debounced counter on `pin`.
    fn configure_counter(&mut self, pin: u32, config: &CounterConfig) -> Result<()>;

    /// Restart the counter on `pin` from `init`.
    fn reset_count(&mut self, pin: u32, init: u32) -> Result<()>;

    fn read_count(&mut self, pin: u32) -> Result<u32>;

    /// Whole seconds `pin` has spent in its counting direction.
    fn read_on_time(&mut self, pin: u32) -> Result<u32>;

    fn read_level(&mut self, pin: u32) -> Result<bool>;

    /// Settled level of every input pin.
    fn read_levels(&mut self) -> Result<Vec<bool, MAX_PINS>>;

    /// Manual output write (triggers a single drive).
    fn write_level(&mut self, pin: u32, level: bool) -> Result<()>;

    fn configure_output(&mut self, pin: u32, config: &DriveConfig) -> Result<()>;

    fn read_version(&mut self) -> Result<String>;
}

// ───────────────────────────────────────────────────────────────
// Event sink port (driven adapter: domain → logging / cloud)
// ───────────────────────────────────────────────────────────────

/// The domain emits structured [`AppEvent`](super::events::AppEvent)s
/// through this port.  Adapters decide where they go (serial log, cloud
/// telemetry, reported properties).
pub trait EventSink {
    fn emit(&mut self, event: &super::events::AppEvent);
}

// ───────────────────────────────────────────────────────────────
// In-memory bank for unit tests
// ───────────────────────────────────────────────────────────────
