//! Outbound application events.
//!
//! The [`GatewayService`](super::service::GatewayService) emits these through
//! the [`EventSink`](super::ports::EventSink) port.  Adapters on the other
//! side decide what to do with them: log to serial, publish as cloud
//! telemetry, write reported properties.

use crate::reconcile::{PropertyAck, PropertyStatus};
use crate::telemetry::TelemetryBatch;

/// Structured events emitted by the application core.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum AppEvent {
    /// Values produced by one scheduler tick.
    Telemetry(TelemetryBatch),

    /// Outcome of a desired document: status plus one ack per applied key.
    PropertiesReported {
        status: PropertyStatus,
        acks: Vec<PropertyAck>,
    },

    /// A manual output write reached the real-time core.
    OutputWritten { port: u32, level: bool },

    /// Real-time core firmware version.
    Version(String),
}
