//! Log-based event sink adapter.
//!
//! Implements [`EventSink`] by writing structured application events to
//! the `log` facade (UART console in production). The cloud adapter that
//! publishes telemetry and reported properties implements the same trait.

use log::info;
use serde_json::Value;

use crate::app::events::AppEvent;
use crate::app::ports::EventSink;
use crate::reconcile::{PropertyAck, ack::reported};

/// Adapter that logs every [`AppEvent`] to the serial console.
#[derive(Debug, Default)]
pub struct LogEventSink;

impl LogEventSink {
    pub fn new() -> Self {
        Self
    }
}

impl EventSink for LogEventSink {
    fn emit(&mut self, event: &AppEvent) {
        match event {
            AppEvent::Telemetry(batch) => {
                for entry in batch.iter() {
                    info!("TELEM | {}={}", entry.name, entry.value);
                }
            }
            AppEvent::PropertiesReported { status, acks } => {
                info!("PROPS | status={:?} accepted={}", status, acks.len());
                if !acks.is_empty() {
                    info!("PROPS | reported {}", reported_json(acks));
                }
            }
            AppEvent::OutputWritten { port, level } => {
                info!("OUTPUT | DO{} <- {}", port, u8::from(*level));
            }
            AppEvent::Version(version) => {
                info!("VERSION | rt core {}", version);
            }
        }
    }
}

/// Reported-properties object as the cloud adapter would publish it.
fn reported_json(acks: &[PropertyAck]) -> String {
    serde_json::to_string(&Value::Object(reported(acks))).unwrap_or_default()
}
