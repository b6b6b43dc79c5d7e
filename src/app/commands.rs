//! Inbound commands to the application service.
//!
//! These represent actions requested by the outside world (cloud desired
//! properties, direct methods, local console) that the
//! [`GatewayService`](super::service::GatewayService) interprets and acts upon.

/// Commands that external adapters can send into the application core.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum AppCommand {
    /// Raw desired-properties JSON document from the cloud.
    ApplyDesired(Vec<u8>),

    /// Manually drive output port `port` (one-based `DO` number).
    WriteOutput { port: u32, level: bool },

    /// Ask the real-time core for its firmware version.
    QueryVersion,
}
