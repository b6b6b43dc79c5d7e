//! Transport abstraction for the cross-core link.
//!
//! Concrete implementations:
//! - Mailbox / shared-memory channel between the two cores (target)
//! - [`LoopbackTransport`](crate::adapters::loopback::LoopbackTransport),
//!   which serves requests from an in-process real-time core (host)
//!
//! The link client is generic over `Transport`, so moving the real-time
//! core to another channel requires zero changes to the control core.

/// Message-oriented transport channel. One `write` carries one request,
/// one `read` returns one complete response.
pub trait Transport {
    /// Error type for this transport.
    type Error: core::fmt::Debug;

    /// Read the pending message into `buf`.
    /// Returns the number of bytes actually read.
    /// Returns 0 if no data is available (non-blocking).
    fn read(&mut self, buf: &mut [u8]) -> Result<usize, Self::Error>;

    /// Write one message to the transport.
    /// Returns the number of bytes actually written.
    fn write(&mut self, data: &[u8]) -> Result<usize, Self::Error>;

    /// Flush any buffered output.
    fn flush(&mut self) -> Result<(), Self::Error>;

    /// Check if data is available for reading.
    fn available(&self) -> bool;
}
