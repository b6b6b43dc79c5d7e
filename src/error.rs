//! Unified error types for the gateway control core.
//!
//! A single `Error` enum that every subsystem can convert into, keeping the
//! host tick's error handling uniform. All variants are `Copy` so they can be
//! passed through the scheduler and watcher without allocation.

use core::fmt;

// ---------------------------------------------------------------------------
// Top-level error
// ---------------------------------------------------------------------------

/// Every fallible operation in the core funnels into this type.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Error {
    /// The request/response round trip to the real-time core failed.
    Link(LinkError),
    /// A pin could not be read, written or configured.
    Pin(PinError),
    /// A single desired property failed validation.
    Property(PropertyError),
    /// Configuration is structurally invalid.
    Config(&'static str),
}

impl fmt::Display for Error {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Self::Link(e) => write!(f, "link: {e}"),
            Self::Pin(e) => write!(f, "pin: {e}"),
            Self::Property(e) => write!(f, "property: {e}"),
            Self::Config(msg) => write!(f, "config: {msg}"),
        }
    }
}

impl core::error::Error for Error {}

// ---------------------------------------------------------------------------
// Link errors
// ---------------------------------------------------------------------------

/// Return codes carried in a response header.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
#[repr(u32)]
pub enum ReturnCode {
    Success = 0,
    BadRequest = 1,
    InvalidPin = 2,
    UnknownRequest = 3,
}

impl ReturnCode {
    pub const fn from_u32(raw: u32) -> Option<Self> {
        match raw {
            0 => Some(Self::Success),
            1 => Some(Self::BadRequest),
            2 => Some(Self::InvalidPin),
            3 => Some(Self::UnknownRequest),
            _ => None,
        }
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum LinkError {
    /// No response arrived for a request.
    Timeout,
    /// The underlying transport reported a failure.
    Transport,
    /// The response was shorter than its header claims.
    ShortResponse,
    /// A message length field disagrees with the expected body size.
    BadLength,
    /// The real-time core answered with a non-success return code.
    Rejected(ReturnCode),
    /// The request code is not part of the protocol.
    UnknownRequest(u32),
    /// A field holds a value outside its encoding (return code, enum, flag).
    Malformed,
}

impl fmt::Display for LinkError {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Self::Timeout => write!(f, "no response"),
            Self::Transport => write!(f, "transport failure"),
            Self::ShortResponse => write!(f, "short response"),
            Self::BadLength => write!(f, "message length mismatch"),
            Self::Rejected(rc) => write!(f, "rejected ({rc:?})"),
            Self::UnknownRequest(code) => write!(f, "unknown request code {code}"),
            Self::Malformed => write!(f, "malformed field"),
        }
    }
}

impl From<LinkError> for Error {
    fn from(e: LinkError) -> Self {
        Self::Link(e)
    }
}

// ---------------------------------------------------------------------------
// Pin errors
// ---------------------------------------------------------------------------

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum PinError {
    /// Pin id is outside the bank.
    InvalidPin(u32),
    /// Pin has no counter or sequencer configured yet.
    NotConfigured(u32),
    /// The GPIO driver returned an error.
    Hardware,
}

impl fmt::Display for PinError {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Self::InvalidPin(pin) => write!(f, "invalid pin {pin}"),
            Self::NotConfigured(pin) => write!(f, "pin {pin} not configured"),
            Self::Hardware => write!(f, "GPIO failure"),
        }
    }
}

impl From<PinError> for Error {
    fn from(e: PinError) -> Self {
        Self::Pin(e)
    }
}

// ---------------------------------------------------------------------------
// Property errors
// ---------------------------------------------------------------------------

/// Why a single desired property was not applied.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum PropertyError {
    /// Value has the wrong JSON type for this key.
    WrongType,
    /// Numeric value is outside the accepted range.
    OutOfRange,
    /// Enumerated value names no known variant.
    UnknownVariant,
}

impl fmt::Display for PropertyError {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Self::WrongType => write!(f, "wrong value type"),
            Self::OutOfRange => write!(f, "value out of range"),
            Self::UnknownVariant => write!(f, "unknown variant"),
        }
    }
}

impl From<PropertyError> for Error {
    fn from(e: PropertyError) -> Self {
        Self::Property(e)
    }
}

// ---------------------------------------------------------------------------
// Convenience Result alias
// ---------------------------------------------------------------------------

/// Crate-wide `Result` alias.
pub type Result<T> = core::result::Result<T, Error>;
