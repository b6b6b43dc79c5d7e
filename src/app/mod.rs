//! Application core: pure domain logic, zero I/O.
//!
//! This module contains the business rules of the gateway: reconciling
//! desired documents, scheduling data fetches and forwarding manual output
//! writes. All interaction with the real-time core happens through **port
//! traits** defined in [`ports`], keeping this layer fully testable without
//! real peripherals.

pub mod commands;
pub mod events;
pub mod ports;
pub mod service;
