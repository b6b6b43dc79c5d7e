//! Digital I/O gateway control core.
//!
//! Reconciles desired-configuration documents into per-port fetch, watch
//! and output tables, samples them on the host tick and talks to the
//! real-time pin driver over a fixed-layout request/response link. The
//! real-time side (debounced pulse counters, output drive sequencers) lives
//! in [`drivers`] and is host-testable through `embedded-hal` pin traits.

#![deny(unused_must_use)]

pub mod adapters;
pub mod app;
pub mod config;
pub mod drivers;
pub mod error;
pub mod pins;
pub mod port;
pub mod reconcile;
pub mod rpc;
pub mod scheduler;
pub mod telemetry;
pub mod watcher;
