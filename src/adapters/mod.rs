//! Adapters: concrete implementations of the hexagonal port traits.
//!
//! | Adapter     | Implements | Connects to                         |
//! |-------------|------------|-------------------------------------|
//! | `log_sink`  | EventSink  | `log` facade / serial console       |
//! | `loopback`  | Transport  | In-process real-time core (`RtCore`) |

pub mod log_sink;
pub mod loopback;
