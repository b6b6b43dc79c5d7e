//! Cross-core link between the control core and the real-time core.
//!
//! ```text
//! ┌────────────────────────────────────────────────────────────┐
//! │                      Link Stack                            │
//! │                                                            │
//! │  control core                        real-time core        │
//! │  ┌────────────┐   ┌───────────┐   ┌────────────────────┐  │
//! │  │ LinkClient │──▶│ Transport │──▶│ engine::serve      │  │
//! │  │ (PortBank) │◀──│  (trait)  │◀──│  → RtCore::handle  │  │
//! │  └────────────┘   └───────────┘   └────────────────────┘  │
//! │         └───────── codec (fixed C layout) ──────┘          │
//! └────────────────────────────────────────────────────────────┘
//! ```

pub mod client;
pub mod codec;
pub mod engine;
pub mod transport;
