//! Records shared by every shardkeep crate.
//!
//! `models` holds what the collector stores, `payload` holds what senders put
//! on the wire. The two are kept apart so storage never depends on how a
//! token happened to be serialized.

pub mod constants;
pub mod models;
pub mod payload;

pub use models::{Message, Share};
pub use payload::{MessageWire, ShareWire, WirePayload};
