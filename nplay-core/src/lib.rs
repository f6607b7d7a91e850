//! # nplay-core
//!
//! Packet-to-event translation for nplay.
//!
//! ### Key Submodules:
//! - `record`: decoded packet records handed over by a capture source
//! - `classify`: direction classification against a local address or non-global address ranges
//! - `extract`: canonical event extraction
//! - `time`: delivery timestamp scheduling with time-warp
//! - `trigger`: per-event trigger tags for `/type/*` messages

pub mod classify;
pub mod error;
pub mod event;
pub mod extract;
pub mod record;
pub mod time;
pub mod trigger;

pub mod prelude {
    pub use crate::classify::*;
    pub use crate::error::*;
    pub use crate::event::*;
    pub use crate::extract::*;
    pub use crate::record::*;
    pub use crate::time::*;
    pub use crate::trigger::*;
}

pub use classify::DirectionClassifier;
pub use error::ExtractionError;
pub use event::{CanonicalEvent, Direction};
pub use extract::FieldExtractor;
pub use record::{NetworkLayer, PacketRecord, Ports, TcpFlags};
pub use time::{Scheduler, TimeWarp};
