//! # nplay Engine
//!
//! Packet-to-OSC pipeline, UDP delivery and the run-level entry points.

pub mod error;
pub mod pacing;
pub mod pipeline;
pub mod runtime;
pub mod transmit;

pub use error::{EngineError, PacketError, TransportError};
pub use pacing::Pacer;
pub use pipeline::{Pipeline, RunStats};
pub use runtime::{run, run_blocking};
pub use transmit::{Transmitter, UdpTransmitter};
