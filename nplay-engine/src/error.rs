use std::io;
use std::net::SocketAddr;

use thiserror::Error;
use tokio::task::JoinError;

use nplay_capture::CaptureError;
use nplay_config::ConfigError;
use nplay_core::ExtractionError;
use nplay_protocols::EncodingError;

/// UDP send failure. Reported, never fatal.
#[derive(Debug, Error)]
#[error("Failed to send {len}-byte datagram to {target}: {source}")]
pub struct TransportError {
    pub target: SocketAddr,
    pub len: usize,
    #[source]
    pub source: io::Error,
}

/// Failure confined to a single packet. The pipeline logs it and moves on.
#[derive(Debug, Error)]
pub enum PacketError {
    #[error(transparent)]
    Extraction(#[from] ExtractionError),

    #[error("Encoding failed: {0}")]
    Encoding(#[from] EncodingError),

    #[error(transparent)]
    Transport(#[from] TransportError),
}

impl PacketError {
    /// Label for the skipped/failed counters.
    pub fn reason(&self) -> &'static str {
        match self {
            PacketError::Extraction(_) => "extraction",
            PacketError::Encoding(_) => "encoding",
            PacketError::Transport(_) => "transport",
        }
    }
}

/// Errors that end a run.
#[derive(Debug, Error)]
pub enum EngineError {
    #[error("Configuration error: {0}")]
    Config(#[from] ConfigError),

    #[error("Capture error: {0}")]
    Capture(#[from] CaptureError),

    #[error("I/O error: {0}")]
    Io(#[from] io::Error),

    #[error("Metrics setup failed: {0}")]
    Metrics(String),

    #[error("Pipeline task failed: {0}")]
    Join(#[from] JoinError),
}
