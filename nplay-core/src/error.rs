use thiserror::Error;

/// Per-packet extraction failures. These are recoverable: the packet is skipped.
#[derive(Debug, Clone, PartialEq, Error)]
pub enum ExtractionError {
    #[error("No network layer in packet: {summary}")]
    MissingNetworkLayer { summary: String },
}

/// Rejected time-warp factor.
#[derive(Debug, Clone, Copy, PartialEq, Error)]
#[error("Time warp must be a positive finite number, got {0}")]
pub struct InvalidTimeWarp(pub f64);
