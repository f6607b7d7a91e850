use thiserror::Error;

#[derive(Debug, Error)]
pub enum CaptureError {
    #[error("Capture device '{0}' not found")]
    DeviceNotFound(String),

    #[error("Failed to open capture source '{source_name}': {error}")]
    Open {
        source_name: String,
        #[source]
        error: pcap::Error,
    },

    #[error("Unsupported link type {0}")]
    UnsupportedLinkType(i32),

    #[error("Failed to read packet: {0}")]
    Read(#[from] pcap::Error),
}
