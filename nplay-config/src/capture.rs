//! Packet capture configuration.
//!
//! A run reads either a live interface or a trace file. When both are set the
//! trace file wins.

use std::net::IpAddr;
use std::path::PathBuf;

use serde::{Deserialize, Serialize};
use validator::Validate;

use crate::validation;

#[derive(Debug, Serialize, Deserialize, Validate, Clone)]
pub struct CaptureConfig {
    /// Network interface for live capture.
    #[validate(custom(function = validation::validate_interface))]
    #[serde(default)]
    pub interface: Option<String>,

    /// Trace file (pcap/pcapng) to replay.
    #[serde(default)]
    pub trace: Option<PathBuf>,

    /// Run in promiscuous mode?
    #[serde(default = "default_promiscuous")]
    pub promiscuous: bool,

    /// Bytes captured per frame.
    #[validate(range(min = 64, max = 262144))]
    #[serde(default = "default_snaplen")]
    pub snaplen: i32,

    /// Live read timeout (milliseconds); bounds how long a stop request waits.
    #[validate(range(min = 1, max = 60000))]
    #[serde(default = "default_timeout_ms")]
    pub timeout_ms: i32,
}

fn default_promiscuous() -> bool {
    true
}

fn default_snaplen() -> i32 {
    65535
}

fn default_timeout_ms() -> i32 {
    1000
}

impl Default for CaptureConfig {
    fn default() -> Self {
        Self {
            interface: None,
            trace: None,
            promiscuous: default_promiscuous(),
            snaplen: default_snaplen(),
            timeout_ms: default_timeout_ms(),
        }
    }
}

/// Direction classification.
#[derive(Debug, Default, Serialize, Deserialize, Validate, Clone)]
pub struct ClassifyConfig {
    /// Address of this host. Unset means the private-range heuristic is used.
    #[serde(default)]
    pub local_addr: Option<IpAddr>,
}
