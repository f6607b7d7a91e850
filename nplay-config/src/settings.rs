//! Typed settings resolved from [`NplayConfig`](crate::NplayConfig).

use std::fmt;
use std::net::IpAddr;
use std::path::PathBuf;

use nplay_core::time::TimeWarp;

use crate::encoding::EncodingConfig;
use crate::error::ConfigError;

/// Parsed `host:port` OSC destination.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct OscTarget {
    pub host: String,
    pub port: u16,
}

impl OscTarget {
    /// Splits on the last `:`. A bracketed IPv6 host (`[::1]:3334`) has its
    /// brackets removed.
    pub fn parse(server: &str) -> Result<Self, ConfigError> {
        let malformed = || ConfigError::MalformedOscAddress(server.to_string());
        let (host, port) = server.trim().rsplit_once(':').ok_or_else(malformed)?;
        let host = host
            .strip_prefix('[')
            .and_then(|h| h.strip_suffix(']'))
            .unwrap_or(host);
        if host.is_empty() || (host.contains(':') && !server.contains('[')) {
            return Err(malformed());
        }
        let port = port.parse::<u16>().map_err(|_| malformed())?;
        Ok(OscTarget {
            host: host.to_string(),
            port,
        })
    }
}

impl fmt::Display for OscTarget {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        if self.host.contains(':') {
            write!(f, "[{}]:{}", self.host, self.port)
        } else {
            write!(f, "{}:{}", self.host, self.port)
        }
    }
}

/// Where packets come from.
#[derive(Debug, Clone, PartialEq)]
pub enum CaptureSource {
    Live {
        interface: String,
        promiscuous: bool,
        snaplen: i32,
        timeout_ms: i32,
    },
    Trace(PathBuf),
}

impl CaptureSource {
    pub fn is_live(&self) -> bool {
        matches!(self, CaptureSource::Live { .. })
    }
}

/// Everything the engine needs for one run.
#[derive(Debug, Clone)]
pub struct RuntimeSettings {
    pub target: OscTarget,
    pub source: CaptureSource,
    pub local_addr: Option<IpAddr>,
    pub time_warp: TimeWarp,
    pub guard_interval: f64,
    /// Resolved: explicit setting, else bundles for traces only.
    pub bundle_timing: bool,
    pub realtime_pacing: bool,
    pub encoding: EncodingConfig,
}
