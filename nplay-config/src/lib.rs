//! # nplay Configuration
//!
//! Layered configuration for the packet replay pipeline.
//!
//! Hierarchy, later layers win:
//! 1. Default values
//! 2. A YAML file: an explicit path, else `config/nplay.yaml` if present
//! 3. `NPLAY_*` environment variables, `__` separating sections
//!    (`NPLAY_TIMING__TIME_WARP=2.0`)
//! 4. Command-line overrides
//!
//! [`NplayConfig::resolve`] then checks the cross-field rules and produces
//! [`RuntimeSettings`].

#![warn(unsafe_code)]
#![deny(rustdoc::broken_intra_doc_links)]

use std::net::IpAddr;
use std::path::{Path, PathBuf};

use figment::{
    providers::{Env, Format, Serialized, Yaml},
    Figment,
};
use serde::{Deserialize, Serialize};
use tracing::{debug, warn};
use validator::Validate;

use nplay_core::time::TimeWarp;
use nplay_protocols::AddressFormat;

mod capture;
mod encoding;
mod error;
mod osc;
mod settings;
mod telemetry;
mod timing;
mod validation;

pub use capture::{CaptureConfig, ClassifyConfig};
pub use encoding::EncodingConfig;
pub use error::ConfigError;
pub use osc::OscConfig;
pub use settings::{CaptureSource, OscTarget, RuntimeSettings};
pub use telemetry::TelemetryConfig;
pub use timing::TimingConfig;

pub const DEFAULT_CONFIG_PATH: &str = "config/nplay.yaml";
pub const ENV_PREFIX: &str = "NPLAY_";

/// Top-level configuration container.
#[derive(Debug, Serialize, Deserialize, Validate, Default, Clone)]
pub struct NplayConfig {
    #[validate(nested)]
    #[serde(default)]
    pub osc: OscConfig,

    #[validate(nested)]
    #[serde(default)]
    pub capture: CaptureConfig,

    #[validate(nested)]
    #[serde(default)]
    pub classify: ClassifyConfig,

    #[validate(nested)]
    #[serde(default)]
    pub timing: TimingConfig,

    #[validate(nested)]
    #[serde(default)]
    pub encoding: EncodingConfig,

    #[validate(nested)]
    #[serde(default)]
    pub telemetry: TelemetryConfig,
}

/// Values given on the command line. `None` leaves the lower layers alone.
#[derive(Debug, Default, Clone)]
pub struct ConfigOverrides {
    pub osc_server: Option<String>,
    pub interface: Option<String>,
    pub trace: Option<PathBuf>,
    pub local_addr: Option<IpAddr>,
    pub time_warp: Option<f64>,
    pub guard_interval: Option<f64>,
    pub bundle_timing: Option<bool>,
    pub realtime_pacing: Option<bool>,
    pub address_format: Option<AddressFormat>,
    pub triggers: Option<bool>,
    pub log_level: Option<String>,
}

impl ConfigOverrides {
    fn merge_into(&self, mut figment: Figment) -> Figment {
        fn set<T: Serialize>(figment: Figment, key: &str, value: &Option<T>) -> Figment {
            match value {
                Some(v) => figment.merge(Serialized::default(key, v)),
                None => figment,
            }
        }
        figment = set(figment, "osc.server", &self.osc_server);
        figment = set(figment, "capture.interface", &self.interface);
        figment = set(figment, "capture.trace", &self.trace);
        figment = set(figment, "classify.local_addr", &self.local_addr);
        figment = set(figment, "timing.time_warp", &self.time_warp);
        figment = set(figment, "timing.guard_interval", &self.guard_interval);
        figment = set(figment, "timing.bundle_timing", &self.bundle_timing);
        figment = set(figment, "timing.realtime_pacing", &self.realtime_pacing);
        figment = set(figment, "encoding.address_format", &self.address_format);
        figment = set(figment, "encoding.triggers", &self.triggers);
        set(figment, "telemetry.log_level", &self.log_level)
    }
}

impl NplayConfig {
    /// Load from defaults, `config/nplay.yaml` (if present), the environment
    /// and `overrides`.
    pub fn load(overrides: &ConfigOverrides) -> Result<Self, ConfigError> {
        let mut figment = Figment::from(Serialized::defaults(NplayConfig::default()));
        if Path::new(DEFAULT_CONFIG_PATH).exists() {
            figment = figment.merge(Yaml::file(DEFAULT_CONFIG_PATH));
        } else {
            debug!("{DEFAULT_CONFIG_PATH} not found, using default configuration");
        }
        Self::finish(figment, overrides)
    }

    /// Like [`load`](Self::load) but with an explicit YAML file, which must exist.
    pub fn load_from_path<P: AsRef<Path>>(
        path: P,
        overrides: &ConfigOverrides,
    ) -> Result<Self, ConfigError> {
        let path = path.as_ref();
        if !path.exists() {
            return Err(ConfigError::FileNotFound(path.to_path_buf()));
        }
        let figment =
            Figment::from(Serialized::defaults(NplayConfig::default())).merge(Yaml::file(path));
        Self::finish(figment, overrides)
    }

    fn finish(figment: Figment, overrides: &ConfigOverrides) -> Result<Self, ConfigError> {
        let figment = figment.merge(Env::prefixed(ENV_PREFIX).split("__"));
        overrides
            .merge_into(figment)
            .extract()
            .map_err(ConfigError::from)
            .and_then(|config: Self| {
                config.validate()?;
                Ok(config)
            })
    }

    /// Checks the cross-field rules and builds typed runtime settings.
    pub fn resolve(&self) -> Result<RuntimeSettings, ConfigError> {
        let target = OscTarget::parse(&self.osc.server)?;
        let time_warp = TimeWarp::new(self.timing.time_warp)?;

        let source = match (&self.capture.trace, &self.capture.interface) {
            (Some(trace), interface) => {
                if let Some(interface) = interface {
                    warn!(
                        trace = %trace.display(),
                        interface = %interface,
                        "Both a trace file and an interface were given, replaying the trace"
                    );
                }
                CaptureSource::Trace(trace.clone())
            }
            (None, Some(interface)) => CaptureSource::Live {
                interface: interface.clone(),
                promiscuous: self.capture.promiscuous,
                snaplen: self.capture.snaplen,
                timeout_ms: self.capture.timeout_ms,
            },
            (None, None) => return Err(ConfigError::MissingCaptureSource),
        };

        let bundle_timing = self.timing.bundle_timing.unwrap_or(!source.is_live());
        if self.timing.realtime_pacing && source.is_live() {
            warn!("Real-time pacing only applies to trace replay, ignoring");
        }

        Ok(RuntimeSettings {
            realtime_pacing: self.timing.realtime_pacing && !source.is_live(),
            target,
            source,
            local_addr: self.classify.local_addr,
            time_warp,
            guard_interval: self.timing.guard_interval,
            bundle_timing,
            encoding: self.encoding.clone(),
        })
    }
}
