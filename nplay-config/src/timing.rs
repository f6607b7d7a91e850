use serde::{Deserialize, Serialize};
use validator::Validate;

use nplay_core::time::DEFAULT_GUARD_INTERVAL;

#[derive(Debug, Serialize, Deserialize, Validate, Clone)]
pub struct TimingConfig {
    /// Playback stretch: 1.0 keeps capture pacing, 2.0 plays at half speed.
    #[serde(default = "default_time_warp")]
    pub time_warp: f64,

    /// Seconds added per event to the delivery time.
    #[validate(range(min = 0.0, max = 3600.0))]
    #[serde(default = "default_guard_interval")]
    pub guard_interval: f64,

    /// Send time-tagged bundles. Unset: bundles for trace replay, bare
    /// messages for live capture.
    #[serde(default)]
    pub bundle_timing: Option<bool>,

    /// Sleep between sends to reproduce the (warped) capture gaps.
    #[serde(default)]
    pub realtime_pacing: bool,
}

fn default_time_warp() -> f64 {
    1.0
}

fn default_guard_interval() -> f64 {
    DEFAULT_GUARD_INTERVAL
}

impl Default for TimingConfig {
    fn default() -> Self {
        Self {
            time_warp: default_time_warp(),
            guard_interval: default_guard_interval(),
            bundle_timing: None,
            realtime_pacing: false,
        }
    }
}
