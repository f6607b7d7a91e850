//! OSC time-tags: 64-bit NTP timestamps (seconds since 1900-01-01 UTC in the
//! upper 32 bits, fractional seconds in the lower 32).

/// Seconds between the NTP epoch (1900) and the Unix epoch (1970).
pub const NTP_UNIX_OFFSET: u64 = 2_208_988_800;

const FRACTION_SCALE: f64 = 4_294_967_296.0; // 2^32

#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash)]
pub struct TimeTag {
    pub seconds: u32,
    pub fraction: u32,
}

impl TimeTag {
    /// The special "deliver immediately" tag.
    pub const IMMEDIATE: TimeTag = TimeTag {
        seconds: 0,
        fraction: 1,
    };

    pub fn new(seconds: u32, fraction: u32) -> Self {
        Self { seconds, fraction }
    }

    /// Converts Unix seconds into an NTP time-tag. Negative input clamps to the
    /// Unix epoch; the seconds field wraps at the NTP era boundary.
    pub fn from_unix_secs(unix: f64) -> Self {
        let unix = if unix.is_finite() { unix.max(0.0) } else { 0.0 };
        let whole = unix.trunc();
        let seconds = (whole as u64).wrapping_add(NTP_UNIX_OFFSET) as u32;
        let fraction = ((unix - whole) * FRACTION_SCALE) as u32;
        Self { seconds, fraction }
    }

    /// Inverse of `from_unix_secs` for first-era timestamps.
    pub fn to_unix_secs(self) -> f64 {
        self.seconds as f64 - NTP_UNIX_OFFSET as f64 + self.fraction as f64 / FRACTION_SCALE
    }

    pub fn to_u64(self) -> u64 {
        (u64::from(self.seconds) << 32) | u64::from(self.fraction)
    }

    pub fn from_u64(raw: u64) -> Self {
        Self {
            seconds: (raw >> 32) as u32,
            fraction: raw as u32,
        }
    }
}
