//! ## nplay-core::time
//! **Delivery timestamp scheduling**
//!
//! Delivery time for event `n` (counting from 1):
//!
//! `process_start + (capture_ts - first_seen) * time_warp + n * guard_interval`
//!
//! `process_start` is read from the wall clock once, when the scheduler is
//! built. `first_seen` is the capture timestamp of the first scheduled event.

use std::time::{SystemTime, UNIX_EPOCH};

use crate::error::InvalidTimeWarp;
use crate::event::CanonicalEvent;

/// Per-event spacing added on top of the warped offset, in seconds.
pub const DEFAULT_GUARD_INTERVAL: f64 = 20.0;

/// A positive, finite time-warp factor. `1.0` keeps the captured pacing,
/// larger values slow playback down and smaller values speed it up.
#[derive(Debug, Clone, Copy, PartialEq, PartialOrd)]
pub struct TimeWarp(f64);

impl TimeWarp {
    pub fn new(factor: f64) -> Result<Self, InvalidTimeWarp> {
        if factor.is_finite() && factor > 0.0 {
            Ok(Self(factor))
        } else {
            Err(InvalidTimeWarp(factor))
        }
    }

    #[inline]
    pub fn get(self) -> f64 {
        self.0
    }
}

impl Default for TimeWarp {
    fn default() -> Self {
        Self(1.0)
    }
}

/// Current wall-clock time in Unix seconds.
pub fn unix_now() -> f64 {
    SystemTime::now()
        .duration_since(UNIX_EPOCH)
        .map(|d| d.as_secs_f64())
        .unwrap_or_default()
}

/// Computes delivery timestamps. Owned by a single pipeline.
#[derive(Debug, Clone)]
pub struct Scheduler {
    process_start: f64,
    first_seen: Option<f64>,
    time_warp: TimeWarp,
    guard_interval: f64,
    sequence: u64,
}

impl Scheduler {
    /// Creates a scheduler anchored at the current wall-clock time.
    pub fn new(time_warp: TimeWarp, guard_interval: f64) -> Self {
        Self::with_start(unix_now(), time_warp, guard_interval)
    }

    /// Creates a scheduler anchored at an explicit start time.
    pub fn with_start(process_start: f64, time_warp: TimeWarp, guard_interval: f64) -> Self {
        Self {
            process_start,
            first_seen: None,
            time_warp,
            guard_interval,
            sequence: 0,
        }
    }

    /// Returns the delivery timestamp for `event` and advances the sequence counter.
    pub fn schedule(&mut self, event: &CanonicalEvent) -> f64 {
        self.schedule_at(event.timestamp)
    }

    pub fn schedule_at(&mut self, capture_ts: f64) -> f64 {
        let first_seen = *self.first_seen.get_or_insert(capture_ts);
        self.sequence += 1;
        let offset = (capture_ts - first_seen) * self.time_warp.get();
        self.process_start + offset + self.sequence as f64 * self.guard_interval
    }

    /// Warped offset of `capture_ts` from the first scheduled event.
    pub fn offset(&self, capture_ts: f64) -> Option<f64> {
        self.first_seen
            .map(|first| (capture_ts - first) * self.time_warp.get())
    }

    pub fn process_start(&self) -> f64 {
        self.process_start
    }

    pub fn first_seen(&self) -> Option<f64> {
        self.first_seen
    }

    pub fn sequence(&self) -> u64 {
        self.sequence
    }

    pub fn time_warp(&self) -> TimeWarp {
        self.time_warp
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use proptest::prelude::*;

    fn warp(f: f64) -> TimeWarp {
        TimeWarp::new(f).unwrap()
    }

    #[test]
    fn rejects_non_positive_warp() {
        assert!(TimeWarp::new(0.0).is_err());
        assert!(TimeWarp::new(-1.0).is_err());
        assert!(TimeWarp::new(f64::NAN).is_err());
        assert!(TimeWarp::new(f64::INFINITY).is_err());
        assert_eq!(TimeWarp::new(0.5).unwrap().get(), 0.5);
    }

    #[test]
    fn first_event_sets_anchor() {
        let mut scheduler = Scheduler::with_start(1000.0, warp(1.0), 20.0);
        assert_eq!(scheduler.first_seen(), None);
        let ts = scheduler.schedule_at(50.0);
        assert_eq!(scheduler.first_seen(), Some(50.0));
        assert_eq!(scheduler.sequence(), 1);
        assert_eq!(ts, 1020.0);
    }

    #[test]
    fn applies_warp_and_guard() {
        let mut scheduler = Scheduler::with_start(1000.0, warp(2.0), 20.0);
        assert_eq!(scheduler.schedule_at(10.0), 1020.0);
        // offset 1.5s * 2 = 3, second event adds 40
        assert_eq!(scheduler.schedule_at(11.5), 1043.0);
        assert_eq!(scheduler.schedule_at(12.0), 1000.0 + 4.0 + 60.0);
    }

    #[test]
    fn zero_guard_preserves_pacing() {
        let mut scheduler = Scheduler::with_start(0.0, warp(0.5), 0.0);
        assert_eq!(scheduler.schedule_at(100.0), 0.0);
        assert_eq!(scheduler.schedule_at(104.0), 2.0);
    }

    #[test]
    fn first_seen_never_changes() {
        let mut scheduler = Scheduler::with_start(0.0, warp(1.0), 0.0);
        scheduler.schedule_at(5.0);
        scheduler.schedule_at(3.0);
        assert_eq!(scheduler.first_seen(), Some(5.0));
        assert_eq!(scheduler.offset(9.0), Some(4.0));
    }

    fn sorted_timestamps() -> impl Strategy<Value = Vec<f64>> {
        prop::collection::vec(0.0f64..10_000.0, 1..64).prop_map(|mut v| {
            v.sort_by(|a, b| a.partial_cmp(b).unwrap());
            v
        })
    }

    proptest! {
        #[test]
        fn delivery_is_non_decreasing(ts in sorted_timestamps(), w in 0.01f64..100.0, guard in 0.0f64..50.0) {
            let mut scheduler = Scheduler::with_start(1_000_000.0, warp(w), guard);
            let out: Vec<f64> = ts.iter().map(|t| scheduler.schedule_at(*t)).collect();
            for pair in out.windows(2) {
                prop_assert!(pair[0] <= pair[1]);
            }
        }

        #[test]
        fn doubling_warp_doubles_offsets(ts in sorted_timestamps(), w in 0.01f64..50.0) {
            let mut single = Scheduler::with_start(0.0, warp(w), 0.0);
            let mut double = Scheduler::with_start(0.0, warp(w * 2.0), 0.0);
            for t in &ts {
                let a = single.schedule_at(*t);
                let b = double.schedule_at(*t);
                prop_assert!((b - 2.0 * a).abs() <= 1e-6 * a.abs().max(1.0));
            }
        }

        #[test]
        fn deterministic_for_fixed_start(ts in sorted_timestamps(), w in 0.01f64..100.0) {
            let mut a = Scheduler::with_start(42.0, warp(w), 20.0);
            let mut b = Scheduler::with_start(42.0, warp(w), 20.0);
            for t in &ts {
                prop_assert_eq!(a.schedule_at(*t), b.schedule_at(*t));
            }
        }
    }
}
