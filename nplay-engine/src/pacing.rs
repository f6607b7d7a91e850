//! Optional real-time pacing for trace replay.

use std::sync::atomic::{AtomicBool, Ordering};
use std::thread;
use std::time::{Duration, Instant};

use nplay_core::time::TimeWarp;

/// Longest single sleep; a stop request is noticed within this.
const SLEEP_SLICE: Duration = Duration::from_millis(100);

/// Keeps wall-clock gaps between sends at least the warped capture gaps.
#[derive(Debug)]
pub struct Pacer {
    time_warp: f64,
    last: Option<(f64, Instant)>,
}

impl Pacer {
    pub fn new(time_warp: TimeWarp) -> Self {
        Pacer {
            time_warp: time_warp.get(),
            last: None,
        }
    }

    /// Wait owed before sending the packet captured at `capture_ts`.
    pub fn delay_for(&self, capture_ts: f64, now: Instant) -> Duration {
        let Some((last_ts, sent_at)) = self.last else {
            return Duration::ZERO;
        };
        let gap = (capture_ts - last_ts) * self.time_warp;
        let elapsed = now.saturating_duration_since(sent_at).as_secs_f64();
        Duration::try_from_secs_f64(gap - elapsed).unwrap_or(Duration::ZERO)
    }

    pub fn mark_sent(&mut self, capture_ts: f64, at: Instant) {
        self.last = Some((capture_ts, at));
    }

    /// Sleeps for the owed delay unless `terminate` is raised first.
    /// Returns `false` if interrupted. A delay past the clock's range
    /// waits for `terminate` alone.
    pub fn wait(&self, capture_ts: f64, terminate: &AtomicBool) -> bool {
        let now = Instant::now();
        let deadline = now.checked_add(self.delay_for(capture_ts, now));
        loop {
            if terminate.load(Ordering::Relaxed) {
                return false;
            }
            let now = Instant::now();
            let slice = match deadline {
                Some(deadline) if now >= deadline => return true,
                Some(deadline) => (deadline - now).min(SLEEP_SLICE),
                None => SLEEP_SLICE,
            };
            thread::sleep(slice);
        }
    }
}
