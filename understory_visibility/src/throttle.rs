// Copyright 2025 the Understory Authors
// SPDX-License-Identifier: Apache-2.0 OR MIT

//! Leading-edge throttle with a single trailing call.
//!
//! The throttle owns no timer. Callers feed it timestamps in milliseconds and
//! ask for [`Throttle::deadline`] to know when to come back:
//!
//! ```
//! use understory_visibility::Throttle;
//!
//! let mut t = Throttle::new(100);
//! assert!(t.trigger(1000)); // leading edge runs immediately
//! assert!(!t.trigger(1020)); // suppressed, remembered
//! assert!(!t.trigger(1050));
//! assert_eq!(t.deadline(), Some(1100));
//! assert!(!t.poll(1099));
//! assert!(t.poll(1100)); // one trailing run for the whole burst
//! assert!(!t.poll(1200));
//! ```

/// Rate limiter allowing at most one run per interval.
///
/// - The first trigger in a quiet period runs immediately.
/// - Triggers inside the window are coalesced into one pending run.
/// - The pending run becomes due when the window elapses; see [`Throttle::poll`].
#[derive(Clone, Debug, Default, PartialEq, Eq)]
pub struct Throttle {
    interval: u64,
    last_run: Option<u64>,
    pending: bool,
}

impl Throttle {
    /// Create a throttle with the given interval in milliseconds.
    pub const fn new(interval: u64) -> Self {
        Self {
            interval,
            last_run: None,
            pending: false,
        }
    }

    /// The interval in milliseconds.
    pub const fn interval(&self) -> u64 {
        self.interval
    }

    /// Change the interval. A pending run keeps its place but its deadline moves.
    pub fn set_interval(&mut self, interval: u64) {
        self.interval = interval;
    }

    /// Record a trigger at `now`. Returns `true` if the caller should run now.
    pub fn trigger(&mut self, now: u64) -> bool {
        let open = self
            .last_run
            .is_none_or(|last| now.saturating_sub(last) >= self.interval);
        if open {
            self.last_run = Some(now);
            self.pending = false;
        } else {
            self.pending = true;
        }
        open
    }

    /// Returns `true` and consumes the pending run if it is due at `now`.
    pub fn poll(&mut self, now: u64) -> bool {
        match self.deadline() {
            Some(deadline) if now >= deadline => {
                self.pending = false;
                self.last_run = Some(now);
                true
            }
            _ => false,
        }
    }

    /// When the pending run becomes due, if there is one.
    pub fn deadline(&self) -> Option<u64> {
        if !self.pending {
            return None;
        }
        Some(
            self.last_run
                .map_or(0, |last| last.saturating_add(self.interval)),
        )
    }

    /// Whether a trailing run is waiting.
    pub const fn is_pending(&self) -> bool {
        self.pending
    }

    /// Drop any pending run and reopen the window.
    pub fn cancel(&mut self) {
        self.pending = false;
        self.last_run = None;
    }
}

#[cfg(test)]
mod tests {
    use super::Throttle;

    #[test]
    fn burst_runs_leading_and_one_trailing() {
        let mut t = Throttle::new(150);
        let fired: usize = [0_u64, 10, 20, 50, 149]
            .into_iter()
            .map(|now| usize::from(t.trigger(now)))
            .sum();
        assert_eq!(fired, 1, "only the leading edge runs inside the window");
        assert_eq!(t.deadline(), Some(150), "trailing run at window end");
        assert!(t.poll(150), "trailing run");
        assert!(!t.is_pending(), "consumed");
        assert!(!t.poll(400), "nothing left");
    }

    #[test]
    fn single_event_has_no_trailing_run() {
        let mut t = Throttle::new(100);
        assert!(t.trigger(5), "leading");
        assert_eq!(t.deadline(), None, "no pending run");
        assert!(!t.poll(1_000), "no trailing run");
    }

    #[test]
    fn trailing_run_starts_a_new_window() {
        let mut t = Throttle::new(100);
        assert!(t.trigger(0), "leading");
        assert!(!t.trigger(50), "suppressed");
        assert!(t.poll(100), "trailing");
        assert!(!t.trigger(150), "inside the window opened by the trailing run");
        assert_eq!(t.deadline(), Some(200), "next trailing");
        assert!(t.trigger(260), "late trigger runs immediately and clears pending");
        assert!(!t.is_pending(), "cleared");
    }

    #[test]
    fn zero_interval_never_throttles() {
        let mut t = Throttle::new(0);
        for now in [0, 0, 1, 1, 2] {
            assert!(t.trigger(now), "trigger at {now}");
        }
        assert!(!t.is_pending(), "nothing coalesced");
    }

    #[test]
    fn cancel_drops_pending_run() {
        let mut t = Throttle::new(100);
        assert!(t.trigger(0), "leading");
        assert!(!t.trigger(10), "suppressed");
        t.cancel();
        assert_eq!(t.deadline(), None, "cancelled");
        assert!(!t.poll(500), "no dangling run");
        assert!(t.trigger(20), "window reopened");
    }

    #[test]
    fn interval_change_moves_deadline() {
        let mut t = Throttle::new(100);
        assert!(t.trigger(0), "leading");
        assert!(!t.trigger(10), "suppressed");
        t.set_interval(30);
        assert_eq!(t.interval(), 30, "interval");
        assert_eq!(t.deadline(), Some(30), "deadline follows the new interval");
    }
}
