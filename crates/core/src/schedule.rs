use std::time::{Duration, Instant};

/// Fixed-period tick schedule driven by the UI loop.
///
/// The loop sleeps until [`deadline`](Self::deadline), checks
/// [`is_due`](Self::is_due), runs the tick to completion and calls
/// [`mark_ran`](Self::mark_ran).  A new deadline is only armed after a tick
/// finishes, so ticks never overlap.
#[derive(Debug, Clone)]
pub struct PollSchedule {
    interval: Duration,
    next_due: Instant,
}

impl PollSchedule {
    /// The first tick is due immediately.
    pub fn new(interval: Duration, now: Instant) -> Self {
        Self {
            interval,
            next_due: now,
        }
    }

    pub fn deadline(&self) -> Instant {
        self.next_due
    }

    pub fn is_due(&self, now: Instant) -> bool {
        now >= self.next_due
    }

    pub fn mark_ran(&mut self, finished_at: Instant) {
        self.next_due = finished_at + self.interval;
    }

    /// Make the next check due right away (e.g. the details view was opened).
    pub fn trigger_now(&mut self, now: Instant) {
        self.next_due = now;
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    const INTERVAL: Duration = Duration::from_millis(2000);

    #[test]
    fn first_tick_is_immediate() {
        let t0 = Instant::now();
        let s = PollSchedule::new(INTERVAL, t0);
        assert!(s.is_due(t0));
    }

    #[test]
    fn next_tick_waits_a_full_interval_after_completion() {
        let t0 = Instant::now();
        let mut s = PollSchedule::new(INTERVAL, t0);
        // A slow tick that took 3 seconds.
        let finished = t0 + Duration::from_secs(3);
        s.mark_ran(finished);
        assert!(!s.is_due(finished + Duration::from_millis(1999)));
        assert!(s.is_due(finished + INTERVAL));
        assert_eq!(s.deadline(), finished + INTERVAL);
    }

    #[test]
    fn trigger_now_pulls_the_deadline_in() {
        let t0 = Instant::now();
        let mut s = PollSchedule::new(INTERVAL, t0);
        s.mark_ran(t0);
        let later = t0 + Duration::from_millis(300);
        assert!(!s.is_due(later));
        s.trigger_now(later);
        assert!(s.is_due(later));
    }
}
