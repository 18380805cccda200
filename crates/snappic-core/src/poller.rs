use std::time::{Duration, Instant};

use crate::error::SnappicError;

pub const DEFAULT_POLL_INTERVAL: Duration = Duration::from_millis(2000);

/// Fixed-interval schedule for gallery refreshes.
///
/// The poller owns at most one pending deadline. Pausing clears it, so a
/// paused poller never reports a poll as due.
#[derive(Debug, Clone)]
pub struct Poller {
    interval: Duration,
    next_due: Option<Instant>,
}

impl Poller {
    /// Create a paused poller.
    pub fn new(interval: Duration) -> Result<Self, SnappicError> {
        if interval.is_zero() {
            return Err(SnappicError::InvalidInput(
                "poll interval must be greater than zero".into(),
            ));
        }
        Ok(Self {
            interval,
            next_due: None,
        })
    }

    pub fn interval(&self) -> Duration {
        self.interval
    }

    pub fn is_running(&self) -> bool {
        self.next_due.is_some()
    }

    /// Start the schedule from `now` if paused. Returns true in that case;
    /// the caller is expected to fetch immediately. A running poller keeps
    /// its pending deadline.
    pub fn resume(&mut self, now: Instant) -> bool {
        if self.next_due.is_some() {
            return false;
        }
        self.next_due = Some(now + self.interval);
        true
    }

    pub fn pause(&mut self) {
        self.next_due = None;
    }

    /// Returns true if a poll is due at `now`, advancing the deadline by one
    /// interval from `now`.
    pub fn take_due(&mut self, now: Instant) -> bool {
        match self.next_due {
            Some(due) if now >= due => {
                self.next_due = Some(now + self.interval);
                true
            }
            _ => false,
        }
    }

    pub fn time_until_due(&self, now: Instant) -> Option<Duration> {
        self.next_due.map(|due| due.saturating_duration_since(now))
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    const TICK: Duration = Duration::from_millis(2000);

    #[test]
    fn rejects_zero_interval() {
        assert!(Poller::new(Duration::ZERO).is_err());
    }

    #[test]
    fn starts_paused() {
        let mut p = Poller::new(TICK).unwrap();
        assert!(!p.is_running());
        assert!(!p.take_due(Instant::now() + TICK * 10));
        assert_eq!(p.time_until_due(Instant::now()), None);
    }

    #[test]
    fn fires_once_per_interval() {
        let now = Instant::now();
        let mut p = Poller::new(TICK).unwrap();
        assert!(p.resume(now));
        assert!(!p.take_due(now + Duration::from_millis(1999)));
        assert!(p.take_due(now + TICK));
        assert!(!p.take_due(now + TICK));
        assert!(p.take_due(now + TICK * 2));
    }

    #[test]
    fn pause_cancels_pending_deadline() {
        let now = Instant::now();
        let mut p = Poller::new(TICK).unwrap();
        p.resume(now);
        p.pause();
        assert!(!p.is_running());
        assert!(!p.take_due(now + TICK * 5));
    }

    #[test]
    fn resume_while_running_keeps_deadline() {
        let now = Instant::now();
        let mut p = Poller::new(TICK).unwrap();
        assert!(p.resume(now));
        assert!(!p.resume(now + Duration::from_millis(1500)));
        assert_eq!(
            p.time_until_due(now + Duration::from_millis(1500)),
            Some(Duration::from_millis(500))
        );
        assert!(p.take_due(now + TICK));
    }

    #[test]
    fn time_until_due_saturates() {
        let now = Instant::now();
        let mut p = Poller::new(TICK).unwrap();
        p.resume(now);
        assert_eq!(p.time_until_due(now + TICK * 3), Some(Duration::ZERO));
    }
}
