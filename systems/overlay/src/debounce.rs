use std::time::Duration;

/// Collapses bursts of notifications into a single firing.
///
/// Timestamps are supplied by the caller as the time elapsed since an
/// arbitrary origin, which keeps the debouncer deterministic.
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub struct Debouncer {
    interval: Duration,
    deadline: Option<Duration>,
}

impl Debouncer {
    /// Creates a debouncer that fires once `interval` elapsed without a new
    /// notification.
    #[must_use]
    pub const fn new(interval: Duration) -> Self {
        Self {
            interval,
            deadline: None,
        }
    }

    /// Quiet period required before firing.
    #[must_use]
    pub const fn interval(&self) -> Duration {
        self.interval
    }

    /// Records a notification, superseding any pending one.
    pub fn notify(&mut self, now: Duration) {
        self.deadline = Some(now.saturating_add(self.interval));
    }

    /// Reports whether a notification is waiting to fire.
    #[must_use]
    pub const fn is_pending(&self) -> bool {
        self.deadline.is_some()
    }

    /// Fires at most once per burst, as soon as the quiet period elapsed.
    pub fn poll(&mut self, now: Duration) -> bool {
        match self.deadline {
            Some(deadline) if now >= deadline => {
                self.deadline = None;
                true
            }
            _ => false,
        }
    }
}
