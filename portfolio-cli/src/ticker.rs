use std::cell::Cell;
use std::rc::Rc;
use std::time::{Duration, Instant};

/// Hands out tick handles and keeps count of the ones still alive.
///
/// Everything runs on the UI thread, so the counter is a plain `Rc<Cell<_>>`.
/// A handle is released when it is dropped; there is no other way to stop it.
#[derive(Clone, Debug, Default)]
pub(crate) struct TickScheduler {
    live: Rc<Cell<usize>>,
}

impl TickScheduler {
    pub(crate) fn new() -> Self {
        Self::default()
    }

    /// Arms a repeating timer whose first tick is due one `interval` after `now`.
    pub(crate) fn schedule(&self, interval: Duration, now: Instant) -> TickHandle {
        self.live.set(self.live.get() + 1);
        tracing::debug!(interval_ms = interval.as_millis() as u64, live = self.live.get(), "timer armed");
        TickHandle {
            interval,
            next_due: now + interval,
            live: Rc::clone(&self.live),
        }
    }

    /// Number of handles that have not been dropped yet.
    pub(crate) fn live(&self) -> usize {
        self.live.get()
    }
}

#[derive(Debug)]
pub(crate) struct TickHandle {
    interval: Duration,
    next_due: Instant,
    live: Rc<Cell<usize>>,
}

impl TickHandle {
    /// Returns true when the deadline has passed, then re-arms at `now + interval`.
    ///
    /// At most one tick fires per call: a stalled frame does not replay missed ticks.
    pub(crate) fn poll(&mut self, now: Instant) -> bool {
        if now < self.next_due {
            return false;
        }
        self.next_due = now + self.interval;
        true
    }

    pub(crate) fn interval(&self) -> Duration {
        self.interval
    }

    pub(crate) fn stop(self) {}
}

impl Drop for TickHandle {
    fn drop(&mut self) {
        self.live.set(self.live.get().saturating_sub(1));
        tracing::debug!(live = self.live.get(), "timer released");
    }
}
