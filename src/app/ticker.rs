//! Frame clock and next-tick queue.

use std::cell::{Cell, RefCell};
use std::fmt;

type Task = Box<dyn FnOnce()>;

/// Tracks frame time and runs one-shot callbacks on the next tick.
///
/// Callbacks queued while a tick is draining the queue run on the following
/// tick, never the current one.
pub struct Ticker {
    max_delta: f64,
    queue: RefCell<Vec<Task>>,
    elapsed: Cell<f64>,
    last_delta: Cell<f64>,
    frame: Cell<u64>,
}

impl Ticker {
    /// Create a ticker that clamps frame deltas to `max_delta` ms.
    #[must_use]
    pub fn new(max_delta: f64) -> Self {
        Self {
            max_delta,
            queue: RefCell::new(Vec::new()),
            elapsed: Cell::new(0.0),
            last_delta: Cell::new(0.0),
            frame: Cell::new(0),
        }
    }

    /// Run `task` on the next tick.
    pub fn add_once(&self, task: impl FnOnce() + 'static) {
        self.queue.borrow_mut().push(Box::new(task));
    }

    /// Record a frame of `dt` ms. Returns the clamped delta.
    pub(crate) fn begin_frame(&self, dt: f64) -> f64 {
        let dt = dt.max(0.0).min(self.max_delta);
        self.last_delta.set(dt);
        self.elapsed.set(self.elapsed.get() + dt);
        self.frame.set(self.frame.get() + 1);
        dt
    }

    /// Take every queued task, leaving the queue empty.
    pub(crate) fn take_pending(&self) -> Vec<Task> {
        std::mem::take(&mut *self.queue.borrow_mut())
    }

    #[must_use]
    pub fn pending(&self) -> usize {
        self.queue.borrow().len()
    }

    /// Total clamped time, in ms.
    #[must_use]
    pub fn elapsed(&self) -> f64 {
        self.elapsed.get()
    }

    /// Clamped delta of the latest frame, in ms.
    #[must_use]
    pub fn last_delta(&self) -> f64 {
        self.last_delta.get()
    }

    #[must_use]
    pub fn frame_count(&self) -> u64 {
        self.frame.get()
    }

    #[must_use]
    pub fn max_delta(&self) -> f64 {
        self.max_delta
    }
}

impl fmt::Debug for Ticker {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("Ticker")
            .field("frame", &self.frame.get())
            .field("elapsed", &self.elapsed.get())
            .field("pending", &self.pending())
            .finish()
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::rc::Rc;

    #[test]
    fn test_delta_is_clamped() {
        let ticker = Ticker::new(100.0);
        assert_eq!(ticker.begin_frame(16.0), 16.0);
        assert_eq!(ticker.begin_frame(500.0), 100.0);
        assert_eq!(ticker.begin_frame(-3.0), 0.0);
        assert_eq!(ticker.elapsed(), 116.0);
        assert_eq!(ticker.frame_count(), 3);
    }

    #[test]
    fn test_take_pending_drains_queue() {
        let ticker = Ticker::new(100.0);
        let hits = Rc::new(Cell::new(0));
        let h = hits.clone();
        ticker.add_once(move || h.set(h.get() + 1));

        let tasks = ticker.take_pending();
        assert_eq!(ticker.pending(), 0);
        for task in tasks {
            task();
        }
        assert_eq!(hits.get(), 1);
        assert!(ticker.take_pending().is_empty());
    }
}
