//! Timer host abstraction.
//!
//! The runtime never touches a real clock. It asks a [`TimerHost`] for the
//! current time and for timeouts, intervals and animation frames, and keeps
//! the returned [`TimerId`] so every task can be cancelled.
//!
//! [`ManualHost`] is an in-memory host driven by explicit `advance` calls,
//! used by tests and by anything that wants deterministic time.

use std::cell::{Cell, RefCell};

/// Handle to a scheduled timeout, interval or animation frame.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord)]
pub struct TimerId(pub u64);

/// Clock and timer service the runtime schedules against.
///
/// Implementations are single-threaded; tasks never run concurrently with
/// each other or with the caller.
pub trait TimerHost {
    /// Monotonic time in milliseconds.
    fn now_ms(&self) -> f64;

    /// Run `task` once after `delay_ms`.
    fn set_timeout(&self, delay_ms: u32, task: Box<dyn FnOnce()>) -> TimerId;

    /// Run `task` every `period_ms` until cancelled.
    fn set_interval(&self, period_ms: u32, task: Box<dyn FnMut()>) -> TimerId;

    /// Run `task` before the next paint, passing the frame timestamp.
    fn request_frame(&self, task: Box<dyn FnOnce(f64)>) -> TimerId;

    /// Cancel a pending task. Unknown or already-fired ids are ignored.
    fn cancel(&self, id: TimerId);
}

// =============================================================================
// ManualHost
// =============================================================================

enum Task {
    Once(Box<dyn FnOnce()>),
    Repeat { period_ms: f64, task: Box<dyn FnMut()> },
}

struct Pending {
    id: TimerId,
    due_ms: f64,
    seq: u64,
    task: Task,
}

/// Deterministic in-memory timer host.
///
/// Timers fire in due-time order (registration order breaks ties) as
/// [`advance`](Self::advance) moves the clock. Animation frames queue until
/// [`run_frame`](Self::run_frame) is called.
#[derive(Default)]
pub struct ManualHost {
    now_ms: Cell<f64>,
    next_id: Cell<u64>,
    next_seq: Cell<u64>,
    timers: RefCell<Vec<Pending>>,
    frames: RefCell<Vec<(TimerId, Box<dyn FnOnce(f64)>)>>,
    running: Cell<Option<TimerId>>,
    running_cancelled: Cell<bool>,
}

impl std::fmt::Debug for ManualHost {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("ManualHost")
            .field("now_ms", &self.now_ms.get())
            .field("pending_timers", &self.pending_timers())
            .field("pending_frames", &self.pending_frames())
            .finish()
    }
}

impl ManualHost {
    /// Create a host with the clock at zero.
    #[must_use]
    pub fn new() -> Self {
        Self::default()
    }

    /// Create a host with the clock at `now_ms`.
    #[must_use]
    pub fn starting_at(now_ms: f64) -> Self {
        let host = Self::default();
        host.now_ms.set(now_ms);
        host
    }

    /// Move the clock forward, firing every timer that falls due.
    ///
    /// Timers scheduled by fired tasks also run if they fall due before the
    /// new time.
    pub fn advance(&self, delta_ms: f64) {
        let target = self.now_ms.get() + delta_ms.max(0.0);
        while let Some(pending) = self.take_next_due(target) {
            self.now_ms.set(self.now_ms.get().max(pending.due_ms));
            match pending.task {
                Task::Once(task) => task(),
                Task::Repeat {
                    period_ms,
                    mut task,
                } => {
                    self.running.set(Some(pending.id));
                    self.running_cancelled.set(false);
                    task();
                    self.running.set(None);
                    if !self.running_cancelled.get() {
                        let seq = self.bump_seq();
                        self.timers.borrow_mut().push(Pending {
                            id: pending.id,
                            due_ms: pending.due_ms + period_ms,
                            seq,
                            task: Task::Repeat { period_ms, task },
                        });
                    }
                }
            }
        }
        self.now_ms.set(target);
    }

    /// Run every queued animation frame with the current time.
    ///
    /// Frames requested while running are queued for the next call.
    /// Returns the number of frames run.
    pub fn run_frame(&self) -> usize {
        let frames = std::mem::take(&mut *self.frames.borrow_mut());
        let now = self.now_ms.get();
        let count = frames.len();
        for (_, task) in frames {
            task(now);
        }
        count
    }

    /// Alternate `advance(frame_ms)` and `run_frame` `count` times.
    pub fn advance_frames(&self, frame_ms: f64, count: usize) {
        for _ in 0..count {
            self.advance(frame_ms);
            self.run_frame();
        }
    }

    /// Number of timeouts and intervals still scheduled.
    #[must_use]
    pub fn pending_timers(&self) -> usize {
        self.timers.borrow().len()
    }

    /// Number of animation frames waiting for [`run_frame`](Self::run_frame).
    #[must_use]
    pub fn pending_frames(&self) -> usize {
        self.frames.borrow().len()
    }

    fn take_next_due(&self, target: f64) -> Option<Pending> {
        let mut timers = self.timers.borrow_mut();
        let index = timers
            .iter()
            .enumerate()
            .filter(|(_, p)| p.due_ms <= target)
            .min_by(|(_, a), (_, b)| a.due_ms.total_cmp(&b.due_ms).then(a.seq.cmp(&b.seq)))
            .map(|(i, _)| i)?;
        Some(timers.remove(index))
    }

    fn bump_id(&self) -> TimerId {
        let id = self.next_id.get() + 1;
        self.next_id.set(id);
        TimerId(id)
    }

    fn bump_seq(&self) -> u64 {
        let seq = self.next_seq.get() + 1;
        self.next_seq.set(seq);
        seq
    }

    fn schedule(&self, delay_ms: u32, task: Task) -> TimerId {
        let id = self.bump_id();
        let seq = self.bump_seq();
        self.timers.borrow_mut().push(Pending {
            id,
            due_ms: self.now_ms.get() + f64::from(delay_ms),
            seq,
            task,
        });
        id
    }
}

impl TimerHost for ManualHost {
    fn now_ms(&self) -> f64 {
        self.now_ms.get()
    }

    fn set_timeout(&self, delay_ms: u32, task: Box<dyn FnOnce()>) -> TimerId {
        self.schedule(delay_ms, Task::Once(task))
    }

    fn set_interval(&self, period_ms: u32, task: Box<dyn FnMut()>) -> TimerId {
        let period = period_ms.max(1);
        self.schedule(
            period,
            Task::Repeat {
                period_ms: f64::from(period),
                task,
            },
        )
    }

    fn request_frame(&self, task: Box<dyn FnOnce(f64)>) -> TimerId {
        let id = self.bump_id();
        self.frames.borrow_mut().push((id, task));
        id
    }

    fn cancel(&self, id: TimerId) {
        if self.running.get() == Some(id) {
            self.running_cancelled.set(true);
            return;
        }
        self.timers.borrow_mut().retain(|p| p.id != id);
        self.frames.borrow_mut().retain(|(frame, _)| *frame != id);
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::rc::Rc;

    fn counter() -> (Rc<Cell<u32>>, impl Fn() -> Box<dyn FnMut()>) {
        let count = Rc::new(Cell::new(0));
        let c = Rc::clone(&count);
        (count, move || {
            let c = Rc::clone(&c);
            Box::new(move || c.set(c.get() + 1)) as Box<dyn FnMut()>
        })
    }

    #[test]
    fn test_timeout_fires_once_when_due() {
        let host = ManualHost::new();
        let fired = Rc::new(Cell::new(0));
        let f = Rc::clone(&fired);
        host.set_timeout(100, Box::new(move || f.set(f.get() + 1)));

        host.advance(99.0);
        assert_eq!(fired.get(), 0);
        host.advance(1.0);
        assert_eq!(fired.get(), 1);
        host.advance(1000.0);
        assert_eq!(fired.get(), 1);
        assert_eq!(host.pending_timers(), 0);
    }

    #[test]
    fn test_interval_fires_every_period() {
        let host = ManualHost::new();
        let (count, make) = counter();
        host.set_interval(10, make());
        host.advance(35.0);
        assert_eq!(count.get(), 3);
        assert_eq!(host.now_ms(), 35.0);
    }

    #[test]
    fn test_cancel_interval() {
        let host = ManualHost::new();
        let (count, make) = counter();
        let id = host.set_interval(10, make());
        host.advance(20.0);
        host.cancel(id);
        host.advance(100.0);
        assert_eq!(count.get(), 2);
        assert_eq!(host.pending_timers(), 0);
    }

    #[test]
    fn test_interval_cancels_itself() {
        let host = Rc::new(ManualHost::new());
        let count = Rc::new(Cell::new(0));
        let slot: Rc<Cell<Option<TimerId>>> = Rc::new(Cell::new(None));
        let (h, c, s) = (Rc::clone(&host), Rc::clone(&count), Rc::clone(&slot));
        let id = host.set_interval(
            10,
            Box::new(move || {
                c.set(c.get() + 1);
                if c.get() == 2 {
                    if let Some(id) = s.get() {
                        h.cancel(id);
                    }
                }
            }),
        );
        slot.set(Some(id));
        host.advance(100.0);
        assert_eq!(count.get(), 2);
    }

    #[test]
    fn test_ties_fire_in_registration_order() {
        let host = ManualHost::new();
        let order = Rc::new(RefCell::new(Vec::new()));
        for label in ["a", "b", "c"] {
            let o = Rc::clone(&order);
            host.set_timeout(50, Box::new(move || o.borrow_mut().push(label)));
        }
        host.advance(50.0);
        assert_eq!(*order.borrow(), vec!["a", "b", "c"]);
    }

    #[test]
    fn test_timeout_scheduled_by_task_fires_within_same_advance() {
        let host = Rc::new(ManualHost::new());
        let fired_at = Rc::new(Cell::new(0.0));
        let (h, f) = (Rc::clone(&host), Rc::clone(&fired_at));
        host.set_timeout(
            10,
            Box::new(move || {
                let h2 = Rc::clone(&h);
                h.set_timeout(10, Box::new(move || f.set(h2.now_ms())));
            }),
        );
        host.advance(25.0);
        assert_eq!(fired_at.get(), 20.0);
    }

    #[test]
    fn test_frames_wait_for_run_frame() {
        let host = ManualHost::starting_at(500.0);
        let seen = Rc::new(Cell::new(0.0));
        let s = Rc::clone(&seen);
        host.request_frame(Box::new(move |ts: f64| s.set(ts)));
        assert_eq!(host.pending_frames(), 1);
        host.advance(16.0);
        assert_eq!(seen.get(), 0.0);
        assert_eq!(host.run_frame(), 1);
        assert_eq!(seen.get(), 516.0);
        assert_eq!(host.pending_frames(), 0);
    }

    #[test]
    fn test_cancel_frame() {
        let host = ManualHost::new();
        let id = host.request_frame(Box::new(|_: f64| panic!("cancelled frame ran")));
        host.cancel(id);
        assert_eq!(host.run_frame(), 0);
    }

    #[test]
    fn test_cancel_unknown_id_is_ignored() {
        let host = ManualHost::new();
        host.cancel(TimerId(42));
        assert_eq!(host.pending_timers(), 0);
    }
}
