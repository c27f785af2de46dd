//! [`TimerHost`] over the browser's timers and animation frames.

use gloo::render::{request_animation_frame, AnimationFrame};
use gloo::timers::callback::{Interval, Timeout};
use guardian_core::{TimerHost, TimerId};
use std::cell::{Cell, RefCell};
use std::collections::HashMap;
use std::rc::Rc;
use web_sys::Performance;

#[derive(Default)]
struct Scheduled {
    timeouts: HashMap<TimerId, Timeout>,
    intervals: HashMap<TimerId, Interval>,
    frames: HashMap<TimerId, AnimationFrame>,
}

/// Browser timer host.
///
/// Every task is held as a `gloo` handle keyed by its [`TimerId`]; dropping
/// the handle cancels the task. One-shot tasks remove their own handle when
/// they fire.
pub struct BrowserHost {
    performance: Option<Performance>,
    next_id: Cell<u64>,
    scheduled: Rc<RefCell<Scheduled>>,
}

impl std::fmt::Debug for BrowserHost {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        let scheduled = self.scheduled.borrow();
        f.debug_struct("BrowserHost")
            .field("timeouts", &scheduled.timeouts.len())
            .field("intervals", &scheduled.intervals.len())
            .field("frames", &scheduled.frames.len())
            .finish()
    }
}

impl BrowserHost {
    /// Host reading time from `window.performance`, or `Date.now()` without it.
    #[must_use]
    pub fn new() -> Self {
        Self {
            performance: web_sys::window().and_then(|w| w.performance()),
            next_id: Cell::new(0),
            scheduled: Rc::default(),
        }
    }

    /// Number of tasks not yet fired or cancelled.
    #[must_use]
    pub fn pending(&self) -> usize {
        let scheduled = self.scheduled.borrow();
        scheduled.timeouts.len() + scheduled.intervals.len() + scheduled.frames.len()
    }

    fn bump_id(&self) -> TimerId {
        let id = self.next_id.get() + 1;
        self.next_id.set(id);
        TimerId(id)
    }
}

impl Default for BrowserHost {
    fn default() -> Self {
        Self::new()
    }
}

impl TimerHost for BrowserHost {
    fn now_ms(&self) -> f64 {
        self.performance
            .as_ref()
            .map_or_else(js_sys::Date::now, Performance::now)
    }

    fn set_timeout(&self, delay_ms: u32, task: Box<dyn FnOnce()>) -> TimerId {
        let id = self.bump_id();
        let scheduled = Rc::clone(&self.scheduled);
        let timeout = Timeout::new(delay_ms, move || {
            let _fired = scheduled.borrow_mut().timeouts.remove(&id);
            task();
        });
        self.scheduled.borrow_mut().timeouts.insert(id, timeout);
        id
    }

    fn set_interval(&self, period_ms: u32, mut task: Box<dyn FnMut()>) -> TimerId {
        let id = self.bump_id();
        let interval = Interval::new(period_ms, move || task());
        self.scheduled.borrow_mut().intervals.insert(id, interval);
        id
    }

    fn request_frame(&self, task: Box<dyn FnOnce(f64)>) -> TimerId {
        let id = self.bump_id();
        let scheduled = Rc::clone(&self.scheduled);
        let frame = request_animation_frame(move |timestamp| {
            let _fired = scheduled.borrow_mut().frames.remove(&id);
            task(timestamp);
        });
        self.scheduled.borrow_mut().frames.insert(id, frame);
        id
    }

    fn cancel(&self, id: TimerId) {
        let mut scheduled = self.scheduled.borrow_mut();
        let timeout = scheduled.timeouts.remove(&id);
        let interval = scheduled.intervals.remove(&id);
        let frame = scheduled.frames.remove(&id);
        drop(scheduled);
        drop((timeout, interval, frame));
    }
}
