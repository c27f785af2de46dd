//! Leading-edge throttle gate.
//!
//! The first call through an open gate runs immediately and closes the gate
//! for the window. Calls made while it is closed are dropped, not deferred.
//! The gate reopens when the window elapses no matter how many calls were
//! dropped.

use crate::host::{TimerHost, TimerId};
use std::cell::Cell;
use std::rc::Rc;

/// Open/closed latch with a timer-driven reopen.
#[derive(Debug)]
pub struct ThrottleGate<H: TimerHost> {
    host: Rc<H>,
    window_ms: u32,
    closed: Rc<Cell<bool>>,
    cooldown: Cell<Option<TimerId>>,
}

impl<H: TimerHost> ThrottleGate<H> {
    /// Create an open gate.
    pub fn new(host: Rc<H>, window_ms: u32) -> Self {
        Self {
            host,
            window_ms,
            closed: Rc::new(Cell::new(false)),
            cooldown: Cell::new(None),
        }
    }

    /// Cooldown window length.
    pub const fn window_ms(&self) -> u32 {
        self.window_ms
    }

    /// Whether the next call would run.
    pub fn is_open(&self) -> bool {
        !self.closed.get()
    }

    /// Run `action` if the gate is open, closing it for the window.
    ///
    /// The gate closes before `action` runs, so re-entrant calls are dropped.
    pub fn run<R>(&self, action: impl FnOnce() -> R) -> Option<R> {
        if self.closed.get() {
            return None;
        }
        self.closed.set(true);
        let closed = Rc::clone(&self.closed);
        let id = self
            .host
            .set_timeout(self.window_ms, Box::new(move || closed.set(false)));
        self.cooldown.set(Some(id));
        Some(action())
    }

    /// Cancel any pending reopen timer and reopen immediately.
    pub fn reset(&self) {
        if let Some(id) = self.cooldown.take() {
            self.host.cancel(id);
        }
        self.closed.set(false);
    }
}

/// A function wrapped in a [`ThrottleGate`].
pub struct Throttled<H: TimerHost, F> {
    gate: ThrottleGate<H>,
    action: F,
}

impl<H: TimerHost, F> std::fmt::Debug for Throttled<H, F> {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("Throttled")
            .field("window_ms", &self.gate.window_ms)
            .field("open", &self.gate.is_open())
            .finish_non_exhaustive()
    }
}

impl<H: TimerHost, F> Throttled<H, F> {
    /// Invoke the wrapped function with `arg` if the gate is open.
    ///
    /// Returns whether the function ran.
    pub fn call<A>(&mut self, arg: A) -> bool
    where
        F: FnMut(A),
    {
        let action = &mut self.action;
        self.gate.run(|| action(arg)).is_some()
    }

    /// The underlying gate.
    pub const fn gate(&self) -> &ThrottleGate<H> {
        &self.gate
    }
}

/// Wrap `action` so it runs at most once per `window_ms`.
pub fn throttle<H: TimerHost, F>(host: Rc<H>, window_ms: u32, action: F) -> Throttled<H, F> {
    Throttled {
        gate: ThrottleGate::new(host, window_ms),
        action,
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::host::ManualHost;
    use proptest::prelude::*;

    #[test]
    fn test_first_call_runs() {
        let host = Rc::new(ManualHost::new());
        let gate = ThrottleGate::new(Rc::clone(&host), 100);
        assert!(gate.is_open());
        assert_eq!(gate.run(|| 7), Some(7));
        assert!(!gate.is_open());
    }

    #[test]
    fn test_calls_during_cooldown_are_dropped() {
        let host = Rc::new(ManualHost::new());
        let gate = ThrottleGate::new(Rc::clone(&host), 100);
        assert!(gate.run(|| ()).is_some());
        host.advance(50.0);
        assert!(gate.run(|| ()).is_none());
        host.advance(49.0);
        assert!(gate.run(|| ()).is_none());
    }

    #[test]
    fn test_reopens_after_window_without_trailing_call() {
        let host = Rc::new(ManualHost::new());
        let mut runs = 0;
        let mut wrapped = throttle(Rc::clone(&host), 100, |n: i32| runs += n);
        assert!(wrapped.call(1));
        assert!(!wrapped.call(10));
        assert!(!wrapped.call(100));
        host.advance(100.0);
        assert!(wrapped.gate().is_open());
        assert!(wrapped.call(1000));
        drop(wrapped);
        assert_eq!(runs, 1001);
    }

    #[test]
    fn test_reentrant_call_is_dropped() {
        let host = Rc::new(ManualHost::new());
        let gate = ThrottleGate::new(Rc::clone(&host), 100);
        let inner = gate.run(|| gate.run(|| ()));
        assert_eq!(inner, Some(None));
    }

    #[test]
    fn test_reset_cancels_cooldown() {
        let host = Rc::new(ManualHost::new());
        let gate = ThrottleGate::new(Rc::clone(&host), 100);
        gate.run(|| ());
        assert_eq!(host.pending_timers(), 1);
        gate.reset();
        assert!(gate.is_open());
        assert_eq!(host.pending_timers(), 0);
    }

    proptest! {
        #[test]
        fn prop_executions_bounded_by_windows(
            window in 1u32..500,
            gaps in proptest::collection::vec(0u32..400, 1..200),
        ) {
            let host = Rc::new(ManualHost::new());
            let gate = ThrottleGate::new(Rc::clone(&host), window);
            let mut executed = 0u64;
            let mut total = 0u64;
            for (i, gap) in gaps.iter().enumerate() {
                if i > 0 {
                    host.advance(f64::from(*gap));
                    total += u64::from(*gap);
                }
                if gate.run(|| ()).is_some() {
                    executed += 1;
                }
                if i == 0 {
                    prop_assert_eq!(executed, 1);
                }
            }
            let bound = total.div_ceil(u64::from(window)) + 1;
            prop_assert!(executed <= bound, "{} > {}", executed, bound);
        }
    }
}
