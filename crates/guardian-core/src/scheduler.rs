//! Viewport activity scheduler.
//!
//! Owns every piece of timed behavior on the page:
//!
//! - the throttled active-section recompute driven by scroll events,
//! - the live statistic loop (one immediate fire, then every interval),
//! - the alert card pulse loop,
//! - the counter animations the statistic loop starts.
//!
//! All tasks are registered through the [`TimerHost`] and their ids kept, so
//! [`ViewportActivityScheduler::shutdown`] can tear everything down.

use crate::animation::{animate_number, AnimationHandle, NumberTween};
use crate::config::SchedulerConfig;
use crate::host::{TimerHost, TimerId};
use crate::page::PageView;
use crate::pulse::{pulse_alert_cards, HeldPulses};
use crate::random::SharedRandom;
use crate::section::{apply_active_section, resolve_active_section, scroll_cursor};
use crate::stats::{plan_mutation, StatMutation};
use crate::throttle::ThrottleGate;
use std::cell::RefCell;
use std::rc::Rc;
use tracing::{debug, info, warn};

struct Shared<H: TimerHost, P: PageView> {
    host: Rc<H>,
    page: Rc<P>,
    rng: SharedRandom,
    config: SchedulerConfig,
    active_section: RefCell<Option<String>>,
    animations: RefCell<Vec<AnimationHandle>>,
    pulses: Rc<HeldPulses<P::Node>>,
}

impl<H, P> Shared<H, P>
where
    H: TimerHost + 'static,
    P: PageView + 'static,
{
    fn recompute_active_section(&self) -> Option<String> {
        let cursor = scroll_cursor(self.page.scroll_offset(), self.config.look_ahead_px);
        let sections = self.page.sections();
        let winner = resolve_active_section(cursor, &sections).map(|s| s.id.clone());
        let marked = apply_active_section(&*self.page, winner.as_deref());
        debug!(cursor, section = ?winner, marked, "active section recomputed");
        self.active_section.borrow_mut().clone_from(&winner);
        winner
    }

    fn update_live_stats(&self) -> Vec<StatMutation> {
        let mut applied = Vec::new();
        for node in self.page.stat_values() {
            let text = self.page.text(&node);
            let planned = plan_mutation(&text, &mut *self.rng.borrow_mut(), &self.config);
            let mutation = match planned {
                Ok(Some(mutation)) => mutation,
                Ok(None) => continue,
                Err(err) => {
                    warn!(%err, "skipping statistic");
                    continue;
                }
            };
            let tween = NumberTween::new(
                mutation.current,
                mutation.target,
                self.host.now_ms(),
                f64::from(self.config.animation_duration_ms),
            );
            let handle = animate_number(&self.host, &self.page, node, tween);
            self.animations.borrow_mut().push(handle);
            applied.push(mutation);
        }
        self.animations
            .borrow_mut()
            .retain(|a| !a.is_finished() && !a.is_cancelled());
        debug!(mutated = applied.len(), "live stats updated");
        applied
    }

    fn pulse_alerts(&self) -> usize {
        pulse_alert_cards(
            &self.host,
            &self.page,
            &mut *self.rng.borrow_mut(),
            &self.config,
            &self.pulses,
        )
    }
}

/// Scroll highlighting, live statistics and alert pulses for one page.
pub struct ViewportActivityScheduler<H: TimerHost, P: PageView> {
    shared: Rc<Shared<H, P>>,
    scroll_gate: ThrottleGate<H>,
    tasks: RefCell<Vec<TimerId>>,
}

impl<H: TimerHost, P: PageView> std::fmt::Debug for ViewportActivityScheduler<H, P> {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("ViewportActivityScheduler")
            .field("active_section", &self.shared.active_section.borrow())
            .field("tasks", &self.tasks.borrow().len())
            .field("config", &self.shared.config)
            .finish_non_exhaustive()
    }
}

impl<H, P> ViewportActivityScheduler<H, P>
where
    H: TimerHost + 'static,
    P: PageView + 'static,
{
    /// Create a stopped scheduler.
    pub fn new(host: Rc<H>, page: Rc<P>, rng: SharedRandom, config: SchedulerConfig) -> Self {
        let scroll_gate = ThrottleGate::new(Rc::clone(&host), config.scroll_throttle_ms);
        Self {
            shared: Rc::new(Shared {
                host,
                page,
                rng,
                config,
                active_section: RefCell::new(None),
                animations: RefCell::new(Vec::new()),
                pulses: Rc::new(HeldPulses::new()),
            }),
            scroll_gate,
            tasks: RefCell::new(Vec::new()),
        }
    }

    /// Register the recurring loops and run the first statistic update.
    ///
    /// Calling `start` on a running scheduler does nothing.
    pub fn start(&self) {
        if !self.tasks.borrow().is_empty() {
            return;
        }
        let config = &self.shared.config;

        let shared = Rc::clone(&self.shared);
        let pulse = self.shared.host.set_interval(
            config.pulse_interval_ms,
            Box::new(move || {
                shared.pulse_alerts();
            }),
        );

        let shared = Rc::clone(&self.shared);
        let stats = self.shared.host.set_interval(
            config.stats_interval_ms,
            Box::new(move || {
                shared.update_live_stats();
            }),
        );

        self.tasks.borrow_mut().extend([pulse, stats]);
        info!(
            stats_interval_ms = config.stats_interval_ms,
            pulse_interval_ms = config.pulse_interval_ms,
            "viewport activity scheduler started"
        );
        self.shared.update_live_stats();
    }

    /// Feed a scroll event. Returns whether the recompute ran.
    pub fn on_scroll(&self) -> bool {
        self.scroll_gate
            .run(|| self.shared.recompute_active_section())
            .is_some()
    }

    /// Recompute the active section now, bypassing the throttle.
    pub fn recompute_active_section(&self) -> Option<String> {
        self.shared.recompute_active_section()
    }

    /// Run one statistic update now.
    pub fn update_live_stats(&self) -> Vec<StatMutation> {
        self.shared.update_live_stats()
    }

    /// Run one pulse roll now.
    pub fn pulse_alerts(&self) -> usize {
        self.shared.pulse_alerts()
    }

    /// Section currently marked active.
    pub fn active_section(&self) -> Option<String> {
        self.shared.active_section.borrow().clone()
    }

    /// Whether the recurring loops are registered.
    pub fn is_running(&self) -> bool {
        !self.tasks.borrow().is_empty()
    }

    /// Animations started by the statistic loop that have not finished.
    pub fn animations_in_flight(&self) -> usize {
        self.shared
            .animations
            .borrow()
            .iter()
            .filter(|a| !a.is_finished() && !a.is_cancelled())
            .count()
    }

    /// The active configuration.
    pub fn config(&self) -> &SchedulerConfig {
        &self.shared.config
    }

    /// Alert cards still emphasized by a pulse.
    pub fn pulses_held(&self) -> usize {
        self.shared.pulses.len()
    }

    /// Cancel the loops, the throttle cooldown and running animations, and
    /// restore pulsed alert cards.
    pub fn shutdown(&self) {
        let host = &self.shared.host;
        for id in self.tasks.borrow_mut().drain(..) {
            host.cancel(id);
        }
        self.scroll_gate.reset();
        for animation in self.shared.animations.borrow_mut().drain(..) {
            animation.cancel(&**host);
        }
        let restored = self.shared.pulses.release(&**host, &*self.shared.page);
        info!(restored, "viewport activity scheduler stopped");
    }
}
