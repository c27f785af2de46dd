//! Counter animation: quartic ease-out tweens of displayed integers.
//!
//! A [`NumberTween`] is a pure function of the frame timestamp.
//! [`animate_number`] drives one against a [`TimerHost`] by requesting a
//! frame, writing the grouped value, and requesting the next frame until the
//! tween completes.

use crate::host::{TimerHost, TimerId};
use crate::page::PageView;
use std::cell::Cell;
use std::rc::Rc;

// =============================================================================
// Easing and formatting
// =============================================================================

/// Quartic ease-out `1 - (1 - t)^4`, with `t` clamped to `[0, 1]`.
#[must_use]
pub fn ease_out_quart(t: f64) -> f64 {
    let t = t.clamp(0.0, 1.0);
    1.0 - (1.0 - t).powi(4)
}

/// Format with comma thousands grouping: `1234567` becomes `"1,234,567"`.
#[must_use]
pub fn format_grouped(value: i64) -> String {
    let digits = value.unsigned_abs().to_string();
    let mut out = String::with_capacity(digits.len() + digits.len() / 3 + 1);
    if value < 0 {
        out.push('-');
    }
    for (i, ch) in digits.chars().enumerate() {
        if i > 0 && (digits.len() - i) % 3 == 0 {
            out.push(',');
        }
        out.push(ch);
    }
    out
}

/// Parse a displayed integer, ignoring comma separators and surrounding
/// whitespace.
#[must_use]
pub fn parse_grouped(text: &str) -> Option<i64> {
    let cleaned: String = text.trim().chars().filter(|c| *c != ',').collect();
    cleaned.parse().ok()
}

// =============================================================================
// NumberTween
// =============================================================================

/// Integer transition from `start` to `end` over a fixed duration.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct NumberTween {
    /// Value shown at progress 0.
    pub start: i64,
    /// Value shown once complete.
    pub end: i64,
    /// Clock reading when the tween began.
    pub started_at_ms: f64,
    /// Total duration.
    pub duration_ms: f64,
}

impl NumberTween {
    /// Create a tween beginning at `started_at_ms`.
    #[must_use]
    pub fn new(start: i64, end: i64, started_at_ms: f64, duration_ms: f64) -> Self {
        Self {
            start,
            end,
            started_at_ms,
            duration_ms,
        }
    }

    /// Linear progress in `[0, 1]`. Frames stamped before the start count as 0.
    #[must_use]
    pub fn progress(&self, now_ms: f64) -> f64 {
        if self.duration_ms <= 0.0 {
            return 1.0;
        }
        ((now_ms - self.started_at_ms) / self.duration_ms).clamp(0.0, 1.0)
    }

    /// Whether the frame at `now_ms` is the last one.
    #[must_use]
    pub fn is_finished(&self, now_ms: f64) -> bool {
        self.progress(now_ms) >= 1.0
    }

    /// Displayed value at `now_ms`. Exactly `end` once finished.
    #[must_use]
    pub fn value_at(&self, now_ms: f64) -> i64 {
        let progress = self.progress(now_ms);
        if progress >= 1.0 {
            return self.end;
        }
        let span = (i128::from(self.end) - i128::from(self.start)) as f64;
        span.mul_add(ease_out_quart(progress), self.start as f64).floor() as i64
    }
}

// =============================================================================
// Driver
// =============================================================================

#[derive(Debug, Default)]
struct HandleState {
    cancelled: Cell<bool>,
    finished: Cell<bool>,
    frame: Cell<Option<TimerId>>,
}

/// Handle to a running counter animation.
#[derive(Debug, Clone, Default)]
pub struct AnimationHandle {
    state: Rc<HandleState>,
}

impl AnimationHandle {
    /// Whether the final value has been written.
    pub fn is_finished(&self) -> bool {
        self.state.finished.get()
    }

    /// Whether the animation was stopped before finishing.
    pub fn is_cancelled(&self) -> bool {
        self.state.cancelled.get()
    }

    /// Stop the animation, leaving the last written value in place.
    pub fn cancel<H: TimerHost + ?Sized>(&self, host: &H) {
        if self.is_finished() {
            return;
        }
        self.state.cancelled.set(true);
        if let Some(id) = self.state.frame.take() {
            host.cancel(id);
        }
    }
}

/// Animate the text of `node` through `tween`, one write per frame.
pub fn animate_number<H, P>(host: &Rc<H>, page: &Rc<P>, node: P::Node, tween: NumberTween) -> AnimationHandle
where
    H: TimerHost + 'static,
    P: PageView + 'static,
{
    let handle = AnimationHandle::default();
    schedule_frame(Rc::clone(host), Rc::clone(page), node, tween, handle.clone());
    handle
}

fn schedule_frame<H, P>(host: Rc<H>, page: Rc<P>, node: P::Node, tween: NumberTween, handle: AnimationHandle)
where
    H: TimerHost + 'static,
    P: PageView + 'static,
{
    let state = Rc::clone(&handle.state);
    let next_host = Rc::clone(&host);
    let id = host.request_frame(Box::new(move |now_ms: f64| {
        if handle.is_cancelled() {
            return;
        }
        page.set_text(&node, &format_grouped(tween.value_at(now_ms)));
        if tween.is_finished(now_ms) {
            handle.state.frame.set(None);
            handle.state.finished.set(true);
        } else {
            schedule_frame(next_host, page, node, tween, handle);
        }
    }));
    if !state.finished.get() && !state.cancelled.get() {
        state.frame.set(Some(id));
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::host::ManualHost;
    use crate::page::MemoryPage;
    use proptest::prelude::*;

    #[test]
    fn test_ease_out_quart_endpoints() {
        assert_eq!(ease_out_quart(0.0), 0.0);
        assert_eq!(ease_out_quart(1.0), 1.0);
        assert_eq!(ease_out_quart(0.5), 0.9375);
        assert_eq!(ease_out_quart(-1.0), 0.0);
        assert_eq!(ease_out_quart(2.0), 1.0);
    }

    #[test]
    fn test_format_grouped() {
        assert_eq!(format_grouped(0), "0");
        assert_eq!(format_grouped(999), "999");
        assert_eq!(format_grouped(1000), "1,000");
        assert_eq!(format_grouped(1_234_567), "1,234,567");
        assert_eq!(format_grouped(-12_345), "-12,345");
        assert_eq!(format_grouped(i64::MIN), "-9,223,372,036,854,775,808");
    }

    #[test]
    fn test_parse_grouped() {
        assert_eq!(parse_grouped("1,234"), Some(1234));
        assert_eq!(parse_grouped(" 42 "), Some(42));
        assert_eq!(parse_grouped("-7"), Some(-7));
        assert_eq!(parse_grouped("N/A"), None);
        assert_eq!(parse_grouped(""), None);
        assert_eq!(parse_grouped("12.5"), None);
    }

    #[test]
    fn test_tween_values() {
        let tween = NumberTween::new(0, 100, 1000.0, 1000.0);
        assert_eq!(tween.value_at(1000.0), 0);
        assert_eq!(tween.value_at(1500.0), 93);
        assert_eq!(tween.value_at(2000.0), 100);
        assert_eq!(tween.value_at(9000.0), 100);
        assert!(!tween.is_finished(1999.0));
        assert!(tween.is_finished(2000.0));
    }

    #[test]
    fn test_frame_before_start_clamps_to_start() {
        let tween = NumberTween::new(10, 20, 1000.0, 1000.0);
        assert_eq!(tween.progress(990.0), 0.0);
        assert_eq!(tween.value_at(990.0), 10);
    }

    #[test]
    fn test_extreme_span_does_not_overflow() {
        let falling = NumberTween::new(i64::MAX, i64::MIN, 0.0, 1000.0);
        assert_eq!(falling.value_at(0.0), i64::MAX);
        assert!(falling.value_at(500.0) < 0);
        assert_eq!(falling.value_at(1000.0), i64::MIN);

        let rising = NumberTween::new(i64::MIN, 0, 0.0, 1000.0);
        let mid = rising.value_at(500.0);
        assert!(mid > i64::MIN && mid <= 0);
    }

    #[test]
    fn test_zero_duration_jumps_to_end() {
        let tween = NumberTween::new(5, 50, 0.0, 0.0);
        assert!(tween.is_finished(0.0));
        assert_eq!(tween.value_at(0.0), 50);
    }

    #[test]
    fn test_animate_ends_exactly_at_target() {
        let host = Rc::new(ManualHost::new());
        let page = Rc::new(MemoryPage::new());
        let stat = page.add_stat("0");
        let handle = animate_number(&host, &page, stat, NumberTween::new(0, 100, 0.0, 1000.0));

        host.advance_frames(17.0, 100);
        assert!(handle.is_finished());
        assert_eq!(page.text_of(stat), "100");
        assert_eq!(host.pending_frames(), 0);
    }

    #[test]
    fn test_animate_with_irregular_frames() {
        let host = Rc::new(ManualHost::new());
        let page = Rc::new(MemoryPage::new());
        let stat = page.add_stat("1,000");
        let handle = animate_number(&host, &page, stat, NumberTween::new(1000, 1079, 0.0, 1000.0));

        for gap in [3.0, 250.0, 1.0, 600.0, 400.0] {
            host.advance(gap);
            host.run_frame();
        }
        assert!(handle.is_finished());
        assert_eq!(page.text_of(stat), "1,079");
    }

    #[test]
    fn test_cancel_stops_writes() {
        let host = Rc::new(ManualHost::new());
        let page = Rc::new(MemoryPage::new());
        let stat = page.add_stat("0");
        let handle = animate_number(&host, &page, stat, NumberTween::new(0, 100, 0.0, 1000.0));

        host.advance_frames(16.0, 3);
        let writes = page.writes(stat).len();
        handle.cancel(&*host);
        assert!(handle.is_cancelled());
        host.advance_frames(16.0, 100);
        assert_eq!(page.writes(stat).len(), writes);
        assert!(!handle.is_finished());
    }

    #[test]
    fn test_concurrent_animations_are_independent() {
        let host = Rc::new(ManualHost::new());
        let page = Rc::new(MemoryPage::new());
        let up = page.add_stat("0");
        let down = page.add_stat("500");
        animate_number(&host, &page, up, NumberTween::new(0, 50, 0.0, 1000.0));
        animate_number(&host, &page, down, NumberTween::new(500, 480, 0.0, 1000.0));

        host.advance_frames(20.0, 60);
        assert_eq!(page.text_of(up), "50");
        assert_eq!(page.text_of(down), "480");
    }

    proptest! {
        #[test]
        fn prop_tween_monotonic_for_increasing(
            start in 0i64..1_000_000,
            rise in 0i64..10_000,
            mut stamps in proptest::collection::vec(0.0f64..1500.0, 1..64),
        ) {
            let tween = NumberTween::new(start, start + rise, 0.0, 1000.0);
            stamps.sort_by(f64::total_cmp);
            let mut last = start;
            for t in stamps {
                let v = tween.value_at(t);
                prop_assert!(v >= last);
                prop_assert!(v <= start + rise);
                last = v;
            }
        }

        #[test]
        fn prop_final_frame_is_exact(start in -10_000i64..10_000, end in -10_000i64..10_000) {
            let tween = NumberTween::new(start, end, 0.0, 1000.0);
            prop_assert_eq!(tween.value_at(1000.0), end);
        }

        #[test]
        fn prop_grouped_parse_inverts_format(value in any::<i64>()) {
            prop_assert_eq!(parse_grouped(&format_grouped(value)), Some(value));
        }
    }
}
