//! Alert card pulse: a short, random emphasis on live alert cards.

use crate::config::SchedulerConfig;
use crate::host::{TimerHost, TimerId};
use crate::page::PageView;
use crate::random::RandomSource;
use std::cell::{Cell, RefCell};
use std::rc::Rc;

struct Held<N> {
    key: u64,
    revert: TimerId,
    card: N,
}

/// Cards emphasized by a pulse whose revert has not fired yet.
///
/// Each entry is dropped by its own revert timer, so whatever is left is
/// still emphasized.
pub struct HeldPulses<N> {
    next_key: Cell<u64>,
    held: RefCell<Vec<Held<N>>>,
}

impl<N> std::fmt::Debug for HeldPulses<N> {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("HeldPulses")
            .field("held", &self.held.borrow().len())
            .finish()
    }
}

impl<N> Default for HeldPulses<N> {
    fn default() -> Self {
        Self {
            next_key: Cell::new(0),
            held: RefCell::new(Vec::new()),
        }
    }
}

impl<N> HeldPulses<N> {
    /// Empty set.
    #[must_use]
    pub fn new() -> Self {
        Self::default()
    }

    /// Cards still emphasized.
    #[must_use]
    pub fn len(&self) -> usize {
        self.held.borrow().len()
    }

    /// Whether no card is emphasized.
    #[must_use]
    pub fn is_empty(&self) -> bool {
        self.held.borrow().is_empty()
    }

    fn reserve_key(&self) -> u64 {
        let key = self.next_key.get();
        self.next_key.set(key + 1);
        key
    }

    fn hold(&self, key: u64, revert: TimerId, card: N) {
        self.held.borrow_mut().push(Held { key, revert, card });
    }

    fn forget(&self, key: u64) {
        self.held.borrow_mut().retain(|held| held.key != key);
    }

    /// Cancel every pending revert and restore the cards now.
    ///
    /// Returns the number of cards restored.
    pub fn release<H, P>(&self, host: &H, page: &P) -> usize
    where
        H: TimerHost + ?Sized,
        P: PageView<Node = N> + ?Sized,
    {
        let held = std::mem::take(&mut *self.held.borrow_mut());
        for entry in &held {
            host.cancel(entry.revert);
            page.set_emphasis(&entry.card, false);
        }
        held.len()
    }
}

/// Roll for every alert card and pulse the winners.
///
/// A pulsed card is emphasized now and reverted after `pulse_hold_ms`. Until
/// then it is tracked in `held`. Returns the number of cards pulsed.
pub fn pulse_alert_cards<H, P>(
    host: &Rc<H>,
    page: &Rc<P>,
    rng: &mut dyn RandomSource,
    config: &SchedulerConfig,
    held: &Rc<HeldPulses<P::Node>>,
) -> usize
where
    H: TimerHost + 'static,
    P: PageView + 'static,
{
    let mut pulsed = 0;
    for card in page.alert_cards() {
        if rng.next_unit() >= config.pulse_probability {
            continue;
        }
        page.set_emphasis(&card, true);
        let key = held.reserve_key();
        let pending = Rc::clone(held);
        let page = Rc::clone(page);
        let target = card.clone();
        let revert = host.set_timeout(
            config.pulse_hold_ms,
            Box::new(move || {
                pending.forget(key);
                page.set_emphasis(&target, false);
            }),
        );
        held.hold(key, revert, card);
        pulsed += 1;
    }
    pulsed
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::host::ManualHost;
    use crate::page::MemoryPage;
    use crate::random::ScriptedRandom;

    fn pulse(
        host: &Rc<ManualHost>,
        page: &Rc<MemoryPage>,
        draws: Vec<f64>,
    ) -> (usize, Rc<HeldPulses<usize>>) {
        let held = Rc::new(HeldPulses::new());
        let mut rng = ScriptedRandom::new(draws);
        let pulsed = pulse_alert_cards(host, page, &mut rng, &SchedulerConfig::default(), &held);
        (pulsed, held)
    }

    #[test]
    fn test_pulse_emphasizes_then_reverts() {
        let host = Rc::new(ManualHost::new());
        let page = Rc::new(MemoryPage::new());
        let first = page.add_alert_card();
        let second = page.add_alert_card();

        let (pulsed, held) = pulse(&host, &page, vec![0.05, 0.5]);
        assert_eq!(pulsed, 1);
        assert_eq!(held.len(), 1);
        assert!(page.is_emphasized(first));
        assert!(!page.is_emphasized(second));

        host.advance(299.0);
        assert!(page.is_emphasized(first));
        host.advance(1.0);
        assert!(!page.is_emphasized(first));
        assert!(held.is_empty());
        assert_eq!(page.emphasis_changes(first), 2);
        assert_eq!(page.emphasis_changes(second), 0);
    }

    #[test]
    fn test_probability_boundary_is_exclusive() {
        let host = Rc::new(ManualHost::new());
        let page = Rc::new(MemoryPage::new());
        page.add_alert_card();
        let (pulsed, held) = pulse(&host, &page, vec![0.1]);
        assert_eq!(pulsed, 0);
        assert!(held.is_empty());
        assert_eq!(host.pending_timers(), 0);
    }

    #[test]
    fn test_no_cards_no_draws() {
        let host = Rc::new(ManualHost::new());
        let page = Rc::new(MemoryPage::new());
        let held = Rc::new(HeldPulses::new());
        let mut rng = ScriptedRandom::new([]);
        pulse_alert_cards(&host, &page, &mut rng, &SchedulerConfig::default(), &held);
        assert_eq!(rng.drawn(), 0);
    }

    #[test]
    fn test_release_cancels_revert_and_restores_card() {
        let host = Rc::new(ManualHost::new());
        let page = Rc::new(MemoryPage::new());
        let card = page.add_alert_card();
        let (_, held) = pulse(&host, &page, vec![0.0]);
        assert_eq!(host.pending_timers(), 1);

        assert_eq!(held.release(&*host, &*page), 1);
        assert!(!page.is_emphasized(card));
        assert!(held.is_empty());
        assert_eq!(host.pending_timers(), 0);

        host.advance(1000.0);
        assert_eq!(page.emphasis_changes(card), 2);
    }

    #[test]
    fn test_release_skips_reverted_cards() {
        let host = Rc::new(ManualHost::new());
        let page = Rc::new(MemoryPage::new());
        let card = page.add_alert_card();
        let (_, held) = pulse(&host, &page, vec![0.0]);
        host.advance(300.0);
        assert_eq!(held.release(&*host, &*page), 0);
        assert_eq!(page.emphasis_changes(card), 2);
    }
}
