//! Mock live statistics.
//!
//! Each fire of the stats loop visits every statistic on the page. A
//! statistic mutates with a configured probability; its new target is the
//! current value plus a uniformly drawn delta, floored at zero.

use crate::animation::parse_grouped;
use crate::config::SchedulerConfig;
use crate::error::{GuardianError, Result};
use crate::random::RandomSource;

/// One applied mutation.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct StatMutation {
    /// Value parsed from the page.
    pub current: i64,
    /// Drawn change.
    pub delta: i64,
    /// Value animated towards, never negative.
    pub target: i64,
}

/// Map a unit draw onto `[min, min + span - 1]`.
#[must_use]
pub fn draw_delta(unit: f64, min: i64, span: u32) -> i64 {
    let offset = (unit.clamp(0.0, 1.0) * f64::from(span)).floor() as i64;
    min + offset.min(i64::from(span.max(1)) - 1)
}

/// `max(0, current + delta)`.
#[must_use]
pub const fn mutation_target(current: i64, delta: i64) -> i64 {
    let sum = current.saturating_add(delta);
    if sum < 0 {
        0
    } else {
        sum
    }
}

/// Parse a displayed statistic. Negative values are rejected.
pub fn read_statistic(text: &str) -> Result<i64> {
    parse_grouped(text)
        .filter(|value| *value >= 0)
        .ok_or_else(|| GuardianError::UnparsableStatistic {
            text: text.to_string(),
        })
}

/// Decide whether one statistic mutates and to what.
///
/// Draws the eligibility roll first; only eligible statistics are parsed and
/// draw a delta. An eligible statistic that does not parse is an error and
/// consumes no delta draw.
pub fn plan_mutation(
    text: &str,
    rng: &mut dyn RandomSource,
    config: &SchedulerConfig,
) -> Result<Option<StatMutation>> {
    if rng.next_unit() >= config.stat_mutation_probability {
        return Ok(None);
    }
    let current = read_statistic(text)?;
    let delta = draw_delta(rng.next_unit(), config.stat_delta_min, config.stat_delta_span);
    Ok(Some(StatMutation {
        current,
        delta,
        target: mutation_target(current, delta),
    }))
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::random::ScriptedRandom;
    use proptest::prelude::*;

    #[test]
    fn test_draw_delta_range() {
        assert_eq!(draw_delta(0.0, -20, 100), -20);
        assert_eq!(draw_delta(0.5, -20, 100), 30);
        assert_eq!(draw_delta(0.999_999, -20, 100), 79);
        assert_eq!(draw_delta(1.0, -20, 100), 79);
    }

    #[test]
    fn test_target_floors_at_zero() {
        assert_eq!(mutation_target(10, -20), 0);
        assert_eq!(mutation_target(20, -20), 0);
        assert_eq!(mutation_target(21, -20), 1);
        assert_eq!(mutation_target(100, 79), 179);
        assert_eq!(mutation_target(i64::MAX, 79), i64::MAX);
    }

    #[test]
    fn test_read_statistic() {
        assert_eq!(read_statistic("12,480").unwrap(), 12_480);
        assert_eq!(read_statistic("0").unwrap(), 0);
        let err = read_statistic("24/7").unwrap_err();
        assert!(matches!(err, GuardianError::UnparsableStatistic { .. }));
    }

    #[test]
    fn test_read_statistic_rejects_negative() {
        for text in ["-1", "-500", "-9,223,372,036,854,775,808"] {
            let err = read_statistic(text).unwrap_err();
            assert!(matches!(err, GuardianError::UnparsableStatistic { .. }));
        }
    }

    #[test]
    fn test_plan_negative_consumes_no_delta() {
        let mut rng = ScriptedRandom::new([0.0, 0.5]);
        assert!(plan_mutation("-500", &mut rng, &SchedulerConfig::default()).is_err());
        assert_eq!(rng.drawn(), 1);
    }

    #[test]
    fn test_plan_skips_when_roll_fails() {
        let mut rng = ScriptedRandom::new([0.3]);
        let plan = plan_mutation("100", &mut rng, &SchedulerConfig::default()).unwrap();
        assert_eq!(plan, None);
        assert_eq!(rng.drawn(), 1);
    }

    #[test]
    fn test_plan_mutates_when_roll_passes() {
        let mut rng = ScriptedRandom::new([0.29, 0.0]);
        let plan = plan_mutation("1,000", &mut rng, &SchedulerConfig::default()).unwrap();
        assert_eq!(
            plan,
            Some(StatMutation {
                current: 1000,
                delta: -20,
                target: 980
            })
        );
    }

    #[test]
    fn test_plan_unparsable_consumes_no_delta() {
        let mut rng = ScriptedRandom::new([0.0, 0.5]);
        assert!(plan_mutation("--", &mut rng, &SchedulerConfig::default()).is_err());
        assert_eq!(rng.drawn(), 1);
        assert_eq!(rng.remaining(), 1);
    }

    #[test]
    fn test_plan_ineligible_unparsable_is_not_an_error() {
        let mut rng = ScriptedRandom::new([0.9]);
        assert_eq!(
            plan_mutation("--", &mut rng, &SchedulerConfig::default()).unwrap(),
            None
        );
    }

    proptest! {
        #[test]
        fn prop_target_never_negative(current in 0i64..1_000_000, unit in 0.0f64..1.0) {
            let delta = draw_delta(unit, -20, 100);
            prop_assert!((-20..=79).contains(&delta));
            prop_assert!(mutation_target(current, delta) >= 0);
        }
    }
}
