//! # Refund Calculator
//!
//! Looks up the cancellation tier for a booking and computes the refund.
//!
//! ## Tier Lookup
//! ```text
//! policy: [{30 days, 100%}, {14 days, 50%}, {0 days, 0%}]
//!
//!   days until trip:   40 ──► first tier with 40 ≥ threshold = 30d → 100%
//!                      20 ──► 14d → 50%
//!                       5 ──► 0d  → 0%
//!                      -1 ──► trip started, no tier matches → 0
//! ```
//!
//! Tiers are kept sorted by `days_before_start`, highest first, so a policy
//! entered in any order yields the same refund.

use chrono::{DateTime, Utc};
use serde::Serialize;
use ts_rs::TS;

use crate::error::{CoreError, CoreResult};
use crate::money::Money;
use crate::types::{Percentage, RefundRule};

const SECONDS_PER_DAY: i64 = 86_400;

/// A cancellation policy: ordered refund tiers.
/// Only built through [`RefundPolicy::new`], so the tier order always holds.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, TS)]
#[ts(export)]
#[serde(rename_all = "camelCase")]
pub struct RefundPolicy {
    rules: Vec<RefundRule>,
}

impl RefundPolicy {
    /// Builds a policy, sorting tiers by threshold (descending).
    ///
    /// ## Errors
    /// - a negative `days_before_start`
    /// - a refund percentage above 100%
    /// - two tiers with the same threshold
    pub fn new(mut rules: Vec<RefundRule>) -> CoreResult<Self> {
        for rule in &rules {
            if rule.days_before_start < 0 {
                return Err(CoreError::InvalidRefundPolicy {
                    reason: format!("negative threshold: {} days", rule.days_before_start),
                });
            }
            if rule.refund_percentage > Percentage::FULL {
                return Err(CoreError::InvalidRefundPolicy {
                    reason: format!(
                        "refund percentage above 100%: {}%",
                        rule.refund_percentage.percentage()
                    ),
                });
            }
        }

        rules.sort_by(|a, b| b.days_before_start.cmp(&a.days_before_start));

        if let Some(pair) = rules
            .windows(2)
            .find(|w| w[0].days_before_start == w[1].days_before_start)
        {
            return Err(CoreError::InvalidRefundPolicy {
                reason: format!("duplicate threshold: {} days", pair[0].days_before_start),
            });
        }

        Ok(RefundPolicy { rules })
    }

    /// The tiers, highest threshold first.
    pub fn rules(&self) -> &[RefundRule] {
        &self.rules
    }

    /// Refund percentage for a cancellation `days_until_trip` days ahead.
    /// `None` when no tier applies.
    pub fn percentage_for(&self, days_until_trip: i64) -> Option<Percentage> {
        self.rules
            .iter()
            .find(|rule| days_until_trip >= rule.days_before_start)
            .map(|rule| rule.refund_percentage)
    }
}

/// Whole days from `now` until `trip_start`, rounded up.
///
/// A trip starting in 36 hours is 2 days out; one that started 10 hours ago
/// is 0 days out.
pub fn days_until(trip_start: DateTime<Utc>, now: DateTime<Utc>) -> i64 {
    let secs = (trip_start - now).num_seconds();
    if secs > 0 {
        (secs + SECONDS_PER_DAY - 1) / SECONDS_PER_DAY
    } else {
        secs / SECONDS_PER_DAY
    }
}

/// Computes the refund for cancelling a booking at `now`.
///
/// ## Example
/// ```rust
/// use chrono::{Duration, Utc};
/// use voyage_core::money::Money;
/// use voyage_core::refund::{compute_refund, RefundPolicy};
/// use voyage_core::types::{Percentage, RefundRule};
///
/// let policy = RefundPolicy::new(vec![
///     RefundRule { days_before_start: 30, refund_percentage: Percentage::from_bps(10_000) },
///     RefundRule { days_before_start: 14, refund_percentage: Percentage::from_bps(5_000) },
/// ])
/// .unwrap();
///
/// let now = Utc::now();
/// let refund = compute_refund(Money::from_cents(100_000), &policy, now + Duration::days(20), now);
/// assert_eq!(refund, Money::from_cents(50_000));
/// ```
pub fn compute_refund(
    booking_amount: Money,
    policy: &RefundPolicy,
    trip_start: DateTime<Utc>,
    now: DateTime<Utc>,
) -> Money {
    let days = days_until(trip_start, now);

    match policy.percentage_for(days) {
        Some(pct) => booking_amount.non_negative().percent_of(pct),
        None => Money::zero(),
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use chrono::{Duration, TimeZone};

    fn rule(days: i64, bps: u32) -> RefundRule {
        RefundRule {
            days_before_start: days,
            refund_percentage: Percentage::from_bps(bps),
        }
    }

    fn standard() -> RefundPolicy {
        RefundPolicy::new(vec![rule(30, 10_000), rule(14, 5_000), rule(0, 0)]).unwrap()
    }

    fn now() -> DateTime<Utc> {
        Utc.with_ymd_and_hms(2026, 3, 1, 9, 0, 0).unwrap()
    }

    #[test]
    fn test_refund_tiers() {
        let policy = standard();
        let amount = Money::from_cents(100_000);

        let at = |days: i64| compute_refund(amount, &policy, now() + Duration::days(days), now());

        assert_eq!(at(40), Money::from_cents(100_000));
        assert_eq!(at(30), Money::from_cents(100_000));
        assert_eq!(at(20), Money::from_cents(50_000));
        assert_eq!(at(14), Money::from_cents(50_000));
        assert_eq!(at(5), Money::zero());
    }

    #[test]
    fn test_refund_is_monotonic_in_notice() {
        let policy = standard();
        let amount = Money::from_cents(77_777);
        let mut previous = Money::zero();
        for days in 0..60 {
            let refund = compute_refund(amount, &policy, now() + Duration::days(days), now());
            assert!(refund >= previous);
            previous = refund;
        }
    }

    #[test]
    fn test_trip_already_started_without_zero_tier() {
        let policy = RefundPolicy::new(vec![rule(7, 10_000)]).unwrap();
        let refund = compute_refund(
            Money::from_cents(5_000),
            &policy,
            now() - Duration::days(1),
            now(),
        );
        assert_eq!(refund, Money::zero());
    }

    #[test]
    fn test_unsorted_policy_is_sorted() {
        let policy = RefundPolicy::new(vec![rule(0, 0), rule(14, 5_000), rule(30, 10_000)]).unwrap();
        let thresholds: Vec<i64> = policy.rules().iter().map(|r| r.days_before_start).collect();
        assert_eq!(thresholds, vec![30, 14, 0]);

        assert_eq!(policy.percentage_for(40), Some(Percentage::from_bps(10_000)));
        assert_eq!(policy, standard());
    }

    #[test]
    fn test_invalid_policies() {
        assert!(RefundPolicy::new(vec![rule(-1, 0)]).is_err());
        assert!(RefundPolicy::new(vec![rule(10, 10_001)]).is_err());
        assert!(RefundPolicy::new(vec![rule(10, 100), rule(10, 200)]).is_err());
        assert!(RefundPolicy::new(vec![]).is_ok());
    }

    #[test]
    fn test_days_until_rounds_up_partial_days() {
        assert_eq!(days_until(now() + Duration::hours(36), now()), 2);
        assert_eq!(days_until(now() + Duration::hours(24), now()), 1);
        assert_eq!(days_until(now() + Duration::seconds(1), now()), 1);
        assert_eq!(days_until(now(), now()), 0);
        assert_eq!(days_until(now() - Duration::hours(10), now()), 0);
        assert_eq!(days_until(now() - Duration::hours(50), now()), -2);
    }

    #[test]
    fn test_partial_percentage_rounds_to_cents() {
        let policy = RefundPolicy::new(vec![rule(1, 3_333)]).unwrap();
        let refund = compute_refund(
            Money::from_cents(10_001),
            &policy,
            now() + Duration::days(3),
            now(),
        );
        // 10001 × 33.33% = 3333.33 cents
        assert_eq!(refund, Money::from_cents(3_333));
    }
}
