//! # Promo Validation
//!
//! Decides whether a promo code applies to a booking amount and computes the
//! discount.
//!
//! ## Flow
//! ```text
//! ┌─────────────────────────────────────────────────────────────────────────┐
//! │  POST /promo-codes/validate { code, amount, vendorId? }                 │
//! │       │                                                                 │
//! │       ▼                                                                 │
//! │  PromoService (apps/api) ── normalize_code ──► cache / repository       │
//! │       │                                                                 │
//! │       ▼  Option<PromoCode>                                              │
//! │  validate() ← THIS MODULE                                              │
//! │       │                                                                 │
//! │       ├── Err(PromoError)  → { code: "EXPIRED", message }              │
//! │       └── Ok(PromoQuote)   → { discount, finalAmount }                 │
//! └─────────────────────────────────────────────────────────────────────────┘
//! ```
//!
//! `validate` never mutates the record: the same `(promo, request, now)`
//! always produces the same quote.

use chrono::{DateTime, Utc};

use crate::error::PromoError;
use crate::money::Money;
use crate::types::{DiscountType, Percentage, PromoCode, PromoQuote, PromoRequest};
use crate::validation::normalize_code;

/// Validates `request` against the looked-up `promo` record.
///
/// `promo` is `None` when the lookup found nothing.
///
/// ## Example
/// ```rust
/// use chrono::Utc;
/// use voyage_core::money::Money;
/// use voyage_core::promo::validate;
/// use voyage_core::types::PromoRequest;
///
/// let err = validate(None, &PromoRequest::new("nope", Money::from_cents(100)), Utc::now())
///     .unwrap_err();
/// assert_eq!(err.kind().as_str(), "NOT_FOUND");
/// ```
pub fn validate(
    promo: Option<&PromoCode>,
    request: &PromoRequest,
    now: DateTime<Utc>,
) -> Result<PromoQuote, PromoError> {
    let requested = normalize_code(&request.code);

    let promo = match promo {
        Some(p) if normalize_code(&p.code) == requested => p,
        _ => return Err(PromoError::NotFound { code: requested }),
    };

    check_usable(promo, now)?;

    if request.amount < promo.min_purchase_amount {
        return Err(PromoError::MinPurchaseNotMet {
            code: promo.code.clone(),
            minimum: promo.min_purchase_amount,
        });
    }

    check_scope(promo, request)?;

    let discount = compute_discount(promo, request.amount);

    Ok(PromoQuote {
        code: promo.code.clone(),
        discount_type: promo.discount_type,
        discount_value: promo.discount_value,
        discount,
        final_amount: request.amount - discount,
    })
}

/// Active flag, validity window and global usage, in that order.
pub fn check_usable(promo: &PromoCode, now: DateTime<Utc>) -> Result<(), PromoError> {
    let code = || promo.code.clone();

    if !promo.is_active {
        return Err(PromoError::Inactive { code: code() });
    }

    if now < promo.valid_from {
        return Err(PromoError::NotYetValid { code: code() });
    }

    if now > promo.valid_until {
        return Err(PromoError::Expired { code: code() });
    }

    if promo.usage_exhausted() {
        return Err(PromoError::UsageLimitReached { code: code() });
    }

    Ok(())
}

/// Vendor, trip and category restrictions. Only checked for the ids the
/// request carries.
fn check_scope(promo: &PromoCode, request: &PromoRequest) -> Result<(), PromoError> {
    if let Some(vendor_id) = request.vendor_id.as_deref() {
        if contains(&promo.excluded_vendors, vendor_id) {
            return Err(PromoError::VendorExcluded {
                code: promo.code.clone(),
            });
        }
        if !allows(&promo.applicable_vendors, vendor_id) {
            return Err(PromoError::VendorNotApplicable {
                code: promo.code.clone(),
            });
        }
    }

    if let Some(trip_id) = request.trip_id.as_deref() {
        if !allows(&promo.applicable_trips, trip_id) {
            return Err(PromoError::TripNotApplicable {
                code: promo.code.clone(),
            });
        }
    }

    if let Some(category) = request.category.as_deref() {
        let matches = promo.applicable_categories.is_empty()
            || promo
                .applicable_categories
                .iter()
                .any(|c| c.eq_ignore_ascii_case(category));
        if !matches {
            return Err(PromoError::CategoryNotApplicable {
                code: promo.code.clone(),
            });
        }
    }

    Ok(())
}

fn contains(list: &[String], id: &str) -> bool {
    list.iter().any(|v| v == id)
}

/// An empty list means "no restriction".
fn allows(list: &[String], id: &str) -> bool {
    list.is_empty() || contains(list, id)
}

/// Computes the discount for `amount`, rounded to cents.
///
/// - percentage: `min(amount × value, max_discount)`
/// - fixed: `min(value, amount)`
///
/// The result is always within `0..=amount`.
pub fn compute_discount(promo: &PromoCode, amount: Money) -> Money {
    let amount = amount.non_negative();

    let discount = match promo.discount_type {
        DiscountType::Percentage => {
            let bps = promo.discount_value.clamp(0, Percentage::FULL.bps() as i64) as u32;
            let raw = amount.percent_of(Percentage::from_bps(bps));
            match promo.max_discount {
                Some(cap) => raw.min(cap.non_negative()),
                None => raw,
            }
        }
        DiscountType::Fixed => Money::from_cents(promo.discount_value).non_negative(),
    };

    discount.min(amount)
}

// =============================================================================
// Unit Tests
// =============================================================================

#[cfg(test)]
mod tests {
    use super::*;
    use crate::error::PromoErrorKind;
    use chrono::{Duration, TimeZone};

    fn now() -> DateTime<Utc> {
        Utc.with_ymd_and_hms(2026, 6, 1, 12, 0, 0).unwrap()
    }

    fn summer20() -> PromoCode {
        PromoCode {
            id: "0b5b1d3e-6c1a-4b8f-9f0e-2f1f7b4f8a11".to_string(),
            code: "SUMMER20".to_string(),
            description: Some("20% off up to $150".to_string()),
            discount_type: DiscountType::Percentage,
            discount_value: 2000,
            max_discount: Some(Money::from_cents(15_000)),
            min_purchase_amount: Money::zero(),
            usage_limit: Some(100),
            usage_per_user: Some(1),
            used_count: 3,
            valid_from: now() - Duration::days(30),
            valid_until: now() + Duration::days(30),
            applicable_trips: vec![],
            applicable_vendors: vec![],
            applicable_categories: vec![],
            excluded_vendors: vec![],
            is_active: true,
            created_at: now() - Duration::days(31),
            updated_at: now() - Duration::days(31),
        }
    }

    fn fixed50() -> PromoCode {
        PromoCode {
            code: "FLAT50".to_string(),
            discount_type: DiscountType::Fixed,
            discount_value: 5_000,
            max_discount: None,
            ..summer20()
        }
    }

    fn kind(result: Result<PromoQuote, PromoError>) -> PromoErrorKind {
        result.unwrap_err().kind()
    }

    #[test]
    fn test_percentage_capped_by_max_discount() {
        let promo = summer20();
        let quote = validate(
            Some(&promo),
            &PromoRequest::new("SUMMER20", Money::from_cents(100_000)),
            now(),
        )
        .unwrap();

        assert_eq!(quote.discount, Money::from_cents(15_000));
        assert_eq!(quote.final_amount, Money::from_cents(85_000));
        assert_eq!(quote.discount_type, DiscountType::Percentage);
        assert_eq!(quote.discount_value, 2000);
    }

    #[test]
    fn test_percentage_below_cap() {
        let promo = summer20();
        let quote = validate(
            Some(&promo),
            &PromoRequest::new("SUMMER20", Money::from_cents(50_000)),
            now(),
        )
        .unwrap();

        assert_eq!(quote.discount, Money::from_cents(10_000));
        assert_eq!(quote.final_amount, Money::from_cents(40_000));
    }

    #[test]
    fn test_code_is_case_insensitive_and_trimmed() {
        let promo = summer20();
        let quote = validate(
            Some(&promo),
            &PromoRequest::new("  summer20 ", Money::from_cents(50_000)),
            now(),
        )
        .unwrap();
        assert_eq!(quote.code, "SUMMER20");
    }

    #[test]
    fn test_fixed_discount_never_exceeds_amount() {
        let promo = fixed50();
        let small = validate(
            Some(&promo),
            &PromoRequest::new("FLAT50", Money::from_cents(3_000)),
            now(),
        )
        .unwrap();
        assert_eq!(small.discount, Money::from_cents(3_000));
        assert_eq!(small.final_amount, Money::zero());

        let large = validate(
            Some(&promo),
            &PromoRequest::new("FLAT50", Money::from_cents(20_000)),
            now(),
        )
        .unwrap();
        assert_eq!(large.discount, Money::from_cents(5_000));
        assert_eq!(large.final_amount, Money::from_cents(15_000));
    }

    #[test]
    fn test_not_found() {
        let req = PromoRequest::new("missing", Money::from_cents(100));
        assert_eq!(kind(validate(None, &req, now())), PromoErrorKind::NotFound);

        // A record for a different code is treated as a miss
        let promo = summer20();
        assert_eq!(kind(validate(Some(&promo), &req, now())), PromoErrorKind::NotFound);
    }

    #[test]
    fn test_first_failing_check_wins() {
        let req = PromoRequest::new("SUMMER20", Money::from_cents(100));

        // Inactive and expired and exhausted: inactive reported
        let mut promo = summer20();
        promo.is_active = false;
        promo.valid_until = now() - Duration::days(1);
        promo.used_count = 100;
        assert_eq!(kind(validate(Some(&promo), &req, now())), PromoErrorKind::Inactive);

        // Expired and exhausted: expired reported
        promo.is_active = true;
        assert_eq!(kind(validate(Some(&promo), &req, now())), PromoErrorKind::Expired);

        // Exhausted only
        promo.valid_until = now() + Duration::days(1);
        assert_eq!(
            kind(validate(Some(&promo), &req, now())),
            PromoErrorKind::UsageLimitReached
        );
    }

    #[test]
    fn test_validity_window_is_inclusive() {
        let mut promo = summer20();
        promo.valid_from = now();
        promo.valid_until = now();
        let req = PromoRequest::new("SUMMER20", Money::from_cents(1000));

        assert!(validate(Some(&promo), &req, now()).is_ok());
        assert_eq!(
            kind(validate(Some(&promo), &req, now() - Duration::seconds(1))),
            PromoErrorKind::NotYetValid
        );
        assert_eq!(
            kind(validate(Some(&promo), &req, now() + Duration::seconds(1))),
            PromoErrorKind::Expired
        );
    }

    #[test]
    fn test_min_purchase() {
        let mut promo = summer20();
        promo.min_purchase_amount = Money::from_cents(50_000);

        let err = validate(
            Some(&promo),
            &PromoRequest::new("SUMMER20", Money::from_cents(49_999)),
            now(),
        )
        .unwrap_err();
        assert_eq!(
            err,
            PromoError::MinPurchaseNotMet {
                code: "SUMMER20".to_string(),
                minimum: Money::from_cents(50_000),
            }
        );

        assert!(validate(
            Some(&promo),
            &PromoRequest::new("SUMMER20", Money::from_cents(50_000)),
            now()
        )
        .is_ok());
    }

    #[test]
    fn test_vendor_rules() {
        let mut promo = summer20();
        promo.excluded_vendors = vec!["vendor-x".to_string()];
        promo.applicable_vendors = vec!["vendor-a".to_string(), "vendor-x".to_string()];
        let amount = Money::from_cents(10_000);

        let excluded = PromoRequest::new("SUMMER20", amount).vendor("vendor-x");
        assert_eq!(
            kind(validate(Some(&promo), &excluded, now())),
            PromoErrorKind::VendorExcluded
        );

        let other = PromoRequest::new("SUMMER20", amount).vendor("vendor-b");
        assert_eq!(
            kind(validate(Some(&promo), &other, now())),
            PromoErrorKind::VendorNotApplicable
        );

        let allowed = PromoRequest::new("SUMMER20", amount).vendor("vendor-a");
        assert!(validate(Some(&promo), &allowed, now()).is_ok());

        // No vendor in the request: vendor lists are not consulted
        let anonymous = PromoRequest::new("SUMMER20", amount);
        assert!(validate(Some(&promo), &anonymous, now()).is_ok());
    }

    #[test]
    fn test_trip_and_category_rules() {
        let mut promo = summer20();
        promo.applicable_trips = vec!["trip-1".to_string()];
        promo.applicable_categories = vec!["Adventure".to_string()];
        let amount = Money::from_cents(10_000);

        let wrong_trip = PromoRequest::new("SUMMER20", amount).trip("trip-2");
        assert_eq!(
            kind(validate(Some(&promo), &wrong_trip, now())),
            PromoErrorKind::TripNotApplicable
        );

        let wrong_category = PromoRequest::new("SUMMER20", amount)
            .trip("trip-1")
            .category("cruise");
        assert_eq!(
            kind(validate(Some(&promo), &wrong_category, now())),
            PromoErrorKind::CategoryNotApplicable
        );

        let ok = PromoRequest::new("SUMMER20", amount)
            .trip("trip-1")
            .category("adventure");
        assert!(validate(Some(&promo), &ok, now()).is_ok());
    }

    #[test]
    fn test_validation_is_deterministic() {
        let promo = summer20();
        let req = PromoRequest::new("SUMMER20", Money::from_cents(73_333)).vendor("v");
        let first = validate(Some(&promo), &req, now()).unwrap();
        for _ in 0..10 {
            assert_eq!(validate(Some(&promo), &req, now()).unwrap(), first);
        }
        assert_eq!(promo, summer20());
    }

    #[test]
    fn test_percentage_discount_bounds() {
        let mut promo = summer20();
        for (bps, cap) in [(0, None), (1, Some(5)), (3333, None), (10_000, None), (7500, Some(40_000))] {
            promo.discount_value = bps;
            promo.max_discount = cap.map(Money::from_cents);
            for cents in [0_i64, 1, 99, 1_001, 55_555, 1_000_000] {
                let amount = Money::from_cents(cents);
                let discount = compute_discount(&promo, amount);
                assert!(!discount.is_negative());
                assert!(discount <= amount);
                if let Some(cap) = promo.max_discount {
                    assert!(discount <= cap);
                }
            }
        }
    }
}
