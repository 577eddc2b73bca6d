//! # Domain Types
//!
//! Core domain types used throughout Voyage.
//!
//! ## Type Hierarchy
//! ```text
//! ┌─────────────────────────────────────────────────────────────────────────┐
//! │                         Domain Types                                    │
//! │                                                                         │
//! │  ┌─────────────────┐   ┌─────────────────┐   ┌─────────────────┐       │
//! │  │   PromoCode     │   │ PricingBreakdown│   │  VendorPayout   │       │
//! │  │  ─────────────  │   │  ─────────────  │   │  ─────────────  │       │
//! │  │  code (unique)  │   │  subtotal       │   │  total_amount   │       │
//! │  │  discount_type  │   │  add_ons_total  │   │  commission     │       │
//! │  │  discount_value │   │  discount       │   │  holdback       │       │
//! │  │  validity window│   │  tax / fee      │   │  vendor_net     │       │
//! │  └─────────────────┘   └─────────────────┘   └─────────────────┘       │
//! │                                                                         │
//! │  ┌─────────────────┐   ┌─────────────────┐   ┌─────────────────┐       │
//! │  │   Percentage    │   │  DiscountType   │   │   RefundRule    │       │
//! │  │  ─────────────  │   │  ─────────────  │   │  ─────────────  │       │
//! │  │  bps (u32)      │   │  Percentage     │   │  days_before    │       │
//! │  │  1500 = 15%     │   │  Fixed          │   │  refund %       │       │
//! │  └─────────────────┘   └─────────────────┘   └─────────────────┘       │
//! └─────────────────────────────────────────────────────────────────────────┘
//! ```
//!
//! Types that cross the HTTP boundary serialize in camelCase, which is what the
//! Next.js frontend reads.

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use ts_rs::TS;

use crate::error::ValidationError;
use crate::money::Money;

// =============================================================================
// Percentage
// =============================================================================

/// A rate in basis points (1 bps = 0.01%).
///
/// Used for promo percentages, commission, holdback, tax, service fees and
/// refund tiers. 10000 bps is 100%.
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash, Serialize, Deserialize, TS)]
#[ts(export)]
pub struct Percentage(u32);

impl Percentage {
    /// 100%.
    pub const FULL: Percentage = Percentage(10_000);

    #[inline]
    pub const fn from_bps(bps: u32) -> Self {
        Percentage(bps)
    }

    /// Converts a percentage number (`15.5` = 15.5%) into basis points.
    ///
    /// Rejects NaN, negative values and anything above 100%.
    ///
    /// ```rust
    /// use voyage_core::types::Percentage;
    ///
    /// assert_eq!(Percentage::from_percentage("commission", 15.0).unwrap().bps(), 1500);
    /// assert!(Percentage::from_percentage("commission", -1.0).is_err());
    /// assert!(Percentage::from_percentage("commission", 100.01).is_err());
    /// ```
    pub fn from_percentage(field: &str, pct: f64) -> Result<Self, ValidationError> {
        if !pct.is_finite() || !(0.0..=100.0).contains(&pct) {
            return Err(ValidationError::OutOfRange {
                field: field.to_string(),
                min: 0,
                max: 100,
            });
        }
        Ok(Percentage((pct * 100.0).round() as u32))
    }

    #[inline]
    pub const fn bps(&self) -> u32 {
        self.0
    }

    /// Returns the rate as a percentage number (for display and JSON only).
    #[inline]
    pub fn percentage(&self) -> f64 {
        self.0 as f64 / 100.0
    }

    #[inline]
    pub const fn zero() -> Self {
        Percentage(0)
    }

    #[inline]
    pub const fn is_zero(&self) -> bool {
        self.0 == 0
    }
}

impl Default for Percentage {
    fn default() -> Self {
        Percentage::zero()
    }
}

// =============================================================================
// Promo Codes
// =============================================================================

/// How a promo code's `discount_value` is interpreted.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize, TS)]
#[cfg_attr(feature = "sqlx", derive(sqlx::Type))]
#[cfg_attr(feature = "sqlx", sqlx(rename_all = "lowercase"))]
#[ts(export)]
#[serde(rename_all = "lowercase")]
pub enum DiscountType {
    /// `discount_value` is basis points of the amount, capped by `max_discount`.
    Percentage,
    /// `discount_value` is a flat amount in cents, capped by the amount itself.
    Fixed,
}

impl DiscountType {
    pub fn as_str(&self) -> &'static str {
        match self {
            DiscountType::Percentage => "percentage",
            DiscountType::Fixed => "fixed",
        }
    }
}

/// A discount token redeemable against a booking subtotal.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize, TS)]
#[ts(export)]
#[serde(rename_all = "camelCase")]
pub struct PromoCode {
    /// Unique identifier (UUID v4).
    pub id: String,

    /// Redemption code, stored upper-cased and trimmed.
    pub code: String,

    pub description: Option<String>,

    pub discount_type: DiscountType,

    /// Basis points for [`DiscountType::Percentage`], cents for [`DiscountType::Fixed`].
    pub discount_value: i64,

    /// Upper bound on a percentage discount.
    pub max_discount: Option<Money>,

    /// Minimum booking amount the code applies to.
    pub min_purchase_amount: Money,

    /// Total redemptions allowed across all users. `None` = unlimited.
    pub usage_limit: Option<i64>,

    /// Redemptions allowed per user. `None` = unlimited.
    pub usage_per_user: Option<i64>,

    /// Redemptions so far.
    pub used_count: i64,

    #[ts(as = "String")]
    pub valid_from: DateTime<Utc>,

    #[ts(as = "String")]
    pub valid_until: DateTime<Utc>,

    /// Restricts the code to these trips when non-empty.
    pub applicable_trips: Vec<String>,

    /// Restricts the code to these vendors when non-empty.
    pub applicable_vendors: Vec<String>,

    /// Restricts the code to these trip categories when non-empty.
    pub applicable_categories: Vec<String>,

    /// Vendors the code never applies to.
    pub excluded_vendors: Vec<String>,

    pub is_active: bool,

    #[ts(as = "String")]
    pub created_at: DateTime<Utc>,

    #[ts(as = "String")]
    pub updated_at: DateTime<Utc>,
}

impl PromoCode {
    /// Whether the code can be redeemed at `now`, ignoring amount and vendor.
    pub fn is_currently_usable(&self, now: DateTime<Utc>) -> bool {
        self.is_active
            && self.valid_from <= now
            && now <= self.valid_until
            && !self.usage_exhausted()
    }

    /// Whether the global usage limit has been reached.
    pub fn usage_exhausted(&self) -> bool {
        match self.usage_limit {
            Some(limit) => self.used_count >= limit,
            None => false,
        }
    }
}

/// Input to promo validation.
#[derive(Debug, Clone, PartialEq)]
pub struct PromoRequest {
    pub code: String,
    pub amount: Money,
    pub vendor_id: Option<String>,
    pub trip_id: Option<String>,
    pub category: Option<String>,
}

impl PromoRequest {
    pub fn new(code: impl Into<String>, amount: Money) -> Self {
        PromoRequest {
            code: code.into(),
            amount,
            vendor_id: None,
            trip_id: None,
            category: None,
        }
    }

    pub fn vendor(mut self, vendor_id: impl Into<String>) -> Self {
        self.vendor_id = Some(vendor_id.into());
        self
    }

    pub fn trip(mut self, trip_id: impl Into<String>) -> Self {
        self.trip_id = Some(trip_id.into());
        self
    }

    pub fn category(mut self, category: impl Into<String>) -> Self {
        self.category = Some(category.into());
        self
    }
}

/// Result of a successful promo validation.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize, TS)]
#[ts(export)]
#[serde(rename_all = "camelCase")]
pub struct PromoQuote {
    pub code: String,
    pub discount_type: DiscountType,
    pub discount_value: i64,
    pub discount: Money,
    pub final_amount: Money,
}

// =============================================================================
// Booking Pricing
// =============================================================================

/// An optional extra sold with a booking (insurance, transfers, gear).
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize, TS)]
#[ts(export)]
#[serde(rename_all = "camelCase")]
pub struct AddOn {
    pub name: String,
    pub price: Money,
    pub quantity: i64,
}

/// Price components of a booking. Every field is already rounded to cents.
///
/// `total_amount = subtotal + add_ons_total - discount_amount + tax_amount + service_fee`
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize, TS)]
#[ts(export)]
#[serde(rename_all = "camelCase")]
pub struct PricingBreakdown {
    /// Listed per-person price of the trip.
    pub base_price: Money,
    /// Per-person price charged (after the group rate, when one applies).
    pub price_per_person: Money,
    pub travelers: i64,
    pub subtotal: Money,
    pub add_ons_total: Money,
    pub discount_amount: Money,
    pub tax_amount: Money,
    pub service_fee: Money,
    pub total_amount: Money,
}

// =============================================================================
// Vendor Payout
// =============================================================================

/// Split of a booking amount between platform and vendor.
///
/// `vendor_net = total_amount - platform_commission - holdback_amount`
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize, TS)]
#[ts(export)]
#[serde(rename_all = "camelCase")]
pub struct VendorPayout {
    pub total_amount: Money,
    pub platform_commission: Money,
    pub holdback_amount: Money,
    pub vendor_net: Money,
}

// =============================================================================
// Refund Policy
// =============================================================================

/// One tier of a cancellation policy: cancel at least `days_before_start`
/// days ahead and get `refund_percentage` back.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize, TS)]
#[ts(export)]
#[serde(rename_all = "camelCase")]
pub struct RefundRule {
    pub days_before_start: i64,
    pub refund_percentage: Percentage,
}

// =============================================================================
// Unit Tests
// =============================================================================
