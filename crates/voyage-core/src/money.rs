//! # Money Module
//!
//! Provides the `Money` type for booking amounts, discounts and payouts.
//!
//! ## Why Integer Money?
//! ```text
//! ┌─────────────────────────────────────────────────────────────────────────┐
//! │  ROUNDING TO CENTS                                                      │
//! │                                                                         │
//! │  Every pricing step rounds to 2 decimals on its own:                   │
//! │    discount   = round(amount × 20%)                                    │
//! │    commission = round(amount × 15%)                                    │
//! │    holdback   = round(amount × 5%)                                     │
//! │                                                                         │
//! │  With integer cents each round() is exact and repeatable:              │
//! │    (cents × bps + 5000) / 10000                                        │
//! │                                                                         │
//! │  Floats only appear at the HTTP boundary (JSON numbers in dollars).    │
//! └─────────────────────────────────────────────────────────────────────────┘
//! ```
//!
//! ## Usage
//! ```rust
//! use voyage_core::money::Money;
//! use voyage_core::types::Percentage;
//!
//! let amount = Money::from_cents(100_000); // $1000.00
//! let commission = amount.percent_of(Percentage::from_bps(1500));
//! assert_eq!(commission.cents(), 15_000);
//! ```

use serde::{Deserialize, Serialize};
use std::fmt;
use std::ops::{Add, AddAssign, Mul, Sub, SubAssign};
use ts_rs::TS;

use crate::types::Percentage;

// =============================================================================
// Money Type
// =============================================================================

/// A monetary value in the smallest currency unit (cents).
///
/// ## Where Money is Used
/// ```text
/// Trip.price_per_person ──► PricingBreakdown.subtotal ──► total_amount
///                                                  │
///             PromoCode.discount ◄─────────────────┘
///                                                  │
///    VendorPayout (commission / holdback / net) ◄──┘
///                                                  │
///              Refund (policy tier × amount) ◄─────┘
/// ```
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash, Serialize, Deserialize, TS)]
#[ts(export)]
pub struct Money(i64);

impl Money {
    /// Creates a Money value from cents.
    ///
    /// ```rust
    /// use voyage_core::money::Money;
    ///
    /// let price = Money::from_cents(1099); // $10.99
    /// assert_eq!(price.cents(), 1099);
    /// ```
    #[inline]
    pub const fn from_cents(cents: i64) -> Self {
        Money(cents)
    }

    /// Creates a Money value from major and minor units (dollars and cents).
    ///
    /// For negative amounts only the major unit carries the sign:
    /// `from_major_minor(-5, 50)` is -$5.50.
    #[inline]
    pub const fn from_major_minor(major: i64, minor: i64) -> Self {
        if major < 0 {
            Money(major * 100 - minor)
        } else {
            Money(major * 100 + minor)
        }
    }

    /// Converts a JSON number in major units to Money, rounding to the
    /// nearest cent.
    ///
    /// Only request bodies go through here. Returns `None` for NaN and
    /// infinities.
    ///
    /// ```rust
    /// use voyage_core::money::Money;
    ///
    /// assert_eq!(Money::from_major(850.0), Some(Money::from_cents(85_000)));
    /// assert_eq!(Money::from_major(0.1 + 0.2), Some(Money::from_cents(30)));
    /// assert_eq!(Money::from_major(f64::NAN), None);
    /// ```
    pub fn from_major(value: f64) -> Option<Self> {
        if !value.is_finite() {
            return None;
        }
        let cents = (value * 100.0).round();
        if cents.abs() > i64::MAX as f64 {
            return None;
        }
        Some(Money(cents as i64))
    }

    /// Returns the value in major units for JSON responses.
    #[inline]
    pub fn to_major(&self) -> f64 {
        self.0 as f64 / 100.0
    }

    /// Returns the value in cents.
    #[inline]
    pub const fn cents(&self) -> i64 {
        self.0
    }

    /// Returns the major unit (dollars) portion.
    #[inline]
    pub const fn dollars(&self) -> i64 {
        self.0 / 100
    }

    /// Returns the minor unit portion (always 0-99).
    #[inline]
    pub const fn cents_part(&self) -> i64 {
        (self.0 % 100).abs()
    }

    #[inline]
    pub const fn zero() -> Self {
        Money(0)
    }

    #[inline]
    pub const fn is_zero(&self) -> bool {
        self.0 == 0
    }

    #[inline]
    pub const fn is_positive(&self) -> bool {
        self.0 > 0
    }

    #[inline]
    pub const fn is_negative(&self) -> bool {
        self.0 < 0
    }

    #[inline]
    pub const fn abs(&self) -> Self {
        Money(self.0.abs())
    }

    /// Returns `rate` of this amount, rounded to the nearest cent.
    ///
    /// Halves round away from zero, matching `Math.round(x * 100) / 100`
    /// for the non-negative amounts the marketplace deals with.
    ///
    /// ## Example
    /// ```rust
    /// use voyage_core::money::Money;
    /// use voyage_core::types::Percentage;
    ///
    /// // $10.00 × 8.25% = $0.825 → $0.83
    /// let tax = Money::from_cents(1000).percent_of(Percentage::from_bps(825));
    /// assert_eq!(tax.cents(), 83);
    /// ```
    pub fn percent_of(&self, rate: Percentage) -> Money {
        // i128 keeps large booking totals from overflowing
        let product = self.0 as i128 * rate.bps() as i128;
        let rounded = if product >= 0 {
            (product + 5000) / 10000
        } else {
            (product - 5000) / 10000
        };
        Money(rounded as i64)
    }

    /// [`Money::percent_of`] that returns `None` instead of wrapping when a
    /// rate above 100% pushes the result past i64 cents.
    pub fn checked_percent_of(&self, rate: Percentage) -> Option<Money> {
        let product = self.0 as i128 * rate.bps() as i128;
        let rounded = if product >= 0 {
            (product + 5000) / 10000
        } else {
            (product - 5000) / 10000
        };
        i64::try_from(rounded).ok().map(Money)
    }

    /// Multiplies money by a quantity (travelers, add-on units).
    ///
    /// Panics on overflow in debug builds; use [`Money::checked_multiply_quantity`]
    /// for amounts taken from a request.
    #[inline]
    pub const fn multiply_quantity(&self, qty: i64) -> Self {
        Money(self.0 * qty)
    }

    /// `None` if the product does not fit in i64 cents.
    #[inline]
    pub const fn checked_multiply_quantity(&self, qty: i64) -> Option<Money> {
        match self.0.checked_mul(qty) {
            Some(cents) => Some(Money(cents)),
            None => None,
        }
    }

    #[inline]
    pub const fn checked_add(&self, other: Money) -> Option<Money> {
        match self.0.checked_add(other.0) {
            Some(cents) => Some(Money(cents)),
            None => None,
        }
    }

    #[inline]
    pub const fn checked_sub(&self, other: Money) -> Option<Money> {
        match self.0.checked_sub(other.0) {
            Some(cents) => Some(Money(cents)),
            None => None,
        }
    }

    /// Clamps negative values to zero.
    #[inline]
    pub fn non_negative(self) -> Money {
        if self.0 < 0 {
            Money::zero()
        } else {
            self
        }
    }
}

// =============================================================================
// Trait Implementations
// =============================================================================

/// Debug-style display (`$10.99`). Use `utils::format_currency` for
/// user-facing text.
impl fmt::Display for Money {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let sign = if self.0 < 0 { "-" } else { "" };
        write!(
            f,
            "{}${}.{:02}",
            sign,
            self.dollars().abs(),
            self.cents_part()
        )
    }
}

impl Default for Money {
    fn default() -> Self {
        Money::zero()
    }
}

impl Add for Money {
    type Output = Self;

    #[inline]
    fn add(self, other: Self) -> Self {
        Money(self.0 + other.0)
    }
}

impl AddAssign for Money {
    #[inline]
    fn add_assign(&mut self, other: Self) {
        self.0 += other.0;
    }
}

impl Sub for Money {
    type Output = Self;

    #[inline]
    fn sub(self, other: Self) -> Self {
        Money(self.0 - other.0)
    }
}

impl SubAssign for Money {
    #[inline]
    fn sub_assign(&mut self, other: Self) {
        self.0 -= other.0;
    }
}

impl Mul<i64> for Money {
    type Output = Self;

    #[inline]
    fn mul(self, qty: i64) -> Self {
        Money(self.0 * qty)
    }
}

impl std::iter::Sum for Money {
    fn sum<I: Iterator<Item = Money>>(iter: I) -> Self {
        iter.fold(Money::zero(), |acc, m| acc + m)
    }
}

// =============================================================================
// Unit Tests
// =============================================================================
