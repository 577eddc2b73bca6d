//! # Booking Pricing
//!
//! Builds the price breakdown shown at checkout.
//!
//! ## Breakdown
//! ```text
//! ┌─────────────────────────────────────────────────────────────────────────┐
//! │  base_price          listed per-person price                            │
//! │  price_per_person    base_price less the group rate (if it applies)     │
//! │  subtotal          = price_per_person × travelers                       │
//! │  add_ons_total     = Σ add_on.price × add_on.quantity                   │
//! │  discount_amount   = min(promo discount, subtotal + add_ons_total)      │
//! │  tax_amount        = round((subtotal + add_ons - discount) × tax rate)  │
//! │  service_fee       = round(subtotal × service fee rate)                 │
//! │  ──────────────────────────────────────────────────────────────────     │
//! │  total_amount      = subtotal + add_ons - discount + tax + service_fee  │
//! └─────────────────────────────────────────────────────────────────────────┘
//! ```
//!
//! Each line is rounded to cents before the total is summed.

use serde::{Deserialize, Serialize};
use ts_rs::TS;

use crate::error::{CoreError, CoreResult};
use crate::money::Money;
use crate::types::{AddOn, Percentage, PricingBreakdown};
use crate::validation::{validate_amount, validate_travelers};

/// Per-person reduction for larger groups.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize, TS)]
#[ts(export)]
#[serde(rename_all = "camelCase")]
pub struct GroupRate {
    pub min_travelers: i64,
    pub discount: Percentage,
}

/// Everything needed to price a booking.
#[derive(Debug, Clone, PartialEq)]
pub struct PricingInput {
    pub base_price: Money,
    pub travelers: i64,
    pub add_ons: Vec<AddOn>,
    pub group_rate: Option<GroupRate>,
    /// Discount already granted (usually a validated promo quote).
    pub discount: Money,
    pub tax_rate: Percentage,
    pub service_fee_rate: Percentage,
}

impl PricingInput {
    pub fn new(base_price: Money, travelers: i64) -> Self {
        PricingInput {
            base_price,
            travelers,
            add_ons: Vec::new(),
            group_rate: None,
            discount: Money::zero(),
            tax_rate: Percentage::zero(),
            service_fee_rate: Percentage::zero(),
        }
    }
}

/// Computes the price breakdown of a booking.
///
/// ## Example
/// ```rust
/// use voyage_core::money::Money;
/// use voyage_core::pricing::{calculate_booking_price, PricingInput};
/// use voyage_core::types::Percentage;
///
/// let mut input = PricingInput::new(Money::from_cents(50_000), 2);
/// input.tax_rate = Percentage::from_bps(1000);
/// input.service_fee_rate = Percentage::from_bps(500);
///
/// let price = calculate_booking_price(&input).unwrap();
/// assert_eq!(price.subtotal, Money::from_cents(100_000));
/// assert_eq!(price.tax_amount, Money::from_cents(10_000));
/// assert_eq!(price.service_fee, Money::from_cents(5_000));
/// assert_eq!(price.total_amount, Money::from_cents(115_000));
/// ```
pub fn calculate_booking_price(input: &PricingInput) -> CoreResult<PricingBreakdown> {
    validate_travelers(input.travelers)?;
    validate_amount("basePrice", input.base_price)?;
    validate_amount("discount", input.discount)?;

    for add_on in &input.add_ons {
        validate_amount("addOns.price", add_on.price)?;
        if add_on.quantity <= 0 {
            return Err(CoreError::invalid_argument(format!(
                "add-on '{}' must have a positive quantity",
                add_on.name
            )));
        }
    }

    let price_per_person = match input.group_rate {
        Some(rate) if input.travelers >= rate.min_travelers => {
            input.base_price - input.base_price.percent_of(rate.discount)
        }
        _ => input.base_price,
    };

    let subtotal = price_per_person
        .checked_multiply_quantity(input.travelers)
        .ok_or_else(too_large)?;
    let add_ons_total = input.add_ons.iter().try_fold(Money::zero(), |acc, a| {
        a.price
            .checked_multiply_quantity(a.quantity)
            .and_then(|line| acc.checked_add(line))
            .ok_or_else(too_large)
    })?;

    let gross = subtotal.checked_add(add_ons_total).ok_or_else(too_large)?;
    let discount_amount = input.discount.min(gross);
    let taxable = gross - discount_amount;
    let tax_amount = taxable
        .checked_percent_of(input.tax_rate)
        .ok_or_else(too_large)?;
    let service_fee = subtotal
        .checked_percent_of(input.service_fee_rate)
        .ok_or_else(too_large)?;

    let total_amount = taxable
        .checked_add(tax_amount)
        .and_then(|t| t.checked_add(service_fee))
        .ok_or_else(too_large)?;

    Ok(PricingBreakdown {
        base_price: input.base_price,
        price_per_person,
        travelers: input.travelers,
        subtotal,
        add_ons_total,
        discount_amount,
        tax_amount,
        service_fee,
        total_amount,
    })
}

fn too_large() -> CoreError {
    CoreError::invalid_argument("booking total exceeds the supported amount")
}
