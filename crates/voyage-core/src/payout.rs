//! # Vendor Payout
//!
//! Splits a gross booking amount into platform commission, holdback and the
//! vendor's net payout.
//!
//! ```text
//!   booking amount $1000.00   commission 15%   holdback 5%
//!        │
//!        ├── platform_commission = round($1000.00 × 15%) = $150.00
//!        ├── holdback_amount     = round($1000.00 ×  5%) =  $50.00
//!        └── vendor_net          = $1000 - $150 - $50    = $800.00
//! ```
//!
//! Each component is rounded to cents on its own; `vendor_net` is the
//! remainder, so the three parts always add back up to the booking amount.

use tracing::debug;

use crate::error::{CoreError, CoreResult};
use crate::money::Money;
use crate::types::{Percentage, VendorPayout};

/// Computes the payout split for a booking.
///
/// ## Errors
/// `CoreError::InvalidArgument` when the amount is negative or the combined
/// rates exceed 100%.
///
/// ## Example
/// ```rust
/// use voyage_core::money::Money;
/// use voyage_core::payout::compute_payout;
/// use voyage_core::types::Percentage;
///
/// let payout = compute_payout(
///     Money::from_cents(100_000),
///     Percentage::from_bps(1500),
///     Percentage::from_bps(500),
/// )
/// .unwrap();
/// assert_eq!(payout.vendor_net, Money::from_cents(80_000));
/// ```
pub fn compute_payout(
    booking_amount: Money,
    commission_rate: Percentage,
    holdback_rate: Percentage,
) -> CoreResult<VendorPayout> {
    if booking_amount.is_negative() {
        return Err(CoreError::invalid_argument(format!(
            "booking amount must not be negative, got {}",
            booking_amount
        )));
    }

    for (name, rate) in [("commission", commission_rate), ("holdback", holdback_rate)] {
        if rate > Percentage::FULL {
            return Err(CoreError::invalid_argument(format!(
                "{} rate must be between 0% and 100%, got {}%",
                name,
                rate.percentage()
            )));
        }
    }

    if commission_rate.bps() + holdback_rate.bps() > Percentage::FULL.bps() {
        return Err(CoreError::invalid_argument(
            "commission and holdback together exceed 100%",
        ));
    }

    let platform_commission = booking_amount.percent_of(commission_rate);
    let holdback_amount = booking_amount.percent_of(holdback_rate);
    let vendor_net = booking_amount - platform_commission - holdback_amount;

    debug!(
        amount = booking_amount.cents(),
        commission = platform_commission.cents(),
        holdback = holdback_amount.cents(),
        net = vendor_net.cents(),
        "Computed vendor payout"
    );

    Ok(VendorPayout {
        total_amount: booking_amount,
        platform_commission,
        holdback_amount,
        vendor_net,
    })
}

/// Same as [`compute_payout`] with no holdback.
pub fn compute_payout_without_holdback(
    booking_amount: Money,
    commission_rate: Percentage,
) -> CoreResult<VendorPayout> {
    compute_payout(booking_amount, commission_rate, Percentage::zero())
}
