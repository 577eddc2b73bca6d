//! Payout, refund and booking price quotes.
//!
//! All three are pure computations over voyage-core; only the booking price
//! touches the database, to look up a promo code when one is given.

use axum::extract::State;
use axum::routing::post;
use axum::Router;
use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use tracing::debug;

use voyage_core::error::CoreError;
use voyage_core::payout::compute_payout;
use voyage_core::pricing::{calculate_booking_price, GroupRate, PricingInput};
use voyage_core::refund::{compute_refund, days_until, RefundPolicy};
use voyage_core::types::{AddOn, Percentage, PricingBreakdown, PromoRequest, RefundRule, VendorPayout};

use super::promo::PromoQuoteResponse;
use super::{money, rate};
use crate::error::{ApiJson, ApiResult};
use crate::state::AppState;

pub fn router() -> Router<AppState> {
    Router::new()
        .route("/payouts/quote", post(quote_payout))
        .route("/refunds/quote", post(quote_refund))
        .route("/bookings/price", post(quote_booking_price))
}

// =============================================================================
// Payout
// =============================================================================

#[derive(Debug, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct PayoutQuoteBody {
    pub amount: f64,
    /// Percent. Falls back to the configured default commission.
    pub commission_rate: Option<f64>,
    #[serde(default)]
    pub holdback_rate: f64,
}

#[derive(Debug, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct PayoutQuoteResponse {
    pub total_amount: f64,
    pub platform_commission: f64,
    pub holdback_amount: f64,
    pub vendor_net: f64,
}

impl From<VendorPayout> for PayoutQuoteResponse {
    fn from(payout: VendorPayout) -> Self {
        PayoutQuoteResponse {
            total_amount: payout.total_amount.to_major(),
            platform_commission: payout.platform_commission.to_major(),
            holdback_amount: payout.holdback_amount.to_major(),
            vendor_net: payout.vendor_net.to_major(),
        }
    }
}

async fn quote_payout(
    State(state): State<AppState>,
    ApiJson(body): ApiJson<PayoutQuoteBody>,
) -> ApiResult<ApiJson<PayoutQuoteResponse>> {
    let amount = money("amount", body.amount)?;
    let commission = match body.commission_rate {
        Some(pct) => rate("commissionRate", pct)?,
        None => state.config.default_commission_rate,
    };
    let holdback = rate("holdbackRate", body.holdback_rate)?;

    let payout = compute_payout(amount, commission, holdback)?;
    Ok(ApiJson(payout.into()))
}

// =============================================================================
// Refund
// =============================================================================

#[derive(Debug, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct RefundRuleBody {
    pub days_before_start: i64,
    /// Percent.
    pub refund_percentage: f64,
}

#[derive(Debug, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct RefundQuoteBody {
    pub amount: f64,
    pub trip_start_date: DateTime<Utc>,
    pub rules: Vec<RefundRuleBody>,
}

#[derive(Debug, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct RefundQuoteResponse {
    pub refund_amount: f64,
    /// Percent of the tier that applied; 0 when none did.
    pub refund_percentage: f64,
    pub days_until_trip: i64,
}

async fn quote_refund(ApiJson(body): ApiJson<RefundQuoteBody>) -> ApiResult<ApiJson<RefundQuoteResponse>> {
    let amount = money("amount", body.amount)?;
    let rules = body
        .rules
        .iter()
        .map(|r| {
            Ok(RefundRule {
                days_before_start: r.days_before_start,
                refund_percentage: rate("refundPercentage", r.refund_percentage)?,
            })
        })
        .collect::<ApiResult<Vec<_>>>()?;
    let policy = RefundPolicy::new(rules)?;

    let now = Utc::now();
    let days = days_until(body.trip_start_date, now);
    let refund = compute_refund(amount, &policy, body.trip_start_date, now);

    Ok(ApiJson(RefundQuoteResponse {
        refund_amount: refund.to_major(),
        refund_percentage: policy.percentage_for(days).unwrap_or_default().percentage(),
        days_until_trip: days,
    }))
}

// =============================================================================
// Booking Price
// =============================================================================

#[derive(Debug, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct AddOnBody {
    pub name: String,
    pub price: f64,
    #[serde(default = "one")]
    pub quantity: i64,
}

fn one() -> i64 {
    1
}

#[derive(Debug, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct GroupRateBody {
    pub min_travelers: i64,
    /// Percent off the per-person price.
    pub discount: f64,
}

#[derive(Debug, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct BookingPriceBody {
    pub price_per_person: f64,
    pub travelers: i64,
    #[serde(default)]
    pub add_ons: Vec<AddOnBody>,
    pub group_rate: Option<GroupRateBody>,
    /// Flat discount in major units, on top of any promo.
    #[serde(default)]
    pub discount: f64,
    pub promo_code: Option<String>,
    pub vendor_id: Option<String>,
    pub trip_id: Option<String>,
    pub category: Option<String>,
    /// Percent. Falls back to the configured tax rate.
    pub tax_rate: Option<f64>,
    /// Percent. Falls back to the configured service fee.
    pub service_fee_rate: Option<f64>,
}

#[derive(Debug, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct BookingPriceResponse {
    pub base_price: f64,
    pub price_per_person: f64,
    pub travelers: i64,
    pub subtotal: f64,
    pub add_ons_total: f64,
    pub discount_amount: f64,
    pub tax_amount: f64,
    pub service_fee: f64,
    pub total_amount: f64,
    pub promo: Option<PromoQuoteResponse>,
}

impl BookingPriceResponse {
    fn new(price: PricingBreakdown, promo: Option<PromoQuoteResponse>) -> Self {
        BookingPriceResponse {
            base_price: price.base_price.to_major(),
            price_per_person: price.price_per_person.to_major(),
            travelers: price.travelers,
            subtotal: price.subtotal.to_major(),
            add_ons_total: price.add_ons_total.to_major(),
            discount_amount: price.discount_amount.to_major(),
            tax_amount: price.tax_amount.to_major(),
            service_fee: price.service_fee.to_major(),
            total_amount: price.total_amount.to_major(),
            promo,
        }
    }
}

/// Prices once without discounts to learn the subtotal, validates the promo
/// against it, then prices again with the promo discount added.
async fn quote_booking_price(
    State(state): State<AppState>,
    ApiJson(body): ApiJson<BookingPriceBody>,
) -> ApiResult<ApiJson<BookingPriceResponse>> {
    let mut input = PricingInput::new(money("pricePerPerson", body.price_per_person)?, body.travelers);
    input.add_ons = body
        .add_ons
        .iter()
        .map(|a| {
            Ok(AddOn {
                name: a.name.clone(),
                price: money("addOns.price", a.price)?,
                quantity: a.quantity,
            })
        })
        .collect::<ApiResult<Vec<_>>>()?;
    input.group_rate = body
        .group_rate
        .as_ref()
        .map(|g| -> ApiResult<GroupRate> {
            Ok(GroupRate {
                min_travelers: g.min_travelers,
                discount: rate("groupRate.discount", g.discount)?,
            })
        })
        .transpose()?;
    input.tax_rate = optional_rate("taxRate", body.tax_rate, state.config.tax_rate)?;
    input.service_fee_rate =
        optional_rate("serviceFeeRate", body.service_fee_rate, state.config.service_fee_rate)?;

    let flat_discount = money("discount", body.discount)?;
    let undiscounted = calculate_booking_price(&input)?;

    let quote = match body.promo_code.as_deref() {
        Some(code) => {
            let request = PromoRequest {
                code: code.to_string(),
                amount: undiscounted.subtotal,
                vendor_id: body.vendor_id.clone(),
                trip_id: body.trip_id.clone(),
                category: body.category.clone(),
            };
            Some(state.promos().validate(&request, Utc::now()).await?)
        }
        None => None,
    };

    let promo_discount = quote.as_ref().map(|q| q.discount).unwrap_or_default();
    input.discount = flat_discount
        .checked_add(promo_discount)
        .ok_or_else(|| CoreError::invalid_argument("discount exceeds the supported amount"))?;
    let price = calculate_booking_price(&input)?;

    debug!(
        travelers = price.travelers,
        total = price.total_amount.cents(),
        promo = quote.as_ref().map(|q| q.code.as_str()),
        "Priced booking"
    );

    Ok(ApiJson(BookingPriceResponse::new(price, quote.map(Into::into))))
}

fn optional_rate(field: &str, value: Option<f64>, default: Percentage) -> ApiResult<Percentage> {
    match value {
        Some(pct) => rate(field, pct),
        None => Ok(default),
    }
}

#[cfg(test)]
mod tests {
    use axum::http::{Method, StatusCode};
    use chrono::{Duration, Utc};
    use serde_json::json;

    use crate::routes::router;
    use crate::routes::test_support::send;
    use crate::state::test_support::{test_state, test_state_with};

    #[tokio::test]
    async fn test_payout_quote() {
        let app = router(test_state().await);

        let (status, body) = send(
            &app,
            Method::POST,
            "/payouts/quote",
            Some(json!({"amount": 1000.0, "commissionRate": 15, "holdbackRate": 5})),
        )
        .await;

        assert_eq!(status, StatusCode::OK);
        assert_eq!(body["platformCommission"], 150.0);
        assert_eq!(body["holdbackAmount"], 50.0);
        assert_eq!(body["vendorNet"], 800.0);
    }

    #[tokio::test]
    async fn test_payout_uses_configured_commission() {
        let app = router(test_state_with(&[("DEFAULT_COMMISSION_RATE", "10")]).await);

        let (_, body) =
            send(&app, Method::POST, "/payouts/quote", Some(json!({"amount": 200.0}))).await;
        assert_eq!(body["platformCommission"], 20.0);
        assert_eq!(body["vendorNet"], 180.0);
    }

    #[tokio::test]
    async fn test_payout_rejects_bad_rates() {
        let app = router(test_state().await);

        let (status, body) = send(
            &app,
            Method::POST,
            "/payouts/quote",
            Some(json!({"amount": 100.0, "commissionRate": 80, "holdbackRate": 30})),
        )
        .await;
        assert_eq!(status, StatusCode::BAD_REQUEST);
        assert_eq!(body["code"], "INVALID_ARGUMENT");

        let (status, body) = send(
            &app,
            Method::POST,
            "/payouts/quote",
            Some(json!({"amount": 100.0, "commissionRate": 150})),
        )
        .await;
        assert_eq!(status, StatusCode::BAD_REQUEST);
        assert_eq!(body["code"], "VALIDATION_ERROR");
    }

    #[tokio::test]
    async fn test_refund_quote_tiers() {
        let app = router(test_state().await);
        let rules = json!([
            {"daysBeforeStart": 14, "refundPercentage": 50},
            {"daysBeforeStart": 30, "refundPercentage": 100},
        ]);

        let start = Utc::now() + Duration::days(20);
        let (status, body) = send(
            &app,
            Method::POST,
            "/refunds/quote",
            Some(json!({"amount": 1000.0, "tripStartDate": start.to_rfc3339(), "rules": rules})),
        )
        .await;
        assert_eq!(status, StatusCode::OK);
        assert_eq!(body["refundAmount"], 500.0);
        assert_eq!(body["refundPercentage"], 50.0);

        let start = Utc::now() + Duration::days(3);
        let (_, body) = send(
            &app,
            Method::POST,
            "/refunds/quote",
            Some(json!({"amount": 1000.0, "tripStartDate": start.to_rfc3339(), "rules": rules})),
        )
        .await;
        assert_eq!(body["refundAmount"], 0.0);
    }

    #[tokio::test]
    async fn test_refund_rejects_duplicate_tiers() {
        let app = router(test_state().await);
        let (status, body) = send(
            &app,
            Method::POST,
            "/refunds/quote",
            Some(json!({
                "amount": 100.0,
                "tripStartDate": Utc::now().to_rfc3339(),
                "rules": [
                    {"daysBeforeStart": 7, "refundPercentage": 50},
                    {"daysBeforeStart": 7, "refundPercentage": 25},
                ],
            })),
        )
        .await;
        assert_eq!(status, StatusCode::BAD_REQUEST);
        assert_eq!(body["code"], "INVALID_ARGUMENT");
    }

    #[tokio::test]
    async fn test_booking_price() {
        let app = router(test_state().await);

        let (status, body) = send(
            &app,
            Method::POST,
            "/bookings/price",
            Some(json!({
                "pricePerPerson": 500.0,
                "travelers": 2,
                "addOns": [{"name": "Insurance", "price": 25.0, "quantity": 2}],
                "taxRate": 10,
                "serviceFeeRate": 5,
            })),
        )
        .await;

        assert_eq!(status, StatusCode::OK);
        assert_eq!(body["subtotal"], 1000.0);
        assert_eq!(body["addOnsTotal"], 50.0);
        assert_eq!(body["taxAmount"], 105.0);
        assert_eq!(body["serviceFee"], 50.0);
        assert_eq!(body["totalAmount"], 1205.0);
        assert!(body["promo"].is_null());
    }

    #[tokio::test]
    async fn test_booking_price_with_promo() {
        let app = router(test_state().await);
        let now = Utc::now();
        let (status, _) = send(
            &app,
            Method::POST,
            "/promo-codes",
            Some(json!({
                "code": "SUMMER20",
                "discountType": "percentage",
                "discountValue": 2000,
                "maxDiscount": 15000,
                "validFrom": (now - Duration::days(1)).to_rfc3339(),
                "validUntil": (now + Duration::days(1)).to_rfc3339(),
            })),
        )
        .await;
        assert_eq!(status, StatusCode::CREATED);

        let (status, body) = send(
            &app,
            Method::POST,
            "/bookings/price",
            Some(json!({
                "pricePerPerson": 250.0,
                "travelers": 2,
                "promoCode": "summer20",
                "taxRate": 0,
                "serviceFeeRate": 0,
            })),
        )
        .await;

        assert_eq!(status, StatusCode::OK);
        assert_eq!(body["discountAmount"], 100.0);
        assert_eq!(body["totalAmount"], 400.0);
        assert_eq!(body["promo"]["code"], "SUMMER20");
    }

    #[tokio::test]
    async fn test_booking_price_rejects_overflowing_total() {
        let app = router(test_state().await);
        let (status, body) = send(
            &app,
            Method::POST,
            "/bookings/price",
            Some(json!({"pricePerPerson": 1.0e16, "travelers": 50})),
        )
        .await;
        assert_eq!(status, StatusCode::BAD_REQUEST);
        assert_eq!(body["code"], "INVALID_ARGUMENT");
    }

    #[tokio::test]
    async fn test_booking_price_rejects_zero_travelers() {
        let app = router(test_state().await);
        let (status, body) = send(
            &app,
            Method::POST,
            "/bookings/price",
            Some(json!({"pricePerPerson": 100.0, "travelers": 0})),
        )
        .await;
        assert_eq!(status, StatusCode::BAD_REQUEST);
        assert_eq!(body["code"], "VALIDATION_ERROR");
    }
}
