//! Promo code endpoints.

use axum::extract::{Path, Query, State};
use axum::http::StatusCode;
use axum::routing::{get, post, put};
use axum::Router;
use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};

use voyage_core::money::Money;
use voyage_core::types::{DiscountType, PromoCode, PromoQuote, PromoRequest};
use voyage_core::validation::validate_rate_bps;
use voyage_core::ValidationError;
use voyage_db::repository::promo::generate_promo_id;
use voyage_db::PromoPage;

use super::money;
use crate::error::{ApiJson, ApiResult};
use crate::state::AppState;

const DEFAULT_LIST_LIMIT: i64 = 20;

pub fn router() -> Router<AppState> {
    Router::new()
        .route("/promo-codes", get(list_promos).post(create_promo))
        .route("/promo-codes/validate", post(validate_promo))
        .route("/promo-codes/redeem", post(redeem_promo))
        .route("/promo-codes/{code}", get(get_promo))
        .route("/promo-codes/{code}/active", put(set_promo_active))
}

// =============================================================================
// DTOs
// =============================================================================

#[derive(Debug, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct ValidatePromoBody {
    pub code: String,
    pub amount: f64,
    pub vendor_id: Option<String>,
    pub trip_id: Option<String>,
    pub category: Option<String>,
}

impl ValidatePromoBody {
    pub(crate) fn to_request(&self) -> ApiResult<PromoRequest> {
        Ok(PromoRequest {
            code: self.code.clone(),
            amount: money("amount", self.amount)?,
            vendor_id: self.vendor_id.clone(),
            trip_id: self.trip_id.clone(),
            category: self.category.clone(),
        })
    }
}

/// A promo quote in major units. `discountValue` is a percentage for
/// percentage codes and an amount for fixed codes.
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct PromoQuoteResponse {
    pub code: String,
    pub discount_type: DiscountType,
    pub discount_value: f64,
    pub discount: f64,
    pub final_amount: f64,
}

impl From<PromoQuote> for PromoQuoteResponse {
    fn from(quote: PromoQuote) -> Self {
        PromoQuoteResponse {
            code: quote.code,
            discount_type: quote.discount_type,
            // bps / 100 = percent, cents / 100 = major units
            discount_value: quote.discount_value as f64 / 100.0,
            discount: quote.discount.to_major(),
            final_amount: quote.final_amount.to_major(),
        }
    }
}

/// New promo, in storage units (basis points / cents).
#[derive(Debug, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct CreatePromoBody {
    pub code: String,
    pub description: Option<String>,
    pub discount_type: DiscountType,
    pub discount_value: i64,
    pub max_discount: Option<Money>,
    #[serde(default)]
    pub min_purchase_amount: Money,
    pub usage_limit: Option<i64>,
    pub usage_per_user: Option<i64>,
    pub valid_from: DateTime<Utc>,
    pub valid_until: DateTime<Utc>,
    #[serde(default)]
    pub applicable_trips: Vec<String>,
    #[serde(default)]
    pub applicable_vendors: Vec<String>,
    #[serde(default)]
    pub applicable_categories: Vec<String>,
    #[serde(default)]
    pub excluded_vendors: Vec<String>,
    #[serde(default = "default_true")]
    pub is_active: bool,
}

fn default_true() -> bool {
    true
}

impl CreatePromoBody {
    fn into_promo(self, now: DateTime<Utc>) -> ApiResult<PromoCode> {
        match self.discount_type {
            DiscountType::Percentage => validate_rate_bps("discountValue", self.discount_value)?,
            DiscountType::Fixed => {}
        }
        if self.discount_value <= 0 {
            return Err(positive("discountValue").into());
        }
        if self.max_discount.is_some_and(|cap| cap.is_negative()) {
            return Err(ValidationError::MustNotBeNegative {
                field: "maxDiscount".to_string(),
            }
            .into());
        }
        if self.min_purchase_amount.is_negative() {
            return Err(ValidationError::MustNotBeNegative {
                field: "minPurchaseAmount".to_string(),
            }
            .into());
        }
        for (field, limit) in [("usageLimit", self.usage_limit), ("usagePerUser", self.usage_per_user)] {
            if limit.is_some_and(|n| n <= 0) {
                return Err(positive(field).into());
            }
        }
        if self.valid_until <= self.valid_from {
            return Err(ValidationError::InvalidFormat {
                field: "validUntil".to_string(),
                reason: "must be after validFrom".to_string(),
            }
            .into());
        }

        Ok(PromoCode {
            id: generate_promo_id(),
            code: self.code,
            description: self.description,
            discount_type: self.discount_type,
            discount_value: self.discount_value,
            max_discount: self.max_discount,
            min_purchase_amount: self.min_purchase_amount,
            usage_limit: self.usage_limit,
            usage_per_user: self.usage_per_user,
            used_count: 0,
            valid_from: self.valid_from,
            valid_until: self.valid_until,
            applicable_trips: self.applicable_trips,
            applicable_vendors: self.applicable_vendors,
            applicable_categories: self.applicable_categories,
            excluded_vendors: self.excluded_vendors,
            is_active: self.is_active,
            created_at: now,
            updated_at: now,
        })
    }
}

fn positive(field: &str) -> ValidationError {
    ValidationError::MustBePositive {
        field: field.to_string(),
    }
}

#[derive(Debug, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct RedeemPromoBody {
    pub code: String,
    pub user_id: String,
    pub booking_id: String,
}

#[derive(Debug, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct SetActiveBody {
    pub is_active: bool,
}

#[derive(Debug, Deserialize)]
pub struct ListQuery {
    pub after: Option<String>,
    pub limit: Option<i64>,
}

// =============================================================================
// Handlers
// =============================================================================

async fn validate_promo(
    State(state): State<AppState>,
    ApiJson(body): ApiJson<ValidatePromoBody>,
) -> ApiResult<ApiJson<PromoQuoteResponse>> {
    let request = body.to_request()?;
    let quote = state.promos().validate(&request, Utc::now()).await?;
    Ok(ApiJson(quote.into()))
}

async fn get_promo(
    State(state): State<AppState>,
    Path(code): Path<String>,
) -> ApiResult<ApiJson<PromoCode>> {
    Ok(ApiJson(state.promos().get(&code).await?))
}

async fn list_promos(
    State(state): State<AppState>,
    Query(query): Query<ListQuery>,
) -> ApiResult<ApiJson<PromoPage>> {
    let limit = query.limit.unwrap_or(DEFAULT_LIST_LIMIT);
    let page = state.promos().list(query.after.as_deref(), limit).await?;
    Ok(ApiJson(page))
}

async fn create_promo(
    State(state): State<AppState>,
    ApiJson(body): ApiJson<CreatePromoBody>,
) -> ApiResult<(StatusCode, ApiJson<PromoCode>)> {
    let promo = body.into_promo(Utc::now())?;
    let created = state.promos().create(promo).await?;
    Ok((StatusCode::CREATED, ApiJson(created)))
}

async fn set_promo_active(
    State(state): State<AppState>,
    Path(code): Path<String>,
    ApiJson(body): ApiJson<SetActiveBody>,
) -> ApiResult<ApiJson<PromoCode>> {
    Ok(ApiJson(state.promos().set_active(&code, body.is_active).await?))
}

async fn redeem_promo(
    State(state): State<AppState>,
    ApiJson(body): ApiJson<RedeemPromoBody>,
) -> ApiResult<ApiJson<PromoCode>> {
    let promo = state
        .promos()
        .redeem(&body.code, &body.user_id, &body.booking_id, Utc::now())
        .await?;
    Ok(ApiJson(promo))
}
