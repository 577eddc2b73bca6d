//! # HTTP Routes
//!
//! ```text
//! POST /promo-codes/validate        validate a code against an amount
//! GET  /promo-codes                 list promos (keyset: ?after=&limit=)
//! POST /promo-codes                 create a promo
//! GET  /promo-codes/{code}          fetch one promo
//! PUT  /promo-codes/{code}/active   activate / deactivate
//! POST /promo-codes/redeem          record a use on a booking
//! POST /payouts/quote               vendor payout split
//! POST /refunds/quote               refund for a cancellation
//! POST /bookings/price              booking price breakdown
//! GET  /health                      database + cache status
//! ```
//!
//! Quote endpoints take and return amounts in major units (`1234.56`) and
//! rates as percentages (`15` = 15%). Promo records are exchanged as stored:
//! cents and basis points.

pub mod health;
pub mod promo;
pub mod quotes;

use axum::Router;
use tower_http::trace::TraceLayer;

use voyage_core::money::Money;
use voyage_core::types::Percentage;
use voyage_core::ValidationError;

use crate::error::ApiResult;
use crate::state::AppState;

/// Builds the application router.
pub fn router(state: AppState) -> Router {
    Router::new()
        .merge(promo::router())
        .merge(quotes::router())
        .merge(health::router())
        .layer(TraceLayer::new_for_http())
        .with_state(state)
}

/// Parses a major-unit amount from a request body.
pub(crate) fn money(field: &str, value: f64) -> ApiResult<Money> {
    Money::from_major(value).ok_or_else(|| {
        ValidationError::InvalidFormat {
            field: field.to_string(),
            reason: "must be a finite amount".to_string(),
        }
        .into()
    })
}

/// Parses a percentage (`15.5` = 15.5%) from a request body.
pub(crate) fn rate(field: &str, value: f64) -> ApiResult<Percentage> {
    Ok(Percentage::from_percentage(field, value)?)
}

#[cfg(test)]
pub(crate) mod test_support {
    use axum::body::Body;
    use axum::http::{Method, Request, StatusCode};
    use axum::Router;
    use serde_json::Value;
    use tower::util::ServiceExt; // for `oneshot`

    /// Sends one request and returns the status and JSON body.
    pub async fn send(app: &Router, method: Method, uri: &str, body: Option<Value>) -> (StatusCode, Value) {
        let builder = Request::builder().method(method).uri(uri);
        let request = match body {
            Some(json) => builder
                .header("content-type", "application/json")
                .body(Body::from(json.to_string()))
                .unwrap(),
            None => builder.body(Body::empty()).unwrap(),
        };

        let response = app.clone().oneshot(request).await.unwrap();
        let status = response.status();
        let bytes = axum::body::to_bytes(response.into_body(), usize::MAX)
            .await
            .unwrap();
        let json = if bytes.is_empty() {
            Value::Null
        } else {
            serde_json::from_slice(&bytes).unwrap()
        };
        (status, json)
    }
}
