//! # API Error Type
//!
//! Unified error type for HTTP handlers.
//!
//! ## Error Handling Strategy
//! ```text
//! ┌─────────────────────────────────────────────────────────────────────────┐
//! │                    Error Flow in Voyage API                             │
//! │                                                                         │
//! │  Handler: Result<Json<T>, ApiError>                                     │
//! │         │                                                               │
//! │         ├── PromoError ───────── 404 NOT_FOUND / 422 <kind>             │
//! │         ├── ValidationError ──── 400 VALIDATION_ERROR                   │
//! │         ├── CoreError ────────── 400 INVALID_ARGUMENT                   │
//! │         ├── DbError ──────────── 404 / 409 CONFLICT / 500 DATABASE_ERROR│
//! │         ├── CacheError ───────── 503 CACHE_UNAVAILABLE                  │
//! │         └── JsonRejection ────── 400 INVALID_BODY                       │
//! │                                                                         │
//! │  Response body: { "code": "EXPIRED", "message": "Promo code ..." }       │
//! └─────────────────────────────────────────────────────────────────────────┘
//! ```

use axum::extract::rejection::JsonRejection;
use axum::extract::FromRequest;
use axum::http::StatusCode;
use axum::response::{IntoResponse, Response};
use axum::Json;
use serde::Serialize;

use voyage_cache::CacheError;
use voyage_core::{CoreError, PromoError, PromoErrorKind, ValidationError};
use voyage_db::DbError;

/// Error returned from every handler.
///
/// ## Serialization
/// ```json
/// {
///   "code": "MIN_PURCHASE_NOT_MET",
///   "message": "Minimum purchase of $500.00 required for promo code SUMMER20"
/// }
/// ```
#[derive(Debug, Clone, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct ApiError {
    /// Machine-readable error code for programmatic handling
    pub code: String,

    /// Human-readable error message for display
    pub message: String,

    #[serde(skip)]
    pub status: StatusCode,
}

pub mod codes {
    pub const VALIDATION_ERROR: &str = "VALIDATION_ERROR";
    pub const INVALID_ARGUMENT: &str = "INVALID_ARGUMENT";
    pub const INVALID_BODY: &str = "INVALID_BODY";
    pub const CONFLICT: &str = "CONFLICT";
    pub const DATABASE_ERROR: &str = "DATABASE_ERROR";
    pub const CACHE_UNAVAILABLE: &str = "CACHE_UNAVAILABLE";
    pub const INTERNAL: &str = "INTERNAL";
}

impl ApiError {
    pub fn new(status: StatusCode, code: impl Into<String>, message: impl Into<String>) -> Self {
        ApiError {
            code: code.into(),
            message: message.into(),
            status,
        }
    }

    /// Creates a not found error.
    pub fn not_found(resource: &str, id: &str) -> Self {
        ApiError::new(
            StatusCode::NOT_FOUND,
            PromoErrorKind::NotFound.as_str(),
            format!("{} not found: {}", resource, id),
        )
    }

    /// Creates a validation error.
    pub fn validation(message: impl Into<String>) -> Self {
        ApiError::new(StatusCode::BAD_REQUEST, codes::VALIDATION_ERROR, message)
    }

    /// Creates an internal error.
    pub fn internal(message: impl Into<String>) -> Self {
        ApiError::new(StatusCode::INTERNAL_SERVER_ERROR, codes::INTERNAL, message)
    }
}

impl std::fmt::Display for ApiError {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(f, "[{}] {}", self.code, self.message)
    }
}

impl std::error::Error for ApiError {}

impl IntoResponse for ApiError {
    fn into_response(self) -> Response {
        (self.status, Json(self)).into_response()
    }
}

pub type ApiResult<T> = Result<T, ApiError>;

// =============================================================================
// Conversions
// =============================================================================

impl From<PromoError> for ApiError {
    fn from(err: PromoError) -> Self {
        let kind = err.kind();
        let status = match kind {
            PromoErrorKind::NotFound => StatusCode::NOT_FOUND,
            _ => StatusCode::UNPROCESSABLE_ENTITY,
        };
        ApiError::new(status, kind.as_str(), err.to_string())
    }
}

impl From<ValidationError> for ApiError {
    fn from(err: ValidationError) -> Self {
        ApiError::validation(err.to_string())
    }
}

impl From<CoreError> for ApiError {
    fn from(err: CoreError) -> Self {
        match err {
            CoreError::Promo(e) => e.into(),
            CoreError::Validation(e) => e.into(),
            CoreError::InvalidArgument(_) | CoreError::InvalidRefundPolicy { .. } => {
                ApiError::new(StatusCode::BAD_REQUEST, codes::INVALID_ARGUMENT, err.to_string())
            }
        }
    }
}

/// Converts database errors to API errors.
impl From<DbError> for ApiError {
    fn from(err: DbError) -> Self {
        match err {
            DbError::NotFound { entity, id } => ApiError::not_found(&entity, &id),
            DbError::UniqueViolation { field, value } => ApiError::new(
                StatusCode::CONFLICT,
                codes::CONFLICT,
                format!("{} '{}' already exists", field, value),
            ),
            DbError::Rejected(e) => e.into(),
            DbError::ForeignKeyViolation { message } => {
                tracing::error!("Foreign key violation: {}", message);
                ApiError::validation("Invalid reference")
            }
            DbError::PoolExhausted => ApiError::new(
                StatusCode::SERVICE_UNAVAILABLE,
                codes::DATABASE_ERROR,
                "Database pool exhausted",
            ),
            other => {
                // Log the actual error but return a generic message
                tracing::error!(error = %other, "Database operation failed");
                ApiError::new(
                    StatusCode::INTERNAL_SERVER_ERROR,
                    codes::DATABASE_ERROR,
                    "Database operation failed",
                )
            }
        }
    }
}

impl From<CacheError> for ApiError {
    fn from(err: CacheError) -> Self {
        tracing::warn!(error = %err, "Cache operation failed");
        ApiError::new(
            StatusCode::SERVICE_UNAVAILABLE,
            codes::CACHE_UNAVAILABLE,
            "Cache unavailable",
        )
    }
}

impl From<JsonRejection> for ApiError {
    fn from(rejection: JsonRejection) -> Self {
        ApiError::new(rejection.status(), codes::INVALID_BODY, rejection.body_text())
    }
}

// =============================================================================
// JSON Extractor
// =============================================================================

/// `axum::Json` whose rejection is an [`ApiError`], so malformed bodies get
/// the same `{code, message}` shape as every other failure.
#[derive(Debug, FromRequest)]
#[from_request(via(axum::Json), rejection(ApiError))]
pub struct ApiJson<T>(pub T);

impl<T: Serialize> IntoResponse for ApiJson<T> {
    fn into_response(self) -> Response {
        Json(self.0).into_response()
    }
}
