//! # Error Types
//!
//! Domain-specific error types for voyage-core.
//!
//! ## Error Hierarchy
//! ```text
//! ┌─────────────────────────────────────────────────────────────────────────┐
//! │                         Error Types                                     │
//! │                                                                         │
//! │  voyage-core errors (this file)                                        │
//! │  ├── CoreError        - General domain errors                          │
//! │  ├── PromoError       - Promo eligibility failures (typed kinds)       │
//! │  └── ValidationError  - Input validation failures                      │
//! │                                                                         │
//! │  voyage-db errors     └── DbError    - Database operation failures     │
//! │  voyage-cache errors  └── CacheError - Cache store failures            │
//! │  apps/api             └── ApiError   - What the frontend sees          │
//! │                                                                         │
//! │  Flow: ValidationError → CoreError → ApiError → Frontend               │
//! │        PromoError ─────────────────► ApiError → Frontend               │
//! └─────────────────────────────────────────────────────────────────────────┘
//! ```

use serde::{Deserialize, Serialize};
use thiserror::Error;
use ts_rs::TS;

use crate::money::Money;

// =============================================================================
// Core Error
// =============================================================================

/// Core business logic errors.
#[derive(Debug, Error)]
pub enum CoreError {
    /// An argument is outside its domain (negative amount, rate above 100%).
    #[error("Invalid argument: {0}")]
    InvalidArgument(String),

    /// A refund policy could not be built.
    #[error("Invalid refund policy: {reason}")]
    InvalidRefundPolicy { reason: String },

    /// Promo code was rejected.
    #[error(transparent)]
    Promo(#[from] PromoError),

    /// Validation error (wraps ValidationError).
    #[error("Validation error: {0}")]
    Validation(#[from] ValidationError),
}

impl CoreError {
    pub fn invalid_argument(message: impl Into<String>) -> Self {
        CoreError::InvalidArgument(message.into())
    }
}

// =============================================================================
// Promo Error
// =============================================================================

/// Machine-readable promo rejection codes, as sent to the frontend.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize, TS)]
#[ts(export)]
#[serde(rename_all = "SCREAMING_SNAKE_CASE")]
pub enum PromoErrorKind {
    NotFound,
    Inactive,
    NotYetValid,
    Expired,
    UsageLimitReached,
    UserLimitReached,
    MinPurchaseNotMet,
    VendorExcluded,
    VendorNotApplicable,
    TripNotApplicable,
    CategoryNotApplicable,
}

impl PromoErrorKind {
    pub fn as_str(&self) -> &'static str {
        match self {
            PromoErrorKind::NotFound => "NOT_FOUND",
            PromoErrorKind::Inactive => "INACTIVE",
            PromoErrorKind::NotYetValid => "NOT_YET_VALID",
            PromoErrorKind::Expired => "EXPIRED",
            PromoErrorKind::UsageLimitReached => "USAGE_LIMIT_REACHED",
            PromoErrorKind::UserLimitReached => "USER_LIMIT_REACHED",
            PromoErrorKind::MinPurchaseNotMet => "MIN_PURCHASE_NOT_MET",
            PromoErrorKind::VendorExcluded => "VENDOR_EXCLUDED",
            PromoErrorKind::VendorNotApplicable => "VENDOR_NOT_APPLICABLE",
            PromoErrorKind::TripNotApplicable => "TRIP_NOT_APPLICABLE",
            PromoErrorKind::CategoryNotApplicable => "CATEGORY_NOT_APPLICABLE",
        }
    }
}

/// Why a promo code cannot be applied.
///
/// ## Check Order
/// ```text
/// lookup ──► active ──► window ──► usage ──► min purchase ──► vendor ──► trip/category
///   │          │          │          │            │             │             │
/// NOT_FOUND INACTIVE  NOT_YET_VALID USAGE_    MIN_PURCHASE_  VENDOR_*    TRIP_* /
///                     / EXPIRED     LIMIT_    NOT_MET                    CATEGORY_*
///                                   REACHED
/// ```
/// The first failing check wins.
#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum PromoError {
    #[error("Promo code not found: {code}")]
    NotFound { code: String },

    #[error("Promo code {code} is no longer active")]
    Inactive { code: String },

    #[error("Promo code {code} is not valid yet")]
    NotYetValid { code: String },

    #[error("Promo code {code} has expired")]
    Expired { code: String },

    #[error("Promo code {code} has reached its usage limit")]
    UsageLimitReached { code: String },

    #[error("Promo code {code} has already been used the maximum number of times by this user")]
    UserLimitReached { code: String },

    #[error("Minimum purchase of {minimum} required for promo code {code}")]
    MinPurchaseNotMet { code: String, minimum: Money },

    #[error("Promo code {code} cannot be used with this vendor")]
    VendorExcluded { code: String },

    #[error("Promo code {code} is not valid for this vendor")]
    VendorNotApplicable { code: String },

    #[error("Promo code {code} is not valid for this trip")]
    TripNotApplicable { code: String },

    #[error("Promo code {code} is not valid for this category")]
    CategoryNotApplicable { code: String },
}

impl PromoError {
    pub fn kind(&self) -> PromoErrorKind {
        match self {
            PromoError::NotFound { .. } => PromoErrorKind::NotFound,
            PromoError::Inactive { .. } => PromoErrorKind::Inactive,
            PromoError::NotYetValid { .. } => PromoErrorKind::NotYetValid,
            PromoError::Expired { .. } => PromoErrorKind::Expired,
            PromoError::UsageLimitReached { .. } => PromoErrorKind::UsageLimitReached,
            PromoError::UserLimitReached { .. } => PromoErrorKind::UserLimitReached,
            PromoError::MinPurchaseNotMet { .. } => PromoErrorKind::MinPurchaseNotMet,
            PromoError::VendorExcluded { .. } => PromoErrorKind::VendorExcluded,
            PromoError::VendorNotApplicable { .. } => PromoErrorKind::VendorNotApplicable,
            PromoError::TripNotApplicable { .. } => PromoErrorKind::TripNotApplicable,
            PromoError::CategoryNotApplicable { .. } => PromoErrorKind::CategoryNotApplicable,
        }
    }
}

// =============================================================================
// Validation Error
// =============================================================================

/// Input validation errors.
///
/// Raised before any business rule runs.
#[derive(Debug, Error)]
pub enum ValidationError {
    #[error("{field} is required")]
    Required { field: String },

    #[error("{field} must be at least {min} characters")]
    TooShort { field: String, min: usize },

    #[error("{field} must be at most {max} characters")]
    TooLong { field: String, max: usize },

    #[error("{field} must be between {min} and {max}")]
    OutOfRange { field: String, min: i64, max: i64 },

    #[error("{field} must be positive")]
    MustBePositive { field: String },

    #[error("{field} must not be negative")]
    MustNotBeNegative { field: String },

    /// Invalid format (e.g., invalid UUID, invalid code characters).
    #[error("{field} has invalid format: {reason}")]
    InvalidFormat { field: String, reason: String },

    #[error("{field} must be one of: {allowed:?}")]
    NotAllowed { field: String, allowed: Vec<String> },
}

// =============================================================================
// Result Type Alias
// =============================================================================

/// Convenience type alias for Results with CoreError.
pub type CoreResult<T> = Result<T, CoreError>;

// =============================================================================
// Unit Tests
// =============================================================================

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_promo_error_messages() {
        let err = PromoError::MinPurchaseNotMet {
            code: "SUMMER20".to_string(),
            minimum: Money::from_cents(50_000),
        };
        assert_eq!(
            err.to_string(),
            "Minimum purchase of $500.00 required for promo code SUMMER20"
        );
        assert_eq!(err.kind(), PromoErrorKind::MinPurchaseNotMet);
        assert_eq!(err.kind().as_str(), "MIN_PURCHASE_NOT_MET");
    }

    #[test]
    fn test_promo_kind_serializes_as_code() {
        let json = serde_json::to_string(&PromoErrorKind::VendorNotApplicable).unwrap();
        assert_eq!(json, "\"VENDOR_NOT_APPLICABLE\"");
        let json = serde_json::to_string(&PromoErrorKind::NotYetValid).unwrap();
        assert_eq!(json, format!("\"{}\"", PromoErrorKind::NotYetValid.as_str()));
    }

    #[test]
    fn test_validation_error_messages() {
        let err = ValidationError::Required {
            field: "code".to_string(),
        };
        assert_eq!(err.to_string(), "code is required");

        let err = ValidationError::TooShort {
            field: "code".to_string(),
            min: 3,
        };
        assert_eq!(err.to_string(), "code must be at least 3 characters");
    }

    #[test]
    fn test_conversions_into_core_error() {
        let core_err: CoreError = ValidationError::Required {
            field: "amount".to_string(),
        }
        .into();
        assert!(matches!(core_err, CoreError::Validation(_)));

        let core_err: CoreError = PromoError::NotFound {
            code: "NOPE".to_string(),
        }
        .into();
        assert_eq!(core_err.to_string(), "Promo code not found: NOPE");
    }
}
