//! # Validation Module
//!
//! Input validation utilities for Voyage.
//!
//! ## Validation Strategy
//! ```text
//! ┌─────────────────────────────────────────────────────────────────────────┐
//! │                      Validation Layers                                  │
//! │                                                                         │
//! │  Layer 1: Frontend (Next.js forms)                                     │
//! │  └── Immediate user feedback                                           │
//! │           │                                                             │
//! │           ▼                                                             │
//! │  Layer 2: HTTP handler (apps/api)                                      │
//! │  ├── Type validation (JSON deserialization)                            │
//! │  └── THIS MODULE: amounts, codes, counts, ids                          │
//! │           │                                                             │
//! │           ▼                                                             │
//! │  Layer 3: Database (SQLite)                                            │
//! │  ├── UNIQUE(code)                                                      │
//! │  └── CHECK constraints on discount type                                │
//! └─────────────────────────────────────────────────────────────────────────┘
//! ```

use crate::error::ValidationError;
use crate::money::Money;
use crate::{MAX_CODE_LENGTH, MAX_TRAVELERS, MIN_CODE_LENGTH};

/// Result type for validation operations.
pub type ValidationResult<T> = Result<T, ValidationError>;

// =============================================================================
// String Validators
// =============================================================================

/// Normalizes a promo code for lookup: trims whitespace and upper-cases.
///
/// ```rust
/// use voyage_core::validation::normalize_code;
///
/// assert_eq!(normalize_code("  summer20 "), "SUMMER20");
/// ```
pub fn normalize_code(code: &str) -> String {
    code.trim().to_uppercase()
}

/// Validates and normalizes a promo code.
///
/// ## Rules
/// - 3 to 32 characters after trimming
/// - Letters, digits, hyphens and underscores only
///
/// ## Example
/// ```rust
/// use voyage_core::validation::validate_promo_code;
///
/// assert_eq!(validate_promo_code(" summer20").unwrap(), "SUMMER20");
/// assert!(validate_promo_code("").is_err());
/// assert!(validate_promo_code("has space").is_err());
/// ```
pub fn validate_promo_code(code: &str) -> ValidationResult<String> {
    let code = normalize_code(code);

    if code.is_empty() {
        return Err(ValidationError::Required {
            field: "code".to_string(),
        });
    }

    if code.chars().count() < MIN_CODE_LENGTH {
        return Err(ValidationError::TooShort {
            field: "code".to_string(),
            min: MIN_CODE_LENGTH,
        });
    }

    if code.chars().count() > MAX_CODE_LENGTH {
        return Err(ValidationError::TooLong {
            field: "code".to_string(),
            max: MAX_CODE_LENGTH,
        });
    }

    if !code
        .chars()
        .all(|c| c.is_ascii_alphanumeric() || c == '-' || c == '_')
    {
        return Err(ValidationError::InvalidFormat {
            field: "code".to_string(),
            reason: "must contain only letters, numbers, hyphens, and underscores".to_string(),
        });
    }

    Ok(code)
}

/// Validates a required identifier (vendor, trip, user, booking).
pub fn validate_identifier(field: &str, value: &str) -> ValidationResult<()> {
    let value = value.trim();

    if value.is_empty() {
        return Err(ValidationError::Required {
            field: field.to_string(),
        });
    }

    if value.len() > 64 {
        return Err(ValidationError::TooLong {
            field: field.to_string(),
            max: 64,
        });
    }

    Ok(())
}

// =============================================================================
// Numeric Validators
// =============================================================================

/// Validates a monetary amount: zero is allowed, negatives are not.
///
/// ```rust
/// use voyage_core::money::Money;
/// use voyage_core::validation::validate_amount;
///
/// assert!(validate_amount("amount", Money::from_cents(0)).is_ok());
/// assert!(validate_amount("amount", Money::from_cents(-1)).is_err());
/// ```
pub fn validate_amount(field: &str, amount: Money) -> ValidationResult<()> {
    if amount.is_negative() {
        return Err(ValidationError::MustNotBeNegative {
            field: field.to_string(),
        });
    }

    Ok(())
}

/// Validates a traveler count (1..=MAX_TRAVELERS).
pub fn validate_travelers(count: i64) -> ValidationResult<()> {
    if count <= 0 {
        return Err(ValidationError::MustBePositive {
            field: "travelers".to_string(),
        });
    }

    if count > MAX_TRAVELERS {
        return Err(ValidationError::OutOfRange {
            field: "travelers".to_string(),
            min: 1,
            max: MAX_TRAVELERS,
        });
    }

    Ok(())
}

/// Validates a rate in basis points (0% to 100%).
pub fn validate_rate_bps(field: &str, bps: i64) -> ValidationResult<()> {
    if !(0..=10_000).contains(&bps) {
        return Err(ValidationError::OutOfRange {
            field: field.to_string(),
            min: 0,
            max: 10_000,
        });
    }

    Ok(())
}

// =============================================================================
// UUID Validators
// =============================================================================

/// Validates a UUID string.
///
/// ```rust
/// use voyage_core::validation::validate_uuid;
///
/// assert!(validate_uuid("550e8400-e29b-41d4-a716-446655440000").is_ok());
/// assert!(validate_uuid("not-a-uuid").is_err());
/// ```
pub fn validate_uuid(id: &str) -> ValidationResult<()> {
    if id.trim().is_empty() {
        return Err(ValidationError::Required {
            field: "id".to_string(),
        });
    }

    uuid::Uuid::parse_str(id).map_err(|_| ValidationError::InvalidFormat {
        field: "id".to_string(),
        reason: "must be a valid UUID".to_string(),
    })?;

    Ok(())
}

// =============================================================================
// Unit Tests
// =============================================================================

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_validate_promo_code() {
        assert_eq!(validate_promo_code("SUMMER20").unwrap(), "SUMMER20");
        assert_eq!(validate_promo_code("early_bird-5").unwrap(), "EARLY_BIRD-5");

        assert!(validate_promo_code("").is_err());
        assert!(validate_promo_code("   ").is_err());
        assert!(validate_promo_code("AB").is_err());
        assert!(validate_promo_code("has space").is_err());
        assert!(validate_promo_code("ÉTÉ2024").is_err());
        assert!(validate_promo_code(&"A".repeat(33)).is_err());
    }

    #[test]
    fn test_validate_identifier() {
        assert!(validate_identifier("vendorId", "vendor-1").is_ok());
        assert!(validate_identifier("vendorId", " ").is_err());
        assert!(validate_identifier("vendorId", &"v".repeat(65)).is_err());
    }

    #[test]
    fn test_validate_travelers() {
        assert!(validate_travelers(1).is_ok());
        assert!(validate_travelers(MAX_TRAVELERS).is_ok());
        assert!(validate_travelers(0).is_err());
        assert!(validate_travelers(-2).is_err());
        assert!(validate_travelers(MAX_TRAVELERS + 1).is_err());
    }

    #[test]
    fn test_validate_rate_bps() {
        assert!(validate_rate_bps("rate", 0).is_ok());
        assert!(validate_rate_bps("rate", 1500).is_ok());
        assert!(validate_rate_bps("rate", 10_000).is_ok());
        assert!(validate_rate_bps("rate", 10_001).is_err());
        assert!(validate_rate_bps("rate", -1).is_err());
    }

    #[test]
    fn test_validate_uuid() {
        assert!(validate_uuid("550e8400-e29b-41d4-a716-446655440000").is_ok());
        assert!(validate_uuid("").is_err());
        assert!(validate_uuid("123").is_err());
    }
}
