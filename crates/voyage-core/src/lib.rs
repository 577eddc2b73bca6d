//! # voyage-core: Pure Business Logic for the Voyage Marketplace
//!
//! Promo eligibility, booking prices, vendor payouts and refund tiers as pure
//! functions with zero I/O dependencies.
//!
//! ## Architecture Position
//! ```text
//! ┌─────────────────────────────────────────────────────────────────────────┐
//! │                        Voyage Architecture                              │
//! │                                                                         │
//! │  ┌─────────────────────────────────────────────────────────────────┐   │
//! │  │                    Frontend (Next.js)                           │   │
//! │  │    Trip page ──► Checkout ──► Promo field ──► Cancellation     │   │
//! │  └─────────────────────────────┬───────────────────────────────────┘   │
//! │                                │ HTTP / JSON                            │
//! │  ┌─────────────────────────────▼───────────────────────────────────┐   │
//! │  │                 apps/api (axum handlers)                        │   │
//! │  │    /promo-codes, /payouts, /refunds, /bookings/price           │   │
//! │  └──────────┬──────────────────┬──────────────────┬────────────────┘   │
//! │             │                  │                  │                     │
//! │  ┌──────────▼────────┐  ┌──────▼───────┐  ┌───────▼──────────────┐     │
//! │  │ ★ voyage-core ★   │  │  voyage-db   │  │    voyage-cache      │     │
//! │  │                   │  │  SQLite      │  │  Redis / in-memory   │     │
//! │  │  promo   payout   │  │  promo repo  │  │  keys, TTLs,         │     │
//! │  │  refund  pricing  │  └──────────────┘  │  invalidation        │     │
//! │  │  money   utils    │                    └──────────────────────┘     │
//! │  │                   │                                                  │
//! │  │  NO I/O • NO DATABASE • NO NETWORK                                  │
//! │  └───────────────────┘                                                  │
//! └─────────────────────────────────────────────────────────────────────────┘
//! ```
//!
//! ## Modules
//!
//! - [`types`] - Domain types (PromoCode, PricingBreakdown, VendorPayout, ...)
//! - [`money`] - Money type with integer arithmetic
//! - [`error`] - Domain error types
//! - [`validation`] - Input validation
//! - [`promo`] - Promo code eligibility and discount
//! - [`payout`] - Commission / holdback split
//! - [`refund`] - Cancellation tiers
//! - [`pricing`] - Booking price breakdown
//! - [`utils`] - Slugs, OTPs, pagination, formatting
//!
//! ## Example Usage
//!
//! ```rust
//! use voyage_core::money::Money;
//! use voyage_core::types::Percentage;
//!
//! let price = Money::from_cents(100_000); // $1000.00
//! let commission = price.percent_of(Percentage::from_bps(1500)); // 15%
//!
//! assert_eq!(commission.cents(), 15_000);
//! ```

// =============================================================================
// Module Declarations
// =============================================================================

pub mod error;
pub mod money;
pub mod payout;
pub mod pricing;
pub mod promo;
pub mod refund;
pub mod types;
pub mod utils;
pub mod validation;

// =============================================================================
// Re-exports for Convenience
// =============================================================================

pub use error::{CoreError, CoreResult, PromoError, PromoErrorKind, ValidationError};
pub use money::Money;
pub use refund::RefundPolicy;
pub use types::*;

// =============================================================================
// Crate-Level Constants
// =============================================================================

/// Shortest accepted promo code.
pub const MIN_CODE_LENGTH: usize = 3;

/// Longest accepted promo code.
pub const MAX_CODE_LENGTH: usize = 32;

/// Travelers allowed on a single booking.
pub const MAX_TRAVELERS: i64 = 50;

/// Upper bound on page size for list endpoints.
pub const MAX_PAGE_SIZE: i64 = 100;
