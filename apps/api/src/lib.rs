//! # Voyage API
//!
//! HTTP server for booking prices, promo codes, payouts and refunds.
//!
//! ## Architecture
//! ```text
//! ┌─────────────────────────────────────────────────────────────────────────┐
//! │                          Voyage API                                     │
//! │                                                                         │
//! │  ┌────────────────┐  ┌────────────────┐  ┌────────────────────────────┐│
//! │  │  /promo-codes  │  │  quotes        │  │  /health                   ││
//! │  │                │  │                │  │                            ││
//! │  │ • validate     │  │ • payouts      │  │ • database                 ││
//! │  │ • create / get │  │ • refunds      │  │ • cache                    ││
//! │  │ • list         │  │ • bookings     │  │                            ││
//! │  │ • redeem       │  │                │  │                            ││
//! │  └───────┬────────┘  └────────────────┘  └────────────────────────────┘│
//! │          │                                                              │
//! │  ┌───────▼──────────────────────────────────────────────────────────┐  │
//! │  │                      Infrastructure                               │  │
//! │  │  ┌──────────────┐  ┌──────────────────────────────────────────┐  │  │
//! │  │  │  SQLite      │  │  CacheManager (Redis, or in-process)      │  │  │
//! │  │  └──────────────┘  └──────────────────────────────────────────┘  │  │
//! │  └──────────────────────────────────────────────────────────────────┘  │
//! └─────────────────────────────────────────────────────────────────────────┘
//! ```
//!
//! ## Configuration
//! See [`config`] for the environment variables.

pub mod config;
pub mod error;
pub mod routes;
pub mod services;
pub mod state;

// Re-exports
pub use config::{ApiConfig, ConfigError};
pub use error::{ApiError, ApiResult};
pub use routes::router;
pub use state::AppState;
