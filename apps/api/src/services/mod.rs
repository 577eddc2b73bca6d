//! Services between the HTTP handlers and the stores.

pub mod promo_service;

pub use promo_service::PromoService;
