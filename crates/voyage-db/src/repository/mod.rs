//! # Repository Module
//!
//! ```text
//! handler / service
//!      │  db.promos().find_by_code("SUMMER20")
//!      ▼
//! PromoRepository
//! ├── find_by_code / find_by_id
//! ├── insert / insert_many
//! ├── list_page
//! ├── set_active
//! └── redeem / user_redemptions / redemptions
//!      │  SQL
//!      ▼
//! SQLite
//! ```

pub mod promo;
