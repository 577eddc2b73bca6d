//! # voyage-cache: Response Cache for Voyage
//!
//! ```text
//! ┌─────────────────────────────────────────────────────────────────────────┐
//! │  handler                                                                │
//! │     │  cache.get::<PromoCode>(&CacheKey::new(Promos, [("code", c)]))    │
//! │     ▼                                                                   │
//! │  CacheManager ── TtlTable (per resource)                                │
//! │     │        └── invalidation map (CacheResource → glob patterns)       │
//! │     ▼                                                                   │
//! │  Arc<dyn CacheStore>                                                    │
//! │     ├── RedisStore   GET / SET EX / DEL / SCAN MATCH                    │
//! │     └── MemoryStore  HashMap + expiry + glob matching                   │
//! └─────────────────────────────────────────────────────────────────────────┘
//! ```
//!
//! ## Modules
//!
//! - [`key`] - Key derivation with sorted params
//! - [`resource`] - Resource classes, TTLs, invalidation patterns
//! - [`store`] - The `CacheStore` trait
//! - [`redis_store`] - Redis implementation
//! - [`memory`] - In-memory implementation and glob matching
//! - [`manager`] - `CacheManager`

pub mod error;
pub mod key;
pub mod manager;
pub mod memory;
pub mod redis_store;
pub mod resource;
pub mod store;

pub use error::{CacheError, CacheResult};
pub use key::{generate_key, CacheKey};
pub use manager::CacheManager;
pub use memory::MemoryStore;
pub use redis_store::RedisStore;
pub use resource::{CacheResource, TtlTable, DEFAULT_TTL};
pub use store::CacheStore;
