//! # Cached Resources
//!
//! Every cached value belongs to a resource class. The class decides the TTL
//! and which key patterns are purged when that resource changes.
//!
//! ```text
//! ┌────────────┬────────┬─────────────────────────────────────────────────────┐
//! │ resource   │ TTL    │ purged on change                                    │
//! ├────────────┼────────┼─────────────────────────────────────────────────────┤
//! │ trips      │ 30m    │ trips, trips:*, vendors:*:trips, analytics:trips:*  │
//! │ bookings   │ 15m    │ bookings, bookings:*, users:*:bookings,             │
//! │            │        │ analytics:bookings:*                                │
//! │ users      │ 1h     │ users, users:*, analytics:users:*                   │
//! │ promos     │ 1h     │ promos, promos:*                                    │
//! │ vendors    │ 10m    │ vendors, vendors:*, trips:*                         │
//! │ reviews    │ 10m    │ reviews, reviews:*, trips:*                         │
//! │ analytics  │ 5m     │ analytics, analytics:*                              │
//! └────────────┴────────┴─────────────────────────────────────────────────────┘
//! ```

use std::collections::HashMap;
use std::fmt;
use std::str::FromStr;
use std::time::Duration;

use serde::{Deserialize, Serialize};

/// TTL for resources without their own entry.
pub const DEFAULT_TTL: Duration = Duration::from_secs(10 * 60);

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum CacheResource {
    Trips,
    Bookings,
    Users,
    Promos,
    Vendors,
    Reviews,
    Analytics,
}

impl CacheResource {
    pub const ALL: [CacheResource; 7] = [
        CacheResource::Trips,
        CacheResource::Bookings,
        CacheResource::Users,
        CacheResource::Promos,
        CacheResource::Vendors,
        CacheResource::Reviews,
        CacheResource::Analytics,
    ];

    /// Key prefix, also the name used in configuration.
    pub fn as_str(&self) -> &'static str {
        match self {
            CacheResource::Trips => "trips",
            CacheResource::Bookings => "bookings",
            CacheResource::Users => "users",
            CacheResource::Promos => "promos",
            CacheResource::Vendors => "vendors",
            CacheResource::Reviews => "reviews",
            CacheResource::Analytics => "analytics",
        }
    }

    pub fn default_ttl(&self) -> Duration {
        match self {
            CacheResource::Trips => Duration::from_secs(30 * 60),
            CacheResource::Bookings => Duration::from_secs(15 * 60),
            CacheResource::Users => Duration::from_secs(60 * 60),
            CacheResource::Promos => Duration::from_secs(60 * 60),
            CacheResource::Analytics => Duration::from_secs(5 * 60),
            CacheResource::Vendors | CacheResource::Reviews => DEFAULT_TTL,
        }
    }

    /// Glob patterns to purge after this resource is written.
    pub fn invalidation_patterns(&self) -> &'static [&'static str] {
        match self {
            CacheResource::Trips => &["trips", "trips:*", "vendors:*:trips", "analytics:trips:*"],
            CacheResource::Bookings => &[
                "bookings",
                "bookings:*",
                "users:*:bookings",
                "analytics:bookings:*",
            ],
            CacheResource::Users => &["users", "users:*", "analytics:users:*"],
            CacheResource::Promos => &["promos", "promos:*"],
            CacheResource::Vendors => &["vendors", "vendors:*", "trips:*"],
            CacheResource::Reviews => &["reviews", "reviews:*", "trips:*"],
            CacheResource::Analytics => &["analytics", "analytics:*"],
        }
    }
}

impl fmt::Display for CacheResource {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct UnknownResource(pub String);

impl fmt::Display for UnknownResource {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "unknown cache resource: {}", self.0)
    }
}

impl std::error::Error for UnknownResource {}

impl FromStr for CacheResource {
    type Err = UnknownResource;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        CacheResource::ALL
            .into_iter()
            .find(|r| r.as_str().eq_ignore_ascii_case(s.trim()))
            .ok_or_else(|| UnknownResource(s.to_string()))
    }
}

// =============================================================================
// TTL Table
// =============================================================================

/// Per-resource TTLs: the defaults above plus configured overrides.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct TtlTable {
    overrides: HashMap<CacheResource, Duration>,
}

impl TtlTable {
    pub fn new() -> Self {
        Self::default()
    }

    /// Replaces the TTL of `resource`.
    pub fn with_override(mut self, resource: CacheResource, ttl: Duration) -> Self {
        self.overrides.insert(resource, ttl);
        self
    }

    pub fn ttl(&self, resource: CacheResource) -> Duration {
        self.overrides
            .get(&resource)
            .copied()
            .unwrap_or_else(|| resource.default_ttl())
    }
}
