//! # Cache Keys
//!
//! ```text
//! CacheKey::new(Trips, [("page", 2), ("destination", "bali")])
//!     → "trips:destination:bali:page:2"
//!
//! CacheKey::nested(Users, "42", Bookings, [("status", "confirmed")])
//!     → "users:42:bookings:status:confirmed"
//! ```
//!
//! Params are sorted by name, so the same params always give the same key
//! whatever order they were supplied in.

use std::collections::BTreeMap;
use std::fmt;

use crate::resource::CacheResource;

/// Derives a key from a resource name and params.
///
/// ```rust
/// use voyage_cache::generate_key;
///
/// assert_eq!(generate_key("trips", [("b", "2"), ("a", "1")]), "trips:a:1:b:2");
/// assert_eq!(generate_key("trips", Vec::<(&str, &str)>::new()), "trips");
/// ```
pub fn generate_key<I, K, V>(resource: &str, params: I) -> String
where
    I: IntoIterator<Item = (K, V)>,
    K: Into<String>,
    V: ToString,
{
    let sorted: BTreeMap<String, String> = params
        .into_iter()
        .map(|(k, v)| (k.into(), v.to_string()))
        .collect();

    let mut key = resource.to_string();
    for (name, value) in &sorted {
        key.push(':');
        key.push_str(name);
        key.push(':');
        key.push_str(value);
    }
    key
}

/// A derived cache key and the resource whose TTL applies to it.
#[derive(Debug, Clone, PartialEq, Eq, Hash)]
pub struct CacheKey {
    resource: CacheResource,
    key: String,
}

impl CacheKey {
    pub fn new<I, K, V>(resource: CacheResource, params: I) -> Self
    where
        I: IntoIterator<Item = (K, V)>,
        K: Into<String>,
        V: ToString,
    {
        CacheKey {
            resource,
            key: generate_key(resource.as_str(), params),
        }
    }

    /// A key with no params, e.g. `promos`.
    pub fn bare(resource: CacheResource) -> Self {
        CacheKey {
            resource,
            key: resource.as_str().to_string(),
        }
    }

    /// A child collection under a parent record: `parent:id:child[:params]`.
    /// The child's TTL applies.
    pub fn nested<I, K, V>(
        parent: CacheResource,
        parent_id: impl fmt::Display,
        child: CacheResource,
        params: I,
    ) -> Self
    where
        I: IntoIterator<Item = (K, V)>,
        K: Into<String>,
        V: ToString,
    {
        let prefix = format!("{}:{}:{}", parent, parent_id, child);
        CacheKey {
            resource: child,
            key: generate_key(&prefix, params),
        }
    }

    pub fn resource(&self) -> CacheResource {
        self.resource
    }

    pub fn as_str(&self) -> &str {
        &self.key
    }
}

impl fmt::Display for CacheKey {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(&self.key)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::memory::glob_match;

    #[test]
    fn test_param_order_does_not_matter() {
        let a = CacheKey::new(CacheResource::Trips, [("b", "2"), ("a", "1")]);
        let b = CacheKey::new(CacheResource::Trips, [("a", "1"), ("b", "2")]);
        assert_eq!(a, b);
        assert_eq!(a.as_str(), "trips:a:1:b:2");
    }

    #[test]
    fn test_mixed_value_types() {
        let key = CacheKey::new(
            CacheResource::Trips,
            vec![("page", 2.to_string()), ("destination", "bali".to_string())],
        );
        assert_eq!(key.to_string(), "trips:destination:bali:page:2");
    }

    #[test]
    fn test_bare_key() {
        assert_eq!(CacheKey::bare(CacheResource::Promos).as_str(), "promos");
        assert_eq!(
            CacheKey::new(CacheResource::Promos, Vec::<(String, String)>::new()),
            CacheKey::bare(CacheResource::Promos)
        );
    }

    #[test]
    fn test_nested_key_matches_invalidation_pattern() {
        let key = CacheKey::nested(
            CacheResource::Users,
            42,
            CacheResource::Bookings,
            Vec::<(&str, &str)>::new(),
        );
        assert_eq!(key.as_str(), "users:42:bookings");
        assert_eq!(key.resource(), CacheResource::Bookings);
        assert!(CacheResource::Bookings
            .invalidation_patterns()
            .iter()
            .any(|p| glob_match(p, key.as_str())));

        let filtered = CacheKey::nested(
            CacheResource::Vendors,
            "v-7",
            CacheResource::Trips,
            [("page", "1")],
        );
        assert_eq!(filtered.as_str(), "vendors:v-7:trips:page:1");
    }
}
