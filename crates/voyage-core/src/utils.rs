//! Small helpers shared by the API and the frontend bindings: slugs, one-time
//! codes, pagination math and display formatting.

use chrono::{DateTime, Utc};
use rand::Rng;
use serde::{Deserialize, Serialize};
use ts_rs::TS;

use crate::money::Money;
use crate::MAX_PAGE_SIZE;

// =============================================================================
// Identifiers
// =============================================================================

/// Turns a title into a URL slug: lower-case ASCII letters and digits joined
/// by single hyphens.
///
/// ```rust
/// use voyage_core::utils::slugify;
///
/// assert_eq!(slugify("  Bali Surf & Yoga Retreat! "), "bali-surf-yoga-retreat");
/// ```
pub fn slugify(text: &str) -> String {
    let mut slug = String::with_capacity(text.len());
    let mut pending_dash = false;

    for c in text.chars() {
        if c.is_ascii_alphanumeric() {
            if pending_dash && !slug.is_empty() {
                slug.push('-');
            }
            pending_dash = false;
            slug.push(c.to_ascii_lowercase());
        } else if c.is_whitespace() || c == '-' || c == '_' {
            pending_dash = true;
        }
    }

    slug
}

/// Six-digit numeric one-time code.
pub fn generate_otp() -> String {
    let code: u32 = rand::thread_rng().gen_range(100_000..1_000_000);
    code.to_string()
}

/// 32 random bytes, hex encoded (64 characters).
pub fn generate_token() -> String {
    let bytes: [u8; 32] = rand::thread_rng().gen();
    hex::encode(bytes)
}

// =============================================================================
// Pagination
// =============================================================================

/// Offset pagination derived from a page number, a page size and a total.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize, TS)]
#[ts(export)]
#[serde(rename_all = "camelCase")]
pub struct Pagination {
    pub page: i64,
    pub limit: i64,
    pub total: i64,
    pub total_pages: i64,
    pub has_next: bool,
    pub has_prev: bool,
}

impl Pagination {
    /// `page` below 1 becomes 1; `limit` is clamped to `1..=MAX_PAGE_SIZE`.
    pub fn new(page: i64, limit: i64, total: i64) -> Self {
        let page = page.max(1);
        let limit = limit.clamp(1, MAX_PAGE_SIZE);
        let total = total.max(0);
        let total_pages = (total + limit - 1) / limit;

        Pagination {
            page,
            limit,
            total,
            total_pages,
            has_next: page < total_pages,
            has_prev: page > 1,
        }
    }

    /// Rows to skip before this page.
    pub fn skip(&self) -> i64 {
        (self.page - 1) * self.limit
    }
}

// =============================================================================
// Formatting
// =============================================================================

/// Formats an amount with its currency code and thousands separators.
///
/// ```rust
/// use voyage_core::money::Money;
/// use voyage_core::utils::format_currency;
///
/// assert_eq!(format_currency(Money::from_cents(123_456), "USD"), "USD 1,234.56");
/// ```
pub fn format_currency(amount: Money, currency: &str) -> String {
    let sign = if amount.is_negative() { "-" } else { "" };
    let abs = amount.abs();
    let major = abs.cents() / 100;
    let minor = abs.cents() % 100;

    let digits = major.to_string();
    let mut grouped = String::with_capacity(digits.len() + digits.len() / 3);
    for (i, c) in digits.chars().enumerate() {
        if i > 0 && (digits.len() - i) % 3 == 0 {
            grouped.push(',');
        }
        grouped.push(c);
    }

    format!("{} {}{}.{:02}", currency, sign, grouped, minor)
}

/// `Mar 05, 2026`
pub fn format_date(date: DateTime<Utc>) -> String {
    date.format("%b %d, %Y").to_string()
}

/// Whole days between two instants, ignoring direction.
pub fn days_between(a: DateTime<Utc>, b: DateTime<Utc>) -> i64 {
    (b - a).num_days().abs()
}

#[cfg(test)]
mod tests {
    use super::*;
    use chrono::{Duration, TimeZone};

    #[test]
    fn test_slugify() {
        assert_eq!(slugify("Hello World"), "hello-world");
        assert_eq!(slugify("--Patagonia   Trek--"), "patagonia-trek");
        assert_eq!(slugify("Kyoto's Temples (2026)"), "kyotos-temples-2026");
        assert_eq!(slugify("!!!"), "");
    }

    #[test]
    fn test_generate_otp() {
        for _ in 0..50 {
            let otp = generate_otp();
            assert_eq!(otp.len(), 6);
            assert!(otp.chars().all(|c| c.is_ascii_digit()));
        }
    }

    #[test]
    fn test_generate_token() {
        let a = generate_token();
        let b = generate_token();
        assert_eq!(a.len(), 64);
        assert!(a.chars().all(|c| c.is_ascii_hexdigit()));
        assert_ne!(a, b);
    }

    #[test]
    fn test_pagination() {
        let p = Pagination::new(2, 10, 35);
        assert_eq!(p.skip(), 10);
        assert_eq!(p.total_pages, 4);
        assert!(p.has_next);
        assert!(p.has_prev);

        let last = Pagination::new(4, 10, 35);
        assert!(!last.has_next);

        let clamped = Pagination::new(0, 1_000, 0);
        assert_eq!(clamped.page, 1);
        assert_eq!(clamped.limit, MAX_PAGE_SIZE);
        assert_eq!(clamped.total_pages, 0);
        assert!(!clamped.has_next);
        assert!(!clamped.has_prev);

        assert_eq!(Pagination::new(1, 0, 5).limit, 1);
    }

    #[test]
    fn test_format_currency() {
        assert_eq!(format_currency(Money::from_cents(5), "USD"), "USD 0.05");
        assert_eq!(format_currency(Money::from_cents(100_000), "EUR"), "EUR 1,000.00");
        assert_eq!(
            format_currency(Money::from_cents(123_456_789), "USD"),
            "USD 1,234,567.89"
        );
        assert_eq!(format_currency(Money::from_cents(-2_550), "USD"), "USD -25.50");
    }

    #[test]
    fn test_dates() {
        let d = Utc.with_ymd_and_hms(2026, 3, 5, 12, 0, 0).unwrap();
        assert_eq!(format_date(d), "Mar 05, 2026");
        assert_eq!(days_between(d, d + Duration::days(10)), 10);
        assert_eq!(days_between(d + Duration::days(10), d), 10);
        assert_eq!(days_between(d, d + Duration::hours(30)), 1);
    }
}
