//! Promo code service.
//!
//! ## Read / Write Paths
//! ```text
//! ┌─────────────────────────────────────────────────────────────────────────┐
//! │  read:   cache (promos:code:<CODE>) ──miss──► PromoRepository ──► set   │
//! │                                                                         │
//! │  write:  PromoRepository ──ok──► invalidate_related(Promos)             │
//! │                                  purges "promos" and "promos:*"         │
//! └─────────────────────────────────────────────────────────────────────────┘
//! ```
//!
//! Cache failures never reach the caller: reads fall through to the
//! database and writes only log.

use chrono::{DateTime, Utc};
use tracing::{debug, info};

use voyage_cache::{CacheKey, CacheManager, CacheResource};
use voyage_core::promo;
use voyage_core::types::{PromoCode, PromoQuote, PromoRequest};
use voyage_core::validation::{normalize_code, validate_identifier, validate_promo_code};
use voyage_db::{PromoPage, PromoRepository};

use crate::error::{ApiError, ApiResult};

#[derive(Clone)]
pub struct PromoService {
    repo: PromoRepository,
    cache: CacheManager,
}

impl PromoService {
    pub fn new(repo: PromoRepository, cache: CacheManager) -> Self {
        PromoService { repo, cache }
    }

    fn code_key(code: &str) -> CacheKey {
        CacheKey::new(CacheResource::Promos, [("code", code)])
    }

    /// Finds a promo by code, through the cache.
    pub async fn lookup(&self, code: &str) -> ApiResult<Option<PromoCode>> {
        let code = normalize_code(code);
        if code.is_empty() {
            return Ok(None);
        }

        let key = Self::code_key(&code);
        if let Some(promo) = self.cache.get::<PromoCode>(&key).await {
            debug!(code = %code, "Promo cache hit");
            return Ok(Some(promo));
        }

        let promo = self.repo.find_by_code(&code).await?;
        if let Some(promo) = &promo {
            self.cache.set(&key, promo).await;
        }
        Ok(promo)
    }

    pub async fn get(&self, code: &str) -> ApiResult<PromoCode> {
        self.lookup(code)
            .await?
            .ok_or_else(|| ApiError::not_found("Promo code", &normalize_code(code)))
    }

    /// Checks `request` against the stored promo and quotes the discount.
    pub async fn validate(&self, request: &PromoRequest, now: DateTime<Utc>) -> ApiResult<PromoQuote> {
        let promo = self.lookup(&request.code).await?;
        let quote = promo::validate(promo.as_ref(), request, now)?;

        debug!(
            code = %quote.code,
            amount = request.amount.cents(),
            discount = quote.discount.cents(),
            "Promo code validated"
        );
        Ok(quote)
    }

    /// Stores a new promo. The code is normalized before insert.
    pub async fn create(&self, mut promo: PromoCode) -> ApiResult<PromoCode> {
        promo.code = validate_promo_code(&promo.code)?;
        self.repo.insert(&promo).await?;

        info!(code = %promo.code, "Promo code created");
        self.cache.invalidate_related(CacheResource::Promos).await;
        Ok(promo)
    }

    /// Records one use of `code` on `booking_id` by `user_id`.
    pub async fn redeem(
        &self,
        code: &str,
        user_id: &str,
        booking_id: &str,
        now: DateTime<Utc>,
    ) -> ApiResult<PromoCode> {
        validate_identifier("userId", user_id)?;
        validate_identifier("bookingId", booking_id)?;

        let promo = self.repo.redeem(code, user_id, booking_id, now).await?;
        self.cache.invalidate_related(CacheResource::Promos).await;
        Ok(promo)
    }

    /// One page of promos ordered by code, through the cache.
    pub async fn list(&self, after: Option<&str>, limit: i64) -> ApiResult<PromoPage> {
        let mut params = vec![("limit", limit.to_string())];
        if let Some(after) = after {
            params.push(("after", normalize_code(after)));
        }
        let key = CacheKey::new(CacheResource::Promos, params);

        if let Some(page) = self.cache.get::<PromoPage>(&key).await {
            return Ok(page);
        }

        let page = self.repo.list_page(after, limit).await?;
        self.cache.set(&key, &page).await;
        Ok(page)
    }

    pub async fn set_active(&self, code: &str, active: bool) -> ApiResult<PromoCode> {
        self.repo.set_active(code, active).await?;
        self.cache.invalidate_related(CacheResource::Promos).await;
        self.get(code).await
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use chrono::Duration;
    use voyage_core::money::Money;
    use voyage_core::types::DiscountType;
    use voyage_db::repository::promo::generate_promo_id;

    use crate::state::test_support::test_state;

    fn summer20(now: DateTime<Utc>) -> PromoCode {
        PromoCode {
            id: generate_promo_id(),
            code: "summer20".to_string(),
            description: Some("20% off up to $150".to_string()),
            discount_type: DiscountType::Percentage,
            discount_value: 2000,
            max_discount: Some(Money::from_cents(15_000)),
            min_purchase_amount: Money::zero(),
            usage_limit: Some(2),
            usage_per_user: None,
            used_count: 0,
            valid_from: now - Duration::days(1),
            valid_until: now + Duration::days(30),
            applicable_trips: vec![],
            applicable_vendors: vec![],
            applicable_categories: vec![],
            excluded_vendors: vec![],
            is_active: true,
            created_at: now,
            updated_at: now,
        }
    }

    #[tokio::test]
    async fn test_create_normalizes_and_caches_lookups() {
        let state = test_state().await;
        let service = state.promos();
        let now = Utc::now();

        let created = service.create(summer20(now)).await.unwrap();
        assert_eq!(created.code, "SUMMER20");

        service.get("summer20").await.unwrap();
        let cached: Option<PromoCode> = state
            .cache
            .get(&CacheKey::new(CacheResource::Promos, [("code", "SUMMER20")]))
            .await;
        assert_eq!(cached.map(|p| p.id), Some(created.id));
    }

    #[tokio::test]
    async fn test_validate_quotes_discount() {
        let state = test_state().await;
        let service = state.promos();
        let now = Utc::now();
        service.create(summer20(now)).await.unwrap();

        let quote = service
            .validate(&PromoRequest::new("SUMMER20", Money::from_cents(100_000)), now)
            .await
            .unwrap();
        assert_eq!(quote.discount, Money::from_cents(15_000));
        assert_eq!(quote.final_amount, Money::from_cents(85_000));

        let err = service
            .validate(&PromoRequest::new("", Money::from_cents(100)), now)
            .await
            .unwrap_err();
        assert_eq!(err.code, "NOT_FOUND");
    }

    #[tokio::test]
    async fn test_redeem_invalidates_cached_record() {
        let state = test_state().await;
        let service = state.promos();
        let now = Utc::now();
        service.create(summer20(now)).await.unwrap();

        assert_eq!(service.get("SUMMER20").await.unwrap().used_count, 0);
        service.redeem("SUMMER20", "user-1", "booking-1", now).await.unwrap();
        assert_eq!(service.get("SUMMER20").await.unwrap().used_count, 1);

        service.redeem("SUMMER20", "user-2", "booking-2", now).await.unwrap();
        let err = service
            .redeem("SUMMER20", "user-3", "booking-3", now)
            .await
            .unwrap_err();
        assert_eq!(err.code, "USAGE_LIMIT_REACHED");
    }

    #[tokio::test]
    async fn test_set_active_is_visible_immediately() {
        let state = test_state().await;
        let service = state.promos();
        let now = Utc::now();
        service.create(summer20(now)).await.unwrap();
        service.get("SUMMER20").await.unwrap();

        let updated = service.set_active("SUMMER20", false).await.unwrap();
        assert!(!updated.is_active);

        let err = service
            .validate(&PromoRequest::new("SUMMER20", Money::from_cents(10_000)), Utc::now())
            .await
            .unwrap_err();
        assert_eq!(err.code, "INACTIVE");
    }

    #[tokio::test]
    async fn test_list_pages() {
        let state = test_state().await;
        let service = state.promos();
        let now = Utc::now();
        for code in ["AAA", "BBB", "CCC"] {
            let mut promo = summer20(now);
            promo.id = generate_promo_id();
            promo.code = code.to_string();
            service.create(promo).await.unwrap();
        }

        let first = service.list(None, 2).await.unwrap();
        assert_eq!(first.items.len(), 2);
        assert_eq!(first.next_cursor.as_deref(), Some("BBB"));

        let second = service.list(first.next_cursor.as_deref(), 2).await.unwrap();
        assert_eq!(second.items.len(), 1);
        assert!(second.next_cursor.is_none());
    }
}
