//! # Promo Repository
//!
//! Database operations for promo codes and their redemptions.
//!
//! ## Redemption
//! ```text
//! ┌─────────────────────────────────────────────────────────────────────────┐
//! │  redeem(code, user, booking)            one transaction                 │
//! │                                                                         │
//! │  1. UPDATE used_count = used_count + 1                                  │
//! │       WHERE code = ? AND (usage_limit IS NULL                           │
//! │                           OR used_count < usage_limit)                  │
//! │  2. SELECT promo_codes WHERE code = ?         → NOT_FOUND               │
//! │  3. check_usable (active, window, usage)      → INACTIVE / EXPIRED ...  │
//! │     step 1 matched 0 rows                     → USAGE_LIMIT_REACHED     │
//! │  4. COUNT promo_redemptions for user          → USER_LIMIT_REACHED      │
//! │  5. INSERT promo_redemptions                  → duplicate booking       │
//! │  6. COMMIT                  (any rejection rolls back step 1)           │
//! └─────────────────────────────────────────────────────────────────────────┘
//! ```
//!
//! The conditional UPDATE is the first statement, so SQLite takes the write
//! lock before any read. Concurrent redemptions queue on `busy_timeout` and
//! each sees the count left by the previous commit; two of them can never
//! both take the last slot.

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use sqlx::{FromRow, SqlitePool};
use tracing::{debug, info, warn};
use uuid::Uuid;

use crate::error::{DbError, DbResult};
use voyage_core::promo::check_usable;
use voyage_core::validation::normalize_code;
use voyage_core::{DiscountType, Money, PromoCode, PromoError};

/// Rows per transaction in [`PromoRepository::insert_many`].
pub const INSERT_CHUNK_SIZE: usize = 100;

const PROMO_COLUMNS: &str = r#"
    id, code, description, discount_type, discount_value,
    max_discount_cents, min_purchase_cents, usage_limit, usage_per_user, used_count,
    valid_from, valid_until,
    applicable_trips, applicable_vendors, applicable_categories, excluded_vendors,
    is_active, created_at, updated_at
"#;

// =============================================================================
// Row Mapping
// =============================================================================

#[derive(Debug, FromRow)]
struct PromoRow {
    id: String,
    code: String,
    description: Option<String>,
    discount_type: DiscountType,
    discount_value: i64,
    max_discount_cents: Option<i64>,
    min_purchase_cents: i64,
    usage_limit: Option<i64>,
    usage_per_user: Option<i64>,
    used_count: i64,
    valid_from: DateTime<Utc>,
    valid_until: DateTime<Utc>,
    applicable_trips: String,
    applicable_vendors: String,
    applicable_categories: String,
    excluded_vendors: String,
    is_active: bool,
    created_at: DateTime<Utc>,
    updated_at: DateTime<Utc>,
}

impl TryFrom<PromoRow> for PromoCode {
    type Error = DbError;

    fn try_from(row: PromoRow) -> DbResult<Self> {
        Ok(PromoCode {
            id: row.id,
            code: row.code,
            description: row.description,
            discount_type: row.discount_type,
            discount_value: row.discount_value,
            max_discount: row.max_discount_cents.map(Money::from_cents),
            min_purchase_amount: Money::from_cents(row.min_purchase_cents),
            usage_limit: row.usage_limit,
            usage_per_user: row.usage_per_user,
            used_count: row.used_count,
            valid_from: row.valid_from,
            valid_until: row.valid_until,
            applicable_trips: serde_json::from_str(&row.applicable_trips)?,
            applicable_vendors: serde_json::from_str(&row.applicable_vendors)?,
            applicable_categories: serde_json::from_str(&row.applicable_categories)?,
            excluded_vendors: serde_json::from_str(&row.excluded_vendors)?,
            is_active: row.is_active,
            created_at: row.created_at,
            updated_at: row.updated_at,
        })
    }
}

/// One page of promo codes ordered by code.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct PromoPage {
    pub items: Vec<PromoCode>,
    /// Pass as `after` to fetch the next page. `None` on the last page.
    pub next_cursor: Option<String>,
}

/// A recorded use of a promo code on a booking.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize, FromRow)]
#[serde(rename_all = "camelCase")]
pub struct Redemption {
    pub id: String,
    pub promo_code_id: String,
    pub user_id: String,
    pub booking_id: String,
    pub redeemed_at: DateTime<Utc>,
}

// =============================================================================
// Repository
// =============================================================================

/// Repository for promo code database operations.
#[derive(Debug, Clone)]
pub struct PromoRepository {
    pool: SqlitePool,
}

impl PromoRepository {
    pub fn new(pool: SqlitePool) -> Self {
        PromoRepository { pool }
    }

    /// Looks up a promo by code. The code is normalized first, so
    /// `" summer20"` finds `SUMMER20`.
    pub async fn find_by_code(&self, code: &str) -> DbResult<Option<PromoCode>> {
        let code = normalize_code(code);

        let row: Option<PromoRow> = sqlx::query_as(&format!(
            "SELECT {} FROM promo_codes WHERE code = ?1",
            PROMO_COLUMNS
        ))
        .bind(&code)
        .fetch_optional(&self.pool)
        .await?;

        row.map(PromoCode::try_from).transpose()
    }

    pub async fn find_by_id(&self, id: &str) -> DbResult<Option<PromoCode>> {
        let row: Option<PromoRow> = sqlx::query_as(&format!(
            "SELECT {} FROM promo_codes WHERE id = ?1",
            PROMO_COLUMNS
        ))
        .bind(id)
        .fetch_optional(&self.pool)
        .await?;

        row.map(PromoCode::try_from).transpose()
    }

    /// Inserts a promo code.
    ///
    /// ## Errors
    /// `DbError::UniqueViolation` when the code already exists.
    pub async fn insert(&self, promo: &PromoCode) -> DbResult<()> {
        debug!(code = %promo.code, "Inserting promo code");

        insert_promo(&self.pool, promo).await.map_err(|e| match e {
            DbError::UniqueViolation { field, .. } => DbError::UniqueViolation {
                field,
                value: promo.code.clone(),
            },
            other => other,
        })
    }

    /// Inserts promo codes in chunks of [`INSERT_CHUNK_SIZE`], one
    /// transaction per chunk.
    ///
    /// Stops at the first failing chunk and returns its error; chunks
    /// committed before it stay committed.
    pub async fn insert_many(&self, promos: &[PromoCode]) -> DbResult<usize> {
        let mut inserted = 0;

        for chunk in promos.chunks(INSERT_CHUNK_SIZE) {
            let mut tx = self.pool.begin().await?;

            for promo in chunk {
                insert_promo(&mut *tx, promo).await?;
            }

            tx.commit().await?;
            inserted += chunk.len();
            debug!(inserted, total = promos.len(), "Committed promo chunk");
        }

        info!(count = inserted, "Bulk promo insert complete");
        Ok(inserted)
    }

    /// Keyset pagination over codes: returns up to `limit` promos with a code
    /// greater than `after`.
    pub async fn list_page(&self, after: Option<&str>, limit: i64) -> DbResult<PromoPage> {
        let limit = limit.clamp(1, voyage_core::MAX_PAGE_SIZE);
        let after = after.map(normalize_code);

        let rows: Vec<PromoRow> = sqlx::query_as(&format!(
            "SELECT {} FROM promo_codes WHERE (?1 IS NULL OR code > ?1) ORDER BY code LIMIT ?2",
            PROMO_COLUMNS
        ))
        .bind(after)
        .bind(limit + 1)
        .fetch_all(&self.pool)
        .await?;

        let mut items = rows
            .into_iter()
            .map(PromoCode::try_from)
            .collect::<DbResult<Vec<_>>>()?;

        let next_cursor = if items.len() as i64 > limit {
            items.truncate(limit as usize);
            items.last().map(|p| p.code.clone())
        } else {
            None
        };

        Ok(PromoPage { items, next_cursor })
    }

    /// Activates or deactivates a promo code.
    pub async fn set_active(&self, code: &str, active: bool) -> DbResult<()> {
        let code = normalize_code(code);
        debug!(code = %code, active, "Updating promo active flag");

        let result = sqlx::query(
            "UPDATE promo_codes SET is_active = ?2, updated_at = ?3 WHERE code = ?1",
        )
        .bind(&code)
        .bind(active)
        .bind(Utc::now())
        .execute(&self.pool)
        .await?;

        if result.rows_affected() == 0 {
            return Err(DbError::not_found("PromoCode", code));
        }

        Ok(())
    }

    /// Redeems a promo code for a booking. See the module docs for the steps.
    ///
    /// Returns the promo as stored after the redemption.
    ///
    /// ## Errors
    /// - `DbError::Rejected` with the failing [`PromoError`]
    /// - `DbError::UniqueViolation` when the booking already used this code
    pub async fn redeem(
        &self,
        code: &str,
        user_id: &str,
        booking_id: &str,
        now: DateTime<Utc>,
    ) -> DbResult<PromoCode> {
        let code = normalize_code(code);
        let mut tx = self.pool.begin().await?;

        // Write first: the transaction holds the write lock before it reads.
        let claimed = sqlx::query(
            r#"
            UPDATE promo_codes
            SET used_count = used_count + 1, updated_at = ?2
            WHERE code = ?1 AND (usage_limit IS NULL OR used_count < usage_limit)
            "#,
        )
        .bind(&code)
        .bind(now)
        .execute(&mut *tx)
        .await?
        .rows_affected()
            > 0;

        let row: Option<PromoRow> = sqlx::query_as(&format!(
            "SELECT {} FROM promo_codes WHERE code = ?1",
            PROMO_COLUMNS
        ))
        .bind(&code)
        .fetch_optional(&mut *tx)
        .await?;

        let mut promo = match row {
            Some(row) => PromoCode::try_from(row)?,
            None => return Err(PromoError::NotFound { code }.into()),
        };

        // Rules see the count from before this redemption.
        if claimed {
            promo.used_count -= 1;
        }
        check_usable(&promo, now)?;

        if !claimed {
            warn!(code = %code, "Usage limit reached during redemption");
            return Err(PromoError::UsageLimitReached { code }.into());
        }

        if let Some(per_user) = promo.usage_per_user {
            let used: i64 = sqlx::query_scalar(
                "SELECT COUNT(*) FROM promo_redemptions WHERE promo_code_id = ?1 AND user_id = ?2",
            )
            .bind(&promo.id)
            .bind(user_id)
            .fetch_one(&mut *tx)
            .await?;

            if used >= per_user {
                return Err(PromoError::UserLimitReached { code }.into());
            }
        }

        sqlx::query(
            r#"
            INSERT INTO promo_redemptions (id, promo_code_id, user_id, booking_id, redeemed_at)
            VALUES (?1, ?2, ?3, ?4, ?5)
            "#,
        )
        .bind(Uuid::new_v4().to_string())
        .bind(&promo.id)
        .bind(user_id)
        .bind(booking_id)
        .bind(now)
        .execute(&mut *tx)
        .await
        .map_err(|e| match DbError::from(e) {
            DbError::UniqueViolation { .. } => DbError::duplicate("booking_id", booking_id),
            other => other,
        })?;

        tx.commit().await?;

        promo.used_count += 1;

        info!(code = %promo.code, user_id, booking_id, "Promo code redeemed");
        Ok(promo)
    }

    /// Number of times `user_id` has redeemed `code`.
    pub async fn user_redemptions(&self, code: &str, user_id: &str) -> DbResult<i64> {
        let count: i64 = sqlx::query_scalar(
            r#"
            SELECT COUNT(*)
            FROM promo_redemptions r
            JOIN promo_codes p ON p.id = r.promo_code_id
            WHERE p.code = ?1 AND r.user_id = ?2
            "#,
        )
        .bind(normalize_code(code))
        .bind(user_id)
        .fetch_one(&self.pool)
        .await?;

        Ok(count)
    }

    /// Redemptions of `code`, oldest first.
    pub async fn redemptions(&self, code: &str) -> DbResult<Vec<Redemption>> {
        let rows: Vec<Redemption> = sqlx::query_as(
            r#"
            SELECT r.id, r.promo_code_id, r.user_id, r.booking_id, r.redeemed_at
            FROM promo_redemptions r
            JOIN promo_codes p ON p.id = r.promo_code_id
            WHERE p.code = ?1
            ORDER BY r.redeemed_at
            "#,
        )
        .bind(normalize_code(code))
        .fetch_all(&self.pool)
        .await?;

        Ok(rows)
    }

    /// Counts stored promo codes (for diagnostics).
    pub async fn count(&self) -> DbResult<i64> {
        let count: i64 = sqlx::query_scalar("SELECT COUNT(*) FROM promo_codes")
            .fetch_one(&self.pool)
            .await?;

        Ok(count)
    }
}

async fn insert_promo<'e, E>(executor: E, promo: &PromoCode) -> DbResult<()>
where
    E: sqlx::Executor<'e, Database = sqlx::Sqlite>,
{
    sqlx::query(&format!(
        r#"
        INSERT INTO promo_codes ({})
        VALUES (?1, ?2, ?3, ?4, ?5, ?6, ?7, ?8, ?9, ?10,
                ?11, ?12, ?13, ?14, ?15, ?16, ?17, ?18, ?19)
        "#,
        PROMO_COLUMNS
    ))
    .bind(&promo.id)
    .bind(normalize_code(&promo.code))
    .bind(&promo.description)
    .bind(promo.discount_type)
    .bind(promo.discount_value)
    .bind(promo.max_discount.map(|m| m.cents()))
    .bind(promo.min_purchase_amount.cents())
    .bind(promo.usage_limit)
    .bind(promo.usage_per_user)
    .bind(promo.used_count)
    .bind(promo.valid_from)
    .bind(promo.valid_until)
    .bind(serde_json::to_string(&promo.applicable_trips)?)
    .bind(serde_json::to_string(&promo.applicable_vendors)?)
    .bind(serde_json::to_string(&promo.applicable_categories)?)
    .bind(serde_json::to_string(&promo.excluded_vendors)?)
    .bind(promo.is_active)
    .bind(promo.created_at)
    .bind(promo.updated_at)
    .execute(executor)
    .await?;

    Ok(())
}

/// Helper to generate a new promo ID.
pub fn generate_promo_id() -> String {
    Uuid::new_v4().to_string()
}

// =============================================================================
// Unit Tests
// =============================================================================
