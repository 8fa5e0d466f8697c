use std::future::Future;
use std::time::Duration;

use anyhow::Context;
use async_trait::async_trait;
use sqlx::{PgPool, Postgres, Transaction};
use time::Date;
use tracing::debug;

use super::model::{DailyTotals, DailyTotalsRow, FoodEntry, FoodKey, FoodPatch, NewFood};
use super::store::NutritionRecordStore;
use crate::calendar::month_bounds;

const ENTRY_COLUMNS: &str =
    "user_id, entry_date AS date, food_index, name, carbohydrate, protein, fat, calories";

/// Postgres-backed store. Every call is bounded by `query_timeout`.
#[derive(Clone)]
pub struct PgNutritionStore {
    db: PgPool,
    query_timeout: Duration,
}

impl PgNutritionStore {
    pub fn new(db: PgPool, query_timeout: Duration) -> Self {
        Self { db, query_timeout }
    }

    async fn bounded<T, F>(&self, what: &'static str, fut: F) -> anyhow::Result<T>
    where
        F: Future<Output = anyhow::Result<T>> + Send,
    {
        match tokio::time::timeout(self.query_timeout, fut).await {
            Ok(res) => res,
            Err(_) => anyhow::bail!("{what} timed out after {:?}", self.query_timeout),
        }
    }
}

/// Rebuilds the `daily_nutrition` row for one user-day from its food entries.
/// The row disappears when the day has no entries left.
async fn recompute_daily_tx(
    tx: &mut Transaction<'_, Postgres>,
    user_id: &str,
    date: Date,
) -> anyhow::Result<()> {
    sqlx::query(
        r#"
        DELETE FROM daily_nutrition
         WHERE user_id = $1 AND entry_date = $2
        "#,
    )
    .bind(user_id)
    .bind(date)
    .execute(&mut **tx)
    .await
    .context("clear daily totals")?;

    sqlx::query(
        r#"
        INSERT INTO daily_nutrition (user_id, entry_date, carbohydrate, protein, fat, calories)
        SELECT user_id, entry_date, SUM(carbohydrate), SUM(protein), SUM(fat), SUM(calories)
          FROM food_entries
         WHERE user_id = $1 AND entry_date = $2
         GROUP BY user_id, entry_date
        "#,
    )
    .bind(user_id)
    .bind(date)
    .execute(&mut **tx)
    .await
    .context("rebuild daily totals")?;

    Ok(())
}

#[async_trait]
impl NutritionRecordStore for PgNutritionStore {
    async fn fetch_food_entries(
        &self,
        user_id: &str,
        year: i32,
        month: u8,
    ) -> anyhow::Result<Vec<FoodEntry>> {
        let (first, last) = month_bounds(year, month)?;
        self.bounded("fetch food entries", async {
            let rows = sqlx::query_as::<_, FoodEntry>(&format!(
                r#"
                SELECT {ENTRY_COLUMNS}
                  FROM food_entries
                 WHERE user_id = $1 AND entry_date BETWEEN $2 AND $3
                 ORDER BY entry_date ASC, food_index ASC
                "#
            ))
            .bind(user_id)
            .bind(first)
            .bind(last)
            .fetch_all(&self.db)
            .await
            .context("select month food entries")?;
            debug!(user_id, year, month, rows = rows.len(), "fetched month entries");
            Ok(rows)
        })
        .await
    }

    async fn fetch_daily_totals(
        &self,
        user_id: &str,
        date: Date,
    ) -> anyhow::Result<Option<DailyTotals>> {
        self.bounded("fetch daily totals", async {
            let row = sqlx::query_as::<_, DailyTotalsRow>(
                r#"
                SELECT d.carbohydrate, d.protein, d.fat, d.calories,
                       u.rd_carbo, u.rd_protein, u.rd_fat
                  FROM daily_nutrition d
                  JOIN users u ON u.id = d.user_id
                 WHERE d.user_id = $1 AND d.entry_date = $2
                "#,
            )
            .bind(user_id)
            .bind(date)
            .fetch_optional(&self.db)
            .await
            .context("select daily totals")?;
            Ok(row.map(DailyTotals::from))
        })
        .await
    }

    async fn fetch_day_entries(&self, user_id: &str, date: Date) -> anyhow::Result<Vec<FoodEntry>> {
        self.bounded("fetch day entries", async {
            let rows = sqlx::query_as::<_, FoodEntry>(&format!(
                r#"
                SELECT {ENTRY_COLUMNS}
                  FROM food_entries
                 WHERE user_id = $1 AND entry_date = $2
                 ORDER BY food_index ASC
                "#
            ))
            .bind(user_id)
            .bind(date)
            .fetch_all(&self.db)
            .await
            .context("select day food entries")?;
            Ok(rows)
        })
        .await
    }

    async fn insert_food(
        &self,
        user_id: &str,
        date: Date,
        food: &NewFood,
    ) -> anyhow::Result<FoodEntry> {
        self.bounded("insert food", async {
            let mut tx = self.db.begin().await.context("begin tx")?;

            // Serializes index assignment per user-day.
            sqlx::query("SELECT pg_advisory_xact_lock(hashtext($1), hashtext($2::text))")
                .bind(user_id)
                .bind(date)
                .execute(&mut *tx)
                .await
                .context("lock user day")?;

            let (next_index,): (i32,) = sqlx::query_as(
                r#"
                SELECT COALESCE(MAX(food_index) + 1, 0)
                  FROM food_entries
                 WHERE user_id = $1 AND entry_date = $2
                "#,
            )
            .bind(user_id)
            .bind(date)
            .fetch_one(&mut *tx)
            .await
            .context("next food index")?;

            let entry = sqlx::query_as::<_, FoodEntry>(&format!(
                r#"
                INSERT INTO food_entries
                       (user_id, entry_date, food_index, name, carbohydrate, protein, fat, calories)
                VALUES ($1, $2, $3, $4, $5, $6, $7, $8)
                RETURNING {ENTRY_COLUMNS}
                "#
            ))
            .bind(user_id)
            .bind(date)
            .bind(next_index)
            .bind(&food.name)
            .bind(food.carbohydrate)
            .bind(food.protein)
            .bind(food.fat)
            .bind(food.calories)
            .fetch_one(&mut *tx)
            .await
            .context("insert food entry")?;

            recompute_daily_tx(&mut tx, user_id, date).await?;
            tx.commit().await.context("commit tx")?;
            Ok(entry)
        })
        .await
    }

    async fn update_food(
        &self,
        key: &FoodKey,
        patch: &FoodPatch,
    ) -> anyhow::Result<Option<FoodEntry>> {
        self.bounded("update food", async {
            let mut tx = self.db.begin().await.context("begin tx")?;
            let entry = sqlx::query_as::<_, FoodEntry>(&format!(
                r#"
                UPDATE food_entries
                   SET name         = COALESCE($4, name),
                       carbohydrate = COALESCE($5, carbohydrate),
                       protein      = COALESCE($6, protein),
                       fat          = COALESCE($7, fat),
                       calories     = COALESCE($8, calories)
                 WHERE user_id = $1 AND entry_date = $2 AND food_index = $3
                RETURNING {ENTRY_COLUMNS}
                "#
            ))
            .bind(&key.user_id)
            .bind(key.date)
            .bind(key.index)
            .bind(patch.name.as_deref())
            .bind(patch.carbohydrate)
            .bind(patch.protein)
            .bind(patch.fat)
            .bind(patch.calories)
            .fetch_optional(&mut *tx)
            .await
            .context("update food entry")?;

            if entry.is_some() {
                recompute_daily_tx(&mut tx, &key.user_id, key.date).await?;
            }
            tx.commit().await.context("commit tx")?;
            Ok(entry)
        })
        .await
    }

    async fn delete_food(&self, key: &FoodKey) -> anyhow::Result<bool> {
        self.bounded("delete food", async {
            let mut tx = self.db.begin().await.context("begin tx")?;
            let deleted = sqlx::query(
                r#"
                DELETE FROM food_entries
                 WHERE user_id = $1 AND entry_date = $2 AND food_index = $3
                "#,
            )
            .bind(&key.user_id)
            .bind(key.date)
            .bind(key.index)
            .execute(&mut *tx)
            .await
            .context("delete food entry")?
            .rows_affected()
                > 0;

            if deleted {
                recompute_daily_tx(&mut tx, &key.user_id, key.date).await?;
            }
            tx.commit().await.context("commit tx")?;
            Ok(deleted)
        })
        .await
    }
}
