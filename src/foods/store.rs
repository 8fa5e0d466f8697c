use async_trait::async_trait;
use time::Date;

use super::model::{DailyTotals, FoodEntry, FoodKey, FoodPatch, NewFood};

/// Persistence for food entries and per-day totals.
///
/// Implementations own connection handling, timeouts and any retry policy;
/// callers treat every error as a store-access failure.
#[async_trait]
pub trait NutritionRecordStore: Send + Sync {
    /// Entries of one calendar month, ordered by date then index.
    async fn fetch_food_entries(
        &self,
        user_id: &str,
        year: i32,
        month: u8,
    ) -> anyhow::Result<Vec<FoodEntry>>;

    /// Totals and targets for one day; `None` when no totals row exists.
    async fn fetch_daily_totals(
        &self,
        user_id: &str,
        date: Date,
    ) -> anyhow::Result<Option<DailyTotals>>;

    /// Entries of one day in index order.
    async fn fetch_day_entries(&self, user_id: &str, date: Date) -> anyhow::Result<Vec<FoodEntry>>;

    /// Appends an entry at `1 + max(index)` for the day (0 for the first one).
    async fn insert_food(
        &self,
        user_id: &str,
        date: Date,
        food: &NewFood,
    ) -> anyhow::Result<FoodEntry>;

    /// Returns `None` when no entry matches the key.
    async fn update_food(&self, key: &FoodKey, patch: &FoodPatch)
        -> anyhow::Result<Option<FoodEntry>>;

    /// Returns `false` when no entry matches the key.
    async fn delete_food(&self, key: &FoodKey) -> anyhow::Result<bool>;
}
