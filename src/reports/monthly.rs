use serde::Serialize;
use time::{Date, Month};
use tracing::{debug, instrument, warn};

use super::error::ReportError;
use super::percentages::{compute_percentages, MacroPercentages};
use crate::calendar::{days_in_month, MAX_YEAR, MIN_YEAR};
use crate::foods::model::FoodSummary;
use crate::foods::store::NutritionRecordStore;

/// One calendar day of a month report. `percentages` is `None` when the day
/// has no totals row, which is distinct from 0%.
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct DayBucket {
    pub day: u8,
    pub foods: Vec<FoodSummary>,
    pub percentages: Option<MacroPercentages>,
}

impl DayBucket {
    fn empty(day: u8) -> Self {
        Self {
            day,
            foods: Vec::new(),
            percentages: None,
        }
    }
}

/// One bucket per calendar day; index 0 is day 1.
pub type MonthResult = Vec<DayBucket>;

pub(crate) fn validate_year(year: i32) -> Result<(), ReportError> {
    if (MIN_YEAR..=MAX_YEAR).contains(&year) {
        Ok(())
    } else {
        Err(ReportError::invalid(format!(
            "year must be between {MIN_YEAR} and {MAX_YEAR}, got {year}"
        )))
    }
}

pub(crate) fn validate_month(month: u8) -> Result<Month, ReportError> {
    Month::try_from(month)
        .map_err(|_| ReportError::invalid(format!("month must be between 1 and 12, got {month}")))
}

/// Builds the month report for `user_id`.
///
/// Food rows are bucketed by day-of-month keeping the store's index order,
/// then each day's totals are looked up and turned into percentages.
/// Store failures abort the whole month; no partial result is returned.
#[instrument(skip(store))]
pub async fn aggregate_month(
    store: &dyn NutritionRecordStore,
    user_id: &str,
    year: i32,
    month: u8,
) -> Result<MonthResult, ReportError> {
    validate_year(year)?;
    let month_enum = validate_month(month)?;
    let days = days_in_month(year, month)
        .ok_or_else(|| ReportError::invalid(format!("month must be between 1 and 12, got {month}")))?;

    let entries = store
        .fetch_food_entries(user_id, year, month)
        .await
        .map_err(ReportError::Store)?;

    let mut buckets: MonthResult = (1..=days).map(DayBucket::empty).collect();
    let mut food_count = 0usize;
    for entry in entries {
        if entry.date.year() != year || entry.date.month() != month_enum {
            warn!(date = %entry.date, year, month, "skipping entry outside requested month");
            continue;
        }
        let Some(bucket) = buckets.get_mut(usize::from(entry.date.day()) - 1) else {
            continue;
        };
        bucket.foods.push(FoodSummary::from(entry));
        food_count += 1;
    }

    for bucket in &mut buckets {
        let date = Date::from_calendar_date(year, month_enum, bucket.day)
            .map_err(|e| ReportError::invalid(e.to_string()))?;
        let totals = store
            .fetch_daily_totals(user_id, date)
            .await
            .map_err(ReportError::Store)?;
        bucket.percentages = totals.map(|t| compute_percentages(&t.actual, &t.target));
    }

    debug!(days, food_count, "month aggregated");
    Ok(buckets)
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::foods::memory::MemoryStore;
    use crate::foods::model::{FoodEntry, Macros, NewFood};
    use time::macros::date;

    fn food(name: &str, carbohydrate: f64, protein: f64, fat: f64) -> NewFood {
        NewFood {
            name: name.into(),
            carbohydrate,
            protein,
            fat,
            calories: carbohydrate * 4.0 + protein * 4.0 + fat * 9.0,
        }
    }

    #[tokio::test]
    async fn length_matches_days_in_month() {
        let store = MemoryStore::new();
        for (year, month, len) in [(2024, 2, 29), (2023, 2, 28), (2024, 4, 30), (2024, 1, 31)] {
            let res = aggregate_month(&store, "kim", year, month).await.unwrap();
            assert_eq!(res.len(), len, "{year}-{month}");
            assert_eq!(res.first().unwrap().day, 1);
            assert_eq!(usize::from(res.last().unwrap().day), len);
        }
    }

    #[tokio::test]
    async fn empty_days_are_present_with_no_percentages() {
        let store = MemoryStore::new();
        store.set_targets("kim", Macros::default());
        store
            .insert_food("kim", date!(2024 - 05 - 10), &food("rice", 60.0, 5.0, 1.0))
            .await
            .unwrap();

        let res = aggregate_month(&store, "kim", 2024, 5).await.unwrap();
        assert_eq!(res.len(), 31);
        assert!(res[0].foods.is_empty());
        assert_eq!(res[0].percentages, None);
        assert_eq!(res[9].foods.len(), 1);
        assert!(res[9].percentages.is_some());
    }

    #[tokio::test]
    async fn entries_keep_index_order_within_a_day() {
        let store = MemoryStore::new();
        let day = date!(2024 - 01 - 15);
        for name in ["toast", "coffee", "banana"] {
            store.insert_food("kim", day, &food(name, 10.0, 1.0, 1.0)).await.unwrap();
        }
        store
            .insert_food("lee", day, &food("not mine", 1.0, 1.0, 1.0))
            .await
            .unwrap();

        let res = aggregate_month(&store, "kim", 2024, 1).await.unwrap();
        let names: Vec<_> = res[14].foods.iter().map(|f| f.name.as_str()).collect();
        assert_eq!(names, ["toast", "coffee", "banana"]);
        let indexes: Vec<_> = res[14].foods.iter().map(|f| f.index).collect();
        assert_eq!(indexes, [0, 1, 2]);
    }

    #[tokio::test]
    async fn percentages_use_user_targets() {
        let store = MemoryStore::new();
        store.set_targets(
            "kim",
            Macros {
                carbohydrate: 0.0,
                protein: 90.0,
                fat: 60.0,
            },
        );
        store
            .insert_food("kim", date!(2024 - 02 - 29), &food("cutlet", 50.0, 90.0, 60.0))
            .await
            .unwrap();

        let res = aggregate_month(&store, "kim", 2024, 2).await.unwrap();
        let pct = res[28].percentages.expect("totals exist for the 29th");
        assert_eq!(pct.carbohydrate, 0.0);
        assert_eq!(pct.protein, 100.0);
        assert_eq!(pct.fat, 100.0);
    }

    #[tokio::test]
    async fn unknown_user_has_no_percentages() {
        let store = MemoryStore::new();
        store
            .insert_food("ghost", date!(2024 - 05 - 10), &food("rice", 60.0, 5.0, 1.0))
            .await
            .unwrap();
        let res = aggregate_month(&store, "ghost", 2024, 5).await.unwrap();
        assert_eq!(res[9].foods.len(), 1);
        assert_eq!(res[9].percentages, None);
    }

    #[tokio::test]
    async fn month_thirteen_is_rejected_without_store_access() {
        let store = MemoryStore::new();
        store.fail_month(2024, 13);
        let err = aggregate_month(&store, "kim", 2024, 13).await.unwrap_err();
        assert!(matches!(err, ReportError::InvalidArgument(_)));

        let err = aggregate_month(&store, "kim", 2024, 0).await.unwrap_err();
        assert!(matches!(err, ReportError::InvalidArgument(_)));

        let err = aggregate_month(&store, "kim", 0, 1).await.unwrap_err();
        assert!(matches!(err, ReportError::InvalidArgument(_)));
    }

    #[tokio::test]
    async fn store_failure_propagates() {
        let store = MemoryStore::new();
        store.fail_month(2024, 3);
        let err = aggregate_month(&store, "kim", 2024, 3).await.unwrap_err();
        assert!(matches!(err, ReportError::Store(_)));
    }

    #[tokio::test]
    async fn rows_outside_the_month_are_skipped() {
        struct LeakyStore(MemoryStore);

        #[async_trait::async_trait]
        impl NutritionRecordStore for LeakyStore {
            async fn fetch_food_entries(
                &self,
                user_id: &str,
                _year: i32,
                _month: u8,
            ) -> anyhow::Result<Vec<FoodEntry>> {
                self.0.fetch_day_entries(user_id, date!(2024 - 07 - 01)).await
            }
            async fn fetch_daily_totals(
                &self,
                user_id: &str,
                date: Date,
            ) -> anyhow::Result<Option<crate::foods::model::DailyTotals>> {
                self.0.fetch_daily_totals(user_id, date).await
            }
            async fn fetch_day_entries(
                &self,
                user_id: &str,
                date: Date,
            ) -> anyhow::Result<Vec<FoodEntry>> {
                self.0.fetch_day_entries(user_id, date).await
            }
            async fn insert_food(
                &self,
                user_id: &str,
                date: Date,
                food: &NewFood,
            ) -> anyhow::Result<FoodEntry> {
                self.0.insert_food(user_id, date, food).await
            }
            async fn update_food(
                &self,
                key: &crate::foods::model::FoodKey,
                patch: &crate::foods::model::FoodPatch,
            ) -> anyhow::Result<Option<FoodEntry>> {
                self.0.update_food(key, patch).await
            }
            async fn delete_food(&self, key: &crate::foods::model::FoodKey) -> anyhow::Result<bool> {
                self.0.delete_food(key).await
            }
        }

        let inner = MemoryStore::new();
        inner
            .insert_food("kim", date!(2024 - 07 - 01), &food("july", 1.0, 1.0, 1.0))
            .await
            .unwrap();
        let store = LeakyStore(inner);

        let res = aggregate_month(&store, "kim", 2024, 6).await.unwrap();
        assert_eq!(res.len(), 30);
        assert!(res.iter().all(|b| b.foods.is_empty()));
    }
}
