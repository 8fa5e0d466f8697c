//! In-memory store used by unit and router tests.

use std::collections::{HashMap, HashSet};
use std::sync::Mutex;

use async_trait::async_trait;
use time::Date;

use super::model::{DailyTotals, FoodEntry, FoodKey, FoodPatch, Macros, NewFood};
use super::store::NutritionRecordStore;

#[derive(Default)]
pub struct MemoryStore {
    entries: Mutex<Vec<FoodEntry>>,
    targets: Mutex<HashMap<String, Macros>>,
    failing_months: Mutex<HashSet<(i32, u8)>>,
}

impl MemoryStore {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn set_targets(&self, user_id: &str, targets: Macros) {
        self.targets
            .lock()
            .unwrap()
            .insert(user_id.to_string(), targets);
    }

    /// Makes `fetch_food_entries` fail for one (year, month).
    pub fn fail_month(&self, year: i32, month: u8) {
        self.failing_months.lock().unwrap().insert((year, month));
    }

    fn day_entries(&self, user_id: &str, date: Date) -> Vec<FoodEntry> {
        let mut rows: Vec<FoodEntry> = self
            .entries
            .lock()
            .unwrap()
            .iter()
            .filter(|e| e.user_id == user_id && e.date == date)
            .cloned()
            .collect();
        rows.sort_by_key(|e| e.food_index);
        rows
    }
}

#[async_trait]
impl NutritionRecordStore for MemoryStore {
    async fn fetch_food_entries(
        &self,
        user_id: &str,
        year: i32,
        month: u8,
    ) -> anyhow::Result<Vec<FoodEntry>> {
        if self.failing_months.lock().unwrap().contains(&(year, month)) {
            anyhow::bail!("store unavailable for {year}-{month:02}");
        }
        let mut rows: Vec<FoodEntry> = self
            .entries
            .lock()
            .unwrap()
            .iter()
            .filter(|e| {
                e.user_id == user_id && e.date.year() == year && u8::from(e.date.month()) == month
            })
            .cloned()
            .collect();
        rows.sort_by_key(|e| (e.date, e.food_index));
        Ok(rows)
    }

    async fn fetch_daily_totals(
        &self,
        user_id: &str,
        date: Date,
    ) -> anyhow::Result<Option<DailyTotals>> {
        let rows = self.day_entries(user_id, date);
        // Mirrors the users join: no targets means no user row.
        let Some(target) = self.targets.lock().unwrap().get(user_id).copied() else {
            return Ok(None);
        };
        if rows.is_empty() {
            return Ok(None);
        }
        let mut actual = Macros::default();
        let mut calories = 0.0;
        for r in &rows {
            actual.carbohydrate += r.carbohydrate;
            actual.protein += r.protein;
            actual.fat += r.fat;
            calories += r.calories;
        }
        Ok(Some(DailyTotals {
            actual,
            calories,
            target,
        }))
    }

    async fn fetch_day_entries(&self, user_id: &str, date: Date) -> anyhow::Result<Vec<FoodEntry>> {
        Ok(self.day_entries(user_id, date))
    }

    async fn insert_food(
        &self,
        user_id: &str,
        date: Date,
        food: &NewFood,
    ) -> anyhow::Result<FoodEntry> {
        let mut entries = self.entries.lock().unwrap();
        let next_index = entries
            .iter()
            .filter(|e| e.user_id == user_id && e.date == date)
            .map(|e| e.food_index + 1)
            .max()
            .unwrap_or(0);
        let entry = FoodEntry {
            user_id: user_id.to_string(),
            date,
            food_index: next_index,
            name: food.name.clone(),
            carbohydrate: food.carbohydrate,
            protein: food.protein,
            fat: food.fat,
            calories: food.calories,
        };
        entries.push(entry.clone());
        Ok(entry)
    }

    async fn update_food(
        &self,
        key: &FoodKey,
        patch: &FoodPatch,
    ) -> anyhow::Result<Option<FoodEntry>> {
        let mut entries = self.entries.lock().unwrap();
        let Some(entry) = entries
            .iter_mut()
            .find(|e| e.user_id == key.user_id && e.date == key.date && e.food_index == key.index)
        else {
            return Ok(None);
        };
        if let Some(name) = &patch.name {
            entry.name = name.clone();
        }
        entry.carbohydrate = patch.carbohydrate.unwrap_or(entry.carbohydrate);
        entry.protein = patch.protein.unwrap_or(entry.protein);
        entry.fat = patch.fat.unwrap_or(entry.fat);
        entry.calories = patch.calories.unwrap_or(entry.calories);
        Ok(Some(entry.clone()))
    }

    async fn delete_food(&self, key: &FoodKey) -> anyhow::Result<bool> {
        let mut entries = self.entries.lock().unwrap();
        let before = entries.len();
        entries.retain(|e| {
            !(e.user_id == key.user_id && e.date == key.date && e.food_index == key.index)
        });
        Ok(entries.len() < before)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use time::macros::date;

    fn food(name: &str) -> NewFood {
        NewFood {
            name: name.into(),
            carbohydrate: 10.0,
            protein: 5.0,
            fat: 2.0,
            calories: 78.0,
        }
    }

    #[tokio::test]
    async fn totals_need_a_known_user() {
        let store = MemoryStore::new();
        let day = date!(2024 - 03 - 05);
        store.insert_food("ghost", day, &food("a")).await.unwrap();
        assert_eq!(store.fetch_daily_totals("ghost", day).await.unwrap(), None);

        store.set_targets("ghost", Macros::default());
        let totals = store.fetch_daily_totals("ghost", day).await.unwrap().unwrap();
        assert_eq!(totals.target, Macros::default());
        assert_eq!(totals.actual.carbohydrate, 10.0);
        assert_eq!(
            store.fetch_daily_totals("ghost", date!(2024 - 03 - 06)).await.unwrap(),
            None
        );
    }

    #[tokio::test]
    async fn index_continues_after_max_even_with_gaps() {
        let store = MemoryStore::new();
        let day = date!(2024 - 03 - 05);
        for n in ["a", "b", "c"] {
            store.insert_food("kim", day, &food(n)).await.unwrap();
        }
        let key = FoodKey {
            user_id: "kim".into(),
            date: day,
            index: 1,
        };
        assert!(store.delete_food(&key).await.unwrap());
        let next = store.insert_food("kim", day, &food("d")).await.unwrap();
        assert_eq!(next.food_index, 3);

        let other_day = store
            .insert_food("kim", date!(2024 - 03 - 06), &food("e"))
            .await
            .unwrap();
        assert_eq!(other_day.food_index, 0);
    }
}
