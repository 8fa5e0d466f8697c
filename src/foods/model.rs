use serde::{Deserialize, Serialize};
use sqlx::FromRow;
use time::Date;

/// One recorded food item. `(user_id, date, food_index)` is unique.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize, FromRow)]
pub struct FoodEntry {
    pub user_id: String,
    pub date: Date,
    pub food_index: i32,
    pub name: String,
    pub carbohydrate: f64, // grams
    pub protein: f64,      // grams
    pub fat: f64,          // grams
    pub calories: f64,     // kcal
}

/// Food entry as it appears inside a day bucket.
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct FoodSummary {
    pub index: i32,
    pub name: String,
    pub carbohydrate: f64,
    pub protein: f64,
    pub fat: f64,
    pub calories: f64,
}

impl From<FoodEntry> for FoodSummary {
    fn from(e: FoodEntry) -> Self {
        Self {
            index: e.food_index,
            name: e.name,
            carbohydrate: e.carbohydrate,
            protein: e.protein,
            fat: e.fat,
            calories: e.calories,
        }
    }
}

/// Carbohydrate / protein / fat triple in grams.
#[derive(Debug, Clone, Copy, Default, PartialEq, Serialize, Deserialize)]
pub struct Macros {
    pub carbohydrate: f64,
    pub protein: f64,
    pub fat: f64,
}

/// Actual intake vs. recommended targets for one user-day.
/// A zero target means no target is set.
#[derive(Debug, Clone, Copy, PartialEq, Serialize)]
pub struct DailyTotals {
    pub actual: Macros,
    pub calories: f64,
    pub target: Macros,
}

#[derive(Debug, FromRow)]
pub(crate) struct DailyTotalsRow {
    pub carbohydrate: f64,
    pub protein: f64,
    pub fat: f64,
    pub calories: f64,
    pub rd_carbo: f64,
    pub rd_protein: f64,
    pub rd_fat: f64,
}

impl From<DailyTotalsRow> for DailyTotals {
    fn from(r: DailyTotalsRow) -> Self {
        Self {
            actual: Macros {
                carbohydrate: r.carbohydrate,
                protein: r.protein,
                fat: r.fat,
            },
            calories: r.calories,
            target: Macros {
                carbohydrate: r.rd_carbo,
                protein: r.rd_protein,
                fat: r.rd_fat,
            },
        }
    }
}

/// Values for a new entry; the store assigns the index.
#[derive(Debug, Clone, PartialEq)]
pub struct NewFood {
    pub name: String,
    pub carbohydrate: f64,
    pub protein: f64,
    pub fat: f64,
    pub calories: f64,
}

/// Identifies a single entry for update/delete.
#[derive(Debug, Clone, PartialEq, Eq, Deserialize)]
pub struct FoodKey {
    pub user_id: String,
    pub date: Date,
    pub index: i32,
}

/// Partial update; `None` keeps the stored value.
#[derive(Debug, Clone, Default, PartialEq, Deserialize)]
pub struct FoodPatch {
    pub name: Option<String>,
    pub carbohydrate: Option<f64>,
    pub protein: Option<f64>,
    pub fat: Option<f64>,
    pub calories: Option<f64>,
}

impl FoodPatch {
    pub fn is_empty(&self) -> bool {
        self.name.is_none()
            && self.carbohydrate.is_none()
            && self.protein.is_none()
            && self.fat.is_none()
            && self.calories.is_none()
    }
}
