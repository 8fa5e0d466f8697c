use serde::{Deserialize, Serialize};
use time::Date;

use super::model::{DailyTotals, FoodKey, FoodPatch, FoodSummary, Macros};
use crate::reports::percentages::MacroPercentages;

pub const MAX_DESCRIPTION_LEN: usize = 200;

/// 1..=200 characters after trimming; counted in chars, not bytes.
pub fn is_valid_description(text: &str) -> bool {
    let text = text.trim();
    !text.is_empty() && text.chars().count() <= MAX_DESCRIPTION_LEN
}

#[derive(Debug, Deserialize)]
pub struct CreateFoodRequest {
    #[serde(alias = "userId")]
    pub user_id: String,
    #[serde(alias = "food_name")]
    pub description: String,
    /// Defaults to today (UTC).
    #[serde(default)]
    pub date: Option<Date>,
}

#[derive(Debug, Deserialize)]
pub struct UpdateFoodRequest {
    #[serde(flatten)]
    pub key: FoodKey,
    #[serde(flatten)]
    pub patch: FoodPatch,
}

impl UpdateFoodRequest {
    pub fn validate(&self) -> Result<(), String> {
        if self.patch.is_empty() {
            return Err("nothing to update".into());
        }
        if let Some(name) = &self.patch.name {
            if !is_valid_description(name) {
                return Err("name must be 1..=200 characters".into());
            }
        }
        for (field, v) in [
            ("carbohydrate", self.patch.carbohydrate),
            ("protein", self.patch.protein),
            ("fat", self.patch.fat),
            ("calories", self.patch.calories),
        ] {
            if let Some(v) = v {
                if !v.is_finite() || v < 0.0 {
                    return Err(format!("{field} must be a non-negative number"));
                }
            }
        }
        Ok(())
    }
}

#[derive(Debug, Deserialize)]
pub struct DayQuery {
    pub date: Date,
}

#[derive(Debug, Serialize)]
pub struct DayTotalsView {
    pub carbohydrate: f64,
    pub protein: f64,
    pub fat: f64,
    pub calories: f64,
    pub targets: Macros,
}

impl From<&DailyTotals> for DayTotalsView {
    fn from(t: &DailyTotals) -> Self {
        Self {
            carbohydrate: t.actual.carbohydrate,
            protein: t.actual.protein,
            fat: t.actual.fat,
            calories: t.calories,
            targets: t.target,
        }
    }
}

/// One day's entries together with its totals.
#[derive(Debug, Serialize)]
pub struct DayDetail {
    pub date: Date,
    pub foods: Vec<FoodSummary>,
    pub totals: Option<DayTotalsView>,
    pub percentages: Option<MacroPercentages>,
}
