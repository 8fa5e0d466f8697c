use serde::{Deserialize, Serialize};

use crate::foods::model::Macros;

/// Share of each daily target reached, in percent with one decimal.
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct MacroPercentages {
    pub carbohydrate: f64,
    pub protein: f64,
    pub fat: f64,
}

/// Percent of `target` reached by `actual` for each macro.
/// A target of zero (or anything not positive) yields 0.
pub fn compute_percentages(actual: &Macros, target: &Macros) -> MacroPercentages {
    MacroPercentages {
        carbohydrate: percent_of(actual.carbohydrate, target.carbohydrate),
        protein: percent_of(actual.protein, target.protein),
        fat: percent_of(actual.fat, target.fat),
    }
}

fn percent_of(actual: f64, target: f64) -> f64 {
    if target > 0.0 {
        round1(100.0 * actual / target)
    } else {
        0.0
    }
}

pub(crate) fn round1(v: f64) -> f64 {
    (v * 10.0).round() / 10.0
}
