use std::collections::BTreeMap;

use tracing::{debug, instrument};

use super::error::ReportError;
use super::monthly::{aggregate_month, validate_month, validate_year, MonthResult};
use crate::calendar::{month_key, shift_month};
use crate::foods::store::NutritionRecordStore;

/// Month reports keyed by `"YYYY-MM"`; iteration order is chronological.
pub type QuarterResult = BTreeMap<String, MonthResult>;

/// Previous, pivot and next month around `start_month`, rolling the year
/// over at December/January.
pub fn quarter_months(year: i32, start_month: u8) -> [(i32, u8); 3] {
    [-1, 0, 1].map(|offset| shift_month(year, start_month, offset))
}

/// Builds the three month reports around the pivot month.
///
/// The months are fetched concurrently; the first failure aborts the whole
/// quarter.
#[instrument(skip(store))]
pub async fn aggregate_quarter(
    store: &dyn NutritionRecordStore,
    user_id: &str,
    year: i32,
    start_month: u8,
) -> Result<QuarterResult, ReportError> {
    validate_year(year)?;
    validate_month(start_month)?;

    let [prev, pivot, next] = quarter_months(year, start_month);
    let (prev_res, pivot_res, next_res) = tokio::try_join!(
        aggregate_month(store, user_id, prev.0, prev.1),
        aggregate_month(store, user_id, pivot.0, pivot.1),
        aggregate_month(store, user_id, next.0, next.1),
    )?;

    let mut quarter = QuarterResult::new();
    for ((y, m), res) in [(prev, prev_res), (pivot, pivot_res), (next, next_res)] {
        quarter.insert(month_key(y, m), res);
    }
    debug!(keys = ?quarter.keys().collect::<Vec<_>>(), "quarter aggregated");
    Ok(quarter)
}
