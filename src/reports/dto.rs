use serde::Deserialize;
use serde_json::Value;

use super::error::ReportError;

/// Body of `POST /reports/monthly`. Numbers may also arrive as strings.
#[derive(Debug, Deserialize)]
pub struct MonthlyRequest {
    #[serde(default)]
    pub year: Value,
    #[serde(default)]
    pub month: Value,
    #[serde(alias = "userId")]
    pub user_id: String,
}

/// Body of `POST /reports/quarterly`.
#[derive(Debug, Deserialize)]
pub struct QuarterlyRequest {
    #[serde(default)]
    pub year: Value,
    #[serde(default, alias = "startMonth")]
    pub start_month: Value,
    #[serde(alias = "userId")]
    pub user_id: String,
}

/// Reads an integer argument given as a JSON number or an integer string.
pub(crate) fn int_arg(name: &str, v: &Value) -> Result<i64, ReportError> {
    let parsed = match v {
        Value::Number(n) => n.as_i64(),
        Value::String(s) => s.trim().parse::<i64>().ok(),
        Value::Null => return Err(ReportError::invalid(format!("{name} is required"))),
        _ => None,
    };
    parsed.ok_or_else(|| ReportError::invalid(format!("{name} must be an integer, got {v}")))
}

pub(crate) fn year_arg(v: &Value) -> Result<i32, ReportError> {
    let year = int_arg("year", v)?;
    i32::try_from(year).map_err(|_| ReportError::invalid(format!("year out of range: {year}")))
}

/// Range checking is left to the aggregators; this only narrows the type.
pub(crate) fn month_arg(name: &str, v: &Value) -> Result<u8, ReportError> {
    let month = int_arg(name, v)?;
    u8::try_from(month)
        .map_err(|_| ReportError::invalid(format!("{name} must be between 1 and 12, got {month}")))
}
