use lazy_static::lazy_static;
use regex::Regex;
use serde::Deserialize;

use super::{EstimateError, NutritionEstimate};

/// The model may answer with numbers or with strings such as `"50g"`.
#[derive(Debug, Deserialize)]
#[serde(untagged)]
enum Quantity {
    Number(f64),
    Text(String),
}

#[derive(Debug, Deserialize)]
struct RawEstimate {
    #[serde(alias = "calories", alias = "kcal")]
    calorie: Quantity,
    #[serde(alias = "carbohydrates", alias = "carbs")]
    carbohydrate: Quantity,
    protein: Quantity,
    fat: Quantity,
}

const KNOWN_UNITS: [&str; 3] = ["", "g", "kcal"];

lazy_static! {
    // number (thousands separators allowed), then an optional unit word
    static ref QUANTITY_RE: Regex = Regex::new(r"^(-?[0-9][0-9.,\s]*?)\s*([A-Za-z]*)$").unwrap();
}

fn amount(field: &str, q: Quantity) -> Result<f64, EstimateError> {
    let value = match q {
        Quantity::Number(n) => n,
        Quantity::Text(s) => {
            let not_a_number = || EstimateError::Parse(format!("{field} is not a number: {s:?}"));
            let caps = QUANTITY_RE.captures(s.trim()).ok_or_else(not_a_number)?;
            if !KNOWN_UNITS.contains(&caps[2].to_ascii_lowercase().as_str()) {
                return Err(EstimateError::Parse(format!(
                    "{field} has an unknown unit: {s:?}"
                )));
            }
            let digits: String = caps[1]
                .chars()
                .filter(|c| *c != ',' && !c.is_whitespace())
                .collect();
            digits.parse::<f64>().map_err(|_| not_a_number())?
        }
    };
    if !value.is_finite() || value < 0.0 {
        return Err(EstimateError::Parse(format!("{field} out of range: {value}")));
    }
    Ok(value)
}

/// Strips an optional markdown code fence around the JSON object.
fn unfence(content: &str) -> &str {
    let trimmed = content.trim();
    let Some(rest) = trimmed.strip_prefix("```") else {
        return trimmed;
    };
    let rest = rest.strip_prefix("json").unwrap_or(rest);
    rest.strip_suffix("```").unwrap_or(rest).trim()
}

/// Turns model output into an estimate named after the caller's description.
pub fn parse_estimate(description: &str, content: &str) -> Result<NutritionEstimate, EstimateError> {
    let raw: RawEstimate = serde_json::from_str(unfence(content))
        .map_err(|e| EstimateError::Parse(e.to_string()))?;
    Ok(NutritionEstimate {
        name: description.trim().to_string(),
        calories: amount("calorie", raw.calorie)?,
        carbohydrate: amount("carbohydrate", raw.carbohydrate)?,
        protein: amount("protein", raw.protein)?,
        fat: amount("fat", raw.fat)?,
    })
}
