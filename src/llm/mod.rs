//! Free-text food description to nutrition estimate.

mod azure;
mod parse;

use async_trait::async_trait;
use serde::Serialize;
use thiserror::Error;

pub use azure::AzureOpenAiEstimator;
pub use parse::parse_estimate;

/// Structured estimate for one described food.
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct NutritionEstimate {
    pub name: String,
    pub calories: f64,
    pub carbohydrate: f64,
    pub protein: f64,
    pub fat: f64,
}

#[derive(Debug, Error)]
pub enum EstimateError {
    #[error("request to model failed: {0}")]
    Transport(String),
    #[error("model returned {status}: {body}")]
    Status { status: u16, body: String },
    #[error("unusable model output: {0}")]
    Parse(String),
}

#[async_trait]
pub trait NutritionEstimator: Send + Sync {
    async fn estimate(&self, description: &str) -> Result<NutritionEstimate, EstimateError>;
}

/// Returns the same macros for every description.
#[cfg(test)]
pub struct FixedEstimator {
    pub calories: f64,
    pub carbohydrate: f64,
    pub protein: f64,
    pub fat: f64,
}

#[cfg(test)]
#[async_trait]
impl NutritionEstimator for FixedEstimator {
    async fn estimate(&self, description: &str) -> Result<NutritionEstimate, EstimateError> {
        Ok(NutritionEstimate {
            name: description.trim().to_string(),
            calories: self.calories,
            carbohydrate: self.carbohydrate,
            protein: self.protein,
            fat: self.fat,
        })
    }
}
