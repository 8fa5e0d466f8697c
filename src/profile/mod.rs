//! Recommended daily intake derived from a body profile.
//!
//! Energy need is the Mifflin-St Jeor resting rate scaled by an activity
//! factor, then split 50/20/30 across carbohydrate, protein and fat.

use serde::{Deserialize, Serialize};
use thiserror::Error;

use crate::reports::percentages::round1;

const KCAL_PER_G_CARBO: f64 = 4.0;
const KCAL_PER_G_PROTEIN: f64 = 4.0;
const KCAL_PER_G_FAT: f64 = 9.0;

const CARBO_SHARE: f64 = 0.50;
const PROTEIN_SHARE: f64 = 0.20;
const FAT_SHARE: f64 = 0.30;

/// Activity factor for levels 1 (sedentary) through 5 (very active).
const ACTIVITY_FACTORS: [f64; 5] = [1.2, 1.375, 1.55, 1.725, 1.9];

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum Gender {
    #[serde(alias = "m", alias = "M", alias = "Male")]
    Male,
    #[serde(alias = "f", alias = "F", alias = "Female")]
    Female,
}

impl Gender {
    pub fn as_str(&self) -> &'static str {
        match self {
            Gender::Male => "male",
            Gender::Female => "female",
        }
    }
}

#[derive(Debug, Clone, Deserialize)]
pub struct BodyProfile {
    pub body_weight: f64, // kg
    pub height: f64,      // cm
    pub age: i32,
    pub gender: Gender,
    pub activity: u8,
}

/// Recommended daily intake.
#[derive(Debug, Clone, Copy, PartialEq, Serialize)]
pub struct Targets {
    pub calories: f64,
    pub carbohydrate: f64,
    pub protein: f64,
    pub fat: f64,
}

#[derive(Debug, Error, PartialEq)]
#[error("invalid profile: {0}")]
pub struct InvalidProfile(pub String);

pub fn compute_targets(p: &BodyProfile) -> Result<Targets, InvalidProfile> {
    if !(p.body_weight > 0.0) {
        return Err(InvalidProfile("body_weight must be positive".into()));
    }
    if !(p.height > 0.0) {
        return Err(InvalidProfile("height must be positive".into()));
    }
    if p.age <= 0 {
        return Err(InvalidProfile("age must be positive".into()));
    }
    let factor = usize::from(p.activity)
        .checked_sub(1)
        .and_then(|i| ACTIVITY_FACTORS.get(i))
        .ok_or_else(|| InvalidProfile(format!("activity must be 1..=5, got {}", p.activity)))?;

    let base = 10.0 * p.body_weight + 6.25 * p.height - 5.0 * f64::from(p.age);
    let bmr = match p.gender {
        Gender::Male => base + 5.0,
        Gender::Female => base - 161.0,
    };
    let kcal = (bmr * factor).max(0.0);

    Ok(Targets {
        calories: round1(kcal),
        carbohydrate: round1(kcal * CARBO_SHARE / KCAL_PER_G_CARBO),
        protein: round1(kcal * PROTEIN_SHARE / KCAL_PER_G_PROTEIN),
        fat: round1(kcal * FAT_SHARE / KCAL_PER_G_FAT),
    })
}
