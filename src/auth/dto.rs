use serde::{Deserialize, Serialize};

use crate::auth::repo::User;
use crate::profile::{BodyProfile, Targets};

/// Request body for registration: credentials plus the body profile the
/// daily targets are computed from.
#[derive(Debug, Deserialize)]
pub struct RegisterRequest {
    pub id: String,
    #[serde(alias = "pw")]
    pub password: String,
    #[serde(flatten)]
    pub profile: BodyProfile,
}

#[derive(Debug, Deserialize)]
pub struct LoginRequest {
    pub id: String,
    #[serde(alias = "pw")]
    pub password: String,
}

#[derive(Debug, Deserialize)]
pub struct RefreshRequest {
    pub refresh_token: String,
}

/// Returned after register, login or refresh.
#[derive(Debug, Serialize)]
pub struct AuthResponse {
    pub access_token: String,
    pub refresh_token: String,
    pub user: PublicUser,
}

/// Public part of the user returned to the client.
#[derive(Debug, Serialize)]
pub struct PublicUser {
    pub id: String,
    pub body_weight: f64,
    pub height: f64,
    pub age: i32,
    pub gender: String,
    pub activity: i16,
    pub targets: Targets,
}

impl From<User> for PublicUser {
    fn from(u: User) -> Self {
        Self {
            targets: Targets {
                calories: u.rd_kcal,
                carbohydrate: u.rd_carbo,
                protein: u.rd_protein,
                fat: u.rd_fat,
            },
            id: u.id,
            body_weight: u.body_weight,
            height: u.height,
            age: u.age,
            gender: u.gender,
            activity: u.activity,
        }
    }
}
