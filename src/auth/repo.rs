use serde::{Deserialize, Serialize};
use sqlx::{FromRow, PgPool};
use time::OffsetDateTime;

use crate::profile::{BodyProfile, Targets};

/// User record in the database.
#[derive(Debug, Clone, Serialize, Deserialize, FromRow)]
pub struct User {
    pub id: String, // login id
    #[serde(skip_serializing)]
    pub password_hash: String, // Argon2 hash, not exposed in JSON
    pub body_weight: f64,
    pub height: f64,
    pub age: i32,
    pub gender: String,
    pub activity: i16,
    pub rd_kcal: f64,
    pub rd_carbo: f64,
    pub rd_protein: f64,
    pub rd_fat: f64,
    pub created_at: OffsetDateTime,
}

const USER_COLUMNS: &str = "id, password_hash, body_weight, height, age, gender, activity, \
                            rd_kcal, rd_carbo, rd_protein, rd_fat, created_at";

impl User {
    /// Find a user by login id.
    pub async fn find_by_id(db: &PgPool, id: &str) -> anyhow::Result<Option<User>> {
        let user = sqlx::query_as::<_, User>(&format!(
            "SELECT {USER_COLUMNS} FROM users WHERE id = $1"
        ))
        .bind(id)
        .fetch_optional(db)
        .await?;
        Ok(user)
    }

    /// Create a new user. Returns `None` when the id is already taken.
    pub async fn create(
        db: &PgPool,
        id: &str,
        password_hash: &str,
        profile: &BodyProfile,
        targets: &Targets,
    ) -> anyhow::Result<Option<User>> {
        let user = sqlx::query_as::<_, User>(&format!(
            r#"
            INSERT INTO users (id, password_hash, body_weight, height, age, gender, activity,
                               rd_kcal, rd_carbo, rd_protein, rd_fat)
            VALUES ($1, $2, $3, $4, $5, $6, $7, $8, $9, $10, $11)
            ON CONFLICT (id) DO NOTHING
            RETURNING {USER_COLUMNS}
            "#
        ))
        .bind(id)
        .bind(password_hash)
        .bind(profile.body_weight)
        .bind(profile.height)
        .bind(profile.age)
        .bind(profile.gender.as_str())
        .bind(i16::from(profile.activity))
        .bind(targets.calories)
        .bind(targets.carbohydrate)
        .bind(targets.protein)
        .bind(targets.fat)
        .fetch_optional(db)
        .await?;
        Ok(user)
    }
}
