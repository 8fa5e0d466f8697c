use axum::{
    extract::{Query, State},
    http::StatusCode,
    routing::{get, post},
    Json, Router,
};
use time::OffsetDateTime;
use tracing::{info, instrument, warn};

use super::dto::{
    is_valid_description, CreateFoodRequest, DayDetail, DayQuery, DayTotalsView, UpdateFoodRequest,
};
use super::model::{FoodEntry, FoodKey, FoodSummary, NewFood};
use crate::{
    auth::jwt::AuthUser,
    error::{ApiError, ApiJson},
    reports::percentages::compute_percentages,
    state::AppState,
};

pub fn read_routes() -> Router<AppState> {
    Router::new().route("/foods/day", get(get_day))
}

pub fn write_routes() -> Router<AppState> {
    Router::new().route(
        "/foods",
        post(create_food).put(update_food).delete(delete_food),
    )
}

/// POST /foods { user_id, description, date? }
/// Looks the description up with the estimator and appends it to the day.
#[instrument(skip(state, body))]
pub async fn create_food(
    State(state): State<AppState>,
    caller: AuthUser,
    ApiJson(body): ApiJson<CreateFoodRequest>,
) -> Result<(StatusCode, Json<FoodEntry>), ApiError> {
    caller.require_owner(&body.user_id)?;
    let description = body.description.trim();
    if !is_valid_description(description) {
        return Err(ApiError::BadRequest(
            "description must be 1..=200 characters".into(),
        ));
    }

    let estimate = state.estimator.estimate(description).await?;
    let date = body.date.unwrap_or_else(|| OffsetDateTime::now_utc().date());
    let food = NewFood {
        name: estimate.name,
        carbohydrate: estimate.carbohydrate,
        protein: estimate.protein,
        fat: estimate.fat,
        calories: estimate.calories,
    };
    let entry = state.store.insert_food(&body.user_id, date, &food).await?;

    info!(user_id = %entry.user_id, date = %entry.date, index = entry.food_index, "food recorded");
    Ok((StatusCode::CREATED, Json(entry)))
}

/// PUT /foods { user_id, date, index, name?, carbohydrate?, protein?, fat?, calories? }
#[instrument(skip(state, body))]
pub async fn update_food(
    State(state): State<AppState>,
    caller: AuthUser,
    ApiJson(body): ApiJson<UpdateFoodRequest>,
) -> Result<Json<FoodEntry>, ApiError> {
    caller.require_owner(&body.key.user_id)?;
    body.validate().map_err(ApiError::BadRequest)?;

    let Some(entry) = state.store.update_food(&body.key, &body.patch).await? else {
        warn!(
            user_id = %body.key.user_id,
            date = %body.key.date,
            index = body.key.index,
            "update of missing food"
        );
        return Err(ApiError::NotFound("Food entry not found".into()));
    };
    Ok(Json(entry))
}

/// DELETE /foods { user_id, date, index }
/// Remaining entries keep their indexes.
#[instrument(skip(state))]
pub async fn delete_food(
    State(state): State<AppState>,
    caller: AuthUser,
    ApiJson(key): ApiJson<FoodKey>,
) -> Result<StatusCode, ApiError> {
    caller.require_owner(&key.user_id)?;
    if !state.store.delete_food(&key).await? {
        return Err(ApiError::NotFound("Food entry not found".into()));
    }
    info!(user_id = %key.user_id, date = %key.date, index = key.index, "food deleted");
    Ok(StatusCode::NO_CONTENT)
}

/// GET /foods/day?date=YYYY-MM-DD
#[instrument(skip(state))]
pub async fn get_day(
    State(state): State<AppState>,
    AuthUser(user_id): AuthUser,
    Query(q): Query<DayQuery>,
) -> Result<Json<DayDetail>, ApiError> {
    let entries = state.store.fetch_day_entries(&user_id, q.date).await?;
    let totals = state.store.fetch_daily_totals(&user_id, q.date).await?;
    if entries.is_empty() && totals.is_none() {
        return Err(ApiError::NotFound("No records for this day".into()));
    }

    Ok(Json(DayDetail {
        date: q.date,
        foods: entries.into_iter().map(FoodSummary::from).collect(),
        percentages: totals
            .as_ref()
            .map(|t| compute_percentages(&t.actual, &t.target)),
        totals: totals.as_ref().map(DayTotalsView::from),
    }))
}
