use axum::{extract::State, routing::post, Json, Router};
use tracing::instrument;

use super::dto::{month_arg, year_arg, MonthlyRequest, QuarterlyRequest};
use super::monthly::{aggregate_month, MonthResult};
use super::quarterly::{aggregate_quarter, QuarterResult};
use crate::{
    auth::jwt::AuthUser,
    error::{ApiError, ApiJson},
    state::AppState,
};

pub fn report_routes() -> Router<AppState> {
    Router::new()
        .route("/reports/monthly", post(monthly_report))
        .route("/reports/quarterly", post(quarterly_report))
}

/// POST /reports/monthly { year, month, user_id } -> one entry per calendar day
#[instrument(skip(state))]
pub async fn monthly_report(
    State(state): State<AppState>,
    caller: AuthUser,
    ApiJson(body): ApiJson<MonthlyRequest>,
) -> Result<Json<MonthResult>, ApiError> {
    let year = year_arg(&body.year)?;
    let month = month_arg("month", &body.month)?;
    caller.require_owner(&body.user_id)?;

    let res = aggregate_month(state.store.as_ref(), &body.user_id, year, month).await?;
    Ok(Json(res))
}

/// POST /reports/quarterly { year, start_month, user_id } -> { "YYYY-MM": [...] } x3
#[instrument(skip(state))]
pub async fn quarterly_report(
    State(state): State<AppState>,
    caller: AuthUser,
    ApiJson(body): ApiJson<QuarterlyRequest>,
) -> Result<Json<QuarterResult>, ApiError> {
    let year = year_arg(&body.year)?;
    let start_month = month_arg("start_month", &body.start_month)?;
    caller.require_owner(&body.user_id)?;

    let res = aggregate_quarter(state.store.as_ref(), &body.user_id, year, start_month).await?;
    Ok(Json(res))
}

#[cfg(test)]
mod tests {
    use std::sync::Arc;

    use axum::{
        body::Body,
        extract::FromRef,
        http::{header, Request, StatusCode},
        Router,
    };
    use http_body_util::BodyExt;
    use serde_json::{json, Value};
    use time::macros::date;
    use tower::ServiceExt;

    use crate::auth::jwt::JwtKeys;
    use crate::foods::memory::MemoryStore;
    use crate::foods::model::{Macros, NewFood};
    use crate::foods::store::NutritionRecordStore;
    use crate::state::AppState;

    struct Harness {
        app: Router,
        token: String,
    }

    fn harness(store: Arc<MemoryStore>) -> Harness {
        let state = AppState::fake(store);
        let token = JwtKeys::from_ref(&state).sign_access("kim").unwrap();
        Harness {
            app: crate::app::build_app(state),
            token,
        }
    }

    impl Harness {
        async fn post(&self, uri: &str, body: Value) -> (StatusCode, Value) {
            let req = Request::builder()
                .method("POST")
                .uri(uri)
                .header(header::AUTHORIZATION, format!("Bearer {}", self.token))
                .header(header::CONTENT_TYPE, "application/json")
                .body(Body::from(body.to_string()))
                .unwrap();
            let res = self.app.clone().oneshot(req).await.unwrap();
            let status = res.status();
            let bytes = res.into_body().collect().await.unwrap().to_bytes();
            (status, serde_json::from_slice(&bytes).unwrap())
        }
    }

    #[tokio::test]
    async fn monthly_report_shapes_days() {
        let store = Arc::new(MemoryStore::new());
        store.set_targets(
            "kim",
            Macros {
                carbohydrate: 50.0,
                protein: 90.0,
                fat: 60.0,
            },
        );
        store
            .insert_food(
                "kim",
                date!(2024 - 02 - 03),
                &NewFood {
                    name: "gimbap".into(),
                    carbohydrate: 25.0,
                    protein: 45.0,
                    fat: 30.0,
                    calories: 550.0,
                },
            )
            .await
            .unwrap();
        let h = harness(store);

        let (status, body) = h
            .post(
                "/api/v1/reports/monthly",
                json!({"year": 2024, "month": "2", "user_id": "kim"}),
            )
            .await;
        assert_eq!(status, StatusCode::OK);
        let days = body.as_array().unwrap();
        assert_eq!(days.len(), 29);
        assert_eq!(days[0]["day"], 1);
        assert_eq!(days[0]["foods"], json!([]));
        assert!(days[0]["percentages"].is_null());
        assert_eq!(days[2]["foods"][0]["name"], "gimbap");
        assert_eq!(
            days[2]["percentages"],
            json!({"carbohydrate": 50.0, "protein": 50.0, "fat": 50.0})
        );
    }

    #[tokio::test]
    async fn monthly_report_rejects_bad_arguments() {
        let h = harness(Arc::new(MemoryStore::new()));
        for body in [
            json!({"year": 2024, "month": 13, "user_id": "kim"}),
            json!({"year": "next", "month": 1, "user_id": "kim"}),
            json!({"month": 1, "user_id": "kim"}),
        ] {
            let (status, res) = h.post("/api/v1/reports/monthly", body).await;
            assert_eq!(status, StatusCode::BAD_REQUEST);
            assert!(res["error"].is_string());
        }
    }

    #[tokio::test]
    async fn malformed_body_is_a_json_400() {
        let h = harness(Arc::new(MemoryStore::new()));
        let (status, res) = h
            .post("/api/v1/reports/monthly", json!({"year": 2024, "month": 1}))
            .await;
        assert_eq!(status, StatusCode::BAD_REQUEST);
        assert!(res["error"].as_str().unwrap().contains("user_id"));
    }

    #[tokio::test]
    async fn december_of_the_last_year_is_served() {
        let h = harness(Arc::new(MemoryStore::new()));
        let (status, body) = h
            .post(
                "/api/v1/reports/monthly",
                json!({"year": 9999, "month": 12, "user_id": "kim"}),
            )
            .await;
        assert_eq!(status, StatusCode::OK);
        assert_eq!(body.as_array().unwrap().len(), 31);
    }

    #[tokio::test]
    async fn quarterly_report_keys_by_month() {
        let h = harness(Arc::new(MemoryStore::new()));
        let (status, body) = h
            .post(
                "/api/v1/reports/quarterly",
                json!({"year": "2024", "startMonth": 12, "userId": "kim"}),
            )
            .await;
        assert_eq!(status, StatusCode::OK);
        let keys: Vec<&String> = body.as_object().unwrap().keys().collect();
        assert_eq!(keys, ["2024-11", "2024-12", "2025-01"]);
        assert_eq!(body["2025-01"].as_array().unwrap().len(), 31);
    }

    #[tokio::test]
    async fn quarterly_store_failure_is_500() {
        let store = Arc::new(MemoryStore::new());
        store.fail_month(2023, 12);
        let h = harness(store);
        let (status, body) = h
            .post(
                "/api/v1/reports/quarterly",
                json!({"year": 2024, "start_month": 1, "user_id": "kim"}),
            )
            .await;
        assert_eq!(status, StatusCode::INTERNAL_SERVER_ERROR);
        assert_eq!(body["error"], "internal error");
    }

    #[tokio::test]
    async fn other_users_reports_are_forbidden() {
        let h = harness(Arc::new(MemoryStore::new()));
        let (status, _) = h
            .post(
                "/api/v1/reports/monthly",
                json!({"year": 2024, "month": 1, "user_id": "lee"}),
            )
            .await;
        assert_eq!(status, StatusCode::FORBIDDEN);
    }
}
