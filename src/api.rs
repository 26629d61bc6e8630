use std::sync::Arc;

use axum::extract::{Path, Query, State};
use axum::http::StatusCode;
use axum::response::{IntoResponse, Response};
use axum::routing::{delete, get, post};
use axum::{Json, Router};
use chrono::{NaiveDate, Utc};
use serde::{Deserialize, Serialize};
use serde_json::json;
use validator::{Validate, ValidationErrors};

use crate::catalog::DieselCatalog;
use crate::config::SchedulerConfig;
use crate::error::SchedulerError;
use crate::evaluator::ReviewSignal;
use crate::service::{DueList, ReviewResult, ReviewStats, SchedulingService};
use crate::store::{DbPool, DieselScheduleStore};

type Service = SchedulingService<DieselScheduleStore, DieselCatalog>;

/// One service instance per scheduling track, sharing the pool.
pub struct AppState {
    pub flashcards: Service,
    pub drill: Service,
}

impl AppState {
    pub fn new(pool: DbPool) -> Self {
        AppState {
            flashcards: SchedulingService::new(
                DieselScheduleStore::new(pool.clone(), SchedulerConfig::graded().track),
                DieselCatalog::new(pool.clone()),
                SchedulerConfig::graded(),
            ),
            drill: SchedulingService::new(
                DieselScheduleStore::new(pool.clone(), SchedulerConfig::binary().track),
                DieselCatalog::new(pool),
                SchedulerConfig::binary(),
            ),
        }
    }
}

impl IntoResponse for SchedulerError {
    fn into_response(self) -> Response {
        let status = match &self {
            SchedulerError::Validation(_) => StatusCode::BAD_REQUEST,
            SchedulerError::NotFound { .. } | SchedulerError::ItemNotFound(_) => {
                StatusCode::NOT_FOUND
            }
            SchedulerError::Store(e) => {
                log::error!("store failure: {e}");
                StatusCode::INTERNAL_SERVER_ERROR
            }
        };

        let body = json!({
            "error": self.to_string(),
            "status": status.as_u16()
        });

        (status, Json(body)).into_response()
    }
}

impl From<ValidationErrors> for SchedulerError {
    fn from(err: ValidationErrors) -> Self {
        SchedulerError::Validation(err.to_string())
    }
}

#[derive(Serialize)]
pub struct ApiResponse {
    pub success: bool,
    pub message: String,
}

#[derive(Debug, Deserialize, Validate)]
pub struct TrackForm {
    #[validate(range(min = 1))]
    pub item_id: i32,
}

#[derive(Debug, Deserialize, Validate)]
pub struct GradedReviewForm {
    #[validate(range(min = 1))]
    pub item_id: i32,
    #[validate(range(max = 5))]
    pub quality: u8,
}

#[derive(Debug, Clone, Copy, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum DrillOutcome {
    Remembered,
    Forgot,
}

#[derive(Debug, Deserialize, Validate)]
pub struct DrillReviewForm {
    #[validate(range(min = 1))]
    pub item_id: i32,
    pub outcome: DrillOutcome,
}

#[derive(Debug, Deserialize)]
pub struct AsOfQuery {
    pub as_of: Option<NaiveDate>,
}

impl AsOfQuery {
    fn resolve(&self) -> NaiveDate {
        self.as_of.unwrap_or_else(|| Utc::now().date_naive())
    }
}

fn review_response(result: ReviewResult) -> Json<serde_json::Value> {
    match result {
        ReviewResult::Updated(record) => Json(json!({ "record": record })),
        ReviewResult::Mastered => Json(json!({ "mastered": true })),
        ReviewResult::NotTracked => Json(json!({ "tracked": false })),
    }
}

pub fn api_router(state: Arc<AppState>) -> Router {
    let flashcards = Router::new()
        .route("/{user_id}/track", post(track_flashcard))
        .route("/{user_id}/review", post(review_flashcard))
        .route("/{user_id}/due", get(flashcard_due))
        .route("/{user_id}/stats", get(flashcard_stats))
        .route("/{user_id}/items/{item_id}", delete(remove_flashcard));

    let drill = Router::new()
        .route("/{user_id}/review", post(review_drill))
        .route("/{user_id}/due", get(drill_due))
        .route("/{user_id}/stats", get(drill_stats))
        .route("/{user_id}/items/{item_id}", delete(remove_drill));

    Router::new()
        .nest("/flashcards", flashcards)
        .nest("/drill", drill)
        .with_state(state)
}

async fn track_flashcard(
    State(state): State<Arc<AppState>>,
    Path(user_id): Path<i32>,
    Json(form): Json<TrackForm>,
) -> Result<Json<serde_json::Value>, SchedulerError> {
    form.validate()?;
    let record = state.flashcards.track_item(user_id, form.item_id)?;
    Ok(Json(json!({ "record": record })))
}

async fn review_flashcard(
    State(state): State<Arc<AppState>>,
    Path(user_id): Path<i32>,
    Json(form): Json<GradedReviewForm>,
) -> Result<Json<serde_json::Value>, SchedulerError> {
    form.validate()?;
    let result =
        state
            .flashcards
            .register_success(user_id, form.item_id, ReviewSignal::Quality(form.quality))?;
    Ok(review_response(result))
}

async fn review_drill(
    State(state): State<Arc<AppState>>,
    Path(user_id): Path<i32>,
    Json(form): Json<DrillReviewForm>,
) -> Result<Json<serde_json::Value>, SchedulerError> {
    form.validate()?;
    let result = match form.outcome {
        DrillOutcome::Forgot => {
            ReviewResult::Updated(state.drill.register_failure(user_id, form.item_id)?)
        }
        DrillOutcome::Remembered => {
            state
                .drill
                .register_success(user_id, form.item_id, ReviewSignal::Remembered)?
        }
    };
    Ok(review_response(result))
}

async fn flashcard_due(
    State(state): State<Arc<AppState>>,
    Path(user_id): Path<i32>,
    Query(query): Query<AsOfQuery>,
) -> Result<Json<DueList>, SchedulerError> {
    Ok(Json(state.flashcards.get_due(user_id, query.resolve())?))
}

async fn drill_due(
    State(state): State<Arc<AppState>>,
    Path(user_id): Path<i32>,
    Query(query): Query<AsOfQuery>,
) -> Result<Json<DueList>, SchedulerError> {
    Ok(Json(state.drill.get_due(user_id, query.resolve())?))
}

async fn flashcard_stats(
    State(state): State<Arc<AppState>>,
    Path(user_id): Path<i32>,
    Query(query): Query<AsOfQuery>,
) -> Result<Json<ReviewStats>, SchedulerError> {
    Ok(Json(state.flashcards.get_stats(user_id, query.resolve())?))
}

async fn drill_stats(
    State(state): State<Arc<AppState>>,
    Path(user_id): Path<i32>,
    Query(query): Query<AsOfQuery>,
) -> Result<Json<ReviewStats>, SchedulerError> {
    Ok(Json(state.drill.get_stats(user_id, query.resolve())?))
}

async fn remove_flashcard(
    State(state): State<Arc<AppState>>,
    Path((user_id, item_id)): Path<(i32, i32)>,
) -> Result<Json<ApiResponse>, SchedulerError> {
    state.flashcards.remove(user_id, item_id)?;
    Ok(Json(ApiResponse {
        success: true,
        message: "Item removed from review".to_string(),
    }))
}

async fn remove_drill(
    State(state): State<Arc<AppState>>,
    Path((user_id, item_id)): Path<(i32, i32)>,
) -> Result<Json<ApiResponse>, SchedulerError> {
    state.drill.remove(user_id, item_id)?;
    Ok(Json(ApiResponse {
        success: true,
        message: "Item removed from review".to_string(),
    }))
}
