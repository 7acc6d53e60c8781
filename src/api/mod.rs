use axum::Json;
use axum::extract::{Path, State};
use axum::http::StatusCode;
use axum::routing::{get, post, put};
use axum::Router;

use crate::error::AppError;
use crate::models::{AddableResponse, CourseInfo, SetConfigRequest, WatchRequest};
use crate::state::AppState;

pub fn router(state: AppState) -> Router {
    Router::new()
        .route("/health", get(health))
        .route("/watches", post(add_watch).delete(remove_watch))
        .route("/watches/{user}", get(list_watches))
        .route("/courses/{crn}", get(course_info))
        .route("/courses/{crn}/addable", get(course_addable))
        .route("/config/{key}", put(set_config))
        .with_state(state)
}

async fn health(State(state): State<AppState>) -> Result<StatusCode, AppError> {
    state.store.ping().await?;
    Ok(StatusCode::OK)
}

/// Watch a course. The CRN must have a record for the configured term;
/// re-adding an existing watch is a benign no-op.
async fn add_watch(
    State(state): State<AppState>,
    Json(req): Json<WatchRequest>,
) -> Result<StatusCode, AppError> {
    if !state.registration.exists(&req.crn).await? {
        return Err(AppError::CourseNotFound(req.crn));
    }

    match state.store.add_watch(&req.user, &req.crn).await {
        Ok(()) => Ok(StatusCode::CREATED),
        Err(AppError::DuplicateWatch) => Ok(StatusCode::OK),
        Err(e) => Err(e),
    }
}

async fn remove_watch(
    State(state): State<AppState>,
    Json(req): Json<WatchRequest>,
) -> Result<StatusCode, AppError> {
    state.store.remove_watch(&req.user, &req.crn).await?;
    Ok(StatusCode::NO_CONTENT)
}

async fn list_watches(
    State(state): State<AppState>,
    Path(user): Path<String>,
) -> Result<Json<Vec<String>>, AppError> {
    let crns = state.store.courses_watched_by(&user).await?;
    Ok(Json(crns))
}

async fn course_info(
    State(state): State<AppState>,
    Path(crn): Path<String>,
) -> Result<Json<CourseInfo>, AppError> {
    let info = state
        .registration
        .fetch_info(&crn)
        .await?
        .ok_or(AppError::CourseNotFound(crn))?;
    Ok(Json(info))
}

async fn course_addable(
    State(state): State<AppState>,
    Path(crn): Path<String>,
) -> Result<Json<AddableResponse>, AppError> {
    let addable = state.registration.is_addable(&crn).await?;
    Ok(Json(AddableResponse { crn, addable }))
}

async fn set_config(
    State(state): State<AppState>,
    Path(key): Path<String>,
    Json(req): Json<SetConfigRequest>,
) -> Result<StatusCode, AppError> {
    state.store.set_config(&key, &req.value).await?;
    Ok(StatusCode::NO_CONTENT)
}
