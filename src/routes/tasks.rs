use axum::{
    extract::{
        rejection::{JsonRejection, PathRejection},
        Json, Path, State,
    },
    http::StatusCode,
    response::IntoResponse,
};

use super::json_body;
use crate::error::{AccessError, AppResult};
use crate::routes::middleware_auth::CurrentIdentity;
use crate::state::AppState;
use crate::tasks::model::{CreateTask, UpdateTask};

/// An id that is not a number names no task, so it gets the same answer as
/// any other task the caller cannot reach.
fn task_id(path: Result<Path<i64>, PathRejection>) -> AppResult<i64> {
    path.map(|Path(id)| id)
        .map_err(|_| AccessError::NoAccess.into())
}

pub async fn create(
    State(state): State<AppState>,
    CurrentIdentity(identity): CurrentIdentity,
    payload: Result<Json<CreateTask>, JsonRejection>,
) -> AppResult<impl IntoResponse> {
    let input = json_body(payload)?;
    let task = state.tasks.create(input, &identity.email).await?;
    Ok((StatusCode::CREATED, Json(task)))
}

pub async fn list(
    State(state): State<AppState>,
    CurrentIdentity(identity): CurrentIdentity,
) -> AppResult<impl IntoResponse> {
    let tasks = state.tasks.list(&identity.email).await?;
    Ok(Json(tasks))
}

pub async fn get(
    State(state): State<AppState>,
    CurrentIdentity(identity): CurrentIdentity,
    path: Result<Path<i64>, PathRejection>,
) -> AppResult<impl IntoResponse> {
    let id = task_id(path)?;
    let task = state.tasks.get_one(id, &identity.email).await?;
    Ok(Json(task))
}

pub async fn update(
    State(state): State<AppState>,
    CurrentIdentity(identity): CurrentIdentity,
    path: Result<Path<i64>, PathRejection>,
    payload: Result<Json<UpdateTask>, JsonRejection>,
) -> AppResult<impl IntoResponse> {
    let id = task_id(path)?;
    let patch = json_body(payload)?;
    let task = state.tasks.update(id, patch, &identity.email).await?;
    Ok(Json(task))
}

pub async fn remove(
    State(state): State<AppState>,
    CurrentIdentity(identity): CurrentIdentity,
    path: Result<Path<i64>, PathRejection>,
) -> AppResult<impl IntoResponse> {
    let id = task_id(path)?;
    let task = state.tasks.remove(id, &identity.email).await?;
    Ok(Json(task))
}
