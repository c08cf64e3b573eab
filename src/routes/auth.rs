use axum::{
    extract::{rejection::JsonRejection, Json, State},
    http::StatusCode,
    response::IntoResponse,
};

use super::json_body;
use crate::auth::model::{RegistrationRequest, SignInRequest, SignInResponse};
use crate::error::AppResult;
use crate::state::AppState;

pub async fn sign_in(
    State(state): State<AppState>,
    payload: Result<Json<SignInRequest>, JsonRejection>,
) -> AppResult<impl IntoResponse> {
    let payload = json_body(payload)?;
    let signed_in = state.auth.sign_in(&payload.email, &payload.password).await?;

    Ok((
        StatusCode::OK,
        Json(SignInResponse {
            access_token: signed_in.token,
            account: signed_in.account,
        }),
    ))
}

pub async fn register(
    State(state): State<AppState>,
    payload: Result<Json<RegistrationRequest>, JsonRejection>,
) -> AppResult<impl IntoResponse> {
    let payload = json_body(payload)?;
    let account = state.auth.register(payload).await?;

    Ok((StatusCode::CREATED, Json(account)))
}
