use axum::{
    extract::rejection::JsonRejection,
    middleware,
    routing::{get, post},
    Json, Router,
};
use tower_http::cors::{Any, CorsLayer};
use tower_http::trace::TraceLayer;

mod auth;
mod health;
mod middleware_auth;
mod tasks;

pub use health::health;

use crate::error::{AppResult, ValidationError};
use crate::state::AppState;

/// Unwrap a JSON body, reporting decode failures as validation errors.
fn json_body<T>(payload: Result<Json<T>, JsonRejection>) -> AppResult<T> {
    match payload {
        Ok(Json(value)) => Ok(value),
        Err(rejection) => Err(ValidationError::InvalidBody(rejection.body_text()).into()),
    }
}

pub fn routes(state: AppState) -> Router<AppState> {
    let task_router = Router::new()
        .route("/tasks", post(tasks::create).get(tasks::list))
        .route(
            "/tasks/{id}",
            get(tasks::get).patch(tasks::update).delete(tasks::remove),
        )
        .route_layer(middleware::from_fn_with_state(
            state,
            middleware_auth::require_auth,
        ));

    Router::new()
        .route("/", get(root))
        .route("/health", get(health))
        .route("/auth", post(auth::sign_in))
        .route("/users", post(auth::register))
        .merge(task_router)
}

/// Full application: routes, state, CORS and request tracing.
pub fn create_app(state: AppState) -> Router {
    let cors = CorsLayer::new()
        .allow_origin(Any)
        .allow_methods(Any)
        .allow_headers(Any);

    routes(state.clone())
        .layer(TraceLayer::new_for_http())
        .layer(cors)
        .with_state(state)
}

async fn root() -> &'static str {
    "Task tracker API is running"
}
