pub mod auth;
pub mod db;
pub mod error;
pub mod fmt;
pub mod forms;
pub mod handlers;
pub mod models;
pub mod polls;
pub mod state;

use axum::routing::{get, post};
use axum::{Json, Router};
use sqlx::SqlitePool;
use tower_http::trace::TraceLayer;

use state::AppState;

async fn root() -> Json<serde_json::Value> {
    Json(serde_json::json!({
        "service": "zlot",
        "apps": ["events", "polls"],
    }))
}

pub fn app(pool: SqlitePool) -> Router {
    Router::new()
        .route("/", get(root))
        .route("/login", get(auth::login_form).post(auth::login))
        .route("/logout", post(auth::logout))
        .route("/events", get(handlers::list_events))
        .route(
            "/events/new",
            get(handlers::new_event_form).post(handlers::create_event),
        )
        .route("/events/{id}", get(handlers::event_detail))
        .route("/events/{id}/vote", post(handlers::vote))
        .route("/events/{id}/delete", post(handlers::delete_event))
        .route(
            "/profile",
            get(handlers::profile_view).post(handlers::profile_update),
        )
        .route("/polls", get(polls::list_questions))
        .route(
            "/polls/comments",
            get(polls::comment_form).post(polls::submit_comment),
        )
        .route("/polls/comments/list", get(polls::comment_list))
        .route("/polls/{id}", get(polls::question_detail))
        .route("/polls/{id}/results", get(polls::question_results))
        .route("/polls/{id}/vote", post(polls::vote))
        .layer(TraceLayer::new_for_http())
        .with_state(AppState { pool })
}
