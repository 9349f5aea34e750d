pub mod auth;
pub mod notes;
pub mod state;
pub mod middleware;

pub use state::AppState;
pub use middleware::Identity;

use axum::{
    extract::DefaultBodyLimit,
    middleware as axum_middleware,
    response::Html,
    routing::{get, post},
    Router,
};
use tower_http::{cors::CorsLayer, trace::TraceLayer};
use serde::Serialize;

use crate::views;

#[derive(Serialize)]
struct HealthResponse {
    status: String,
    version: String,
}

pub fn create_router(state: AppState) -> Router {
    // Every protected route goes through the same session guard, so a new
    // route cannot accidentally skip it
    let protected = Router::new()
        .route("/logout", post(auth::logout))
        .route("/notes/new", get(notes::new_note_form))
        .route("/notes", get(notes::list_notes).post(notes::create_note))
        .route(
            "/notes/:id",
            get(notes::show_note)
                .put(notes::update_note)
                .delete(notes::delete_note),
        )
        .route("/notes/:id/edit", get(notes::edit_note_form))
        .route("/notes/:id/delete", get(notes::confirm_delete))
        .route("/download", post(notes::download))
        .route_layer(axum_middleware::from_fn_with_state(
            state.clone(),
            middleware::require_auth,
        ));

    Router::new()
        .route("/health", get(health))
        .route("/home", get(home))
        .route("/register", get(auth::register_form).post(auth::register))
        .route("/login", get(auth::login_form).post(auth::login))
        .merge(protected)
        .layer(DefaultBodyLimit::max(state.config.max_upload_bytes))
        .layer(CorsLayer::permissive())
        .layer(TraceLayer::new_for_http())
        .with_state(state)
}

async fn health() -> axum::Json<HealthResponse> {
    axum::Json(HealthResponse {
        status: "healthy".to_string(),
        version: env!("CARGO_PKG_VERSION").to_string(),
    })
}

async fn home() -> Html<String> {
    Html(views::home())
}
