use axum::{
    routing::{delete, get, post, put},
    Json, Router,
};
use tower_http::{
    cors::CorsLayer,
    trace::{DefaultMakeSpan, DefaultOnFailure, DefaultOnRequest, DefaultOnResponse, TraceLayer},
};
use tracing::Level;
use utoipa::OpenApi;
use utoipa_swagger_ui::SwaggerUi;

use common::types::Health;

use crate::session::ServerState;

pub mod apikey;
pub mod auth;
pub mod bookmarks;
pub mod bridge;
pub mod folders;
pub mod metadata;
pub mod public;

#[utoipa::path(get, path = "/health", tag = "health", responses((status = 200, description = "Service is up")))]
pub async fn health() -> Json<Health> {
    Json(Health { status: "ok" })
}

/// Build the full application router: public, auth, protected API,
/// shared-folder views, the tool bridge and the swagger UI.
pub fn build_router(cors: CorsLayer, state: ServerState) -> Router {
    let auth_routes = Router::new()
        .route("/auth/register", post(auth::register))
        .route("/auth/login", post(auth::login))
        .route("/auth/logout", post(auth::logout))
        .route("/auth/me", get(auth::me));

    // Every handler here takes CurrentUser, so the cookie is checked before
    // any service call.
    let api = Router::new()
        .route("/api/folders", get(folders::list).post(folders::create))
        .route("/api/folders/:id", axum::routing::patch(folders::update).delete(folders::remove))
        .route("/api/folders/:id/share", put(folders::share))
        .route("/api/folders/:id/bookmarks", get(bookmarks::list))
        .route("/api/bookmarks", post(bookmarks::create))
        .route("/api/bookmarks/search", get(bookmarks::search))
        .route("/api/bookmarks/:id", delete(bookmarks::remove))
        .route("/api/bookmarks/:id/move", put(bookmarks::move_to_folder))
        .route(
            "/api/api-key",
            get(apikey::get_key).post(apikey::create_key).delete(apikey::remove_key),
        )
        .route("/api/api-key/regenerate", post(apikey::regenerate_key))
        .route("/api/metadata", get(metadata::fetch));

    let public_routes = Router::new()
        .route("/health", get(health))
        .route("/public/folders/:id", get(public::get_folder))
        .route("/public/folders/:id/bookmarks", get(public::get_folder_bookmarks))
        .route("/mcp", post(bridge::dispatch));

    public_routes
        .merge(auth_routes)
        .merge(api)
        .merge(SwaggerUi::new("/docs").url("/api-docs/openapi.json", crate::openapi::ApiDoc::openapi()))
        .with_state(state)
        .layer(cors)
        .layer(
            TraceLayer::new_for_http()
                .make_span_with(DefaultMakeSpan::new().level(Level::INFO).include_headers(false))
                .on_request(DefaultOnRequest::new().level(Level::INFO))
                .on_response(DefaultOnResponse::new().level(Level::INFO).include_headers(false))
                .on_failure(DefaultOnFailure::new().level(Level::ERROR)),
        )
}
