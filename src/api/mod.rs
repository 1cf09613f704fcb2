//! API layer - HTTP handlers and routing
//!
//! This module contains all HTTP endpoints for the TechMan equipment
//! tracker. It includes:
//! - Auth API endpoints (login, logout, session check)
//! - Equipment API endpoints
//! - Comment API endpoints
//! - Embedded single-page client serving

pub mod auth;
pub mod comments;
pub mod equipment;
pub mod middleware;
pub mod responses;
pub mod static_files;

use axum::{
    http::{header, HeaderValue, Method},
    middleware as axum_middleware,
    Router,
};
use tower_http::{cors::CorsLayer, trace::TraceLayer};

pub use middleware::{ApiError, AppState};

/// Build the main API router
pub fn build_api_router(state: AppState) -> Router<AppState> {
    // Admin routes (catalog writes)
    let admin_routes = Router::new()
        .route("/equipamentos", axum::routing::post(equipment::create_equipment))
        .route("/equipamentos/{id}", axum::routing::put(equipment::update_equipment))
        .route("/equipamentos/{id}", axum::routing::delete(equipment::delete_equipment))
        // The last route_layer runs first: authentication before authorization
        .route_layer(axum_middleware::from_fn(middleware::require_admin))
        .route_layer(axum_middleware::from_fn_with_state(
            state.clone(),
            middleware::require_auth,
        ));

    // Protected routes (any authenticated profile)
    let protected_routes = Router::new()
        .route("/equipamentos", axum::routing::get(equipment::list_equipment))
        .route("/equipamentos/{id}", axum::routing::get(equipment::get_equipment))
        .nest("/comentarios", comments::router())
        .route_layer(axum_middleware::from_fn_with_state(
            state.clone(),
            middleware::require_auth,
        ));

    // Public routes
    Router::new()
        .nest("/auth", auth::router())
        .merge(admin_routes)
        .merge(protected_routes)
}

/// Build the complete router with middleware
pub fn build_router(state: AppState, cors_origin: &str) -> Router {
    // CORS must allow credentials for cookie authentication
    let cors = CorsLayer::new()
        .allow_origin(cors_origin.parse::<HeaderValue>().unwrap())
        .allow_methods([Method::GET, Method::POST, Method::PUT, Method::DELETE])
        .allow_headers([header::CONTENT_TYPE, header::AUTHORIZATION, header::COOKIE])
        .allow_credentials(true);

    Router::new()
        .nest("/api", build_api_router(state.clone()))
        // Anything outside /api is the embedded client
        .fallback(static_files::serve_static)
        .layer(cors)
        .layer(TraceLayer::new_for_http())
        .with_state(state)
}
