//! Dashboard de gestión de flota
//!
//! API del tablero financiero, operativo y de control de calidad (cadena de
//! frío) de una flota de reparto, con acciones ejecutivas, agenda de
//! evaluaciones y autenticación contra un proveedor de identidad externo.

pub mod config;
pub mod dto;
pub mod middleware;
pub mod models;
pub mod presentation;
pub mod repositories;
pub mod routes;
pub mod services;
pub mod state;
pub mod utils;

use axum::{
    http::{StatusCode, Uri},
    middleware::from_fn_with_state,
    response::IntoResponse,
    Json, Router,
};
use std::time::Duration;
use tower_http::{timeout::TimeoutLayer, trace::TraceLayer};

use crate::dto::ApiResponse;
use crate::middleware::{cors_layer, require_session};
use crate::state::AppState;

pub const REQUEST_TIMEOUT: Duration = Duration::from_secs(30);

/// Router completo; las secciones del dashboard exigen sesión
pub fn create_app(state: AppState) -> Router {
    let session = from_fn_with_state(state.clone(), require_session);

    Router::new()
        .merge(routes::health_routes::create_health_router())
        .nest("/api/auth", routes::auth_routes::create_auth_router(state.clone()))
        .nest(
            "/api/dashboard",
            routes::dashboard_routes::create_dashboard_router().route_layer(session.clone()),
        )
        .nest(
            "/api/acciones",
            routes::action_routes::create_action_router().route_layer(session.clone()),
        )
        .nest(
            "/api/agenda",
            routes::agenda_routes::create_agenda_router().route_layer(session),
        )
        .fallback(not_found)
        .layer(TraceLayer::new_for_http())
        .layer(TimeoutLayer::new(REQUEST_TIMEOUT))
        .layer(cors_layer(&state.config.cors_origins))
        .with_state(state)
}

async fn not_found(uri: Uri) -> impl IntoResponse {
    log::debug!("🔍 Ruta no encontrada: {}", uri);
    (
        StatusCode::NOT_FOUND,
        Json(ApiResponse::error(format!("Ruta no encontrada: {}", uri.path()))),
    )
}
