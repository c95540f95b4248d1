use axum::{
    extract::{
        rejection::{JsonRejection, QueryRejection},
        Path, Query, State,
    },
    http::StatusCode,
    middleware::from_fn_with_state,
    routing::{get, post},
    Extension, Json, Router,
};

use crate::dto::auth_dto::{LoginRequest, OAuthQuery, OAuthUrlResponse, RegisterRequest};
use crate::middleware::require_session;
use crate::models::auth::{AuthFailure, AuthOutcome, OAuthProvider};
use crate::services::AuthService;
use crate::state::AppState;
use crate::utils::errors::AppError;
use crate::utils::jwt::JwtClaims;

/// Login, registro y OAuth son públicos; logout requiere sesión
pub fn create_auth_router(state: AppState) -> Router<AppState> {
    Router::new()
        .route("/login", post(login))
        .route("/register", post(register))
        .route("/oauth/:provider", get(oauth_url))
        .route(
            "/logout",
            post(logout).route_layer(from_fn_with_state(state, require_session)),
        )
}

/// Un rechazo del proveedor no es un error del servidor: se devuelve la
/// notificación con el código que corresponde y el formulario sigue editable.
/// Un formulario inválido siempre es 400.
fn outcome_response(outcome: AuthOutcome, rejected_status: StatusCode) -> (StatusCode, Json<AuthOutcome>) {
    let status = match outcome.failure {
        None => StatusCode::OK,
        Some(AuthFailure::InvalidInput) => StatusCode::BAD_REQUEST,
        Some(AuthFailure::Rejected) => rejected_status,
    };
    (status, Json(outcome))
}

async fn login(
    State(state): State<AppState>,
    request: Result<Json<LoginRequest>, JsonRejection>,
) -> Result<(StatusCode, Json<AuthOutcome>), AppError> {
    let Json(request) = request?;
    let outcome = AuthService::new(&state).login(request).await?;
    Ok(outcome_response(outcome, StatusCode::UNAUTHORIZED))
}

async fn register(
    State(state): State<AppState>,
    request: Result<Json<RegisterRequest>, JsonRejection>,
) -> Result<(StatusCode, Json<AuthOutcome>), AppError> {
    let Json(request) = request?;
    let outcome = AuthService::new(&state).register(request).await?;
    Ok(outcome_response(outcome, StatusCode::BAD_REQUEST))
}

async fn oauth_url(
    State(state): State<AppState>,
    Path(provider): Path<String>,
    query: Result<Query<OAuthQuery>, QueryRejection>,
) -> Result<Json<OAuthUrlResponse>, AppError> {
    let Query(query) = query?;
    let provider: OAuthProvider = provider.parse()?;
    Ok(Json(
        AuthService::new(&state).oauth_url(provider, query.redirect_to.as_deref()),
    ))
}

async fn logout(
    State(state): State<AppState>,
    Extension(claims): Extension<JwtClaims>,
) -> Json<AuthOutcome> {
    Json(AuthService::new(&state).logout(&claims).await)
}
