//! Middleware de sesión
//!
//! Protege las rutas del dashboard: exige un JWT de sesión válido cuyo `sid`
//! siga activo en el estado. Sin sesión se responde 401 con `redirect_to`
//! hacia el login.

use axum::{
    extract::{Request, State},
    http::header,
    middleware::Next,
    response::Response,
};

use crate::state::AppState;
use crate::utils::errors::AppError;
use crate::utils::jwt::{extract_token_from_header, verify_token, JwtClaims};

/// Middleware de autenticación para rutas protegidas
pub async fn require_session(
    State(state): State<AppState>,
    mut request: Request,
    next: Next,
) -> Result<Response, AppError> {
    let auth_header = request
        .headers()
        .get(header::AUTHORIZATION)
        .and_then(|value| value.to_str().ok())
        .ok_or_else(|| AppError::Unauthorized("Sesión requerida".to_string()))?;

    let token = extract_token_from_header(auth_header)?;
    let claims = verify_token(token, &state.jwt_config())?;

    // Un logout revoca el sid aunque el token no haya expirado
    if state.get_session(&claims.sid).await.is_none() {
        log::warn!("🚫 Sesión {} no activa para {}", claims.sid, claims.email);
        return Err(AppError::Unauthorized("Sesión expirada o cerrada".to_string()));
    }

    request.extensions_mut().insert::<JwtClaims>(claims);
    Ok(next.run(request).await)
}
