//! Servicio de autenticación
//!
//! Envuelve al proveedor de identidad. Los rechazos del proveedor se
//! devuelven como `AuthOutcome` fallido con su mensaje; un timeout o una
//! caída del proveedor y los errores internos salen como `AppError`.

use chrono::Utc;
use std::sync::Arc;
use uuid::Uuid;
use validator::{Validate, ValidationErrors};

use crate::dto::auth_dto::{LoginRequest, OAuthUrlResponse, RegisterRequest};
use crate::models::auth::{
    AuthOutcome, Notification, OAuthProvider, SessionInfo, SessionUser, SignUpMetadata,
    DASHBOARD_HOME, LOGIN_PATH,
};
use crate::services::identity_service::IdentityProvider;
use crate::state::{ActiveSession, AppState};
use crate::utils::errors::AppResult;
use crate::utils::jwt::{generate_token, JwtClaims, JwtConfig};

pub const MIN_PASSWORD_LENGTH: usize = 6;

/// Primer mensaje de validación, en orden de campo
fn first_message(errors: &ValidationErrors) -> String {
    let mut fields: Vec<_> = errors.field_errors().into_iter().collect();
    fields.sort_by_key(|(field, _)| *field);
    fields
        .into_iter()
        .flat_map(|(_, errs)| errs.iter())
        .find_map(|e| e.message.as_ref().map(|m| m.to_string()))
        .unwrap_or_else(|| "Datos inválidos".to_string())
}

pub struct AuthService {
    state: AppState,
    identity: Arc<dyn IdentityProvider>,
    jwt: JwtConfig,
}

impl AuthService {
    pub fn new(state: &AppState) -> Self {
        Self {
            identity: state.identity.clone(),
            jwt: state.jwt_config(),
            state: state.clone(),
        }
    }

    pub async fn login(&self, request: LoginRequest) -> AppResult<AuthOutcome> {
        if let Err(errors) = request.validate() {
            return Ok(AuthOutcome::invalid(first_message(&errors)));
        }

        log::info!("🔐 Intento de inicio de sesión: {}", request.email);

        let session = match self.identity.sign_in(&request.email, &request.password).await {
            Ok(session) => session,
            Err(error) if error.is_infrastructure() => return Err(error.into()),
            Err(error) => {
                log::warn!("❌ Inicio de sesión rechazado para {}: {:?}", request.email, error);
                return Ok(AuthOutcome::failure(error.to_string()));
            }
        };

        let session_id = Uuid::new_v4();
        let expires_at = self.jwt.expires_at(Utc::now());
        let token = generate_token(
            &session.user.id,
            session_id,
            &session.user.email,
            &session.user.role,
            &self.jwt,
        )?;

        self.state
            .store_session(
                session_id.to_string(),
                ActiveSession::new(
                    session.user.id.clone(),
                    session.user.email.clone(),
                    session.access_token,
                    expires_at,
                ),
            )
            .await;

        log::info!("✅ Inicio de sesión exitoso: {}", session.user.email);

        Ok(AuthOutcome::redirect(Notification::success("Inicio de sesión exitoso"), DASHBOARD_HOME)
            .with_session(SessionInfo {
                token,
                token_type: "Bearer".to_string(),
                expires_in: self.jwt.expiration,
                user: SessionUser {
                    id: session.user.id,
                    email: session.user.email,
                    role: session.user.role,
                },
            }))
    }

    pub async fn register(&self, request: RegisterRequest) -> AppResult<AuthOutcome> {
        if request.password != request.confirm_password {
            return Ok(AuthOutcome::invalid("Las contraseñas no coinciden"));
        }

        if request.password.chars().count() < MIN_PASSWORD_LENGTH {
            return Ok(AuthOutcome::invalid(
                "La contraseña debe tener al menos 6 caracteres",
            ));
        }

        if let Err(errors) = request.validate() {
            return Ok(AuthOutcome::invalid(first_message(&errors)));
        }

        log::info!("📝 Registro solicitado: {}", request.email);

        let metadata = SignUpMetadata {
            nombre: request.nombre.trim().to_string(),
            apellido: request.apellido.trim().to_string(),
        };

        match self.identity.sign_up(&request.email, &request.password, &metadata).await {
            Ok(user) => {
                log::info!("✅ Usuario registrado: {}", user.email);
                Ok(AuthOutcome::redirect(
                    Notification::success(
                        "Registro exitoso. Por favor verifica tu correo electrónico para completar el registro.",
                    ),
                    LOGIN_PATH,
                ))
            }
            Err(error) if error.is_infrastructure() => Err(error.into()),
            Err(error) => {
                log::warn!("❌ Registro rechazado para {}: {:?}", request.email, error);
                Ok(AuthOutcome::failure(error.to_string()))
            }
        }
    }

    pub fn oauth_url(&self, provider: OAuthProvider, redirect_to: Option<&str>) -> OAuthUrlResponse {
        let redirect = redirect_to.unwrap_or(&self.state.config.oauth_redirect_url);
        OAuthUrlResponse {
            provider: provider.as_str().to_string(),
            url: self.identity.oauth_url(provider, redirect),
        }
    }

    /// Revoca la sesión local; el cierre remoto es de mejor esfuerzo
    pub async fn logout(&self, claims: &JwtClaims) -> AuthOutcome {
        if let Some(session) = self.state.revoke_session(&claims.sid).await {
            if let Err(error) = self.identity.sign_out(&session.provider_token).await {
                log::warn!("⚠️ Cierre remoto de sesión falló para {}: {:?}", session.email, error);
            }
        }

        AuthOutcome::redirect(Notification::info("Sesión cerrada"), LOGIN_PATH)
    }
}
