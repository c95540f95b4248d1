//! Modelos de autenticación
//!
//! Los fallos del proveedor de identidad no son errores HTTP: se convierten en
//! una notificación visible para el usuario y el formulario sigue editable.

use serde::{Deserialize, Serialize};
use std::str::FromStr;
use thiserror::Error;

use crate::utils::errors::{validation_error, AppError};

/// Ruta a la que se envía al usuario tras iniciar sesión
pub const DASHBOARD_HOME: &str = "/dashboard/financiero";
/// Ruta de login; destino de las sesiones inválidas y del registro exitoso
pub const LOGIN_PATH: &str = "/login";

/// Usuario devuelto por el proveedor de identidad
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq)]
pub struct IdentityUser {
    pub id: String,
    pub email: String,
    #[serde(default = "default_role")]
    pub role: String,
}

fn default_role() -> String {
    "authenticated".to_string()
}

/// Sesión abierta en el proveedor de identidad
#[derive(Debug, Clone)]
pub struct IdentitySession {
    pub access_token: String,
    pub user: IdentityUser,
}

/// Metadatos de registro enviados al proveedor
#[derive(Debug, Clone, Serialize)]
pub struct SignUpMetadata {
    pub nombre: String,
    pub apellido: String,
}

/// Error del proveedor de identidad; `Display` es el mensaje para el usuario
#[derive(Error, Debug, Clone, PartialEq)]
pub enum IdentityError {
    /// Rechazo del proveedor; el mensaje se muestra tal cual
    #[error("{0}")]
    Rejected(String),

    /// El correo ya tiene una cuenta
    #[error("Este correo electrónico ya está registrado")]
    AlreadyRegistered(String),

    #[error("El servicio de autenticación no respondió a tiempo")]
    Timeout,

    #[error("{0}")]
    Unavailable(String),
}

impl IdentityError {
    /// Fallas de red o del proveedor; no dependen de lo que envió el usuario
    pub fn is_infrastructure(&self) -> bool {
        matches!(self, IdentityError::Timeout | IdentityError::Unavailable(_))
    }
}

/// Proveedores OAuth soportados
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum OAuthProvider {
    Google,
    Facebook,
}

impl OAuthProvider {
    pub fn as_str(&self) -> &'static str {
        match self {
            OAuthProvider::Google => "google",
            OAuthProvider::Facebook => "facebook",
        }
    }
}

impl FromStr for OAuthProvider {
    type Err = AppError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s.trim().to_lowercase().as_str() {
            "google" => Ok(OAuthProvider::Google),
            "facebook" => Ok(OAuthProvider::Facebook),
            _ => Err(validation_error("provider", "Proveedor OAuth no soportado")),
        }
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum NotificationKind {
    Success,
    Error,
    Info,
}

/// Notificación (toast) para el usuario
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq)]
pub struct Notification {
    pub kind: NotificationKind,
    pub message: String,
}

impl Notification {
    pub fn success(message: impl Into<String>) -> Self {
        Self {
            kind: NotificationKind::Success,
            message: message.into(),
        }
    }

    pub fn error(message: impl Into<String>) -> Self {
        Self {
            kind: NotificationKind::Error,
            message: message.into(),
        }
    }

    pub fn info(message: impl Into<String>) -> Self {
        Self {
            kind: NotificationKind::Info,
            message: message.into(),
        }
    }
}

/// Usuario de la sesión local
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq)]
pub struct SessionUser {
    pub id: String,
    pub email: String,
    pub role: String,
}

/// Sesión local emitida tras un login exitoso
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct SessionInfo {
    pub token: String,
    pub token_type: String,
    pub expires_in: u64,
    pub user: SessionUser,
}

/// Motivo de un resultado fallido
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum AuthFailure {
    /// El formulario no pasó la validación local
    InvalidInput,
    /// El proveedor rechazó la operación
    Rejected,
}

/// Resultado de una operación de autenticación
#[derive(Debug, Clone, Serialize)]
pub struct AuthOutcome {
    pub success: bool,
    pub notification: Notification,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub redirect_to: Option<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub session: Option<SessionInfo>,
    #[serde(skip)]
    pub failure: Option<AuthFailure>,
}

impl AuthOutcome {
    pub fn failure(message: impl Into<String>) -> Self {
        Self {
            success: false,
            notification: Notification::error(message),
            redirect_to: None,
            session: None,
            failure: Some(AuthFailure::Rejected),
        }
    }

    pub fn invalid(message: impl Into<String>) -> Self {
        Self {
            failure: Some(AuthFailure::InvalidInput),
            ..Self::failure(message)
        }
    }

    pub fn redirect(notification: Notification, to: &str) -> Self {
        Self {
            success: true,
            notification,
            redirect_to: Some(to.to_string()),
            session: None,
            failure: None,
        }
    }

    pub fn with_session(mut self, session: SessionInfo) -> Self {
        self.session = Some(session);
        self
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_identity_error_messages() {
        let rejected = IdentityError::Rejected("Invalid login credentials".to_string());
        assert_eq!(rejected.to_string(), "Invalid login credentials");
        assert!(!rejected.is_infrastructure());

        let duplicate = IdentityError::AlreadyRegistered("User already registered".to_string());
        assert_eq!(duplicate.to_string(), "Este correo electrónico ya está registrado");

        assert!(IdentityError::Timeout.is_infrastructure());
        assert!(IdentityError::Unavailable("caído".to_string()).is_infrastructure());
    }
}
