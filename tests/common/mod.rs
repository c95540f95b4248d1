#![allow(dead_code)]

use async_trait::async_trait;
use axum::body::{to_bytes, Body};
use axum::http::{header, Method, Request, StatusCode};
use axum::Router;
use chrono::NaiveDate;
use serde_json::{json, Value};
use std::sync::Arc;
use tower::ServiceExt;

use flota_dashboard::config::environment::EnvironmentConfig;
use flota_dashboard::create_app;
use flota_dashboard::models::auth::{
    IdentityError, IdentitySession, IdentityUser, OAuthProvider, SignUpMetadata,
};
use flota_dashboard::repositories::MockFleetRepository;
use flota_dashboard::services::IdentityProvider;
use flota_dashboard::state::AppState;

pub const VALID_PASSWORD: &str = "secreto123";
pub const TAKEN_EMAIL: &str = "existente@flota.mx";
/// Correo con el que el proveedor no responde a tiempo
pub const SLOW_EMAIL: &str = "lento@flota.mx";

/// Proveedor de identidad en memoria
pub struct StubIdentity;

#[async_trait]
impl IdentityProvider for StubIdentity {
    async fn sign_in(&self, email: &str, password: &str) -> Result<IdentitySession, IdentityError> {
        if email == SLOW_EMAIL {
            return Err(IdentityError::Timeout);
        }
        if password != VALID_PASSWORD {
            return Err(IdentityError::Rejected("Invalid login credentials".to_string()));
        }
        Ok(IdentitySession {
            access_token: format!("provider-{}", email),
            user: IdentityUser {
                id: "user-1".to_string(),
                email: email.to_string(),
                role: "authenticated".to_string(),
            },
        })
    }

    async fn sign_up(
        &self,
        email: &str,
        _password: &str,
        _metadata: &SignUpMetadata,
    ) -> Result<IdentityUser, IdentityError> {
        if email == TAKEN_EMAIL {
            return Err(IdentityError::AlreadyRegistered("User already registered".to_string()));
        }
        Ok(IdentityUser {
            id: "user-2".to_string(),
            email: email.to_string(),
            role: "authenticated".to_string(),
        })
    }

    fn oauth_url(&self, provider: OAuthProvider, redirect_to: &str) -> String {
        format!(
            "https://identity.test/authorize?provider={}&redirect_to={}",
            provider.as_str(),
            redirect_to
        )
    }

    async fn sign_out(&self, _access_token: &str) -> Result<(), IdentityError> {
        Ok(())
    }
}

pub fn anchor() -> chrono::NaiveDateTime {
    NaiveDate::from_ymd_opt(2023, 6, 15)
        .and_then(|d| d.and_hms_opt(12, 0, 0))
        .unwrap()
}

pub fn test_state() -> AppState {
    AppState::new(
        EnvironmentConfig::default(),
        Arc::new(MockFleetRepository::new(Some(42)).with_anchor(anchor())),
        Arc::new(StubIdentity),
    )
}

pub fn test_app() -> (Router, AppState) {
    let state = test_state();
    (create_app(state.clone()), state)
}

/// Enviar un request y decodificar el cuerpo JSON
pub async fn send(
    app: &Router,
    method: Method,
    uri: &str,
    token: Option<&str>,
    body: Option<Value>,
) -> (StatusCode, Value) {
    let mut builder = Request::builder().method(method).uri(uri);
    if let Some(token) = token {
        builder = builder.header(header::AUTHORIZATION, format!("Bearer {}", token));
    }
    let request = match body {
        Some(body) => builder
            .header(header::CONTENT_TYPE, "application/json")
            .body(Body::from(body.to_string()))
            .unwrap(),
        None => builder.body(Body::empty()).unwrap(),
    };

    let response = app.clone().oneshot(request).await.unwrap();
    let status = response.status();
    let bytes = to_bytes(response.into_body(), usize::MAX).await.unwrap();
    let value = serde_json::from_slice(&bytes).unwrap_or(Value::Null);
    (status, value)
}

/// Iniciar sesión y devolver el token
pub async fn login(app: &Router) -> String {
    let (status, body) = send(
        app,
        Method::POST,
        "/api/auth/login",
        None,
        Some(json!({ "email": "ana@flota.mx", "password": VALID_PASSWORD })),
    )
    .await;
    assert_eq!(status, StatusCode::OK, "login falló: {}", body);
    body["session"]["token"].as_str().unwrap().to_string()
}
