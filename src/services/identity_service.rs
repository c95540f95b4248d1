//! Cliente del proveedor de identidad (Supabase GoTrue)
//!
//! Cada llamada remota tiene un timeout explícito. Si la request HTTP que la
//! originó se cancela, el future se descarta y la llamada se aborta con él.

use async_trait::async_trait;
use serde::Deserialize;
use serde_json::json;
use std::future::Future;
use std::time::Duration;

use crate::config::environment::EnvironmentConfig;
use crate::models::auth::{
    IdentityError, IdentitySession, IdentityUser, OAuthProvider, SignUpMetadata,
};
use crate::utils::errors::{AppError, AppResult};

#[async_trait]
pub trait IdentityProvider: Send + Sync {
    async fn sign_in(&self, email: &str, password: &str) -> Result<IdentitySession, IdentityError>;

    async fn sign_up(
        &self,
        email: &str,
        password: &str,
        metadata: &SignUpMetadata,
    ) -> Result<IdentityUser, IdentityError>;

    /// URL a la que el navegador debe ir para el login OAuth
    fn oauth_url(&self, provider: OAuthProvider, redirect_to: &str) -> String;

    async fn sign_out(&self, access_token: &str) -> Result<(), IdentityError>;
}

#[derive(Debug, Deserialize)]
struct TokenResponse {
    access_token: String,
    user: IdentityUser,
}

/// GoTrue responde el usuario solo o envuelto en una sesión
#[derive(Debug, Deserialize)]
#[serde(untagged)]
enum SignUpResponse {
    Session { user: IdentityUser },
    User(IdentityUser),
}

/// Cuerpo de error; según la versión de GoTrue cambia el campo del mensaje
#[derive(Debug, Default, Deserialize)]
struct GoTrueError {
    error_description: Option<String>,
    msg: Option<String>,
    message: Option<String>,
    error: Option<String>,
    error_code: Option<String>,
    code: Option<serde_json::Value>,
}

impl GoTrueError {
    fn text(&self) -> String {
        self.error_description
            .clone()
            .or_else(|| self.msg.clone())
            .or_else(|| self.message.clone())
            .or_else(|| self.error.clone())
            .unwrap_or_else(|| "Error de autenticación".to_string())
    }

    fn is_already_registered(&self) -> bool {
        let code_matches = self.error_code.as_deref() == Some("user_already_exists")
            || self.code.as_ref().and_then(|c| c.as_str()) == Some("user_already_exists");
        code_matches || self.text().to_lowercase().contains("already registered")
    }
}

pub struct SupabaseIdentityClient {
    client: reqwest::Client,
    base_url: String,
    anon_key: String,
    timeout: Duration,
}

impl SupabaseIdentityClient {
    pub fn new(base_url: &str, anon_key: &str, timeout: Duration) -> AppResult<Self> {
        let client = reqwest::Client::builder()
            .user_agent("FlotaDashboard/1.0")
            .build()
            .map_err(|e| AppError::Config(format!("No se pudo crear el cliente HTTP: {}", e)))?;

        Ok(Self {
            client,
            base_url: base_url.trim_end_matches('/').to_string(),
            anon_key: anon_key.to_string(),
            timeout,
        })
    }

    pub fn from_config(config: &EnvironmentConfig) -> AppResult<Self> {
        Self::new(&config.supabase_url, &config.supabase_anon_key, config.identity_timeout())
    }

    fn endpoint(&self, path: &str) -> String {
        format!("{}/auth/v1/{}", self.base_url, path)
    }

    async fn bounded<T, F>(&self, call: F) -> Result<T, IdentityError>
    where
        F: Future<Output = Result<T, IdentityError>> + Send,
    {
        match tokio::time::timeout(self.timeout, call).await {
            Ok(result) => result,
            Err(_) => {
                log::warn!("⏱️ El proveedor de identidad no respondió en {:?}", self.timeout);
                Err(IdentityError::Timeout)
            }
        }
    }

    async fn rejection(response: reqwest::Response) -> IdentityError {
        let status = response.status();
        let body = response.json::<GoTrueError>().await.unwrap_or_default();
        log::warn!("❌ Proveedor de identidad respondió {}: {}", status, body.text());

        if body.is_already_registered() {
            IdentityError::AlreadyRegistered(body.text())
        } else if status.is_server_error() {
            IdentityError::Unavailable(body.text())
        } else {
            IdentityError::Rejected(body.text())
        }
    }
}

fn transport_error(error: reqwest::Error) -> IdentityError {
    log::error!("❌ Error de red con el proveedor de identidad: {}", error);
    IdentityError::Unavailable("No se pudo contactar el servicio de autenticación".to_string())
}

#[async_trait]
impl IdentityProvider for SupabaseIdentityClient {
    async fn sign_in(&self, email: &str, password: &str) -> Result<IdentitySession, IdentityError> {
        self.bounded(async {
            let response = self
                .client
                .post(self.endpoint("token?grant_type=password"))
                .header("apikey", &self.anon_key)
                .json(&json!({ "email": email, "password": password }))
                .send()
                .await
                .map_err(transport_error)?;

            if !response.status().is_success() {
                return Err(Self::rejection(response).await);
            }

            let token = response.json::<TokenResponse>().await.map_err(transport_error)?;
            Ok(IdentitySession {
                access_token: token.access_token,
                user: token.user,
            })
        })
        .await
    }

    async fn sign_up(
        &self,
        email: &str,
        password: &str,
        metadata: &SignUpMetadata,
    ) -> Result<IdentityUser, IdentityError> {
        self.bounded(async {
            let response = self
                .client
                .post(self.endpoint("signup"))
                .header("apikey", &self.anon_key)
                .json(&json!({ "email": email, "password": password, "data": metadata }))
                .send()
                .await
                .map_err(transport_error)?;

            if !response.status().is_success() {
                return Err(Self::rejection(response).await);
            }

            match response.json::<SignUpResponse>().await.map_err(transport_error)? {
                SignUpResponse::Session { user } | SignUpResponse::User(user) => Ok(user),
            }
        })
        .await
    }

    fn oauth_url(&self, provider: OAuthProvider, redirect_to: &str) -> String {
        format!(
            "{}?provider={}&redirect_to={}",
            self.endpoint("authorize"),
            provider.as_str(),
            urlencoding::encode(redirect_to)
        )
    }

    async fn sign_out(&self, access_token: &str) -> Result<(), IdentityError> {
        self.bounded(async {
            let response = self
                .client
                .post(self.endpoint("logout"))
                .header("apikey", &self.anon_key)
                .bearer_auth(access_token)
                .send()
                .await
                .map_err(transport_error)?;

            if response.status().is_success() {
                Ok(())
            } else {
                Err(Self::rejection(response).await)
            }
        })
        .await
    }
}
