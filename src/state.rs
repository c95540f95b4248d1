//! Estado compartido de la aplicación
//!
//! Este módulo define el estado compartido de la aplicación que se pasa
//! a través del router de Axum.

use chrono::{DateTime, Utc};
use std::collections::HashMap;
use std::sync::Arc;
use tokio::sync::RwLock;

use crate::config::environment::EnvironmentConfig;
use crate::repositories::FleetDataSource;
use crate::services::action_service::ActionBook;
use crate::services::identity_service::IdentityProvider;
use crate::utils::jwt::JwtConfig;

/// Sesión activa: enlaza el `sid` del JWT con el token del proveedor.
/// Vence junto con el JWT que la referencia.
#[derive(Clone, Debug)]
pub struct ActiveSession {
    pub user_id: String,
    pub email: String,
    pub provider_token: String,
    pub expires_at: DateTime<Utc>,
}

impl ActiveSession {
    pub fn new(
        user_id: String,
        email: String,
        provider_token: String,
        expires_at: DateTime<Utc>,
    ) -> Self {
        Self {
            user_id,
            email,
            provider_token,
            expires_at,
        }
    }

    pub fn is_expired(&self, now: DateTime<Utc>) -> bool {
        self.expires_at <= now
    }
}

pub type SessionStore = Arc<RwLock<HashMap<String, ActiveSession>>>;

#[derive(Clone)]
pub struct AppState {
    pub config: EnvironmentConfig,
    pub data_source: Arc<dyn FleetDataSource>,
    pub identity: Arc<dyn IdentityProvider>,
    pub sessions: SessionStore,
    pub actions: Arc<RwLock<ActionBook>>,
}

impl AppState {
    pub fn new(
        config: EnvironmentConfig,
        data_source: Arc<dyn FleetDataSource>,
        identity: Arc<dyn IdentityProvider>,
    ) -> Self {
        Self {
            config,
            data_source,
            identity,
            sessions: Arc::new(RwLock::new(HashMap::new())),
            actions: Arc::new(RwLock::new(ActionBook::seeded())),
        }
    }

    pub fn jwt_config(&self) -> JwtConfig {
        JwtConfig::from(&self.config)
    }

    /// Registrar una sesión nueva; de paso se descartan las vencidas
    pub async fn store_session(&self, session_id: String, session: ActiveSession) {
        log::info!("💾 Sesión abierta para '{}'", session.email);
        let now = Utc::now();
        let mut sessions = self.sessions.write().await;
        let before = sessions.len();
        sessions.retain(|_, s| !s.is_expired(now));
        if sessions.len() < before {
            log::info!("🧹 {} sesiones vencidas eliminadas", before - sessions.len());
        }
        sessions.insert(session_id, session);
        log::debug!("💾 Sesiones activas: {}", sessions.len());
    }

    /// Sesión vigente; una vencida se elimina y cuenta como ausente
    pub async fn get_session(&self, session_id: &str) -> Option<ActiveSession> {
        let now = Utc::now();
        {
            let sessions = self.sessions.read().await;
            match sessions.get(session_id) {
                None => return None,
                Some(session) if !session.is_expired(now) => return Some(session.clone()),
                Some(_) => {}
            }
        }

        if let Some(session) = self.sessions.write().await.remove(session_id) {
            log::info!("⌛ Sesión vencida para '{}'", session.email);
        }
        None
    }

    /// Quitar una sesión; devuelve la sesión revocada si existía
    pub async fn revoke_session(&self, session_id: &str) -> Option<ActiveSession> {
        let removed = self.sessions.write().await.remove(session_id);
        match &removed {
            Some(session) => log::info!("🔒 Sesión cerrada para '{}'", session.email),
            None => log::warn!("❌ Sesión '{}' no encontrada", session_id),
        }
        removed
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::repositories::MockFleetRepository;
    use crate::services::SupabaseIdentityClient;
    use chrono::Duration;

    fn state() -> AppState {
        let config = EnvironmentConfig::default();
        let identity = SupabaseIdentityClient::from_config(&config).unwrap();
        AppState::new(config, Arc::new(MockFleetRepository::new(Some(7))), Arc::new(identity))
    }

    fn session(email: &str, expires_at: DateTime<Utc>) -> ActiveSession {
        ActiveSession::new("u-1".to_string(), email.to_string(), "provider-token".to_string(), expires_at)
    }

    #[tokio::test]
    async fn test_expired_session_is_absent_and_removed() {
        let state = state();
        state
            .store_session("vencida".to_string(), session("ana@flota.mx", Utc::now() - Duration::seconds(5)))
            .await;
        assert_eq!(state.sessions.read().await.len(), 1);

        assert!(state.get_session("vencida").await.is_none());
        assert!(state.sessions.read().await.is_empty());
    }

    #[tokio::test]
    async fn test_store_prunes_expired_sessions() {
        let state = state();
        for i in 0..3 {
            state
                .store_session(format!("vieja-{}", i), session("ana@flota.mx", Utc::now() - Duration::minutes(1)))
                .await;
        }
        state
            .store_session("nueva".to_string(), session("luis@flota.mx", Utc::now() + Duration::hours(1)))
            .await;

        let sessions = state.sessions.read().await;
        assert_eq!(sessions.len(), 1);
        assert!(sessions.contains_key("nueva"));
        drop(sessions);
        assert_eq!(state.get_session("nueva").await.map(|s| s.email), Some("luis@flota.mx".to_string()));
    }
}
