//! Configuración de variables de entorno
//!
//! Este módulo maneja la configuración del entorno y variables de configuración.

use std::env;
use std::str::FromStr;
use std::time::Duration;

use crate::utils::errors::AppError;

/// Origen de los datos del dashboard
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum DataSourceKind {
    Mock,
    Postgres,
}

impl FromStr for DataSourceKind {
    type Err = AppError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s.trim().to_lowercase().as_str() {
            "mock" => Ok(DataSourceKind::Mock),
            "postgres" | "postgresql" => Ok(DataSourceKind::Postgres),
            other => Err(AppError::Config(format!("DATA_SOURCE inválido: '{}'", other))),
        }
    }
}

/// Configuración del entorno
#[derive(Debug, Clone)]
pub struct EnvironmentConfig {
    pub environment: String,
    pub port: u16,
    pub host: String,
    pub jwt_secret: String,
    pub jwt_expiration: u64,
    pub cors_origins: Vec<String>,
    // Proveedor de identidad (Supabase GoTrue)
    pub supabase_url: String,
    pub supabase_anon_key: String,
    pub identity_timeout_secs: u64,
    pub oauth_redirect_url: String,
    // Datos
    pub data_source: DataSourceKind,
    pub database_url: Option<String>,
    pub mock_seed: Option<u64>,
    pub default_page_size: usize,
}

impl Default for EnvironmentConfig {
    /// Valores de desarrollo local; `from_env` es la fuente en producción
    fn default() -> Self {
        Self {
            environment: "development".to_string(),
            port: 3000,
            host: "0.0.0.0".to_string(),
            jwt_secret: "development-secret-change-me".to_string(),
            jwt_expiration: 86_400,
            cors_origins: vec!["http://localhost:5173".to_string()],
            supabase_url: "http://localhost:54321".to_string(),
            supabase_anon_key: String::new(),
            identity_timeout_secs: 10,
            oauth_redirect_url: "http://localhost:5173/dashboard/financiero".to_string(),
            data_source: DataSourceKind::Mock,
            database_url: None,
            mock_seed: None,
            default_page_size: 5,
        }
    }
}

impl EnvironmentConfig {
    /// Cargar configuración desde variables de entorno
    pub fn from_env() -> Result<Self, AppError> {
        Self::from_lookup(|key| env::var(key).ok())
    }

    /// Cargar configuración desde una función de búsqueda de variables
    pub fn from_lookup<F>(lookup: F) -> Result<Self, AppError>
    where
        F: Fn(&str) -> Option<String>,
    {
        let defaults = Self::default();

        let required = |key: &str| {
            lookup(key)
                .filter(|value| !value.trim().is_empty())
                .ok_or_else(|| AppError::Config(format!("{} must be set", key)))
        };

        let environment = lookup("ENVIRONMENT").unwrap_or(defaults.environment);
        let port = parse_or(&lookup, "PORT", defaults.port)?;
        let host = lookup("HOST").unwrap_or(defaults.host);
        let jwt_expiration = parse_or(&lookup, "JWT_EXPIRATION", defaults.jwt_expiration)?;
        let identity_timeout_secs =
            parse_or(&lookup, "IDENTITY_TIMEOUT_SECS", defaults.identity_timeout_secs)?;
        let default_page_size = parse_or(&lookup, "DEFAULT_PAGE_SIZE", defaults.default_page_size)?;

        let data_source = match lookup("DATA_SOURCE") {
            Some(value) => value.parse()?,
            None => DataSourceKind::Mock,
        };

        let database_url = lookup("DATABASE_URL").filter(|url| !url.trim().is_empty());
        if data_source == DataSourceKind::Postgres && database_url.is_none() {
            return Err(AppError::Config(
                "DATABASE_URL must be set when DATA_SOURCE=postgres".to_string(),
            ));
        }

        let mock_seed = match lookup("MOCK_SEED") {
            Some(raw) => Some(raw.trim().parse::<u64>().map_err(|_| {
                AppError::Config("MOCK_SEED must be a valid number".to_string())
            })?),
            None => None,
        };

        let cors_origins = lookup("CORS_ORIGINS")
            .map(|origins| {
                origins
                    .split(',')
                    .map(|s| s.trim().to_string())
                    .filter(|s| !s.is_empty())
                    .collect()
            })
            .unwrap_or(defaults.cors_origins);

        Ok(Self {
            environment,
            port,
            host,
            jwt_secret: required("JWT_SECRET")?,
            jwt_expiration,
            cors_origins,
            supabase_url: required("SUPABASE_URL")?.trim_end_matches('/').to_string(),
            supabase_anon_key: required("SUPABASE_ANON_KEY")?,
            identity_timeout_secs,
            oauth_redirect_url: lookup("OAUTH_REDIRECT_URL").unwrap_or(defaults.oauth_redirect_url),
            data_source,
            database_url,
            mock_seed,
            default_page_size: default_page_size.max(1),
        })
    }

    /// Verificar si estamos en modo desarrollo
    pub fn is_development(&self) -> bool {
        self.environment == "development"
    }

    /// Obtener la URL del servidor
    pub fn server_url(&self) -> String {
        format!("{}:{}", self.host, self.port)
    }

    pub fn identity_timeout(&self) -> Duration {
        Duration::from_secs(self.identity_timeout_secs.max(1))
    }
}

fn parse_or<F, T>(lookup: &F, key: &str, default: T) -> Result<T, AppError>
where
    F: Fn(&str) -> Option<String>,
    T: FromStr,
{
    match lookup(key) {
        Some(raw) => raw
            .trim()
            .parse::<T>()
            .map_err(|_| AppError::Config(format!("{} must be a valid number", key))),
        None => Ok(default),
    }
}
