use anyhow::Result;
use dotenvy::dotenv;
use std::net::SocketAddr;
use std::sync::Arc;
use tokio::signal;
use tracing::{error, info};
use tracing_subscriber::EnvFilter;

use flota_dashboard::config::database::{mask_database_url, DatabaseConfig};
use flota_dashboard::config::environment::{DataSourceKind, EnvironmentConfig};
use flota_dashboard::create_app;
use flota_dashboard::repositories::{FleetDataSource, MockFleetRepository, PgFleetRepository};
use flota_dashboard::services::SupabaseIdentityClient;
use flota_dashboard::state::AppState;

#[tokio::main]
async fn main() -> Result<()> {
    // Cargar variables de entorno
    dotenv().ok();

    // Configurar logging; RUST_LOG manda si está definido
    tracing_subscriber::fmt()
        .with_env_filter(EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new("info")))
        .init();

    info!("🚚 Dashboard de Flota - API");
    info!("================================================");

    let config = match EnvironmentConfig::from_env() {
        Ok(config) => config,
        Err(e) => {
            error!("❌ Configuración inválida: {}", e);
            return Err(anyhow::anyhow!("Error de configuración: {}", e));
        }
    };

    let data_source: Arc<dyn FleetDataSource> = match config.data_source {
        DataSourceKind::Mock => {
            info!("🎲 Origen de datos: muestra (semilla: {:?})", config.mock_seed);
            Arc::new(MockFleetRepository::new(config.mock_seed))
        }
        DataSourceKind::Postgres => {
            let url = config.database_url.clone().unwrap_or_default();
            info!("🗄️ Conectando a {}", mask_database_url(&url));
            let pool = match DatabaseConfig::from_url(url).create_pool().await {
                Ok(pool) => pool,
                Err(e) => {
                    error!("❌ Error conectando a la base de datos: {}", e);
                    return Err(anyhow::anyhow!("Error de base de datos: {}", e));
                }
            };
            info!("✅ Base de datos conectada");
            Arc::new(PgFleetRepository::new(pool))
        }
    };

    let identity = SupabaseIdentityClient::from_config(&config)
        .map_err(|e| anyhow::anyhow!("Error creando cliente de identidad: {}", e))?;

    let addr: SocketAddr = config.server_url().parse()?;
    let state = AppState::new(config, data_source, Arc::new(identity));
    let app = create_app(state);

    info!("🌐 Servidor iniciando en http://{}", addr);
    info!("🔍 Endpoints disponibles:");
    info!("   GET  /health - Estado del servicio");
    info!("🔐 Autenticación:");
    info!("   POST /api/auth/login - Iniciar sesión");
    info!("   POST /api/auth/register - Registrar usuario");
    info!("   GET  /api/auth/oauth/:provider - URL de OAuth (google, facebook)");
    info!("   POST /api/auth/logout - Cerrar sesión");
    info!("📊 Dashboard (requiere sesión):");
    info!("   GET  /api/dashboard/financiero - Dashboard financiero");
    info!("   GET  /api/dashboard/financiero/drilldown/:dataset - Datos de una gráfica");
    info!("   GET  /api/dashboard/operativo - Eficiencia operativa");
    info!("   GET  /api/dashboard/operativo/flota - Tabla de unidades");
    info!("   GET  /api/dashboard/operativo/viajes - Tabla de viajes");
    info!("   GET  /api/dashboard/operativo/drilldown/:dataset - Datos de una gráfica");
    info!("   GET  /api/dashboard/calidad - Control de calidad");
    info!("   GET  /api/dashboard/calidad/alertas - Alertas de temperatura");
    info!("📋 Acciones ejecutivas (requiere sesión):");
    info!("   GET  /api/acciones - Listar acciones");
    info!("   POST /api/acciones - Registrar acción");
    info!("   GET  /api/acciones/catalogo - Catálogos del formulario");
    info!("   PATCH /api/acciones/:id/estado - Cambiar estado");
    info!("   POST /api/acciones/:id/notificar - Notificar al responsable");
    info!("📅 Agenda (requiere sesión):");
    info!("   GET  /api/agenda - Vista mensual");
    info!("   GET  /api/agenda/dia/:fecha - Eventos de un día");
    info!("   GET  /api/agenda/accion/:id - Agenda de una acción");

    let listener = tokio::net::TcpListener::bind(addr).await?;
    if let Err(e) = axum::serve(listener, app)
        .with_graceful_shutdown(shutdown_signal())
        .await
    {
        error!("❌ Error del servidor: {}", e);
        return Err(e.into());
    }

    info!("👋 Servidor terminado");
    Ok(())
}

/// Señal de apagado graceful
async fn shutdown_signal() {
    let ctrl_c = async {
        if let Err(e) = signal::ctrl_c().await {
            error!("❌ No se pudo instalar el handler de Ctrl+C: {}", e);
            std::future::pending::<()>().await;
        }
    };

    #[cfg(unix)]
    let terminate = async {
        match signal::unix::signal(signal::unix::SignalKind::terminate()) {
            Ok(mut stream) => {
                stream.recv().await;
            }
            Err(e) => {
                error!("❌ No se pudo instalar el handler de SIGTERM: {}", e);
                std::future::pending::<()>().await;
            }
        }
    };

    #[cfg(not(unix))]
    let terminate = std::future::pending::<()>();

    tokio::select! {
        _ = ctrl_c => {
            info!("🛑 Señal Ctrl+C recibida, apagando servidor...");
        },
        _ = terminate => {
            info!("🛑 Señal de terminación recibida, apagando servidor...");
        },
    }
}
