use axum::{
    extract::{
        rejection::{PathRejection, QueryRejection},
        Path, Query, State,
    },
    routing::get,
    Json, Router,
};

use crate::dto::dashboard_dto::{AlertsQuery, FinancialQuery, FleetTableQuery, PageQuery, QualityQuery};
use crate::dto::ApiResponse;
use crate::presentation::table::{RenderedTable, TablePage};
use crate::services::financial_service::FinancialDashboard;
use crate::services::operational_service::OperationalDashboard;
use crate::services::quality_service::{AlertsPanel, QualityDashboard};
use crate::services::{FinancialService, OperationalService, QualityService};
use crate::state::AppState;
use crate::utils::errors::AppError;

pub fn create_dashboard_router() -> Router<AppState> {
    Router::new()
        .route("/financiero", get(financial_dashboard))
        .route("/financiero/drilldown/:dataset", get(financial_drill_down))
        .route("/operativo", get(operational_dashboard))
        .route("/operativo/flota", get(fleet_table))
        .route("/operativo/viajes", get(trips_table))
        .route("/operativo/drilldown/:dataset", get(operational_drill_down))
        .route("/calidad", get(quality_dashboard))
        .route("/calidad/alertas", get(quality_alerts))
}

async fn financial_dashboard(
    State(state): State<AppState>,
    query: Result<Query<FinancialQuery>, QueryRejection>,
) -> Result<Json<ApiResponse<FinancialDashboard>>, AppError> {
    let Query(query) = query?;
    let dashboard = FinancialService::new(&state).dashboard(query.weeks).await?;
    Ok(Json(ApiResponse::success(dashboard)))
}

async fn financial_drill_down(
    State(state): State<AppState>,
    dataset: Result<Path<String>, PathRejection>,
) -> Result<Json<ApiResponse<RenderedTable>>, AppError> {
    let Path(dataset) = dataset?;
    let table = FinancialService::new(&state).drill_down(&dataset).await?;
    Ok(Json(ApiResponse::success(table)))
}

async fn operational_dashboard(
    State(state): State<AppState>,
) -> Result<Json<ApiResponse<OperationalDashboard>>, AppError> {
    let dashboard = OperationalService::new(&state).dashboard().await?;
    Ok(Json(ApiResponse::success(dashboard)))
}

async fn fleet_table(
    State(state): State<AppState>,
    query: Result<Query<FleetTableQuery>, QueryRejection>,
) -> Result<Json<ApiResponse<TablePage>>, AppError> {
    let Query(query) = query?;
    let page = OperationalService::new(&state).fleet_table(&query).await?;
    Ok(Json(ApiResponse::success(page)))
}

async fn trips_table(
    State(state): State<AppState>,
    query: Result<Query<PageQuery>, QueryRejection>,
) -> Result<Json<ApiResponse<TablePage>>, AppError> {
    let Query(query) = query?;
    let page = OperationalService::new(&state).trips_table(&query).await?;
    Ok(Json(ApiResponse::success(page)))
}

async fn operational_drill_down(
    State(state): State<AppState>,
    dataset: Result<Path<String>, PathRejection>,
) -> Result<Json<ApiResponse<RenderedTable>>, AppError> {
    let Path(dataset) = dataset?;
    let table = OperationalService::new(&state).drill_down(&dataset).await?;
    Ok(Json(ApiResponse::success(table)))
}

async fn quality_dashboard(
    State(state): State<AppState>,
    query: Result<Query<QualityQuery>, QueryRejection>,
) -> Result<Json<ApiResponse<QualityDashboard>>, AppError> {
    let Query(query) = query?;
    let dashboard = QualityService::new(&state).dashboard(&query).await?;
    Ok(Json(ApiResponse::success(dashboard)))
}

async fn quality_alerts(
    State(state): State<AppState>,
    query: Result<Query<AlertsQuery>, QueryRejection>,
) -> Result<Json<ApiResponse<AlertsPanel>>, AppError> {
    let Query(query) = query?;
    let panel = QualityService::new(&state).alerts(&query).await?;
    Ok(Json(ApiResponse::success(panel)))
}
