use axum::{
    extract::{
        rejection::{PathRejection, QueryRejection},
        Path, Query, State,
    },
    routing::get,
    Json, Router,
};

use crate::dto::dashboard_dto::AgendaQuery;
use crate::dto::ApiResponse;
use crate::services::agenda_service::{ActionAgenda, AgendaDay, AgendaMonth};
use crate::services::AgendaService;
use crate::state::AppState;
use crate::utils::errors::AppError;

pub fn create_agenda_router() -> Router<AppState> {
    Router::new()
        .route("/", get(agenda_month))
        .route("/dia/:fecha", get(agenda_day))
        .route("/accion/:id", get(agenda_for_action))
}

async fn agenda_month(
    State(state): State<AppState>,
    query: Result<Query<AgendaQuery>, QueryRejection>,
) -> Result<Json<ApiResponse<AgendaMonth>>, AppError> {
    let Query(query) = query?;
    let month = AgendaService::new(&state).month(query.mes.as_deref()).await?;
    Ok(Json(ApiResponse::success(month)))
}

async fn agenda_day(
    State(state): State<AppState>,
    fecha: Result<Path<String>, PathRejection>,
) -> Result<Json<ApiResponse<AgendaDay>>, AppError> {
    let Path(fecha) = fecha?;
    let day = AgendaService::new(&state).day(&fecha).await?;
    Ok(Json(ApiResponse::success(day)))
}

async fn agenda_for_action(
    State(state): State<AppState>,
    id: Result<Path<u32>, PathRejection>,
) -> Result<Json<ApiResponse<ActionAgenda>>, AppError> {
    let Path(id) = id?;
    let agenda = AgendaService::new(&state).for_action(id).await?;
    Ok(Json(ApiResponse::success(agenda)))
}
