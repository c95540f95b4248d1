use axum::{
    extract::{
        rejection::{JsonRejection, PathRejection},
        Path, State,
    },
    http::StatusCode,
    routing::{get, patch, post},
    Json, Router,
};

use crate::dto::action_dto::{ActionRow, CreateActionRequest, UpdateStatusRequest};
use crate::dto::ApiResponse;
use crate::models::action::ActionCatalog;
use crate::services::action_service::NotificationReceipt;
use crate::services::ActionService;
use crate::state::AppState;
use crate::utils::errors::AppError;

pub fn create_action_router() -> Router<AppState> {
    Router::new()
        .route("/", get(list_actions).post(create_action))
        .route("/catalogo", get(action_catalog))
        .route("/:id/estado", patch(update_status))
        .route("/:id/notificar", post(notify_action))
}

async fn list_actions(State(state): State<AppState>) -> Json<ApiResponse<Vec<ActionRow>>> {
    Json(ApiResponse::success(ActionService::new(&state).list().await))
}

async fn action_catalog(State(state): State<AppState>) -> Json<ApiResponse<ActionCatalog>> {
    Json(ApiResponse::success(ActionService::new(&state).catalog()))
}

async fn create_action(
    State(state): State<AppState>,
    request: Result<Json<CreateActionRequest>, JsonRejection>,
) -> Result<(StatusCode, Json<ApiResponse<ActionRow>>), AppError> {
    let Json(request) = request?;
    let response = ActionService::new(&state).create(request).await?;
    Ok((StatusCode::CREATED, Json(response)))
}

async fn update_status(
    State(state): State<AppState>,
    id: Result<Path<u32>, PathRejection>,
    request: Result<Json<UpdateStatusRequest>, JsonRejection>,
) -> Result<Json<ApiResponse<ActionRow>>, AppError> {
    let Path(id) = id?;
    let Json(request) = request?;
    let response = ActionService::new(&state).update_status(id, request.estado).await?;
    Ok(Json(response))
}

async fn notify_action(
    State(state): State<AppState>,
    id: Result<Path<u32>, PathRejection>,
) -> Result<Json<ApiResponse<NotificationReceipt>>, AppError> {
    let Path(id) = id?;
    let response = ActionService::new(&state).notify(id).await?;
    Ok(Json(response))
}
