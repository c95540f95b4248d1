//! Servicio de acciones ejecutivas
//!
//! Las acciones y sus eventos de evaluación viven en memoria. Cada acción
//! creada agrega un evento en la agenda para su fecha de evaluación.

use chrono::{Duration, Local, NaiveDate};
use serde::Serialize;
use std::sync::Arc;
use tokio::sync::RwLock;
use validator::Validate;

use crate::dto::action_dto::{ActionRow, CreateActionRequest};
use crate::dto::ApiResponse;
use crate::models::action::{
    ActionCatalog, ActionStatus, CalendarEvent, ExecutiveAction, DEFAULT_EVALUATION_DAYS,
};
use crate::repositories::sample_data;
use crate::state::AppState;
use crate::utils::errors::{not_found_error, AppError, AppResult};

/// Acciones y eventos de la agenda
#[derive(Debug, Clone, Default)]
pub struct ActionBook {
    pub actions: Vec<ExecutiveAction>,
    pub events: Vec<CalendarEvent>,
}

impl ActionBook {
    /// Libro con las acciones y eventos de muestra
    pub fn seeded() -> Self {
        Self {
            actions: sample_data::executive_actions(),
            events: sample_data::calendar_events(),
        }
    }

    pub fn action(&self, id: u32) -> Option<&ExecutiveAction> {
        self.actions.iter().find(|a| a.id == id)
    }

    fn next_action_id(&self) -> u32 {
        self.actions.iter().map(|a| a.id).max().unwrap_or(0) + 1
    }

    fn next_event_id(&self) -> u32 {
        self.events.iter().map(|e| e.id).max().unwrap_or(0) + 1
    }
}

/// Acuse de una notificación enviada al responsable
#[derive(Debug, Clone, Serialize)]
pub struct NotificationReceipt {
    pub accion_id: u32,
    pub destinatario: String,
}

pub struct ActionService {
    book: Arc<RwLock<ActionBook>>,
    today: NaiveDate,
}

impl ActionService {
    pub fn new(state: &AppState) -> Self {
        Self {
            book: state.actions.clone(),
            today: Local::now().date_naive(),
        }
    }

    /// Fija la fecha de hoy para clasificar vencidas
    pub fn with_today(mut self, today: NaiveDate) -> Self {
        self.today = today;
        self
    }

    pub fn catalog(&self) -> ActionCatalog {
        ActionCatalog::default()
    }

    pub async fn list(&self) -> Vec<ActionRow> {
        let book = self.book.read().await;
        book.actions
            .iter()
            .cloned()
            .map(|action| ActionRow::new(action, self.today))
            .collect()
    }

    pub async fn create(&self, request: CreateActionRequest) -> AppResult<ApiResponse<ActionRow>> {
        request.validate()?;

        let fecha_asignacion = request.fecha_asignacion.unwrap_or(self.today);
        let fecha_evaluacion = request
            .fecha_evaluacion
            .unwrap_or(fecha_asignacion + Duration::days(DEFAULT_EVALUATION_DAYS));

        let mut book = self.book.write().await;
        let action = ExecutiveAction {
            id: book.next_action_id(),
            tipo: request.tipo,
            descripcion: request.descripcion.trim().to_string(),
            categoria: request.effective_category(),
            usuario_asignado: request.usuario_asignado.trim().to_string(),
            fecha_asignacion,
            resultado_esperado: request.effective_result(),
            fecha_evaluacion,
            estado: ActionStatus::Pending,
            notas: request.notas.filter(|n| !n.trim().is_empty()),
        };

        let event = CalendarEvent {
            id: book.next_event_id(),
            title: format!("Evaluación: {}", action.descripcion),
            date: fecha_evaluacion,
            accion_id: action.id,
        };

        log::info!(
            "📋 Acción {} registrada para {} (evaluación {})",
            action.id,
            action.usuario_asignado,
            fecha_evaluacion
        );

        book.actions.push(action.clone());
        book.events.push(event);

        Ok(ApiResponse::success_with_message(
            ActionRow::new(action, self.today),
            "Acción ejecutiva registrada correctamente".to_string(),
        ))
    }

    /// Cambiar el estado según la tabla de transiciones
    pub async fn update_status(&self, id: u32, target: ActionStatus) -> AppResult<ApiResponse<ActionRow>> {
        let mut book = self.book.write().await;
        let action = book
            .actions
            .iter_mut()
            .find(|a| a.id == id)
            .ok_or_else(|| not_found_error("Acción", &id.to_string()))?;

        if !action.estado.can_transition_to(target) {
            log::warn!("⛔ Transición inválida en acción {}: {} -> {}", id, action.estado, target);
            return Err(AppError::Conflict(format!(
                "No se puede cambiar una acción {} a {}",
                action.estado, target
            )));
        }

        log::info!("🔄 Acción {}: {} -> {}", id, action.estado, target);
        action.estado = target;

        Ok(ApiResponse::success_with_message(
            ActionRow::new(action.clone(), self.today),
            format!("Estado actualizado a {}", target),
        ))
    }

    pub async fn notify(&self, id: u32) -> AppResult<ApiResponse<NotificationReceipt>> {
        let book = self.book.read().await;
        let action = book
            .action(id)
            .ok_or_else(|| not_found_error("Acción", &id.to_string()))?;

        log::info!(
            "📨 Notificación de acción {} enviada a {}",
            action.id,
            action.usuario_asignado
        );

        Ok(ApiResponse::success_with_message(
            NotificationReceipt {
                accion_id: action.id,
                destinatario: action.usuario_asignado.clone(),
            },
            "Notificación enviada correctamente".to_string(),
        ))
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::models::action::ActionType;

    fn date(s: &str) -> NaiveDate {
        NaiveDate::parse_from_str(s, "%Y-%m-%d").unwrap()
    }

    fn service() -> ActionService {
        ActionService {
            book: Arc::new(RwLock::new(ActionBook::seeded())),
            today: date("2023-05-18"),
        }
    }

    fn request() -> CreateActionRequest {
        CreateActionRequest {
            tipo: ActionType::Correctiva,
            descripcion: "Cambio de llantas unidad FL002".to_string(),
            categoria: "Mantenimiento".to_string(),
            categoria_personalizada: None,
            usuario_asignado: "Javier Martínez".to_string(),
            fecha_asignacion: Some(date("2023-05-18")),
            resultado_esperado: "Unidad operativa".to_string(),
            resultado_personalizado: None,
            fecha_evaluacion: None,
            notas: Some("  ".to_string()),
        }
    }

    #[tokio::test]
    async fn test_list_flags_overdue_actions() {
        let rows = service().list().await;
        let overdue: Vec<u32> = rows.iter().filter(|r| r.vencida).map(|r| r.action.id).collect();
        assert_eq!(overdue, vec![2]);
    }

    #[tokio::test]
    async fn test_create_defaults_and_event() {
        let service = service();
        let response = service.create(request()).await.unwrap();
        let row = response.data.unwrap();

        assert_eq!(row.action.id, 4);
        assert_eq!(row.action.fecha_evaluacion, date("2023-05-25"));
        assert_eq!(row.action.estado, ActionStatus::Pending);
        assert_eq!(row.action.notas, None);
        assert_eq!(response.message.as_deref(), Some("Acción ejecutiva registrada correctamente"));

        let book = service.book.read().await;
        let event = book.events.last().unwrap();
        assert_eq!(event.accion_id, 4);
        assert_eq!(event.date, date("2023-05-25"));
    }

    #[tokio::test]
    async fn test_create_rejects_invalid_request() {
        let mut invalid = request();
        invalid.categoria = "Otro".to_string();
        let result = service().create(invalid).await;
        assert!(matches!(result, Err(AppError::Validation(_))));
    }

    #[tokio::test]
    async fn test_status_transitions() {
        let service = service();
        let updated = service.update_status(2, ActionStatus::InProgress).await.unwrap();
        assert_eq!(updated.data.unwrap().action.estado, ActionStatus::InProgress);

        let reopen = service.update_status(1, ActionStatus::Pending).await;
        assert!(matches!(reopen, Err(AppError::Conflict(_))));

        let missing = service.update_status(99, ActionStatus::Completed).await;
        assert!(matches!(missing, Err(AppError::NotFound(_))));
    }

    #[tokio::test]
    async fn test_notify() {
        let response = service().notify(3).await.unwrap();
        assert_eq!(response.data.unwrap().destinatario, "Laura Ramírez");
        assert_eq!(response.message.as_deref(), Some("Notificación enviada correctamente"));
    }
}
