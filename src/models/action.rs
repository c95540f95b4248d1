//! Modelos de acciones ejecutivas y agenda de evaluación
//!
//! Las transiciones de estado se validan con una tabla explícita:
//! `completada` y `cancelada` son terminales; las demás pueden moverse
//! entre sí o cerrarse. Cambiar al mismo estado no es un error.

use chrono::NaiveDate;
use serde::{Deserialize, Serialize};
use std::fmt;
use std::str::FromStr;

use crate::utils::errors::{validation_error, AppError};

/// Días antes de la evaluación en que un evento se considera próximo
pub const UPCOMING_WINDOW_DAYS: i64 = 3;

/// Días por defecto entre asignación y evaluación
pub const DEFAULT_EVALUATION_DAYS: i64 = 7;

/// Opción "Otro" de los catálogos
pub const OTHER_OPTION: &str = "Otro";

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum ActionType {
    Preventiva,
    Correctiva,
}

impl ActionType {
    pub const ALL: [ActionType; 2] = [ActionType::Preventiva, ActionType::Correctiva];
}

/// Estado de una acción ejecutiva
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub enum ActionStatus {
    #[serde(rename = "pendiente")]
    Pending,
    #[serde(rename = "en progreso")]
    InProgress,
    #[serde(rename = "completada")]
    Completed,
    #[serde(rename = "cancelada")]
    Cancelled,
}

impl ActionStatus {
    pub fn as_str(&self) -> &'static str {
        match self {
            ActionStatus::Pending => "pendiente",
            ActionStatus::InProgress => "en progreso",
            ActionStatus::Completed => "completada",
            ActionStatus::Cancelled => "cancelada",
        }
    }

    pub fn is_terminal(&self) -> bool {
        matches!(self, ActionStatus::Completed | ActionStatus::Cancelled)
    }

    /// Estados alcanzables desde éste
    pub fn allowed_targets(&self) -> &'static [ActionStatus] {
        match self {
            ActionStatus::Pending => &[
                ActionStatus::InProgress,
                ActionStatus::Completed,
                ActionStatus::Cancelled,
            ],
            ActionStatus::InProgress => &[
                ActionStatus::Pending,
                ActionStatus::Completed,
                ActionStatus::Cancelled,
            ],
            ActionStatus::Completed | ActionStatus::Cancelled => &[],
        }
    }

    pub fn can_transition_to(&self, target: ActionStatus) -> bool {
        *self == target || self.allowed_targets().contains(&target)
    }
}

impl fmt::Display for ActionStatus {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

impl FromStr for ActionStatus {
    type Err = AppError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s.trim().to_lowercase().as_str() {
            "pendiente" | "pending" => Ok(ActionStatus::Pending),
            "en progreso" | "en_progreso" | "in_progress" => Ok(ActionStatus::InProgress),
            "completada" | "completed" => Ok(ActionStatus::Completed),
            "cancelada" | "cancelled" => Ok(ActionStatus::Cancelled),
            _ => Err(validation_error("estado", "Estado de acción desconocido")),
        }
    }
}

/// Acción ejecutiva preventiva o correctiva
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq)]
pub struct ExecutiveAction {
    pub id: u32,
    pub tipo: ActionType,
    pub descripcion: String,
    pub categoria: String,
    pub usuario_asignado: String,
    pub fecha_asignacion: NaiveDate,
    pub resultado_esperado: String,
    pub fecha_evaluacion: NaiveDate,
    pub estado: ActionStatus,
    #[serde(default)]
    pub notas: Option<String>,
}

impl ExecutiveAction {
    /// Vencida: evaluación ya pasó y la acción sigue abierta
    pub fn is_overdue(&self, today: NaiveDate) -> bool {
        self.fecha_evaluacion < today && !self.estado.is_terminal()
    }
}

/// Estado de un evento de la agenda
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum EventStatus {
    Completado,
    Pendiente,
    Vencido,
    Proximo,
    Cancelado,
}

impl EventStatus {
    /// Color del día en el calendario
    pub fn color(&self) -> &'static str {
        match self {
            EventStatus::Completado => "#22C55E",
            EventStatus::Pendiente => "#FF9900",
            EventStatus::Vencido => "#DB0000",
            EventStatus::Proximo => "#F59E0B",
            EventStatus::Cancelado => "#6F797F",
        }
    }

    pub fn label(&self) -> &'static str {
        match self {
            EventStatus::Completado => "Completado",
            EventStatus::Pendiente => "Pendiente",
            EventStatus::Vencido => "Vencido",
            EventStatus::Proximo => "Próximo",
            EventStatus::Cancelado => "Cancelado",
        }
    }

    pub const LEGEND: [EventStatus; 4] = [
        EventStatus::Completado,
        EventStatus::Pendiente,
        EventStatus::Vencido,
        EventStatus::Proximo,
    ];

    /// Estado del evento a partir de su acción y de la fecha de hoy.
    /// Sin acción vinculada sólo cuenta la fecha.
    pub fn derive(action: Option<&ExecutiveAction>, date: NaiveDate, today: NaiveDate) -> Self {
        match action.map(|a| a.estado) {
            Some(ActionStatus::Completed) => return EventStatus::Completado,
            Some(ActionStatus::Cancelled) => return EventStatus::Cancelado,
            _ => {}
        }

        if date < today {
            EventStatus::Vencido
        } else if (date - today).num_days() <= UPCOMING_WINDOW_DAYS {
            EventStatus::Proximo
        } else {
            EventStatus::Pendiente
        }
    }
}

/// Evento de evaluación en la agenda
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq)]
pub struct CalendarEvent {
    pub id: u32,
    pub title: String,
    pub date: NaiveDate,
    pub accion_id: u32,
}

/// Catálogos del formulario de acciones
#[derive(Debug, Clone, Serialize)]
pub struct ActionCatalog {
    pub tipos: Vec<ActionType>,
    pub categorias: Vec<&'static str>,
    pub resultados_esperados: Vec<&'static str>,
    pub usuarios: Vec<&'static str>,
    pub estados: Vec<ActionStatus>,
}

impl Default for ActionCatalog {
    fn default() -> Self {
        Self {
            tipos: ActionType::ALL.to_vec(),
            categorias: vec![
                "Mantenimiento",
                "Reparación",
                "Formación",
                "Optimización de rutas",
                "Seguridad",
                "Combustible",
                "Administrativo",
                OTHER_OPTION,
            ],
            resultados_esperados: vec![
                "Reducción de costos",
                "Mejora de eficiencia",
                "Reducción de incidencias",
                "Unidad operativa",
                "Personal capacitado",
                "Mejora de servicio",
                "Optimización de recursos",
                "Cumplimiento normativo",
                OTHER_OPTION,
            ],
            usuarios: vec![
                "Carlos González",
                "Miguel Ángel López",
                "Laura Ramírez",
                "Javier Martínez",
                "Sofía García",
                "Rodrigo Sánchez",
                "Ana María Jiménez",
            ],
            estados: vec![
                ActionStatus::Pending,
                ActionStatus::InProgress,
                ActionStatus::Completed,
                ActionStatus::Cancelled,
            ],
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn date(s: &str) -> NaiveDate {
        NaiveDate::parse_from_str(s, "%Y-%m-%d").unwrap()
    }

    fn action(estado: ActionStatus, evaluacion: &str) -> ExecutiveAction {
        ExecutiveAction {
            id: 1,
            tipo: ActionType::Correctiva,
            descripcion: "Reparación urgente de unidad 003".to_string(),
            categoria: "Reparación".to_string(),
            usuario_asignado: "Miguel Ángel López".to_string(),
            fecha_asignacion: date("2023-05-12"),
            resultado_esperado: "Unidad operativa".to_string(),
            fecha_evaluacion: date(evaluacion),
            estado,
            notas: None,
        }
    }

    #[test]
    fn test_terminal_states_cannot_reopen() {
        assert!(!ActionStatus::Completed.can_transition_to(ActionStatus::Pending));
        assert!(!ActionStatus::Cancelled.can_transition_to(ActionStatus::InProgress));
        assert!(ActionStatus::Completed.can_transition_to(ActionStatus::Completed));
    }

    #[test]
    fn test_open_states_move_freely() {
        assert!(ActionStatus::Pending.can_transition_to(ActionStatus::InProgress));
        assert!(ActionStatus::InProgress.can_transition_to(ActionStatus::Pending));
        assert!(ActionStatus::InProgress.can_transition_to(ActionStatus::Completed));
        assert!(ActionStatus::Pending.can_transition_to(ActionStatus::Cancelled));
    }

    #[test]
    fn test_overdue_requires_open_status() {
        let today = date("2023-06-01");
        assert!(action(ActionStatus::Pending, "2023-05-14").is_overdue(today));
        assert!(action(ActionStatus::InProgress, "2023-05-14").is_overdue(today));
        assert!(!action(ActionStatus::Completed, "2023-05-14").is_overdue(today));
        assert!(!action(ActionStatus::Pending, "2023-06-01").is_overdue(today));
    }

    #[test]
    fn test_event_status_derivation() {
        let today = date("2023-05-18");
        let pending = action(ActionStatus::Pending, "2023-05-14");
        let done = action(ActionStatus::Completed, "2023-05-14");
        assert_eq!(EventStatus::derive(Some(&pending), date("2023-05-14"), today), EventStatus::Vencido);
        assert_eq!(EventStatus::derive(Some(&done), date("2023-05-14"), today), EventStatus::Completado);
        assert_eq!(EventStatus::derive(None, date("2023-05-20"), today), EventStatus::Proximo);
        assert_eq!(EventStatus::derive(None, date("2023-05-25"), today), EventStatus::Pendiente);
    }

    #[test]
    fn test_status_wire_names() {
        assert_eq!(serde_json::to_string(&ActionStatus::InProgress).unwrap(), "\"en progreso\"");
        assert_eq!("completada".parse::<ActionStatus>().unwrap(), ActionStatus::Completed);
    }
}
