use chrono::NaiveDate;
use serde::{Deserialize, Serialize};
use validator::{Validate, ValidationError};

use crate::models::action::{ActionStatus, ActionType, ExecutiveAction, OTHER_OPTION};

// Request para registrar una acción ejecutiva
#[derive(Debug, Deserialize, Validate)]
#[validate(schema(function = "validate_custom_options", skip_on_field_errors = false))]
pub struct CreateActionRequest {
    pub tipo: ActionType,

    #[validate(length(min = 1, max = 500, message = "La descripción es requerida"))]
    pub descripcion: String,

    #[validate(length(min = 1, max = 100, message = "La categoría es requerida"))]
    pub categoria: String,

    pub categoria_personalizada: Option<String>,

    #[validate(length(min = 1, max = 100, message = "El usuario asignado es requerido"))]
    pub usuario_asignado: String,

    /// Hoy si no se envía
    pub fecha_asignacion: Option<NaiveDate>,

    #[validate(length(min = 1, max = 200, message = "El resultado esperado es requerido"))]
    pub resultado_esperado: String,

    pub resultado_personalizado: Option<String>,

    /// Asignación + 7 días si no se envía
    pub fecha_evaluacion: Option<NaiveDate>,

    #[validate(length(max = 1000))]
    pub notas: Option<String>,
}

fn filled(value: &Option<String>) -> bool {
    value.as_deref().map(|v| !v.trim().is_empty()).unwrap_or(false)
}

/// "Otro" exige el texto personalizado; la evaluación no puede preceder a la asignación
fn validate_custom_options(request: &CreateActionRequest) -> Result<(), ValidationError> {
    if request.categoria == OTHER_OPTION && !filled(&request.categoria_personalizada) {
        let mut error = ValidationError::new("categoria_personalizada");
        error.message = Some("Especifique la categoría personalizada".into());
        return Err(error);
    }

    if request.resultado_esperado == OTHER_OPTION && !filled(&request.resultado_personalizado) {
        let mut error = ValidationError::new("resultado_personalizado");
        error.message = Some("Especifique el resultado esperado".into());
        return Err(error);
    }

    if let (Some(asignacion), Some(evaluacion)) = (request.fecha_asignacion, request.fecha_evaluacion) {
        if evaluacion < asignacion {
            let mut error = ValidationError::new("fecha_evaluacion");
            error.message = Some("La fecha de evaluación no puede ser anterior a la asignación".into());
            return Err(error);
        }
    }

    Ok(())
}

impl CreateActionRequest {
    /// Categoría efectiva: la personalizada cuando se eligió "Otro"
    pub fn effective_category(&self) -> String {
        match (&self.categoria, &self.categoria_personalizada) {
            (c, Some(custom)) if c == OTHER_OPTION => custom.trim().to_string(),
            (c, _) => c.trim().to_string(),
        }
    }

    pub fn effective_result(&self) -> String {
        match (&self.resultado_esperado, &self.resultado_personalizado) {
            (r, Some(custom)) if r == OTHER_OPTION => custom.trim().to_string(),
            (r, _) => r.trim().to_string(),
        }
    }
}

// Request para cambiar el estado de una acción
#[derive(Debug, Deserialize)]
pub struct UpdateStatusRequest {
    pub estado: ActionStatus,
}

// Fila de la tabla de acciones
#[derive(Debug, Serialize)]
pub struct ActionRow {
    #[serde(flatten)]
    pub action: ExecutiveAction,
    pub vencida: bool,
    /// Enlace a la agenda con el evento de esta acción
    pub agenda_url: String,
}

impl ActionRow {
    pub fn new(action: ExecutiveAction, today: NaiveDate) -> Self {
        Self {
            vencida: action.is_overdue(today),
            agenda_url: format!("/agenda?accion={}", action.id),
            action,
        }
    }
}
