//! Agenda de evaluaciones
//!
//! Vista mensual con el color de cada día, eventos de un día y enlace
//! directo desde una acción.

use chrono::{Datelike, Duration, Local, NaiveDate};
use serde::Serialize;
use std::sync::Arc;
use tokio::sync::RwLock;

use crate::models::action::{CalendarEvent, EventStatus, ExecutiveAction};
use crate::services::action_service::ActionBook;
use crate::state::AppState;
use crate::utils::errors::{field_error, not_found_error, AppResult};
use crate::utils::validation::{validate_date, validate_month};

const MONTHS: [&str; 12] = [
    "enero", "febrero", "marzo", "abril", "mayo", "junio", "julio", "agosto", "septiembre",
    "octubre", "noviembre", "diciembre",
];

#[derive(Debug, Clone, Serialize)]
pub struct LegendEntry {
    pub status: EventStatus,
    pub label: &'static str,
    pub color: &'static str,
}

/// Día marcado en el calendario; el color es el del primer evento
#[derive(Debug, Clone, Serialize)]
pub struct DayMarker {
    pub date: NaiveDate,
    pub status: EventStatus,
    pub color: &'static str,
    pub events: usize,
}

#[derive(Debug, Clone, Serialize)]
pub struct AgendaMonth {
    pub mes: String,
    pub titulo: String,
    pub days: Vec<DayMarker>,
    pub legend: Vec<LegendEntry>,
}

/// Evento con su estado derivado y la acción vinculada
#[derive(Debug, Clone, Serialize)]
pub struct AgendaEvent {
    #[serde(flatten)]
    pub event: CalendarEvent,
    pub status: EventStatus,
    pub status_label: &'static str,
    pub color: &'static str,
    pub accion: Option<ExecutiveAction>,
}

#[derive(Debug, Clone, Serialize)]
pub struct AgendaDay {
    pub fecha: NaiveDate,
    pub events: Vec<AgendaEvent>,
}

/// Enlace desde la tabla de acciones: mes y eventos de la acción
#[derive(Debug, Clone, Serialize)]
pub struct ActionAgenda {
    pub accion: ExecutiveAction,
    pub mes: String,
    pub events: Vec<AgendaEvent>,
}

fn month_key(date: NaiveDate) -> String {
    date.format("%Y-%m").to_string()
}

fn month_title(date: NaiveDate) -> String {
    format!("{} {}", MONTHS[date.month0() as usize], date.year())
}

fn legend() -> Vec<LegendEntry> {
    EventStatus::LEGEND
        .iter()
        .map(|status| LegendEntry {
            status: *status,
            label: status.label(),
            color: status.color(),
        })
        .collect()
}

pub struct AgendaService {
    book: Arc<RwLock<ActionBook>>,
    today: NaiveDate,
}

impl AgendaService {
    pub fn new(state: &AppState) -> Self {
        Self {
            book: state.actions.clone(),
            today: Local::now().date_naive(),
        }
    }

    pub fn with_today(mut self, today: NaiveDate) -> Self {
        self.today = today;
        self
    }

    fn describe(&self, book: &ActionBook, event: &CalendarEvent) -> AgendaEvent {
        let accion = book.action(event.accion_id).cloned();
        let status = EventStatus::derive(accion.as_ref(), event.date, self.today);
        AgendaEvent {
            event: event.clone(),
            status,
            status_label: status.label(),
            color: status.color(),
            accion,
        }
    }

    /// Vista mensual; sin `mes` se usa el mes actual
    pub async fn month(&self, mes: Option<&str>) -> AppResult<AgendaMonth> {
        let first = match mes {
            Some(raw) => validate_month(raw).map_err(|e| field_error("mes", e))?,
            None => self.today.with_day(1).unwrap_or(self.today),
        };
        let next_month = (first + Duration::days(31)).with_day(1).unwrap_or(first);

        let book = self.book.read().await;
        let mut in_month: Vec<&CalendarEvent> = book
            .events
            .iter()
            .filter(|e| e.date >= first && e.date < next_month)
            .collect();
        in_month.sort_by_key(|e| (e.date, e.id));

        let mut days: Vec<DayMarker> = Vec::new();
        for event in in_month {
            if let Some(day) = days.last_mut().filter(|d| d.date == event.date) {
                day.events += 1;
                continue;
            }
            let status = self.describe(&book, event).status;
            days.push(DayMarker {
                date: event.date,
                status,
                color: status.color(),
                events: 1,
            });
        }

        Ok(AgendaMonth {
            mes: month_key(first),
            titulo: month_title(first),
            days,
            legend: legend(),
        })
    }

    pub async fn day(&self, fecha: &str) -> AppResult<AgendaDay> {
        let fecha = validate_date(fecha).map_err(|e| field_error("fecha", e))?;
        let book = self.book.read().await;
        let events = book
            .events
            .iter()
            .filter(|e| e.date == fecha)
            .map(|e| self.describe(&book, e))
            .collect();

        Ok(AgendaDay { fecha, events })
    }

    pub async fn for_action(&self, id: u32) -> AppResult<ActionAgenda> {
        let book = self.book.read().await;
        let accion = book
            .action(id)
            .cloned()
            .ok_or_else(|| not_found_error("Acción", &id.to_string()))?;

        let mut events: Vec<AgendaEvent> = book
            .events
            .iter()
            .filter(|e| e.accion_id == id)
            .map(|e| self.describe(&book, e))
            .collect();
        events.sort_by_key(|e| e.event.date);

        let anchor = events.first().map(|e| e.event.date).unwrap_or(accion.fecha_evaluacion);

        Ok(ActionAgenda {
            mes: month_key(anchor),
            accion,
            events,
        })
    }
}
