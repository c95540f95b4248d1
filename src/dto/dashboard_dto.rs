//! Parámetros de query de las páginas del dashboard
//!
//! Cada request trae su propio estado de página (filtros, página, columnas
//! ocultas, filas expandidas); el servidor no guarda estado de filtros.

use serde::Deserialize;
use validator::Validate;

use crate::models::quality::{Facility, TimeRange};
use crate::utils::errors::AppResult;
use crate::utils::validation::parse_csv_list;

#[derive(Debug, Default, Deserialize)]
pub struct FinancialQuery {
    /// Semanas visibles en la gráfica semanal
    pub weeks: Option<usize>,
}

#[derive(Debug, Default, Deserialize, Validate)]
pub struct PageQuery {
    /// Fuera de rango se acota a la primera o última página
    pub page: Option<u32>,
    #[validate(range(min = 1, max = 100, message = "El tamaño de página debe estar entre 1 y 100"))]
    pub page_size: Option<u32>,
}

#[derive(Debug, Default, Deserialize, Validate)]
pub struct FleetTableQuery {
    pub page: Option<u32>,
    #[validate(range(min = 1, max = 100, message = "El tamaño de página debe estar entre 1 y 100"))]
    pub page_size: Option<u32>,
    /// Columnas ocultas, separadas por coma
    pub hidden: Option<String>,
}

impl FleetTableQuery {
    pub fn hidden_columns(&self) -> Vec<String> {
        parse_csv_list(self.hidden.as_deref())
    }
}

#[derive(Debug, Default, Deserialize, Validate)]
pub struct QualityQuery {
    pub cedis: Option<String>,
    pub rango: Option<String>,
    pub page: Option<u32>,
    #[validate(range(min = 1, max = 100, message = "El tamaño de página debe estar entre 1 y 100"))]
    pub page_size: Option<u32>,
    /// Vehículos con la fila de incidentes expandida, separados por coma
    pub expanded: Option<String>,
}

impl QualityQuery {
    pub fn filters(&self) -> AppResult<(Facility, TimeRange)> {
        Ok((
            self.cedis.as_deref().unwrap_or("all").parse()?,
            self.rango.as_deref().unwrap_or("month").parse()?,
        ))
    }

    pub fn expanded_ids(&self) -> Vec<String> {
        parse_csv_list(self.expanded.as_deref())
    }
}

#[derive(Debug, Default, Deserialize)]
pub struct AlertsQuery {
    pub cedis: Option<String>,
    pub rango: Option<String>,
    /// Pestaña: all, high, medium o low
    pub severidad: Option<String>,
}

impl AlertsQuery {
    pub fn filters(&self) -> AppResult<(Facility, TimeRange)> {
        Ok((
            self.cedis.as_deref().unwrap_or("all").parse()?,
            self.rango.as_deref().unwrap_or("month").parse()?,
        ))
    }
}

#[derive(Debug, Default, Deserialize)]
pub struct AgendaQuery {
    /// Mes visible con formato YYYY-MM
    pub mes: Option<String>,
}
