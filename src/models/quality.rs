//! Modelos de control de calidad (cadena de frío)
//!
//! Este módulo contiene los filtros de la página (CEDIS y rango de tiempo),
//! las instantáneas por vehículo, incidentes, lecturas y alertas.

use chrono::NaiveDateTime;
use serde::{Deserialize, Serialize};
use std::str::FromStr;

use crate::utils::errors::{validation_error, AppError};

/// Umbral superior nominal de temperatura (°C)
pub const NOMINAL_UPPER: f64 = 6.0;

/// Filtro de CEDIS
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub enum Facility {
    #[serde(rename = "all")]
    All,
    #[serde(rename = "cedis1")]
    Norte,
    #[serde(rename = "cedis2")]
    Sur,
    #[serde(rename = "cedis3")]
    Centro,
    #[serde(rename = "cedis4")]
    Oeste,
}

impl Facility {
    /// CEDIS reales, sin el filtro "Todos"
    pub const SITES: [Facility; 4] = [Facility::Norte, Facility::Sur, Facility::Centro, Facility::Oeste];

    pub fn id(&self) -> &'static str {
        match self {
            Facility::All => "all",
            Facility::Norte => "cedis1",
            Facility::Sur => "cedis2",
            Facility::Centro => "cedis3",
            Facility::Oeste => "cedis4",
        }
    }

    pub fn name(&self) -> &'static str {
        match self {
            Facility::All => "Todos",
            Facility::Norte => "CEDIS Norte",
            Facility::Sur => "CEDIS Sur",
            Facility::Centro => "CEDIS Centro",
            Facility::Oeste => "CEDIS Oeste",
        }
    }

    /// Ubicación del CEDIS; "Todos" usa el centro de la zona metropolitana
    pub fn base_coords(&self) -> Coords {
        let (lat, lng) = match self {
            Facility::All | Facility::Centro => (19.4326, -99.1332),
            Facility::Norte => (19.5467, -99.1937),
            Facility::Sur => (19.3030, -99.1506),
            Facility::Oeste => (19.3986, -99.2560),
        };
        Coords { lat, lng }
    }

    /// ¿Un registro de `site` pasa este filtro?
    pub fn matches(&self, site: Facility) -> bool {
        *self == Facility::All || *self == site
    }

    /// Catálogo para el selector de la página
    pub fn catalog() -> Vec<FacilityOption> {
        std::iter::once(Facility::All)
            .chain(Facility::SITES)
            .map(|f| FacilityOption {
                id: f.id(),
                name: f.name(),
            })
            .collect()
    }
}

impl FromStr for Facility {
    type Err = AppError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s.trim().to_lowercase().as_str() {
            "" | "all" | "todos" => Ok(Facility::All),
            "cedis1" => Ok(Facility::Norte),
            "cedis2" => Ok(Facility::Sur),
            "cedis3" => Ok(Facility::Centro),
            "cedis4" => Ok(Facility::Oeste),
            _ => Err(validation_error("cedis", "CEDIS desconocido")),
        }
    }
}

#[derive(Debug, Clone, Serialize)]
pub struct FacilityOption {
    pub id: &'static str,
    pub name: &'static str,
}

/// Rango de tiempo del tablero de calidad
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum TimeRange {
    Today,
    Week,
    Month,
}

impl TimeRange {
    /// Factor de escala del volumen de eventos respecto a un día
    pub fn multiplier(&self) -> u32 {
        match self {
            TimeRange::Today => 1,
            TimeRange::Week => 4,
            TimeRange::Month => 12,
        }
    }

    /// Máximo de incidentes por vehículo en el rango
    pub fn max_incidents(&self) -> u32 {
        2 * self.multiplier()
    }

    /// Días cubiertos por el rango
    pub fn days(&self) -> i64 {
        match self {
            TimeRange::Today => 1,
            TimeRange::Week => 7,
            TimeRange::Month => 28,
        }
    }

    /// Puntos de la serie de temperatura: horas para hoy, días para el resto
    pub fn timeline_points(&self) -> usize {
        match self {
            TimeRange::Today => 24,
            TimeRange::Week => 7,
            TimeRange::Month => 28,
        }
    }

    pub fn label(&self) -> &'static str {
        match self {
            TimeRange::Today => "Hoy",
            TimeRange::Week => "Última semana",
            TimeRange::Month => "Último mes",
        }
    }
}

impl FromStr for TimeRange {
    type Err = AppError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s.trim().to_lowercase().as_str() {
            "today" | "hoy" => Ok(TimeRange::Today),
            "week" | "semana" => Ok(TimeRange::Week),
            "" | "month" | "mes" => Ok(TimeRange::Month),
            _ => Err(validation_error("rango", "Rango de tiempo desconocido")),
        }
    }
}

/// Tipo de caja refrigerada
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub enum UnitType {
    Refrigerado,
    Congelado,
    Mixto,
}

/// Estado de cadena de frío del vehículo
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub enum ColdChainStatus {
    #[serde(rename = "Óptimo")]
    Optimo,
    Advertencia,
    Alerta,
}

impl ColdChainStatus {
    /// Estado derivado de los incidentes y la temperatura máxima
    pub fn derive(incident_count: usize, max_temp: f64) -> Self {
        if incident_count == 0 {
            ColdChainStatus::Optimo
        } else if max_temp <= 8.0 {
            ColdChainStatus::Advertencia
        } else {
            ColdChainStatus::Alerta
        }
    }
}

/// Entrega fuera de rango de temperatura
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq)]
pub struct Incident {
    pub id: String,
    pub timestamp: NaiveDateTime,
    pub temperature: f64,
    pub location: String,
    pub coords: Coords,
    pub client: String,
    pub details: String,
}

/// Instantánea de cadena de frío de un vehículo
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq)]
pub struct ColdChainVehicle {
    pub id: String,
    pub num_eco: String,
    #[serde(rename = "type")]
    pub unit_type: UnitType,
    pub status: ColdChainStatus,
    pub cedis: Facility,
    pub min_temp: f64,
    pub max_temp: f64,
    pub avg_temp: f64,
    /// Entregas dentro del rango nominal
    pub deliveries_in_range: u32,
    pub incidents: Vec<Incident>,
}

impl ColdChainVehicle {
    pub fn incident_count(&self) -> usize {
        self.incidents.len()
    }
}

/// Punto de la serie histórica de temperatura
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq)]
pub struct TemperaturePoint {
    pub time: String,
    pub datetime: NaiveDateTime,
    pub avg_temp: f64,
    pub min_temp: f64,
    pub max_temp: f64,
}

/// Severidad de una alerta
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum Severity {
    Low,
    Medium,
    High,
}

impl Severity {
    /// Severidad según la temperatura medida
    pub fn from_temperature(value: f64) -> Self {
        if value > 8.0 {
            Severity::High
        } else if value > 7.0 {
            Severity::Medium
        } else {
            Severity::Low
        }
    }

    pub fn label(&self) -> &'static str {
        match self {
            Severity::High => "Crítica",
            Severity::Medium => "Advertencia",
            Severity::Low => "Informativa",
        }
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub enum AlertStatus {
    Nueva,
    #[serde(rename = "En revisión")]
    EnRevision,
    Atendida,
}

#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct Coords {
    pub lat: f64,
    pub lng: f64,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct AlertLocation {
    pub zone: String,
    pub address: String,
    pub coords: Coords,
}

/// Alerta derivada de un incidente
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Alert {
    pub id: String,
    pub vehicle_id: String,
    pub vehicle_name: String,
    #[serde(rename = "type")]
    pub alert_type: String,
    pub severity: Severity,
    pub value: f64,
    pub timestamp: NaiveDateTime,
    pub status: AlertStatus,
    pub location: AlertLocation,
}

/// Resultado de una consulta de calidad: vehículos ya filtrados por CEDIS
#[derive(Debug, Clone, Serialize)]
pub struct QualityDataset {
    pub facility: Facility,
    pub range: TimeRange,
    pub vehicles: Vec<ColdChainVehicle>,
}
