//! Modelo de unidad de flota
//!
//! Este módulo contiene la unidad tal como la muestra la tabla operativa.
//! Mapea a la tabla `vehiculos` del esquema de Supabase.

use serde::{Deserialize, Serialize};
use std::fmt;
use std::str::FromStr;

use crate::utils::errors::AppError;

/// Estatus operativo de la unidad
#[derive(Debug, Clone, Copy, Serialize, Deserialize, PartialEq, Eq, Hash)]
pub enum VehicleStatus {
    #[serde(rename = "Ruta")]
    EnRuta,
    #[serde(rename = "Taller")]
    Taller,
    #[serde(rename = "Disponible")]
    Disponible,
    #[serde(rename = "Retorno")]
    Retorno,
    #[serde(rename = "CEDIS")]
    Cedis,
    #[serde(rename = "En rampa")]
    EnRampa,
    #[serde(rename = "Sin operador")]
    SinOperador,
}

impl VehicleStatus {
    pub fn as_str(&self) -> &'static str {
        match self {
            VehicleStatus::EnRuta => "Ruta",
            VehicleStatus::Taller => "Taller",
            VehicleStatus::Disponible => "Disponible",
            VehicleStatus::Retorno => "Retorno",
            VehicleStatus::Cedis => "CEDIS",
            VehicleStatus::EnRampa => "En rampa",
            VehicleStatus::SinOperador => "Sin operador",
        }
    }

    /// Unidad lista para asignarse a un viaje
    pub fn is_available(&self) -> bool {
        matches!(self, VehicleStatus::Disponible | VehicleStatus::Cedis)
    }
}

impl fmt::Display for VehicleStatus {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

impl FromStr for VehicleStatus {
    type Err = AppError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s.trim().to_lowercase().as_str() {
            "ruta" | "en ruta" | "en_ruta" => Ok(VehicleStatus::EnRuta),
            "taller" => Ok(VehicleStatus::Taller),
            "disponible" => Ok(VehicleStatus::Disponible),
            "retorno" => Ok(VehicleStatus::Retorno),
            "cedis" => Ok(VehicleStatus::Cedis),
            "en rampa" | "en_rampa" => Ok(VehicleStatus::EnRampa),
            "sin operador" | "sin_operador" => Ok(VehicleStatus::SinOperador),
            other => Err(AppError::Internal(format!("Estatus de vehículo desconocido: '{}'", other))),
        }
    }
}

/// Estado de la póliza de seguro
#[derive(Debug, Clone, Copy, Serialize, Deserialize, PartialEq, Eq)]
pub enum PolicyStatus {
    Vigente,
    Vencida,
}

impl FromStr for PolicyStatus {
    type Err = AppError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s.trim().to_lowercase().as_str() {
            "vigente" => Ok(PolicyStatus::Vigente),
            "vencida" => Ok(PolicyStatus::Vencida),
            other => Err(AppError::Internal(format!("Estado de póliza desconocido: '{}'", other))),
        }
    }
}

/// Unidad de la flota con sus indicadores
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq)]
pub struct FleetUnit {
    pub numero_eco: String,
    pub estatus: VehicleStatus,
    pub kilometros_acumulados: f64,
    /// `None` cuando la unidad no tiene operador
    pub operador_asignado: Option<String>,
    pub nivel_servicio: f64,
    pub rendimiento_promedio: f64,
    pub incidencias: u32,
    pub saldo_casetas: f64,
    pub km_para_servicio: f64,
    pub costo_por_km: f64,
    pub poliza_seguro: PolicyStatus,
    pub costo_mantenimiento: f64,
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_status_serde_uses_display_names() {
        let json = serde_json::to_string(&VehicleStatus::SinOperador).unwrap();
        assert_eq!(json, "\"Sin operador\"");
        let parsed: VehicleStatus = serde_json::from_str("\"CEDIS\"").unwrap();
        assert_eq!(parsed, VehicleStatus::Cedis);
    }

    #[test]
    fn test_status_from_database_text() {
        assert_eq!("en_rampa".parse::<VehicleStatus>().unwrap(), VehicleStatus::EnRampa);
        assert_eq!("Ruta".parse::<VehicleStatus>().unwrap(), VehicleStatus::EnRuta);
        assert!("volando".parse::<VehicleStatus>().is_err());
    }

    #[test]
    fn test_availability() {
        assert!(VehicleStatus::Disponible.is_available());
        assert!(VehicleStatus::Cedis.is_available());
        assert!(!VehicleStatus::Taller.is_available());
    }
}
