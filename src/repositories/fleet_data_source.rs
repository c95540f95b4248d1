//! Interfaz de acceso a datos de la flota
//!
//! Las páginas del dashboard dependen sólo de este trait. La implementación
//! con datos de muestra y la de PostgreSQL son intercambiables, así que el
//! pipeline de presentación es el mismo sin importar el origen.

use async_trait::async_trait;

use crate::models::finance::FinancialDataset;
use crate::models::quality::{ColdChainVehicle, Facility, TemperaturePoint, TimeRange};
use crate::models::trip::{OperationalCounters, Trip, TripSummary};
use crate::models::vehicle::FleetUnit;
use crate::utils::errors::AppResult;

#[async_trait]
pub trait FleetDataSource: Send + Sync {
    /// Nombre del origen de datos, para logs y health check
    fn name(&self) -> &'static str;

    /// Instantáneas de cadena de frío ya filtradas por CEDIS
    async fn fetch_vehicles(
        &self,
        facility: Facility,
        range: TimeRange,
    ) -> AppResult<Vec<ColdChainVehicle>>;

    /// Serie de temperatura (promedio, mínima, máxima) del rango
    async fn fetch_temperature_timeline(&self, range: TimeRange) -> AppResult<Vec<TemperaturePoint>>;

    async fn fetch_fleet_units(&self) -> AppResult<Vec<FleetUnit>>;

    /// Viajes ordenados por fecha de salida
    async fn fetch_trips(&self) -> AppResult<Vec<Trip>>;

    async fn fetch_operational_counters(&self) -> AppResult<OperationalCounters>;

    /// Viajes por cliente, por camión, por día y destinos
    async fn fetch_trip_summary(&self) -> AppResult<TripSummary>;

    async fn fetch_financial_dataset(&self) -> AppResult<FinancialDataset>;
}
