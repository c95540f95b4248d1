//! Repositorio de datos de muestra
//!
//! Sirve los conjuntos fijos de `sample_data` y genera al vuelo los datos de
//! cadena de frío. Con semilla la salida es reproducible; sin semilla cada
//! consulta produce datos nuevos.

use async_trait::async_trait;
use chrono::{Duration, Local, NaiveDateTime};
use rand::rngs::StdRng;
use rand::{Rng, SeedableRng};

use crate::models::finance::FinancialDataset;
use crate::models::quality::{
    ColdChainStatus, ColdChainVehicle, Coords, Facility, Incident, TemperaturePoint, TimeRange,
    UnitType, NOMINAL_UPPER,
};
use crate::models::trip::{OperationalCounters, Trip, TripSummary};
use crate::models::vehicle::FleetUnit;
use crate::presentation::kpi::{round1, series_stats};
use crate::repositories::fleet_data_source::FleetDataSource;
use crate::repositories::sample_data;
use crate::utils::errors::AppResult;

/// Vehículos refrigerados de la flota de muestra
pub const FLEET_SIZE: usize = 15;

const NORMAL_MIN: f64 = 1.5;
const INCIDENT_MIN: f64 = 6.1;
const INCIDENT_MAX: f64 = 10.5;

const UNIT_TYPES: [UnitType; 3] = [UnitType::Refrigerado, UnitType::Congelado, UnitType::Mixto];

const LOCATIONS: [&str; 5] = [
    "Av. Insurgentes Sur 1458",
    "Calz. de Tlalpan 3200",
    "Periférico Norte 850",
    "Av. Constituyentes 1001",
    "Eje Central Lázaro Cárdenas 480",
];

const CLIENTS: [&str; 5] = ["Cliente A", "Cliente B", "Cliente C", "Cliente D", "Cliente E"];

const DETAILS: [&str; 4] = [
    "Puerta abierta durante descarga",
    "Falla en sistema de refrigeración",
    "Demora prolongada en entrega",
    "Carga incorrecta de producto",
];

fn pick<'a, R: Rng>(rng: &mut R, items: &[&'a str]) -> &'a str {
    items[rng.gen_range(0..items.len())]
}

#[derive(Debug, Clone, Default)]
pub struct MockFleetRepository {
    seed: Option<u64>,
    anchor: Option<NaiveDateTime>,
}

impl MockFleetRepository {
    pub fn new(seed: Option<u64>) -> Self {
        Self { seed, anchor: None }
    }

    /// Fija el "ahora" de los datos generados
    pub fn with_anchor(mut self, anchor: NaiveDateTime) -> Self {
        self.anchor = Some(anchor);
        self
    }

    fn now(&self) -> NaiveDateTime {
        self.anchor.unwrap_or_else(|| Local::now().naive_local())
    }

    /// Un generador por consulta; la semilla se combina con el rango y el flujo
    fn rng_for(&self, range: TimeRange, stream: u64) -> StdRng {
        match self.seed {
            Some(seed) => StdRng::seed_from_u64(
                seed.wrapping_mul(31)
                    .wrapping_add(range.multiplier() as u64)
                    .wrapping_mul(7)
                    .wrapping_add(stream),
            ),
            None => StdRng::from_entropy(),
        }
    }

    /// Flota completa de los cuatro CEDIS, sin filtrar
    pub fn generate_vehicles(&self, range: TimeRange) -> Vec<ColdChainVehicle> {
        let mut rng = self.rng_for(range, 0);
        let now = self.now();
        let window_minutes = range.days() * 24 * 60;
        let mut vehicles = Vec::with_capacity(FLEET_SIZE);

        for i in 0..FLEET_SIZE {
            let site = Facility::SITES[i % Facility::SITES.len()];
            let unit_type = UNIT_TYPES[rng.gen_range(0..UNIT_TYPES.len())];
            let deliveries_in_range = rng.gen_range(8..=15) * range.multiplier();
            let incident_count = rng.gen_range(0..=range.max_incidents());

            let mut readings: Vec<f64> = (0..deliveries_in_range)
                .map(|_| round1(rng.gen_range(NORMAL_MIN..=NOMINAL_UPPER)))
                .collect();

            let base = site.base_coords();
            let mut incidents = Vec::with_capacity(incident_count as usize);
            for j in 0..incident_count {
                let temperature = round1(rng.gen_range(INCIDENT_MIN..=INCIDENT_MAX));
                let minutes_ago = rng.gen_range(0..window_minutes);
                incidents.push(Incident {
                    id: format!("INC-{}-{}", 1000 + i, j + 1),
                    timestamp: now - Duration::minutes(minutes_ago),
                    temperature,
                    location: pick(&mut rng, &LOCATIONS).to_string(),
                    coords: Coords {
                        lat: base.lat + rng.gen_range(-0.05..0.05),
                        lng: base.lng + rng.gen_range(-0.05..0.05),
                    },
                    client: pick(&mut rng, &CLIENTS).to_string(),
                    details: pick(&mut rng, &DETAILS).to_string(),
                });
            }
            incidents.sort_by(|a, b| b.timestamp.cmp(&a.timestamp));

            readings.extend(incidents.iter().map(|incident| incident.temperature));
            let (min_temp, max_temp, avg_temp) = series_stats(&readings)
                .map(|s| (s.min, s.max, round1(s.avg)))
                .unwrap_or((0.0, 0.0, 0.0));

            vehicles.push(ColdChainVehicle {
                id: format!("V-{}", 1000 + i),
                num_eco: format!("ECO-{}", 1000 + i),
                unit_type,
                status: ColdChainStatus::derive(incidents.len(), max_temp),
                cedis: site,
                min_temp,
                max_temp,
                avg_temp,
                deliveries_in_range,
                incidents,
            });
        }

        vehicles
    }

    pub fn generate_timeline(&self, range: TimeRange) -> Vec<TemperaturePoint> {
        let mut rng = self.rng_for(range, 1);
        let now = self.now();
        let points = range.timeline_points();

        (0..points)
            .map(|i| {
                let offset = (points - 1 - i) as i64;
                let (datetime, time) = match range {
                    TimeRange::Today => {
                        let at = now - Duration::hours(offset);
                        (at, at.format("%H:00").to_string())
                    }
                    TimeRange::Week | TimeRange::Month => {
                        let at = now - Duration::days(offset);
                        (at, at.format("%d/%m").to_string())
                    }
                };
                let min_temp = round1(rng.gen_range(1.5..=3.5));
                let max_temp = round1(rng.gen_range(4.5..=6.5));
                let avg_temp = round1(rng.gen_range(min_temp..=max_temp));
                TemperaturePoint {
                    time,
                    datetime,
                    avg_temp,
                    min_temp,
                    max_temp,
                }
            })
            .collect()
    }
}

#[async_trait]
impl FleetDataSource for MockFleetRepository {
    fn name(&self) -> &'static str {
        "mock"
    }

    async fn fetch_vehicles(
        &self,
        facility: Facility,
        range: TimeRange,
    ) -> AppResult<Vec<ColdChainVehicle>> {
        let vehicles = self
            .generate_vehicles(range)
            .into_iter()
            .filter(|v| facility.matches(v.cedis))
            .collect::<Vec<_>>();

        log::debug!(
            "🧊 {} vehículos generados para {} ({})",
            vehicles.len(),
            facility.name(),
            range.label()
        );
        Ok(vehicles)
    }

    async fn fetch_temperature_timeline(&self, range: TimeRange) -> AppResult<Vec<TemperaturePoint>> {
        Ok(self.generate_timeline(range))
    }

    async fn fetch_fleet_units(&self) -> AppResult<Vec<FleetUnit>> {
        Ok(sample_data::fleet_units())
    }

    async fn fetch_trips(&self) -> AppResult<Vec<Trip>> {
        Ok(sample_data::trips())
    }

    async fn fetch_operational_counters(&self) -> AppResult<OperationalCounters> {
        Ok(sample_data::operational_counters())
    }

    async fn fetch_trip_summary(&self) -> AppResult<TripSummary> {
        Ok(sample_data::trip_summary())
    }

    async fn fetch_financial_dataset(&self) -> AppResult<FinancialDataset> {
        Ok(sample_data::financial_dataset())
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use chrono::NaiveDate;

    fn repo() -> MockFleetRepository {
        let anchor = NaiveDate::from_ymd_opt(2024, 3, 15)
            .unwrap()
            .and_hms_opt(12, 0, 0)
            .unwrap();
        MockFleetRepository::new(Some(42)).with_anchor(anchor)
    }

    #[test]
    fn test_seeded_generation_is_reproducible() {
        let a = repo().generate_vehicles(TimeRange::Week);
        let b = repo().generate_vehicles(TimeRange::Week);
        assert_eq!(a, b);
    }

    #[test]
    fn test_fleet_spans_all_sites() {
        let vehicles = repo().generate_vehicles(TimeRange::Today);
        assert_eq!(vehicles.len(), FLEET_SIZE);
        for site in Facility::SITES {
            assert!(vehicles.iter().any(|v| v.cedis == site));
        }
    }

    #[test]
    fn test_incidents_are_above_threshold_and_bounded() {
        for range in [TimeRange::Today, TimeRange::Week, TimeRange::Month] {
            for vehicle in repo().generate_vehicles(range) {
                assert!(vehicle.incident_count() as u32 <= range.max_incidents());
                assert!(vehicle.incidents.iter().all(|i| i.temperature > NOMINAL_UPPER));
                assert!(vehicle.min_temp <= vehicle.avg_temp && vehicle.avg_temp <= vehicle.max_temp);
            }
        }
    }

    #[test]
    fn test_status_follows_incidents() {
        for vehicle in repo().generate_vehicles(TimeRange::Month) {
            if vehicle.incidents.is_empty() {
                assert_eq!(vehicle.status, ColdChainStatus::Optimo);
                assert!(vehicle.max_temp <= NOMINAL_UPPER);
            } else {
                assert_ne!(vehicle.status, ColdChainStatus::Optimo);
            }
        }
    }

    #[test]
    fn test_incidents_fall_inside_range_window() {
        let repo = repo();
        let now = repo.now();
        for vehicle in repo.generate_vehicles(TimeRange::Today) {
            for incident in vehicle.incidents {
                assert!(incident.timestamp <= now);
                assert!(now - incident.timestamp <= Duration::days(1));
            }
        }
    }

    #[test]
    fn test_timeline_shape() {
        let today = repo().generate_timeline(TimeRange::Today);
        assert_eq!(today.len(), 24);
        assert!(today.windows(2).all(|w| w[0].datetime < w[1].datetime));
        assert!(today.iter().all(|p| p.min_temp <= p.avg_temp && p.avg_temp <= p.max_temp));
        assert_eq!(repo().generate_timeline(TimeRange::Week).len(), 7);
    }

    #[tokio::test]
    async fn test_fetch_vehicles_filters_by_facility() {
        let vehicles = repo().fetch_vehicles(Facility::Sur, TimeRange::Week).await.unwrap();
        assert!(!vehicles.is_empty());
        assert!(vehicles.iter().all(|v| v.cedis == Facility::Sur));
    }
}
