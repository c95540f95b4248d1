//! Control de calidad de la cadena de frío
//!
//! Pipeline de la página: filtro (CEDIS y rango) -> consulta al origen de
//! datos -> KPIs sobre el subconjunto filtrado -> paginación de la tabla de
//! incidencias por unidad. Las alertas se derivan de los incidentes.

use chrono::{Duration, Local, NaiveDateTime};
use serde::Serialize;
use std::str::FromStr;
use std::sync::Arc;
use validator::Validate;

use crate::dto::dashboard_dto::{AlertsQuery, QualityQuery};
use crate::models::quality::{
    Alert, AlertLocation, AlertStatus, ColdChainVehicle, Facility, FacilityOption, Incident,
    Severity, TimeRange, NOMINAL_UPPER,
};
use crate::presentation::chart::{ChartConfig, ChartData, ChartKind, SeriesConfig};
use crate::presentation::gauge::{GaugeConfig, GaugeReading, GaugeStatus};
use crate::presentation::kpi::{average, round1};
use crate::presentation::table::{render_table, ColumnDescriptor, RenderedTable};
use crate::presentation::{format_metric, FormatKind, KpiCard, PageView, Paginator};
use crate::repositories::FleetDataSource;
use crate::state::AppState;
use crate::utils::errors::{validation_error, AppError, AppResult};

pub const NO_ALERTS_MESSAGE: &str = "No hay alertas en esta categoría";

const AVG_COLOR: &str = "#36A2EB";
const MIN_COLOR: &str = "#4BC0C0";
const MAX_COLOR: &str = "#FF6384";

/// Fila de la tabla "Incidencias por unidad"
#[derive(Debug, Clone, Serialize)]
pub struct VehicleIncidentRow {
    pub id: String,
    pub num_eco: String,
    pub incidencias: usize,
    pub temp_min: String,
    pub temp_max: String,
    pub temp_promedio: String,
    /// Tono del promedio respecto a la banda óptima
    pub tono: GaugeStatus,
    pub expandible: bool,
    pub expandida: bool,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub detalle: Option<RenderedTable>,
}

#[derive(Debug, Clone, Serialize)]
struct IncidentDetail {
    fecha: String,
    hora: String,
    temperatura: f64,
    cliente: String,
    detalles: String,
}

impl From<&Incident> for IncidentDetail {
    fn from(incident: &Incident) -> Self {
        Self {
            fecha: incident.timestamp.format("%d/%m/%Y").to_string(),
            hora: incident.timestamp.format("%H:%M").to_string(),
            temperatura: incident.temperature,
            cliente: incident.client.clone(),
            detalles: incident.details.clone(),
        }
    }
}

#[derive(Debug, Clone, Serialize)]
pub struct QualityDashboard {
    pub titulo: &'static str,
    pub subtitulo: &'static str,
    pub cedis: Facility,
    pub rango: TimeRange,
    pub rango_label: &'static str,
    pub catalogo: Vec<FacilityOption>,
    pub kpis: Vec<KpiCard>,
    pub temperatura_promedio: GaugeReading,
    pub incidencias: PageView<VehicleIncidentRow>,
    pub historial: ChartData,
}

/// Pestaña de severidad del listado de alertas
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
#[serde(rename_all = "lowercase")]
pub enum SeverityTab {
    All,
    High,
    Medium,
    Low,
}

impl SeverityTab {
    pub const ALL: [SeverityTab; 4] = [SeverityTab::All, SeverityTab::High, SeverityTab::Medium, SeverityTab::Low];

    pub fn matches(&self, severity: Severity) -> bool {
        match self {
            SeverityTab::All => true,
            SeverityTab::High => severity == Severity::High,
            SeverityTab::Medium => severity == Severity::Medium,
            SeverityTab::Low => severity == Severity::Low,
        }
    }

    fn label(&self) -> &'static str {
        match self {
            SeverityTab::All => "Todas",
            SeverityTab::High => "Críticas",
            SeverityTab::Medium => "Advertencias",
            SeverityTab::Low => "Informativas",
        }
    }
}

impl FromStr for SeverityTab {
    type Err = AppError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s.trim().to_lowercase().as_str() {
            "" | "all" => Ok(SeverityTab::All),
            "high" => Ok(SeverityTab::High),
            "medium" => Ok(SeverityTab::Medium),
            "low" => Ok(SeverityTab::Low),
            _ => Err(validation_error("severidad", "Severidad desconocida")),
        }
    }
}

#[derive(Debug, Clone, Serialize)]
pub struct AlertTab {
    pub id: SeverityTab,
    pub label: String,
    pub count: usize,
}

#[derive(Debug, Clone, Serialize)]
struct AlertView {
    severidad: &'static str,
    vehiculo: String,
    tipo: String,
    valor: f64,
    ubicacion: String,
    hora: String,
    estado: AlertStatus,
}

#[derive(Debug, Clone, Serialize)]
pub struct AlertsPanel {
    pub seleccionada: SeverityTab,
    pub tabs: Vec<AlertTab>,
    pub alertas: Vec<Alert>,
    pub tabla: RenderedTable,
}

/// Estado de una alerta según la antigüedad del incidente
pub fn alert_status(age: Duration) -> AlertStatus {
    if age < Duration::days(1) {
        AlertStatus::Nueva
    } else if age < Duration::days(3) {
        AlertStatus::EnRevision
    } else {
        AlertStatus::Atendida
    }
}

/// Una alerta por incidente, la más reciente primero
pub fn derive_alerts(vehicles: &[ColdChainVehicle], now: NaiveDateTime) -> Vec<Alert> {
    let mut alerts: Vec<Alert> = vehicles
        .iter()
        .flat_map(|vehicle| {
            vehicle.incidents.iter().map(move |incident| Alert {
                id: format!("ALT-{}", incident.id),
                vehicle_id: vehicle.id.clone(),
                vehicle_name: vehicle.num_eco.clone(),
                alert_type: "Temperatura".to_string(),
                severity: Severity::from_temperature(incident.temperature),
                value: incident.temperature,
                timestamp: incident.timestamp,
                status: alert_status(now - incident.timestamp),
                location: AlertLocation {
                    zone: vehicle.cedis.name().to_string(),
                    address: incident.location.clone(),
                    coords: incident.coords,
                },
            })
        })
        .collect();
    alerts.sort_by(|a, b| b.timestamp.cmp(&a.timestamp));
    alerts
}

fn incident_columns() -> Vec<ColumnDescriptor> {
    vec![
        ColumnDescriptor::new("fecha", "Fecha"),
        ColumnDescriptor::new("hora", "Hora"),
        ColumnDescriptor::new("temperatura", "Temperatura").formatted(FormatKind::Temperature),
        ColumnDescriptor::new("cliente", "Cliente"),
        ColumnDescriptor::new("detalles", "Detalles"),
    ]
}

fn alert_columns() -> Vec<ColumnDescriptor> {
    vec![
        ColumnDescriptor::new("severidad", "Severidad"),
        ColumnDescriptor::new("vehiculo", "Vehículo"),
        ColumnDescriptor::new("tipo", "Tipo"),
        ColumnDescriptor::new("valor", "Valor").formatted(FormatKind::Temperature),
        ColumnDescriptor::new("ubicacion", "Ubicación"),
        ColumnDescriptor::new("hora", "Hora"),
        ColumnDescriptor::new("estado", "Estado"),
    ]
}

fn temperature_history() -> ChartConfig {
    ChartConfig::new(ChartKind::Line, "Historial de temperatura", "time", FormatKind::Temperature)
        .series(SeriesConfig::new("avg_temp", "Promedio", AVG_COLOR))
        .series(SeriesConfig::new("min_temp", "Mínima", MIN_COLOR))
        .series(SeriesConfig::new("max_temp", "Máxima", MAX_COLOR))
}

fn incident_row(
    vehicle: &ColdChainVehicle,
    expanded: &[String],
    gauge: &GaugeConfig,
) -> AppResult<VehicleIncidentRow> {
    let expandible = vehicle.incident_count() > 0;
    let expandida = expandible && expanded.iter().any(|id| id == &vehicle.id);

    let detalle = if expandida {
        let details: Vec<IncidentDetail> = vehicle.incidents.iter().map(IncidentDetail::from).collect();
        Some(
            render_table(&details, &incident_columns())?
                .with_title(&format!("Detalles de incidencias (Temperatura > {}°C)", NOMINAL_UPPER)),
        )
    } else {
        None
    };

    Ok(VehicleIncidentRow {
        id: vehicle.id.clone(),
        num_eco: vehicle.num_eco.clone(),
        incidencias: vehicle.incident_count(),
        temp_min: format_metric(vehicle.min_temp, FormatKind::Temperature),
        temp_max: format_metric(vehicle.max_temp, FormatKind::Temperature),
        temp_promedio: format_metric(vehicle.avg_temp, FormatKind::Temperature),
        tono: gauge.status(vehicle.avg_temp),
        expandible,
        expandida,
        detalle,
    })
}

/// KPIs de entregas y temperatura promedio del subconjunto recibido
pub fn quality_kpis(vehicles: &[ColdChainVehicle]) -> (Vec<KpiCard>, Option<f64>) {
    let below: u32 = vehicles.iter().map(|v| v.deliveries_in_range).sum();
    let above: usize = vehicles.iter().map(|v| v.incident_count()).sum();
    let averages: Vec<f64> = vehicles.iter().map(|v| v.avg_temp).collect();
    let avg_temp = average(&averages).map(round1);

    let kpis = vec![
        KpiCard::new("entregas_en_rango", "Entregas < 6°C", Some(below as f64), FormatKind::Count)
            .with_description("Número de pedidos entregados a menos de 6°C"),
        KpiCard::new("entregas_fuera_rango", "Entregas > 6°C", Some(above as f64), FormatKind::Count)
            .with_description("Número de pedidos entregados a más de 6°C (fuera de rango)"),
        KpiCard::new(
            "temperatura_promedio",
            "Temperatura de entrega promedio",
            avg_temp,
            FormatKind::Temperature,
        ),
    ];
    (kpis, avg_temp)
}

pub struct QualityService {
    data_source: Arc<dyn FleetDataSource>,
    default_page_size: usize,
    gauge: GaugeConfig,
    now: Option<NaiveDateTime>,
}

impl QualityService {
    pub fn new(state: &AppState) -> Self {
        Self {
            data_source: state.data_source.clone(),
            default_page_size: state.config.default_page_size,
            gauge: GaugeConfig::default(),
            now: None,
        }
    }

    /// Fija el "ahora" usado para el estado de las alertas
    pub fn with_now(mut self, now: NaiveDateTime) -> Self {
        self.now = Some(now);
        self
    }

    fn now(&self) -> NaiveDateTime {
        self.now.unwrap_or_else(|| Local::now().naive_local())
    }

    async fn filtered_vehicles(&self, facility: Facility, range: TimeRange) -> AppResult<Vec<ColdChainVehicle>> {
        let mut vehicles = self.data_source.fetch_vehicles(facility, range).await?;
        vehicles.retain(|v| facility.matches(v.cedis));
        log::debug!(
            "🌡️ {} vehículos para {} ({})",
            vehicles.len(),
            facility.name(),
            range.label()
        );
        Ok(vehicles)
    }

    pub async fn dashboard(&self, query: &QualityQuery) -> AppResult<QualityDashboard> {
        query.validate()?;
        let (facility, range) = query.filters()?;
        let vehicles = self.filtered_vehicles(facility, range).await?;
        let timeline = self.data_source.fetch_temperature_timeline(range).await?;

        let (kpis, avg_temp) = quality_kpis(&vehicles);

        let expanded = query.expanded_ids();
        let paginator = Paginator::new(
            vehicles.len(),
            query.page_size.map(|s| s as usize).unwrap_or(self.default_page_size),
            query.page.map(|p| p as usize).unwrap_or(1),
        );
        let incidencias = paginator
            .view(&vehicles)
            .try_map(|v| incident_row(&v, &expanded, &self.gauge))?;

        Ok(QualityDashboard {
            titulo: "Control de Calidad",
            subtitulo: "Monitoreo en tiempo real de la cadena de frío y control de flota",
            cedis: facility,
            rango: range,
            rango_label: range.label(),
            catalogo: Facility::catalog(),
            kpis,
            temperatura_promedio: self.gauge.read(avg_temp),
            incidencias,
            historial: ChartData::build(&timeline, &temperature_history())?,
        })
    }

    pub async fn alerts(&self, query: &AlertsQuery) -> AppResult<AlertsPanel> {
        let (facility, range) = query.filters()?;
        let tab: SeverityTab = query.severidad.as_deref().unwrap_or("all").parse()?;
        let vehicles = self.filtered_vehicles(facility, range).await?;
        let all = derive_alerts(&vehicles, self.now());

        let tabs = SeverityTab::ALL
            .iter()
            .map(|t| {
                let count = all.iter().filter(|a| t.matches(a.severity)).count();
                AlertTab {
                    id: *t,
                    label: format!("{} ({})", t.label(), count),
                    count,
                }
            })
            .collect();

        let alertas: Vec<Alert> = all.into_iter().filter(|a| tab.matches(a.severity)).collect();
        let views: Vec<AlertView> = alertas
            .iter()
            .map(|a| AlertView {
                severidad: a.severity.label(),
                vehiculo: a.vehicle_name.clone(),
                tipo: a.alert_type.clone(),
                valor: a.value,
                ubicacion: format!("{} - {}", a.location.zone, a.location.address),
                hora: a.timestamp.format("%d/%m %H:%M").to_string(),
                estado: a.status,
            })
            .collect();

        Ok(AlertsPanel {
            seleccionada: tab,
            tabs,
            tabla: render_table(&views, &alert_columns())?.with_empty_message(NO_ALERTS_MESSAGE),
            alertas,
        })
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::config::environment::EnvironmentConfig;
    use crate::models::quality::{ColdChainStatus, Coords, UnitType};
    use crate::presentation::table::TableRow;
    use crate::repositories::MockFleetRepository;
    use crate::services::identity_service::SupabaseIdentityClient;
    use chrono::NaiveDate;

    fn now() -> NaiveDateTime {
        NaiveDate::from_ymd_opt(2023, 6, 15)
            .unwrap()
            .and_hms_opt(12, 0, 0)
            .unwrap()
    }

    fn state() -> AppState {
        let config = EnvironmentConfig::default();
        let identity = SupabaseIdentityClient::from_config(&config).unwrap();
        AppState::new(
            config,
            Arc::new(MockFleetRepository::new(Some(11)).with_anchor(now())),
            Arc::new(identity),
        )
    }

    fn vehicle(id: &str, cedis: Facility, temps: &[(i64, f64)]) -> ColdChainVehicle {
        ColdChainVehicle {
            id: id.to_string(),
            num_eco: format!("ECO-{}", id),
            unit_type: UnitType::Refrigerado,
            status: ColdChainStatus::Optimo,
            cedis,
            min_temp: 2.0,
            max_temp: 9.0,
            avg_temp: 4.0,
            deliveries_in_range: 10,
            incidents: temps
                .iter()
                .enumerate()
                .map(|(i, (hours_ago, temperature))| Incident {
                    id: format!("INC-{}-{}", id, i + 1),
                    timestamp: now() - Duration::hours(*hours_ago),
                    temperature: *temperature,
                    location: "Av. Insurgentes Sur 1234".to_string(),
                    coords: Coords { lat: 19.3, lng: -99.1 },
                    client: "Cliente A".to_string(),
                    details: "Puerta abierta".to_string(),
                })
                .collect(),
        }
    }

    #[test]
    fn test_alert_status_by_age() {
        assert_eq!(alert_status(Duration::hours(2)), AlertStatus::Nueva);
        assert_eq!(alert_status(Duration::hours(30)), AlertStatus::EnRevision);
        assert_eq!(alert_status(Duration::days(5)), AlertStatus::Atendida);
    }

    #[test]
    fn test_alerts_follow_incidents() {
        let vehicles = vec![
            vehicle("A", Facility::Sur, &[(80, 6.5), (1, 9.2)]),
            vehicle("B", Facility::Norte, &[(30, 7.4)]),
        ];
        let alerts = derive_alerts(&vehicles, now());

        assert_eq!(alerts.len(), 3);
        assert_eq!(alerts[0].severity, Severity::High);
        assert_eq!(alerts[0].status, AlertStatus::Nueva);
        assert_eq!(alerts[0].location.zone, "CEDIS Sur");
        assert_eq!(alerts[1].vehicle_name, "ECO-B");
        assert_eq!(alerts[2].status, AlertStatus::Atendida);
    }

    #[test]
    fn test_kpis_on_subset() {
        let mut a = vehicle("A", Facility::Sur, &[(1, 7.0)]);
        a.avg_temp = 3.0;
        let mut b = vehicle("B", Facility::Sur, &[]);
        b.avg_temp = 5.0;
        let (kpis, avg) = quality_kpis(&[a, b]);
        assert_eq!(avg, Some(4.0));
        assert_eq!(kpis[0].display, "20");
        assert_eq!(kpis[1].display, "1");
        assert_eq!(kpis[2].display, "4.0°C");
    }

    #[test]
    fn test_empty_subset_has_placeholder_average() {
        let (kpis, avg) = quality_kpis(&[]);
        assert_eq!(avg, None);
        assert_eq!(kpis[2].display, "--");
    }

    #[tokio::test]
    async fn test_dashboard_filters_before_kpis() {
        let state = state();
        let query = QualityQuery {
            cedis: Some("cedis2".to_string()),
            rango: Some("week".to_string()),
            page_size: Some(20),
            ..Default::default()
        };
        let dashboard = QualityService::new(&state).dashboard(&query).await.unwrap();

        let expected = MockFleetRepository::new(Some(11))
            .with_anchor(now())
            .generate_vehicles(TimeRange::Week)
            .into_iter()
            .filter(|v| v.cedis == Facility::Sur)
            .collect::<Vec<_>>();
        let expected_avg = average(&expected.iter().map(|v| v.avg_temp).collect::<Vec<_>>()).map(round1);

        assert_eq!(dashboard.cedis, Facility::Sur);
        assert_eq!(dashboard.incidencias.total_items, expected.len());
        assert_eq!(dashboard.temperatura_promedio.value, expected_avg);
        assert_eq!(dashboard.historial.records.len(), 7);
    }

    #[tokio::test]
    async fn test_expanded_rows_carry_detail() {
        let state = state();
        let vehicles = MockFleetRepository::new(Some(11))
            .with_anchor(now())
            .generate_vehicles(TimeRange::Month);
        let Some(target) = vehicles.iter().find(|v| v.incident_count() > 0) else {
            return;
        };

        let query = QualityQuery {
            page_size: Some(100),
            expanded: Some(format!("{},V-9999", target.id)),
            ..Default::default()
        };
        let dashboard = QualityService::new(&state).dashboard(&query).await.unwrap();
        let row = dashboard
            .incidencias
            .items
            .iter()
            .find(|r| r.id == target.id)
            .unwrap();
        assert!(row.expandida);
        let detail = row.detalle.as_ref().unwrap();
        assert_eq!(detail.headers, vec!["Fecha", "Hora", "Temperatura", "Cliente", "Detalles"]);
        assert_eq!(detail.rows.len(), target.incident_count());

        let collapsed = dashboard.incidencias.items.iter().filter(|r| r.id != target.id);
        assert!(collapsed.into_iter().all(|r| r.detalle.is_none()));
    }

    #[tokio::test]
    async fn test_alert_tabs_and_empty_message() {
        let state = state();
        let service = QualityService::new(&state).with_now(now());
        let panel = service.alerts(&AlertsQuery::default()).await.unwrap();

        let total = panel.tabs[0].count;
        let split: usize = panel.tabs[1..].iter().map(|t| t.count).sum();
        assert_eq!(total, split);
        assert_eq!(panel.tabs[0].label, format!("Todas ({})", total));

        let empty = render_table(&Vec::<AlertView>::new(), &alert_columns())
            .unwrap()
            .with_empty_message(NO_ALERTS_MESSAGE);
        match &empty.rows[0] {
            TableRow::Empty { message, colspan } => {
                assert_eq!(message, NO_ALERTS_MESSAGE);
                assert_eq!(*colspan, 7);
            }
            other => panic!("fila inesperada: {:?}", other),
        }

        let invalid = AlertsQuery {
            severidad: Some("urgente".to_string()),
            ..Default::default()
        };
        assert!(matches!(service.alerts(&invalid).await, Err(AppError::Validation(_))));
    }
}
