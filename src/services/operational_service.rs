//! Dashboard de eficiencia operativa
//!
//! Contadores del período, porcentajes de cumplimiento, viajes por cliente,
//! camión y día, tabla de unidades con columnas configurables, destinos y
//! viajes paginados.

use serde::Serialize;
use std::sync::Arc;
use validator::Validate;

use crate::dto::dashboard_dto::{FleetTableQuery, PageQuery};
use crate::models::trip::{OperationalCounters, Trip, TripSummary};
use crate::models::vehicle::FleetUnit;
use crate::presentation::chart::{doughnut, ChartConfig, ChartData, ChartKind, DoughnutChart, SeriesConfig};
use crate::presentation::table::{
    apply_visibility, drill_down, render_page, render_table, ColumnDescriptor, RenderedTable, TablePage,
};
use crate::presentation::{kpi_percentage, FormatKind, KpiCard, KpiSemantic, Paginator};
use crate::repositories::FleetDataSource;
use crate::state::AppState;
use crate::utils::errors::{not_found_error, AppResult};

pub const TRIPS_COLOR: &str = "#FF9900";

#[derive(Debug, Clone, Serialize)]
pub struct OperationalDashboard {
    pub titulo: &'static str,
    pub subtitulo: &'static str,
    pub kpis: Vec<KpiCard>,
    pub cumplimiento_entregas: KpiCard,
    pub uso_combustible: KpiCard,
    pub disponibilidad_flota: KpiCard,
    pub viajes_por_cliente: DoughnutChart,
    pub viajes_por_camion: DoughnutChart,
    pub viajes_diarios: ChartData,
    pub destinos: RenderedTable,
}

/// Fila de la tabla de viajes
#[derive(Debug, Clone, Serialize)]
pub struct TripView {
    pub id: String,
    pub salida: String,
    pub cliente: String,
    pub destino: String,
    pub vehiculo: String,
    pub operador: String,
    pub entregas: u32,
    pub ingreso: f64,
    pub gastos: f64,
    pub utilidad: f64,
}

impl From<&Trip> for TripView {
    fn from(trip: &Trip) -> Self {
        Self {
            id: trip.id.clone(),
            salida: trip.salida.format("%d/%m/%Y %H:%M").to_string(),
            cliente: trip.cliente.clone(),
            destino: trip.destino.clone(),
            vehiculo: trip.vehiculo.clone(),
            operador: trip.operador.clone(),
            entregas: trip.entregas,
            ingreso: trip.ingreso,
            gastos: trip.total_gastos(),
            utilidad: trip.utilidad(),
        }
    }
}

pub fn fleet_columns() -> Vec<ColumnDescriptor> {
    vec![
        ColumnDescriptor::new("numero_eco", "No. Económico"),
        ColumnDescriptor::new("estatus", "Estatus"),
        ColumnDescriptor::new("kilometros_acumulados", "Km Acumulados").formatted(FormatKind::Count),
        ColumnDescriptor::new("operador_asignado", "Operador"),
        ColumnDescriptor::new("nivel_servicio", "Nivel de Servicio").formatted(FormatKind::Percentage),
        ColumnDescriptor::new("rendimiento_promedio", "Rendimiento (km/l)").formatted(FormatKind::Decimal),
        ColumnDescriptor::new("incidencias", "Incidencias").formatted(FormatKind::Count),
        ColumnDescriptor::new("saldo_casetas", "Saldo Casetas").formatted(FormatKind::Currency),
        ColumnDescriptor::new("km_para_servicio", "Km para Servicio").formatted(FormatKind::Count),
        ColumnDescriptor::new("costo_por_km", "Costo por Km").formatted(FormatKind::Currency),
        ColumnDescriptor::new("poliza_seguro", "Póliza de Seguro"),
        ColumnDescriptor::new("costo_mantenimiento", "Costo Mantenimiento").formatted(FormatKind::Currency),
    ]
}

pub fn trip_columns() -> Vec<ColumnDescriptor> {
    vec![
        ColumnDescriptor::new("id", "Viaje"),
        ColumnDescriptor::new("salida", "Salida"),
        ColumnDescriptor::new("cliente", "Cliente"),
        ColumnDescriptor::new("destino", "Destino"),
        ColumnDescriptor::new("vehiculo", "Unidad"),
        ColumnDescriptor::new("operador", "Operador"),
        ColumnDescriptor::new("entregas", "Entregas").formatted(FormatKind::Count),
        ColumnDescriptor::new("ingreso", "Ingreso").formatted(FormatKind::Currency),
        ColumnDescriptor::new("gastos", "Gastos").formatted(FormatKind::Currency),
        ColumnDescriptor::new("utilidad", "Utilidad").formatted(FormatKind::Currency),
    ]
}

fn destination_columns() -> Vec<ColumnDescriptor> {
    vec![
        ColumnDescriptor::new("destino", "Destino"),
        ColumnDescriptor::new("tiempo_descarga", "Tiempo de Descarga"),
        ColumnDescriptor::new("num_entregas", "Núm. Entregas").formatted(FormatKind::Count),
    ]
}

fn daily_trips_chart() -> ChartConfig {
    ChartConfig::new(ChartKind::Line, "Viajes Diarios por Semana", "dia", FormatKind::Count)
        .series(SeriesConfig::new("viajes", "Viajes", TRIPS_COLOR))
}

fn percentage_card(key: &str, title: &str, value: i64, description: &str) -> KpiCard {
    KpiCard::new(key, title, Some(value as f64), FormatKind::Percentage).with_description(description)
}

/// Armar el dashboard operativo
pub fn build_dashboard(
    counters: &OperationalCounters,
    summary: &TripSummary,
    units: &[FleetUnit],
) -> AppResult<OperationalDashboard> {
    let available = units.iter().filter(|u| u.estatus.is_available()).count();

    let kpis = vec![
        KpiCard::new("incidencias", "Incidencias", Some(counters.incidencias as f64), FormatKind::Count)
            .with_description("Total en el período"),
        KpiCard::new("kilometros", "Kilómetros Totales", Some(counters.kilometros), FormatKind::Count)
            .with_description("Recorridos en el período"),
        KpiCard::new("combustible", "Litros de Combustible", Some(counters.combustible), FormatKind::Count)
            .with_description("Comprados en el período"),
        KpiCard::new(
            "pedidos_entregados",
            "Pedidos Entregados",
            Some(counters.pedidos_entregados as f64),
            FormatKind::Count,
        )
        .with_description("Total en el período"),
    ];

    Ok(OperationalDashboard {
        titulo: "Eficiencia Operativa",
        subtitulo: "Métricas de operación de la flota",
        kpis,
        cumplimiento_entregas: percentage_card(
            "cumplimiento_entregas",
            "Cumplimiento de Entregas",
            kpi_percentage(
                counters.pedidos_entregados as f64,
                counters.pedidos_programados as f64,
                KpiSemantic::Progress,
            ),
            "Pedidos entregados contra programados",
        ),
        uso_combustible: percentage_card(
            "uso_combustible",
            "Uso de Combustible",
            kpi_percentage(counters.combustible, counters.combustible_presupuestado, KpiSemantic::Overrun),
            "Litros comprados contra presupuesto",
        ),
        disponibilidad_flota: percentage_card(
            "disponibilidad_flota",
            "Disponibilidad de Flota",
            kpi_percentage(available as f64, units.len() as f64, KpiSemantic::Progress),
            "Unidades disponibles para asignar",
        ),
        viajes_por_cliente: doughnut(
            "Viajes por Cliente",
            summary
                .viajes_por_cliente
                .iter()
                .map(|c| (c.name.clone(), c.value, c.color.clone())),
            FormatKind::Count,
        ),
        viajes_por_camion: doughnut(
            "Viajes por Camión",
            summary
                .viajes_por_camion
                .iter()
                .map(|c| (c.name.clone(), c.value, c.color.clone())),
            FormatKind::Count,
        ),
        viajes_diarios: ChartData::build(&summary.viajes_diarios, &daily_trips_chart())?,
        destinos: render_table(&summary.destinos, &destination_columns())?.with_title("Destinos"),
    })
}

/// Tabla de unidades: columnas ocultas y página pedida
pub fn build_fleet_table(
    units: &[FleetUnit],
    hidden: &[String],
    page_size: usize,
    page: usize,
) -> AppResult<TablePage> {
    let mut columns = fleet_columns();
    apply_visibility(&mut columns, hidden);
    let paginator = Paginator::new(units.len(), page_size, page);
    let mut page = render_page(units, &columns, &paginator)?;
    page.table = page.table.with_title("Unidades de la Flota");
    Ok(page)
}

pub fn build_trips_table(trips: &[Trip], page_size: usize, page: usize) -> AppResult<TablePage> {
    let rows: Vec<TripView> = trips.iter().map(TripView::from).collect();
    let paginator = Paginator::new(rows.len(), page_size, page);
    let mut page = render_page(&rows, &trip_columns(), &paginator)?;
    page.table = page.table.with_title("Viajes");
    Ok(page)
}

pub fn build_drill_down(summary: &TripSummary, dataset: &str) -> AppResult<RenderedTable> {
    match dataset {
        "clientes" => drill_down("Datos de Viajes por Cliente", &summary.viajes_por_cliente),
        "camiones" => drill_down("Datos de Viajes por Camión", &summary.viajes_por_camion),
        "diarios" => drill_down("Datos de Viajes Diarios", &summary.viajes_diarios),
        "destinos" => drill_down("Datos de Destinos", &summary.destinos),
        other => Err(not_found_error("Conjunto de datos", other)),
    }
}

pub struct OperationalService {
    data_source: Arc<dyn FleetDataSource>,
    default_page_size: usize,
}

impl OperationalService {
    pub fn new(state: &AppState) -> Self {
        Self {
            data_source: state.data_source.clone(),
            default_page_size: state.config.default_page_size,
        }
    }

    fn page_args(&self, page: Option<u32>, page_size: Option<u32>) -> (usize, usize) {
        (
            page_size.map(|s| s as usize).unwrap_or(self.default_page_size),
            page.map(|p| p as usize).unwrap_or(1),
        )
    }

    pub async fn dashboard(&self) -> AppResult<OperationalDashboard> {
        let counters = self.data_source.fetch_operational_counters().await?;
        let summary = self.data_source.fetch_trip_summary().await?;
        let units = self.data_source.fetch_fleet_units().await?;
        build_dashboard(&counters, &summary, &units)
    }

    pub async fn fleet_table(&self, query: &FleetTableQuery) -> AppResult<TablePage> {
        query.validate()?;
        let units = self.data_source.fetch_fleet_units().await?;
        let (page_size, page) = self.page_args(query.page, query.page_size);
        build_fleet_table(&units, &query.hidden_columns(), page_size, page)
    }

    pub async fn trips_table(&self, query: &PageQuery) -> AppResult<TablePage> {
        query.validate()?;
        let trips = self.data_source.fetch_trips().await?;
        let (page_size, page) = self.page_args(query.page, query.page_size);
        build_trips_table(&trips, page_size, page)
    }

    pub async fn drill_down(&self, dataset: &str) -> AppResult<RenderedTable> {
        let summary = self.data_source.fetch_trip_summary().await?;
        build_drill_down(&summary, dataset)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::presentation::table::TableRow;
    use crate::repositories::sample_data;

    fn dashboard() -> OperationalDashboard {
        build_dashboard(
            &sample_data::operational_counters(),
            &sample_data::trip_summary(),
            &sample_data::fleet_units(),
        )
        .unwrap()
    }

    fn cells(row: &TableRow) -> &Vec<String> {
        match row {
            TableRow::Data { cells } => cells,
            other => panic!("fila inesperada: {:?}", other),
        }
    }

    #[test]
    fn test_kpi_cards() {
        let dashboard = dashboard();
        let displays: Vec<&str> = dashboard.kpis.iter().map(|k| k.display.as_str()).collect();
        assert_eq!(displays, vec!["28", "45,680", "8,950", "340"]);
        assert_eq!(dashboard.cumplimiento_entregas.value, Some(89.0));
        assert_eq!(dashboard.disponibilidad_flota.value, Some(29.0));
    }

    #[test]
    fn test_availability_with_empty_fleet_is_zero() {
        let dashboard = build_dashboard(
            &sample_data::operational_counters(),
            &sample_data::trip_summary(),
            &[],
        )
        .unwrap();
        assert_eq!(dashboard.disponibilidad_flota.display, "0%");
    }

    #[test]
    fn test_daily_trips_series() {
        let chart = dashboard().viajes_diarios;
        assert_eq!(chart.records.len(), 7);
        assert_eq!(chart.label_for("viajes"), "Viajes");
    }

    #[test]
    fn test_fleet_table_hides_columns_and_paginates() {
        let units = sample_data::fleet_units();
        let hidden = vec!["costo_por_km".to_string(), "poliza_seguro".to_string()];
        let page = build_fleet_table(&units, &hidden, 5, 2).unwrap();

        assert_eq!(page.total_pages, 2);
        assert_eq!(page.table.headers.len(), 10);
        assert!(!page.table.headers.contains(&"Costo por Km".to_string()));
        assert_eq!(page.table.rows.len(), 2);
        assert_eq!(cells(&page.table.rows[0])[0], "FL006");
    }

    #[test]
    fn test_unit_without_operator_shows_placeholder() {
        let units = sample_data::fleet_units();
        let page = build_fleet_table(&units, &[], 5, 1).unwrap();
        let fl004 = cells(&page.table.rows[3]);
        assert_eq!(fl004[0], "FL004");
        assert_eq!(fl004[3], "--");
    }

    #[test]
    fn test_trips_table_pages_of_five() {
        let trips = sample_data::trips();
        let first = build_trips_table(&trips, 5, 1).unwrap();
        assert_eq!(cells(&first.table.rows[0])[0], "VJ-0001");

        let last = build_trips_table(&trips, 5, 3).unwrap();
        let ids: Vec<&str> = last.table.rows.iter().map(|r| cells(r)[0].as_str()).collect();
        assert_eq!(ids, vec!["VJ-0011", "VJ-0012"]);
    }

    #[test]
    fn test_drill_down() {
        let summary = sample_data::trip_summary();
        let table = build_drill_down(&summary, "diarios").unwrap();
        assert_eq!(table.title.as_deref(), Some("Datos de Viajes Diarios"));
        assert_eq!(table.headers, vec!["Dia", "Viajes"]);
        assert!(build_drill_down(&summary, "otros").is_err());
    }
}
