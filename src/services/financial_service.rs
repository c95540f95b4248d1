//! Dashboard financiero
//!
//! Saldo total, gastos por categoría, ingresos contra gastos (mensual y
//! semanal con ventana ajustable), saldos en el tiempo, desglose por cuenta y
//! uso de presupuesto.

use serde::Serialize;
use std::sync::Arc;

use crate::models::finance::FinancialDataset;
use crate::presentation::chart::{doughnut, ChartConfig, ChartData, ChartKind, DoughnutChart, SeriesConfig};
use crate::presentation::range_filter::range_label;
use crate::presentation::table::{drill_down, render_table, ColumnDescriptor, RenderedTable};
use crate::presentation::{format_metric, kpi_percentage, FormatKind, KpiCard, KpiSemantic, RangeFilter};
use crate::repositories::FleetDataSource;
use crate::state::AppState;
use crate::utils::errors::{not_found_error, AppResult};

pub const INCOME_COLOR: &str = "#FF9900";
pub const EXPENSE_COLOR: &str = "#DB0000";

/// Presupuesto de una cuenta y cuánto se ha usado
#[derive(Debug, Clone, Serialize)]
pub struct BudgetUsage {
    pub nombre: String,
    pub saldo: String,
    pub presupuesto: String,
    /// Puede pasar de 100 si la cuenta excede su presupuesto
    pub uso: i64,
}

#[derive(Debug, Clone, Serialize)]
pub struct WeeklyWindow {
    pub filter: RangeFilter,
    pub mostrando: String,
}

#[derive(Debug, Clone, Serialize)]
pub struct FinancialDashboard {
    pub titulo: &'static str,
    pub subtitulo: &'static str,
    pub saldo_total: KpiCard,
    pub gastos_no_deducibles: KpiCard,
    pub gastos_por_categoria: DoughnutChart,
    pub ingresos_vs_gastos_mensuales: ChartData,
    pub ingresos_vs_gastos_semanales: ChartData,
    pub ventana_semanal: WeeklyWindow,
    pub saldos_tiempo: ChartData,
    pub saldos_historicos: ChartData,
    pub desglose_cuentas: RenderedTable,
    pub presupuestos: Vec<BudgetUsage>,
}

fn income_vs_expense(title: &str, x_axis_key: &str) -> ChartConfig {
    ChartConfig::new(ChartKind::Bar, title, x_axis_key, FormatKind::Currency)
        .series(SeriesConfig::new("ingresos", "Ingresos", INCOME_COLOR))
        .series(SeriesConfig::new("gastos", "Gastos", EXPENSE_COLOR))
}

fn balance_line(title: &str) -> ChartConfig {
    ChartConfig::new(ChartKind::Line, title, "fecha", FormatKind::Currency)
        .series(SeriesConfig::new("saldo", "Saldo", INCOME_COLOR))
}

pub fn account_columns() -> Vec<ColumnDescriptor> {
    vec![
        ColumnDescriptor::new("cuenta", "Cuenta"),
        ColumnDescriptor::new("ingresos", "Ingresos").formatted(FormatKind::Currency),
        ColumnDescriptor::new("gastos", "Gastos").formatted(FormatKind::Currency),
        ColumnDescriptor::new("saldo", "Saldo").formatted(FormatKind::Currency),
    ]
}

/// Armar el dashboard a partir del conjunto de datos y la ventana pedida
pub fn build_dashboard(data: &FinancialDataset, weeks: Option<usize>) -> AppResult<FinancialDashboard> {
    let filter = RangeFilter::default().with_window(weeks);
    let visible_weeks = filter.apply(&data.semanales);
    let visible_balances = filter.apply(&data.saldos_historicos);

    let no_deducibles: f64 = data
        .gastos_por_categoria
        .iter()
        .filter(|c| !c.deducible)
        .map(|c| c.value)
        .sum();

    let presupuestos = data
        .presupuestos
        .iter()
        .map(|b| BudgetUsage {
            nombre: b.nombre.clone(),
            saldo: format_metric(b.saldo, FormatKind::Currency),
            presupuesto: format_metric(b.presupuesto, FormatKind::Currency),
            uso: kpi_percentage(b.saldo, b.presupuesto, KpiSemantic::Overrun),
        })
        .collect();

    Ok(FinancialDashboard {
        titulo: "Dashboard Financiero",
        subtitulo: "Análisis financiero de la flota y sus operaciones",
        saldo_total: KpiCard::new(
            "saldo_total",
            "Resumen Financiero",
            Some(data.total_balance()),
            FormatKind::Currency,
        )
        .with_description("Saldo total en cuentas"),
        gastos_no_deducibles: KpiCard::new(
            "gastos_no_deducibles",
            "Gastos no deducibles",
            Some(no_deducibles),
            FormatKind::Currency,
        ),
        gastos_por_categoria: doughnut(
            "Gastos por Categoría",
            data.gastos_por_categoria
                .iter()
                .map(|c| (c.name.clone(), c.value, c.color.clone())),
            FormatKind::Currency,
        ),
        ingresos_vs_gastos_mensuales: ChartData::build(
            &data.mensuales,
            &income_vs_expense("Ingresos vs Gastos Mensuales", "mes"),
        )?,
        ingresos_vs_gastos_semanales: ChartData::build(
            visible_weeks,
            &income_vs_expense("Ingresos vs Gastos Semanales", "semana"),
        )?
        .with_subtitle(range_label(visible_weeks, |w| w.semana.clone())),
        ventana_semanal: WeeklyWindow {
            filter,
            mostrando: format!("Mostrando: {} semanas", filter.window()),
        },
        saldos_tiempo: ChartData::build(&data.saldos_tiempo, &balance_line("Saldos a lo Largo del Tiempo"))?,
        saldos_historicos: ChartData::build(visible_balances, &balance_line("Saldos Semanales"))?
            .with_subtitle(range_label(visible_balances, |b| b.fecha.clone())),
        desglose_cuentas: render_table(&data.cuentas, &account_columns())?.with_title("Desglose por Cuenta"),
        presupuestos,
    })
}

/// Tabla de datos crudos detrás de una gráfica
pub fn build_drill_down(data: &FinancialDataset, dataset: &str) -> AppResult<RenderedTable> {
    match dataset {
        "gastos" => drill_down("Datos de Gastos por Categoría", &data.gastos_por_categoria),
        "ingresos-gastos" => drill_down("Datos de Ingresos vs Gastos", &data.mensuales),
        "semanales" => drill_down("Datos de Ingresos vs Gastos Semanales", &data.semanales),
        "saldos" => drill_down("Datos de Saldos a lo Largo del Tiempo", &data.saldos_tiempo),
        "cuentas" => drill_down("Datos de Cuentas", &data.cuentas),
        other => Err(not_found_error("Conjunto de datos", other)),
    }
}

pub struct FinancialService {
    data_source: Arc<dyn FleetDataSource>,
}

impl FinancialService {
    pub fn new(state: &AppState) -> Self {
        Self {
            data_source: state.data_source.clone(),
        }
    }

    pub async fn dashboard(&self, weeks: Option<usize>) -> AppResult<FinancialDashboard> {
        let data = self.data_source.fetch_financial_dataset().await?;
        build_dashboard(&data, weeks)
    }

    pub async fn drill_down(&self, dataset: &str) -> AppResult<RenderedTable> {
        let data = self.data_source.fetch_financial_dataset().await?;
        build_drill_down(&data, dataset)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::presentation::table::TableRow;
    use crate::repositories::sample_data;
    use crate::utils::errors::AppError;

    #[test]
    fn test_total_balance_card() {
        let dashboard = build_dashboard(&sample_data::financial_dataset(), None).unwrap();
        assert_eq!(dashboard.saldo_total.display, "$285,000");
        assert_eq!(dashboard.gastos_no_deducibles.value, Some(18000.0));
    }

    #[test]
    fn test_weekly_window_and_subtitle() {
        let data = sample_data::financial_dataset();

        let default = build_dashboard(&data, None).unwrap();
        assert_eq!(default.ingresos_vs_gastos_semanales.records.len(), 4);
        assert_eq!(
            default.ingresos_vs_gastos_semanales.subtitle.as_deref(),
            Some("Semanas Sem5 a Sem8")
        );

        let wide = build_dashboard(&data, Some(40)).unwrap();
        assert_eq!(wide.ventana_semanal.filter.window(), 12);
        assert_eq!(wide.ingresos_vs_gastos_semanales.records.len(), 8);
        assert_eq!(wide.ventana_semanal.mostrando, "Mostrando: 12 semanas");
    }

    #[test]
    fn test_budget_usage() {
        let dashboard = build_dashboard(&sample_data::financial_dataset(), None).unwrap();
        let usos: Vec<i64> = dashboard.presupuestos.iter().map(|p| p.uso).collect();
        assert_eq!(usos, vec![75, 78, 64]);
    }

    #[test]
    fn test_account_table_formats_currency() {
        let dashboard = build_dashboard(&sample_data::financial_dataset(), None).unwrap();
        match &dashboard.desglose_cuentas.rows[0] {
            TableRow::Data { cells } => {
                assert_eq!(cells, &vec!["Operativa", "$750,000", "$580,000", "$170,000"]);
            }
            other => panic!("fila inesperada: {:?}", other),
        }
    }

    #[test]
    fn test_drill_down_datasets() {
        let data = sample_data::financial_dataset();
        let table = build_drill_down(&data, "ingresos-gastos").unwrap();
        assert_eq!(table.headers, vec!["Mes", "Ingresos", "Gastos"]);
        let gastos = build_drill_down(&data, "gastos").unwrap();
        assert!(!gastos.headers.contains(&"Color".to_string()));
        assert!(matches!(build_drill_down(&data, "nada"), Err(AppError::NotFound(_))));
    }
}
