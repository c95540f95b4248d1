//! Adaptador de datos para gráficas
//!
//! Toma registros planos y una lista de series `{key, display_name, color, axis}`
//! y produce lo que consume la capa de render: los registros tal cual, el mapa
//! key -> nombre para tooltips y la asignación de eje por serie. Las series se
//! dibujan en el orden declarado, nunca ordenadas por valor.

use serde::{Deserialize, Serialize};
use serde_json::{Map, Value};

use super::formatter::{format_metric, FormatKind};
use super::kpi::{kpi_percentage, KpiSemantic};
use crate::utils::errors::{AppError, AppResult};

/// Identificador de pila compartido por todas las series apiladas
pub const STACK_ID: &str = "a";

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum Axis {
    Primary,
    Secondary,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum ChartKind {
    Bar,
    Line,
    Doughnut,
}

/// Configuración de una serie
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct SeriesConfig {
    pub key: String,
    pub display_name: String,
    pub color: String,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub axis: Option<Axis>,
}

impl SeriesConfig {
    pub fn new(key: &str, display_name: &str, color: &str) -> Self {
        Self {
            key: key.to_string(),
            display_name: display_name.to_string(),
            color: color.to_string(),
            axis: None,
        }
    }

    pub fn on_axis(mut self, axis: Axis) -> Self {
        self.axis = Some(axis);
        self
    }
}

/// Configuración completa de una gráfica de barras o líneas
#[derive(Debug, Clone)]
pub struct ChartConfig {
    pub kind: ChartKind,
    pub title: String,
    pub x_axis_key: String,
    pub series: Vec<SeriesConfig>,
    pub stacked: bool,
    pub primary_format: FormatKind,
    pub secondary_format: FormatKind,
}

impl ChartConfig {
    pub fn new(kind: ChartKind, title: &str, x_axis_key: &str, format: FormatKind) -> Self {
        Self {
            kind,
            title: title.to_string(),
            x_axis_key: x_axis_key.to_string(),
            series: Vec::new(),
            stacked: false,
            primary_format: format,
            secondary_format: format,
        }
    }

    pub fn series(mut self, series: SeriesConfig) -> Self {
        self.series.push(series);
        self
    }

    pub fn stacked(mut self, stacked: bool) -> Self {
        self.stacked = stacked;
        self
    }

    pub fn secondary_format(mut self, format: FormatKind) -> Self {
        self.secondary_format = format;
        self
    }
}

/// Serie lista para dibujar
#[derive(Debug, Clone, Serialize)]
pub struct RenderedSeries {
    pub key: String,
    pub name: String,
    pub color: String,
    pub axis: Axis,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub stack_id: Option<String>,
}

/// Entrada de tooltip para un punto del eje X
#[derive(Debug, Clone, Serialize)]
pub struct TooltipEntry {
    pub name: String,
    pub color: String,
    pub value: String,
}

/// Salida del adaptador
#[derive(Debug, Clone, Serialize)]
pub struct ChartData {
    pub kind: ChartKind,
    pub title: String,
    pub x_axis_key: String,
    pub records: Vec<Value>,
    pub labels: Map<String, Value>,
    pub series: Vec<RenderedSeries>,
    pub stacked: bool,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub subtitle: Option<String>,
    #[serde(skip)]
    primary_format: FormatKind,
    #[serde(skip)]
    secondary_format: FormatKind,
}

impl ChartData {
    /// Adaptar registros serializables a la forma de la gráfica
    pub fn build<T: Serialize>(records: &[T], config: &ChartConfig) -> AppResult<Self> {
        let records = records
            .iter()
            .map(serde_json::to_value)
            .collect::<Result<Vec<_>, _>>()
            .map_err(|e| AppError::Internal(format!("Error serializando datos de gráfica: {}", e)))?;

        let labels = config
            .series
            .iter()
            .map(|s| (s.key.clone(), Value::String(s.display_name.clone())))
            .collect();

        let series = config
            .series
            .iter()
            .map(|s| RenderedSeries {
                key: s.key.clone(),
                name: s.display_name.clone(),
                color: s.color.clone(),
                axis: s.axis.unwrap_or(Axis::Primary),
                stack_id: config.stacked.then(|| STACK_ID.to_string()),
            })
            .collect();

        Ok(Self {
            kind: config.kind,
            title: config.title.clone(),
            x_axis_key: config.x_axis_key.clone(),
            records,
            labels,
            series,
            stacked: config.stacked,
            subtitle: None,
            primary_format: config.primary_format,
            secondary_format: config.secondary_format,
        })
    }

    pub fn with_subtitle(mut self, subtitle: Option<String>) -> Self {
        self.subtitle = subtitle;
        self
    }

    /// Nombre a mostrar de una serie; una key desconocida se devuelve tal cual
    pub fn label_for<'a>(&'a self, key: &'a str) -> &'a str {
        self.labels.get(key).and_then(Value::as_str).unwrap_or(key)
    }

    /// Eje de una serie; las no configuradas van al primario
    pub fn axis_for(&self, key: &str) -> Axis {
        self.series
            .iter()
            .find(|s| s.key == key)
            .map(|s| s.axis)
            .unwrap_or(Axis::Primary)
    }

    /// Formatear un valor según el eje de su serie
    pub fn format_value(&self, key: &str, value: f64) -> String {
        match self.axis_for(key) {
            Axis::Primary => format_metric(value, self.primary_format),
            Axis::Secondary => format_metric(value, self.secondary_format),
        }
    }

    /// Tooltip del registro en la posición `index`
    pub fn tooltip(&self, index: usize) -> Vec<TooltipEntry> {
        let Some(record) = self.records.get(index) else {
            return Vec::new();
        };

        self.series
            .iter()
            .map(|s| {
                let value = record
                    .get(&s.key)
                    .and_then(Value::as_f64)
                    .unwrap_or(f64::NAN);
                TooltipEntry {
                    name: self.label_for(&s.key).to_string(),
                    color: s.color.clone(),
                    value: self.format_value(&s.key, value),
                }
            })
            .collect()
    }
}

/// Rebanada de una gráfica de dona
#[derive(Debug, Clone, Serialize)]
pub struct DoughnutSlice {
    pub name: String,
    pub value: f64,
    pub color: String,
    pub display: String,
    pub share: i64,
}

/// Gráfica de dona con participación porcentual de cada rebanada
#[derive(Debug, Clone, Serialize)]
pub struct DoughnutChart {
    pub title: String,
    pub slices: Vec<DoughnutSlice>,
    pub total: f64,
    pub total_display: String,
}

pub fn doughnut<I>(title: &str, slices: I, format: FormatKind) -> DoughnutChart
where
    I: IntoIterator<Item = (String, f64, String)>,
{
    let raw: Vec<(String, f64, String)> = slices.into_iter().collect();
    let total: f64 = raw.iter().map(|(_, v, _)| v).filter(|v| v.is_finite()).sum();

    let slices = raw
        .into_iter()
        .map(|(name, value, color)| DoughnutSlice {
            display: format_metric(value, format),
            share: kpi_percentage(value, total, KpiSemantic::Progress),
            name,
            value,
            color,
        })
        .collect();

    DoughnutChart {
        title: title.to_string(),
        slices,
        total,
        total_display: format_metric(total, format),
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use serde_json::json;

    fn income_vs_expense(stacked: bool) -> ChartConfig {
        ChartConfig::new(ChartKind::Bar, "Ingresos vs Gastos", "mes", FormatKind::Currency)
            .series(SeriesConfig::new("a", "Ingresos", "#FF9900"))
            .series(SeriesConfig::new("b", "Gastos", "#DB0000").on_axis(Axis::Secondary))
            .stacked(stacked)
            .secondary_format(FormatKind::Count)
    }

    #[test]
    fn test_labels_resolve_and_fall_back() {
        let records = vec![json!({"mes": "Ene", "a": 1, "b": 2})];
        let chart = ChartData::build(&records, &income_vs_expense(false)).unwrap();
        assert_eq!(chart.label_for("a"), "Ingresos");
        assert_eq!(chart.label_for("b"), "Gastos");
        assert_eq!(chart.label_for("saldo"), "saldo");
    }

    #[test]
    fn test_axis_assignment() {
        let chart = ChartData::build::<Value>(&[], &income_vs_expense(false)).unwrap();
        assert_eq!(chart.axis_for("a"), Axis::Primary);
        assert_eq!(chart.axis_for("b"), Axis::Secondary);
        assert_eq!(chart.axis_for("zzz"), Axis::Primary);
    }

    #[test]
    fn test_records_pass_through_and_series_keep_order() {
        let records = vec![json!({"mes": "Feb", "b": 5, "a": 9})];
        let chart = ChartData::build(&records, &income_vs_expense(false)).unwrap();
        assert_eq!(chart.records, records);
        let keys: Vec<&str> = chart.series.iter().map(|s| s.key.as_str()).collect();
        assert_eq!(keys, vec!["a", "b"]);
        assert!(chart.series.iter().all(|s| s.stack_id.is_none()));
    }

    #[test]
    fn test_stacked_series_share_one_stack() {
        let chart = ChartData::build::<Value>(&[], &income_vs_expense(true)).unwrap();
        assert!(chart
            .series
            .iter()
            .all(|s| s.stack_id.as_deref() == Some(STACK_ID)));
    }

    #[test]
    fn test_tooltip_formats_per_axis() {
        let records = vec![json!({"mes": "Ene", "a": 120000, "b": 95000})];
        let chart = ChartData::build(&records, &income_vs_expense(false)).unwrap();
        let tooltip = chart.tooltip(0);
        assert_eq!(tooltip[0].name, "Ingresos");
        assert_eq!(tooltip[0].value, "$120,000");
        assert_eq!(tooltip[1].value, "95,000");
        assert!(chart.tooltip(7).is_empty());
    }

    #[test]
    fn test_tooltip_missing_value_uses_placeholder() {
        let records = vec![json!({"mes": "Ene", "a": 10})];
        let chart = ChartData::build(&records, &income_vs_expense(false)).unwrap();
        assert_eq!(chart.tooltip(0)[1].value, "--");
    }

    #[test]
    fn test_doughnut_shares() {
        let chart = doughnut(
            "Viajes por Cliente",
            vec![
                ("Cliente A".to_string(), 120.0, "#FF9900".to_string()),
                ("Cliente B".to_string(), 80.0, "#6F797F".to_string()),
            ],
            FormatKind::Count,
        );
        assert_eq!(chart.total, 200.0);
        assert_eq!(chart.slices[0].share, 60);
        assert_eq!(chart.slices[1].share, 40);
        assert_eq!(chart.total_display, "200");
    }

    #[test]
    fn test_empty_doughnut_has_zero_shares() {
        let chart = doughnut("Vacío", Vec::new(), FormatKind::Currency);
        assert_eq!(chart.total_display, "$0");
        assert!(chart.slices.is_empty());
    }
}
