//! Cálculo de KPIs derivados
//!
//! Funciones puras `(numerador, denominador) -> porcentaje` y estadísticas
//! básicas sobre series. Un denominador cero o no finito nunca produce NaN.

use serde::{Deserialize, Serialize};

use super::formatter::{format_optional, FormatKind};

/// Semántica del porcentaje calculado
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum KpiSemantic {
    /// Avance hacia una meta, acotado a [0, 100]
    Progress,
    /// Consumo contra presupuesto, puede superar 100
    Overrun,
}

/// Porcentaje redondeado al entero más cercano
pub fn kpi_percentage(numerator: f64, denominator: f64, semantic: KpiSemantic) -> i64 {
    if denominator == 0.0 || !denominator.is_finite() || !numerator.is_finite() {
        return 0;
    }

    let percentage = (numerator / denominator * 100.0).round();
    match semantic {
        KpiSemantic::Progress => percentage.clamp(0.0, 100.0) as i64,
        KpiSemantic::Overrun => percentage as i64,
    }
}

/// Promedio de una serie; `None` si está vacía
pub fn average(values: &[f64]) -> Option<f64> {
    let finite: Vec<f64> = values.iter().copied().filter(|v| v.is_finite()).collect();
    if finite.is_empty() {
        return None;
    }
    Some(finite.iter().sum::<f64>() / finite.len() as f64)
}

/// Mínimo, máximo y promedio de una serie
#[derive(Debug, Clone, Copy, PartialEq, Serialize)]
pub struct SeriesStats {
    pub min: f64,
    pub max: f64,
    pub avg: f64,
}

pub fn series_stats(values: &[f64]) -> Option<SeriesStats> {
    let avg = average(values)?;
    let finite = values.iter().copied().filter(|v| v.is_finite());
    let (min, max) = finite.fold((f64::INFINITY, f64::NEG_INFINITY), |(lo, hi), v| {
        (lo.min(v), hi.max(v))
    });
    Some(SeriesStats { min, max, avg })
}

/// Redondear a un decimal, como se muestran las temperaturas
pub fn round1(value: f64) -> f64 {
    (value * 10.0).round() / 10.0
}

/// Un indicador listo para tarjeta: valor crudo y su texto
#[derive(Debug, Clone, Serialize)]
pub struct KpiCard {
    pub key: String,
    pub title: String,
    pub value: Option<f64>,
    pub display: String,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub description: Option<String>,
}

impl KpiCard {
    pub fn new(
        key: &str,
        title: &str,
        value: Option<f64>,
        kind: FormatKind,
    ) -> Self {
        Self {
            key: key.to_string(),
            title: title.to_string(),
            value,
            display: format_optional(value, kind),
            description: None,
        }
    }

    pub fn with_description(mut self, description: &str) -> Self {
        self.description = Some(description.to_string());
        self
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_zero_denominator_returns_zero() {
        assert_eq!(kpi_percentage(0.0, 0.0, KpiSemantic::Progress), 0);
        assert_eq!(kpi_percentage(12.0, 0.0, KpiSemantic::Overrun), 0);
        assert_eq!(kpi_percentage(f64::NAN, 10.0, KpiSemantic::Progress), 0);
    }

    #[test]
    fn test_progress_is_clamped() {
        assert_eq!(kpi_percentage(340.0, 380.0, KpiSemantic::Progress), 89);
        assert_eq!(kpi_percentage(500.0, 380.0, KpiSemantic::Progress), 100);
        assert_eq!(kpi_percentage(-5.0, 10.0, KpiSemantic::Progress), 0);
    }

    #[test]
    fn test_overrun_can_exceed_hundred() {
        assert_eq!(kpi_percentage(8000.0, 10000.0, KpiSemantic::Overrun), 80);
        assert!(kpi_percentage(12000.0, 10000.0, KpiSemantic::Overrun) > 100);
    }

    #[test]
    fn test_progress_stays_in_range_when_below_target() {
        for (x, y) in [(0.0, 1.0), (1.0, 3.0), (7.0, 7.0), (99.0, 1000.0)] {
            let value = kpi_percentage(x, y, KpiSemantic::Progress);
            assert!((0..=100).contains(&value));
        }
    }

    #[test]
    fn test_average_and_stats_guard_empty() {
        assert_eq!(average(&[]), None);
        assert!(series_stats(&[]).is_none());
        let stats = series_stats(&[2.0, 4.0, 6.0]).unwrap();
        assert_eq!(stats.min, 2.0);
        assert_eq!(stats.max, 6.0);
        assert_eq!(stats.avg, 4.0);
    }
}
