//! Indicador de temperatura (gauge)

use serde::Serialize;

use super::formatter::{format_metric, FormatKind, PLACEHOLDER};

/// Estado de la temperatura respecto a la banda óptima
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
pub enum GaugeStatus {
    #[serde(rename = "Baja")]
    Low,
    #[serde(rename = "Óptima")]
    Optimal,
    #[serde(rename = "Alta")]
    High,
}

#[derive(Debug, Clone, Copy, PartialEq, Serialize)]
pub struct Band {
    pub min: f64,
    pub max: f64,
}

#[derive(Debug, Clone, Copy, PartialEq, Serialize)]
pub struct GaugeConfig {
    pub range: Band,
    pub optimal: Band,
}

impl Default for GaugeConfig {
    /// Cadena de frío: escala de 0 a 10 °C, óptimo entre 2 y 6 °C
    fn default() -> Self {
        Self {
            range: Band { min: 0.0, max: 10.0 },
            optimal: Band { min: 2.0, max: 6.0 },
        }
    }
}

#[derive(Debug, Clone, Serialize)]
pub struct GaugeReading {
    pub value: Option<f64>,
    pub display: String,
    /// Posición en la escala, 0 a 100
    pub position: f64,
    pub status: Option<GaugeStatus>,
    pub config: GaugeConfig,
}

impl GaugeConfig {
    pub fn position(&self, value: f64) -> f64 {
        let span = self.range.max - self.range.min;
        if span <= 0.0 || !value.is_finite() {
            return 0.0;
        }
        ((value - self.range.min) / span * 100.0).clamp(0.0, 100.0)
    }

    pub fn status(&self, value: f64) -> GaugeStatus {
        if value < self.optimal.min {
            GaugeStatus::Low
        } else if value > self.optimal.max {
            GaugeStatus::High
        } else {
            GaugeStatus::Optimal
        }
    }

    pub fn read(&self, value: Option<f64>) -> GaugeReading {
        let value = value.filter(|v| v.is_finite());
        GaugeReading {
            value,
            display: value
                .map(|v| format_metric(v, FormatKind::Temperature))
                .unwrap_or_else(|| PLACEHOLDER.to_string()),
            position: value.map(|v| self.position(v)).unwrap_or(0.0),
            status: value.map(|v| self.status(v)),
            config: *self,
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_position_and_status() {
        let gauge = GaugeConfig::default();
        let reading = gauge.read(Some(4.5));
        assert_eq!(reading.position, 45.0);
        assert_eq!(reading.status, Some(GaugeStatus::Optimal));
        assert_eq!(reading.display, "4.5°C");
    }

    #[test]
    fn test_out_of_scale_is_clamped() {
        let gauge = GaugeConfig::default();
        assert_eq!(gauge.position(14.0), 100.0);
        assert_eq!(gauge.position(-3.0), 0.0);
        assert_eq!(gauge.status(1.0), GaugeStatus::Low);
        assert_eq!(gauge.status(6.1), GaugeStatus::High);
    }

    #[test]
    fn test_missing_value() {
        let reading = GaugeConfig::default().read(None);
        assert_eq!(reading.display, "--");
        assert!(reading.status.is_none());
    }
}
