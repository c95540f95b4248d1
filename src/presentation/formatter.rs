//! Formateo de métricas para mostrar en tarjetas, tablas y gráficas.
//!
//! Locale fijo es-MX: separador de miles `,`, decimal `.`, prefijo `$`.
//! Cualquier valor no finito (NaN, infinito) o ausente se muestra como
//! [`PLACEHOLDER`], nunca como "NaN".

use serde::{Deserialize, Serialize};

/// Texto mostrado cuando no hay un valor numérico válido
pub const PLACEHOLDER: &str = "--";

/// Tipo de formato aplicado a un valor numérico
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum FormatKind {
    /// `$1,234,567.5`
    Currency,
    /// `45,680`
    Count,
    /// `85%`
    Percentage,
    /// `4.5°C`
    Temperature,
    /// `3.25` (hasta dos decimales, sin ceros sobrantes)
    Decimal,
}

/// Formatear un valor según su tipo
pub fn format_metric(value: f64, kind: FormatKind) -> String {
    if !value.is_finite() {
        return PLACEHOLDER.to_string();
    }

    match kind {
        FormatKind::Currency => {
            let grouped = format_grouped(value.abs(), 2);
            if value < 0.0 && grouped != "0" {
                format!("-${}", grouped)
            } else {
                format!("${}", grouped)
            }
        }
        FormatKind::Count => signed(value, format_grouped(value.abs(), 0)),
        FormatKind::Percentage => format!("{}%", value.round() as i64),
        FormatKind::Temperature => format!("{:.1}°C", value),
        FormatKind::Decimal => signed(value, format_grouped(value.abs(), 2)),
    }
}

/// Formatear un valor opcional; `None` produce el placeholder
pub fn format_optional(value: Option<f64>, kind: FormatKind) -> String {
    match value {
        Some(v) => format_metric(v, kind),
        None => PLACEHOLDER.to_string(),
    }
}

fn signed(value: f64, grouped: String) -> String {
    if value < 0.0 && grouped != "0" {
        format!("-{}", grouped)
    } else {
        grouped
    }
}

/// Redondear a `max_fraction_digits`, agrupar miles y quitar ceros finales
fn format_grouped(value: f64, max_fraction_digits: usize) -> String {
    let rounded = format!("{:.*}", max_fraction_digits, value);
    let (int_part, frac_part) = rounded.split_once('.').unwrap_or((rounded.as_str(), ""));
    let frac = frac_part.trim_end_matches('0');

    let mut out = group_digits(int_part);
    if !frac.is_empty() {
        out.push('.');
        out.push_str(frac);
    }
    out
}

fn group_digits(digits: &str) -> String {
    let mut result = String::with_capacity(digits.len() + digits.len() / 3);
    for (i, c) in digits.chars().enumerate() {
        if i > 0 && (digits.len() - i) % 3 == 0 {
            result.push(',');
        }
        result.push(c);
    }
    result
}
