//! Capa de presentación
//!
//! Funciones puras que convierten registros en lo que muestra el dashboard:
//! formato de métricas, KPIs derivados, paginación, filtro de rango,
//! adaptador de gráficas, tablas declarativas y el gauge de temperatura.

pub mod chart;
pub mod formatter;
pub mod gauge;
pub mod kpi;
pub mod paginator;
pub mod range_filter;
pub mod table;

pub use formatter::{format_metric, format_optional, FormatKind, PLACEHOLDER};
pub use kpi::{kpi_percentage, KpiCard, KpiSemantic};
pub use paginator::{paginate, PageView, Paginator};
pub use range_filter::RangeFilter;
