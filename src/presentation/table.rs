//! Tablas declarativas y drill-down
//!
//! Una tabla es una lista de descriptores de columna (accessor, encabezado,
//! formato opcional, visibilidad) que un renderizador genérico aplica sobre
//! registros serializables. Un conjunto vacío produce una fila explícita
//! "sin registros" en lugar de una tabla vacía.

use serde::Serialize;
use serde_json::Value;

use super::formatter::{format_metric, FormatKind, PLACEHOLDER};
use super::paginator::Paginator;
use crate::utils::errors::{AppError, AppResult};

/// Texto de la fila que reemplaza a una tabla sin registros
pub const EMPTY_ROW_MESSAGE: &str = "No hay registros";

/// Claves que el drill-down muestra como moneda
const CURRENCY_KEYS: [&str; 4] = ["ingresos", "gastos", "saldo", "value"];

/// Descriptor de columna
#[derive(Debug, Clone, Serialize)]
pub struct ColumnDescriptor {
    pub accessor: String,
    pub header: String,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub format: Option<FormatKind>,
    pub visible: bool,
}

impl ColumnDescriptor {
    pub fn new(accessor: &str, header: &str) -> Self {
        Self {
            accessor: accessor.to_string(),
            header: header.to_string(),
            format: None,
            visible: true,
        }
    }

    pub fn formatted(mut self, format: FormatKind) -> Self {
        self.format = Some(format);
        self
    }

    /// Texto de una celda de este descriptor
    pub fn render_cell(&self, value: Option<&Value>) -> String {
        match (value, self.format) {
            (None | Some(Value::Null), _) => PLACEHOLDER.to_string(),
            (Some(Value::Number(n)), Some(kind)) => {
                format_metric(n.as_f64().unwrap_or(f64::NAN), kind)
            }
            (Some(Value::String(s)), _) => s.clone(),
            (Some(Value::Bool(b)), _) => (if *b { "Sí" } else { "No" }).to_string(),
            (Some(other), _) => other.to_string(),
        }
    }
}

/// Ocultar las columnas cuyo accessor aparece en `hidden`
pub fn apply_visibility(columns: &mut [ColumnDescriptor], hidden: &[String]) {
    for column in columns.iter_mut() {
        column.visible = !hidden.iter().any(|h| h == &column.accessor);
    }
}

/// Fila renderizada
#[derive(Debug, Clone, Serialize)]
#[serde(tag = "kind", rename_all = "snake_case")]
pub enum TableRow {
    Data { cells: Vec<String> },
    Empty { message: String, colspan: usize },
}

/// Tabla lista para mostrar
#[derive(Debug, Clone, Serialize)]
pub struct RenderedTable {
    #[serde(skip_serializing_if = "Option::is_none")]
    pub title: Option<String>,
    pub columns: Vec<ColumnDescriptor>,
    pub headers: Vec<String>,
    pub rows: Vec<TableRow>,
}

impl RenderedTable {
    pub fn with_title(mut self, title: &str) -> Self {
        self.title = Some(title.to_string());
        self
    }

    /// Cambiar el texto de la fila "sin registros"
    pub fn with_empty_message(mut self, text: &str) -> Self {
        for row in self.rows.iter_mut() {
            if let TableRow::Empty { message, .. } = row {
                *message = text.to_string();
            }
        }
        self
    }

    pub fn is_empty(&self) -> bool {
        self.rows.iter().all(|row| matches!(row, TableRow::Empty { .. }))
    }
}

fn to_values<T: Serialize>(records: &[T]) -> AppResult<Vec<Value>> {
    records
        .iter()
        .map(serde_json::to_value)
        .collect::<Result<Vec<_>, _>>()
        .map_err(|e| AppError::Internal(format!("Error serializando filas: {}", e)))
}

/// Renderizar registros con columnas declaradas; sólo las visibles aparecen
pub fn render_table<T: Serialize>(
    records: &[T],
    columns: &[ColumnDescriptor],
) -> AppResult<RenderedTable> {
    let values = to_values(records)?;
    let visible: Vec<&ColumnDescriptor> = columns.iter().filter(|c| c.visible).collect();

    let rows = if values.is_empty() {
        vec![TableRow::Empty {
            message: EMPTY_ROW_MESSAGE.to_string(),
            colspan: visible.len().max(1),
        }]
    } else {
        values
            .iter()
            .map(|record| TableRow::Data {
                cells: visible
                    .iter()
                    .map(|c| c.render_cell(record.get(&c.accessor)))
                    .collect(),
            })
            .collect()
    };

    Ok(RenderedTable {
        title: None,
        columns: columns.to_vec(),
        headers: visible.iter().map(|c| c.header.clone()).collect(),
        rows,
    })
}

/// Tabla de una página junto con su estado de paginación
#[derive(Debug, Clone, Serialize)]
pub struct TablePage {
    pub table: RenderedTable,
    pub page: usize,
    pub page_size: usize,
    pub total_items: usize,
    pub total_pages: usize,
    pub has_next: bool,
    pub has_prev: bool,
}

/// Renderizar sólo la página actual de `records`
pub fn render_page<T: Serialize>(
    records: &[T],
    columns: &[ColumnDescriptor],
    paginator: &Paginator,
) -> AppResult<TablePage> {
    Ok(TablePage {
        table: render_table(paginator.slice(records), columns)?,
        page: paginator.page(),
        page_size: paginator.page_size(),
        total_items: records.len(),
        total_pages: paginator.total_pages(),
        has_next: paginator.has_next(),
        has_prev: paginator.has_prev(),
    })
}

/// Primera letra en mayúscula, como los encabezados del drill-down
pub fn capitalize(key: &str) -> String {
    let mut chars = key.chars();
    match chars.next() {
        Some(first) => first.to_uppercase().chain(chars).collect(),
        None => String::new(),
    }
}

/// Tabla de drill-down: columnas tomadas del primer registro, sin `color`
pub fn drill_down<T: Serialize>(title: &str, records: &[T]) -> AppResult<RenderedTable> {
    let values = to_values(records)?;

    let columns: Vec<ColumnDescriptor> = values
        .first()
        .and_then(Value::as_object)
        .map(|first| {
            first
                .keys()
                .filter(|key| key.as_str() != "color")
                .map(|key| {
                    let column = ColumnDescriptor::new(key, &capitalize(key));
                    if CURRENCY_KEYS.contains(&key.as_str()) {
                        column.formatted(FormatKind::Currency)
                    } else {
                        column.formatted(FormatKind::Decimal)
                    }
                })
                .collect()
        })
        .unwrap_or_default();

    Ok(render_table(&values, &columns)?.with_title(title))
}
