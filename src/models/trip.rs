//! Modelos operativos: viajes, destinos y contadores del período

use chrono::NaiveDateTime;
use serde::{Deserialize, Serialize};

/// Viaje realizado por una unidad
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq)]
pub struct Trip {
    pub id: String,
    pub origen: String,
    pub destino: String,
    pub cliente: String,
    pub vehiculo: String,
    pub operador: String,
    pub ingreso: f64,
    pub gasto_combustible: f64,
    pub gasto_casetas: f64,
    pub otros_gastos: f64,
    pub entregas: u32,
    /// Tiempo de descarga en formato HH:MM
    pub tiempo_descarga: String,
    pub salida: NaiveDateTime,
    pub llegada: Option<NaiveDateTime>,
    pub regreso: Option<NaiveDateTime>,
}

impl Trip {
    pub fn total_gastos(&self) -> f64 {
        self.gasto_combustible + self.gasto_casetas + self.otros_gastos
    }

    pub fn utilidad(&self) -> f64 {
        self.ingreso - self.total_gastos()
    }
}

/// Destino con su tiempo promedio de descarga
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq)]
pub struct Destination {
    pub destino: String,
    pub tiempo_descarga: String,
    pub num_entregas: u32,
}

/// Conteo por categoría para gráficas de dona
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq)]
pub struct CategoryCount {
    pub name: String,
    pub value: f64,
    pub color: String,
}

/// Viajes de un día de la semana
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq)]
pub struct DailyTrips {
    pub dia: String,
    pub viajes: u32,
}

/// Contadores crudos del período (vista `kpis_operativos`)
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq)]
pub struct OperationalCounters {
    pub incidencias: u32,
    pub kilometros: f64,
    pub combustible: f64,
    pub combustible_presupuestado: f64,
    pub pedidos_entregados: u32,
    pub pedidos_programados: u32,
}

/// Agregados de viajes para las gráficas y la tabla de destinos
#[derive(Debug, Clone, Serialize)]
pub struct TripSummary {
    pub viajes_por_cliente: Vec<CategoryCount>,
    pub viajes_por_camion: Vec<CategoryCount>,
    pub viajes_diarios: Vec<DailyTrips>,
    pub destinos: Vec<Destination>,
}
