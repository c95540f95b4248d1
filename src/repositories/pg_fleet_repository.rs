//! Repositorio PostgreSQL
//!
//! Lee el esquema de Supabase (`vehiculos`, `viajes`, `cuentas`,
//! `categorias_gastos`, `gastos`, vistas de resumen) y la tabla de telemetría
//! `lecturas_temperatura`.

use async_trait::async_trait;
use chrono::NaiveDateTime;
use sqlx::PgPool;
use std::collections::BTreeMap;

use crate::models::finance::{
    AccountBudget, AccountSummary, BalancePoint, ExpenseCategory, FinancialDataset, MonthlyFlow,
    WeeklyFlow,
};
use crate::models::quality::{
    ColdChainStatus, ColdChainVehicle, Coords, Facility, Incident, TemperaturePoint, TimeRange,
    UnitType, NOMINAL_UPPER,
};
use crate::models::trip::{
    CategoryCount, DailyTrips, Destination, OperationalCounters, Trip, TripSummary,
};
use crate::models::vehicle::{FleetUnit, PolicyStatus, VehicleStatus};
use crate::presentation::kpi::{round1, series_stats};
use crate::repositories::fleet_data_source::FleetDataSource;
use crate::repositories::sample_data::{PALETTE, WEEKDAYS};
use crate::utils::errors::{AppError, AppResult};

#[derive(Debug, sqlx::FromRow)]
struct ReadingRow {
    id: String,
    vehiculo_id: String,
    numero_eco: String,
    tipo_caja: Option<String>,
    cedis: String,
    temperatura: f64,
    registrada_en: NaiveDateTime,
    ubicacion: Option<String>,
    latitud: Option<f64>,
    longitud: Option<f64>,
    cliente: Option<String>,
    detalle: Option<String>,
}

#[derive(Debug, sqlx::FromRow)]
struct TimelineRow {
    bucket: NaiveDateTime,
    avg_temp: f64,
    min_temp: f64,
    max_temp: f64,
}

#[derive(Debug, sqlx::FromRow)]
struct FleetUnitRow {
    numero_eco: String,
    estatus: Option<String>,
    km_acumulados: f64,
    operador: Option<String>,
    nivel_servicio: f64,
    rendimiento_promedio: f64,
    incidencias: i32,
    saldo_casetas: f64,
    km_para_servicio: f64,
    costo_por_km: f64,
    poliza_seguro: Option<String>,
    costo_mantenimiento: f64,
}

impl TryFrom<FleetUnitRow> for FleetUnit {
    type Error = AppError;

    fn try_from(row: FleetUnitRow) -> Result<Self, Self::Error> {
        Ok(FleetUnit {
            estatus: row.estatus.as_deref().unwrap_or("Disponible").parse::<VehicleStatus>()?,
            poliza_seguro: row.poliza_seguro.as_deref().unwrap_or("Vigente").parse::<PolicyStatus>()?,
            numero_eco: row.numero_eco,
            kilometros_acumulados: row.km_acumulados,
            operador_asignado: row.operador,
            nivel_servicio: row.nivel_servicio,
            rendimiento_promedio: row.rendimiento_promedio,
            incidencias: row.incidencias.max(0) as u32,
            saldo_casetas: row.saldo_casetas,
            km_para_servicio: row.km_para_servicio,
            costo_por_km: row.costo_por_km,
            costo_mantenimiento: row.costo_mantenimiento,
        })
    }
}

#[derive(Debug, sqlx::FromRow)]
struct TripRow {
    id: String,
    destino: String,
    cliente: String,
    vehiculo: String,
    operador: String,
    ingresos: f64,
    combustible_costo: f64,
    casetas_costo: f64,
    otros_gastos: f64,
    numero_entregas: i32,
    tiempo_descarga: String,
    fecha_salida: NaiveDateTime,
    fecha_llegada: Option<NaiveDateTime>,
    fecha_retorno: Option<NaiveDateTime>,
}

impl From<TripRow> for Trip {
    fn from(row: TripRow) -> Self {
        Trip {
            id: row.id,
            origen: "CEDIS".to_string(),
            destino: row.destino,
            cliente: row.cliente,
            vehiculo: row.vehiculo,
            operador: row.operador,
            ingreso: row.ingresos,
            gasto_combustible: row.combustible_costo,
            gasto_casetas: row.casetas_costo,
            otros_gastos: row.otros_gastos,
            entregas: row.numero_entregas.max(0) as u32,
            tiempo_descarga: row.tiempo_descarga,
            salida: row.fecha_salida,
            llegada: row.fecha_llegada,
            regreso: row.fecha_retorno,
        }
    }
}

#[derive(Debug, sqlx::FromRow)]
struct CountersRow {
    incidencias: i64,
    kilometros: f64,
    combustible: f64,
    combustible_presupuestado: f64,
    pedidos_entregados: i64,
    pedidos_programados: i64,
}

#[derive(Debug, sqlx::FromRow)]
struct NamedCountRow {
    name: String,
    value: f64,
}

#[derive(Debug, sqlx::FromRow)]
struct WeekdayRow {
    dow: i32,
    viajes: i64,
}

#[derive(Debug, sqlx::FromRow)]
struct DestinationRow {
    destino: String,
    tiempo_descarga: String,
    num_entregas: i64,
}

#[derive(Debug, sqlx::FromRow)]
struct CategoryRow {
    name: String,
    value: f64,
    color: String,
    deducible: bool,
}

#[derive(Debug, sqlx::FromRow)]
struct FlowRow {
    periodo: String,
    ingresos: f64,
    gastos: f64,
    saldo: f64,
}

#[derive(Debug, sqlx::FromRow)]
struct AccountRow {
    cuenta: String,
    ingresos: f64,
    gastos: f64,
    saldo: f64,
}

#[derive(Debug, sqlx::FromRow)]
struct BudgetRow {
    nombre: String,
    saldo: f64,
    presupuesto: f64,
}

fn parse_unit_type(value: Option<&str>) -> UnitType {
    match value.map(|v| v.trim().to_lowercase()).as_deref() {
        Some("congelado") => UnitType::Congelado,
        Some("mixto") => UnitType::Mixto,
        _ => UnitType::Refrigerado,
    }
}

/// Agrupa lecturas por vehículo: las que rebasan el umbral son incidentes
fn group_readings(rows: Vec<ReadingRow>) -> AppResult<Vec<ColdChainVehicle>> {
    let mut by_vehicle: BTreeMap<String, (ReadingRow, Vec<f64>, Vec<Incident>)> = BTreeMap::new();

    for row in rows {
        let temperature = row.temperatura;
        let incident = (temperature > NOMINAL_UPPER).then(|| Incident {
            id: row.id.clone(),
            timestamp: row.registrada_en,
            temperature,
            location: row.ubicacion.clone().unwrap_or_default(),
            coords: Coords {
                lat: row.latitud.unwrap_or_default(),
                lng: row.longitud.unwrap_or_default(),
            },
            client: row.cliente.clone().unwrap_or_default(),
            details: row.detalle.clone().unwrap_or_default(),
        });

        let entry = by_vehicle
            .entry(row.numero_eco.clone())
            .or_insert_with(|| (row, Vec::new(), Vec::new()));
        entry.1.push(temperature);
        entry.2.extend(incident);
    }

    by_vehicle
        .into_values()
        .map(|(first, readings, mut incidents)| {
            let cedis = first.cedis.parse::<Facility>()?;
            let stats = series_stats(&readings).ok_or_else(|| {
                AppError::Internal(format!("Vehículo {} sin lecturas válidas", first.numero_eco))
            })?;
            incidents.sort_by(|a, b| b.timestamp.cmp(&a.timestamp));
            Ok(ColdChainVehicle {
                id: first.vehiculo_id,
                num_eco: first.numero_eco,
                unit_type: parse_unit_type(first.tipo_caja.as_deref()),
                status: ColdChainStatus::derive(incidents.len(), stats.max),
                cedis,
                min_temp: stats.min,
                max_temp: stats.max,
                avg_temp: round1(stats.avg),
                deliveries_in_range: (readings.len() - incidents.len()) as u32,
                incidents,
            })
        })
        .collect()
}

pub struct PgFleetRepository {
    pool: PgPool,
}

impl PgFleetRepository {
    pub fn new(pool: PgPool) -> Self {
        Self { pool }
    }

    async fn fetch_flows(&self, view: &str, period_column: &str) -> AppResult<Vec<FlowRow>> {
        let sql = format!(
            "SELECT {period}::text AS periodo, COALESCE(ingresos, 0)::float8 AS ingresos, \
             COALESCE(gastos, 0)::float8 AS gastos, COALESCE(saldo, 0)::float8 AS saldo \
             FROM {view} ORDER BY {period}",
            period = period_column,
            view = view
        );
        let rows = sqlx::query_as::<_, FlowRow>(&sql).fetch_all(&self.pool).await?;
        Ok(rows)
    }

    fn colored(rows: Vec<NamedCountRow>) -> Vec<CategoryCount> {
        rows.into_iter()
            .enumerate()
            .map(|(i, row)| CategoryCount {
                name: row.name,
                value: row.value,
                color: PALETTE[i % PALETTE.len()].to_string(),
            })
            .collect()
    }
}

#[async_trait]
impl FleetDataSource for PgFleetRepository {
    fn name(&self) -> &'static str {
        "postgres"
    }

    async fn fetch_vehicles(
        &self,
        facility: Facility,
        range: TimeRange,
    ) -> AppResult<Vec<ColdChainVehicle>> {
        let rows = sqlx::query_as::<_, ReadingRow>(
            r#"
            SELECT l.id::text AS id, v.id::text AS vehiculo_id, v.numero_eco, l.tipo_caja, l.cedis,
                   l.temperatura::float8 AS temperatura, l.registrada_en::timestamp AS registrada_en,
                   l.ubicacion, l.latitud::float8 AS latitud, l.longitud::float8 AS longitud,
                   l.cliente, l.detalle
            FROM lecturas_temperatura l
            JOIN vehiculos v ON v.id = l.vehiculo_id
            WHERE l.registrada_en >= NOW() - make_interval(days => $1)
              AND ($2 = 'all' OR l.cedis = $2)
            ORDER BY v.numero_eco, l.registrada_en
            "#,
        )
        .bind(range.days() as i32)
        .bind(facility.id())
        .fetch_all(&self.pool)
        .await?;

        group_readings(rows)
    }

    async fn fetch_temperature_timeline(&self, range: TimeRange) -> AppResult<Vec<TemperaturePoint>> {
        let (bucket, label) = match range {
            TimeRange::Today => ("hour", "%H:00"),
            TimeRange::Week | TimeRange::Month => ("day", "%d/%m"),
        };

        let rows = sqlx::query_as::<_, TimelineRow>(
            r#"
            SELECT date_trunc($1, registrada_en)::timestamp AS bucket,
                   AVG(temperatura)::float8 AS avg_temp,
                   MIN(temperatura)::float8 AS min_temp,
                   MAX(temperatura)::float8 AS max_temp
            FROM lecturas_temperatura
            WHERE registrada_en >= NOW() - make_interval(days => $2)
            GROUP BY bucket
            ORDER BY bucket
            "#,
        )
        .bind(bucket)
        .bind(range.days() as i32)
        .fetch_all(&self.pool)
        .await?;

        Ok(rows
            .into_iter()
            .map(|row| TemperaturePoint {
                time: row.bucket.format(label).to_string(),
                datetime: row.bucket,
                avg_temp: round1(row.avg_temp),
                min_temp: round1(row.min_temp),
                max_temp: round1(row.max_temp),
            })
            .collect())
    }

    async fn fetch_fleet_units(&self) -> AppResult<Vec<FleetUnit>> {
        let rows = sqlx::query_as::<_, FleetUnitRow>(
            r#"
            SELECT v.numero_eco, v.estatus,
                   COALESCE(v.km_acumulados, 0)::float8 AS km_acumulados,
                   NULLIF(TRIM(COALESCE(u.nombre, '') || ' ' || COALESCE(u.apellido, '')), '') AS operador,
                   COALESCE(v.nivel_servicio, 0)::float8 AS nivel_servicio,
                   COALESCE(v.rendimiento_promedio, 0)::float8 AS rendimiento_promedio,
                   COALESCE(v.incidencias, 0)::int4 AS incidencias,
                   COALESCE(v.saldo_casetas, 0)::float8 AS saldo_casetas,
                   COALESCE(v.km_para_servicio, 0)::float8 AS km_para_servicio,
                   COALESCE(v.costo_por_km, 0)::float8 AS costo_por_km,
                   v.poliza_seguro,
                   COALESCE(v.costo_mantenimiento, 0)::float8 AS costo_mantenimiento
            FROM vehiculos v
            LEFT JOIN usuarios u ON u.id = v.operador_id
            WHERE COALESCE(v.activo, true)
            ORDER BY v.numero_eco
            "#,
        )
        .fetch_all(&self.pool)
        .await?;

        rows.into_iter().map(FleetUnit::try_from).collect()
    }

    async fn fetch_trips(&self) -> AppResult<Vec<Trip>> {
        let rows = sqlx::query_as::<_, TripRow>(
            r#"
            SELECT vi.id::text AS id,
                   COALESCE(d.nombre, '') AS destino,
                   COALESCE(c.nombre, '') AS cliente,
                   COALESCE(v.numero_eco, '') AS vehiculo,
                   COALESCE(TRIM(u.nombre || ' ' || COALESCE(u.apellido, '')), '') AS operador,
                   COALESCE(vi.ingresos, 0)::float8 AS ingresos,
                   COALESCE(vi.combustible_costo, 0)::float8 AS combustible_costo,
                   COALESCE(vi.casetas_costo, 0)::float8 AS casetas_costo,
                   COALESCE(vi.otros_gastos, 0)::float8 AS otros_gastos,
                   COALESCE(vi.numero_entregas, 0)::int4 AS numero_entregas,
                   COALESCE(to_char(vi.tiempo_descarga, 'HH24:MI'), '00:00') AS tiempo_descarga,
                   vi.fecha_salida::timestamp AS fecha_salida,
                   vi.fecha_llegada::timestamp AS fecha_llegada,
                   vi.fecha_retorno::timestamp AS fecha_retorno
            FROM viajes vi
            LEFT JOIN destinos d ON d.id = vi.destino_id
            LEFT JOIN clientes c ON c.id = vi.cliente_id
            LEFT JOIN vehiculos v ON v.id = vi.vehiculo_id
            LEFT JOIN usuarios u ON u.id = vi.operador_id
            ORDER BY vi.fecha_salida
            "#,
        )
        .fetch_all(&self.pool)
        .await?;

        Ok(rows.into_iter().map(Trip::from).collect())
    }

    async fn fetch_operational_counters(&self) -> AppResult<OperationalCounters> {
        let row = sqlx::query_as::<_, CountersRow>(
            r#"
            SELECT COALESCE(asistencias, 0)::int8 AS incidencias,
                   COALESCE(kilometros, 0)::float8 AS kilometros,
                   COALESCE(combustible, 0)::float8 AS combustible,
                   COALESCE(combustible_presupuestado, 0)::float8 AS combustible_presupuestado,
                   COALESCE(pedidos_entregados, 0)::int8 AS pedidos_entregados,
                   COALESCE(pedidos_programados, 0)::int8 AS pedidos_programados
            FROM kpis_operativos
            LIMIT 1
            "#,
        )
        .fetch_optional(&self.pool)
        .await?;

        Ok(match row {
            Some(row) => OperationalCounters {
                incidencias: row.incidencias.max(0) as u32,
                kilometros: row.kilometros,
                combustible: row.combustible,
                combustible_presupuestado: row.combustible_presupuestado,
                pedidos_entregados: row.pedidos_entregados.max(0) as u32,
                pedidos_programados: row.pedidos_programados.max(0) as u32,
            },
            None => OperationalCounters {
                incidencias: 0,
                kilometros: 0.0,
                combustible: 0.0,
                combustible_presupuestado: 0.0,
                pedidos_entregados: 0,
                pedidos_programados: 0,
            },
        })
    }

    async fn fetch_trip_summary(&self) -> AppResult<TripSummary> {
        let por_cliente = sqlx::query_as::<_, NamedCountRow>(
            r#"
            SELECT c.nombre AS name, COUNT(*)::float8 AS value
            FROM viajes vi JOIN clientes c ON c.id = vi.cliente_id
            GROUP BY c.nombre
            ORDER BY value DESC, c.nombre
            "#,
        )
        .fetch_all(&self.pool)
        .await?;

        let por_camion = sqlx::query_as::<_, NamedCountRow>(
            r#"
            SELECT 'Camión ' || v.numero_eco AS name, COUNT(*)::float8 AS value
            FROM viajes vi JOIN vehiculos v ON v.id = vi.vehiculo_id
            GROUP BY v.numero_eco
            ORDER BY v.numero_eco
            "#,
        )
        .fetch_all(&self.pool)
        .await?;

        let por_dia = sqlx::query_as::<_, WeekdayRow>(
            r#"
            SELECT EXTRACT(ISODOW FROM fecha_salida)::int4 AS dow, COUNT(*)::int8 AS viajes
            FROM viajes
            WHERE fecha_salida >= NOW() - INTERVAL '7 days'
            GROUP BY dow
            "#,
        )
        .fetch_all(&self.pool)
        .await?;

        let destinos = sqlx::query_as::<_, DestinationRow>(
            r#"
            SELECT d.nombre AS destino,
                   COALESCE(to_char(AVG(vi.tiempo_descarga), 'HH24:MI'), '00:00') AS tiempo_descarga,
                   COALESCE(SUM(vi.numero_entregas), 0)::int8 AS num_entregas
            FROM destinos d
            LEFT JOIN viajes vi ON vi.destino_id = d.id
            GROUP BY d.id, d.nombre
            ORDER BY d.nombre
            "#,
        )
        .fetch_all(&self.pool)
        .await?;

        // ISODOW: 1 = lunes .. 7 = domingo
        let viajes_diarios = WEEKDAYS
            .iter()
            .enumerate()
            .map(|(i, dia)| DailyTrips {
                dia: dia.to_string(),
                viajes: por_dia
                    .iter()
                    .find(|row| row.dow == i as i32 + 1)
                    .map(|row| row.viajes.max(0) as u32)
                    .unwrap_or(0),
            })
            .collect();

        Ok(TripSummary {
            viajes_por_cliente: Self::colored(por_cliente),
            viajes_por_camion: Self::colored(por_camion),
            viajes_diarios,
            destinos: destinos
                .into_iter()
                .map(|row| Destination {
                    destino: row.destino,
                    tiempo_descarga: row.tiempo_descarga,
                    num_entregas: row.num_entregas.max(0) as u32,
                })
                .collect(),
        })
    }

    async fn fetch_financial_dataset(&self) -> AppResult<FinancialDataset> {
        let categorias = sqlx::query_as::<_, CategoryRow>(
            r#"
            SELECT cg.nombre AS name, COALESCE(SUM(g.monto), 0)::float8 AS value,
                   COALESCE(cg.color, '#666666') AS color,
                   COALESCE(cg.es_deducible, true) AS deducible
            FROM categorias_gastos cg
            LEFT JOIN gastos g ON g.categoria_id = cg.id
            GROUP BY cg.id, cg.nombre, cg.color, cg.es_deducible
            ORDER BY cg.nombre
            "#,
        )
        .fetch_all(&self.pool)
        .await?;

        let mensuales = self.fetch_flows("resumen_financiero", "mes").await?;
        let semanales = self.fetch_flows("resumen_financiero_semanal", "semana").await?;

        let cuentas = sqlx::query_as::<_, AccountRow>(
            r#"
            SELECT c.nombre AS cuenta,
                   COALESCE(SUM(t.monto) FILTER (WHERE t.tipo = 'ingreso'), 0)::float8 AS ingresos,
                   COALESCE(SUM(t.monto) FILTER (WHERE t.tipo = 'gasto'), 0)::float8 AS gastos,
                   COALESCE(c.saldo, 0)::float8 AS saldo
            FROM cuentas c
            LEFT JOIN transacciones t ON t.cuenta_id = c.id
            GROUP BY c.id, c.nombre, c.saldo
            ORDER BY c.nombre
            "#,
        )
        .fetch_all(&self.pool)
        .await?;

        let presupuestos = sqlx::query_as::<_, BudgetRow>(
            r#"
            SELECT nombre, COALESCE(saldo, 0)::float8 AS saldo, presupuesto::float8 AS presupuesto
            FROM cuentas
            WHERE presupuesto IS NOT NULL
            ORDER BY nombre
            "#,
        )
        .fetch_all(&self.pool)
        .await?;

        Ok(FinancialDataset {
            gastos_por_categoria: categorias
                .into_iter()
                .map(|row| ExpenseCategory {
                    name: row.name,
                    value: row.value,
                    color: row.color,
                    deducible: row.deducible,
                })
                .collect(),
            saldos_tiempo: mensuales
                .iter()
                .map(|row| BalancePoint { fecha: row.periodo.clone(), saldo: row.saldo })
                .collect(),
            mensuales: mensuales
                .into_iter()
                .map(|row| MonthlyFlow { mes: row.periodo, ingresos: row.ingresos, gastos: row.gastos })
                .collect(),
            saldos_historicos: semanales
                .iter()
                .map(|row| BalancePoint { fecha: row.periodo.clone(), saldo: row.saldo })
                .collect(),
            semanales: semanales
                .into_iter()
                .map(|row| WeeklyFlow { semana: row.periodo, ingresos: row.ingresos, gastos: row.gastos })
                .collect(),
            cuentas: cuentas
                .into_iter()
                .map(|row| AccountSummary {
                    cuenta: row.cuenta,
                    ingresos: row.ingresos,
                    gastos: row.gastos,
                    saldo: row.saldo,
                })
                .collect(),
            presupuestos: presupuestos
                .into_iter()
                .map(|row| AccountBudget {
                    nombre: row.nombre,
                    saldo: row.saldo,
                    presupuesto: row.presupuesto,
                })
                .collect(),
        })
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use chrono::NaiveDate;

    fn reading(id: &str, eco: &str, cedis: &str, temperatura: f64, hour: u32) -> ReadingRow {
        ReadingRow {
            id: id.to_string(),
            vehiculo_id: format!("veh-{}", eco),
            numero_eco: eco.to_string(),
            tipo_caja: Some("Congelado".to_string()),
            cedis: cedis.to_string(),
            temperatura,
            registrada_en: NaiveDate::from_ymd_opt(2024, 3, 15)
                .unwrap()
                .and_hms_opt(hour, 0, 0)
                .unwrap(),
            ubicacion: None,
            latitud: Some(19.3),
            longitud: Some(-99.15),
            cliente: Some("Cliente A".to_string()),
            detalle: None,
        }
    }

    #[test]
    fn test_group_readings_splits_incidents() {
        let vehicles = group_readings(vec![
            reading("1", "ECO-1", "cedis2", 4.0, 8),
            reading("2", "ECO-1", "cedis2", 9.2, 9),
            reading("3", "ECO-1", "cedis2", 5.0, 10),
            reading("4", "ECO-2", "cedis1", 3.0, 8),
        ])
        .unwrap();

        assert_eq!(vehicles.len(), 2);
        let eco1 = &vehicles[0];
        assert_eq!(eco1.cedis, Facility::Sur);
        assert_eq!(eco1.unit_type, UnitType::Congelado);
        assert_eq!(eco1.deliveries_in_range, 2);
        assert_eq!(eco1.incident_count(), 1);
        assert_eq!(eco1.max_temp, 9.2);
        assert_eq!(eco1.status, ColdChainStatus::Alerta);
        assert_eq!(vehicles[1].status, ColdChainStatus::Optimo);
    }

    #[test]
    fn test_group_readings_rejects_unknown_facility() {
        let result = group_readings(vec![reading("1", "ECO-1", "cedis9", 4.0, 8)]);
        assert!(result.is_err());
    }

    #[test]
    fn test_fleet_row_defaults() {
        let row = FleetUnitRow {
            numero_eco: "FL010".to_string(),
            estatus: None,
            km_acumulados: 1000.0,
            operador: None,
            nivel_servicio: 0.0,
            rendimiento_promedio: 3.0,
            incidencias: -1,
            saldo_casetas: 0.0,
            km_para_servicio: 500.0,
            costo_por_km: 8.0,
            poliza_seguro: None,
            costo_mantenimiento: 4.0,
        };
        let unit = FleetUnit::try_from(row).unwrap();
        assert_eq!(unit.estatus, VehicleStatus::Disponible);
        assert_eq!(unit.poliza_seguro, PolicyStatus::Vigente);
        assert_eq!(unit.incidencias, 0);
    }
}
