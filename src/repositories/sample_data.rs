//! Conjuntos de datos de muestra
//!
//! Datos fijos que alimentan el dashboard cuando no hay base de datos:
//! finanzas, operación, flota, destinos, viajes y acciones ejecutivas.

use chrono::{NaiveDate, NaiveDateTime, NaiveTime};

use crate::models::action::{ActionStatus, ActionType, CalendarEvent, ExecutiveAction};
use crate::models::finance::{
    AccountBudget, AccountSummary, BalancePoint, ExpenseCategory, FinancialDataset, MonthlyFlow,
    WeeklyFlow,
};
use crate::models::trip::{
    CategoryCount, DailyTrips, Destination, OperationalCounters, Trip, TripSummary,
};
use crate::models::vehicle::{FleetUnit, PolicyStatus, VehicleStatus};

/// Paleta de las gráficas de dona
pub const PALETTE: [&str; 6] = ["#FF9900", "#6F797F", "#DB0000", "#444444", "#222222", "#666666"];

pub const WEEKDAYS: [&str; 7] = [
    "Lunes", "Martes", "Miércoles", "Jueves", "Viernes", "Sábado", "Domingo",
];

fn color_at(index: usize) -> String {
    PALETTE[index % PALETTE.len()].to_string()
}

fn counts(items: &[(&str, f64)]) -> Vec<CategoryCount> {
    items
        .iter()
        .enumerate()
        .map(|(i, (name, value))| CategoryCount {
            name: name.to_string(),
            value: *value,
            color: color_at(i),
        })
        .collect()
}

pub fn financial_dataset() -> FinancialDataset {
    let categorias = [
        ("Combustible", 45000.0, "#FF9900", true),
        ("Mantenimiento", 28000.0, "#6F797F", true),
        ("Salarios", 35000.0, "#DB0000", true),
        ("Seguros", 15000.0, "#444444", true),
        ("Otros", 7000.0, "#222222", true),
        ("No Deducibles", 18000.0, "#666666", false),
    ];

    let meses = ["Ene", "Feb", "Mar", "Abr", "May", "Jun"];
    let ingresos_mes = [120000.0, 135000.0, 128000.0, 142000.0, 139000.0, 150000.0];
    let gastos_mes = [95000.0, 105000.0, 100000.0, 110000.0, 108000.0, 113000.0];
    let saldos_mes = [25000.0, 55000.0, 83000.0, 115000.0, 146000.0, 183000.0];

    let ingresos_sem = [32000.0, 35000.0, 38000.0, 36000.0, 40000.0, 37000.0, 42000.0, 39000.0];
    let gastos_sem = [26000.0, 28000.0, 29000.0, 27000.0, 30000.0, 28000.0, 32000.0, 29000.0];
    let saldos_sem = [6000.0, 13000.0, 22000.0, 30000.0, 41000.0, 50000.0, 62000.0, 75000.0];

    FinancialDataset {
        gastos_por_categoria: categorias
            .iter()
            .map(|(name, value, color, deducible)| ExpenseCategory {
                name: name.to_string(),
                value: *value,
                color: color.to_string(),
                deducible: *deducible,
            })
            .collect(),
        mensuales: meses
            .iter()
            .zip(ingresos_mes.iter().zip(gastos_mes.iter()))
            .map(|(mes, (ingresos, gastos))| MonthlyFlow {
                mes: mes.to_string(),
                ingresos: *ingresos,
                gastos: *gastos,
            })
            .collect(),
        semanales: (0..ingresos_sem.len())
            .map(|i| WeeklyFlow {
                semana: format!("Sem{}", i + 1),
                ingresos: ingresos_sem[i],
                gastos: gastos_sem[i],
            })
            .collect(),
        saldos_tiempo: meses
            .iter()
            .zip(saldos_mes.iter())
            .map(|(mes, saldo)| BalancePoint {
                fecha: mes.to_string(),
                saldo: *saldo,
            })
            .collect(),
        saldos_historicos: saldos_sem
            .iter()
            .enumerate()
            .map(|(i, saldo)| BalancePoint {
                fecha: format!("Sem{}", i + 1),
                saldo: *saldo,
            })
            .collect(),
        cuentas: vec![
            account("Operativa", 750000.0, 580000.0, 170000.0),
            account("Reservas", 120000.0, 45000.0, 75000.0),
            account("Inversiones", 50000.0, 10000.0, 40000.0),
        ],
        presupuestos: vec![
            budget("Mantenimiento", 45000.0, 60000.0),
            budget("Combustible", 78000.0, 100000.0),
            budget("Casetas", 32000.0, 50000.0),
        ],
    }
}

fn account(cuenta: &str, ingresos: f64, gastos: f64, saldo: f64) -> AccountSummary {
    AccountSummary {
        cuenta: cuenta.to_string(),
        ingresos,
        gastos,
        saldo,
    }
}

fn budget(nombre: &str, saldo: f64, presupuesto: f64) -> AccountBudget {
    AccountBudget {
        nombre: nombre.to_string(),
        saldo,
        presupuesto,
    }
}

pub fn operational_counters() -> OperationalCounters {
    OperationalCounters {
        incidencias: 28,
        kilometros: 45680.0,
        combustible: 8950.0,
        combustible_presupuestado: 10000.0,
        pedidos_entregados: 340,
        pedidos_programados: 380,
    }
}

pub fn trip_summary() -> TripSummary {
    let diarios = [35, 42, 38, 40, 45, 25, 15];

    TripSummary {
        viajes_por_cliente: counts(&[
            ("Cliente A", 120.0),
            ("Cliente B", 80.0),
            ("Cliente C", 60.0),
            ("Cliente D", 40.0),
        ]),
        viajes_por_camion: counts(&[
            ("Camión 001", 45.0),
            ("Camión 002", 38.0),
            ("Camión 003", 42.0),
            ("Camión 004", 35.0),
            ("Camión 005", 40.0),
        ]),
        viajes_diarios: WEEKDAYS
            .iter()
            .zip(diarios.iter())
            .map(|(dia, viajes)| DailyTrips {
                dia: dia.to_string(),
                viajes: *viajes,
            })
            .collect(),
        destinos: [
            ("Cliente A", "01:45", 12),
            ("Cliente B", "02:30", 8),
            ("Cliente C", "01:15", 15),
            ("Cliente D", "03:00", 6),
            ("Cliente E", "00:45", 20),
        ]
        .iter()
        .map(|(destino, tiempo, entregas)| Destination {
            destino: destino.to_string(),
            tiempo_descarga: tiempo.to_string(),
            num_entregas: *entregas,
        })
        .collect(),
    }
}

#[allow(clippy::too_many_arguments)]
fn unit(
    numero_eco: &str,
    estatus: VehicleStatus,
    km: f64,
    operador: Option<&str>,
    nivel_servicio: f64,
    rendimiento: f64,
    incidencias: u32,
    saldo_casetas: f64,
    km_para_servicio: f64,
    costo_por_km: f64,
    poliza: PolicyStatus,
    costo_mantenimiento: f64,
) -> FleetUnit {
    FleetUnit {
        numero_eco: numero_eco.to_string(),
        estatus,
        kilometros_acumulados: km,
        operador_asignado: operador.map(str::to_string),
        nivel_servicio,
        rendimiento_promedio: rendimiento,
        incidencias,
        saldo_casetas,
        km_para_servicio,
        costo_por_km,
        poliza_seguro: poliza,
        costo_mantenimiento,
    }
}

pub fn fleet_units() -> Vec<FleetUnit> {
    use PolicyStatus::*;
    use VehicleStatus::*;

    vec![
        unit("FL001", EnRuta, 125680.0, Some("Carlos Gómez"), 95.0, 3.2, 2, 1580.0, 4320.0, 8.5, Vigente, 4.2),
        unit("FL002", Taller, 98750.0, Some("Manuel López"), 78.0, 2.9, 5, 980.0, 1250.0, 9.2, Vigente, 5.1),
        unit("FL003", Disponible, 112450.0, Some("Rafael Mora"), 92.0, 3.4, 1, 2100.0, 5500.0, 7.8, Vigente, 3.8),
        unit("FL004", SinOperador, 85600.0, None, 0.0, 3.1, 0, 950.0, 9800.0, 8.9, Vigente, 4.5),
        unit("FL005", Retorno, 156700.0, Some("Luis Ramírez"), 88.0, 2.8, 3, 1450.0, 3200.0, 9.5, Vencida, 5.8),
        unit("FL006", Cedis, 132800.0, Some("Miguel Ángel Fuentes"), 90.0, 3.0, 2, 1800.0, 7500.0, 8.2, Vigente, 4.0),
        unit("FL007", EnRampa, 108950.0, Some("Juan Carlos Vega"), 85.0, 3.3, 4, 1250.0, 6300.0, 8.7, Vigente, 4.3),
    ]
}

fn at(date: NaiveDate, hour: u32, minute: u32) -> NaiveDateTime {
    date.and_time(NaiveTime::from_hms_opt(hour, minute, 0).unwrap_or(NaiveTime::MIN))
}

/// Doce viajes de la primera quincena de junio, ordenados por salida
pub fn trips() -> Vec<Trip> {
    let rows = [
        ("Cliente A", "Monterrey", "FL001", "Carlos Gómez", 18500.0, 4200.0, 1350.0, 600.0, 12, "01:45"),
        ("Cliente B", "Puebla", "FL003", "Rafael Mora", 9800.0, 1900.0, 620.0, 350.0, 8, "02:30"),
        ("Cliente C", "Querétaro", "FL005", "Luis Ramírez", 11200.0, 2300.0, 780.0, 420.0, 15, "01:15"),
        ("Cliente D", "Guadalajara", "FL006", "Miguel Ángel Fuentes", 21400.0, 5100.0, 1620.0, 700.0, 6, "03:00"),
        ("Cliente E", "Toluca", "FL007", "Juan Carlos Vega", 6400.0, 980.0, 240.0, 180.0, 20, "00:45"),
        ("Cliente A", "Monterrey", "FL002", "Manuel López", 17900.0, 4350.0, 1350.0, 640.0, 11, "01:50"),
        ("Cliente B", "Puebla", "FL001", "Carlos Gómez", 10100.0, 1850.0, 620.0, 300.0, 9, "02:20"),
        ("Cliente C", "Querétaro", "FL003", "Rafael Mora", 10800.0, 2250.0, 780.0, 390.0, 14, "01:10"),
        ("Cliente D", "Guadalajara", "FL005", "Luis Ramírez", 20900.0, 5250.0, 1620.0, 820.0, 7, "02:55"),
        ("Cliente E", "Toluca", "FL006", "Miguel Ángel Fuentes", 6100.0, 1010.0, 240.0, 150.0, 19, "00:50"),
        ("Cliente A", "Monterrey", "FL007", "Juan Carlos Vega", 18800.0, 4150.0, 1350.0, 580.0, 13, "01:40"),
        ("Cliente C", "Querétaro", "FL001", "Carlos Gómez", 11500.0, 2400.0, 780.0, 410.0, 16, "01:20"),
    ];

    let start = NaiveDate::from_ymd_opt(2023, 6, 1).unwrap_or_default();

    rows.iter()
        .enumerate()
        .map(|(i, row)| {
            let (cliente, destino, vehiculo, operador, ingreso, combustible, casetas, otros, entregas, descarga) = *row;
            let day = start + chrono::Duration::days(i as i64);
            let salida = at(day, 6, 30);
            Trip {
                id: format!("VJ-{:04}", i + 1),
                origen: "CEDIS Centro".to_string(),
                destino: destino.to_string(),
                cliente: cliente.to_string(),
                vehiculo: vehiculo.to_string(),
                operador: operador.to_string(),
                ingreso,
                gasto_combustible: combustible,
                gasto_casetas: casetas,
                otros_gastos: otros,
                entregas,
                tiempo_descarga: descarga.to_string(),
                salida,
                llegada: Some(salida + chrono::Duration::hours(7)),
                regreso: Some(salida + chrono::Duration::hours(15)),
            }
        })
        .collect()
}

fn ymd(y: i32, m: u32, d: u32) -> NaiveDate {
    NaiveDate::from_ymd_opt(y, m, d).unwrap_or_default()
}

/// Acciones ejecutivas iniciales
pub fn executive_actions() -> Vec<ExecutiveAction> {
    vec![
        ExecutiveAction {
            id: 1,
            tipo: ActionType::Preventiva,
            descripcion: "Revisión general de la flota".to_string(),
            categoria: "Mantenimiento".to_string(),
            usuario_asignado: "Carlos González".to_string(),
            fecha_asignacion: ymd(2023, 5, 10),
            resultado_esperado: "Reducción de incidencias".to_string(),
            fecha_evaluacion: ymd(2023, 5, 17),
            estado: ActionStatus::Completed,
            notas: Some("Realizado conforme al plan".to_string()),
        },
        ExecutiveAction {
            id: 2,
            tipo: ActionType::Correctiva,
            descripcion: "Reparación urgente de unidad 003".to_string(),
            categoria: "Reparación".to_string(),
            usuario_asignado: "Miguel Ángel López".to_string(),
            fecha_asignacion: ymd(2023, 5, 12),
            resultado_esperado: "Unidad operativa".to_string(),
            fecha_evaluacion: ymd(2023, 5, 14),
            estado: ActionStatus::Pending,
            notas: Some("En espera de piezas".to_string()),
        },
        ExecutiveAction {
            id: 3,
            tipo: ActionType::Preventiva,
            descripcion: "Capacitación de operadores".to_string(),
            categoria: "Formación".to_string(),
            usuario_asignado: "Laura Ramírez".to_string(),
            fecha_asignacion: ymd(2023, 5, 5),
            resultado_esperado: "Mejora en eficiencia".to_string(),
            fecha_evaluacion: ymd(2023, 5, 20),
            estado: ActionStatus::InProgress,
            notas: Some("Primera sesión completada".to_string()),
        },
    ]
}

/// Eventos iniciales de la agenda; el 4 apunta a una acción que no existe
pub fn calendar_events() -> Vec<CalendarEvent> {
    [
        (1, "Evaluación de capacitación", ymd(2023, 5, 20), 3),
        (2, "Verificar reparación unidad 003", ymd(2023, 5, 14), 2),
        (3, "Seguimiento de incidencias", ymd(2023, 5, 17), 1),
        (4, "Evaluación de nuevas rutas", ymd(2023, 5, 25), 4),
    ]
    .into_iter()
    .map(|(id, title, date, accion_id)| CalendarEvent {
        id,
        title: title.to_string(),
        date,
        accion_id,
    })
    .collect()
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_trips_are_ordered_by_departure() {
        let trips = trips();
        assert_eq!(trips.len(), 12);
        assert!(trips.windows(2).all(|w| w[0].salida <= w[1].salida));
    }

    #[test]
    fn test_fleet_without_operator_has_none() {
        let units = fleet_units();
        let fl004 = units.iter().find(|u| u.numero_eco == "FL004").unwrap();
        assert_eq!(fl004.operador_asignado, None);
        assert_eq!(units.iter().filter(|u| u.estatus.is_available()).count(), 2);
    }

    #[test]
    fn test_balance_matches_accounts() {
        assert_eq!(financial_dataset().total_balance(), 285000.0);
    }
}
