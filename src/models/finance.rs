//! Modelos financieros
//!
//! Montos en `f64` (pesos); sólo se muestran, no se contabilizan aquí.

use serde::{Deserialize, Serialize};

/// Categoría de gasto con su total y color de leyenda
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq)]
pub struct ExpenseCategory {
    pub name: String,
    pub value: f64,
    pub color: String,
    #[serde(default)]
    pub deducible: bool,
}

/// Ingresos y gastos de un mes
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq)]
pub struct MonthlyFlow {
    pub mes: String,
    pub ingresos: f64,
    pub gastos: f64,
}

/// Ingresos y gastos de una semana
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq)]
pub struct WeeklyFlow {
    pub semana: String,
    pub ingresos: f64,
    pub gastos: f64,
}

#[derive(Debug, Clone, Serialize, Deserialize, PartialEq)]
pub struct BalancePoint {
    pub fecha: String,
    pub saldo: f64,
}

/// Resumen por cuenta
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq)]
pub struct AccountSummary {
    pub cuenta: String,
    pub ingresos: f64,
    pub gastos: f64,
    pub saldo: f64,
}

/// Cuenta con presupuesto asignado
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq)]
pub struct AccountBudget {
    pub nombre: String,
    pub saldo: f64,
    pub presupuesto: f64,
}

/// Todo lo que consume el dashboard financiero
#[derive(Debug, Clone, Serialize)]
pub struct FinancialDataset {
    pub gastos_por_categoria: Vec<ExpenseCategory>,
    pub mensuales: Vec<MonthlyFlow>,
    pub semanales: Vec<WeeklyFlow>,
    pub saldos_tiempo: Vec<BalancePoint>,
    pub saldos_historicos: Vec<BalancePoint>,
    pub cuentas: Vec<AccountSummary>,
    pub presupuestos: Vec<AccountBudget>,
}

impl FinancialDataset {
    /// Saldo total de todas las cuentas
    pub fn total_balance(&self) -> f64 {
        self.cuentas.iter().map(|c| c.saldo).sum()
    }
}
