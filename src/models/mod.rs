//! Modelos del sistema
//!
//! Este módulo contiene los modelos de datos del dashboard: flota, viajes,
//! finanzas, control de calidad, acciones ejecutivas y autenticación.

pub mod action;
pub mod auth;
pub mod finance;
pub mod quality;
pub mod trip;
pub mod vehicle;
