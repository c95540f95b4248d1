//! Middleware del sistema
//!
//! Sesión requerida para las rutas del dashboard y CORS.

pub mod auth;
pub mod cors;

pub use auth::require_session;
pub use cors::cors_layer;
