//! Services module
//!
//! Lógica de cada página del dashboard. Los servicios se construyen por
//! request a partir de `AppState` y devuelven vistas listas para serializar.

pub mod action_service;
pub mod agenda_service;
pub mod auth_service;
pub mod financial_service;
pub mod identity_service;
pub mod operational_service;
pub mod quality_service;

pub use action_service::{ActionBook, ActionService};
pub use agenda_service::AgendaService;
pub use auth_service::AuthService;
pub use financial_service::FinancialService;
pub use identity_service::{IdentityProvider, SupabaseIdentityClient};
pub use operational_service::OperationalService;
pub use quality_service::QualityService;
