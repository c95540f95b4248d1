pub mod action_routes;
pub mod agenda_routes;
pub mod auth_routes;
pub mod dashboard_routes;
pub mod health_routes;
