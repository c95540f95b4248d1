//! Acceso a datos
//!
//! `FleetDataSource` es la única interfaz que consumen los servicios; hay una
//! implementación con datos de muestra y otra sobre PostgreSQL.

pub mod fleet_data_source;
pub mod mock_fleet_repository;
pub mod pg_fleet_repository;
pub mod sample_data;

pub use fleet_data_source::FleetDataSource;
pub use mock_fleet_repository::MockFleetRepository;
pub use pg_fleet_repository::PgFleetRepository;
