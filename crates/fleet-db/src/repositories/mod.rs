//! Repository implementations
//!
//! PostgreSQL implementations of the reference-data repository traits
//! defined in fleet-core.

pub mod car_repo;
pub mod car_type_repo;

pub use car_repo::PgCarRepository;
pub use car_type_repo::PgCarTypeRepository;
