//! Persistence layer: libSQL-backed storage for the profile slot and settings.

pub mod gateway;
pub mod libsql_backend;
pub mod migrations;
pub mod traits;

pub use gateway::{PersistenceGateway, ProfileField, RecordHandle};
pub use libsql_backend::LibSqlBackend;
pub use traits::Database;
