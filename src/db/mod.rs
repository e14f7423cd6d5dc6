//! Database operations and connection management.

use diesel::pg::PgConnection;
use diesel::r2d2::{self, ConnectionManager, Pool};

use crate::config::DatabaseConfig;
use crate::Result;

pub mod algorithm_store;
pub mod audit;
pub mod models;
pub mod repository;
pub mod schema;

pub use algorithm_store::AlgorithmStore;
pub use audit::AuditLogRepository;
pub use repository::{DieselMpiRepository, MpiRepository};

pub type DbPool = Pool<ConnectionManager<PgConnection>>;

/// Creates a connection pool per the configured sizing.
pub fn create_pool(config: &DatabaseConfig) -> Result<DbPool> {
    let manager = ConnectionManager::<PgConnection>::new(&config.url);

    Pool::builder()
        .max_size(config.max_connections)
        .min_idle(Some(config.min_connections))
        .build(manager)
        .map_err(|e| crate::Error::Pool(e.to_string()))
}

pub fn get_connection(
    pool: &DbPool,
) -> Result<r2d2::PooledConnection<ConnectionManager<PgConnection>>> {
    Ok(pool.get()?)
}
