//! Shared application state for the REST API.

use std::sync::Arc;

use crate::config::Config;
use crate::db::repository::{DbPool, DieselMpiRepository, MpiRepository};
use crate::db::AuditLogRepository;
use crate::matching::AlgorithmCache;

#[derive(Clone)]
pub struct AppState {
    pub repository: Arc<dyn MpiRepository>,
    pub algorithm_cache: Arc<AlgorithmCache>,
    pub audit_log: Arc<AuditLogRepository>,
    pub config: Arc<Config>,
}

impl AppState {
    pub fn new(
        db_pool: DbPool,
        algorithm_cache: Arc<AlgorithmCache>,
        config: Config,
    ) -> Self {
        Self {
            repository: Arc::new(DieselMpiRepository::new(db_pool.clone())),
            algorithm_cache,
            audit_log: Arc::new(AuditLogRepository::new(db_pool)),
            config: Arc::new(config),
        }
    }
}
