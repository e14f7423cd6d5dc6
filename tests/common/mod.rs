//! Common test utilities for integration tests.

use std::sync::Arc;

use axum::Router;

use mpi_linkage::api::rest::{create_router, AppState};
use mpi_linkage::config::Config;
use mpi_linkage::db::{create_pool, AlgorithmStore};
use mpi_linkage::matching::AlgorithmCache;

/// Builds application state against the configured test database.
pub fn create_test_app_state() -> AppState {
    let config = Config::from_env().expect("failed to load test config");
    let db_pool = create_pool(&config.database).expect("failed to create database pool");

    let store = Arc::new(AlgorithmStore::new(db_pool.clone()));
    let cache = Arc::new(AlgorithmCache::new(store, config.matching.default_algorithm_label.clone()));

    AppState::new(db_pool, cache, config)
}

pub fn create_test_router() -> Router {
    let state = create_test_app_state();
    create_router(state)
}

/// Unique family name per test run, to avoid cross-test blocking collisions.
pub fn unique_family_name(suffix: &str) -> String {
    use chrono::Utc;
    let timestamp = Utc::now().timestamp_micros();
    format!("TestFamily{suffix}{timestamp}")
}
