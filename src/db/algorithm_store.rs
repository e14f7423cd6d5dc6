//! Persists uploaded `AlgorithmConfig`s. Algorithms are immutable once
//! stored (§4.8): re-uploading an existing label is a `conflict`.

use chrono::Utc;
use diesel::prelude::*;
use diesel::r2d2::{ConnectionManager, Pool};
use diesel::PgConnection;

use crate::matching::config::AlgorithmConfig;
use crate::{Error, Result};

use super::models::{DbAlgorithm, NewDbAlgorithm};
use super::schema::algorithms;

pub struct AlgorithmStore {
    pool: Pool<ConnectionManager<PgConnection>>,
}

impl AlgorithmStore {
    pub fn new(pool: Pool<ConnectionManager<PgConnection>>) -> Self {
        Self { pool }
    }

    fn conn(&self) -> Result<diesel::r2d2::PooledConnection<ConnectionManager<PgConnection>>> {
        Ok(self.pool.get()?)
    }

    pub fn insert(&self, config: &AlgorithmConfig) -> Result<()> {
        let mut conn = self.conn()?;

        let existing: Option<DbAlgorithm> = algorithms::table
            .find(&config.label)
            .first(&mut conn)
            .optional()?;
        if existing.is_some() {
            return Err(Error::conflict(format!(
                "algorithm '{}' already exists and algorithms are immutable",
                config.label
            )));
        }

        let json = serde_json::to_value(config)
            .map_err(|e| Error::internal(format!("failed to serialize algorithm: {e}")))?;
        let row = NewDbAlgorithm {
            label: config.label.clone(),
            config: json,
            created_at: Utc::now(),
        };
        diesel::insert_into(algorithms::table).values(&row).execute(&mut conn)?;
        Ok(())
    }

    pub fn get(&self, label: &str) -> Result<Option<AlgorithmConfig>> {
        let mut conn = self.conn()?;
        let row: Option<DbAlgorithm> = algorithms::table.find(label).first(&mut conn).optional()?;
        row.map(|r| {
            serde_json::from_value(r.config)
                .map_err(|e| Error::internal(format!("corrupt stored algorithm '{label}': {e}")))
        })
        .transpose()
    }
}
