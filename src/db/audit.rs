//! Audit log: records linkage decisions (entity_type `"patient"`/`"person"`,
//! action `"LINK"`), without persisting match provenance beyond the
//! decision itself.

use diesel::prelude::*;
use diesel::r2d2::{ConnectionManager, Pool};
use diesel::PgConnection;
use uuid::Uuid;

use super::models::{DbAuditLog, NewDbAuditLog};
use super::schema::audit_log;
use crate::Result;

pub struct AuditLogRepository {
    pool: Pool<ConnectionManager<PgConnection>>,
}

impl AuditLogRepository {
    pub fn new(pool: Pool<ConnectionManager<PgConnection>>) -> Self {
        Self { pool }
    }

    fn conn(&self) -> Result<diesel::r2d2::PooledConnection<ConnectionManager<PgConnection>>> {
        Ok(self.pool.get()?)
    }

    /// Records that `patient_id` was linked (or newly attached) to
    /// `person_id` with the given match grade.
    pub fn log_link_decision(
        &self,
        patient_reference_id: Uuid,
        person_reference_id: Uuid,
        match_grade: &str,
        pass_label: Option<&str>,
    ) -> Result<()> {
        let details = serde_json::json!({
            "person_reference_id": person_reference_id,
            "match_grade": match_grade,
            "pass_label": pass_label,
        });
        let mut conn = self.conn()?;
        let row = NewDbAuditLog {
            id: Uuid::new_v4(),
            entity_type: "patient".to_string(),
            entity_id: patient_reference_id,
            action: "LINK".to_string(),
            details: Some(details),
        };
        diesel::insert_into(audit_log::table).values(&row).execute(&mut conn)?;
        Ok(())
    }

    pub fn get_logs_for_entity(&self, entity_type: &str, entity_id: Uuid, limit: i64) -> Result<Vec<DbAuditLog>> {
        let mut conn = self.conn()?;
        let logs = audit_log::table
            .filter(audit_log::entity_type.eq(entity_type))
            .filter(audit_log::entity_id.eq(entity_id))
            .order(audit_log::timestamp.desc())
            .limit(limit)
            .load::<DbAuditLog>(&mut conn)?;
        Ok(logs)
    }

    pub fn get_recent_logs(&self, limit: i64) -> Result<Vec<DbAuditLog>> {
        let mut conn = self.conn()?;
        let logs = audit_log::table
            .order(audit_log::timestamp.desc())
            .limit(limit)
            .load::<DbAuditLog>(&mut conn)?;
        Ok(logs)
    }
}
