//! Diesel row types. Kept separate from `crate::models` so the wire/domain
//! shapes (UUIDs, PiiRecord) never leak Diesel's column conventions and vice
//! versa.

use chrono::{DateTime, Utc};
use diesel::prelude::*;
use serde_json::Value as JsonValue;
use uuid::Uuid;

use super::schema::*;

#[derive(Debug, Clone, Queryable, Selectable)]
#[diesel(table_name = persons)]
#[diesel(check_for_backend(diesel::pg::Pg))]
pub struct DbPerson {
    pub id: i64,
    pub reference_id: Uuid,
}

#[derive(Debug, Clone, Insertable)]
#[diesel(table_name = persons)]
pub struct NewDbPerson {
    pub reference_id: Uuid,
}

#[derive(Debug, Clone, Queryable, Selectable)]
#[diesel(table_name = patients)]
#[diesel(check_for_backend(diesel::pg::Pg))]
pub struct DbPatient {
    pub id: i64,
    pub reference_id: Uuid,
    pub person_id: Option<i64>,
    pub pii: JsonValue,
    pub external_patient_id: Option<String>,
    pub external_person_id: Option<String>,
    pub external_person_source: Option<String>,
    pub created_at: DateTime<Utc>,
}

#[derive(Debug, Clone, Insertable)]
#[diesel(table_name = patients)]
pub struct NewDbPatient {
    pub reference_id: Uuid,
    pub person_id: Option<i64>,
    pub pii: JsonValue,
    pub external_patient_id: Option<String>,
    pub external_person_id: Option<String>,
    pub external_person_source: Option<String>,
    pub created_at: DateTime<Utc>,
}

#[derive(Debug, Clone, AsChangeset)]
#[diesel(table_name = patients)]
pub struct AttachDbPatient {
    pub person_id: Option<i64>,
}

#[derive(Debug, Clone, Queryable, Selectable, Insertable)]
#[diesel(table_name = blocking_values)]
#[diesel(check_for_backend(diesel::pg::Pg))]
pub struct DbBlockingValue {
    pub patient_id: i64,
    pub key_id: i16,
    pub value: String,
}

#[derive(Debug, Clone, Queryable, Selectable)]
#[diesel(table_name = algorithms)]
#[diesel(check_for_backend(diesel::pg::Pg))]
pub struct DbAlgorithm {
    pub label: String,
    pub config: JsonValue,
    pub created_at: DateTime<Utc>,
}

#[derive(Debug, Clone, Insertable)]
#[diesel(table_name = algorithms)]
pub struct NewDbAlgorithm {
    pub label: String,
    pub config: JsonValue,
    pub created_at: DateTime<Utc>,
}

#[derive(Debug, Clone, Queryable, Selectable)]
#[diesel(table_name = audit_log)]
#[diesel(check_for_backend(diesel::pg::Pg))]
pub struct DbAuditLog {
    pub id: Uuid,
    pub timestamp: DateTime<Utc>,
    pub entity_type: String,
    pub entity_id: Uuid,
    pub action: String,
    pub details: Option<JsonValue>,
}

#[derive(Debug, Clone, Insertable)]
#[diesel(table_name = audit_log)]
pub struct NewDbAuditLog {
    pub id: Uuid,
    pub entity_type: String,
    pub entity_id: Uuid,
    pub action: String,
    pub details: Option<JsonValue>,
}
