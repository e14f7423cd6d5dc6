//! Person and Patient: the two persisted entities above BlockingValue.

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use utoipa::ToSchema;
use uuid::Uuid;

use super::pii::PiiRecord;

/// An opaque cluster. Carries no PII of its own — every comparable
/// attribute lives on the Patients attached to it.
#[derive(Debug, Clone, Serialize, Deserialize, ToSchema)]
pub struct Person {
    #[serde(skip_serializing)]
    pub id: i64,
    pub reference_id: Uuid,
}

/// A point-in-time external record. `person_id` is `None` until the driver
/// attaches it to a cluster (or forever, for a record that stayed
/// unattached). `pii` is the normalized-but-not-cleaned record; cleaning
/// happens only in the request-scoped comparison path.
#[derive(Debug, Clone, Serialize, Deserialize, ToSchema)]
pub struct Patient {
    #[serde(skip_serializing)]
    pub id: i64,
    pub reference_id: Uuid,
    #[serde(skip_serializing)]
    pub person_id: Option<i64>,
    pub pii: PiiRecord,
    pub external_patient_id: Option<String>,
    pub external_person_id: Option<String>,
    pub external_person_source: Option<String>,
    pub created_at: DateTime<Utc>,
}

/// A denormalized BlockingValue row: `(patient_id, key_id, value)`.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct BlockingValue {
    pub patient_id: i64,
    pub key_id: i16,
    pub value: String,
}
