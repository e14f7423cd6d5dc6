//! MPI Repository (§4.4): the only component that talks to Postgres.

use std::collections::{HashMap, HashSet};

use chrono::Utc;
use diesel::prelude::*;
use diesel::r2d2::{ConnectionManager, Pool};
use diesel::PgConnection;
use uuid::Uuid;

use crate::blocking::extract;
use crate::models::{BlockingValue, Patient, PiiRecord};
use crate::{Error, Result};

use super::models::{
    AttachDbPatient, DbBlockingValue, DbPatient, NewDbPatient, NewDbPerson,
};
use super::schema::{blocking_values, patients, persons};

pub type DbPool = Pool<ConnectionManager<PgConnection>>;

/// Contracts exposed to the core. Each method is atomic; `insert_patient`
/// runs its Patient row insert and its BlockingValue inserts in a single
/// transaction (§5).
pub trait MpiRepository: Send + Sync {
    fn insert_patient(
        &self,
        pii_for_storage: &PiiRecord,
        cleaned_for_blocking: &PiiRecord,
        person_id: Option<i64>,
        external_patient_id: Option<String>,
        external_person_id: Option<String>,
        external_person_source: Option<String>,
    ) -> Result<Patient>;

    fn insert_person(&self) -> Result<crate::models::Person>;

    fn attach(&self, patient_id: i64, person_id: i64) -> Result<()>;

    /// Returns every Patient matching `key_value_pairs` per §4.4's blocking
    /// contract, ordered by `(person_id, patient_id)` ascending.
    fn block(&self, key_value_pairs: &[(i16, String)]) -> Result<Vec<Patient>>;

    fn get_patients_by_person(&self, person_id: i64) -> Result<Vec<Patient>>;
    fn get_person(&self, reference_id: Uuid) -> Result<Option<crate::models::Person>>;
    fn get_person_by_id(&self, person_id: i64) -> Result<Option<crate::models::Person>>;
    fn get_patient(&self, reference_id: Uuid) -> Result<Option<Patient>>;
}

pub struct DieselMpiRepository {
    pool: DbPool,
}

impl DieselMpiRepository {
    pub fn new(pool: DbPool) -> Self {
        Self { pool }
    }

    fn conn(&self) -> Result<diesel::r2d2::PooledConnection<ConnectionManager<PgConnection>>> {
        Ok(self.pool.get()?)
    }
}

/// A unique-constraint violation on `external_patient_id` (§7's `conflict`
/// kind) is a real, non-retryable rejection, not a transient storage
/// failure — distinguish it from every other diesel error.
fn classify_insert_error(e: diesel::result::Error) -> Error {
    use diesel::result::{DatabaseErrorKind, Error as DieselError};
    match &e {
        DieselError::DatabaseError(DatabaseErrorKind::UniqueViolation, info) => {
            Error::conflict(format!("external_patient_id already exists: {}", info.message()))
        }
        _ => Error::Database(e),
    }
}

fn to_domain_patient(row: DbPatient) -> Result<Patient> {
    let pii: PiiRecord = serde_json::from_value(row.pii)
        .map_err(|e| Error::internal(format!("corrupt stored PII for patient {}: {e}", row.id)))?;
    Ok(Patient {
        id: row.id,
        reference_id: row.reference_id,
        person_id: row.person_id,
        pii,
        external_patient_id: row.external_patient_id,
        external_person_id: row.external_person_id,
        external_person_source: row.external_person_source,
        created_at: row.created_at,
    })
}

impl MpiRepository for DieselMpiRepository {
    fn insert_patient(
        &self,
        pii_for_storage: &PiiRecord,
        cleaned_for_blocking: &PiiRecord,
        person_id: Option<i64>,
        external_patient_id: Option<String>,
        external_person_id: Option<String>,
        external_person_source: Option<String>,
    ) -> Result<Patient> {
        let mut conn = self.conn()?;

        let pii_json = serde_json::to_value(pii_for_storage)
            .map_err(|e| Error::internal(format!("failed to serialize PII: {e}")))?;

        conn.transaction(|conn| {
            let new_row = NewDbPatient {
                reference_id: Uuid::new_v4(),
                person_id,
                pii: pii_json,
                external_patient_id,
                external_person_id,
                external_person_source,
                created_at: Utc::now(),
            };

            let row: DbPatient = diesel::insert_into(patients::table)
                .values(&new_row)
                .get_result(conn)
                .map_err(classify_insert_error)?;

            let blocking_rows: Vec<BlockingValue> = extract(row.id, cleaned_for_blocking);
            let db_rows: Vec<DbBlockingValue> = blocking_rows
                .into_iter()
                .map(|b| DbBlockingValue {
                    patient_id: b.patient_id,
                    key_id: b.key_id,
                    value: b.value,
                })
                .collect();

            if !db_rows.is_empty() {
                diesel::insert_into(blocking_values::table)
                    .values(&db_rows)
                    .execute(conn)?;
            }

            to_domain_patient(row)
        })
    }

    fn insert_person(&self) -> Result<crate::models::Person> {
        let mut conn = self.conn()?;
        let new_row = NewDbPerson { reference_id: Uuid::new_v4() };
        let row: super::models::DbPerson = diesel::insert_into(persons::table)
            .values(&new_row)
            .get_result(&mut conn)?;
        Ok(crate::models::Person { id: row.id, reference_id: row.reference_id })
    }

    fn attach(&self, patient_id: i64, person_id: i64) -> Result<()> {
        let mut conn = self.conn()?;
        diesel::update(patients::table.find(patient_id))
            .set(AttachDbPatient { person_id: Some(person_id) })
            .execute(&mut conn)?;
        Ok(())
    }

    fn block(&self, key_value_pairs: &[(i16, String)]) -> Result<Vec<Patient>> {
        if key_value_pairs.is_empty() {
            return Ok(Vec::new());
        }

        let mut conn = self.conn()?;

        let mut by_key: HashMap<i16, Vec<String>> = HashMap::new();
        for (key_id, value) in key_value_pairs {
            by_key.entry(*key_id).or_default().push(value.clone());
        }

        // Step 1: patients matching every key (at least one value each).
        let mut primary: Option<HashSet<i64>> = None;
        for (key_id, values) in &by_key {
            let matching: Vec<i64> = blocking_values::table
                .filter(blocking_values::key_id.eq(key_id))
                .filter(blocking_values::value.eq_any(values))
                .select(blocking_values::patient_id)
                .distinct()
                .load(&mut conn)?;
            let set: HashSet<i64> = matching.into_iter().collect();
            primary = Some(match primary {
                None => set,
                Some(acc) => acc.intersection(&set).copied().collect(),
            });
        }
        let primary = primary.unwrap_or_default();
        if primary.is_empty() {
            return Ok(Vec::new());
        }

        // Step 2: pull the Person ids of those patients, then every sibling
        // Patient sharing one of those Persons.
        let primary_vec: Vec<i64> = primary.iter().copied().collect();
        let person_ids: Vec<i64> = patients::table
            .filter(patients::id.eq_any(&primary_vec))
            .filter(patients::person_id.is_not_null())
            .select(patients::person_id.assume_not_null())
            .distinct()
            .load(&mut conn)?;

        if person_ids.is_empty() {
            let rows: Vec<DbPatient> = patients::table
                .filter(patients::id.eq_any(&primary_vec))
                .order((patients::person_id.asc(), patients::id.asc()))
                .load(&mut conn)?;
            return rows.into_iter().map(to_domain_patient).collect();
        }

        let sibling_rows: Vec<DbPatient> = patients::table
            .filter(
                patients::person_id
                    .eq_any(&person_ids)
                    .or(patients::id.eq_any(&primary_vec)),
            )
            .order((patients::person_id.asc(), patients::id.asc()))
            .load(&mut conn)?;

        // Snapshot every sibling's blocking values so missing-field
        // inclusion can be evaluated in memory (§5: "snapshotted before
        // scoring").
        let sibling_ids: Vec<i64> = sibling_rows.iter().map(|p| p.id).collect();
        let sibling_blocking: Vec<DbBlockingValue> = blocking_values::table
            .filter(blocking_values::patient_id.eq_any(&sibling_ids))
            .load(&mut conn)?;

        let mut by_patient: HashMap<i64, HashMap<i16, HashSet<String>>> = HashMap::new();
        for bv in sibling_blocking {
            by_patient
                .entry(bv.patient_id)
                .or_default()
                .entry(bv.key_id)
                .or_default()
                .insert(bv.value);
        }

        let mut out = Vec::new();
        for row in sibling_rows {
            if primary.contains(&row.id) {
                out.push(row);
                continue;
            }
            if sibling_qualifies(row.id, &by_key, &by_patient) {
                out.push(row);
            }
        }

        out.into_iter().map(to_domain_patient).collect()
    }

    fn get_patients_by_person(&self, person_id: i64) -> Result<Vec<Patient>> {
        let mut conn = self.conn()?;
        let rows: Vec<DbPatient> = patients::table
            .filter(patients::person_id.eq(person_id))
            .order(patients::id.asc())
            .load(&mut conn)?;
        rows.into_iter().map(to_domain_patient).collect()
    }

    fn get_person(&self, reference_id: Uuid) -> Result<Option<crate::models::Person>> {
        let mut conn = self.conn()?;
        let row: Option<super::models::DbPerson> = persons::table
            .filter(persons::reference_id.eq(reference_id))
            .first(&mut conn)
            .optional()?;
        Ok(row.map(|r| crate::models::Person { id: r.id, reference_id: r.reference_id }))
    }

    fn get_person_by_id(&self, person_id: i64) -> Result<Option<crate::models::Person>> {
        let mut conn = self.conn()?;
        let row: Option<super::models::DbPerson> =
            persons::table.find(person_id).first(&mut conn).optional()?;
        Ok(row.map(|r| crate::models::Person { id: r.id, reference_id: r.reference_id }))
    }

    fn get_patient(&self, reference_id: Uuid) -> Result<Option<Patient>> {
        let mut conn = self.conn()?;
        let row: Option<DbPatient> = patients::table
            .filter(patients::reference_id.eq(reference_id))
            .first(&mut conn)
            .optional()?;
        row.map(to_domain_patient).transpose()
    }
}

/// For a sibling Patient not in the primary match set: for every requested
/// key it must be either missing the key entirely or hold a matching value,
/// AND it must match at least one key (Persons where nothing aligns at all
/// are excluded).
fn sibling_qualifies(
    patient_id: i64,
    by_key: &HashMap<i16, Vec<String>>,
    snapshot: &HashMap<i64, HashMap<i16, HashSet<String>>>,
) -> bool {
    let empty = HashMap::new();
    let patient_values = snapshot.get(&patient_id).unwrap_or(&empty);

    let mut any_matched = false;
    for (key_id, values) in by_key {
        match patient_values.get(key_id) {
            None => continue, // missing the key entirely: ok
            Some(held) => {
                if values.iter().any(|v| held.contains(v)) {
                    any_matched = true;
                } else {
                    return false; // present but mismatched: disqualifying
                }
            }
        }
    }
    any_matched
}

#[cfg(test)]
mod tests {
    use super::*;

    fn pairs(key_id: i16, values: &[&str]) -> HashMap<i16, Vec<String>> {
        let mut m = HashMap::new();
        m.insert(key_id, values.iter().map(|s| s.to_string()).collect());
        m
    }

    #[test]
    fn sibling_missing_key_qualifies_if_another_matches() {
        let by_key = {
            let mut m = pairs(1, &["1980-05-01"]);
            m.extend(pairs(3, &["M"]));
            m
        };
        let mut snapshot = HashMap::new();
        let mut patient_vals = HashMap::new();
        patient_vals.insert(1i16, ["1980-05-01".to_string()].into_iter().collect());
        snapshot.insert(10i64, patient_vals);
        assert!(sibling_qualifies(10, &by_key, &snapshot));
    }

    #[test]
    fn sibling_with_mismatched_present_key_disqualified() {
        let by_key = pairs(1, &["1980-05-01"]);
        let mut snapshot = HashMap::new();
        let mut patient_vals = HashMap::new();
        patient_vals.insert(1i16, ["1990-01-01".to_string()].into_iter().collect());
        snapshot.insert(10i64, patient_vals);
        assert!(!sibling_qualifies(10, &by_key, &snapshot));
    }

    #[test]
    fn sibling_missing_everything_disqualified() {
        let by_key = pairs(1, &["1980-05-01"]);
        let snapshot = HashMap::new();
        assert!(!sibling_qualifies(10, &by_key, &snapshot));
    }
}
