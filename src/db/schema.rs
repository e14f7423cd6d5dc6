//! Hand-written Diesel schema. No migrations directory or `diesel_cli`
//! tooling ships with this crate; the DDL implied here is an external
//! operational concern.

diesel::table! {
    persons (id) {
        id -> Int8,
        reference_id -> Uuid,
    }
}

diesel::table! {
    patients (id) {
        id -> Int8,
        reference_id -> Uuid,
        person_id -> Nullable<Int8>,
        pii -> Jsonb,
        external_patient_id -> Nullable<Text>,
        external_person_id -> Nullable<Text>,
        external_person_source -> Nullable<Text>,
        created_at -> Timestamptz,
    }
}

diesel::table! {
    blocking_values (patient_id, key_id, value) {
        patient_id -> Int8,
        key_id -> Int2,
        value -> Text,
    }
}

diesel::table! {
    algorithms (label) {
        label -> Text,
        config -> Jsonb,
        created_at -> Timestamptz,
    }
}

diesel::table! {
    audit_log (id) {
        id -> Uuid,
        timestamp -> Timestamptz,
        entity_type -> Text,
        entity_id -> Uuid,
        action -> Text,
        details -> Nullable<Jsonb>,
    }
}

diesel::joinable!(patients -> persons (person_id));
diesel::joinable!(blocking_values -> patients (patient_id));

diesel::allow_tables_to_appear_in_same_query!(persons, patients, blocking_values, algorithms, audit_log,);
