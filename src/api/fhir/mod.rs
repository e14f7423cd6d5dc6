//! Thin FHIR R5 input adapter: accepts a FHIR `Patient` resource and
//! converts it into the same `RawPiiRecord` the REST `/link` endpoint
//! normalizes. This crate is not a FHIR resource server — no search,
//! bundles, or persistence in FHIR shape.

pub mod handlers;
pub mod resources;

use crate::models::{Identifier, RawPiiAddress, RawPiiName, RawPiiRecord, RawTelecom};

use resources::FhirPatient;

/// Converts a FHIR `Patient` resource into the raw record `pii::normalize`
/// accepts. Unmodeled FHIR fields (meta, managing organization, links, ...)
/// are not part of this adapter's scope.
pub fn to_raw_pii_record(patient: &FhirPatient) -> RawPiiRecord {
    let name = patient
        .name
        .iter()
        .flatten()
        .map(|n| RawPiiName {
            family: n.family.clone().unwrap_or_default(),
            given: n.given.clone().unwrap_or_default(),
            suffix: n.suffix.as_ref().and_then(|s| s.first().cloned()),
        })
        .collect();

    let address = patient
        .address
        .iter()
        .flatten()
        .map(|a| RawPiiAddress {
            line: a.line.clone().unwrap_or_default(),
            city: a.city.clone(),
            state: a.state.clone(),
            postal_code: a.postal_code.clone(),
            county: None,
        })
        .collect();

    let telecom = patient
        .telecom
        .iter()
        .flatten()
        .filter_map(|t| {
            Some(RawTelecom {
                system: t.system.clone()?,
                value: t.value.clone()?,
            })
        })
        .collect();

    let identifiers = patient
        .identifier
        .iter()
        .flatten()
        .filter_map(|id| {
            let id_type = id
                .type_
                .as_ref()
                .and_then(|t| t.text.clone().or_else(|| t.coding.as_ref()?.first()?.code.clone()))
                .unwrap_or_else(|| "MR".to_string());
            Some(Identifier::new(id_type, id.system.clone()?, id.value.clone()?))
        })
        .collect();

    RawPiiRecord {
        birth_date: patient.birth_date.clone(),
        sex: patient.gender.clone(),
        name,
        address,
        telecom,
        identifiers,
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use resources::{FhirHumanName, FhirIdentifier};

    #[test]
    fn converts_name_and_birthdate() {
        let patient = FhirPatient {
            resource_type: "Patient".to_string(),
            name: Some(vec![FhirHumanName {
                family: Some("Smith".to_string()),
                given: Some(vec!["Jo".to_string()]),
                suffix: None,
            }]),
            birth_date: Some("1980-05-01".to_string()),
            gender: Some("female".to_string()),
            ..Default::default()
        };
        let raw = to_raw_pii_record(&patient);
        assert_eq!(raw.name[0].family, "Smith");
        assert_eq!(raw.birth_date.as_deref(), Some("1980-05-01"));
        assert_eq!(raw.sex.as_deref(), Some("female"));
    }

    #[test]
    fn converts_identifier_with_system_as_authority() {
        let patient = FhirPatient {
            resource_type: "Patient".to_string(),
            identifier: Some(vec![FhirIdentifier {
                type_: None,
                system: Some("urn:oid:facility-a".to_string()),
                value: Some("00012345".to_string()),
            }]),
            ..Default::default()
        };
        let raw = to_raw_pii_record(&patient);
        assert_eq!(raw.identifiers[0].authority, "urn:oid:facility-a");
        assert_eq!(raw.identifiers[0].value, "00012345");
    }
}
