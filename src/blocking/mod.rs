//! Blocking-Key Extractor (§4.3).

use crate::models::{BlockingValue, Feature, PiiRecord};
use crate::pii::feature_iter;

/// Closed enumeration of blocking keys. The numeric id is the stable
/// identifier persisted in `BlockingValue.key_id` — never renumbered.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum BlockingKey {
    Birthdate,
    Sex,
    Zip,
    FirstName,
    LastName,
    Address,
    Phone,
    Email,
    Identifier,
}

impl BlockingKey {
    pub const ALL: [BlockingKey; 9] = [
        BlockingKey::Birthdate,
        BlockingKey::Sex,
        BlockingKey::Zip,
        BlockingKey::FirstName,
        BlockingKey::LastName,
        BlockingKey::Address,
        BlockingKey::Phone,
        BlockingKey::Email,
        BlockingKey::Identifier,
    ];

    pub fn id(self) -> i16 {
        match self {
            BlockingKey::Birthdate => 1,
            BlockingKey::Sex => 3,
            BlockingKey::Zip => 4,
            BlockingKey::FirstName => 5,
            BlockingKey::LastName => 6,
            BlockingKey::Address => 7,
            BlockingKey::Phone => 8,
            BlockingKey::Email => 9,
            BlockingKey::Identifier => 10,
        }
    }

    pub fn from_id(id: i16) -> Option<BlockingKey> {
        Self::ALL.into_iter().find(|k| k.id() == id)
    }

    fn feature(self) -> Feature {
        match self {
            BlockingKey::Birthdate => Feature::Birthdate,
            BlockingKey::Sex => Feature::Sex,
            BlockingKey::Zip => Feature::Zip,
            BlockingKey::FirstName => Feature::FirstName,
            BlockingKey::LastName => Feature::LastName,
            BlockingKey::Address => Feature::Address,
            BlockingKey::Phone => Feature::Phone,
            BlockingKey::Email => Feature::Email,
            BlockingKey::Identifier => Feature::Identifier(None),
        }
    }

    /// Derives this key's value(s) from one feature value. Returns `None`
    /// when the value is too short to yield the key (dropped, never padded).
    fn derive(self, raw: &str, identifiers: &[crate::models::Identifier]) -> Vec<String> {
        match self {
            BlockingKey::Birthdate => {
                if raw.len() == 10 {
                    vec![raw.to_string()]
                } else {
                    vec![]
                }
            }
            BlockingKey::Sex => vec![raw.to_string()],
            BlockingKey::Zip => prefix_if_long_enough(raw, 5).into_iter().collect(),
            BlockingKey::FirstName | BlockingKey::LastName | BlockingKey::Address => {
                prefix_upper_if_long_enough(raw, 4).into_iter().collect()
            }
            BlockingKey::Phone => suffix_if_long_enough(raw, 4).into_iter().collect(),
            BlockingKey::Email => prefix_lower_if_long_enough(raw, 4).into_iter().collect(),
            BlockingKey::Identifier => identifiers
                .iter()
                .filter_map(|i| i.to_blocking_value())
                .collect(),
        }
    }
}

fn prefix_if_long_enough(s: &str, n: usize) -> Option<String> {
    let chars: Vec<char> = s.chars().collect();
    if chars.len() < n {
        return None;
    }
    Some(chars[..n].iter().collect())
}

fn prefix_upper_if_long_enough(s: &str, n: usize) -> Option<String> {
    prefix_if_long_enough(s, n).map(|p| p.to_uppercase())
}

fn prefix_lower_if_long_enough(s: &str, n: usize) -> Option<String> {
    prefix_if_long_enough(s, n).map(|p| p.to_lowercase())
}

fn suffix_if_long_enough(s: &str, n: usize) -> Option<String> {
    let chars: Vec<char> = s.chars().collect();
    if chars.len() < n {
        return None;
    }
    Some(chars[chars.len() - n..].iter().collect())
}

/// Derives every BlockingValue for `patient_id` from a cleaned `PiiRecord`.
/// This is a pure function of `(record, patient_id)` — callers always
/// re-derive rather than trust a stale cache, per the invariant that
/// BlockingValue rows are a cache, never authoritative.
pub fn extract(patient_id: i64, record: &PiiRecord) -> Vec<BlockingValue> {
    let mut out = Vec::new();
    for key in BlockingKey::ALL {
        if key == BlockingKey::Identifier {
            for value in key.derive("", &record.identifiers) {
                out.push(BlockingValue {
                    patient_id,
                    key_id: key.id(),
                    value,
                });
            }
            continue;
        }
        for raw in feature_iter(record, &key.feature()) {
            for value in key.derive(&raw, &record.identifiers) {
                out.push(BlockingValue {
                    patient_id,
                    key_id: key.id(),
                    value,
                });
            }
        }
    }
    out
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::models::{PiiAddress, PiiName};

    fn sample_record() -> PiiRecord {
        PiiRecord {
            birth_date: Some("1980-05-01".to_string()),
            sex: Some("M".to_string()),
            name: vec![PiiName {
                family: "Smithson".to_string(),
                given: vec!["Jonathan".to_string()],
                suffix: None,
            }],
            address: vec![PiiAddress {
                line: vec!["123 MAIN ST".to_string()],
                city: Some("Springfield".to_string()),
                state: Some("IL".to_string()),
                postal_code: Some("62704".to_string()),
                county: None,
            }],
            telecom: vec![],
            identifiers: vec![],
        }
    }

    #[test]
    fn keys_have_stable_ids() {
        assert_eq!(BlockingKey::Birthdate.id(), 1);
        assert_eq!(BlockingKey::Sex.id(), 3);
        assert_eq!(BlockingKey::Zip.id(), 4);
        assert_eq!(BlockingKey::FirstName.id(), 5);
        assert_eq!(BlockingKey::LastName.id(), 6);
        assert_eq!(BlockingKey::Address.id(), 7);
        assert_eq!(BlockingKey::Phone.id(), 8);
        assert_eq!(BlockingKey::Email.id(), 9);
        assert_eq!(BlockingKey::Identifier.id(), 10);
    }

    #[test]
    fn extracts_expected_values() {
        let values = extract(1, &sample_record());
        let find = |id: i16| values.iter().find(|v| v.key_id == id).map(|v| v.value.clone());
        assert_eq!(find(1), Some("1980-05-01".to_string()));
        assert_eq!(find(3), Some("M".to_string()));
        assert_eq!(find(4), Some("62704".to_string()));
        assert_eq!(find(5), Some("JONA".to_string()));
        assert_eq!(find(6), Some("SMIT".to_string()));
        assert_eq!(find(7), Some("123 ".to_string()));
    }

    #[test]
    fn short_field_dropped_not_padded() {
        let mut record = sample_record();
        record.name[0].given = vec!["Al".to_string()];
        let values = extract(1, &record);
        assert!(!values.iter().any(|v| v.key_id == 5));
    }

    #[test]
    fn identifier_blocking_value() {
        use crate::models::Identifier;
        let mut record = sample_record();
        record.identifiers.push(Identifier::new("MR", "FACILITY", "000012345"));
        let values = extract(1, &record);
        let id_value = values.iter().find(|v| v.key_id == 10).unwrap();
        assert_eq!(id_value.value, "MR:FA:2345");
    }
}
