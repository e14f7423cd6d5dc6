//! The normalized PII record and its sub-structures.

use serde::{Deserialize, Serialize};
use utoipa::ToSchema;

use super::identifier::Identifier;

/// One name entry. The first entry in `PIIRecord::name` is "the" name for
/// `FIRST_NAME`/`GIVEN_NAME`/`LAST_NAME` feature purposes; later entries are
/// aliases only compared via `NAME`-derived skip rules.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize, ToSchema)]
pub struct PiiName {
    pub family: String,
    pub given: Vec<String>,
    pub suffix: Option<String>,
}

/// A street address. `state` is 2-letter USPS, `postal_code` 5 digits, both
/// already normalized by the time this type is constructed.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize, ToSchema)]
pub struct PiiAddress {
    pub line: Vec<String>,
    pub city: Option<String>,
    pub state: Option<String>,
    pub postal_code: Option<String>,
    pub county: Option<String>,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize, ToSchema)]
#[serde(rename_all = "UPPERCASE")]
pub enum TelecomSystem {
    Phone,
    Email,
}

/// A single contact point. `PHONE` values are E.164-normalized; only the
/// national-number digits participate in comparison.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize, ToSchema)]
pub struct Telecom {
    pub system: TelecomSystem,
    pub value: String,
}

/// Normalized view of an incoming payload. Never persisted in cleaned form —
/// only the normalized (pre-clean) record is stored as `Patient.pii`; the
/// skip-value cleaner produces an ephemeral clone for blocking/evaluation.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize, ToSchema)]
pub struct PiiRecord {
    /// `YYYY-MM-DD`, or `None` if the field was absent from the input.
    pub birth_date: Option<String>,
    /// `M`, `F`, or absent.
    pub sex: Option<String>,
    pub name: Vec<PiiName>,
    pub address: Vec<PiiAddress>,
    pub telecom: Vec<Telecom>,
    pub identifiers: Vec<Identifier>,
}

impl PiiRecord {
    pub fn is_empty(&self) -> bool {
        self.birth_date.is_none()
            && self.sex.is_none()
            && self.name.iter().all(|n| n.family.is_empty() && n.given.is_empty())
            && self.address.iter().all(address_is_empty)
            && self.telecom.iter().all(|t| t.value.is_empty())
            && self.identifiers.is_empty()
    }
}

fn address_is_empty(a: &PiiAddress) -> bool {
    a.line.iter().all(|s| s.is_empty())
        && a.city.is_none()
        && a.state.is_none()
        && a.postal_code.is_none()
        && a.county.is_none()
}

/// Raw, pre-normalization payload accepted at the HTTP boundary. Field shapes
/// are deliberately loose (string dates in several formats, free-form sex
/// strings, unnormalized phone numbers) — `pii::normalize` is what turns this
/// into a `PiiRecord`.
#[derive(Debug, Clone, Default, Serialize, Deserialize, ToSchema)]
pub struct RawPiiRecord {
    #[serde(default)]
    pub birth_date: Option<String>,
    #[serde(default)]
    pub sex: Option<String>,
    #[serde(default)]
    pub name: Vec<RawPiiName>,
    #[serde(default)]
    pub address: Vec<RawPiiAddress>,
    #[serde(default)]
    pub telecom: Vec<RawTelecom>,
    #[serde(default)]
    pub identifiers: Vec<Identifier>,
}

#[derive(Debug, Clone, Default, Serialize, Deserialize, ToSchema)]
pub struct RawPiiName {
    #[serde(default)]
    pub family: String,
    #[serde(default)]
    pub given: Vec<String>,
    #[serde(default)]
    pub suffix: Option<String>,
}

#[derive(Debug, Clone, Default, Serialize, Deserialize, ToSchema)]
pub struct RawPiiAddress {
    #[serde(default)]
    pub line: Vec<String>,
    #[serde(default)]
    pub city: Option<String>,
    #[serde(default)]
    pub state: Option<String>,
    #[serde(default)]
    pub postal_code: Option<String>,
    #[serde(default)]
    pub county: Option<String>,
}

#[derive(Debug, Clone, Default, Serialize, Deserialize, ToSchema)]
pub struct RawTelecom {
    pub system: String,
    pub value: String,
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn empty_record_is_empty() {
        assert!(PiiRecord::default().is_empty());
    }

    #[test]
    fn record_with_name_is_not_empty() {
        let mut r = PiiRecord::default();
        r.name.push(PiiName {
            family: "Smith".into(),
            given: vec!["Jo".into()],
            suffix: None,
        });
        assert!(!r.is_empty());
    }
}
