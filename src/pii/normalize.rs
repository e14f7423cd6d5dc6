//! PII normalization: `normalize(raw) -> PiiRecord` and `feature_iter`.

use chrono::{Datelike, NaiveDate, Utc};

use crate::models::{
    Feature, PiiAddress, PiiName, PiiRecord, RawPiiRecord, Telecom, TelecomSystem,
};
use crate::{Error, Result};

use super::usps::{normalize_state, normalize_street_line};

/// Normalizes a raw HTTP-boundary payload into canonical `PiiRecord` form.
/// Fields that fail to normalize (bad birthdate, unrecognized sex) either
/// error (birthdate) or are silently dropped (sex), per §4.1.
pub fn normalize(raw: &RawPiiRecord) -> Result<PiiRecord> {
    let birth_date = match &raw.birth_date {
        Some(s) if !s.trim().is_empty() => Some(normalize_birthdate(s)?),
        _ => None,
    };

    let sex = raw.sex.as_deref().and_then(normalize_sex);

    let name = raw
        .name
        .iter()
        .map(|n| PiiName {
            family: n.family.trim().to_string(),
            given: n.given.iter().map(|g| g.trim().to_string()).collect(),
            suffix: n.suffix.clone(),
        })
        .collect();

    let address = raw
        .address
        .iter()
        .map(|a| PiiAddress {
            line: a.line.iter().map(|l| normalize_street_line(l)).collect(),
            city: a.city.clone(),
            state: a.state.as_deref().and_then(normalize_state),
            postal_code: a.postal_code.as_deref().map(normalize_zip),
            county: a.county.clone(),
        })
        .collect();

    let telecom = raw
        .telecom
        .iter()
        .filter_map(|t| {
            let system = t.system.to_uppercase();
            if system == "PHONE" {
                normalize_phone(&t.value).map(|v| Telecom {
                    system: TelecomSystem::Phone,
                    value: v,
                })
            } else if system == "EMAIL" {
                Some(Telecom {
                    system: TelecomSystem::Email,
                    value: t.value.trim().to_lowercase(),
                })
            } else {
                None
            }
        })
        .collect();

    Ok(PiiRecord {
        birth_date,
        sex,
        name,
        address,
        telecom,
        identifiers: raw.identifiers.clone(),
    })
}

fn normalize_birthdate(raw: &str) -> Result<String> {
    let raw = raw.trim();
    let parsed = NaiveDate::parse_from_str(raw, "%Y-%m-%d")
        .or_else(|_| NaiveDate::parse_from_str(raw, "%Y/%m/%d"))
        .or_else(|_| NaiveDate::parse_from_str(raw, "%m/%d/%Y"))
        .or_else(|_| parse_two_digit_year(raw))
        .map_err(|_| Error::invalid_input(format!("invalid-birthdate: {raw}")))?;

    if parsed > Utc::now().date_naive() {
        return Err(Error::invalid_input(format!("invalid-birthdate: {raw} is in the future")));
    }

    Ok(parsed.format("%Y-%m-%d").to_string())
}

fn parse_two_digit_year(raw: &str) -> std::result::Result<NaiveDate, chrono::ParseError> {
    let parts: Vec<&str> = raw.split('/').collect();
    if parts.len() != 3 || parts[2].len() != 2 {
        // Force a ParseError of the right shape by retrying a known-bad format.
        return NaiveDate::parse_from_str(raw, "%m/%d/%Y");
    }
    let month: u32 = parts[0].parse().unwrap_or(0);
    let day: u32 = parts[1].parse().unwrap_or(0);
    let yy: i32 = parts[2].parse().unwrap_or(-1);
    if month == 0 || day == 0 || yy < 0 {
        return NaiveDate::parse_from_str(raw, "%m/%d/%Y");
    }
    let current_yy = Utc::now().year() % 100;
    let century = if yy > current_yy { 1900 } else { 2000 };
    NaiveDate::from_ymd_opt(century + yy, month, day)
        .ok_or(())
        .or_else(|_| NaiveDate::parse_from_str(raw, "%m/%d/%Y"))
}

fn normalize_sex(raw: &str) -> Option<String> {
    match raw.trim().to_lowercase().as_str() {
        "male" | "m" | "1" => Some("M".to_string()),
        "female" | "f" | "2" => Some("F".to_string()),
        _ => None,
    }
}

fn normalize_zip(raw: &str) -> String {
    raw.chars().filter(|c| c.is_ascii_digit()).take(5).collect()
}

/// Strips non-digits and drops a leading US country code (`1`), leaving the
/// national 10-digit number. Returns `None` if fewer than 10 digits remain.
fn normalize_phone(raw: &str) -> Option<String> {
    let digits: String = raw.chars().filter(|c| c.is_ascii_digit()).collect();
    let national = if digits.len() == 11 && digits.starts_with('1') {
        digits[1..].to_string()
    } else {
        digits
    };
    if national.len() == 10 {
        Some(national)
    } else {
        None
    }
}

/// Returns the iterated string values for `feature` on `record`, per §4.1's
/// per-feature extraction rules.
pub fn feature_iter(record: &PiiRecord, feature: &Feature) -> Vec<String> {
    match feature {
        Feature::Birthdate => record.birth_date.iter().cloned().collect(),
        Feature::Sex => record.sex.iter().cloned().collect(),
        Feature::Race => Vec::new(),
        Feature::FirstName => record
            .name
            .first()
            .and_then(|n| n.given.first())
            .cloned()
            .into_iter()
            .collect(),
        Feature::GivenName => record
            .name
            .first()
            .map(|n| n.given.clone())
            .unwrap_or_default(),
        Feature::LastName => record
            .name
            .first()
            .map(|n| n.family.clone())
            .into_iter()
            .filter(|s| !s.is_empty())
            .collect(),
        Feature::Name => record
            .name
            .first()
            .map(|n| {
                let mut parts = n.given.clone();
                parts.push(n.family.clone());
                parts.join(" ")
            })
            .into_iter()
            .filter(|s| !s.trim().is_empty())
            .collect(),
        Feature::Suffix => record
            .name
            .first()
            .and_then(|n| n.suffix.clone())
            .into_iter()
            .collect(),
        Feature::Address => record
            .address
            .iter()
            .flat_map(|a| a.line.iter().cloned())
            .collect(),
        Feature::City => record.address.iter().filter_map(|a| a.city.clone()).collect(),
        Feature::State => record.address.iter().filter_map(|a| a.state.clone()).collect(),
        Feature::Zip => record
            .address
            .iter()
            .filter_map(|a| a.postal_code.clone())
            .collect(),
        Feature::County => record.address.iter().filter_map(|a| a.county.clone()).collect(),
        Feature::Telecom => record.telecom.iter().map(|t| t.value.clone()).collect(),
        Feature::Phone => record
            .telecom
            .iter()
            .filter(|t| t.system == TelecomSystem::Phone)
            .map(|t| t.value.clone())
            .collect(),
        Feature::Email => record
            .telecom
            .iter()
            .filter(|t| t.system == TelecomSystem::Email)
            .map(|t| t.value.clone())
            .collect(),
        Feature::Identifier(None) => record
            .identifiers
            .iter()
            .map(|i| i.to_feature_string())
            .collect(),
        Feature::Identifier(Some(t)) => record
            .identifiers
            .iter()
            .filter(|i| i.id_type.eq_ignore_ascii_case(t))
            .map(|i| i.to_feature_string())
            .collect(),
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::models::RawPiiName;

    #[test]
    fn birthdate_formats() {
        assert_eq!(normalize_birthdate("1980-05-01").unwrap(), "1980-05-01");
        assert_eq!(normalize_birthdate("1980/05/01").unwrap(), "1980-05-01");
        assert_eq!(normalize_birthdate("05/01/1980").unwrap(), "1980-05-01");
    }

    #[test]
    fn birthdate_future_rejected() {
        assert!(normalize_birthdate("2999-01-01").is_err());
    }

    #[test]
    fn birthdate_two_digit_year_pivot() {
        // Current year mod 100 determines the pivot; a low yy maps to 20YY.
        let result = normalize_birthdate("05/01/05");
        assert!(result.is_ok());
        assert!(result.unwrap().starts_with("20"));
    }

    #[test]
    fn sex_mapping() {
        assert_eq!(normalize_sex("Male"), Some("M".to_string()));
        assert_eq!(normalize_sex("f"), Some("F".to_string()));
        assert_eq!(normalize_sex("2"), Some("F".to_string()));
        assert_eq!(normalize_sex("unknown"), None);
    }

    #[test]
    fn phone_to_national_10_digit() {
        assert_eq!(normalize_phone("+1 (555) 123-4567"), Some("5551234567".to_string()));
        assert_eq!(normalize_phone("555-123-4567"), Some("5551234567".to_string()));
        assert_eq!(normalize_phone("12345"), None);
    }

    #[test]
    fn zip_first_five_digits() {
        assert_eq!(normalize_zip("12345-6789"), "12345");
    }

    #[test]
    fn feature_iter_first_and_given_name() {
        let record = PiiRecord {
            name: vec![PiiName {
                family: "Smith".into(),
                given: vec!["Jo".into(), "Anne".into()],
                suffix: None,
            }],
            ..Default::default()
        };
        assert_eq!(feature_iter(&record, &Feature::FirstName), vec!["Jo"]);
        assert_eq!(
            feature_iter(&record, &Feature::GivenName),
            vec!["Jo", "Anne"]
        );
        assert_eq!(feature_iter(&record, &Feature::LastName), vec!["Smith"]);
    }

    #[test]
    fn feature_iter_identifier_by_type() {
        use crate::models::Identifier;
        let record = PiiRecord {
            identifiers: vec![
                Identifier::new("MR", "FAC", "123"),
                Identifier::new("SS", "SSA", "456"),
            ],
            ..Default::default()
        };
        let mr = feature_iter(&record, &Feature::Identifier(Some("MR".to_string())));
        assert_eq!(mr, vec!["MR|FAC|123"]);
        let all = feature_iter(&record, &Feature::Identifier(None));
        assert_eq!(all.len(), 2);
    }

    #[test]
    fn raw_name_round_trip_ignored_here() {
        let _ = RawPiiName::default();
    }
}
