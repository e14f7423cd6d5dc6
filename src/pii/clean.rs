//! Skip-value cleaner (§4.2).

use crate::models::{Feature, PiiRecord};

use super::glob::glob_match;

/// `{feature, values[]}` rule, where `values` are case-insensitive glob
/// patterns. `feature = None` means the rule applies to every feature.
#[derive(Debug, Clone, serde::Serialize, serde::Deserialize, utoipa::ToSchema)]
pub struct SkipValueRule {
    #[serde(default, with = "feature_or_star")]
    #[schema(value_type = String)]
    pub feature: Option<Feature>,
    pub values: Vec<String>,
}

mod feature_or_star {
    use crate::models::Feature;
    use serde::{Deserialize, Deserializer, Serialize, Serializer};

    pub fn serialize<S: Serializer>(value: &Option<Feature>, s: S) -> Result<S::Ok, S::Error> {
        match value {
            None => "*".serialize(s),
            Some(f) => f.to_string().serialize(s),
        }
    }

    pub fn deserialize<'de, D: Deserializer<'de>>(d: D) -> Result<Option<Feature>, D::Error> {
        let raw = String::deserialize(d)?;
        if raw == "*" {
            return Ok(None);
        }
        raw.parse().map(Some).map_err(serde::de::Error::custom)
    }
}

impl SkipValueRule {
    fn applies_to(&self, feature: &Feature) -> bool {
        match &self.feature {
            None => true,
            Some(f) => f == feature,
        }
    }

    fn erases(&self, value: &str) -> bool {
        self.values.iter().any(|pattern| glob_match(pattern, value))
    }
}

/// All comparable features, used to sweep every rule over every field a
/// record might have.
const ALL_FEATURES: &[fn() -> Feature] = &[
    || Feature::Birthdate,
    || Feature::Sex,
    || Feature::Race,
    || Feature::GivenName,
    || Feature::FirstName,
    || Feature::LastName,
    || Feature::Name,
    || Feature::Suffix,
    || Feature::Address,
    || Feature::City,
    || Feature::State,
    || Feature::Zip,
    || Feature::County,
    || Feature::Telecom,
    || Feature::Phone,
    || Feature::Email,
];

/// Returns a clone of `record` with every value matching an applicable
/// skip-value rule erased. The clone is used for blocking and evaluation
/// only; callers must persist the original.
pub fn clean(record: &PiiRecord, rules: &[SkipValueRule]) -> PiiRecord {
    if rules.is_empty() {
        return record.clone();
    }

    let mut cleaned = record.clone();

    for feature_fn in ALL_FEATURES {
        let feature = feature_fn();
        let applicable: Vec<&SkipValueRule> =
            rules.iter().filter(|r| r.applies_to(&feature)).collect();
        if applicable.is_empty() {
            continue;
        }
        erase_matching(&mut cleaned, &feature, &applicable);
    }

    cleaned
}

fn erase_matching(record: &mut PiiRecord, feature: &Feature, rules: &[&SkipValueRule]) {
    let should_erase = |v: &str| rules.iter().any(|r| r.erases(v));

    match feature {
        Feature::Birthdate => {
            if let Some(v) = &record.birth_date {
                if should_erase(v) {
                    record.birth_date = None;
                }
            }
        }
        Feature::Sex => {
            if let Some(v) = &record.sex {
                if should_erase(v) {
                    record.sex = None;
                }
            }
        }
        Feature::FirstName => {
            if let Some(n) = record.name.first_mut() {
                if let Some(first) = n.given.first_mut() {
                    if should_erase(first) {
                        *first = String::new();
                    }
                }
            }
        }
        Feature::GivenName => {
            if let Some(n) = record.name.first_mut() {
                for g in n.given.iter_mut() {
                    if should_erase(g) {
                        *g = String::new();
                    }
                }
            }
        }
        Feature::LastName => {
            if let Some(n) = record.name.first_mut() {
                if should_erase(&n.family) {
                    n.family = String::new();
                }
            }
        }
        Feature::Name => {
            if let Some(n) = record.name.first_mut() {
                let joined = {
                    let mut parts = n.given.clone();
                    parts.push(n.family.clone());
                    parts.join(" ")
                };
                if should_erase(&joined) {
                    if let Some(first) = n.given.first_mut() {
                        *first = String::new();
                    }
                    n.family = String::new();
                }
            }
        }
        Feature::Suffix => {
            if let Some(n) = record.name.first_mut() {
                if let Some(s) = &n.suffix {
                    if should_erase(s) {
                        n.suffix = None;
                    }
                }
            }
        }
        Feature::Address => {
            for a in record.address.iter_mut() {
                for line in a.line.iter_mut() {
                    if should_erase(line) {
                        *line = String::new();
                    }
                }
            }
        }
        Feature::City => {
            for a in record.address.iter_mut() {
                if let Some(c) = &a.city {
                    if should_erase(c) {
                        a.city = None;
                    }
                }
            }
        }
        Feature::State => {
            for a in record.address.iter_mut() {
                if let Some(s) = &a.state {
                    if should_erase(s) {
                        a.state = None;
                    }
                }
            }
        }
        Feature::Zip => {
            for a in record.address.iter_mut() {
                if let Some(z) = &a.postal_code {
                    if should_erase(z) {
                        a.postal_code = None;
                    }
                }
            }
        }
        Feature::County => {
            for a in record.address.iter_mut() {
                if let Some(c) = &a.county {
                    if should_erase(c) {
                        a.county = None;
                    }
                }
            }
        }
        Feature::Telecom | Feature::Phone | Feature::Email => {
            for t in record.telecom.iter_mut() {
                let matches_feature = match feature {
                    Feature::Telecom => true,
                    Feature::Phone => t.system == crate::models::TelecomSystem::Phone,
                    Feature::Email => t.system == crate::models::TelecomSystem::Email,
                    _ => unreachable!(),
                };
                if matches_feature && should_erase(&t.value) {
                    t.value = String::new();
                }
            }
        }
        _ => {}
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::models::PiiName;

    #[test]
    fn erases_matching_sex_value() {
        let record = PiiRecord {
            sex: Some("U".to_string()),
            ..Default::default()
        };
        let rules = vec![SkipValueRule {
            feature: Some(Feature::Sex),
            values: vec!["U".to_string()],
        }];
        let cleaned = clean(&record, &rules);
        assert_eq!(cleaned.sex, None);
    }

    #[test]
    fn wildcard_feature_applies_everywhere() {
        let record = PiiRecord {
            sex: Some("UNKNOWN".to_string()),
            name: vec![PiiName {
                family: "UNKNOWN".to_string(),
                given: vec!["UNKNOWN".to_string()],
                suffix: None,
            }],
            ..Default::default()
        };
        let rules = vec![SkipValueRule {
            feature: None,
            values: vec!["unknown".to_string()],
        }];
        let cleaned = clean(&record, &rules);
        assert_eq!(cleaned.sex, None);
        assert_eq!(cleaned.name[0].family, "");
        assert_eq!(cleaned.name[0].given[0], "");
    }

    #[test]
    fn glob_pattern_rule() {
        let record = PiiRecord {
            sex: Some("999".to_string()),
            ..Default::default()
        };
        let rules = vec![SkipValueRule {
            feature: Some(Feature::Sex),
            values: vec!["9*".to_string()],
        }];
        let cleaned = clean(&record, &rules);
        assert_eq!(cleaned.sex, None);
    }

    #[test]
    fn name_rule_erases_first_given_and_family() {
        let record = PiiRecord {
            name: vec![PiiName {
                family: "DOE".to_string(),
                given: vec!["JOHN".to_string()],
                suffix: None,
            }],
            ..Default::default()
        };
        let rules = vec![SkipValueRule {
            feature: Some(Feature::Name),
            values: vec!["john doe".to_string()],
        }];
        let cleaned = clean(&record, &rules);
        assert_eq!(cleaned.name[0].given[0], "");
        assert_eq!(cleaned.name[0].family, "");
    }

    #[test]
    fn original_untouched() {
        let record = PiiRecord {
            sex: Some("U".to_string()),
            ..Default::default()
        };
        let rules = vec![SkipValueRule {
            feature: Some(Feature::Sex),
            values: vec!["U".to_string()],
        }];
        let _cleaned = clean(&record, &rules);
        assert_eq!(record.sex, Some("U".to_string()));
    }
}
