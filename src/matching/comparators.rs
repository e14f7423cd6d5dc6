//! Feature Comparators (§4.5).

use serde::{Deserialize, Serialize};
use utoipa::ToSchema;

use crate::models::{Feature, Identifier, PiiRecord};
use crate::pii::feature_iter;

use super::config::AdvancedConfig;
use super::similarity::SimilarityMeasure;

/// The closed enumeration of comparator functions an evaluator may name.
/// Unknown names are rejected during algorithm validation (§9's "dynamic
/// function references" redesign note).
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize, ToSchema)]
pub enum ComparatorKind {
    /// `COMPARE_PROBABILISTIC_EXACT_MATCH`
    Exact,
    /// `COMPARE_PROBABILISTIC_FUZZY_MATCH`
    Fuzzy,
    /// Exact-match restricted to `IDENTIFIER`/`IDENTIFIER:<t>` triples.
    ExactIdentifier,
}

/// `(points, possible, missing)` — `possible` always equals the feature's
/// full configured log-odds weight.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct ComparatorOutcome {
    pub points: f64,
    pub possible: f64,
    pub missing: bool,
}

impl ComparatorOutcome {
    fn missing(weight: f64, missing_field_points_proportion: f64) -> Self {
        ComparatorOutcome {
            points: weight * missing_field_points_proportion,
            possible: weight,
            missing: true,
        }
    }
}

/// Compares one feature between an incoming record `a` and a candidate
/// Patient's record `b`, per the comparator named by `kind`.
pub fn compare(
    kind: ComparatorKind,
    feature: &Feature,
    a: &PiiRecord,
    b: &PiiRecord,
    weight: f64,
    fuzzy_threshold: Option<f64>,
    advanced: &AdvancedConfig,
) -> ComparatorOutcome {
    match kind {
        ComparatorKind::ExactIdentifier => {
            compare_identifiers(feature, &a.identifiers, &b.identifiers, weight, advanced)
        }
        ComparatorKind::Exact => {
            let values_a = feature_iter(a, feature);
            let values_b = feature_iter(b, feature);
            compare_exact(&values_a, &values_b, weight, advanced)
        }
        ComparatorKind::Fuzzy => {
            let values_a = feature_iter(a, feature);
            let values_b = feature_iter(b, feature);
            let threshold = fuzzy_threshold.unwrap_or(advanced.fuzzy_match_threshold);
            compare_fuzzy(&values_a, &values_b, weight, threshold, advanced.fuzzy_match_measure, advanced)
        }
    }
}

fn non_empty(values: &[String]) -> bool {
    values.iter().any(|v| !v.trim().is_empty())
}

fn compare_exact(a: &[String], b: &[String], weight: f64, advanced: &AdvancedConfig) -> ComparatorOutcome {
    if !non_empty(a) || !non_empty(b) {
        return ComparatorOutcome::missing(weight, advanced.missing_field_points_proportion);
    }
    let matched = a.iter().any(|x| b.iter().any(|y| x == y));
    ComparatorOutcome {
        points: if matched { weight } else { 0.0 },
        possible: weight,
        missing: false,
    }
}

fn compare_fuzzy(
    a: &[String],
    b: &[String],
    weight: f64,
    threshold: f64,
    measure: SimilarityMeasure,
    advanced: &AdvancedConfig,
) -> ComparatorOutcome {
    if !non_empty(a) || !non_empty(b) {
        return ComparatorOutcome::missing(weight, advanced.missing_field_points_proportion);
    }
    let mut best = 0.0_f64;
    for x in a {
        for y in b {
            if x.is_empty() || y.is_empty() {
                continue;
            }
            best = best.max(measure.score(x, y));
        }
    }
    ComparatorOutcome {
        points: if best >= threshold { weight * best } else { 0.0 },
        possible: weight,
        missing: false,
    }
}

fn compare_identifiers(
    feature: &Feature,
    a: &[Identifier],
    b: &[Identifier],
    weight: f64,
    advanced: &AdvancedConfig,
) -> ComparatorOutcome {
    let type_filter: Option<&str> = match feature {
        Feature::Identifier(Some(t)) => Some(t.as_str()),
        _ => None,
    };

    let filtered = |ids: &[Identifier]| -> Vec<&Identifier> {
        ids.iter()
            .filter(|id| type_filter.map(|t| id.id_type.eq_ignore_ascii_case(t)).unwrap_or(true))
            .collect()
    };

    let a_ids = filtered(a);
    let b_ids = filtered(b);

    if a_ids.is_empty() || b_ids.is_empty() {
        return ComparatorOutcome::missing(weight, advanced.missing_field_points_proportion);
    }

    let matched = a_ids.iter().any(|x| {
        b_ids
            .iter()
            .any(|y| x.id_type == y.id_type && x.authority == y.authority && x.value == y.value)
    });

    ComparatorOutcome {
        points: if matched { weight } else { 0.0 },
        possible: weight,
        missing: false,
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::models::{PiiAddress, PiiName};

    fn record_with_first_name(name: &str) -> PiiRecord {
        PiiRecord {
            name: vec![PiiName {
                family: "Smith".to_string(),
                given: vec![name.to_string()],
                suffix: None,
            }],
            ..Default::default()
        }
    }

    #[test]
    fn exact_match_awards_full_weight() {
        let a = PiiRecord { sex: Some("M".to_string()), ..Default::default() };
        let b = PiiRecord { sex: Some("M".to_string()), ..Default::default() };
        let out = compare(
            ComparatorKind::Exact,
            &Feature::Sex,
            &a,
            &b,
            0.15,
            None,
            &AdvancedConfig::default(),
        );
        assert_eq!(out.points, 0.15);
        assert_eq!(out.possible, 0.15);
        assert!(!out.missing);
    }

    #[test]
    fn exact_mismatch_awards_zero() {
        let a = PiiRecord { sex: Some("M".to_string()), ..Default::default() };
        let b = PiiRecord { sex: Some("F".to_string()), ..Default::default() };
        let out = compare(
            ComparatorKind::Exact,
            &Feature::Sex,
            &a,
            &b,
            0.15,
            None,
            &AdvancedConfig::default(),
        );
        assert_eq!(out.points, 0.0);
    }

    #[test]
    fn missing_field_awards_proportional_points_and_flags_missing() {
        let a = PiiRecord { sex: Some("M".to_string()), ..Default::default() };
        let b = PiiRecord::default();
        let advanced = AdvancedConfig::default();
        let out = compare(ComparatorKind::Exact, &Feature::Sex, &a, &b, 0.2, None, &advanced);
        assert_eq!(out.points, 0.2 * advanced.missing_field_points_proportion);
        assert!(out.missing);
    }

    #[test]
    fn fuzzy_typo_still_scores() {
        let a = record_with_first_name("Jonathan");
        let b = record_with_first_name("Jonathon");
        let out = compare(
            ComparatorKind::Fuzzy,
            &Feature::FirstName,
            &a,
            &b,
            0.6,
            None,
            &AdvancedConfig::default(),
        );
        assert!(out.points > 0.0);
    }

    #[test]
    fn fuzzy_below_threshold_scores_zero() {
        let a = record_with_first_name("Jonathan");
        let b = record_with_first_name("Zzyzx");
        let out = compare(
            ComparatorKind::Fuzzy,
            &Feature::FirstName,
            &a,
            &b,
            0.6,
            None,
            &AdvancedConfig::default(),
        );
        assert_eq!(out.points, 0.0);
    }

    #[test]
    fn address_takes_max_over_all_line_pairs() {
        let a = PiiRecord {
            address: vec![PiiAddress {
                line: vec!["123 MAIN ST".to_string()],
                ..Default::default()
            }],
            ..Default::default()
        };
        let b = PiiRecord {
            address: vec![PiiAddress {
                line: vec!["999 OTHER AV".to_string(), "123 MAIN ST".to_string()],
                ..Default::default()
            }],
            ..Default::default()
        };
        let out = compare(
            ComparatorKind::Fuzzy,
            &Feature::Address,
            &a,
            &b,
            0.4,
            None,
            &AdvancedConfig::default(),
        );
        assert_eq!(out.points, 0.4);
    }

    #[test]
    fn identifier_triple_equality() {
        let a = PiiRecord { identifiers: vec![Identifier::new("MR", "FAC", "123")], ..Default::default() };
        let b = PiiRecord { identifiers: vec![Identifier::new("MR", "FAC", "123")], ..Default::default() };
        let out = compare_identifiers(&Feature::Identifier(None), &a.identifiers, &b.identifiers, 0.9, &AdvancedConfig::default());
        assert_eq!(out.points, 0.9);
    }

    #[test]
    fn typed_identifier_ignores_other_types() {
        let a = PiiRecord { identifiers: vec![Identifier::new("SS", "SSA", "555")], ..Default::default() };
        let b = PiiRecord { identifiers: vec![Identifier::new("MR", "FAC", "123")], ..Default::default() };
        let feature = Feature::Identifier(Some("MR".to_string()));
        let out = compare_identifiers(&feature, &a.identifiers, &b.identifiers, 0.9, &AdvancedConfig::default());
        assert!(out.missing);
    }
}
