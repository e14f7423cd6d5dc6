//! Algorithm Configuration (§4.8): immutable, validated-on-load.

use std::collections::HashMap;

use serde::{Deserialize, Serialize};
use utoipa::ToSchema;

use crate::blocking::BlockingKey;
use crate::models::Feature;
use crate::{Error, Result};

use super::comparators::ComparatorKind;
use super::similarity::SimilarityMeasure;

#[derive(Debug, Clone, Serialize, Deserialize, ToSchema)]
pub struct LogOddsEntry {
    pub feature: Feature,
    pub value: f64,
}

#[derive(Debug, Clone, Serialize, Deserialize, ToSchema)]
pub struct AdvancedConfig {
    #[serde(default = "default_fuzzy_threshold")]
    pub fuzzy_match_threshold: f64,
    #[serde(default)]
    pub fuzzy_match_measure: SimilarityMeasure,
    #[serde(default = "default_max_missing")]
    pub max_missing_allowed_proportion: f64,
    #[serde(default = "default_missing_points")]
    pub missing_field_points_proportion: f64,
}

fn default_fuzzy_threshold() -> f64 {
    0.9
}
fn default_max_missing() -> f64 {
    0.5
}
fn default_missing_points() -> f64 {
    0.5
}

impl Default for AdvancedConfig {
    fn default() -> Self {
        Self {
            fuzzy_match_threshold: default_fuzzy_threshold(),
            fuzzy_match_measure: SimilarityMeasure::default(),
            max_missing_allowed_proportion: default_max_missing(),
            missing_field_points_proportion: default_missing_points(),
        }
    }
}

#[derive(Debug, Clone, Serialize, Deserialize, ToSchema)]
pub struct EvaluatorSpec {
    pub feature: Feature,
    pub func: ComparatorKind,
    pub fuzzy_match_threshold: Option<f64>,
}

#[derive(Debug, Clone, Serialize, Deserialize, ToSchema)]
pub struct PossibleMatchWindow {
    pub min_rms: f64,
    pub certain_rms: f64,
}

#[derive(Debug, Clone, Serialize, Deserialize, ToSchema)]
pub struct PassSpec {
    pub label: String,
    pub blocking_keys: Vec<Feature>,
    pub evaluators: Vec<EvaluatorSpec>,
    pub possible_match_window: PossibleMatchWindow,
}

#[derive(Debug, Clone, Serialize, Deserialize, ToSchema)]
pub struct AlgorithmConfig {
    pub label: String,
    pub log_odds: Vec<LogOddsEntry>,
    #[serde(default)]
    pub skip_values: Vec<crate::pii::SkipValueRule>,
    #[serde(default)]
    pub advanced: AdvancedConfig,
    pub passes: Vec<PassSpec>,
    #[serde(default)]
    pub include_multiple_matches: bool,
}

impl AlgorithmConfig {
    /// Resolved log-odds weight for `feature`, or `None` if absent from the
    /// table (a configuration validation failure for any feature an
    /// evaluator names, but a legitimate "zero weight" query elsewhere).
    pub fn weight(&self, feature: &Feature) -> Option<f64> {
        self.log_odds
            .iter()
            .find(|e| &e.feature == feature)
            .map(|e| e.value)
    }

    /// Validates the configuration per §4.8. `fail closed`: any problem is
    /// `invalid-algorithm`, loading aborted.
    pub fn validate(&self) -> Result<()> {
        if self.passes.is_empty() {
            return Err(Error::invalid_algorithm("algorithm must declare at least one pass"));
        }

        let mut weights: HashMap<&Feature, f64> = HashMap::new();
        for entry in &self.log_odds {
            if entry.value < 0.0 {
                return Err(Error::invalid_algorithm(format!(
                    "log_odds weight for {} must be >= 0",
                    entry.feature
                )));
            }
            weights.insert(&entry.feature, entry.value);
        }

        let w = &self.advanced;
        if !(0.0..=1.0).contains(&w.fuzzy_match_threshold) {
            return Err(Error::invalid_algorithm("fuzzy_match_threshold must be within [0,1]"));
        }
        if !(0.0..=1.0).contains(&w.max_missing_allowed_proportion) {
            return Err(Error::invalid_algorithm(
                "max_missing_allowed_proportion must be within [0,1]",
            ));
        }
        if !(0.0..=1.0).contains(&w.missing_field_points_proportion) {
            return Err(Error::invalid_algorithm(
                "missing_field_points_proportion must be within [0,1]",
            ));
        }

        for pass in &self.passes {
            if pass.evaluators.is_empty() {
                return Err(Error::invalid_algorithm(format!(
                    "pass '{}' must declare at least one evaluator",
                    pass.label
                )));
            }
            for evaluator in &pass.evaluators {
                let weight = weights.get(&evaluator.feature).copied().unwrap_or(0.0);
                if weight <= 0.0 {
                    return Err(Error::invalid_algorithm(format!(
                        "pass '{}' evaluator for {} has no positive log_odds entry",
                        pass.label, evaluator.feature
                    )));
                }
                if let Some(t) = evaluator.fuzzy_match_threshold {
                    if !(0.0..=1.0).contains(&t) {
                        return Err(Error::invalid_algorithm(format!(
                            "pass '{}' evaluator for {} has an out-of-range fuzzy_match_threshold",
                            pass.label, evaluator.feature
                        )));
                    }
                }
            }
            let window = &pass.possible_match_window;
            if !(0.0..=window.certain_rms).contains(&window.min_rms) || window.certain_rms > 1.0 {
                return Err(Error::invalid_algorithm(format!(
                    "pass '{}' possible_match_window must satisfy 0 <= min_rms <= certain_rms <= 1",
                    pass.label
                )));
            }
            for key_feature in &pass.blocking_keys {
                blocking_key_for_feature(key_feature).ok_or_else(|| {
                    Error::invalid_algorithm(format!(
                        "pass '{}' names {} as a blocking key but it has no BlockingKey mapping",
                        pass.label, key_feature
                    ))
                })?;
            }
        }

        Ok(())
    }
}

/// Maps a pass's declared blocking feature to the closed BlockingKey
/// enumeration (§4.3); not every Feature has a blocking key.
pub fn blocking_key_for_feature(feature: &Feature) -> Option<BlockingKey> {
    match feature {
        Feature::Birthdate => Some(BlockingKey::Birthdate),
        Feature::Sex => Some(BlockingKey::Sex),
        Feature::Zip => Some(BlockingKey::Zip),
        Feature::FirstName => Some(BlockingKey::FirstName),
        Feature::LastName => Some(BlockingKey::LastName),
        Feature::Address => Some(BlockingKey::Address),
        Feature::Phone => Some(BlockingKey::Phone),
        Feature::Email => Some(BlockingKey::Email),
        Feature::Identifier(_) => Some(BlockingKey::Identifier),
        _ => None,
    }
}

/// The baked-in two-pass default algorithm satisfying the worked examples:
/// pass 1 blocks on identifier+birthdate+sex, pass 2 on zip+first+last name.
pub fn dibbs_default() -> AlgorithmConfig {
    AlgorithmConfig {
        label: "dibbs-default".to_string(),
        log_odds: vec![
            LogOddsEntry { feature: Feature::Identifier(None), value: 0.90 },
            LogOddsEntry { feature: Feature::Birthdate, value: 0.85 },
            LogOddsEntry { feature: Feature::Sex, value: 0.15 },
            LogOddsEntry { feature: Feature::FirstName, value: 0.60 },
            LogOddsEntry { feature: Feature::LastName, value: 0.65 },
            LogOddsEntry { feature: Feature::Zip, value: 0.25 },
            LogOddsEntry { feature: Feature::Address, value: 0.40 },
            LogOddsEntry { feature: Feature::Phone, value: 0.30 },
            LogOddsEntry { feature: Feature::Email, value: 0.30 },
        ],
        skip_values: Vec::new(),
        advanced: AdvancedConfig::default(),
        passes: vec![
            PassSpec {
                label: "identifier-dob-sex".to_string(),
                blocking_keys: vec![Feature::Identifier(None), Feature::Birthdate, Feature::Sex],
                evaluators: vec![
                    EvaluatorSpec {
                        feature: Feature::Identifier(None),
                        func: ComparatorKind::ExactIdentifier,
                        fuzzy_match_threshold: None,
                    },
                    EvaluatorSpec {
                        feature: Feature::Birthdate,
                        func: ComparatorKind::Exact,
                        fuzzy_match_threshold: None,
                    },
                    EvaluatorSpec {
                        feature: Feature::Sex,
                        func: ComparatorKind::Exact,
                        fuzzy_match_threshold: None,
                    },
                    EvaluatorSpec {
                        feature: Feature::FirstName,
                        func: ComparatorKind::Fuzzy,
                        fuzzy_match_threshold: None,
                    },
                    EvaluatorSpec {
                        feature: Feature::LastName,
                        func: ComparatorKind::Fuzzy,
                        fuzzy_match_threshold: None,
                    },
                ],
                possible_match_window: PossibleMatchWindow { min_rms: 0.65, certain_rms: 0.9 },
            },
            PassSpec {
                label: "zip-first-last".to_string(),
                blocking_keys: vec![Feature::Zip, Feature::FirstName, Feature::LastName],
                evaluators: vec![
                    EvaluatorSpec {
                        feature: Feature::FirstName,
                        func: ComparatorKind::Fuzzy,
                        fuzzy_match_threshold: None,
                    },
                    EvaluatorSpec {
                        feature: Feature::LastName,
                        func: ComparatorKind::Fuzzy,
                        fuzzy_match_threshold: None,
                    },
                    EvaluatorSpec {
                        feature: Feature::Zip,
                        func: ComparatorKind::Exact,
                        fuzzy_match_threshold: None,
                    },
                    EvaluatorSpec {
                        feature: Feature::Address,
                        func: ComparatorKind::Fuzzy,
                        fuzzy_match_threshold: None,
                    },
                    EvaluatorSpec {
                        feature: Feature::Birthdate,
                        func: ComparatorKind::Exact,
                        fuzzy_match_threshold: None,
                    },
                ],
                possible_match_window: PossibleMatchWindow { min_rms: 0.65, certain_rms: 0.9 },
            },
        ],
        include_multiple_matches: false,
    }
}
