//! Pass Evaluator (§4.6).

use std::collections::BTreeMap;

use crate::blocking::{extract, BlockingKey};
use crate::db::repository::MpiRepository;
use crate::models::{Patient, PiiRecord};
use crate::Result;

use super::config::{blocking_key_for_feature, AlgorithmConfig, PassSpec};

#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord)]
pub enum Grade {
    CertainlyNot,
    Possible,
    Certain,
}

impl Grade {
    pub fn as_str(self) -> &'static str {
        match self {
            Grade::Certain => "certain",
            Grade::Possible => "possible",
            Grade::CertainlyNot => "certainly-not",
        }
    }
}

/// One pass's result for one Person cluster.
#[derive(Debug, Clone)]
pub struct PassResult {
    pub person_id: i64,
    pub rms: f64,
    pub grade: Grade,
    pub pass_label: String,
}

/// Runs one pass against the repository, following §4.6's steps exactly.
pub fn evaluate_pass(
    repo: &dyn MpiRepository,
    config: &AlgorithmConfig,
    pass: &PassSpec,
    cleaned: &PiiRecord,
) -> Result<Vec<PassResult>> {
    let Some(key_value_pairs) = pass_blocking_pairs(pass, cleaned) else {
        return Ok(Vec::new());
    };
    if key_value_pairs.is_empty() {
        return Ok(Vec::new());
    }

    let candidates = repo.block(&key_value_pairs)?;
    if candidates.is_empty() {
        return Ok(Vec::new());
    }

    let mut clusters: BTreeMap<i64, Vec<Patient>> = BTreeMap::new();
    for patient in candidates {
        if let Some(person_id) = patient.person_id {
            clusters.entry(person_id).or_default().push(patient);
        }
    }

    let sum_possible_for_pass: f64 = pass
        .evaluators
        .iter()
        .filter_map(|e| config.weight(&e.feature))
        .sum();

    let mut results = Vec::new();
    for (person_id, mut patients) in clusters {
        patients.sort_by(|a, b| a.id.cmp(&b.id));

        let mut point_sums: Vec<(f64, i64)> = Vec::new();
        for patient in &patients {
            let mut points = 0.0;
            let mut missing_possible = 0.0;
            let mut total_possible = 0.0;

            for evaluator in &pass.evaluators {
                let Some(weight) = config.weight(&evaluator.feature) else {
                    continue;
                };
                let outcome = super::comparators::compare(
                    evaluator.func,
                    &evaluator.feature,
                    cleaned,
                    &patient.pii,
                    weight,
                    evaluator.fuzzy_match_threshold,
                    &config.advanced,
                );
                points += outcome.points;
                total_possible += outcome.possible;
                if outcome.missing {
                    missing_possible += outcome.possible;
                }
            }

            let missingness_proportion = if total_possible > 0.0 {
                missing_possible / total_possible
            } else {
                0.0
            };

            if missingness_proportion > config.advanced.max_missing_allowed_proportion {
                continue;
            }

            point_sums.push((points, patient.id));
        }

        if point_sums.is_empty() {
            continue;
        }

        let cluster_points = median(&point_sums);
        let rms = if sum_possible_for_pass > 0.0 {
            (cluster_points / sum_possible_for_pass).clamp(0.0, 1.0)
        } else {
            0.0
        };

        let window = &pass.possible_match_window;
        let grade = if rms >= window.certain_rms {
            Grade::Certain
        } else if rms >= window.min_rms {
            Grade::Possible
        } else {
            Grade::CertainlyNot
        };

        results.push(PassResult {
            person_id,
            rms,
            grade,
            pass_label: pass.label.clone(),
        });
    }

    Ok(results)
}

/// Median of point-sums, sorted ascending by `(points, patient_id)` per §9's
/// tie-break rule. Even-length lists average the two central values.
fn median(point_sums: &[(f64, i64)]) -> f64 {
    let mut sorted = point_sums.to_vec();
    sorted.sort_by(|a, b| a.0.partial_cmp(&b.0).unwrap().then(a.1.cmp(&b.1)));
    let n = sorted.len();
    if n % 2 == 1 {
        sorted[n / 2].0
    } else {
        (sorted[n / 2 - 1].0 + sorted[n / 2].0) / 2.0
    }
}

/// Extracts this pass's blocking `(key_id, value)` tuples from the cleaned
/// record. Returns `None` if any required blocking field is absent.
fn pass_blocking_pairs(pass: &PassSpec, cleaned: &PiiRecord) -> Option<Vec<(i16, String)>> {
    let mut pairs = Vec::new();
    for feature in &pass.blocking_keys {
        let key = blocking_key_for_feature(feature)?;
        let values = values_for_key(key, cleaned);
        if values.is_empty() {
            return None;
        }
        for value in values {
            pairs.push((key.id(), value));
        }
    }
    Some(pairs)
}

fn values_for_key(key: BlockingKey, cleaned: &PiiRecord) -> Vec<String> {
    // Patient id is irrelevant for deriving just the values; use a sentinel.
    extract(0, cleaned)
        .into_iter()
        .filter(|bv| bv.key_id == key.id())
        .map(|bv| bv.value)
        .collect()
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn median_odd_length() {
        assert_eq!(median(&[(1.0, 1), (3.0, 2), (2.0, 3)]), 2.0);
    }

    #[test]
    fn median_even_length_averages() {
        assert_eq!(median(&[(1.0, 1), (2.0, 2), (3.0, 3), (4.0, 4)]), 2.5);
    }

    #[test]
    fn median_single_element() {
        assert_eq!(median(&[(5.0, 1)]), 5.0);
    }

    #[test]
    fn grade_ordering() {
        assert!(Grade::Certain > Grade::Possible);
        assert!(Grade::Possible > Grade::CertainlyNot);
    }
}
