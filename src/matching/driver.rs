//! Algorithm Driver (§4.7): orchestrates passes, merges per-pass results,
//! decides the final action.

use std::collections::HashMap;

use serde::{Deserialize, Serialize};
use utoipa::ToSchema;
use uuid::Uuid;

use crate::db::repository::MpiRepository;
use crate::models::PiiRecord;
use crate::{Error, Result};

use super::config::AlgorithmConfig;
use super::pass::{evaluate_pass, Grade, PassResult};

#[derive(Debug, Clone, Serialize, Deserialize, ToSchema)]
pub struct LinkResult {
    pub patient_reference_id: Uuid,
    pub person_reference_id: Option<Uuid>,
    pub match_grade: &'static str,
    pub results: Vec<PersonResult>,
}

#[derive(Debug, Clone, Serialize, Deserialize, ToSchema)]
pub struct PersonResult {
    pub person_reference_id: Uuid,
    pub rms: f64,
    pub grade: &'static str,
    pub pass_label: String,
}

/// Runs every pass in declared order, merges per-pass outputs per
/// `person_id` keeping the best grade (ties broken by largest `rms`, then by
/// whichever pass reached that person_id first), and persists exactly one
/// new Patient with the resulting Person assignment.
pub fn link(
    repo: &dyn MpiRepository,
    config: &AlgorithmConfig,
    pii_for_storage: &PiiRecord,
    cleaned_for_matching: &PiiRecord,
    external_patient_id: Option<String>,
    external_person_id: Option<String>,
    external_person_source: Option<String>,
) -> Result<LinkResult> {
    let mut best: HashMap<i64, PassResult> = HashMap::new();

    for pass in &config.passes {
        let pass_results = evaluate_pass(repo, config, pass, cleaned_for_matching)?;
        for result in pass_results {
            best.entry(result.person_id)
                .and_modify(|current| {
                    if should_replace(current, &result) {
                        *current = result.clone();
                    }
                })
                .or_insert(result);
        }
    }

    let certain: Vec<&PassResult> = best.values().filter(|r| r.grade == Grade::Certain).collect();
    let possible: Vec<&PassResult> = best.values().filter(|r| r.grade == Grade::Possible).collect();

    let (attach_to_person, grade, mut results): (Option<i64>, Grade, Vec<PassResult>) =
        if !certain.is_empty() {
            let winners: Vec<PassResult> = if config.include_multiple_matches {
                certain.into_iter().cloned().collect()
            } else {
                let best_one = certain
                    .into_iter()
                    .max_by(|a, b| {
                        a.rms
                            .partial_cmp(&b.rms)
                            .unwrap()
                            .then(b.person_id.cmp(&a.person_id))
                    })
                    .expect("certain is non-empty");
                vec![best_one.clone()]
            };
            (Some(winners[0].person_id), Grade::Certain, winners)
        } else if !possible.is_empty() {
            (None, Grade::Possible, possible.into_iter().cloned().collect())
        } else {
            (None, Grade::CertainlyNot, Vec::new())
        };

    results.sort_by(|a, b| a.person_id.cmp(&b.person_id));

    let (attach_person_id, fresh_person_reference) = match (attach_to_person, grade) {
        (Some(id), Grade::Certain) => (Some(id), None),
        (None, Grade::CertainlyNot) => {
            let person = repo.insert_person()?;
            (Some(person.id), Some(person.reference_id))
        }
        _ => (None, None),
    };

    let patient = repo.insert_patient(
        pii_for_storage,
        cleaned_for_matching,
        attach_person_id,
        external_patient_id,
        external_person_id,
        external_person_source,
    )?;

    let person_reference_id = match (attach_person_id, fresh_person_reference) {
        (_, Some(reference)) => Some(reference),
        (Some(person_id), None) => Some(resolve_person_reference(repo, person_id)?),
        (None, None) => None,
    };

    let mut resolved_results = Vec::with_capacity(results.len());
    for r in results {
        let reference = resolve_person_reference(repo, r.person_id)?;
        resolved_results.push(PersonResult {
            person_reference_id: reference,
            rms: r.rms,
            grade: r.grade.as_str(),
            pass_label: r.pass_label,
        });
    }

    Ok(LinkResult {
        patient_reference_id: patient.reference_id,
        person_reference_id,
        match_grade: grade.as_str(),
        results: resolved_results,
    })
}

fn resolve_person_reference(repo: &dyn MpiRepository, person_id: i64) -> Result<Uuid> {
    repo.get_person_by_id(person_id)?
        .map(|p| p.reference_id)
        .ok_or_else(|| Error::internal(format!("person {person_id} vanished mid-request")))
}

/// `true` if `candidate` should replace `current` as the best per-Person
/// result: higher grade wins; ties broken by larger RMS; remaining ties keep
/// `current` (the earlier pass, since passes fold in declared order).
fn should_replace(current: &PassResult, candidate: &PassResult) -> bool {
    if candidate.grade != current.grade {
        return candidate.grade > current.grade;
    }
    candidate.rms > current.rms
}

#[cfg(test)]
mod tests {
    use super::*;

    fn result(person_id: i64, rms: f64, grade: Grade, label: &str) -> PassResult {
        PassResult { person_id, rms, grade, pass_label: label.to_string() }
    }

    #[test]
    fn higher_grade_wins() {
        let current = result(1, 0.5, Grade::Possible, "a");
        let candidate = result(1, 0.1, Grade::Certain, "b");
        assert!(should_replace(&current, &candidate));
    }

    #[test]
    fn tied_grade_higher_rms_wins() {
        let current = result(1, 0.5, Grade::Possible, "a");
        let candidate = result(1, 0.6, Grade::Possible, "b");
        assert!(should_replace(&current, &candidate));
    }

    #[test]
    fn tied_grade_and_rms_keeps_earliest() {
        let current = result(1, 0.5, Grade::Possible, "a");
        let candidate = result(1, 0.5, Grade::Possible, "b");
        assert!(!should_replace(&current, &candidate));
    }
}
