//! Benchmarks the per-record hot path: normalization, skip-value cleaning,
//! blocking-key extraction, and feature comparison (§4.1-§4.5).

use criterion::{black_box, criterion_group, criterion_main, Criterion};

use mpi_linkage::matching::comparators::{compare, ComparatorKind};
use mpi_linkage::matching::config::AdvancedConfig;
use mpi_linkage::models::{Feature, Identifier, PiiAddress, PiiName, PiiRecord, Telecom, TelecomSystem};
use mpi_linkage::pii;

fn sample_record(family: &str) -> PiiRecord {
    PiiRecord {
        birth_date: Some("1980-05-01".to_string()),
        sex: Some("F".to_string()),
        name: vec![PiiName {
            family: family.to_string(),
            given: vec!["Josephine".to_string()],
            suffix: None,
        }],
        address: vec![PiiAddress {
            line: vec!["123 Main St".to_string()],
            city: Some("Springfield".to_string()),
            state: Some("IL".to_string()),
            postal_code: Some("62704".to_string()),
            county: None,
        }],
        telecom: vec![Telecom { system: TelecomSystem::Phone, value: "2175550100".to_string() }],
        identifiers: vec![Identifier::new("MR", "FACILITY-A", "00012345")],
    }
}

fn bench_normalize(c: &mut Criterion) {
    let raw = serde_json::from_value(serde_json::json!({
        "birth_date": "05/01/1980",
        "sex": "Female",
        "name": [{"family": "Smith", "given": ["Josephine"]}],
        "address": [{"line": ["123 Main St"], "city": "Springfield", "state": "Illinois", "postal_code": "62704-1234"}],
        "telecom": [{"system": "PHONE", "value": "+1 (217) 555-0100"}],
    }))
    .unwrap();

    c.bench_function("normalize", |b| b.iter(|| pii::normalize(black_box(&raw)).unwrap()));
}

fn bench_clean(c: &mut Criterion) {
    let record = sample_record("Smith");
    let rules = vec![];
    c.bench_function("clean_no_rules", |b| {
        b.iter(|| pii::clean_record(black_box(&record), black_box(&rules)))
    });
}

fn bench_blocking_extract(c: &mut Criterion) {
    let record = sample_record("Smith");
    c.bench_function("blocking_extract", |b| {
        b.iter(|| mpi_linkage::blocking::extract(black_box(1), black_box(&record)))
    });
}

fn bench_fuzzy_compare(c: &mut Criterion) {
    let a = sample_record("Smith");
    let b_rec = sample_record("Smyth");
    c.bench_function("fuzzy_last_name", |b| {
        b.iter(|| {
            compare(
                ComparatorKind::Fuzzy,
                black_box(&Feature::LastName),
                black_box(&a),
                black_box(&b_rec),
                0.65,
                None,
                &AdvancedConfig::default(),
            )
        })
    });
}

criterion_group!(benches, bench_normalize, bench_clean, bench_blocking_extract, bench_fuzzy_compare);
criterion_main!(benches);
