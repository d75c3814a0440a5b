//! Criterion benchmarks for building, hashing and walking element trees

use criterion::{black_box, criterion_group, criterion_main, Criterion};
use ferrum_model::datatype::{Code, CodeableConcept, Coding, FhirString, Reference, Uri};
use ferrum_model::prelude::*;
use ferrum_model::resource::{Observation, ObservationComponent};
use ferrum_model::visitor::PathCollector;
use ferrum_model::ModelConfig;
use std::collections::hash_map::DefaultHasher;
use std::hash::{Hash, Hasher};
use std::time::Duration;

fn custom_criterion() -> Criterion {
    Criterion::default()
        .sample_size(20)
        .warm_up_time(Duration::from_millis(100))
        .measurement_time(Duration::from_secs(1))
        .nresamples(1000)
        .noise_threshold(0.05)
}

fn loinc(code: &str) -> CodeableConcept {
    CodeableConcept::builder()
        .coding([Coding::builder()
            .system(Uri::of("http://loinc.org").unwrap())
            .code(Code::of(code).unwrap())
            .build()
            .unwrap()])
        .build()
        .unwrap()
}

fn observation_builder() -> ferrum_model::resource::ObservationBuilder {
    let components = (0..8).map(|i| {
        ObservationComponent::builder()
            .code(loinc(&format!("8480-{}", i)))
            .value(FhirString::of(format!("{} mmHg", 100 + i)).unwrap())
            .build()
            .unwrap()
    });
    Observation::builder()
        .id("bench")
        .status(Code::of("final").unwrap())
        .code(loinc("85354-9"))
        .subject(Reference::to("Patient/example").unwrap())
        .component(components)
}

fn bench_build(c: &mut Criterion) {
    let builder = observation_builder();
    let validated = ModelConfig::default();
    let trusted = ModelConfig::trusted();

    c.bench_function("build_validated", |b| {
        b.iter(|| black_box(builder.clone()).build_with(&validated).unwrap())
    });

    c.bench_function("build_trusted", |b| {
        b.iter(|| black_box(builder.clone()).build_with(&trusted).unwrap())
    });
}

fn bench_hash_and_eq(c: &mut Criterion) {
    let a = observation_builder().build().unwrap();
    let b = a.to_builder().build().unwrap();

    c.bench_function("hash_memoized", |bench| {
        bench.iter(|| {
            let mut hasher = DefaultHasher::new();
            black_box(&a).hash(&mut hasher);
            hasher.finish()
        })
    });

    c.bench_function("structural_eq", |bench| {
        bench.iter(|| black_box(&a) == black_box(&b))
    });
}

fn bench_walk(c: &mut Criterion) {
    let observation = observation_builder().build().unwrap();

    c.bench_function("walk_paths", |b| {
        b.iter(|| {
            let mut collector = PathCollector::new();
            black_box(&observation).accept(&mut collector);
            collector.into_paths().len()
        })
    });
}

criterion_group! {
    name = benches;
    config = custom_criterion();
    targets = bench_build, bench_hash_and_eq, bench_walk
}
criterion_main!(benches);
