//! Benchmarks for the LLM-free pipeline stages.

use criterion::{Criterion, black_box, criterion_group, criterion_main};

use smartcity_nlq::intent;
use smartcity_nlq::sanitize;
use smartcity_nlq::template;
use smartcity_nlq::validate;

const RAW_OUTPUT: &str = "Voici la requête SPARQL:\n```sparql\nPREFIX : <http://example.org/>\n\
SELECT ?x ?nom WHERE {\n  ?x a :Personne .\n  ?x :nom ?nom .\n}\nLIMIT 10\n```\n\
Cette requête liste les personnes.";

fn bench_classify(c: &mut Criterion) {
    c.bench_function("classify_entity_question", |bench| {
        bench.iter(|| black_box(intent::classify(black_box("Quel est le trajet de Wala?"))))
    });
    c.bench_function("classify_miss", |bench| {
        bench.iter(|| black_box(intent::classify(black_box("Combien de vélos au centre ville ?"))))
    });
}

fn bench_instantiate(c: &mut Criterion) {
    c.bench_function("instantiate_user_travel", |bench| {
        bench.iter(|| black_box(template::instantiate("user_travel", Some("Wala")).unwrap()))
    });
}

fn bench_sanitize(c: &mut Criterion) {
    c.bench_function("sanitize_fenced_output", |bench| {
        bench.iter(|| black_box(sanitize::sanitize(black_box(RAW_OUTPUT))))
    });
    c.bench_function("sanitize_and_repair", |bench| {
        bench.iter(|| {
            black_box(sanitize::sanitize_for_question(
                "liste des personnes",
                black_box(RAW_OUTPUT),
            ))
        })
    });
}

fn bench_validate(c: &mut Criterion) {
    let query = sanitize::sanitize(RAW_OUTPUT).into_string();
    c.bench_function("validate", |bench| {
        bench.iter(|| black_box(validate::validate(black_box(&query))))
    });
}

criterion_group!(
    benches,
    bench_classify,
    bench_instantiate,
    bench_sanitize,
    bench_validate
);
criterion_main!(benches);
