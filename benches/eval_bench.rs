// In jqbind/benches/eval_bench.rs

use criterion::{black_box, criterion_group, criterion_main, Criterion};

use jqbind::{Program, TextFormat};

/// Builds a JSON array of `count` small records.
fn sample_records(count: usize) -> String {
    let mut out = String::from("[");
    for i in 0..count {
        if i > 0 {
            out.push(',');
        }
        out.push_str(&format!(r#"{{"name":"record-{i}","value":{i}}}"#));
    }
    out.push(']');
    out
}

const PIPELINE_FILTER: &str = ".[] | select(.value % 2 == 0) | .name";

fn bench_compile(c: &mut Criterion) {
    // Compilation is the expensive half of the compile-once/evaluate-many
    // contract; keep an eye on it separately from evaluation.
    c.bench_function("compile_identity", |b| {
        b.iter(|| Program::new(black_box("."), &[]).unwrap())
    });
    c.bench_function("compile_pipeline", |b| {
        b.iter(|| Program::new(black_box(PIPELINE_FILTER), &[]).unwrap())
    });
}

fn bench_evaluate(c: &mut Criterion) {
    let identity = Program::new(".", &[]).unwrap();
    let pipeline = Program::new(PIPELINE_FILTER, &[]).unwrap();
    let format = TextFormat::default();

    let small = sample_records(16);
    let large = sample_records(1024);

    c.bench_function("identity_all_16_records", |b| {
        b.iter(|| identity.all(black_box(&small), &format).unwrap())
    });
    c.bench_function("pipeline_all_16_records", |b| {
        b.iter(|| pipeline.all(black_box(&small), &format).unwrap())
    });
    c.bench_function("pipeline_all_1024_records", |b| {
        b.iter(|| pipeline.all(black_box(&large), &format).unwrap())
    });
    c.bench_function("pipeline_first_1024_records", |b| {
        b.iter(|| pipeline.first(black_box(&large), &format).unwrap())
    });
}

criterion_group!(benches, bench_compile, bench_evaluate);
criterion_main!(benches);
