//! Criterion benchmarks for parse, normalize and diff throughput.

use criterion::{black_box, criterion_group, criterion_main, Criterion};

use protoschema_core::{fingerprint, parse, CompatibilityChecker, Normalize};

const EVERYTHING: &str = include_str!("../../../tests/fixtures/valid/everything.proto");
const BEFORE: &str = include_str!("../../../tests/fixtures/compat/before.proto");
const AFTER: &str = include_str!("../../../tests/fixtures/compat/after-enum-value-renamed.proto");

/// `n` messages with a handful of fields each, plus one enum and service
fn generate_schema(n: usize) -> String {
    let mut schema = String::from("syntax = \"proto3\";\npackage bench.v1;\n\n");
    for i in 0..n {
        schema.push_str(&format!(
            "message Message{i} {{\n  string id = 1;\n  repeated int64 values = 2 [packed = true];\n  map<string, Message{i}> children = 3;\n  oneof choice {{ bool flag = 4; double ratio = 5; }}\n  reserved 10 to 20;\n}}\n\n"
        ));
    }
    schema.push_str("enum Kind {\n  KIND_UNSPECIFIED = 0;\n  KIND_ONE = 1;\n}\n\n");
    schema.push_str("service Bench {\n  rpc Get (Message0) returns (stream Message0);\n}\n");
    schema
}

fn bench_parse(c: &mut Criterion) {
    let mut group = c.benchmark_group("parse");

    group.bench_function("everything", |b| {
        b.iter(|| parse(black_box(EVERYTHING)).expect("parse"))
    });

    let large = generate_schema(500);
    group.bench_function("500_messages", |b| {
        b.iter(|| parse(black_box(&large)).expect("parse"))
    });

    group.finish();
}

fn bench_normalize(c: &mut Criterion) {
    let file = parse(&generate_schema(500)).expect("parse");
    c.bench_function("normalize_500_messages", |b| b.iter(|| black_box(&file).normalize()));
    c.bench_function("fingerprint_500_messages", |b| b.iter(|| fingerprint(black_box(&file))));
}

fn bench_diff(c: &mut Criterion) {
    let before = parse(BEFORE).expect("parse");
    let after = parse(AFTER).expect("parse");
    let checker = CompatibilityChecker::default();
    c.bench_function("check_fixture", |b| {
        b.iter(|| checker.report(black_box(&before), black_box(&after)))
    });

    let large = parse(&generate_schema(500)).expect("parse");
    let larger = parse(&generate_schema(501)).expect("parse");
    c.bench_function("diff_500_messages", |b| {
        b.iter(|| black_box(&large).diff(black_box(&larger)))
    });
}

criterion_group!(benches, bench_parse, bench_normalize, bench_diff);
criterion_main!(benches);
