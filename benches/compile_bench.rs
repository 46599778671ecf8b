use criterion::{black_box, criterion_group, criterion_main, Criterion};
use recfilter::*;

fn bench_parse_and_compile(c: &mut Criterion) {
    let compiler = PostgresCompiler::default();
    let doc = r#"{"type": "session", "$or": [{"id": "a"}, {"id": "b"}, {"$index": "10.0.0.1"}]}"#;

    c.bench_function("from_json_str", |b| {
        b.iter(|| {
            let _ = FilterExpr::from_json_str(black_box(doc));
        })
    });
    let expr = FilterExpr::from_json_str(doc).unwrap();
    c.bench_function("compile", |b| {
        b.iter(|| {
            let _ = compiler.compile(black_box(&expr), 0);
        })
    });
    c.bench_function("select_records", |b| {
        b.iter(|| {
            let _ = SelectRecords::new(compiler.table().clone())
                .bind_condition("type", "session")
                .and_then(|query| query.filter(&compiler, black_box(&expr)))
                .map(SelectRecords::build);
        })
    });
}

criterion_group!(benches, bench_parse_and_compile);
criterion_main!(benches);
