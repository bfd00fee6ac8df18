use criterion::{black_box, criterion_group, criterion_main, Criterion};

use examkit_core::parser::{parse_exam_str, validate_exam};

fn make_document(questions: usize) -> String {
    let items: Vec<String> = (0..questions)
        .map(|i| {
            if i % 2 == 0 {
                format!(
                    r#"{{"topic":"Streams","question":"Q{i} <code>List&lt;T&gt;</code>","options":["a","b","c","d"],"answer":{}}}"#,
                    i % 4
                )
            } else {
                format!(
                    r#"{{"topic":"Collections","question":"Q{i}","options":["a","b","c","d"],"answer":[0,3],"type":"multiple","explanation":"see docs"}}"#
                )
            }
        })
        .collect();
    format!(
        r#"{{"title":"Bench exam","duration":30,"questions":[{}]}}"#,
        items.join(",")
    )
}

fn bench_parse(c: &mut Criterion) {
    let mut group = c.benchmark_group("parse_exam");

    for size in [10, 100, 1000] {
        let doc = make_document(size);
        group.bench_function(format!("questions={size}"), |b| {
            b.iter(|| parse_exam_str(black_box(&doc), black_box("bench.json")))
        });
    }

    group.finish();
}

fn bench_validate(c: &mut Criterion) {
    let doc = make_document(100);
    c.bench_function("validate_exam/100", |b| {
        b.iter(|| validate_exam(black_box(&doc)))
    });
}

criterion_group!(benches, bench_parse, bench_validate);
criterion_main!(benches);
