use criterion::{black_box, criterion_group, criterion_main, Criterion};

use drillrun_core::parser::{lint_scenario, parse_scenario_str};

fn bench_toml_parsing(c: &mut Criterion) {
    let mut group = c.benchmark_group("toml_parsing");

    let small_toml = generate_scenario_toml(8);
    let medium_toml = generate_scenario_toml(50);
    let large_toml = generate_scenario_toml(200);

    group.bench_function("8_questions", |b| {
        b.iter(|| parse_scenario_str(black_box(&small_toml), black_box("bench.toml".as_ref())))
    });

    group.bench_function("50_questions", |b| {
        b.iter(|| parse_scenario_str(black_box(&medium_toml), black_box("bench.toml".as_ref())))
    });

    group.bench_function("200_questions", |b| {
        b.iter(|| parse_scenario_str(black_box(&large_toml), black_box("bench.toml".as_ref())))
    });

    group.finish();
}

fn bench_lint(c: &mut Criterion) {
    let scenario = parse_scenario_str(&generate_scenario_toml(200), "bench.toml".as_ref())
        .expect("generated scenario is valid");

    c.bench_function("lint_200_questions", |b| {
        b.iter(|| lint_scenario(black_box(&scenario)))
    });
}

fn generate_scenario_toml(n: usize) -> String {
    let mut s = String::new();
    s.push_str(
        r#"[scenario]
id = "bench"
title = "Benchmark"
hazard = "earthquake"
intro = "Generated drill."
default_time_limit_secs = 15
"#,
    );
    for i in 0..n {
        s.push_str(&format!(
            r#"
[[questions]]
id = {i}
prompt = "Question {i}"
options = ["First {i}", "Second {i}", "Third {i}", "Fourth {i}"]
correct = {correct}
explanation = "Because option {correct} is right."
"#,
            correct = i % 4
        ));
    }
    s
}

criterion_group!(benches, bench_toml_parsing, bench_lint);
criterion_main!(benches);
