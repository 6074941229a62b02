use criterion::{criterion_group, criterion_main, Criterion};
use docrank_core::{DocumentRecord, Engine, EngineConfig, Method};

fn corpus() -> Vec<DocumentRecord> {
    let words = [
        "process", "thread", "deadlock", "memory", "paging", "scheduler", "kernel", "mutex",
        "semaphore", "cache", "disk", "file", "system", "interrupt", "signal", "socket",
    ];
    (0..500)
        .map(|i| {
            let text: Vec<&str> = (0..200).map(|j| words[(i * 7 + j * 13 + j / 3) % words.len()]).collect();
            DocumentRecord::new(format!("doc{i}.txt"), format!("docs/doc{i}.txt"), text.join(" "))
        })
        .collect()
}

fn bench_search(c: &mut Criterion) {
    let engine = Engine::with_documents(EngineConfig::default(), corpus());
    c.bench_function("search_vector", |b| b.iter(|| engine.search("deadlock mutex scheduler", Method::Vector, 20)));
    c.bench_function("search_probabilistic", |b| {
        b.iter(|| engine.search("deadlock mutex scheduler", Method::Probabilistic, 20))
    });
    c.bench_function("search_phrase", |b| b.iter(|| engine.search("\"mutex semaphore\"", Method::Vector, 20)));
}

fn bench_build(c: &mut Criterion) {
    let records = corpus();
    c.bench_function("build_index", |b| b.iter(|| Engine::with_documents(EngineConfig::default(), records.clone())));
}

criterion_group!(benches, bench_search, bench_build);
criterion_main!(benches);
