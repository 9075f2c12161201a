use criterion::{black_box, criterion_group, criterion_main, BenchmarkId, Criterion};
use dfa_toolkit::{ConsistencyMode, Dataset, PtaKind, StringSample};

const SIZES: [usize; 3] = [100, 1_000, 10_000];

/// Deterministic words over {0, 1, 2}, labelled by the parity of their symbol sum.
fn dataset(count: usize) -> Dataset<u32> {
    let mut state: u64 = 0x2545_f491;
    let mut next = move || {
        state ^= state << 13;
        state ^= state >> 7;
        state ^= state << 17;
        state
    };
    (0..count)
        .map(|_| {
            let len = (next() % 16) as usize;
            let word: Vec<u32> = (0..len).map(|_| (next() % 3) as u32).collect();
            if word.iter().sum::<u32>() % 2 == 0 {
                StringSample::accepted(word)
            } else {
                StringSample::rejected(word)
            }
        })
        .collect()
}

fn bench_pta(c: &mut Criterion) {
    let mut group = c.benchmark_group("prefix tree");
    for size in SIZES {
        let data = dataset(size);
        group.bench_with_input(BenchmarkId::new("apta", size), &data, |b, data| {
            b.iter(|| black_box(data.apta()))
        });
        group.bench_with_input(BenchmarkId::new("pta", size), &data, |b, data| {
            b.iter(|| black_box(data.pta(PtaKind::Pta, ConsistencyMode::BestEffort)))
        });
    }
    group.finish();
}

fn bench_queries(c: &mut Criterion) {
    let data = dataset(1_000);
    let Ok(apta) = data.apta() else {
        return;
    };
    c.bench_function("describe", |b| b.iter(|| black_box(apta.describe())));
    c.bench_function("depth", |b| b.iter(|| black_box(apta.depth())));
    c.bench_function("accuracy", |b| b.iter(|| black_box(data.accuracy(&apta))));
}

criterion_group!(benches, bench_pta, bench_queries);
criterion_main!(benches);
