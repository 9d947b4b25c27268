use criterion::{black_box, criterion_group, criterion_main, Criterion};
use sluice::core::config::EngineConfig;
use sluice::mem::SpineBuffer;
use sluice::{Engine, Pipeline};

const N: i64 = 1 << 18;

fn input() -> Vec<i64> {
    (0..N).map(|i| (i * 2_654_435_761) % 100_003).collect()
}

fn bench_map_filter_sum(c: &mut Criterion) {
    let engine = Engine::new(EngineConfig::default()).unwrap();
    let data = input();
    c.bench_function("map_filter_sum/sequential", |b| {
        b.iter(|| {
            Pipeline::from_vec(data.clone())
                .map(|x| x * 3)
                .filter(|x| x % 7 != 0)
                .sum()
                .unwrap()
        })
    });
    c.bench_function("map_filter_sum/parallel", |b| {
        b.iter(|| {
            engine
                .from_vec(data.clone())
                .map(|x| x * 3)
                .filter(|x| x % 7 != 0)
                .sum()
                .unwrap()
        })
    });
}

fn bench_sorted_to_vec(c: &mut Criterion) {
    let engine = Engine::new(EngineConfig::default()).unwrap();
    let data = input();
    c.bench_function("sorted_to_vec/parallel", |b| {
        b.iter(|| engine.from_vec(data.clone()).sorted().to_vec().unwrap())
    });
    c.bench_function("distinct_count/parallel", |b| {
        b.iter(|| engine.from_vec(data.clone()).distinct().count().unwrap())
    });
}

fn bench_spine_push(c: &mut Criterion) {
    c.bench_function("spine_push", |b| {
        b.iter(|| {
            let mut spine = SpineBuffer::new();
            for i in 0..N {
                spine.push(black_box(i));
            }
            spine.len()
        })
    });
}

criterion_group!(benches, bench_map_filter_sum, bench_sorted_to_vec, bench_spine_push);
criterion_main!(benches);
