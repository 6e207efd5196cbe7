use std::time::Duration;

use criterion::{
    criterion_group, criterion_main, measurement::WallTime, BenchmarkGroup, Criterion, SamplingMode,
};

use rindex::RIndex;
use rindex_bench::{build_index, gen_patterns, gen_repetitive_text};

const SAMPLE_SIZE: usize = 30;
const WARM_UP_TIME: Duration = Duration::from_secs(5);
const MEASURE_TIME: Duration = Duration::from_secs(10);

const SEED_TEXT: u64 = 334;
const SEED_QUERIES: u64 = 114514;

const BASE_LEN: usize = 1 << 12;
const NUM_COPIES: usize = 63;
const PATTERN_LENS: &[usize] = &[8, 32, 128];
const NUM_QUERIES: usize = 1000;

fn criterion_count_dna(c: &mut Criterion) {
    let mut group = c.benchmark_group("timing_count_dna");
    group.sample_size(SAMPLE_SIZE);
    group.warm_up_time(WARM_UP_TIME);
    group.measurement_time(MEASURE_TIME);
    group.sampling_mode(SamplingMode::Flat);

    let text = gen_repetitive_text(BASE_LEN, NUM_COPIES, 10, b"ACGT", SEED_TEXT);
    perform_count(&mut group, &text);
}

fn criterion_count_english(c: &mut Criterion) {
    let mut group = c.benchmark_group("timing_count_english");
    group.sample_size(SAMPLE_SIZE);
    group.warm_up_time(WARM_UP_TIME);
    group.measurement_time(MEASURE_TIME);
    group.sampling_mode(SamplingMode::Flat);

    let text = gen_repetitive_text(
        BASE_LEN,
        NUM_COPIES,
        10,
        b"abcdefghijklmnopqrstuvwxyz",
        SEED_TEXT,
    );
    perform_count(&mut group, &text);
}

fn run_queries(index: &RIndex, queries: &[Vec<u8>]) {
    let mut sum = 0;
    for q in queries {
        sum += index.count(q).len();
    }
    if sum == 0 {
        panic!("Should not come.");
    }
}

fn perform_count(group: &mut BenchmarkGroup<WallTime>, text: &[u8]) {
    let index = build_index(text);
    for &len in PATTERN_LENS {
        let queries = gen_patterns(text, NUM_QUERIES, len, SEED_QUERIES);
        group.bench_function(format!("m_{len}/rindex/RIndex"), |b| {
            b.iter(|| run_queries(&index, &queries));
        });
    }
}

criterion_group!(benches, criterion_count_dna, criterion_count_english);

criterion_main!(benches);
