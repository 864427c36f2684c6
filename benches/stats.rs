use criterion::{black_box, criterion_group, criterion_main, Criterion};

use phenobench::RankStats;

fn case_ranks(cases: usize) -> Vec<Vec<usize>> {
    (0..cases)
        .map(|idx| match idx % 4 {
            0 => vec![1],
            1 => vec![(idx % 13) + 1, 0],
            2 => vec![0],
            _ => vec![(idx % 37) + 1, (idx % 5) + 1],
        })
        .collect()
}

fn rank_stats_benchmark(c: &mut Criterion) {
    let stats = RankStats::from_case_ranks(case_ranks(5_000));

    c.bench_function("from_case_ranks 5000", |b| {
        b.iter(|| RankStats::from_case_ranks(black_box(case_ranks(5_000))))
    });

    c.bench_function("MAP@10 5000", |b| {
        b.iter(|| black_box(&stats).mean_average_precision_at_k(black_box(10)))
    });

    c.bench_function("NDCG@10 5000", |b| {
        b.iter(|| black_box(&stats).mean_normalised_discounted_cumulative_gain(black_box(10)))
    });

    c.bench_function("MRR 5000", |b| {
        b.iter(|| black_box(&stats).mean_reciprocal_rank())
    });
}

criterion_group!(stats, rank_stats_benchmark);
criterion_main!(stats);
