use std::collections::HashMap;
use std::hint::black_box;
use std::time::Duration;

use criterion::{BenchmarkId, Criterion, criterion_group, criterion_main};
use hostwatch::report::render_text;
use hostwatch::system::ranker::{ProcessRanker, RawProcess};
use hostwatch::system::sampler::process_deltas;
use hostwatch::system::snapshot::{CpuStats, HostInfo, MemoryStats, Snapshot};

fn make_raw(n: usize) -> Vec<RawProcess> {
    (0..n)
        .map(|i| RawProcess {
            pid: i as u32 + 1,
            name: if i % 50 == 0 {
                "System".to_string()
            } else {
                format!("proc_{i}.exe")
            },
            cpu_busy_percent: (i % 97) as f64 * 1.03,
            rss_bytes: ((n - i) as u64 + 1) * 4096,
        })
        .collect()
}

fn make_passes(n: usize) -> (HashMap<u32, Duration>, HashMap<u32, Duration>) {
    let before = (0..n as u32)
        .map(|pid| (pid, Duration::from_millis(pid as u64 * 10)))
        .collect();
    let after = (0..n as u32)
        .map(|pid| (pid, Duration::from_millis(pid as u64 * 10 + (pid as u64 % 400))))
        .collect();
    (before, after)
}

fn bench_rank(c: &mut Criterion) {
    let mut group = c.benchmark_group("rank_500_1000_2000");
    let ranker = ProcessRanker::with_hidden(["kworker"]);

    for size in [500usize, 1000, 2000] {
        let raw = make_raw(size);
        group.bench_with_input(BenchmarkId::from_parameter(size), &raw, |b, raw| {
            b.iter(|| {
                let ranking = ranker.rank(black_box(raw.clone()), 10);
                black_box(ranking);
            })
        });
    }

    group.finish();
}

fn bench_process_deltas(c: &mut Criterion) {
    let mut group = c.benchmark_group("process_deltas_500_1000_2000");

    for size in [500usize, 1000, 2000] {
        let passes = make_passes(size);
        group.bench_with_input(
            BenchmarkId::from_parameter(size),
            &passes,
            |b, (before, after)| {
                b.iter(|| {
                    let deltas =
                        process_deltas(black_box(before), black_box(after), Duration::from_millis(500), 8);
                    black_box(deltas);
                })
            },
        );
    }

    group.finish();
}

fn bench_render_text(c: &mut Criterion) {
    let ranking = ProcessRanker::new().rank(make_raw(2000), 25);
    let snapshot = Snapshot {
        timestamp: chrono::Local::now(),
        host: HostInfo {
            os: Some("Bench OS".to_string()),
            hostname: Some("bench".to_string()),
            arch: std::env::consts::ARCH.to_string(),
        },
        cpu: CpuStats {
            usage_percent: Some(42.0),
            logical_cores: 8,
            physical_cores: 4,
            frequency_mhz: Some(3200.0),
            temperature_c: None,
        },
        memory: MemoryStats::default(),
        disks: Vec::new(),
        processes: ranking.top,
        process_totals: ranking.totals,
        process_count: ranking.considered,
    };

    c.bench_function("render_text_top_25", |b| {
        b.iter(|| black_box(render_text(black_box(&snapshot))))
    });
}

criterion_group!(benches, bench_rank, bench_process_deltas, bench_render_text);
criterion_main!(benches);
