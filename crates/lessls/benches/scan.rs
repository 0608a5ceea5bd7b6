// scan.rs - Benchmarks for workspace scanning, cache reuse and symbol extraction
//
// Run with: cargo bench --bench scan --features test-support
// Compare baselines: cargo bench --bench scan --features test-support -- --baseline before

use std::sync::Arc;

use criterion::{black_box, criterion_group, criterion_main, BenchmarkId, Criterion};
use tokio::runtime::Runtime;

use lessls::cache::WorkspaceCache;
use lessls::config::ScannerConfig;
use lessls::fs::DiskFileSystem;
use lessls::scanner::Scanner;
use lessls::symbols::symbols_from_text;
use lessls::test_utils::fixture_workspace::{create_fixture_workspace, FixtureConfig};

fn scanner() -> Scanner {
    Scanner::new(
        Arc::new(DiskFileSystem),
        Arc::new(WorkspaceCache::new()),
        ScannerConfig::default(),
    )
}

// ---------------------------------------------------------------------------
// Benchmark: cold scan, every file parsed
// ---------------------------------------------------------------------------

fn bench_cold_scan(c: &mut Criterion) {
    let runtime = Runtime::new().unwrap();
    let mut group = c.benchmark_group("cold_scan");
    group.sample_size(10);

    let configs: &[(&str, FixtureConfig)] = &[
        ("small_10", FixtureConfig::small()),
        ("medium_50", FixtureConfig::medium()),
        ("large_200", FixtureConfig::large()),
    ];

    for (label, config) in configs {
        // Pre-create the workspace so fixture generation isn't measured.
        let workspace = create_fixture_workspace(config);

        group.bench_with_input(BenchmarkId::new("scan", *label), &workspace, |b, ws| {
            b.to_async(&runtime).iter(|| async move {
                let scanner = scanner();
                black_box(scanner.scan(Some(ws.path()), None).await.unwrap())
            })
        });
    }

    group.finish();
}

// ---------------------------------------------------------------------------
// Benchmark: warm scan, every record reused from the cache
// ---------------------------------------------------------------------------

fn bench_warm_scan(c: &mut Criterion) {
    let runtime = Runtime::new().unwrap();
    let mut group = c.benchmark_group("warm_scan");
    group.sample_size(10);

    let workspace = create_fixture_workspace(&FixtureConfig::medium());
    let scanner = scanner();
    runtime
        .block_on(scanner.scan(Some(workspace.path()), None))
        .unwrap();

    let (scanner, root) = (&scanner, workspace.path());
    group.bench_function("rescan_medium_50", |b| {
        b.to_async(&runtime).iter(|| async move {
            black_box(scanner.scan(Some(root), None).await.unwrap())
        })
    });

    group.finish();
}

// ---------------------------------------------------------------------------
// Benchmark: extraction of one document, with and without a cursor
// ---------------------------------------------------------------------------

fn bench_extraction(c: &mut Criterion) {
    let mut group = c.benchmark_group("extraction");

    let workspace = create_fixture_workspace(&FixtureConfig::large());
    let text = std::fs::read_to_string(workspace.path().join("file_0.less")).unwrap();
    let cursor = text.len() / 2;

    group.bench_function("document_symbols", |b| {
        b.iter(|| black_box(symbols_from_text(black_box(&text), None)))
    });
    group.bench_function("symbols_at_cursor", |b| {
        b.iter(|| black_box(symbols_from_text(black_box(&text), Some(cursor))))
    });

    group.finish();
}

criterion_group!(benches, bench_cold_scan, bench_warm_scan, bench_extraction);
criterion_main!(benches);
