//! Benchmarks for sandbox scanning and registry diffing.
//!
//! Performance-critical paths:
//! - `scan`: bounded walk of every sandbox under the root
//! - `apply_scan`: diff and swap of the registry snapshot

#![allow(missing_docs)]

use criterion::{BenchmarkId, Criterion, Throughput, black_box, criterion_group, criterion_main};
use harvest_kernel::discovery::{ScanLimits, SessionRegistry, SessionScanner};
use std::fs;
use std::path::Path;

fn populate(root: &Path, sessions: usize, files_per_sandbox: usize) {
    for s in 0..sessions {
        let sandbox = root
            .join(format!("{s:012X}"))
            .join("ABCDEF1234567890")
            .join("Sandbox")
            .join("Game");
        for f in 0..files_per_sandbox {
            let dir = sandbox.join(format!("Dir{}", f % 8));
            fs::create_dir_all(&dir).unwrap();
            fs::write(dir.join(format!("asset{f}.uasset")), b"payload").unwrap();
        }
    }
}

fn bench_scan(c: &mut Criterion) {
    let mut group = c.benchmark_group("discovery/scan");

    for (sessions, files) in [(1usize, 100usize), (10, 100), (10, 1000)] {
        let temp_dir = tempfile::tempdir().unwrap();
        populate(temp_dir.path(), sessions, files);
        let scanner = SessionScanner::new(ScanLimits::default());

        group.throughput(Throughput::Elements((sessions * files) as u64));
        group.bench_with_input(
            BenchmarkId::from_parameter(format!("{sessions}x{files}")),
            &sessions,
            |b, _| b.iter(|| scanner.scan(black_box(temp_dir.path()))),
        );
    }

    group.finish();
}

fn bench_apply_scan(c: &mut Criterion) {
    let temp_dir = tempfile::tempdir().unwrap();
    populate(temp_dir.path(), 50, 10);
    let scanner = SessionScanner::new(ScanLimits::default());
    let snapshot = scanner.scan(temp_dir.path());

    c.bench_function("discovery/apply_scan_unchanged", |b| {
        let registry = SessionRegistry::new();
        registry.apply_scan(snapshot.clone());
        b.iter(|| registry.apply_scan(black_box(snapshot.clone())));
    });
}

criterion_group!(benches, bench_scan, bench_apply_scan);
criterion_main!(benches);
