//! Benchmarks for copy layout helpers.

#![allow(missing_docs)]

use criterion::{BenchmarkId, Criterion, black_box, criterion_group, criterion_main};
use harvest_kernel::transfer::layout::{common_root, destination_for};
use harvest_kernel::transfer::summary::group_by_extension;
use std::path::{Path, PathBuf};

fn selection(count: usize) -> Vec<PathBuf> {
    (0..count)
        .map(|i| {
            PathBuf::from(format!(
                "/mu/1234ABCD5678/ABCDEF1234567890/Sandbox/Game/Dir{}/Sub{}/file{i}.{}",
                i % 16,
                i % 4,
                ["uasset", "umap", "ini", "cpp"][i % 4]
            ))
        })
        .collect()
}

fn bench_common_root(c: &mut Criterion) {
    let mut group = c.benchmark_group("transfer/common_root");

    for count in [10usize, 1_000, 10_000] {
        let files = selection(count);
        group.bench_with_input(BenchmarkId::from_parameter(count), &files, |b, files| {
            b.iter(|| common_root(black_box(files)));
        });
    }

    group.finish();
}

fn bench_destination_for(c: &mut Criterion) {
    let files = selection(1_000);
    let base = Path::new("/mu/1234ABCD5678/ABCDEF1234567890/Sandbox/Game");
    let destination = Path::new("/out");

    c.bench_function("transfer/destination_for_1000", |b| {
        b.iter(|| {
            for file in &files {
                black_box(destination_for(file, Some(base), destination));
            }
        });
    });
}

fn bench_group_by_extension(c: &mut Criterion) {
    let files = selection(10_000);
    c.bench_function("transfer/group_by_extension_10000", |b| {
        b.iter(|| group_by_extension(black_box(&files)));
    });
}

criterion_group!(
    benches,
    bench_common_root,
    bench_destination_for,
    bench_group_by_extension
);
criterion_main!(benches);
