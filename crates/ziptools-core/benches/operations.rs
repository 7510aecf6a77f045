//! Entry operation benchmarks for ziptools.
//!
//! Measures:
//! - Content classification throughput
//! - Lookups and reads against an open handle
//! - Close (commit) cost for a dirty archive

#![allow(clippy::unwrap_used, clippy::expect_used, missing_docs)]

use criterion::BenchmarkId;
use criterion::Criterion;
use criterion::Throughput;
use criterion::criterion_group;
use criterion::criterion_main;
use std::hint::black_box;
use tempfile::TempDir;
use ziptools_core::AddOptions;
use ziptools_core::ReadMode;
use ziptools_core::classify;

fn benchmark_classify(c: &mut Criterion) {
    let mut group = c.benchmark_group("classify");

    for size in [1024usize, 64 * 1024] {
        let ascii = vec![b'a'; size];
        let utf8 = "héllo wörld ".repeat(size / 14).into_bytes();
        let binary: Vec<u8> = (0..size).map(|i| (i % 256) as u8).collect();

        group.throughput(Throughput::Bytes(size as u64));
        group.bench_with_input(BenchmarkId::new("ascii", size), &ascii, |b, buf| {
            b.iter(|| classify(black_box(buf)));
        });
        group.bench_with_input(BenchmarkId::new("utf8", size), &utf8, |b, buf| {
            b.iter(|| classify(black_box(buf)));
        });
        group.bench_with_input(BenchmarkId::new("binary", size), &binary, |b, buf| {
            b.iter(|| classify(black_box(buf)));
        });
    }

    group.finish();
}

fn benchmark_reads(c: &mut Criterion) {
    let mut group = c.benchmark_group("reads");

    let temp = TempDir::new().unwrap();
    let path = temp.path().join("bench.zip");
    let handle = ziptools_core::open(&path, true).unwrap();
    for i in 0..200 {
        handle
            .add_or_replace(&format!("dir/file{i}.txt"), "x".repeat(4096), &AddOptions::default())
            .unwrap();
    }
    handle.close().unwrap();

    group.bench_function("exists", |b| {
        b.iter(|| handle.exists(black_box("./dir/file150.txt")).unwrap());
    });
    group.bench_function("stat_size", |b| {
        b.iter(|| handle.stat_size(black_box("dir/file150.txt")).unwrap());
    });
    group.bench_function("get_entry_4k", |b| {
        b.iter(|| {
            handle
                .get_entry(black_box("dir/file150.txt"), ReadMode::Auto)
                .unwrap()
        });
    });
    group.bench_function("list_entries_200", |b| {
        b.iter(|| handle.list_entries().unwrap());
    });

    group.finish();
}

fn benchmark_commit(c: &mut Criterion) {
    let mut group = c.benchmark_group("commit");
    group.sample_size(20);

    let temp = TempDir::new().unwrap();
    let path = temp.path().join("commit.zip");
    let handle = ziptools_core::open(&path, true).unwrap();
    for i in 0..100 {
        handle
            .add_or_replace(&format!("base{i}"), vec![b'b'; 8192], &AddOptions::default())
            .unwrap();
    }
    handle.close().unwrap();

    group.bench_function("replace_one_of_100", |b| {
        b.iter(|| {
            handle
                .add_or_replace("base50", vec![b'n'; 8192], &AddOptions::default())
                .unwrap();
            handle.close().unwrap()
        });
    });

    group.finish();
}

criterion_group!(benches, benchmark_classify, benchmark_reads, benchmark_commit);
criterion_main!(benches);
