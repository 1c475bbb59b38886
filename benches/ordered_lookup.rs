//! Benchmarks for ordered key index lookups (exact, shorter-prefix, regex).
//!
//! Run with: cargo bench --bench ordered_lookup

use criterion::{black_box, criterion_group, criterion_main, BenchmarkId, Criterion, Throughput};
use jisho_core::index::OrderedKeyIndex;
use jisho_core::types::Location;
use std::collections::HashMap;

// =============================================================================
// Helpers
// =============================================================================

const SYLLABLES: [char; 12] = ['あ', 'い', 'う', 'か', 'き', 'く', 'さ', 'し', 'た', 'な', 'ま', 'ん'];

/// Deterministic kana keys of 1..=4 characters, `n` of them.
fn synthetic_index(n: usize) -> OrderedKeyIndex {
    let mut map: HashMap<String, Vec<Location>> = HashMap::with_capacity(n);
    let mut seed = n as u64;

    for i in 0..n {
        seed = seed.wrapping_mul(6364136223846793005).wrapping_add(1442695040888963407);
        let len = 1 + (seed >> 60) as usize % 4;
        let key: String = (0..len)
            .map(|j| SYLLABLES[((seed >> (j * 8)) % SYLLABLES.len() as u64) as usize])
            .collect();
        map.entry(key).or_default().push(Location::new(i as u64 * 256, 256));
    }

    OrderedKeyIndex::from_map(map)
}

// =============================================================================
// Benchmarks
// =============================================================================

fn bench_exact(c: &mut Criterion) {
    let mut group = c.benchmark_group("ordered_exact");

    for &n in &[1_000usize, 100_000] {
        let index = synthetic_index(n);
        let keys: Vec<String> = index.keys().take(64).map(str::to_string).collect();

        group.throughput(Throughput::Elements(keys.len() as u64));
        group.bench_with_input(BenchmarkId::from_parameter(n), &keys, |b, keys| {
            b.iter(|| {
                for key in keys {
                    black_box(index.get(black_box(key)));
                }
            });
        });
    }

    group.finish();
}

fn bench_shorter(c: &mut Criterion) {
    let index = synthetic_index(100_000);

    c.bench_function("ordered_shorter_miss", |b| {
        b.iter(|| black_box(index.get(black_box("かきくけこさしすせそ"))));
    });
}

fn bench_regex(c: &mut Criterion) {
    let index = synthetic_index(100_000);

    c.bench_function("ordered_regex_scan", |b| {
        b.iter(|| black_box(index.regex_search(black_box("か.さ")).unwrap_or_default()));
    });
}

criterion_group!(benches, bench_exact, bench_shorter, bench_regex);
criterion_main!(benches);
