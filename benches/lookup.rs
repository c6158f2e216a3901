use std::collections::HashMap;

use criterion::{black_box, criterion_group, criterion_main, Criterion};
use perfmap::{PerfMapBuilder, SdbmHasher};

/// ISIN-shaped twelve-byte keys: two-letter prefix plus ten digits.
fn isin_keys(n: usize) -> Vec<String> {
    const PREFIXES: [&str; 4] = ["US", "DE", "FR", "GB"];
    (0..n)
        .map(|i| format!("{}{:010}", PREFIXES[i % PREFIXES.len()], i))
        .collect()
}

fn bench_lookup(c: &mut Criterion) {
    const N: usize = 10_000;
    let keys = isin_keys(N);
    let probes: Vec<&[u8]> = keys.iter().step_by(97).map(|k| k.as_bytes()).collect();

    // perfmap with both families; each lookup includes the caller-side key
    // comparison so the comparison against the maps below is fair.
    let builder = PerfMapBuilder::default();
    let table = builder.build(&keys[..]).expect("foldhash build");
    c.bench_function("perfmap_foldhash", |b| {
        b.iter(|| {
            for &probe in &probes {
                let i = table.lookup(probe, builder.hasher()) as usize;
                black_box(keys[i].as_bytes() == probe);
            }
        })
    });

    let sdbm = PerfMapBuilder::with_hasher(SdbmHasher);
    if let Ok(table) = sdbm.build(&keys[..]) {
        c.bench_function("perfmap_sdbm", |b| {
            b.iter(|| {
                for &probe in &probes {
                    let i = table.lookup(probe, sdbm.hasher()) as usize;
                    black_box(keys[i].as_bytes() == probe);
                }
            })
        });
    }

    let siphash_map: HashMap<&[u8], u32> = keys
        .iter()
        .enumerate()
        .map(|(i, k)| (k.as_bytes(), i as u32))
        .collect();
    c.bench_function("hashmap_siphash", |b| {
        b.iter(|| {
            for &probe in &probes {
                black_box(siphash_map.get(probe));
            }
        })
    });

    let mut foldhash_map: HashMap<&[u8], u32, foldhash::fast::RandomState> =
        HashMap::with_capacity_and_hasher(N, foldhash::fast::RandomState::default());
    for (i, k) in keys.iter().enumerate() {
        foldhash_map.insert(k.as_bytes(), i as u32);
    }
    c.bench_function("hashmap_foldhash", |b| {
        b.iter(|| {
            for &probe in &probes {
                black_box(foldhash_map.get(probe));
            }
        })
    });
}

criterion_group!(benches, bench_lookup);
criterion_main!(benches);
