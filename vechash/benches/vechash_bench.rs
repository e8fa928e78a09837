use criterion::{
    black_box, criterion_group, criterion_main, measurement::WallTime, BatchSize,
    BenchmarkGroup, BenchmarkId, Criterion,
};
use rand::{rngs::StdRng, Rng, SeedableRng};
use vechash::{callbacks, BucketMap, Sequence};

/// Element counts used by every group
const SIZES: [usize; 3] = [64, 1024, 16384];

/// Bucket counts tried for the hash table
const BUCKETS: [usize; 3] = [1, 64, 4096];

fn random_keys(n: usize) -> Vec<u64> {
    let mut rng = StdRng::seed_from_u64(0xbe_ac4);
    (0..n).map(|_| rng.gen()).collect()
}

fn sequence_bench(c: &mut Criterion) {
    let mut group = c.benchmark_group("sequence");
    bench_append(&mut group);
    bench_insert_front(&mut group);
    bench_sorted_search(&mut group);
    group.finish();
}

fn bench_append(group: &mut BenchmarkGroup<'_, WallTime>) {
    for n in SIZES {
        group.bench_with_input(BenchmarkId::new("append", n), &n, |b, &n| {
            b.iter(|| {
                let mut seq = Sequence::new().expect("u64 is not zero-sized");
                for i in 0..n as u64 {
                    seq.append(i);
                }
                seq
            });
        });
    }
}

fn bench_insert_front(group: &mut BenchmarkGroup<'_, WallTime>) {
    // Quadratic, so stop before the largest size
    for n in &SIZES[..2] {
        group.bench_with_input(BenchmarkId::new("insert_front", n), n, |b, &n| {
            b.iter(|| {
                let mut seq = Sequence::new().expect("u64 is not zero-sized");
                for i in 0..n as u64 {
                    seq.insert(i, 0);
                }
                seq
            });
        });
    }
}

fn bench_sorted_search(group: &mut BenchmarkGroup<'_, WallTime>) {
    for n in SIZES {
        let keys = random_keys(n);
        let mut seq = Sequence::with_capacity(n).expect("u64 is not zero-sized");
        for k in &keys {
            seq.append(*k);
        }
        seq.sort(callbacks::natural);
        group.bench_with_input(BenchmarkId::new("search_sorted", n), &keys, |b, keys| {
            b.iter(|| {
                for k in keys {
                    black_box(seq.search(k, callbacks::natural, 0, true));
                }
            });
        });
    }
}

fn bucket_map_bench(c: &mut Criterion) {
    let mut group = c.benchmark_group("bucket_map");
    let keys = random_keys(SIZES[1]);
    for buckets in BUCKETS {
        group.bench_with_input(BenchmarkId::new("enter", buckets), &buckets, |b, &buckets| {
            b.iter_batched(
                || {
                    BucketMap::new(buckets, callbacks::modulo::<u64>, callbacks::natural)
                        .expect("bucket count is nonzero")
                },
                |mut map| {
                    for k in &keys {
                        map.enter(*k);
                    }
                    map
                },
                BatchSize::SmallInput,
            );
        });

        let mut map = BucketMap::new(buckets, callbacks::hashed::<u64>, callbacks::natural)
            .expect("bucket count is nonzero");
        for k in &keys {
            map.enter(*k);
        }
        group.bench_with_input(BenchmarkId::new("lookup", buckets), &keys, |b, keys| {
            b.iter(|| {
                for k in keys {
                    black_box(map.lookup(k));
                }
            });
        });
    }
    group.finish();
}

criterion_group!(benches, sequence_bench, bucket_map_bench);
criterion_main!(benches);
