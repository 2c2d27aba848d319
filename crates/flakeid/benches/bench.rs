use core::hint::black_box;
use criterion::{Criterion, Throughput, criterion_group, criterion_main};
use flakeid::{
    BusinessNoBuilder, CompactSequenceGenerator, FixedLayoutGenerator, SystemClock, TWEPOCH,
    TimeSource,
};
use std::{
    sync::{Arc, Barrier},
    thread::scope,
    time::Instant,
};

struct FixedMockTime {
    millis: u64,
}

impl TimeSource for FixedMockTime {
    fn current_millis(&self) -> u64 {
        self.millis
    }
}

// Number of IDs generated per benchmark iteration (per generator). With a
// fixed clock this is exactly one millisecond's worth of sequence, so the
// overflow spin is never entered.
const TOTAL_IDS: usize = 4096;

/// Benchmarks the hot path of a single caller.
fn bench_generator<G, R>(
    c: &mut Criterion,
    group_name: &str,
    generator_factory: impl Fn() -> G,
    next: impl Fn(&G) -> R,
) {
    let mut group = c.benchmark_group(group_name);
    group.throughput(Throughput::Elements(TOTAL_IDS as u64));

    group.bench_function(format!("elems/{TOTAL_IDS}"), |b| {
        b.iter_custom(|iters| {
            let start = Instant::now();

            for _ in 0..iters {
                let generator = generator_factory();
                for _ in 0..TOTAL_IDS {
                    black_box(next(&generator));
                }
            }

            start.elapsed()
        });
    });

    group.finish();
}

/// Benchmarks one generator shared across threads.
fn bench_generator_contended<G, R>(
    c: &mut Criterion,
    group_name: &str,
    generator_factory: impl Fn() -> G,
    next: impl Fn(&G) -> R + Sync,
) where
    G: Send + Sync,
{
    let mut group = c.benchmark_group(group_name);
    let max_threads = num_cpus::get().max(1);

    for thread_count in [1, 2, 4, 8, 16].into_iter().filter(|t| *t <= max_threads) {
        let ids_per_thread = TOTAL_IDS / thread_count;

        group.throughput(Throughput::Elements(TOTAL_IDS as u64));
        group.bench_function(
            format!("elems/{TOTAL_IDS}/threads/{thread_count}"),
            |b| {
                b.iter_custom(|iters| {
                    let start = Instant::now();

                    for _ in 0..iters {
                        let generator = Arc::new(generator_factory());
                        let barrier = Arc::new(Barrier::new(thread_count + 1));
                        scope(|s| {
                            for _ in 0..thread_count {
                                let generator = Arc::clone(&generator);
                                let barrier = Arc::clone(&barrier);
                                let next = &next;
                                s.spawn(move || {
                                    barrier.wait();
                                    for _ in 0..ids_per_thread {
                                        black_box(next(&generator));
                                    }
                                });
                            }
                            barrier.wait();
                        });
                    }

                    start.elapsed()
                });
            },
        );
    }

    group.finish();
}

fn benches_fixed(c: &mut Criterion) {
    bench_generator(
        c,
        "mono/fixed/mock",
        || FixedLayoutGenerator::new(1, 1, FixedMockTime { millis: TWEPOCH + 1 }).unwrap(),
        |g| g.next_id().unwrap(),
    );
    bench_generator(
        c,
        "mono/fixed/wallclock",
        || FixedLayoutGenerator::new(1, 1, SystemClock).unwrap(),
        |g| g.next_id().unwrap(),
    );
    bench_generator_contended(
        c,
        "mt/fixed/mock",
        || FixedLayoutGenerator::new(1, 1, FixedMockTime { millis: TWEPOCH + 1 }).unwrap(),
        |g| g.next_id().unwrap(),
    );
}

fn benches_compact(c: &mut Criterion) {
    bench_generator(
        c,
        "mono/compact/mock",
        || CompactSequenceGenerator::new(FixedMockTime { millis: TWEPOCH + 1 }),
        |g| g.next_sequence().unwrap(),
    );
    bench_generator(
        c,
        "mono/compact/wallclock",
        || CompactSequenceGenerator::new(SystemClock),
        |g| g.next_sequence().unwrap(),
    );
    bench_generator_contended(
        c,
        "mt/compact/wallclock",
        || CompactSequenceGenerator::new(SystemClock),
        |g| g.next_sequence().unwrap(),
    );
}

fn benches_business(c: &mut Criterion) {
    bench_generator(
        c,
        "mono/business/order_no",
        || BusinessNoBuilder::new(CompactSequenceGenerator::new(SystemClock)),
        |b| b.create_order_no("0003").unwrap(),
    );
}

criterion_group!(benches, benches_fixed, benches_compact, benches_business);
criterion_main!(benches);
