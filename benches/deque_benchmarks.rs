//! Performance benchmarks for the blocking deque
//!
//! Compares dequex against the closest ecosystem primitives:
//! - crossbeam::queue::ArrayQueue (bounded, lock-free, non-blocking)
//! - crossbeam::channel::bounded (bounded, blocking)
//! - std::sync::mpsc::sync_channel (bounded, blocking, single consumer)

use criterion::{black_box, criterion_group, criterion_main, BenchmarkId, Criterion, Throughput};
use std::sync::{mpsc as std_mpsc, Arc};
use std::thread;

use dequex::BlockingDeque;

use crossbeam::channel::bounded as crossbeam_bounded;
use crossbeam::queue::ArrayQueue;

const OPERATIONS: usize = 100_000;
const CAPACITY: usize = 1024;
const THREAD_COUNTS: &[usize] = &[1, 2, 4];

fn bench_single_thread_throughput(c: &mut Criterion) {
    let mut group = c.benchmark_group("single_thread");
    group.throughput(Throughput::Elements(OPERATIONS as u64));

    group.bench_function("dequex_push_pop_back", |b| {
        let deque = BlockingDeque::new(CAPACITY);
        b.iter(|| {
            for i in 0..OPERATIONS {
                if deque.try_push_back(black_box(i)).is_err() {
                    deque.try_pop_front();
                }
            }
            while deque.try_pop_front().is_some() {}
        });
    });

    group.bench_function("dequex_push_front_pop_back", |b| {
        let deque = BlockingDeque::new(CAPACITY);
        b.iter(|| {
            for i in 0..OPERATIONS {
                if deque.try_push_front(black_box(i)).is_err() {
                    deque.try_pop_back();
                }
            }
            while deque.try_pop_back().is_some() {}
        });
    });

    group.bench_function("crossbeam_array_queue", |b| {
        let queue = ArrayQueue::new(CAPACITY);
        b.iter(|| {
            for i in 0..OPERATIONS {
                if queue.push(black_box(i)).is_err() {
                    queue.pop();
                }
            }
            while queue.pop().is_some() {}
        });
    });

    group.finish();
}

fn bench_producer_consumer(c: &mut Criterion) {
    let mut group = c.benchmark_group("producer_consumer");
    group.throughput(Throughput::Elements(OPERATIONS as u64));

    for &num_threads in THREAD_COUNTS {
        let per_thread = OPERATIONS / num_threads;

        group.bench_with_input(
            BenchmarkId::new("dequex", num_threads),
            &num_threads,
            |b, &num_threads| {
                b.iter(|| {
                    let deque = Arc::new(BlockingDeque::new(CAPACITY));

                    let producers: Vec<_> = (0..num_threads)
                        .map(|_| {
                            let deque = Arc::clone(&deque);
                            thread::spawn(move || {
                                for i in 0..per_thread {
                                    deque.put_back(black_box(i)).unwrap();
                                }
                            })
                        })
                        .collect();

                    let consumers: Vec<_> = (0..num_threads)
                        .map(|_| {
                            let deque = Arc::clone(&deque);
                            thread::spawn(move || {
                                for _ in 0..per_thread {
                                    black_box(deque.take_front().unwrap());
                                }
                            })
                        })
                        .collect();

                    for handle in producers.into_iter().chain(consumers) {
                        handle.join().unwrap();
                    }
                });
            },
        );

        group.bench_with_input(
            BenchmarkId::new("crossbeam_channel", num_threads),
            &num_threads,
            |b, &num_threads| {
                b.iter(|| {
                    let (tx, rx) = crossbeam_bounded(CAPACITY);

                    let producers: Vec<_> = (0..num_threads)
                        .map(|_| {
                            let tx = tx.clone();
                            thread::spawn(move || {
                                for i in 0..per_thread {
                                    tx.send(black_box(i)).unwrap();
                                }
                            })
                        })
                        .collect();

                    let consumers: Vec<_> = (0..num_threads)
                        .map(|_| {
                            let rx = rx.clone();
                            thread::spawn(move || {
                                for _ in 0..per_thread {
                                    black_box(rx.recv().unwrap());
                                }
                            })
                        })
                        .collect();

                    for handle in producers.into_iter().chain(consumers) {
                        handle.join().unwrap();
                    }
                });
            },
        );
    }

    group.bench_function("std_sync_channel_1", |b| {
        b.iter(|| {
            let (tx, rx) = std_mpsc::sync_channel(CAPACITY);

            let producer = thread::spawn(move || {
                for i in 0..OPERATIONS {
                    tx.send(black_box(i)).unwrap();
                }
            });

            for _ in 0..OPERATIONS {
                black_box(rx.recv().unwrap());
            }
            producer.join().unwrap();
        });
    });

    group.finish();
}

fn bench_drain(c: &mut Criterion) {
    let mut group = c.benchmark_group("drain");
    group.throughput(Throughput::Elements(CAPACITY as u64));

    group.bench_function("drain_into_full_deque", |b| {
        let deque = BlockingDeque::new(CAPACITY);
        b.iter(|| {
            for i in 0..CAPACITY {
                deque.try_push_back(i).unwrap();
            }
            let mut sink = Vec::with_capacity(CAPACITY);
            black_box(deque.drain_into(&mut sink));
        });
    });

    group.bench_function("pop_loop_full_deque", |b| {
        let deque = BlockingDeque::new(CAPACITY);
        b.iter(|| {
            for i in 0..CAPACITY {
                deque.try_push_back(i).unwrap();
            }
            while let Some(value) = deque.try_pop_front() {
                black_box(value);
            }
        });
    });

    group.finish();
}

criterion_group!(
    benches,
    bench_single_thread_throughput,
    bench_producer_consumer,
    bench_drain
);
criterion_main!(benches);
