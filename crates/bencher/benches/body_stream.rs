use std::hint::black_box;
use std::sync::Arc;
use std::thread;

use bencher::TestCase;
use bytes::Bytes;
use criterion::{criterion_group, criterion_main, BatchSize, BenchmarkId, Criterion, Throughput};
use micro_body::body::{BodyInputStream, ByteAccumulator};
use micro_body::protocol::PayloadSize;

fn create_test_cases() -> Vec<TestCase> {
    vec![
        TestCase::small("small_body_1k_chunks", 1024),
        TestCase::normal("normal_body_8k_chunks", 8 * 1024),
        TestCase::normal("normal_body_512b_chunks", 512),
        TestCase::large("large_body_64k_chunks", 64 * 1024),
    ]
}

fn to_bytes(case: &TestCase) -> Vec<Bytes> {
    case.chunks().into_iter().map(Bytes::from).collect()
}

/// deliver every chunk first, then drain the body on the same thread
fn benchmark_feed_then_read(criterion: &mut Criterion) {
    let mut group = criterion.benchmark_group("feed_then_read");
    let stream = BodyInputStream::new();

    for case in create_test_cases() {
        group.throughput(Throughput::Bytes(case.total() as u64));
        group.bench_with_input(BenchmarkId::from_parameter(case.name()), &case, |b, case| {
            b.iter_batched(
                || to_bytes(case),
                |chunks| {
                    stream.wrap(ByteAccumulator::new());
                    stream.set_content_length(PayloadSize::Length(case.total() as u64));
                    for chunk in chunks {
                        stream.on_chunk(chunk);
                    }

                    let mut buf = [0u8; 8 * 1024];
                    let mut read = 0;
                    while let Some(n) = stream.read(&mut buf).expect("body should be readable") {
                        read += n;
                    }
                    stream.recycle();
                    black_box(read)
                },
                BatchSize::SmallInput,
            );
        });
    }

    group.finish();
}

/// a network thread delivers chunks while the consumer thread is blocked reading
fn benchmark_concurrent_read(criterion: &mut Criterion) {
    let mut group = criterion.benchmark_group("concurrent_read");

    for case in create_test_cases() {
        group.throughput(Throughput::Bytes(case.total() as u64));
        group.bench_with_input(BenchmarkId::from_parameter(case.name()), &case, |b, case| {
            b.iter_batched(
                || to_bytes(case),
                |chunks| {
                    let stream = Arc::new(BodyInputStream::new());
                    stream.wrap(ByteAccumulator::new());
                    stream.set_content_length(PayloadSize::Length(case.total() as u64));

                    let network = {
                        let stream = Arc::clone(&stream);
                        thread::spawn(move || {
                            for chunk in chunks {
                                stream.on_chunk(chunk);
                            }
                        })
                    };

                    let mut buf = [0u8; 8 * 1024];
                    let mut read = 0;
                    while let Some(n) = stream.read(&mut buf).expect("body should be readable") {
                        read += n;
                    }
                    network.join().expect("network thread should not panic");
                    black_box(read)
                },
                BatchSize::SmallInput,
            );
        });
    }

    group.finish();
}

criterion_group!(body_stream, benchmark_feed_then_read, benchmark_concurrent_read);
criterion_main!(body_stream);
