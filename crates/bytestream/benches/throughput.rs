use bytestream_rs::{concat, flat, ByteStream, StreamError};
use criterion::{black_box, criterion_group, criterion_main, BenchmarkId, Criterion, Throughput};

const CONTENT_SIZE: usize = 64 * 1024;

fn content() -> Vec<u8> {
    (0..CONTENT_SIZE).map(|i| (i % 251) as u8).collect()
}

fn drain(stream: &mut ByteStream, buf: &mut [u8]) -> u64 {
    let mut total = 0u64;
    loop {
        match stream.read(buf) {
            Ok(n) => total += n as u64,
            Err(StreamError::EndOfStream) => return total,
            Err(e) => panic!("read failed: {e}"),
        }
    }
}

fn bench_flat_read(c: &mut Criterion) {
    let mut group = c.benchmark_group("flat_read");
    group.throughput(Throughput::Bytes(CONTENT_SIZE as u64));

    for buf_size in [64usize, 1024, 16 * 1024] {
        group.bench_with_input(
            BenchmarkId::from_parameter(format!("{}B_buffer", buf_size)),
            &buf_size,
            |b, &size| {
                let source = flat(content()).unwrap();
                let mut buf = vec![0u8; size];
                b.iter(|| {
                    let mut stream = source.clone();
                    black_box(drain(&mut stream, &mut buf));
                });
            },
        );
    }

    group.finish();
}

fn bench_concat_read(c: &mut Criterion) {
    let mut group = c.benchmark_group("concat_read");
    group.throughput(Throughput::Bytes(2 * CONTENT_SIZE as u64));

    group.bench_function("two_segments_1KiB_buffer", |b| {
        let first = flat(content()).unwrap();
        let second = flat(content()).unwrap();
        let mut buf = vec![0u8; 1024];
        b.iter(|| {
            let mut stream = concat(&first, &second).unwrap();
            black_box(drain(&mut stream, &mut buf));
        });
    });

    group.finish();
}

fn bench_clone_and_drop(c: &mut Criterion) {
    let mut group = c.benchmark_group("handles");

    group.bench_function("clone_drop", |b| {
        let source = flat(content()).unwrap();
        b.iter(|| {
            black_box(source.clone());
        });
    });

    group.bench_function("concat_construct", |b| {
        let first = flat(content()).unwrap();
        let second = flat(content()).unwrap();
        b.iter(|| {
            black_box(concat(&first, &second).unwrap());
        });
    });

    group.finish();
}

criterion_group!(benches, bench_flat_read, bench_concat_read, bench_clone_and_drop);
criterion_main!(benches);
