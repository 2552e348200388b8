use criterion::{BenchmarkId, Criterion, Throughput, criterion_group, criterion_main};
use oxigz::{GzipReader, compress, decompress};
use std::hint::black_box;
use std::io::Cursor;

/// Line-oriented text, the typical content of a gzipped log.
fn log_lines(size: usize) -> Vec<u8> {
    let mut data = Vec::with_capacity(size + 64);
    let mut n = 0u32;
    while data.len() < size {
        let line = format!("2024-01-01T00:00:{:02} request id={} status=200\n", n % 60, n);
        data.extend_from_slice(line.as_bytes());
        n += 1;
    }
    data.truncate(size);
    data
}

fn bench_compress(c: &mut Criterion) {
    let mut group = c.benchmark_group("gzip_compress");

    for size in [1_000, 100_000, 1_000_000] {
        let data = log_lines(size);
        group.throughput(Throughput::Bytes(size as u64));

        for level in [1u8, 6, 9] {
            let id = BenchmarkId::new(format!("level_{level}"), size);
            group.bench_with_input(id, &data, |b, data| {
                b.iter(|| {
                    let compressed = compress(data, level).expect("compression failed");
                    black_box(compressed);
                });
            });
        }
    }

    group.finish();
}

fn bench_decompress(c: &mut Criterion) {
    let mut group = c.benchmark_group("gzip_decompress");

    for size in [1_000, 100_000, 1_000_000] {
        let data = log_lines(size);
        let compressed = compress(&data, 6).expect("compression failed");
        group.throughput(Throughput::Bytes(size as u64));

        group.bench_with_input(BenchmarkId::new("read_all", size), &compressed, |b, compressed| {
            b.iter(|| {
                let out = decompress(compressed).expect("decompression failed");
                black_box(out);
            });
        });

        group.bench_with_input(BenchmarkId::new("readline", size), &compressed, |b, compressed| {
            b.iter(|| {
                let mut reader = GzipReader::new(Cursor::new(compressed.as_slice()));
                let mut lines = 0usize;
                while !reader.readline(None).expect("readline failed").is_empty() {
                    lines += 1;
                }
                black_box(lines);
            });
        });
    }

    group.finish();
}

criterion_group!(benches, bench_compress, bench_decompress);
criterion_main!(benches);
