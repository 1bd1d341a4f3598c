use std::io::Write;

use archive::{gzip, inflate};
use criterion::{black_box, criterion_group, criterion_main, Criterion};
use flate2::{
    write::{DeflateEncoder, GzEncoder},
    Compression,
};

fn corpus() -> Vec<u8> {
    let words = [
        "huffman ", "canonical ", "window ", "distance ", "length ", "literal ", "block ",
        "stored ", "fixed ", "dynamic ",
    ];
    let mut state = 7u32;
    let mut data = Vec::with_capacity(1 << 20);
    while data.len() < 1 << 20 {
        state = state.wrapping_mul(1_103_515_245).wrapping_add(12_345);
        data.extend_from_slice(words[(state >> 16) as usize % words.len()].as_bytes());
    }
    data
}

pub fn criterion_benchmark(c: &mut Criterion) {
    let data = corpus();

    for level in [1, 6, 9] {
        let mut encoder = DeflateEncoder::new(Vec::new(), Compression::new(level));
        encoder.write_all(&data).unwrap();
        let compressed = encoder.finish().unwrap();

        c.bench_function(&format!("inflate level {level}"), |b| {
            b.iter(|| black_box(inflate(black_box(&compressed[..])).unwrap()))
        });
    }

    let mut encoder = GzEncoder::new(Vec::new(), Compression::default());
    encoder.write_all(&data).unwrap();
    let member = encoder.finish().unwrap();

    c.bench_function("gzip decompress", |b| {
        b.iter(|| {
            black_box(gzip::decompress(black_box(&member[..]), gzip::Options::default()).unwrap())
        })
    });
}

criterion_group!(benches, criterion_benchmark);
criterion_main!(benches);
