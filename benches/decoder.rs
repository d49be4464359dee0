#[macro_use]
extern crate criterion;

use criterion::{black_box, Criterion};
use flate2::Compression;

use etfpack::{encoding::compressed::compress_envelope, prelude::*};

const N_ARR: usize = 10;
const N_MAP: usize = 10;

fn big_v() -> Value {
    let v0: Vec<Value> = (0..N_ARR).map(|i| Value::from(i as i64 - 5)).collect();
    let m: VecMap<Value, Value> = (0..N_MAP)
        .map(|i| (Value::atom(format!("key_{}", i)), Value::from(v0.clone())))
        .collect();
    let v: Vec<Value> = std::iter::repeat(m).map(Value::from).take(N_ARR).collect();
    Value::from(v)
}

fn bench_dec(c: &mut Criterion) {
    let enc = encode_full(&big_v()).unwrap();
    c.bench_function(
        &format!("Decoding a Value, input size of {} bytes", enc.len()),
        move |b| b.iter(|| decode_full(black_box(&enc)).unwrap()),
    );
}

fn bench_dec_reused(c: &mut Criterion) {
    let enc = encode_full(&big_v()).unwrap();
    let mut codec = Codec::default();
    c.bench_function(
        &format!(
            "Decoding a Value, input size of {} bytes, decoder reused",
            enc.len()
        ),
        move |b| b.iter(|| codec.unpack(black_box(&enc)).unwrap()),
    );
}

fn bench_dec_compressed(c: &mut Criterion) {
    let enc = encode_full(&big_v()).unwrap();
    let packed = compress_envelope(&enc, Compression::default()).unwrap();
    c.bench_function(
        &format!(
            "Decoding a compressed Value, {} bytes inflating to {}",
            packed.len(),
            enc.len()
        ),
        move |b| b.iter(|| decode_full(black_box(&packed)).unwrap()),
    );
}

criterion_group!(benches, bench_dec, bench_dec_reused, bench_dec_compressed);
criterion_main!(benches);
