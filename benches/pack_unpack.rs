//! Benchmark: streaming pack (re-parse per call) vs compiled pack/unpack over
//! a protocol-header-like format, plus compile itself.

use bitsyntax::{compile, pack, unpack, Value};
use criterion::{black_box, criterion_group, criterion_main, Criterion};

// Shaped like an IPv4 header plus a payload: bit fields, whole-byte fields,
// a little endian field, and a trailing byte string.
const HEADER_FMT: &str = "4:int, 4:int, 8:int, 16:int:big, 16:int, 3:int, \
                          13:int, 8:int, 8:int, 16:int, 32:int, 32:int:little, all:bin";

fn header_values(payload: &[u8]) -> Vec<Value> {
    vec![
        Value::Int(4),
        Value::Int(5),
        Value::Int(0),
        Value::Int(1500),
        Value::Int(0x1234),
        Value::Int(0b010),
        Value::Int(185),
        Value::Int(64),
        Value::Int(17),
        Value::Int(0xBEEF),
        Value::Int(0xC0A80001),
        Value::Int(0xC0A800FE),
        Value::Bytes(payload.to_vec()),
    ]
}

fn bench_pack_unpack(c: &mut Criterion) {
    let payload = vec![0xA5u8; 1024];
    let values = header_values(&payload);
    let spec = compile(HEADER_FMT).expect("compile");
    let packed = spec.pack(&values).expect("pack");
    let unpack_fmt = HEADER_FMT.replace("all:bin", "rest:bin");

    c.bench_function("compile_header_fmt", |b| {
        b.iter(|| compile(black_box(HEADER_FMT)).expect("compile"))
    });

    c.bench_function("pack_streaming", |b| {
        b.iter(|| pack(black_box(HEADER_FMT), black_box(&values)).expect("pack"))
    });

    c.bench_function("pack_compiled", |b| {
        b.iter(|| spec.pack(black_box(&values)).expect("pack"))
    });

    c.bench_function("unpack_streaming", |b| {
        b.iter(|| unpack(black_box(&unpack_fmt), black_box(&packed)).expect("unpack"))
    });

    c.bench_function("unpack_compiled", |b| {
        let spec = compile(&unpack_fmt).expect("compile");
        b.iter(|| spec.unpack(black_box(&packed)).expect("unpack"))
    });

    // Worst case for the merge: every byte of a long string lands mid-byte.
    c.bench_function("pack_unaligned_bin", |b| {
        let values = [Value::Int(1), Value::Bytes(payload.clone())];
        b.iter(|| pack(black_box("1:int, all:bin"), black_box(&values)).expect("pack"))
    });
}

criterion_group!(benches, bench_pack_unpack);
criterion_main!(benches);
