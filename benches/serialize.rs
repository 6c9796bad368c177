//! Benchmarks for the serializer (C9).
//!
//! Compares compact vs. indented serialization, and isolates the string
//! escaping fast path (no escapable bytes, so `escape_scan` runs to
//! completion in one pass) against a worst case where every other byte
//! needs escaping.

use criterion::{black_box, criterion_group, criterion_main, BenchmarkId, Criterion, Throughput};
use fastjson::{parse, serialize, serialize_pretty};

fn generate_document(element_count: usize) -> Vec<u8> {
    let mut s = String::from("[");
    for i in 0..element_count {
        if i > 0 {
            s.push(',');
        }
        s.push_str(&format!(r#"{{"id":{i},"name":"item-{i}","active":true,"tags":["a","b","c"]}}"#));
    }
    s.push(']');
    s.into_bytes()
}

fn bench_compact_vs_pretty(c: &mut Criterion) {
    let mut group = c.benchmark_group("serialize_compact_vs_pretty");
    for count in [10, 100, 1000] {
        let doc = generate_document(count);
        let value = parse(&doc).unwrap();
        group.throughput(Throughput::Elements(count as u64));

        group.bench_with_input(BenchmarkId::new("compact", count), &value, |b, value| {
            b.iter(|| serialize(black_box(value)));
        });
        group.bench_with_input(BenchmarkId::new("pretty", count), &value, |b, value| {
            b.iter(|| serialize_pretty(black_box(value), "  "));
        });
    }
    group.finish();
}

fn bench_string_escaping(c: &mut Criterion) {
    let mut group = c.benchmark_group("serialize_string_escaping");

    let plain = fastjson::Value::string("the quick brown fox jumps over the lazy dog ".repeat(100));
    group.throughput(Throughput::Bytes(plain.as_str().len() as u64));
    group.bench_function("no_escapes", |b| {
        b.iter(|| serialize(black_box(&plain)));
    });

    let heavy: String = std::iter::repeat("a\"").take(100).collect();
    let heavy = fastjson::Value::string(heavy);
    group.throughput(Throughput::Bytes(heavy.as_str().len() as u64));
    group.bench_function("every_other_byte_escaped", |b| {
        b.iter(|| serialize(black_box(&heavy)));
    });

    group.finish();
}

criterion_group!(benches, bench_compact_vs_pretty, bench_string_escaping);
criterion_main!(benches);
