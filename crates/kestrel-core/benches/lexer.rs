//! Front-end throughput benchmarks
//!
//! Measures tokenization of a generated script and regexp compilation.

use std::hint::black_box;

use criterion::{BenchmarkId, Criterion, Throughput, criterion_group, criterion_main};
use kestrel_core::lexer::tokenize;
use kestrel_core::regexp;

/// A script of `functions` small functions mixing names, numbers and strings.
fn generate_source(functions: usize) -> Vec<u16> {
    let mut source = String::new();
    for i in 0..functions {
        source.push_str(&format!(
            "function f{i}(a, b) {{\n  var s = 'item\\t{i}';\n  /* {i} */ return a * 0x{i:x} + b / 1.5e3 - {i};\n}}\n"
        ));
    }
    source.encode_utf16().collect()
}

fn bench_tokenize(c: &mut Criterion) {
    let mut group = c.benchmark_group("tokenize");
    for functions in [10, 100, 1000] {
        let source = generate_source(functions);
        group.throughput(Throughput::Elements(source.len() as u64));
        group.bench_with_input(BenchmarkId::from_parameter(functions), &source, |b, source| {
            b.iter(|| tokenize(black_box(source), false).unwrap())
        });
    }
    group.finish();
}

fn bench_regexp_compile(c: &mut Criterion) {
    let patterns = [
        ("simple", "abc"),
        ("email", r"^[\w.+-]+@[\w-]+\.[\w.]+$"),
        ("nested", "((a|b)*(?:c{2,5}d?)+)(?=e)"),
    ];
    let mut group = c.benchmark_group("regexp_compile");
    for (name, pattern) in patterns {
        group.bench_function(name, |b| b.iter(|| regexp::compile(black_box(pattern), "g").unwrap()));
    }
    group.finish();
}

criterion_group!(benches, bench_tokenize, bench_regexp_compile);
criterion_main!(benches);
