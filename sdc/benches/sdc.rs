use criterion::{black_box, criterion_group, criterion_main, Criterion};
use rand::prelude::*;
use rand_pcg::Pcg64Mcg;
use sdc::Array;

fn build(n: usize) -> (Array, Vec<u64>) {
    let mut rng = Pcg64Mcg::seed_from_u64(0xD00D_1234);
    let values: Vec<u64> = (0..n).map(|_| rng.gen_range(0..(1u64 << 40))).collect();
    let mut a = Array::new();
    for &v in &values { a.add(v); }
    (a, values)
}

pub fn add(c: &mut Criterion) {
    let mut rng = Pcg64Mcg::seed_from_u64(1);
    c.bench_function("add", |b| {
        let mut a = Array::new();
        b.iter(|| a.add(black_box(rng.gen_range(0..(1u64 << 40)))))
    });
}

pub fn get(c: &mut Criterion) {
    let (a, values) = build(100_000);
    let mut i = 0usize;
    c.bench_function("get", |b| b.iter(|| {
        i = (i + 1) % values.len();
        black_box(a.get_or_panic(black_box(i)))
    }));
}

pub fn iter(c: &mut Criterion) {
    let (a, _) = build(100_000);
    c.bench_function("iter", |b| b.iter(|| a.iter().fold(0u64, |acc, v| acc ^ black_box(v))));
}

criterion_group!(sdc_benches, add, get, iter);
criterion_main!(sdc_benches);
