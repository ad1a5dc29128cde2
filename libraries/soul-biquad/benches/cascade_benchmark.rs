//! Benchmarks for the Q30 biquad cascade
//!
//! Run with: cargo bench -p soul-biquad

use criterion::{black_box, criterion_group, criterion_main, BenchmarkId, Criterion, Throughput};
use soul_biquad::{Cascade, CascadeConfig, CheckMode};

/// Pseudo-random half-scale signal
fn generate_test_signal(len: usize) -> Vec<i64> {
    let mut seed: u64 = 76_465_367;
    (0..len)
        .map(|_| {
            seed = seed.wrapping_mul(6364136223846793005).wrapping_add(1442695040888963407);
            i64::from((seed >> 32) as u32 as i32) >> 1
        })
        .collect()
}

fn bench_check_modes(c: &mut Criterion) {
    let mut group = c.benchmark_group("q30_cascade");
    let input = generate_test_signal(4096);
    group.throughput(Throughput::Elements(input.len() as u64));

    for mode in [CheckMode::Strict, CheckMode::Debug] {
        let config = CascadeConfig::notch_bank_with_low_shelf().with_check_mode(mode);
        let mut cascade = Cascade::fixed(&config).unwrap();
        let mut buffer = input.clone();

        group.bench_function(BenchmarkId::new("8_sections", format!("{mode:?}")), |b| {
            b.iter(|| {
                buffer.copy_from_slice(&input);
                cascade.reset();
                cascade.process_in_place(black_box(&mut buffer)).unwrap();
            });
        });
    }

    group.finish();
}

fn bench_reference(c: &mut Criterion) {
    let mut group = c.benchmark_group("reference_cascade");
    let input: Vec<f64> = generate_test_signal(4096).into_iter().map(|x| x as f64).collect();
    group.throughput(Throughput::Elements(input.len() as u64));

    let mut cascade = Cascade::reference(&CascadeConfig::notch_bank_with_low_shelf());
    let mut buffer = input.clone();

    group.bench_function("8_sections", |b| {
        b.iter(|| {
            buffer.copy_from_slice(&input);
            cascade.reset();
            cascade.process_in_place(black_box(&mut buffer)).unwrap();
        });
    });

    group.finish();
}

criterion_group!(benches, bench_check_modes, bench_reference);
criterion_main!(benches);
