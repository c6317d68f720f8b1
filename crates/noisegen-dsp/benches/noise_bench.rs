// SPDX-License-Identifier: LGPL-3.0-or-later

//! Criterion benchmarks for the noise sources.

use criterion::{black_box, criterion_group, criterion_main, Criterion};
use noisegen_dsp::noise::generator::{NoiseColor, NoiseGenerator, NoiseGeneratorType};
use noisegen_dsp::noise::lcg::{Lcg, LcgDistribution};
use noisegen_dsp::noise::mls::Mls;
use noisegen_dsp::noise::velvet::{Velvet, VelvetType};

const BUF_SIZE: usize = 1024;

fn bench_lcg(c: &mut Criterion) {
    let mut group = c.benchmark_group("lcg");
    let mut output = vec![0.0f32; BUF_SIZE];

    for dist in [
        LcgDistribution::Uniform,
        LcgDistribution::Exponential,
        LcgDistribution::Triangular,
        LcgDistribution::Gaussian,
    ] {
        group.bench_function(dist.name(), |b| {
            let mut lcg = Lcg::new();
            lcg.init_with_seed(0x1234_5678);
            lcg.set_distribution(dist);
            b.iter(|| lcg.process_overwrite(black_box(&mut output)));
        });
    }

    group.finish();
}

fn bench_mls(c: &mut Criterion) {
    let mut output = vec![0.0f32; BUF_SIZE];
    c.bench_function("mls_64bit", |b| {
        let mut mls = Mls::new();
        mls.set_state(0xACE1);
        b.iter(|| mls.process_overwrite(black_box(&mut output)));
    });
}

fn bench_velvet(c: &mut Criterion) {
    let mut group = c.benchmark_group("velvet");
    let mut output = vec![0.0f32; BUF_SIZE];

    for ty in [VelvetType::Ovn, VelvetType::Ovna, VelvetType::Arn, VelvetType::Trn] {
        group.bench_function(ty.name(), |b| {
            let mut velvet = Velvet::new();
            velvet.init_with_seeds(7, 32, 0xBEEF);
            velvet.set_velvet_type(ty);
            velvet.set_window_width(48.0);
            b.iter(|| velvet.process_overwrite(black_box(&mut output)));
        });
    }

    group.finish();
}

fn bench_generator(c: &mut Criterion) {
    let mut group = c.benchmark_group("generator");
    let mut output = vec![0.0f32; BUF_SIZE];

    for color in [NoiseColor::White, NoiseColor::Pink] {
        group.bench_function(format!("lcg_{}", color.name()), |b| {
            let mut generator = NoiseGenerator::new();
            generator.init_with_seeds(64, 1, 2, 3, 32, 4);
            generator.set_sample_rate(48000.0);
            generator.set_generator(NoiseGeneratorType::Lcg);
            generator.set_noise_color(color);
            b.iter(|| generator.process_overwrite(black_box(&mut output)));
        });
    }

    group.finish();
}

criterion_group!(benches, bench_lcg, bench_mls, bench_velvet, bench_generator);
criterion_main!(benches);
