//! Criterion micro-benchmarks for GARET generation and greedy backups.

use std::hint::black_box;

use criterion::{criterion_group, criterion_main, Criterion};
use diffvi_algorithms::{AlgorithmFactory, AlgorithmInit, AlgorithmSpec};
use diffvi_envs::{garet, GaretParams, GARET1, GARET_100};
use ndarray::Array1;

fn bench_create(c: &mut Criterion) {
    let mut group = c.benchmark_group("garet_create");
    for (name, params) in [("garet1", GARET1), ("garet_100", GARET_100)] {
        group.bench_function(format!("{name}_f32"), |b| {
            b.iter(|| garet::create::<f32>(black_box(&params)).unwrap());
        });
        group.bench_function(format!("{name}_f64"), |b| {
            b.iter(|| garet::create::<f64>(black_box(&params)).unwrap());
        });
    }
    let dense = GaretParams {
        branching_factor: 100,
        ..GARET_100
    };
    group.bench_function("garet_100_dense_f64", |b| {
        b.iter(|| garet::create::<f64>(black_box(&dense)).unwrap());
    });
    group.finish();
}

fn bench_control_update(c: &mut Criterion) {
    let mdp = garet::create::<f64>(&GARET_100).unwrap();
    let spec = AlgorithmSpec::Dvi {
        beta: 0.1,
        initial_r_bar: 0.0,
    };
    for synchronized in [true, false] {
        let mut alg = spec
            .build(AlgorithmInit {
                environment: &mdp,
                initial_values: Array1::zeros(mdp.num_states()),
                step_size: 0.1,
                synchronized,
            })
            .unwrap();
        let name = if synchronized {
            "dvi_control_update_sync"
        } else {
            "dvi_control_update_async"
        };
        c.bench_function(name, |b| {
            b.iter(|| black_box(alg.update()));
        });
    }
}

criterion_group!(benches, bench_create, bench_control_update);
criterion_main!(benches);
