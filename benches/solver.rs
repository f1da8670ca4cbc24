//! Criterion benchmarks for the network solver.
//!
//! Run with:
//!   cargo bench
//!   cargo bench --features parallel
//!
//! Results are saved to target/criterion/

use std::sync::Arc;

use criterion::{black_box, criterion_group, criterion_main, BenchmarkId, Criterion, Throughput};

use evonet::prelude::*;

const SENSORS: usize = 8;
const OUTPUTS: usize = 4;

/// Layered network of `layers` hidden layers, `width` nodes each, fully
/// connected between layers, with one recurrent link per hidden node.
fn make_network(width: usize, layers: usize, registry: &Arc<ActivatorRegistry>) -> Network {
    let mut g = Graph::new();
    let mut prev: Vec<NodeId> = (0..SENSORS)
        .map(|_| g.add_node(NeuronRole::Input, ActivationKind::Linear))
        .collect();
    prev.push(g.add_node(NeuronRole::Bias, ActivationKind::Linear));

    let kinds = [
        ActivationKind::SigmoidSteepened,
        ActivationKind::Tanh,
        ActivationKind::SigmoidBipolar,
        ActivationKind::GaussianBipolar,
    ];
    let mut k = 0usize;
    let mut weight = || {
        k += 1;
        (k as f64 * 0.618_033_988_7).fract() * 2.0 - 1.0
    };

    for layer in 0..layers {
        let current: Vec<NodeId> = (0..width)
            .map(|i| g.add_node(NeuronRole::Hidden, kinds[(layer + i) % kinds.len()]))
            .collect();
        for &to in &current {
            for &from in &prev {
                g.add_link(from, to, weight()).unwrap();
            }
            g.add_link(to, to, weight()).unwrap();
        }
        prev = current;
    }

    for _ in 0..OUTPUTS {
        let out = g.add_node(NeuronRole::Output, ActivationKind::SigmoidPlain);
        for &from in &prev {
            g.add_link(from, out, weight()).unwrap();
        }
    }

    Network::new(g, Arc::clone(registry))
}

fn inputs() -> Vec<f64> {
    (0..=SENSORS).map(|i| i as f64 / SENSORS as f64).collect()
}

/// Benchmark forward_steps() with varying layer widths.
fn bench_forward_sizes(c: &mut Criterion) {
    let mut group = c.benchmark_group("forward_width");
    let registry = Arc::new(ActivatorRegistry::new());

    for width in [8, 32, 128].iter() {
        group.throughput(Throughput::Elements((*width * 3) as u64));

        group.bench_with_input(BenchmarkId::new("scalar", width), width, |b, &width| {
            let mut net = make_network(width, 3, &registry);
            let depth = net.max_activation_depth();

            b.iter(|| {
                net.flush().unwrap();
                net.load_sensors(&inputs()).unwrap();
                black_box(net.forward_steps(depth).unwrap());
                black_box(net.read_outputs())
            });
        });
    }

    group.finish();
}

/// Benchmark forward rounds comparing execution tiers at a fixed size.
fn bench_forward_tiers(c: &mut Criterion) {
    let mut group = c.benchmark_group("forward_tier");
    let registry = Arc::new(ActivatorRegistry::new());

    for (name, tier) in [
        ("scalar_256", ExecutionTier::Scalar),
        // Falls back to scalar if feature not enabled.
        ("parallel_256", ExecutionTier::Parallel),
    ] {
        group.bench_function(name, |b| {
            let mut net = make_network(256, 3, &registry);
            net.set_execution_tier(tier);
            net.load_sensors(&inputs()).unwrap();

            b.iter(|| black_box(net.forward_steps(1).unwrap()));
        });
    }

    group.finish();
}

fn bench_recursive(c: &mut Criterion) {
    let mut group = c.benchmark_group("recursive");
    let registry = Arc::new(ActivatorRegistry::new());

    for width in [8, 32, 128].iter() {
        group.bench_with_input(BenchmarkId::new("pass", width), width, |b, &width| {
            let mut net = make_network(width, 3, &registry);
            net.load_sensors(&inputs()).unwrap();

            b.iter(|| black_box(net.recursive_steps().unwrap()));
        });
    }

    group.finish();
}

fn bench_relax(c: &mut Criterion) {
    let mut group = c.benchmark_group("relax");
    let registry = Arc::new(ActivatorRegistry::new());

    group.bench_function("width_32", |b| {
        let mut net = make_network(32, 3, &registry);

        b.iter(|| {
            net.flush().unwrap();
            net.load_sensors(&inputs()).unwrap();
            black_box(net.relax(50, 1e-6).unwrap())
        });
    });

    group.finish();
}

criterion_group!(
    benches,
    bench_forward_sizes,
    bench_forward_tiers,
    bench_recursive,
    bench_relax,
);

criterion_main!(benches);
