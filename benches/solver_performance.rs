//! Performance benchmarks for the digester simulation
//!
//! # What We're Measuring
//!
//! 1. **Rate evaluation**: one call of `compute_physics` on the 29-variable
//!    network, the innermost cost of every solver operation
//! 2. **Jacobian**: one forward-difference Jacobian (30 rate evaluations)
//! 3. **Full solve**: the 30-day food-waste run, by tolerance
//!
//! # Running Benchmarks
//!
//! ```bash
//! # Run all benchmarks
//! cargo bench --bench solver_performance
//!
//! # Only the full solves
//! cargo bench --bench solver_performance "BDF solve"
//! ```
//!
//! # Understanding Results
//!
//! A full solve costs roughly `nfev` rate evaluations plus `nlu` 29x29 LU
//! factorisations. If the solve time grows much faster than `nfev` when
//! tightening the tolerance, the Jacobian is being refreshed too often.

use adm1_rs::models::Adm1Model;
use adm1_rs::parameters::ParameterStore;
use adm1_rs::physics::PhysicalModel;
use adm1_rs::solver::linalg::{finite_difference_jacobian, jacobian_threshold};
use adm1_rs::solver::{BdfSolver, Scenario, Solver, SolverConfiguration, TimeSpan};
use criterion::{criterion_group, criterion_main, BenchmarkId, Criterion, SamplingMode};
use std::hint::black_box;
use std::time::Duration;

fn food_waste() -> Adm1Model {
    match ParameterStore::builtin().build_model("food_waste") {
        Ok(model) => model,
        Err(error) => panic!("shipped preset must build: {}", error),
    }
}

/// Cost of one right-hand side evaluation
fn benchmark_rate_evaluation(c: &mut Criterion) {
    let model = food_waste();
    let state = model.setup_initial_state();

    c.bench_function("ADM1 rate evaluation", |b| {
        b.iter(|| model.compute_physics(black_box(0.0), black_box(&state)))
    });
}

/// Cost of one finite-difference Jacobian
fn benchmark_jacobian(c: &mut Criterion) {
    let model = food_waste();
    let state = model.setup_initial_state();
    let f0 = model.compute_physics(0.0, &state);
    let threshold = jacobian_threshold(1e-6, 1e-8);

    c.bench_function("ADM1 Jacobian", |b| {
        b.iter(|| {
            finite_difference_jacobian(
                |t, y| model.compute_physics(t, y),
                black_box(0.0),
                black_box(&state),
                black_box(&f0),
                threshold,
            )
        })
    });
}

/// Full 30-day solve at several relative tolerances
fn benchmark_full_solve(c: &mut Criterion) {
    let mut group = c.benchmark_group("BDF solve");
    group.sampling_mode(SamplingMode::Flat);
    group.sample_size(10);
    group.measurement_time(Duration::from_secs(20));

    let scenario = Scenario::from_model(food_waste(), TimeSpan::from_zero(30.0));
    let solver = BdfSolver::new();

    for rtol in [1e-4, 1e-6, 1e-8].iter() {
        group.bench_with_input(BenchmarkId::new("food_waste_30d", rtol), rtol, |b, &rtol| {
            // Setup phase (NOT measured by criterion)
            let config = SolverConfiguration::default().with_tolerances(rtol, rtol * 1e-2);

            b.iter(|| {
                let result = solver.solve(black_box(&scenario), black_box(&config));
                assert!(result.success, "{}", result.message);
                result
            });
        });
    }

    group.finish();
}

criterion_group!(benches, benchmark_rate_evaluation, benchmark_jacobian, benchmark_full_solve);
criterion_main!(benches);
