use criterion::{black_box, criterion_group, criterion_main, Criterion};
use kalman_estimation::filter::decomposer::CholeskyDecomposer;
use kalman_estimation::filter::kalman::nonlinear::{ExtendedKalmanEstimator, NonLinearEvolution};
use kalman_estimation::filter::kalman::{Measurement, ProcessEstimate};
use kalman_estimation::filter::traits::KalmanEstimator;
use ndarray::{Array1, Array2};

fn measurements(count: usize, dimension: usize) -> Vec<Measurement<f64>> {
    (1..=count)
        .map(|i| {
            Measurement::new(
                i as f64,
                Array1::from_elem(dimension, (i as f64).sin()),
                Array2::eye(dimension),
                Array2::eye(dimension),
            )
            .unwrap()
        })
        .collect()
}

pub fn extended_kalman_estimation_benchmark(c: &mut Criterion) {
    let dimension = 8;
    let inputs = measurements(1000, dimension);
    c.bench_function("Extended Kalman estimation of 1000 measurements of size 8", |b| {
        b.iter(|| {
            let process = |_previous_time: f64, previous_state: &Array1<f64>, current_time: f64| {
                NonLinearEvolution::new(
                    current_time,
                    previous_state.clone(),
                    Array2::eye(dimension),
                    Array2::eye(dimension) * 1.0e-3,
                )
            };
            let prior =
                ProcessEstimate::new(0.0, Array1::zeros(dimension), Array2::eye(dimension))
                    .unwrap();
            let mut estimator = ExtendedKalmanEstimator::new(
                CholeskyDecomposer::new(1.0e-15, 1.0e-15).unwrap(),
                process,
                prior,
            );
            estimator
                .estimate(black_box(inputs.clone()))
                .for_each(|estimate| {
                    black_box(estimate.unwrap());
                })
        })
    });
}

pub fn extended_kalman_step_benchmark(c: &mut Criterion) {
    let dimension = 8;
    let process = |_previous_time: f64, previous_state: &Array1<f64>, current_time: f64| {
        NonLinearEvolution::new(
            current_time,
            previous_state.clone(),
            Array2::eye(dimension),
            Array2::eye(dimension) * 1.0e-3,
        )
    };
    let prior = ProcessEstimate::new(0.0, Array1::zeros(dimension), Array2::eye(dimension)).unwrap();
    let mut estimator = ExtendedKalmanEstimator::new(
        CholeskyDecomposer::new(1.0e-15, 1.0e-15).unwrap(),
        process,
        prior,
    );
    let measurement = &measurements(1, dimension)[0];
    c.bench_function("Extended Kalman single estimation step of size 8", |b| {
        b.iter(|| black_box(estimator.estimation_step(black_box(measurement)).unwrap()))
    });
}

criterion_group!(estimation, extended_kalman_estimation_benchmark);
criterion_group!(step, extended_kalman_step_benchmark);
criterion_main!(estimation, step);
