//! Extended Kalman filter over a user supplied non-linear process.

use cauchy::Scalar;
use ndarray_linalg::Lapack;

use crate::error::Result;
use crate::filter::decomposer::MatrixDecomposer;
use crate::filter::kalman::{Measurement, ProcessEstimate, TimeOrdering};
use crate::filter::kalman_common::EstimatorCore;
use crate::filter::kalman::nonlinear::{NonLinearEvolution, NonLinearProcess};
use crate::filter::traits::KalmanEstimator;

/// Extended Kalman filter with additive Gaussian noise
///
/// At every step the process model is asked for its evolution from the current estimate to
/// the time of the measurement. The predicted state is taken from the evolution as is, while
/// the covariance is propagated through the state transition matrix of the evolution:
/// `P⁻ = A·P·Aᵗ + Q`. The correction uses the linear measurement model carried by the
/// measurement itself, with the gain solved through the decomposer `D`.
///
/// The struct is generic with following type parameters:
/// - A represents the numeric type on which the algorithm is going to work
/// - P represents the process model
/// - D represents the decomposer used to solve for the Kalman gain
///
/// An example of how this would be used is as follows:
///
/// ```
/// // Here we estimate a constant from noisy observations of it. The process model keeps
/// // the state unchanged and adds a small amount of process noise at every step.
/// use ndarray::{arr1, arr2, Array1, Array2};
/// use kalman_estimation::filter::decomposer::CholeskyDecomposer;
/// use kalman_estimation::filter::kalman::{Measurement, ProcessEstimate};
/// use kalman_estimation::filter::kalman::nonlinear::{ExtendedKalmanEstimator, NonLinearEvolution};
/// use kalman_estimation::filter::traits::KalmanEstimator;
///
/// let process = |_previous_time: f64, previous_state: &Array1<f64>, current_time: f64| {
///     NonLinearEvolution::new(current_time,
///                             previous_state.clone(),
///                             Array2::eye(1),
///                             arr2(&[[1.0e-5]]))
/// };
/// let prior = ProcessEstimate::new(0.0, arr1(&[0.0]), arr2(&[[1.0]])).unwrap();
/// let decomposer = CholeskyDecomposer::new(1.0e-15, 1.0e-15).unwrap();
/// let mut estimator = ExtendedKalmanEstimator::new(decomposer, process, prior);
///
/// let measurements = [-0.35, -0.41, -0.37, -0.38].iter().enumerate().map(|(i, z)| {
///     Measurement::new((i + 1) as f64, arr1(&[*z]), arr2(&[[1.0]]), arr2(&[[0.01]])).unwrap()
/// });
/// let last = estimator
///     .estimate(measurements)
///     .collect::<Result<Vec<_>, _>>()
///     .unwrap()
///     .pop()
///     .unwrap();
/// assert!((last.state()[0] + 0.3775).abs() < 0.02);
/// ```
pub struct ExtendedKalmanEstimator<A, P, D>
where
    A: Scalar + Lapack,
    P: NonLinearProcess<A>,
    D: MatrixDecomposer<A>,
{
    process: P,
    core: EstimatorCore<A, D>,
}

impl<A, P, D> ExtendedKalmanEstimator<A, P, D>
where
    A: Scalar + Lapack,
    P: NonLinearProcess<A>,
    D: MatrixDecomposer<A>,
{
    /// Creates an estimator starting from the `initial` estimate. Measurement times have to
    /// be non-decreasing unless another ordering is set with `with_time_ordering`.
    pub fn new(decomposer: D, process: P, initial: ProcessEstimate<A>) -> Self {
        ExtendedKalmanEstimator {
            process,
            core: EstimatorCore::new(decomposer, initial),
        }
    }

    pub fn with_time_ordering(mut self, time_ordering: TimeOrdering) -> Self {
        self.core.set_time_ordering(time_ordering);
        self
    }

    pub fn process(&self) -> &P {
        &self.process
    }
}

impl<A, P, D> KalmanEstimator<A> for ExtendedKalmanEstimator<A, P, D>
where
    A: Scalar + Lapack,
    P: NonLinearProcess<A>,
    D: MatrixDecomposer<A>,
{
    fn estimation_step(&mut self, measurement: &Measurement<A>) -> Result<ProcessEstimate<A>> {
        self.core.check_time(measurement.time())?;

        let previous = self.core.corrected();
        let NonLinearEvolution {
            time,
            predicted_state,
            state_transition_matrix,
            process_noise_matrix,
        } = self
            .process
            .evolution(previous.time(), previous.state(), measurement.time());

        let predicted = self.core.predict(
            time,
            predicted_state,
            state_transition_matrix,
            process_noise_matrix,
        )?;
        let corrected = self.core.correct(&predicted, measurement)?;
        self.core.commit(predicted, corrected.clone());
        Ok(corrected)
    }

    fn predicted(&self) -> Option<&ProcessEstimate<A>> {
        self.core.predicted()
    }

    fn corrected(&self) -> &ProcessEstimate<A> {
        self.core.corrected()
    }
}
