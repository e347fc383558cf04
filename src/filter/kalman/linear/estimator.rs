use cauchy::Scalar;
use ndarray_linalg::Lapack;
use std::ops::AddAssign;

use crate::error::Result;
use crate::filter::decomposer::MatrixDecomposer;
use crate::filter::kalman::linear::{LinearEvolution, LinearProcess};
use crate::filter::kalman::{Measurement, ProcessEstimate, TimeOrdering};
use crate::filter::kalman_common::{check_matrix, check_vector, EstimatorCore};
use crate::filter::traits::KalmanEstimator;

/// Basic linear Kalman filtering algorithm
///
/// The process is propagated with the matrices of the `LinearEvolution` returned by the
/// process model for each measurement: `x⁻ = A·x (+ B·u)` and `P⁻ = A·P·Aᵗ + Q`. The
/// correction is the same as for the extended filter.
///
/// ```
/// use ndarray::{arr1, arr2, Array1};
/// use kalman_estimation::filter::decomposer::CholeskyDecomposer;
/// use kalman_estimation::filter::kalman::{Measurement, ProcessEstimate};
/// use kalman_estimation::filter::kalman::linear::{LinearEvolution, LinearKalmanEstimator};
/// use kalman_estimation::filter::traits::KalmanEstimator;
///
/// // position and velocity of a cart pushed with a known unit acceleration
/// let process = |previous_time: f64, _previous_state: &Array1<f64>, current_time: f64| {
///     let dt = current_time - previous_time;
///     LinearEvolution::new(arr2(&[[1.0, dt], [0.0, 1.0]]), arr2(&[[0.0, 0.0], [0.0, 0.0]]))
///         .with_control(arr2(&[[0.5 * dt * dt], [dt]]), arr1(&[1.0]))
/// };
/// let prior = ProcessEstimate::new(0.0, arr1(&[0.0, 0.0]), arr2(&[[1.0, 0.0], [0.0, 1.0]])).unwrap();
/// let mut estimator = LinearKalmanEstimator::new(CholeskyDecomposer::new(1.0e-15, 1.0e-15).unwrap(),
///                                                process,
///                                                prior);
/// let corrected = estimator
///     .estimation_step(&Measurement::new(1.0, arr1(&[0.5]), arr2(&[[1.0, 0.0]]), arr2(&[[1.0]])).unwrap())
///     .unwrap();
/// assert!((corrected.state()[0] - 0.5).abs() < 1.0e-12);
/// assert!((corrected.state()[1] - 1.0).abs() < 1.0e-12);
/// ```
pub struct LinearKalmanEstimator<A, P, D>
where
    A: Scalar + Lapack,
    P: LinearProcess<A>,
    D: MatrixDecomposer<A>,
{
    process: P,
    core: EstimatorCore<A, D>,
}

impl<A, P, D> LinearKalmanEstimator<A, P, D>
where
    A: Scalar + Lapack,
    P: LinearProcess<A>,
    D: MatrixDecomposer<A>,
{
    pub fn new(decomposer: D, process: P, initial: ProcessEstimate<A>) -> Self {
        LinearKalmanEstimator {
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

impl<A, P, D> KalmanEstimator<A> for LinearKalmanEstimator<A, P, D>
where
    A: Scalar + Lapack,
    P: LinearProcess<A>,
    D: MatrixDecomposer<A>,
{
    fn estimation_step(&mut self, measurement: &Measurement<A>) -> Result<ProcessEstimate<A>> {
        self.core.check_time(measurement.time())?;

        let previous = self.core.corrected();
        let n = previous.dimension();
        let LinearEvolution {
            state_transition_matrix,
            control,
            process_noise_matrix,
        } = self
            .process
            .evolution(previous.time(), previous.state(), measurement.time());

        check_matrix("state transition matrix", &state_transition_matrix, (n, n))?;
        let mut predicted_state = state_transition_matrix.dot(previous.state());
        if let Some((control_matrix, command)) = control {
            check_matrix(
                "control matrix",
                &control_matrix,
                (n, control_matrix.ncols()),
            )?;
            check_vector("command", &command, control_matrix.ncols())?;
            predicted_state.add_assign(&control_matrix.dot(&command));
        }

        let predicted = self.core.predict(
            measurement.time(),
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
