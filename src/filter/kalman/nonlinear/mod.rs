//! This module contains the extended Kalman filter, which linearizes a non-linear process
//! around the previous estimate at every step.

pub mod extended;

use cauchy::Scalar;
use ndarray::{Array1, Array2};
use ndarray_linalg::Lapack;

pub use extended::ExtendedKalmanEstimator;

/// Linearization of a non-linear process over one transition.
///
/// It holds the time it is valid for, the state predicted by the process model, the
/// jacobian of the process model with respect to the previous state, and the process noise
/// covariance accumulated over the transition.
#[derive(Debug, Clone, PartialEq)]
pub struct NonLinearEvolution<A: Scalar + Lapack> {
    time: f64,
    predicted_state: Array1<A>,
    state_transition_matrix: Array2<A>,
    process_noise_matrix: Array2<A>,
}

impl<A: Scalar + Lapack> NonLinearEvolution<A> {
    pub fn new(
        time: f64,
        predicted_state: Array1<A>,
        state_transition_matrix: Array2<A>,
        process_noise_matrix: Array2<A>,
    ) -> Self {
        NonLinearEvolution {
            time,
            predicted_state,
            state_transition_matrix,
            process_noise_matrix,
        }
    }

    pub fn time(&self) -> f64 {
        self.time
    }

    pub fn predicted_state(&self) -> &Array1<A> {
        &self.predicted_state
    }

    pub fn state_transition_matrix(&self) -> &Array2<A> {
        &self.state_transition_matrix
    }

    pub fn process_noise_matrix(&self) -> &Array2<A> {
        &self.process_noise_matrix
    }
}

/// Non-linear process model
///
/// The process is asked for its evolution from the previous estimate to the time of each
/// measurement, strictly in measurement order. Any closure taking
/// `(previous_time, previous_state, current_time)` and returning a `NonLinearEvolution` is
/// a `NonLinearProcess`.
pub trait NonLinearProcess<A: Scalar + Lapack> {
    fn evolution(
        &mut self,
        previous_time: f64,
        previous_state: &Array1<A>,
        current_time: f64,
    ) -> NonLinearEvolution<A>;
}

impl<A, F> NonLinearProcess<A> for F
where
    A: Scalar + Lapack,
    F: FnMut(f64, &Array1<A>, f64) -> NonLinearEvolution<A>,
{
    fn evolution(
        &mut self,
        previous_time: f64,
        previous_state: &Array1<A>,
        current_time: f64,
    ) -> NonLinearEvolution<A> {
        self(previous_time, previous_state, current_time)
    }
}
