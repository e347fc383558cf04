//! Regular Kalman filter over a linear process, optionally driven by a control input.

pub mod estimator;

use cauchy::Scalar;
use ndarray::{Array1, Array2};
use ndarray_linalg::Lapack;

pub use estimator::LinearKalmanEstimator;

/// Linear model of one transition of the process.
///
/// The predicted state is `A·x` or, when a control input is attached with `with_control`,
/// `A·x + B·u`.
#[derive(Debug, Clone, PartialEq)]
pub struct LinearEvolution<A: Scalar + Lapack> {
    state_transition_matrix: Array2<A>,
    control: Option<(Array2<A>, Array1<A>)>,
    process_noise_matrix: Array2<A>,
}

impl<A: Scalar + Lapack> LinearEvolution<A> {
    pub fn new(state_transition_matrix: Array2<A>, process_noise_matrix: Array2<A>) -> Self {
        LinearEvolution {
            state_transition_matrix,
            control: None,
            process_noise_matrix,
        }
    }

    /// Attaches the control matrix `B` and the command `u`.
    pub fn with_control(mut self, control_matrix: Array2<A>, command: Array1<A>) -> Self {
        self.control = Some((control_matrix, command));
        self
    }

    pub fn state_transition_matrix(&self) -> &Array2<A> {
        &self.state_transition_matrix
    }

    pub fn control_matrix(&self) -> Option<&Array2<A>> {
        self.control.as_ref().map(|(matrix, _)| matrix)
    }

    pub fn command(&self) -> Option<&Array1<A>> {
        self.control.as_ref().map(|(_, command)| command)
    }

    pub fn process_noise_matrix(&self) -> &Array2<A> {
        &self.process_noise_matrix
    }
}

/// Linear process model
///
/// Any closure taking `(previous_time, previous_state, current_time)` and returning a
/// `LinearEvolution` is a `LinearProcess`. The previous state is provided so that
/// models may schedule their matrices on it, but the prediction itself stays linear.
pub trait LinearProcess<A: Scalar + Lapack> {
    fn evolution(
        &mut self,
        previous_time: f64,
        previous_state: &Array1<A>,
        current_time: f64,
    ) -> LinearEvolution<A>;
}

impl<A, F> LinearProcess<A> for F
where
    A: Scalar + Lapack,
    F: FnMut(f64, &Array1<A>, f64) -> LinearEvolution<A>,
{
    fn evolution(
        &mut self,
        previous_time: f64,
        previous_state: &Array1<A>,
        current_time: f64,
    ) -> LinearEvolution<A> {
        self(previous_time, previous_state, current_time)
    }
}
