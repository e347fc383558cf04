use cauchy::Scalar;
use ndarray::{Array1, Array2};
use ndarray_linalg::Lapack;

use crate::error::{FilterError, Result};

/// Snapshot of a filtered process at a given time.
///
/// A `ProcessEstimate` holds the estimated state, its error covariance and, when it was
/// produced by an estimator, the matrices used by the step which produced it:
///
/// * predicted (a-priori) estimates carry the state transition matrix,
/// * corrected (a-posteriori) estimates carry the state transition matrix, the measurement
///   jacobian, the innovation covariance and the Kalman gain.
///
/// Estimates are never modified once emitted; every step of an estimator produces new ones.
#[derive(Debug, Clone, PartialEq)]
pub struct ProcessEstimate<A: Scalar + Lapack> {
    time: f64,
    state: Array1<A>,
    covariance: Array2<A>,
    pub(in crate) state_transition_matrix: Option<Array2<A>>,
    pub(in crate) measurement_jacobian: Option<Array2<A>>,
    pub(in crate) innovation_covariance: Option<Array2<A>>,
    pub(in crate) kalman_gain: Option<Array2<A>>,
}

impl<A: Scalar + Lapack> ProcessEstimate<A> {
    /// Creates a prior estimate.
    ///
    /// The covariance has to be square and of the same order as the length of the state,
    /// and the time has to be finite; otherwise a `FilterError::Configuration` is returned.
    ///
    /// ```
    /// use ndarray::{arr1, arr2};
    /// use kalman_estimation::filter::kalman::ProcessEstimate;
    ///
    /// let prior = ProcessEstimate::new(0.0, arr1(&[10.0]), arr2(&[[1.0e-5]])).unwrap();
    /// assert_eq!(prior.dimension(), 1);
    /// assert!(ProcessEstimate::new(0.0, arr1(&[10.0, 0.0]), arr2(&[[1.0e-5]])).is_err());
    /// ```
    pub fn new(time: f64, state: Array1<A>, covariance: Array2<A>) -> Result<Self> {
        if !time.is_finite() {
            return Err(FilterError::Configuration(format!(
                "estimate time has to be finite, got {}",
                time
            )));
        }
        let (rows, cols) = covariance.dim();
        if rows != cols {
            return Err(FilterError::Configuration(format!(
                "covariance has to be square, got {}x{}",
                rows, cols
            )));
        }
        if state.len() != rows {
            return Err(FilterError::Configuration(format!(
                "state of length {} does not match covariance of order {}",
                state.len(),
                rows
            )));
        }
        Ok(ProcessEstimate::from_parts(time, state, covariance))
    }

    pub(in crate) fn from_parts(time: f64, state: Array1<A>, covariance: Array2<A>) -> Self {
        ProcessEstimate {
            time,
            state,
            covariance,
            state_transition_matrix: None,
            measurement_jacobian: None,
            innovation_covariance: None,
            kalman_gain: None,
        }
    }

    pub fn time(&self) -> f64 {
        self.time
    }

    pub fn state(&self) -> &Array1<A> {
        &self.state
    }

    pub fn covariance(&self) -> &Array2<A> {
        &self.covariance
    }

    /// Length of the state vector.
    pub fn dimension(&self) -> usize {
        self.state.len()
    }

    pub fn state_transition_matrix(&self) -> Option<&Array2<A>> {
        self.state_transition_matrix.as_ref()
    }

    pub fn measurement_jacobian(&self) -> Option<&Array2<A>> {
        self.measurement_jacobian.as_ref()
    }

    pub fn innovation_covariance(&self) -> Option<&Array2<A>> {
        self.innovation_covariance.as_ref()
    }

    pub fn kalman_gain(&self) -> Option<&Array2<A>> {
        self.kalman_gain.as_ref()
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use ndarray::{arr1, arr2};

    #[test]
    fn covariance_has_to_be_square() {
        let estimate = ProcessEstimate::new(0.0, arr1(&[1.0, 2.0]), Array2::<f64>::ones([2, 3]));
        assert!(matches!(estimate, Err(FilterError::Configuration(_))));
    }

    #[test]
    fn state_length_has_to_match_covariance_order() {
        let estimate = ProcessEstimate::new(0.0, arr1(&[1.0, 2.0]), Array2::<f64>::eye(3));
        assert!(matches!(estimate, Err(FilterError::Configuration(_))));
    }

    #[test]
    fn time_has_to_be_finite() {
        let estimate = ProcessEstimate::new(f64::NAN, arr1(&[1.0]), arr2(&[[1.0]]));
        assert!(matches!(estimate, Err(FilterError::Configuration(_))));
    }

    #[test]
    fn prior_carries_no_step_matrices() {
        let estimate = ProcessEstimate::new(2.5, arr1(&[1.0, 2.0]), Array2::<f64>::eye(2)).unwrap();
        assert_eq!(estimate.time(), 2.5);
        assert_eq!(estimate.state(), &arr1(&[1.0, 2.0]));
        assert!(estimate.state_transition_matrix().is_none());
        assert!(estimate.measurement_jacobian().is_none());
        assert!(estimate.innovation_covariance().is_none());
        assert!(estimate.kalman_gain().is_none());
    }
}
