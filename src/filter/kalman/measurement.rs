use cauchy::Scalar;
use ndarray::{Array1, Array2};
use ndarray_linalg::Lapack;

use crate::error::{FilterError, Result};
use crate::filter::kalman_common::check_matrix;

/// Observation of the process at a given time.
///
/// The measurement matrix `H` maps the state space to the observation space; the
/// covariance `R` describes the noise of the observation. For a measurement of size `m`,
/// `H` has `m ≥ 1` rows and `R` is `m×m`. The number of columns of `H` is checked against the
/// state dimension when the measurement is processed.
#[derive(Debug, Clone, PartialEq)]
pub struct Measurement<A: Scalar + Lapack> {
    time: f64,
    value: Array1<A>,
    measurement_matrix: Array2<A>,
    covariance: Array2<A>,
}

impl<A: Scalar + Lapack> Measurement<A> {
    pub fn new(
        time: f64,
        value: Array1<A>,
        measurement_matrix: Array2<A>,
        covariance: Array2<A>,
    ) -> Result<Self> {
        let m = value.len();
        if m == 0 {
            return Err(FilterError::DimensionMismatch {
                what: "measurement value",
                expected: (1, 1),
                found: (0, 1),
            });
        }
        check_matrix(
            "measurement matrix",
            &measurement_matrix,
            (m, measurement_matrix.ncols()),
        )?;
        check_matrix("measurement covariance", &covariance, (m, m))?;
        Ok(Measurement {
            time,
            value,
            measurement_matrix,
            covariance,
        })
    }

    pub fn time(&self) -> f64 {
        self.time
    }

    pub fn value(&self) -> &Array1<A> {
        &self.value
    }

    pub fn measurement_matrix(&self) -> &Array2<A> {
        &self.measurement_matrix
    }

    pub fn covariance(&self) -> &Array2<A> {
        &self.covariance
    }

    /// Size of the observation vector.
    pub fn dimension(&self) -> usize {
        self.value.len()
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::error::FilterError;
    use ndarray::{arr1, arr2};

    #[test]
    fn measurement_matrix_rows_have_to_match_value() {
        let measurement = Measurement::new(
            0.0,
            arr1(&[1.0, 2.0]),
            arr2(&[[1.0, 0.0, 0.0]]),
            Array2::<f64>::eye(2),
        );
        assert!(matches!(
            measurement,
            Err(FilterError::DimensionMismatch {
                what: "measurement matrix",
                ..
            })
        ));
    }

    #[test]
    fn empty_measurement_is_rejected() {
        let measurement = Measurement::new(
            0.0,
            Array1::<f64>::zeros(0),
            Array2::<f64>::zeros([0, 2]),
            Array2::<f64>::zeros([0, 0]),
        );
        assert!(matches!(
            measurement,
            Err(FilterError::DimensionMismatch {
                what: "measurement value",
                expected: (1, 1),
                found: (0, 1),
            })
        ));
    }

    #[test]
    fn covariance_order_has_to_match_value() {
        let measurement = Measurement::new(
            0.0,
            arr1(&[1.0]),
            arr2(&[[1.0, 0.0]]),
            Array2::<f64>::eye(2),
        );
        assert!(matches!(
            measurement,
            Err(FilterError::DimensionMismatch {
                what: "measurement covariance",
                expected: (1, 1),
                found: (2, 2),
            })
        ));
    }

    #[test]
    fn well_formed_measurement_keeps_its_parts() {
        let measurement = Measurement::new(
            1.5,
            arr1(&[3.0]),
            arr2(&[[1.0, 0.0]]),
            arr2(&[[0.25]]),
        )
        .unwrap();
        assert_eq!(measurement.time(), 1.5);
        assert_eq!(measurement.dimension(), 1);
        assert_eq!(measurement.measurement_matrix().ncols(), 2);
    }
}
