//! Errors produced while configuring an estimator or while running the filtering recursion.
use ndarray_linalg::error::LinalgError;
use std::error::Error;
use std::fmt;

/// Shorthand for results whose error type is `FilterError`.
pub type Result<T> = std::result::Result<T, FilterError>;

/// Every failure the crate can report.
///
/// Shapes in `DimensionMismatch` are given as `(rows, columns)`; vectors are reported as
/// `(length, 1)`.
#[derive(Debug)]
pub enum FilterError {
    /// A constructor argument is malformed, for example a prior whose state length does not
    /// match the order of its covariance.
    Configuration(String),
    /// An array handed to the estimator does not fit the current state dimension.
    DimensionMismatch {
        what: &'static str,
        expected: (usize, usize),
        found: (usize, usize),
    },
    /// The decomposed matrix is not positive definite.
    NonPositiveDefinite,
    /// The decomposed matrix is singular, or too close to singular for the configured
    /// threshold.
    SingularMatrix,
    /// The decomposed matrix is not symmetric; the first offending entry is reported.
    NonSymmetricMatrix { row: usize, column: usize },
    /// A measurement time violates the configured time ordering.
    NonMonotonicTime { previous: f64, current: f64 },
    /// Any other failure reported by LAPACK.
    Linalg(LinalgError),
}

impl fmt::Display for FilterError {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            FilterError::Configuration(reason) => write!(f, "invalid configuration: {}", reason),
            FilterError::DimensionMismatch {
                what,
                expected,
                found,
            } => write!(
                f,
                "{} has shape {}x{}, expected {}x{}",
                what, found.0, found.1, expected.0, expected.1
            ),
            FilterError::NonPositiveDefinite => write!(f, "matrix is not positive definite"),
            FilterError::SingularMatrix => write!(f, "matrix is singular"),
            FilterError::NonSymmetricMatrix { row, column } => write!(
                f,
                "matrix is not symmetric, entries ({}, {}) and ({}, {}) differ",
                row, column, column, row
            ),
            FilterError::NonMonotonicTime { previous, current } => write!(
                f,
                "measurement time {} does not follow estimate time {}",
                current, previous
            ),
            FilterError::Linalg(err) => write!(f, "linear algebra failure: {}", err),
        }
    }
}

impl Error for FilterError {
    fn source(&self) -> Option<&(dyn Error + 'static)> {
        match self {
            FilterError::Linalg(err) => Some(err),
            _ => None,
        }
    }
}

impl From<LinalgError> for FilterError {
    fn from(err: LinalgError) -> Self {
        FilterError::Linalg(err)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn dimension_mismatch_message_names_both_shapes() {
        let err = FilterError::DimensionMismatch {
            what: "measurement matrix",
            expected: (1, 4),
            found: (1, 3),
        };
        assert_eq!(
            err.to_string(),
            "measurement matrix has shape 1x3, expected 1x4"
        );
    }

    #[test]
    fn only_lapack_failures_carry_a_source() {
        let wrapped = FilterError::from(LinalgError::NotSquare { rows: 2, cols: 3 });
        assert!(wrapped.source().is_some());
        assert!(FilterError::SingularMatrix.source().is_none());
    }
}
