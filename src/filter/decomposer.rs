//! Decomposition-based linear solvers used to compute Kalman gains.
//!
//! The estimators never invert the innovation covariance. They hand it to a
//! `MatrixDecomposer`, which either rejects it or produces a `Decomposition` able to solve
//! linear systems against it. Two decomposers are provided, both backed by LAPACK through
//! `ndarray-linalg`:
//!
//! * `CholeskyDecomposer`, which requires a symmetric positive definite matrix and is the
//!   natural choice for covariances,
//! * `LuDecomposer`, which only requires a non-singular matrix.
//!
//! ```
//! use ndarray::arr2;
//! use kalman_estimation::filter::decomposer::{CholeskyDecomposer, Decomposition, MatrixDecomposer};
//!
//! let decomposer = CholeskyDecomposer::new(1.0e-15, 1.0e-15).unwrap();
//! let decomposition = decomposer.decompose(&arr2(&[[4.0, 2.0], [2.0, 3.0]])).unwrap();
//! let solution = decomposition.solve(&arr2(&[[4.0], [2.0]])).unwrap();
//! assert!((solution[(0, 0)] - 1.0).abs() < 1.0e-12);
//! assert!(solution[(1, 0)].abs() < 1.0e-12);
//! ```
use cauchy::Scalar;
use ndarray::{Array2, OwnedRepr};
use ndarray_linalg::cholesky::{CholeskyFactorized, FactorizeC, SolveC, UPLO};
use ndarray_linalg::error::LinalgError;
use ndarray_linalg::solve::{Factorize, LUFactorized, ReciprocalConditionNum, Solve};
use ndarray_linalg::Lapack;

use crate::error::{FilterError, Result};
use crate::filter::kalman_common::check_matrix;

/// A factorized square matrix `M`, able to solve `M·X = B`.
pub trait Decomposition<A: Scalar + Lapack> {
    /// Solves `M·X = B` column by column. `rhs` must have as many rows as `M`.
    fn solve(&self, rhs: &Array2<A>) -> Result<Array2<A>>;
}

/// Factory of decompositions.
///
/// Implementors check the precondition of their decomposition and report
/// `FilterError::NonPositiveDefinite`, `FilterError::SingularMatrix` or
/// `FilterError::NonSymmetricMatrix` when a matrix does not satisfy it.
pub trait MatrixDecomposer<A: Scalar + Lapack> {
    type Decomposition: Decomposition<A>;

    fn decompose(&self, matrix: &Array2<A>) -> Result<Self::Decomposition>;
}

fn check_threshold(name: &str, threshold: f64) -> Result<()> {
    if !threshold.is_finite() || threshold < 0.0 {
        return Err(FilterError::Configuration(format!(
            "{} must be finite and non-negative, got {}",
            name, threshold
        )));
    }
    Ok(())
}

fn check_square<A: Scalar + Lapack>(matrix: &Array2<A>) -> Result<usize> {
    let rows = matrix.nrows();
    check_matrix("decomposed matrix", matrix, (rows, rows))?;
    Ok(rows)
}

fn check_rhs<A: Scalar + Lapack>(order: usize, rhs: &Array2<A>) -> Result<()> {
    check_matrix("right hand side", rhs, (order, rhs.ncols()))
}

/// Cholesky decomposer with explicit symmetry and positivity tolerances.
///
/// A matrix is accepted when
/// * for every pair `i < j`, `|m_ij − conj(m_ji)| ≤ relative_symmetry_threshold · max(|m_ij|, |m_ji|)`,
/// * LAPACK factorizes it as `L·Lᴴ`,
/// * every pivot `|l_ii|²` is larger than `absolute_positivity_threshold`.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct CholeskyDecomposer {
    relative_symmetry_threshold: f64,
    absolute_positivity_threshold: f64,
}

impl CholeskyDecomposer {
    pub fn new(relative_symmetry_threshold: f64, absolute_positivity_threshold: f64) -> Result<Self> {
        check_threshold("relative symmetry threshold", relative_symmetry_threshold)?;
        check_threshold("absolute positivity threshold", absolute_positivity_threshold)?;
        Ok(CholeskyDecomposer {
            relative_symmetry_threshold,
            absolute_positivity_threshold,
        })
    }

    pub fn relative_symmetry_threshold(&self) -> f64 {
        self.relative_symmetry_threshold
    }

    pub fn absolute_positivity_threshold(&self) -> f64 {
        self.absolute_positivity_threshold
    }

    fn check_symmetry<A: Scalar + Lapack>(&self, matrix: &Array2<A>) -> Result<()> {
        let threshold = A::real(self.relative_symmetry_threshold);
        let order = matrix.nrows();
        for row in 0..order {
            for column in row + 1..order {
                let upper = matrix[(row, column)];
                let lower = matrix[(column, row)].conj();
                let (upper_norm, lower_norm) = (upper.abs(), lower.abs());
                let largest = if upper_norm > lower_norm {
                    upper_norm
                } else {
                    lower_norm
                };
                if (upper - lower).abs() > threshold * largest {
                    return Err(FilterError::NonSymmetricMatrix { row, column });
                }
            }
        }
        Ok(())
    }
}

/// Lower Cholesky factor of an accepted matrix.
pub struct CholeskyDecomposition<A: Scalar + Lapack> {
    factorized: CholeskyFactorized<OwnedRepr<A>>,
}

impl<A: Scalar + Lapack> CholeskyDecomposition<A> {
    /// The lower triangular factor `L`.
    pub fn lower(&self) -> &Array2<A> {
        &self.factorized.factor
    }
}

impl<A: Scalar + Lapack> MatrixDecomposer<A> for CholeskyDecomposer {
    type Decomposition = CholeskyDecomposition<A>;

    fn decompose(&self, matrix: &Array2<A>) -> Result<Self::Decomposition> {
        check_square(matrix)?;
        self.check_symmetry(matrix)?;

        let factorized = matrix.factorizec(UPLO::Lower).map_err(|err| match err {
            LinalgError::Lapack(_) => FilterError::NonPositiveDefinite,
            other => FilterError::Linalg(other),
        })?;

        let threshold = A::real(self.absolute_positivity_threshold);
        for pivot in factorized.factor.diag() {
            let norm = pivot.abs();
            if norm * norm <= threshold {
                return Err(FilterError::NonPositiveDefinite);
            }
        }

        Ok(CholeskyDecomposition { factorized })
    }
}

impl<A: Scalar + Lapack> Decomposition<A> for CholeskyDecomposition<A> {
    fn solve(&self, rhs: &Array2<A>) -> Result<Array2<A>> {
        check_rhs(self.factorized.factor.nrows(), rhs)?;
        let mut solution = Array2::zeros(rhs.raw_dim());
        for (mut destination, column) in solution.columns_mut().into_iter().zip(rhs.columns()) {
            destination.assign(&self.factorized.solvec(&column)?);
        }
        Ok(solution)
    }
}

/// LU decomposer with partial pivoting.
///
/// A matrix is rejected as singular when LAPACK fails to factorize it or when the
/// reciprocal of its 1-norm condition number is not larger than `singularity_threshold`.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct LuDecomposer {
    singularity_threshold: f64,
}

impl LuDecomposer {
    pub fn new(singularity_threshold: f64) -> Result<Self> {
        check_threshold("singularity threshold", singularity_threshold)?;
        Ok(LuDecomposer {
            singularity_threshold,
        })
    }

    pub fn singularity_threshold(&self) -> f64 {
        self.singularity_threshold
    }
}

pub struct LuDecomposition<A: Scalar + Lapack> {
    factorized: LUFactorized<OwnedRepr<A>>,
    order: usize,
}

impl<A: Scalar + Lapack> MatrixDecomposer<A> for LuDecomposer {
    type Decomposition = LuDecomposition<A>;

    fn decompose(&self, matrix: &Array2<A>) -> Result<Self::Decomposition> {
        let order = check_square(matrix)?;
        let factorized = matrix.factorize().map_err(|err| match err {
            LinalgError::Lapack(_) => FilterError::SingularMatrix,
            other => FilterError::Linalg(other),
        })?;

        let rcond = factorized
            .rcond()
            .map_err(|_| FilterError::SingularMatrix)?;
        if !(rcond > A::real(self.singularity_threshold)) {
            return Err(FilterError::SingularMatrix);
        }

        Ok(LuDecomposition { factorized, order })
    }
}

impl<A: Scalar + Lapack> Decomposition<A> for LuDecomposition<A> {
    fn solve(&self, rhs: &Array2<A>) -> Result<Array2<A>> {
        check_rhs(self.order, rhs)?;
        let mut solution = Array2::zeros(rhs.raw_dim());
        for (mut destination, column) in solution.columns_mut().into_iter().zip(rhs.columns()) {
            destination.assign(&self.factorized.solve(&column)?);
        }
        Ok(solution)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use ndarray::arr2;

    fn max_abs_difference(lhs: &Array2<f64>, rhs: &Array2<f64>) -> f64 {
        (lhs - rhs).iter().fold(0.0, |acc: f64, elem| acc.max(elem.abs()))
    }

    #[test]
    fn thresholds_have_to_be_non_negative() {
        assert!(CholeskyDecomposer::new(-1.0, 1.0e-15).is_err());
        assert!(CholeskyDecomposer::new(1.0e-15, f64::NAN).is_err());
        assert!(LuDecomposer::new(-1.0e-10).is_err());
        assert!(LuDecomposer::new(0.0).is_ok());
    }

    #[test]
    fn cholesky_solves_without_inverting() -> std::result::Result<(), String> {
        let matrix = arr2(&[[4.0, 2.0, 0.4], [2.0, 5.0, 1.0], [0.4, 1.0, 3.0]]);
        let rhs = arr2(&[[1.0, 0.0], [2.0, 1.0], [3.0, -1.0]]);
        let decomposition = CholeskyDecomposer::new(1.0e-15, 1.0e-15)
            .unwrap()
            .decompose(&matrix)
            .map_err(|err| err.to_string())?;
        let solution = decomposition.solve(&rhs).map_err(|err| err.to_string())?;
        let residual = max_abs_difference(&matrix.dot(&solution), &rhs);
        if residual < 1.0e-12 {
            Ok(())
        } else {
            Err(format!("residual {} is too large", residual))
        }
    }

    #[test]
    fn cholesky_lower_factor_reproduces_matrix() {
        let matrix = arr2(&[[4.0, 2.0], [2.0, 5.0]]);
        let decomposition = CholeskyDecomposer::new(1.0e-15, 1.0e-15)
            .unwrap()
            .decompose(&matrix)
            .unwrap();
        let lower = decomposition.lower();
        assert!(max_abs_difference(&lower.dot(&lower.t()), &matrix) < 1.0e-12);
        assert_eq!(lower[(0, 1)], 0.0);
    }

    #[test]
    fn cholesky_rejects_non_symmetric_matrix() {
        let decomposer = CholeskyDecomposer::new(1.0e-10, 1.0e-15).unwrap();
        let result = decomposer.decompose(&arr2(&[[4.0, 2.0], [2.5, 5.0]]));
        assert!(matches!(
            result,
            Err(FilterError::NonSymmetricMatrix { row: 0, column: 1 })
        ));
    }

    #[test]
    fn cholesky_rejects_indefinite_matrix() {
        let decomposer = CholeskyDecomposer::new(1.0e-15, 1.0e-15).unwrap();
        let result = decomposer.decompose(&arr2(&[[1.0, 2.0], [2.0, 1.0]]));
        assert!(matches!(result, Err(FilterError::NonPositiveDefinite)));
    }

    #[test]
    fn cholesky_rejects_singular_matrix() {
        let decomposer = CholeskyDecomposer::new(1.0e-15, 1.0e-15).unwrap();
        let result = decomposer.decompose(&arr2(&[[1.0, 1.0], [1.0, 1.0]]));
        assert!(matches!(result, Err(FilterError::NonPositiveDefinite)));
        let result = decomposer.decompose(&arr2(&[[0.0]]));
        assert!(matches!(result, Err(FilterError::NonPositiveDefinite)));
    }

    #[test]
    fn cholesky_positivity_threshold_rejects_tiny_pivots() {
        let matrix = arr2(&[[1.0e-8]]);
        let lenient = CholeskyDecomposer::new(1.0e-15, 1.0e-15).unwrap();
        let strict = CholeskyDecomposer::new(1.0e-15, 1.0e-6).unwrap();
        assert!(lenient.decompose(&matrix).is_ok());
        assert!(matches!(
            strict.decompose(&matrix),
            Err(FilterError::NonPositiveDefinite)
        ));
    }

    #[test]
    fn non_square_matrices_are_rejected() {
        let decomposer = CholeskyDecomposer::new(1.0e-15, 1.0e-15).unwrap();
        let result = decomposer.decompose(&Array2::<f64>::ones([2, 3]));
        assert!(matches!(result, Err(FilterError::DimensionMismatch { .. })));
    }

    #[test]
    fn lu_solves_non_symmetric_systems() {
        let matrix = arr2(&[[2.0, 1.0], [-1.0, 3.0]]);
        let rhs = arr2(&[[3.0], [2.0]]);
        let decomposition = LuDecomposer::new(1.0e-12)
            .unwrap()
            .decompose(&matrix)
            .unwrap();
        let solution = decomposition.solve(&rhs).unwrap();
        assert!(max_abs_difference(&solution, &arr2(&[[1.0], [1.0]])) < 1.0e-12);
    }

    #[test]
    fn lu_rejects_singular_matrix() {
        let decomposer = LuDecomposer::new(1.0e-12).unwrap();
        let result = decomposer.decompose(&arr2(&[[1.0, 2.0], [2.0, 4.0]]));
        assert!(matches!(result, Err(FilterError::SingularMatrix)));
    }

    #[test]
    fn right_hand_side_rows_have_to_match_order() {
        let decomposition = LuDecomposer::new(1.0e-12)
            .unwrap()
            .decompose(&Array2::<f64>::eye(3))
            .unwrap();
        let result = decomposition.solve(&Array2::ones([2, 1]));
        assert!(matches!(result, Err(FilterError::DimensionMismatch { .. })));
    }
}
