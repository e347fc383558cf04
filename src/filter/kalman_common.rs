use std::ops::Neg;

use cauchy::Scalar;
use log::{debug, trace};
use ndarray::linalg::general_mat_mul;
use ndarray::{Array1, Array2, ArrayBase, Data, Ix1, Ix2};
use ndarray_linalg::Lapack;

use crate::error::{FilterError, Result};
use crate::filter::decomposer::{Decomposition, MatrixDecomposer};
use crate::filter::kalman::{Measurement, ProcessEstimate};

/// Policy applied to the time of each incoming measurement, relative to the time of the
/// current estimate.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum TimeOrdering {
    /// Measurement times may repeat but never go backwards.
    NonDecreasing,
    /// Every measurement must be strictly later than the current estimate.
    StrictlyIncreasing,
    /// Times are passed to the process model as they are.
    Unchecked,
}

impl Default for TimeOrdering {
    fn default() -> Self {
        TimeOrdering::NonDecreasing
    }
}

impl TimeOrdering {
    pub(in crate) fn check(self, previous: f64, current: f64) -> Result<()> {
        if !current.is_finite() {
            return Err(FilterError::NonMonotonicTime { previous, current });
        }
        let ordered = match self {
            TimeOrdering::NonDecreasing => current >= previous,
            TimeOrdering::StrictlyIncreasing => current > previous,
            TimeOrdering::Unchecked => true,
        };
        if ordered {
            Ok(())
        } else {
            Err(FilterError::NonMonotonicTime { previous, current })
        }
    }
}

pub(in crate) fn conj_transpose<A, S>(matrix: &ArrayBase<S, Ix2>) -> Array2<A>
where
    A: Scalar + Lapack,
    S: Data<Elem = A>,
{
    matrix.t().mapv(|elem| elem.conj())
}

/// Computes `lhs · mid · lhsᴴ + add`.
pub(in crate) fn quadratic_form_add<A, S1, S2, S3>(
    lhs: &ArrayBase<S1, Ix2>,
    mid: &ArrayBase<S2, Ix2>,
    add: &ArrayBase<S3, Ix2>,
) -> Array2<A>
where
    A: Scalar + Lapack,
    S1: Data<Elem = A>,
    S2: Data<Elem = A>,
    S3: Data<Elem = A>,
{
    let left_intermediate = lhs.dot(mid);
    let mut output = add.to_owned();
    general_mat_mul(
        A::one(),
        &left_intermediate,
        &conj_transpose(lhs),
        A::one(),
        &mut output,
    );
    output
}

/// Averages a square matrix with its conjugate transpose.
pub(in crate) fn symmetrize<A: Scalar + Lapack>(matrix: Array2<A>) -> Array2<A> {
    let half = A::from_real(A::real(0.5));
    let mut output = conj_transpose(&matrix);
    output += &matrix;
    output.mapv_inplace(|elem| elem * half);
    output
}

pub(in crate) fn check_matrix<A, S>(
    what: &'static str,
    matrix: &ArrayBase<S, Ix2>,
    expected: (usize, usize),
) -> Result<()>
where
    S: Data<Elem = A>,
{
    let found = matrix.dim();
    if found != expected {
        return Err(FilterError::DimensionMismatch {
            what,
            expected,
            found,
        });
    }
    Ok(())
}

pub(in crate) fn check_vector<A, S>(
    what: &'static str,
    vector: &ArrayBase<S, Ix1>,
    expected: usize,
) -> Result<()>
where
    S: Data<Elem = A>,
{
    if vector.len() != expected {
        return Err(FilterError::DimensionMismatch {
            what,
            expected: (expected, 1),
            found: (vector.len(), 1),
        });
    }
    Ok(())
}

/// Predict/correct arithmetic and the estimate cursor shared by the Kalman estimators.
///
/// The core never commits a partially processed step: `predicted` and `corrected` only
/// change through `commit`, once both halves of a step succeeded.
pub(in crate) struct EstimatorCore<A, D>
where
    A: Scalar + Lapack,
    D: MatrixDecomposer<A>,
{
    decomposer: D,
    time_ordering: TimeOrdering,
    predicted: Option<ProcessEstimate<A>>,
    corrected: ProcessEstimate<A>,
}

impl<A, D> EstimatorCore<A, D>
where
    A: Scalar + Lapack,
    D: MatrixDecomposer<A>,
{
    pub(in crate) fn new(decomposer: D, initial: ProcessEstimate<A>) -> Self {
        debug!(
            "kalman estimator initialised at t = {} with state dimension {}",
            initial.time(),
            initial.dimension()
        );
        EstimatorCore {
            decomposer,
            time_ordering: TimeOrdering::default(),
            predicted: None,
            corrected: initial,
        }
    }

    pub(in crate) fn set_time_ordering(&mut self, time_ordering: TimeOrdering) {
        self.time_ordering = time_ordering;
    }

    pub(in crate) fn predicted(&self) -> Option<&ProcessEstimate<A>> {
        self.predicted.as_ref()
    }

    pub(in crate) fn corrected(&self) -> &ProcessEstimate<A> {
        &self.corrected
    }

    pub(in crate) fn check_time(&self, time: f64) -> Result<()> {
        self.time_ordering.check(self.corrected.time(), time)
    }

    /// Builds the a-priori estimate from an already propagated state. The covariance is
    /// recomputed from scratch as `A·P·Aᴴ + Q`.
    pub(in crate) fn predict(
        &self,
        time: f64,
        predicted_state: Array1<A>,
        state_transition_matrix: Array2<A>,
        process_noise_matrix: Array2<A>,
    ) -> Result<ProcessEstimate<A>> {
        let n = self.corrected.dimension();
        check_vector("predicted state", &predicted_state, n)?;
        check_matrix("state transition matrix", &state_transition_matrix, (n, n))?;
        check_matrix("process noise matrix", &process_noise_matrix, (n, n))?;

        let covariance = symmetrize(quadratic_form_add(
            &state_transition_matrix,
            self.corrected.covariance(),
            &process_noise_matrix,
        ));
        trace!("predicted estimate at t = {}", time);

        let mut predicted = ProcessEstimate::from_parts(time, predicted_state, covariance);
        predicted.state_transition_matrix = Some(state_transition_matrix);
        Ok(predicted)
    }

    /// Corrects an a-priori estimate with a measurement.
    ///
    /// The gain is never formed from an explicit inverse of the innovation covariance `S`;
    /// instead `S·Kᴴ = H·P` is solved through the configured decomposer.
    pub(in crate) fn correct(
        &self,
        predicted: &ProcessEstimate<A>,
        measurement: &Measurement<A>,
    ) -> Result<ProcessEstimate<A>> {
        let n = predicted.dimension();
        let m = measurement.dimension();
        let h = measurement.measurement_matrix();
        check_matrix("measurement matrix", h, (m, n))?;

        let state = predicted.state();
        let covariance = predicted.covariance();

        let innovation = measurement.value() - &h.dot(state);
        let h_p = h.dot(covariance);
        // H·P·Hᴴ is only symmetric up to summation order, R is added after averaging
        let mut projected_covariance = Array2::zeros((m, m));
        general_mat_mul(
            A::one(),
            &h_p,
            &conj_transpose(h),
            A::zero(),
            &mut projected_covariance,
        );
        let innovation_covariance = symmetrize(projected_covariance) + measurement.covariance();

        let decomposition = self.decomposer.decompose(&innovation_covariance)?;
        let kalman_gain = conj_transpose(&decomposition.solve(&h_p)?);

        let corrected_state = state + &kalman_gain.dot(&innovation);
        let mut corrected_covariance = covariance.to_owned();
        general_mat_mul(
            A::one().neg(),
            &kalman_gain,
            &h_p,
            A::one(),
            &mut corrected_covariance,
        );
        let corrected_covariance = symmetrize(corrected_covariance);
        trace!("corrected estimate at t = {}", measurement.time());

        let mut corrected =
            ProcessEstimate::from_parts(measurement.time(), corrected_state, corrected_covariance);
        corrected.state_transition_matrix = predicted.state_transition_matrix.clone();
        corrected.measurement_jacobian = Some(h.to_owned());
        corrected.innovation_covariance = Some(innovation_covariance);
        corrected.kalman_gain = Some(kalman_gain);
        Ok(corrected)
    }

    pub(in crate) fn commit(&mut self, predicted: ProcessEstimate<A>, corrected: ProcessEstimate<A>) {
        self.predicted = Some(predicted);
        self.corrected = corrected;
    }
}
