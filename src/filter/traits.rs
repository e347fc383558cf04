//! Traits representing sequential estimation algorithms

use std::iter::FusedIterator;

use cauchy::Scalar;
use log::warn;
use ndarray_linalg::Lapack;

use crate::error::Result;
use crate::filter::kalman::{Measurement, ProcessEstimate};

/// Sequential estimation algorithm
///
/// This trait indicates that implementor filters a process one measurement at a time, on
/// numbers of type `A: Scalar + Lapack`. Each call to `estimation_step` runs one prediction
/// of the process up to the measurement time, followed by one correction with the
/// measurement, and moves the estimator forward to the corrected estimate.
pub trait KalmanEstimator<A: Scalar + Lapack> {
    /// Processes a single measurement and returns the corrected estimate.
    ///
    /// When the step fails, the estimator keeps the estimates of the last successful step,
    /// so the caller may resume from `corrected()`.
    fn estimation_step(&mut self, measurement: &Measurement<A>) -> Result<ProcessEstimate<A>>;

    /// A-priori estimate of the last successful step, `None` before the first step.
    fn predicted(&self) -> Option<&ProcessEstimate<A>>;

    /// A-posteriori estimate of the last successful step, or the prior before the first step.
    fn corrected(&self) -> &ProcessEstimate<A>;

    /// Lazily estimates the process over a sequence of measurements.
    ///
    /// The returned iterator yields one result per measurement, in the same order, and only
    /// computes an estimate when it is pulled. After the first error it yields nothing more.
    fn estimate<I>(&mut self, measurements: I) -> Estimates<'_, Self, I::IntoIter>
    where
        Self: Sized,
        I: IntoIterator<Item = Measurement<A>>,
    {
        Estimates {
            estimator: self,
            measurements: measurements.into_iter(),
            processed: 0,
            failed: false,
        }
    }
}

/// Iterator returned by `KalmanEstimator::estimate`.
///
/// It mutably borrows its estimator for as long as it lives, so a filtering run has exactly
/// one consumer.
pub struct Estimates<'a, E, I> {
    estimator: &'a mut E,
    measurements: I,
    processed: usize,
    failed: bool,
}

impl<'a, E, I> Estimates<'a, E, I> {
    /// Number of measurements pulled from the source so far.
    pub fn processed(&self) -> usize {
        self.processed
    }
}

impl<'a, A, E, I> Iterator for Estimates<'a, E, I>
where
    A: Scalar + Lapack,
    E: KalmanEstimator<A>,
    I: Iterator<Item = Measurement<A>>,
{
    type Item = Result<ProcessEstimate<A>>;

    fn next(&mut self) -> Option<Self::Item> {
        if self.failed {
            return None;
        }
        let measurement = self.measurements.next()?;
        self.processed += 1;
        let step = self.estimator.estimation_step(&measurement);
        if let Err(err) = &step {
            warn!(
                "estimation stopped at measurement {} (t = {}): {}",
                self.processed,
                measurement.time(),
                err
            );
            self.failed = true;
        }
        Some(step)
    }

    fn size_hint(&self) -> (usize, Option<usize>) {
        if self.failed {
            (0, Some(0))
        } else {
            let (_, upper) = self.measurements.size_hint();
            (0, upper)
        }
    }
}

impl<'a, A, E, I> FusedIterator for Estimates<'a, E, I>
where
    A: Scalar + Lapack,
    E: KalmanEstimator<A>,
    I: FusedIterator<Item = Measurement<A>>,
{
}
