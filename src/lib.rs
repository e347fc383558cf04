#![crate_name = "kalman_estimation"]
//! The `kalman_estimation` crate contains sequential state estimators of the Kalman family.
//! Given an initial estimate of a process, a model of how the process evolves and a stream of
//! noisy measurements, an estimator produces one corrected estimate of the state and of its
//! error covariance per measurement.
//!
//! ## Estimators
//! Two estimators are provided, both implementing `filter::traits::KalmanEstimator`:
//! - `ExtendedKalmanEstimator`, for non-linear processes which provide their own linearization
//!   at every step,
//! - `LinearKalmanEstimator`, for linear processes, optionally driven by a control input.
//!
//! Estimation is lazy: `KalmanEstimator::estimate` returns an iterator which processes a
//! measurement only when the next estimate is requested, so unbounded measurement streams can
//! be filtered without buffering.
//!
//! ## Numerical stability
//! Kalman gains are never computed from an explicit matrix inverse. The innovation covariance
//! is handed to a `filter::decomposer::MatrixDecomposer`, which either rejects it (for example
//! when it is not positive definite) or solves the gain equation. Propagated and corrected
//! covariances are explicitly symmetrized before they are emitted.
//!
//! The crate logs through the `log` facade and never installs a logger itself.
extern crate blas_src;

pub mod error;
pub mod filter;

pub use error::{FilterError, Result};
