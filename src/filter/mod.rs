//! Sequential estimation algorithms and the capabilities they are built from.
pub mod decomposer;
pub mod kalman;
mod kalman_common;
pub mod traits;

pub use decomposer::{CholeskyDecomposer, Decomposition, LuDecomposer, MatrixDecomposer};
pub use kalman::linear::{LinearEvolution, LinearKalmanEstimator, LinearProcess};
pub use kalman::nonlinear::{ExtendedKalmanEstimator, NonLinearEvolution, NonLinearProcess};
pub use kalman::{Measurement, ProcessEstimate, TimeOrdering};
pub use traits::{Estimates, KalmanEstimator};
