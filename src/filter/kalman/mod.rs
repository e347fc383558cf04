//! Contains modules representing algorithms based on Kalman filtering methodology. Currently
//! the algorithms are classified into the following modules:
//! - linear algorithms; regular Kalman filter over a linear process, with optional control
//! - nonlinear algorithms; extended Kalman filter, where the process is linearized at each step
//!
//! Both estimators share the data types defined here: `ProcessEstimate` for the filtered
//! state and `Measurement` for the observations.

mod estimate;
mod measurement;
pub mod linear;
pub mod nonlinear;

pub use crate::filter::kalman_common::TimeOrdering;
pub use estimate::ProcessEstimate;
pub use measurement::Measurement;
