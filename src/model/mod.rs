//! Modeling layer: variables, constraints, and the problem container.
//!
//! This module defines the declarative half of the engine. Variables
//! carry their declared bounds and precision; constraints are immutable
//! weighted-sum comparisons; [`Problem`] owns both and validates the
//! whole definition before any solving starts.
//!
//! Translation of domain entities (ingredient tables, unit systems,
//! report formatting) belongs in consumer layers — this module knows
//! only names, intervals, and coefficients.

mod constraints;
mod problem;
mod variables;

pub use constraints::{ConstraintOp, LinearConstraint};
pub use problem::Problem;
pub use variables::{RealVar, DEFAULT_PRECISION};
