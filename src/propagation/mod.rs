//! Bound-consistency propagation.
//!
//! Compiles the model's constraints into an index-resolved form with
//! per-variable watch lists, then drives every domain to a fixpoint
//! where no constraint's interval evaluation can narrow any variable
//! further. Continuous domains make this a tolerance-aware variant of
//! classical arc consistency: a narrowing counts only when it moves a
//! bound by more than half the variable's precision.
//!
//! # References
//!
//! Benhamou et al. (1999), "Revising hull and box consistency"

mod compiled;
mod engine;

pub use engine::Propagator;
