//! Domain-agnostic interval constraint satisfaction engine.
//!
//! Solves bounded real-valued linear constraint systems: given
//! variables restricted to real intervals and constraints over weighted
//! sums of them, finds an assignment satisfying every constraint within
//! a numeric tolerance, or proves that none exists. Typical consumers
//! are formulation and blending problems — recipe composition, diet
//! planning, mixture design — where ingredients are variables and
//! nutrient targets are linear constraints.
//!
//! # Key Components
//!
//! - **Model**: [`model::RealVar`], [`model::LinearConstraint`],
//!   [`model::Problem`] — the declarative problem definition.
//! - **Domains**: [`domain::DomainStore`] — per-node interval state
//!   with monotonic narrowing.
//! - **Propagation**: [`propagation::Propagator`] — worklist-driven
//!   bound consistency over the constraint set.
//! - **Search**: [`search::SolveRunner`] — branch-and-prune
//!   depth-first search with node and wall-clock budgets, optionally
//!   parallel across independent subtrees.
//!
//! # Design
//!
//! This is a satisfaction engine, not an optimizer: the first feasible
//! point terminates the search. It handles linear real constraints
//! only. Domain-specific modeling — ingredient tables, unit systems,
//! reporting — belongs in consumer layers; this crate knows only
//! names, intervals, and coefficients.

pub mod domain;
pub mod model;
pub mod propagation;
pub mod search;
