//! Branch-and-prune search.
//!
//! The search explores an explicit work stack of [`SearchNode`]s, each
//! an independent domain snapshot. Per node: propagate to fixpoint,
//! then either extract a solution (every constrained variable within
//! precision), discard the node (contradiction), or split the widest
//! unfixed variable at its midpoint and push both halves. The first
//! feasible leaf ends the search; an exhausted tree proves
//! infeasibility; node and wall-clock budgets bound the effort.
//!
//! With the `parallel` feature, independent subtrees are dispatched to
//! a rayon pool coordinated by a single atomically-updated
//! solution-found flag.

mod config;
mod node;
mod runner;
mod solution;
mod types;

pub use config::SolveConfig;
pub use node::{NodeStatus, SearchNode};
pub use runner::SolveRunner;
pub use types::{SolveResult, SolveStatus};
