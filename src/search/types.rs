//! Solve status and result types.

use std::collections::HashMap;

/// Terminal status of a solve.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
#[cfg_attr(feature = "serde", derive(serde::Serialize, serde::Deserialize))]
pub enum SolveStatus {
    /// A feasible assignment was found.
    Sat,
    /// The search tree was exhausted without a feasible assignment.
    Unsat,
    /// A node or time budget expired before the search finished.
    ///
    /// Not a proof of infeasibility; `partial_bounds` carries the
    /// domains of the node being explored when the budget tripped.
    Timeout,
    /// The problem definition failed validation.
    ModelInvalid,
}

/// Result of a solve.
#[derive(Debug, Clone)]
#[cfg_attr(feature = "serde", derive(serde::Serialize, serde::Deserialize))]
pub struct SolveResult {
    /// Terminal status.
    pub status: SolveStatus,

    /// Variable assignment (populated for `Sat`).
    pub assignment: HashMap<String, f64>,

    /// Last explored `(lower, upper)` domains (populated for `Timeout`).
    pub partial_bounds: HashMap<String, (f64, f64)>,

    /// Diagnostic detail: the validation failure for `ModelInvalid`, or
    /// the first rejected constraint when an exhausted search saw a
    /// fully-narrowed leaf fail its final recheck.
    pub reason: Option<String>,

    /// Whether the solve was stopped through its cancellation token.
    /// A cancelled solve reports `Timeout` status.
    pub cancelled: bool,

    /// Number of search nodes processed.
    pub nodes_explored: usize,

    /// Number of bound narrowings applied across all propagation passes.
    pub propagations: usize,

    /// Solve time in milliseconds.
    pub solve_time_ms: i64,
}

impl SolveResult {
    /// Creates an empty result with the given status.
    pub fn empty(status: SolveStatus) -> Self {
        Self {
            status,
            assignment: HashMap::new(),
            partial_bounds: HashMap::new(),
            reason: None,
            cancelled: false,
            nodes_explored: 0,
            propagations: 0,
            solve_time_ms: 0,
        }
    }

    /// Creates a `ModelInvalid` result carrying the validation failure.
    pub fn invalid(reason: impl Into<String>) -> Self {
        let mut result = Self::empty(SolveStatus::ModelInvalid);
        result.reason = Some(reason.into());
        result
    }

    /// Whether a feasible assignment was found.
    pub fn is_sat(&self) -> bool {
        self.status == SolveStatus::Sat
    }

    /// Assigned value of a variable, if any.
    pub fn value(&self, name: &str) -> Option<f64> {
        self.assignment.get(name).copied()
    }
}
