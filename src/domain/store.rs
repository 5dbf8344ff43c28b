//! Runtime domain state with monotonic narrowing.

use super::interval::Interval;
use crate::model::Problem;
use std::fmt;

/// Raised when a narrowing would empty a variable's domain.
///
/// Recovered by the search engine as a backtrack signal; never
/// surfaced through the public API.
#[derive(Debug, Clone, PartialEq)]
pub struct Contradiction {
    /// Index of the variable whose domain emptied.
    pub variable: usize,
    /// Lower bound of the empty intersection.
    pub lo: f64,
    /// Upper bound of the empty intersection.
    pub hi: f64,
}

impl fmt::Display for Contradiction {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(
            f,
            "empty domain for variable #{}: [{}, {}]",
            self.variable, self.lo, self.hi
        )
    }
}

impl std::error::Error for Contradiction {}

/// Per-variable interval domains for one search node.
///
/// Bounds only move inward for the lifetime of a store: every mutation
/// goes through [`narrow`](DomainStore::narrow), which intersects the
/// requested bounds with the current ones. Each search node owns an
/// independent copy; branching clones via [`split`](DomainStore::split).
#[derive(Debug, Clone)]
pub struct DomainStore {
    intervals: Vec<Interval>,
    precisions: Vec<f64>,
}

impl DomainStore {
    /// Creates a store from the declared variable domains.
    pub fn from_problem(problem: &Problem) -> Self {
        Self {
            intervals: problem
                .variables
                .iter()
                .map(|v| Interval::new(v.lower, v.upper))
                .collect(),
            precisions: problem.variables.iter().map(|v| v.precision).collect(),
        }
    }

    /// Number of variables.
    pub fn len(&self) -> usize {
        self.intervals.len()
    }

    /// Whether the store holds no variables.
    pub fn is_empty(&self) -> bool {
        self.intervals.is_empty()
    }

    /// Current interval of a variable.
    pub fn interval(&self, var: usize) -> Interval {
        self.intervals[var]
    }

    /// Precision of a variable.
    pub fn precision(&self, var: usize) -> f64 {
        self.precisions[var]
    }

    /// Current domain width of a variable.
    pub fn width(&self, var: usize) -> f64 {
        self.intervals[var].width()
    }

    /// Whether a variable's domain is within its precision.
    pub fn is_fixed(&self, var: usize) -> bool {
        self.width(var) <= self.precisions[var]
    }

    /// Current `(lower, upper)` bounds of every variable.
    pub fn bounds(&self) -> Vec<(f64, f64)> {
        self.intervals.iter().map(|iv| (iv.lo, iv.hi)).collect()
    }

    /// Intersects `[lo, hi]` into the variable's current domain.
    ///
    /// Returns `Ok(true)` when a bound actually moved, `Ok(false)` when
    /// the request carried no information. A bound only moves when the
    /// shrink exceeds half the variable's precision, so floating-point
    /// noise cannot trigger endless tightening. Fails when the
    /// intersection is empty beyond the variable's precision.
    pub fn narrow(&mut self, var: usize, lo: f64, hi: f64) -> Result<bool, Contradiction> {
        let current = self.intervals[var];
        let requested = current.intersect(Interval::new(lo, hi));
        let precision = self.precisions[var];

        if requested.is_empty(precision) {
            return Err(Contradiction {
                variable: var,
                lo: requested.lo,
                hi: requested.hi,
            });
        }

        let gate = precision * 0.5;
        let mut next = current;
        let mut changed = false;
        if requested.lo - current.lo > gate {
            next.lo = requested.lo;
            changed = true;
        }
        if current.hi - requested.hi > gate {
            next.hi = requested.hi;
            changed = true;
        }
        if changed {
            // An intersection inverted within tolerance collapses to its
            // midpoint so intervals stay well-formed.
            if next.lo > next.hi {
                next = Interval::point(next.midpoint());
            }
            self.intervals[var] = next;
        }
        Ok(changed)
    }

    /// Splits a variable's domain at its midpoint, returning the
    /// (lower-half, upper-half) store copies. The caller picks an
    /// unfixed variable; both halves are non-empty subsets of the
    /// current domain.
    pub fn split(&self, var: usize) -> (DomainStore, DomainStore) {
        let (lower_half, upper_half) = self.intervals[var].split();
        let mut lower = self.clone();
        let mut upper = self.clone();
        lower.intervals[var] = lower_half;
        upper.intervals[var] = upper_half;
        (lower, upper)
    }
}
