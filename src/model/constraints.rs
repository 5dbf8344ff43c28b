//! Linear constraint types.

use std::collections::HashMap;

/// Comparison operator of a linear constraint.
///
/// Modeled as a tagged variant: the propagator has one narrowing rule
/// per case rather than a trait object per operator.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
#[cfg_attr(feature = "serde", derive(serde::Serialize, serde::Deserialize))]
pub enum ConstraintOp {
    /// Weighted sum equals the right-hand side.
    Eq,
    /// Weighted sum is at most the right-hand side.
    Le,
    /// Weighted sum is at least the right-hand side.
    Ge,
}

impl ConstraintOp {
    /// Textual form for diagnostics.
    pub fn symbol(self) -> &'static str {
        match self {
            ConstraintOp::Eq => "=",
            ConstraintOp::Le => "<=",
            ConstraintOp::Ge => ">=",
        }
    }
}

/// A linear constraint: a weighted sum of variables compared to a constant.
///
/// `terms` maps variable names to coefficients; the constraint reads
/// `sum(coefficient * variable) op rhs`. Immutable after construction.
///
/// # Examples
///
/// ```
/// use u_consat::model::LinearConstraint;
///
/// let fat = LinearConstraint::eq(
///     "fat",
///     vec![("milk".into(), 0.037), ("cream".into(), 0.547)],
///     15.0,
/// );
/// assert_eq!(fat.terms.len(), 2);
/// ```
#[derive(Debug, Clone)]
#[cfg_attr(feature = "serde", derive(serde::Serialize, serde::Deserialize))]
pub struct LinearConstraint {
    /// Label for diagnostics (violation reports name the constraint).
    pub label: String,
    /// (variable_name, coefficient) pairs. Must be non-empty.
    pub terms: Vec<(String, f64)>,
    /// Comparison operator.
    pub op: ConstraintOp,
    /// Right-hand side constant.
    pub rhs: f64,
}

impl LinearConstraint {
    /// Creates a constraint with an explicit operator.
    pub fn new(
        label: impl Into<String>,
        terms: Vec<(String, f64)>,
        op: ConstraintOp,
        rhs: f64,
    ) -> Self {
        Self {
            label: label.into(),
            terms,
            op,
            rhs,
        }
    }

    /// Convenience: equality constraint.
    pub fn eq(label: impl Into<String>, terms: Vec<(String, f64)>, rhs: f64) -> Self {
        Self::new(label, terms, ConstraintOp::Eq, rhs)
    }

    /// Convenience: at-most constraint.
    pub fn le(label: impl Into<String>, terms: Vec<(String, f64)>, rhs: f64) -> Self {
        Self::new(label, terms, ConstraintOp::Le, rhs)
    }

    /// Convenience: at-least constraint.
    pub fn ge(label: impl Into<String>, terms: Vec<(String, f64)>, rhs: f64) -> Self {
        Self::new(label, terms, ConstraintOp::Ge, rhs)
    }

    /// Evaluates the weighted sum for the given assignment.
    ///
    /// Missing variables contribute zero.
    pub fn lhs(&self, values: &HashMap<String, f64>) -> f64 {
        self.terms
            .iter()
            .map(|(name, coef)| coef * values.get(name).copied().unwrap_or(0.0))
            .sum()
    }

    /// Whether the assignment satisfies this constraint within `tolerance`.
    pub fn satisfied(&self, values: &HashMap<String, f64>, tolerance: f64) -> bool {
        let lhs = self.lhs(values);
        match self.op {
            ConstraintOp::Eq => (lhs - self.rhs).abs() <= tolerance,
            ConstraintOp::Le => lhs <= self.rhs + tolerance,
            ConstraintOp::Ge => lhs >= self.rhs - tolerance,
        }
    }
}
