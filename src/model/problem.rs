//! Problem container and validation.

use super::constraints::{ConstraintOp, LinearConstraint};
use super::variables::RealVar;
use std::collections::HashSet;

/// A constraint satisfaction problem over bounded real variables.
///
/// Contains an ordered list of variables and the linear constraints
/// over them. Invariants (checked by [`validate`](Problem::validate)):
/// variable names are unique, every domain is non-empty, and every
/// constraint references only known variables.
///
/// # Examples
///
/// ```
/// use u_consat::model::{LinearConstraint, Problem, RealVar};
///
/// let mut problem = Problem::new("blend");
/// problem.add_variable(RealVar::new("a", 0.0, 100.0).with_precision(0.01));
/// problem.add_variable(RealVar::new("b", 0.0, 100.0).with_precision(0.01));
/// problem.add_sum_equals("total", 100.0);
/// problem.add_constraint(LinearConstraint::le(
///     "cap",
///     vec![("a".into(), 1.0)],
///     40.0,
/// ));
/// assert!(problem.validate().is_ok());
/// ```
#[derive(Debug, Clone)]
#[cfg_attr(feature = "serde", derive(serde::Serialize, serde::Deserialize))]
pub struct Problem {
    /// Problem name.
    pub name: String,
    /// Decision variables, in declaration order.
    pub variables: Vec<RealVar>,
    /// Linear constraints.
    pub constraints: Vec<LinearConstraint>,
}

impl Problem {
    /// Creates a new empty problem.
    pub fn new(name: impl Into<String>) -> Self {
        Self {
            name: name.into(),
            variables: Vec::new(),
            constraints: Vec::new(),
        }
    }

    /// Adds a variable.
    pub fn add_variable(&mut self, var: RealVar) {
        self.variables.push(var);
    }

    /// Adds a constraint.
    pub fn add_constraint(&mut self, constraint: LinearConstraint) {
        self.constraints.push(constraint);
    }

    /// Convenience: constrains the sum of all variables declared so far
    /// to equal `rhs`.
    pub fn add_sum_equals(&mut self, label: impl Into<String>, rhs: f64) {
        let terms = self
            .variables
            .iter()
            .map(|v| (v.name.clone(), 1.0))
            .collect();
        self.constraints
            .push(LinearConstraint::eq(label, terms, rhs));
    }

    /// Convenience: constrains a weighted sum over all variables declared
    /// so far. `coefficients` is parallel to the variable list.
    pub fn add_weighted(
        &mut self,
        label: impl Into<String>,
        coefficients: &[f64],
        op: ConstraintOp,
        rhs: f64,
    ) {
        let terms = self
            .variables
            .iter()
            .zip(coefficients)
            .map(|(v, &c)| (v.name.clone(), c))
            .collect();
        self.constraints
            .push(LinearConstraint::new(label, terms, op, rhs));
    }

    /// Index of a variable by name, if declared.
    pub fn variable_index(&self, name: &str) -> Option<usize> {
        self.variables.iter().position(|v| v.name == name)
    }

    /// Returns the number of variables.
    pub fn variable_count(&self) -> usize {
        self.variables.len()
    }

    /// Returns the number of constraints.
    pub fn constraint_count(&self) -> usize {
        self.constraints.len()
    }

    /// Validates the problem for consistency.
    ///
    /// Detects every malformed-input case up front: duplicate variable
    /// names, empty or non-finite domains, non-positive precision,
    /// constraints with no terms, duplicate terms, undefined variable
    /// references, and non-finite coefficients or right-hand sides.
    pub fn validate(&self) -> Result<(), String> {
        let mut seen = HashSet::new();
        for var in &self.variables {
            if !seen.insert(var.name.as_str()) {
                return Err(format!("duplicate variable: {}", var.name));
            }
            if !var.lower.is_finite() || !var.upper.is_finite() {
                return Err(format!("non-finite bounds for variable {}", var.name));
            }
            if var.lower > var.upper {
                return Err(format!(
                    "empty domain for variable {}: lower {} > upper {}",
                    var.name, var.lower, var.upper
                ));
            }
            if !(var.precision.is_finite() && var.precision > 0.0) {
                return Err(format!(
                    "precision must be positive and finite for variable {}, got {}",
                    var.name, var.precision
                ));
            }
        }

        for constraint in &self.constraints {
            if constraint.terms.is_empty() {
                return Err(format!("constraint {}: no terms", constraint.label));
            }
            if !constraint.rhs.is_finite() {
                return Err(format!(
                    "constraint {}: non-finite right-hand side",
                    constraint.label
                ));
            }
            let mut referenced = HashSet::new();
            for (name, coef) in &constraint.terms {
                if !seen.contains(name.as_str()) {
                    return Err(format!(
                        "constraint {}: undefined variable: {name}",
                        constraint.label
                    ));
                }
                if !referenced.insert(name.as_str()) {
                    return Err(format!(
                        "constraint {}: duplicate term for variable {name}",
                        constraint.label
                    ));
                }
                if !coef.is_finite() {
                    return Err(format!(
                        "constraint {}: non-finite coefficient for variable {name}",
                        constraint.label
                    ));
                }
            }
        }
        Ok(())
    }
}
