//! Index-resolved constraint form used by the propagator.

use crate::model::{ConstraintOp, Problem};
use std::collections::HashMap;

/// Coefficient magnitude below which a term carries no information for
/// its variable. Dividing a residual by a smaller coefficient would
/// produce an effectively unbounded candidate interval, so such terms
/// are never used as narrowing targets.
pub(super) const MIN_COEFFICIENT: f64 = 1e-12;

/// A linear constraint with variable names resolved to indices.
#[derive(Debug, Clone)]
pub(super) struct CompiledConstraint {
    /// Diagnostic label carried over from the model.
    pub label: String,
    /// (variable_index, coefficient) pairs. Exact-zero coefficients are
    /// dropped at compile time.
    pub terms: Vec<(usize, f64)>,
    /// Comparison operator.
    pub op: ConstraintOp,
    /// Right-hand side constant.
    pub rhs: f64,
    /// Feasibility-recheck tolerance: the coarsest precision among the
    /// referenced variables.
    pub tolerance: f64,
}

/// Compiles a validated problem into index form plus per-variable watch
/// lists (`watchers[var]` = indices of constraints that can narrow when
/// `var` narrows).
///
/// The problem must have passed [`Problem::validate`]; undefined
/// variable references here are a programming error.
pub(super) fn compile(problem: &Problem) -> (Vec<CompiledConstraint>, Vec<Vec<usize>>) {
    let index: HashMap<&str, usize> = problem
        .variables
        .iter()
        .enumerate()
        .map(|(i, v)| (v.name.as_str(), i))
        .collect();

    let mut constraints = Vec::with_capacity(problem.constraints.len());
    let mut watchers: Vec<Vec<usize>> = vec![Vec::new(); problem.variables.len()];

    for (ci, constraint) in problem.constraints.iter().enumerate() {
        let mut terms = Vec::with_capacity(constraint.terms.len());
        let mut tolerance = 0.0f64;
        for (name, coef) in &constraint.terms {
            let var = *index
                .get(name.as_str())
                .expect("validated problem: undefined variable");
            tolerance = tolerance.max(problem.variables[var].precision);
            if *coef == 0.0 {
                continue;
            }
            terms.push((var, *coef));
            if coef.abs() >= MIN_COEFFICIENT {
                watchers[var].push(ci);
            }
        }
        constraints.push(CompiledConstraint {
            label: constraint.label.clone(),
            terms,
            op: constraint.op,
            rhs: constraint.rhs,
            tolerance,
        });
    }
    (constraints, watchers)
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::model::{LinearConstraint, RealVar};

    #[test]
    fn test_compile_resolves_indices() {
        let mut problem = Problem::new("test");
        problem.add_variable(RealVar::new("x", 0.0, 1.0).with_precision(0.01));
        problem.add_variable(RealVar::new("y", 0.0, 1.0).with_precision(0.1));
        problem.add_constraint(LinearConstraint::eq(
            "c",
            vec![("y".into(), 2.0), ("x".into(), -1.0)],
            0.5,
        ));

        let (constraints, watchers) = compile(&problem);
        assert_eq!(constraints.len(), 1);
        assert_eq!(constraints[0].terms, vec![(1, 2.0), (0, -1.0)]);
        assert_eq!(constraints[0].tolerance, 0.1);
        assert_eq!(watchers[0], vec![0]);
        assert_eq!(watchers[1], vec![0]);
    }

    #[test]
    fn test_zero_coefficient_dropped() {
        let mut problem = Problem::new("test");
        problem.add_variable(RealVar::new("x", 0.0, 1.0));
        problem.add_variable(RealVar::new("y", 0.0, 1.0));
        problem.add_constraint(LinearConstraint::eq(
            "c",
            vec![("x".into(), 0.0), ("y".into(), 1.0)],
            0.5,
        ));

        let (constraints, watchers) = compile(&problem);
        assert_eq!(constraints[0].terms, vec![(1, 1.0)]);
        assert!(watchers[0].is_empty());
        // Tolerance still accounts for every referenced variable.
        assert_eq!(constraints[0].tolerance, crate::model::DEFAULT_PRECISION);
    }

    #[test]
    fn test_near_zero_coefficient_not_watched() {
        let mut problem = Problem::new("test");
        problem.add_variable(RealVar::new("x", 0.0, 1.0));
        problem.add_constraint(LinearConstraint::eq("c", vec![("x".into(), 1e-15)], 0.5));

        let (constraints, watchers) = compile(&problem);
        // The term survives for residual evaluation but never narrows x.
        assert_eq!(constraints[0].terms.len(), 1);
        assert!(watchers[0].is_empty());
    }
}
