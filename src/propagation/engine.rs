//! Worklist fixpoint propagation engine.

use super::compiled::{compile, CompiledConstraint, MIN_COEFFICIENT};
use crate::domain::{Contradiction, DomainStore, Interval};
use crate::model::{ConstraintOp, Problem};
use log::{debug, trace};
use std::collections::VecDeque;

/// Drives a set of linear constraints to bound consistency.
///
/// For each constraint `sum(c_i * x_i) op rhs` and each target variable
/// `x_j` with a usable coefficient, the engine computes the residual
/// interval `rhs - sum_{i != j}(c_i * x_i)` by interval arithmetic,
/// divides by `c_j` (flipping the interval and the operator direction
/// when `c_j` is negative), and intersects the candidate into `x_j`'s
/// domain. Equalities tighten both ends; inequalities only the relevant
/// one.
///
/// Propagation runs a worklist to fixpoint: narrowing any variable
/// re-enqueues every constraint watching it, and the pass ends when the
/// worklist drains or a narrowing empties a domain.
///
/// The propagator itself is immutable after construction and can be
/// shared across search workers; all mutable state lives in the
/// [`DomainStore`] passed to [`propagate`](Propagator::propagate).
#[derive(Debug)]
pub struct Propagator {
    constraints: Vec<CompiledConstraint>,
    watchers: Vec<Vec<usize>>,
}

impl Propagator {
    /// Compiles the problem's constraints into propagation form.
    ///
    /// The problem must have passed [`Problem::validate`].
    pub fn new(problem: &Problem) -> Self {
        let (constraints, watchers) = compile(problem);
        Self {
            constraints,
            watchers,
        }
    }

    /// Returns the number of compiled constraints.
    pub fn constraint_count(&self) -> usize {
        self.constraints.len()
    }

    /// Whether any constraint can narrow this variable.
    ///
    /// Unwatched variables are free: no amount of propagation or
    /// branching changes what values satisfy the constraints, so the
    /// search never splits them and extraction takes their midpoint.
    pub fn is_constrained(&self, var: usize) -> bool {
        !self.watchers[var].is_empty()
    }

    /// Runs propagation to fixpoint on the given store.
    ///
    /// Returns the number of bound narrowings applied, or the
    /// contradiction that emptied a domain.
    pub fn propagate(&self, store: &mut DomainStore) -> Result<usize, Contradiction> {
        let mut queue: VecDeque<usize> = (0..self.constraints.len()).collect();
        let mut queued = vec![true; self.constraints.len()];
        let mut narrowings = 0usize;
        let mut changed: Vec<usize> = Vec::new();

        while let Some(ci) = queue.pop_front() {
            queued[ci] = false;
            changed.clear();
            narrowings += self.revise(ci, store, &mut changed)?;
            for &var in &changed {
                for &watcher in &self.watchers[var] {
                    if !queued[watcher] {
                        queued[watcher] = true;
                        queue.push_back(watcher);
                    }
                }
            }
        }
        Ok(narrowings)
    }

    /// Revises one constraint: narrows every usable target variable from
    /// the bounds of the others. Appends narrowed variable indices to
    /// `changed` and returns the number of narrowings.
    fn revise(
        &self,
        ci: usize,
        store: &mut DomainStore,
        changed: &mut Vec<usize>,
    ) -> Result<usize, Contradiction> {
        let constraint = &self.constraints[ci];
        let mut narrowings = 0usize;

        for (j, &(target, coef)) in constraint.terms.iter().enumerate() {
            if coef.abs() < MIN_COEFFICIENT {
                continue;
            }

            // Residual interval: rhs - sum of the other scaled terms.
            let mut residual = Interval::point(constraint.rhs);
            for (i, &(var, c)) in constraint.terms.iter().enumerate() {
                if i != j {
                    residual = residual.sub(store.interval(var).scale(c));
                }
            }
            let candidate = residual.scale(1.0 / coef);

            // A negative coefficient has already flipped the candidate
            // interval, so the operator direction flips with it.
            let (lo, hi) = match (constraint.op, coef > 0.0) {
                (ConstraintOp::Eq, _) => (candidate.lo, candidate.hi),
                (ConstraintOp::Le, true) | (ConstraintOp::Ge, false) => {
                    (f64::NEG_INFINITY, candidate.hi)
                }
                (ConstraintOp::Ge, true) | (ConstraintOp::Le, false) => {
                    (candidate.lo, f64::INFINITY)
                }
            };

            match store.narrow(target, lo, hi) {
                Ok(true) => {
                    trace!(
                        "{}: narrowed x{} to [{}, {}]",
                        constraint.label,
                        target,
                        store.interval(target).lo,
                        store.interval(target).hi
                    );
                    changed.push(target);
                    narrowings += 1;
                }
                Ok(false) => {}
                Err(contradiction) => {
                    debug!("{}: {}", constraint.label, contradiction);
                    return Err(contradiction);
                }
            }
        }
        Ok(narrowings)
    }

    /// Re-checks every constraint against concrete values, returning the
    /// label of the first violated one.
    ///
    /// Each constraint is checked at its own tolerance (the coarsest
    /// precision among its variables).
    pub fn first_violation(&self, values: &[f64]) -> Option<&str> {
        for constraint in &self.constraints {
            let lhs: f64 = constraint
                .terms
                .iter()
                .map(|&(var, coef)| coef * values[var])
                .sum();
            let ok = match constraint.op {
                ConstraintOp::Eq => (lhs - constraint.rhs).abs() <= constraint.tolerance,
                ConstraintOp::Le => lhs <= constraint.rhs + constraint.tolerance,
                ConstraintOp::Ge => lhs >= constraint.rhs - constraint.tolerance,
            };
            if !ok {
                return Some(&constraint.label);
            }
        }
        None
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::model::{LinearConstraint, RealVar};

    fn problem(vars: &[(&str, f64, f64)], constraints: Vec<LinearConstraint>) -> Problem {
        let mut p = Problem::new("test");
        for &(name, lo, hi) in vars {
            p.add_variable(RealVar::new(name, lo, hi).with_precision(0.001));
        }
        for c in constraints {
            p.add_constraint(c);
        }
        assert!(p.validate().is_ok());
        p
    }

    fn fixpoint(p: &Problem) -> Result<(Propagator, DomainStore, usize), Contradiction> {
        let propagator = Propagator::new(p);
        let mut store = DomainStore::from_problem(p);
        let narrowings = propagator.propagate(&mut store)?;
        Ok((propagator, store, narrowings))
    }

    #[test]
    fn test_eq_pins_single_variable() {
        let p = problem(
            &[("x", 0.0, 10.0)],
            vec![LinearConstraint::eq("pin", vec![("x".into(), 1.0)], 5.0)],
        );
        let (_, store, narrowings) = fixpoint(&p).unwrap();
        assert_eq!(store.interval(0), Interval::new(5.0, 5.0));
        assert_eq!(narrowings, 1);
    }

    #[test]
    fn test_eq_propagates_through_fixed() {
        let p = problem(
            &[("x", 4.0, 4.0), ("y", 0.0, 10.0)],
            vec![LinearConstraint::eq(
                "sum",
                vec![("x".into(), 1.0), ("y".into(), 1.0)],
                10.0,
            )],
        );
        let (_, store, _) = fixpoint(&p).unwrap();
        assert_eq!(store.interval(1), Interval::new(6.0, 6.0));
    }

    #[test]
    fn test_le_tightens_upper_only() {
        let p = problem(
            &[("x", 0.0, 10.0)],
            vec![LinearConstraint::le("cap", vec![("x".into(), 1.0)], 6.0)],
        );
        let (_, store, _) = fixpoint(&p).unwrap();
        assert_eq!(store.interval(0), Interval::new(0.0, 6.0));
    }

    #[test]
    fn test_ge_tightens_lower_only() {
        let p = problem(
            &[("x", 0.0, 10.0)],
            vec![LinearConstraint::ge("floor", vec![("x".into(), 1.0)], 4.0)],
        );
        let (_, store, _) = fixpoint(&p).unwrap();
        assert_eq!(store.interval(0), Interval::new(4.0, 10.0));
    }

    #[test]
    fn test_negative_coefficient_flips_direction() {
        // -2x <= -6  <=>  x >= 3
        let p = problem(
            &[("x", 0.0, 10.0)],
            vec![LinearConstraint::le("neg", vec![("x".into(), -2.0)], -6.0)],
        );
        let (_, store, _) = fixpoint(&p).unwrap();
        assert_eq!(store.interval(0), Interval::new(3.0, 10.0));
    }

    #[test]
    fn test_sum_raises_lower_bounds() {
        // x + y = 15 over [0,10]^2 forces both above 5.
        let p = problem(
            &[("x", 0.0, 10.0), ("y", 0.0, 10.0)],
            vec![LinearConstraint::eq(
                "sum",
                vec![("x".into(), 1.0), ("y".into(), 1.0)],
                15.0,
            )],
        );
        let (_, store, _) = fixpoint(&p).unwrap();
        assert_eq!(store.interval(0), Interval::new(5.0, 10.0));
        assert_eq!(store.interval(1), Interval::new(5.0, 10.0));
    }

    #[test]
    fn test_chained_fixpoint() {
        // x = 2, y = x, z = x + y: the worklist must cascade.
        let p = problem(
            &[("x", 0.0, 10.0), ("y", 0.0, 10.0), ("z", 0.0, 10.0)],
            vec![
                LinearConstraint::eq("fix_x", vec![("x".into(), 1.0)], 2.0),
                LinearConstraint::eq(
                    "y_eq_x",
                    vec![("y".into(), 1.0), ("x".into(), -1.0)],
                    0.0,
                ),
                LinearConstraint::eq(
                    "z_eq_sum",
                    vec![("z".into(), 1.0), ("x".into(), -1.0), ("y".into(), -1.0)],
                    0.0,
                ),
            ],
        );
        let (_, store, _) = fixpoint(&p).unwrap();
        assert_eq!(store.interval(1), Interval::new(2.0, 2.0));
        assert_eq!(store.interval(2), Interval::new(4.0, 4.0));
    }

    #[test]
    fn test_conflicting_pins_contradict() {
        let p = problem(
            &[("x", 0.0, 10.0)],
            vec![
                LinearConstraint::eq("five", vec![("x".into(), 1.0)], 5.0),
                LinearConstraint::eq("six", vec![("x".into(), 1.0)], 6.0),
            ],
        );
        let err = fixpoint(&p).unwrap_err();
        assert_eq!(err.variable, 0);
    }

    #[test]
    fn test_unreferenced_variable_is_free() {
        let p = problem(
            &[("x", 0.0, 10.0), ("y", 0.0, 10.0)],
            vec![LinearConstraint::eq("pin", vec![("y".into(), 1.0)], 5.0)],
        );
        let (propagator, store, _) = fixpoint(&p).unwrap();
        assert!(!propagator.is_constrained(0));
        assert!(propagator.is_constrained(1));
        assert_eq!(store.interval(0), Interval::new(0.0, 10.0));
    }

    #[test]
    fn test_second_pass_is_quiescent() {
        let p = problem(
            &[("x", 0.0, 10.0), ("y", 0.0, 10.0)],
            vec![LinearConstraint::eq(
                "sum",
                vec![("x".into(), 1.0), ("y".into(), 1.0)],
                15.0,
            )],
        );
        let propagator = Propagator::new(&p);
        let mut store = DomainStore::from_problem(&p);
        let first = propagator.propagate(&mut store).unwrap();
        let second = propagator.propagate(&mut store).unwrap();
        assert!(first > 0);
        assert_eq!(second, 0);
    }

    #[test]
    fn test_first_violation() {
        let p = problem(
            &[("x", 0.0, 10.0), ("y", 0.0, 10.0)],
            vec![
                LinearConstraint::le("cap", vec![("x".into(), 1.0)], 6.0),
                LinearConstraint::eq(
                    "sum",
                    vec![("x".into(), 1.0), ("y".into(), 1.0)],
                    10.0,
                ),
            ],
        );
        let propagator = Propagator::new(&p);
        assert_eq!(propagator.first_violation(&[5.0, 5.0]), None);
        assert_eq!(propagator.first_violation(&[7.0, 3.0]), Some("cap"));
        assert_eq!(propagator.first_violation(&[5.0, 4.0]), Some("sum"));
    }
}
