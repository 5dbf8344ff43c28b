//! Solution extraction and final validation.

use crate::domain::DomainStore;
use crate::propagation::Propagator;

/// Rounds `value` to the nearest multiple of `precision`.
pub(super) fn round_to_precision(value: f64, precision: f64) -> f64 {
    (value / precision).round() * precision
}

/// Reads a concrete assignment off a fully-narrowed store and re-checks
/// every constraint against it.
///
/// Each value is the domain midpoint rounded to the variable's
/// precision grid, clamped back into the narrowed interval so rounding
/// can never leave the declared bounds. The recheck guards against
/// coefficient and tolerance edge cases that propagation alone does not
/// rule out; on failure the first violated constraint's label is
/// returned and the caller treats the leaf as infeasible.
pub(super) fn extract(propagator: &Propagator, store: &DomainStore) -> Result<Vec<f64>, String> {
    let values: Vec<f64> = (0..store.len())
        .map(|var| {
            let interval = store.interval(var);
            round_to_precision(interval.midpoint(), store.precision(var))
                .clamp(interval.lo, interval.hi)
        })
        .collect();

    match propagator.first_violation(&values) {
        Some(label) => Err(label.to_string()),
        None => Ok(values),
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::model::{LinearConstraint, Problem, RealVar};

    #[test]
    fn test_round_to_precision() {
        assert_eq!(round_to_precision(5.004, 0.01), 5.0);
        assert_eq!(round_to_precision(5.006, 0.01), 5.01);
        assert_eq!(round_to_precision(-1.27, 0.5), -1.5);
    }

    #[test]
    fn test_extract_midpoints() {
        let mut problem = Problem::new("test");
        problem.add_variable(RealVar::new("x", 4.0, 4.01).with_precision(0.01));
        problem.add_variable(RealVar::new("y", 0.0, 10.0).with_precision(0.01));
        let propagator = Propagator::new(&problem);
        let store = DomainStore::from_problem(&problem);

        let values = extract(&propagator, &store).unwrap();
        assert!((values[0] - 4.0).abs() < 0.01);
        assert_eq!(values[1], 5.0);
    }

    #[test]
    fn test_extract_stays_inside_bounds() {
        // Rounding 0.0035 to the 0.01 grid would leave [0.003, 0.004];
        // the clamp keeps the value inside.
        let mut problem = Problem::new("test");
        problem.add_variable(RealVar::new("x", 0.003, 0.004).with_precision(0.01));
        let propagator = Propagator::new(&problem);
        let store = DomainStore::from_problem(&problem);

        let values = extract(&propagator, &store).unwrap();
        assert!(values[0] >= 0.003);
        assert!(values[0] <= 0.004);
    }

    #[test]
    fn test_extract_reports_violation() {
        // A constraint with only a zero coefficient cannot propagate,
        // but the final recheck still catches 0 != 5.
        let mut problem = Problem::new("test");
        problem.add_variable(RealVar::new("x", 0.0, 10.0).with_precision(0.01));
        problem.add_constraint(LinearConstraint::eq(
            "impossible",
            vec![("x".into(), 0.0)],
            5.0,
        ));
        let propagator = Propagator::new(&problem);
        let store = DomainStore::from_problem(&problem);

        assert_eq!(extract(&propagator, &store), Err("impossible".to_string()));
    }
}
