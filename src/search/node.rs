//! Search tree nodes.

use crate::domain::DomainStore;
use crate::model::Problem;

/// Classification of a search node after its propagation pass.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum NodeStatus {
    /// Every constrained variable is within precision; hand the node to
    /// solution extraction.
    Fixed,
    /// Propagation stalled with unfixed domains; split the carried
    /// variable at its midpoint.
    Branching(usize),
    /// Propagation emptied a domain; discard the node.
    Infeasible,
    /// A budget expired while the node was being processed.
    TimedOut,
}

/// A node in the branch-and-prune tree.
///
/// Each node exclusively owns its domain snapshot: branching copies the
/// parent's store, so siblings share no mutable state and can be
/// explored on different workers.
#[derive(Debug, Clone)]
pub struct SearchNode {
    /// Depth in the tree (0 for the root).
    pub depth: usize,
    /// This node's domain state.
    pub store: DomainStore,
}

impl SearchNode {
    /// Creates the root node from the declared domains.
    pub fn root(problem: &Problem) -> Self {
        Self {
            depth: 0,
            store: DomainStore::from_problem(problem),
        }
    }

    /// Splits `var` at its midpoint, returning the (lower-half,
    /// upper-half) children.
    pub fn branch(&self, var: usize) -> (SearchNode, SearchNode) {
        let (lower, upper) = self.store.split(var);
        (
            SearchNode {
                depth: self.depth + 1,
                store: lower,
            },
            SearchNode {
                depth: self.depth + 1,
                store: upper,
            },
        )
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::domain::Interval;
    use crate::model::RealVar;

    #[test]
    fn test_root() {
        let mut problem = Problem::new("test");
        problem.add_variable(RealVar::new("x", 0.0, 10.0));
        let root = SearchNode::root(&problem);
        assert_eq!(root.depth, 0);
        assert_eq!(root.store.interval(0), Interval::new(0.0, 10.0));
    }

    #[test]
    fn test_branch() {
        let mut problem = Problem::new("test");
        problem.add_variable(RealVar::new("x", 0.0, 10.0));
        let root = SearchNode::root(&problem);

        let (lower, upper) = root.branch(0);
        assert_eq!(lower.depth, 1);
        assert_eq!(upper.depth, 1);
        assert_eq!(lower.store.interval(0), Interval::new(0.0, 5.0));
        assert_eq!(upper.store.interval(0), Interval::new(5.0, 10.0));
        // The parent is untouched.
        assert_eq!(root.store.interval(0), Interval::new(0.0, 10.0));
    }
}
