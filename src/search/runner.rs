//! Branch-and-prune execution loop.
//!
//! [`SolveRunner`] orchestrates the complete search: validation →
//! propagation to fixpoint → midpoint branching on the widest unfixed
//! variable → solution extraction at fully-narrowed leaves. The first
//! feasible leaf terminates the whole search.

use super::config::SolveConfig;
use super::node::{NodeStatus, SearchNode};
use super::solution;
use super::types::{SolveResult, SolveStatus};
use crate::domain::DomainStore;
use crate::model::Problem;
use crate::propagation::Propagator;
use log::debug;
use std::sync::atomic::{AtomicBool, AtomicUsize, Ordering};
use std::sync::{Arc, Mutex};
use std::time::{Duration, Instant};

/// State shared by every worker of one solve call.
///
/// The `found` cell is the coordination point for parallel search:
/// workers check `stop` before each node and after each propagation
/// pass, and the first worker to publish a solution wins the
/// compare-and-swap. Nothing here outlives the solve call.
struct SearchShared {
    max_nodes: usize,
    deadline: Option<Instant>,
    cancel: Option<Arc<AtomicBool>>,
    stop: AtomicBool,
    found: AtomicBool,
    timed_out: AtomicBool,
    cancelled: AtomicBool,
    nodes: AtomicUsize,
    propagations: AtomicUsize,
    solution: Mutex<Option<Vec<f64>>>,
    timeout_bounds: Mutex<Option<Vec<(f64, f64)>>>,
    rejection: Mutex<Option<String>>,
}

impl SearchShared {
    fn new(config: &SolveConfig, cancel: Option<Arc<AtomicBool>>, start: Instant) -> Self {
        let deadline = if config.time_limit_ms > 0 {
            Some(start + Duration::from_millis(config.time_limit_ms as u64))
        } else {
            None
        };
        Self {
            max_nodes: config.max_nodes,
            deadline,
            cancel,
            stop: AtomicBool::new(false),
            found: AtomicBool::new(false),
            timed_out: AtomicBool::new(false),
            cancelled: AtomicBool::new(false),
            nodes: AtomicUsize::new(0),
            propagations: AtomicUsize::new(0),
            solution: Mutex::new(None),
            timeout_bounds: Mutex::new(None),
            rejection: Mutex::new(None),
        }
    }

    fn should_stop(&self) -> bool {
        if self.stop.load(Ordering::Relaxed) {
            return true;
        }
        if let Some(flag) = &self.cancel {
            if flag.load(Ordering::Relaxed) {
                self.cancelled.store(true, Ordering::Relaxed);
                self.stop.store(true, Ordering::Relaxed);
                return true;
            }
        }
        false
    }

    fn deadline_passed(&self) -> bool {
        self.deadline.is_some_and(|d| Instant::now() >= d)
    }

    fn publish_solution(&self, values: Vec<f64>) {
        if self
            .found
            .compare_exchange(false, true, Ordering::SeqCst, Ordering::SeqCst)
            .is_ok()
        {
            let mut slot = self.solution.lock().unwrap_or_else(|e| e.into_inner());
            *slot = Some(values);
            self.stop.store(true, Ordering::SeqCst);
        }
    }

    fn record_timeout(&self, store: &DomainStore) {
        self.timed_out.store(true, Ordering::Relaxed);
        self.stop.store(true, Ordering::Relaxed);
        let mut slot = self
            .timeout_bounds
            .lock()
            .unwrap_or_else(|e| e.into_inner());
        if slot.is_none() {
            *slot = Some(store.bounds());
        }
    }

    fn record_rejection(&self, label: String) {
        let mut slot = self.rejection.lock().unwrap_or_else(|e| e.into_inner());
        if slot.is_none() {
            *slot = Some(label);
        }
    }

    fn into_result(self, problem: &Problem, start: Instant) -> SolveResult {
        let nodes_explored = self.nodes.load(Ordering::Relaxed);
        let propagations = self.propagations.load(Ordering::Relaxed);
        let cancelled = self.cancelled.load(Ordering::Relaxed);
        let solution = self.solution.into_inner().unwrap_or_else(|e| e.into_inner());

        let mut result = if let Some(values) = solution {
            let mut r = SolveResult::empty(SolveStatus::Sat);
            r.assignment = problem
                .variables
                .iter()
                .zip(values)
                .map(|(v, value)| (v.name.clone(), value))
                .collect();
            r
        } else if self.timed_out.load(Ordering::Relaxed) || cancelled {
            let bounds = self
                .timeout_bounds
                .into_inner()
                .unwrap_or_else(|e| e.into_inner())
                .unwrap_or_else(|| {
                    problem
                        .variables
                        .iter()
                        .map(|v| (v.lower, v.upper))
                        .collect()
                });
            let mut r = SolveResult::empty(SolveStatus::Timeout);
            r.partial_bounds = problem
                .variables
                .iter()
                .zip(bounds)
                .map(|(v, b)| (v.name.clone(), b))
                .collect();
            r
        } else {
            let mut r = SolveResult::empty(SolveStatus::Unsat);
            r.reason = self.rejection.into_inner().unwrap_or_else(|e| e.into_inner());
            r
        };

        result.cancelled = cancelled;
        result.nodes_explored = nodes_explored;
        result.propagations = propagations;
        result.solve_time_ms = start.elapsed().as_millis() as i64;
        result
    }
}

/// First-fail branching: the widest unfixed constrained variable, ties
/// broken by lowest index for determinism. `None` means the node is
/// fully determined.
fn pick_branch_variable(propagator: &Propagator, store: &DomainStore) -> Option<usize> {
    let mut widest: Option<(usize, f64)> = None;
    for var in 0..store.len() {
        if !propagator.is_constrained(var) || store.is_fixed(var) {
            continue;
        }
        let width = store.width(var);
        let better = match widest {
            Some((_, best)) => width > best,
            None => true,
        };
        if better {
            widest = Some((var, width));
        }
    }
    widest.map(|(var, _)| var)
}

/// Executes the branch-and-prune search.
///
/// # Usage
///
/// ```
/// use u_consat::model::{Problem, RealVar};
/// use u_consat::search::{SolveConfig, SolveRunner};
///
/// let mut problem = Problem::new("example");
/// problem.add_variable(RealVar::new("x", 0.0, 10.0).with_precision(0.01));
/// problem.add_sum_equals("total", 4.0);
///
/// let result = SolveRunner::run(&problem, &SolveConfig::default());
/// assert!(result.is_sat());
/// ```
pub struct SolveRunner;

impl SolveRunner {
    /// Runs the solve.
    ///
    /// # Panics
    /// Panics if the configuration is invalid (call
    /// [`SolveConfig::validate`] first to get a descriptive error).
    pub fn run(problem: &Problem, config: &SolveConfig) -> SolveResult {
        Self::run_with_cancel(problem, config, None)
    }

    /// Runs the solve with an optional cancellation token.
    ///
    /// If `cancel` is `Some` and the flag becomes `true`, every worker
    /// stops at its next node boundary and the result reports `Timeout`
    /// with `cancelled` set.
    pub fn run_with_cancel(
        problem: &Problem,
        config: &SolveConfig,
        cancel: Option<Arc<AtomicBool>>,
    ) -> SolveResult {
        config.validate().expect("invalid SolveConfig");
        let start = Instant::now();

        if let Err(reason) = problem.validate() {
            let mut result = SolveResult::invalid(reason);
            result.solve_time_ms = start.elapsed().as_millis() as i64;
            return result;
        }
        debug!(
            "solving {}: {} variables, {} constraints",
            problem.name,
            problem.variable_count(),
            problem.constraint_count()
        );

        let propagator = Propagator::new(problem);
        let shared = SearchShared::new(config, cancel, start);
        let root = SearchNode::root(problem);

        #[cfg(feature = "parallel")]
        if config.parallel {
            Self::run_parallel(root, &propagator, &shared);
            return shared.into_result(problem, start);
        }

        Self::search_subtree(root, &propagator, &shared);
        shared.into_result(problem, start)
    }

    /// Processes one node: budgets, propagation, classification.
    fn process(
        node: &mut SearchNode,
        propagator: &Propagator,
        shared: &SearchShared,
    ) -> NodeStatus {
        let explored = shared.nodes.fetch_add(1, Ordering::Relaxed) + 1;
        if shared.max_nodes > 0 && explored > shared.max_nodes {
            shared.record_timeout(&node.store);
            return NodeStatus::TimedOut;
        }
        if shared.deadline_passed() {
            shared.record_timeout(&node.store);
            return NodeStatus::TimedOut;
        }

        match propagator.propagate(&mut node.store) {
            Err(_) => NodeStatus::Infeasible,
            Ok(narrowings) => {
                shared.propagations.fetch_add(narrowings, Ordering::Relaxed);
                // Another worker may have finished during the pass.
                if shared.should_stop() {
                    return NodeStatus::TimedOut;
                }
                // The deadline is sampled again after the pass: a long
                // fixpoint must not push the solve far past its budget.
                if shared.deadline_passed() {
                    shared.record_timeout(&node.store);
                    return NodeStatus::TimedOut;
                }
                match pick_branch_variable(propagator, &node.store) {
                    None => NodeStatus::Fixed,
                    Some(var) => NodeStatus::Branching(var),
                }
            }
        }
    }

    /// Depth-first exploration of one subtree on an explicit work
    /// stack. The lower half of each split is pushed last so it is
    /// explored first.
    fn search_subtree(root: SearchNode, propagator: &Propagator, shared: &SearchShared) {
        let mut stack = vec![root];
        while let Some(mut node) = stack.pop() {
            if shared.should_stop() {
                return;
            }
            match Self::process(&mut node, propagator, shared) {
                NodeStatus::Infeasible => {}
                NodeStatus::TimedOut => return,
                NodeStatus::Fixed => match solution::extract(propagator, &node.store) {
                    Ok(values) => {
                        debug!(
                            "solution found at depth {} after {} nodes",
                            node.depth,
                            shared.nodes.load(Ordering::Relaxed)
                        );
                        shared.publish_solution(values);
                        return;
                    }
                    Err(label) => {
                        debug!("leaf rejected by constraint {label}");
                        shared.record_rejection(label);
                    }
                },
                NodeStatus::Branching(var) => {
                    let (lower, upper) = node.branch(var);
                    stack.push(upper);
                    stack.push(lower);
                }
            }
        }
    }

    /// Widens the root into independent subtrees, then dispatches them
    /// to the rayon pool. Workers share nothing but the coordination
    /// cells in [`SearchShared`].
    #[cfg(feature = "parallel")]
    fn run_parallel(root: SearchNode, propagator: &Propagator, shared: &SearchShared) {
        use rayon::prelude::*;
        use std::collections::VecDeque;

        let target = rayon::current_num_threads().max(2) * 2;
        let mut frontier: VecDeque<SearchNode> = VecDeque::new();
        frontier.push_back(root);

        // Breadth-first expansion until the frontier can keep the pool
        // busy. Left-to-right order is preserved.
        while frontier.len() < target {
            let Some(mut node) = frontier.pop_front() else {
                return;
            };
            if shared.should_stop() {
                return;
            }
            match Self::process(&mut node, propagator, shared) {
                NodeStatus::Infeasible => {}
                NodeStatus::TimedOut => return,
                NodeStatus::Fixed => match solution::extract(propagator, &node.store) {
                    Ok(values) => {
                        shared.publish_solution(values);
                        return;
                    }
                    Err(label) => shared.record_rejection(label),
                },
                NodeStatus::Branching(var) => {
                    let (lower, upper) = node.branch(var);
                    frontier.push_back(lower);
                    frontier.push_back(upper);
                }
            }
        }

        frontier
            .into_iter()
            .collect::<Vec<_>>()
            .into_par_iter()
            .for_each(|node| Self::search_subtree(node, propagator, shared));
    }
}
