//! Solver configuration.

/// Configuration for a branch-and-prune solve.
///
/// # Examples
///
/// ```
/// use u_consat::search::SolveConfig;
///
/// let config = SolveConfig::default()
///     .with_max_nodes(50_000)
///     .with_time_limit_ms(2_000);
/// assert!(config.validate().is_ok());
/// ```
#[derive(Debug, Clone)]
#[cfg_attr(feature = "serde", derive(serde::Serialize, serde::Deserialize))]
pub struct SolveConfig {
    /// Maximum number of search nodes to explore. 0 = no limit.
    pub max_nodes: usize,

    /// Wall-clock budget in milliseconds. 0 = no limit.
    ///
    /// The deadline is sampled at each propagation pass and each branch
    /// point; on expiry the solve returns `Timeout` with the bounds of
    /// the node being explored.
    pub time_limit_ms: i64,

    /// Whether to dispatch independent subtrees to a rayon worker pool.
    ///
    /// Effective only with the `parallel` feature; ignored otherwise.
    pub parallel: bool,
}

impl Default for SolveConfig {
    fn default() -> Self {
        Self {
            max_nodes: 100_000,
            time_limit_ms: 10_000,
            parallel: false,
        }
    }
}

impl SolveConfig {
    pub fn with_max_nodes(mut self, n: usize) -> Self {
        self.max_nodes = n;
        self
    }

    pub fn with_time_limit_ms(mut self, ms: i64) -> Self {
        self.time_limit_ms = ms;
        self
    }

    pub fn with_parallel(mut self, parallel: bool) -> Self {
        self.parallel = parallel;
        self
    }

    /// Validates the configuration.
    pub fn validate(&self) -> Result<(), String> {
        if self.time_limit_ms < 0 {
            return Err(format!(
                "time_limit_ms must be non-negative, got {}",
                self.time_limit_ms
            ));
        }
        Ok(())
    }
}
