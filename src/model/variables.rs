//! Variable types for the modeling layer.

/// Default domain precision when none is given.
///
/// A variable whose interval is narrower than its precision is
/// considered fixed.
pub const DEFAULT_PRECISION: f64 = 1e-3;

/// A real-valued decision variable with a bounded domain `[lower, upper]`.
///
/// The declared bounds are immutable; runtime narrowing happens on
/// per-node domain copies, never on the variable itself.
///
/// # Examples
///
/// ```
/// use u_consat::model::RealVar;
///
/// let amount = RealVar::new("amount", 0.0, 100.0).with_precision(0.01);
/// assert!(!amount.is_fixed());
///
/// let target = RealVar::fixed("target", 15.0);
/// assert!(target.is_fixed());
/// ```
#[derive(Debug, Clone)]
#[cfg_attr(feature = "serde", derive(serde::Serialize, serde::Deserialize))]
pub struct RealVar {
    /// Variable name (unique identifier within a problem).
    pub name: String,
    /// Lower bound of the domain.
    pub lower: f64,
    /// Upper bound of the domain.
    pub upper: f64,
    /// Smallest meaningful domain width.
    pub precision: f64,
}

impl RealVar {
    /// Creates a new variable with the given bounds and default precision.
    pub fn new(name: impl Into<String>, lower: f64, upper: f64) -> Self {
        Self {
            name: name.into(),
            lower,
            upper,
            precision: DEFAULT_PRECISION,
        }
    }

    /// Creates a variable fixed to a single value (zero-width domain).
    pub fn fixed(name: impl Into<String>, value: f64) -> Self {
        Self {
            name: name.into(),
            lower: value,
            upper: value,
            precision: DEFAULT_PRECISION,
        }
    }

    /// Sets the precision.
    pub fn with_precision(mut self, precision: f64) -> Self {
        self.precision = precision;
        self
    }

    /// Domain width (`upper - lower`).
    pub fn width(&self) -> f64 {
        self.upper - self.lower
    }

    /// Whether the declared domain is already within precision.
    pub fn is_fixed(&self) -> bool {
        self.width() <= self.precision
    }
}
