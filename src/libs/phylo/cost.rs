use super::node::NodeId;
use super::tree::Tree;
use std::fmt;
use std::ops::Add;

/// A duplication/loss event count pair.
///
/// # Example
/// ```
/// use urec::libs::phylo::cost::DlCost;
/// let c = DlCost::new(1, 2) + DlCost::new(0, 3);
/// assert_eq!(c, DlCost::new(1, 5));
/// assert_eq!(c.to_string(), "(1,5)");
/// ```
#[derive(Debug, Default, Clone, Copy, PartialEq, Eq)]
pub struct DlCost {
    pub dup: usize,
    pub loss: usize,
}

impl DlCost {
    pub fn new(dup: usize, loss: usize) -> Self {
        Self { dup, loss }
    }

    /// Scalar mutation cost under the given weights.
    ///
    /// # Example
    /// ```
    /// use urec::libs::phylo::cost::{CostWeights, DlCost};
    /// let w = CostWeights { dup: 10.0, loss: 1.0 };
    /// assert_eq!(DlCost::new(1, 2).mut_cost(&w), 12.0);
    /// ```
    pub fn mut_cost(&self, weights: &CostWeights) -> f64 {
        weights.dup * self.dup as f64 + weights.loss * self.loss as f64
    }
}

impl Add for DlCost {
    type Output = DlCost;

    fn add(self, other: DlCost) -> DlCost {
        DlCost {
            dup: self.dup + other.dup,
            loss: self.loss + other.loss,
        }
    }
}

impl fmt::Display for DlCost {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "({},{})", self.dup, self.loss)
    }
}

/// Weights applied to duplication and loss counts when comparing costs.
/// Read-only after initialization; threaded explicitly through every
/// comparison site.
#[derive(Debug, Clone, Copy)]
pub struct CostWeights {
    pub dup: f64,
    pub loss: f64,
}

impl Default for CostWeights {
    fn default() -> Self {
        Self {
            dup: 1.0,
            loss: 1.0,
        }
    }
}

/// Number of losses implied by an internal node mapped to `s` whose
/// children map to `s1` and `s2`. `s` must be the LCA of `s1` and `s2`.
pub fn loss_events(tree: &Tree, s: NodeId, s1: NodeId, s2: NodeId) -> usize {
    let d = |id: NodeId| tree.node(id).depth;
    if s != s1 && s != s2 {
        d(s1) + d(s2) - 2 * d(s) - 2
    } else if s != s1 {
        d(s1) - d(s)
    } else {
        d(s2) - d(s)
    }
}

/// A duplication occurs when the LCA of the children's mappings equals
/// one of them.
pub fn dup_events(s: NodeId, s1: NodeId, s2: NodeId) -> usize {
    if s == s1 || s == s2 {
        1
    } else {
        0
    }
}
