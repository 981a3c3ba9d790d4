//! A* lower-bound potentials for the label-setting search (§4.4). A
//! potential gives, for a node and the state-of-charge already spent to
//! reach it, a lower bound on the remaining time to the target — used to
//! order the priority queue so labels near the target settle first.

pub mod landmark;
pub mod lazy;
pub mod omega;
pub mod zero;

use crate::algo::function::PiecewiseFunction;
use crate::datastr::graph::NodeId;

/// Common interface the search core drives every potential variant
/// through, so swapping `--potential zero|landmark|omega|lazy-omega`
/// (§6) only changes which implementation gets constructed.
pub trait Potential {
    /// A valid lower bound (unscaled time units) on the remaining duration
    /// to the query's target, given `y` (energy spent so far) at `node`.
    fn potential(&mut self, node: NodeId, y: f64) -> f64;

    /// The priority-queue key bound (§4.4) for a label whose cost function
    /// is `cost`, settled (so far) at `node`: `cost.min_x() + potential` at
    /// the consumption the fastest point implies. Potentials whose bound
    /// depends on more than a single point of `cost` (the omega potential's
    /// `min(tradeoff_key, charging_key)`) override this instead of
    /// `potential`.
    fn key_bound(&mut self, node: NodeId, cost: &PiecewiseFunction) -> f64 {
        cost.min_x() + self.potential(node, cost.min_value())
    }
}

pub use landmark::LandmarkPotential;
pub use lazy::{LazyLandmarkPotential, LazyOmegaPotential};
pub use omega::OmegaPotential;
pub use zero::ZeroPotential;

/// Lets callers pick a potential implementation at runtime (§6's
/// `--potential` flag selects one of five) while `Search` stays generic
/// over `P: Potential` -- a boxed trait object is just another `Potential`.
impl Potential for Box<dyn Potential + '_> {
    fn potential(&mut self, node: NodeId, y: f64) -> f64 {
        (**self).potential(node, y)
    }
    fn key_bound(&mut self, node: NodeId, cost: &PiecewiseFunction) -> f64 {
        (**self).key_bound(node, cost)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use zero::ZeroPotential;

    #[test]
    fn boxed_potential_forwards_to_the_inner_impl() {
        let mut p: Box<dyn Potential> = Box::new(ZeroPotential);
        assert_eq!(p.potential(3, 10.0), 0.0);
    }
}
