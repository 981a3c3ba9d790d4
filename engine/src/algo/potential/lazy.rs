//! Lazy variants of the landmark/omega potentials (§4.4): instead of
//! precomputing a full reverse tree before the forward search starts, each
//! of the three underlying reverse searches is only ever expanded as far
//! as the forward search has actually asked, via `LazyDijkstra`. Pays off
//! on point-to-point queries where the forward search settles the target
//! long before a full reverse tree would have been built.

use super::Potential;
use crate::algo::dijkstra::LazyDijkstra;
use crate::algo::function::PiecewiseFunction;
use crate::algo::preprocessing::unshift_distance;
use crate::datastr::graph::{EdgeIdT, LinkIterable, NodeId, NodeIdT};

/// Lazy counterpart of [`super::LandmarkPotential`]: the `MinDuration`
/// reverse tree from the query's target is expanded incrementally, exactly
/// as far as the forward search has so far needed. Ignores `y`, same as
/// its eager sibling, since `MinDuration` carries no consumption
/// information.
pub struct LazyLandmarkPotential<'g, G> {
    reverse_min_duration: &'g G,
    forward_duration: &'g [i64],
    dt_search: LazyDijkstra,
}

impl<'g, G: LinkIterable<(NodeIdT, EdgeIdT)>> LazyLandmarkPotential<'g, G> {
    pub fn new(reverse_min_duration: &'g G, forward_duration: &'g [i64], num_nodes: usize, target: NodeId) -> Self {
        let mut dt_search = LazyDijkstra::new(num_nodes);
        dt_search.start([target]);
        LazyLandmarkPotential { reverse_min_duration, forward_duration, dt_search }
    }
}

impl<'g, G: LinkIterable<(NodeIdT, EdgeIdT)>> Potential for LazyLandmarkPotential<'g, G> {
    fn potential(&mut self, node: NodeId, _y: f64) -> f64 {
        self.dt_search.distance_to(self.reverse_min_duration, |EdgeIdT(e)| self.forward_duration[e as usize], node) as f64
    }
}

pub struct LazyOmegaPotential<'g, G> {
    reverse_min_duration: &'g G,
    forward_duration: &'g [i64],
    reverse_min_consumption: &'g G,
    forward_consumption: &'g [i64],
    reverse_omega: &'g G,
    forward_omega_weight: &'g [i64],
    dt_search: LazyDijkstra,
    dc_search: LazyDijkstra,
    domega_search: LazyDijkstra,
    capacity: f64,
    rho_min: f64,
    /// Johnson-shift heights, see `OmegaPotential::with_heights`. Empty
    /// when the caller already guaranteed non-negative omega weights.
    heights: &'g [i64],
    target_height: i64,
}

impl<'g, G: LinkIterable<(NodeIdT, EdgeIdT)>> LazyOmegaPotential<'g, G> {
    #[allow(clippy::too_many_arguments)]
    pub fn new(
        reverse_min_duration: &'g G,
        forward_duration: &'g [i64],
        reverse_min_consumption: &'g G,
        forward_consumption: &'g [i64],
        reverse_omega: &'g G,
        forward_omega_weight: &'g [i64],
        num_nodes: usize,
        target: NodeId,
        capacity: f64,
        rho_min: f64,
    ) -> Self {
        Self::with_heights(
            reverse_min_duration,
            forward_duration,
            reverse_min_consumption,
            forward_consumption,
            reverse_omega,
            forward_omega_weight,
            num_nodes,
            target,
            capacity,
            rho_min,
            &[],
        )
    }

    #[allow(clippy::too_many_arguments)]
    pub fn with_heights(
        reverse_min_duration: &'g G,
        forward_duration: &'g [i64],
        reverse_min_consumption: &'g G,
        forward_consumption: &'g [i64],
        reverse_omega: &'g G,
        forward_omega_weight: &'g [i64],
        num_nodes: usize,
        target: NodeId,
        capacity: f64,
        rho_min: f64,
        heights: &'g [i64],
    ) -> Self {
        let mut dt_search = LazyDijkstra::new(num_nodes);
        dt_search.start([target]);
        let mut dc_search = LazyDijkstra::new(num_nodes);
        dc_search.start([target]);
        let mut domega_search = LazyDijkstra::new(num_nodes);
        domega_search.start([target]);

        LazyOmegaPotential {
            reverse_min_duration,
            forward_duration,
            reverse_min_consumption,
            forward_consumption,
            reverse_omega,
            forward_omega_weight,
            dt_search,
            dc_search,
            domega_search,
            capacity,
            rho_min,
            target_height: heights.get(target as usize).copied().unwrap_or(0),
            heights,
        }
    }
}

impl<'g, G: LinkIterable<(NodeIdT, EdgeIdT)>> LazyOmegaPotential<'g, G> {
    fn d_omega_at(&mut self, node: NodeId) -> f64 {
        let raw_omega = self
            .domega_search
            .distance_to(self.reverse_omega, |EdgeIdT(e)| self.forward_omega_weight[e as usize], node);
        if self.heights.is_empty() {
            raw_omega as f64
        } else {
            unshift_distance(raw_omega, self.heights[node as usize], self.target_height) as f64
        }
    }
}

impl<'g, G: LinkIterable<(NodeIdT, EdgeIdT)>> Potential for LazyOmegaPotential<'g, G> {
    fn potential(&mut self, node: NodeId, y: f64) -> f64 {
        let d_t = self.dt_search.distance_to(self.reverse_min_duration, |EdgeIdT(e)| self.forward_duration[e as usize], node) as f64;
        let d_c = self.dc_search.distance_to(self.reverse_min_consumption, |EdgeIdT(e)| self.forward_consumption[e as usize], node) as f64;

        if y + d_c <= self.capacity {
            d_t
        } else {
            let d_omega = self.d_omega_at(node);
            d_omega + (self.capacity - y) / self.rho_min
        }
    }

    /// Two-part key (§4.4), as `OmegaPotential::key_bound` -- see there for
    /// the derivation of `tradeoff_key`/`charging_key`.
    fn key_bound(&mut self, node: NodeId, cost: &PiecewiseFunction) -> f64 {
        let d_t = self.dt_search.distance_to(self.reverse_min_duration, |EdgeIdT(e)| self.forward_duration[e as usize], node) as f64;
        let d_c = self.dc_search.distance_to(self.reverse_min_consumption, |EdgeIdT(e)| self.forward_consumption[e as usize], node) as f64;
        let d_omega = self.d_omega_at(node);

        let remaining_capacity = self.capacity - d_c;
        let tradeoff_key = if cost.min_value() <= remaining_capacity {
            cost.min_x() + d_t
        } else {
            cost.inverse(remaining_capacity) + d_t
        };

        let x_omega = cost.inverse_deriv(-self.rho_min).clamp(cost.min_x(), cost.max_x());
        let charging_key = x_omega + d_omega + (self.capacity - cost.value(x_omega)) / self.rho_min;

        tradeoff_key.min(charging_key)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::datastr::graph::{BuildReversed, FirstOutGraph, Reversed};

    #[test]
    fn matches_eager_omega_potential_bound() {
        let g = FirstOutGraph::new(vec![0, 1, 1], vec![1], vec![100i64]);
        let rev = FirstOutGraph::<(NodeIdT, Reversed)>::reversed(&g);
        let consumption = vec![10i64];
        let mut p = LazyOmegaPotential::new(&rev, g.weight(), &rev, &consumption, &rev, g.weight(), 2, 1, 1000.0, 1.0);
        assert_eq!(p.potential(0, 0.0), 100.0);
        assert_eq!(p.potential(1, 0.0), 0.0);
    }

    #[test]
    fn lazy_landmark_matches_eager_landmark_potential() {
        let g = FirstOutGraph::new(vec![0, 2, 3, 3], vec![1, 2, 2], vec![10i64, 5, 1]);
        let rev = FirstOutGraph::<(NodeIdT, Reversed)>::reversed(&g);
        let mut p = LazyLandmarkPotential::new(&rev, g.weight(), 3, 2);
        assert_eq!(p.potential(2, 0.0), 0.0);
        assert_eq!(p.potential(1, 0.0), 1.0);
        assert_eq!(p.potential(0, 0.0), 5.0);
    }

    #[test]
    fn lazy_key_bound_matches_eager_key_bound() {
        use crate::algo::function::{HypOrLin, LimitedFunction, PiecewiseFunction};
        use crate::algo::potential::OmegaPotential;

        let g = FirstOutGraph::new(vec![0, 1, 1], vec![1], vec![1000i64]);
        let rev = FirstOutGraph::<(NodeIdT, Reversed)>::reversed(&g);
        let consumption = vec![0i64];
        let omega_weight = vec![5i64];
        let cost = PiecewiseFunction::new(vec![
            LimitedFunction::new(0.0, 10.0, HypOrLin::linear(-5.0, 0.0, 100.0)),
            LimitedFunction::new(10.0, 40.0, HypOrLin::linear(-1.0, 10.0, 50.0)),
        ]);

        let mut eager = OmegaPotential::new(&rev, g.weight(), &rev, &consumption, &rev, &omega_weight, 2, 1, 200.0, 1.0);
        let mut lazy = LazyOmegaPotential::new(&rev, g.weight(), &rev, &consumption, &rev, &omega_weight, 2, 1, 200.0, 1.0);
        assert_eq!(lazy.key_bound(0, &cost), eager.key_bound(0, &cost));
    }
}
