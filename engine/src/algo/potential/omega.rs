//! The omega potential (§4.4), ported from `include/ev/node_potentials.hpp`'s
//! `OmegaNodePotentials`: combine three reverse shortest-path trees —
//! `MinDuration` (`d_t`), `MinConsumption` (`d_c`) and `Omega` (`d_omega`,
//! run over the non-negative-shifted Omega graph, §4.4) — into a single
//! bound that accounts for the possibility of needing to recharge before
//! reaching the target.
//!
//! `d_omega`'s graph has had a per-node height shift applied so every edge
//! weight is non-negative (`crate::algo::preprocessing::shift_for_omega`);
//! the stored `alpha` undoes that shift's effect on the raw distance so the
//! value returned here is directly comparable to `d_t`/time units.

use super::Potential;
use crate::algo::dijkstra::Dijkstra;
use crate::algo::function::PiecewiseFunction;
use crate::algo::preprocessing::unshift_distance;
use crate::datastr::graph::{EdgeIdT, LinkIterable, NodeId, NodeIdT};

pub struct OmegaPotential {
    d_t: Vec<i64>,
    d_c: Vec<i64>,
    d_omega: Vec<i64>,
    /// Per-node heights (§4.4 Johnson reweighting) used to undo the shift
    /// applied to the Omega graph's weights before Dijkstra ran on it
    /// (regenerative-braking edges can make raw omega weights negative).
    /// Empty when the caller already passed non-negative, unshifted
    /// weights (the common case when the network has no negative edges).
    heights: Vec<i64>,
    target_height: i64,
    capacity: f64,
    /// Slowest charging rate reachable anywhere in the network (energy per
    /// scaled time unit) — the asymptotic worst case used once a detour to
    /// recharge becomes unavoidable.
    rho_min: f64,
}

impl OmegaPotential {
    #[allow(clippy::too_many_arguments)]
    pub fn new<G: LinkIterable<(NodeIdT, EdgeIdT)>>(
        reverse_min_duration: &G,
        forward_duration: &[i64],
        reverse_min_consumption: &G,
        forward_consumption: &[i64],
        reverse_omega: &G,
        forward_omega_weight: &[i64],
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

    /// Like [`OmegaPotential::new`], but `heights` holds the per-node
    /// Johnson potential the Omega graph's weights were shifted by
    /// (`crate::algo::preprocessing::shift_non_negative`) — pass an empty
    /// slice when the caller already knows the omega weights are
    /// non-negative and skipped shifting.
    #[allow(clippy::too_many_arguments)]
    pub fn with_heights<G: LinkIterable<(NodeIdT, EdgeIdT)>>(
        reverse_min_duration: &G,
        forward_duration: &[i64],
        reverse_min_consumption: &G,
        forward_consumption: &[i64],
        reverse_omega: &G,
        forward_omega_weight: &[i64],
        num_nodes: usize,
        target: NodeId,
        capacity: f64,
        rho_min: f64,
        heights: &[i64],
    ) -> Self {
        let mut dt_search = Dijkstra::new(num_nodes);
        dt_search.run(reverse_min_duration, |EdgeIdT(e)| forward_duration[e as usize], [target]);

        let mut dc_search = Dijkstra::new(num_nodes);
        dc_search.run(reverse_min_consumption, |EdgeIdT(e)| forward_consumption[e as usize], [target]);

        let mut domega_search = Dijkstra::new(num_nodes);
        domega_search.run(reverse_omega, |EdgeIdT(e)| forward_omega_weight[e as usize], [target]);

        OmegaPotential {
            d_t: (0..num_nodes as NodeId).map(|n| dt_search.distance(n)).collect(),
            d_c: (0..num_nodes as NodeId).map(|n| dc_search.distance(n)).collect(),
            d_omega: (0..num_nodes as NodeId).map(|n| domega_search.distance(n)).collect(),
            heights: heights.to_vec(),
            target_height: heights.get(target as usize).copied().unwrap_or(0),
            capacity,
            rho_min,
        }
    }

    fn d_omega_at(&self, node: NodeId) -> f64 {
        let raw = self.d_omega[node as usize];
        if self.heights.is_empty() {
            raw as f64
        } else {
            unshift_distance(raw, self.heights[node as usize], self.target_height) as f64
        }
    }
}

impl Potential for OmegaPotential {
    fn potential(&mut self, node: NodeId, y: f64) -> f64 {
        let idx = node as usize;
        let d_t = self.d_t[idx] as f64;
        let d_c = self.d_c[idx] as f64;

        if y + d_c <= self.capacity {
            // remaining battery covers the fastest route without recharging.
            d_t
        } else {
            self.d_omega_at(node) + (self.capacity - y) / self.rho_min
        }
    }

    /// The two-part key (§4.4): `min(tradeoff_key, charging_key)`, where
    /// `tradeoff_key` accounts for slowing down (spending less energy by
    /// taking longer) to stay within the remaining battery budget, and
    /// `charging_key` accounts for stopping to recharge instead. Both read
    /// the label's whole cost function `cost` rather than a single point,
    /// unlike the scalar `potential` above.
    fn key_bound(&mut self, node: NodeId, cost: &PiecewiseFunction) -> f64 {
        let idx = node as usize;
        let d_t = self.d_t[idx] as f64;
        let d_c = self.d_c[idx] as f64;
        let d_omega = self.d_omega_at(node);

        // Energy still available at `node` once enough is reserved to
        // finish the trip along the cheapest remaining route without
        // charging again.
        let remaining_capacity = self.capacity - d_c;
        let tradeoff_key = if cost.min_value() <= remaining_capacity {
            cost.min_x() + d_t
        } else {
            cost.inverse(remaining_capacity) + d_t
        };

        // The point on `cost` where slowing down further saves energy more
        // slowly than charging at `rho_min` would gain it -- past that
        // point charging wins, so `charging_key` uses it rather than
        // `cost`'s own fastest point.
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
    fn falls_back_to_min_duration_when_battery_suffices() {
        let g = FirstOutGraph::new(vec![0, 1, 1], vec![1], vec![100i64]);
        let rev = FirstOutGraph::<(NodeIdT, Reversed)>::reversed(&g);
        let consumption = vec![10i64];
        let mut p = OmegaPotential::new(&rev, g.weight(), &rev, &consumption, &rev, g.weight(), 2, 1, 1000.0, 1.0);
        assert_eq!(p.potential(0, 0.0), 100.0);
    }

    #[test]
    fn falls_back_to_charging_bound_when_battery_insufficient() {
        let g = FirstOutGraph::new(vec![0, 1, 1], vec![1], vec![100i64]);
        let rev = FirstOutGraph::<(NodeIdT, Reversed)>::reversed(&g);
        let consumption = vec![500i64];
        let mut p = OmegaPotential::new(&rev, g.weight(), &rev, &consumption, &rev, g.weight(), 2, 1, 100.0, 2.0);
        // y=0, d_c=500 > capacity=100: must fall into the charging branch.
        let bound = p.potential(0, 0.0);
        assert_eq!(bound, 100.0 + (100.0 - 0.0) / 2.0);
    }

    #[test]
    fn heights_undo_the_johnson_shift_before_use() {
        // 0 -> 1, raw omega weight -50 (e.g. downhill regen), height[0]=0,
        // height[1]=100 makes the shifted weight 50 (non-negative). The
        // reverse search runs on the shifted weight; the potential must
        // subtract the shift back out before combining it with `rho_min`.
        let g = FirstOutGraph::new(vec![0, 1, 1], vec![1], vec![50i64]);
        let rev = FirstOutGraph::<(NodeIdT, Reversed)>::reversed(&g);
        let consumption = vec![500i64];
        let heights = vec![0i64, 100i64];
        let mut p = OmegaPotential::with_heights(&rev, g.weight(), &rev, &consumption, &rev, g.weight(), 2, 1, 100.0, 2.0, &heights);
        // unshift_distance(50, heights[0]=0, heights[1]=100) = 50 - 0 + 100 = 150
        let bound = p.potential(0, 0.0);
        assert_eq!(bound, 150.0 + (100.0 - 0.0) / 2.0);
    }

    #[test]
    fn key_bound_takes_the_charging_branch_when_it_is_tighter() {
        use crate::algo::function::{HypOrLin, LimitedFunction, PiecewiseFunction};

        let g = FirstOutGraph::new(vec![0, 1, 1], vec![1], vec![1000i64]);
        let rev = FirstOutGraph::<(NodeIdT, Reversed)>::reversed(&g);
        let consumption = vec![0i64];
        let omega_weight = vec![5i64];
        let mut p = OmegaPotential::new(&rev, g.weight(), &rev, &consumption, &rev, &omega_weight, 2, 1, 200.0, 1.0);

        // fastest point costs 100 energy, tapering to -1 energy/s after x=10.
        let cost = PiecewiseFunction::new(vec![
            LimitedFunction::new(0.0, 10.0, HypOrLin::linear(-5.0, 0.0, 100.0)),
            LimitedFunction::new(10.0, 40.0, HypOrLin::linear(-1.0, 10.0, 50.0)),
        ]);

        // tradeoff_key = 0 + d_t(1000) = 1000 (battery trivially suffices).
        // charging_key: x_omega = 10 (piece 2's slope matches rho_min=1
        // exactly), charging_key = 10 + d_omega(5) + (200 - 50)/1 = 165.
        assert_eq!(p.key_bound(0, &cost), 165.0);
    }

    #[test]
    fn key_bound_clamps_x_omega_to_the_fastest_point_when_nothing_is_steep_enough() {
        use crate::algo::function::{HypOrLin, LimitedFunction, PiecewiseFunction};

        let g = FirstOutGraph::new(vec![0, 1, 1], vec![1], vec![30i64]);
        let rev = FirstOutGraph::<(NodeIdT, Reversed)>::reversed(&g);
        let consumption = vec![20i64];
        let omega_weight = vec![10i64];
        let mut p = OmegaPotential::new(&rev, g.weight(), &rev, &consumption, &rev, &omega_weight, 2, 1, 100.0, 5.0);

        let cost = PiecewiseFunction::single(LimitedFunction::new(0.0, 80.0, HypOrLin::linear(-1.0, 0.0, 20.0)));

        // remaining_capacity = 100 - 20 = 80 >= cost.min_value() = 20, so
        // tradeoff_key = 0 + d_t(30) = 30. No piece is as steep as
        // rho_min=5, so x_omega clamps to the fastest point (x=0):
        // charging_key = 0 + d_omega(10) + (100 - 20)/5 = 26.
        assert_eq!(p.key_bound(0, &cost), 26.0);
    }
}
