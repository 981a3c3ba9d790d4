//! Per-process query context: the loaded tradeoff graph plus the three
//! derived scalar graphs (§2: `MinDuration`, `MinConsumption`, `Omega`) the
//! A* potentials run their reverse searches over, built once and shared
//! read-only across query threads.
//!
//! `crate::preprocessing`'s own weight derivations (`min_duration_weights`
//! et al.) return fixed-point-scaled (`x * R`) integers, a convention
//! matched to the binary derived-graph file format. The potentials, by
//! contrast, are combined with `label.cost.min_x()` -- which stays in the
//! *unscaled* float domain throughout the function algebra -- so feeding
//! them the `R`-scaled arrays would inflate every lower bound by three
//! orders of magnitude and silently break admissibility. This module
//! builds its own unscaled native versions directly from the tradeoff
//! functions instead, keeping every potential's output in the same domain
//! as the search's own arrival times.

use crate::graph_load::RunnerGraph;
use ev_tradeoff_router::algo::function::PiecewiseFunction;
use ev_tradeoff_router::algo::preprocessing;
use ev_tradeoff_router::datastr::graph::{BuildReversed, FirstOutGraph, Graph, NodeIdT, Reversed};
use ev_tradeoff_router::error::Result;

fn native_min_duration(tradeoff: &[PiecewiseFunction]) -> Vec<i64> {
    tradeoff.iter().map(|f| f.min_x().round() as i64).collect()
}

fn native_min_consumption(tradeoff: &[PiecewiseFunction]) -> Vec<i64> {
    tradeoff.iter().map(|f| f.value(f.max_x()).round() as i64).collect()
}

/// Reverse adjacency, tagged with the original edge id (`Reversed`), shared
/// by every potential's reverse searches.
pub type ReverseGraph = FirstOutGraph<(NodeIdT, Reversed)>;

pub struct Context {
    pub graph: RunnerGraph,
    pub reverse: ReverseGraph,
    pub min_duration: Vec<i64>,
    pub min_consumption: Vec<i64>,
    pub omega_weight: Vec<i64>,
    /// Non-empty only if `omega_weight` needed a Johnson shift to become
    /// non-negative (§4.4); passed to `OmegaPotential::with_heights`.
    pub omega_heights: Vec<i64>,
    pub capacity: f64,
    pub rho_min: f64,
}

impl Context {
    pub fn build(graph: RunnerGraph, heights: &[i32], capacity: f64) -> Result<Self> {
        let min_duration = native_min_duration(graph.edge_cost_slice());
        let min_consumption = native_min_consumption(graph.edge_cost_slice());

        let rho_min = graph
            .chargers()
            .iter()
            .flatten()
            .map(|c| c.min_rate())
            .filter(|r| *r > 0.0)
            .fold(f64::INFINITY, f64::min);
        let rho_min = if rho_min.is_finite() { rho_min } else { 1.0 };

        let raw_omega = preprocessing::omega_weights(&min_duration, &min_consumption, rho_min);
        let (omega_weight, omega_heights) = if raw_omega.iter().all(|&w| w >= 0) {
            (raw_omega, Vec::new())
        } else {
            let node_heights: Vec<i64> = heights.iter().map(|&h| h as i64).collect();
            let shifted = preprocessing::shift_non_negative(&raw_omega, &node_heights, graph.first_out(), graph.head())?;
            (shifted, node_heights)
        };

        let reverse = ReverseGraph::reversed(graph.inner());

        Ok(Context { graph, reverse, min_duration, min_consumption, omega_weight, omega_heights, capacity, rho_min })
    }

    pub fn num_nodes(&self) -> usize {
        self.graph.num_nodes()
    }
}
