//! Derive the scalar auxiliary graphs (§2: `MinDuration`, `MinConsumption`,
//! `MaxConsumption`, `Omega`) from the tradeoff graph's per-edge piecewise
//! functions, and the non-negative reweighting (§4.4) the `Omega` graph
//! needs before Dijkstra can run on it.

use crate::algo::function::PiecewiseFunction;
use crate::datastr::fixed_point::scale_floor;
use crate::datastr::graph::{EdgeId, NodeId};
use crate::error::{EngineError, Result};

/// Fastest feasible traversal time for each edge.
pub fn min_duration_weights(tradeoff: &[PiecewiseFunction]) -> Vec<i64> {
    tradeoff.iter().map(|f| scale_floor(f.min_x())).collect()
}

/// Least possible consumption for each edge (driving as slowly as allowed).
pub fn min_consumption_weights(tradeoff: &[PiecewiseFunction]) -> Vec<i64> {
    tradeoff.iter().map(|f| scale_floor(f.value(f.max_x()))).collect()
}

/// Highest possible consumption for each edge (driving as fast as allowed).
pub fn max_consumption_weights(tradeoff: &[PiecewiseFunction]) -> Vec<i64> {
    tradeoff.iter().map(|f| scale_floor(f.min_value())).collect()
}

/// `omega(e) = min_duration(e) + min_consumption(e) / rho_min`: the time it
/// would take to traverse `e` as fast as feasible *and* fully recharge
/// whatever that used, at the network's worst-case charging rate. A valid
/// lower bound on "time including any recharging this edge might force",
/// feeding the omega potential's `d_omega` reverse search (§4.4).
pub fn omega_weights(min_duration: &[i64], min_consumption: &[i64], rho_min: f64) -> Vec<i64> {
    min_duration
        .iter()
        .zip(min_consumption)
        .map(|(&t, &c)| t + (c as f64 / rho_min).ceil() as i64)
        .collect()
}

/// Johnson-style reweighting: `w'(u, v) = w(u, v) + height[u] - height[v]`.
/// `heights` must be a valid feasible potential for `weights` (every edge's
/// shifted weight non-negative) or this fails with the offending edge,
/// rather than silently producing a graph Dijkstra can't safely run on.
pub fn shift_non_negative(weights: &[i64], heights: &[i64], first_out: &[EdgeId], head: &[NodeId]) -> Result<Vec<i64>> {
    let num_nodes = first_out.len() - 1;
    let mut shifted = Vec::with_capacity(weights.len());

    for u in 0..num_nodes {
        let range = first_out[u] as usize..first_out[u + 1] as usize;
        for e in range {
            let v = head[e] as usize;
            let new_weight = weights[e] + heights[u] - heights[v];
            if new_weight < 0 {
                return Err(EngineError::Config(format!(
                    "negative shifted weight on edge ({u} -> {v}): {new_weight} (height[{u}]={}, height[{v}]={})",
                    heights[u], heights[v]
                )));
            }
            shifted.push(new_weight);
        }
    }

    Ok(shifted)
}

/// Recover an original-scale distance from one computed on the
/// height-shifted graph: `d(s, t) == d'(s, t) - height[s] + height[t]`.
pub fn unshift_distance(shifted_distance: i64, height_source: i64, height_target: i64) -> i64 {
    shifted_distance - height_source + height_target
}

/// Verify every edge's tradeoff function is itself monotone-decreasing and
/// convex (§8 property 1) before it's used to derive anything else — a
/// malformed input file should fail loudly at load time, not produce subtly
/// wrong search results.
pub fn consistency_check(tradeoff: &[PiecewiseFunction]) -> Result<()> {
    for (i, f) in tradeoff.iter().enumerate() {
        if f.is_empty() {
            return Err(EngineError::Config(format!("edge {i} has an empty tradeoff function")));
        }
        if !f.is_convex_monotone() {
            return Err(EngineError::Config(format!("edge {i}'s tradeoff function is not convex/monotone-decreasing")));
        }
    }
    Ok(())
}
