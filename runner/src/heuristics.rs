//! Maps the five named `--heuristic` values (§6) onto `crate::algo::heuristics`'s
//! primitives. Applied once, right after loading, before any query runs.

use crate::config::HeuristicKind;
use crate::graph_load::RunnerGraph;
use ev_tradeoff_router::algo::heuristics;

/// `only_fast`/`no_slow_charger`/`no_super_charger` all threshold chargers
/// by rate; since §6 names them without an accompanying numeric flag, the
/// threshold is derived from the network's own charger rates rather than
/// invented out of thin air: the median of all `max_rate()`s splits the
/// network into a "fast" and "slow" half.
fn median_max_rate(graph: &RunnerGraph) -> f64 {
    let mut rates: Vec<f64> = graph.chargers().iter().flatten().map(|c| c.max_rate()).collect();
    if rates.is_empty() {
        return 0.0;
    }
    rates.sort_by(|a, b| a.partial_cmp(b).unwrap());
    rates[rates.len() / 2]
}

/// Drop every charger below `threshold`'s fastest rate from consideration
/// -- done in place by clearing the node's `Charger` slot, rather than
/// filtering the chargers list the search iterates, since the search looks
/// up chargers by node id during relaxation (`TradeoffGraph::charger_at`).
fn drop_chargers_below(graph: &mut RunnerGraph, threshold: f64) {
    for slot in graph.chargers_mut() {
        if let Some(charger) = slot {
            if charger.max_rate() < threshold {
                *slot = None;
            }
        }
    }
}

/// Drop every charger at or above `threshold`'s fastest rate.
fn drop_chargers_at_or_above(graph: &mut RunnerGraph, threshold: f64) {
    for slot in graph.chargers_mut() {
        if let Some(charger) = slot {
            if charger.max_rate() >= threshold {
                *slot = None;
            }
        }
    }
}

/// Apply `kind` to `graph` in place: tradeoff-function simplification
/// (`linear`) rewrites every edge cost; the charger filters prune the
/// per-node charger set the search consults. Must run before
/// `Context::build`, whose derived weight arrays and `rho_min` need to see
/// the graph's post-heuristic shape.
pub fn apply(kind: HeuristicKind, graph: &mut RunnerGraph) {
    match kind {
        HeuristicKind::None => {}
        HeuristicKind::Linear => {
            for f in graph.edge_cost_mut() {
                *f = heuristics::linear_approximation(f);
            }
        }
        HeuristicKind::OnlyFast => {
            let chargers: Vec<_> = graph.chargers().iter().flatten().cloned().collect();
            let n = (chargers.len() / 2).max(1);
            let kept: std::collections::HashSet<usize> = heuristics::top_n_fastest_chargers(&chargers, n).into_iter().collect();
            let mut seen = 0usize;
            for slot in graph.chargers_mut() {
                if slot.is_some() {
                    if !kept.contains(&seen) {
                        *slot = None;
                    }
                    seen += 1;
                }
            }
        }
        HeuristicKind::MinRate => {
            let threshold = median_max_rate(graph);
            drop_chargers_below(graph, threshold);
        }
        HeuristicKind::NoSuperCharger => {
            let threshold = median_max_rate(graph);
            drop_chargers_at_or_above(graph, threshold);
        }
        HeuristicKind::NoSlowCharger => {
            let threshold = median_max_rate(graph);
            drop_chargers_below(graph, threshold);
        }
    }
}
