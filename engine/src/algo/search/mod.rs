//! The label-setting core (§4.3): an A*-guided multi-criteria Dijkstra
//! whose labels carry whole tradeoff functions instead of scalars.
//!
//! Per §3 ("at most one queue entry per node") the priority queue holds at
//! most one entry per node even though a node may carry several competing
//! unsettled labels: each pop settles only the single cheapest of those
//! labels (ranked by its earliest-arrival-time lower bound, §4.4), then —
//! if others remain — re-inserts the node keyed by the next one.

use crate::algo::function::{charge, dominance, InterpolatingFunction, PiecewiseFunction};
use crate::algo::label::{LabelContainer, LabelEntry};
use crate::algo::potential::Potential;
use crate::datastr::charger::Charger;
use crate::datastr::fixed_point::scale_floor;
use crate::datastr::graph::{EdgeIdT, LinkIterable, NodeId, NodeIdT, INVALID_ID};
use crate::report::report_time_with_key;
use crate::stats::Stats;
use crate::util::index_heap::{IndexdMinHeap, State};

/// Per-edge data the search consults: its tradeoff function and (for the
/// node it leads into) an optional charger.
pub trait TradeoffGraph: LinkIterable<(NodeIdT, EdgeIdT)> {
    fn edge_cost(&self, edge: EdgeIdT) -> &PiecewiseFunction;
    fn charger_at(&self, node: NodeId) -> Option<&Charger>;
}

pub struct SearchResult {
    pub settled_at_target: Vec<LabelEntry>,
    /// Set when the wall-clock budget (§5: "checked at queue-pop
    /// granularity") ran out before the search reached its normal
    /// termination condition. `settled_at_target` still holds whatever was
    /// settled before the cutoff -- a partial, not wrong, result.
    pub timed_out: bool,
}

pub struct Search<'a, P: Potential> {
    num_nodes: usize,
    capacity: f64,
    potential: P,
    labels: LabelContainer,
    heap: IndexdMinHeap<State<i64>>,
    stats: &'a Stats,
}

impl<'a, P: Potential> Search<'a, P> {
    pub fn new(num_nodes: usize, capacity: f64, potential: P, stats: &'a Stats) -> Self {
        Search { num_nodes, capacity, potential, labels: LabelContainer::new(num_nodes), heap: IndexdMinHeap::new(num_nodes), stats }
    }

    /// Scalar key (scaled fixed-point time) for the currently-cheapest
    /// unsettled label at `node`: its cost function's own A*-adjusted
    /// lower bound, via the potential's `key_bound` (§4.4).
    fn best_unsettled_key(&mut self, node: NodeId) -> Option<(usize, i64)> {
        let entries = self.labels.unsettled(node);
        if entries.is_empty() {
            return None;
        }
        let mut best: Option<(usize, i64)> = None;
        for (i, entry) in entries.iter().enumerate() {
            let bound = self.potential.key_bound(node, &entry.cost);
            let key = scale_floor(bound);
            let better = match best {
                Some((_, best_key)) => key < best_key,
                None => true,
            };
            if better {
                best = Some((i, key));
            }
        }
        best
    }

    fn requeue(&mut self, node: NodeId) {
        if let Some((_, key)) = self.best_unsettled_key(node) {
            if self.heap.contains_index(node as usize) {
                if key < self.heap.get(node as usize).unwrap().key {
                    self.heap.decrease_key(State { key, node });
                }
            } else {
                self.heap.push(State { key, node });
            }
        }
    }

    /// Admissible lower bound: is `entry`, settled at `node`, already proven
    /// unable to beat anything settled at `target` so far? (§4.3 "target
    /// stalling", on by default.) Sound because the potential is admissible:
    /// no path through `node` can reach `target` earlier than `lb_time`, and
    /// the tradeoff function is monotone-decreasing, so no extension of
    /// `entry` can reach `target` with less consumption than `entry`'s own
    /// best case either.
    #[cfg(feature = "ev-stall-on-demand")]
    fn target_stalled(&mut self, node: NodeId, target: NodeId, entry: &LabelEntry) -> bool {
        if node == target || self.labels.settled(target).is_empty() {
            return false;
        }
        let lb_time = self.potential.key_bound(node, &entry.cost);
        let best_case_y = entry.cost.min_value();
        self.labels.settled(target).iter().any(|settled| settled.cost.value(lb_time) <= best_case_y + crate::datastr::fixed_point::PIECE_EPS)
    }

    #[cfg(not(feature = "ev-stall-on-demand"))]
    fn target_stalled(&mut self, _node: NodeId, _target: NodeId, _entry: &LabelEntry) -> bool {
        false
    }

    pub fn run<G: TradeoffGraph>(&mut self, graph: &G, source: NodeId, target: NodeId, max_dwell: f64, charging_penalty: f64) -> SearchResult {
        self.run_with_deadline(graph, source, target, max_dwell, charging_penalty, None)
    }

    /// Like [`Search::run`], but abandons the search once `deadline`
    /// passes, checked each time a node is popped off the queue (§5) --
    /// never mid-link, mid-compose, or mid-dominance.
    pub fn run_with_deadline<G: TradeoffGraph>(
        &mut self,
        graph: &G,
        source: NodeId,
        target: NodeId,
        max_dwell: f64,
        charging_penalty: f64,
        deadline: Option<std::time::Instant>,
    ) -> SearchResult {
        self.labels.reset();
        self.heap.clear();
        let mut timed_out = false;

        let initial = LabelEntry {
            cost: PiecewiseFunction::single(crate::algo::function::LimitedFunction::new(0.0, 0.0, crate::algo::function::HypOrLin::constant(0.0))),
            delta: InterpolatingFunction::identity_at_zero(),
            parent_node: INVALID_ID,
            parent_entry: INVALID_ID,
        };
        self.labels.try_insert(source, initial);
        self.requeue(source);

        let mut target_best_key: Option<i64> = None;

        report_time_with_key("search", "search_time", || {
            loop {
                // min-key termination (§4.3): once nothing left in the queue
                // can beat the best label already settled at the target,
                // stop — later pops can only be worse.
                let Some(top) = self.heap.peek() else { break };
                if let Some(best) = target_best_key {
                    if top.key > best + 1 {
                        break;
                    }
                }
                if let Some(deadline) = deadline {
                    if std::time::Instant::now() >= deadline {
                        timed_out = true;
                        break;
                    }
                }

                let State { key: _, node } = self.heap.pop().unwrap();
                let Some((idx, _)) = self.best_unsettled_key(node) else { continue };
                let (entry, settled_idx) = self.labels.settle(node, idx);
                self.stats.inc_settles();

                self.requeue(node);

                if node == target {
                    let key = scale_floor(entry.cost.min_x());
                    target_best_key = Some(target_best_key.map_or(key, |b| b.min(key)));
                }

                if self.target_stalled(node, target, &entry) {
                    self.stats.inc_target_stalls();
                    continue;
                }

                let (propagate_cost, propagate_delta) = match graph.charger_at(node) {
                    Some(charger) => {
                        self.stats.inc_charger_visits();
                        let composed = charge::charge_compose_or_skip(&entry.cost, charger, self.capacity, max_dwell, charging_penalty);
                        let delta = if charging_penalty > 0.0 { entry.delta.shift(charging_penalty, 0.0) } else { entry.delta.clone() };
                        (composed, delta)
                    }
                    None => (entry.cost.clone(), entry.delta.clone()),
                };

                for (NodeIdT(to), EdgeIdT(edge)) in graph.link_iter(node) {
                    // parent-pruning (§4.3): never relax the edge leading
                    // straight back to the node this label arrived from.
                    if to == entry.parent_node {
                        continue;
                    }

                    self.stats.inc_relaxations();
                    let edge_cost = graph.edge_cost(EdgeIdT(edge));
                    let linked = crate::algo::function::link::link(&propagate_cost, edge_cost);
                    let clipped = dominance::limit_from_y(&linked, self.capacity);
                    if clipped.is_empty() {
                        self.stats.inc_dominated_drops();
                        continue;
                    }

                    let candidate = LabelEntry {
                        cost: clipped,
                        delta: propagate_delta.clone(),
                        parent_node: node,
                        parent_entry: settled_idx,
                    };

                    if self.labels.try_insert(to, candidate).is_some() {
                        self.stats.inc_pushes();
                        self.requeue(to);
                    } else {
                        self.stats.inc_dominated_drops();
                    }
                }
            }
        });

        let settled_at_target: Vec<LabelEntry> = self.labels.settled(target).to_vec();
        crate::report!("settled_at_target", settled_at_target.len());
        SearchResult { settled_at_target, timed_out }
    }

    pub fn labels(&self) -> &LabelContainer {
        &self.labels
    }
}

/// Walk settled-label parent pointers back to the source, returning the
/// sequence of `(node, settled_entry_index)` pairs from source to target
/// (§4.3 path reconstruction).
pub fn reconstruct_path(labels: &LabelContainer, target: NodeId, target_entry: u32) -> Vec<(NodeId, u32)> {
    let mut path = vec![(target, target_entry)];
    let mut node = target;
    let mut idx = target_entry;
    loop {
        let entry = labels.settled_entry(node, idx);
        if entry.parent_node == INVALID_ID {
            break;
        }
        node = entry.parent_node;
        idx = entry.parent_entry;
        path.push((node, idx));
    }
    path.reverse();
    path
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::algo::function::{HypOrLin, LimitedFunction};
    use crate::algo::potential::ZeroPotential;

    struct SimpleGraph {
        first_out: Vec<u32>,
        head: Vec<NodeId>,
        cost: Vec<PiecewiseFunction>,
    }

    impl crate::datastr::graph::Graph for SimpleGraph {
        fn num_nodes(&self) -> usize {
            self.first_out.len() - 1
        }
        fn num_arcs(&self) -> usize {
            self.head.len()
        }
        fn degree(&self, node: NodeId) -> usize {
            (self.first_out[node as usize + 1] - self.first_out[node as usize]) as usize
        }
    }

    impl LinkIterable<(NodeIdT, EdgeIdT)> for SimpleGraph {
        type Iter<'a> = std::iter::Map<std::iter::Zip<std::ops::Range<usize>, std::iter::Copied<std::slice::Iter<'a, NodeId>>>, fn((usize, NodeId)) -> (NodeIdT, EdgeIdT)>;

        fn link_iter(&self, node: NodeId) -> Self::Iter<'_> {
            let range = self.first_out[node as usize] as usize..self.first_out[node as usize + 1] as usize;
            range.clone().zip(self.head[range].iter().copied()).map(|(e, h)| (NodeIdT(h), EdgeIdT(e as u32)))
        }
    }

    impl TradeoffGraph for SimpleGraph {
        fn edge_cost(&self, edge: EdgeIdT) -> &PiecewiseFunction {
            &self.cost[edge.0 as usize]
        }
        fn charger_at(&self, _node: NodeId) -> Option<&Charger> {
            None
        }
    }

    #[test]
    fn finds_the_only_path_s1_style() {
        // 0 -> 1, a single constant-cost edge (time=1000, consumption=500).
        let g = SimpleGraph {
            first_out: vec![0, 1, 1],
            head: vec![1],
            cost: vec![PiecewiseFunction::single(LimitedFunction::new(1000.0, 1000.0, HypOrLin::constant(500.0)))],
        };

        let stats = Stats::new();
        let mut search = Search::new(2, 100_000.0, ZeroPotential, &stats);
        let result = search.run(&g, 0, 1, 0.0, 0.0);
        assert_eq!(result.settled_at_target.len(), 1);
        assert!((result.settled_at_target[0].cost.value(1000.0) - 500.0).abs() < 1e-6);
    }

    #[test]
    fn capacity_too_small_yields_no_labels() {
        let g = SimpleGraph {
            first_out: vec![0, 1, 1],
            head: vec![1],
            cost: vec![PiecewiseFunction::single(LimitedFunction::new(1000.0, 1000.0, HypOrLin::constant(500.0)))],
        };
        let stats = Stats::new();
        let mut search = Search::new(2, 100.0, ZeroPotential, &stats);
        let result = search.run(&g, 0, 1, 0.0, 0.0);
        assert!(result.settled_at_target.is_empty());
    }

    #[test]
    fn parent_edge_is_never_relaxed_back() {
        // 0 -> 1 -> 2, plus a back-edge 1 -> 0: settling node 1 must not
        // even attempt relaxing its edge back to 0 (its parent), which we
        // check directly via the relaxation counter rather than the
        // resulting labels (those would also be pruned by dominance here,
        // which wouldn't distinguish the two mechanisms).
        let g = SimpleGraph {
            first_out: vec![0, 1, 2],
            head: vec![1, 0],
            cost: vec![
                PiecewiseFunction::single(LimitedFunction::new(1.0, 1.0, HypOrLin::constant(100.0))),
                PiecewiseFunction::single(LimitedFunction::new(1.0, 1.0, HypOrLin::constant(100.0))),
            ],
        };
        let stats = Stats::new();
        let mut search = Search::new(2, 100_000.0, ZeroPotential, &stats);
        let result = search.run(&g, 0, 1, 0.0, 0.0);
        assert_eq!(result.settled_at_target.len(), 1);
        // only the single 0 -> 1 relaxation should ever have been attempted:
        // settling node 1 must skip its 1 -> 0 edge entirely.
        assert_eq!(stats.snapshot().relaxations, 1);
    }
}
