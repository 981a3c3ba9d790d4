//! Plain scalar Dijkstra (§4.4): used both to precompute landmark potential
//! lower bounds (one run per landmark, reverse graph) and, inside
//! `crate::algo::potential::omega`, to build the three reverse shortest-path
//! trees (`MinDuration`, `MinConsumption`, `Omega`) the omega potential reads
//! node labels from.

use crate::datastr::graph::{EdgeIdT, LinkIterable, NodeId, NodeIdT, INFINITY};
use crate::datastr::TimestampedVector;
use crate::util::index_heap::{IndexdMinHeap, State};

pub struct Dijkstra {
    dist: TimestampedVector<i64>,
    queue: IndexdMinHeap<State<i64>>,
}

impl Dijkstra {
    pub fn new(num_nodes: usize) -> Self {
        Dijkstra { dist: TimestampedVector::new_with_default(num_nodes, INFINITY), queue: IndexdMinHeap::new(num_nodes) }
    }

    pub fn reset(&mut self) {
        self.dist.reset();
        self.queue.clear();
    }

    /// Run from every node in `sources` simultaneously (multi-source
    /// Dijkstra), calling `weight` to look up each traversed edge's scalar
    /// cost. `weight` takes the edge id as seen by `graph`'s own
    /// `LinkIterable` impl — for `crate::datastr::graph::ReverseGraph`,
    /// that's the *original* forward edge id, letting callers index straight
    /// into the forward weight vector.
    pub fn run<G: LinkIterable<(NodeIdT, EdgeIdT)>>(&mut self, graph: &G, weight: impl Fn(EdgeIdT) -> i64, sources: impl IntoIterator<Item = NodeId>) {
        self.reset();
        for s in sources {
            self.dist[s as usize] = 0;
            self.queue.push(State { key: 0, node: s });
        }

        while let Some(State { key, node }) = self.queue.pop() {
            if key > self.dist[node as usize] {
                continue;
            }
            for (NodeIdT(target), EdgeIdT(edge)) in graph.link_iter(node) {
                let new_dist = key + weight(EdgeIdT(edge));
                if new_dist < self.dist[target as usize] {
                    self.dist[target as usize] = new_dist;
                    if self.queue.contains_index(target as usize) {
                        self.queue.decrease_key(State { key: new_dist, node: target });
                    } else {
                        self.queue.push(State { key: new_dist, node: target });
                    }
                }
            }
        }
    }

    pub fn distance(&self, node: NodeId) -> i64 {
        self.dist[node as usize]
    }

    pub fn distances(&self) -> &TimestampedVector<i64> {
        &self.dist
    }
}

/// A Dijkstra run that can be suspended and resumed: each call to
/// `distance_to` pops further from the frontier only until the requested
/// node is finalized, rather than exhausting the whole graph up front.
/// Backs the lazy A* potentials (§4.4's lazy variants), which only ever
/// need as much of a reverse tree as the forward search has so far asked
/// about.
pub struct LazyDijkstra {
    dist: TimestampedVector<i64>,
    settled: TimestampedVector<bool>,
    queue: IndexdMinHeap<State<i64>>,
}

impl LazyDijkstra {
    pub fn new(num_nodes: usize) -> Self {
        LazyDijkstra {
            dist: TimestampedVector::new_with_default(num_nodes, INFINITY),
            settled: TimestampedVector::new_with_default(num_nodes, false),
            queue: IndexdMinHeap::new(num_nodes),
        }
    }

    pub fn start(&mut self, sources: impl IntoIterator<Item = NodeId>) {
        self.dist.reset();
        self.settled.reset();
        self.queue.clear();
        for s in sources {
            self.dist[s as usize] = 0;
            self.queue.push(State { key: 0, node: s });
        }
    }

    pub fn is_settled(&self, node: NodeId) -> bool {
        self.settled[node as usize]
    }

    /// Lower bound for `node`, expanding the frontier further only as
    /// needed. Once the whole queue has drained, unreached nodes report
    /// `INFINITY` (correct: they are truly unreachable in the reverse
    /// graph).
    pub fn distance_to<G: LinkIterable<(NodeIdT, EdgeIdT)>>(&mut self, graph: &G, weight: impl Fn(EdgeIdT) -> i64, node: NodeId) -> i64 {
        while !self.settled[node as usize] {
            let Some(State { key, node: popped }) = self.queue.pop() else {
                break;
            };
            if key > self.dist[popped as usize] {
                continue;
            }
            self.settled[popped as usize] = true;
            for (NodeIdT(target), EdgeIdT(edge)) in graph.link_iter(popped) {
                let new_dist = key + weight(EdgeIdT(edge));
                if new_dist < self.dist[target as usize] {
                    self.dist[target as usize] = new_dist;
                    if self.queue.contains_index(target as usize) {
                        self.queue.decrease_key(State { key: new_dist, node: target });
                    } else {
                        self.queue.push(State { key: new_dist, node: target });
                    }
                }
            }
        }
        self.dist[node as usize]
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::datastr::graph::{BuildReversed, FirstOutGraph, ReverseGraph};

    #[test]
    fn shortest_paths_on_a_small_reversed_graph() {
        // 0 -> 1 (10), 0 -> 2 (5), 1 -> 2 (1)
        let g = FirstOutGraph::new(vec![0, 2, 3, 3], vec![1, 2, 2], vec![10i64, 5, 1]);
        let rev = ReverseGraph::reversed(&g);
        let mut dijkstra = Dijkstra::new(3);
        dijkstra.run(&rev, |EdgeIdT(e)| g.weight()[e as usize], [2]);
        assert_eq!(dijkstra.distance(2), 0);
        assert_eq!(dijkstra.distance(1), 1);
        assert_eq!(dijkstra.distance(0), 5);
    }

    #[test]
    fn unreachable_nodes_stay_at_infinity() {
        let g = FirstOutGraph::new(vec![0, 1, 1], vec![1], vec![3i64]);
        let rev = ReverseGraph::reversed(&g);
        let mut dijkstra = Dijkstra::new(2);
        dijkstra.run(&rev, |EdgeIdT(e)| g.weight()[e as usize], [0]);
        assert_eq!(dijkstra.distance(1), INFINITY);
    }

    #[test]
    fn lazy_dijkstra_matches_eager_dijkstra() {
        let g = FirstOutGraph::new(vec![0, 2, 3, 3], vec![1, 2, 2], vec![10i64, 5, 1]);
        let rev = ReverseGraph::reversed(&g);

        let mut eager = Dijkstra::new(3);
        eager.run(&rev, |EdgeIdT(e)| g.weight()[e as usize], [2]);

        let mut lazy = LazyDijkstra::new(3);
        lazy.start([2]);
        for node in [2, 1, 0] {
            assert_eq!(lazy.distance_to(&rev, |EdgeIdT(e)| g.weight()[e as usize], node), eager.distance(node));
        }
    }
}
