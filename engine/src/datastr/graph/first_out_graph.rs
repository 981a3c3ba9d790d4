//! The forward-star adjacency representation named in §3: `first_out[n+1]`,
//! `head[m]`, `weight[m]`. Generic over the weight type so the same layout
//! backs the tradeoff graph (`LimitedFunction<HypOrLin>` weights), the
//! scalar landmark graphs (`i64` weights) and the reversed copies built for
//! the three reverse searches in §4.4.

use super::*;
use std::ops::Range;

/// Immutable forward-star graph. Construction happens once, up front;
/// `crate::datastr::graph` intentionally exposes no mutation API — the
/// adjacency representation is immutable after construction (§3).
#[derive(Debug, Clone)]
pub struct FirstOutGraph<W> {
    first_out: Vec<EdgeId>,
    head: Vec<NodeId>,
    weight: Vec<W>,
}

impl<W> FirstOutGraph<W> {
    pub fn new(first_out: Vec<EdgeId>, head: Vec<NodeId>, weight: Vec<W>) -> Self {
        debug_assert_eq!(head.len(), weight.len());
        debug_assert_eq!(*first_out.last().unwrap() as usize, head.len());
        Self { first_out, head, weight }
    }

    pub fn first_out(&self) -> &[EdgeId] {
        &self.first_out
    }
    pub fn head(&self) -> &[NodeId] {
        &self.head
    }
    pub fn weight(&self) -> &[W] {
        &self.weight
    }
    pub fn weight_mut(&mut self) -> &mut [W] {
        &mut self.weight
    }
}

impl<W> Graph for FirstOutGraph<W> {
    fn num_nodes(&self) -> usize {
        self.first_out.len() - 1
    }
    fn num_arcs(&self) -> usize {
        self.head.len()
    }
    fn degree(&self, node: NodeId) -> usize {
        let n = node as usize;
        (self.first_out[n + 1] - self.first_out[n]) as usize
    }
}

impl<W> RandomLinkAccessGraph for FirstOutGraph<W> {
    fn head(&self, edge: EdgeId) -> NodeId {
        self.head[edge as usize]
    }
    fn edge_index(&self, from: NodeId, to: NodeId) -> Option<EdgeId> {
        let range = self.neighbor_edge_indices_usize(from);
        self.head[range.clone()].iter().position(|&h| h == to).map(|i| (range.start + i) as EdgeId)
    }
    fn neighbor_edge_indices(&self, node: NodeId) -> Range<EdgeId> {
        let n = node as usize;
        self.first_out[n]..self.first_out[n + 1]
    }
}

impl<W: Copy> LinkIterable<NodeIdT> for FirstOutGraph<W> {
    type Iter<'a>
        = std::iter::Map<std::iter::Copied<std::slice::Iter<'a, NodeId>>, fn(NodeId) -> NodeIdT>
    where
        W: 'a;

    fn link_iter(&self, node: NodeId) -> Self::Iter<'_> {
        let range = self.neighbor_edge_indices_usize(node);
        self.head[range].iter().copied().map(NodeIdT)
    }
}

impl<W: Copy> LinkIterable<(NodeIdT, EdgeIdT)> for FirstOutGraph<W> {
    type Iter<'a>
        = std::iter::Map<std::iter::Zip<std::ops::Range<usize>, std::iter::Copied<std::slice::Iter<'a, NodeId>>>, fn((usize, NodeId)) -> (NodeIdT, EdgeIdT)>
    where
        W: 'a;

    fn link_iter(&self, node: NodeId) -> Self::Iter<'_> {
        let range = self.neighbor_edge_indices_usize(node);
        range.clone().zip(self.head[range].iter().copied()).map(|(e, h)| (NodeIdT(h), EdgeIdT(e as EdgeId)))
    }
}

impl<W: Copy> BuildReversed<FirstOutGraph<W>> for FirstOutGraph<(NodeIdT, Reversed)> {
    /// Reverse all edges, tagging each reversed link with the id it had in
    /// the forward graph so a weight array indexed by that id can still be
    /// used (`crate::algo::dijkstra` reverse runs over `MinDuration`,
    /// `MinConsumption` and `Omega` consult the original weight vectors).
    fn reversed(graph: &FirstOutGraph<W>) -> Self {
        let n = graph.num_nodes();
        let m = graph.num_arcs();
        let mut degree = vec![0u32; n + 1];
        for &h in &graph.head {
            degree[h as usize + 1] += 1;
        }
        for i in 0..n {
            degree[i + 1] += degree[i];
        }
        let first_out = degree.clone();
        let mut next_slot = degree;
        let mut head = vec![0u32; m];
        let mut weight = vec![(NodeIdT(0), Reversed(EdgeIdT(0))); m];

        for node in 0..n as NodeId {
            for (NodeIdT(target), EdgeIdT(edge)) in LinkIterable::<(NodeIdT, EdgeIdT)>::link_iter(graph, node) {
                let slot = next_slot[target as usize] as usize;
                next_slot[target as usize] += 1;
                head[slot] = node;
                weight[slot] = (NodeIdT(node), Reversed(EdgeIdT(edge)));
            }
        }

        FirstOutGraph::new(first_out, head, weight)
    }
}

/// The reverse-search graph the landmark/omega potentials (§4.4) run over.
///
/// Its links carry the *forward* graph's edge id, recovered from each slot's
/// `Reversed` payload rather than the slot's own position: after reversal,
/// edges are bucketed by target node, so a link's position in `head`/`weight`
/// no longer coincides with its original edge id in general (only a graph
/// whose target buckets happen to come out in edge-id order would make the
/// two agree, which is why a naive positional `LinkIterable` impl can look
/// right on a small test graph and still be wrong). This type exists
/// specifically so callers that need the original id — to index
/// `min_duration`/`min_consumption`/`omega_weight`, all built over the
/// forward edge numbering — get it correctly instead of a plausible-looking
/// slot index.
#[derive(Debug, Clone)]
pub struct ReverseGraph {
    inner: FirstOutGraph<(NodeIdT, Reversed)>,
}

impl Graph for ReverseGraph {
    fn num_nodes(&self) -> usize {
        self.inner.num_nodes()
    }
    fn num_arcs(&self) -> usize {
        self.inner.num_arcs()
    }
    fn degree(&self, node: NodeId) -> usize {
        self.inner.degree(node)
    }
}

impl RandomLinkAccessGraph for ReverseGraph {
    fn head(&self, edge: EdgeId) -> NodeId {
        self.inner.head(edge)
    }
    fn edge_index(&self, from: NodeId, to: NodeId) -> Option<EdgeId> {
        self.inner.edge_index(from, to)
    }
    fn neighbor_edge_indices(&self, node: NodeId) -> Range<EdgeId> {
        self.inner.neighbor_edge_indices(node)
    }
}

impl LinkIterable<NodeIdT> for ReverseGraph {
    type Iter<'a> = std::iter::Map<std::iter::Copied<std::slice::Iter<'a, (NodeIdT, Reversed)>>, fn((NodeIdT, Reversed)) -> NodeIdT>;

    fn link_iter(&self, node: NodeId) -> Self::Iter<'_> {
        let range = self.inner.neighbor_edge_indices_usize(node);
        self.inner.weight()[range].iter().copied().map(|(from, _)| from)
    }
}

impl LinkIterable<(NodeIdT, EdgeIdT)> for ReverseGraph {
    type Iter<'a> = std::iter::Map<
        std::iter::Zip<std::iter::Copied<std::slice::Iter<'a, NodeId>>, std::iter::Copied<std::slice::Iter<'a, (NodeIdT, Reversed)>>>,
        fn((NodeId, (NodeIdT, Reversed))) -> (NodeIdT, EdgeIdT),
    >;

    fn link_iter(&self, node: NodeId) -> Self::Iter<'_> {
        let range = self.inner.neighbor_edge_indices_usize(node);
        self.inner.head()[range.clone()]
            .iter()
            .copied()
            .zip(self.inner.weight()[range].iter().copied())
            .map(|(head, (_, Reversed(orig_edge)))| (NodeIdT(head), orig_edge))
    }
}

impl<W: Copy> BuildReversed<FirstOutGraph<W>> for ReverseGraph {
    fn reversed(graph: &FirstOutGraph<W>) -> Self {
        ReverseGraph {
            inner: FirstOutGraph::<(NodeIdT, Reversed)>::reversed(graph),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn small_graph() -> FirstOutGraph<i64> {
        // 0 -> 1 (10), 0 -> 2 (5), 1 -> 2 (1)
        FirstOutGraph::new(vec![0, 2, 3, 3], vec![1, 2, 2], vec![10, 5, 1])
    }

    fn skewed_graph() -> FirstOutGraph<i64> {
        // 0 -> 2 (edge 0), 1 -> 2 (edge 1), 1 -> 0 (edge 2). Target buckets
        // for node 2 get filled in an order that does not match edge ids, so
        // a positional reverse-edge-id lookup would return the wrong edge.
        FirstOutGraph::new(vec![0, 1, 3, 3], vec![2, 2, 0], vec![1, 1, 1])
    }

    #[test]
    fn degree_and_iteration() {
        let g = small_graph();
        assert_eq!(g.num_nodes(), 3);
        assert_eq!(g.num_arcs(), 3);
        assert_eq!(g.degree(0), 2);
        let heads: Vec<_> = LinkIterable::<NodeIdT>::link_iter(&g, 0).map(|NodeIdT(n)| n).collect();
        assert_eq!(heads, vec![1, 2]);
    }

    #[test]
    fn reverse_preserves_edge_ids() {
        let g = small_graph();
        let rev = ReverseGraph::reversed(&g);
        assert_eq!(rev.num_nodes(), 3);
        let incoming_to_2: Vec<_> = LinkIterable::<(NodeIdT, EdgeIdT)>::link_iter(&rev, 2).collect();
        assert_eq!(incoming_to_2.len(), 2);
        for (NodeIdT(_from), EdgeIdT(orig_edge)) in incoming_to_2 {
            assert_eq!(g.head[orig_edge as usize], 2);
        }
    }

    #[test]
    fn reverse_edge_ids_survive_bucket_reordering() {
        let g = skewed_graph();
        let rev = ReverseGraph::reversed(&g);
        let incoming_to_2: Vec<_> = LinkIterable::<(NodeIdT, EdgeIdT)>::link_iter(&rev, 2).collect();
        let mut origins: Vec<NodeId> = incoming_to_2
            .iter()
            .map(|(NodeIdT(_), EdgeIdT(orig_edge))| g.head[*orig_edge as usize])
            .collect();
        origins.sort_unstable();
        assert_eq!(origins, vec![2, 2]);

        let incoming_to_0: Vec<_> = LinkIterable::<(NodeIdT, EdgeIdT)>::link_iter(&rev, 0).collect();
        assert_eq!(incoming_to_0.len(), 1);
        let (NodeIdT(from), EdgeIdT(orig_edge)) = incoming_to_0[0];
        assert_eq!(from, 1);
        assert_eq!(orig_edge, 2);
        assert_eq!(g.head[orig_edge as usize], 0);
    }
}
