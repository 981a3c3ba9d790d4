//! The fastest-route potential (§4.4: "Landmark/fastest"): a single reverse
//! Dijkstra run over the `MinDuration` graph from the query's target,
//! consulted directly as each node's lower bound. Doesn't depend on `y`
//! (state of charge), since `MinDuration` ignores consumption entirely.

use super::Potential;
use crate::algo::dijkstra::Dijkstra;
use crate::datastr::graph::{EdgeIdT, LinkIterable, NodeId, NodeIdT};

pub struct LandmarkPotential {
    dist_to_target: Vec<i64>,
}

impl LandmarkPotential {
    /// `reverse_min_duration` must have been built with `BuildReversed`
    /// from the forward `MinDuration` graph; `forward_duration` is that
    /// forward graph's weight vector, indexed by the *original* edge id
    /// (which `Reversed` preserves).
    pub fn new<G: LinkIterable<(NodeIdT, EdgeIdT)>>(reverse_min_duration: &G, forward_duration: &[i64], num_nodes: usize, target: NodeId) -> Self {
        let mut dijkstra = Dijkstra::new(num_nodes);
        dijkstra.run(reverse_min_duration, |EdgeIdT(e)| forward_duration[e as usize], [target]);
        let dist_to_target = (0..num_nodes as NodeId).map(|n| dijkstra.distance(n)).collect();
        LandmarkPotential { dist_to_target }
    }
}

impl Potential for LandmarkPotential {
    fn potential(&mut self, node: NodeId, _y: f64) -> f64 {
        self.dist_to_target[node as usize] as f64
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::datastr::graph::{BuildReversed, FirstOutGraph, Reversed};

    #[test]
    fn bound_matches_reverse_dijkstra() {
        let g = FirstOutGraph::new(vec![0, 2, 3, 3], vec![1, 2, 2], vec![10i64, 5, 1]);
        let rev = FirstOutGraph::<(NodeIdT, Reversed)>::reversed(&g);
        let mut p = LandmarkPotential::new(&rev, g.weight(), 3, 2);
        assert_eq!(p.potential(2, 0.0), 0.0);
        assert_eq!(p.potential(1, 0.0), 1.0);
        assert_eq!(p.potential(0, 0.0), 5.0);
    }
}
