//! The trivial potential (§4.4: "Zero, baseline"): degenerates the search
//! into plain multi-criteria Dijkstra. Useful as a correctness baseline and
//! when no landmark/omega precomputation has been run for the current graph.

use super::Potential;
use crate::datastr::graph::NodeId;

#[derive(Debug, Default, Clone, Copy)]
pub struct ZeroPotential;

impl Potential for ZeroPotential {
    fn potential(&mut self, _node: NodeId, _y: f64) -> f64 {
        0.0
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn always_zero() {
        let mut p = ZeroPotential;
        assert_eq!(p.potential(5, 100.0), 0.0);
    }
}
