//! Forward-star adjacency graphs.
//!
//! The label-setting search (`crate::algo::search`) is generic over anything
//! that can hand back the outgoing links of a node; this module provides the
//! concrete forward-star representation the derived graphs (§2) are stored
//! in, plus the handful of traits the search and preprocessing code consume
//! it through. Graph *construction* — OSM ingestion, elevation annotation,
//! PHEM-based edge-cost generation — is out of scope; these types only ever
//! get handed already-built arrays.

use std::ops::Range;

pub mod first_out_graph;

pub use self::first_out_graph::{FirstOutGraph, ReverseGraph};

/// Node ids are 32bit unsigned ints.
pub type NodeId = u32;
/// Edge ids are 32bit unsigned ints.
pub type EdgeId = u32;
/// Sentinel for "no such node/edge" (§3).
pub const INVALID_ID: u32 = u32::MAX;

/// A sufficiently large infinity constant for fixed-point (scaled) weights.
/// `INFINITY + x` does not overflow for any feasible `x <= INFINITY`.
pub const INFINITY: i64 = i64::MAX / 2;

/// Base trait for graphs. Interesting behaviour is added through subtraits.
pub trait Graph {
    fn num_nodes(&self) -> usize;
    fn num_arcs(&self) -> usize;
    fn degree(&self, node: NodeId) -> usize;
}

/// Graphs whose outgoing links (of some element type `L`) can be iterated.
/// `L` is typically `NodeIdT` (just the head) or `(NodeIdT, EdgeIdT)` (head +
/// edge id, so weight arrays indexed by edge id can be consulted by callers).
pub trait LinkIterable<L> {
    type Iter<'a>: Iterator<Item = L> + 'a
    where
        Self: 'a;

    fn link_iter(&self, node: NodeId) -> Self::Iter<'_>;
}

/// Wrapper newtypes so `LinkIterable` can be implemented generically for
/// "just the head" and "head + edge id" without clashing impls.
#[derive(Debug, Copy, Clone, PartialEq, Eq, PartialOrd, Ord, Hash)]
pub struct NodeIdT(pub NodeId);
#[derive(Debug, Copy, Clone, PartialEq, Eq, PartialOrd, Ord, Hash)]
pub struct EdgeIdT(pub EdgeId);

/// Graphs that support random access to links by edge id, and edge lookup by
/// endpoint pair. Used by path reconstruction (§4.3) to translate parent
/// pointers back into a node/edge sequence.
pub trait RandomLinkAccessGraph: Graph {
    fn head(&self, edge: EdgeId) -> NodeId;
    fn edge_index(&self, from: NodeId, to: NodeId) -> Option<EdgeId>;
    fn neighbor_edge_indices(&self, node: NodeId) -> Range<EdgeId>;

    fn neighbor_edge_indices_usize(&self, node: NodeId) -> Range<usize> {
        let r = self.neighbor_edge_indices(node);
        r.start as usize..r.end as usize
    }
}

/// Build a graph with all edges reversed, keeping the original edge ids
/// reachable through a `Reversed(EdgeIdT)` wrapper so weight arrays indexed
/// by the *forward* edge id can still be used from the reversed graph. Used
/// to build the three reverse-search scalar graphs feeding the landmark
/// potentials (§4.4).
pub trait BuildReversed<G> {
    fn reversed(graph: &G) -> Self;
}

#[derive(Debug, Copy, Clone, PartialEq, Eq, PartialOrd, Ord, Hash)]
pub struct Reversed(pub EdgeIdT);
