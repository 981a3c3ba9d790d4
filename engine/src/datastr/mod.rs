//! Core data structures: adjacency graph, fixed-point/epsilon value types,
//! and the lazy-clear vector used for per-query label storage (§5).

pub mod charger;
pub mod fixed_point;
pub mod graph;
pub mod timestamped_vector;

pub use timestamped_vector::TimestampedVector;
