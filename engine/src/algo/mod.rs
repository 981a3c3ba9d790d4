//! Algorithmic core: the tradeoff-function algebra, label containers, the
//! label-setting search itself, its A* potentials, and the preprocessing
//! that derives the auxiliary graphs those potentials run on.

pub mod dijkstra;
pub mod function;
pub mod heuristics;
pub mod label;
pub mod potential;
pub mod preprocessing;
pub mod search;
