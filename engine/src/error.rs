//! Error taxonomy (§7). Only configuration and I/O failures ever propagate
//! out of the core as an `Err`; numeric-degeneracy and battery-infeasibility
//! are represented in the data (folded pieces, empty label sets) per §7's
//! propagation policy.

use std::fmt;

#[derive(Debug)]
pub enum EngineError {
    /// Missing or truncated graph/query file.
    Io(std::io::Error),
    /// Unknown potential/heuristic name, negative capacity, `x_eps < 0`, ...
    Config(String),
    /// Found while shifting Omega/Consumption graph weights non-negative
    /// (§4.4): the offending edge couldn't be made non-negative by any
    /// finite shift, i.e. there is a negative cycle in heights.
    NegativeCycle { from: u32, to: u32 },
}

impl fmt::Display for EngineError {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            EngineError::Io(e) => write!(f, "I/O error: {e}"),
            EngineError::Config(msg) => write!(f, "configuration error: {msg}"),
            EngineError::NegativeCycle { from, to } => {
                write!(f, "negative cycle detected while shifting weights at edge ({from} -> {to})")
            }
        }
    }
}

impl std::error::Error for EngineError {}

impl From<std::io::Error> for EngineError {
    fn from(e: std::io::Error) -> Self {
        EngineError::Io(e)
    }
}

pub type Result<T> = std::result::Result<T, EngineError>;
