//! Query CSV parsing (§6): header `id,start,target,min_consumption,max_consumption,rank`;
//! `min_consumption`/`max_consumption`/`rank` may be skipped (blank fields).

use crate::datastr::graph::NodeId;
use crate::error::{EngineError, Result};
use std::path::Path;

#[derive(Debug, Clone, Copy, PartialEq)]
pub struct QueryRecord {
    pub id: u32,
    pub start: NodeId,
    pub target: NodeId,
    /// Lower bound on feasible arrival consumption, if the row specified one.
    pub min_consumption: Option<f64>,
    /// Upper bound on feasible arrival consumption, if the row specified one.
    pub max_consumption: Option<f64>,
    /// Optional pre-computed rank (e.g. Dijkstra rank, used for bucketing
    /// query difficulty in benchmark reports); `None` if absent.
    pub rank: Option<u32>,
}

fn parse_required<T: std::str::FromStr>(record: &csv::StringRecord, idx: usize, field: &str) -> Result<T> {
    record
        .get(idx)
        .filter(|s| !s.is_empty())
        .ok_or_else(|| EngineError::Config(format!("query row missing {field} column")))?
        .parse()
        .map_err(|_| EngineError::Config(format!("query row's {field} column is not valid")))
}

fn parse_optional<T: std::str::FromStr>(record: &csv::StringRecord, idx: usize) -> Option<T> {
    record.get(idx).and_then(|s| if s.is_empty() { None } else { s.parse().ok() })
}

pub fn read_queries<P: AsRef<Path>>(path: P) -> Result<Vec<QueryRecord>> {
    let mut reader = csv::ReaderBuilder::new().has_headers(true).from_path(path)?;
    let mut out = Vec::new();

    for record in reader.records() {
        let record = record?;
        let id: u32 = parse_required(&record, 0, "id")?;
        let start: NodeId = parse_required(&record, 1, "start")?;
        let target: NodeId = parse_required(&record, 2, "target")?;
        let min_consumption = parse_optional(&record, 3);
        let max_consumption = parse_optional(&record, 4);
        let rank = parse_optional(&record, 5);

        out.push(QueryRecord { id, start, target, min_consumption, max_consumption, rank });
    }

    Ok(out)
}

impl From<csv::Error> for EngineError {
    fn from(e: csv::Error) -> Self {
        EngineError::Config(format!("malformed query CSV: {e}"))
    }
}
