//! Per-query JSON result records (§6: "one per line"): written by the
//! runner binary as each query in a batch finishes, independent of whatever
//! aggregate statistics `crate::report` collects for that same query.

use crate::datastr::graph::NodeId;
use serde::Serialize;
use std::io::{self, Write};

#[derive(Debug, Clone, Serialize)]
pub struct QueryResult {
    pub id: u32,
    pub start: NodeId,
    pub target: NodeId,
    /// `None` when the query is battery-infeasible (§7: represented in the
    /// data as an empty label set at target, not an error).
    pub min_duration: Option<f64>,
    pub min_consumption: Option<f64>,
    pub path: Vec<NodeId>,
    pub times: Vec<f64>,
    pub consumptions: Vec<f64>,
}

/// Append one result as a single JSON line to `out` (§6's newline-delimited
/// per-query JSON format).
pub fn write_result_line(out: &mut impl Write, result: &QueryResult) -> io::Result<()> {
    serde_json::to_writer(&mut *out, result)?;
    out.write_all(b"\n")
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn serializes_as_a_single_json_line() {
        let result = QueryResult {
            id: 1,
            start: 0,
            target: 3,
            min_duration: Some(9.25),
            min_consumption: Some(1900.0),
            path: vec![0, 1, 2, 3],
            times: vec![0.0, 1.0, 7.25, 8.25],
            consumptions: vec![0.0, 500.0, 400.0, 1900.0],
        };
        let mut buf = Vec::new();
        write_result_line(&mut buf, &result).unwrap();
        let s = String::from_utf8(buf).unwrap();
        assert!(s.ends_with('\n'));
        assert_eq!(s.matches('\n').count(), 1);
        let parsed: serde_json::Value = serde_json::from_str(s.trim()).unwrap();
        assert_eq!(parsed["id"], 1);
        assert_eq!(parsed["path"].as_array().unwrap().len(), 4);
    }

    #[test]
    fn infeasible_query_serializes_nulls() {
        let result = QueryResult {
            id: 2,
            start: 0,
            target: 99,
            min_duration: None,
            min_consumption: None,
            path: vec![],
            times: vec![],
            consumptions: vec![],
        };
        let mut buf = Vec::new();
        write_result_line(&mut buf, &result).unwrap();
        let parsed: serde_json::Value = serde_json::from_str(String::from_utf8(buf).unwrap().trim()).unwrap();
        assert!(parsed["min_duration"].is_null());
    }
}
