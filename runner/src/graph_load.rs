//! Loads the derived-graph file set (§6) into the in-memory types the
//! search core and its potentials consume. `first_edges.bin`/`targets.bin`
//! give the forward-star adjacency; `weights.bin` is parsed into one
//! [`PiecewiseFunction`] per edge; `heights.bin`/`chargers.bin` feed the
//! omega potential's Johnson shift and the search's charger composition
//! respectively. `coordinates.bin` is read and kept but unused by anything
//! in this binary — no potential here needs Euclidean coordinates.

use ev_tradeoff_router::algo::function::{HypOrLin, LimitedFunction, PiecewiseFunction};
use ev_tradeoff_router::algo::preprocessing;
use ev_tradeoff_router::algo::search::TradeoffGraph;
use ev_tradeoff_router::datastr::charger::Charger;
use ev_tradeoff_router::datastr::graph::{EdgeIdT, FirstOutGraph, Graph, LinkIterable, NodeId, NodeIdT};
use ev_tradeoff_router::error::{EngineError, Result};
use ev_tradeoff_router::io::Load;
use std::path::{Path, PathBuf};

/// The query-time tradeoff graph: a forward-star adjacency with one
/// `PiecewiseFunction` weight per edge, plus an optional `Charger` per
/// node. Wraps `FirstOutGraph` directly (rather than keeping its own
/// `first_out`/`head` arrays) so `BuildReversed` -- implemented generically
/// over `FirstOutGraph<W>` -- applies to it without an adapter.
pub struct RunnerGraph {
    inner: FirstOutGraph<PiecewiseFunction>,
    chargers: Vec<Option<Charger>>,
}

impl Graph for RunnerGraph {
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

impl LinkIterable<(NodeIdT, EdgeIdT)> for RunnerGraph {
    type Iter<'a>
        = <FirstOutGraph<PiecewiseFunction> as LinkIterable<(NodeIdT, EdgeIdT)>>::Iter<'a>
    where
        Self: 'a;

    fn link_iter(&self, node: NodeId) -> Self::Iter<'_> {
        self.inner.link_iter(node)
    }
}

impl TradeoffGraph for RunnerGraph {
    fn edge_cost(&self, edge: EdgeIdT) -> &PiecewiseFunction {
        &self.inner.weight()[edge.0 as usize]
    }
    fn charger_at(&self, node: NodeId) -> Option<&Charger> {
        self.chargers[node as usize].as_ref()
    }
}

impl RunnerGraph {
    /// Assemble a `RunnerGraph` from an already-built adjacency and charger
    /// set -- used by `load` and by tests that don't want to round-trip
    /// through the binary file format.
    pub fn from_parts(inner: FirstOutGraph<PiecewiseFunction>, chargers: Vec<Option<Charger>>) -> Self {
        RunnerGraph { inner, chargers }
    }
    pub fn first_out(&self) -> &[u32] {
        self.inner.first_out()
    }
    pub fn head(&self) -> &[NodeId] {
        self.inner.head()
    }
    pub fn edge_cost_slice(&self) -> &[PiecewiseFunction] {
        self.inner.weight()
    }
    pub fn edge_cost_mut(&mut self) -> &mut [PiecewiseFunction] {
        self.inner.weight_mut()
    }
    pub fn inner(&self) -> &FirstOutGraph<PiecewiseFunction> {
        &self.inner
    }
    pub fn chargers(&self) -> &[Option<Charger>] {
        &self.chargers
    }
    pub fn chargers_mut(&mut self) -> &mut [Option<Charger>] {
        &mut self.chargers
    }
}

/// One `weights.bin` record, laid out exactly as §6 specifies: two `f64`s,
/// a `u8` tag, and three `f64` params -- read by explicit byte offset
/// rather than `#[repr(C)]` so the on-disk layout (48 bytes/record once
/// alignment padding is accounted for) is documented rather than implied.
const WEIGHT_RECORD_BYTES: usize = 48;

fn parse_weight_record(bytes: &[u8]) -> PiecewiseFunction {
    let min_x = f64::from_ne_bytes(bytes[0..8].try_into().unwrap());
    let max_x = f64::from_ne_bytes(bytes[8..16].try_into().unwrap());
    let tag = bytes[16];
    let p0 = f64::from_ne_bytes(bytes[24..32].try_into().unwrap());
    let p1 = f64::from_ne_bytes(bytes[32..40].try_into().unwrap());
    let p2 = f64::from_ne_bytes(bytes[40..48].try_into().unwrap());

    let f = match tag {
        1 => HypOrLin::hyperbolic(p0, p1, p2),
        0 | 2 => {
            if p0 == 0.0 {
                HypOrLin::constant(p2)
            } else {
                HypOrLin::linear(p0, p1, p2)
            }
        }
        other => panic!("unknown weights.bin fn_tag {other}"),
    };
    PiecewiseFunction::single(LimitedFunction::new(min_x, max_x, f).normalized())
}

fn load_weights<P: AsRef<Path>>(path: P, num_arcs: usize) -> Result<Vec<PiecewiseFunction>> {
    let bytes: Vec<u8> = Vec::load_from(path)?;
    if bytes.len() != num_arcs * WEIGHT_RECORD_BYTES {
        return Err(EngineError::Config(format!(
            "weights.bin has {} bytes, expected {} ({} arcs * {} bytes/record)",
            bytes.len(),
            num_arcs * WEIGHT_RECORD_BYTES,
            num_arcs,
            WEIGHT_RECORD_BYTES
        )));
    }
    Ok(bytes.chunks_exact(WEIGHT_RECORD_BYTES).map(parse_weight_record).collect())
}

fn load_chargers<P: AsRef<Path>>(path: P, num_nodes: usize) -> Result<Vec<Option<Charger>>> {
    let rates: Vec<f64> = Vec::load_from(path)?;
    if rates.len() != num_nodes {
        return Err(EngineError::Config(format!("chargers.bin has {} entries, expected {num_nodes}", rates.len())));
    }
    Ok(rates
        .into_iter()
        .map(|rate| if rate > 0.0 { Some(single_rate_charger(rate)) } else { None })
        .collect())
}

/// `chargers.bin` stores one instantaneous rate per node (Watts), not a
/// full tapering profile -- build the simplest `Charger` that matches it: a
/// single linear segment at that rate, up to a generous cap on total dwell
/// time. Real per-charger tapering curves are a preprocessing concern
/// (§1 Non-goals: charger-profile derivation is out of scope here).
fn single_rate_charger(rate_watts: f64) -> Charger {
    let rate_wh_per_second = rate_watts / 3600.0;
    Charger::from_segments(&[(24.0 * 3600.0, rate_wh_per_second)])
}

pub struct LoadedGraph {
    pub graph: RunnerGraph,
    /// Per-node elevation, metres -- the Johnson-shift height candidate for
    /// the omega graph (§4.4).
    pub heights: Vec<i32>,
}

/// Load every file named in §6 with `base` as the shared path prefix
/// (`{base}.first_edges.bin`, ...).
pub fn load(base: &Path) -> Result<LoadedGraph> {
    let first_out: Vec<u32> = Vec::load_from(with_suffix(base, "first_edges.bin"))?;
    let head: Vec<NodeId> = Vec::load_from(with_suffix(base, "targets.bin"))?;
    let num_nodes = first_out.len().checked_sub(1).ok_or_else(|| EngineError::Config("first_edges.bin is empty".to_string()))?;
    let num_arcs = head.len();

    if *first_out.last().unwrap() as usize != num_arcs {
        return Err(EngineError::Config(format!(
            "first_edges.bin's last entry ({}) doesn't match targets.bin's length ({num_arcs})",
            first_out.last().unwrap()
        )));
    }

    let edge_cost = load_weights(with_suffix(base, "weights.bin"), num_arcs)?;
    preprocessing::consistency_check(&edge_cost)?;

    let heights: Vec<i32> = Vec::load_from(with_suffix(base, "heights.bin"))?;
    if heights.len() != num_nodes {
        return Err(EngineError::Config(format!("heights.bin has {} entries, expected {num_nodes}", heights.len())));
    }

    let coordinates: Vec<f64> = Vec::load_from(with_suffix(base, "coordinates.bin"))?;
    if coordinates.len() != 2 * num_nodes {
        return Err(EngineError::Config(format!("coordinates.bin has {} entries, expected {}", coordinates.len(), 2 * num_nodes)));
    }

    let chargers = load_chargers(with_suffix(base, "chargers.bin"), num_nodes)?;

    let inner = FirstOutGraph::new(first_out, head, edge_cost);
    Ok(LoadedGraph { graph: RunnerGraph::from_parts(inner, chargers), heights })
}

fn with_suffix(base: &Path, suffix: &str) -> PathBuf {
    let mut name = base.file_name().map(|n| n.to_owned()).unwrap_or_default();
    name.push(".");
    name.push(suffix);
    base.with_file_name(name)
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::io::Write;

    fn write_bin<T: Copy>(path: &Path, data: &[T]) {
        let bytes = unsafe { std::slice::from_raw_parts(data.as_ptr() as *const u8, std::mem::size_of_val(data)) };
        std::fs::File::create(path).unwrap().write_all(bytes).unwrap();
    }

    #[test]
    fn parses_a_minimal_single_edge_graph() {
        let dir = std::env::temp_dir().join(format!("ev_router_graph_load_test_{}_{}", std::process::id(), line!()));
        std::fs::create_dir_all(&dir).unwrap();
        let base = dir.join("g");

        write_bin(&with_suffix(&base, "first_edges.bin"), &[0u32, 1, 1]);
        write_bin(&with_suffix(&base, "targets.bin"), &[1u32]);
        // one Linear(d=0,b=0,c=500) record, min_x=1000, max_x=1000.
        let mut weight_bytes = Vec::new();
        weight_bytes.extend_from_slice(&1000.0f64.to_ne_bytes());
        weight_bytes.extend_from_slice(&1000.0f64.to_ne_bytes());
        weight_bytes.push(0);
        weight_bytes.extend_from_slice(&[0u8; 7]);
        weight_bytes.extend_from_slice(&0.0f64.to_ne_bytes());
        weight_bytes.extend_from_slice(&0.0f64.to_ne_bytes());
        weight_bytes.extend_from_slice(&500.0f64.to_ne_bytes());
        std::fs::File::create(with_suffix(&base, "weights.bin")).unwrap().write_all(&weight_bytes).unwrap();

        write_bin(&with_suffix(&base, "heights.bin"), &[0i32, 0]);
        write_bin(&with_suffix(&base, "coordinates.bin"), &[0.0f64, 0.0, 1.0, 1.0]);
        write_bin(&with_suffix(&base, "chargers.bin"), &[0.0f64, 0.0]);

        let loaded = load(&base).unwrap();
        std::fs::remove_dir_all(&dir).ok();

        assert_eq!(loaded.graph.num_nodes(), 2);
        assert_eq!(loaded.graph.num_arcs(), 1);
        assert!((loaded.graph.edge_cost_slice()[0].value(1000.0) - 500.0).abs() < 1e-6);
    }

    #[test]
    fn rejects_truncated_weights_file() {
        let dir = std::env::temp_dir().join(format!("ev_router_graph_load_test_{}_{}", std::process::id(), line!()));
        std::fs::create_dir_all(&dir).unwrap();
        let base = dir.join("g");
        write_bin(&with_suffix(&base, "first_edges.bin"), &[0u32, 1, 1]);
        write_bin(&with_suffix(&base, "targets.bin"), &[1u32]);
        write_bin(&with_suffix(&base, "weights.bin"), &[0u8; 10]);
        write_bin(&with_suffix(&base, "heights.bin"), &[0i32, 0]);
        write_bin(&with_suffix(&base, "coordinates.bin"), &[0.0f64, 0.0, 1.0, 1.0]);
        write_bin(&with_suffix(&base, "chargers.bin"), &[0.0f64, 0.0]);

        let err = load(&base).unwrap_err();
        std::fs::remove_dir_all(&dir).ok();
        assert!(matches!(err, EngineError::Config(_)));
    }
}
