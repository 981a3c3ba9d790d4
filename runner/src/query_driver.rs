//! Runs one query (§6) to completion: builds the potential the configured
//! `--potential` kind calls for, drives `Search::run_with_deadline`,
//! reconstructs the path and folds the per-query statistics into a report.

use crate::config::{Config, PotentialKind};
use crate::context::Context;
use ev_tradeoff_router::algo::potential::{LandmarkPotential, LazyLandmarkPotential, LazyOmegaPotential, OmegaPotential, Potential, ZeroPotential};
use ev_tradeoff_router::algo::search::{reconstruct_path, Search};
use ev_tradeoff_router::datastr::graph::NodeId;
use ev_tradeoff_router::io::{QueryRecord, QueryResult};
use ev_tradeoff_router::report::with_report;
use ev_tradeoff_router::stats::Stats;
use serde_json::Value;
use std::time::{Duration, Instant};

/// Build the `Box<dyn Potential>` matching `kind`, running whatever reverse
/// searches it needs against `ctx`'s precomputed reverse graph and native
/// weight arrays. Constructed fresh per query since every one of them is
/// rooted at a different target.
fn build_potential<'c>(kind: PotentialKind, ctx: &'c Context, target: NodeId) -> Box<dyn Potential + 'c> {
    match kind {
        PotentialKind::None => Box::new(ZeroPotential),
        PotentialKind::Fastest => Box::new(LandmarkPotential::new(&ctx.reverse, &ctx.min_duration, ctx.num_nodes(), target)),
        PotentialKind::Omega => Box::new(OmegaPotential::with_heights(
            &ctx.reverse,
            &ctx.min_duration,
            &ctx.reverse,
            &ctx.min_consumption,
            &ctx.reverse,
            &ctx.omega_weight,
            ctx.num_nodes(),
            target,
            ctx.capacity,
            ctx.rho_min,
            &ctx.omega_heights,
        )),
        PotentialKind::LazyOmega => Box::new(LazyOmegaPotential::with_heights(
            &ctx.reverse,
            &ctx.min_duration,
            &ctx.reverse,
            &ctx.min_consumption,
            &ctx.reverse,
            &ctx.omega_weight,
            ctx.num_nodes(),
            target,
            ctx.capacity,
            ctx.rho_min,
            &ctx.omega_heights,
        )),
        PotentialKind::LazyFastest => Box::new(LazyLandmarkPotential::new(&ctx.reverse, &ctx.min_duration, ctx.num_nodes(), target)),
    }
}

/// Outcome of running a single query: the JSON result line plus the
/// structured per-query report `crate::report` collected while it ran.
pub struct QueryOutcome {
    pub result: QueryResult,
    pub report: Value,
}

/// Run `record` to completion against `ctx`, honoring `config.max_time_seconds`
/// (§5: wall-clock budget, checked at queue-pop granularity by the search
/// core itself).
pub fn run_query(config: &Config, ctx: &Context, record: &QueryRecord) -> QueryOutcome {
    let stats = Stats::new();
    let deadline = if config.max_time_seconds.is_finite() {
        Some(Instant::now() + Duration::from_secs_f64(config.max_time_seconds))
    } else {
        None
    };

    let (result, report) = with_report(|| {
        let potential = build_potential(config.potential, ctx, record.target);
        let mut search = Search::new(ctx.num_nodes(), ctx.capacity, potential, &stats);
        // No CLI flag caps dwell time directly (§6); each charger's own
        // profile already has a finite extent (`Charger::full_dwell_time`),
        // so an unbounded budget here just lets that be the only limit.
        let search_result = search.run_with_deadline(&ctx.graph, record.start, record.target, f64::INFINITY, config.charging_penalty, deadline);

        ev_tradeoff_router::report!("timed_out", search_result.timed_out);
        let snapshot = stats.snapshot();
        ev_tradeoff_router::report!("stats", snapshot);

        if search_result.timed_out {
            ev_tradeoff_router::report!("query_time_seconds", config.max_time_seconds);
        }

        // Env `CHARGE_TAIL_MEMORY=1` (§6): dump a lightweight per-query
        // memory proxy once relaxations cross the documented threshold --
        // we track allocation pressure via the relaxation counter rather
        // than an actual heap sampler, since every allocation on the hot
        // path is one relaxation's worth of label/piece buffers.
        if snapshot.relaxations >= 1_000_000 && std::env::var("CHARGE_TAIL_MEMORY").as_deref() == Ok("1") {
            ev_tradeoff_router::report!("memory_statistics", snapshot);
        }

        let best = search_result
            .settled_at_target
            .iter()
            .enumerate()
            .min_by(|(_, a), (_, b)| a.cost.min_x().partial_cmp(&b.cost.min_x()).unwrap());

        match best {
            None => QueryResult {
                id: record.id,
                start: record.start,
                target: record.target,
                min_duration: None,
                min_consumption: None,
                path: Vec::new(),
                times: Vec::new(),
                consumptions: Vec::new(),
            },
            Some((idx, entry)) => {
                // §4.3 path reconstruction: walk parent pointers back to the
                // source, then approximate each waypoint's arrival time/
                // consumption from that settled sub-label's own tradeoff
                // function. This is the label's *fastest-feasible* arrival
                // at that intermediate node, not necessarily the exact point
                // reached along the specific path continuing on to the
                // query's target -- `InterpolatingFunction::delta` carries
                // the information for an exact reconstruction but is only
                // threaded through charger stops today, not every edge link.
                let waypoints = reconstruct_path(search.labels(), record.target, idx as u32);
                let path: Vec<NodeId> = waypoints.iter().map(|(node, _)| *node).collect();
                let times: Vec<f64> = waypoints
                    .iter()
                    .map(|(node, i)| search.labels().settled_entry(*node, *i).cost.min_x())
                    .collect();
                let consumptions: Vec<f64> = waypoints
                    .iter()
                    .map(|(node, i)| search.labels().settled_entry(*node, *i).cost.min_value())
                    .collect();

                QueryResult {
                    id: record.id,
                    start: record.start,
                    target: record.target,
                    min_duration: Some(entry.cost.min_x()),
                    min_consumption: Some(entry.cost.min_value()),
                    path,
                    times,
                    consumptions,
                }
            }
        }
    });

    QueryOutcome { result, report }
}
