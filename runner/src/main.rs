//! The query-runner binary (§6): loads a derived graph and a query batch,
//! then executes the batch `--runs` times across a thread pool, writing one
//! JSON result line per query (last run only) and exiting with the code
//! §7 assigns to whatever went wrong, if anything.

mod config;
mod context;
mod graph_load;
mod heuristics;
mod query_driver;

use config::Config;
use context::Context;
use ev_tradeoff_router::error::EngineError;
use ev_tradeoff_router::io::{read_queries, write_result_line, QueryRecord};
use rayon::prelude::*;
use std::error::Error;
use std::io::Write;
use std::path::Path;
use std::sync::atomic::{AtomicBool, Ordering};
use std::sync::Arc;

/// Exit codes from §6/§7: 0 success, 1 bad args/config, 2 I/O failure, 130
/// SIGINT after flush.
const EXIT_SUCCESS: i32 = 0;
const EXIT_CONFIG_ERROR: i32 = 1;
const EXIT_IO_ERROR: i32 = 2;
const EXIT_SIGINT: i32 = 130;

fn main() {
    let config = match Config::parse(std::env::args().skip(1)) {
        Ok(c) => c,
        Err(e) => {
            eprintln!("{e}");
            std::process::exit(EXIT_CONFIG_ERROR);
        }
    };

    match run(&config) {
        Ok(Outcome::Completed) => std::process::exit(EXIT_SUCCESS),
        Ok(Outcome::Interrupted) => std::process::exit(EXIT_SIGINT),
        Err(e) => {
            eprintln!("{e}");
            std::process::exit(exit_code_for(e.as_ref()));
        }
    }
}

fn exit_code_for(err: &(dyn Error + 'static)) -> i32 {
    match err.downcast_ref::<EngineError>() {
        Some(EngineError::Io(_)) => EXIT_IO_ERROR,
        Some(EngineError::Config(_)) | Some(EngineError::NegativeCycle { .. }) => EXIT_CONFIG_ERROR,
        None => EXIT_IO_ERROR,
    }
}

enum Outcome {
    Completed,
    Interrupted,
}

fn run(config: &Config) -> Result<Outcome, Box<dyn Error>> {
    let loaded = graph_load::load(Path::new(&config.graph))?;
    let mut graph = loaded.graph;
    heuristics::apply(config.heuristic, &mut graph);
    let ctx = Context::build(graph, &loaded.heights, config.capacity)?;

    let queries = read_queries(&config.queries)?;

    // §5: "a signal handler for SIGINT that triggers result-log flush and
    // state dump; callbacks registered under a mutex" -- `ctrlc` registers
    // exactly one handler process-wide and panics on a second registration,
    // matching that "only one callback set per signal" invariant.
    let interrupted = Arc::new(AtomicBool::new(false));
    let handler_flag = interrupted.clone();
    ctrlc::set_handler(move || handler_flag.store(true, Ordering::SeqCst)).map_err(|e| EngineError::Config(format!("failed to install SIGINT handler: {e}")))?;

    let pool = rayon::ThreadPoolBuilder::new()
        .num_threads(config.threads)
        .build()
        .map_err(|e| EngineError::Config(format!("failed to build thread pool: {e}")))?;

    let mut out: Box<dyn Write> = match &config.log {
        Some(path) => Box::new(std::io::BufWriter::new(std::fs::File::create(path)?)),
        None => Box::new(std::io::BufWriter::new(std::io::stdout())),
    };

    // §5: "the experiment driver issues independent queries in parallel
    // using a thread-pool" -- each run is independent (for benchmark
    // stability under repeated measurement, §6's `--runs`); only the final
    // run's result lines are kept, since earlier runs exist purely to warm
    // up caches/branch predictors before timing the last one.
    for run_idx in 0..config.runs {
        if interrupted.load(Ordering::SeqCst) {
            out.flush()?;
            return Ok(Outcome::Interrupted);
        }

        let is_last_run = run_idx + 1 == config.runs;
        let results: Vec<Option<query_driver::QueryOutcome>> = pool.install(|| {
            queries
                .par_iter()
                .map(|record: &QueryRecord| {
                    if interrupted.load(Ordering::SeqCst) {
                        return None;
                    }
                    Some(query_driver::run_query(config, &ctx, record))
                })
                .collect()
        });

        if is_last_run {
            for outcome in results.into_iter().flatten() {
                write_result_line(&mut out, &outcome.result)?;
            }
        }

        if interrupted.load(Ordering::SeqCst) {
            out.flush()?;
            return Ok(Outcome::Interrupted);
        }
    }

    out.flush()?;
    Ok(Outcome::Completed)
}
