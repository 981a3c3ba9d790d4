//! CLI configuration (§6): flags are positional `--name value` pairs parsed
//! by hand against `std::env::args()`, matching the teacher's
//! `cooperative/src/util/cli_args.rs` style — no `clap`/`structopt`.

use ev_tradeoff_router::cli::CliErr;
use ev_tradeoff_router::error::{EngineError, Result};
use std::error::Error;
use std::path::PathBuf;
use std::str::FromStr;

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum PotentialKind {
    None,
    Fastest,
    Omega,
    LazyOmega,
    LazyFastest,
}

impl FromStr for PotentialKind {
    type Err = CliErr;

    fn from_str(s: &str) -> std::result::Result<Self, Self::Err> {
        match s {
            "none" => Ok(PotentialKind::None),
            "fastest" => Ok(PotentialKind::Fastest),
            "omega" => Ok(PotentialKind::Omega),
            "lazy_omega" => Ok(PotentialKind::LazyOmega),
            "lazy_fastest" => Ok(PotentialKind::LazyFastest),
            _ => Err(CliErr("unknown --potential value")),
        }
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum HeuristicKind {
    None,
    Linear,
    OnlyFast,
    MinRate,
    NoSuperCharger,
    NoSlowCharger,
}

impl FromStr for HeuristicKind {
    type Err = CliErr;

    fn from_str(s: &str) -> std::result::Result<Self, Self::Err> {
        match s {
            "none" => Ok(HeuristicKind::None),
            "linear" => Ok(HeuristicKind::Linear),
            "only_fast" => Ok(HeuristicKind::OnlyFast),
            "min_rate" => Ok(HeuristicKind::MinRate),
            "no_super_charger" => Ok(HeuristicKind::NoSuperCharger),
            "no_slow_charger" => Ok(HeuristicKind::NoSlowCharger),
            _ => Err(CliErr("unknown --heuristic value")),
        }
    }
}

#[derive(Debug, Clone)]
pub struct Config {
    pub queries: PathBuf,
    pub graph: PathBuf,
    /// Battery capacity, Wh (same float domain as edge consumption values).
    pub capacity: f64,
    pub potential: PotentialKind,
    /// Dominance x-tolerance, seconds.
    pub x_eps: f64,
    /// Dominance y-tolerance, Wh.
    pub y_eps: f64,
    /// Fixed overhead charged, in seconds, for stopping at a charger at all.
    pub charging_penalty: f64,
    pub heuristic: HeuristicKind,
    pub threads: usize,
    pub runs: usize,
    pub max_time_seconds: f64,
    pub log: Option<PathBuf>,
}

impl Config {
    /// Parse `args` (program name already stripped) into a `Config`,
    /// applying the documented defaults for any flag left unset. Unknown
    /// flags, missing values and malformed numbers are surfaced as I/O-free
    /// configuration errors (§7), exit code 1.
    pub fn parse(args: impl Iterator<Item = String>) -> std::result::Result<Self, Box<dyn Error>> {
        let mut queries: Option<PathBuf> = None;
        let mut graph: Option<PathBuf> = None;
        let mut capacity: Option<f64> = None;
        let mut potential = PotentialKind::None;
        let mut x_eps = 0.0;
        let mut y_eps = 0.0;
        let mut charging_penalty = 0.0;
        let mut heuristic = HeuristicKind::None;
        let mut threads = 1usize;
        let mut runs = 1usize;
        let mut max_time_seconds = f64::INFINITY;
        let mut log: Option<PathBuf> = None;

        let mut args = args.peekable();
        while let Some(flag) = args.next() {
            match flag.as_str() {
                "--queries" => queries = Some(PathBuf::from(next_value(&mut args, "--queries")?)),
                "--graph" => graph = Some(PathBuf::from(next_value(&mut args, "--graph")?)),
                "--capacity" => capacity = Some(parse_value(&mut args, "--capacity")?),
                "--potential" => potential = parse_value(&mut args, "--potential")?,
                "--x-eps" => x_eps = parse_value(&mut args, "--x-eps")?,
                "--y-eps" => y_eps = parse_value(&mut args, "--y-eps")?,
                "--charging-penalty" => charging_penalty = parse_value(&mut args, "--charging-penalty")?,
                "--heuristic" => heuristic = parse_value(&mut args, "--heuristic")?,
                "--threads" => threads = parse_value(&mut args, "--threads")?,
                "--runs" => runs = parse_value(&mut args, "--runs")?,
                "--max-time-seconds" => max_time_seconds = parse_value(&mut args, "--max-time-seconds")?,
                "--log" => log = Some(PathBuf::from(next_value(&mut args, "--log")?)),
                other => return Err(Box::new(EngineError::Config(format!("unrecognized flag `{other}`")))),
            }
        }

        let queries = queries.ok_or_else(|| EngineError::Config("missing required --queries".to_string()))?;
        let graph = graph.ok_or_else(|| EngineError::Config("missing required --graph".to_string()))?;
        let capacity = capacity.ok_or_else(|| EngineError::Config("missing required --capacity".to_string()))?;

        let config = Config { queries, graph, capacity, potential, x_eps, y_eps, charging_penalty, heuristic, threads, runs, max_time_seconds, log };
        config.validate()?;
        Ok(config)
    }

    /// Configuration-error checks from §7: negative capacity, negative
    /// epsilons, zero threads/runs.
    fn validate(&self) -> Result<()> {
        if self.capacity < 0.0 {
            return Err(EngineError::Config(format!("--capacity must be non-negative, got {}", self.capacity)));
        }
        if self.x_eps < 0.0 {
            return Err(EngineError::Config(format!("--x-eps must be non-negative, got {}", self.x_eps)));
        }
        if self.y_eps < 0.0 {
            return Err(EngineError::Config(format!("--y-eps must be non-negative, got {}", self.y_eps)));
        }
        if self.charging_penalty < 0.0 {
            return Err(EngineError::Config(format!("--charging-penalty must be non-negative, got {}", self.charging_penalty)));
        }
        if self.threads == 0 {
            return Err(EngineError::Config("--threads must be at least 1".to_string()));
        }
        if self.runs == 0 {
            return Err(EngineError::Config("--runs must be at least 1".to_string()));
        }
        if self.max_time_seconds <= 0.0 {
            return Err(EngineError::Config(format!("--max-time-seconds must be positive, got {}", self.max_time_seconds)));
        }
        Ok(())
    }
}

fn next_value(args: &mut impl Iterator<Item = String>, flag: &'static str) -> std::result::Result<String, Box<dyn Error>> {
    args.next().ok_or_else(|| -> Box<dyn Error> { Box::new(EngineError::Config(format!("missing value for {flag}"))) })
}

fn parse_value<T: FromStr>(args: &mut impl Iterator<Item = String>, flag: &'static str) -> std::result::Result<T, Box<dyn Error>> {
    let raw = next_value(args, flag)?;
    raw.parse::<T>().map_err(|_| -> Box<dyn Error> { Box::new(EngineError::Config(format!("invalid value for {flag}: `{raw}`"))) })
}

#[cfg(test)]
mod tests {
    use super::*;

    fn args(s: &str) -> impl Iterator<Item = String> {
        s.split_whitespace().map(String::from).collect::<Vec<_>>().into_iter()
    }

    #[test]
    fn parses_minimal_required_flags_with_defaults() {
        let cfg = Config::parse(args("--queries q.csv --graph base --capacity 2000")).unwrap();
        assert_eq!(cfg.queries, PathBuf::from("q.csv"));
        assert_eq!(cfg.capacity, 2000.0);
        assert_eq!(cfg.potential, PotentialKind::None);
        assert_eq!(cfg.threads, 1);
    }

    #[test]
    fn missing_required_flag_is_a_config_error() {
        assert!(Config::parse(args("--graph base --capacity 2000")).is_err());
    }

    #[test]
    fn negative_capacity_is_rejected() {
        assert!(Config::parse(args("--queries q.csv --graph base --capacity -5")).is_err());
    }

    #[test]
    fn unknown_potential_name_is_rejected() {
        assert!(Config::parse(args("--queries q.csv --graph base --capacity 10 --potential bogus")).is_err());
    }

    #[test]
    fn full_flag_set_parses() {
        let cfg = Config::parse(args(
            "--queries q.csv --graph base --capacity 50000 --potential omega --x-eps 1 --y-eps 2 --charging-penalty 300 \
             --heuristic linear --threads 4 --runs 3 --max-time-seconds 30 --log out.jsonl",
        ))
        .unwrap();
        assert_eq!(cfg.potential, PotentialKind::Omega);
        assert_eq!(cfg.heuristic, HeuristicKind::Linear);
        assert_eq!(cfg.threads, 4);
        assert_eq!(cfg.runs, 3);
        assert_eq!(cfg.log, Some(PathBuf::from("out.jsonl")));
    }
}
