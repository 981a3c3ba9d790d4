//! `ev_tradeoff_router`: multi-criteria label-setting search for EV routing
//! with speed-consumption tradeoffs and charger composition (see
//! `SPEC_FULL.md` at the workspace root for the full component map).

pub mod algo;
pub mod cli;
pub mod datastr;
pub mod error;
pub mod io;
pub mod report;
pub mod stats;
pub mod util;

#[allow(dead_code, unused_imports)]
mod built_info {
    include!(concat!(env!("OUT_DIR"), "/built.rs"));
}

/// Version/build metadata string assembled by `build.rs` (`built` crate),
/// printed by the runner's `--help`/startup banner.
pub fn version_string() -> String {
    format!(
        "{} {} ({})",
        built_info::PKG_VERSION,
        built_info::GIT_VERSION.unwrap_or("unknown"),
        built_info::PROFILE
    )
}
