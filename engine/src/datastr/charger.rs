//! A charging station's rate profile (§2 "Charger composition" /
//! `include/ev/charging_model.hpp`): a concave, piecewise-linear curve of
//! cumulative energy gained against dwell time (fast while the battery is
//! low, tapering as it nears full). We store its *negation*
//! (`-amount(t)`) directly as a [`PiecewiseFunction`] of `Linear` pieces —
//! a concave increasing curve negates to a convex decreasing one, which is
//! exactly the shape our tradeoff-function algebra already knows how to
//! combine (see `crate::algo::function::charge`). This lets charger
//! composition reuse `crate::algo::function::link` unchanged rather than
//! re-deriving a parallel case analysis, unlike the stateful multi-branch
//! enumeration of the upstream C++ `compose_minimal` overloads.

use crate::algo::function::{HypOrLin, LimitedFunction, PiecewiseFunction};

#[derive(Debug, Clone)]
pub struct Charger {
    /// `value(t) == -amount_gained(t)`. `profile.min_x() == 0`.
    pub profile: PiecewiseFunction,
}

impl Charger {
    /// Build from `(duration, rate)` segments in charging order (fastest
    /// rate first); later segments must not have a higher rate than earlier
    /// ones, or the resulting profile would not be convex.
    pub fn from_segments(segments: &[(f64, f64)]) -> Self {
        let mut pieces = Vec::with_capacity(segments.len());
        let mut t = 0.0;
        let mut amount = 0.0;
        for &(duration, rate) in segments {
            debug_assert!(rate >= 0.0);
            let piece = LimitedFunction::new(t, t + duration, HypOrLin::linear(-rate, t, -amount));
            pieces.push(piece);
            t += duration;
            amount += rate * duration;
        }
        Charger { profile: PiecewiseFunction::new(pieces) }
    }

    /// Energy gained after waiting `dwell` at this charger.
    pub fn charge_amount(&self, dwell: f64) -> f64 {
        -self.profile.value(dwell)
    }

    /// Minimum dwell time needed to gain `amount` of energy.
    pub fn dwell_for_amount(&self, amount: f64) -> f64 {
        self.profile.inverse(-amount)
    }

    /// The charger's fastest instantaneous rate (first segment) — used as
    /// the per-charger input to computing a graph-wide `rho_min` for the
    /// omega potential's charging-key bound (§4.4).
    pub fn max_rate(&self) -> f64 {
        self.profile.pieces.first().map(rate_of).unwrap_or(0.0)
    }

    /// The charger's slowest (tail/taper) rate, i.e. its worst-case
    /// throughput once the battery is nearly full.
    pub fn min_rate(&self) -> f64 {
        self.profile.pieces.last().map(rate_of).unwrap_or(0.0)
    }

    pub fn full_dwell_time(&self) -> f64 {
        self.profile.max_x()
    }
}

fn rate_of(p: &LimitedFunction<HypOrLin>) -> f64 {
    match p.f {
        HypOrLin::Linear { d, .. } => -d,
        HypOrLin::Hyperbolic { .. } => 0.0,
    }
}
