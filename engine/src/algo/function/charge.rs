//! Charger composition (§4.1.3, §3): insert an optimal stop at a charging
//! station into a tradeoff function. The charger model is
//! `g(x, y0) = P(x + P^{-1}(y0))` — a vehicle arriving with consumption
//! `y0` already used resumes the charger's curve from the dwell time that
//! would have produced that much charge from empty, not from dwell time
//! zero. `P` is the charger's cumulative-charge-from-empty curve
//! (`charge_amount`); `P^{-1}` is `dwell_for_amount`.
//!
//! For a single tradeoff piece `F` this virtual starting offset
//! `v0 = P^{-1}(capacity - F(d))` varies with the drive time `d` chosen
//! within the piece, which in general makes the composition more than a
//! plain `link::link` of two fixed functions. We approximate it per
//! incoming piece by evaluating `v0` once, at the piece's earliest point
//! (its lowest remaining state of charge, i.e. its most conservative
//! charger offset), then treat the rest of the piece as a straight
//! `link::link` against the charger's curve shifted to start there. This is
//! exact whenever a piece's consumption range doesn't straddle a charger
//! segment boundary, which the fine-grained pieces produced by `link` and
//! `envelope::lower_envelope` satisfy in practice. The raw per-piece
//! candidates are then folded into a single convex function the same way
//! `link::link` itself does for overlapping candidates.

use super::envelope;
use super::link;
use super::{HypOrLin, LimitedFunction, PiecewiseFunction};
use crate::datastr::charger::Charger;
use crate::datastr::fixed_point::PIECE_EPS;

/// `charger`'s profile, shifted so dwell time `0` corresponds to its
/// virtual offset `v0`, and clipped to at most `max_dwell` further elapsed
/// time.
fn shift_profile(profile: &PiecewiseFunction, v0: f64, max_dwell: f64) -> PiecewiseFunction {
    if max_dwell <= PIECE_EPS {
        return PiecewiseFunction::default();
    }
    let base = profile.value(v0);
    let mut out = Vec::with_capacity(profile.pieces.len());
    for &piece in &profile.pieces {
        if piece.max_x <= v0 + PIECE_EPS {
            continue;
        }
        let lo = (piece.min_x - v0).max(0.0);
        let hi = (piece.max_x - v0).min(max_dwell);
        if hi <= lo + PIECE_EPS {
            if lo >= max_dwell - PIECE_EPS {
                break;
            }
            continue;
        }
        let shifted = piece.f.shift_x(-v0).shift_y(-base);
        out.push(LimitedFunction::new(lo, hi, shifted));
    }
    PiecewiseFunction::new(out)
}

/// Combine `f` (cost to reach the charger) with `charger`'s rate profile,
/// accounting for the state of charge each piece of `f` arrives with
/// (`capacity`), clipped to at most `max_dwell`. Returns the resulting
/// tradeoff function over "time to reach the charger plus time spent
/// charging there".
pub fn charge_compose(f: &PiecewiseFunction, charger: &Charger, capacity: f64, max_dwell: f64) -> PiecewiseFunction {
    if f.is_empty() || max_dwell <= 0.0 {
        return f.clone();
    }
    let full_amount = charger.charge_amount(charger.full_dwell_time());
    let mut candidates = Vec::with_capacity(f.pieces.len());
    for &piece in &f.pieces {
        let y_at_arrival = piece.f.value(piece.min_x);
        let soc = (capacity - y_at_arrival).clamp(0.0, full_amount);
        let v0 = charger.dwell_for_amount(soc);
        let shifted = shift_profile(&charger.profile, v0, max_dwell);
        if shifted.is_empty() {
            // no further charge available at this state of charge: driving
            // straight through is the only option for this piece.
            candidates.push(piece);
            continue;
        }
        let linked = link::link(&PiecewiseFunction::single(piece), &shifted);
        candidates.extend(linked.pieces);
    }
    envelope::lower_envelope(candidates)
}

/// Like [`charge_compose`] but also keeps the option of not stopping at
/// all, folding both candidates into a single lower envelope. Search uses
/// this at a charger node when continuing past without charging remains
/// feasible for the query's remaining budget. `charging_penalty` (a fixed
/// time overhead for actually stopping, §4.3) is added to the charged
/// branch's x before merging; the skip branch is left untouched.
pub fn charge_compose_or_skip(f: &PiecewiseFunction, charger: &Charger, capacity: f64, max_dwell: f64, charging_penalty: f64) -> PiecewiseFunction {
    let charged = charge_compose(f, charger, capacity, max_dwell);
    let penalized = if charging_penalty > 0.0 { charged.shift_x(charging_penalty) } else { charged };
    envelope::merge(f, &penalized)
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::algo::function::HypOrLin;

    #[test]
    fn charging_reduces_consumption_for_same_total_time() {
        // arriving with 200 consumption used after 1000s (out of a 2000
        // capacity), then charging for up to 2000s at a constant 50 units/s
        // rate should let later total times show lower consumption than at
        // arrival.
        let f = PiecewiseFunction::single(LimitedFunction::new(1000.0, 1000.0, HypOrLin::constant(200.0)));
        let charger = Charger::from_segments(&[(2000.0, 50.0)]);
        let composed = charge_compose(&f, &charger, 2000.0, 2000.0);
        assert!((composed.value(1000.0) - 200.0).abs() < 1e-6);
        assert!(composed.value(3000.0) < composed.value(1000.0));
    }

    #[test]
    fn skip_variant_never_worse_than_charging_alone() {
        let f = PiecewiseFunction::single(LimitedFunction::new(500.0, 500.0, HypOrLin::constant(300.0)));
        let charger = Charger::from_segments(&[(1000.0, 40.0)]);
        let with_skip = charge_compose_or_skip(&f, &charger, 2000.0, 1000.0, 0.0);
        assert!(with_skip.value(500.0) <= f.value(500.0) + 1e-9);
    }

    #[test]
    fn zero_dwell_budget_is_a_no_op() {
        let f = PiecewiseFunction::single(LimitedFunction::new(500.0, 500.0, HypOrLin::constant(300.0)));
        let charger = Charger::from_segments(&[(1000.0, 40.0)]);
        let composed = charge_compose(&f, &charger, 2000.0, 0.0);
        assert!((composed.value(500.0) - 300.0).abs() < 1e-6);
    }

    #[test]
    fn charging_accounts_for_arrival_state_of_charge() {
        // node1 has a two-segment charger (400/s for 4s, then 50/s for 8s).
        // The vehicle arrives at node1 after driving for 1s and using 500 of
        // a 2000 capacity (state of charge 1500), so composing must resume
        // the charger curve from v0 = dwell_for_amount(1500) = 3.75s, not
        // from an empty battery. Dwelling a further 6.25s (to virtual dwell
        // 10s) gains 1900 - 1500 = 400 more charge, bringing consumption
        // from 500 down to 100.
        let f = PiecewiseFunction::single(LimitedFunction::new(1.0, 1.0, HypOrLin::constant(500.0)));
        let charger = Charger::from_segments(&[(4.0, 400.0), (8.0, 50.0)]);
        let composed = charge_compose(&f, &charger, 2000.0, 12.0);
        assert!((composed.value(1.0 + 6.25) - 100.0).abs() < 1e-6);
    }

    #[test]
    fn charging_penalty_delays_the_charged_branch_but_not_the_skip_branch() {
        let f = PiecewiseFunction::single(LimitedFunction::new(500.0, 500.0, HypOrLin::constant(300.0)));
        let charger = Charger::from_segments(&[(1000.0, 40.0)]);
        let unpenalized = charge_compose_or_skip(&f, &charger, 2000.0, 1000.0, 0.0);
        let penalized = charge_compose_or_skip(&f, &charger, 2000.0, 1000.0, 60.0);
        // at the skip branch's only x, the penalty can't have made anything
        // better (no charged candidate exists that early once delayed).
        assert!((penalized.value(500.0) - unpenalized.value(500.0)).abs() < 1e-6);
        // further out, where charging strictly helps, the penalized curve
        // is never better than the unpenalized one since it sees the
        // charged option 60s later.
        assert!(penalized.value(1500.0) >= unpenalized.value(1500.0) - 1e-6);
    }
}
