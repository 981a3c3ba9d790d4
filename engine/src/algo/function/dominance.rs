//! Dominance checks and y-clipping (§4.1.4-§4.1.6), ported from
//! `include/common/domination.hpp` and the `limit_from_y` routine of
//! `include/common/piecewise_function.hpp`.

use super::{HypOrLin, LimitedFunction, PiecewiseFunction};
use crate::datastr::fixed_point::PIECE_EPS;

/// The inflection point of `lhs - rhs`, used to tell whether two pieces can
/// possibly cross on a given interval (`include/common/critical_point.hpp`).
/// `x_shift` lets the caller compare pieces living in two different
/// x-coordinate systems without re-normalizing either one first.
pub fn critical_point(lhs: &HypOrLin, rhs: &HypOrLin, x_shift: f64) -> f64 {
    match (lhs, rhs) {
        (HypOrLin::Linear { d: ld, .. }, HypOrLin::Linear { d: rd, .. }) => {
            let _ = (ld, rd);
            f64::INFINITY
        }
        (HypOrLin::Linear { d, .. }, HypOrLin::Hyperbolic { .. }) => rhs.inverse_deriv(*d) + x_shift,
        (HypOrLin::Hyperbolic { .. }, HypOrLin::Linear { d, .. }) => lhs.inverse_deriv(*d),
        (HypOrLin::Hyperbolic { a: la, b: lb, .. }, HypOrLin::Hyperbolic { a: ra, b: rb, .. }) => {
            let root = (ra / la).cbrt();
            ((rb + x_shift) - root * lb) / (1.0 - root)
        }
    }
}

/// Does `candidate` dominate `incumbent` (i.e. is it `<=` it everywhere on
/// `[min_x, max_x]`, and strictly so somewhere)? A fast triangular bound
/// first: if `candidate`'s worst case (evaluated at its own endpoints,
/// extended by the asymmetric rule) beats `incumbent`'s best case everywhere,
/// we can skip evaluating the exact crossing.
pub fn dominates(candidate: &LimitedFunction<HypOrLin>, incumbent: &LimitedFunction<HypOrLin>) -> bool {
    let lo = candidate.min_x.max(incumbent.min_x);
    let hi = candidate.max_x.min(incumbent.max_x);
    if lo > hi + PIECE_EPS {
        // disjoint x-ranges: whichever starts earlier is reachable first and
        // is therefore never dominated by the later one on its own turf.
        return false;
    }

    let worst_candidate = candidate.value(lo).max(candidate.value(hi));
    let best_incumbent = incumbent.value(lo).min(incumbent.value(hi));
    if worst_candidate <= best_incumbent + PIECE_EPS {
        return true;
    }

    let cp = critical_point(&candidate.f, &incumbent.f, 0.0);
    if !(lo..=hi).contains(&cp) {
        // no crossing inside the overlap: a single sample settles it.
        return candidate.value(lo) <= incumbent.value(lo) + PIECE_EPS;
    }
    false
}

/// First index `i` such that `rhs[i]` is not dominated by `lhs` restricted
/// to `[lhs_x .. lhs_x + x_shift]`, mirroring
/// `include/common/domination.hpp`'s `find_first_undominated`. `rhs` and
/// `lhs` may live in different x-coordinate systems related by `x_shift`
/// (`lhs_x = rhs_x + x_shift`) so callers never need to re-shift a whole
/// function just to compare it against another label's cost.
pub fn find_first_undominated(lhs: &PiecewiseFunction, rhs: &PiecewiseFunction, x_shift: f64) -> usize {
    for (i, piece) in rhs.pieces.iter().enumerate() {
        let shifted = LimitedFunction::new(piece.min_x + x_shift, piece.max_x + x_shift, piece.f.shift_x(x_shift));
        let mut fully_dominated = false;
        for lhs_piece in &lhs.pieces {
            if dominates(lhs_piece, &shifted) {
                fully_dominated = true;
                break;
            }
        }
        if !fully_dominated {
            return i;
        }
    }
    rhs.pieces.len()
}

/// Mirror of `find_first_undominated` scanning from the right; the two
/// together let callers clip a run of fully-dominated pieces off of either
/// end of `rhs` in one pass each, the way the label container prunes a
/// node's unsettled sequence against its settled one.
pub fn find_last_undominated(lhs: &PiecewiseFunction, rhs: &PiecewiseFunction, x_shift: f64) -> usize {
    for (i, piece) in rhs.pieces.iter().enumerate().rev() {
        let shifted = LimitedFunction::new(piece.min_x + x_shift, piece.max_x + x_shift, piece.f.shift_x(x_shift));
        let mut fully_dominated = false;
        for lhs_piece in &lhs.pieces {
            if dominates(lhs_piece, &shifted) {
                fully_dominated = true;
                break;
            }
        }
        if !fully_dominated {
            return i;
        }
    }
    0
}

/// Is every piece of `rhs` dominated by some piece of `lhs` (§4.2: the
/// pruning condition for dropping a whole label)?
pub fn piecewise_dominates(lhs: &PiecewiseFunction, rhs: &PiecewiseFunction) -> bool {
    find_first_undominated(lhs, rhs, 0.0) == rhs.pieces.len()
}

/// Clip a piecewise function to the part lying at or below `y_max` (§4.1.6:
/// battery capacity clipping). Pieces entirely above `y_max` are dropped;
/// a piece straddling `y_max` is cut exactly at `f.inverse(y_max)`.
pub fn limit_from_y(f: &PiecewiseFunction, y_max: f64) -> PiecewiseFunction {
    let mut out = Vec::with_capacity(f.pieces.len());
    for &piece in &f.pieces {
        let hi_val = piece.f.value(piece.min_x);
        let lo_val = piece.f.value(piece.max_x);
        if lo_val > y_max + PIECE_EPS {
            // whole piece exceeds capacity: infeasible at every x it covers.
            continue;
        }
        if hi_val <= y_max + PIECE_EPS {
            out.push(piece);
            continue;
        }
        // straddles: driving any slower than the cut point would exceed
        // capacity, so the piece's feasible region starts at the cut.
        let cut = piece.f.inverse(y_max).clamp(piece.min_x, piece.max_x);
        out.push(LimitedFunction::new(cut, piece.max_x, piece.f));
    }
    PiecewiseFunction::new(out)
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn strictly_lower_constant_dominates() {
        let lo = LimitedFunction::new(0.0, 10.0, HypOrLin::constant(1.0));
        let hi = LimitedFunction::new(0.0, 10.0, HypOrLin::constant(2.0));
        assert!(dominates(&lo, &hi));
        assert!(!dominates(&hi, &lo));
    }

    #[test]
    fn crossing_lines_dominate_neither() {
        let a = LimitedFunction::new(0.0, 10.0, HypOrLin::linear(-1.0, 0.0, 10.0));
        let b = LimitedFunction::new(0.0, 10.0, HypOrLin::linear(-2.0, 0.0, 5.0));
        assert!(!dominates(&a, &b));
        assert!(!dominates(&b, &a));
    }

    #[test]
    fn piecewise_dominates_detects_full_coverage() {
        let lo = PiecewiseFunction::single(LimitedFunction::new(0.0, 10.0, HypOrLin::constant(1.0)));
        let hi = PiecewiseFunction::single(LimitedFunction::new(0.0, 10.0, HypOrLin::constant(2.0)));
        assert!(piecewise_dominates(&lo, &hi));
        assert!(!piecewise_dominates(&hi, &lo));
    }

    #[test]
    fn limit_from_y_drops_and_clips() {
        let f = PiecewiseFunction::single(LimitedFunction::new(0.0, 10.0, HypOrLin::linear(-1.0, 0.0, 10.0)));
        let clipped = limit_from_y(&f, 5.0);
        assert_eq!(clipped.pieces.len(), 1);
        assert!((clipped.pieces[0].min_x - 5.0).abs() < 1e-9);
        assert_eq!(clipped.pieces[0].max_x, 10.0);
    }

    #[test]
    fn limit_from_y_drops_whole_piece_above_capacity() {
        let f = PiecewiseFunction::single(LimitedFunction::new(0.0, 10.0, HypOrLin::constant(50.0)));
        let clipped = limit_from_y(&f, 5.0);
        assert!(clipped.is_empty());
    }
}
