//! Lower envelope of a set of tradeoff pieces (§4.1.5), used both to fold a
//! link/charge-compose result's raw candidate pieces down to a single
//! monotone-decreasing convex function and to merge two already-convex
//! piecewise functions (e.g. two charger-compose candidates) into one.
//!
//! Grounded on the test fixtures of `test/common/lower_envelop_test.cpp` —
//! no header for the algorithm itself survived retrieval, so the sweep below
//! reconstructs it from first principles: insert one piece at a time,
//! splitting the active interval at every existing boundary and every
//! detected crossing, keeping whichever function is lower on each sub-piece.

use super::{HypOrLin, LimitedFunction, PiecewiseFunction};
use crate::datastr::fixed_point::PIECE_EPS;
use crate::algo::function::dominance::critical_point;

fn eval_raw(pieces: &[LimitedFunction<HypOrLin>], x: f64) -> f64 {
    for p in pieces {
        if x <= p.max_x + PIECE_EPS {
            return p.f.value(x);
        }
    }
    f64::INFINITY
}

/// Binary-search for a single sign change of `lhs(x) - rhs(x)` on `[a, b]`.
/// `critical_point` already isolates the domain into at most two intervals
/// on which the difference is monotonic, so one bisection per interval
/// suffices to find every crossing.
fn bisect_root(lhs: &HypOrLin, rhs: &HypOrLin, a: f64, b: f64) -> Option<f64> {
    let fa = lhs.value(a) - rhs.value(a);
    let fb = lhs.value(b) - rhs.value(b);
    if fa == 0.0 {
        return Some(a);
    }
    if fb == 0.0 {
        return Some(b);
    }
    if fa.signum() == fb.signum() {
        return None;
    }
    let (mut lo, mut hi) = (a, b);
    for _ in 0..100 {
        let mid = 0.5 * (lo + hi);
        let fm = lhs.value(mid) - rhs.value(mid);
        if fm == 0.0 {
            return Some(mid);
        }
        if fm.signum() == fa.signum() {
            lo = mid;
        } else {
            hi = mid;
        }
    }
    Some(0.5 * (lo + hi))
}

fn crossings(lhs: &HypOrLin, rhs: &HypOrLin, lo: f64, hi: f64) -> Vec<f64> {
    let cp = critical_point(lhs, rhs, 0.0);
    let mut out = Vec::with_capacity(2);
    if cp.is_finite() && cp > lo + PIECE_EPS && cp < hi - PIECE_EPS {
        if let Some(r) = bisect_root(lhs, rhs, lo, cp) {
            out.push(r);
        }
        if let Some(r) = bisect_root(lhs, rhs, cp, hi) {
            out.push(r);
        }
    } else if let Some(r) = bisect_root(lhs, rhs, lo, hi) {
        out.push(r);
    }
    out
}

/// Fold one more candidate piece into a running lower-envelope (stored as a
/// sorted, contiguous, non-overlapping piece list).
fn insert_piece(env: Vec<LimitedFunction<HypOrLin>>, new_piece: LimitedFunction<HypOrLin>) -> Vec<LimitedFunction<HypOrLin>> {
    if env.is_empty() {
        return vec![new_piece];
    }

    let lo_bound = env.iter().map(|p| p.min_x).fold(new_piece.min_x, f64::min);
    let hi_bound = env.iter().map(|p| p.max_x).fold(new_piece.max_x, f64::max);

    let mut xs: Vec<f64> = vec![lo_bound, hi_bound, new_piece.min_x, new_piece.max_x];
    for p in &env {
        xs.push(p.min_x);
        xs.push(p.max_x);
        let lo = p.min_x.max(new_piece.min_x);
        let hi = p.max_x.min(new_piece.max_x);
        if lo < hi - PIECE_EPS {
            xs.extend(crossings(&p.f, &new_piece.f, lo, hi));
        }
    }
    xs.retain(|x| x.is_finite() && *x >= lo_bound - PIECE_EPS && *x <= hi_bound + PIECE_EPS);
    xs.sort_by(|a, b| a.partial_cmp(b).unwrap());
    xs.dedup_by(|a, b| (*a - *b).abs() < PIECE_EPS);

    let mut segments = Vec::with_capacity(xs.len());
    for w in xs.windows(2) {
        let (a, b) = (w[0], w[1]);
        if b <= a + PIECE_EPS {
            continue;
        }
        let mid = 0.5 * (a + b);
        let env_val = eval_raw(&env, mid);
        let new_val = if mid < new_piece.min_x - PIECE_EPS || mid > new_piece.max_x + PIECE_EPS {
            f64::INFINITY
        } else {
            new_piece.f.value(mid)
        };

        let chosen = if new_val <= env_val { new_piece.f } else { find_source(&env, mid) };
        segments.push(LimitedFunction::new(a, b, chosen));
    }

    merge_adjacent(segments)
}

fn find_source(env: &[LimitedFunction<HypOrLin>], x: f64) -> HypOrLin {
    for p in env {
        if x <= p.max_x + PIECE_EPS {
            return p.f;
        }
    }
    env.last().map(|p| p.f).unwrap_or(HypOrLin::constant(f64::INFINITY))
}

fn same_function(a: &HypOrLin, b: &HypOrLin) -> bool {
    match (a, b) {
        (HypOrLin::Hyperbolic { a: a1, b: b1, c: c1 }, HypOrLin::Hyperbolic { a: a2, b: b2, c: c2 }) => {
            (a1 - a2).abs() < 1e-6 && (b1 - b2).abs() < 1e-6 && (c1 - c2).abs() < 1e-6
        }
        (HypOrLin::Linear { d: d1, b: b1, c: c1 }, HypOrLin::Linear { d: d2, b: b2, c: c2 }) => {
            (d1 - d2).abs() < 1e-6 && (b1 - b2).abs() < 1e-6 && (c1 - c2).abs() < 1e-6
        }
        _ => false,
    }
}

fn merge_adjacent(pieces: Vec<LimitedFunction<HypOrLin>>) -> Vec<LimitedFunction<HypOrLin>> {
    let mut out: Vec<LimitedFunction<HypOrLin>> = Vec::with_capacity(pieces.len());
    for p in pieces {
        if let Some(last) = out.last_mut() {
            if same_function(&last.f, &p.f) && (last.max_x - p.min_x).abs() < PIECE_EPS {
                last.max_x = p.max_x;
                continue;
            }
        }
        out.push(p);
    }
    out
}

/// Compute the lower envelope of an unordered, possibly-overlapping set of
/// pieces, folding them into a single monotone-decreasing convex
/// [`PiecewiseFunction`].
pub fn lower_envelope(mut pieces: Vec<LimitedFunction<HypOrLin>>) -> PiecewiseFunction {
    pieces.sort_by(|a, b| a.min_x.partial_cmp(&b.min_x).unwrap());
    let env = pieces.into_iter().fold(Vec::new(), insert_piece);
    PiecewiseFunction::new(env.into_iter().map(|p| p.normalized()).collect())
}

/// Merge two already-convex piecewise functions into their pointwise
/// minimum, used to combine e.g. the "don't charge" and "charge here"
/// candidates produced during charger composition (§4.1.3).
pub fn merge(a: &PiecewiseFunction, b: &PiecewiseFunction) -> PiecewiseFunction {
    let mut all = a.pieces.clone();
    all.extend_from_slice(&b.pieces);
    lower_envelope(all)
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn two_linear_functions_cross_at_four() {
        let a = LimitedFunction::new(0.0, 5.0, HypOrLin::linear(-1.0, 0.0, 5.0));
        let b = LimitedFunction::new(3.0, 5.0, HypOrLin::linear(-2.0, 0.0, 9.0));
        let env = lower_envelope(vec![a, b]);
        assert!((env.value(4.0) - a.value(4.0)).abs() < 1e-6);
        assert!((env.value(4.0) - b.value(4.0)).abs() < 1e-6);
        assert!(env.value(1.0) < b.value(1.0) + 100.0);
        assert!((env.value(2.0) - a.value(2.0)).abs() < 1e-6);
        assert!((env.value(4.5) - b.value(4.5)).abs() < 1e-6);
    }

    #[test]
    fn hyperbolic_and_linear_intersection() {
        let hyp = LimitedFunction::new(1.0, 4.0, HypOrLin::hyperbolic(4.0, 0.0, 1.5));
        let lin0 = LimitedFunction::new(0.0, 2.0, HypOrLin::linear(-1.0, 0.0, 4.5));
        let lin1 = LimitedFunction::new(2.0, 7.0, HypOrLin::linear(-0.5, 0.0, 3.5));
        let env = lower_envelope(vec![hyp, lin0, lin1]);
        assert!((env.value(0.0) - 4.5).abs() < 1e-3);
        assert!((env.value(2.5) - hyp.value(2.5)).abs() < 1e-2);
        assert!((env.value(6.0) - lin1.value(6.0)).abs() < 1e-2);
    }

    #[test]
    fn two_hyperbolic_functions_two_crossings() {
        let a = LimitedFunction::new(0.25, 3.0, HypOrLin::hyperbolic(4.0, 0.0, 0.0));
        let b = LimitedFunction::new(0.3, 5.0, HypOrLin::hyperbolic(1.0, 0.25, 1.0));
        let env = lower_envelope(vec![a, b]);
        assert!(env.pieces.len() >= 2);
        assert!((env.value(0.3) - b.value(0.3)).abs() < 1e-2 || (env.value(0.3) - a.value(0.3)).abs() < 1e-2);
        assert!((env.value(2.0) - a.value(2.0)).abs() < 1e-2);
    }
}
