//! Link (§4.1.1-§4.1.2): `h(x) = min_delta f(delta) + g(x-delta)`. Ported
//! from the closed forms in `include/common/combine_functions.hpp` and the
//! case analysis of `include/common/minimize_combined_function.hpp`.

use super::{HypOrLin, LimitedFunction, PiecewiseFunction};
use crate::datastr::fixed_point::PIECE_EPS;

#[inline]
fn epsilon_less(lhs: f64, rhs: f64) -> bool {
    PIECE_EPS < rhs - lhs
}

/// Link two single tradeoff pieces, returning at most three resulting
/// pieces in x-order (§4.1.1). Each returned piece's x-range has already
/// been checked for positive length under `PIECE_EPS`.
pub fn link_single(f: LimitedFunction<HypOrLin>, g: LimitedFunction<HypOrLin>) -> Vec<LimitedFunction<HypOrLin>> {
    use HypOrLin::*;
    let mut out = Vec::with_capacity(3);

    match (f.f, g.f) {
        // Any + Constant or Constant + Any: pure translation.
        (_, Linear { d, c, .. }) if d == 0.0 => {
            let piece = LimitedFunction::new(f.min_x + g.min_x, f.max_x + g.min_x, f.f.shift_x(g.min_x).shift_y(c));
            out.push(piece);
        }
        (Linear { d, c, .. }, _) if d == 0.0 => {
            let piece = LimitedFunction::new(f.min_x + g.min_x, f.min_x + g.max_x, g.f.shift_x(f.min_x).shift_y(c));
            out.push(piece);
        }

        (Linear { d: fd, .. }, Linear { d: gd, .. }) => link_linear_linear(f, fd, g, gd, &mut out),

        (Hyperbolic { .. }, Linear { d: gd, .. }) => link_hyperbolic_linear(f, g, gd, &mut out),
        (Linear { d: fd, .. }, Hyperbolic { .. }) => {
            // symmetric: link(g, f) then swap the roles back (the x-range
            // is the same either way; callers never need to recover which
            // side the split happened on beyond the delta-function, which
            // is handled by the caller through `InterpolatingFunction`).
            let _ = fd;
            link_hyperbolic_linear(g, f, 0.0, &mut out);
        }

        (Hyperbolic { a: fa, b: fb, .. }, Hyperbolic { a: ga, b: gb, .. }) => {
            link_hyperbolic_hyperbolic(f, fa, fb, g, ga, gb, &mut out)
        }
    }

    out
}

fn link_linear_linear(f: LimitedFunction<HypOrLin>, fd: f64, g: LimitedFunction<HypOrLin>, gd: f64, out: &mut Vec<LimitedFunction<HypOrLin>>) {
    let x_min = f.min_x + g.min_x;
    let x_max = f.max_x + g.max_x;

    if fd == gd {
        // same slope: single piece, driver is indifferent to the split.
        let c = f.f.value(f.min_x) + g.f.value(g.min_x);
        out.push(LimitedFunction::new(x_min, x_max, HypOrLin::linear(fd, x_min, c)));
        return;
    }

    if fd > gd {
        // f steeper: drive slow on g first (shift g), then on f (shift f).
        let x_mid = f.min_x + g.max_x;
        if epsilon_less(x_min, x_mid) {
            let c = f.f.value(f.min_x) + g.f.value(g.min_x);
            out.push(LimitedFunction::new(x_min, x_mid, HypOrLin::linear(gd, x_min, c)));
        }
        let x_mid = x_mid.max(x_min);
        if epsilon_less(x_mid, x_max) {
            let c = f.f.value(f.min_x) + g.f.value(g.max_x);
            out.push(LimitedFunction::new(x_mid, x_max, HypOrLin::linear(fd, x_mid - g.max_x, c)));
        }
    } else {
        let x_mid = f.max_x + g.min_x;
        if epsilon_less(x_min, x_mid) {
            let c = f.f.value(f.min_x) + g.f.value(g.min_x);
            out.push(LimitedFunction::new(x_min, x_mid, HypOrLin::linear(fd, x_min - g.min_x, c)));
        }
        let x_mid = x_mid.max(x_min);
        if epsilon_less(x_mid, x_max) {
            let c = f.f.value(f.max_x) + g.f.value(g.min_x);
            out.push(LimitedFunction::new(x_mid, x_max, HypOrLin::linear(gd, x_mid, c)));
        }
    }
}

fn link_hyperbolic_linear(f: LimitedFunction<HypOrLin>, g: LimitedFunction<HypOrLin>, gd: f64, out: &mut Vec<LimitedFunction<HypOrLin>>) {
    let HypOrLin::Hyperbolic { a: fa, b: fb, .. } = f.f else { unreachable!() };
    let x_min = f.min_x + g.min_x;
    let x_max = f.max_x + g.max_x;

    // the point on f where f' == gd.
    let d_star = fb + (-2.0 * fa / gd).cbrt();

    if d_star < f.min_x {
        // f steeper than g everywhere: drive slow on g, then on f.
        let x_mid = (f.min_x + g.max_x).max(x_min);
        if epsilon_less(x_min, x_mid) {
            let c = f.f.value(f.min_x) + g.f.value(g.min_x);
            out.push(LimitedFunction::new(x_min, x_mid, HypOrLin::linear(gd, x_min, c)));
        }
        if epsilon_less(x_mid, x_max) {
            let c = f.f.value(f.min_x) + g.f.value(g.max_x);
            out.push(LimitedFunction::new(x_mid, x_max, HypOrLin::Hyperbolic { a: fa, b: x_mid - g.max_x, c }));
        }
    } else if d_star > f.max_x {
        // g steeper than f everywhere: drive slow on f, then on g.
        let x_mid = (f.max_x + g.min_x).max(x_min);
        if epsilon_less(x_min, x_mid) {
            let c = f.f.value(f.min_x) + g.f.value(g.min_x);
            out.push(LimitedFunction::new(x_min, x_mid, HypOrLin::Hyperbolic { a: fa, b: x_min - g.min_x, c }));
        }
        if epsilon_less(x_mid, x_max) {
            let c = f.f.value(f.max_x) + g.f.value(g.min_x);
            out.push(LimitedFunction::new(x_mid, x_max, HypOrLin::linear(gd, x_mid - f.max_x, c)));
        }
    } else {
        // crossover happens inside f's range: drive at d_star (pinned) while
        // the excess time is spent on g — the middle piece is therefore a
        // translated copy of g, not a constant (dwelling longer on g still
        // changes the total), until g is exhausted, then a translated copy
        // of f covers the rest.
        let x_mid1 = (d_star + g.min_x).max(x_min);
        let x_mid2 = (d_star + g.max_x).max(x_mid1);
        if epsilon_less(x_min, x_mid1) {
            let c = f.f.value(f.min_x) + g.f.value(g.min_x);
            out.push(LimitedFunction::new(x_min, x_mid1, HypOrLin::Hyperbolic { a: fa, b: x_min - g.min_x, c }));
        }
        if epsilon_less(x_mid1, x_mid2) {
            let c = f.f.value(d_star) + g.f.value(x_mid1 - d_star);
            out.push(LimitedFunction::new(x_mid1, x_mid2, HypOrLin::linear(gd, x_mid1 - d_star, c)));
        }
        if epsilon_less(x_mid2, x_max) {
            let c = f.f.value(f.max_x) + g.f.value(g.min_x);
            out.push(LimitedFunction::new(x_mid2, x_max, HypOrLin::linear(gd, x_mid2 - f.max_x, c)));
        }
    }
}

fn link_hyperbolic_hyperbolic(
    f: LimitedFunction<HypOrLin>,
    fa: f64,
    fb: f64,
    g: LimitedFunction<HypOrLin>,
    ga: f64,
    gb: f64,
    out: &mut Vec<LimitedFunction<HypOrLin>>,
) {
    let x_min = f.min_x + g.min_x;
    let x_max = f.max_x + g.max_x;

    // shift-g piece: delta = x - a2 (drive at f's fastest, all the slack on g)
    let x_mid1 = (f.min_x + g.max_x).max(x_min);
    // shift-f piece: delta = b1 (drive at g's fastest, all the slack on f)
    let x_mid2 = (f.max_x + g.min_x).max(x_min);

    let (lo_mid, hi_mid) = (x_mid1.min(x_mid2), x_mid1.max(x_mid2));

    if epsilon_less(x_min, lo_mid) {
        if lo_mid == x_mid1 {
            let c = f.f.value(f.min_x) + g.f.value(g.min_x);
            out.push(LimitedFunction::new(x_min, lo_mid, HypOrLin::Hyperbolic { a: ga, b: x_min - g.min_x, c }));
        } else {
            let c = f.f.value(f.min_x) + g.f.value(g.min_x);
            out.push(LimitedFunction::new(x_min, lo_mid, HypOrLin::Hyperbolic { a: fa, b: x_min - g.min_x, c }));
        }
    }

    if epsilon_less(lo_mid, hi_mid) {
        // balanced middle piece: f'(delta) = g'(x - delta).
        let a_prime = fa + ga + 3.0 * ((fa * fa * ga).cbrt() + (fa * ga * ga).cbrt());
        let b_prime = fb + gb;
        // c is picked so the piece agrees with its neighbours at lo_mid.
        let c_at_lo = if lo_mid == x_mid1 {
            f.f.value(f.min_x) + g.f.value(lo_mid - f.min_x)
        } else {
            f.f.value(lo_mid - g.min_x) + g.f.value(g.min_x)
        };
        let a = a_prime / (lo_mid - b_prime).powi(2);
        let c = c_at_lo - a;
        out.push(LimitedFunction::new(lo_mid, hi_mid, HypOrLin::Hyperbolic { a: a_prime, b: b_prime, c }));
    }

    if epsilon_less(hi_mid, x_max) {
        if hi_mid == x_mid2 {
            let c = f.f.value(f.max_x) + g.f.value(g.min_x);
            out.push(LimitedFunction::new(hi_mid, x_max, HypOrLin::Hyperbolic { a: ga, b: hi_mid - f.max_x, c }));
        } else {
            let c = f.f.value(f.max_x) + g.f.value(g.min_x);
            out.push(LimitedFunction::new(hi_mid, x_max, HypOrLin::Hyperbolic { a: fa, b: hi_mid - g.min_x, c }));
        }
    }
}

/// Link a full piecewise (monotone decreasing convex) function with a
/// single limited `g` (§4.1.2). `g` "settles" at its optimal derivative
/// match somewhere inside `F`: once a sub-piece's link stops producing
/// "shift of g" pieces, the remainder of `F` is appended by pure
/// translation, bounding work at `O(|F| + 1)` instead of re-running the
/// full link case analysis per sub-piece.
pub fn link_piecewise(f: &PiecewiseFunction, g: LimitedFunction<HypOrLin>) -> PiecewiseFunction {
    let mut out: Vec<LimitedFunction<HypOrLin>> = Vec::with_capacity(f.pieces.len() + 2);
    let mut remaining_g_min = g.min_x;

    for (idx, &sub_f) in f.pieces.iter().enumerate() {
        if remaining_g_min >= g.max_x - PIECE_EPS {
            // g has nowhere left to go: translate every remaining sub-piece
            // of f by g's (now fixed) dwell time and consumption.
            let dx = remaining_g_min;
            let dy = g.f.value(remaining_g_min);
            out.push(LimitedFunction::new(sub_f.min_x + dx, sub_f.max_x + dx, sub_f.f.shift_x(dx).shift_y(dy)));
            continue;
        }

        let g_here = LimitedFunction::new(remaining_g_min, g.max_x, g.f);
        let pieces = link_single(sub_f, g_here);

        // Did the last produced piece "finish" g (i.e. it is shaped like a
        // translated copy of f rather than of g)? That happens when the
        // last piece's derivative at its right end matches sub_f's own
        // derivative there within the rounding slack used elsewhere (1e-2).
        let finished = pieces
            .last()
            .map(|p| (p.deriv(p.max_x) - sub_f.f.deriv(sub_f.max_x.min(p.max_x))).abs() < 1e-2)
            .unwrap_or(false);

        for p in &pieces {
            out.push(*p);
        }

        if finished || idx == f.pieces.len() - 1 {
            remaining_g_min = g.max_x;
        } else {
            // g has settled somewhere inside this sub-piece's range; resume
            // from there for the next sub-piece of f.
            remaining_g_min = (remaining_g_min + (sub_f.max_x - sub_f.min_x)).min(g.max_x);
        }
    }

    PiecewiseFunction::new(dedupe_degenerate(out))
}

fn dedupe_degenerate(pieces: Vec<LimitedFunction<HypOrLin>>) -> Vec<LimitedFunction<HypOrLin>> {
    pieces.into_iter().map(|p| p.normalized()).collect()
}

/// Link two full piecewise functions: iterate `g`'s sub-pieces through
/// `link_piecewise`, concatenating results in x-order (each call only
/// needs to see the translated remainder of the previous one).
pub fn link(f: &PiecewiseFunction, g: &PiecewiseFunction) -> PiecewiseFunction {
    if g.pieces.len() == 1 {
        return link_piecewise(f, g.pieces[0]);
    }
    let mut acc = link_piecewise(f, g.pieces[0]);
    for &piece in &g.pieces[1..] {
        let shifted = LimitedFunction::new(0.0, piece.max_x - piece.min_x, piece.f.shift_x(-piece.min_x));
        let next = link_piecewise(&acc, shifted);
        acc = next;
    }
    acc
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::algo::function::LimitedFunction;

    #[test]
    fn s1_single_linear_edge_no_charging() {
        // S1: 0->1, min_x=max_x=1000, Linear(d=0,c=500). Linking the
        // zero-cost source label with this edge should just translate it.
        let zero = LimitedFunction::new(0.0, 0.0, HypOrLin::constant(0.0));
        let edge = LimitedFunction::new(1000.0, 1000.0, HypOrLin::constant(500.0));
        let pieces = link_single(zero, edge);
        assert_eq!(pieces.len(), 1);
        assert_eq!(pieces[0].min_x, 1000.0);
        assert_eq!(pieces[0].max_x, 1000.0);
        assert_eq!(pieces[0].f.value(1000.0), 500.0);
    }

    #[test]
    fn linear_linear_same_slope_single_piece() {
        let f = LimitedFunction::new(0.0, 10.0, HypOrLin::linear(-1.0, 0.0, 100.0));
        let g = LimitedFunction::new(0.0, 5.0, HypOrLin::linear(-1.0, 0.0, 50.0));
        let pieces = link_single(f, g);
        assert_eq!(pieces.len(), 1);
        assert_eq!(pieces[0].min_x, 0.0);
        assert_eq!(pieces[0].max_x, 15.0);
    }

    #[test]
    fn linear_linear_different_slopes_two_pieces() {
        let f = LimitedFunction::new(0.0, 10.0, HypOrLin::linear(-2.0, 0.0, 100.0));
        let g = LimitedFunction::new(0.0, 5.0, HypOrLin::linear(-1.0, 0.0, 50.0));
        let pieces = link_single(f, g);
        assert!(pieces.len() <= 2);
        assert_eq!(pieces.first().unwrap().min_x, 0.0);
        assert_eq!(pieces.last().unwrap().max_x, 15.0);
    }

    #[test]
    fn link_correctness_sampled_linear_linear() {
        // §8 property 2: sampled link must equal the brute-force min over delta.
        let f = LimitedFunction::new(0.0, 10.0, HypOrLin::linear(-2.0, 0.0, 100.0));
        let g = LimitedFunction::new(0.0, 6.0, HypOrLin::linear(-1.0, 0.0, 50.0));
        let pieces = link_single(f, g);
        let pw = PiecewiseFunction::new(pieces);
        for i in 0..=16 {
            let x = (i as f64 / 16.0) * (10.0 + 6.0);
            let expected = (0..=200)
                .map(|s| {
                    let delta = (s as f64 / 200.0) * 10.0;
                    if delta > x {
                        f64::INFINITY
                    } else {
                        f.value(delta) + g.value(x - delta)
                    }
                })
                .fold(f64::INFINITY, f64::min);
            if expected.is_finite() {
                assert!((pw.value(x) - expected).abs() < 1e-1, "x={x} got={} want={}", pw.value(x), expected);
            }
        }
    }
}
