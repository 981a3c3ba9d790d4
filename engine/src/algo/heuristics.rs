//! Optional, lossy speedups (§6 `--heuristic`, §9): none of these are ever
//! applied unless the runner asks for them by name — the exact search
//! (`crate::algo::search`) never calls into this module on its own.

use crate::algo::function::{HypOrLin, LimitedFunction, PiecewiseFunction};
use crate::datastr::charger::Charger;

/// Replace a tradeoff function by the secant line between its two
/// endpoints — a single linear piece, trivially convex, at the cost of
/// overestimating consumption (and so possibly missing some Pareto-optimal
/// routes) everywhere in between.
pub fn linear_approximation(f: &PiecewiseFunction) -> PiecewiseFunction {
    if f.pieces.len() <= 1 {
        return f.clone();
    }
    let min_x = f.min_x();
    let max_x = f.max_x();
    let y0 = f.value(min_x);
    let y1 = f.value(max_x);
    let d = if (max_x - min_x).abs() < 1e-9 { 0.0 } else { (y1 - y0) / (max_x - min_x) };
    PiecewiseFunction::single(LimitedFunction::new(min_x, max_x, HypOrLin::linear(d.min(0.0), min_x, y0)))
}

/// Drop chargers whose fastest rate falls below `min_rate` from
/// consideration entirely — the "slow-charger filter" heuristic: on a
/// network with both fast (highway) and slow (destination) chargers, the
/// slow ones rarely appear on a time-optimal Pareto frontier and excluding
/// them up front shrinks the search space.
pub fn filter_slow_chargers<'a>(chargers: &'a [Charger], min_rate: f64) -> Vec<&'a Charger> {
    chargers.iter().filter(|c| c.max_rate() >= min_rate).collect()
}

/// Keep only the `n` fastest chargers network-wide (the "super-charger
/// only" heuristic) — a coarser version of [`filter_slow_chargers`] for
/// when an absolute rate threshold isn't known up front.
pub fn top_n_fastest_chargers(chargers: &[Charger], n: usize) -> Vec<usize> {
    let mut indices: Vec<usize> = (0..chargers.len()).collect();
    indices.sort_by(|&a, &b| chargers[b].max_rate().partial_cmp(&chargers[a].max_rate()).unwrap());
    indices.truncate(n);
    indices
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn linear_approximation_matches_endpoints() {
        let f = PiecewiseFunction::new(vec![
            LimitedFunction::new(100.0, 200.0, HypOrLin::hyperbolic(4000.0, 0.0, 50.0)),
            LimitedFunction::new(200.0, 400.0, HypOrLin::linear(-0.2, 200.0, 150.0)),
        ]);
        let approx = linear_approximation(&f);
        assert!((approx.value(100.0) - f.value(100.0)).abs() < 1e-6);
        assert!((approx.value(400.0) - f.value(400.0)).abs() < 1e-6);
        assert_eq!(approx.pieces.len(), 1);
    }

    #[test]
    fn slow_charger_filter_drops_below_threshold() {
        let fast = Charger::from_segments(&[(1000.0, 100.0)]);
        let slow = Charger::from_segments(&[(1000.0, 5.0)]);
        let kept = filter_slow_chargers(&[fast, slow], 50.0);
        assert_eq!(kept.len(), 1);
    }

    #[test]
    fn top_n_keeps_fastest_first() {
        let a = Charger::from_segments(&[(1000.0, 10.0)]);
        let b = Charger::from_segments(&[(1000.0, 90.0)]);
        let c = Charger::from_segments(&[(1000.0, 40.0)]);
        let top = top_n_fastest_chargers(&[a, b, c], 2);
        assert_eq!(top, vec![1, 2]);
    }
}
