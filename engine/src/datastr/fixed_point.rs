//! Scale conversion and fuzzy comparison between the internal `f64`
//! function algebra and the externally visible fixed-point integers (§3:
//! "resolution `R = 1000` per unit (ms and mWh)").
//!
//! The tradeoff functions themselves (`crate::algo::function`) are kept in
//! floating point internally — `HypOrLin::inverse`/`deriv` need real
//! division and cube roots, and re-deriving those in fixed point would cost
//! precision for no benefit. Integer scale only matters at the boundary: the
//! label key handed to the priority queue (§4.3 step 4: `floor(tentative.min_x
//! * R)`), and anything written to a result file.

/// Externally visible fixed-point resolution: one unit (ms or mWh) is
/// represented as `R` internal integer ticks.
pub const R: f64 = 1000.0;

/// `INT32_MAX/2`, the "unreachable" sentinel for fixed-point time/energy (§3).
pub const INF: i64 = (i32::MAX / 2) as i64;

/// `floor(x * R)`, used to turn a floating-point `x`-coordinate into the
/// integer key consumed by the priority queue and potentials.
#[inline]
pub fn scale_floor(x: f64) -> i64 {
    if x.is_infinite() && x > 0.0 {
        return INF;
    }
    (x * R).floor() as i64
}

/// Inverse of [`scale_floor`], for turning stored fixed-point quantities
/// back into the floating domain the function algebra works in.
#[inline]
pub fn unscale(x: i64) -> f64 {
    x as f64 / R
}

/// Tolerances used throughout §4.1's dominance/clip tests, configured by the
/// `--x-eps`/`--y-eps` CLI flags (§6) and expressed in internal (unscaled)
/// units. Construct once per run and share by value — it's two `f64`s.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct Epsilons {
    pub x: f64,
    pub y: f64,
}

impl Epsilons {
    pub fn from_fixed_point(x_eps_seconds: f64, y_eps_wh: f64) -> Self {
        Epsilons { x: x_eps_seconds, y: y_eps_wh }
    }

    #[inline]
    pub fn fuzzy_lt(&self, a: f64, b: f64) -> bool {
        a < b - self.y
    }

    #[inline]
    pub fn fuzzy_le(&self, a: f64, b: f64) -> bool {
        a <= b + self.y
    }

    #[inline]
    pub fn fuzzy_eq(&self, a: f64, b: f64) -> bool {
        (a - b).abs() <= self.y
    }
}

/// A small fixed epsilon used for piecewise-construction degeneracies that
/// are independent of the user-configured dominance tolerance — e.g. "emit a
/// piece only if its x-interval has positive length" (§4.1.2).
pub const PIECE_EPS: f64 = 1e-4;

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn scale_round_trips() {
        assert_eq!(scale_floor(1.5), 1500);
        assert!((unscale(1500) - 1.5).abs() < 1e-9);
    }

    #[test]
    fn scale_floor_truncates_toward_zero_fraction() {
        // 1.2345 * 1000 = 1234.5 -> floor -> 1234, not rounded to 1235
        assert_eq!(scale_floor(1.2345), 1234);
    }

    #[test]
    fn infinite_x_maps_to_sentinel() {
        assert_eq!(scale_floor(f64::INFINITY), INF);
    }

    #[test]
    fn fuzzy_comparisons_respect_y_epsilon() {
        let eps = Epsilons { x: 0.0, y: 0.01 };
        assert!(eps.fuzzy_le(1.0, 1.005));
        assert!(!eps.fuzzy_le(1.0, 0.98));
        assert!(eps.fuzzy_eq(1.0, 1.009));
    }
}
