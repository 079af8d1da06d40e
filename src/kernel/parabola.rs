//! Chordal approximation of parabola arcs under a Hausdorff tolerance.
//!
//! The spacing that equalizes the sag of every chord is uniform in
//! `H(x) = x·₂F₁(¼, ½; ³⁄₂; −x²) = ∫₀ˣ (1+t²)^(−1/4) dt`, the integral of the
//! square root of curvature along arc length. `H` and its Newton inverse are
//! evaluated in `f64` (as the robust predicates are) and cast back.

use num_traits::NumCast;

use crate::VoronoiFloat;

const SERIES_EPS: f64 = 1e-15;
const SERIES_CAP: usize = 400;
const SPLIT: f64 = 2.0;

/// `₂F₁(¼, 1; ³⁄₂; w)` for `0 ≤ w < 1` (Pfaff-transformed argument).
fn gauss_series(w: f64) -> f64 {
    let mut term = 1.0;
    let mut sum = 1.0;
    for k in 0..SERIES_CAP {
        let kf = k as f64;
        term *= (0.25 + kf) / (1.5 + kf) * w;
        sum += term;
        if term < SERIES_EPS * sum {
            break;
        }
    }
    sum
}

/// `∫₂ˣ t^(−1/2)·(1 + t^(−2))^(−1/4) dt` by the binomial tail series, `x ≥ 2`.
fn h_tail(x: f64) -> f64 {
    let mut sum = 0.0;
    let mut coeff = 1.0; // binom(−1/4, j)
    for j in 0..SERIES_CAP {
        let jf = j as f64;
        let p = 0.5 - 2.0 * jf;
        let term = coeff * (x.powf(p) - SPLIT.powf(p)) / p;
        sum += term;
        if term.abs() < SERIES_EPS * (1.0 + sum.abs()) {
            break;
        }
        coeff *= (-0.25 - jf) / (jf + 1.0);
    }
    sum
}

fn h64(x: f64) -> f64 {
    let ax = x.abs();
    let h = if ax <= SPLIT {
        let w = ax * ax / (1.0 + ax * ax);
        ax * (1.0 + ax * ax).powf(-0.25) * gauss_series(w)
    } else {
        h64(SPLIT) + h_tail(ax)
    };
    h.copysign(x)
}

fn h64_prime(x: f64) -> f64 {
    (1.0 + x * x).powf(-0.25)
}

/// Inverse of [`parabola_h`] by bounded Newton.
fn h64_inv(y: f64) -> f64 {
    let ay = y.abs();
    let h2 = h64(SPLIT);
    // H(x) ≤ x everywhere and H(x) ≈ 2√x + (H(2) − 2√2) far out
    let mut x = if ay < h2 {
        ay
    } else {
        let c = h2 - 2.0 * SPLIT.sqrt();
        ((ay - c) / 2.0).powi(2)
    };
    for _ in 0..64 {
        let step = (h64(x) - ay) / h64_prime(x);
        x -= step;
        if x < 0.0 {
            x = 0.0;
        }
        if step.abs() <= 1e-14 * (1.0 + x) {
            break;
        }
    }
    x.copysign(y)
}

/// `H` lifted to the crate scalar; exposed for the approximation tests.
pub fn parabola_h<T: VoronoiFloat>(x: T) -> T {
    T::from(h64(<f64 as NumCast>::from(x).unwrap())).unwrap()
}

/// Abscissas subdividing the parabola `y = a/2 + x²/(2a)` on `[x1, x2]` so
/// that the polyline through them stays within Hausdorff distance `tol` of
/// the arc. The endpoints are always included and returned exactly.
pub fn approx_parabola<T: VoronoiFloat>(a: T, x1: T, x2: T, tol: T) -> Vec<T> {
    let af = <f64 as NumCast>::from(a).unwrap();
    let tolf = <f64 as NumCast>::from(tol).unwrap();
    debug_assert!(af > 0.0 && tolf > 0.0);
    let u1 = <f64 as NumCast>::from(x1).unwrap() / af;
    let u2 = <f64 as NumCast>::from(x2).unwrap() / af;
    let (h1, h2) = (h64(u1), h64(u2));
    let span = h2 - h1;
    let n = ((span.abs() * (af / (8.0 * tolf)).sqrt()).ceil() as usize).max(1);

    let mut xs = Vec::with_capacity(n + 1);
    xs.push(x1);
    for k in 1..n {
        let target = h1 + span * (k as f64) / (n as f64);
        xs.push(T::from(af * h64_inv(target)).unwrap());
    }
    xs.push(x2);
    xs
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::kernel::min_quartic;

    #[test]
    fn h_is_odd_and_monotone() {
        assert_relative_eq!(h64(0.0), 0.0);
        assert_relative_eq!(h64(-1.5), -h64(1.5));
        let mut prev = h64(0.0);
        for i in 1..40 {
            let next = h64(i as f64 * 0.25);
            assert!(next > prev);
            prev = next;
        }
    }

    #[test]
    fn h_matches_quadrature() {
        // Simpson on [0, x] as an independent reference
        for &x in &[0.3, 1.0, 1.9, 2.5, 7.0, 40.0] {
            let n = 20_000;
            let f = |t: f64| (1.0 + t * t).powf(-0.25);
            let h = x / n as f64;
            let mut acc = f(0.0) + f(x);
            for i in 1..n {
                let w = if i % 2 == 1 { 4.0 } else { 2.0 };
                acc += w * f(i as f64 * h);
            }
            assert_relative_eq!(h64(x), acc * h / 3.0, max_relative = 1e-9);
        }
    }

    #[test]
    fn h_inverse_round_trips() {
        for &x in &[0.0, 0.1, 0.9, 2.0, 3.0, 11.0] {
            assert_relative_eq!(h64_inv(h64(x)), x, max_relative = 1e-10, epsilon = 1e-12);
        }
    }

    /// Squared distance from `p` to the parabola `y = a/2 + x²/(2a)`.
    fn parabola_distance_sq(a: f64, p: (f64, f64), window: (f64, f64)) -> f64 {
        // |(x, a/2 + x²/(2a)) − p|² expanded as a quartic in x
        let c = a / 2.0 - p.1;
        let s = 1.0 / (2.0 * a);
        let f = [
            p.0 * p.0 + c * c,
            -2.0 * p.0,
            1.0 + 2.0 * c * s,
            0.0,
            s * s,
        ];
        min_quartic(f, window).1
    }

    #[test]
    fn polyline_stays_within_tolerance() {
        let (a, x1, x2, tol) = (0.7_f64, -3.0, 5.0, 1e-3);
        let xs = approx_parabola(a, x1, x2, tol);
        assert_eq!(*xs.first().unwrap(), x1);
        assert_eq!(*xs.last().unwrap(), x2);
        assert!(xs.windows(2).all(|w| w[0] < w[1]));
        let y = |x: f64| a / 2.0 + x * x / (2.0 * a);
        for w in xs.windows(2) {
            // chord sag peaks near the chord midpoint
            let mx = (w[0] + w[1]) / 2.0;
            let my = (y(w[0]) + y(w[1])) / 2.0;
            let d2 = parabola_distance_sq(a, (mx, my), (w[0] - 1.0, w[1] + 1.0));
            assert!(d2.sqrt() <= tol * 1.05, "sag {} over tol", d2.sqrt());
        }
    }

    #[test]
    fn short_flat_arc_needs_one_chord() {
        let xs = approx_parabola(10.0_f64, -0.05, 0.05, 1e-2);
        assert_eq!(xs.len(), 2);
    }
}
