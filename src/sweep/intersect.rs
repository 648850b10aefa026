//! Arc intersection on the sweep front
//!
//! Each arc of the beach line is the set of points equidistant (in angle)
//! from its site and from the sweep circle. Two neighbouring arcs meet at a
//! single azimuth, which has a closed form in terms of the cached site
//! products. The batched variant evaluates two boundaries lane by lane so a
//! search step refreshes both of the arcs it compares in one pass.

use super::direction::fold_angle;
use super::site::{Site, SweepLine};

/// Azimuth where the arc of `a` ends and the arc of `b` starts
///
/// `shift` is added before folding so callers can compare boundaries in a
/// frame where a chosen azimuth maps to zero.
#[inline]
pub fn intersect(a: &Site, b: &Site, sweep: &SweepLine, shift: f64) -> f64 {
    let to_b = sweep.pol_cos - b.pol_cos;
    let to_a = sweep.pol_cos - a.pol_cos;
    let cos_term = to_b * a.azi_cos_ps - to_a * b.azi_cos_ps;
    let sin_term = to_b * a.azi_sin_ps - to_a * b.azi_sin_ps;
    let inv_hyp = 1.0 / (cos_term * cos_term + sin_term * sin_term).sqrt();

    let asin_cos = asin_clamped(cos_term * inv_hyp);
    let acos_sin = acos_clamped(sin_term * inv_hyp);
    let gamma = if sin_term > 0.0 {
        asin_cos
    } else if cos_term > 0.0 {
        acos_sin
    } else {
        acos_sin - 2.0 * asin_cos
    };

    let eps = (a.pol_cos - b.pol_cos) * sweep.pol_sin * inv_hyp;
    fold_angle(asin_clamped(eps) - gamma + shift)
}

/// `[intersect(a, b), intersect(c, d)]` evaluated lane-wise
///
/// Both lanes share the arithmetic and branch selection of [`intersect`], so
/// the results agree with two scalar calls.
#[inline]
pub fn intersect_pair(
    a: &Site,
    b: &Site,
    c: &Site,
    d: &Site,
    sweep: &SweepLine,
    shift: f64,
) -> [f64; 2] {
    let first = [a, c];
    let second = [b, d];

    let to_second = lanes(|i| sweep.pol_cos - second[i].pol_cos);
    let to_first = lanes(|i| sweep.pol_cos - first[i].pol_cos);
    let cos_term =
        lanes(|i| to_second[i] * first[i].azi_cos_ps - to_first[i] * second[i].azi_cos_ps);
    let sin_term =
        lanes(|i| to_second[i] * first[i].azi_sin_ps - to_first[i] * second[i].azi_sin_ps);
    let inv_hyp =
        lanes(|i| 1.0 / (cos_term[i] * cos_term[i] + sin_term[i] * sin_term[i]).sqrt());

    let asin_cos = lanes(|i| asin_clamped(cos_term[i] * inv_hyp[i]));
    let acos_sin = lanes(|i| acos_clamped(sin_term[i] * inv_hyp[i]));
    let wrapped = lanes(|i| acos_sin[i] - 2.0 * asin_cos[i]);

    // Blend: b > 0 picks the asin branch, otherwise a > 0 picks acos.
    let gamma = lanes(|i| {
        let low = if cos_term[i] > 0.0 { acos_sin[i] } else { wrapped[i] };
        if sin_term[i] > 0.0 {
            asin_cos[i]
        } else {
            low
        }
    });

    let eps =
        lanes(|i| (first[i].pol_cos - second[i].pol_cos) * sweep.pol_sin * inv_hyp[i]);
    lanes(|i| fold_angle(asin_clamped(eps[i]) - gamma[i] + shift))
}

#[inline(always)]
fn lanes(f: impl Fn(usize) -> f64) -> [f64; 2] {
    [f(0), f(1)]
}

#[inline(always)]
fn asin_clamped(x: f64) -> f64 {
    x.clamp(-1.0, 1.0).asin()
}

#[inline(always)]
fn acos_clamped(x: f64) -> f64 {
    x.clamp(-1.0, 1.0).acos()
}
