//! Per-axis precomputed sites
//!
//! Every geometric predicate of a sweep reads these cached values, so the
//! trigonometry for a site is done once per axis, before any sweep starts.

use glam::DVec3;

use super::direction::{fold_angle, Axis};

/// A site as seen from one sweep axis
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct Site {
    /// Unit direction of the site
    pub position: DVec3,
    /// Angle from the axis pole, in [0, π]
    pub polar: f64,
    /// Angle around the axis, in [0, 2π)
    pub azimuth: f64,
    pub pol_cos: f64,
    pub pol_sin: f64,
    /// cos(azimuth) · sin(polar)
    pub azi_cos_ps: f64,
    /// sin(azimuth) · sin(polar)
    pub azi_sin_ps: f64,
    /// Index of the cell this site feeds
    pub cell: u32,
}

impl Site {
    pub fn new(position: DVec3, cell: u32, axis: Axis) -> Self {
        let (pol_cos, azimuth) = axis.polar_frame(position);
        let pol_cos = pol_cos.clamp(-1.0, 1.0);
        let polar = pol_cos.acos();
        let azimuth = fold_angle(azimuth);
        let pol_sin = polar.sin();

        Self {
            position,
            polar,
            azimuth,
            pol_cos,
            pol_sin,
            azi_cos_ps: azimuth.cos() * pol_sin,
            azi_sin_ps: azimuth.sin() * pol_sin,
            cell,
        }
    }
}

/// Current position of the sweep circle
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct SweepLine {
    pub polar: f64,
    pub pol_cos: f64,
    pub pol_sin: f64,
}

impl SweepLine {
    pub fn new(polar: f64) -> Self {
        Self {
            polar,
            pol_cos: polar.cos(),
            pol_sin: polar.sin(),
        }
    }
}
