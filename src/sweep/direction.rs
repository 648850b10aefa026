//! Sweep direction strategy
//!
//! A sweep is parameterized by the axis whose pole it measures polar angles
//! from and by whether it advances towards larger or smaller polar angles.
//! Everything that depends on the direction (event ordering, circumcenter
//! orientation, the "still upcoming" guard) is selected here at runtime.

use std::f64::consts::{PI, TAU};
use std::fmt;

use glam::DVec3;

#[cfg(feature = "serde")]
use serde::{Deserialize, Serialize};

use super::queue::CircleEvent;

/// Direction in which the sweep circle moves over the polar angle
#[cfg_attr(feature = "serde", derive(Serialize, Deserialize))]
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum Order {
    /// From the pole (polar 0) towards the antipode (polar π)
    Increasing,
    /// From the antipode back to the pole
    Decreasing,
}

/// Cardinal axis used as the sweep pole
#[cfg_attr(feature = "serde", derive(Serialize, Deserialize))]
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum Axis {
    X,
    Y,
    Z,
}

impl Axis {
    /// All axes, in the order their site arrays are built
    pub const ALL: [Axis; 3] = [Axis::X, Axis::Y, Axis::Z];

    /// Unit vector of the pole
    #[inline]
    pub fn pole(self) -> DVec3 {
        match self {
            Axis::X => DVec3::X,
            Axis::Y => DVec3::Y,
            Axis::Z => DVec3::Z,
        }
    }

    /// Index of this axis in [`Axis::ALL`]
    #[inline]
    pub fn index(self) -> usize {
        match self {
            Axis::X => 0,
            Axis::Y => 1,
            Axis::Z => 2,
        }
    }

    /// Cosine of the polar angle and the unfolded azimuth of `p`
    ///
    /// The frames are cyclic permutations of (x, y, z), so every frame is
    /// right-handed.
    #[inline]
    pub fn polar_frame(self, p: DVec3) -> (f64, f64) {
        match self {
            Axis::X => (p.x, p.z.atan2(p.y)),
            Axis::Y => (p.y, p.x.atan2(p.z)),
            Axis::Z => (p.z, p.y.atan2(p.x)),
        }
    }
}

/// Fold an angle into [0, 2π)
#[inline]
pub fn fold_angle(angle: f64) -> f64 {
    let folded = angle.rem_euclid(TAU);
    if folded >= TAU {
        folded - TAU
    } else {
        folded
    }
}

impl Order {
    /// Whether `lhs` is processed strictly after `rhs`
    ///
    /// The keys are compared as differences of both components so that the
    /// fine part breaks ties between events sharing a coarse angle.
    #[inline]
    pub fn is_after(self, lhs: &CircleEvent, rhs: &CircleEvent) -> bool {
        let diff = match self {
            Order::Increasing => {
                (lhs.polar - rhs.polar) + (lhs.polar_small - rhs.polar_small)
            }
            Order::Decreasing => {
                (rhs.polar - lhs.polar) - (rhs.polar_small - lhs.polar_small)
            }
        };
        diff > 0.0
    }

    /// Whether a site at `site_polar` is handled before `event`
    ///
    /// Sites win ties.
    #[inline]
    pub fn site_first(self, site_polar: f64, event: &CircleEvent) -> bool {
        match self {
            Order::Increasing => site_polar - (event.polar + event.polar_small) <= 0.0,
            Order::Decreasing => site_polar - (event.polar - event.polar_small) >= 0.0,
        }
    }

    /// Whether an event at (`polar`, `small`) is not behind the sweep front
    #[inline]
    pub fn is_upcoming(self, polar: f64, small: f64, sweep_polar: f64, sweep_small: f64) -> bool {
        match self {
            Order::Increasing => (polar - sweep_polar) + (small - sweep_small) >= 0.0,
            Order::Decreasing => (polar - sweep_polar) - (small - sweep_small) <= 0.0,
        }
    }

    /// Circumcenter of three consecutive arcs' sites, oriented for this order
    ///
    /// Returns `None` for collinear (or coincident) sites.
    #[inline]
    pub fn circumcenter(self, prev: DVec3, mid: DVec3, next: DVec3) -> Option<DVec3> {
        let to_prev = prev - mid;
        let to_next = next - mid;
        let normal = match self {
            Order::Increasing => to_prev.cross(to_next),
            Order::Decreasing => to_next.cross(to_prev),
        };
        normal.try_normalize()
    }

    /// Position of an event on [0, 2π] used for bucket routing
    #[inline]
    pub fn bucket_key(self, event: &CircleEvent) -> f64 {
        match self {
            Order::Increasing => event.polar + event.polar_small,
            Order::Decreasing => event.polar - event.polar_small + PI,
        }
    }
}

/// One of the six sweeps: an axis and a direction along it
#[cfg_attr(feature = "serde", derive(Serialize, Deserialize))]
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub struct SweepDirection {
    pub order: Order,
    pub axis: Axis,
}

impl SweepDirection {
    /// The six sweeps; the position in this array is the sweep index
    pub const ALL: [SweepDirection; 6] = [
        SweepDirection::new(Order::Increasing, Axis::X),
        SweepDirection::new(Order::Decreasing, Axis::X),
        SweepDirection::new(Order::Increasing, Axis::Y),
        SweepDirection::new(Order::Decreasing, Axis::Y),
        SweepDirection::new(Order::Increasing, Axis::Z),
        SweepDirection::new(Order::Decreasing, Axis::Z),
    ];

    pub const fn new(order: Order, axis: Axis) -> Self {
        Self { order, axis }
    }

    /// Position in [`SweepDirection::ALL`]
    #[inline]
    pub fn index(self) -> usize {
        let order = match self.order {
            Order::Increasing => 0,
            Order::Decreasing => 1,
        };
        self.axis.index() * 2 + order
    }

    /// Ownership bit of this sweep in a cell's mask
    #[inline]
    pub fn bit(self) -> u8 {
        1 << self.index()
    }

    /// Inverse of [`SweepDirection::bit`] for a mask with a single bit set
    pub fn from_bit(bit: u8) -> Option<Self> {
        if bit.count_ones() != 1 {
            return None;
        }
        Self::ALL.get(bit.trailing_zeros() as usize).copied()
    }
}

impl fmt::Display for SweepDirection {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let order = match self.order {
            Order::Increasing => "I",
            Order::Decreasing => "D",
        };
        write!(f, "{}{:?}", order, self.axis)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn event(polar: f64, polar_small: f64) -> CircleEvent {
        CircleEvent {
            polar,
            polar_small,
            center: DVec3::ZERO,
        }
    }

    #[test]
    fn test_direction_bits() {
        let bits: Vec<u8> = SweepDirection::ALL.iter().map(|d| d.bit()).collect();
        assert_eq!(bits, vec![1, 2, 4, 8, 16, 32]);

        for direction in SweepDirection::ALL {
            assert_eq!(SweepDirection::from_bit(direction.bit()), Some(direction));
        }
        assert_eq!(SweepDirection::from_bit(0), None);
        assert_eq!(SweepDirection::from_bit(3), None);
        assert_eq!(SweepDirection::ALL[3].to_string(), "DY");
    }

    #[test]
    fn test_event_order() {
        let increasing = Order::Increasing;
        assert!(increasing.is_after(&event(3.0, 0.25), &event(2.0, 0.25)));
        assert!(!increasing.is_after(&event(2.0, 0.25), &event(3.0, 0.25)));
        assert!(!increasing.is_after(&event(3.0, 0.25), &event(3.0, 0.25)));

        // Decreasing sweeps handle larger (polar - small) first.
        let decreasing = Order::Decreasing;
        assert!(decreasing.is_after(&event(1.0, 0.25), &event(4.0, 1.70)));
        assert!(!decreasing.is_after(&event(4.0, 1.70), &event(1.0, 0.25)));
        assert!(!decreasing.is_after(&event(1.0, 0.25), &event(1.0, 0.25)));
    }

    #[test]
    fn test_site_versus_event() {
        assert!(!Order::Increasing.site_first(2.5, &event(2.0, 0.25)));
        assert!(Order::Increasing.site_first(2.5, &event(2.0, 0.5)));
        assert!(Order::Increasing.site_first(1.0, &event(2.0, 0.25)));

        assert!(Order::Decreasing.site_first(2.5, &event(1.0, 0.25)));
        assert!(Order::Decreasing.site_first(2.5, &event(3.0, 0.5)));
        assert!(!Order::Decreasing.site_first(2.0, &event(3.0, 0.5)));
    }

    #[test]
    fn test_upcoming_guard() {
        assert!(Order::Increasing.is_upcoming(1.0, 0.2, 1.1, 0.0));
        assert!(!Order::Increasing.is_upcoming(1.0, 0.2, 1.3, 0.0));
        assert!(Order::Decreasing.is_upcoming(1.0, 0.2, 0.9, 0.0));
        assert!(!Order::Decreasing.is_upcoming(1.0, 0.2, 0.7, 0.0));
    }

    #[test]
    fn test_circumcenter_orientation() {
        let p1 = DVec3::new(0.0, 1.0, 0.5).normalize();
        let p2 = DVec3::new(1.0, 0.0, 0.5).normalize();
        let p3 = DVec3::new(0.0, -1.0, 0.5).normalize();

        let up = Order::Increasing.circumcenter(p1, p2, p3).unwrap();
        let down = Order::Decreasing.circumcenter(p1, p2, p3).unwrap();
        assert!((up - DVec3::Z).length() < 1e-12);
        assert!((down + DVec3::Z).length() < 1e-12);
    }

    #[test]
    fn test_circumcenter_equator_triple_is_antipodal() {
        let up = Order::Increasing
            .circumcenter(DVec3::Y, DVec3::X, DVec3::NEG_Y)
            .unwrap();
        let down = Order::Decreasing
            .circumcenter(DVec3::Y, DVec3::X, DVec3::NEG_Y)
            .unwrap();
        assert!((up.length() - 1.0).abs() < 1e-12);
        assert!((up + down).length() < 1e-12);
    }

    #[test]
    fn test_circumcenter_degenerate() {
        assert!(Order::Increasing
            .circumcenter(DVec3::X, DVec3::Y, DVec3::X)
            .is_none());
    }

    #[test]
    fn test_fold_angle() {
        assert_eq!(fold_angle(0.0), 0.0);
        assert!((fold_angle(-PI / 2.0) - 1.5 * PI).abs() < 1e-12);
        assert!((fold_angle(5.0 * PI) - PI).abs() < 1e-12);
        assert!(fold_angle(-1e-18) < TAU);
    }

    #[test]
    fn test_axis_frames() {
        let p = DVec3::new(0.0, 0.0, 1.0);
        let (cos_polar, azimuth) = Axis::X.polar_frame(p);
        assert_eq!(cos_polar, 0.0);
        assert!((azimuth - PI / 2.0).abs() < 1e-12);

        let (cos_polar, _) = Axis::Z.polar_frame(p);
        assert_eq!(cos_polar, 1.0);
    }
}
