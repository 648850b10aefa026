//! Voronoi Cell Structure
//!
//! The finalized polygon of one site, as handed to callers once every sweep
//! has joined.

use glam::DVec3;

#[cfg(feature = "serde")]
use serde::{Deserialize, Serialize};

use crate::sweep::{CellRecord, SweepDirection};

/// A single Voronoi cell on the unit sphere
///
/// Each cell holds:
/// - The input site it belongs to and its index in the input slice
/// - A representative position (the site, or the polygon centroid)
/// - The corners (Voronoi vertices) its owning sweep found
/// - Whether that sweep closed the cell before stopping
///
/// A cell with fewer than three corners is *unresolved*: generation stopped
/// before any sweep reached it, or it lost every race to a sweep that
/// stopped early. This is reported, not treated as an error.
#[cfg_attr(feature = "serde", derive(Serialize, Deserialize))]
#[derive(Debug, Clone, PartialEq)]
pub struct VoronoiCell {
    /// Index of the site in the input slice (0 to cell_count-1)
    pub id: usize,

    /// The (normalized) input site
    pub site: DVec3,

    /// Representative point of the cell
    ///
    /// Equal to `site` unless centroids were requested in the configuration.
    pub position: DVec3,

    /// Voronoi vertices on the cell boundary
    ///
    /// Counter-clockwise around the site when corner sorting is enabled,
    /// otherwise in the order the owning sweep found them.
    pub corners: Vec<DVec3>,

    /// Every arc of this cell was removed from its owner's beach line
    pub complete: bool,

    /// The sweep that won the cell, if any sweep touched it
    pub owner: Option<SweepDirection>,
}

impl VoronoiCell {
    /// Create a new Voronoi cell
    pub fn new(id: usize, site: DVec3, corners: Vec<DVec3>) -> Self {
        Self {
            id,
            site,
            position: site,
            corners,
            complete: false,
            owner: None,
        }
    }

    /// Build a cell from the arbitration result of generation
    pub(crate) fn from_record(id: usize, site: DVec3, record: CellRecord) -> Self {
        let owner = SweepDirection::from_bit(record.owner);
        Self {
            id,
            site,
            position: site,
            corners: record.corners,
            complete: owner.is_some() && record.open_arcs == 0,
            owner,
        }
    }

    /// Get the corner count (polygon complexity)
    #[inline]
    pub fn corner_count(&self) -> usize {
        self.corners.len()
    }

    /// Whether the cell has enough corners to form a polygon
    #[inline]
    pub fn is_resolved(&self) -> bool {
        self.corners.len() >= 3
    }

    /// Order corners counter-clockwise around the site
    ///
    /// Corners are projected onto the tangent plane at the site and sorted by
    /// angle.
    pub fn sort_corners(&mut self) {
        order_corners(&mut self.corners, self.site);
    }

    /// Area-weighted centroid of the polygon, projected back onto the sphere
    ///
    /// Returns the site itself for unresolved cells or a degenerate polygon.
    pub fn centroid(&self) -> DVec3 {
        if !self.is_resolved() {
            return self.site;
        }

        let mut corners = self.corners.clone();
        order_corners(&mut corners, self.site);

        let mut weighted = DVec3::ZERO;
        let mut total = 0.0;
        for (i, &a) in corners.iter().enumerate() {
            let b = corners[(i + 1) % corners.len()];
            let area = (a - self.site).cross(b - self.site).length() * 0.5;
            weighted += (self.site + a + b) / 3.0 * area;
            total += area;
        }

        if total <= 0.0 {
            return self.site;
        }
        (weighted / total).try_normalize().unwrap_or(self.site)
    }

    /// Approximate surface area of this cell
    ///
    /// Treats the polygon as a flat fan around the site, which underestimates
    /// the spherical area slightly for large cells. Assumes sorted corners.
    pub fn approximate_area(&self) -> f64 {
        if !self.is_resolved() {
            return 0.0;
        }

        let mut area = 0.0;
        for i in 0..self.corners.len() {
            let a = self.corners[i];
            let b = self.corners[(i + 1) % self.corners.len()];
            area += (a - self.site).cross(b - self.site).length() * 0.5;
        }
        area
    }

    /// Great-circle distance to another cell's site, in radians
    pub fn distance_to(&self, other: &VoronoiCell) -> f64 {
        self.site.dot(other.site).clamp(-1.0, 1.0).acos()
    }
}

/// Sort `corners` by angle around `site` in its tangent plane
fn order_corners(corners: &mut [DVec3], site: DVec3) {
    if corners.len() < 3 {
        return;
    }

    let normal = site.normalize();
    let reference = if normal.x.abs() > 0.5 { DVec3::Y } else { DVec3::X };
    let tangent_u = reference.cross(normal).normalize();
    let tangent_v = normal.cross(tangent_u);

    corners.sort_by(|a, b| {
        let angle = |c: &DVec3| {
            let to_c = *c - site;
            to_c.dot(tangent_v).atan2(to_c.dot(tangent_u))
        };
        angle(a).total_cmp(&angle(b))
    });
}

#[cfg(test)]
mod tests {
    use super::*;

    fn square_cell() -> VoronoiCell {
        let h = 0.1;
        let corners = vec![
            DVec3::new(1.0, h, 0.0).normalize(),
            DVec3::new(1.0, -h, 0.0).normalize(),
            DVec3::new(1.0, 0.0, h).normalize(),
            DVec3::new(1.0, 0.0, -h).normalize(),
        ];
        VoronoiCell::new(0, DVec3::X, corners)
    }

    #[test]
    fn test_cell_creation() {
        let cell = square_cell();
        assert_eq!(cell.id, 0);
        assert_eq!(cell.corner_count(), 4);
        assert!(cell.is_resolved());
        assert!(!cell.complete);
        assert_eq!(cell.position, DVec3::X);

        let lonely = VoronoiCell::new(1, DVec3::Y, vec![DVec3::Z]);
        assert!(!lonely.is_resolved());
        assert_eq!(lonely.approximate_area(), 0.0);
        assert_eq!(lonely.centroid(), DVec3::Y);
    }

    #[test]
    fn test_sort_corners_counter_clockwise() {
        let mut cell = square_cell();
        cell.sort_corners();

        // Consecutive corners turn the same way around the site.
        let n = cell.corners.len();
        for i in 0..n {
            let a = cell.corners[i] - cell.site;
            let b = cell.corners[(i + 1) % n] - cell.site;
            assert!(a.cross(b).dot(cell.site) > 0.0);
        }
    }

    #[test]
    fn test_approximate_area() {
        let mut cell = square_cell();
        cell.sort_corners();

        let area = cell.approximate_area();
        // Diagonals of about 0.2 give a square of area about 0.02.
        assert!((area - 0.02).abs() < 0.002, "area {}", area);
    }

    #[test]
    fn test_centroid_of_symmetric_cell() {
        let cell = square_cell();
        let centroid = cell.centroid();
        assert!((centroid - DVec3::X).length() < 1e-9);
        assert!((centroid.length() - 1.0).abs() < 1e-12);
    }

    #[test]
    fn test_centroid_moves_toward_corners() {
        let corners = vec![
            DVec3::new(1.0, 0.3, 0.1).normalize(),
            DVec3::new(1.0, 0.3, -0.1).normalize(),
            DVec3::new(1.0, 0.1, 0.0).normalize(),
        ];
        let cell = VoronoiCell::new(0, DVec3::X, corners);
        assert!(cell.centroid().y > 0.0);
    }

    #[test]
    fn test_distance_to() {
        let a = VoronoiCell::new(0, DVec3::X, vec![]);
        let b = VoronoiCell::new(1, DVec3::Y, vec![]);
        assert!((a.distance_to(&b) - std::f64::consts::FRAC_PI_2).abs() < 1e-12);
    }

    #[test]
    fn test_from_record() {
        let direction = SweepDirection::ALL[3];
        let record = CellRecord {
            owner: direction.bit(),
            open_arcs: 0,
            corners: vec![DVec3::Z],
        };
        let cell = VoronoiCell::from_record(4, DVec3::Y, record);
        assert_eq!(cell.owner, Some(direction));
        assert!(cell.complete);

        let untouched = CellRecord {
            owner: 0,
            open_arcs: 0,
            corners: vec![],
        };
        let cell = VoronoiCell::from_record(5, DVec3::Y, untouched);
        assert_eq!(cell.owner, None);
        assert!(!cell.complete);
    }
}
