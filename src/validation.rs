//! Closure check for generated tessellations
//!
//! Every corner of a resolved cell must lie on that cell's boundary: moved a
//! little toward its own site, no other site may be closer to it.

use glam::DVec3;
use rayon::prelude::*;

use crate::tessellation::Tessellation;

/// A corner that ended up closer to a foreign site
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct ClosureViolation {
    /// The cell the corner belongs to
    pub cell: usize,
    /// Position of the corner in the cell's corner list
    pub corner: usize,
    /// A site strictly closer to the nudged corner than the cell's own
    pub closer_cell: usize,
}

/// Outcome of [`check_closure`]
#[derive(Debug, Clone, Default, PartialEq)]
pub struct ClosureReport {
    /// Resolved cells whose corners were checked
    pub cells_checked: usize,
    pub corners_checked: usize,
    /// Cells skipped for having fewer than three corners
    pub unresolved: usize,
    pub violations: Vec<ClosureViolation>,
}

impl ClosureReport {
    /// No checked corner was closer to a foreign site
    #[inline]
    pub fn is_valid(&self) -> bool {
        self.violations.is_empty()
    }
}

/// Check the closure property of every resolved cell
///
/// Each corner `c` of cell `i` is replaced by `c + (site_i - c) * nudge` and
/// compared against all sites. Corners are equidistant from three sites, so
/// the nudge moves them strictly inside their cell; 0.01 works well.
///
/// # Example
///
/// ```
/// use rust_voronoi_sweep::*;
///
/// let config = GeneratorConfigBuilder::new().seed(5).build().unwrap();
/// let tessellation = Tessellation::generate_random(100, config).unwrap();
/// let report = check_closure(&tessellation, 0.01);
/// assert!(report.is_valid());
/// ```
pub fn check_closure(tessellation: &Tessellation, nudge: f64) -> ClosureReport {
    let cells = tessellation.cells();

    let violations: Vec<ClosureViolation> = cells
        .par_iter()
        .filter(|cell| cell.is_resolved())
        .flat_map_iter(|cell| {
            cell.corners.iter().enumerate().filter_map(move |(corner, &c)| {
                let nudged = c + (cell.site - c) * nudge;
                closer_site(tessellation, cell.id, nudged).map(|closer_cell| ClosureViolation {
                    cell: cell.id,
                    corner,
                    closer_cell,
                })
            })
        })
        .collect();

    let cells_checked = cells.iter().filter(|c| c.is_resolved()).count();
    ClosureReport {
        cells_checked,
        corners_checked: cells
            .iter()
            .filter(|c| c.is_resolved())
            .map(|c| c.corner_count())
            .sum(),
        unresolved: cells.len() - cells_checked,
        violations,
    }
}

/// A site strictly closer to `point` than the site of `cell`, if any
#[cfg(feature = "spatial-index")]
fn closer_site(tessellation: &Tessellation, cell: usize, point: DVec3) -> Option<usize> {
    let own = (point - tessellation.cells()[cell].site).length_squared();
    let (nearest, distance) = tessellation.spatial_index().nearest_with_distance(point);
    (nearest != cell && distance < own).then_some(nearest)
}

/// A site strictly closer to `point` than the site of `cell`, if any
#[cfg(not(feature = "spatial-index"))]
fn closer_site(tessellation: &Tessellation, cell: usize, point: DVec3) -> Option<usize> {
    let cells = tessellation.cells();
    let own = cells[cell].site.dot(point);
    cells
        .iter()
        .filter(|other| other.id != cell && other.site.dot(point) > own)
        .map(|other| other.id)
        .next()
}
