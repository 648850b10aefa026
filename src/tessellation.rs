//! Tessellation result structure

use glam::DVec3;

use crate::cell::VoronoiCell;
use crate::config::GeneratorConfig;
use crate::error::Result;
use crate::generation::{self, random_sphere_points};
use crate::sweep::SweepStats;

#[cfg(feature = "spatial-index")]
use crate::spatial::SpatialIndex;

/// A Voronoi tessellation of the unit sphere
///
/// Holds one cell per input site, indexed like the input, plus what the sweeps
/// reported. With the `spatial-index` feature it also keeps a KD-tree over
/// the sites for direction-to-cell lookups.
///
/// # Examples
///
/// ```
/// use rust_voronoi_sweep::*;
///
/// let config = GeneratorConfigBuilder::new().seed(42).build().unwrap();
/// let tessellation = Tessellation::generate_random(1000, config).unwrap();
///
/// println!("Generated {} cells", tessellation.cell_count());
/// if let Some(cell) = tessellation.get_cell(0) {
///     println!("Cell 0 has {} corners", cell.corner_count());
/// }
/// ```
#[derive(Clone)]
pub struct Tessellation {
    /// Configuration used to generate this tessellation
    config: GeneratorConfig,

    /// All cells (indexed by site)
    cells: Vec<VoronoiCell>,

    /// Cells closed by their owning sweep
    completed: usize,

    /// Resolved target cell count
    target: usize,

    /// Per-sweep counters in `SweepDirection::ALL` order
    stats: Vec<SweepStats>,

    #[cfg(feature = "spatial-index")]
    spatial_index: SpatialIndex,
}

impl Tessellation {
    /// Tessellate the given site directions
    ///
    /// # Arguments
    ///
    /// * `points` - Site directions (at least two; normalized on entry)
    /// * `config` - Generator configuration
    ///
    /// # Returns
    ///
    /// `Result<Tessellation>` - the tessellation, or an input/config error
    ///
    /// # Example
    ///
    /// ```
    /// use rust_voronoi_sweep::*;
    /// use rust_voronoi_sweep::generation::fibonacci_sphere_points;
    ///
    /// let points = fibonacci_sphere_points(64, 7);
    /// let config = GeneratorConfigBuilder::new().seed(1).build().unwrap();
    /// let tessellation = Tessellation::generate(&points, config).unwrap();
    /// assert_eq!(tessellation.cell_count(), 64);
    /// ```
    pub fn generate(points: &[DVec3], config: GeneratorConfig) -> Result<Self> {
        let output = generation::generate(points, &config)?;

        #[cfg(feature = "spatial-index")]
        let spatial_index = {
            let sites: Vec<DVec3> = output.cells.iter().map(|c| c.site).collect();
            SpatialIndex::new(&sites)
        };

        Ok(Self {
            config,
            cells: output.cells,
            completed: output.completed,
            target: output.target,
            stats: output.stats,
            #[cfg(feature = "spatial-index")]
            spatial_index,
        })
    }

    /// Tessellate `count` uniformly random sites drawn from `config.seed`
    pub fn generate_random(count: usize, config: GeneratorConfig) -> Result<Self> {
        let points = random_sphere_points(count, config.seed);
        Self::generate(&points, config)
    }

    /// Get the configuration used to generate this tessellation
    #[inline]
    pub fn config(&self) -> &GeneratorConfig {
        &self.config
    }

    /// Get the number of cells (one per input site)
    #[inline]
    pub fn cell_count(&self) -> usize {
        self.cells.len()
    }

    /// Get a cell by ID
    ///
    /// Returns `None` if the cell ID is out of bounds.
    #[inline]
    pub fn get_cell(&self, id: usize) -> Option<&VoronoiCell> {
        self.cells.get(id)
    }

    /// Get all cells as a slice
    #[inline]
    pub fn cells(&self) -> &[VoronoiCell] {
        &self.cells
    }

    /// Number of cells closed when the sweeps stopped
    #[inline]
    pub fn completed_cells(&self) -> usize {
        self.completed
    }

    /// The target cell count the sweeps were asked to reach
    #[inline]
    pub fn target_cells(&self) -> usize {
        self.target
    }

    /// IDs of cells with fewer than three corners
    pub fn unresolved_cells(&self) -> Vec<usize> {
        self.cells
            .iter()
            .filter(|c| !c.is_resolved())
            .map(|c| c.id)
            .collect()
    }

    /// Counters of each sweep, in `SweepDirection::ALL` order
    #[inline]
    pub fn sweep_stats(&self) -> &[SweepStats] {
        &self.stats
    }

    /// Find the cell containing a direction (requires spatial-index feature)
    ///
    /// The direction does not need to be normalized.
    ///
    /// # Example
    ///
    /// ```
    /// # use rust_voronoi_sweep::*;
    /// # #[cfg(feature = "spatial-index")]
    /// # {
    /// # let config = GeneratorConfigBuilder::new().seed(3).build().unwrap();
    /// # let tessellation = Tessellation::generate_random(500, config).unwrap();
    /// let site = tessellation.get_cell(17).unwrap().site;
    /// assert_eq!(tessellation.find_cell_at(site * 4.0), 17);
    /// # }
    /// ```
    #[cfg(feature = "spatial-index")]
    pub fn find_cell_at(&self, direction: DVec3) -> usize {
        let direction = direction.try_normalize().unwrap_or(direction);
        self.spatial_index.find_nearest(direction)
    }

    #[cfg(feature = "spatial-index")]
    pub(crate) fn spatial_index(&self) -> &SpatialIndex {
        &self.spatial_index
    }

    /// Same tessellation with replaced cells, for tests that tamper with geometry
    #[cfg(test)]
    pub(crate) fn with_cells(&self, cells: Vec<VoronoiCell>) -> Self {
        Self {
            cells,
            ..self.clone()
        }
    }
}
