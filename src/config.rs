//! Generator Configuration and Builder
//!
//! This module provides the configuration for a sweep-line tessellation run.

#[cfg(feature = "serde")]
use serde::{Deserialize, Serialize};

use crate::error::{Result, VoronoiError};

/// Number of coarse buckets in front of each sweep's event queue
pub const DEFAULT_QUEUE_BUCKETS: usize = 4;

/// One worker per sweep direction
pub const DEFAULT_THREADS: usize = 6;

const MAX_QUEUE_BUCKETS: usize = 64;
const MAX_THREADS: usize = 256;

/// Configuration for a spherical Voronoi generation
///
/// The configuration is independent of the input sites, so the same config
/// can be reused across many point sets.
///
/// # Example
///
/// ```rust
/// use rust_voronoi_sweep::*;
///
/// let config = GeneratorConfigBuilder::new()
///     .seed(42)
///     .target_cells(500)
///     .unwrap()
///     .build()
///     .unwrap();
///
/// # #[cfg(feature = "serde")]
/// # {
/// let json = serde_json::to_string(&config).unwrap();
/// let restored: GeneratorConfig = serde_json::from_str(&json).unwrap();
/// assert_eq!(config, restored);
/// # }
/// ```
#[cfg_attr(feature = "serde", derive(Serialize, Deserialize))]
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct GeneratorConfig {
    /// Seed for the skip-level samplers of every sweep (and for random sampling)
    ///
    /// Each sweep derives its own stream from this seed, so a sweep's internal
    /// structure is reproducible. Which sweep wins a given cell is not.
    pub seed: u64,

    /// Stop all sweeps once this many cells are topologically closed
    ///
    /// `None` means every cell (full tessellation).
    pub target_cells: Option<usize>,

    /// Number of coarse buckets partitioning each event queue
    pub queue_buckets: usize,

    /// Worker threads in the generation pool
    pub threads: usize,

    /// Order every cell's corners counter-clockwise after the sweeps finish
    pub sort_corners: bool,

    /// Replace each cell's position by the centroid of its polygon
    pub compute_centroids: bool,
}

impl GeneratorConfig {
    /// Resolve the target cell count against the number of input sites
    ///
    /// # Errors
    ///
    /// Returns `InvalidConfig` if the target exceeds `site_count`.
    pub fn resolve_target(&self, site_count: usize) -> Result<usize> {
        match self.target_cells {
            None => Ok(site_count),
            Some(target) if target <= site_count => Ok(target),
            Some(target) => Err(VoronoiError::InvalidConfig(format!(
                "target cell count {} exceeds site count {}",
                target, site_count
            ))),
        }
    }
}

impl Default for GeneratorConfig {
    fn default() -> Self {
        Self {
            seed: rand::random(),
            target_cells: None,
            queue_buckets: DEFAULT_QUEUE_BUCKETS,
            threads: DEFAULT_THREADS,
            sort_corners: true,
            compute_centroids: false,
        }
    }
}

/// Builder for creating GeneratorConfig with validation
///
/// # Example
///
/// ```rust
/// use rust_voronoi_sweep::*;
///
/// let config = GeneratorConfigBuilder::new()
///     .seed(7)
///     .queue_buckets(8)
///     .unwrap()
///     .compute_centroids(true)
///     .build()
///     .unwrap();
/// assert_eq!(config.queue_buckets, 8);
/// ```
#[derive(Debug, Clone)]
pub struct GeneratorConfigBuilder {
    seed: Option<u64>,
    target_cells: Option<usize>,
    queue_buckets: usize,
    threads: usize,
    sort_corners: bool,
    compute_centroids: bool,
}

impl GeneratorConfigBuilder {
    /// Create a new builder with default values
    ///
    /// Defaults:
    /// - seed: Random
    /// - target_cells: all cells
    /// - queue_buckets: 4
    /// - threads: 6
    /// - sort_corners: true
    /// - compute_centroids: false
    pub fn new() -> Self {
        Self {
            seed: None,
            target_cells: None,
            queue_buckets: DEFAULT_QUEUE_BUCKETS,
            threads: DEFAULT_THREADS,
            sort_corners: true,
            compute_centroids: false,
        }
    }

    /// Set the seed used by the sweeps' skip-level samplers
    pub fn seed(mut self, seed: u64) -> Self {
        self.seed = Some(seed);
        self
    }

    /// Stop once this many cells are closed (partial generation)
    ///
    /// # Errors
    ///
    /// Returns `InvalidConfig` if `target` is zero
    pub fn target_cells(mut self, target: usize) -> Result<Self> {
        if target == 0 {
            return Err(VoronoiError::InvalidConfig(
                "target cell count must be positive".to_string(),
            ));
        }
        self.target_cells = Some(target);
        Ok(self)
    }

    /// Set the number of event queue buckets
    ///
    /// # Errors
    ///
    /// Returns `InvalidConfig` if `buckets` is 0 or larger than 64
    pub fn queue_buckets(mut self, buckets: usize) -> Result<Self> {
        if buckets == 0 || buckets > MAX_QUEUE_BUCKETS {
            return Err(VoronoiError::InvalidConfig(format!(
                "queue buckets must be in 1..={} (got {})",
                MAX_QUEUE_BUCKETS, buckets
            )));
        }
        self.queue_buckets = buckets;
        Ok(self)
    }

    /// Set the size of the worker pool
    ///
    /// Fewer than six threads is allowed; sweeps then share workers and the
    /// earliest ones claim more cells.
    ///
    /// # Errors
    ///
    /// Returns `InvalidConfig` if `threads` is 0 or larger than 256
    pub fn threads(mut self, threads: usize) -> Result<Self> {
        if threads == 0 || threads > MAX_THREADS {
            return Err(VoronoiError::InvalidConfig(format!(
                "thread count must be in 1..={} (got {})",
                MAX_THREADS, threads
            )));
        }
        self.threads = threads;
        Ok(self)
    }

    /// Sort corners counter-clockwise around each site
    pub fn sort_corners(mut self, enabled: bool) -> Self {
        self.sort_corners = enabled;
        self
    }

    /// Replace cell positions by polygon centroids
    pub fn compute_centroids(mut self, enabled: bool) -> Self {
        self.compute_centroids = enabled;
        self
    }

    /// Build the configuration
    ///
    /// If no seed was provided, a random one is drawn.
    pub fn build(self) -> Result<GeneratorConfig> {
        let seed = self.seed.unwrap_or_else(rand::random);

        Ok(GeneratorConfig {
            seed,
            target_cells: self.target_cells,
            queue_buckets: self.queue_buckets,
            threads: self.threads,
            sort_corners: self.sort_corners,
            compute_centroids: self.compute_centroids,
        })
    }
}

impl Default for GeneratorConfigBuilder {
    fn default() -> Self {
        Self::new()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_builder_defaults() {
        let config = GeneratorConfigBuilder::new().build().unwrap();
        assert_eq!(config.target_cells, None);
        assert_eq!(config.queue_buckets, DEFAULT_QUEUE_BUCKETS);
        assert_eq!(config.threads, DEFAULT_THREADS);
        assert!(config.sort_corners);
        assert!(!config.compute_centroids);
    }

    #[test]
    fn test_builder_custom() {
        let config = GeneratorConfigBuilder::new()
            .seed(42)
            .target_cells(10)
            .unwrap()
            .queue_buckets(1)
            .unwrap()
            .threads(2)
            .unwrap()
            .sort_corners(false)
            .compute_centroids(true)
            .build()
            .unwrap();

        assert_eq!(config.seed, 42);
        assert_eq!(config.target_cells, Some(10));
        assert_eq!(config.queue_buckets, 1);
        assert_eq!(config.threads, 2);
        assert!(!config.sort_corners);
        assert!(config.compute_centroids);
    }

    #[test]
    fn test_builder_rejects_invalid_values() {
        assert!(GeneratorConfigBuilder::new().target_cells(0).is_err());
        assert!(GeneratorConfigBuilder::new().queue_buckets(0).is_err());
        assert!(GeneratorConfigBuilder::new().queue_buckets(65).is_err());
        assert!(GeneratorConfigBuilder::new().threads(0).is_err());
    }

    #[test]
    fn test_resolve_target() {
        let config = GeneratorConfigBuilder::new().seed(1).build().unwrap();
        assert_eq!(config.resolve_target(100).unwrap(), 100);

        let config = GeneratorConfigBuilder::new()
            .seed(1)
            .target_cells(50)
            .unwrap()
            .build()
            .unwrap();
        assert_eq!(config.resolve_target(100).unwrap(), 50);
        assert!(config.resolve_target(20).is_err());
    }

    #[cfg(feature = "serde")]
    #[test]
    fn test_config_serialization() {
        let config = GeneratorConfigBuilder::new()
            .seed(12345)
            .target_cells(64)
            .unwrap()
            .build()
            .unwrap();

        let json = serde_json::to_string(&config).unwrap();
        let restored: GeneratorConfig = serde_json::from_str(&json).unwrap();

        assert_eq!(config, restored);
    }
}
