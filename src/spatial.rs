//! Spatial indexing for fast direction-to-cell lookups
//!
//! This module is only available with the `spatial-index` feature.

use glam::DVec3;
use kiddo::immutable::float::kdtree::ImmutableKdTree;
use kiddo::SquaredEuclidean;

/// Wrapper around a KD-tree over the sites
///
/// On the unit sphere the nearest site in Euclidean distance is also the
/// nearest in great-circle distance, so a nearest-neighbor query answers
/// "which Voronoi cell contains this direction".
///
/// # Performance
///
/// - Construction: O(n log n)
/// - Query: O(log n)
#[derive(Clone)]
pub struct SpatialIndex {
    tree: ImmutableKdTree<f64, usize, 3, 32>,
}

impl SpatialIndex {
    /// Build the index from site positions
    ///
    /// # Example
    ///
    /// ```
    /// use rust_voronoi_sweep::*;
    /// use glam::DVec3;
    ///
    /// let sites = vec![DVec3::X, DVec3::Y, DVec3::Z];
    /// let index = SpatialIndex::new(&sites);
    /// assert_eq!(index.find_nearest(DVec3::new(1.0, 0.1, 0.0)), 0);
    /// ```
    pub fn new(sites: &[DVec3]) -> Self {
        let points: Vec<[f64; 3]> = sites.iter().map(|s| s.to_array()).collect();

        Self {
            tree: ImmutableKdTree::new_from_slice(&points),
        }
    }

    /// Index of the site nearest to `position`
    pub fn find_nearest(&self, position: DVec3) -> usize {
        let result = self.tree.nearest_one::<SquaredEuclidean>(&position.to_array());
        result.item
    }

    /// The nearest site and its squared Euclidean distance
    pub fn nearest_with_distance(&self, position: DVec3) -> (usize, f64) {
        let result = self.tree.nearest_one::<SquaredEuclidean>(&position.to_array());
        (result.item, result.distance)
    }
}
