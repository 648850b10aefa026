//! Lloyd's Relaxation for uniform site distribution
//!
//! Iteratively moves every site to the centroid of its Voronoi cell, using
//! the sweep generator for each tessellation.

use std::time::Instant;

use glam::DVec3;
use rayon::prelude::*;
use tracing::{debug, info};

use crate::config::GeneratorConfig;
use crate::error::Result;

use super::generate;

/// Options for Lloyd's relaxation
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct LloydOptions {
    /// Maximum number of iterations to run
    pub max_iterations: usize,
    /// Stop when the largest site displacement (radians) drops below this
    ///
    /// Set to 0.0 to disable early termination.
    pub convergence_threshold: f64,
}

impl Default for LloydOptions {
    fn default() -> Self {
        Self {
            max_iterations: 5,
            convergence_threshold: 0.001,
        }
    }
}

/// Relax `points` toward a centroidal Voronoi distribution
///
/// Each iteration tessellates the current sites and moves every resolved cell's
/// site to its centroid; unresolved cells keep their site. Centroids are always
/// computed regardless of `config.compute_centroids`, and any target in
/// `config` is ignored so every cell takes part.
///
/// # Arguments
///
/// * `points` - Initial site directions
/// * `options` - Iteration limit and convergence threshold
/// * `config` - Generator configuration used for every iteration
///
/// # Errors
///
/// Propagates the errors of [`generate`].
///
/// # Example
///
/// ```rust
/// use rust_voronoi_sweep::*;
/// use rust_voronoi_sweep::generation::{random_sphere_points, relax};
///
/// let config = GeneratorConfigBuilder::new().seed(1).build().unwrap();
/// let points = random_sphere_points(200, 1);
/// let relaxed = relax(&points, LloydOptions::default(), &config).unwrap();
/// assert_eq!(relaxed.len(), 200);
/// ```
pub fn relax(points: &[DVec3], options: LloydOptions, config: &GeneratorConfig) -> Result<Vec<DVec3>> {
    let total_start = Instant::now();
    let config = GeneratorConfig {
        target_cells: None,
        sort_corners: false,
        compute_centroids: true,
        ..*config
    };

    let mut points = points.to_vec();
    let mut iterations_run = 0;
    let mut converged = false;

    for iteration in 0..options.max_iterations {
        let iter_start = Instant::now();
        let output = generate(&points, &config)?;

        let moved: Vec<(DVec3, f64)> = output
            .cells
            .par_iter()
            .map(|cell| {
                let moved = if cell.is_resolved() { cell.position } else { cell.site };
                (moved, cell.site.dot(moved).clamp(-1.0, 1.0).acos())
            })
            .collect();
        let max_displacement = moved.iter().map(|&(_, d)| d).fold(0.0, f64::max);

        points = moved.into_iter().map(|(p, _)| p).collect();
        iterations_run = iteration + 1;
        debug!(
            iteration = iterations_run,
            max_displacement,
            elapsed_ms = iter_start.elapsed().as_secs_f64() * 1000.0,
            "relaxation step"
        );

        if options.convergence_threshold > 0.0 && max_displacement < options.convergence_threshold {
            converged = true;
            break;
        }
    }

    info!(
        iterations = iterations_run,
        max_iterations = options.max_iterations,
        converged,
        elapsed_ms = total_start.elapsed().as_secs_f64() * 1000.0,
        "relaxation finished"
    );
    Ok(points)
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::config::GeneratorConfigBuilder;
    use crate::generation::random_sphere_points;

    fn nearest_neighbor_angles(points: &[DVec3]) -> Vec<f64> {
        points
            .iter()
            .enumerate()
            .map(|(i, p)| {
                points
                    .iter()
                    .enumerate()
                    .filter(|&(j, _)| j != i)
                    .map(|(_, q)| p.dot(*q).clamp(-1.0, 1.0).acos())
                    .fold(f64::MAX, f64::min)
            })
            .collect()
    }

    #[test]
    fn test_relax_keeps_points_on_sphere() {
        let config = GeneratorConfigBuilder::new().seed(42).build().unwrap();
        let points = random_sphere_points(100, 42);
        let relaxed = relax(&points, LloydOptions { max_iterations: 3, convergence_threshold: 0.0 }, &config).unwrap();

        assert_eq!(relaxed.len(), 100);
        for p in &relaxed {
            assert!((p.length() - 1.0).abs() < 1e-9);
        }
    }

    #[test]
    fn test_relax_spreads_points() {
        let config = GeneratorConfigBuilder::new().seed(7).build().unwrap();
        let points = random_sphere_points(300, 7);
        let relaxed = relax(&points, LloydOptions { max_iterations: 4, convergence_threshold: 0.0 }, &config).unwrap();

        let min_before = nearest_neighbor_angles(&points).into_iter().fold(f64::MAX, f64::min);
        let min_after = nearest_neighbor_angles(&relaxed).into_iter().fold(f64::MAX, f64::min);
        assert!(min_after > min_before, "{} <= {}", min_after, min_before);
    }

    #[test]
    fn test_zero_iterations_is_identity() {
        let config = GeneratorConfigBuilder::new().seed(1).build().unwrap();
        let points = random_sphere_points(20, 1);
        let options = LloydOptions { max_iterations: 0, ..Default::default() };
        assert_eq!(relax(&points, options, &config).unwrap(), points);
    }

    #[test]
    fn test_lloyd_options_default() {
        let options = LloydOptions::default();
        assert_eq!(options.max_iterations, 5);
        assert!(options.convergence_threshold > 0.0);
    }
}
