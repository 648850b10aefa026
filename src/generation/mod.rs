//! Parallel tessellation pipeline
//!
//! Validates the input, sorts the sites along each axis, runs the six sweeps
//! concurrently against one shared cell array, then finalizes the cells.
//!
//! Every stage runs on a dedicated rayon pool sized by the configuration, and
//! each stage is a barrier: the sweeps start only once all three site arrays
//! are sorted, and finalization starts only once every sweep has returned.

mod points;
mod relax;

pub use points::{fibonacci_sphere_points, random_sphere_points};
pub use relax::{relax, LloydOptions};

use std::time::Instant;

use glam::DVec3;
use rayon::prelude::*;
use tracing::{debug, info, warn};

use crate::cell::VoronoiCell;
use crate::config::GeneratorConfig;
use crate::error::{Result, VoronoiError};
use crate::sweep::{Axis, CellArray, Site, SweepDirection, SweepStats, Sweeper};

/// Cells and bookkeeping produced by one generation
#[derive(Debug, Clone)]
pub struct GenerationOutput {
    /// One cell per input site, indexed like the input
    pub cells: Vec<VoronoiCell>,
    /// Cells whose owner removed every arc before stopping
    pub completed: usize,
    /// The resolved target cell count
    pub target: usize,
    /// One entry per sweep, in [`SweepDirection::ALL`] order
    pub stats: Vec<SweepStats>,
}

/// Check and normalize input directions
///
/// # Errors
///
/// - `InsufficientPoints` for fewer than two sites
/// - `InvalidPoint` for a non-finite or zero-length vector
pub fn normalize_points(points: &[DVec3]) -> Result<Vec<DVec3>> {
    if points.len() < 2 {
        return Err(VoronoiError::InsufficientPoints(points.len()));
    }
    if u32::try_from(points.len()).is_err() {
        return Err(VoronoiError::InvalidConfig(format!(
            "{} sites exceed the supported maximum of {}",
            points.len(),
            u32::MAX
        )));
    }

    points
        .iter()
        .enumerate()
        .map(|(index, p)| {
            if !p.is_finite() {
                return Err(VoronoiError::InvalidPoint {
                    index,
                    reason: "non-finite coordinate",
                });
            }
            p.try_normalize().ok_or(VoronoiError::InvalidPoint {
                index,
                reason: "zero-length vector",
            })
        })
        .collect()
}

/// Build the three per-axis site arrays, each sorted by polar angle
///
/// The result is indexed by [`Axis::index`]. Must be called from within a
/// rayon context to use the intended pool.
pub fn build_site_arrays(points: &[DVec3]) -> [Vec<Site>; 3] {
    let build = |axis: Axis| {
        let mut sites: Vec<Site> = points
            .par_iter()
            .enumerate()
            .map(|(i, &p)| Site::new(p, i as u32, axis))
            .collect();
        sites.par_sort_unstable_by(|a, b| a.polar.total_cmp(&b.polar));
        sites
    };

    let (x, (y, z)) = rayon::join(
        || build(Axis::X),
        || rayon::join(|| build(Axis::Y), || build(Axis::Z)),
    );
    [x, y, z]
}

/// Run the full pipeline on `points`
///
/// # Arguments
///
/// * `points` - Site directions; normalized on entry
/// * `config` - Generator configuration
///
/// # Errors
///
/// Input validation errors (see [`normalize_points`]), an `InvalidConfig`
/// error if the target exceeds the site count, and `GenerationFailed` if the
/// worker pool cannot be created.
pub fn generate(points: &[DVec3], config: &GeneratorConfig) -> Result<GenerationOutput> {
    let started = Instant::now();
    let points = normalize_points(points)?;
    let target = config.resolve_target(points.len())?;

    let pool = rayon::ThreadPoolBuilder::new()
        .num_threads(config.threads)
        .thread_name(|i| format!("voronoi-sweep-{}", i))
        .build()
        .map_err(|e| VoronoiError::GenerationFailed(e.to_string()))?;

    let output = pool.install(|| {
        let sort_started = Instant::now();
        let sites = build_site_arrays(&points);
        debug!(
            sites = points.len(),
            elapsed_ms = sort_started.elapsed().as_secs_f64() * 1000.0,
            "site arrays sorted"
        );

        let cells = CellArray::new(points.len());
        let stats = run_sweeps(&sites, &cells, target, config);
        let completed = cells.completed();

        let mut cells: Vec<VoronoiCell> = cells
            .into_cells()
            .into_par_iter()
            .enumerate()
            .map(|(id, record)| VoronoiCell::from_record(id, points[id], record))
            .collect();
        if config.sort_corners || config.compute_centroids {
            cells.par_iter_mut().for_each(|cell| {
                if config.sort_corners {
                    cell.sort_corners();
                }
                if config.compute_centroids {
                    cell.position = cell.centroid();
                }
            });
        }

        GenerationOutput {
            cells,
            completed,
            target,
            stats,
        }
    });

    let unresolved = output.cells.iter().filter(|c| !c.is_resolved()).count();
    info!(
        sites = points.len(),
        target_cells = target,
        completed = output.completed,
        unresolved,
        elapsed_ms = started.elapsed().as_secs_f64() * 1000.0,
        "tessellation generated"
    );
    if target == points.len() && unresolved > 0 {
        warn!(unresolved, "cells left without a polygon after a full tessellation");
    }

    Ok(output)
}

/// Run all six sweeps concurrently and collect their stats
fn run_sweeps(
    sites: &[Vec<Site>; 3],
    cells: &CellArray,
    target: usize,
    config: &GeneratorConfig,
) -> Vec<SweepStats> {
    SweepDirection::ALL
        .into_par_iter()
        .filter_map(|direction| {
            let token = cells.token(direction)?;
            let sites = &sites[direction.axis.index()];
            Some(Sweeper::new(direction, sites, token, target, config.queue_buckets, config.seed).run())
        })
        .collect()
}
