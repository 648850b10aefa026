//! Parallel sweep-line Voronoi tessellation of the unit sphere
//!
//! A spherical version of Fortune's algorithm, run as six concurrent sweeps
//! (both directions along the X, Y and Z axes) that share one cell array.
//! Each cell is written by exactly one sweep, decided by a lock-free claim;
//! every sweep stops once enough cells have been closed.
//!
//! # Quick Start
//!
//! ```rust,no_run
//! use rust_voronoi_sweep::*;
//!
//! let config = GeneratorConfigBuilder::new()
//!     .seed(42)
//!     .threads(6).unwrap()
//!     .build().unwrap();
//!
//! let tessellation = Tessellation::generate_random(100_000, config).unwrap();
//! assert!(check_closure(&tessellation, 0.01).is_valid());
//!
//! let mesh = generate_mesh(&tessellation);
//! println!("Generated {} triangles", mesh.triangle_count());
//! ```
//!
//! # Features
//!
//! - `spatial-index` (default): O(log n) direction-to-cell lookups using a KD-tree
//! - `serde`: Serialization support for the configuration and cells

// Modules
pub mod error;
pub mod config;
pub mod cell;
pub mod sweep;
pub mod generation;
pub mod tessellation;
pub mod validation;
pub mod mesh;

#[cfg(feature = "spatial-index")]
pub mod spatial;

// Re-export core types for convenience
pub use error::{VoronoiError, Result};
pub use config::{GeneratorConfig, GeneratorConfigBuilder};
pub use cell::VoronoiCell;
pub use tessellation::Tessellation;
pub use validation::{check_closure, ClosureReport, ClosureViolation};
pub use mesh::{MeshData, generate_mesh, write_obj};
pub use generation::{LloydOptions, relax};
pub use sweep::{SweepDirection, SweepStats};

#[cfg(feature = "spatial-index")]
pub use spatial::SpatialIndex;

// Re-export glam::DVec3 for convenience
pub use glam::DVec3;
