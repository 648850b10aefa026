//! Spherical sweep-line engine
//!
//! Fortune's algorithm adapted to the unit sphere: a sweep circle moves from
//! one pole of an axis to the other, a beach line of spherical parabolic arcs
//! trails it, and circle events emit Voronoi vertices. Six such sweeps (both
//! directions along X, Y and Z) run concurrently and share their results
//! through [`arbiter::CellArray`].

pub mod arbiter;
pub mod arena;
pub mod beachline;
pub mod direction;
pub mod intersect;
mod levels;
pub mod queue;
pub mod site;
pub mod sweeper;

pub use arbiter::{CellArray, CellRecord, SweepToken};
pub use arena::{Arena, SlotId};
pub use beachline::{ArcNode, BeachLine, BEACH_DEPTH};
pub use direction::{Axis, Order, SweepDirection};
pub use intersect::{intersect, intersect_pair};
pub use queue::{BucketQueue, CircleEvent, EventQueue, QUEUE_DEPTH};
pub use site::{Site, SweepLine};
pub use sweeper::{SweepStats, Sweeper};
