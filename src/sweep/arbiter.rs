//! Lock-free cell arbitration between concurrent sweeps
//!
//! All six sweeps write into one array of cells. The first sweep to touch a
//! cell becomes its only writer: every later mutation attempt by another
//! sweep is dropped without blocking or retrying. A cell is complete once its
//! owner has removed every arc that referenced it, and each completion bumps
//! a shared counter the sweeps use to stop early.

use std::cell::UnsafeCell;
use std::marker::PhantomData;
use std::sync::atomic::{AtomicU8, AtomicUsize, Ordering};

use glam::DVec3;

use super::direction::SweepDirection;

#[derive(Debug, Default)]
struct CellState {
    arcs: u32,
    corners: Vec<DVec3>,
}

/// One cell as shared between the sweeps
#[derive(Debug, Default)]
pub struct SharedCell {
    owner: AtomicU8,
    state: UnsafeCell<CellState>,
}

// SAFETY: `state` is only accessed through a `SweepToken` whose bit won the
// claim on `owner`. Each bit is issued to at most one token per `CellArray`
// and tokens are `!Sync`, so at most one thread mutates a given cell. Reads
// of `state` happen after every token is gone (`CellArray::into_cells`).
unsafe impl Sync for SharedCell {}

impl SharedCell {
    /// Try to become (or confirm being) the owner of this cell
    ///
    /// Succeeds when the mask was empty or already contained `bit`. On
    /// failure the bit is cleared again and the caller must drop its mutation.
    #[inline]
    fn claim(&self, bit: u8) -> bool {
        let prev = self.owner.fetch_or(bit, Ordering::AcqRel);
        if prev & bit != 0 || prev == 0 {
            true
        } else {
            self.owner.fetch_and(!bit, Ordering::AcqRel);
            false
        }
    }

    /// Current ownership mask
    #[inline]
    pub fn owner_mask(&self) -> u8 {
        self.owner.load(Ordering::Acquire)
    }
}

/// Final state of a cell once all sweeps have joined
#[derive(Debug, Clone, PartialEq)]
pub struct CellRecord {
    /// Ownership mask (a single sweep bit, or 0 if no sweep touched the cell)
    pub owner: u8,
    /// Arcs still on the owner's beach line when it stopped
    pub open_arcs: u32,
    /// Corners in the order they were found
    pub corners: Vec<DVec3>,
}

/// The shared result array plus the completion counter
#[derive(Debug)]
pub struct CellArray {
    cells: Vec<SharedCell>,
    completed: AtomicUsize,
    issued: AtomicU8,
}

impl CellArray {
    pub fn new(len: usize) -> Self {
        Self {
            cells: (0..len).map(|_| SharedCell::default()).collect(),
            completed: AtomicUsize::new(0),
            issued: AtomicU8::new(0),
        }
    }

    #[inline]
    pub fn len(&self) -> usize {
        self.cells.len()
    }

    #[inline]
    pub fn is_empty(&self) -> bool {
        self.cells.is_empty()
    }

    /// Cells whose owner has removed every arc referencing them
    #[inline]
    pub fn completed(&self) -> usize {
        self.completed.load(Ordering::Acquire)
    }

    #[inline]
    pub fn owner_mask(&self, cell: u32) -> u8 {
        self.cells[cell as usize].owner_mask()
    }

    /// Hand out the write token of one sweep direction
    ///
    /// Returns `None` if that direction's token was already issued.
    pub fn token(&self, direction: SweepDirection) -> Option<SweepToken<'_>> {
        let bit = direction.bit();
        let prev = self.issued.fetch_or(bit, Ordering::AcqRel);
        if prev & bit != 0 {
            return None;
        }
        Some(SweepToken {
            cells: self,
            bit,
            _not_sync: PhantomData,
        })
    }

    /// Tear down the array after all sweeps have finished
    pub fn into_cells(self) -> Vec<CellRecord> {
        self.cells
            .into_iter()
            .map(|cell| {
                let owner = cell.owner.into_inner();
                let state = cell.state.into_inner();
                CellRecord {
                    owner,
                    open_arcs: state.arcs,
                    corners: state.corners,
                }
            })
            .collect()
    }
}

/// Write access of one sweep to a [`CellArray`]
///
/// Every mutation goes through the claim protocol and reports whether it was
/// applied. The token can move to the sweep's thread but cannot be shared.
#[derive(Debug)]
pub struct SweepToken<'a> {
    cells: &'a CellArray,
    bit: u8,
    _not_sync: PhantomData<std::cell::Cell<()>>,
}

impl<'a> SweepToken<'a> {
    #[inline]
    pub fn bit(&self) -> u8 {
        self.bit
    }

    /// The array this token writes to
    #[inline]
    pub fn cells(&self) -> &'a CellArray {
        self.cells
    }

    /// Claim `cell` without mutating it
    #[inline]
    pub fn claim(&self, cell: u32) -> bool {
        self.cells.cells[cell as usize].claim(self.bit)
    }

    #[inline]
    fn mutate(&self, cell: u32, f: impl FnOnce(&mut CellState)) -> bool {
        let shared = &self.cells.cells[cell as usize];
        if !shared.claim(self.bit) {
            return false;
        }
        // SAFETY: the claim succeeded, so this token's bit owns the cell and
        // no other thread holds a token with that bit (see `SharedCell`).
        let state = unsafe { &mut *shared.state.get() };
        f(state);
        true
    }

    /// Record a Voronoi vertex on `cell`
    #[inline]
    pub fn add_corner(&self, cell: u32, corner: DVec3) -> bool {
        self.mutate(cell, |state| state.corners.push(corner))
    }

    /// Count a new arc referencing `cell`
    #[inline]
    pub fn increment_arcs(&self, cell: u32) -> bool {
        self.mutate(cell, |state| state.arcs += 1)
    }

    /// Count a removed arc; the last one completes the cell
    #[inline]
    pub fn decrement_arcs(&self, cell: u32) -> bool {
        let completed = &self.cells.completed;
        self.mutate(cell, |state| {
            debug_assert!(state.arcs > 0, "arc count underflow on cell {}", cell);
            state.arcs = state.arcs.saturating_sub(1);
            if state.arcs == 0 {
                completed.fetch_add(1, Ordering::AcqRel);
            }
        })
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::sync::Barrier;

    #[test]
    fn test_first_claim_wins() {
        let cells = CellArray::new(2);
        let ix = cells.token(SweepDirection::ALL[0]).unwrap();
        let dx = cells.token(SweepDirection::ALL[1]).unwrap();

        assert!(ix.add_corner(0, DVec3::X));
        assert!(!dx.add_corner(0, DVec3::Y));
        assert!(dx.add_corner(1, DVec3::Z));
        assert_eq!(cells.owner_mask(0), ix.bit());
        assert_eq!(cells.owner_mask(1), dx.bit());

        drop((ix, dx));
        let records = cells.into_cells();
        assert_eq!(records[0].corners, vec![DVec3::X]);
        assert_eq!(records[1].corners, vec![DVec3::Z]);
    }

    #[test]
    fn test_owner_claims_are_idempotent() {
        let cells = CellArray::new(1);
        let iy = cells.token(SweepDirection::ALL[2]).unwrap();
        let dz = cells.token(SweepDirection::ALL[5]).unwrap();

        for _ in 0..100 {
            assert!(iy.claim(0));
            assert!(!dz.claim(0));
        }
        assert_eq!(cells.owner_mask(0), iy.bit());
    }

    #[test]
    fn test_tokens_are_issued_once() {
        let cells = CellArray::new(1);
        let first = cells.token(SweepDirection::ALL[4]);
        assert!(first.is_some());
        assert!(cells.token(SweepDirection::ALL[4]).is_none());
        assert!(cells.token(SweepDirection::ALL[3]).is_some());
    }

    #[test]
    fn test_completion_counter() {
        let cells = CellArray::new(2);
        let token = cells.token(SweepDirection::ALL[0]).unwrap();

        token.increment_arcs(0);
        token.increment_arcs(0);
        token.increment_arcs(1);
        assert_eq!(cells.completed(), 0);

        token.decrement_arcs(0);
        assert_eq!(cells.completed(), 0);
        token.decrement_arcs(0);
        assert_eq!(cells.completed(), 1);
        token.decrement_arcs(1);
        assert_eq!(cells.completed(), 2);

        drop(token);
        let records = cells.into_cells();
        assert!(records.iter().all(|r| r.open_arcs == 0));
    }

    #[test]
    fn test_lost_race_does_not_complete() {
        let cells = CellArray::new(1);
        let owner = cells.token(SweepDirection::ALL[0]).unwrap();
        let other = cells.token(SweepDirection::ALL[1]).unwrap();

        owner.increment_arcs(0);
        assert!(!other.increment_arcs(0));
        assert!(!other.decrement_arcs(0));
        assert_eq!(cells.completed(), 0);
    }

    #[test]
    fn test_concurrent_claims_pick_one_owner() {
        let cells = CellArray::new(256);
        let barrier = Barrier::new(SweepDirection::ALL.len());

        std::thread::scope(|scope| {
            for direction in SweepDirection::ALL {
                let token = cells.token(direction).unwrap();
                let barrier = &barrier;
                scope.spawn(move || {
                    barrier.wait();
                    for cell in 0..256 {
                        token.add_corner(cell, DVec3::splat(direction.index() as f64));
                    }
                });
            }
        });

        for record in cells.into_cells() {
            assert_eq!(record.owner.count_ones(), 1);
            let winner = SweepDirection::from_bit(record.owner).unwrap();
            assert_eq!(record.corners, vec![DVec3::splat(winner.index() as f64)]);
        }
    }
}
