//! Beach line: the circular front of parabolic arcs
//!
//! Arcs form a circular doubly linked list ordered by increasing azimuth, with
//! `BEACH_DEPTH` sparse skip levels on top for logarithmic search. The anchor
//! arc is a member of every level and is where searches start.
//!
//! The boundary azimuth at the end of each arc depends on the sweep position,
//! so it is memoized together with the `(sweep polar, shift)` it was computed
//! for and refreshed lazily during searches.

use std::f64::consts::TAU;

use super::arbiter::SweepToken;
use super::arena::{Arena, SlotId};
use super::direction::Order;
use super::intersect::intersect_pair;
use super::levels::LevelSampler;
use super::site::{Site, SweepLine};

/// Number of skip levels above the base list
pub const BEACH_DEPTH: usize = 8;

/// One arc of the beach line
#[derive(Debug, Clone)]
pub struct ArcNode {
    /// Index of the arc's site in the sweep's site array
    pub site: u32,
    pub prev: SlotId,
    pub next: SlotId,
    skips: [Option<SlotId>; BEACH_DEPTH],
    prev_skips: [Option<SlotId>; BEACH_DEPTH],
    boundary: f64,
    boundary_key: Option<(f64, f64)>,
}

impl ArcNode {
    /// A detached arc for `site`
    pub fn new(site: u32) -> Self {
        Self {
            site,
            prev: SlotId::UNLINKED,
            next: SlotId::UNLINKED,
            skips: [None; BEACH_DEPTH],
            prev_skips: [None; BEACH_DEPTH],
            boundary: 0.0,
            boundary_key: None,
        }
    }

    /// Number of skip levels this arc is linked into
    pub fn level_count(&self) -> usize {
        self.skips.iter().take_while(|s| s.is_some()).count()
    }
}

/// Storage slots that carry an [`ArcNode`]
pub trait ArcSlot {
    fn arc(&self) -> &ArcNode;
    fn arc_mut(&mut self) -> &mut ArcNode;
}

impl ArcSlot for ArcNode {
    #[inline]
    fn arc(&self) -> &ArcNode {
        self
    }

    #[inline]
    fn arc_mut(&mut self) -> &mut ArcNode {
        self
    }
}

/// Circular skip structure over the active arcs of one sweep
#[derive(Debug, Clone)]
pub struct BeachLine {
    order: Order,
    anchor: Option<SlotId>,
    len: usize,
    levels: LevelSampler,
}

impl BeachLine {
    pub fn new(order: Order, seed: u64) -> Self {
        Self {
            order,
            anchor: None,
            len: 0,
            levels: LevelSampler::new(BEACH_DEPTH, seed),
        }
    }

    #[inline]
    pub fn len(&self) -> usize {
        self.len
    }

    #[inline]
    pub fn is_empty(&self) -> bool {
        self.len == 0
    }

    #[inline]
    pub fn anchor(&self) -> Option<SlotId> {
        self.anchor
    }

    /// Start the beach line with a single arc
    pub fn insert_first<T: ArcSlot>(
        &mut self,
        arena: &mut Arena<T>,
        sites: &[Site],
        token: &SweepToken<'_>,
        id: SlotId,
    ) {
        let arc = arena[id].arc_mut();
        arc.prev = id;
        arc.next = id;
        arc.skips = [Some(id); BEACH_DEPTH];
        arc.prev_skips = [Some(id); BEACH_DEPTH];
        arc.boundary_key = None;
        let cell = sites[arc.site as usize].cell;

        self.anchor = Some(id);
        self.len = 1;
        token.increment_arcs(cell);
    }

    /// Add the second arc directly after the anchor
    pub fn insert_second<T: ArcSlot>(
        &mut self,
        arena: &mut Arena<T>,
        sites: &[Site],
        token: &SweepToken<'_>,
        id: SlotId,
    ) {
        let Some(anchor) = self.anchor else {
            self.insert_first(arena, sites, token, id);
            return;
        };

        self.link_after(arena, id, anchor);
        token.increment_arcs(sites[arena[id].arc().site as usize].cell);

        let mut preds = [anchor; BEACH_DEPTH];
        self.add_skips(arena, id, &mut preds);
    }

    /// Split the arc above the site of `id` and insert `id` into it
    ///
    /// `split_half` receives the split arc's site and is placed right after
    /// `id`, so the new arc ends up between the two halves.
    pub fn find_and_insert<T: ArcSlot>(
        &mut self,
        arena: &mut Arena<T>,
        sites: &[Site],
        token: &SweepToken<'_>,
        id: SlotId,
        split_half: SlotId,
        sweep_polar: f64,
    ) {
        let Some(anchor) = self.anchor else {
            self.insert_first(arena, sites, token, id);
            return;
        };

        // In the shifted frame the new site sits at azimuth 0, so the arc
        // ending last before wrapping around is the one left of the site.
        let shift = TAU - sites[arena[id].arc().site as usize].azimuth;
        let sweep = SweepLine::new(sweep_polar);

        let mut curr = anchor;
        let mut preds = [anchor; BEACH_DEPTH];
        for level in (0..BEACH_DEPTH).rev() {
            loop {
                let next = arena[curr].arc().skips[level].unwrap_or(curr);
                if next == curr || !self.end_is_greater(arena, sites, curr, next, &sweep, shift) {
                    break;
                }
                curr = next;
            }
            preds[level] = curr;
        }

        loop {
            let next = arena[curr].arc().next;
            if next == curr || !self.end_is_greater(arena, sites, curr, next, &sweep, shift) {
                break;
            }
            curr = next;
        }

        let split = arena[curr].arc().next;
        for (level, pred) in preds.iter_mut().enumerate() {
            if arena[*pred].arc().skips[level] == Some(split) {
                *pred = split;
            }
        }

        let split_site = arena[split].arc().site;
        arena[split_half].arc_mut().site = split_site;

        self.link_after(arena, id, split);
        self.link_after(arena, split_half, id);
        token.increment_arcs(sites[arena[id].arc().site as usize].cell);
        token.increment_arcs(sites[split_site as usize].cell);

        self.add_skips(arena, id, &mut preds);
        self.add_skips(arena, split_half, &mut preds);
    }

    /// Remove an arc from the base list and every skip level
    pub fn erase<T: ArcSlot>(
        &mut self,
        arena: &mut Arena<T>,
        sites: &[Site],
        token: &SweepToken<'_>,
        id: SlotId,
    ) {
        let Some(anchor) = self.anchor else {
            return;
        };
        let cell = sites[arena[id].arc().site as usize].cell;

        if self.len == 1 {
            self.anchor = None;
            self.len = 0;
            let arc = arena[id].arc_mut();
            arc.skips = [None; BEACH_DEPTH];
            arc.prev_skips = [None; BEACH_DEPTH];
            token.decrement_arcs(cell);
            return;
        }

        if anchor == id {
            self.move_anchor(arena, id);
        }

        self.unlink_skips(arena, id);

        let (prev, next) = {
            let arc = arena[id].arc();
            (arc.prev, arc.next)
        };
        let prev_arc = arena[prev].arc_mut();
        prev_arc.next = next;
        prev_arc.boundary_key = None;
        arena[next].arc_mut().prev = prev;

        let arc = arena[id].arc_mut();
        arc.prev = SlotId::UNLINKED;
        arc.next = SlotId::UNLINKED;
        arc.boundary_key = None;

        self.len -= 1;
        token.decrement_arcs(cell);
    }

    /// Arcs in azimuth order, starting at the anchor
    pub fn iter<'a, T: ArcSlot>(&self, arena: &'a Arena<T>) -> impl Iterator<Item = SlotId> + 'a {
        std::iter::successors(self.anchor, move |&id| Some(arena[id].arc().next)).take(self.len)
    }

    /// Walk the whole structure and return the arc count if it is consistent
    ///
    /// Checks the prev/next pairing of the base list and that every skip
    /// level is a circular, back-linked subsequence of it that contains the
    /// anchor.
    pub fn audit<T: ArcSlot>(&self, arena: &Arena<T>) -> Option<usize> {
        let Some(anchor) = self.anchor else {
            return (self.len == 0).then_some(0);
        };

        let mut position = vec![usize::MAX; arena.len()];
        let mut count = 0;
        let mut curr = anchor;
        loop {
            if count >= self.len || position[curr.index()] != usize::MAX {
                return None;
            }
            position[curr.index()] = count;
            count += 1;

            let next = arena[curr].arc().next;
            if arena[next].arc().prev != curr {
                return None;
            }
            curr = next;
            if curr == anchor {
                break;
            }
        }
        if count != self.len {
            return None;
        }

        for level in 0..BEACH_DEPTH {
            let mut curr = anchor;
            let mut last_position = 0;
            loop {
                let next = arena[curr].arc().skips[level]?;
                if arena[next].arc().prev_skips[level] != Some(curr) {
                    return None;
                }
                if next == anchor {
                    break;
                }
                let next_position = position[next.index()];
                if next_position == usize::MAX || next_position <= last_position {
                    return None;
                }
                last_position = next_position;
                curr = next;
            }
        }

        Some(count)
    }

    /// Whether the boundary at the end of `next` lies farther than the one
    /// at the end of `curr`, refreshing both in one batched evaluation
    fn end_is_greater<T: ArcSlot>(
        &self,
        arena: &mut Arena<T>,
        sites: &[Site],
        curr: SlotId,
        next: SlotId,
        sweep: &SweepLine,
        shift: f64,
    ) -> bool {
        let key = Some((sweep.polar, shift));
        if arena[curr].arc().boundary_key != key || arena[next].arc().boundary_key != key {
            let [curr_end, next_end] = self.boundaries(arena, sites, curr, next, sweep, shift);
            let arc = arena[curr].arc_mut();
            arc.boundary = curr_end;
            arc.boundary_key = key;
            let arc = arena[next].arc_mut();
            arc.boundary = next_end;
            arc.boundary_key = key;
        }
        arena[next].arc().boundary > arena[curr].arc().boundary
    }

    /// End boundaries of two arcs against their base-list successors
    fn boundaries<T: ArcSlot>(
        &self,
        arena: &Arena<T>,
        sites: &[Site],
        first: SlotId,
        second: SlotId,
        sweep: &SweepLine,
        shift: f64,
    ) -> [f64; 2] {
        let site_of = |id: SlotId| &sites[arena[id].arc().site as usize];
        let first_next = arena[first].arc().next;
        let second_next = arena[second].arc().next;

        match self.order {
            Order::Increasing => intersect_pair(
                site_of(first),
                site_of(first_next),
                site_of(second),
                site_of(second_next),
                sweep,
                shift,
            ),
            Order::Decreasing => intersect_pair(
                site_of(first_next),
                site_of(first),
                site_of(second_next),
                site_of(second),
                sweep,
                shift,
            ),
        }
    }

    fn link_after<T: ArcSlot>(&mut self, arena: &mut Arena<T>, id: SlotId, at: SlotId) {
        let next = arena[at].arc().next;

        let arc = arena[id].arc_mut();
        arc.prev = at;
        arc.next = next;
        arc.boundary_key = None;

        let at_arc = arena[at].arc_mut();
        at_arc.next = id;
        at_arc.boundary_key = None;
        arena[next].arc_mut().prev = id;

        self.len += 1;
    }

    /// Link `id` into a random number of levels after `preds`
    ///
    /// `preds[level]` is advanced to `id` for every level it joins, so a
    /// second arc inserted right after it links in behind it.
    fn add_skips<T: ArcSlot>(
        &mut self,
        arena: &mut Arena<T>,
        id: SlotId,
        preds: &mut [SlotId; BEACH_DEPTH],
    ) {
        let count = self.levels.sample();
        for (level, pred) in preds.iter_mut().enumerate().take(count) {
            let Some(succ) = arena[*pred].arc().skips[level] else {
                break;
            };
            let arc = arena[id].arc_mut();
            arc.skips[level] = Some(succ);
            arc.prev_skips[level] = Some(*pred);
            arena[succ].arc_mut().prev_skips[level] = Some(id);
            arena[*pred].arc_mut().skips[level] = Some(id);
            *pred = id;
        }
    }

    fn unlink_skips<T: ArcSlot>(&mut self, arena: &mut Arena<T>, id: SlotId) {
        for level in 0..BEACH_DEPTH {
            let arc = arena[id].arc();
            let (Some(succ), Some(pred)) = (arc.skips[level], arc.prev_skips[level]) else {
                break;
            };
            arena[succ].arc_mut().prev_skips[level] = Some(pred);
            arena[pred].arc_mut().skips[level] = Some(succ);

            let arc = arena[id].arc_mut();
            arc.skips[level] = None;
            arc.prev_skips[level] = None;
        }
    }

    /// Hand the anchor role to a surviving arc before `id` is removed
    fn move_anchor<T: ArcSlot>(&mut self, arena: &mut Arena<T>, id: SlotId) {
        if let Some(top) = arena[id].arc().skips[BEACH_DEPTH - 1] {
            if top != id {
                self.anchor = Some(top);
                return;
            }
        }

        // No other arc reaches the top level: the successor inherits every
        // level it is missing, right behind the old anchor.
        let next = arena[id].arc().next;
        for level in 0..BEACH_DEPTH {
            if arena[next].arc().skips[level].is_some() {
                continue;
            }
            let Some(succ) = arena[id].arc().skips[level] else {
                continue;
            };
            let next_arc = arena[next].arc_mut();
            next_arc.skips[level] = Some(succ);
            next_arc.prev_skips[level] = Some(id);
            arena[succ].arc_mut().prev_skips[level] = Some(next);
            arena[id].arc_mut().skips[level] = Some(next);
        }
        self.anchor = Some(next);
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::sweep::arbiter::CellArray;
    use crate::sweep::direction::{Axis, SweepDirection};
    use glam::DVec3;
    use rand::{Rng, SeedableRng};
    use rand_chacha::ChaCha8Rng;

    fn polar_site(polar_deg: f64, azimuth_deg: f64, cell: u32) -> Site {
        let (polar, azimuth) = (polar_deg.to_radians(), azimuth_deg.to_radians());
        let p = DVec3::new(
            polar.sin() * azimuth.cos(),
            polar.sin() * azimuth.sin(),
            polar.cos(),
        );
        Site::new(p, cell, Axis::Z)
    }

    fn site_sequence(beach: &BeachLine, arena: &Arena<ArcNode>) -> Vec<u32> {
        beach.iter(arena).map(|id| arena[id].site).collect()
    }

    #[test]
    fn test_split_insert_increasing() {
        let sites = vec![
            polar_site(60.0, 0.0, 0),
            polar_site(60.0, 180.0, 1),
            polar_site(80.0, 45.0, 2),
        ];
        let cells = CellArray::new(3);
        let token = cells.token(SweepDirection::ALL[4]).unwrap();
        let mut arena = Arena::with_capacity(6);
        let mut beach = BeachLine::new(Order::Increasing, 1);

        let a = arena.alloc(ArcNode::new(0));
        beach.insert_first(&mut arena, &sites, &token, a);
        let b = arena.alloc(ArcNode::new(1));
        beach.insert_second(&mut arena, &sites, &token, b);

        let c = arena.alloc(ArcNode::new(2));
        let half = arena.alloc(ArcNode::new(2));
        beach.find_and_insert(&mut arena, &sites, &token, c, half, sites[2].polar);

        assert_eq!(site_sequence(&beach, &arena), vec![0, 2, 0, 1]);
        assert_eq!(arena[c].prev, a);
        assert_eq!(arena[c].next, half);
        assert_eq!(beach.audit(&arena), Some(4));

        beach.erase(&mut arena, &sites, &token, c);
        assert_eq!(site_sequence(&beach, &arena), vec![0, 0, 1]);
        assert_eq!(beach.audit(&arena), Some(3));
        assert_eq!(cells.completed(), 1);

        drop(token);
        let records = cells.into_cells();
        assert_eq!(records[0].open_arcs, 2);
        assert_eq!(records[1].open_arcs, 1);
        assert_eq!(records[2].open_arcs, 0);
    }

    #[test]
    fn test_split_insert_decreasing() {
        let sites = vec![
            polar_site(100.0, 45.0, 2),
            polar_site(120.0, 0.0, 0),
            polar_site(120.0, 180.0, 1),
        ];
        let cells = CellArray::new(3);
        let token = cells.token(SweepDirection::ALL[5]).unwrap();
        let mut arena = Arena::with_capacity(6);
        let mut beach = BeachLine::new(Order::Decreasing, 2);

        let a = arena.alloc(ArcNode::new(1));
        beach.insert_first(&mut arena, &sites, &token, a);
        let b = arena.alloc(ArcNode::new(2));
        beach.insert_second(&mut arena, &sites, &token, b);

        let c = arena.alloc(ArcNode::new(0));
        let half = arena.alloc(ArcNode::new(0));
        beach.find_and_insert(&mut arena, &sites, &token, c, half, sites[0].polar);

        assert_eq!(site_sequence(&beach, &arena), vec![1, 0, 1, 2]);
        assert_eq!(arena[half].site, 1);
        assert_eq!(beach.audit(&arena), Some(4));
    }

    #[test]
    fn test_erase_anchor_keeps_structure() {
        let sites = vec![
            polar_site(60.0, 0.0, 0),
            polar_site(60.0, 180.0, 1),
            polar_site(80.0, 45.0, 2),
        ];
        let cells = CellArray::new(3);
        let token = cells.token(SweepDirection::ALL[4]).unwrap();
        let mut arena = Arena::with_capacity(6);
        let mut beach = BeachLine::new(Order::Increasing, 3);

        let a = arena.alloc(ArcNode::new(0));
        beach.insert_first(&mut arena, &sites, &token, a);
        let b = arena.alloc(ArcNode::new(1));
        beach.insert_second(&mut arena, &sites, &token, b);
        let c = arena.alloc(ArcNode::new(2));
        let half = arena.alloc(ArcNode::new(2));
        beach.find_and_insert(&mut arena, &sites, &token, c, half, sites[2].polar);

        beach.erase(&mut arena, &sites, &token, a);
        assert_ne!(beach.anchor(), Some(a));
        assert_eq!(beach.audit(&arena), Some(3));

        let anchor = beach.anchor().unwrap();
        assert_eq!(arena[anchor].level_count(), BEACH_DEPTH);
    }

    #[test]
    fn test_random_inserts_and_erases_stay_consistent() {
        let mut rng = ChaCha8Rng::seed_from_u64(5);
        let mut sites: Vec<Site> = (0..300)
            .map(|i| {
                let z: f64 = rng.gen_range(-1.0..1.0);
                let phi: f64 = rng.gen_range(0.0..TAU);
                let r = (1.0 - z * z).sqrt();
                Site::new(DVec3::new(r * phi.cos(), r * phi.sin(), z), i, Axis::Z)
            })
            .collect();
        sites.sort_by(|a, b| a.polar.total_cmp(&b.polar));

        let cells = CellArray::new(sites.len());
        let token = cells.token(SweepDirection::ALL[4]).unwrap();
        let mut arena = Arena::with_capacity(2 * sites.len());
        let mut beach = BeachLine::new(Order::Increasing, 9);

        let first = arena.alloc(ArcNode::new(0));
        beach.insert_first(&mut arena, &sites, &token, first);
        let second = arena.alloc(ArcNode::new(1));
        beach.insert_second(&mut arena, &sites, &token, second);

        for i in 2..sites.len() as u32 {
            let id = arena.alloc(ArcNode::new(i));
            let half = arena.alloc(ArcNode::new(i));
            beach.find_and_insert(&mut arena, &sites, &token, id, half, sites[i as usize].polar);

            // The new arc sits between two halves of the same site.
            assert_eq!(arena[arena[id].prev].site, arena[half].site);
            assert_eq!(beach.audit(&arena), Some(beach.len()));
        }

        while beach.len() > 2 {
            let live: Vec<SlotId> = beach.iter(&arena).collect();
            let victim = live[rng.gen_range(0..live.len())];
            beach.erase(&mut arena, &sites, &token, victim);
            assert_eq!(beach.audit(&arena), Some(beach.len()));
        }
    }
}
