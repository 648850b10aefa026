//! The per-direction event loop
//!
//! A `Sweeper` owns everything one sweep needs except the shared cell array:
//! its arena, beach line and event queue. It borrows the sorted site array
//! of its axis and writes results through its [`SweepToken`].

use std::time::{Duration, Instant};

use tracing::{debug, trace};

use super::arbiter::SweepToken;
use super::arena::{Arena, SlotId};
use super::beachline::{ArcNode, ArcSlot, BeachLine};
use super::direction::{Order, SweepDirection};
use super::queue::{BucketQueue, CircleEvent, EventNode, EventSlot};
use super::site::Site;

/// Arena slot pairing an arc with its (at most one) pending circle event
#[derive(Debug, Clone)]
pub struct Slot {
    pub arc: ArcNode,
    pub event: EventNode,
}

impl Slot {
    fn new(site: u32) -> Self {
        Self {
            arc: ArcNode::new(site),
            event: EventNode::default(),
        }
    }
}

impl ArcSlot for Slot {
    #[inline]
    fn arc(&self) -> &ArcNode {
        &self.arc
    }

    #[inline]
    fn arc_mut(&mut self) -> &mut ArcNode {
        &mut self.arc
    }
}

impl EventSlot for Slot {
    #[inline]
    fn event_node(&self) -> &EventNode {
        &self.event
    }

    #[inline]
    fn event_node_mut(&mut self) -> &mut EventNode {
        &mut self.event
    }
}

/// Counters reported by one finished sweep
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct SweepStats {
    pub direction: SweepDirection,
    pub site_events: usize,
    pub circle_events: usize,
    /// Corners this sweep managed to write (lost races are not counted)
    pub corners: usize,
    pub slots_used: usize,
    pub elapsed: Duration,
}

impl SweepStats {
    fn new(direction: SweepDirection) -> Self {
        Self {
            direction,
            site_events: 0,
            circle_events: 0,
            corners: 0,
            slots_used: 0,
            elapsed: Duration::ZERO,
        }
    }
}

/// Derive an independent RNG stream for one structure of one sweep
fn stream_seed(seed: u64, direction: SweepDirection, stream: u64) -> u64 {
    let mut z = seed
        .wrapping_add((direction.index() as u64 * 2 + stream).wrapping_mul(0x9E37_79B9_7F4A_7C15));
    z = (z ^ (z >> 30)).wrapping_mul(0xBF58_476D_1CE4_E5B9);
    z = (z ^ (z >> 27)).wrapping_mul(0x94D0_49BB_1331_11EB);
    z ^ (z >> 31)
}

/// One sweep over one axis in one direction
pub struct Sweeper<'a> {
    direction: SweepDirection,
    sites: &'a [Site],
    token: SweepToken<'a>,
    target: usize,
    arena: Arena<Slot>,
    beach: BeachLine,
    queue: BucketQueue,
    /// Sites consumed so far, in sweep order
    cursor: usize,
    sweep_polar: f64,
    sweep_small: f64,
    stats: SweepStats,
}

impl<'a> Sweeper<'a> {
    /// Prepare a sweep
    ///
    /// # Arguments
    ///
    /// * `direction` - Axis and order of the sweep; must match `token`
    /// * `sites` - The axis' sites sorted ascending by polar angle
    /// * `token` - Write access to the shared cell array
    /// * `target` - Stop once this many cells are complete across all sweeps
    /// * `buckets` - Number of event queue buckets
    /// * `seed` - Seed for the skip-level samplers
    pub fn new(
        direction: SweepDirection,
        sites: &'a [Site],
        token: SweepToken<'a>,
        target: usize,
        buckets: usize,
        seed: u64,
    ) -> Self {
        debug_assert_eq!(direction.bit(), token.bit());
        let order = direction.order;
        let start = match order {
            Order::Increasing => 0.0,
            Order::Decreasing => std::f64::consts::PI,
        };

        Self {
            direction,
            sites,
            token,
            target,
            arena: Arena::with_capacity(2 * sites.len()),
            beach: BeachLine::new(order, stream_seed(seed, direction, 0)),
            queue: BucketQueue::new(order, buckets, stream_seed(seed, direction, 1)),
            cursor: 0,
            sweep_polar: start,
            sweep_small: 0.0,
            stats: SweepStats::new(direction),
        }
    }

    /// Run the sweep to completion (or until the shared target is reached)
    pub fn run(mut self) -> SweepStats {
        let started = Instant::now();
        self.bootstrap();

        loop {
            if self.token.cells().completed() >= self.target {
                debug!(direction = %self.direction, "target reached, stopping sweep");
                break;
            }

            let next_site = self.next_site();
            let top = self.queue.top();
            match (next_site, top) {
                (None, None) => break,
                (Some(site), None) => self.site_event(site),
                (None, Some(_)) => self.circle_event(),
                (Some(site), Some(top)) => {
                    let polar = self.sites[site as usize].polar;
                    if self.direction.order.site_first(polar, &self.arena[top].event.event) {
                        self.site_event(site);
                    } else {
                        self.circle_event();
                    }
                }
            }
        }

        self.stats.slots_used = self.arena.len();
        self.stats.elapsed = started.elapsed();
        debug!(
            direction = %self.direction,
            site_events = self.stats.site_events,
            circle_events = self.stats.circle_events,
            corners = self.stats.corners,
            slots = self.stats.slots_used,
            open_arcs = self.beach.len(),
            elapsed_ms = self.stats.elapsed.as_secs_f64() * 1000.0,
            "sweep finished"
        );
        self.stats
    }

    /// Index into `sites` of the `k`-th site in sweep order
    #[inline]
    fn site_at(&self, k: usize) -> u32 {
        match self.direction.order {
            Order::Increasing => k as u32,
            Order::Decreasing => (self.sites.len() - 1 - k) as u32,
        }
    }

    #[inline]
    fn next_site(&self) -> Option<u32> {
        (self.cursor < self.sites.len()).then(|| self.site_at(self.cursor))
    }

    fn bootstrap(&mut self) {
        for k in 0..self.sites.len().min(2) {
            let site = self.site_at(k);
            let id = self.arena.alloc(Slot::new(site));
            if k == 0 {
                self.beach.insert_first(&mut self.arena, self.sites, &self.token, id);
            } else {
                self.beach.insert_second(&mut self.arena, self.sites, &self.token, id);
            }
            self.sweep_polar = self.sites[site as usize].polar;
            self.cursor += 1;
            self.stats.site_events += 1;
        }
    }

    fn site_event(&mut self, site: u32) {
        self.cursor += 1;
        self.stats.site_events += 1;
        self.sweep_polar = self.sites[site as usize].polar;
        self.sweep_small = 0.0;

        let id = self.arena.alloc(Slot::new(site));
        let half = self.arena.alloc(Slot::new(site));
        self.beach
            .find_and_insert(&mut self.arena, self.sites, &self.token, id, half, self.sweep_polar);

        let left = self.arena[id].arc.prev;
        self.queue.erase(&mut self.arena, left);
        self.add_event(left);
        self.add_event(half);
    }

    fn circle_event(&mut self) {
        let Some(mid) = self.queue.pop(&mut self.arena) else {
            return;
        };
        self.stats.circle_events += 1;

        let event = self.arena[mid].event.event;
        self.sweep_polar = event.polar;
        self.sweep_small = event.polar_small;

        let prev = self.arena[mid].arc.prev;
        let next = self.arena[mid].arc.next;
        for id in [prev, mid, next] {
            let cell = self.sites[self.arena[id].arc.site as usize].cell;
            if self.token.add_corner(cell, event.center) {
                self.stats.corners += 1;
            }
        }

        self.queue.erase(&mut self.arena, prev);
        self.queue.erase(&mut self.arena, next);
        self.beach.erase(&mut self.arena, self.sites, &self.token, mid);

        self.add_event(prev);
        self.add_event(next);
    }

    /// Queue the circle event of `mid` and its current neighbours, if any
    fn add_event(&mut self, mid: SlotId) {
        let prev = self.arena[mid].arc.prev;
        let next = self.arena[mid].arc.next;
        let prev_site = self.arena[prev].arc.site;
        let next_site = self.arena[next].arc.site;
        if prev_site == next_site {
            return;
        }

        let mid_pos = self.sites[self.arena[mid].arc.site as usize].position;
        let Some(center) = self.direction.order.circumcenter(
            self.sites[prev_site as usize].position,
            mid_pos,
            self.sites[next_site as usize].position,
        ) else {
            return;
        };

        let pole = self.direction.axis.pole();
        let polar = center.dot(pole).clamp(-1.0, 1.0).acos();
        let polar_small = center.dot(mid_pos).clamp(-1.0, 1.0).acos();
        if !self
            .direction
            .order
            .is_upcoming(polar, polar_small, self.sweep_polar, self.sweep_small)
        {
            trace!(direction = %self.direction, ?mid, "circle event behind the sweep front");
            return;
        }

        self.arena[mid].event.event = CircleEvent {
            polar,
            polar_small,
            center,
        };
        self.queue.push(&mut self.arena, mid);
    }
}
