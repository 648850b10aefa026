//! Circle event priority queue
//!
//! A head-based skip list over arena slots. Each slot carries at most one
//! event, and the slot id doubles as the event's handle, so an arc's pending
//! event can be removed in O(1) without searching.

use std::f64::consts::TAU;

use glam::DVec3;

use super::arena::{Arena, SlotId};
use super::direction::Order;
use super::levels::LevelSampler;

/// Number of skip levels above the base list
pub const QUEUE_DEPTH: usize = 8;

/// A candidate Voronoi vertex
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct CircleEvent {
    /// Polar angle of the circumcenter
    pub polar: f64,
    /// Angular radius of the circumcircle
    pub polar_small: f64,
    /// The vertex on the unit sphere
    pub center: DVec3,
}

impl Default for CircleEvent {
    fn default() -> Self {
        Self {
            polar: 0.0,
            polar_small: 0.0,
            center: DVec3::ZERO,
        }
    }
}

/// Queue links and payload stored in an arena slot
#[derive(Debug, Clone, Default)]
pub struct EventNode {
    pub event: CircleEvent,
    queued: bool,
    prev: Option<SlotId>,
    next: Option<SlotId>,
    skips: [Option<SlotId>; QUEUE_DEPTH],
    prev_skips: [Option<SlotId>; QUEUE_DEPTH],
}

impl EventNode {
    pub fn new(event: CircleEvent) -> Self {
        Self {
            event,
            ..Default::default()
        }
    }

    /// Whether this node is currently in a queue
    #[inline]
    pub fn is_queued(&self) -> bool {
        self.queued
    }

    fn clear_links(&mut self) {
        self.queued = false;
        self.prev = None;
        self.next = None;
        self.skips = [None; QUEUE_DEPTH];
        self.prev_skips = [None; QUEUE_DEPTH];
    }
}

/// Storage slots that carry an [`EventNode`]
pub trait EventSlot {
    fn event_node(&self) -> &EventNode;
    fn event_node_mut(&mut self) -> &mut EventNode;
}

impl EventSlot for EventNode {
    #[inline]
    fn event_node(&self) -> &EventNode {
        self
    }

    #[inline]
    fn event_node_mut(&mut self) -> &mut EventNode {
        self
    }
}

/// Skip-list priority queue of circle events
#[derive(Debug, Clone)]
pub struct EventQueue {
    order: Order,
    head: Option<SlotId>,
    len: usize,
    levels: LevelSampler,
}

impl EventQueue {
    pub fn new(order: Order, seed: u64) -> Self {
        Self {
            order,
            head: None,
            len: 0,
            levels: LevelSampler::new(QUEUE_DEPTH, seed),
        }
    }

    #[inline]
    pub fn len(&self) -> usize {
        self.len
    }

    #[inline]
    pub fn is_empty(&self) -> bool {
        self.head.is_none()
    }

    /// The next event in sweep order
    #[inline]
    pub fn top(&self) -> Option<SlotId> {
        self.head
    }

    /// Queue the event stored in slot `id`
    pub fn push<T: EventSlot>(&mut self, arena: &mut Arena<T>, id: SlotId) {
        debug_assert!(!arena[id].event_node().queued, "{:?} is already queued", id);
        let event = arena[id].event_node().event;
        {
            let node = arena[id].event_node_mut();
            node.clear_links();
            node.queued = true;
        }
        self.len += 1;

        let Some(head) = self.head else {
            self.head = Some(id);
            return;
        };

        if self.order.is_after(&arena[head].event_node().event, &event) {
            // New front: take over the head's level links.
            for level in 0..QUEUE_DEPTH {
                let Some(succ) = arena[head].event_node().skips[level] else {
                    break;
                };
                arena[id].event_node_mut().skips[level] = Some(succ);
                arena[succ].event_node_mut().prev_skips[level] = Some(id);
                arena[head].event_node_mut().skips[level] = None;
            }
            arena[id].event_node_mut().next = Some(head);
            arena[head].event_node_mut().prev = Some(id);
            self.head = Some(id);
            return;
        }

        let mut curr = head;
        let mut preds = [head; QUEUE_DEPTH];
        for level in (0..QUEUE_DEPTH).rev() {
            while let Some(next) = arena[curr].event_node().skips[level] {
                if !self.order.is_after(&event, &arena[next].event_node().event) {
                    break;
                }
                curr = next;
            }
            preds[level] = curr;
        }
        while let Some(next) = arena[curr].event_node().next {
            if !self.order.is_after(&event, &arena[next].event_node().event) {
                break;
            }
            curr = next;
        }

        let next = arena[curr].event_node().next;
        {
            let node = arena[id].event_node_mut();
            node.prev = Some(curr);
            node.next = next;
        }
        if let Some(next) = next {
            arena[next].event_node_mut().prev = Some(id);
        }
        arena[curr].event_node_mut().next = Some(id);

        let count = self.levels.sample();
        for (level, &pred) in preds.iter().enumerate().take(count) {
            let succ = arena[pred].event_node().skips[level];
            {
                let node = arena[id].event_node_mut();
                node.skips[level] = succ;
                node.prev_skips[level] = Some(pred);
            }
            if let Some(succ) = succ {
                arena[succ].event_node_mut().prev_skips[level] = Some(id);
            }
            arena[pred].event_node_mut().skips[level] = Some(id);
        }
    }

    /// Remove and return the next event's slot
    pub fn pop<T: EventSlot>(&mut self, arena: &mut Arena<T>) -> Option<SlotId> {
        let head = self.head?;
        self.len -= 1;

        match arena[head].event_node().next {
            Some(next) => {
                for level in 0..QUEUE_DEPTH {
                    let Some(succ) = arena[head].event_node().skips[level] else {
                        break;
                    };
                    if succ != next {
                        arena[next].event_node_mut().skips[level] = Some(succ);
                        arena[succ].event_node_mut().prev_skips[level] = Some(next);
                    }
                    arena[next].event_node_mut().prev_skips[level] = None;
                }
                arena[next].event_node_mut().prev = None;
                self.head = Some(next);
            }
            None => self.head = None,
        }

        arena[head].event_node_mut().clear_links();
        Some(head)
    }

    /// Remove the event in slot `id`; does nothing if it is not queued
    pub fn erase<T: EventSlot>(&mut self, arena: &mut Arena<T>, id: SlotId) {
        if !arena[id].event_node().queued {
            return;
        }
        if self.head == Some(id) {
            self.pop(arena);
            return;
        }

        let (prev, next) = {
            let node = arena[id].event_node();
            (node.prev, node.next)
        };
        if let Some(prev) = prev {
            arena[prev].event_node_mut().next = next;
        }
        if let Some(next) = next {
            arena[next].event_node_mut().prev = prev;
        }

        for level in 0..QUEUE_DEPTH {
            let (succ, pred) = {
                let node = arena[id].event_node();
                (node.skips[level], node.prev_skips[level])
            };
            if succ.is_none() && pred.is_none() {
                break;
            }
            if let Some(succ) = succ {
                arena[succ].event_node_mut().prev_skips[level] = pred;
            }
            if let Some(pred) = pred {
                arena[pred].event_node_mut().skips[level] = succ;
            }
        }

        arena[id].event_node_mut().clear_links();
        self.len -= 1;
    }

    /// Queued slots in sweep order
    pub fn iter<'a, T: EventSlot>(&self, arena: &'a Arena<T>) -> impl Iterator<Item = SlotId> + 'a {
        std::iter::successors(self.head, move |&id| arena[id].event_node().next)
    }

    /// Count nodes by traversal, verifying links and ordering on the way
    ///
    /// Returns `None` if any level is out of order or inconsistently linked.
    pub fn audit<T: EventSlot>(&self, arena: &Arena<T>) -> Option<usize> {
        let Some(head) = self.head else {
            return (self.len == 0).then_some(0);
        };
        if arena[head].event_node().prev.is_some() {
            return None;
        }

        let mut count = 1;
        let mut curr = head;
        while let Some(next) = arena[curr].event_node().next {
            let node = arena[next].event_node();
            if !node.queued || node.prev != Some(curr) || count > self.len {
                return None;
            }
            if self.order.is_after(&arena[curr].event_node().event, &node.event) {
                return None;
            }
            count += 1;
            curr = next;
        }

        for level in 0..QUEUE_DEPTH {
            let mut curr = head;
            let mut steps = 0;
            while let Some(next) = arena[curr].event_node().skips[level] {
                let node = arena[next].event_node();
                if node.prev_skips[level] != Some(curr) {
                    return None;
                }
                if self.order.is_after(&arena[curr].event_node().event, &node.event) {
                    return None;
                }
                steps += 1;
                if steps > count {
                    return None;
                }
                curr = next;
            }
        }

        (count == self.len).then_some(count)
    }
}

/// Event queue split into contiguous angular buckets
///
/// Pushes and erasures are routed by the event's position on `[0, 2π]`;
/// `top` and `pop` scan the buckets in sweep order, so the global order is
/// the same as for a single queue.
#[derive(Debug, Clone)]
pub struct BucketQueue {
    order: Order,
    buckets: Vec<EventQueue>,
}

impl BucketQueue {
    pub fn new(order: Order, bucket_count: usize, seed: u64) -> Self {
        let bucket_count = bucket_count.max(1);
        Self {
            order,
            buckets: (0..bucket_count)
                .map(|i| EventQueue::new(order, seed.wrapping_add(i as u64)))
                .collect(),
        }
    }

    pub fn bucket_count(&self) -> usize {
        self.buckets.len()
    }

    pub fn len(&self) -> usize {
        self.buckets.iter().map(EventQueue::len).sum()
    }

    pub fn is_empty(&self) -> bool {
        self.buckets.iter().all(EventQueue::is_empty)
    }

    fn bucket_of(&self, event: &CircleEvent) -> usize {
        let key = self.order.bucket_key(event);
        let count = self.buckets.len();
        let index = (count as f64 * key / TAU).floor();
        if index <= 0.0 {
            0
        } else {
            (index as usize).min(count - 1)
        }
    }

    fn first_nonempty(&self) -> Option<usize> {
        match self.order {
            Order::Increasing => self.buckets.iter().position(|b| !b.is_empty()),
            Order::Decreasing => self.buckets.iter().rposition(|b| !b.is_empty()),
        }
    }

    pub fn push<T: EventSlot>(&mut self, arena: &mut Arena<T>, id: SlotId) {
        let bucket = self.bucket_of(&arena[id].event_node().event);
        self.buckets[bucket].push(arena, id);
    }

    pub fn top(&self) -> Option<SlotId> {
        self.first_nonempty().and_then(|b| self.buckets[b].top())
    }

    pub fn pop<T: EventSlot>(&mut self, arena: &mut Arena<T>) -> Option<SlotId> {
        let bucket = self.first_nonempty()?;
        self.buckets[bucket].pop(arena)
    }

    pub fn erase<T: EventSlot>(&mut self, arena: &mut Arena<T>, id: SlotId) {
        if !arena[id].event_node().queued {
            return;
        }
        let bucket = self.bucket_of(&arena[id].event_node().event);
        self.buckets[bucket].erase(arena, id);
    }

    /// Queued slots in sweep order across all buckets
    pub fn iter<'a, T: EventSlot>(&'a self, arena: &'a Arena<T>) -> impl Iterator<Item = SlotId> + 'a {
        let ordered: Vec<&EventQueue> = match self.order {
            Order::Increasing => self.buckets.iter().collect(),
            Order::Decreasing => self.buckets.iter().rev().collect(),
        };
        ordered.into_iter().flat_map(move |bucket| bucket.iter(arena))
    }

    pub fn audit<T: EventSlot>(&self, arena: &Arena<T>) -> Option<usize> {
        self.buckets.iter().map(|b| b.audit(arena)).sum()
    }
}
