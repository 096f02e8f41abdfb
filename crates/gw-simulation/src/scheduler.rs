// The event scheduler: a virtual clock plus a min-queue of time-stamped,
// entity-tagged actions.
//
// Ordering is `(due time, sequence)`, where `sequence` is a per-scheduler
// insertion counter. Equal due times therefore fire in the order they were
// scheduled, which keeps runs reproducible.
//
// Cancellation is lazy: `pending` holds the sequence numbers of every event
// that has neither fired nor been cancelled, per owning entity. Cancelling an
// entity drops its whole entry; heap entries whose sequence is no longer in
// `pending` are discarded when they reach the front, and the heap is
// compacted once stale entries dominate it.

use std::cmp::Ordering;
use std::collections::{BinaryHeap, HashMap, HashSet};

use gw_core::{Entity, EntityId, EventCanceller};
use tracing::{debug, trace};

use crate::action::Action;
use crate::clock::SimClock;
use crate::error::SimResult;

/// Heaps smaller than this are never compacted.
const COMPACT_MIN_LEN: usize = 64;

#[derive(Debug, Clone)]
struct QueuedEvent {
    time: f64,
    sequence: u64,
    // Cancellation key; usually but not necessarily `action.entity()`.
    owner: EntityId,
    action: Action,
}

// Min-heap on (time, sequence): reverse both comparisons for `BinaryHeap`.
impl PartialEq for QueuedEvent {
    fn eq(&self, other: &Self) -> bool {
        self.cmp(other) == Ordering::Equal
    }
}

impl Eq for QueuedEvent {}

impl PartialOrd for QueuedEvent {
    fn partial_cmp(&self, other: &Self) -> Option<Ordering> {
        Some(self.cmp(other))
    }
}

impl Ord for QueuedEvent {
    fn cmp(&self, other: &Self) -> Ordering {
        other
            .time
            .total_cmp(&self.time)
            .then_with(|| other.sequence.cmp(&self.sequence))
    }
}

/// Keeps track of scheduled events and drains them in due-time order.
#[derive(Debug, Default)]
pub struct EventScheduler {
    clock: SimClock,
    queue: BinaryHeap<QueuedEvent>,
    pending: HashMap<EntityId, HashSet<u64>>,
    pending_count: usize,
    next_sequence: u64,
}

impl EventScheduler {
    /// Create an empty scheduler at time zero.
    pub fn new() -> Self {
        Self::default()
    }

    /// The scheduler's clock.
    pub fn clock(&self) -> &SimClock {
        &self.clock
    }

    /// Current simulated time.
    pub fn now(&self) -> f64 {
        self.clock.now()
    }

    /// Schedule `action` for `entity`, due `delay` after the current time.
    ///
    /// `entity` owns the event: cancelling it drops the event, whichever
    /// entity the action itself names.
    ///
    /// A zero delay is legal: inside a drain the event fires in the same
    /// [`advance`](Self::advance) call.
    pub fn schedule_event(&mut self, entity: EntityId, action: Action, delay: f64) {
        debug_assert!(delay >= 0.0, "negative delay {delay} for {entity}");
        let time = self.clock.now() + delay;
        let sequence = self.next_sequence;
        self.next_sequence += 1;

        self.queue.push(QueuedEvent {
            time,
            sequence,
            owner: entity,
            action,
        });
        self.pending.entry(entity).or_default().insert(sequence);
        self.pending_count += 1;
        trace!(%entity, ?action, time, sequence, "event scheduled");
    }

    /// Cancel every pending event owned by `entity`. Idempotent.
    pub fn unschedule_all_events(&mut self, entity: EntityId) {
        let Some(cancelled) = self.pending.remove(&entity) else {
            return;
        };
        self.pending_count -= cancelled.len();
        debug!(%entity, count = cancelled.len(), "events cancelled");
        self.maybe_compact();
    }

    /// Arm the standard events of a freshly placed entity: an activity after
    /// its action period plus a perpetual animation for active kinds, the
    /// animation alone for obstacles, and nothing for static kinds.
    pub fn schedule_actions(&mut self, id: EntityId, entity: &Entity) {
        if entity.kind.has_activity() {
            self.schedule_event(id, Action::activity(id), entity.action_period);
        }
        if entity.kind.is_animated() {
            self.schedule_event(id, Action::animation(id, 0), entity.animation_period);
        }
    }

    /// Advance the clock by `duration`, executing every event due at or
    /// before the stop time.
    ///
    /// `fire` receives the scheduler back so it can schedule more events;
    /// the queue is re-examined after every event, so anything scheduled
    /// inside the window also fires in this call. The clock ends exactly at
    /// `now + duration`. The first error from `fire` stops the drain and is
    /// returned, leaving the clock at the failing event's due time.
    pub fn advance<F>(&mut self, duration: f64, mut fire: F) -> SimResult<()>
    where
        F: FnMut(&mut EventScheduler, Action) -> SimResult<()>,
    {
        let stop_time = self.clock.now() + duration;
        while let Some(action) = self.pop_due(stop_time) {
            self.clock.record_fire();
            fire(self, action)?;
        }
        self.clock.advance_to(stop_time);
        Ok(())
    }

    /// Pop the earliest live event due at or before `stop_time`, deregister
    /// it, and move the clock to its due time.
    fn pop_due(&mut self, stop_time: f64) -> Option<Action> {
        while let Some(head) = self.queue.peek() {
            if head.time > stop_time {
                return None;
            }
            let event = self.queue.pop()?;
            let entity = event.owner;
            if !self.deregister(entity, event.sequence) {
                continue;
            }
            self.clock.advance_to(event.time);
            trace!(%entity, action = ?event.action, time = event.time, "event fired");
            return Some(event.action);
        }
        None
    }

    /// Remove `sequence` from `entity`'s pending set. False if it was
    /// already cancelled.
    fn deregister(&mut self, entity: EntityId, sequence: u64) -> bool {
        let Some(live) = self.pending.get_mut(&entity) else {
            return false;
        };
        if !live.remove(&sequence) {
            return false;
        }
        if live.is_empty() {
            self.pending.remove(&entity);
        }
        self.pending_count -= 1;
        true
    }

    fn maybe_compact(&mut self) {
        if self.queue.len() < COMPACT_MIN_LEN || self.queue.len() <= 2 * self.pending_count {
            return;
        }
        let pending = &self.pending;
        self.queue.retain(|e| {
            pending
                .get(&e.owner)
                .is_some_and(|live| live.contains(&e.sequence))
        });
    }

    // -----------------------------------------------------------------------
    // Introspection
    // -----------------------------------------------------------------------

    /// Number of events that have neither fired nor been cancelled.
    pub fn pending_count(&self) -> usize {
        self.pending_count
    }

    /// Number of pending events owned by `entity`.
    pub fn pending_for(&self, entity: EntityId) -> usize {
        self.pending.get(&entity).map_or(0, HashSet::len)
    }

    /// True when nothing is pending.
    pub fn is_idle(&self) -> bool {
        self.pending_count == 0
    }

    /// Due time of the earliest pending event.
    pub fn next_due(&self) -> Option<f64> {
        self.queue
            .iter()
            .filter(|e| {
                self.pending
                    .get(&e.owner)
                    .is_some_and(|live| live.contains(&e.sequence))
            })
            .map(|e| e.time)
            .min_by(f64::total_cmp)
    }
}

impl EventCanceller for EventScheduler {
    fn unschedule_all_events(&mut self, entity: EntityId) {
        EventScheduler::unschedule_all_events(self, entity);
    }
}
