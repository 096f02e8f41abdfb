use gw_core::{EntityId, EntityKind, Position};

/// What kind of simulation event occurred.
#[derive(Debug, Clone, PartialEq)]
pub enum SimEventKind {
    /// A new entity was placed on the grid by a behavior.
    Spawned {
        /// The new entity.
        entity: EntityId,
        /// Its kind.
        kind: EntityKind,
        /// Where it was placed.
        at: Position,
    },
    /// An entity took one step.
    Moved {
        /// The entity that moved.
        entity: EntityId,
        /// The cell it left.
        from: Position,
        /// The cell it entered.
        to: Position,
    },
    /// An entity was destroyed because another one stepped onto its cell.
    Displaced {
        /// The destroyed entity.
        entity: EntityId,
        /// The entity that stepped onto it.
        by: EntityId,
    },
    /// An entity was replaced in place by one of a different kind.
    Transformed {
        /// The destroyed entity.
        from: EntityId,
        /// Its replacement.
        to: EntityId,
        /// Kind before the transformation.
        from_kind: EntityKind,
        /// Kind after the transformation.
        to_kind: EntityKind,
    },
    /// A dude harvested one unit from a plant.
    Harvested {
        /// The harvesting dude.
        dude: EntityId,
        /// The harvested plant.
        target: EntityId,
        /// The plant's health after the harvest. May be negative.
        remaining_health: i32,
    },
    /// A fairy turned a stump into a sapling.
    Replanted {
        /// The fairy.
        fairy: EntityId,
        /// The destroyed stump.
        stump: EntityId,
        /// The new sapling.
        sapling: EntityId,
    },
}

impl SimEventKind {
    /// Check whether a given entity is involved in this event.
    pub fn involves(&self, id: EntityId) -> bool {
        match self {
            Self::Spawned { entity, .. } | Self::Moved { entity, .. } => *entity == id,
            Self::Displaced { entity, by } => *entity == id || *by == id,
            Self::Transformed { from, to, .. } => *from == id || *to == id,
            Self::Harvested { dude, target, .. } => *dude == id || *target == id,
            Self::Replanted {
                fairy,
                stump,
                sapling,
            } => *fairy == id || *stump == id || *sapling == id,
        }
    }
}

/// A record of something that happened during simulation.
#[derive(Debug, Clone)]
pub struct SimEvent {
    /// The simulated time at which this event occurred.
    pub time: f64,
    /// The specific kind of event that occurred.
    pub kind: SimEventKind,
    /// A human-readable description of the event.
    pub description: String,
}

impl SimEvent {
    /// Create a new simulation event with the given time, kind, and description.
    pub fn new(time: f64, kind: SimEventKind, description: impl Into<String>) -> Self {
        Self {
            time,
            kind,
            description: description.into(),
        }
    }
}

/// Accumulates events during a simulation run.
///
/// Purely observational: nothing in the simulation reads it back.
#[derive(Debug, Default)]
pub struct EventLog {
    events: Vec<SimEvent>,
    max_events: usize,
}

impl EventLog {
    /// Create a new event log with the given maximum capacity (0 = unlimited).
    pub fn new(max_events: usize) -> Self {
        Self {
            events: Vec::new(),
            max_events,
        }
    }

    /// Append an event, dropping the oldest events if the log exceeds its capacity.
    pub fn push(&mut self, event: SimEvent) {
        self.events.push(event);
        if self.max_events > 0 && self.events.len() > self.max_events {
            let drain_count = self.events.len() - self.max_events;
            self.events.drain(..drain_count);
        }
    }

    /// Return a slice of all recorded events.
    pub fn events(&self) -> &[SimEvent] {
        &self.events
    }

    /// Return all events with `from <= time <= to`.
    pub fn events_between(&self, from: f64, to: f64) -> Vec<&SimEvent> {
        self.events
            .iter()
            .filter(|e| e.time >= from && e.time <= to)
            .collect()
    }

    /// Return all events involving the given entity.
    pub fn events_for_entity(&self, id: EntityId) -> Vec<&SimEvent> {
        self.events.iter().filter(|e| e.kind.involves(id)).collect()
    }

    /// Return the number of recorded events.
    pub fn len(&self) -> usize {
        self.events.len()
    }

    /// Return `true` if no events have been recorded.
    pub fn is_empty(&self) -> bool {
        self.events.is_empty()
    }

    /// Remove all recorded events.
    pub fn clear(&mut self) {
        self.events.clear();
    }
}
