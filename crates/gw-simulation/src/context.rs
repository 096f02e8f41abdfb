use gw_core::World;
use rand::rngs::StdRng;

use crate::config::SimConfig;
use crate::event::{EventLog, SimEvent, SimEventKind};
use crate::scheduler::EventScheduler;

/// Mutable context passed to a behavior while its action executes.
pub struct SimContext<'a> {
    /// The world being simulated.
    pub world: &'a mut World,
    /// The scheduler draining this action; behaviors re-arm through it.
    pub scheduler: &'a mut EventScheduler,
    /// Seeded RNG for randomized spawns.
    pub rng: &'a mut StdRng,
    /// Run configuration.
    pub config: &'a SimConfig,
    /// Narrative event log.
    pub events: &'a mut EventLog,
}

impl SimContext<'_> {
    /// Emit a simulation event at the current time.
    pub fn emit(&mut self, kind: SimEventKind, description: impl Into<String>) {
        self.events
            .push(SimEvent::new(self.scheduler.now(), kind, description));
    }

    /// Current simulated time.
    pub fn now(&self) -> f64 {
        self.scheduler.now()
    }
}
