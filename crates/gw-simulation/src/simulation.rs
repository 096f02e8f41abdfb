use gw_core::{Entity, EntityId, World, WorldError};
use rand::SeedableRng;
use rand::rngs::StdRng;
use tracing::{debug, info};

use crate::config::SimConfig;
use crate::context::SimContext;
use crate::error::SimResult;
use crate::event::{EventLog, SimEventKind};
use crate::scheduler::EventScheduler;

/// The top-level simulation orchestrator.
///
/// Owns the world, the scheduler (and with it the clock), the RNG, and the
/// narrative event log. On first advance every live entity is armed with its
/// standard events in identity order; afterwards the scheduler is the only
/// thing driving change.
pub struct Simulation {
    world: World,
    scheduler: EventScheduler,
    rng: StdRng,
    config: SimConfig,
    events: EventLog,
    initialized: bool,
}

impl std::fmt::Debug for Simulation {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("Simulation")
            .field("now", &self.scheduler.now())
            .field("entities", &self.world.entity_count())
            .field("pending", &self.scheduler.pending_count())
            .field("events", &self.events.len())
            .finish()
    }
}

impl Simulation {
    /// Create a new simulation from a world and configuration.
    pub fn new(world: World, config: SimConfig) -> Self {
        let rng = StdRng::seed_from_u64(config.seed);
        let events = EventLog::new(config.max_events);
        Self {
            world,
            scheduler: EventScheduler::new(),
            rng,
            config,
            events,
            initialized: false,
        }
    }

    /// Arm every live entity with its standard events. Idempotent; called
    /// implicitly by the first [`advance`](Self::advance).
    ///
    /// Entities added through [`world_mut`](Self::world_mut) after this point
    /// are not armed; use [`spawn`](Self::spawn) instead.
    pub fn init(&mut self) {
        if self.initialized {
            return;
        }
        for (id, entity) in self.world.entities() {
            self.scheduler.schedule_actions(id, entity);
        }
        self.initialized = true;
        info!(
            entities = self.world.entity_count(),
            pending = self.scheduler.pending_count(),
            seed = self.config.seed,
            "simulation initialized"
        );
    }

    /// Place a new entity into a running simulation and arm it.
    pub fn spawn(&mut self, entity: Entity) -> SimResult<EntityId> {
        if !self.initialized {
            self.init();
        }
        let kind = entity.kind;
        let at = entity.position;
        let id = self.world.try_add_entity(entity)?;
        let placed = self
            .world
            .entity(id)
            .ok_or(WorldError::EntityNotFound(id))?;
        self.scheduler.schedule_actions(id, placed);

        let mut ctx = self.context();
        ctx.emit(
            SimEventKind::Spawned {
                entity: id,
                kind,
                at,
            },
            format!("{kind} {id} spawned at {at}"),
        );
        Ok(id)
    }

    /// Advance simulated time by `dt`, firing every event that comes due,
    /// including ones scheduled while draining.
    ///
    /// On error the drain stops at the failing event; the clock stays at that
    /// event's time and later events remain queued.
    pub fn advance(&mut self, dt: f64) -> SimResult<()> {
        if !self.initialized {
            self.init();
        }

        let Self {
            world,
            scheduler,
            rng,
            config,
            events,
            ..
        } = self;
        let fired_before = scheduler.clock().fired();
        scheduler.advance(dt, |scheduler, action| {
            let mut ctx = SimContext {
                world: &mut *world,
                scheduler,
                rng: &mut *rng,
                config: &*config,
                events: &mut *events,
            };
            action.execute(&mut ctx)
        })?;

        debug!(
            now = scheduler.now(),
            fired = scheduler.clock().fired() - fired_before,
            pending = scheduler.pending_count(),
            "advanced"
        );
        Ok(())
    }

    /// Advance the simulation `steps` times by `dt` each.
    pub fn run(&mut self, steps: u64, dt: f64) -> SimResult<()> {
        for _ in 0..steps {
            self.advance(dt)?;
        }
        Ok(())
    }

    fn context(&mut self) -> SimContext<'_> {
        SimContext {
            world: &mut self.world,
            scheduler: &mut self.scheduler,
            rng: &mut self.rng,
            config: &self.config,
            events: &mut self.events,
        }
    }

    /// The simulated world.
    pub fn world(&self) -> &World {
        &self.world
    }

    /// Mutable access to the world.
    pub fn world_mut(&mut self) -> &mut World {
        &mut self.world
    }

    /// The event scheduler.
    pub fn scheduler(&self) -> &EventScheduler {
        &self.scheduler
    }

    /// Mutable access to the scheduler.
    pub fn scheduler_mut(&mut self) -> &mut EventScheduler {
        &mut self.scheduler
    }

    /// The narrative event log.
    pub fn events(&self) -> &EventLog {
        &self.events
    }

    /// The run configuration.
    pub fn config(&self) -> &SimConfig {
        &self.config
    }

    /// Current simulated time.
    pub fn now(&self) -> f64 {
        self.scheduler.now()
    }

    /// One `name x y frame` line per named entity, in identity order.
    pub fn log_lines(&self) -> Vec<String> {
        self.world.log_lines()
    }

    /// Extract the world, consuming the simulation.
    pub fn into_world(self) -> World {
        self.world
    }
}
