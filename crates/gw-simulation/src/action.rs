use gw_core::EntityId;
use tracing::trace;

use crate::behavior;
use crate::context::SimContext;
use crate::error::{SimError, SimResult};

/// A behavior step owned by one entity, executed when its event comes due.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Action {
    /// Run the entity's kind-specific activity.
    Activity {
        /// The acting entity.
        entity: EntityId,
    },
    /// Advance the entity's frame counter.
    ///
    /// `repeat_count` 0 animates forever, 1 marks the last frame, and any
    /// larger value counts down by one per frame.
    Animation {
        /// The animated entity.
        entity: EntityId,
        /// Frames left including this one, or 0 for unbounded.
        repeat_count: u32,
    },
}

impl Action {
    /// An activity step for `entity`.
    pub fn activity(entity: EntityId) -> Self {
        Self::Activity { entity }
    }

    /// An animation step for `entity` with the given repeat counter.
    pub fn animation(entity: EntityId, repeat_count: u32) -> Self {
        Self::Animation {
            entity,
            repeat_count,
        }
    }

    /// The entity that owns this action.
    pub fn entity(&self) -> EntityId {
        match self {
            Self::Activity { entity } | Self::Animation { entity, .. } => *entity,
        }
    }

    /// Execute the action against the world held by `ctx`.
    pub fn execute(self, ctx: &mut SimContext<'_>) -> SimResult<()> {
        match self {
            Self::Activity { entity } => behavior::execute_activity(ctx, entity),
            Self::Animation {
                entity,
                repeat_count,
            } => execute_animation(ctx, entity, repeat_count),
        }
    }
}

fn execute_animation(ctx: &mut SimContext<'_>, id: EntityId, repeat_count: u32) -> SimResult<()> {
    let entity = ctx.world.entity_mut(id).ok_or(SimError::StaleEntity(id))?;
    if entity.kind.is_static() {
        return Err(SimError::UnsupportedAnimation {
            entity: id,
            kind: entity.kind,
        });
    }

    entity.next_image();
    let period = entity.animation_period;
    trace!(%id, frame = entity.image_index, repeat_count, "animation step");

    if repeat_count != 1 {
        ctx.scheduler.schedule_event(
            id,
            Action::animation(id, repeat_count.saturating_sub(1)),
            period,
        );
    }
    Ok(())
}

#[cfg(test)]
mod tests {
    use gw_core::{Entity, Position, Terrain, World};
    use rand::SeedableRng;
    use rand::rngs::StdRng;

    use super::*;
    use crate::{EventLog, EventScheduler, SimConfig, Simulation};

    /// Drain `scheduler` against `world` without the orchestrator, so the
    /// test controls exactly which events exist.
    fn drain(world: &mut World, scheduler: &mut EventScheduler, dt: f64) -> SimResult<()> {
        let mut rng = StdRng::seed_from_u64(1);
        let config = SimConfig::default();
        let mut events = EventLog::new(0);
        scheduler.advance(dt, |scheduler, action| {
            let mut ctx = SimContext {
                world: &mut *world,
                scheduler,
                rng: &mut rng,
                config: &config,
                events: &mut events,
            };
            action.execute(&mut ctx)
        })
    }

    fn rock_world(period: f64) -> (World, EntityId) {
        let mut world = World::new(3, 3, Terrain::default());
        let id = world
            .try_add_entity(Entity::obstacle("rock", Position::new(1, 1), period))
            .unwrap();
        (world, id)
    }

    #[test]
    fn entity_accessor() {
        assert_eq!(Action::activity(EntityId(3)).entity(), EntityId(3));
        assert_eq!(Action::animation(EntityId(4), 2).entity(), EntityId(4));
    }

    #[test]
    fn perpetual_animation_keeps_firing() {
        let (world, id) = rock_world(1.0);
        let mut sim = Simulation::new(world, SimConfig::default());
        sim.run(10, 1.0).unwrap();
        assert_eq!(sim.world().entity(id).unwrap().image_index, 10);
        assert_eq!(sim.scheduler().pending_for(id), 1);
    }

    #[test]
    fn finite_animation_stops_after_count() {
        let (mut world, id) = rock_world(0.5);
        let mut scheduler = EventScheduler::new();
        scheduler.schedule_event(id, Action::animation(id, 3), 0.5);

        drain(&mut world, &mut scheduler, 10.0).unwrap();

        assert_eq!(world.entity(id).unwrap().image_index, 3);
        assert_eq!(scheduler.pending_for(id), 0);
        assert_eq!(scheduler.clock().fired(), 3);
    }

    #[test]
    fn last_frame_does_not_rearm() {
        let (mut world, id) = rock_world(0.5);
        let mut scheduler = EventScheduler::new();
        scheduler.schedule_event(id, Action::animation(id, 1), 0.0);

        drain(&mut world, &mut scheduler, 0.0).unwrap();

        assert_eq!(world.entity(id).unwrap().image_index, 1);
        assert!(scheduler.is_idle());
    }

    #[test]
    fn animating_a_static_kind_is_an_error() {
        let mut world = World::new(3, 3, Terrain::default());
        let id = world
            .try_add_entity(Entity::house("home", Position::new(0, 0)))
            .unwrap();
        let mut scheduler = EventScheduler::new();
        scheduler.schedule_event(id, Action::animation(id, 0), 1.0);

        let err = drain(&mut world, &mut scheduler, 1.0).unwrap_err();
        assert!(matches!(err, SimError::UnsupportedAnimation { .. }));
        assert_eq!(world.entity(id).unwrap().image_index, 0);
    }

    #[test]
    fn action_for_destroyed_entity_is_stale() {
        let mut world = World::new(3, 3, Terrain::default());
        let mut scheduler = EventScheduler::new();
        let ghost = EntityId(99);
        scheduler.schedule_event(ghost, Action::animation(ghost, 0), 1.0);

        let err = drain(&mut world, &mut scheduler, 1.0).unwrap_err();
        assert!(matches!(err, SimError::StaleEntity(id) if id == ghost));
    }
}
