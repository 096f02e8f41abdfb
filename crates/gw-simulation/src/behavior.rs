// Per-kind activity procedures.
//
// Each activity runs when its entity's activity event fires and decides
// whether to re-arm itself. Kind changes are always destroy-then-spawn via
// `replace`: the old identity leaves the world (cancelling its events) and the
// replacement is armed with its own fresh activity and animation, so an
// activity that transformed its entity never re-arms.

use std::ops::Range;

use gw_core::{Entity, EntityId, EntityKind, Position, World, WorldError};
use rand::Rng;
use rand::rngs::StdRng;
use tracing::debug;

use crate::action::Action;
use crate::context::SimContext;
use crate::error::{SimError, SimResult};
use crate::event::SimEventKind;

/// What a dude without a full load looks for.
const HARVEST_TARGETS: [EntityKind; 2] = [EntityKind::Tree, EntityKind::Sapling];

/// Which greedy stepping rule an entity follows.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Mover {
    /// Blocked by any occupant.
    Fairy,
    /// Walks over stumps, destroying them; blocked by anything else.
    Dude,
}

impl Mover {
    /// Whether this mover may step onto a cell held by `occupant`.
    pub fn can_enter(self, occupant: EntityKind) -> bool {
        match self {
            Self::Fairy => false,
            Self::Dude => occupant == EntityKind::Stump,
        }
    }
}

/// One greedy step from `from` towards `dest`.
///
/// Horizontal first when the column differs and the cell is enterable, then
/// vertical under the same condition, otherwise stay put.
pub fn next_position(world: &World, mover: Mover, from: Position, dest: Position) -> Position {
    let enterable = |pos: Position| match world.occupant_at(pos).and_then(|id| world.entity(id)) {
        Some(occupant) => mover.can_enter(occupant.kind),
        None => true,
    };

    let horiz = (dest.x - from.x).signum();
    let step = from.offset(horiz, 0);
    if horiz != 0 && enterable(step) {
        return step;
    }

    let vert = (dest.y - from.y).signum();
    let step = from.offset(0, vert);
    if vert != 0 && enterable(step) {
        return step;
    }

    from
}

/// Run the activity of entity `id`.
pub fn execute_activity(ctx: &mut SimContext<'_>, id: EntityId) -> SimResult<()> {
    let kind = live(ctx.world, id)?.kind;
    match kind {
        EntityKind::Sapling => sapling_activity(ctx, id),
        EntityKind::Tree => tree_activity(ctx, id),
        EntityKind::Fairy => fairy_activity(ctx, id),
        EntityKind::DudeNotFull => dude_not_full_activity(ctx, id),
        EntityKind::DudeFull => dude_full_activity(ctx, id),
        EntityKind::House | EntityKind::Obstacle | EntityKind::Stump => {
            Err(SimError::UnsupportedActivity { entity: id, kind })
        }
    }
}

fn live(world: &World, id: EntityId) -> SimResult<&Entity> {
    world.entity(id).ok_or(SimError::StaleEntity(id))
}

fn live_mut(world: &mut World, id: EntityId) -> SimResult<&mut Entity> {
    world.entity_mut(id).ok_or(SimError::StaleEntity(id))
}

fn rearm(ctx: &mut SimContext<'_>, id: EntityId) -> SimResult<()> {
    let period = live(ctx.world, id)?.action_period;
    ctx.scheduler.schedule_event(id, Action::activity(id), period);
    Ok(())
}

// ---------------------------------------------------------------------------
// Plants
// ---------------------------------------------------------------------------

fn sapling_activity(ctx: &mut SimContext<'_>, id: EntityId) -> SimResult<()> {
    live_mut(ctx.world, id)?.health += 1;
    if !transform_plant(ctx, id)? {
        rearm(ctx, id)?;
    }
    Ok(())
}

fn tree_activity(ctx: &mut SimContext<'_>, id: EntityId) -> SimResult<()> {
    if !transform_plant(ctx, id)? {
        rearm(ctx, id)?;
    }
    Ok(())
}

/// Apply the plant transformation rule. A dead plant (health <= 0) becomes a
/// stump; otherwise a sapling at its health limit becomes a tree with
/// randomized periods and health. Returns whether a transformation happened.
pub fn transform_plant(ctx: &mut SimContext<'_>, id: EntityId) -> SimResult<bool> {
    let plant = live(ctx.world, id)?;
    let (kind, position, health, limit) =
        (plant.kind, plant.position, plant.health, plant.health_limit);
    if !kind.is_plant() {
        return Err(SimError::UnsupportedActivity { entity: id, kind });
    }
    let name = plant.name.clone();

    if health <= 0 {
        replace(ctx, id, Entity::stump(format!("stump_{name}"), position))?;
        return Ok(true);
    }

    if kind == EntityKind::Sapling && health >= limit {
        let tree = Entity::tree(
            format!("tree_{name}"),
            position,
            sample_f64(ctx.rng, &ctx.config.tree_action_period),
            sample_f64(ctx.rng, &ctx.config.tree_animation_period),
            sample_i32(ctx.rng, &ctx.config.tree_health),
        );
        replace(ctx, id, tree)?;
        return Ok(true);
    }

    Ok(false)
}

// Degenerate ranges yield their start instead of panicking in the sampler.
fn sample_f64(rng: &mut StdRng, range: &Range<f64>) -> f64 {
    if range.is_empty() {
        range.start
    } else {
        rng.random_range(range.clone())
    }
}

fn sample_i32(rng: &mut StdRng, range: &Range<i32>) -> i32 {
    if range.is_empty() {
        range.start
    } else {
        rng.random_range(range.clone())
    }
}

// ---------------------------------------------------------------------------
// Fairies
// ---------------------------------------------------------------------------

fn fairy_activity(ctx: &mut SimContext<'_>, id: EntityId) -> SimResult<()> {
    let origin = live(ctx.world, id)?.position;

    if let Some(stump) = ctx.world.find_nearest(origin, &[EntityKind::Stump]) {
        let target = live(ctx.world, stump)?.position;
        if origin.adjacent(target) {
            replant(ctx, id, stump)?;
        } else {
            step_toward(ctx, id, Mover::Fairy, target)?;
        }
    }

    // Fairies never stop wandering.
    rearm(ctx, id)
}

fn replant(ctx: &mut SimContext<'_>, fairy: EntityId, stump: EntityId) -> SimResult<()> {
    let removed = ctx
        .world
        .remove_entity(&mut *ctx.scheduler, stump)
        .ok_or(SimError::StaleEntity(stump))?;
    let sapling = Entity::sapling(
        format!("sapling_{}", removed.name),
        removed.position,
        ctx.config.sapling_period,
        ctx.config.sapling_health_limit,
    );
    let sapling_id = place(ctx, sapling)?;

    debug!(%fairy, %stump, sapling = %sapling_id, position = %removed.position, "stump replanted");
    ctx.emit(
        SimEventKind::Replanted {
            fairy,
            stump,
            sapling: sapling_id,
        },
        format!("fairy {fairy} replanted {} at {}", removed.name, removed.position),
    );
    Ok(())
}

// ---------------------------------------------------------------------------
// Dudes
// ---------------------------------------------------------------------------

fn dude_not_full_activity(ctx: &mut SimContext<'_>, id: EntityId) -> SimResult<()> {
    let origin = live(ctx.world, id)?.position;
    let Some(target) = ctx.world.find_nearest(origin, &HARVEST_TARGETS) else {
        return rearm(ctx, id);
    };

    let target_pos = live(ctx.world, target)?.position;
    if !origin.adjacent(target_pos) {
        step_toward(ctx, id, Mover::Dude, target_pos)?;
        return rearm(ctx, id);
    }

    harvest(ctx, id, target)?;

    let dude = live(ctx.world, id)?;
    if dude.resource_count < dude.resource_limit {
        return rearm(ctx, id);
    }
    let full = Entity::dude_full(
        dude.name.clone(),
        dude.position,
        dude.action_period,
        dude.animation_period,
        dude.resource_limit,
    );
    replace(ctx, id, full)?;
    Ok(())
}

// Health may go negative; the plant's own next activity turns it into a stump.
fn harvest(ctx: &mut SimContext<'_>, dude: EntityId, target: EntityId) -> SimResult<()> {
    live_mut(ctx.world, dude)?.resource_count += 1;
    let plant = live_mut(ctx.world, target)?;
    plant.health -= 1;
    let remaining_health = plant.health;
    let plant_name = plant.name.clone();

    ctx.emit(
        SimEventKind::Harvested {
            dude,
            target,
            remaining_health,
        },
        format!("dude {dude} harvested {plant_name} (health {remaining_health})"),
    );
    Ok(())
}

fn dude_full_activity(ctx: &mut SimContext<'_>, id: EntityId) -> SimResult<()> {
    let origin = live(ctx.world, id)?.position;

    if let Some(house) = ctx.world.find_nearest(origin, &[EntityKind::House]) {
        let house_pos = live(ctx.world, house)?.position;
        if origin.adjacent(house_pos) {
            let dude = live(ctx.world, id)?;
            let empty = Entity::dude_not_full(
                dude.name.clone(),
                dude.position,
                dude.action_period,
                dude.animation_period,
                dude.resource_limit,
            );
            replace(ctx, id, empty)?;
            return Ok(());
        }
        step_toward(ctx, id, Mover::Dude, house_pos)?;
    }

    rearm(ctx, id)
}

// ---------------------------------------------------------------------------
// Shared plumbing
// ---------------------------------------------------------------------------

fn step_toward(
    ctx: &mut SimContext<'_>,
    id: EntityId,
    mover: Mover,
    target: Position,
) -> SimResult<()> {
    let from = live(ctx.world, id)?.position;
    let to = next_position(ctx.world, mover, from, target);
    if to == from {
        return Ok(());
    }

    if let Some(victim) = ctx.world.move_entity(&mut *ctx.scheduler, id, to) {
        ctx.emit(
            SimEventKind::Displaced {
                entity: victim,
                by: id,
            },
            format!("{victim} was trampled by {id} at {to}"),
        );
    }
    ctx.emit(
        SimEventKind::Moved {
            entity: id,
            from,
            to,
        },
        format!("{id} moved {from} -> {to}"),
    );
    Ok(())
}

/// Add `entity` at its stored position and arm its standard events.
fn place(ctx: &mut SimContext<'_>, entity: Entity) -> SimResult<EntityId> {
    let position = entity.position;
    let id = ctx
        .world
        .add_entity(entity)
        .ok_or(WorldError::OutOfBounds { position })?;
    if let Some(placed) = ctx.world.entity(id) {
        ctx.scheduler.schedule_actions(id, placed);
    }
    Ok(id)
}

/// Destroy `old` and put `replacement` in its cell.
fn replace(ctx: &mut SimContext<'_>, old: EntityId, replacement: Entity) -> SimResult<EntityId> {
    let retired = ctx
        .world
        .remove_entity(&mut *ctx.scheduler, old)
        .ok_or(SimError::StaleEntity(old))?;
    let to_kind = replacement.kind;
    let to_name = replacement.name.clone();
    let new_id = place(ctx, replacement)?;

    debug!(
        from = %old,
        to = %new_id,
        from_kind = %retired.kind,
        %to_kind,
        position = %retired.position,
        "entity transformed"
    );
    ctx.emit(
        SimEventKind::Transformed {
            from: old,
            to: new_id,
            from_kind: retired.kind,
            to_kind,
        },
        format!(
            "{} {} became {} {} at {}",
            retired.kind, retired.name, to_kind, to_name, retired.position
        ),
    );
    Ok(new_id)
}

#[cfg(test)]
mod tests {
    use gw_core::Terrain;

    use super::*;
    use crate::{SimConfig, Simulation};

    fn grid(cols: i32, rows: i32) -> World {
        World::new(cols, rows, Terrain::default())
    }

    #[test]
    fn step_prefers_horizontal() {
        let world = grid(5, 5);
        let next = next_position(&world, Mover::Fairy, Position::new(0, 0), Position::new(3, 3));
        assert_eq!(next, Position::new(1, 0));
    }

    #[test]
    fn step_falls_back_to_vertical_when_blocked() {
        let mut world = grid(5, 5);
        world.add_entity(Entity::house("h", Position::new(1, 0))).unwrap();
        let next = next_position(&world, Mover::Fairy, Position::new(0, 0), Position::new(3, 3));
        assert_eq!(next, Position::new(0, 1));
    }

    #[test]
    fn step_vertical_when_same_column() {
        let world = grid(5, 5);
        let next = next_position(&world, Mover::Dude, Position::new(2, 4), Position::new(2, 0));
        assert_eq!(next, Position::new(2, 3));
    }

    #[test]
    fn fully_blocked_stays_put() {
        let mut world = grid(5, 5);
        world.add_entity(Entity::house("h1", Position::new(1, 0))).unwrap();
        world.add_entity(Entity::house("h2", Position::new(0, 1))).unwrap();
        let from = Position::new(0, 0);
        assert_eq!(
            next_position(&world, Mover::Fairy, from, Position::new(3, 3)),
            from
        );
    }

    #[test]
    fn dude_treats_stump_as_passable_fairy_does_not() {
        let mut world = grid(5, 1);
        world.add_entity(Entity::stump("s", Position::new(1, 0))).unwrap();
        let from = Position::new(0, 0);
        let dest = Position::new(4, 0);
        assert_eq!(
            next_position(&world, Mover::Dude, from, dest),
            Position::new(1, 0)
        );
        assert_eq!(next_position(&world, Mover::Fairy, from, dest), from);
    }

    #[test]
    fn house_activity_is_unsupported() {
        let mut world = grid(3, 3);
        let id = world.add_entity(Entity::house("h", Position::new(0, 0))).unwrap();
        let mut sim = Simulation::new(world, SimConfig::default());
        sim.init();
        sim.scheduler_mut().schedule_event(id, Action::activity(id), 1.0);

        let err = sim.advance(1.0).unwrap_err();
        assert!(matches!(
            err,
            SimError::UnsupportedActivity {
                kind: EntityKind::House,
                ..
            }
        ));
    }

    #[test]
    fn empty_tree_health_range_uses_start() {
        let mut world = grid(3, 3);
        let sapling = world
            .add_entity(Entity::sapling("s", Position::new(1, 1), 1.0, 1))
            .unwrap();
        let config = SimConfig::default()
            .with_tree_health(7..7)
            .with_tree_action_period(2.0..2.0);
        let mut sim = Simulation::new(world, config);
        sim.advance(1.0).unwrap();

        assert!(!sim.world().is_live(sapling));
        let tree = sim.world().entities_by_kind(EntityKind::Tree)[0];
        let tree = sim.world().entity(tree).unwrap();
        assert_eq!(tree.health, 7);
        assert!((tree.action_period - 2.0).abs() < f64::EPSILON);
        assert_eq!(tree.name, "tree_s");
    }

    #[test]
    fn death_check_precedes_growth() {
        let mut world = grid(3, 3);
        // Limit 0 would also satisfy the growth rule after the increment.
        let sapling = world
            .add_entity(Entity::sapling("s", Position::new(1, 1), 1.0, 0).with_health(-1))
            .unwrap();
        let mut sim = Simulation::new(world, SimConfig::default());
        sim.advance(1.0).unwrap();

        assert!(!sim.world().is_live(sapling));
        assert!(sim.world().entities_by_kind(EntityKind::Tree).is_empty());
        let stump = sim.world().entities_by_kind(EntityKind::Stump)[0];
        let stump = sim.world().entity(stump).unwrap();
        assert_eq!(stump.name, "stump_s");
        assert_eq!(stump.position, Position::new(1, 1));
    }

    #[test]
    fn dude_walks_over_stump_destroying_it() {
        let mut world = grid(4, 1);
        let dude = world
            .add_entity(Entity::dude_not_full("d", Position::new(0, 0), 1.0, 1.0, 3))
            .unwrap();
        let stump = world.add_entity(Entity::stump("s", Position::new(1, 0))).unwrap();
        world
            .add_entity(Entity::tree("t", Position::new(3, 0), 5.0, 5.0, 4))
            .unwrap();

        let mut sim = Simulation::new(world, SimConfig::default());
        sim.advance(1.0).unwrap();

        assert!(!sim.world().is_live(stump));
        assert_eq!(
            sim.world().entity(dude).unwrap().position,
            Position::new(1, 0)
        );
        assert_eq!(sim.events().events_for_entity(stump).len(), 1);
        sim.world().check_invariants().unwrap();
    }

    #[test]
    fn dude_without_targets_just_rearms() {
        let mut world = grid(3, 3);
        let dude = world
            .add_entity(Entity::dude_not_full("d", Position::new(0, 0), 1.0, 10.0, 1))
            .unwrap();
        let mut sim = Simulation::new(world, SimConfig::default());
        sim.run(5, 1.0).unwrap();

        let d = sim.world().entity(dude).unwrap();
        assert_eq!(d.position, Position::new(0, 0));
        assert_eq!(d.resource_count, 0);
        // One activity and one animation always pending.
        assert_eq!(sim.scheduler().pending_for(dude), 2);
    }

    #[test]
    fn full_dude_delivers_and_resets() {
        let mut world = grid(4, 1);
        let dude = world
            .add_entity(Entity::dude_full("d", Position::new(0, 0), 1.0, 10.0, 2))
            .unwrap();
        world.add_entity(Entity::house("home", Position::new(3, 0))).unwrap();

        let mut sim = Simulation::new(world, SimConfig::default());
        // Two steps to become adjacent, a third to deliver.
        sim.run(3, 1.0).unwrap();

        assert!(!sim.world().is_live(dude));
        let empty = sim.world().entities_by_kind(EntityKind::DudeNotFull);
        assert_eq!(empty.len(), 1);
        let d = sim.world().entity(empty[0]).unwrap();
        assert_eq!(d.position, Position::new(2, 0));
        assert_eq!(d.name, "d");
        assert_eq!(d.resource_count, 0);
        assert_eq!(d.resource_limit, 2);
        assert_eq!(sim.scheduler().pending_for(dude), 0);
        assert_eq!(sim.scheduler().pending_for(empty[0]), 2);
    }

    #[test]
    fn full_dude_without_house_keeps_waiting() {
        let mut world = grid(3, 3);
        let dude = world
            .add_entity(Entity::dude_full("d", Position::new(1, 1), 1.0, 10.0, 2))
            .unwrap();
        let mut sim = Simulation::new(world, SimConfig::default());
        sim.run(4, 1.0).unwrap();
        assert!(sim.world().is_live(dude));
        assert_eq!(sim.scheduler().pending_for(dude), 2);
    }

    #[test]
    fn fairy_without_stumps_keeps_wandering() {
        let mut world = grid(3, 3);
        let fairy = world
            .add_entity(Entity::fairy("f", Position::new(1, 1), 1.0, 10.0))
            .unwrap();
        let mut sim = Simulation::new(world, SimConfig::default());
        sim.run(3, 1.0).unwrap();
        assert_eq!(
            sim.world().entity(fairy).unwrap().position,
            Position::new(1, 1)
        );
        assert_eq!(sim.scheduler().pending_for(fairy), 2);
    }
}
