use std::collections::BTreeMap;

use tracing::debug;

use crate::entity::{Entity, EntityId, EntityKind};
use crate::error::{WorldError, WorldResult};
use crate::position::Position;
use crate::terrain::Terrain;

/// Cancels every pending scheduled event of an entity.
///
/// The world calls this before an entity leaves the live set, so that no
/// behavior ever fires for a destroyed identity. Implemented by the
/// simulation's event scheduler.
pub trait EventCanceller {
    /// Drop all not-yet-fired events owned by `entity`. A no-op for entities
    /// with nothing pending.
    fn unschedule_all_events(&mut self, entity: EntityId);
}

/// A canceller for worlds that are not attached to a scheduler, such as
/// scenario loading or tests.
impl EventCanceller for () {
    fn unschedule_all_events(&mut self, _entity: EntityId) {}
}

/// The 2D grid world.
///
/// Owns the terrain layer, the occupancy layer, and the entity arena (which
/// doubles as the live set). A cell holds an id iff that id is live and its
/// stored position equals the cell. All mutation goes through
/// [`add_entity`](Self::add_entity), [`move_entity`](Self::move_entity) and
/// [`remove_entity`](Self::remove_entity), which keep the two in sync.
#[derive(Debug, Clone)]
pub struct World {
    num_cols: i32,
    num_rows: i32,
    terrain: Vec<Terrain>,
    occupancy: Vec<Option<EntityId>>,
    // Identity-ordered, so iteration and nearest-match tie-breaks are deterministic.
    entities: BTreeMap<EntityId, Entity>,
    next_id: u64,
}

impl World {
    /// Create an empty world of `num_cols` x `num_rows` cells, every cell
    /// carrying `default_terrain`. Negative dimensions are treated as zero.
    pub fn new(num_cols: i32, num_rows: i32, default_terrain: Terrain) -> Self {
        let num_cols = num_cols.max(0);
        let num_rows = num_rows.max(0);
        let cells = (num_cols as usize) * (num_rows as usize);
        Self {
            num_cols,
            num_rows,
            terrain: vec![default_terrain; cells],
            occupancy: vec![None; cells],
            entities: BTreeMap::new(),
            next_id: 0,
        }
    }

    /// Number of columns.
    pub fn num_cols(&self) -> i32 {
        self.num_cols
    }

    /// Number of rows.
    pub fn num_rows(&self) -> i32 {
        self.num_rows
    }

    fn cell_index(&self, pos: Position) -> Option<usize> {
        self.within_bounds(pos)
            .then(|| (pos.y as usize) * (self.num_cols as usize) + pos.x as usize)
    }

    // -----------------------------------------------------------------------
    // Spatial queries
    // -----------------------------------------------------------------------

    /// True when `pos` lies on the grid.
    pub fn within_bounds(&self, pos: Position) -> bool {
        pos.x >= 0 && pos.x < self.num_cols && pos.y >= 0 && pos.y < self.num_rows
    }

    /// True when `pos` is on the grid and holds an entity.
    pub fn is_occupied(&self, pos: Position) -> bool {
        self.occupant_at(pos).is_some()
    }

    /// The entity at `pos`, if any. Out-of-bounds positions are simply empty.
    pub fn occupant_at(&self, pos: Position) -> Option<EntityId> {
        self.cell_index(pos).and_then(|i| self.occupancy[i])
    }

    /// The terrain at `pos`, or `None` off the grid.
    pub fn terrain_at(&self, pos: Position) -> Option<&Terrain> {
        self.cell_index(pos).map(|i| &self.terrain[i])
    }

    /// Replace the terrain at `pos`.
    pub fn set_terrain(&mut self, pos: Position, terrain: Terrain) -> WorldResult<()> {
        let i = self
            .cell_index(pos)
            .ok_or(WorldError::OutOfBounds { position: pos })?;
        self.terrain[i] = terrain;
        Ok(())
    }

    // -----------------------------------------------------------------------
    // Arena access
    // -----------------------------------------------------------------------

    /// Get a live entity by id.
    pub fn entity(&self, id: EntityId) -> Option<&Entity> {
        self.entities.get(&id)
    }

    /// Get a live entity mutably. Callers must not change `position`
    /// directly; use [`move_entity`](Self::move_entity).
    pub fn entity_mut(&mut self, id: EntityId) -> Option<&mut Entity> {
        self.entities.get_mut(&id)
    }

    /// True while `id` is in the live set.
    pub fn is_live(&self, id: EntityId) -> bool {
        self.entities.contains_key(&id)
    }

    /// Number of live entities.
    pub fn entity_count(&self) -> usize {
        self.entities.len()
    }

    /// All live entities in identity order.
    pub fn entities(&self) -> impl Iterator<Item = (EntityId, &Entity)> {
        self.entities.iter().map(|(id, e)| (*id, e))
    }

    /// Ids of all live entities of `kind`, in identity order.
    pub fn entities_by_kind(&self, kind: EntityKind) -> Vec<EntityId> {
        self.entities
            .iter()
            .filter(|(_, e)| e.kind == kind)
            .map(|(id, _)| *id)
            .collect()
    }

    // -----------------------------------------------------------------------
    // Mutation
    // -----------------------------------------------------------------------

    /// Register an entity at its stored position without checking occupancy.
    ///
    /// The caller guarantees the cell is free (e.g. a transformation in place
    /// right after removing the previous occupant). Returns `None` and
    /// registers nothing when the position is off the grid.
    pub fn add_entity(&mut self, entity: Entity) -> Option<EntityId> {
        let cell = self.cell_index(entity.position)?;
        debug_assert!(
            self.occupancy[cell].is_none(),
            "add_entity onto occupied cell {}",
            entity.position
        );

        let id = EntityId(self.next_id);
        self.next_id += 1;
        self.occupancy[cell] = Some(id);
        debug!(%id, kind = %entity.kind, position = %entity.position, "entity added");
        self.entities.insert(id, entity);
        Some(id)
    }

    /// Register an entity, failing without side effects if its cell is taken
    /// or off the grid. This is the ingestion point for scenario loaders.
    pub fn try_add_entity(&mut self, entity: Entity) -> WorldResult<EntityId> {
        let position = entity.position;
        if !self.within_bounds(position) {
            return Err(WorldError::OutOfBounds { position });
        }
        if self.is_occupied(position) {
            return Err(WorldError::PlacementConflict { position });
        }
        self.add_entity(entity)
            .ok_or(WorldError::OutOfBounds { position })
    }

    /// Move an entity to `pos`.
    ///
    /// No-op when `pos` is off the grid, equals the current position, or `id`
    /// is not live. Whatever occupies the destination is destroyed first
    /// (events cancelled through `canceller`); its id is returned.
    pub fn move_entity(
        &mut self,
        canceller: &mut impl EventCanceller,
        id: EntityId,
        pos: Position,
    ) -> Option<EntityId> {
        let old = self.entities.get(&id)?.position;
        let dest = self.cell_index(pos)?;
        if pos == old {
            return None;
        }

        if let Some(old_cell) = self.cell_index(old) {
            self.occupancy[old_cell] = None;
        }

        let displaced = self.occupancy[dest];
        if let Some(victim) = displaced {
            debug!(mover = %id, %victim, position = %pos, "occupant displaced");
            self.remove_entity(canceller, victim);
        }

        self.occupancy[dest] = Some(id);
        if let Some(entity) = self.entities.get_mut(&id) {
            entity.position = pos;
        }
        displaced
    }

    /// Destroy an entity: cancel its pending events, clear its cell, and drop
    /// it from the live set. Returns the removed entity, or `None` if `id`
    /// was not live.
    pub fn remove_entity(
        &mut self,
        canceller: &mut impl EventCanceller,
        id: EntityId,
    ) -> Option<Entity> {
        canceller.unschedule_all_events(id);
        let entity = self.entities.remove(&id)?;
        if let Some(cell) = self.cell_index(entity.position)
            && self.occupancy[cell] == Some(id)
        {
            self.occupancy[cell] = None;
        }
        debug!(%id, kind = %entity.kind, position = %entity.position, "entity removed");
        Some(entity)
    }

    /// The live entity of one of `kinds` closest to `origin` by squared
    /// Euclidean distance. Equally near candidates resolve to the lowest id.
    pub fn find_nearest(&self, origin: Position, kinds: &[EntityKind]) -> Option<EntityId> {
        self.entities
            .iter()
            .filter(|(_, e)| kinds.contains(&e.kind))
            .min_by_key(|(id, e)| (e.position.distance_squared(origin), **id))
            .map(|(id, _)| *id)
    }

    // -----------------------------------------------------------------------
    // Diagnostics
    // -----------------------------------------------------------------------

    /// State dump of every named live entity, in identity order.
    pub fn log_lines(&self) -> Vec<String> {
        self.entities.values().filter_map(Entity::log_line).collect()
    }

    /// Verify that the occupancy layer and the live set agree.
    pub fn check_invariants(&self) -> Result<(), String> {
        for (id, entity) in &self.entities {
            match self.cell_index(entity.position) {
                None => return Err(format!("{id} is live off the grid at {}", entity.position)),
                Some(cell) if self.occupancy[cell] != Some(*id) => {
                    return Err(format!(
                        "{id} claims {} but the cell holds {:?}",
                        entity.position, self.occupancy[cell]
                    ));
                }
                Some(_) => {}
            }
        }
        let occupied = self.occupancy.iter().filter(|c| c.is_some()).count();
        if occupied != self.entities.len() {
            return Err(format!(
                "{occupied} occupied cells for {} live entities",
                self.entities.len()
            ));
        }
        Ok(())
    }
}
