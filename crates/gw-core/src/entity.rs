use std::fmt;

use serde::{Deserialize, Serialize};

use crate::position::Position;

/// Arena identity of a live entity.
///
/// Assigned by the [`World`](crate::World) on insertion and never reused, so a
/// stale id held after destruction simply stops resolving.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize)]
pub struct EntityId(pub u64);

impl fmt::Display for EntityId {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "#{}", self.0)
    }
}

/// The kind of an entity. Kind never changes in place; a transformation
/// destroys the entity and spawns a different kind at the same cell.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum EntityKind {
    /// A delivery target for full dudes. Static.
    House,
    /// Animated scenery that blocks movement.
    Obstacle,
    /// A grown tree; loses health when harvested.
    Tree,
    /// What remains of a dead plant. Static.
    Stump,
    /// A young plant that gains health until it becomes a tree.
    Sapling,
    /// Wanders towards stumps and replants them.
    Fairy,
    /// A dude carrying a full load, heading for a house.
    DudeFull,
    /// A dude looking for plants to harvest.
    DudeNotFull,
}

impl EntityKind {
    /// Every kind, in declaration order.
    pub const ALL: [EntityKind; 8] = [
        Self::House,
        Self::Obstacle,
        Self::Tree,
        Self::Stump,
        Self::Sapling,
        Self::Fairy,
        Self::DudeFull,
        Self::DudeNotFull,
    ];

    /// Image/scenario key. Both dude variants share the `dude` key.
    pub fn key(self) -> &'static str {
        match self {
            Self::House => "house",
            Self::Obstacle => "obstacle",
            Self::Tree => "tree",
            Self::Stump => "stump",
            Self::Sapling => "sapling",
            Self::Fairy => "fairy",
            Self::DudeFull | Self::DudeNotFull => "dude",
        }
    }

    /// Parse a scenario key. `dude` yields [`EntityKind::DudeNotFull`], the
    /// only dude state a world can start in.
    pub fn parse(key: &str) -> Option<Self> {
        match key {
            "house" => Some(Self::House),
            "obstacle" => Some(Self::Obstacle),
            "tree" => Some(Self::Tree),
            "stump" => Some(Self::Stump),
            "sapling" => Some(Self::Sapling),
            "fairy" => Some(Self::Fairy),
            "dude" => Some(Self::DudeNotFull),
            _ => None,
        }
    }

    /// Static kinds never schedule an activity or an animation.
    pub fn is_static(self) -> bool {
        matches!(self, Self::House | Self::Stump)
    }

    /// True for kinds whose frame counter advances over time.
    pub fn is_animated(self) -> bool {
        !self.is_static()
    }

    /// True for kinds that run a periodic activity.
    pub fn has_activity(self) -> bool {
        matches!(
            self,
            Self::Tree | Self::Sapling | Self::Fairy | Self::DudeFull | Self::DudeNotFull
        )
    }

    /// Saplings and trees.
    pub fn is_plant(self) -> bool {
        matches!(self, Self::Tree | Self::Sapling)
    }

    /// Either dude variant.
    pub fn is_dude(self) -> bool {
        matches!(self, Self::DudeFull | Self::DudeNotFull)
    }
}

impl fmt::Display for EntityKind {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Self::DudeFull => write!(f, "dude (full)"),
            Self::DudeNotFull => write!(f, "dude"),
            other => write!(f, "{}", other.key()),
        }
    }
}

/// A simulated object on the grid.
///
/// Entities are passive data. Their behavior lives in the simulation crate
/// and reaches them only through the world's arena.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Entity {
    /// The entity's kind.
    pub kind: EntityKind,
    /// Textual identity from the scenario; derived for spawned replacements.
    pub name: String,
    /// Current cell. Only meaningful while the entity is live.
    pub position: Position,
    /// Monotonic frame counter; the renderer reduces it modulo its image count.
    pub image_index: u64,
    /// Delay between activity firings.
    pub action_period: f64,
    /// Delay between animation frames.
    pub animation_period: f64,
    /// Units harvested so far (dudes only).
    pub resource_count: u32,
    /// Units a dude carries before heading home.
    pub resource_limit: u32,
    /// Counts up for saplings, down for harvested trees.
    pub health: i32,
    /// Health at which a sapling becomes a tree.
    pub health_limit: i32,
}

impl Entity {
    #[allow(clippy::too_many_arguments)]
    fn build(
        kind: EntityKind,
        name: impl Into<String>,
        position: Position,
        action_period: f64,
        animation_period: f64,
        resource_limit: u32,
        health: i32,
        health_limit: i32,
    ) -> Self {
        Self {
            kind,
            name: name.into(),
            position,
            image_index: 0,
            action_period,
            animation_period,
            resource_count: 0,
            resource_limit,
            health,
            health_limit,
        }
    }

    /// A house: a static delivery target.
    pub fn house(name: impl Into<String>, position: Position) -> Self {
        Self::build(EntityKind::House, name, position, 0.0, 0.0, 0, 0, 0)
    }

    /// A stump: static until a fairy replants it.
    pub fn stump(name: impl Into<String>, position: Position) -> Self {
        Self::build(EntityKind::Stump, name, position, 0.0, 0.0, 0, 0, 0)
    }

    /// An obstacle that animates forever but never acts.
    pub fn obstacle(name: impl Into<String>, position: Position, animation_period: f64) -> Self {
        Self::build(
            EntityKind::Obstacle,
            name,
            position,
            0.0,
            animation_period,
            0,
            0,
            0,
        )
    }

    /// A tree with the given remaining health.
    pub fn tree(
        name: impl Into<String>,
        position: Position,
        action_period: f64,
        animation_period: f64,
        health: i32,
    ) -> Self {
        Self::build(
            EntityKind::Tree,
            name,
            position,
            action_period,
            animation_period,
            0,
            health,
            0,
        )
    }

    /// A freshly planted sapling. Health starts at zero; growth and animation
    /// share one period.
    pub fn sapling(
        name: impl Into<String>,
        position: Position,
        period: f64,
        health_limit: i32,
    ) -> Self {
        Self::build(
            EntityKind::Sapling,
            name,
            position,
            period,
            period,
            0,
            0,
            health_limit,
        )
    }

    /// A wandering fairy.
    pub fn fairy(
        name: impl Into<String>,
        position: Position,
        action_period: f64,
        animation_period: f64,
    ) -> Self {
        Self::build(
            EntityKind::Fairy,
            name,
            position,
            action_period,
            animation_period,
            0,
            0,
            0,
        )
    }

    /// A dude looking for something to harvest.
    pub fn dude_not_full(
        name: impl Into<String>,
        position: Position,
        action_period: f64,
        animation_period: f64,
        resource_limit: u32,
    ) -> Self {
        Self::build(
            EntityKind::DudeNotFull,
            name,
            position,
            action_period,
            animation_period,
            resource_limit,
            0,
            0,
        )
    }

    /// A dude carrying a full load. The count is reset: the load is implied by
    /// the kind.
    pub fn dude_full(
        name: impl Into<String>,
        position: Position,
        action_period: f64,
        animation_period: f64,
        resource_limit: u32,
    ) -> Self {
        Self::build(
            EntityKind::DudeFull,
            name,
            position,
            action_period,
            animation_period,
            resource_limit,
            0,
            0,
        )
    }

    /// Builder: override the starting health.
    pub fn with_health(mut self, health: i32) -> Self {
        self.health = health;
        self
    }

    /// Advance the frame counter by one.
    pub fn next_image(&mut self) {
        self.image_index += 1;
    }

    /// One-line state dump: `name x y frame`. Unnamed entities are skipped.
    pub fn log_line(&self) -> Option<String> {
        if self.name.is_empty() {
            return None;
        }
        Some(format!(
            "{} {} {} {}",
            self.name, self.position.x, self.position.y, self.image_index
        ))
    }
}
