//! JSON scenario files: grid size, optional seed, and the initial entities.

use std::path::Path;

use gw_core::{Entity, Position, Terrain, World};
use gw_simulation::SimConfig;
use serde::Deserialize;

/// A whole scenario as stored on disk.
#[derive(Debug, Deserialize)]
#[serde(deny_unknown_fields)]
pub struct Scenario {
    pub cols: i32,
    pub rows: i32,
    #[serde(default)]
    pub terrain: Option<String>,
    /// Per-row terrain keys separated by spaces. Extra rows and cells are
    /// ignored; missing ones keep the default terrain.
    #[serde(default)]
    pub terrain_rows: Vec<String>,
    #[serde(default)]
    pub seed: Option<u64>,
    #[serde(default)]
    pub entities: Vec<EntitySpec>,
}

/// One initial entity, tagged by its scenario key.
#[derive(Debug, Deserialize)]
#[serde(tag = "kind", rename_all = "snake_case")]
pub enum EntitySpec {
    House {
        name: String,
        x: i32,
        y: i32,
    },
    Obstacle {
        name: String,
        x: i32,
        y: i32,
        animation_period: f64,
    },
    Tree {
        name: String,
        x: i32,
        y: i32,
        action_period: f64,
        animation_period: f64,
        health: i32,
    },
    Stump {
        name: String,
        x: i32,
        y: i32,
    },
    Sapling {
        name: String,
        x: i32,
        y: i32,
        #[serde(default)]
        period: Option<f64>,
        #[serde(default)]
        health_limit: Option<i32>,
        #[serde(default)]
        health: Option<i32>,
    },
    Fairy {
        name: String,
        x: i32,
        y: i32,
        action_period: f64,
        animation_period: f64,
    },
    Dude {
        name: String,
        x: i32,
        y: i32,
        action_period: f64,
        animation_period: f64,
        resource_limit: u32,
    },
}

impl EntitySpec {
    /// Build the entity, filling sapling defaults from `config`.
    pub fn to_entity(&self, config: &SimConfig) -> Entity {
        match self {
            Self::House { name, x, y } => Entity::house(name.as_str(), Position::new(*x, *y)),
            Self::Obstacle {
                name,
                x,
                y,
                animation_period,
            } => Entity::obstacle(name.as_str(), Position::new(*x, *y), *animation_period),
            Self::Tree {
                name,
                x,
                y,
                action_period,
                animation_period,
                health,
            } => Entity::tree(
                name.as_str(),
                Position::new(*x, *y),
                *action_period,
                *animation_period,
                *health,
            ),
            Self::Stump { name, x, y } => Entity::stump(name.as_str(), Position::new(*x, *y)),
            Self::Sapling {
                name,
                x,
                y,
                period,
                health_limit,
                health,
            } => {
                let sapling = Entity::sapling(
                    name.as_str(),
                    Position::new(*x, *y),
                    period.unwrap_or(config.sapling_period),
                    health_limit.unwrap_or(config.sapling_health_limit),
                );
                match health {
                    Some(h) => sapling.with_health(*h),
                    None => sapling,
                }
            }
            Self::Fairy {
                name,
                x,
                y,
                action_period,
                animation_period,
            } => Entity::fairy(
                name.as_str(),
                Position::new(*x, *y),
                *action_period,
                *animation_period,
            ),
            Self::Dude {
                name,
                x,
                y,
                action_period,
                animation_period,
                resource_limit,
            } => Entity::dude_not_full(
                name.as_str(),
                Position::new(*x, *y),
                *action_period,
                *animation_period,
                *resource_limit,
            ),
        }
    }

    /// Every period this entity will be armed with.
    fn periods(&self) -> Vec<(&'static str, f64)> {
        match self {
            Self::House { .. } | Self::Stump { .. } => Vec::new(),
            Self::Obstacle {
                animation_period, ..
            } => vec![("animation_period", *animation_period)],
            Self::Sapling { period, .. } => {
                period.map(|p| vec![("period", p)]).unwrap_or_default()
            }
            Self::Tree {
                action_period,
                animation_period,
                ..
            }
            | Self::Fairy {
                action_period,
                animation_period,
                ..
            }
            | Self::Dude {
                action_period,
                animation_period,
                ..
            } => vec![
                ("action_period", *action_period),
                ("animation_period", *animation_period),
            ],
        }
    }

    /// Reject periods that would re-arm an event at the current instant
    /// forever.
    fn validate(&self) -> Result<(), String> {
        for (field, value) in self.periods() {
            if !value.is_finite() || value <= 0.0 {
                return Err(format!(
                    "entity '{}': {field} must be a positive number, got {value}",
                    self.name()
                ));
            }
        }
        Ok(())
    }

    fn name(&self) -> &str {
        match self {
            Self::House { name, .. }
            | Self::Obstacle { name, .. }
            | Self::Tree { name, .. }
            | Self::Stump { name, .. }
            | Self::Sapling { name, .. }
            | Self::Fairy { name, .. }
            | Self::Dude { name, .. } => name,
        }
    }
}

impl Scenario {
    /// Read and parse a scenario file.
    pub fn load(path: &Path) -> Result<Self, String> {
        let text = std::fs::read_to_string(path)
            .map_err(|e| format!("cannot read {}: {e}", path.display()))?;
        Self::parse(&text).map_err(|e| format!("{}: {e}", path.display()))
    }

    /// Parse scenario JSON.
    pub fn parse(text: &str) -> Result<Self, String> {
        serde_json::from_str(text).map_err(|e| format!("invalid scenario: {e}"))
    }

    /// Build the initial world. Entities are inserted in file order, so the
    /// file order is also the identity order.
    pub fn build_world(&self, config: &SimConfig) -> Result<World, String> {
        if self.cols <= 0 || self.rows <= 0 {
            return Err(format!(
                "grid must be at least 1x1, got {}x{}",
                self.cols, self.rows
            ));
        }
        let terrain = self
            .terrain
            .as_deref()
            .map(Terrain::new)
            .unwrap_or_default();
        let mut world = World::new(self.cols, self.rows, terrain);

        for (y, row) in self.terrain_rows.iter().take(self.rows as usize).enumerate() {
            for (x, key) in row.split_whitespace().take(self.cols as usize).enumerate() {
                world
                    .set_terrain(Position::new(x as i32, y as i32), Terrain::new(key))
                    .map_err(|e| format!("terrain row {y}: {e}"))?;
            }
        }

        for spec in &self.entities {
            spec.validate()?;
            world
                .try_add_entity(spec.to_entity(config))
                .map_err(|e| format!("entity '{}': {e}", spec.name()))?;
        }
        Ok(world)
    }
}
