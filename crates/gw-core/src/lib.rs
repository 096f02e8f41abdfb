//! Core types for Grovewright: positions, entities, and the grid world model.
//!
//! This crate defines the spatial half of the simulator. It knows nothing
//! about simulated time; the only thing it needs from the scheduler is the
//! ability to cancel an entity's pending events, expressed through the
//! [`EventCanceller`] trait.

/// Entity kinds, identifiers, and per-entity state.
pub mod entity;
/// Error types used throughout the crate.
pub mod error;
/// Integer grid positions and distance helpers.
pub mod position;
/// Decorative terrain layer cells.
pub mod terrain;
/// The grid world model that owns the occupancy layer and the live entity set.
pub mod world;

/// Re-export core entity types.
pub use entity::{Entity, EntityId, EntityKind};
/// Re-export error types.
pub use error::{WorldError, WorldResult};
/// Re-export the position type.
pub use position::Position;
/// Re-export the terrain cell type.
pub use terrain::Terrain;
/// Re-export world model types.
pub use world::{EventCanceller, World};
