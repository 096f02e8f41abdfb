use crate::entity::EntityId;
use crate::position::Position;

/// Alias for `Result<T, WorldError>`.
pub type WorldResult<T> = Result<T, WorldError>;

/// Errors that can occur when manipulating a world.
#[derive(Debug, Clone, PartialEq, Eq, thiserror::Error)]
pub enum WorldError {
    /// The target cell already holds a live entity.
    #[error("position occupied: {position}")]
    PlacementConflict {
        /// The cell that was already occupied.
        position: Position,
    },

    /// The target cell lies outside the grid.
    #[error("position out of bounds: {position}")]
    OutOfBounds {
        /// The rejected cell.
        position: Position,
    },

    /// The requested entity is not live in this world.
    #[error("entity not found: {0}")]
    EntityNotFound(EntityId),
}
