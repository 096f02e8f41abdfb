use gw_core::{EntityId, EntityKind, WorldError};

/// Alias for `Result<T, SimError>`.
pub type SimResult<T> = Result<T, SimError>;

/// Errors raised while executing scheduled actions.
///
/// None of these occur in a correctly wired simulation; they surface
/// dispatch mistakes instead of letting them pass silently.
#[derive(Debug, thiserror::Error)]
pub enum SimError {
    /// An activity fired for a kind that has none (house, obstacle, stump).
    #[error("activity not supported for {kind} {entity}")]
    UnsupportedActivity {
        /// The entity the activity was scheduled for.
        entity: EntityId,
        /// Its kind.
        kind: EntityKind,
    },

    /// An animation fired for a static kind.
    #[error("animation not supported for {kind} {entity}")]
    UnsupportedAnimation {
        /// The entity the animation was scheduled for.
        entity: EntityId,
        /// Its kind.
        kind: EntityKind,
    },

    /// An action fired for an entity that is no longer live.
    #[error("action fired for destroyed entity {0}")]
    StaleEntity(EntityId),

    /// A world operation failed.
    #[error(transparent)]
    World(#[from] WorldError),
}
