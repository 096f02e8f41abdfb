//! Discrete-event simulation for Grovewright.
//!
//! A virtual clock and a priority queue of time-stamped, entity-tagged
//! [`Action`]s drive the per-kind behaviors of the entities living in a
//! [`gw_core::World`]. Behaviors may schedule further actions while the queue
//! is being drained; those fire in the same [`Simulation::advance`] call when
//! their due time falls inside the advance window.

/// Scheduled actions and their dispatch.
pub mod action;
/// Per-kind activity procedures: growth, wandering, harvesting, delivery.
pub mod behavior;
/// Virtual clock used by the scheduler.
pub mod clock;
/// Configuration types for simulation runs.
pub mod config;
/// Mutable context passed to behaviors while an action executes.
pub mod context;
/// Error types for the simulation crate.
pub mod error;
/// Narrative simulation events and the event log.
pub mod event;
/// The event scheduler: time-ordered queue with per-entity cancellation.
pub mod scheduler;
/// Top-level simulation orchestrator.
pub mod simulation;

/// Re-export of [`action::Action`].
pub use action::Action;
/// Re-export of [`clock::SimClock`].
pub use clock::SimClock;
/// Re-export of [`config::SimConfig`].
pub use config::SimConfig;
/// Re-export of [`context::SimContext`].
pub use context::SimContext;
/// Re-exports of [`error::SimError`] and [`error::SimResult`].
pub use error::{SimError, SimResult};
/// Re-exports of [`event::EventLog`], [`event::SimEvent`], and [`event::SimEventKind`].
pub use event::{EventLog, SimEvent, SimEventKind};
/// Re-export of [`scheduler::EventScheduler`].
pub use scheduler::EventScheduler;
/// Re-export of [`simulation::Simulation`].
pub use simulation::Simulation;
