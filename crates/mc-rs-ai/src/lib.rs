//! Villager AI: memory-gated behaviors scheduled by a brain.
//!
//! A [`Brain`] owns an agent's [`Memories`], its [`Activities`] and the
//! behaviors registered per activity. Each tick it expires memories, runs
//! sensors, ticks running behaviors and starts the eligible ones in
//! priority order. Behaviors see the world only through the [`Level`],
//! [`Mob`] and [`PathNavigation`] traits.

pub mod activity;
pub mod behavior;
pub mod behaviors;
pub mod brain;
pub mod composite;
pub mod config;
pub mod error;
pub mod level;
pub mod memory;
pub mod mob;
pub mod navigation;
pub mod random_pos;
pub mod sensor;
pub mod weighted;

#[cfg(test)]
pub(crate) mod testing;

pub use activity::{Activities, Activity, ActivityRequest, Schedule};
pub use behavior::{Behavior, BehaviorContext, BehaviorControl, BehaviorStatus, BoxedBehavior, Task};
pub use brain::Brain;
pub use config::AiConfig;
pub use error::{BrainError, ConfigError};
pub use level::{EntityId, EntityKind, EntitySnapshot, Level, PositionTracker, Sound, WalkTarget};
pub use memory::{Memories, MemoryId, MemoryKey, MemoryStatus};
pub use mob::{Mob, Profession, VillagerMob};
pub use navigation::{Path, PathNavigation, PathType};
pub use sensor::Sensor;
