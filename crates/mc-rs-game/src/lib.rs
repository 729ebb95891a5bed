//! Game logic: ECS world, villager bodies, movement physics, and the host
//! side of the villager AI.

pub mod ai;
pub mod components;
pub mod game_world;
pub mod physics;
