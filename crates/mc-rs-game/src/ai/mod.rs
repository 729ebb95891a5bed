//! Villager AI host: brain wiring, the level view brains act on, grid
//! pathfinding, and the tick systems.

pub mod level;
pub mod pathfinding;
pub mod system;
pub mod villager_brain;
