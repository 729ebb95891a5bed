//! World model for the villager simulation: positions, blocks, items,
//! chunk storage, flat generation and random block ticks.

pub mod block;
pub mod block_tick;
pub mod chunk;
pub mod flat_generator;
pub mod item;
pub mod physics;
pub mod pos;
pub mod storage;

pub use block::{Block, CropKind};
pub use item::{Item, ItemStack, SimpleContainer};
pub use pos::{BlockPos, Vec3};
pub use storage::BlockStore;
