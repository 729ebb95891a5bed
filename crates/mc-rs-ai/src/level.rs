//! World services consumed by behaviors.

use mc_rs_world::block::Block;
use mc_rs_world::item::ItemStack;
use mc_rs_world::physics::Aabb;
use mc_rs_world::pos::{BlockPos, Vec3};

use serde::Serialize;

use crate::mob::Profession;

/// Stable runtime id of an entity.
pub type EntityId = u64;

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum EntityKind {
    Villager,
    Zombie,
    Player,
}

/// Read-only view of another entity, taken once per tick by the host.
#[derive(Debug, Clone, PartialEq)]
pub struct EntitySnapshot {
    pub id: EntityId,
    pub kind: EntityKind,
    pub position: Vec3,
    /// Hitbox width.
    pub width: f64,
    /// Eye height above the feet.
    pub eye_height: f64,
    /// Villager profession, `None` for other kinds.
    pub profession: Option<Profession>,
    pub wants_more_food: bool,
    pub sleeping: bool,
}

impl EntitySnapshot {
    pub fn eye_position(&self) -> Vec3 {
        self.position + Vec3::new(0.0, self.eye_height, 0.0)
    }
}

/// Something a mob can look or walk at.
#[derive(Debug, Clone, PartialEq)]
pub enum PositionTracker {
    Block(BlockPos),
    /// Follows an entity; `last_known` is used when the entity is gone.
    Entity { id: EntityId, last_known: Vec3 },
}

impl PositionTracker {
    pub fn entity(snapshot: &EntitySnapshot) -> Self {
        PositionTracker::Entity {
            id: snapshot.id,
            last_known: snapshot.eye_position(),
        }
    }

    /// Current target point (block center or entity eyes).
    pub fn position(&self, level: &dyn Level) -> Vec3 {
        match self {
            PositionTracker::Block(pos) => pos.center(),
            PositionTracker::Entity { id, last_known } => level
                .entity(*id)
                .map(|e| e.eye_position())
                .unwrap_or(*last_known),
        }
    }

    pub fn block_position(&self, level: &dyn Level) -> BlockPos {
        match self {
            PositionTracker::Block(pos) => *pos,
            PositionTracker::Entity { .. } => BlockPos::containing(self.position(level)),
        }
    }

    /// Blocks are always visible; entities only while they exist.
    pub fn is_visible(&self, level: &dyn Level) -> bool {
        match self {
            PositionTracker::Block(_) => true,
            PositionTracker::Entity { id, .. } => level.entity(*id).is_some(),
        }
    }
}

/// Where a mob wants to walk, how fast, and how close counts as arrived.
#[derive(Debug, Clone, PartialEq)]
pub struct WalkTarget {
    pub target: PositionTracker,
    pub speed_modifier: f64,
    /// Manhattan distance in blocks that counts as reached.
    pub close_enough_dist: i32,
}

impl WalkTarget {
    pub fn block(pos: BlockPos, speed_modifier: f64, close_enough_dist: i32) -> Self {
        Self {
            target: PositionTracker::Block(pos),
            speed_modifier,
            close_enough_dist,
        }
    }
}

/// Sounds emitted by behaviors.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize)]
#[serde(rename_all = "snake_case")]
pub enum Sound {
    CropPlanted,
    LongJump,
    LongJumpLand,
    VillagerTrade,
    Attack,
}

/// World queries and mutations available to behaviors and sensors.
pub trait Level {
    fn block(&self, pos: BlockPos) -> Block;

    /// Replace a block. Returns false when the position is not loaded.
    fn set_block(&mut self, pos: BlockPos, block: Block) -> bool;

    /// Break a block, optionally spawning its drops. `by` is the breaking entity.
    fn destroy_block(&mut self, pos: BlockPos, drop_items: bool, by: Option<EntityId>) -> bool;

    fn is_loaded(&self, pos: BlockPos) -> bool;

    fn day_time(&self) -> u64;

    fn play_sound(&mut self, pos: Vec3, sound: Sound);

    /// Spawn an item stack at `from` moving toward `toward`.
    fn throw_item(&mut self, from: Vec3, stack: ItemStack, toward: Vec3);

    /// Entities within `radius` of `center`, in no particular order.
    fn nearby_entities(&self, center: Vec3, radius: f64) -> Vec<EntitySnapshot>;

    fn entity(&self, id: EntityId) -> Option<EntitySnapshot>;

    /// Deal damage. Returns whether the hit landed.
    fn hurt(&mut self, target: EntityId, attacker: EntityId, amount: f32) -> bool;

    /// Whether mobs may change blocks.
    fn mob_griefing(&self) -> bool {
        true
    }

    /// Whether `aabb` overlaps no block collision shape.
    fn no_collision(&self, aabb: &Aabb) -> bool {
        aabb.intersecting_blocks()
            .all(|pos| !aabb.intersects_block(pos, self.block(pos).collision_height()))
    }

    /// Ray march from `from` to `to` in quarter-block steps through non-solid blocks.
    fn has_line_of_sight(&self, from: Vec3, to: Vec3) -> bool {
        let delta = to - from;
        let steps = (delta.length() / 0.25).ceil() as usize;
        if steps == 0 {
            return true;
        }
        let step = delta.scale(1.0 / steps as f64);
        let target = BlockPos::containing(to);
        (1..steps).all(|i| {
            let pos = BlockPos::containing(from + step.scale(i as f64));
            pos == target || !self.block(pos).is_solid_render()
        })
    }
}
