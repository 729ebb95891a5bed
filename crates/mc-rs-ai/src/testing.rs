//! In-memory level, navigation and mobs for unit tests.

use std::collections::HashMap;

use rand::rngs::StdRng;
use rand::SeedableRng;

use mc_rs_world::block::Block;
use mc_rs_world::item::{ItemStack, SimpleContainer};
use mc_rs_world::physics::{EntityDimensions, VILLAGER_HEIGHT, VILLAGER_WIDTH};
use mc_rs_world::pos::{BlockPos, Vec3};

use crate::activity::Activities;
use crate::behavior::BehaviorContext;
use crate::level::{EntityId, EntityKind, EntitySnapshot, Level, Sound};
use crate::memory::{Memories, MemoryId};
use crate::mob::{Mob, Profession, VillagerMob};
use crate::navigation::{Path, PathNavigation};

// ---------------------------------------------------------------------------
// TestLevel
// ---------------------------------------------------------------------------

/// Stone up to `floor_y`, air above, with per-block overrides. Every
/// position is loaded. Side effects are recorded for assertions.
pub struct TestLevel {
    floor_y: i32,
    blocks: HashMap<BlockPos, Block>,
    pub entities: Vec<EntitySnapshot>,
    pub sounds: Vec<(Vec3, Sound)>,
    pub thrown: Vec<(Vec3, ItemStack, Vec3)>,
    pub destroyed: Vec<(BlockPos, Block)>,
    pub drops: Vec<ItemStack>,
    pub hurts: Vec<(EntityId, EntityId, f32)>,
    pub day_time: u64,
    pub mob_griefing: bool,
    rng: StdRng,
}

impl TestLevel {
    pub fn flat(floor_y: i32) -> Self {
        Self {
            floor_y,
            blocks: HashMap::new(),
            entities: Vec::new(),
            sounds: Vec::new(),
            thrown: Vec::new(),
            destroyed: Vec::new(),
            drops: Vec::new(),
            hurts: Vec::new(),
            day_time: 0,
            mob_griefing: true,
            rng: StdRng::seed_from_u64(0),
        }
    }

    pub fn put(&mut self, pos: BlockPos, block: Block) {
        self.blocks.insert(pos, block);
    }

    pub fn has_sound(&self, sound: Sound) -> bool {
        self.sounds.iter().any(|(_, s)| *s == sound)
    }
}

impl Level for TestLevel {
    fn block(&self, pos: BlockPos) -> Block {
        match self.blocks.get(&pos) {
            Some(b) => *b,
            None if pos.y <= self.floor_y => Block::Stone,
            None => Block::Air,
        }
    }

    fn set_block(&mut self, pos: BlockPos, block: Block) -> bool {
        self.blocks.insert(pos, block);
        true
    }

    fn destroy_block(&mut self, pos: BlockPos, drop_items: bool, _by: Option<EntityId>) -> bool {
        let old = self.block(pos);
        if old.is_air() {
            return false;
        }
        if drop_items {
            let drops = old.drops(&mut self.rng);
            self.drops.extend(drops);
        }
        self.destroyed.push((pos, old));
        self.blocks.insert(pos, Block::Air);
        true
    }

    fn is_loaded(&self, _pos: BlockPos) -> bool {
        true
    }

    fn day_time(&self) -> u64 {
        self.day_time
    }

    fn play_sound(&mut self, pos: Vec3, sound: Sound) {
        self.sounds.push((pos, sound));
    }

    fn throw_item(&mut self, from: Vec3, stack: ItemStack, toward: Vec3) {
        self.thrown.push((from, stack, toward));
    }

    fn nearby_entities(&self, center: Vec3, radius: f64) -> Vec<EntitySnapshot> {
        self.entities
            .iter()
            .filter(|e| e.position.distance_to_sqr(center) <= radius * radius)
            .cloned()
            .collect()
    }

    fn entity(&self, id: EntityId) -> Option<EntitySnapshot> {
        self.entities.iter().find(|e| e.id == id).cloned()
    }

    fn hurt(&mut self, target: EntityId, attacker: EntityId, amount: f32) -> bool {
        self.hurts.push((target, attacker, amount));
        self.entity(target).is_some()
    }

    fn mob_griefing(&self) -> bool {
        self.mob_griefing
    }
}

pub fn villager_snapshot(id: EntityId, position: Vec3) -> EntitySnapshot {
    EntitySnapshot {
        id,
        kind: EntityKind::Villager,
        position,
        width: VILLAGER_WIDTH,
        eye_height: 1.62,
        profession: Some(Profession::None),
        wants_more_food: false,
        sleeping: false,
    }
}

pub fn zombie_snapshot(id: EntityId, position: Vec3) -> EntitySnapshot {
    EntitySnapshot {
        kind: EntityKind::Zombie,
        profession: None,
        ..villager_snapshot(id, position)
    }
}

// ---------------------------------------------------------------------------
// TestNavigation
// ---------------------------------------------------------------------------

/// Straight-line paths along x then z. Unreachable targets yield a path
/// that stops halfway.
#[derive(Debug, Default)]
pub struct TestNavigation {
    pub unreachable: bool,
    pub stuck: bool,
    pub path: Option<Path>,
    pub speed: f64,
    pub paths_created: u32,
    pub stops: u32,
}

impl TestNavigation {
    /// Mark the current path as walked to the end.
    pub fn finish(&mut self) {
        if let Some(path) = self.path.as_mut() {
            while !path.is_done() {
                path.advance();
            }
        }
    }
}

impl PathNavigation for TestNavigation {
    fn create_path(
        &mut self,
        _level: &dyn Level,
        from: BlockPos,
        target: BlockPos,
        _accuracy: i32,
        _max_range: i32,
    ) -> Option<Path> {
        self.paths_created += 1;
        let end = if self.unreachable {
            BlockPos::new((from.x + target.x) / 2, target.y, (from.z + target.z) / 2)
        } else {
            target
        };
        let mut nodes = Vec::new();
        let mut cur = from;
        while cur != end {
            if cur.x != end.x {
                cur.x += (end.x - cur.x).signum();
            } else if cur.z != end.z {
                cur.z += (end.z - cur.z).signum();
            } else {
                cur.y = end.y;
            }
            nodes.push(cur);
        }
        if nodes.is_empty() {
            nodes.push(from);
        }
        Some(Path::new(nodes, target, !self.unreachable))
    }

    fn move_to(&mut self, path: Path, speed: f64) -> bool {
        if path.is_empty() {
            return false;
        }
        self.path = Some(path);
        self.speed = speed;
        true
    }

    fn path(&self) -> Option<&Path> {
        self.path.as_ref()
    }

    fn is_done(&self) -> bool {
        self.path.as_ref().map_or(true, Path::is_done)
    }

    fn is_stuck(&self) -> bool {
        self.stuck
    }

    fn stop(&mut self) {
        self.stops += 1;
        self.path = None;
    }
}

// ---------------------------------------------------------------------------
// Mobs
// ---------------------------------------------------------------------------

#[derive(Debug)]
pub struct TestMob {
    pub id: EntityId,
    pub position: Vec3,
    pub on_ground: bool,
    pub in_water: bool,
    pub motion: Vec3,
    pub discard_friction: bool,
    pub look: Option<Vec3>,
    pub jumps: u32,
    pub swings: u32,
    pub ranged: bool,
    pub navigation: TestNavigation,
}

impl Default for TestMob {
    fn default() -> Self {
        Self {
            id: 1,
            position: Vec3::new(0.5, 4.0, 0.5),
            on_ground: true,
            in_water: false,
            motion: Vec3::ZERO,
            discard_friction: false,
            look: None,
            jumps: 0,
            swings: 0,
            ranged: false,
            navigation: TestNavigation::default(),
        }
    }
}

impl Mob for TestMob {
    fn id(&self) -> EntityId {
        self.id
    }

    fn position(&self) -> Vec3 {
        self.position
    }

    fn dimensions(&self) -> EntityDimensions {
        EntityDimensions::new(VILLAGER_WIDTH, VILLAGER_HEIGHT)
    }

    fn on_ground(&self) -> bool {
        self.on_ground
    }

    fn in_water(&self) -> bool {
        self.in_water
    }

    fn delta_movement(&self) -> Vec3 {
        self.motion
    }

    fn set_delta_movement(&mut self, motion: Vec3) {
        self.motion = motion;
    }

    fn set_discard_friction(&mut self, discard: bool) {
        self.discard_friction = discard;
    }

    fn look_at(&mut self, target: Vec3) {
        self.look = Some(target);
    }

    fn jump(&mut self) {
        self.jumps += 1;
    }

    fn navigation(&mut self) -> &mut dyn PathNavigation {
        &mut self.navigation
    }

    fn is_holding_ranged_weapon(&self) -> bool {
        self.ranged
    }

    fn swing(&mut self) {
        self.swings += 1;
    }
}

#[derive(Debug, Default)]
pub struct TestVillager {
    pub base: TestMob,
    pub profession: Profession,
    pub inventory: SimpleContainer,
    pub sleeping_in: Option<BlockPos>,
}

impl TestVillager {
    pub fn farmer() -> Self {
        Self {
            profession: Profession::Farmer,
            ..Default::default()
        }
    }
}

impl Mob for TestVillager {
    fn id(&self) -> EntityId {
        self.base.id()
    }

    fn position(&self) -> Vec3 {
        self.base.position()
    }

    fn dimensions(&self) -> EntityDimensions {
        self.base.dimensions()
    }

    fn on_ground(&self) -> bool {
        self.base.on_ground()
    }

    fn in_water(&self) -> bool {
        self.base.in_water()
    }

    fn delta_movement(&self) -> Vec3 {
        self.base.delta_movement()
    }

    fn set_delta_movement(&mut self, motion: Vec3) {
        self.base.set_delta_movement(motion);
    }

    fn set_discard_friction(&mut self, discard: bool) {
        self.base.set_discard_friction(discard);
    }

    fn look_at(&mut self, target: Vec3) {
        self.base.look_at(target);
    }

    fn jump(&mut self) {
        self.base.jump();
    }

    fn navigation(&mut self) -> &mut dyn PathNavigation {
        self.base.navigation()
    }

    fn swing(&mut self) {
        self.base.swing();
    }
}

impl VillagerMob for TestVillager {
    fn profession(&self) -> Profession {
        self.profession
    }

    fn inventory(&self) -> &SimpleContainer {
        &self.inventory
    }

    fn inventory_mut(&mut self) -> &mut SimpleContainer {
        &mut self.inventory
    }

    fn is_sleeping(&self) -> bool {
        self.sleeping_in.is_some()
    }

    fn start_sleeping(&mut self, bed: BlockPos) {
        self.sleeping_in = Some(bed);
        self.base.position = Vec3::new(bed.x as f64 + 0.5, bed.y as f64 + 0.6875, bed.z as f64 + 0.5);
    }

    fn stop_sleeping(&mut self) {
        self.sleeping_in = None;
    }
}

// ---------------------------------------------------------------------------
// Harness
// ---------------------------------------------------------------------------

/// Owns everything a [`BehaviorContext`] borrows.
pub struct Harness<M> {
    pub level: TestLevel,
    pub mob: M,
    pub memories: Memories,
    pub activities: Activities,
    pub random: StdRng,
}

impl<M> Harness<M> {
    pub fn new(mob: M, schema: &[MemoryId]) -> Self {
        Self {
            level: TestLevel::flat(3),
            mob,
            memories: Memories::with_schema(schema.iter().copied()),
            activities: Activities::new(),
            random: StdRng::seed_from_u64(7),
        }
    }

    pub fn reseed(&mut self, seed: u64) {
        self.random = StdRng::seed_from_u64(seed);
    }

    /// Advance the memory clock to `game_time` and borrow a context.
    pub fn ctx(&mut self, game_time: u64) -> BehaviorContext<'_, M> {
        self.memories.tick(game_time);
        BehaviorContext {
            level: &mut self.level,
            mob: &mut self.mob,
            brain: &mut self.memories,
            activities: &mut self.activities,
            random: &mut self.random,
            game_time,
        }
    }
}
