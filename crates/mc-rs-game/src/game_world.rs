//! ECS game world: bevy_ecs World, villager management, tick systems, and event bus.

use std::sync::atomic::{AtomicU64, Ordering};

use bevy_ecs::prelude::*;
use rand::rngs::StdRng;
use rand::SeedableRng;
use serde::Serialize;
use tracing::{debug, info};

use mc_rs_ai::activity::{Activity, DAY_LENGTH};
use mc_rs_ai::config::AiConfig;
use mc_rs_ai::level::{EntityId, Sound};
use mc_rs_ai::memory::keys::{HOME, HURT_BY, HURT_BY_ENTITY, JOB_SITE, MEETING_POINT};
use mc_rs_ai::mob::{Mob, Profession, VillagerMob};
use mc_rs_ai::{Brain, BrainError};
use mc_rs_world::block::Block;
use mc_rs_world::block_tick::{tick_random_blocks, DEFAULT_RANDOM_TICK_SPEED};
use mc_rs_world::item::{ItemStack, SimpleContainer};
use mc_rs_world::physics::{
    Aabb, EntityDimensions, AIR_FRICTION, GRAVITY, GROUND_FRICTION, JUMP_VELOCITY, VERTICAL_DRAG,
};
use mc_rs_world::pos::{BlockPos, Vec3};
use mc_rs_world::storage::BlockStore;

use crate::ai::system::{system_ai_tick, system_stop_dead_brains};
use crate::ai::villager_brain::create_villager_brain;
use crate::components::*;
use crate::physics;

/// Villager health.
pub const VILLAGER_MAX_HEALTH: f32 = 20.0;

/// Ticks after a hit during which further hits are ignored.
const INVULNERABLE_TICKS: u64 = 10;

/// How long a hit keeps the villager scared.
const HURT_MEMORY_TICKS: u64 = 100;

/// Horizontal velocity per unit of speed modifier while following a path.
const WALK_SPEED_SCALE: f64 = 0.2;

const ITEM_DIMENSIONS: EntityDimensions = EntityDimensions::new(0.25, 0.25);

// ---------------------------------------------------------------------------
// Resources
// ---------------------------------------------------------------------------

/// Outgoing events queued by ECS operations for the host to consume.
#[derive(Resource, Default)]
pub struct OutgoingEvents {
    pub events: Vec<GameEvent>,
}

/// Global tick counter (incremented every 50 ms).
#[derive(Resource, Default)]
pub struct TickCounter(pub u64);

/// Time of day; wraps every [`DAY_LENGTH`] ticks.
#[derive(Resource, Default)]
pub struct DayTime(pub u64);

/// The world's blocks.
#[derive(Resource, Default)]
pub struct WorldBlocks(pub BlockStore);

#[derive(Resource, Debug, Clone, Copy)]
pub struct GameRules {
    pub mob_griefing: bool,
    pub random_tick_speed: u32,
}

impl Default for GameRules {
    fn default() -> Self {
        Self {
            mob_griefing: true,
            random_tick_speed: DEFAULT_RANDOM_TICK_SPEED,
        }
    }
}

/// Random source of the villager brains.
#[derive(Resource)]
pub struct AiRandom(pub StdRng);

/// Random source of block ticks and item drops.
#[derive(Resource)]
pub struct WorldRandom(pub StdRng);

/// Thread-safe entity ID allocator.
#[derive(Resource)]
pub struct EntityIdAllocator {
    next: AtomicU64,
}

impl EntityIdAllocator {
    pub fn new(start: u64) -> Self {
        Self {
            next: AtomicU64::new(start),
        }
    }

    /// Allocate the next unique entity ID.
    pub fn allocate(&self) -> u64 {
        self.next.fetch_add(1, Ordering::Relaxed)
    }

    /// Current value (next ID that will be allocated).
    pub fn current(&self) -> u64 {
        self.next.load(Ordering::Relaxed)
    }
}

// ---------------------------------------------------------------------------
// Game events
// ---------------------------------------------------------------------------

/// Events produced by the game world.
#[derive(Debug, Clone, PartialEq, Serialize)]
#[serde(tag = "event", rename_all = "snake_case")]
pub enum GameEvent {
    VillagerSpawned {
        id: EntityId,
        position: Vec3,
        profession: Profession,
    },
    VillagerMoved {
        id: EntityId,
        position: Vec3,
        on_ground: bool,
    },
    BlockChanged {
        pos: BlockPos,
        block: Block,
    },
    SoundPlayed {
        position: Vec3,
        sound: Sound,
    },
    ItemDropped {
        position: Vec3,
        stack: ItemStack,
    },
    ItemPickedUp {
        villager: EntityId,
        stack: ItemStack,
    },
    ActivityChanged {
        villager: EntityId,
        from: Activity,
        to: Activity,
    },
    VillagerHurt {
        id: EntityId,
        attacker: EntityId,
        health: f32,
    },
    VillagerDied {
        id: EntityId,
    },
}

// ---------------------------------------------------------------------------
// GameWorld
// ---------------------------------------------------------------------------

/// Where and how a villager enters the world.
#[derive(Debug, Clone, Default)]
pub struct VillagerSpawn {
    pub position: Vec3,
    pub profession: Profession,
    pub home: Option<BlockPos>,
    pub job_site: Option<BlockPos>,
    pub meeting_point: Option<BlockPos>,
    pub inventory: Vec<ItemStack>,
}

/// The ECS game world.
pub struct GameWorld {
    pub world: World,
    ai_config: AiConfig,
}

impl GameWorld {
    /// Create a world over `blocks`. All randomness derives from `seed`.
    pub fn new(blocks: BlockStore, seed: u64, ai_config: AiConfig) -> Self {
        let mut world = World::new();
        world.insert_resource(OutgoingEvents::default());
        world.insert_resource(TickCounter::default());
        world.insert_resource(DayTime::default());
        world.insert_resource(WorldBlocks(blocks));
        world.insert_resource(GameRules::default());
        world.insert_resource(AiRandom(StdRng::seed_from_u64(seed)));
        world.insert_resource(WorldRandom(StdRng::seed_from_u64(seed.wrapping_add(1))));
        world.insert_resource(EntityIdAllocator::new(1));

        Self { world, ai_config }
    }

    /// Run one game tick: AI, movement, items, crop growth, dead cleanup.
    pub fn tick(&mut self) {
        self.world.resource_mut::<TickCounter>().0 += 1;
        {
            let mut day = self.world.resource_mut::<DayTime>();
            day.0 = (day.0 + 1) % DAY_LENGTH;
        }
        system_ai_tick(&mut self.world);
        system_villager_movement(&mut self.world);
        system_item_physics(&mut self.world);
        system_item_pickup(&mut self.world);
        system_crop_growth(&mut self.world);
        system_stop_dead_brains(&mut self.world);
        system_cleanup_dead(&mut self.world);
    }

    /// Drain all pending outgoing events.
    pub fn drain_events(&mut self) -> Vec<GameEvent> {
        std::mem::take(&mut self.world.resource_mut::<OutgoingEvents>().events)
    }

    /// Return the current tick count.
    pub fn current_tick(&self) -> u64 {
        self.world.resource::<TickCounter>().0
    }

    pub fn day_time(&self) -> u64 {
        self.world.resource::<DayTime>().0
    }

    pub fn set_day_time(&mut self, day_time: u64) {
        self.world.resource_mut::<DayTime>().0 = day_time % DAY_LENGTH;
    }

    pub fn game_rules_mut(&mut self) -> Mut<'_, GameRules> {
        self.world.resource_mut::<GameRules>()
    }

    pub fn blocks(&self) -> &BlockStore {
        &self.world.resource::<WorldBlocks>().0
    }

    pub fn blocks_mut(&mut self) -> &mut BlockStore {
        &mut self.world.resource_mut::<WorldBlocks>().into_inner().0
    }

    /// Spawn a villager with a fresh brain. Returns its entity id.
    pub fn spawn_villager(&mut self, spawn: VillagerSpawn) -> Result<EntityId, BrainError> {
        let mut brain = create_villager_brain(&self.ai_config)?;
        let id = self.world.resource::<EntityIdAllocator>().allocate();

        let mut villager = Villager::new(id, spawn.position, spawn.profession);
        for stack in spawn.inventory {
            villager.inventory.add_item(stack);
        }
        let memories = brain.memories_mut();
        memories.set_optional(HOME, spawn.home);
        memories.set_optional(JOB_SITE, spawn.job_site);
        memories.set_optional(MEETING_POINT, spawn.meeting_point);

        self.world
            .spawn((villager, VillagerBrain(brain), Health::new(VILLAGER_MAX_HEALTH)));
        info!(id, profession = ?spawn.profession, "villager spawned");

        self.world
            .resource_mut::<OutgoingEvents>()
            .events
            .push(GameEvent::VillagerSpawned {
                id,
                position: spawn.position,
                profession: spawn.profession,
            });
        Ok(id)
    }

    /// Deal damage to a villager. Returns remaining health, or `None` if
    /// invulnerable or not found.
    pub fn hurt(&mut self, target: EntityId, attacker: EntityId, amount: f32) -> Option<f32> {
        apply_damage(&mut self.world, target, attacker, amount)
    }

    /// Inspect a living villager and its brain.
    pub fn with_villager<R>(&mut self, id: EntityId, f: impl FnOnce(&Villager, &Brain<Villager>) -> R) -> Option<R> {
        let mut query = self
            .world
            .query_filtered::<(&Villager, &VillagerBrain), Without<Dead>>();
        query
            .iter(&self.world)
            .find(|(v, _)| v.id == id)
            .map(|(v, b)| f(v, &b.0))
    }

    /// Modify a living villager and its brain.
    pub fn with_villager_mut<R>(
        &mut self,
        id: EntityId,
        f: impl FnOnce(&mut Villager, &mut Brain<Villager>) -> R,
    ) -> Option<R> {
        let mut query = self
            .world
            .query_filtered::<(&mut Villager, &mut VillagerBrain), Without<Dead>>();
        query
            .iter_mut(&mut self.world)
            .find(|(v, _)| v.id == id)
            .map(|(mut v, mut b)| f(&mut v, &mut b.0))
    }

    pub fn villager_position(&mut self, id: EntityId) -> Option<Vec3> {
        self.with_villager(id, |v, _| v.position)
    }

    pub fn villager_inventory(&mut self, id: EntityId) -> Option<SimpleContainer> {
        self.with_villager(id, |v, _| v.inventory.clone())
    }

    pub fn activity(&mut self, id: EntityId) -> Option<Activity> {
        self.with_villager(id, |_, b| b.activities().active())
    }

    /// Ids of the living villagers.
    pub fn villagers(&mut self) -> Vec<EntityId> {
        let mut query = self.world.query_filtered::<&Villager, Without<Dead>>();
        query.iter(&self.world).map(|v| v.id).collect()
    }

    /// Item stacks lying in the world.
    pub fn dropped_items(&mut self) -> Vec<ItemStack> {
        let mut query = self.world.query::<&DroppedItem>();
        query.iter(&self.world).map(|i| i.stack).collect()
    }
}

/// Damage a villager, remembering the attacker. Shared by
/// [`GameWorld::hurt`] and hits landed by behaviors.
pub(crate) fn apply_damage(world: &mut World, target: EntityId, attacker: EntityId, amount: f32) -> Option<f32> {
    let tick = world.resource::<TickCounter>().0;
    let entity = {
        let mut query = world.query_filtered::<(Entity, &Villager), Without<Dead>>();
        query.iter(world).find(|(_, v)| v.id == target).map(|(e, _)| e)?
    };

    let new_health = {
        let mut health = world.get_mut::<Health>(entity)?;
        if let Some(last) = health.last_damage_tick {
            if tick.saturating_sub(last) < INVULNERABLE_TICKS {
                return None;
            }
        }
        health.current = (health.current - amount).max(0.0);
        health.last_damage_tick = Some(tick);
        health.current
    };

    if let Some(mut brain) = world.get_mut::<VillagerBrain>(entity) {
        let memories = brain.0.memories_mut();
        memories.set_with_expiry(HURT_BY, attacker, HURT_MEMORY_TICKS);
        memories.set(HURT_BY_ENTITY, attacker);
    }
    debug!(target, attacker, amount, health = new_health, "villager hurt");

    world.resource_mut::<OutgoingEvents>().events.push(GameEvent::VillagerHurt {
        id: target,
        attacker,
        health: new_health,
    });
    if new_health <= 0.0 {
        info!(id = target, attacker, "villager died");
        world.entity_mut(entity).insert(Dead);
        world
            .resource_mut::<OutgoingEvents>()
            .events
            .push(GameEvent::VillagerDied { id: target });
    }
    Some(new_health)
}

// ---------------------------------------------------------------------------
// Systems (manual, called by GameWorld::tick)
// ---------------------------------------------------------------------------

/// Follow paths, apply jumps, gravity and friction, and collide with blocks.
fn system_villager_movement(world: &mut World) {
    world.resource_scope(|world, blocks: Mut<WorldBlocks>| {
        let mut moves = Vec::new();
        let mut query = world.query_filtered::<&mut Villager, Without<Dead>>();

        for mut villager in query.iter_mut(world) {
            if villager.is_sleeping() {
                villager.motion = Vec3::ZERO;
                villager.jumping = false;
                continue;
            }

            let mut motion = villager.motion;
            let position = villager.position;
            if let Some(steering) = villager.navigation.steer(position) {
                if villager.on_ground || villager.in_water {
                    let speed = steering.speed_modifier * WALK_SPEED_SCALE;
                    motion.x = steering.direction.x * speed;
                    motion.z = steering.direction.z * speed;
                }
                if steering.jump || villager.horizontal_collision {
                    villager.jumping = true;
                }
                let yaw = (steering.direction.z.atan2(steering.direction.x).to_degrees() - 90.0) as f32;
                villager.yaw = yaw;
            }
            if villager.jumping {
                if villager.on_ground {
                    motion.y = JUMP_VELOCITY + villager.jump_boost_power();
                } else if villager.in_water {
                    motion.y += 0.04;
                }
                villager.jumping = false;
            }

            let dims = villager.dimensions();
            let result = physics::move_entity(&blocks.0, dims, position, motion, villager.on_ground);
            villager.position = result.position;
            villager.on_ground = result.on_ground;
            villager.horizontal_collision = result.horizontal_collision;
            villager.in_water = physics::in_water(&blocks.0, &dims.make_bounding_box(result.position));

            let mut motion = result.motion;
            if villager.in_water {
                motion = Vec3::new(motion.x * 0.8, motion.y * 0.8 - 0.02, motion.z * 0.8);
            } else {
                motion.y = (motion.y - GRAVITY) * VERTICAL_DRAG;
                if !villager.discard_friction {
                    let friction = if villager.on_ground { GROUND_FRICTION } else { AIR_FRICTION };
                    motion.x *= friction;
                    motion.z *= friction;
                }
            }
            villager.motion = motion;

            if result.position.distance_to_sqr(position) > 0.001 * 0.001 {
                moves.push(GameEvent::VillagerMoved {
                    id: villager.id,
                    position: result.position,
                    on_ground: result.on_ground,
                });
            }
        }

        world.resource_mut::<OutgoingEvents>().events.extend(moves);
    });
}

/// Move dropped items, count down pickup delays and despawn old items.
fn system_item_physics(world: &mut World) {
    world.resource_scope(|world, blocks: Mut<WorldBlocks>| {
        let mut expired = Vec::new();
        let mut query = world.query::<(Entity, &mut DroppedItem)>();
        for (entity, mut item) in query.iter_mut(world) {
            item.age += 1;
            if item.age >= ITEM_LIFETIME {
                expired.push(entity);
                continue;
            }
            item.pickup_delay = item.pickup_delay.saturating_sub(1);

            let result = physics::move_entity(&blocks.0, ITEM_DIMENSIONS, item.position, item.motion, item.on_ground);
            item.position = result.position;
            item.on_ground = result.on_ground;
            let friction = if result.on_ground { 0.6 * 0.98 } else { 0.98 };
            item.motion = Vec3::new(
                result.motion.x * friction,
                (result.motion.y - 0.04) * 0.98,
                result.motion.z * friction,
            );
        }
        for entity in expired {
            world.despawn(entity);
        }
    });
}

/// Box around a villager within which it collects items.
fn pickup_box(villager: &Villager) -> Aabb {
    let b = villager.bounding_box();
    Aabb {
        min_x: b.min_x - 1.0,
        max_x: b.max_x + 1.0,
        min_y: b.min_y - 0.5,
        max_y: b.max_y + 0.5,
        min_z: b.min_z - 1.0,
        max_z: b.max_z + 1.0,
    }
}

fn contains(aabb: &Aabb, p: Vec3) -> bool {
    (aabb.min_x..=aabb.max_x).contains(&p.x)
        && (aabb.min_y..=aabb.max_y).contains(&p.y)
        && (aabb.min_z..=aabb.max_z).contains(&p.z)
}

/// Villagers collect nearby items they want and have room for.
fn system_item_pickup(world: &mut World) {
    let mut items: Vec<(Entity, DroppedItem)> = world
        .query::<(Entity, &DroppedItem)>()
        .iter(world)
        .filter(|(_, i)| i.pickup_delay == 0)
        .map(|(e, i)| (e, i.clone()))
        .collect();
    if items.is_empty() {
        return;
    }

    let mut events = Vec::new();
    let mut touched = Vec::new();
    let mut query = world.query_filtered::<&mut Villager, Without<Dead>>();
    for mut villager in query.iter_mut(world) {
        if villager.is_sleeping() {
            continue;
        }
        let reach = pickup_box(&villager);
        for (entity, item) in items.iter_mut() {
            if item.stack.is_empty()
                || !contains(&reach, item.position)
                || !villager.wants_to_pick_up(item.stack.item)
                || !villager.inventory.can_add(&item.stack)
            {
                continue;
            }
            let before = item.stack.count;
            let rest = villager.inventory.add_item(item.stack);
            let taken = before - rest.map_or(0, |r| r.count);
            item.stack.count -= taken;
            if taken > 0 {
                events.push(GameEvent::ItemPickedUp {
                    villager: villager.id,
                    stack: ItemStack::new(item.stack.item, taken),
                });
                touched.push(*entity);
            }
        }
    }

    for (entity, item) in items {
        if !touched.contains(&entity) {
            continue;
        }
        if item.stack.is_empty() {
            world.despawn(entity);
        } else if let Some(mut on_ground) = world.get_mut::<DroppedItem>(entity) {
            on_ground.stack = item.stack;
        }
    }
    world.resource_mut::<OutgoingEvents>().events.extend(events);
}

/// Random block ticks: crops grow.
fn system_crop_growth(world: &mut World) {
    let speed = world.resource::<GameRules>().random_tick_speed;
    if speed == 0 {
        return;
    }
    let Some(mut random) = world.remove_resource::<WorldRandom>() else {
        return;
    };
    let changes = tick_random_blocks(&mut world.resource_mut::<WorldBlocks>().0, speed, &mut random.0);
    world.insert_resource(random);
    world
        .resource_mut::<OutgoingEvents>()
        .events
        .extend(changes.into_iter().map(|c| GameEvent::BlockChanged {
            pos: c.pos,
            block: c.block,
        }));
}

/// Remove dead entities after their death events have been emitted.
fn system_cleanup_dead(world: &mut World) {
    let dead_entities: Vec<Entity> = world
        .query_filtered::<Entity, With<Dead>>()
        .iter(world)
        .collect();
    for entity in dead_entities {
        world.despawn(entity);
    }
}

// ---------------------------------------------------------------------------
// Tests
// ---------------------------------------------------------------------------
