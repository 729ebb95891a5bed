//! ECS components for villagers and dropped items.

use bevy_ecs::prelude::*;

use mc_rs_ai::level::EntityId;
use mc_rs_ai::mob::{Mob, Profession, VillagerMob};
use mc_rs_ai::navigation::PathNavigation;
use mc_rs_ai::Brain;
use mc_rs_world::item::{ItemStack, SimpleContainer};
use mc_rs_world::physics::{EntityDimensions, VILLAGER_HEIGHT, VILLAGER_WIDTH};
use mc_rs_world::pos::{BlockPos, Vec3};

use crate::ai::pathfinding::GroundNavigation;

/// Villager inventory slots.
pub const VILLAGER_INVENTORY_SIZE: usize = 8;

/// Height of a villager lying in a bed above the bed block's floor.
const SLEEPING_Y_OFFSET: f64 = 0.5625;

/// Body state of a villager. Implements the agent traits its brain drives.
#[derive(Component, Debug)]
pub struct Villager {
    pub id: EntityId,
    /// Feet position.
    pub position: Vec3,
    pub motion: Vec3,
    pub on_ground: bool,
    pub in_water: bool,
    pub discard_friction: bool,
    pub yaw: f32,
    pub head_yaw: f32,
    pub pitch: f32,
    /// Jump requested for the next movement step.
    pub jumping: bool,
    pub horizontal_collision: bool,
    pub profession: Profession,
    pub inventory: SimpleContainer,
    pub sleeping_in: Option<BlockPos>,
    pub navigation: GroundNavigation,
}

impl Villager {
    pub fn new(id: EntityId, position: Vec3, profession: Profession) -> Self {
        Self {
            id,
            position,
            motion: Vec3::ZERO,
            on_ground: false,
            in_water: false,
            discard_friction: false,
            yaw: 0.0,
            head_yaw: 0.0,
            pitch: 0.0,
            jumping: false,
            horizontal_collision: false,
            profession,
            inventory: SimpleContainer::new(VILLAGER_INVENTORY_SIZE),
            sleeping_in: None,
            navigation: GroundNavigation::new(),
        }
    }
}

impl Mob for Villager {
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
        let d = target - self.eye_position();
        let horizontal = d.horizontal_distance_sqr().sqrt();
        self.yaw = (d.z.atan2(d.x).to_degrees() - 90.0) as f32;
        self.head_yaw = self.yaw;
        self.pitch = (-d.y.atan2(horizontal).to_degrees()) as f32;
    }

    fn jump(&mut self) {
        self.jumping = true;
    }

    fn navigation(&mut self) -> &mut dyn PathNavigation {
        &mut self.navigation
    }
}

impl VillagerMob for Villager {
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
        self.position = Vec3::new(
            f64::from(bed.x) + 0.5,
            f64::from(bed.y) + SLEEPING_Y_OFFSET,
            f64::from(bed.z) + 0.5,
        );
        self.motion = Vec3::ZERO;
        self.navigation.stop();
    }

    fn stop_sleeping(&mut self) {
        if let Some(bed) = self.sleeping_in.take() {
            self.position = bed.above().bottom_center();
        }
    }
}

/// The villager's brain.
#[derive(Component, Debug)]
pub struct VillagerBrain(pub Brain<Villager>);

/// Health points.
#[derive(Component, Debug, Clone, Copy)]
pub struct Health {
    pub current: f32,
    pub max: f32,
    /// Tick of the last damage taken (invulnerability frames).
    pub last_damage_tick: Option<u64>,
}

impl Health {
    pub fn new(max: f32) -> Self {
        Self {
            current: max,
            max,
            last_damage_tick: None,
        }
    }
}

/// Marker: this entity is dead (pending cleanup).
#[derive(Component, Debug)]
pub struct Dead;

/// Ticks before a thrown item can be picked up.
pub const THROWN_PICKUP_DELAY: u32 = 40;

/// Ticks before a block drop can be picked up.
pub const DROP_PICKUP_DELAY: u32 = 10;

/// Age at which an item on the ground despawns.
pub const ITEM_LIFETIME: u32 = 6000;

/// An item stack lying in (or flying through) the world.
#[derive(Component, Debug, Clone)]
pub struct DroppedItem {
    pub stack: ItemStack,
    pub position: Vec3,
    pub motion: Vec3,
    pub on_ground: bool,
    pub pickup_delay: u32,
    pub age: u32,
}

impl DroppedItem {
    pub fn new(stack: ItemStack, position: Vec3, motion: Vec3, pickup_delay: u32) -> Self {
        Self {
            stack,
            position,
            motion,
            on_ground: false,
            pickup_delay,
            age: 0,
        }
    }
}
