//! Agent accessors consumed by behaviors.

use serde::{Deserialize, Serialize};

use mc_rs_world::block::Block;
use mc_rs_world::item::{Item, SimpleContainer};
use mc_rs_world::physics::{Aabb, EntityDimensions};
use mc_rs_world::pos::{BlockPos, Vec3};

use crate::level::EntityId;
use crate::navigation::{PathNavigation, PathType};

/// Items any villager picks up.
pub const WANTED_ITEMS: [Item; 7] = [
    Item::Bread,
    Item::Potato,
    Item::Carrot,
    Item::Wheat,
    Item::WheatSeeds,
    Item::Beetroot,
    Item::BeetrootSeeds,
];

/// Seeds a farmer can plant, in planting priority order.
pub const FARM_SEEDS: [Item; 4] = [
    Item::WheatSeeds,
    Item::Potato,
    Item::Carrot,
    Item::BeetrootSeeds,
];

/// Food points at or above which a villager shares food.
pub const EXCESS_FOOD_POINTS: u32 = 24;

/// Food points below which a villager wants more food.
pub const WANTED_FOOD_POINTS: u32 = 12;

/// A living entity driven by a brain.
pub trait Mob {
    fn id(&self) -> EntityId;

    /// Feet position.
    fn position(&self) -> Vec3;

    fn block_position(&self) -> BlockPos {
        BlockPos::containing(self.position())
    }

    fn dimensions(&self) -> EntityDimensions;

    fn bounding_box(&self) -> Aabb {
        self.dimensions().make_bounding_box(self.position())
    }

    fn eye_position(&self) -> Vec3 {
        self.position() + Vec3::new(0.0, self.dimensions().height * 0.85, 0.0)
    }

    fn on_ground(&self) -> bool;

    fn in_water(&self) -> bool;

    fn delta_movement(&self) -> Vec3;

    fn set_delta_movement(&mut self, motion: Vec3);

    /// While set, movement ignores ground and air friction.
    fn set_discard_friction(&mut self, discard: bool);

    /// Extra launch speed from jump boost effects.
    fn jump_boost_power(&self) -> f64 {
        0.0
    }

    /// Turn head and body toward `target`.
    fn look_at(&mut self, target: Vec3);

    /// Request a jump on the next movement step.
    fn jump(&mut self);

    fn navigation(&mut self) -> &mut dyn PathNavigation;

    /// Cost of entering a node of `path_type`; negative means impassable.
    fn pathfinding_malus(&self, path_type: PathType) -> f32 {
        path_type.default_malus()
    }

    fn is_holding_ranged_weapon(&self) -> bool {
        false
    }

    fn attack_damage(&self) -> f32 {
        1.0
    }

    /// Play the arm swing animation.
    fn swing(&mut self) {}
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Default, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum Profession {
    #[default]
    None,
    Farmer,
    Nitwit,
}

impl Profession {
    /// Items this profession asks other villagers for.
    pub fn requested_items(self) -> &'static [Item] {
        match self {
            Profession::Farmer => &[
                Item::Wheat,
                Item::WheatSeeds,
                Item::BeetrootSeeds,
                Item::BoneMeal,
            ],
            Profession::None | Profession::Nitwit => &[],
        }
    }

    /// Blocks this profession works around besides its job site.
    pub fn is_secondary_poi(self, block: Block) -> bool {
        matches!((self, block), (Profession::Farmer, Block::Farmland))
    }

    /// The work station block of this profession.
    pub fn job_site_block(self) -> Option<Block> {
        match self {
            Profession::Farmer => Some(Block::Composter),
            Profession::None | Profession::Nitwit => None,
        }
    }
}

/// Villager-specific accessors.
pub trait VillagerMob: Mob {
    fn profession(&self) -> Profession;

    fn inventory(&self) -> &SimpleContainer;

    fn inventory_mut(&mut self) -> &mut SimpleContainer;

    fn is_sleeping(&self) -> bool;

    /// Lie down in the bed at `bed`.
    fn start_sleeping(&mut self, bed: BlockPos);

    fn stop_sleeping(&mut self);

    fn food_points(&self) -> u32 {
        self.inventory()
            .stacks()
            .filter_map(|s| s.item.food_points().map(|p| p * s.count))
            .sum()
    }

    fn has_farm_seeds(&self) -> bool {
        self.inventory().has_any_of(&FARM_SEEDS)
            || self
                .inventory()
                .stacks()
                .any(|s| matches!(s.item, Item::ModdedSeeds(_)))
    }

    fn wants_more_food(&self) -> bool {
        self.food_points() < WANTED_FOOD_POINTS
    }

    fn has_excess_food(&self) -> bool {
        self.food_points() >= EXCESS_FOOD_POINTS
    }

    fn wants_to_pick_up(&self, item: Item) -> bool {
        WANTED_ITEMS.contains(&item) || self.profession().requested_items().contains(&item)
    }
}
