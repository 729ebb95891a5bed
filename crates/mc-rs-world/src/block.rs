//! Block kinds used by the farm world and their physical properties.

use rand::Rng;
use serde::{Deserialize, Serialize};

use crate::item::{Item, ItemStack};

/// Crops that grow on farmland.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub enum CropKind {
    Wheat,
    Potatoes,
    Carrots,
    Beetroots,
    /// A crop registered by a content pack, identified by its pack-local id.
    Modded(u16),
}

impl CropKind {
    /// Final growth stage.
    pub fn max_age(self) -> u8 {
        match self {
            CropKind::Beetroots => 3,
            CropKind::Wheat | CropKind::Potatoes | CropKind::Carrots | CropKind::Modded(_) => 7,
        }
    }

    /// The item that plants this crop.
    pub fn seed(self) -> Item {
        match self {
            CropKind::Wheat => Item::WheatSeeds,
            CropKind::Potatoes => Item::Potato,
            CropKind::Carrots => Item::Carrot,
            CropKind::Beetroots => Item::BeetrootSeeds,
            CropKind::Modded(id) => Item::ModdedSeeds(id),
        }
    }

    /// Items dropped when a crop of this kind is broken at `age`.
    pub fn drops(self, age: u8, rng: &mut impl Rng) -> Vec<ItemStack> {
        if age < self.max_age() {
            return vec![ItemStack::new(self.seed(), 1)];
        }
        match self {
            CropKind::Wheat => vec![
                ItemStack::new(Item::Wheat, 1),
                ItemStack::new(Item::WheatSeeds, rng.gen_range(1..=3)),
            ],
            CropKind::Potatoes => vec![ItemStack::new(Item::Potato, rng.gen_range(2..=5))],
            CropKind::Carrots => vec![ItemStack::new(Item::Carrot, rng.gen_range(2..=5))],
            CropKind::Beetroots => vec![
                ItemStack::new(Item::Beetroot, 1),
                ItemStack::new(Item::BeetrootSeeds, rng.gen_range(1..=3)),
            ],
            CropKind::Modded(id) => vec![ItemStack::new(Item::ModdedSeeds(id), rng.gen_range(1..=2))],
        }
    }
}

/// A block state.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Default, Serialize, Deserialize)]
pub enum Block {
    #[default]
    Air,
    Bedrock,
    Stone,
    Dirt,
    GrassBlock,
    Farmland,
    Crop { kind: CropKind, age: u8 },
    Water,
    Lava,
    Fire,
    OakPlanks,
    OakFence,
    HoneyBlock,
    Bed { occupied: bool },
    Composter,
    Bell,
}

impl Block {
    pub fn is_air(self) -> bool {
        matches!(self, Block::Air)
    }

    /// Whether the block has a full collision shape.
    pub fn is_solid(self) -> bool {
        matches!(
            self,
            Block::Bedrock
                | Block::Stone
                | Block::Dirt
                | Block::GrassBlock
                | Block::Farmland
                | Block::OakPlanks
                | Block::OakFence
                | Block::HoneyBlock
                | Block::Composter
                | Block::Bell
        )
    }

    /// Whether an entity can stand on top of this block.
    pub fn is_solid_render(self) -> bool {
        self.is_solid() && !matches!(self, Block::OakFence | Block::Bell)
    }

    /// Height of the collision shape above the block's floor.
    pub fn collision_height(self) -> f64 {
        match self {
            Block::OakFence => 1.5,
            Block::Farmland => 0.9375,
            Block::Bed { .. } => 0.5625,
            b if b.is_solid() => 1.0,
            _ => 0.0,
        }
    }

    pub fn is_fluid(self) -> bool {
        matches!(self, Block::Water | Block::Lava)
    }

    pub fn is_bed(self) -> bool {
        matches!(self, Block::Bed { .. })
    }

    /// A crop at its final growth stage.
    pub fn is_mature_crop(self) -> bool {
        matches!(self, Block::Crop { kind, age } if age >= kind.max_age())
    }

    /// Items dropped when this block is destroyed.
    pub fn drops(self, rng: &mut impl Rng) -> Vec<ItemStack> {
        match self {
            Block::Crop { kind, age } => kind.drops(age, rng),
            _ => Vec::new(),
        }
    }

    /// Freshly planted state of a crop.
    pub fn planted(kind: CropKind) -> Self {
        Block::Crop { kind, age: 0 }
    }
}
