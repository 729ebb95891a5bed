//! Flat world generator and the small farm village placed on top of it.
//!
//! Column layout:
//! - Y = 0: Bedrock
//! - Y = 1-2: Dirt
//! - Y = 3: Grass Block
//! - Y = 4+: Air

use rand::Rng;

use crate::block::{Block, CropKind};
use crate::chunk::ChunkColumn;
use crate::pos::BlockPos;
use crate::storage::BlockStore;

/// Y of the grass surface.
pub const SURFACE_Y: i32 = 3;

/// Generate a flat chunk column at the given chunk coordinates.
pub fn generate_flat_chunk(x: i32, z: i32) -> ChunkColumn {
    let mut column = ChunkColumn::empty(x, z);
    for lx in 0..16 {
        for lz in 0..16 {
            column.set_block(lx, 0, lz, Block::Bedrock);
            column.set_block(lx, 1, lz, Block::Dirt);
            column.set_block(lx, 2, lz, Block::Dirt);
            column.set_block(lx, SURFACE_Y, lz, Block::GrassBlock);
        }
    }
    column
}

/// Load a square of flat chunks with `radius` chunks around the origin.
pub fn generate_flat_world(radius: i32) -> BlockStore {
    let mut store = BlockStore::new();
    for cx in -radius..=radius {
        for cz in -radius..=radius {
            store.insert_column(generate_flat_chunk(cx, cz));
        }
    }
    store
}

/// Points of interest of a generated village.
#[derive(Debug, Clone, Default)]
pub struct FarmVillage {
    /// Beds, one per villager.
    pub beds: Vec<BlockPos>,
    /// Composters (farmer work stations), one per farm plot.
    pub composters: Vec<BlockPos>,
    /// Village bell (meeting point).
    pub bell: BlockPos,
    /// All farmland tiles.
    pub farmland: Vec<BlockPos>,
}

/// Build a village at `origin` (surface level) with one `farm_size`×`farm_size`
/// plot per farmer and `beds` beds in a row.
///
/// Plots are planted with random crops at random ages so there is both
/// mature and young growth on the first day.
pub fn build_farm_village(
    store: &mut BlockStore,
    origin: BlockPos,
    farm_size: i32,
    farms: usize,
    beds: usize,
    rng: &mut impl Rng,
) -> FarmVillage {
    let mut village = FarmVillage {
        bell: origin.offset(0, 1, 0),
        ..Default::default()
    };
    store.set_block(village.bell, Block::Bell);

    for f in 0..farms as i32 {
        let corner = origin.offset(4 + f * (farm_size + 3), 0, 4);
        // water channel down the middle keeps the plot hydrated
        let channel_x = corner.x + farm_size / 2;
        for dx in 0..farm_size {
            for dz in 0..farm_size {
                let ground = BlockPos::new(corner.x + dx, origin.y, corner.z + dz);
                if ground.x == channel_x {
                    store.set_block(ground, Block::Water);
                    continue;
                }
                store.set_block(ground, Block::Farmland);
                village.farmland.push(ground);
                let kind = match rng.gen_range(0..4) {
                    0 => CropKind::Wheat,
                    1 => CropKind::Potatoes,
                    2 => CropKind::Carrots,
                    _ => CropKind::Beetroots,
                };
                if rng.gen_bool(0.8) {
                    let age = rng.gen_range(0..=kind.max_age());
                    store.set_block(ground.above(), Block::Crop { kind, age });
                }
            }
        }
        let composter = corner.offset(-1, 1, -1);
        store.set_block(composter, Block::Composter);
        village.composters.push(composter);
    }

    for b in 0..beds as i32 {
        let bed = origin.offset(-4 - b * 2, 1, -4);
        store.set_block(bed, Block::Bed { occupied: false });
        village.beds.push(bed);
    }

    village
}
