//! Random block ticks: crop growth on farmland.

use rand::Rng;

use crate::block::Block;
use crate::chunk::SUB_CHUNK_COUNT;
use crate::pos::BlockPos;
use crate::storage::BlockStore;

/// Random ticks per populated sub-chunk per game tick.
pub const DEFAULT_RANDOM_TICK_SPEED: u32 = 3;

/// Chance that a crop receiving a random tick advances one stage.
/// Matches the growth chance of a crop on unhydrated-but-adjacent farmland.
pub const CROP_GROWTH_CHANCE: f64 = 1.0 / 3.0;

/// A block change produced by a random tick.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct BlockChange {
    pub pos: BlockPos,
    pub block: Block,
}

/// Compute the change a random tick at `pos` would cause, if any.
///
/// Crops grow one stage when they sit on farmland and are not yet mature.
pub fn process_random_tick(
    store: &BlockStore,
    pos: BlockPos,
    rng: &mut impl Rng,
) -> Option<BlockChange> {
    let Block::Crop { kind, age } = store.get_block(pos) else {
        return None;
    };
    if age >= kind.max_age() {
        return None;
    }
    if store.get_block(pos.below()) != Block::Farmland {
        return None;
    }
    if !rng.gen_bool(CROP_GROWTH_CHANCE) {
        return None;
    }
    Some(BlockChange {
        pos,
        block: Block::Crop { kind, age: age + 1 },
    })
}

/// Run one game tick of random ticks over every loaded column and apply the
/// resulting changes. Returns the applied changes.
pub fn tick_random_blocks(
    store: &mut BlockStore,
    random_tick_speed: u32,
    rng: &mut impl Rng,
) -> Vec<BlockChange> {
    let mut targets = Vec::new();
    for column in store.columns() {
        for section in column.populated_sections() {
            debug_assert!(section < SUB_CHUNK_COUNT);
            for _ in 0..random_tick_speed {
                let lx = rng.gen_range(0..16);
                let ly = rng.gen_range(0..16);
                let lz = rng.gen_range(0..16);
                targets.push(BlockPos::new(
                    column.x * 16 + lx,
                    section as i32 * 16 + ly,
                    column.z * 16 + lz,
                ));
            }
        }
    }

    let mut changes = Vec::new();
    for pos in targets {
        if let Some(change) = process_random_tick(store, pos, rng) {
            changes.push(change);
        }
    }
    for change in &changes {
        store.set_block(change.pos, change.block);
    }
    changes
}

#[cfg(test)]
mod tests {
    use rand::rngs::StdRng;
    use rand::SeedableRng;

    use super::*;
    use crate::block::CropKind;
    use crate::flat_generator::{generate_flat_world, SURFACE_Y};

    fn store_with_crop(age: u8, soil: Block) -> (BlockStore, BlockPos) {
        let mut store = generate_flat_world(0);
        let soil_pos = BlockPos::new(3, SURFACE_Y, 3);
        store.set_block(soil_pos, soil);
        store.set_block(
            soil_pos.above(),
            Block::Crop {
                kind: CropKind::Wheat,
                age,
            },
        );
        (store, soil_pos.above())
    }

    #[test]
    fn crop_on_farmland_eventually_grows() {
        let (store, pos) = store_with_crop(3, Block::Farmland);
        let mut rng = StdRng::seed_from_u64(9);
        let change = (0..64).find_map(|_| process_random_tick(&store, pos, &mut rng));
        assert_eq!(
            change,
            Some(BlockChange {
                pos,
                block: Block::Crop {
                    kind: CropKind::Wheat,
                    age: 4
                }
            })
        );
    }

    #[test]
    fn crop_without_farmland_does_not_grow() {
        let (store, pos) = store_with_crop(3, Block::Dirt);
        let mut rng = StdRng::seed_from_u64(9);
        assert!((0..64).all(|_| process_random_tick(&store, pos, &mut rng).is_none()));
    }

    #[test]
    fn mature_crop_stays() {
        let (store, pos) = store_with_crop(7, Block::Farmland);
        let mut rng = StdRng::seed_from_u64(9);
        assert!((0..64).all(|_| process_random_tick(&store, pos, &mut rng).is_none()));
    }

    #[test]
    fn world_tick_applies_changes() {
        let mut store = generate_flat_world(0);
        for x in 0..16 {
            for z in 0..16 {
                store.set_block(BlockPos::new(x, SURFACE_Y, z), Block::Farmland);
                store.set_block(
                    BlockPos::new(x, SURFACE_Y + 1, z),
                    Block::planted(CropKind::Carrots),
                );
            }
        }
        let mut rng = StdRng::seed_from_u64(2);
        let mut applied = 0;
        for _ in 0..200 {
            let changes = tick_random_blocks(&mut store, DEFAULT_RANDOM_TICK_SPEED, &mut rng);
            for c in &changes {
                assert_eq!(store.get_block(c.pos), c.block);
            }
            applied += changes.len();
        }
        assert!(applied > 0);
    }
}
