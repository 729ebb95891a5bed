//! Chunk and sub-chunk data structures.

use crate::block::Block;

/// Sub-chunks per column: Y range [0, 256).
pub const SUB_CHUNK_COUNT: usize = 16;

/// Height of the world in blocks.
pub const WORLD_HEIGHT: i32 = (SUB_CHUNK_COUNT * 16) as i32;

/// A 16x16x16 sub-chunk with a single block storage layer.
#[derive(Clone)]
pub struct SubChunk {
    /// Palette indices for each block, stored in XZY order: `(x*16 + z)*16 + y`.
    blocks: Box<[u16; 4096]>,
    /// Distinct block states referenced by `blocks`.
    palette: Vec<Block>,
}

/// A full chunk column (16x256x16). Sub-chunks that were never written are `None`
/// and read back as air.
#[derive(Clone)]
pub struct ChunkColumn {
    pub x: i32,
    pub z: i32,
    sub_chunks: Vec<Option<SubChunk>>,
}

impl SubChunk {
    /// Create a sub-chunk filled entirely with a single block.
    pub fn new_single(block: Block) -> Self {
        Self {
            blocks: Box::new([0; 4096]),
            palette: vec![block],
        }
    }

    /// Set a block at local coordinates within this sub-chunk.
    /// `x`, `y`, `z` must each be in `[0, 15]`.
    pub fn set_block(&mut self, x: usize, y: usize, z: usize, block: Block) {
        debug_assert!(x < 16 && y < 16 && z < 16);
        let palette_index = match self.palette.iter().position(|&b| b == block) {
            Some(idx) => idx,
            None => {
                self.palette.push(block);
                self.palette.len() - 1
            }
        };
        let block_index = (x * 16 + z) * 16 + y;
        self.blocks[block_index] = palette_index as u16;
    }

    /// Get the block at local coordinates.
    pub fn get_block(&self, x: usize, y: usize, z: usize) -> Block {
        let block_index = (x * 16 + z) * 16 + y;
        let palette_index = self.blocks[block_index] as usize;
        self.palette[palette_index]
    }

    /// Number of distinct block states in the palette.
    pub fn palette_len(&self) -> usize {
        self.palette.len()
    }
}

impl ChunkColumn {
    /// An all-air column.
    pub fn empty(x: i32, z: i32) -> Self {
        Self {
            x,
            z,
            sub_chunks: vec![None; SUB_CHUNK_COUNT],
        }
    }

    /// Block at local x/z and world y. Out-of-range y reads as air.
    pub fn get_block(&self, x: usize, y: i32, z: usize) -> Block {
        if !(0..WORLD_HEIGHT).contains(&y) {
            return Block::Air;
        }
        match &self.sub_chunks[(y / 16) as usize] {
            Some(sub) => sub.get_block(x, (y % 16) as usize, z),
            None => Block::Air,
        }
    }

    /// Set a block at local x/z and world y. Returns false when y is out of range.
    pub fn set_block(&mut self, x: usize, y: i32, z: usize, block: Block) -> bool {
        if !(0..WORLD_HEIGHT).contains(&y) {
            return false;
        }
        let slot = &mut self.sub_chunks[(y / 16) as usize];
        if slot.is_none() && block.is_air() {
            return true;
        }
        slot.get_or_insert_with(|| SubChunk::new_single(Block::Air))
            .set_block(x, (y % 16) as usize, z, block);
        true
    }

    /// Indices of sub-chunks that hold any data.
    pub fn populated_sections(&self) -> impl Iterator<Item = usize> + '_ {
        self.sub_chunks
            .iter()
            .enumerate()
            .filter(|(_, s)| s.is_some())
            .map(|(i, _)| i)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::block::CropKind;

    #[test]
    fn new_single_all_same() {
        let sub = SubChunk::new_single(Block::Stone);
        for x in 0..16 {
            for y in 0..16 {
                for z in 0..16 {
                    assert_eq!(sub.get_block(x, y, z), Block::Stone);
                }
            }
        }
        assert_eq!(sub.palette_len(), 1);
    }

    #[test]
    fn set_block_grows_palette_once() {
        let mut sub = SubChunk::new_single(Block::Air);
        sub.set_block(1, 2, 3, Block::Farmland);
        sub.set_block(4, 5, 6, Block::Farmland);
        sub.set_block(
            7,
            8,
            9,
            Block::Crop {
                kind: CropKind::Wheat,
                age: 2,
            },
        );
        assert_eq!(sub.palette_len(), 3);
        assert_eq!(sub.get_block(1, 2, 3), Block::Farmland);
        assert_eq!(sub.get_block(0, 0, 0), Block::Air);
    }

    #[test]
    fn column_allocates_sections_lazily() {
        let mut col = ChunkColumn::empty(0, 0);
        assert_eq!(col.populated_sections().count(), 0);
        assert!(col.set_block(0, 40, 0, Block::Air));
        assert_eq!(col.populated_sections().count(), 0);
        assert!(col.set_block(0, 40, 0, Block::Stone));
        assert_eq!(col.populated_sections().collect::<Vec<_>>(), vec![2]);
        assert_eq!(col.get_block(0, 40, 0), Block::Stone);
        assert!(!col.set_block(0, WORLD_HEIGHT, 0, Block::Stone));
        assert_eq!(col.get_block(0, -1, 0), Block::Air);
    }
}
