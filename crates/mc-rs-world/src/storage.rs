//! In-memory block storage keyed by chunk coordinates.

use std::collections::HashMap;

use crate::block::Block;
use crate::chunk::ChunkColumn;
use crate::pos::BlockPos;

/// All loaded chunk columns of a world.
#[derive(Default, Clone)]
pub struct BlockStore {
    columns: HashMap<(i32, i32), ChunkColumn>,
}

/// Chunk coordinates and local x/z of a block position.
fn split(pos: BlockPos) -> ((i32, i32), usize, usize) {
    (
        (pos.x >> 4, pos.z >> 4),
        (pos.x & 15) as usize,
        (pos.z & 15) as usize,
    )
}

impl BlockStore {
    pub fn new() -> Self {
        Self::default()
    }

    /// Insert or replace a chunk column.
    pub fn insert_column(&mut self, column: ChunkColumn) {
        self.columns.insert((column.x, column.z), column);
    }

    pub fn column(&self, cx: i32, cz: i32) -> Option<&ChunkColumn> {
        self.columns.get(&(cx, cz))
    }

    pub fn columns(&self) -> impl Iterator<Item = &ChunkColumn> {
        self.columns.values()
    }

    pub fn column_count(&self) -> usize {
        self.columns.len()
    }

    /// Whether the chunk containing `pos` is loaded.
    pub fn is_loaded(&self, pos: BlockPos) -> bool {
        let (key, _, _) = split(pos);
        self.columns.contains_key(&key)
    }

    /// Block at `pos`; unloaded chunks read as air.
    pub fn get_block(&self, pos: BlockPos) -> Block {
        let (key, lx, lz) = split(pos);
        self.columns
            .get(&key)
            .map(|c| c.get_block(lx, pos.y, lz))
            .unwrap_or(Block::Air)
    }

    /// Set the block at `pos`. Returns the previous block, or `None` when the
    /// chunk is not loaded or `pos` is outside the world height.
    pub fn set_block(&mut self, pos: BlockPos, block: Block) -> Option<Block> {
        let (key, lx, lz) = split(pos);
        let column = self.columns.get_mut(&key)?;
        let previous = column.get_block(lx, pos.y, lz);
        column.set_block(lx, pos.y, lz, block).then_some(previous)
    }
}
