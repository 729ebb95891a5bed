//! Path-finding service consumed by movement behaviors.

use mc_rs_world::block::Block;
use mc_rs_world::pos::BlockPos;

use crate::level::Level;

/// A computed route of block nodes.
#[derive(Debug, Clone, PartialEq)]
pub struct Path {
    nodes: Vec<BlockPos>,
    next_index: usize,
    target: BlockPos,
    can_reach: bool,
}

impl Path {
    pub fn new(nodes: Vec<BlockPos>, target: BlockPos, can_reach: bool) -> Self {
        Self {
            nodes,
            next_index: 0,
            target,
            can_reach,
        }
    }

    pub fn nodes(&self) -> &[BlockPos] {
        &self.nodes
    }

    /// The position the path was requested for.
    pub fn target(&self) -> BlockPos {
        self.target
    }

    /// Whether the last node reaches the target within the requested accuracy.
    pub fn can_reach(&self) -> bool {
        self.can_reach
    }

    pub fn end_node(&self) -> Option<BlockPos> {
        self.nodes.last().copied()
    }

    pub fn next_node(&self) -> Option<BlockPos> {
        self.nodes.get(self.next_index).copied()
    }

    pub fn next_index(&self) -> usize {
        self.next_index
    }

    pub fn advance(&mut self) {
        if self.next_index < self.nodes.len() {
            self.next_index += 1;
        }
    }

    pub fn is_done(&self) -> bool {
        self.next_index >= self.nodes.len()
    }

    pub fn len(&self) -> usize {
        self.nodes.len()
    }

    pub fn is_empty(&self) -> bool {
        self.nodes.is_empty()
    }
}

/// Classification of a block cell for path costs.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum PathType {
    /// Solid cell.
    Blocked,
    /// Air with nothing to stand on.
    Open,
    /// Free cell with solid ground below.
    Walkable,
    Water,
    Lava,
    /// Burning cell.
    DamageFire,
    /// Free cell next to fire.
    DangerFire,
    Fence,
    StickyHoney,
}

impl PathType {
    /// Cost for a generic walking mob; negative means impassable.
    pub fn default_malus(self) -> f32 {
        match self {
            PathType::Blocked | PathType::Lava | PathType::Fence => -1.0,
            PathType::Open | PathType::Walkable => 0.0,
            PathType::Water | PathType::DangerFire | PathType::StickyHoney => 8.0,
            PathType::DamageFire => 16.0,
        }
    }
}

/// Classify the cell at `pos` for a walking mob.
pub fn path_type_at(level: &dyn Level, pos: BlockPos) -> PathType {
    let block = level.block(pos);
    match block {
        Block::Water => return PathType::Water,
        Block::Lava => return PathType::Lava,
        Block::Fire => return PathType::DamageFire,
        Block::OakFence => return PathType::Fence,
        b if b.is_solid() => return PathType::Blocked,
        _ => {}
    }
    let below = level.block(pos.below());
    let base = match below {
        Block::OakFence => PathType::Fence,
        Block::HoneyBlock => PathType::StickyHoney,
        Block::Fire => PathType::DamageFire,
        Block::Lava => PathType::Lava,
        b if b.is_solid() || b.is_bed() => PathType::Walkable,
        _ => PathType::Open,
    };
    if base == PathType::Walkable && near_fire(level, pos) {
        return PathType::DangerFire;
    }
    base
}

fn near_fire(level: &dyn Level, pos: BlockPos) -> bool {
    BlockPos::between_closed(pos.offset(-1, -1, -1), pos.offset(1, 1, 1))
        .any(|p| p != pos && matches!(level.block(p), Block::Fire | Block::Lava))
}

/// Ground navigation owned by a mob.
pub trait PathNavigation {
    /// Compute a path from `from` toward `target`. `accuracy` is the Manhattan
    /// distance to the target that counts as reaching it; the search does not
    /// expand nodes farther than `max_range` from `from`. Unreachable targets
    /// yield a partial path with `can_reach() == false`.
    fn create_path(
        &mut self,
        level: &dyn Level,
        from: BlockPos,
        target: BlockPos,
        accuracy: i32,
        max_range: i32,
    ) -> Option<Path>;

    /// Whether a mob could stand at `pos`.
    fn is_stable_destination(&self, level: &dyn Level, pos: BlockPos) -> bool {
        level.block(pos.below()).is_solid_render()
    }

    /// Start following `path`. Returns false for an empty path.
    fn move_to(&mut self, path: Path, speed: f64) -> bool;

    fn path(&self) -> Option<&Path>;

    /// No path, or the current path is finished.
    fn is_done(&self) -> bool;

    /// Made no progress for a while.
    fn is_stuck(&self) -> bool;

    fn stop(&mut self);
}
