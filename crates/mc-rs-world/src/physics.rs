//! Entity physics constants and AABB collision helpers.

use crate::pos::{BlockPos, Vec3};

/// Downward acceleration applied to living entities each tick (blocks/tick²).
pub const GRAVITY: f64 = 0.08;

/// Vertical velocity retained each tick while airborne.
pub const VERTICAL_DRAG: f64 = 0.98;

/// Horizontal velocity retained each tick on the ground (block friction × air resistance).
pub const GROUND_FRICTION: f64 = 0.6 * 0.91;

/// Horizontal velocity retained each tick in the air.
pub const AIR_FRICTION: f64 = 0.91;

/// Initial upward velocity of a normal jump.
pub const JUMP_VELOCITY: f64 = 0.42;

/// Villager hitbox width.
pub const VILLAGER_WIDTH: f64 = 0.6;

/// Villager hitbox height.
pub const VILLAGER_HEIGHT: f64 = 1.95;

/// Width and height of an entity's collision box.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct EntityDimensions {
    pub width: f64,
    pub height: f64,
}

impl EntityDimensions {
    pub const fn new(width: f64, height: f64) -> Self {
        Self { width, height }
    }

    /// Box of these dimensions with its bottom center at `pos`.
    pub fn make_bounding_box(&self, pos: Vec3) -> Aabb {
        let half = self.width / 2.0;
        Aabb {
            min_x: pos.x - half,
            max_x: pos.x + half,
            min_y: pos.y,
            max_y: pos.y + self.height,
            min_z: pos.z - half,
            max_z: pos.z + half,
        }
    }
}

/// Axis-aligned bounding box.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct Aabb {
    pub min_x: f64,
    pub max_x: f64,
    pub min_y: f64,
    pub max_y: f64,
    pub min_z: f64,
    pub max_z: f64,
}

impl Aabb {
    pub fn move_by(&self, d: Vec3) -> Aabb {
        Aabb {
            min_x: self.min_x + d.x,
            max_x: self.max_x + d.x,
            min_y: self.min_y + d.y,
            max_y: self.max_y + d.y,
            min_z: self.min_z + d.z,
            max_z: self.max_z + d.z,
        }
    }

    /// Shrink every face inward by `amount`.
    pub fn deflate(&self, amount: f64) -> Aabb {
        Aabb {
            min_x: self.min_x + amount,
            max_x: self.max_x - amount,
            min_y: self.min_y + amount,
            max_y: self.max_y - amount,
            min_z: self.min_z + amount,
            max_z: self.max_z - amount,
        }
    }

    /// Whether this box overlaps the collision shape of a block at `pos`
    /// that is `height` tall.
    pub fn intersects_block(&self, pos: BlockPos, height: f64) -> bool {
        if height <= 0.0 {
            return false;
        }
        let (bx, by, bz) = (pos.x as f64, pos.y as f64, pos.z as f64);
        self.min_x < bx + 1.0
            && self.max_x > bx
            && self.min_y < by + height
            && self.max_y > by
            && self.min_z < bz + 1.0
            && self.max_z > bz
    }

    /// Iterate all block positions that intersect this AABB.
    ///
    /// A small epsilon (0.001) is subtracted from max bounds so that an entity
    /// standing exactly on the edge of a block does not collide with the next one.
    /// The range starts one block lower so shapes taller than a block (fences)
    /// are considered.
    pub fn intersecting_blocks(&self) -> impl Iterator<Item = BlockPos> {
        const EPS: f64 = 0.001;
        let bx_min = self.min_x.floor() as i32;
        let bx_max = (self.max_x - EPS).floor() as i32;
        let by_min = self.min_y.floor() as i32 - 1;
        let by_max = (self.max_y - EPS).floor() as i32;
        let bz_min = self.min_z.floor() as i32;
        let bz_max = (self.max_z - EPS).floor() as i32;

        BlockPos::between_closed(
            BlockPos::new(bx_min, by_min, bz_min),
            BlockPos::new(bx_max, by_max, bz_max),
        )
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn villager_box_from_feet() {
        let dims = EntityDimensions::new(VILLAGER_WIDTH, VILLAGER_HEIGHT);
        let aabb = dims.make_bounding_box(Vec3::new(0.5, 4.0, 0.5));
        assert!((aabb.min_x - 0.2).abs() < 0.001);
        assert!((aabb.max_x - 0.8).abs() < 0.001);
        assert!((aabb.min_y - 4.0).abs() < 0.001);
        assert!((aabb.max_y - 5.95).abs() < 0.001);
    }

    #[test]
    fn intersecting_blocks_center_of_block() {
        let dims = EntityDimensions::new(0.6, 1.8);
        let aabb = dims.make_bounding_box(Vec3::new(0.5, 4.0, 0.5));
        let blocks: Vec<_> = aabb.intersecting_blocks().collect();
        // one extra layer below for tall shapes
        assert!(blocks.contains(&BlockPos::new(0, 3, 0)));
        assert!(blocks.contains(&BlockPos::new(0, 4, 0)));
        assert!(blocks.contains(&BlockPos::new(0, 5, 0)));
        assert_eq!(blocks.len(), 3);
    }

    #[test]
    fn intersecting_blocks_straddling_x() {
        let dims = EntityDimensions::new(0.6, 1.8);
        let aabb = dims.make_bounding_box(Vec3::new(1.0, 4.0, 0.5));
        let xs: std::collections::HashSet<i32> = aabb.intersecting_blocks().map(|b| b.x).collect();
        assert!(xs.contains(&0));
        assert!(xs.contains(&1));
    }

    #[test]
    fn exact_block_edge_no_extra_collision() {
        let dims = EntityDimensions::new(0.6, 1.8);
        let aabb = dims.make_bounding_box(Vec3::new(0.3, 4.0, 0.3));
        assert!(aabb.intersecting_blocks().all(|b| b.x == 0 && b.z == 0));
    }

    #[test]
    fn block_intersection_respects_shape_height() {
        let dims = EntityDimensions::new(0.6, 1.8);
        // standing on top of a full block: touching, not overlapping
        let aabb = dims.make_bounding_box(Vec3::new(0.5, 4.0, 0.5));
        assert!(!aabb.intersects_block(BlockPos::new(0, 3, 0), 1.0));
        // a fence below reaches 0.5 into the box
        assert!(aabb.intersects_block(BlockPos::new(0, 3, 0), 1.5));
        assert!(!aabb.intersects_block(BlockPos::new(0, 4, 0), 0.0));
    }
}
