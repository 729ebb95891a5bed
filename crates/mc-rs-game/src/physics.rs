//! Entity movement against block collision shapes.
//!
//! Motion is resolved one axis at a time (Y, then X, then Z) against the
//! collision boxes of the blocks the swept box touches. Walking entities
//! step up ledges no taller than [`STEP_HEIGHT`].

use mc_rs_world::block::Block;
use mc_rs_world::physics::{Aabb, EntityDimensions};
use mc_rs_world::pos::{BlockPos, Vec3};
use mc_rs_world::storage::BlockStore;

/// Tallest ledge a walking entity climbs without jumping.
pub const STEP_HEIGHT: f64 = 0.6;

/// Outcome of one movement step.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct MoveResult {
    pub position: Vec3,
    /// Motion with blocked components zeroed.
    pub motion: Vec3,
    pub on_ground: bool,
    pub horizontal_collision: bool,
}

#[derive(Debug, Clone, Copy)]
enum Axis {
    X,
    Y,
    Z,
}

/// Collision boxes of every block overlapping `region`.
fn block_boxes(blocks: &BlockStore, region: &Aabb) -> Vec<Aabb> {
    region
        .intersecting_blocks()
        .filter_map(|pos| {
            let height = blocks.get_block(pos).collision_height();
            (height > 0.0).then(|| block_box(pos, height))
        })
        .collect()
}

fn block_box(pos: BlockPos, height: f64) -> Aabb {
    let (x, y, z) = (f64::from(pos.x), f64::from(pos.y), f64::from(pos.z));
    Aabb {
        min_x: x,
        max_x: x + 1.0,
        min_y: y,
        max_y: y + height,
        min_z: z,
        max_z: z + 1.0,
    }
}

/// `aabb` stretched to cover its sweep by `d`.
fn expand_towards(aabb: &Aabb, d: Vec3) -> Aabb {
    Aabb {
        min_x: aabb.min_x + d.x.min(0.0),
        max_x: aabb.max_x + d.x.max(0.0),
        min_y: aabb.min_y + d.y.min(0.0),
        max_y: aabb.max_y + d.y.max(0.0),
        min_z: aabb.min_z + d.z.min(0.0),
        max_z: aabb.max_z + d.z.max(0.0),
    }
}

fn overlaps(a_min: f64, a_max: f64, b_min: f64, b_max: f64) -> bool {
    a_max > b_min && a_min < b_max
}

/// Shorten `delta` along `axis` so `moving` stops at `obstacle`.
fn clip(axis: Axis, moving: &Aabb, obstacle: &Aabb, delta: f64) -> f64 {
    let (lo, hi, o_lo, o_hi, other) = match axis {
        Axis::X => (
            moving.min_x,
            moving.max_x,
            obstacle.min_x,
            obstacle.max_x,
            overlaps(moving.min_y, moving.max_y, obstacle.min_y, obstacle.max_y)
                && overlaps(moving.min_z, moving.max_z, obstacle.min_z, obstacle.max_z),
        ),
        Axis::Y => (
            moving.min_y,
            moving.max_y,
            obstacle.min_y,
            obstacle.max_y,
            overlaps(moving.min_x, moving.max_x, obstacle.min_x, obstacle.max_x)
                && overlaps(moving.min_z, moving.max_z, obstacle.min_z, obstacle.max_z),
        ),
        Axis::Z => (
            moving.min_z,
            moving.max_z,
            obstacle.min_z,
            obstacle.max_z,
            overlaps(moving.min_x, moving.max_x, obstacle.min_x, obstacle.max_x)
                && overlaps(moving.min_y, moving.max_y, obstacle.min_y, obstacle.max_y),
        ),
    };
    if !other {
        return delta;
    }
    if delta > 0.0 && hi <= o_lo {
        delta.min(o_lo - hi)
    } else if delta < 0.0 && lo >= o_hi {
        delta.max(o_hi - lo)
    } else {
        delta
    }
}

fn clip_all(axis: Axis, moving: &Aabb, obstacles: &[Aabb], delta: f64) -> f64 {
    obstacles
        .iter()
        .fold(delta, |d, obstacle| clip(axis, moving, obstacle, d))
}

/// Move `aabb` by `d` axis by axis. Returns the clipped offset.
fn collide(aabb: &Aabb, d: Vec3, obstacles: &[Aabb]) -> Vec3 {
    let dy = clip_all(Axis::Y, aabb, obstacles, d.y);
    let moved = aabb.move_by(Vec3::new(0.0, dy, 0.0));
    let dx = clip_all(Axis::X, &moved, obstacles, d.x);
    let moved = moved.move_by(Vec3::new(dx, 0.0, 0.0));
    let dz = clip_all(Axis::Z, &moved, obstacles, d.z);
    Vec3::new(dx, dy, dz)
}

/// Move an entity of `dims` standing at `position` by `motion`.
pub fn move_entity(
    blocks: &BlockStore,
    dims: EntityDimensions,
    position: Vec3,
    motion: Vec3,
    was_on_ground: bool,
) -> MoveResult {
    let aabb = dims.make_bounding_box(position);
    let region = expand_towards(&aabb, motion);
    let region = Aabb {
        max_y: region.max_y + STEP_HEIGHT,
        ..region
    };
    let obstacles = block_boxes(blocks, &region);

    let mut offset = collide(&aabb, motion, &obstacles);
    let blocked_x = offset.x != motion.x;
    let blocked_z = offset.z != motion.z;
    let landed = motion.y < 0.0 && offset.y != motion.y;

    if (blocked_x || blocked_z) && (was_on_ground || landed) {
        let stepped = step_up(&aabb, motion, &obstacles);
        if stepped.horizontal_distance_sqr() > offset.horizontal_distance_sqr() {
            offset = stepped;
        }
    }

    let blocked_x = offset.x != motion.x;
    let blocked_z = offset.z != motion.z;
    let on_ground = (motion.y < 0.0 && offset.y != motion.y) || (offset.y > 0.0 && motion.y <= 0.0);
    MoveResult {
        position: position + offset,
        motion: Vec3::new(
            if blocked_x { 0.0 } else { motion.x },
            if offset.y != motion.y { 0.0 } else { motion.y },
            if blocked_z { 0.0 } else { motion.z },
        ),
        on_ground,
        horizontal_collision: blocked_x || blocked_z,
    }
}

/// Rise by the step height, move horizontally, then settle back down.
fn step_up(aabb: &Aabb, motion: Vec3, obstacles: &[Aabb]) -> Vec3 {
    let up = clip_all(Axis::Y, aabb, obstacles, STEP_HEIGHT);
    let raised = aabb.move_by(Vec3::new(0.0, up, 0.0));
    let horizontal = collide(&raised, Vec3::new(motion.x, 0.0, motion.z), obstacles);
    let shifted = raised.move_by(horizontal);
    let down = clip_all(Axis::Y, &shifted, obstacles, -up + motion.y.min(0.0));
    Vec3::new(horizontal.x, up + down, horizontal.z)
}

/// Whether any block touched by the box is water.
pub fn in_water(blocks: &BlockStore, aabb: &Aabb) -> bool {
    aabb.deflate(0.001)
        .intersecting_blocks()
        .any(|pos| blocks.get_block(pos) == Block::Water && pos.y as f64 + 1.0 > aabb.min_y)
}
