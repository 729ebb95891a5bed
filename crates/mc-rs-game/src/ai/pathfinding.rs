//! Grid A* path search and the ground navigation villagers carry.
//!
//! The search walks the block grid in the four horizontal directions,
//! stepping up or down one block at a time. Node costs come from
//! [`PathType::default_malus`]; impassable types are never entered. When the
//! target cannot be reached inside the search range the path ends at the
//! explored node closest to it and reports `can_reach() == false`.

use std::cmp::Reverse;
use std::collections::{BinaryHeap, HashMap};

use mc_rs_ai::level::Level;
use mc_rs_ai::navigation::{path_type_at, Path, PathNavigation, PathType};
use mc_rs_world::pos::{BlockPos, Vec3};

/// Upper bound on nodes expanded by one search.
const MAX_VISITED_NODES: usize = 4096;

/// Horizontal distance at which a waypoint counts as passed.
const WAYPOINT_REACH: f64 = 0.45;

/// Ticks spent on one waypoint before the mob counts as stuck.
const STUCK_TICKS: u32 = 100;

/// Farthest drop the search will plan.
const MAX_DROP: i32 = 3;

const DIRECTIONS: [(i32, i32); 4] = [(1, 0), (-1, 0), (0, 1), (0, -1)];

/// Whether a mob can stand in `pos`: ground below, the cell and the cell
/// above free.
fn standable(level: &dyn Level, pos: BlockPos) -> Option<PathType> {
    let path_type = path_type_at(level, pos);
    if path_type == PathType::Open || path_type.default_malus() < 0.0 {
        return None;
    }
    if level.block(pos.above()).is_solid() {
        return None;
    }
    Some(path_type)
}

fn node_cost(path_type: PathType) -> u32 {
    1 + path_type.default_malus().max(0.0) as u32
}

/// Cells reachable in one move from `pos`, with their cost.
fn neighbors(level: &dyn Level, pos: BlockPos) -> Vec<(BlockPos, u32)> {
    let mut out = Vec::with_capacity(4);
    for (dx, dz) in DIRECTIONS {
        let side = pos.offset(dx, 0, dz);
        if let Some(t) = standable(level, side) {
            out.push((side, node_cost(t)));
            continue;
        }
        // step up, with head room above the current cell
        let up = side.above();
        if level.block(side).is_solid() && !level.block(pos.above().above()).is_solid() {
            if let Some(t) = standable(level, up) {
                out.push((up, node_cost(t) + 1));
                continue;
            }
        }
        if path_type_at(level, side) == PathType::Open && !level.block(side.above()).is_solid() {
            for drop in 1..=MAX_DROP {
                let down = side.offset(0, -drop, 0);
                if level.block(down).is_solid() {
                    break;
                }
                if let Some(t) = standable(level, down) {
                    out.push((down, node_cost(t) + drop as u32));
                    break;
                }
            }
        }
    }
    out
}

/// Cell the search starts from; a mob sunk into a partial block such as
/// farmland stands in the cell above it.
fn start_node(level: &dyn Level, from: BlockPos) -> BlockPos {
    if level.block(from).is_solid() {
        from.above()
    } else {
        from
    }
}

/// A* from `from` toward `target`. See the module docs for partial paths.
pub fn find_path(level: &dyn Level, from: BlockPos, target: BlockPos, accuracy: i32, max_range: i32) -> Path {
    let start = start_node(level, from);
    let heuristic = |p: BlockPos| p.dist_manhattan(target) as u32;
    let range_sqr = f64::from(max_range) * f64::from(max_range);

    let mut open = BinaryHeap::new();
    let mut came_from: HashMap<BlockPos, BlockPos> = HashMap::new();
    let mut cost: HashMap<BlockPos, u32> = HashMap::new();
    cost.insert(start, 0);
    open.push(Reverse((heuristic(start), 0u32, start)));

    let mut best = (heuristic(start), 0u32, start);
    let mut reached = None;
    let mut visited = 0usize;

    while let Some(Reverse((_, g, pos))) = open.pop() {
        if cost.get(&pos).is_some_and(|c| *c < g) {
            continue;
        }
        if pos.dist_manhattan(target) <= accuracy {
            reached = Some(pos);
            break;
        }
        visited += 1;
        if visited > MAX_VISITED_NODES {
            break;
        }
        let h = heuristic(pos);
        if (h, g) < (best.0, best.1) {
            best = (h, g, pos);
        }
        for (next, step) in neighbors(level, pos) {
            if next.dist_sqr(start) > range_sqr {
                continue;
            }
            let next_cost = g + step;
            if cost.get(&next).is_some_and(|c| *c <= next_cost) {
                continue;
            }
            cost.insert(next, next_cost);
            came_from.insert(next, pos);
            open.push(Reverse((next_cost + heuristic(next), next_cost, next)));
        }
    }

    let (end, can_reach) = match reached {
        Some(pos) => (pos, true),
        None => (best.2, false),
    };
    let mut nodes = vec![end];
    let mut cursor = end;
    while let Some(prev) = came_from.get(&cursor) {
        nodes.push(*prev);
        cursor = *prev;
    }
    nodes.reverse();
    Path::new(nodes, target, can_reach)
}

/// Where to head this tick while following a path.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct Steering {
    /// Unit horizontal direction.
    pub direction: Vec3,
    pub speed_modifier: f64,
    /// The next waypoint is a block up.
    pub jump: bool,
}

/// Path following for walking mobs.
#[derive(Debug, Clone, Default)]
pub struct GroundNavigation {
    path: Option<Path>,
    speed_modifier: f64,
    ticks_on_node: u32,
    stuck: bool,
}

impl GroundNavigation {
    pub fn new() -> Self {
        Self::default()
    }

    /// Advance past reached waypoints and steer toward the next one.
    pub fn steer(&mut self, position: Vec3) -> Option<Steering> {
        let path = self.path.as_mut()?;
        while let Some(node) = path.next_node() {
            let center = node.bottom_center();
            let dx = center.x - position.x;
            let dz = center.z - position.z;
            let close = (dx * dx + dz * dz).sqrt() < WAYPOINT_REACH && (center.y - position.y).abs() < 1.0;
            if !close {
                break;
            }
            path.advance();
            self.ticks_on_node = 0;
        }
        let node = path.next_node()?;

        self.ticks_on_node += 1;
        if self.ticks_on_node > STUCK_TICKS {
            tracing::trace!(node = %node, "navigation stuck");
            self.stuck = true;
            self.path = None;
            return None;
        }

        let center = node.bottom_center();
        let direction = Vec3::new(center.x - position.x, 0.0, center.z - position.z).normalize();
        Some(Steering {
            direction,
            speed_modifier: self.speed_modifier,
            jump: center.y > position.y + 0.6,
        })
    }
}

impl PathNavigation for GroundNavigation {
    fn create_path(
        &mut self,
        level: &dyn Level,
        from: BlockPos,
        target: BlockPos,
        accuracy: i32,
        max_range: i32,
    ) -> Option<Path> {
        if !level.is_loaded(target) {
            return None;
        }
        Some(find_path(level, from, target, accuracy, max_range))
    }

    fn move_to(&mut self, path: Path, speed: f64) -> bool {
        if path.is_empty() {
            self.path = None;
            return false;
        }
        self.path = Some(path);
        self.speed_modifier = speed;
        self.ticks_on_node = 0;
        self.stuck = false;
        true
    }

    fn path(&self) -> Option<&Path> {
        self.path.as_ref()
    }

    fn is_done(&self) -> bool {
        self.path.as_ref().map_or(true, Path::is_done)
    }

    fn is_stuck(&self) -> bool {
        self.stuck
    }

    fn stop(&mut self) {
        self.path = None;
    }
}

#[cfg(test)]
mod tests {
    use mc_rs_world::block::Block;
    use mc_rs_world::flat_generator::generate_flat_world;

    use super::*;
    use crate::ai::level::tests::Fixture;

    const FLOOR: i32 = 4;

    fn at(x: i32, z: i32) -> BlockPos {
        BlockPos::new(x, FLOOR, z)
    }

    #[test]
    fn straight_path_on_flat_ground() {
        let mut fx = Fixture::new(generate_flat_world(1));
        let level = fx.level();
        let path = find_path(&level, at(0, 0), at(5, 0), 0, 32);
        assert!(path.can_reach());
        assert_eq!(path.len(), 6);
        assert_eq!(path.end_node(), Some(at(5, 0)));
        assert_eq!(path.nodes()[0], at(0, 0));
    }

    #[test]
    fn routes_around_a_wall() {
        let mut blocks = generate_flat_world(1);
        for z in -3..=3 {
            blocks.set_block(at(2, z), Block::Stone);
            blocks.set_block(at(2, z).above(), Block::Stone);
        }
        let mut fx = Fixture::new(blocks);
        let level = fx.level();
        let path = find_path(&level, at(0, 0), at(4, 0), 0, 32);
        assert!(path.can_reach());
        assert!(path.nodes().iter().all(|p| p.x != 2 || p.z.abs() > 3));
    }

    #[test]
    fn climbs_single_blocks() {
        let mut blocks = generate_flat_world(1);
        blocks.set_block(at(2, 0), Block::Stone);
        let mut fx = Fixture::new(blocks);
        let level = fx.level();
        let path = find_path(&level, at(0, 0), at(2, 0).above(), 0, 32);
        assert!(path.can_reach());
        assert_eq!(path.end_node(), Some(at(2, 0).above()));
    }

    #[test]
    fn enclosed_target_gives_partial_path() {
        let mut blocks = generate_flat_world(1);
        for (x, z) in [(5, 1), (5, -1), (4, 0), (6, 0)] {
            for y in 0..3 {
                blocks.set_block(at(x, z).offset(0, y, 0), Block::Stone);
            }
        }
        let mut fx = Fixture::new(blocks);
        let level = fx.level();
        let path = find_path(&level, at(0, 0), at(5, 0), 0, 16);
        assert!(!path.can_reach());
        assert_eq!(path.target(), at(5, 0));
        let end = path.end_node().unwrap_or(at(0, 0));
        assert_eq!(end.dist_manhattan(at(5, 0)), 2);
    }

    #[test]
    fn accuracy_stops_early() {
        let mut fx = Fixture::new(generate_flat_world(1));
        let level = fx.level();
        let path = find_path(&level, at(0, 0), at(6, 0), 2, 32);
        assert!(path.can_reach());
        assert_eq!(path.end_node(), Some(at(4, 0)));
    }

    #[test]
    fn start_inside_farmland_moves_up() {
        let mut blocks = generate_flat_world(1);
        blocks.set_block(BlockPos::new(0, 3, 0), Block::Farmland);
        let mut fx = Fixture::new(blocks);
        let level = fx.level();
        let path = find_path(&level, BlockPos::new(0, 3, 0), at(2, 0), 0, 32);
        assert_eq!(path.nodes()[0], at(0, 0));
        assert!(path.can_reach());
    }

    #[test]
    fn steering_follows_waypoints_and_detects_stuck() {
        let mut fx = Fixture::new(generate_flat_world(1));
        let level = fx.level();
        let mut nav = GroundNavigation::new();
        let path = nav.create_path(&level, at(0, 0), at(3, 0), 0, 32);
        assert!(nav.move_to(path.unwrap_or_else(|| Path::new(Vec::new(), at(3, 0), false)), 0.5));

        // standing on the first node skips it
        let steer = nav.steer(Vec3::new(0.5, 4.0, 0.5));
        let steer = steer.map(|s| (s.direction, s.jump));
        assert_eq!(steer, Some((Vec3::new(1.0, 0.0, 0.0), false)));
        assert_eq!(nav.path().map(Path::next_index), Some(1));

        for _ in 1..STUCK_TICKS {
            assert!(nav.steer(Vec3::new(0.5, 4.0, 0.5)).is_some());
        }
        assert!(nav.steer(Vec3::new(0.5, 4.0, 0.5)).is_none());
        assert!(nav.is_stuck());
        assert!(nav.is_done());
    }

    #[test]
    fn unloaded_target_has_no_path() {
        let mut fx = Fixture::new(generate_flat_world(0));
        let level = fx.level();
        let mut nav = GroundNavigation::new();
        assert!(nav.create_path(&level, at(0, 0), at(100, 0), 0, 200).is_none());
    }
}
