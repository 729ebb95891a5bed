//! Random standable positions for stroll and flee behaviors.

use rand::Rng;

use mc_rs_world::pos::{BlockPos, Vec3};

use crate::level::Level;

const ATTEMPTS: usize = 10;

/// Whether a mob two blocks tall could stand with its feet at `pos`.
pub fn is_standable(level: &dyn Level, pos: BlockPos) -> bool {
    let feet = level.block(pos);
    let head = level.block(pos.above());
    level.is_loaded(pos)
        && !feet.is_solid()
        && !feet.is_fluid()
        && !head.is_solid()
        && level.block(pos.below()).is_solid_render()
}

/// Search the column at `pos` within `vertical` blocks for a standable cell,
/// preferring the one closest to `pos.y`.
pub fn move_to_surface(level: &dyn Level, pos: BlockPos, vertical: i32) -> Option<BlockPos> {
    (0..=vertical)
        .flat_map(|dy| [pos.offset(0, dy, 0), pos.offset(0, -dy, 0)])
        .find(|p| is_standable(level, *p))
}

/// Random standable position within `horizontal` blocks (x/z) and
/// `vertical` blocks (y) of `origin`.
pub fn land_random_pos(
    level: &dyn Level,
    origin: BlockPos,
    horizontal: i32,
    vertical: i32,
    rng: &mut impl Rng,
) -> Option<BlockPos> {
    (0..ATTEMPTS).find_map(|_| {
        let dx = rng.gen_range(-horizontal..=horizontal);
        let dz = rng.gen_range(-horizontal..=horizontal);
        move_to_surface(level, origin.offset(dx, 0, dz), vertical)
    })
}

/// Random standable position roughly in `direction` from `origin`, at
/// most `horizontal` blocks away and at least half of that.
pub fn land_pos_in_direction(
    level: &dyn Level,
    origin: BlockPos,
    direction: Vec3,
    horizontal: i32,
    vertical: i32,
    rng: &mut impl Rng,
) -> Option<BlockPos> {
    let flat = Vec3::new(direction.x, 0.0, direction.z).normalize();
    if flat == Vec3::ZERO {
        return land_random_pos(level, origin, horizontal, vertical, rng);
    }
    let min = (horizontal / 2).max(1) as f64;
    (0..ATTEMPTS).find_map(|_| {
        let dist = rng.gen_range(min..=horizontal as f64);
        let jitter: f64 = rng.gen_range(-0.5..=0.5);
        // rotate the direction a little to spread candidates
        let (s, c) = jitter.sin_cos();
        let dir = Vec3::new(flat.x * c - flat.z * s, 0.0, flat.x * s + flat.z * c);
        let candidate = origin.offset(
            (dir.x * dist).round() as i32,
            0,
            (dir.z * dist).round() as i32,
        );
        move_to_surface(level, candidate, vertical)
    })
}

/// Random standable position leading away from `threat`.
pub fn land_pos_away(
    level: &dyn Level,
    origin: BlockPos,
    threat: Vec3,
    horizontal: i32,
    vertical: i32,
    rng: &mut impl Rng,
) -> Option<BlockPos> {
    let away = origin.bottom_center() - threat;
    land_pos_in_direction(level, origin, away, horizontal, vertical, rng)
}

/// Random standable position leading toward `goal`.
pub fn land_pos_towards(
    level: &dyn Level,
    origin: BlockPos,
    goal: Vec3,
    horizontal: i32,
    vertical: i32,
    rng: &mut impl Rng,
) -> Option<BlockPos> {
    let toward = goal - origin.bottom_center();
    land_pos_in_direction(level, origin, toward, horizontal, vertical, rng)
}

#[cfg(test)]
mod tests {
    use rand::rngs::StdRng;
    use rand::SeedableRng;

    use mc_rs_world::block::Block;

    use super::*;
    use crate::testing::TestLevel;

    #[test]
    fn surface_search_finds_floor() {
        let level = TestLevel::flat(3);
        assert_eq!(
            move_to_surface(&level, BlockPos::new(2, 7, 2), 5),
            Some(BlockPos::new(2, 4, 2))
        );
        assert_eq!(move_to_surface(&level, BlockPos::new(2, 12, 2), 5), None);
    }

    #[test]
    fn water_is_not_standable() {
        let mut level = TestLevel::flat(3);
        level.put(BlockPos::new(0, 4, 0), Block::Water);
        assert!(!is_standable(&level, BlockPos::new(0, 4, 0)));
    }

    #[test]
    fn random_pos_stays_in_range() {
        let level = TestLevel::flat(3);
        let mut rng = StdRng::seed_from_u64(4);
        let origin = BlockPos::new(0, 4, 0);
        for _ in 0..50 {
            let pos = land_random_pos(&level, origin, 10, 7, &mut rng).unwrap();
            assert!((pos.x - origin.x).abs() <= 10);
            assert!((pos.z - origin.z).abs() <= 10);
            assert_eq!(pos.y, 4);
        }
    }

    #[test]
    fn away_moves_away() {
        let level = TestLevel::flat(3);
        let mut rng = StdRng::seed_from_u64(8);
        let origin = BlockPos::new(0, 4, 0);
        let threat = Vec3::new(-5.0, 4.0, 0.5);
        for _ in 0..20 {
            let pos = land_pos_away(&level, origin, threat, 10, 7, &mut rng).unwrap();
            assert!(pos.x > 0, "{pos} should be east of the origin");
        }
    }
}
