//! Block coordinates and double-precision vectors.

use std::ops::{Add, Mul, Neg, Sub};

use serde::{Deserialize, Serialize};

/// Integer block coordinates.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord, Default, Serialize, Deserialize)]
pub struct BlockPos {
    pub x: i32,
    pub y: i32,
    pub z: i32,
}

impl BlockPos {
    pub const ZERO: BlockPos = BlockPos { x: 0, y: 0, z: 0 };

    pub const fn new(x: i32, y: i32, z: i32) -> Self {
        Self { x, y, z }
    }

    /// The block containing a world position.
    pub fn containing(v: Vec3) -> Self {
        Self {
            x: v.x.floor() as i32,
            y: v.y.floor() as i32,
            z: v.z.floor() as i32,
        }
    }

    pub fn offset(self, dx: i32, dy: i32, dz: i32) -> Self {
        Self::new(self.x + dx, self.y + dy, self.z + dz)
    }

    pub fn below(self) -> Self {
        self.offset(0, -1, 0)
    }

    pub fn above(self) -> Self {
        self.offset(0, 1, 0)
    }

    /// Squared euclidean distance between block corners.
    pub fn dist_sqr(self, other: BlockPos) -> f64 {
        let dx = (self.x - other.x) as f64;
        let dy = (self.y - other.y) as f64;
        let dz = (self.z - other.z) as f64;
        dx * dx + dy * dy + dz * dz
    }

    pub fn dist_manhattan(self, other: BlockPos) -> i32 {
        (self.x - other.x).abs() + (self.y - other.y).abs() + (self.z - other.z).abs()
    }

    /// Center of the block.
    pub fn center(self) -> Vec3 {
        Vec3::new(
            self.x as f64 + 0.5,
            self.y as f64 + 0.5,
            self.z as f64 + 0.5,
        )
    }

    /// Center of the block's bottom face (where an entity stands).
    pub fn bottom_center(self) -> Vec3 {
        Vec3::new(self.x as f64 + 0.5, self.y as f64, self.z as f64 + 0.5)
    }

    /// Whether the block center lies strictly within `distance` of `pos`.
    pub fn closer_to_center_than(self, pos: Vec3, distance: f64) -> bool {
        self.center().distance_to_sqr(pos) < distance * distance
    }

    /// All positions in the inclusive box between `min` and `max`, in x, y, z order.
    pub fn between_closed(min: BlockPos, max: BlockPos) -> impl Iterator<Item = BlockPos> {
        (min.x..=max.x).flat_map(move |x| {
            (min.y..=max.y).flat_map(move |y| (min.z..=max.z).map(move |z| BlockPos::new(x, y, z)))
        })
    }
}

impl std::fmt::Display for BlockPos {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(f, "({}, {}, {})", self.x, self.y, self.z)
    }
}

/// A position or direction in world space.
#[derive(Debug, Clone, Copy, PartialEq, Default, Serialize, Deserialize)]
pub struct Vec3 {
    pub x: f64,
    pub y: f64,
    pub z: f64,
}

impl Vec3 {
    pub const ZERO: Vec3 = Vec3 {
        x: 0.0,
        y: 0.0,
        z: 0.0,
    };

    pub const fn new(x: f64, y: f64, z: f64) -> Self {
        Self { x, y, z }
    }

    pub fn length_sqr(self) -> f64 {
        self.x * self.x + self.y * self.y + self.z * self.z
    }

    pub fn length(self) -> f64 {
        self.length_sqr().sqrt()
    }

    pub fn horizontal_distance_sqr(self) -> f64 {
        self.x * self.x + self.z * self.z
    }

    /// Unit vector in the same direction, or zero for (near-)zero input.
    pub fn normalize(self) -> Self {
        let len = self.length();
        if len < 1.0e-4 {
            Vec3::ZERO
        } else {
            Vec3::new(self.x / len, self.y / len, self.z / len)
        }
    }

    pub fn scale(self, factor: f64) -> Self {
        Vec3::new(self.x * factor, self.y * factor, self.z * factor)
    }

    pub fn multiply(self, fx: f64, fy: f64, fz: f64) -> Self {
        Vec3::new(self.x * fx, self.y * fy, self.z * fz)
    }

    pub fn distance_to_sqr(self, other: Vec3) -> f64 {
        (self - other).length_sqr()
    }

    pub fn distance_to(self, other: Vec3) -> f64 {
        self.distance_to_sqr(other).sqrt()
    }
}

impl Add for Vec3 {
    type Output = Vec3;

    fn add(self, rhs: Vec3) -> Vec3 {
        Vec3::new(self.x + rhs.x, self.y + rhs.y, self.z + rhs.z)
    }
}

impl Sub for Vec3 {
    type Output = Vec3;

    fn sub(self, rhs: Vec3) -> Vec3 {
        Vec3::new(self.x - rhs.x, self.y - rhs.y, self.z - rhs.z)
    }
}

impl Mul<f64> for Vec3 {
    type Output = Vec3;

    fn mul(self, rhs: f64) -> Vec3 {
        self.scale(rhs)
    }
}

impl Neg for Vec3 {
    type Output = Vec3;

    fn neg(self) -> Vec3 {
        Vec3::new(-self.x, -self.y, -self.z)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn containing_floors_negative_coordinates() {
        let pos = BlockPos::containing(Vec3::new(-0.5, 4.0, 1.99));
        assert_eq!(pos, BlockPos::new(-1, 4, 1));
    }

    #[test]
    fn between_closed_counts_every_cell() {
        let cells: Vec<_> =
            BlockPos::between_closed(BlockPos::new(-1, 0, -1), BlockPos::new(1, 1, 1)).collect();
        assert_eq!(cells.len(), 18);
        assert_eq!(cells[0], BlockPos::new(-1, 0, -1));
        assert_eq!(cells[17], BlockPos::new(1, 1, 1));
    }

    #[test]
    fn closer_to_center_is_strict() {
        let pos = BlockPos::new(0, 0, 0);
        assert!(pos.closer_to_center_than(Vec3::new(0.5, 0.5, 1.4), 1.0));
        assert!(!pos.closer_to_center_than(Vec3::new(0.5, 0.5, 1.5), 1.0));
    }

    #[test]
    fn normalize_zero_stays_zero() {
        assert_eq!(Vec3::ZERO.normalize(), Vec3::ZERO);
        let n = Vec3::new(3.0, 0.0, 4.0).normalize();
        assert!((n.length() - 1.0).abs() < 1e-9);
    }

    #[test]
    fn distances() {
        assert_eq!(BlockPos::new(0, 0, 0).dist_sqr(BlockPos::new(1, 2, 2)), 9.0);
        assert_eq!(
            BlockPos::new(0, 0, 0).dist_manhattan(BlockPos::new(-1, 2, 2)),
            5
        );
    }
}
