//! Cell coordinates, hashing, and key derivation for the spatial index
//! (§4.2). Generalized from the teacher's 2D `spatial_hash.rs` (9-neighbor,
//! two hash primes) to 3D (27-neighbor, three hash primes).

use glam::Vec3;

/// The 27 offsets of a `{-1,0,1}³` neighborhood, including the origin cell.
pub const OFFSETS_3D: [(i32, i32, i32); 27] = [
    (-1, -1, -1),
    (-1, -1, 0),
    (-1, -1, 1),
    (-1, 0, -1),
    (-1, 0, 0),
    (-1, 0, 1),
    (-1, 1, -1),
    (-1, 1, 0),
    (-1, 1, 1),
    (0, -1, -1),
    (0, -1, 0),
    (0, -1, 1),
    (0, 0, -1),
    (0, 0, 0),
    (0, 0, 1),
    (0, 1, -1),
    (0, 1, 0),
    (0, 1, 1),
    (1, -1, -1),
    (1, -1, 0),
    (1, -1, 1),
    (1, 0, -1),
    (1, 0, 0),
    (1, 0, 1),
    (1, 1, -1),
    (1, 1, 0),
    (1, 1, 1),
];

const HASH_K1: i32 = 73856093;
const HASH_K2: i32 = 19349663;
const HASH_K3: i32 = 83492791;

/// `cell(p) = floor(p / h)` component-wise, as signed integers.
pub fn cell_coord(position: Vec3, smoothing_radius: f32) -> (i32, i32, i32) {
    (
        (position.x / smoothing_radius).floor() as i32,
        (position.y / smoothing_radius).floor() as i32,
        (position.z / smoothing_radius).floor() as i32,
    )
}

/// `(cell.x · 73856093) xor (cell.y · 19349663) xor (cell.z · 83492791)`,
/// 32-bit arithmetic with wrap-around.
pub fn hash_cell(cell: (i32, i32, i32)) -> u32 {
    let a = cell.0.wrapping_mul(HASH_K1) as u32;
    let b = cell.1.wrapping_mul(HASH_K2) as u32;
    let c = cell.2.wrapping_mul(HASH_K3) as u32;
    a ^ b ^ c
}

/// `hash mod table_size`. `table_size` is always the particle count `N`.
pub fn key_from_hash(hash: u32, table_size: u32) -> u32 {
    hash % table_size
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn cell_coord_floors_toward_negative_infinity() {
        assert_eq!(cell_coord(Vec3::new(-0.01, 0.0, 0.19), 0.2), (-1, 0, 0));
        assert_eq!(cell_coord(Vec3::new(0.39, 0.4, 0.41), 0.2), (1, 2, 2));
    }

    #[test]
    fn key_is_always_in_range() {
        for x in -5..5 {
            for y in -5..5 {
                for z in -5..5 {
                    let key = key_from_hash(hash_cell((x, y, z)), 37);
                    assert!(key < 37);
                }
            }
        }
    }
}
