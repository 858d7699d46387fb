//! Deterministic coordinate hash
//!
//! The single source of "randomness" for world generation. Pure integer
//! mixing, so results are identical on every platform and every run.

/// Hash a tile coordinate and channel seed to a value in [0, 1)
#[inline]
pub fn hash(x: i32, y: i32, seed: u32) -> f32 {
    let mut h = (x as u32 as u64).wrapping_mul(0x9E37_79B9_7F4A_7C15)
        ^ (y as u32 as u64).wrapping_mul(0xC2B2_AE3D_27D4_EB4F)
        ^ (seed as u64).wrapping_mul(0x1656_67B1_9E37_79F9)
        ^ 0x2545_F491_4F6C_DD1D;

    // splitmix64 finalizer
    h ^= h >> 30;
    h = h.wrapping_mul(0xBF58_476D_1CE4_E5B9);
    h ^= h >> 27;
    h = h.wrapping_mul(0x94D0_49BB_1331_11EB);
    h ^= h >> 31;

    // Top 24 bits fit an f32 mantissa exactly
    (h >> 40) as f32 / (1u32 << 24) as f32
}
