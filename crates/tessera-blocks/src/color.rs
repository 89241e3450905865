use crate::Block;

pub const TINT_MIN: f32 = 0.85;
pub const TINT_MAX: f32 = 1.15;

#[inline]
fn mix32(mut h: u32) -> u32 {
    h ^= h >> 16;
    h = h.wrapping_mul(0x7feb_352d);
    h ^= h >> 15;
    h = h.wrapping_mul(0x846c_a68b);
    h ^= h >> 16;
    h
}

/// Deterministic grass tint for a chunk key, in `[TINT_MIN, TINT_MAX]`.
pub fn chunk_tint(cx: i32, cy: i32, cz: i32) -> f32 {
    let seed = (cx as u32).wrapping_mul(0x85eb_ca6b)
        ^ (cy as u32).wrapping_mul(0x27d4_eb2d)
        ^ (cz as u32).wrapping_mul(0xc2b2_ae35);
    // Two rounds: the first decorrelates neighbouring keys, the second acts as the PRNG step.
    let r = mix32(mix32(seed).wrapping_add(0x9E37_79B9));
    let unit = (r >> 8) as f32 / (1u32 << 24) as f32;
    TINT_MIN + unit * (TINT_MAX - TINT_MIN)
}

/// Vertex color for a face of `block`; only grass is scaled by the chunk tint.
#[inline]
pub fn face_color(block: Block, tint: f32) -> [f32; 3] {
    let c = block.base_color();
    match block {
        Block::Grass => [
            (c[0] * tint).min(1.0),
            (c[1] * tint).min(1.0),
            (c[2] * tint).min(1.0),
        ],
        _ => c,
    }
}
