//! Stateless hash-based randomness.
//!
//! Every random value the renderer uses is a pure function of where it is
//! needed: pixel coordinates and sample index for camera rays, the hit point
//! for scattering. Nothing here holds shared mutable state, which is what lets
//! any worker render any scanline and still get bit-identical results.

use glint_math::Vec3;

const NOISE_SEED: u32 = 1;

const BIT_NOISE_1: u32 = 0xB529_7A4D;
const BIT_NOISE_2: u32 = 0x68E3_1DA4;
const BIT_NOISE_3: u32 = 0x1B56_C4E9;

const PRIME_1: i32 = 198_491_317;
const PRIME_2: i32 = 6_542_989;

/// Scale applied to real coordinates before hashing them.
const QUANTIZE_SCALE: f64 = 1.0e9;

/// Squirrel-style integer hash of a single coordinate.
pub fn noise_1d(x: i32) -> u32 {
    let mut mangled = x as u32;
    mangled = mangled.wrapping_mul(BIT_NOISE_1);
    mangled = mangled.wrapping_add(NOISE_SEED);
    mangled ^= mangled >> 8;
    mangled = mangled.wrapping_add(BIT_NOISE_2);
    mangled ^= mangled << 8;
    mangled = mangled.wrapping_mul(BIT_NOISE_3);
    mangled ^= mangled >> 8;
    mangled
}

/// Hash of three integer coordinates.
pub fn noise_3d(x: i32, y: i32, z: i32) -> u32 {
    let folded = x
        .wrapping_add(PRIME_1.wrapping_mul(y))
        .wrapping_add(PRIME_2.wrapping_mul(z));
    noise_1d(folded)
}

/// One xorshift step; advances a local chain of values from a hash.
pub fn xorshift(mut seed: u32) -> u32 {
    seed ^= seed << 13;
    seed ^= seed >> 17;
    seed ^= seed << 5;
    seed
}

/// Map a 32-bit value onto `[0, 1]`.
pub fn unit_real(rng: u32) -> f64 {
    rng as f64 / u32::MAX as f64
}

/// Fold a real coordinate into an integer for hashing.
///
/// Out of range values wrap, the same way the hashes themselves do.
pub fn quantize(v: f64) -> i32 {
    (QUANTIZE_SCALE * v) as i64 as i32
}

/// Seed for one sample of one pixel.
pub fn pixel_seed(row: u32, column: u32, sample: u32) -> u32 {
    noise_3d(row as i32, column as i32, sample as i32)
}

/// A pseudo-random unit vector derived from a position and a salt.
///
/// The salt separates otherwise identical positions, e.g. different paths or
/// bounces that happen to land on the same point.
pub fn random_unit_vector(position: Vec3, salt: u32) -> Vec3 {
    let hashed = noise_3d(
        quantize(position.x),
        quantize(position.y),
        quantize(position.z),
    );
    let mut stream = NoiseStream::new(hashed ^ noise_1d(salt as i32));

    let v = Vec3::new(
        stream.next_real() - 0.5,
        stream.next_real() - 0.5,
        stream.next_real() - 0.5,
    );
    v.try_normalize().unwrap_or(Vec3::Y)
}

/// A short, local chain of values grown from one hash.
///
/// Owned by a single sample on a single thread and thrown away afterwards,
/// so it never becomes shared generator state.
#[derive(Debug, Clone, Copy)]
pub struct NoiseStream {
    state: u32,
}

impl NoiseStream {
    pub fn new(seed: u32) -> Self {
        Self { state: seed }
    }

    pub fn next_u32(&mut self) -> u32 {
        self.state = xorshift(self.state);
        self.state
    }

    /// Next value in `[0, 1]`.
    pub fn next_real(&mut self) -> f64 {
        unit_real(self.next_u32())
    }
}
