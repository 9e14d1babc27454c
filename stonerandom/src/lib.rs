// Every value produced here must be identical on every platform and every run.
// Only wrapping u32 arithmetic and IEEE f64 operations are used, no hasher
// with random keys and no global state.

use std::f64::consts::PI;
use std::num::NonZeroU32;

/// Replacement for a seed or generator state that came out as zero.
/// An all-zero xorshift state would only ever produce zeros.
pub const ZERO_SEED_REPLACEMENT: u32 = 0x9E37_79B9;

const REMAPPED_SEED: NonZeroU32 = match NonZeroU32::new(ZERO_SEED_REPLACEMENT) {
    Some(seed) => seed,
    None => panic!("replacement seed must be non-zero"),
};

const X_MULTIPLIER: u32 = 73_856_093;
const Y_MULTIPLIER: u32 = 19_349_663;
const MOVE_MULTIPLIER: u32 = 83_492_791;

/// Smallest first uniform fed into the Box-Muller logarithm.
const MIN_UNIFORM: f64 = 1e-9;

/// Derive the deterministic seed for a board cell at a given move.
///
/// Coordinates and the move index are offset and absolute-valued before
/// hashing so negative inputs never reach the unsigned arithmetic. `salt`
/// is normally [`fingerprint_salt`] of the game fingerprint.
pub fn seed(x: i64, y: i64, move_index: i64, salt: u32) -> NonZeroU32 {
    let ax = x.wrapping_add(11).unsigned_abs() as u32;
    let ay = y.wrapping_add(17).unsigned_abs() as u32;
    let am = move_index.wrapping_add(23).unsigned_abs() as u32;

    let h = ax.wrapping_mul(X_MULTIPLIER)
        ^ ay.wrapping_mul(Y_MULTIPLIER)
        ^ am.wrapping_mul(MOVE_MULTIPLIER)
        ^ salt;

    NonZeroU32::new(h).unwrap_or(REMAPPED_SEED)
}

/// 32-bit FNV-1a over the UTF-8 bytes of a fingerprint.
///
/// Used to fold a game fingerprint into [`seed`]. Stable across processes,
/// unlike `std::collections::hash_map::DefaultHasher`.
pub fn fingerprint_salt(fingerprint: &str) -> u32 {
    const OFFSET_BASIS: u32 = 0x811C_9DC5;
    const PRIME: u32 = 0x0100_0193;

    fingerprint
        .bytes()
        .fold(OFFSET_BASIS, |h, b| (h ^ b as u32).wrapping_mul(PRIME))
}

/// Marsaglia xorshift32 generator (13, 17, 5).
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub struct XorShift32 {
    state: u32,
}

impl XorShift32 {
    /// Create a generator from a seed. A zero seed is remapped.
    pub fn new(seed: u32) -> Self {
        Self {
            state: if seed == 0 { ZERO_SEED_REPLACEMENT } else { seed },
        }
    }

    /// Create a generator from a cell seed.
    pub fn from_seed(seed: NonZeroU32) -> Self {
        Self { state: seed.get() }
    }

    /// Advance the state and return it.
    #[inline]
    pub fn next_u32(&mut self) -> u32 {
        step(&mut self.state)
    }

    /// Uniform value in (0, 1).
    #[inline]
    pub fn next_unit(&mut self) -> f64 {
        to_unit(self.next_u32())
    }

    /// Next pair of standard-normal samples.
    pub fn next_gaussian_pair(&mut self) -> (f64, f64) {
        next_gaussian_pair(&mut self.state)
    }

    /// Current raw state, for diagnostics and tests.
    pub fn state(&self) -> u32 {
        self.state
    }
}

#[inline]
fn step(state: &mut u32) -> u32 {
    if *state == 0 {
        *state = ZERO_SEED_REPLACEMENT;
    }
    let mut s = *state;
    s ^= s << 13;
    s ^= s >> 17;
    s ^= s << 5;
    *state = s;
    s
}

#[inline]
fn to_unit(s: u32) -> f64 {
    // s is never zero after a step from a non-zero state
    s as f64 / 4_294_967_296.0
}

/// Box-Muller transform over two xorshift steps of `state`.
///
/// Returns `(mag * cos(a), mag * sin(a))` with `mag = sqrt(-2 ln u1)` and
/// `a = 2π u2`. `u1` is floored to 1e-9 so the logarithm stays finite.
pub fn next_gaussian_pair(state: &mut u32) -> (f64, f64) {
    let u1 = to_unit(step(state)).max(MIN_UNIFORM);
    let u2 = to_unit(step(state));

    let mag = (-2.0 * u1.ln()).sqrt();
    let angle = 2.0 * PI * u2;

    (mag * angle.cos(), mag * angle.sin())
}
