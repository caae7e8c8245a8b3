//! Lattice gradient noise driving the band motion.
//!
//! Each lattice node carries a single scalar gradient in [-1, 1] (rather than
//! a gradient vector), and values between nodes are blended with the quintic
//! fade curve so neighbouring samples, in space and across frames, stay
//! C²-continuous.

use rand::Rng;

/// Number of distinct lattice nodes per axis
pub const LATTICE_SIZE: usize = 256;

/// Table length (lattice duplicated so corner lookups never wrap)
pub const TABLE_SIZE: usize = LATTICE_SIZE * 2;

/// Quintic fade curve `6t^5 - 15t^4 + 10t^3`
#[inline]
pub fn fade(t: f64) -> f64 {
    t * t * t * (t * (t * 6.0 - 15.0) + 10.0)
}

#[inline]
fn lerp(a: f64, b: f64, t: f64) -> f64 {
    a + t * (b - a)
}

/// Reduce a coordinate to its lattice cell (mod 256) and in-cell offset
#[inline]
fn cell(v: f64) -> (usize, f64) {
    let floor = v.floor();
    ((floor as i64 & 0xff) as usize, v - floor)
}

/// Noise generator with a shuffled permutation table and per-node gradients
#[derive(Clone)]
pub struct NoiseEngine {
    permutation: [u8; TABLE_SIZE],
    gradients: [f64; TABLE_SIZE],
}

impl NoiseEngine {
    /// Create and seed a noise engine from the given random source
    pub fn new<R: Rng + ?Sized>(rng: &mut R) -> Self {
        let mut engine = Self {
            permutation: [0; TABLE_SIZE],
            gradients: [0.0; TABLE_SIZE],
        };
        engine.init(rng);
        engine
    }

    /// (Re)seed both tables, overwriting any previous state
    pub fn init<R: Rng + ?Sized>(&mut self, rng: &mut R) {
        let mut source = [0u8; LATTICE_SIZE];
        let mut gradients = [0.0f64; LATTICE_SIZE];

        for (i, (slot, grad)) in source.iter_mut().zip(gradients.iter_mut()).enumerate() {
            *slot = i as u8;
            *grad = rng.gen_range(-1.0..=1.0);
        }

        // Fisher-Yates shuffle
        for i in (1..LATTICE_SIZE).rev() {
            let j = rng.gen_range(0..=i);
            source.swap(i, j);
        }

        self.permutation[..LATTICE_SIZE].copy_from_slice(&source);
        self.permutation[LATTICE_SIZE..].copy_from_slice(&source);
        self.gradients[..LATTICE_SIZE].copy_from_slice(&gradients);
        self.gradients[LATTICE_SIZE..].copy_from_slice(&gradients);

        debug_assert!((0..LATTICE_SIZE).all(|i| {
            self.permutation[i] == self.permutation[i + LATTICE_SIZE]
                && self.gradients[i] == self.gradients[i + LATTICE_SIZE]
        }));
    }

    /// Permutation table (upper half mirrors the lower half)
    pub fn permutation(&self) -> &[u8; TABLE_SIZE] {
        &self.permutation
    }

    /// Per-node gradient table (upper half mirrors the lower half)
    pub fn gradients(&self) -> &[f64; TABLE_SIZE] {
        &self.gradients
    }

    #[inline]
    fn perm(&self, i: usize) -> usize {
        self.permutation[i] as usize
    }

    /// Gradient table index for lattice corner (x, y, z), each in [0, 256]
    #[inline]
    pub fn corner_index(&self, x: usize, y: usize, z: usize) -> usize {
        self.perm(self.perm(x) + y) + z
    }

    /// Sample the noise field at (x, y, z)
    ///
    /// Pure for a given engine state. Output stays within [-1, 1] since every
    /// interpolation step is a convex blend of gradients in that range.
    pub fn sample(&self, x: f64, y: f64, z: f64) -> f64 {
        let (xi, xf) = cell(x);
        let (yi, yf) = cell(y);
        let (zi, zf) = cell(z);

        let u = fade(xf);
        let v = fade(yf);
        let w = fade(zf);

        let a = self.perm(xi) + yi;
        let aa = self.perm(a) + zi;
        let ab = self.perm(a + 1) + zi;
        let b = self.perm(xi + 1) + yi;
        let ba = self.perm(b) + zi;
        let bb = self.perm(b + 1) + zi;

        let g = &self.gradients;
        lerp(
            lerp(lerp(g[aa], g[ba], u), lerp(g[ab], g[bb], u), v),
            lerp(
                lerp(g[aa + 1], g[ba + 1], u),
                lerp(g[ab + 1], g[bb + 1], u),
                v,
            ),
            w,
        )
    }
}
