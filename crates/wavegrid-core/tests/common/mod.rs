#![allow(dead_code)]

use wavegrid_core::RealGrid;

/// Small deterministic generator so synthetic frames are reproducible.
pub struct Lcg(u64);

impl Lcg {
    pub fn new(seed: u64) -> Self {
        Self(seed)
    }

    /// Uniform sample in `[0, 1)`.
    pub fn next_f64(&mut self) -> f64 {
        self.0 = self
            .0
            .wrapping_mul(6364136223846793005)
            .wrapping_add(1442695040888963407);
        (self.0 >> 11) as f64 / (1u64 << 53) as f64
    }

    /// Uniform sample in `[-amp, amp)`.
    pub fn noise(&mut self, amp: f64) -> f64 {
        amp * (2.0 * self.next_f64() - 1.0)
    }
}

/// Grid whose cell values are `row * cols + col`.
pub fn ramp_grid(rows: usize, cols: usize) -> RealGrid {
    RealGrid::from_shape_fn(rows, cols, |r, c| (r * cols + c) as f64)
}

/// Grid filled with uniform noise in `[0, 1)`.
pub fn random_grid(rows: usize, cols: usize, seed: u64) -> RealGrid {
    let mut rng = Lcg::new(seed);
    RealGrid::from_shape_fn(rows, cols, |_, _| rng.next_f64())
}

/// Build a grid from nested row literals.
pub fn grid_from_rows(rows: &[&[f64]]) -> RealGrid {
    let cols = rows.first().map_or(0, |r| r.len());
    let samples: Vec<f64> = rows.iter().flat_map(|r| r.iter().copied()).collect();
    RealGrid::from_row_major(rows.len(), cols, samples).expect("rectangular rows")
}

/// Annular pupil: bright ring between `inner` and `outer` radius around the
/// grid center, dark background and dark central obstruction, plus noise.
pub fn annular_pupil(
    size: usize,
    outer: f64,
    inner: f64,
    bright: f64,
    dark: f64,
    noise: f64,
    seed: u64,
) -> RealGrid {
    let mut rng = Lcg::new(seed);
    let center = size as f64 / 2.0;
    RealGrid::from_shape_fn(size, size, |r, c| {
        let d = (r as f64 - center).hypot(c as f64 - center);
        let base = if d <= outer && d > inner { bright } else { dark };
        base + rng.noise(noise)
    })
}

/// Defocused disk whose edge falls linearly from `peak` to `background`
/// over `ramp` pixels, plus noise.
pub fn ramp_disk(
    size: usize,
    radius: f64,
    ramp: f64,
    peak: f64,
    background: f64,
    noise: f64,
    seed: u64,
) -> RealGrid {
    let mut rng = Lcg::new(seed);
    let center = size as f64 / 2.0;
    RealGrid::from_shape_fn(size, size, |r, c| {
        let d = (r as f64 - center).hypot(c as f64 - center);
        let base = if d <= radius {
            peak
        } else if d < radius + ramp {
            peak + (background - peak) * (d - radius) / ramp
        } else {
            background
        };
        base + rng.noise(noise)
    })
}

pub fn assert_grids_close(a: &RealGrid, b: &RealGrid, tol: f64) {
    assert_eq!(a.shape(), b.shape());
    for (i, (x, y)) in a.iter().zip(b.iter()).enumerate() {
        assert!((x - y).abs() < tol, "cell {i}: {x} vs {y}");
    }
}
