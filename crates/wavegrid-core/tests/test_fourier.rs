mod common;

use std::sync::atomic::AtomicBool;

use approx::assert_abs_diff_eq;
use wavegrid_core::fourier::{forward, forward_real, inverse, Centering};
use wavegrid_core::pipeline::{CancelFn, NeverCancel};
use wavegrid_core::{ComplexGrid, GridError, RealGrid};

use common::{assert_grids_close, random_grid};

fn random_complex(rows: usize, cols: usize, seed: u64) -> ComplexGrid {
    ComplexGrid::new(random_grid(rows, cols, seed), random_grid(rows, cols, seed + 1))
}

fn energy(z: &ComplexGrid) -> f64 {
    z.norm().sum()
}

// ---------------------------------------------------------------------------
// Round trips
// ---------------------------------------------------------------------------

#[test]
fn test_roundtrip_both_modes() {
    for (rows, cols) in [(1, 1), (2, 2), (5, 7), (64, 64)] {
        for centering in [Centering::Uncentered, Centering::Centered] {
            let input = random_complex(rows, cols, 17);
            let (re, im) = (input.real().clone(), input.imag().clone());

            let spectrum = forward(input, centering, &NeverCancel).unwrap();
            let back = inverse(spectrum, centering, &NeverCancel).unwrap();

            assert_eq!(back.shape(), (rows, cols));
            assert_grids_close(back.real(), &re, 1e-10);
            assert_grids_close(back.imag(), &im, 1e-10);
        }
    }
}

#[test]
fn test_parseval() {
    for centering in [Centering::Uncentered, Centering::Centered] {
        let input = random_complex(12, 9, 3);
        let before = energy(&input);
        let spectrum = forward(input, centering, &NeverCancel).unwrap();
        assert_abs_diff_eq!(energy(&spectrum), before, epsilon = 1e-9);
    }
}

// ---------------------------------------------------------------------------
// Layout of the spectrum
// ---------------------------------------------------------------------------

#[test]
fn test_constant_grid_dc_term_uncentered() {
    let g = RealGrid::from_elem(4, 8, 1.0);
    let spectrum = forward_real(g, Centering::Uncentered, &NeverCancel).unwrap();
    // Unitary scaling: DC = sum / sqrt(N) = 32 / sqrt(32).
    assert_abs_diff_eq!(spectrum.real().get(0, 0), 32f64.sqrt(), epsilon = 1e-12);
    let rest: f64 = spectrum.modulus().iter().sum::<f64>() - spectrum.modulus().get(0, 0);
    assert_abs_diff_eq!(rest, 0.0, epsilon = 1e-10);
}

#[test]
fn test_constant_grid_dc_term_centered() {
    // rows / 2 + cols / 2 is odd here; the DC term must stay positive.
    let g = RealGrid::from_elem(6, 8, 1.0);
    let spectrum = forward_real(g, Centering::Centered, &NeverCancel).unwrap();
    assert_abs_diff_eq!(spectrum.real().get(3, 4), 48f64.sqrt(), epsilon = 1e-12);
    assert_abs_diff_eq!(spectrum.imag().get(3, 4), 0.0, epsilon = 1e-12);
    assert_abs_diff_eq!(spectrum.modulus().sum(), 48f64.sqrt(), epsilon = 1e-9);
}

#[test]
fn test_centered_matches_shifted_spectrum() {
    for (rows, cols, seed) in [(8, 6, 5), (8, 8, 6), (6, 10, 7), (2, 4, 8)] {
        let input = random_complex(rows, cols, seed);
        let plain = forward(input.clone(), Centering::Uncentered, &NeverCancel).unwrap();
        let centered = forward(input, Centering::Centered, &NeverCancel).unwrap();
        let shifted = plain.fourier_shift();
        assert_grids_close(centered.real(), shifted.real(), 1e-10);
        assert_grids_close(centered.imag(), shifted.imag(), 1e-10);
    }
}

#[test]
fn test_centered_inverse_of_shifted_spectrum() {
    let input = random_complex(8, 6, 11);
    let (re, im) = (input.real().clone(), input.imag().clone());
    let shifted = forward(input, Centering::Uncentered, &NeverCancel)
        .unwrap()
        .fourier_shift();
    let back = inverse(shifted, Centering::Centered, &NeverCancel).unwrap();
    assert_grids_close(back.real(), &re, 1e-10);
    assert_grids_close(back.imag(), &im, 1e-10);
}

#[test]
fn test_centered_product_is_convolution() {
    // A delta at the origin convolved with b is b; unitary scaling leaves a
    // factor of 1 / sqrt(N) on the product of spectra.
    let (rows, cols) = (8, 8);
    let delta = RealGrid::from_shape_fn(rows, cols, |r, c| if r + c == 0 { 1.0 } else { 0.0 });
    let b = random_grid(rows, cols, 21);

    let fd = forward_real(delta, Centering::Centered, &NeverCancel).unwrap();
    let fb = forward_real(b.clone(), Centering::Centered, &NeverCancel).unwrap();
    let product = &fd.to_complex_array() * &fb.to_complex_array();
    let out = inverse(
        ComplexGrid::from_complex_array(&product),
        Centering::Centered,
        &NeverCancel,
    )
    .unwrap();

    let n = ((rows * cols) as f64).sqrt();
    assert_grids_close(&out.real().scale(n), &b, 1e-10);
    assert!(out.imag().iter().all(|v| v.abs() < 1e-10));
}

#[test]
fn test_single_frequency() {
    // cos(2 pi c / 8) along columns puts energy at column frequencies +-1.
    let g = RealGrid::from_shape_fn(4, 8, |_, c| {
        (2.0 * std::f64::consts::PI * c as f64 / 8.0).cos()
    });
    let modulus = forward_real(g, Centering::Uncentered, &NeverCancel)
        .unwrap()
        .modulus();
    let expected = 32f64.sqrt() / 2.0;
    assert_abs_diff_eq!(modulus.get(0, 1), expected, epsilon = 1e-10);
    assert_abs_diff_eq!(modulus.get(0, 7), expected, epsilon = 1e-10);
    assert_abs_diff_eq!(modulus.get(0, 0), 0.0, epsilon = 1e-10);
}

#[test]
fn test_empty_grid() {
    let out = forward(ComplexGrid::zeros(0, 0), Centering::Centered, &NeverCancel).unwrap();
    assert_eq!(out.shape(), (0, 0));
}

// ---------------------------------------------------------------------------
// Cancellation
// ---------------------------------------------------------------------------

#[test]
fn test_cancelled_before_start() {
    let cancel = AtomicBool::new(true);
    let result = forward(random_complex(4, 4, 1), Centering::Uncentered, &cancel);
    assert!(matches!(result, Err(GridError::Cancelled)));
}

#[test]
fn test_cancelled_after_transform() {
    // Second poll reports cancellation.
    let polls = std::cell::Cell::new(0);
    let cancel = CancelFn(|| {
        polls.set(polls.get() + 1);
        polls.get() > 1
    });
    let result = inverse(random_complex(4, 4, 1), Centering::Centered, &cancel);
    assert!(matches!(result, Err(GridError::Cancelled)));
    assert_eq!(polls.get(), 2);
}
