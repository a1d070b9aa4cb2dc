mod common;

use approx::assert_abs_diff_eq;
use tempfile::TempDir;

use wavegrid_core::detection::{extract_aperture, ApertureConfig, ThresholdMethod};
use wavegrid_core::fourier::{self, Centering};
use wavegrid_core::grid::grid_to_gray_image;
use wavegrid_core::pipeline::{NeverCancel, Pipeline};
use wavegrid_core::resample::rescale_flux;
use wavegrid_core::{ComplexGrid, RealGrid};

use common::annular_pupil;

#[test]
fn test_pupil_image_to_mask_file() {
    let tmp = TempDir::new().unwrap();
    let input = tmp.path().join("pupil.png");
    let pupil = annular_pupil(64, 20.0, 7.0, 0.8, 0.05, 0.01, 3);
    grid_to_gray_image(&pupil).save(&input).unwrap();

    let signal = RealGrid::from_image(&image::open(&input).unwrap());
    assert_eq!(signal.shape(), (64, 64));

    let config = ApertureConfig {
        threshold: ThresholdMethod::Fixed(0.4),
        ..ApertureConfig::default()
    };
    let extraction = extract_aperture(&signal, &config, &NeverCancel).unwrap();
    assert_abs_diff_eq!(extraction.metrics.radius, 20.0, epsilon = 0.5);

    let mask_path = tmp.path().join("pupil_mask.png");
    grid_to_gray_image(&extraction.mask).save(&mask_path).unwrap();
    let reloaded = RealGrid::from_image(&image::open(&mask_path).unwrap());
    assert_eq!(reloaded.count_nonzero(), extraction.mask.count_nonzero());
}

#[test]
fn test_fourier_filter_pipeline() {
    // Low-pass by masking the centered spectrum: a constant image survives.
    let (rows, cols) = (16, 16);
    let keep = RealGrid::from_shape_fn(rows, cols, |r, c| {
        let dr = r as f64 - 8.0;
        let dc = c as f64 - 8.0;
        if dr.hypot(dc) <= 2.0 {
            1.0
        } else {
            0.0
        }
    });

    let mut pipeline = Pipeline::new()
        .try_stage("forward", |z: ComplexGrid| {
            fourier::forward(z, Centering::Centered, &NeverCancel)
        })
        .stage("low-pass", |z: ComplexGrid| z.mul_real(&keep))
        .try_stage("inverse", |z: ComplexGrid| {
            fourier::inverse(z, Centering::Centered, &NeverCancel)
        });

    let input = ComplexGrid::from_real(RealGrid::from_elem(rows, cols, 0.7));
    let out = pipeline.run(input, &NeverCancel).unwrap();
    common::assert_grids_close(out.real(), &RealGrid::from_elem(rows, cols, 0.7), 1e-10);
    assert!(out.imag().iter().all(|v| v.abs() < 1e-10));
}

#[test]
fn test_rescale_then_measure() {
    // Shrinking the pupil by half quarters its area but keeps its flux.
    let pupil = annular_pupil(96, 30.0, 0.0, 1.0, 0.0, 0.0, 1);
    let small = rescale_flux(&pupil, 0.5);
    assert_abs_diff_eq!(small.sum() / pupil.sum(), 1.0, epsilon = 0.02);

    let config = ApertureConfig {
        threshold: ThresholdMethod::Fixed(0.5),
        hot_pixel_radius: 0,
        ..ApertureConfig::default()
    };
    let metrics = extract_aperture(&small, &config, &NeverCancel).unwrap().metrics;
    assert_abs_diff_eq!(metrics.radius, 15.0, epsilon = 1.0);
}
