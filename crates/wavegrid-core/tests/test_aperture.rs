mod common;

use std::sync::atomic::AtomicBool;

use approx::assert_abs_diff_eq;
use wavegrid_core::detection::aperture::{aperture_mask, obstruction_mask};
use wavegrid_core::detection::{
    extract_aperture, ApertureConfig, ApertureMetrics, Connectivity, ThresholdMethod,
};
use wavegrid_core::pipeline::NeverCancel;
use wavegrid_core::{GridError, RealGrid};

use common::{annular_pupil, ramp_disk};

/// Annular pupil (outer radius 20, obstruction radius 7) with one hot pixel
/// in the background.
fn pupil_with_hot_pixel() -> RealGrid {
    let pupil = annular_pupil(64, 20.0, 7.0, 0.8, 0.05, 0.01, 3);
    let hot = RealGrid::from_shape_fn(64, 64, |r, c| if (r, c) == (5, 5) { 1.0 } else { 0.0 });
    &pupil + &hot
}

fn fixed(threshold: f64) -> ApertureConfig {
    ApertureConfig {
        threshold: ThresholdMethod::Fixed(threshold),
        ..ApertureConfig::default()
    }
}

// ---------------------------------------------------------------------------
// Full extraction
// ---------------------------------------------------------------------------

#[test]
fn test_annular_pupil_fixed_threshold() {
    let signal = pupil_with_hot_pixel();
    let result = extract_aperture(&signal, &fixed(0.4), &NeverCancel).unwrap();
    let m = &result.metrics;

    assert_eq!(result.threshold, 0.4);
    assert!(!m.is_empty());
    assert_abs_diff_eq!(m.cx, 32.0, epsilon = 0.1);
    assert_abs_diff_eq!(m.cy, 32.0, epsilon = 0.1);
    assert_abs_diff_eq!(m.radius, 20.0, epsilon = 0.5);
    assert_abs_diff_eq!(m.obstruction_radius, 7.0, epsilon = 0.5);
    assert_abs_diff_eq!(m.signal, 0.8, epsilon = 0.02);
    assert!(m.obstruction_area > 0 && m.obstruction_area < m.area);

    // The usable mask is the ring only.
    assert_eq!(result.mask.count_nonzero(), m.area - m.obstruction_area);
    assert_eq!(result.mask.get(32, 32), 0.0);
    assert_eq!(result.mask.get(32, 45), 1.0);
    assert_eq!(result.mask.get(5, 5), 0.0);
}

#[test]
fn test_defocused_disk_adaptive_threshold() {
    let signal = ramp_disk(64, 20.0, 6.0, 1.0, 0.1, 0.02, 7);
    let result = extract_aperture(&signal, &ApertureConfig::default(), &NeverCancel).unwrap();
    let m = &result.metrics;

    assert!(result.threshold > 0.15 && result.threshold < 1.0);
    assert!(!m.is_empty());
    assert_abs_diff_eq!(m.cx, 32.0, epsilon = 0.5);
    assert_abs_diff_eq!(m.cy, 32.0, epsilon = 0.5);
    assert!(m.radius > 15.0 && m.radius < 26.0, "radius {}", m.radius);
    assert_eq!(m.obstruction_area, 0);
    assert_eq!(m.obstruction_radius, 0.0);
    assert_abs_diff_eq!(m.signal, 1.0, epsilon = 0.03);
}

#[test]
fn test_no_defocus_threshold_yields_empty() {
    // Two well separated levels: the adaptive threshold never stabilizes.
    let signal = annular_pupil(64, 20.0, 7.0, 0.8, 0.05, 0.01, 3);
    let result = extract_aperture(&signal, &ApertureConfig::default(), &NeverCancel).unwrap();
    assert!(result.metrics.is_empty());
    assert_eq!(result.metrics, ApertureMetrics::empty());
    assert_eq!(result.threshold, 0.0);
    assert_eq!(result.mask.shape(), (64, 64));
    assert_eq!(result.mask.count_nonzero(), 0);
}

#[test]
fn test_bright_border_region_is_not_an_aperture() {
    // Everything above threshold touches the border.
    let signal = RealGrid::from_shape_fn(32, 32, |_, c| if c < 10 { 1.0 } else { 0.0 });
    let result = extract_aperture(&signal, &fixed(0.5), &NeverCancel).unwrap();
    assert!(result.metrics.is_empty());
    assert_eq!(result.threshold, 0.5);
    assert_eq!(result.mask.count_nonzero(), 0);
}

#[test]
fn test_separate_obstruction_threshold() {
    let signal = pupil_with_hot_pixel();
    let config = ApertureConfig {
        obstruction_threshold: Some(0.2),
        connectivity: Connectivity::Four,
        ..fixed(0.4)
    };
    let m = extract_aperture(&signal, &config, &NeverCancel).unwrap().metrics;
    assert_abs_diff_eq!(m.radius, 20.0, epsilon = 0.5);
    assert_abs_diff_eq!(m.obstruction_radius, 7.0, epsilon = 0.5);
}

#[test]
fn test_extraction_cancelled() {
    let signal = pupil_with_hot_pixel();
    let cancel = AtomicBool::new(true);
    let result = extract_aperture(&signal, &fixed(0.4), &cancel);
    assert!(matches!(result, Err(GridError::Cancelled)));
}

// ---------------------------------------------------------------------------
// Building blocks
// ---------------------------------------------------------------------------

#[test]
fn test_aperture_mask_is_filled() {
    let signal = annular_pupil(64, 20.0, 7.0, 0.8, 0.05, 0.0, 1);
    let aperture = aperture_mask(signal.clone(), &signal, 0.4, Connectivity::Eight, &NeverCancel)
        .unwrap();
    assert_eq!(aperture.get(32, 32), 1.0);
    assert_eq!(aperture.get(0, 0), 0.0);
    let obstruction = obstruction_mask(
        signal.scale(-1.0),
        &aperture,
        0.4,
        Connectivity::Eight,
        &NeverCancel,
    )
    .unwrap();
    assert_eq!(obstruction.get(32, 32), 1.0);
    assert_eq!(obstruction.get(32, 45), 0.0);
}

#[test]
fn test_metrics_compute() {
    let aperture = RealGrid::from_shape_fn(10, 10, |r, c| {
        if (2..8).contains(&r) && (3..9).contains(&c) {
            1.0
        } else {
            0.0
        }
    });
    let obstruction = RealGrid::from_shape_fn(10, 10, |r, c| if (r, c) == (4, 5) { 1.0 } else { 0.0 });
    let signal = RealGrid::from_shape_fn(10, 10, |r, c| if (r, c) == (4, 5) { 0.0 } else { 2.0 });

    let m = ApertureMetrics::compute(&aperture, &obstruction, &signal);
    assert_eq!(m.area, 36);
    assert_eq!(m.obstruction_area, 1);
    assert_abs_diff_eq!(m.cy, 4.5, epsilon = 1e-12);
    assert_abs_diff_eq!(m.cx, 5.5, epsilon = 1e-12);
    assert_abs_diff_eq!(m.radius, (36.0 / std::f64::consts::PI).sqrt(), epsilon = 1e-12);
    assert_eq!(m.signal, 2.0);
}

#[test]
fn test_metrics_of_empty_aperture() {
    let zeros = RealGrid::zeros(4, 4);
    let m = ApertureMetrics::compute(&zeros, &zeros, &zeros);
    assert!(m.is_empty());
}
