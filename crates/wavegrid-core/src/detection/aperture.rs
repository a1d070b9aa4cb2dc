use std::f64::consts::PI;

use serde::{Deserialize, Serialize};
use tracing::{info, warn};

use crate::error::Result;
use crate::filters::median_filter;
use crate::grid::{is_foreground, RealGrid};
use crate::pipeline::{Cancellation, Pipeline};
use crate::stats::{defocus_threshold, median};

use super::config::{ApertureConfig, ThresholdMethod};
use super::labeling::{interior_mask, label_components, Connectivity};
use super::threshold::threshold_label;

/// Geometry and signal level of an extracted aperture.
///
/// Holds plain numbers only; nothing refers back to the grids it came from.
#[derive(Clone, Debug, Default, PartialEq, Serialize, Deserialize)]
pub struct ApertureMetrics {
    /// Centroid column of the aperture mask.
    pub cx: f64,
    /// Centroid row of the aperture mask.
    pub cy: f64,
    /// Effective radius, `sqrt(area / pi)`.
    pub radius: f64,
    /// Effective radius of the obstruction.
    pub obstruction_radius: f64,
    /// Median signal over unobstructed aperture cells.
    pub signal: f64,
    /// Aperture area in cells, obstruction included.
    pub area: usize,
    /// Obstruction area in cells.
    pub obstruction_area: usize,
}

impl ApertureMetrics {
    /// Sentinel for "no aperture found".
    pub fn empty() -> Self {
        Self::default()
    }

    pub fn is_empty(&self) -> bool {
        self.area == 0
    }

    /// Measure an aperture from its (filled) mask, its obstruction mask and
    /// the signal grid.
    pub fn compute(aperture: &RealGrid, obstruction: &RealGrid, signal: &RealGrid) -> Self {
        aperture.assert_same_shape(obstruction, "ApertureMetrics::compute");
        aperture.assert_same_shape(signal, "ApertureMetrics::compute");

        let area = aperture.count_nonzero();
        let Some((cy, cx)) = aperture.centroid() else {
            return Self::empty();
        };
        let obstruction_area = obstruction.count_nonzero();

        let mut clear: Vec<f64> = aperture
            .iter()
            .zip(obstruction.iter())
            .zip(signal.iter())
            .filter(|&((a, o), _)| is_foreground(a) && !is_foreground(o))
            .map(|(_, s)| s)
            .collect();

        Self {
            cx,
            cy,
            radius: (area as f64 / PI).sqrt(),
            obstruction_radius: (obstruction_area as f64 / PI).sqrt(),
            signal: median(&mut clear),
            area,
            obstruction_area,
        }
    }
}

/// Result of [`extract_aperture`].
#[derive(Clone, Debug)]
pub struct ApertureExtraction {
    pub metrics: ApertureMetrics,
    /// Usable pupil: aperture minus obstruction.
    pub mask: RealGrid,
    /// Signal threshold that was applied; `0.0` when none could be found.
    pub threshold: f64,
}

impl ApertureExtraction {
    fn empty(rows: usize, cols: usize) -> Self {
        Self {
            metrics: ApertureMetrics::empty(),
            mask: RealGrid::zeros(rows, cols),
            threshold: 0.0,
        }
    }
}

/// Filled mask of the brightest fully interior region above `threshold`.
///
/// `filtered` is the hot-pixel-filtered signal and is consumed; `signal`
/// ranks candidate components by their mean.
pub fn aperture_mask(
    filtered: RealGrid,
    signal: &RealGrid,
    threshold: f64,
    connectivity: Connectivity,
    cancel: &dyn Cancellation,
) -> Result<RealGrid> {
    Pipeline::new()
        .stage("threshold", |g: RealGrid| threshold_label(&g, threshold))
        .stage("brightest interior component", |g: RealGrid| {
            label_components(&g, connectivity)
                .remove_border_components()
                .select_max_mean(signal)
        })
        .stage("interior", |g: RealGrid| interior_mask(&g))
        .run(filtered, cancel)
}

/// Filled mask of the largest fully interior dark region inside `aperture`.
///
/// `negated` is the negated (filtered) signal and is consumed; cells darker
/// than `threshold` are obstruction candidates.
pub fn obstruction_mask(
    negated: RealGrid,
    aperture: &RealGrid,
    threshold: f64,
    connectivity: Connectivity,
    cancel: &dyn Cancellation,
) -> Result<RealGrid> {
    Pipeline::new()
        .stage("threshold", |g: RealGrid| threshold_label(&g, -threshold))
        .stage("inside aperture", |g: RealGrid| g.intersect(aperture))
        .stage("largest interior component", |g: RealGrid| {
            label_components(&g, connectivity)
                .remove_border_components()
                .select_max_count()
        })
        .stage("interior", |g: RealGrid| interior_mask(&g))
        .run(negated, cancel)
}

/// Separate the optical aperture and its central obstruction in `signal`.
///
/// Median-filters hot pixels, thresholds, keeps the brightest component that
/// does not touch the border, fills it, then finds the largest dark interior
/// region inside it. Degenerate images (no threshold, no aperture) yield
/// empty metrics and an all-zero mask.
pub fn extract_aperture(
    signal: &RealGrid,
    config: &ApertureConfig,
    cancel: &dyn Cancellation,
) -> Result<ApertureExtraction> {
    let (h, w) = signal.shape();
    let filtered = median_filter(signal, config.hot_pixel_radius);

    let threshold = match &config.threshold {
        ThresholdMethod::Fixed(t) => *t,
        ThresholdMethod::Defocus(params) => {
            let t = defocus_threshold(&filtered, params);
            if t == 0.0 {
                warn!("no usable defocus threshold; skipping aperture extraction");
                return Ok(ApertureExtraction::empty(h, w));
            }
            t
        }
    };
    let dark_threshold = config.obstruction_threshold.unwrap_or(threshold);

    let negated = filtered.scale(-1.0);
    let aperture = aperture_mask(filtered, signal, threshold, config.connectivity, cancel)?;
    if aperture.count_nonzero() == 0 {
        warn!(threshold, "no interior aperture component found");
        return Ok(ApertureExtraction {
            threshold,
            ..ApertureExtraction::empty(h, w)
        });
    }

    let obstruction =
        obstruction_mask(negated, &aperture, dark_threshold, config.connectivity, cancel)?;
    let metrics = ApertureMetrics::compute(&aperture, &obstruction, signal);
    let mask = aperture.difference(&obstruction);

    info!(
        cx = metrics.cx,
        cy = metrics.cy,
        radius = metrics.radius,
        obstruction_radius = metrics.obstruction_radius,
        signal = metrics.signal,
        "Aperture extracted"
    );

    Ok(ApertureExtraction {
        metrics,
        mask,
        threshold,
    })
}
