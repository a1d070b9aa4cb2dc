use serde::{Deserialize, Serialize};
use tracing::{debug, warn};

use crate::consts::{
    DEFAULT_DEFOCUS_BINS, DEFAULT_DEFOCUS_MIN_BINS, DEFAULT_DEFOCUS_SIGMA,
    DEFAULT_PEAK_NEIGHBORHOOD, MAX_EMPTY_BIN_FRACTION,
};
use crate::grid::RealGrid;

use super::robust::{median, sn};

/// Equal-width histogram over `[min, max]`.
#[derive(Clone, Debug)]
pub struct Histogram {
    /// Per-bin sample counts.
    pub counts: Vec<f64>,
    pub min: f64,
    pub max: f64,
}

impl Histogram {
    /// Bin `values` into `bins` equal bins spanning `[min, max]`.
    ///
    /// Values outside the range are clamped into the first or last bin.
    pub fn build<I>(values: I, bins: usize, min: f64, max: f64) -> Self
    where
        I: IntoIterator<Item = f64>,
    {
        let bins = bins.max(1);
        let mut counts = vec![0.0; bins];
        let width = (max - min) / bins as f64;
        for v in values {
            let bin = if width > 0.0 {
                (((v - min) / width).floor().max(0.0) as usize).min(bins - 1)
            } else {
                0
            };
            counts[bin] += 1.0;
        }
        Self { counts, min, max }
    }

    /// Histogram of a grid over its own value range. `None` for empty grids.
    pub fn of_grid(grid: &RealGrid, bins: usize) -> Option<Self> {
        let (lo, hi) = grid.min_max()?;
        Some(Self::build(grid.iter(), bins, lo, hi))
    }

    pub fn bins(&self) -> usize {
        self.counts.len()
    }

    pub fn bin_width(&self) -> f64 {
        (self.max - self.min) / self.bins() as f64
    }

    /// Value at a (possibly fractional) bin index, measured at bin centers.
    pub fn value_at(&self, index: f64) -> f64 {
        self.min + (index + 0.5) * self.bin_width()
    }
}

/// Indices of local maxima in `counts`.
///
/// A non-empty bin is a peak when no bin within `neighborhood` on either side
/// is larger. On a plateau only the leftmost bin counts.
pub fn find_peaks(counts: &[f64], neighborhood: usize) -> Vec<usize> {
    let n = counts.len();
    let mut peaks = Vec::new();
    for (i, &c) in counts.iter().enumerate() {
        if c <= 0.0 {
            continue;
        }
        let lo = i.saturating_sub(neighborhood);
        let hi = (i + neighborhood + 1).min(n);
        let left_ok = counts[lo..i].iter().all(|&v| v < c);
        let right_ok = counts[i + 1..hi].iter().all(|&v| v <= c);
        if left_ok && right_ok {
            peaks.push(i);
        }
    }
    peaks
}

/// Parameters for the adaptive defocus threshold.
#[derive(Clone, Debug, PartialEq, Serialize, Deserialize)]
pub struct DefocusParams {
    /// Initial histogram bin count.
    #[serde(default = "default_bins")]
    pub bins: usize,
    /// The bin count is halved on sparse histograms but never below this.
    #[serde(default = "default_min_bins")]
    pub min_bins: usize,
    /// Half-width of the peak detector window, in bins.
    #[serde(default = "default_neighborhood")]
    pub neighborhood: usize,
    /// Multiplier on Sn of the bin counts. Larger values raise the threshold.
    #[serde(default = "default_sigma")]
    pub sigma: f64,
}

fn default_bins() -> usize {
    DEFAULT_DEFOCUS_BINS
}
fn default_min_bins() -> usize {
    DEFAULT_DEFOCUS_MIN_BINS
}
fn default_neighborhood() -> usize {
    DEFAULT_PEAK_NEIGHBORHOOD
}
fn default_sigma() -> f64 {
    DEFAULT_DEFOCUS_SIGMA
}

impl Default for DefocusParams {
    fn default() -> Self {
        Self {
            bins: DEFAULT_DEFOCUS_BINS,
            min_bins: DEFAULT_DEFOCUS_MIN_BINS,
            neighborhood: DEFAULT_PEAK_NEIGHBORHOOD,
            sigma: DEFAULT_DEFOCUS_SIGMA,
        }
    }
}

/// Adaptive threshold separating a defocused pupil from the background.
///
/// Builds a histogram, keeps the span between the first and last peak, and
/// halves the bin count while more than 10% of that span is empty. The count
/// level `median + sigma * Sn` of the span is then located by walking down
/// from the last peak, and the crossing is mapped back to a sample value by
/// interpolating between bin centers.
///
/// Returns `0.0` when no usable threshold exists: empty or constant grids,
/// fewer than two peaks, a histogram that never stops being sparse before
/// reaching `min_bins`, or a level the counts never cross.
pub fn defocus_threshold(grid: &RealGrid, params: &DefocusParams) -> f64 {
    let Some((lo, hi)) = grid.min_max() else {
        warn!("defocus threshold on empty grid");
        return 0.0;
    };
    if hi <= lo {
        warn!(value = lo, "defocus threshold on constant grid");
        return 0.0;
    }

    let min_bins = params.min_bins.max(2);
    let mut bins = params.bins;
    while bins >= min_bins {
        let hist = Histogram::build(grid.iter(), bins, lo, hi);
        let peaks = find_peaks(&hist.counts, params.neighborhood);
        let (first, last) = match (peaks.first(), peaks.last()) {
            (Some(&first), Some(&last)) if peaks.len() >= 2 => (first, last),
            _ => {
                debug!(bins, peaks = peaks.len(), "fewer than two histogram peaks");
                return 0.0;
            }
        };

        let span = &hist.counts[first..=last];
        let empty = span.iter().filter(|&&c| c == 0.0).count();
        if empty as f64 > MAX_EMPTY_BIN_FRACTION * span.len() as f64 {
            debug!(bins, empty, span = span.len(), "sparse histogram, halving bins");
            bins /= 2;
            continue;
        }

        let mut scratch = span.to_vec();
        let level = median(&mut scratch) + params.sigma * sn(span);
        return match crossing_below(span, level) {
            Some(index) => {
                let threshold = hist.value_at(first as f64 + index);
                debug!(bins, level, threshold, "defocus threshold found");
                threshold
            }
            None => {
                debug!(bins, level, "histogram never drops below level");
                0.0
            }
        };
    }

    debug!(min_bins, "defocus threshold did not stabilize");
    0.0
}

/// Walk down from the top of `counts` to the first place where the counts
/// fall below `level`, returning the fractional index of the crossing.
fn crossing_below(counts: &[f64], level: f64) -> Option<f64> {
    (0..counts.len().saturating_sub(1)).rev().find_map(|i| {
        let (below, above) = (counts[i], counts[i + 1]);
        (below < level && above >= level).then(|| i as f64 + (level - below) / (above - below))
    })
}
