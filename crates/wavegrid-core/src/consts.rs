/// Consistency factor making the Rousseeuw-Croux Sn estimator an unbiased
/// estimate of the standard deviation under a normal model.
pub const SN_CONSISTENCY: f64 = 1.1926;

/// Fraction of empty bins (between the first and last histogram peak) above
/// which the defocus threshold halves its bin count and retries.
pub const MAX_EMPTY_BIN_FRACTION: f64 = 0.1;

/// Default initial histogram bin count for the defocus threshold.
pub const DEFAULT_DEFOCUS_BINS: usize = 256;

/// Default lower bound on the bin count when the defocus threshold adapts.
pub const DEFAULT_DEFOCUS_MIN_BINS: usize = 8;

/// Default half-width (in bins) of the histogram peak detector window.
pub const DEFAULT_PEAK_NEIGHBORHOOD: usize = 3;

/// Default sigma multiplier applied to Sn of the bin counts.
pub const DEFAULT_DEFOCUS_SIGMA: f64 = 1.0;

/// Default median filter radius used to suppress hot pixels before labeling.
pub const DEFAULT_HOT_PIXEL_RADIUS: usize = 1;

/// Default multiplier on the pseudo-inverse tolerance.
pub const DEFAULT_PINV_THRESHOLD_SCALE: f64 = 1.0;
