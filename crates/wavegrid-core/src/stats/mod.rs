pub mod histogram;
pub mod robust;

pub use histogram::{defocus_threshold, find_peaks, DefocusParams, Histogram};
pub use robust::{mad_median, median, percentile, sn};
