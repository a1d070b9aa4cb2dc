pub mod aperture;
pub mod config;
pub mod labeling;
pub mod morphology;
pub mod threshold;

pub use aperture::{extract_aperture, ApertureExtraction, ApertureMetrics};
pub use config::{ApertureConfig, ThresholdMethod};
pub use labeling::{interior_mask, label_components, Connectivity, Labeling, UnionFind};
pub use morphology::{dilate, erode};
pub use threshold::threshold_label;
