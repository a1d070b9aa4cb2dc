use serde::{Deserialize, Serialize};

use crate::consts::DEFAULT_HOT_PIXEL_RADIUS;
use crate::stats::DefocusParams;

use super::labeling::Connectivity;

/// How the signal threshold for aperture detection is chosen.
#[derive(Clone, Debug, PartialEq, Serialize, Deserialize)]
pub enum ThresholdMethod {
    /// Adaptive histogram threshold for defocused pupil images.
    Defocus(DefocusParams),
    /// User-specified threshold in signal units.
    Fixed(f64),
}

impl Default for ThresholdMethod {
    fn default() -> Self {
        Self::Defocus(DefocusParams::default())
    }
}

/// Configuration for aperture / obstruction extraction.
#[derive(Clone, Debug, PartialEq, Serialize, Deserialize)]
pub struct ApertureConfig {
    /// Signal threshold separating the aperture from the background.
    #[serde(default)]
    pub threshold: ThresholdMethod,
    /// Median filter radius used to suppress hot pixels before labeling.
    #[serde(default = "default_hot_pixel_radius")]
    pub hot_pixel_radius: usize,
    /// Signal level below which an aperture cell is obstructed.
    /// Defaults to the aperture threshold.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub obstruction_threshold: Option<f64>,
    /// Connectivity used to label aperture and obstruction candidates.
    #[serde(default)]
    pub connectivity: Connectivity,
}

fn default_hot_pixel_radius() -> usize {
    DEFAULT_HOT_PIXEL_RADIUS
}

impl Default for ApertureConfig {
    fn default() -> Self {
        Self {
            threshold: ThresholdMethod::default(),
            hot_pixel_radius: DEFAULT_HOT_PIXEL_RADIUS,
            obstruction_threshold: None,
            connectivity: Connectivity::default(),
        }
    }
}
