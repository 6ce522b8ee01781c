use serde::{Deserialize, Serialize};
use std::fmt;

/// How much human scrutiny a consensus answer needs
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Serialize, Deserialize)]
#[serde(rename_all = "SCREAMING_SNAKE_CASE")]
pub enum ReviewLevel {
    None,
    SpotCheck,
    DetailedReview,
    ExpertRequired,
}

impl ReviewLevel {
    pub const NONE_THRESHOLD: f64 = 0.8;
    pub const SPOT_CHECK_THRESHOLD: f64 = 0.6;
    pub const DETAILED_THRESHOLD: f64 = 0.4;

    /// Level for an overall confidence; any outlier forces expert review.
    pub fn assess(confidence: f64, outlier_count: usize) -> Self {
        if outlier_count > 0 || confidence < Self::DETAILED_THRESHOLD {
            ReviewLevel::ExpertRequired
        } else if confidence < Self::SPOT_CHECK_THRESHOLD {
            ReviewLevel::DetailedReview
        } else if confidence < Self::NONE_THRESHOLD {
            ReviewLevel::SpotCheck
        } else {
            ReviewLevel::None
        }
    }
}

impl fmt::Display for ReviewLevel {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            ReviewLevel::None => write!(f, "none"),
            ReviewLevel::SpotCheck => write!(f, "spot check"),
            ReviewLevel::DetailedReview => write!(f, "detailed review"),
            ReviewLevel::ExpertRequired => write!(f, "expert required"),
        }
    }
}
