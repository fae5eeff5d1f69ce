use image::RgbImage;
use serde::Serialize;
use crate::detection::utils::confidence::ConfidenceCategory;
use crate::detection::utils::region::{Absolute, Region};

/// Final location of one searched object.
#[derive(Serialize, Debug, Clone)]
pub struct DetectionResult {
    pub description: String,
    pub region: Region<Absolute>,
    pub score: f64,
    pub category: ConfidenceCategory,
    pub iterations: u32,
}

impl DetectionResult {
    pub fn new(description: String, region: Region<Absolute>, score: f64, iterations: u32) -> Self {
        Self {
            description,
            region,
            score,
            category: ConfidenceCategory::from_score(score),
            iterations,
        }
    }

    pub fn is_reportable(&self) -> bool {
        self.category.is_retained()
    }

    /// Produced when the search narrowed down a crop but the final query
    /// could not pin the object inside it.
    pub fn degraded(description: String, region: Region<Absolute>, iterations: u32) -> Self {
        Self {
            description,
            region,
            score: 0.0,
            category: ConfidenceCategory::Uncertain,
            iterations,
        }
    }
}

/// Outcome of one multi-object request.
pub struct DetectionBatch {
    pub results: Vec<DetectionResult>,
    pub visualization: Option<RgbImage>,
}
