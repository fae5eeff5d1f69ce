use std::fmt::Display;
use std::sync::Arc;
use std::sync::atomic::{AtomicBool, Ordering};
use image::{RgbImage, imageops};
use tokio::time::timeout;
use crate::utils::logging::*;
use crate::utils::log_entry::oracle::OracleEntry;
use crate::utils::log_entry::system::SystemEntry;
use crate::detection::grid_partitioner::{GridPartitioner, GridSpec};
use crate::detection::oracle::vision_oracle::VisionOracle;
use crate::detection::utils::cell_selection::CellSelection;
use crate::detection::utils::detection_result::DetectionResult;
use crate::detection::utils::offset::Offset;
use crate::detection::utils::parameters::DetectionParameters;
use crate::detection::utils::region::{Local, Region};

enum TerminationReason {
    Converged,
    MaxIterations,
    ShrinkLimit,
    NoConfidentCells,
}

impl Display for TerminationReason {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        let str = match self {
            TerminationReason::Converged => "search area converged",
            TerminationReason::MaxIterations => "maximum iterations reached",
            TerminationReason::ShrinkLimit => "crop below minimum size",
            TerminationReason::NoConfidentCells => "no confident cells",
        };
        write!(f, "{}", str)
    }
}

/// Narrows the original image toward one object by repeated grid queries.
/// Each round overlays a labeled grid on the current crop, asks the oracle
/// which cells hold the target, and crops to the union of those cells.
pub struct ObjectLocator<'a> {
    oracle: &'a dyn VisionOracle,
    partitioner: GridPartitioner,
    parameters: DetectionParameters,
    cancel_flag: Arc<AtomicBool>,
}

impl<'a> ObjectLocator<'a> {
    pub fn new(oracle: &'a dyn VisionOracle, partitioner: GridPartitioner, parameters: DetectionParameters, cancel_flag: Arc<AtomicBool>) -> Self {
        Self {
            oracle,
            partitioner,
            parameters,
            cancel_flag,
        }
    }

    pub async fn detect(&self, original: &RgbImage, description: &str) -> Result<DetectionResult, LogEntry> {
        let original_area = Self::image_area(original);
        let mut crop = original.clone();
        let mut offset = Offset::default();
        let mut iterations = 0_u32;
        let reason = loop {
            if self.cancel_flag.load(Ordering::Relaxed) {
                return Err(information_entry!(SystemEntry::Cancel));
            }
            if iterations >= self.parameters.max_iterations {
                break TerminationReason::MaxIterations;
            }
            let (width, height) = crop.dimensions();
            let ratio = Self::image_area(&crop) as f64 / original_area as f64;
            if ratio > self.parameters.area_convergence_threshold {
                break TerminationReason::Converged;
            }
            if width < self.parameters.min_crop_dimension && height < self.parameters.min_crop_dimension {
                break TerminationReason::ShrinkLimit;
            }
            if !self.partitioner.can_label(width, height) {
                break TerminationReason::ShrinkLimit;
            }
            let (confident, grid) = self.query_crop(&crop, description).await?;
            if confident.is_empty() {
                break TerminationReason::NoConfidentCells;
            }
            let union = match grid.union_region(&confident) {
                Some(union) if !union.is_degenerate() => union,
                _ => break TerminationReason::NoConfidentCells,
            };
            if union.width() == width && union.height() == height {
                logging_warning!(format!("Search for {description} selected the whole crop, next round will not shrink"));
            }
            crop = imageops::crop_imm(&crop, union.left, union.top, union.width(), union.height()).to_image();
            offset = offset.advance(union.left, union.top);
            iterations += 1;
        };
        logging_debug!(format!("Search for {description} stopped after {iterations} iterations: {reason}"));
        if self.cancel_flag.load(Ordering::Relaxed) {
            return Err(information_entry!(SystemEntry::Cancel));
        }
        let (width, height) = crop.dimensions();
        let located = if self.partitioner.can_label(width, height) {
            let (confident, grid) = self.query_crop(&crop, description).await?;
            match grid.union_region(&confident) {
                Some(union) if !union.is_degenerate() => {
                    let score = confident.iter().map(|selection| selection.confidence).sum::<f64>() / confident.len() as f64;
                    Some((union, score))
                },
                _ => None,
            }
        } else {
            None
        };
        let result = match located {
            Some((local, score)) => DetectionResult::new(description.to_string(), offset.translate(local), score, iterations),
            None => {
                let crop_region = Region::<Local>::new(0, 0, width, height);
                DetectionResult::degraded(description.to_string(), offset.translate(crop_region), iterations)
            },
        };
        Ok(result)
    }

    async fn query_crop(&self, crop: &RgbImage, description: &str) -> Result<(Vec<CellSelection>, GridSpec), LogEntry> {
        let (grid_image, grid) = self.partitioner.overlay(crop)?;
        let selections = timeout(self.parameters.oracle_timeout, self.oracle.query(&grid_image, description, &grid))
            .await
            .map_err(|_| error_entry!(OracleEntry::QueryTimeout))??;
        let confident = grid.confident_selections(&selections, self.parameters.cell_confidence_floor);
        Ok((confident, grid))
    }

    fn image_area(image: &RgbImage) -> u64 {
        let (width, height) = image.dimensions();
        width as u64 * height as u64
    }
}
