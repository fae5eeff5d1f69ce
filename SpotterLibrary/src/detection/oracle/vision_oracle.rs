use image::RgbImage;
use futures::future::BoxFuture;
use crate::utils::logging::LogEntry;
use crate::detection::grid_partitioner::GridSpec;
use crate::detection::utils::cell_selection::CellSelection;

/// Answers "which cells contain the target" for one labeled grid image.
/// Implementations must tolerate being asked about the same crop twice.
pub trait VisionOracle: Send + Sync {
    fn query<'a>(&'a self, grid_image: &'a RgbImage, description: &'a str, grid: &'a GridSpec) -> BoxFuture<'a, Result<Vec<CellSelection>, LogEntry>>;
}
