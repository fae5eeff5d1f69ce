use std::time::Duration;
use crate::utils::config::Config;

/// Tunables for one recursive search. Defaults mirror the shipped
/// configuration so tests can run without a config file.
#[derive(Debug, Clone)]
pub struct DetectionParameters {
    pub grid_rows: u32,
    pub grid_cols: u32,
    pub max_iterations: u32,
    pub area_convergence_threshold: f64,
    pub min_crop_dimension: u32,
    pub cell_confidence_floor: f64,
    pub oracle_timeout: Duration,
}

impl Default for DetectionParameters {
    fn default() -> Self {
        Self {
            grid_rows: 3,
            grid_cols: 4,
            max_iterations: 3,
            area_convergence_threshold: 0.6,
            min_crop_dimension: 512,
            cell_confidence_floor: 60.0,
            oracle_timeout: Duration::from_secs(30),
        }
    }
}

impl From<&Config> for DetectionParameters {
    fn from(config: &Config) -> Self {
        Self {
            grid_rows: config.grid_rows,
            grid_cols: config.grid_cols,
            max_iterations: config.max_iterations,
            area_convergence_threshold: config.area_convergence_threshold,
            min_crop_dimension: config.min_crop_dimension,
            cell_confidence_floor: config.cell_confidence_floor,
            oracle_timeout: Duration::from_secs(config.oracle_timeout),
        }
    }
}
