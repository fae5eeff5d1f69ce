use std::fs;
use tokio::sync::RwLock;
use lazy_static::lazy_static;
use serde::{Deserialize, Serialize};
use crate::utils::logging::*;
use crate::utils::log_entry::system::SystemEntry;

lazy_static! {
    static ref CONFIG: RwLock<Config> = RwLock::new(Config::new());
}

#[derive(Debug, Deserialize)]
struct ConfigTable {
    #[serde(rename = "Config")]
    config: Config,
}

#[derive(Serialize, Deserialize, Debug, Clone)]
pub struct Config {
    pub http_server_bind_port: u16, //port
    pub bind_retry_duration: u64, //seconds
    pub oracle_endpoint: String, //url
    pub oracle_timeout: u64, //seconds
    pub max_iterations: u32, //count
    pub grid_rows: u32, //count
    pub grid_cols: u32, //count
    pub cell_confidence_floor: f64, //percent
    pub area_convergence_threshold: f64, //ratio
    pub min_crop_dimension: u32, //pixels
    pub min_label_height: f32, //pixels
    pub max_concurrent_detections: usize, //count
    pub font_path: String, //path
    pub font_size: f32, //points
    pub border_width: u32, //pixels
    pub grid_line_color: [u8; 3], //RGB
    pub grid_label_color: [u8; 3], //RGB
    pub text_color: [u8; 3], //RGB
}

impl Config {
    pub fn new() -> Self {
        //Seriously, the program must be terminated.
        match fs::read_to_string("./spotter.toml") {
            Ok(toml_string) => {
                match toml::from_str::<ConfigTable>(&toml_string) {
                    Ok(config_table) => {
                        let config = config_table.config;
                        if !Self::validate(&config) {
                            logging_console!(emergency_entry!(SystemEntry::InvalidConfig));
                            panic!("Invalid configuration file");
                        }
                        config
                    },
                    Err(err) => {
                        logging_console!(emergency_entry!(SystemEntry::InvalidConfig, format!("Err: {err}")));
                        panic!("Unable to parse configuration file");
                    },
                }
            },
            Err(err) => {
                logging_console!(emergency_entry!(SystemEntry::ConfigNotFound, format!("Err: {err}")));
                panic!("Configuration file not found");
            },
        }
    }

    pub async fn now() -> Config {
        CONFIG.read().await.clone()
    }

pub async fn update(config: Config) {
        *CONFIG.write().await = config
    }

    pub fn validate(config: &Config) -> bool {
        Config::validate_second(config.bind_retry_duration)
            && Config::validate_second(config.oracle_timeout)
            && Config::validate_endpoint(&config.oracle_endpoint)
            && Config::validate_grid_dimension(config.grid_rows)
            && Config::validate_grid_dimension(config.grid_cols)
            && Config::validate_percent(config.cell_confidence_floor)
            && Config::validate_ratio(config.area_convergence_threshold)
            && Config::validate_pixel(config.min_crop_dimension)
            && Config::validate_concurrency(config.max_concurrent_detections)
            && Config::validate_font_size(config.font_size)
            && Config::validate_border_width(config.border_width)
    }

    fn validate_second(second: u64) -> bool {
        second <= 3600
    }

    fn validate_endpoint(endpoint: &str) -> bool {
        endpoint.starts_with("http://") || endpoint.starts_with("https://")
    }

    fn validate_grid_dimension(cells: u32) -> bool {
        cells > 0_u32 && cells <= 16_u32
    }

    fn validate_percent(percent: f64) -> bool {
        (0.0..=100.0).contains(&percent)
    }

    fn validate_ratio(ratio: f64) -> bool {
        (0.0..=1.0).contains(&ratio)
    }

    fn validate_pixel(pixel: u32) -> bool {
        pixel > 0_u32
    }

    fn validate_concurrency(limit: usize) -> bool {
        limit > 0_usize
    }

    fn validate_border_width(width: u32) -> bool {
        width > 0_u32
    }

    fn validate_font_size(size: f32) -> bool {
        size > 0_f32
    }
}
