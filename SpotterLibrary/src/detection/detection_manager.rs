use std::path::PathBuf;
use std::sync::Arc;
use std::sync::atomic::{AtomicBool, Ordering};
use std::time::Duration;
use ab_glyph::FontVec;
use futures::StreamExt;
use image::{Rgb, RgbImage};
use lazy_static::lazy_static;
use tokio::fs;
use tokio::sync::{RwLock, RwLockReadGuard, RwLockWriteGuard};
use crate::utils::config::Config;
use crate::utils::logging::*;
use crate::utils::log_entry::input::InputEntry;
use crate::utils::log_entry::io::IOEntry;
use crate::utils::log_entry::oracle::OracleEntry;
use crate::utils::log_entry::render::RenderEntry;
use crate::utils::log_entry::system::SystemEntry;
use crate::detection::grid_partitioner::{GridPartitioner, OverlayStyle};
use crate::detection::object_locator::ObjectLocator;
use crate::detection::oracle::remote_oracle::RemoteOracle;
use crate::detection::oracle::vision_oracle::VisionOracle;
use crate::detection::utils::detection_result::{DetectionBatch, DetectionResult};
use crate::detection::utils::parameters::DetectionParameters;
use crate::detection::visualizer::{self, VisualizerStyle};

lazy_static! {
    static ref DETECTION_MANAGER: RwLock<DetectionManager> = RwLock::new(DetectionManager::new());
}

pub struct DetectionManager {
    oracle: Option<Arc<dyn VisionOracle>>,
    cancel_flag: Arc<AtomicBool>,
}

impl DetectionManager {
    fn new() -> Self {
        Self {
            oracle: None,
            cancel_flag: Arc::new(AtomicBool::new(false)),
        }
    }

    pub async fn instance() -> RwLockReadGuard<'static, Self> {
        DETECTION_MANAGER.read().await
    }

    pub async fn instance_mut() -> RwLockWriteGuard<'static, Self> {
        DETECTION_MANAGER.write().await
    }

    pub async fn run() {
        Self::initialize().await;
        logging_information!(SystemEntry::Online);
    }

    async fn initialize() {
        logging_information!(SystemEntry::Initializing);
        let folders = ["SavedFile", "Result"];
        for &folder_name in &folders {
            let path = PathBuf::from(folder_name);
            if let Err(err) = fs::create_dir(&path).await {
                logging_critical!(IOEntry::CreateDirectoryError(path.display().to_string(), err));
            }
        }
        let config = Config::now().await;
        match RemoteOracle::new(config.oracle_endpoint.clone(), Duration::from_secs(config.oracle_timeout)) {
            Ok(oracle) => Self::instance_mut().await.oracle = Some(Arc::new(oracle)),
            Err(entry) => logging_entry!(entry),
        }
        logging_information!(SystemEntry::InitializeComplete);
    }

    pub async fn terminate() {
        logging_information!(SystemEntry::Terminating);
        Self::instance_mut().await.cancel_flag.store(true, Ordering::Relaxed);
        Self::cleanup().await;
        logging_information!(SystemEntry::TerminateComplete);
    }

    async fn cleanup() {
        logging_information!(SystemEntry::Cleaning);
        let folders = ["SavedFile", "Result"];
        for &folder_name in &folders {
            let path = PathBuf::from(folder_name);
            if let Err(err) = fs::remove_dir_all(&path).await {
                logging_error!(IOEntry::DeleteDirectoryError(path.display().to_string(), err));
            }
        }
        logging_information!(SystemEntry::CleanComplete);
    }

    /// Runs the recursive search for every requested object and renders the
    /// annotated image. Returns an error when the whole batch is unusable,
    /// individual misses just drop out of the result list.
    pub async fn detect_multiple(image: RgbImage, descriptions: Vec<String>) -> Result<DetectionBatch, LogEntry> {
        let (oracle, cancel_flag) = {
            let instance = Self::instance().await;
            match &instance.oracle {
                Some(oracle) => (oracle.clone(), instance.cancel_flag.clone()),
                None => return Err(error_entry!(OracleEntry::Unavailable)),
            }
        };
        let config = Config::now().await;
        let parameters = DetectionParameters::from(&config);
        let font = Arc::new(Self::load_font(&config.font_path).await?);
        let style = OverlayStyle {
            font: Some(font.clone()),
            line_color: Rgb(config.grid_line_color),
            label_color: Rgb(config.grid_label_color),
            line_width: config.border_width,
            min_label_height: config.min_label_height,
        };
        let mut batch = Self::run_batch(oracle.as_ref(), &image, &descriptions, parameters, style, config.max_concurrent_detections, cancel_flag).await?;
        if !batch.results.is_empty() {
            let visualizer_style = VisualizerStyle::new(config.font_size, config.border_width, Rgb(config.text_color));
            let entries = batch.results.iter()
                .enumerate()
                .map(|(index, result)| {
                    let label = format!("{}: {} {:.1}%", result.description, result.category, result.score);
                    (result.region, label, visualizer::palette_color(index))
                })
                .collect::<Vec<_>>();
            batch.visualization = Some(visualizer::draw_detections(&image, &entries, font.as_ref(), &visualizer_style));
        }
        Ok(batch)
    }

    /// Locates every description against the same image, bounded by the
    /// concurrency limit. Result order follows the request order.
    pub async fn run_batch(oracle: &dyn VisionOracle, image: &RgbImage, descriptions: &[String], parameters: DetectionParameters, style: OverlayStyle, concurrency: usize, cancel_flag: Arc<AtomicBool>) -> Result<DetectionBatch, LogEntry> {
        let cleaned = descriptions.iter()
            .map(|description| description.trim())
            .filter(|description| !description.is_empty())
            .collect::<Vec<_>>();
        if cleaned.is_empty() {
            return Err(error_entry!(InputEntry::EmptyTargetList));
        }
        let partitioner = GridPartitioner::new(parameters.grid_rows, parameters.grid_cols, style);
        let locator = ObjectLocator::new(oracle, partitioner, parameters, cancel_flag);
        let outcomes = futures::stream::iter(cleaned)
            .map(|description| locator.detect(image, description))
            .buffered(concurrency.max(1))
            .collect::<Vec<_>>()
            .await;
        let total = outcomes.len();
        let mut failures = 0_usize;
        let mut located = Vec::new();
        for outcome in outcomes {
            match outcome {
                Ok(result) => located.push(result),
                Err(entry) => {
                    failures += 1;
                    logging_entry!(entry);
                },
            }
        }
        if failures == total {
            return Err(error_entry!(OracleEntry::Unavailable));
        }
        let results = located.into_iter()
            .filter(DetectionResult::is_reportable)
            .collect::<Vec<_>>();
        Ok(DetectionBatch {
            results,
            visualization: None,
        })
    }

    async fn load_font(font_path: &str) -> Result<FontVec, LogEntry> {
        let font_data = fs::read(font_path).await
            .map_err(|err| error_entry!(RenderEntry::FontReadError(font_path.to_string(), err)))?;
        FontVec::try_from_vec(font_data)
            .map_err(|_| error_entry!(RenderEntry::FontParseError(font_path.to_string())))
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::collections::HashMap;
    use futures::future::BoxFuture;
    use crate::detection::grid_partitioner::GridSpec;
    use crate::detection::utils::cell_selection::CellSelection;
    use crate::detection::utils::confidence::ConfidenceCategory;
    use crate::detection::utils::region::Region;

    struct MappedOracle {
        answers: HashMap<String, Vec<CellSelection>>,
        fail_on: Option<String>,
    }

    impl VisionOracle for MappedOracle {
        fn query<'a>(&'a self, _grid_image: &'a RgbImage, description: &'a str, _grid: &'a GridSpec) -> BoxFuture<'a, Result<Vec<CellSelection>, LogEntry>> {
            Box::pin(async move {
                if self.fail_on.as_deref() == Some(description) {
                    return Err(error_entry!(OracleEntry::MalformedResponse("scripted failure".to_string())));
                }
                Ok(self.answers.get(description).cloned().unwrap_or_default())
            })
        }
    }

    fn certain_everywhere() -> Vec<CellSelection> {
        (0..12).map(|id| CellSelection::new(id, 95.0)).collect()
    }

    #[tokio::test]
    async fn batch_keeps_request_order_and_drops_misses() {
        let oracle = MappedOracle {
            answers: HashMap::from([
                ("cat".to_string(), certain_everywhere()),
                ("dog".to_string(), Vec::new()),
                ("bird".to_string(), certain_everywhere()),
            ]),
            fail_on: None,
        };
        let image = RgbImage::new(1200, 900);
        let descriptions = vec!["cat".to_string(), "dog".to_string(), "bird".to_string()];
        let batch = DetectionManager::run_batch(&oracle, &image, &descriptions, DetectionParameters::default(), OverlayStyle::bare(), 4, Arc::new(AtomicBool::new(false))).await.unwrap();
        let names = batch.results.iter().map(|result| result.description.clone()).collect::<Vec<_>>();
        assert_eq!(names, vec!["cat".to_string(), "bird".to_string()]);
        assert!(batch.results.iter().all(|result| result.region == Region::new(0, 0, 1200, 900)));
        assert!(batch.visualization.is_none());
    }

    #[tokio::test]
    async fn partial_failure_still_reports_survivors() {
        let oracle = MappedOracle {
            answers: HashMap::from([("cat".to_string(), certain_everywhere())]),
            fail_on: Some("dog".to_string()),
        };
        let image = RgbImage::new(1200, 900);
        let descriptions = vec!["cat".to_string(), "dog".to_string()];
        let batch = DetectionManager::run_batch(&oracle, &image, &descriptions, DetectionParameters::default(), OverlayStyle::bare(), 4, Arc::new(AtomicBool::new(false))).await.unwrap();
        assert_eq!(batch.results.len(), 1);
        assert_eq!(batch.results[0].description, "cat");
        assert_eq!(batch.results[0].category, ConfidenceCategory::Certain);
    }

    #[tokio::test]
    async fn total_failure_is_an_error() {
        let oracle = MappedOracle {
            answers: HashMap::new(),
            fail_on: Some("cat".to_string()),
        };
        let image = RgbImage::new(1200, 900);
        let descriptions = vec!["cat".to_string()];
        assert!(DetectionManager::run_batch(&oracle, &image, &descriptions, DetectionParameters::default(), OverlayStyle::bare(), 4, Arc::new(AtomicBool::new(false))).await.is_err());
    }

    #[tokio::test]
    async fn blank_target_list_is_rejected() {
        let oracle = MappedOracle {
            answers: HashMap::new(),
            fail_on: None,
        };
        let image = RgbImage::new(1200, 900);
        let descriptions = vec!["  ".to_string(), "".to_string()];
        assert!(DetectionManager::run_batch(&oracle, &image, &descriptions, DetectionParameters::default(), OverlayStyle::bare(), 4, Arc::new(AtomicBool::new(false))).await.is_err());
    }
}
