#![allow(non_snake_case)]

use std::collections::HashMap;
use std::sync::Arc;
use std::sync::atomic::AtomicBool;
use futures::future::BoxFuture;
use image::RgbImage;
use SpotterLibrary::error_entry;
use SpotterLibrary::utils::logging::{LogEntry, LogLevel};
use SpotterLibrary::utils::log_entry::oracle::OracleEntry;
use SpotterLibrary::detection::detection_manager::DetectionManager;
use SpotterLibrary::detection::grid_partitioner::{GridSpec, OverlayStyle};
use SpotterLibrary::detection::oracle::vision_oracle::VisionOracle;
use SpotterLibrary::detection::utils::cell_selection::CellSelection;
use SpotterLibrary::detection::utils::confidence::ConfidenceCategory;
use SpotterLibrary::detection::utils::parameters::DetectionParameters;
use SpotterLibrary::detection::utils::region::Region;

/// Answers cells from a per-description playbook, one entry per query.
struct PlaybookOracle {
    playbook: HashMap<String, Vec<Vec<CellSelection>>>,
    cursors: std::sync::Mutex<HashMap<String, usize>>,
    fail_on: Option<String>,
}

impl PlaybookOracle {
    fn new(playbook: HashMap<String, Vec<Vec<CellSelection>>>) -> Self {
        Self {
            playbook,
            cursors: std::sync::Mutex::new(HashMap::new()),
            fail_on: None,
        }
    }
}

impl VisionOracle for PlaybookOracle {
    fn query<'a>(&'a self, _grid_image: &'a RgbImage, description: &'a str, _grid: &'a GridSpec) -> BoxFuture<'a, Result<Vec<CellSelection>, LogEntry>> {
        Box::pin(async move {
            if self.fail_on.as_deref() == Some(description) {
                return Err(error_entry!(OracleEntry::MalformedResponse("scripted failure".to_string())));
            }
            let mut cursors = self.cursors.lock().unwrap();
            let cursor = cursors.entry(description.to_string()).or_insert(0);
            let reply = self.playbook.get(description)
                .and_then(|replies| replies.get(*cursor))
                .cloned()
                .unwrap_or_default();
            *cursor += 1;
            Ok(reply)
        })
    }
}

fn search_parameters() -> DetectionParameters {
    DetectionParameters {
        area_convergence_threshold: 2.0,
        ..DetectionParameters::default()
    }
}

fn relaxed_style() -> OverlayStyle {
    OverlayStyle {
        min_label_height: 1.0,
        ..OverlayStyle::bare()
    }
}

#[tokio::test]
async fn two_object_batch_narrows_each_target_independently() {
    let playbook = HashMap::from([
        // Narrows from the full frame into the middle band, then one cell.
        ("traffic light".to_string(), vec![
            vec![CellSelection::new(5, 80.0), CellSelection::new(6, 90.0)],
            vec![CellSelection::new(0, 95.0)],
            vec![CellSelection::new(1, 88.0)],
        ]),
        // Never spotted anywhere.
        ("unicorn".to_string(), vec![
            Vec::new(),
        ]),
    ]);
    let oracle = PlaybookOracle::new(playbook);
    let image = RgbImage::new(1200, 900);
    let descriptions = vec!["traffic light".to_string(), "unicorn".to_string()];
    let batch = DetectionManager::run_batch(&oracle, &image, &descriptions, search_parameters(), relaxed_style(), 2, Arc::new(AtomicBool::new(false))).await.unwrap();
    assert_eq!(batch.results.len(), 1);
    let hit = &batch.results[0];
    assert_eq!(hit.description, "traffic light");
    assert_eq!(hit.region, Region::new(337, 300, 374, 333));
    assert_eq!(hit.category, ConfidenceCategory::High);
    assert_eq!(hit.iterations, 2);
    assert!(batch.visualization.is_none());
}

#[tokio::test]
async fn one_failed_search_does_not_poison_the_batch() {
    let playbook = HashMap::from([
        ("bus".to_string(), vec![
            vec![CellSelection::new(0, 92.0), CellSelection::new(1, 94.0)],
            Vec::new(),
            vec![CellSelection::new(5, 91.0)],
        ]),
    ]);
    let mut oracle = PlaybookOracle::new(playbook);
    oracle.fail_on = Some("bicycle".to_string());
    let image = RgbImage::new(1600, 1200);
    let descriptions = vec!["bus".to_string(), "bicycle".to_string()];
    let batch = DetectionManager::run_batch(&oracle, &image, &descriptions, search_parameters(), relaxed_style(), 2, Arc::new(AtomicBool::new(false))).await.unwrap();
    assert_eq!(batch.results.len(), 1);
    assert_eq!(batch.results[0].description, "bus");
    assert_eq!(batch.results[0].category, ConfidenceCategory::Certain);
}

#[tokio::test]
async fn whitespace_only_targets_are_rejected() {
    let oracle = PlaybookOracle::new(HashMap::new());
    let image = RgbImage::new(800, 600);
    let descriptions = vec![" ".to_string()];
    let outcome = DetectionManager::run_batch(&oracle, &image, &descriptions, search_parameters(), relaxed_style(), 2, Arc::new(AtomicBool::new(false))).await;
    assert!(outcome.is_err());
}
