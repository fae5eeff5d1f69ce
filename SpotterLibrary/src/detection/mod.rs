pub mod detection_manager;
pub mod grid_partitioner;
pub mod manager;
pub mod object_locator;
pub mod oracle;
pub mod utils;
pub mod visualizer;
