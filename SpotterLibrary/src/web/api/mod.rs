pub mod detection;
pub mod misc;
