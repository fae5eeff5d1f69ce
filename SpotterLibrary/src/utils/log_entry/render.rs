use std::io::Error as IoError;
use thiserror::Error;

#[derive(Error, Debug)]
pub enum RenderEntry {
    #[error("Failed to read font file {0}: {1}")]
    FontReadError(String, IoError),
    #[error("Failed to parse font file {0}")]
    FontParseError(String),
    #[error("Cell too small for grid labels: {0}x{1}")]
    CellTooSmall(u32, u32),
}

impl From<RenderEntry> for String {
    #[inline(always)]
    fn from(value: RenderEntry) -> Self {
        value.to_string()
    }
}
