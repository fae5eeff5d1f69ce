use serde::{Deserialize, Serialize};

/// One grid cell the oracle reports as containing the target.
#[derive(Serialize, Deserialize, Debug, Clone, Copy, PartialEq)]
pub struct CellSelection {
    pub cell_id: usize,
    pub confidence: f64,
}

impl CellSelection {
    pub fn new(cell_id: usize, confidence: f64) -> Self {
        Self {
            cell_id,
            confidence,
        }
    }
}
