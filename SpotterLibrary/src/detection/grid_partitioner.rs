use std::sync::Arc;
use serde::Serialize;
use ab_glyph::{FontVec, PxScale};
use image::{Rgb, RgbImage};
use imageproc::rect::Rect;
use imageproc::drawing::{draw_hollow_rect_mut, draw_text_mut};
use crate::utils::logging::*;
use crate::utils::log_entry::render::RenderEntry;
use crate::detection::utils::cell_selection::CellSelection;
use crate::detection::utils::region::{Local, Region};

/// Cells grow by one divison remainder at the right and bottom edges so the
/// grid always covers the full image.
#[derive(Serialize, Debug, Clone, Copy)]
pub struct Cell {
    pub id: usize,
    pub region: Region<Local>,
}

/// Row-major cell layout of one crop. Cell ids start at zero in the top-left
/// corner and advance along each row.
#[derive(Serialize, Debug, Clone)]
pub struct GridSpec {
    pub rows: u32,
    pub cols: u32,
    pub width: u32,
    pub height: u32,
    pub cells: Vec<Cell>,
}

impl GridSpec {
    pub fn partition(rows: u32, cols: u32, width: u32, height: u32) -> Self {
        let cell_width = width / cols;
        let cell_height = height / rows;
        let mut cells = Vec::with_capacity((rows * cols) as usize);
        for row in 0..rows {
            for col in 0..cols {
                let left = col * cell_width;
                let top = row * cell_height;
                let right = if col == cols - 1 { width } else { left + cell_width };
                let bottom = if row == rows - 1 { height } else { top + cell_height };
                let id = (row * cols + col) as usize;
                cells.push(Cell {
                    id,
                    region: Region::new(left, top, right, bottom),
                });
            }
        }
        Self {
            rows,
            cols,
            width,
            height,
            cells,
        }
    }

    /// Drops selections with unknown cell ids, confidences outside 0 to 100,
    /// or confidences under the floor.
    pub fn confident_selections(&self, selections: &[CellSelection], floor: f64) -> Vec<CellSelection> {
        selections.iter()
            .filter(|selection| selection.cell_id < self.cells.len())
            .filter(|selection| selection.confidence.is_finite())
            .filter(|selection| (0.0..=100.0).contains(&selection.confidence))
            .filter(|selection| selection.confidence >= floor)
            .cloned()
            .collect()
    }

    pub fn union_region(&self, selections: &[CellSelection]) -> Option<Region<Local>> {
        selections.iter()
            .filter_map(|selection| self.cells.get(selection.cell_id))
            .map(|cell| cell.region)
            .reduce(|union, region| union.union(&region))
    }
}

#[derive(Clone)]
pub struct OverlayStyle {
    pub font: Option<Arc<FontVec>>,
    pub line_color: Rgb<u8>,
    pub label_color: Rgb<u8>,
    pub line_width: u32,
    pub min_label_height: f32,
}

impl OverlayStyle {
    /// Lines only, no fonts on disk required. Used by tests.
    pub fn bare() -> Self {
        Self {
            font: None,
            line_color: Rgb([0, 255, 0]),
            label_color: Rgb([255, 255, 0]),
            line_width: 1,
            min_label_height: 8.0,
        }
    }
}

pub struct GridPartitioner {
    rows: u32,
    cols: u32,
    style: OverlayStyle,
}

impl GridPartitioner {
    pub fn new(rows: u32, cols: u32, style: OverlayStyle) -> Self {
        Self {
            rows,
            cols,
            style,
        }
    }

    pub fn label_height(&self, width: u32, height: u32) -> f32 {
        let cell_width = width / self.cols;
        let cell_height = height / self.rows;
        (cell_width.min(cell_height) / 8) as f32
    }

    pub fn can_label(&self, width: u32, height: u32) -> bool {
        self.label_height(width, height) >= self.style.min_label_height
    }

    /// Burns the grid lines and cell ids into a copy of the crop and returns
    /// it with the matching layout.
    pub fn overlay(&self, image: &RgbImage) -> Result<(RgbImage, GridSpec), LogEntry> {
        let (width, height) = image.dimensions();
        if !self.can_label(width, height) {
            let cell_width = width / self.cols;
            let cell_height = height / self.rows;
            return Err(error_entry!(RenderEntry::CellTooSmall(cell_width, cell_height)));
        }
        let grid = GridSpec::partition(self.rows, self.cols, width, height);
        let mut canvas = image.clone();
        let label_height = self.label_height(width, height);
        for cell in &grid.cells {
            let region = cell.region;
            for i in 0..self.style.line_width {
                if region.width() <= 2 * i || region.height() <= 2 * i {
                    break;
                }
                let inset = Rect::at((region.left + i) as i32, (region.top + i) as i32)
                    .of_size(region.width() - 2 * i, region.height() - 2 * i);
                draw_hollow_rect_mut(&mut canvas, inset, self.style.line_color);
            }
            if let Some(font) = &self.style.font {
                let scale = PxScale::from(label_height);
                let label = cell.id.to_string();
                let position_x = (region.left + 5) as i32;
                let position_y = (region.top + 5) as i32;
                draw_text_mut(&mut canvas, self.style.label_color, position_x, position_y, scale, font.as_ref(), &label);
            }
        }
        Ok((canvas, grid))
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn partition_produces_even_cells() {
        let grid = GridSpec::partition(3, 4, 1200, 900);
        assert_eq!(grid.cells.len(), 12);
        for cell in &grid.cells {
            assert_eq!(cell.region.width(), 300);
            assert_eq!(cell.region.height(), 300);
        }
        assert_eq!(grid.cells[5].region, Region::new(300, 300, 600, 600));
        assert_eq!(grid.cells[6].region, Region::new(600, 300, 900, 600));
    }

    #[test]
    fn last_row_and_column_absorb_remainder() {
        let grid = GridSpec::partition(3, 4, 1003, 902);
        assert_eq!(grid.cells[3].region.right, 1003);
        assert_eq!(grid.cells[11].region, Region::new(750, 600, 1003, 902));
        let covered: u64 = grid.cells.iter().map(|cell| cell.region.area()).sum();
        assert_eq!(covered, 1003_u64 * 902_u64);
    }

    #[test]
    fn selections_outside_bounds_are_dropped() {
        let grid = GridSpec::partition(3, 4, 1200, 900);
        let selections = vec![
            CellSelection::new(5, 80.0),
            CellSelection::new(40, 95.0),
            CellSelection::new(6, 120.0),
            CellSelection::new(7, -3.0),
            CellSelection::new(8, f64::NAN),
            CellSelection::new(9, 59.9),
        ];
        let confident = grid.confident_selections(&selections, 60.0);
        assert_eq!(confident, vec![CellSelection::new(5, 80.0)]);
    }

    #[test]
    fn union_region_spans_selected_cells() {
        let grid = GridSpec::partition(3, 4, 1200, 900);
        let selections = vec![CellSelection::new(5, 80.0), CellSelection::new(6, 90.0)];
        let union = grid.union_region(&selections);
        assert_eq!(union, Some(Region::new(300, 300, 900, 600)));
        assert_eq!(grid.union_region(&[]), None);
    }

    #[test]
    fn overlay_rejects_crops_too_small_to_label() {
        let partitioner = GridPartitioner::new(3, 4, OverlayStyle::bare());
        let image = RgbImage::new(100, 90);
        assert!(partitioner.overlay(&image).is_err());
    }

    #[test]
    fn overlay_keeps_dimensions_and_layout() {
        let partitioner = GridPartitioner::new(3, 4, OverlayStyle::bare());
        let image = RgbImage::new(1200, 900);
        let (canvas, grid) = partitioner.overlay(&image).unwrap();
        assert_eq!(canvas.dimensions(), (1200, 900));
        assert_eq!(grid.cells.len(), 12);
        assert_eq!(canvas.get_pixel(0, 0), &Rgb([0, 255, 0]));
    }
}
