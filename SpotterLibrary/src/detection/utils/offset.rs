use crate::detection::utils::region::{Absolute, Local, Region};

/// Accumulated displacement of the current crop from the original image origin.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub struct Offset {
    pub dx: u32,
    pub dy: u32,
}

impl Offset {
    pub fn advance(self, dx: u32, dy: u32) -> Self {
        Self {
            dx: self.dx + dx,
            dy: self.dy + dy,
        }
    }

    pub fn translate(self, region: Region<Local>) -> Region<Absolute> {
        Region::new(
            region.left + self.dx,
            region.top + self.dy,
            region.right + self.dx,
            region.bottom + self.dy,
        )
    }
}
