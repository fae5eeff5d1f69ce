use serde::Serialize;
use std::marker::PhantomData;

/// Coordinates measured from the top-left of the current crop.
#[derive(Serialize, Debug, Clone, Copy, PartialEq, Eq)]
pub struct Local;

/// Coordinates measured from the top-left of the original image.
#[derive(Serialize, Debug, Clone, Copy, PartialEq, Eq)]
pub struct Absolute;

/// Axis-aligned rectangle with an exclusive right/bottom edge. The frame
/// parameter keeps crop-relative and image-relative rectangles from mixing.
#[derive(Serialize, Debug, Clone, Copy, PartialEq, Eq)]
pub struct Region<Frame> {
    pub left: u32,
    pub top: u32,
    pub right: u32,
    pub bottom: u32,
    #[serde(skip)]
    _frame: PhantomData<Frame>,
}

impl<Frame> Region<Frame> {
    pub fn new(left: u32, top: u32, right: u32, bottom: u32) -> Self {
        Self {
            left,
            top,
            right,
            bottom,
            _frame: PhantomData,
        }
    }

    pub fn width(&self) -> u32 {
        self.right.saturating_sub(self.left)
    }

    pub fn height(&self) -> u32 {
        self.bottom.saturating_sub(self.top)
    }

    pub fn area(&self) -> u64 {
        self.width() as u64 * self.height() as u64
    }

    pub fn is_degenerate(&self) -> bool {
        self.right <= self.left || self.bottom <= self.top
    }

    pub fn union(&self, other: &Self) -> Self {
        Self::new(
            self.left.min(other.left),
            self.top.min(other.top),
            self.right.max(other.right),
            self.bottom.max(other.bottom),
        )
    }

    pub fn to_array(&self) -> [u32; 4] {
        [self.left, self.top, self.right, self.bottom]
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn union_covers_both_rectangles() {
        let first = Region::<Local>::new(300, 300, 600, 600);
        let second = Region::<Local>::new(600, 300, 900, 600);
        let union = first.union(&second);
        assert_eq!(union, Region::new(300, 300, 900, 600));
        assert_eq!(union.width(), 600);
        assert_eq!(union.height(), 300);
    }

    #[test]
    fn degenerate_region_is_detected() {
        assert!(Region::<Local>::new(10, 10, 10, 20).is_degenerate());
        assert!(Region::<Local>::new(10, 10, 20, 10).is_degenerate());
        assert!(!Region::<Local>::new(10, 10, 20, 20).is_degenerate());
    }

    #[test]
    fn area_does_not_overflow_large_images() {
        let region = Region::<Absolute>::new(0, 0, 100_000, 100_000);
        assert_eq!(region.area(), 10_000_000_000_u64);
    }
}
