use ab_glyph::{FontVec, PxScale};
use image::{Rgb, RgbImage};
use imageproc::rect::Rect;
use imageproc::drawing::{draw_filled_rect_mut, draw_hollow_rect_mut, draw_text_mut, text_size};
use crate::detection::utils::region::{Absolute, Region};

const PALETTE: [[u8; 3]; 6] = [
    [255, 0, 0],
    [0, 255, 0],
    [0, 0, 255],
    [255, 165, 0],
    [255, 0, 255],
    [0, 255, 255],
];

pub fn palette_color(index: usize) -> Rgb<u8> {
    Rgb(PALETTE[index % PALETTE.len()])
}

#[derive(Clone)]
pub struct VisualizerStyle {
    pub font_size: f32,
    pub border_width: u32,
    pub text_color: Rgb<u8>,
    pub max_label_shifts: u32,
}

impl VisualizerStyle {
    pub fn new(font_size: f32, border_width: u32, text_color: Rgb<u8>) -> Self {
        Self {
            font_size,
            border_width,
            text_color,
            max_label_shifts: 8,
        }
    }
}

/// Pushes later labels down until they stop covering earlier ones. Gives up
/// after `max_shifts` moves per label so dense clusters cannot loop forever.
pub fn stagger_labels(anchors: &[(i32, i32)], extents: &[(u32, u32)], max_shifts: u32) -> Vec<(i32, i32)> {
    let mut placed: Vec<(i32, i32, u32, u32)> = Vec::with_capacity(anchors.len());
    let mut adjusted = Vec::with_capacity(anchors.len());
    for (anchor, extent) in anchors.iter().zip(extents.iter()) {
        let (mut x, mut y) = *anchor;
        let (width, height) = *extent;
        let mut shifts = 0_u32;
        while shifts < max_shifts && placed.iter().any(|other| overlaps((x, y, width, height), *other)) {
            y += height as i32;
            shifts += 1;
        }
        placed.push((x, y, width, height));
        x = x.max(0);
        y = y.max(0);
        adjusted.push((x, y));
    }
    adjusted
}

fn overlaps(first: (i32, i32, u32, u32), second: (i32, i32, u32, u32)) -> bool {
    let (ax, ay, aw, ah) = first;
    let (bx, by, bw, bh) = second;
    ax < bx + bw as i32 && bx < ax + aw as i32 && ay < by + bh as i32 && by < ay + ah as i32
}

/// Draws every retained detection on a copy of the original image with a
/// colored border and a filled label above the box.
pub fn draw_detections(image: &RgbImage, entries: &[(Region<Absolute>, String, Rgb<u8>)], font: &FontVec, style: &VisualizerStyle) -> RgbImage {
    let mut canvas = image.clone();
    let scale = PxScale::from(style.font_size);
    let mut anchors = Vec::with_capacity(entries.len());
    let mut extents = Vec::with_capacity(entries.len());
    for (region, label, _) in entries {
        let (text_width, text_height) = text_size(scale, font, label);
        let anchor_y = region.top as i32 - text_height as i32 - style.border_width as i32;
        anchors.push((region.left as i32, anchor_y.max(0)));
        extents.push((text_width, text_height));
    }
    let anchors = stagger_labels(&anchors, &extents, style.max_label_shifts);
    for (index, (region, label, color)) in entries.iter().enumerate() {
        if region.is_degenerate() {
            continue;
        }
        let base_rectangle = Rect::at(region.left as i32, region.top as i32).of_size(region.width(), region.height());
        for i in 0..style.border_width {
            let offset_rect = Rect::at(base_rectangle.left() - i as i32, base_rectangle.top() - i as i32)
                .of_size(base_rectangle.width() + 2 * i, base_rectangle.height() + 2 * i);
            draw_hollow_rect_mut(&mut canvas, offset_rect, *color);
        }
        let (anchor_x, anchor_y) = anchors[index];
        let (text_width, text_height) = extents[index];
        if text_width > 0 && text_height > 0 {
            let background = Rect::at(anchor_x, anchor_y).of_size(text_width, text_height);
            draw_filled_rect_mut(&mut canvas, background, *color);
        }
        draw_text_mut(&mut canvas, style.text_color, anchor_x, anchor_y, scale, font, label);
    }
    canvas
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn palette_cycles_past_its_length() {
        assert_eq!(palette_color(0), palette_color(6));
        assert_eq!(palette_color(1), palette_color(7));
        assert_ne!(palette_color(0), palette_color(1));
    }

    #[test]
    fn overlapping_labels_are_shifted_down() {
        let anchors = vec![(10, 10), (10, 10)];
        let extents = vec![(100, 20), (100, 20)];
        let adjusted = stagger_labels(&anchors, &extents, 8);
        assert_eq!(adjusted[0], (10, 10));
        assert_eq!(adjusted[1], (10, 30));
    }

    #[test]
    fn separated_labels_keep_their_anchors() {
        let anchors = vec![(10, 10), (400, 10)];
        let extents = vec![(100, 20), (100, 20)];
        let adjusted = stagger_labels(&anchors, &extents, 8);
        assert_eq!(adjusted, anchors);
    }

    #[test]
    fn shift_count_is_capped() {
        let anchors = vec![(0, 0); 12];
        let extents = vec![(50, 10); 12];
        let adjusted = stagger_labels(&anchors, &extents, 3);
        assert!(adjusted.iter().all(|(_, y)| *y <= 3 * 10 * 12));
    }

    #[test]
    fn negative_anchors_are_clamped() {
        let anchors = vec![(-5, -7)];
        let extents = vec![(40, 12)];
        let adjusted = stagger_labels(&anchors, &extents, 8);
        assert_eq!(adjusted, vec![(0, 0)]);
    }
}
